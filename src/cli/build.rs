use anyhow::{bail, Result};
use std::path::PathBuf;
use tracing::info;

use crate::assembler::{BuildSummary, SkillAssembler};
use crate::config::Config;

pub async fn run(
    source: Option<PathBuf>,
    output: Option<PathBuf>,
    config_path: Option<String>,
    keep_going: bool,
) -> Result<()> {
    let mut config = Config::load_with_path(config_path)?;

    if let Some(source) = source {
        info!("CLI override: source_root = {}", source.display());
        config.paths.source_root = source;
    }
    if let Some(output) = output {
        info!("CLI override: output_root = {}", output.display());
        config.paths.output_root = output;
    }
    if keep_going {
        info!("CLI override: fail_fast = false");
        config.build.fail_fast = false;
    }

    let summary = build(&config).await?;
    print_summary(&summary);

    let failures = summary.failures();
    if !failures.is_empty() {
        bail!("{} variant(s) failed to build", failures.len());
    }

    Ok(())
}

/// Build every skill with an already-resolved configuration.
pub async fn build(config: &Config) -> Result<BuildSummary> {
    info!(
        "Building skills from {} into {}",
        config.paths.source_root.display(),
        config.paths.output_root.display()
    );
    let summary = SkillAssembler::new(config).build_all().await?;
    Ok(summary)
}

fn print_summary(summary: &BuildSummary) {
    let failures = summary.failures();
    if !failures.is_empty() {
        println!("\n❌ Failed variants ({}):", failures.len());
        for failure in &failures {
            println!("   • {}", failure);
        }
        println!();
    }

    for skill in &summary.skills {
        if !skill.root_written {
            println!("⚠️  {}: no SKILL.md, index not written", skill.name);
        }
    }

    println!(
        "Summary: {} skills, {} topics, {} variants written, {} general docs",
        summary.skills.len(),
        summary.topics(),
        summary.variants_written(),
        summary.general_docs()
    );
}
