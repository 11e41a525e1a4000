use anyhow::{bail, Result};
use std::path::PathBuf;
use tracing::info;

use crate::config::Config;
use crate::validator::{SnippetValidator, ValidationSummary};

pub async fn run(
    language: &str,
    source: Option<PathBuf>,
    config_path: Option<String>,
    timeout: Option<u64>,
    json: bool,
) -> Result<()> {
    let mut config = Config::load_with_path(config_path)?;

    if let Some(source) = source {
        info!("CLI override: source_root = {}", source.display());
        config.paths.source_root = source;
    }
    if let Some(timeout) = timeout {
        info!("CLI override: timeout = {}s", timeout);
        config.validation.timeout_secs = timeout;
    }

    let summary = validate(&config, language).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        summary.print_summary();
    }

    if !summary.is_ok() {
        bail!("{} file(s) failed validation", summary.failed);
    }

    Ok(())
}

/// Validate one language's example files with an already-resolved configuration.
pub async fn validate(config: &Config, language: &str) -> Result<ValidationSummary> {
    let language = config.language(language)?;
    SnippetValidator::new(config, language).run().await
}
