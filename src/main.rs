use anyhow::Result;
use clap::{Parser, Subcommand};
use skillpack::cli;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "skillpack", version)]
#[command(about = "Build per-language skill docs from templates and code snippets", long_about = None)]
struct Cli {
    /// Path to config file (defaults to ./skillpack.toml or ~/.config/skillpack/config.toml)
    #[arg(long, global = true)]
    config: Option<String>,

    /// Source root holding one directory per skill
    #[arg(long, global = true)]
    source: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build every skill into the output directory
    Build {
        /// Output root (default: from config)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Keep building after a variant fails (still exits non-zero)
        #[arg(long)]
        keep_going: bool,
    },

    /// Syntax-check every TypeScript snippet file
    ValidateTs {
        #[command(flatten)]
        opts: ValidateOpts,
    },

    /// Syntax-check every Python snippet file
    ValidatePy {
        #[command(flatten)]
        opts: ValidateOpts,
    },

    /// Syntax-check the snippet files of any configured language
    Validate {
        /// Language name or alias (e.g. typescript, ts, python, py)
        language: String,

        #[command(flatten)]
        opts: ValidateOpts,
    },
}

#[derive(clap::Args)]
struct ValidateOpts {
    /// Per-file checker timeout in seconds (default: from config)
    #[arg(long)]
    timeout: Option<u64>,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Build { output, keep_going } => {
            cli::build::run(cli.source, output, cli.config, keep_going).await?;
        }
        Commands::ValidateTs { opts } => {
            cli::validate::run("typescript", cli.source, cli.config, opts.timeout, opts.json)
                .await?;
        }
        Commands::ValidatePy { opts } => {
            cli::validate::run("python", cli.source, cli.config, opts.timeout, opts.json).await?;
        }
        Commands::Validate { language, opts } => {
            cli::validate::run(&language, cli.source, cli.config, opts.timeout, opts.json)
                .await?;
        }
    }

    Ok(())
}
