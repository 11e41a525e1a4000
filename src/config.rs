use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{BuildError, BuildResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub build: BuildConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
    #[serde(default = "default_languages")]
    pub languages: Vec<LanguageConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory holding one subdirectory per skill (default: "src")
    #[serde(default = "default_source_root")]
    pub source_root: PathBuf,

    /// Directory the built skills are written to (default: "skills")
    #[serde(default = "default_output_root")]
    pub output_root: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            source_root: default_source_root(),
            output_root: default_output_root(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Abort the whole run on the first failed language variant (default: true)
    #[serde(default = "default_true")]
    pub fail_fast: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self { fail_fast: true }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Timeout for a single checker invocation in seconds (default: 60)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
        }
    }
}

/// One supported example language.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageConfig {
    /// Identifier used on the command line ("typescript")
    pub name: String,
    /// Heading used in the generated index ("TypeScript")
    pub display_name: String,
    /// Subdirectory under `code/`, also the output file stem
    pub dir: String,
    /// Snippet file extension without the dot
    pub extension: String,
    /// Tag placed on the opening code fence
    pub fence: String,
    /// Line-comment prefix in front of `@snippet:` / `@end`
    pub comment_prefix: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub check: CheckConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckConfig {
    /// Checker argv; the file path is appended as the last argument
    #[serde(default)]
    pub command: Vec<String>,

    /// Diagnostic blocks whose location contains any of these are dropped
    #[serde(default)]
    pub ignore_paths: Vec<String>,

    /// Prepended to a staged copy of the file before it is checked
    #[serde(default)]
    pub prelude: Option<String>,
}

/// Parses the file given as the first argument without writing bytecode.
const PYTHON_PARSE_CHECK: &str =
    "import ast, sys; ast.parse(open(sys.argv[1]).read(), sys.argv[1])";

impl LanguageConfig {
    pub fn typescript() -> Self {
        Self {
            name: "typescript".to_string(),
            display_name: "TypeScript".to_string(),
            dir: "typescript".to_string(),
            extension: "ts".to_string(),
            fence: "typescript".to_string(),
            comment_prefix: "//".to_string(),
            aliases: vec!["ts".to_string()],
            check: CheckConfig {
                command: [
                    "npx",
                    "tsc",
                    "--noEmit",
                    "--skipLibCheck",
                    "--target",
                    "es2022",
                    "--module",
                    "nodenext",
                    "--moduleResolution",
                    "nodenext",
                ]
                .iter()
                .map(|s| s.to_string())
                .collect(),
                ignore_paths: vec!["node_modules".to_string()],
                prelude: None,
            },
        }
    }

    pub fn python() -> Self {
        Self {
            name: "python".to_string(),
            display_name: "Python".to_string(),
            dir: "python".to_string(),
            extension: "py".to_string(),
            fence: "python".to_string(),
            comment_prefix: "#".to_string(),
            aliases: vec!["py".to_string()],
            check: CheckConfig {
                command: vec![
                    "python3".to_string(),
                    "-c".to_string(),
                    PYTHON_PARSE_CHECK.to_string(),
                ],
                ignore_paths: Vec::new(),
                prelude: None,
            },
        }
    }

    pub fn matches(&self, name: &str) -> bool {
        let name = name.trim().to_lowercase();
        self.name == name || self.aliases.iter().any(|a| *a == name)
    }
}

fn default_source_root() -> PathBuf {
    PathBuf::from("src")
}

fn default_output_root() -> PathBuf {
    PathBuf::from("skills")
}

fn default_timeout() -> u64 {
    60
}

fn default_true() -> bool {
    true
}

fn default_languages() -> Vec<LanguageConfig> {
    vec![LanguageConfig::typescript(), LanguageConfig::python()]
}

impl Config {
    /// Load config from the working directory or user config directory
    pub fn load() -> Result<Self> {
        Self::load_with_path(None)
    }

    /// Load configuration from a specific path, or use default search paths
    pub fn load_with_path(path: Option<String>) -> Result<Self> {
        if let Some(config_path) = path {
            debug!("Loading config from explicit path: {}", config_path);
            return Self::load_from_path(&config_path)
                .with_context(|| format!("Failed to load config from {}", config_path));
        }

        if Path::new("skillpack.toml").exists() {
            debug!("Loading config from ./skillpack.toml");
            return Self::load_from_path("skillpack.toml");
        }

        if let Some(config_dir) = dirs::config_dir() {
            let config_path = config_dir.join("skillpack").join("config.toml");
            if config_path.exists() {
                debug!("Loading config from {:?}", config_path);
                return Self::load_from_path(&config_path);
            }
        }

        debug!("Using default config");
        Ok(Self::default())
    }

    fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Find a configured language by name or alias
    pub fn language(&self, name: &str) -> BuildResult<&LanguageConfig> {
        self.languages
            .iter()
            .find(|l| l.matches(name))
            .ok_or_else(|| BuildError::UnknownLanguage(name.to_string()))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            paths: PathsConfig::default(),
            build: BuildConfig::default(),
            validation: ValidationConfig::default(),
            languages: default_languages(),
        }
    }
}
