use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::config::{Config, LanguageConfig};
use crate::util::{list_optional, list_subdirs, run_cmd_with_timeout};

static SUMMARY_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Found \d+ errors?\b").expect("summary pattern is valid"));

/// Raw result of one checker invocation.
#[derive(Debug, Clone, Default)]
pub struct CheckOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl CheckOutput {
    /// Whichever stream carries output, stdout first.
    pub fn diagnostics(&self) -> &str {
        if self.stdout.trim().is_empty() {
            &self.stderr
        } else {
            &self.stdout
        }
    }
}

/// Syntax checker for a single file.
#[async_trait]
pub trait Checker: Send + Sync {
    async fn check(&self, path: &Path) -> Result<CheckOutput>;
}

/// Runs an external command with the file path appended.
pub struct CommandChecker {
    command: Vec<String>,
    timeout: Duration,
}

impl CommandChecker {
    pub fn new(command: Vec<String>, timeout: Duration) -> Self {
        Self { command, timeout }
    }
}

#[async_trait]
impl Checker for CommandChecker {
    async fn check(&self, path: &Path) -> Result<CheckOutput> {
        let Some((program, args)) = self.command.split_first() else {
            bail!("No checker command configured");
        };

        let mut cmd = Command::new(program);
        cmd.args(args).arg(path);
        debug!("Running {} {:?} {}", program, args, path.display());

        let output = run_cmd_with_timeout(cmd, self.timeout)
            .await
            .with_context(|| format!("Checker '{}' failed on {}", program, path.display()))?;

        Ok(CheckOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

/// Drop diagnostic blocks that point into dependency code.
///
/// A block starts at an unindented line and includes the indented lines
/// after it. Blocks whose first line contains any of `ignore_paths` are
/// removed, as are `Found N errors` summary lines.
pub fn filter_dependency_diagnostics(text: &str, ignore_paths: &[String]) -> String {
    let mut blocks: Vec<Vec<&str>> = Vec::new();
    for line in text.lines() {
        let continuation = line.starts_with(char::is_whitespace) || line.trim().is_empty();
        match blocks.last_mut() {
            Some(block) if continuation => block.push(line),
            _ => blocks.push(vec![line]),
        }
    }

    blocks
        .into_iter()
        .filter(|block| {
            let head = block[0];
            !SUMMARY_LINE_RE.is_match(head)
                && !ignore_paths.iter().any(|p| head.contains(p.as_str()))
        })
        .flatten()
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Point diagnostics for a staged copy back at the original file.
///
/// Line numbers in `path:N`, `path(N,` and `path", line N` locations are
/// shifted up by `offset`, the number of prelude lines. Locations inside the
/// prelude keep the staged path.
pub fn restore_locations(text: &str, staged: &Path, original: &Path, offset: usize) -> String {
    let staged = staged.to_string_lossy();
    let original = original.to_string_lossy();
    let pattern = format!(r#"{}(?:(:|\(|", line )(\d+))?"#, regex::escape(&staged));
    let re = Regex::new(&pattern).expect("escaped location pattern is valid");

    re.replace_all(text, |caps: &regex::Captures| {
        let (Some(sep), Some(line)) = (caps.get(1), caps.get(2)) else {
            return original.to_string();
        };
        match line.as_str().parse::<usize>() {
            Ok(n) if n > offset => format!("{}{}{}", original, sep.as_str(), n - offset),
            _ => caps[0].to_string(),
        }
    })
    .into_owned()
}

/// Outcome for one checked file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationResult {
    pub path: PathBuf,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<String>,
}

impl ValidationResult {
    pub fn pass(path: PathBuf) -> Self {
        Self {
            path,
            success: true,
            diagnostics: None,
        }
    }

    pub fn fail(path: PathBuf, diagnostics: impl Into<String>) -> Self {
        Self {
            path,
            success: false,
            diagnostics: Some(diagnostics.into()),
        }
    }
}

/// Aggregate of a validation run for one language.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationSummary {
    pub language: String,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub results: Vec<ValidationResult>,
}

impl ValidationSummary {
    pub fn new(language: &str, results: Vec<ValidationResult>) -> Self {
        let passed = results.iter().filter(|r| r.success).count();
        Self {
            language: language.to_string(),
            total: results.len(),
            passed,
            failed: results.len() - passed,
            results,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.failed == 0
    }

    /// Print a human-readable report
    pub fn print_summary(&self) {
        let failures: Vec<_> = self.results.iter().filter(|r| !r.success).collect();

        if !failures.is_empty() {
            println!("\n❌ Failed files ({}):", failures.len());
            for result in &failures {
                println!("\n   • {}", result.path.display());
                if let Some(diagnostics) = &result.diagnostics {
                    for line in diagnostics.lines() {
                        println!("     {}", line);
                    }
                }
            }
            println!();
        }

        println!("📋 {} snippet validation", self.language);
        println!("Total files: {}", self.total);
        println!("Passed: {}", self.passed);
        println!("Failed: {}", self.failed);
    }
}

/// Checks every example file of one language across all skills.
pub struct SnippetValidator {
    source_root: PathBuf,
    language: LanguageConfig,
    checker: Box<dyn Checker>,
}

impl SnippetValidator {
    pub fn new(config: &Config, language: &LanguageConfig) -> Self {
        let checker = CommandChecker::new(
            language.check.command.clone(),
            Duration::from_secs(config.validation.timeout_secs),
        );
        Self::with_checker(config, language, Box::new(checker))
    }

    pub fn with_checker(
        config: &Config,
        language: &LanguageConfig,
        checker: Box<dyn Checker>,
    ) -> Self {
        Self {
            source_root: config.paths.source_root.clone(),
            language: language.clone(),
            checker,
        }
    }

    /// `<source-root>/<skill>/code/<language-dir>/*.<ext>` for every skill.
    pub async fn discover_files(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for skill in list_subdirs(&self.source_root).await? {
            let code_dir = skill.join("code").join(&self.language.dir);
            files.extend(list_optional(&code_dir, &self.language.extension).await?);
        }
        Ok(files)
    }

    /// Check one file, classifying checker errors and timeouts as failures.
    pub async fn validate_file(&self, path: &Path) -> ValidationResult {
        let outcome = match &self.language.check.prelude {
            Some(prelude) => self.check_staged(path, prelude).await,
            None => self.checker.check(path).await,
        };

        let output = match outcome {
            Ok(output) => output,
            Err(e) => return ValidationResult::fail(path.to_path_buf(), format!("{:#}", e)),
        };

        if output.success {
            return ValidationResult::pass(path.to_path_buf());
        }

        let ignore_paths = &self.language.check.ignore_paths;
        if ignore_paths.is_empty() {
            return ValidationResult::fail(path.to_path_buf(), output.diagnostics().trim());
        }

        let filtered = filter_dependency_diagnostics(output.diagnostics(), ignore_paths);
        if filtered.is_empty() {
            debug!(
                "Only dependency diagnostics for {}; counting as pass",
                path.display()
            );
            ValidationResult::pass(path.to_path_buf())
        } else {
            ValidationResult::fail(path.to_path_buf(), filtered)
        }
    }

    /// Check a copy of `path` with `prelude` prepended, reporting against the original path.
    async fn check_staged(&self, path: &Path, prelude: &str) -> Result<CheckOutput> {
        let source = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let staging = TempDir::new().context("Failed to create staging directory")?;
        let staged = staging
            .path()
            .join(path.file_name().unwrap_or_else(|| OsStr::new("snippet")));
        tokio::fs::write(&staged, format!("{}\n{}", prelude.trim_end(), source)).await?;

        let mut output = self.checker.check(&staged).await?;
        let offset = prelude.trim_end().lines().count();
        output.stdout = restore_locations(&output.stdout, &staged, path, offset);
        output.stderr = restore_locations(&output.stderr, &staged, path, offset);
        Ok(output)
    }

    /// Validate every discovered file, one after another.
    pub async fn run(&self) -> Result<ValidationSummary> {
        let files = self.discover_files().await?;
        info!(
            "Validating {} {} files",
            files.len(),
            self.language.display_name
        );

        let mut results = Vec::with_capacity(files.len());
        for file in files {
            let result = self.validate_file(&file).await;
            if result.success {
                info!("✓ {}", file.display());
            } else {
                warn!("✗ {}", file.display());
            }
            results.push(result);
        }

        Ok(ValidationSummary::new(&self.language.name, results))
    }
}
