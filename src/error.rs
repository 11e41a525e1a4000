use std::path::PathBuf;

use thiserror::Error;

pub type BuildResult<T> = std::result::Result<T, BuildError>;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BuildError {
    /// Every placeholder name that had no snippet, reported together.
    #[error(
        "missing snippets in {} for {language}: {}",
        .template.display(),
        .names.join(", ")
    )]
    MissingSnippets {
        template: PathBuf,
        language: String,
        names: Vec<String>,
    },

    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unknown language: {0}")]
    UnknownLanguage(String),
}

impl BuildError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BuildError::Io {
            path: path.into(),
            source,
        }
    }

    /// Snippet names reported missing, empty for other variants.
    pub fn missing_names(&self) -> &[String] {
        match self {
            BuildError::MissingSnippets { names, .. } => names,
            _ => &[],
        }
    }
}
