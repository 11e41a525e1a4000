//! Shared filesystem and process helpers

use anyhow::{bail, Context, Result};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::fs;
use tokio::process::Command;

use crate::error::{BuildError, BuildResult};

/// List regular files in `dir` with the given extension, in directory-listing order.
/// A directory that does not exist yields an empty list; any other I/O failure is an error.
pub async fn list_optional(dir: &Path, extension: &str) -> BuildResult<Vec<PathBuf>> {
    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(BuildError::io(dir, e)),
    };

    let mut files = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| BuildError::io(dir, e))?
    {
        let path = entry.path();
        let file_type = entry
            .file_type()
            .await
            .map_err(|e| BuildError::io(&path, e))?;
        if file_type.is_file() && path.extension().and_then(|e| e.to_str()) == Some(extension) {
            files.push(path);
        }
    }
    Ok(files)
}

/// List immediate subdirectories of `dir`, in directory-listing order.
/// A directory that does not exist yields an empty list.
pub async fn list_subdirs(dir: &Path) -> BuildResult<Vec<PathBuf>> {
    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(BuildError::io(dir, e)),
    };

    let mut dirs = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| BuildError::io(dir, e))?
    {
        let file_type = entry
            .file_type()
            .await
            .map_err(|e| BuildError::io(entry.path(), e))?;
        if file_type.is_dir() {
            dirs.push(entry.path());
        }
    }
    Ok(dirs)
}

/// Read a file that may legitimately be absent.
pub async fn read_optional(path: &Path) -> BuildResult<Option<String>> {
    match fs::read_to_string(path).await {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(BuildError::io(path, e)),
    }
}

/// Write `content` to `path`, creating parent directories as needed.
pub async fn write_file(path: &Path, content: &str) -> BuildResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| BuildError::io(parent, e))?;
    }
    fs::write(path, content)
        .await
        .map_err(|e| BuildError::io(path, e))
}

/// File stem as an owned string, empty when the path has none.
pub fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_string()
}

/// Final path component as an owned string, dots and all.
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Run a command with a timeout, killing the child process on expiry.
pub async fn run_cmd_with_timeout(mut cmd: Command, timeout: Duration) -> Result<Output> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let child = cmd.spawn().context("Failed to spawn command")?;

    match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(result) => result.context("Failed to execute command"),
        Err(_) => bail!("Command timed out after {:?}", timeout),
    }
}
