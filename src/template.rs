use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::path::Path;

use crate::config::LanguageConfig;
use crate::error::{BuildError, BuildResult};
use crate::snippets::SnippetMap;

static PLACEHOLDER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{CODE:([^}]+)\}\}").expect("placeholder pattern is valid"));

/// Names referenced by `{{CODE:<name>}}` placeholders, in order of appearance.
pub fn placeholder_names(template: &str) -> Vec<String> {
    PLACEHOLDER_RE
        .captures_iter(template)
        .map(|cap| cap[1].to_string())
        .collect()
}

/// Render one snippet body as a fenced block.
pub fn fence(tag: &str, body: &str) -> String {
    format!("```{}\n{}\n```", tag, body)
}

/// Replace every placeholder in `template` with a fenced block for `language`.
///
/// Single pass: inserted bodies are never re-scanned. Any name without a
/// snippet fails the whole expansion with one error listing all of them.
pub fn expand_template(
    template: &str,
    snippets: &SnippetMap,
    language: &LanguageConfig,
    template_path: &Path,
) -> BuildResult<String> {
    let mut missing: Vec<String> = Vec::new();

    let expanded = PLACEHOLDER_RE.replace_all(template, |cap: &Captures| {
        let name = &cap[1];
        match snippets.get(name) {
            Some(body) => fence(&language.fence, body),
            None => {
                if !missing.iter().any(|m| m == name) {
                    missing.push(name.to_string());
                }
                cap[0].to_string()
            }
        }
    });

    if !missing.is_empty() {
        return Err(BuildError::MissingSnippets {
            template: template_path.to_path_buf(),
            language: language.name.clone(),
            names: missing,
        });
    }

    Ok(expanded.into_owned())
}
