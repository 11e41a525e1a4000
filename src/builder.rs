use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::LanguageConfig;
use crate::error::{BuildError, BuildResult};
use crate::frontmatter::{parse_frontmatter, Frontmatter};
use crate::snippets::{parse_snippets, SnippetMap};
use crate::template::expand_template;
use crate::util::{file_stem, read_optional, write_file};

/// Outcome of one language variant of a topic.
#[derive(Debug)]
pub struct VariantOutcome {
    pub language: String,
    pub status: BuildResult<PathBuf>,
}

impl VariantOutcome {
    pub fn is_ok(&self) -> bool {
        self.status.is_ok()
    }
}

/// Everything produced for one topic template.
#[derive(Debug)]
pub struct TopicReport {
    pub topic: String,
    pub frontmatter: Frontmatter,
    pub variants: Vec<VariantOutcome>,
}

impl TopicReport {
    pub fn failures(&self) -> impl Iterator<Item = (&str, &BuildError)> {
        self.variants
            .iter()
            .filter_map(|v| v.status.as_ref().err().map(|e| (v.language.as_str(), e)))
    }

    /// Remove and return the first failed variant's error.
    pub fn take_first_error(&mut self) -> Option<BuildError> {
        let pos = self.variants.iter().position(|v| v.status.is_err())?;
        self.variants.remove(pos).status.err()
    }
}

/// `<skill>/code/<language-dir>/<topic>.<ext>`
pub fn snippet_path(skill_src: &Path, topic: &str, language: &LanguageConfig) -> PathBuf {
    skill_src
        .join("code")
        .join(&language.dir)
        .join(format!("{}.{}", topic, language.extension))
}

/// `<output-skill>/<topic>/<language-dir>.md`
pub fn variant_output_path(skill_out: &Path, topic: &str, language: &LanguageConfig) -> PathBuf {
    skill_out.join(topic).join(format!("{}.md", language.dir))
}

/// Builds the per-language documents for topic templates.
pub struct VariantBuilder {
    languages: Vec<LanguageConfig>,
}

impl VariantBuilder {
    pub fn new(languages: Vec<LanguageConfig>) -> Self {
        Self { languages }
    }

    pub fn languages(&self) -> &[LanguageConfig] {
        &self.languages
    }

    /// Load a snippet file, treating a missing file as an empty map.
    pub async fn load_snippets(
        &self,
        path: &Path,
        language: &LanguageConfig,
    ) -> BuildResult<SnippetMap> {
        match read_optional(path).await? {
            Some(source) => {
                let snippets = parse_snippets(&source, &language.comment_prefix);
                debug!("Loaded {} snippets from {}", snippets.len(), path.display());
                Ok(snippets)
            }
            None => {
                warn!(
                    "No {} snippet file at {}; building without snippets",
                    language.name,
                    path.display()
                );
                Ok(SnippetMap::new())
            }
        }
    }

    async fn build_variant(
        &self,
        template: &str,
        template_path: &Path,
        skill_src: &Path,
        skill_out: &Path,
        topic: &str,
        language: &LanguageConfig,
    ) -> BuildResult<PathBuf> {
        let snippets = self
            .load_snippets(&snippet_path(skill_src, topic, language), language)
            .await?;
        let expanded = expand_template(template, &snippets, language, template_path)?;

        let output = variant_output_path(skill_out, topic, language);
        write_file(&output, &expanded).await?;
        debug!("Wrote {}", output.display());
        Ok(output)
    }

    /// Build every language variant of the template at `template_path`.
    ///
    /// A failing variant is recorded in the report and does not stop the
    /// others. Only a template that cannot be read fails the whole topic.
    pub async fn build_topic(
        &self,
        skill_src: &Path,
        skill_out: &Path,
        template_path: &Path,
    ) -> BuildResult<TopicReport> {
        let topic = file_stem(template_path);
        let template = tokio::fs::read_to_string(template_path)
            .await
            .map_err(|e| BuildError::io(template_path, e))?;
        let frontmatter = parse_frontmatter(&template);

        info!("Building topic '{}'", topic);

        let mut variants = Vec::with_capacity(self.languages.len());
        for language in &self.languages {
            let status = self
                .build_variant(
                    &template,
                    template_path,
                    skill_src,
                    skill_out,
                    &topic,
                    language,
                )
                .await;
            if let Err(ref e) = status {
                warn!("✗ {} [{}]: {}", topic, language.name, e);
            }
            variants.push(VariantOutcome {
                language: language.name.clone(),
                status,
            });
        }

        Ok(TopicReport {
            topic,
            frontmatter,
            variants,
        })
    }
}
