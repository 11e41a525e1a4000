use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::builder::{variant_output_path, TopicReport, VariantBuilder};
use crate::config::Config;
use crate::error::{BuildError, BuildResult};
use crate::frontmatter::parse_frontmatter;
use crate::util::{file_name, list_optional, list_subdirs, read_optional, write_file};

pub const ROOT_DOCUMENT: &str = "SKILL.md";
const TEMPLATES_DIR: &str = "templates";
const GENERAL_DIR: &str = "general";

/// One link in the generated index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub name: String,
    pub description: String,
    /// Relative to the skill's output directory
    pub path: String,
}

impl IndexEntry {
    fn render(&self) -> String {
        if self.description.is_empty() {
            format!("- [{}]({})", self.name, self.path)
        } else {
            format!("- [{}]({}): {}", self.name, self.path, self.description)
        }
    }
}

/// Index entries for one language, in topic discovery order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageSection {
    pub display_name: String,
    pub entries: Vec<IndexEntry>,
}

/// Render the navigational index appended to a skill's root document.
///
/// Sections appear per language then general docs; entries keep the order
/// they were given in. Empty sections are left out.
pub fn render_index(languages: &[LanguageSection], general: &[IndexEntry]) -> String {
    let mut out = String::new();

    let sections = languages
        .iter()
        .filter(|s| !s.entries.is_empty())
        .map(|s| (s.display_name.as_str(), s.entries.as_slice()))
        .chain((!general.is_empty()).then_some(("General", general)));

    for (heading, entries) in sections {
        if out.is_empty() {
            out.push_str("## Available Topics\n");
        }
        out.push_str(&format!("\n### {}\n\n", heading));
        for entry in entries {
            out.push_str(&entry.render());
            out.push('\n');
        }
    }

    out
}

/// Result of building one skill directory.
#[derive(Debug)]
pub struct SkillReport {
    pub name: String,
    pub topics: Vec<TopicReport>,
    pub general: Vec<IndexEntry>,
    pub root_written: bool,
}

impl SkillReport {
    pub fn variants_written(&self) -> usize {
        self.topics
            .iter()
            .flat_map(|t| &t.variants)
            .filter(|v| v.is_ok())
            .count()
    }

    pub fn failures(&self) -> Vec<String> {
        self.topics
            .iter()
            .flat_map(|t| {
                t.failures()
                    .map(move |(lang, e)| format!("{} [{}]: {}", t.topic, lang, e))
            })
            .collect()
    }
}

/// Summary of a full build across every skill.
#[derive(Debug, Default)]
pub struct BuildSummary {
    pub skills: Vec<SkillReport>,
}

impl BuildSummary {
    pub fn topics(&self) -> usize {
        self.skills.iter().map(|s| s.topics.len()).sum()
    }

    pub fn variants_written(&self) -> usize {
        self.skills.iter().map(SkillReport::variants_written).sum()
    }

    pub fn general_docs(&self) -> usize {
        self.skills.iter().map(|s| s.general.len()).sum()
    }

    pub fn failures(&self) -> Vec<String> {
        self.skills.iter().flat_map(SkillReport::failures).collect()
    }

    pub fn is_ok(&self) -> bool {
        self.failures().is_empty()
    }
}

/// Builds skill directories from `<source-root>/<skill>/` into `<output-root>/<skill>/`.
pub struct SkillAssembler {
    source_root: PathBuf,
    output_root: PathBuf,
    fail_fast: bool,
    builder: VariantBuilder,
}

impl SkillAssembler {
    pub fn new(config: &Config) -> Self {
        Self {
            source_root: config.paths.source_root.clone(),
            output_root: config.paths.output_root.clone(),
            fail_fast: config.build.fail_fast,
            builder: VariantBuilder::new(config.languages.clone()),
        }
    }

    /// Build every skill found under the source root.
    pub async fn build_all(&self) -> BuildResult<BuildSummary> {
        let skills = list_subdirs(&self.source_root).await?;
        if skills.is_empty() {
            warn!("No skills found in {}", self.source_root.display());
        }

        let mut summary = BuildSummary::default();
        for skill_src in skills {
            let report = self.build_skill(&skill_src).await?;
            summary.skills.push(report);
        }
        Ok(summary)
    }

    /// Build one skill: every topic, every general doc, and the indexed root document.
    pub async fn build_skill(&self, skill_src: &Path) -> BuildResult<SkillReport> {
        let name = file_name(skill_src);
        let skill_out = self.output_root.join(&name);
        info!("Building skill '{}' -> {}", name, skill_out.display());

        let mut topics = Vec::new();
        for template_path in list_optional(&skill_src.join(TEMPLATES_DIR), "md").await? {
            let mut report = self
                .builder
                .build_topic(skill_src, &skill_out, &template_path)
                .await?;
            if self.fail_fast {
                if let Some(err) = report.take_first_error() {
                    return Err(err);
                }
            }
            topics.push(report);
        }

        let general = self.copy_general_docs(skill_src, &skill_out).await?;

        let index = render_index(&self.language_sections(&topics, &skill_out), &general);
        let root_written = self
            .write_root_document(skill_src, &skill_out, &index)
            .await?;

        Ok(SkillReport {
            name,
            topics,
            general,
            root_written,
        })
    }

    /// Index sections linking only the variants that were written.
    fn language_sections(&self, topics: &[TopicReport], skill_out: &Path) -> Vec<LanguageSection> {
        self.builder
            .languages()
            .iter()
            .map(|language| LanguageSection {
                display_name: language.display_name.clone(),
                entries: topics
                    .iter()
                    .filter(|t| {
                        t.variants
                            .iter()
                            .any(|v| v.language == language.name && v.is_ok())
                    })
                    .map(|t| IndexEntry {
                        name: t.frontmatter.name.clone(),
                        description: t.frontmatter.description.clone(),
                        path: relative_link(
                            &variant_output_path(skill_out, &t.topic, language),
                            skill_out,
                        ),
                    })
                    .collect(),
            })
            .collect()
    }

    async fn copy_general_docs(
        &self,
        skill_src: &Path,
        skill_out: &Path,
    ) -> BuildResult<Vec<IndexEntry>> {
        let mut entries = Vec::new();
        for doc in list_optional(&skill_src.join(GENERAL_DIR), "md").await? {
            let content = tokio::fs::read_to_string(&doc)
                .await
                .map_err(|e| BuildError::io(&doc, e))?;
            let file_name = doc
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default()
                .to_string();

            write_file(&skill_out.join(&file_name), &content).await?;

            let frontmatter = parse_frontmatter(&content);
            entries.push(IndexEntry {
                name: frontmatter.name,
                description: frontmatter.description,
                path: file_name,
            });
        }
        Ok(entries)
    }

    async fn write_root_document(
        &self,
        skill_src: &Path,
        skill_out: &Path,
        index: &str,
    ) -> BuildResult<bool> {
        let root = skill_src.join(ROOT_DOCUMENT);
        let Some(content) = read_optional(&root).await? else {
            warn!("No {} at {}; skipping index", ROOT_DOCUMENT, root.display());
            return Ok(false);
        };

        let mut out = content.trim_end().to_string();
        if !index.is_empty() {
            out.push_str("\n\n");
            out.push_str(index.trim_end());
        }
        out.push('\n');

        write_file(&skill_out.join(ROOT_DOCUMENT), &out).await?;
        Ok(true)
    }
}

/// Forward-slash link from `base` to `path`.
fn relative_link(path: &Path, base: &Path) -> String {
    let relative = path.strip_prefix(base).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
