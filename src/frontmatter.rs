use serde::Serialize;

/// The `name` / `description` header of a markdown document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Frontmatter {
    pub name: String,
    pub description: String,
}

/// Extract `name:` and `description:` from a leading `---` block.
///
/// The block must open on the first line and close with another `---` line.
/// A document without one, or a block missing a field, yields empty strings.
pub fn parse_frontmatter(content: &str) -> Frontmatter {
    let mut frontmatter = Frontmatter::default();

    let mut lines = content.lines();
    if lines.next().map(str::trim_end) != Some("---") {
        return frontmatter;
    }

    let mut name = None;
    let mut description = None;
    for line in lines {
        if line.trim_end() == "---" {
            frontmatter.name = name.unwrap_or_default();
            frontmatter.description = description.unwrap_or_default();
            return frontmatter;
        }

        if let Some(value) = line.strip_prefix("name:") {
            name = Some(value.trim().to_string());
        } else if let Some(value) = line.strip_prefix("description:") {
            description = Some(value.trim().to_string());
        }
    }

    // Never closed
    frontmatter
}
