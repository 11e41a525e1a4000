//! Named code regions inside example source files.
//!
//! A region opens with a line comment carrying `@snippet:<name>` and closes
//! with a line comment carrying `@end`:
//!
//! ```text
//! // @snippet:create-client
//! const client = new ChromaClient();
//! // @end
//! ```

use regex::Regex;
use std::collections::HashMap;
use tracing::warn;

/// Snippet name to trimmed body.
pub type SnippetMap = HashMap<String, String>;

/// Build the marker pattern for one comment prefix.
fn snippet_pattern(comment_prefix: &str) -> Regex {
    let prefix = regex::escape(comment_prefix);
    let pattern = format!(
        r"(?ms)^[ \t]*{prefix}[ \t]*@snippet:([^\s]+)[^\n]*\n(.*?)^[ \t]*{prefix}[ \t]*@end\b"
    );
    Regex::new(&pattern).expect("escaped snippet pattern is valid")
}

/// Strip leading and trailing blank lines, keeping the indentation of the first line.
fn trim_blank_lines(body: &str) -> String {
    let body = body.trim_end();
    let mut start = 0;
    for line in body.split_inclusive('\n') {
        if !line.trim().is_empty() {
            break;
        }
        start += line.len();
    }
    body[start..].to_string()
}

/// Parse every snippet region in `source`.
///
/// Regions are matched left to right. A name defined twice keeps the later
/// body and logs a warning. A file without regions yields an empty map.
pub fn parse_snippets(source: &str, comment_prefix: &str) -> SnippetMap {
    let re = snippet_pattern(comment_prefix);
    let mut snippets = SnippetMap::new();

    for cap in re.captures_iter(source) {
        let name = cap[1].to_string();
        let body = trim_blank_lines(&cap[2]);
        if snippets.insert(name.clone(), body).is_some() {
            warn!("Snippet '{}' is defined more than once; keeping the last one", name);
        }
    }

    snippets
}
