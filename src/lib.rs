//! skillpack - Build per-language skill documentation from templates and code snippets
//!
//! Topic templates reference named snippets with `{{CODE:<name>}}`. Each
//! supported language keeps its snippets in a source file under `code/`, and
//! the build writes one markdown page per topic and language, plus an index
//! appended to the skill's `SKILL.md`. The validate commands run each
//! language's syntax checker over the same snippet files.

pub mod assembler;
pub mod builder;
pub mod cli;
pub mod config;
pub mod error;
pub mod frontmatter;
pub mod snippets;
pub mod template;
pub mod util;
pub mod validator;
