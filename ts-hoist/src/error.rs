use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the library layers (parser adapter, fix application,
/// configuration). The rule itself never fails; see `rule`.
#[derive(Debug, Error)]
pub enum HoistError {
    #[error("failed to load TypeScript grammar: {0}")]
    ParserSetup(String),

    #[error("tree-sitter returned no tree")]
    ParseFailed,

    #[error("edits overlap at byte {offset}")]
    OverlappingEdits { offset: usize },

    #[error("edit range {start}..{end} is outside a {len}-byte source")]
    EditOutOfBounds { start: usize, end: usize, len: usize },

    #[error("source has syntax errors; refusing to fix")]
    SourceHasErrors,

    #[error("fixed output no longer parses cleanly")]
    UnparseableFix,

    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },
}

pub type Result<T, E = HoistError> = std::result::Result<T, E>;
