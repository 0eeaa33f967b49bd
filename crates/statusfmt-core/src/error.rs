use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure of a formatting invocation. No partial output accompanies it.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("markdown rendering failed: {0}")]
    Markdown(#[from] MarkdownError),
}

/// Failure reported by a markdown delegate.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum MarkdownError {
    #[error("markdown processor rejected the input: {reason}")]
    Rejected { reason: String },
    #[error("markdown processor unavailable: {reason}")]
    Unavailable { reason: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid formatter config: {0}")]
    Parse(#[from] toml::de::Error),
}
