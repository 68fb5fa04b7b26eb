//! Error taxonomy for the refresh pipeline.

use std::fmt::Display;
use thiserror::Error;

/// Identifies which upstream feed failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Countries,
    Rates,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Countries => "countries",
            SourceKind::Rates => "rates",
        }
    }
}

impl Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One of the two upstream feeds failed or returned a malformed payload.
#[derive(Debug, Clone, Error)]
#[error("{source_kind} source failed: {message}")]
pub struct ExternalSourceError {
    pub source_kind: SourceKind,
    pub message: String,
}

impl ExternalSourceError {
    pub fn new(source_kind: SourceKind, message: impl Into<String>) -> Self {
        Self {
            source_kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage engine error: {0}")]
    Engine(#[from] fjall::Error),

    #[error("failed to encode or decode a stored row: {0}")]
    Codec(#[from] serde_json::Error),

    #[error("store lock poisoned")]
    Poisoned,

    #[error("{0}")]
    Other(String),
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to write summary artifact to {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("summary artifact path has no file name: {0}")]
    InvalidPath(String),
}

/// Everything that can abort a refresh.
#[derive(Debug, Error)]
pub enum RefreshError {
    #[error(transparent)]
    ExternalSource(#[from] ExternalSourceError),

    #[error("persistence failed: {0}")]
    Persistence(#[from] StoreError),

    #[error("summary rendering failed: {0}")]
    Render(#[from] RenderError),
}

impl RefreshError {
    /// The failing feed, when the refresh died while aggregating external data.
    pub fn failed_source(&self) -> Option<SourceKind> {
        match self {
            RefreshError::ExternalSource(e) => Some(e.source_kind),
            _ => None,
        }
    }
}
