//! Error types for the chunked media pipeline.

use std::time::Duration;
use thiserror::Error;

/// Failure reported by a [`DocumentStore`](super::DocumentStore) backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store backend error: {0}")]
    Backend(String),

    #[error("document {collection}/{key} does not exist")]
    NotFound { collection: String, key: String },

    #[error("document serialization failed: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Coarse classification callers can map to a user-facing message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MediaErrorKind {
    /// Persistence or source read failed; retrying from scratch may help.
    Io,
    /// The operation exceeded its deadline.
    Timeout,
    /// A chunk would not fit in one document.
    ResourceExhausted,
    /// Stored data is missing or unreadable.
    Corrupt,
    /// The pipeline was configured with unusable values.
    Config,
}

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("chunk {index} failed after {succeeded} chunks succeeded: {source}")]
    Store {
        index: usize,
        succeeded: usize,
        #[source]
        source: StoreError,
    },

    #[error("operation timed out after {after:?} with {succeeded} chunks done")]
    Timeout { after: Duration, succeeded: usize },

    #[error("chunk {index} payload is {len} bytes, limit is {limit}")]
    PayloadTooLarge {
        index: usize,
        len: usize,
        limit: usize,
    },

    #[error("chunk {index} ({key}) is missing")]
    MissingChunk { index: usize, key: String },

    #[error("chunk {index} ({key}) is malformed: {reason}")]
    MalformedChunk {
        index: usize,
        key: String,
        reason: String,
    },

    #[error("chunk size {size} is too small, need at least 3 bytes")]
    InvalidChunkSize { size: usize },

    #[error("reading source bytes {start}..{end} failed after {succeeded} chunks: {message}")]
    Source {
        start: usize,
        end: usize,
        succeeded: usize,
        message: String,
    },

    #[error("invalid data URL: {0}")]
    Decode(String),
}

impl MediaError {
    pub fn kind(&self) -> MediaErrorKind {
        match self {
            MediaError::Store { .. } | MediaError::Source { .. } => MediaErrorKind::Io,
            MediaError::Timeout { .. } => MediaErrorKind::Timeout,
            MediaError::PayloadTooLarge { .. } => MediaErrorKind::ResourceExhausted,
            MediaError::MissingChunk { .. }
            | MediaError::MalformedChunk { .. }
            | MediaError::Decode(_) => MediaErrorKind::Corrupt,
            MediaError::InvalidChunkSize { .. } => MediaErrorKind::Config,
        }
    }

    /// Chunks known to have been processed before the failure.
    pub fn succeeded(&self) -> Option<usize> {
        match self {
            MediaError::Store { succeeded, .. }
            | MediaError::Timeout { succeeded, .. }
            | MediaError::Source { succeeded, .. } => Some(*succeeded),
            _ => None,
        }
    }

    /// Record how many chunks were done when a source read failed.
    pub(crate) fn after_chunks(mut self, done: usize) -> Self {
        if let MediaError::Source { succeeded, .. } = &mut self {
            *succeeded = done;
        }
        self
    }
}

pub type MediaResult<T> = Result<T, MediaError>;
