//! Error types for track decoding, merging and export.

use thiserror::Error;

/// Crate-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// A track record failed shape or type checks.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("invalid field `{field}`: {reason}")]
pub struct ValidationError {
    /// Dotted path of the offending field, e.g. `features[2].frame`.
    pub field: String,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Prefix the field path, used when a nested record fails.
    pub(crate) fn within(mut self, parent: &str) -> Self {
        self.field = if self.field.is_empty() {
            parent.to_string()
        } else if self.field.starts_with('[') {
            format!("{parent}{}", self.field)
        } else {
            format!("{parent}.{}", self.field)
        };
        self
    }
}

/// Stored bytes could not be decoded into a track collection.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// A legacy CSV row is malformed. `line` is 1-based.
    #[error("line {line}: {reason}")]
    Row { line: u64, reason: String },

    /// The native document is not valid JSON or not an object.
    #[error("malformed track document: {0}")]
    Json(#[from] serde_json::Error),

    /// The native document is valid JSON but not a track mapping.
    #[error("malformed track document: {0}")]
    Shape(String),

    /// A mapping key does not match the record stored under it.
    #[error("key `{key}` does not match trackId {track_id}")]
    KeyMismatch { key: String, track_id: u64 },

    /// A native record failed validation.
    #[error("track `{key}`: {source}")]
    Track {
        key: String,
        #[source]
        source: ValidationError,
    },
}

/// Failures raised while producing the tabular export.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExportError {
    /// A feature references a frame beyond the supplied image filenames.
    #[error("track {track_id}: frame {frame} is out of range for {len} image filenames")]
    IndexOutOfRange { track_id: u64, frame: u64, len: usize },

    /// Frame rate must be finite and positive.
    #[error("invalid frame rate: {0}")]
    InvalidFps(f64),

    /// Rendering a row to CSV failed.
    #[error("csv rendering failed: {0}")]
    Render(String),
}

/// Top-level error for the crate.
#[derive(Error, Debug)]
pub enum Error {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("export error: {0}")]
    Export(#[from] ExportError),

    #[error("encode error: {0}")]
    Encode(#[from] serde_json::Error),

    /// The clip has no associated detections.
    #[error("no detections for {0}")]
    NotFound(String),

    /// The storage collaborator failed.
    #[error("store error: {0}")]
    Store(String),

    #[error("configuration error: {0}")]
    Config(String),
}
