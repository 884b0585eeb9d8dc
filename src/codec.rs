//! Decoding stored detections into a [`TrackCollection`] and encoding the
//! native representation back.
//!
//! Two stored formats exist. The native format is a JSON object keyed by
//! track id. The legacy format is the row-oriented VIAME CSV layout, kept
//! only so older clips can still be read; it never leaks past this module.

mod legacy;
mod native;

use tracing::debug;

use crate::collection::TrackCollection;
use crate::config::CodecConfig;
use crate::error::DecodeError;

/// Stored representation of a track collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// JSON object keyed by track id.
    Native,
    /// Deprecated VIAME CSV.
    Legacy,
}

impl SourceFormat {
    /// Pick the format from a file extension list, if any extension is known.
    pub fn from_exts<S: AsRef<str>>(exts: &[S]) -> Option<Self> {
        let has = |wanted: &str| exts.iter().any(|e| e.as_ref().eq_ignore_ascii_case(wanted));
        if has("csv") {
            Some(Self::Legacy)
        } else if has("json") {
            Some(Self::Native)
        } else {
            None
        }
    }

    /// Guess the format from content: a JSON document starts with `{`.
    pub fn sniff(bytes: &[u8]) -> Self {
        match bytes.iter().find(|b| !b.is_ascii_whitespace()) {
            Some(b'{') | None => Self::Native,
            Some(_) => Self::Legacy,
        }
    }

    /// Extensions take precedence over content sniffing.
    pub fn detect<S: AsRef<str>>(exts: &[S], bytes: &[u8]) -> Self {
        Self::from_exts(exts).unwrap_or_else(|| Self::sniff(bytes))
    }
}

/// Decode stored bytes. All-or-nothing: any malformed record fails the
/// whole decode.
pub fn decode(
    bytes: &[u8],
    format: SourceFormat,
    config: &CodecConfig,
) -> Result<TrackCollection, DecodeError> {
    let collection = match format {
        SourceFormat::Native => native::decode(bytes, config)?,
        SourceFormat::Legacy => legacy::decode(bytes)?,
    };
    debug!(
        "Decoded {} tracks ({} features) from {:?} source",
        collection.len(),
        collection.feature_count(),
        format
    );
    Ok(collection)
}

/// Encode a collection in the native format, omitting unset fields.
pub fn encode_native(collection: &TrackCollection) -> Result<Vec<u8>, serde_json::Error> {
    native::encode(collection)
}
