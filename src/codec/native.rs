use serde_json::Value;

use crate::collection::TrackCollection;
use crate::config::CodecConfig;
use crate::error::DecodeError;
use crate::model::{Track, TrackId};

pub(super) fn decode(bytes: &[u8], config: &CodecConfig) -> Result<TrackCollection, DecodeError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(TrackCollection::new());
    }

    let document: Value = serde_json::from_slice(bytes)?;
    let Value::Object(entries) = document else {
        return Err(DecodeError::Shape(
            "expected an object keyed by track id".to_string(),
        ));
    };

    let mut collection = TrackCollection::new();
    for (key, raw) in entries {
        let track = if config.validate_native {
            Track::from_value(&raw, config.unknown_fields).map_err(|source| DecodeError::Track {
                key: key.clone(),
                source,
            })?
        } else {
            let mut track: Track = serde_json::from_value(raw)?;
            track.normalize_extras(config.unknown_fields);
            track
        };

        if key.parse::<TrackId>().ok() != Some(track.track_id) {
            return Err(DecodeError::KeyMismatch {
                key,
                track_id: track.track_id,
            });
        }
        collection.insert(track);
    }
    Ok(collection)
}

pub(super) fn encode(collection: &TrackCollection) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(collection)
}
