//! Track entity: identity, aggregate confidence and per-frame detections.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::UnknownFields;
use crate::error::ValidationError;
use crate::model::feature::Feature;
use crate::model::validate;
use crate::model::{Attributes, TrackId};

/// A (label, confidence) association, serialized as a two-element array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidencePair(pub String, pub f64);

impl ConfidencePair {
    pub fn new(label: impl Into<String>, confidence: f64) -> Self {
        Self(label.into(), confidence)
    }

    pub fn label(&self) -> &str {
        &self.0
    }

    pub fn confidence(&self) -> f64 {
        self.1
    }
}

/// Full trajectory record of one tracked entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub track_id: TrackId,
    /// First frame of the track
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub begin: Option<u64>,
    /// Last frame of the track
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<u64>,
    #[serde(default)]
    pub confidence_pairs: Vec<ConfidencePair>,
    #[serde(default)]
    pub features: Vec<Feature>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Attributes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<BTreeMap<String, Value>>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Track {
    /// An empty track with no features and no labels.
    pub fn new(track_id: TrackId) -> Self {
        Self {
            track_id,
            begin: None,
            end: None,
            confidence_pairs: Vec::new(),
            features: Vec::new(),
            attributes: None,
            meta: None,
            extra: BTreeMap::new(),
        }
    }

    /// Validate a raw record and convert it into a `Track`.
    ///
    /// Shape errors name the offending field. Explicit `null` extension
    /// fields are discarded so they are not written back as placeholders.
    pub fn from_value(value: &Value, unknown: UnknownFields) -> Result<Self, ValidationError> {
        validate::check_shape(value)?;

        let mut track: Track = serde_json::from_value(value.clone())
            .map_err(|e| ValidationError::new("track", e.to_string()))?;

        track.normalize_extras(unknown);
        track.validate()?;
        Ok(track)
    }

    /// Check invariants that hold on the typed record.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate::check_track(self)
    }

    /// Confidence recorded for `label`, if any.
    pub fn confidence_for(&self, label: &str) -> Option<f64> {
        self.confidence_pairs
            .iter()
            .find(|p| p.label() == label)
            .map(ConfidencePair::confidence)
    }

    pub(crate) fn normalize_extras(&mut self, unknown: UnknownFields) {
        match unknown {
            UnknownFields::Preserve => {
                self.extra.retain(|_, v| !v.is_null());
                for feature in &mut self.features {
                    feature.extra.retain(|_, v| !v.is_null());
                }
            }
            UnknownFields::Drop => {
                self.extra.clear();
                for feature in &mut self.features {
                    feature.extra.clear();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_value_minimal() {
        let track = Track::from_value(&json!({"trackId": 3}), UnknownFields::Preserve).unwrap();
        assert_eq!(track, Track::new(3));
    }

    #[test]
    fn test_missing_track_id_is_named() {
        let err = Track::from_value(&json!({"features": []}), UnknownFields::Preserve).unwrap_err();
        assert_eq!(err.field, "trackId");
    }

    #[test]
    fn test_none_fields_omitted_on_serialize() {
        let track = Track::from_value(
            &json!({"trackId": 1, "begin": null, "attributes": null, "note": null}),
            UnknownFields::Preserve,
        )
        .unwrap();
        let value = serde_json::to_value(&track).unwrap();
        assert_eq!(
            value,
            json!({"trackId": 1, "confidencePairs": [], "features": []})
        );
    }

    #[test]
    fn test_unknown_fields_policy() {
        let raw = json!({"trackId": 9, "reviewer": "kim", "features": [{"frame": 0, "score": 2}]});

        let kept = Track::from_value(&raw, UnknownFields::Preserve).unwrap();
        assert_eq!(kept.extra.get("reviewer"), Some(&json!("kim")));
        assert_eq!(kept.features[0].extra.get("score"), Some(&json!(2)));

        let dropped = Track::from_value(&raw, UnknownFields::Drop).unwrap();
        assert!(dropped.extra.is_empty());
        assert!(dropped.features[0].extra.is_empty());
    }

    #[test]
    fn test_confidence_lookup() {
        let mut track = Track::new(1);
        track.confidence_pairs = vec![
            ConfidencePair::new("fish", 0.4),
            ConfidencePair::new("shark", 0.9),
        ];
        assert_eq!(track.confidence_for("fish"), Some(0.4));
        assert_eq!(track.confidence_for("crab"), None);
    }
}
