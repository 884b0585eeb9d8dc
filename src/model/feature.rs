//! Per-frame detection entry of a track.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::Attributes;
use crate::model::rect::Rect;

/// One detection of a track at a single frame.
///
/// All fields except `frame` are optional and omitted from the serialized
/// form when unset. Fields this crate does not know about land in `extra`
/// and are kept or dropped according to [`crate::UnknownFields`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feature {
    pub frame: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Rect>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fish_length: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interpolate: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyframe: Option<bool>,
    /// Head keypoint (x, y)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head: Option<[f64; 2]>,
    /// Tail keypoint (x, y)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tail: Option<[f64; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Attributes>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Feature {
    /// A bare detection at `frame` with no geometry.
    pub fn at(frame: u64) -> Self {
        Self {
            frame,
            ..Self::default()
        }
    }

    pub fn with_bounds(mut self, bounds: Rect) -> Self {
        self.bounds = Some(bounds);
        self
    }

    pub fn with_fish_length(mut self, length: f64) -> Self {
        self.fish_length = Some(length);
        self
    }

    /// Set one per-frame attribute, creating the mapping if needed.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes
            .get_or_insert_with(Attributes::new)
            .insert(key.into(), value.into());
        self
    }
}
