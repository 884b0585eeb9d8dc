//! Track data model and validation.

mod builder;
mod feature;
mod rect;
mod track;
mod validate;

use std::collections::BTreeMap;

pub use builder::TrackBuilder;
pub use feature::Feature;
pub use rect::Rect;
pub use track::{ConfidencePair, Track};

/// Track identifier, unique within one collection.
pub type TrackId = u64;

/// Open key/value metadata attached to a track or a feature.
///
/// Values are restricted to scalars (bool, number, string) by validation.
pub type Attributes = BTreeMap<String, serde_json::Value>;
