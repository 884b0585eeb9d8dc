//! Builder for assembling a `Track` feature by feature.

use serde_json::Value;

use crate::model::{Attributes, ConfidencePair, Feature, Track, TrackId};

/// Builder for creating `Track` objects incrementally.
///
/// Confidence pairs are folded per label keeping the maximum confidence,
/// with labels in first-seen order. `begin`/`end` follow the smallest and
/// largest frame pushed so far.
#[derive(Debug, Clone)]
pub struct TrackBuilder {
    track: Track,
}

impl TrackBuilder {
    /// Create a new builder for the given track id.
    pub fn new(track_id: TrackId) -> Self {
        Self {
            track: Track::new(track_id),
        }
    }

    /// Add a confidence pair.
    pub fn confidence(mut self, label: impl Into<String>, confidence: f64) -> Self {
        self.add_confidence(label, confidence);
        self
    }

    /// Append a feature.
    pub fn feature(mut self, feature: Feature) -> Self {
        self.push_feature(feature);
        self
    }

    /// Set a track-level attribute.
    pub fn attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set_attribute(key, value);
        self
    }

    pub(crate) fn add_confidence(&mut self, label: impl Into<String>, confidence: f64) {
        let label = label.into();
        match self
            .track
            .confidence_pairs
            .iter_mut()
            .find(|p| p.label() == label)
        {
            Some(existing) => existing.1 = existing.1.max(confidence),
            None => self
                .track
                .confidence_pairs
                .push(ConfidencePair(label, confidence)),
        }
    }

    pub(crate) fn push_feature(&mut self, feature: Feature) {
        let frame = feature.frame;
        self.track.begin = Some(self.track.begin.map_or(frame, |b| b.min(frame)));
        self.track.end = Some(self.track.end.map_or(frame, |e| e.max(frame)));
        self.track.features.push(feature);
    }

    pub(crate) fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.track
            .attributes
            .get_or_insert_with(Attributes::new)
            .insert(key.into(), value.into());
    }

    /// Build the final `Track`.
    pub fn build(self) -> Track {
        self.track
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_builder() {
        let track = TrackBuilder::new(4)
            .confidence("fish", 0.3)
            .confidence("crab", 0.5)
            .confidence("fish", 0.8)
            .confidence("crab", 0.1)
            .feature(Feature::at(2))
            .feature(Feature::at(5))
            .build();

        assert_eq!(track.track_id, 4);
        assert_eq!(
            track.confidence_pairs,
            vec![ConfidencePair::new("fish", 0.8), ConfidencePair::new("crab", 0.5)]
        );
        assert_eq!((track.begin, track.end), (Some(2), Some(5)));
    }

    #[test]
    fn test_attribute_last_write_wins() {
        let track = TrackBuilder::new(1)
            .attribute("species", "cod")
            .attribute("species", "haddock")
            .build();
        assert_eq!(
            track.attributes.unwrap().get("species"),
            Some(&Value::from("haddock"))
        );
    }
}
