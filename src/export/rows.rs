use std::collections::HashSet;
use std::collections::btree_map;
use std::slice;

use crate::collection::TrackCollection;
use crate::error::ExportError;
use crate::export::options::ExportOptions;
use crate::model::{Attributes, Feature, Rect, Track, TrackId};

/// One exported row: a single feature of a single track.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRow {
    pub track_id: TrackId,
    pub frame: u64,
    /// Seconds from clip start, present when a frame rate was supplied.
    pub time: Option<f64>,
    pub filename: Option<String>,
    pub bounds: Option<Rect>,
    pub fish_length: Option<f64>,
    /// One slot per header label, `None` where blank.
    pub confidences: Vec<Option<f64>>,
    pub attributes: Option<Attributes>,
    /// Track attributes, carried on the first row of each track only.
    pub track_attributes: Option<Attributes>,
}

struct Cursor<'a> {
    track: &'a Track,
    features: slice::Iter<'a, Feature>,
    confidences: Vec<Option<f64>>,
    first: bool,
}

/// Lazy row sequence over a track collection.
///
/// Rows follow ascending track id, then stored feature order. A row is
/// never dropped by confidence filtering; filtering only blanks columns.
/// After an error the sequence ends.
pub struct ExportRows<'a> {
    options: &'a ExportOptions,
    labels: Vec<String>,
    tracks: btree_map::Values<'a, TrackId, Track>,
    current: Option<Cursor<'a>>,
    failed: bool,
}

impl<'a> ExportRows<'a> {
    pub fn new(
        collection: &'a TrackCollection,
        options: &'a ExportOptions,
    ) -> Result<Self, ExportError> {
        options.validate()?;
        Ok(Self {
            options,
            labels: collect_labels(collection),
            tracks: collection.iter(),
            current: None,
            failed: false,
        })
    }

    /// Distinct confidence labels, in header order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Column names for this export. A label that collides with another
    /// column gets a `_confidence` suffix until the name is unique.
    pub fn header(&self) -> Vec<String> {
        let mut columns = vec!["track_id".to_string(), "frame".to_string()];
        if self.options.fps.is_some() {
            columns.push("time".to_string());
        }
        if self.options.filenames.is_some() {
            columns.push("filename".to_string());
        }
        columns.extend(
            ["tl_x", "tl_y", "br_x", "br_y", "fish_length"]
                .iter()
                .map(|c| c.to_string()),
        );
        let trailing = ["attributes".to_string(), "track_attributes".to_string()];
        for label in &self.labels {
            let mut name = label.clone();
            while columns.contains(&name) || trailing.contains(&name) {
                name.push_str("_confidence");
            }
            columns.push(name);
        }
        columns.extend(trailing);
        columns
    }

    pub(crate) fn options(&self) -> &ExportOptions {
        self.options
    }

    fn open(&self, track: &'a Track) -> Cursor<'a> {
        let confidences = self
            .labels
            .iter()
            .map(|label| {
                track
                    .confidence_for(label)
                    .filter(|c| self.options.passes(label, *c))
            })
            .collect();
        Cursor {
            track,
            features: track.features.iter(),
            confidences,
            first: true,
        }
    }
}

impl Iterator for ExportRows<'_> {
    type Item = Result<ExportRow, ExportError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        loop {
            if let Some(cursor) = self.current.as_mut() {
                if let Some(feature) = cursor.features.next() {
                    let first = std::mem::replace(&mut cursor.first, false);
                    let row = build_row(
                        self.options,
                        cursor.track,
                        feature,
                        cursor.confidences.clone(),
                        first,
                    );
                    self.failed = row.is_err();
                    return Some(row);
                }
            }
            let track = self.tracks.next()?;
            self.current = Some(self.open(track));
        }
    }
}

fn build_row(
    options: &ExportOptions,
    track: &Track,
    feature: &Feature,
    confidences: Vec<Option<f64>>,
    first: bool,
) -> Result<ExportRow, ExportError> {
    let filename = match &options.filenames {
        Some(filenames) => {
            let name = usize::try_from(feature.frame)
                .ok()
                .and_then(|i| filenames.get(i))
                .ok_or(ExportError::IndexOutOfRange {
                    track_id: track.track_id,
                    frame: feature.frame,
                    len: filenames.len(),
                })?;
            Some(name.clone())
        }
        None => None,
    };

    Ok(ExportRow {
        track_id: track.track_id,
        frame: feature.frame,
        time: options.fps.map(|fps| feature.frame as f64 / fps),
        filename,
        bounds: feature.bounds,
        fish_length: feature.fish_length,
        confidences,
        attributes: feature.attributes.clone(),
        track_attributes: if first { track.attributes.clone() } else { None },
    })
}

fn collect_labels(collection: &TrackCollection) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut labels = Vec::new();
    for pair in collection.iter().flat_map(|t| &t.confidence_pairs) {
        if seen.insert(pair.label()) {
            labels.push(pair.label().to_string());
        }
    }
    labels
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TrackBuilder;

    fn collection() -> TrackCollection {
        [
            TrackBuilder::new(1)
                .confidence("fish", 0.9)
                .confidence("shark", 0.2)
                .attribute("reviewed", true)
                .feature(Feature::at(0).with_bounds(Rect::from_tlbr(1.0, 2.0, 3.0, 4.0)))
                .feature(Feature::at(1))
                .build(),
            TrackBuilder::new(2).confidence("crab", 0.6).build(),
            TrackBuilder::new(3)
                .confidence("crab", 0.7)
                .feature(Feature::at(4))
                .build(),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_labels_first_seen_order() {
        let tracks = collection();
        let options = ExportOptions::new();
        let rows = ExportRows::new(&tracks, &options).unwrap();
        assert_eq!(rows.labels(), ["fish", "shark", "crab"]);
    }

    #[test]
    fn test_one_row_per_feature() {
        let tracks = collection();
        let options = ExportOptions::new();
        let rows: Vec<_> = ExportRows::new(&tracks, &options)
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].confidences, vec![Some(0.9), Some(0.2), None]);
        assert_eq!(rows[2].track_id, 3);
        assert_eq!(rows[2].confidences, vec![None, None, Some(0.7)]);
    }

    #[test]
    fn test_track_attributes_on_first_row_only() {
        let tracks = collection();
        let options = ExportOptions::new();
        let rows: Vec<_> = ExportRows::new(&tracks, &options)
            .unwrap()
            .map(Result::unwrap)
            .collect();
        assert!(rows[0].track_attributes.is_some());
        assert!(rows[1].track_attributes.is_none());
    }

    #[test]
    fn test_header_columns() {
        let tracks = collection();
        let options = ExportOptions::new().fps(10.0);
        let rows = ExportRows::new(&tracks, &options).unwrap();
        assert_eq!(
            rows.header(),
            [
                "track_id", "frame", "time", "tl_x", "tl_y", "br_x", "br_y", "fish_length",
                "fish", "shark", "crab", "attributes", "track_attributes"
            ]
        );
    }

    #[test]
    fn test_stream_ends_after_error() {
        let tracks = collection();
        let options = ExportOptions::new().filenames(vec!["a.png".into()]);
        let mut rows = ExportRows::new(&tracks, &options).unwrap();

        assert!(rows.next().unwrap().is_ok());
        assert_eq!(
            rows.next().unwrap(),
            Err(ExportError::IndexOutOfRange {
                track_id: 1,
                frame: 1,
                len: 1
            })
        );
        assert!(rows.next().is_none());
    }

    #[test]
    fn test_label_colliding_with_column_is_suffixed() {
        let tracks: TrackCollection = [TrackBuilder::new(1)
            .confidence("frame", 0.5)
            .confidence("frame_confidence", 0.4)
            .confidence("attributes", 0.3)
            .build()]
        .into_iter()
        .collect();
        let options = ExportOptions::new();
        let rows = ExportRows::new(&tracks, &options).unwrap();

        assert_eq!(rows.labels(), ["frame", "frame_confidence", "attributes"]);
        assert_eq!(
            rows.header(),
            [
                "track_id",
                "frame",
                "tl_x",
                "tl_y",
                "br_x",
                "br_y",
                "fish_length",
                "frame_confidence",
                "frame_confidence_confidence",
                "attributes_confidence",
                "attributes",
                "track_attributes",
            ]
        );
    }
}
