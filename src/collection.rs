//! Track collection and the upsert/delete merge applied on save.

use std::collections::BTreeMap;
use std::collections::btree_map;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::config::UnknownFields;
use crate::error::ValidationError;
use crate::model::{Track, TrackId};

/// All tracks of one clip, keyed by track id.
///
/// Iteration is in ascending track id. Serializes as a JSON object keyed by
/// the decimal string of each id.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TrackCollection {
    tracks: BTreeMap<TrackId, Track>,
}

/// Batch sizes reported back to the caller after a merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MergeSummary {
    pub updated: usize,
    pub deleted: usize,
}

impl MergeSummary {
    /// Nothing was requested, so nothing needs to be written back.
    pub fn is_noop(&self) -> bool {
        self.updated == 0 && self.deleted == 0
    }
}

impl TrackCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn get(&self, track_id: TrackId) -> Option<&Track> {
        self.tracks.get(&track_id)
    }

    pub fn contains(&self, track_id: TrackId) -> bool {
        self.tracks.contains_key(&track_id)
    }

    /// Insert or replace the track stored under its own id.
    pub fn insert(&mut self, track: Track) -> Option<Track> {
        self.tracks.insert(track.track_id, track)
    }

    pub fn remove(&mut self, track_id: TrackId) -> Option<Track> {
        self.tracks.remove(&track_id)
    }

    pub fn iter(&self) -> btree_map::Values<'_, TrackId, Track> {
        self.tracks.values()
    }

    /// Total number of features across all tracks.
    pub fn feature_count(&self) -> usize {
        self.tracks.values().map(|t| t.features.len()).sum()
    }

    /// Apply an upsert/delete batch.
    ///
    /// Every upsert record is validated before anything is touched, so a
    /// single invalid record leaves the collection unchanged. Deletes run
    /// before upserts: an id named in both lists ends up upserted. Deleting
    /// an id that is not present is a no-op.
    pub fn merge<S: AsRef<str>>(
        &mut self,
        upsert: &[Value],
        delete: &[S],
        unknown: UnknownFields,
    ) -> Result<MergeSummary, ValidationError> {
        let validated = upsert
            .iter()
            .enumerate()
            .map(|(i, raw)| {
                Track::from_value(raw, unknown).map_err(|e| e.within(&format!("[{i}]")).within("upsert"))
            })
            .collect::<Result<Vec<_>, _>>()?;

        for id in delete {
            let id = id.as_ref();
            // Ids match by canonical decimal text only, so " 1" or "+1" name no track.
            match id.parse::<TrackId>() {
                Ok(track_id) if track_id.to_string() == id => {
                    if self.tracks.remove(&track_id).is_none() {
                        debug!("Delete of absent track {} ignored", track_id);
                    }
                }
                _ => debug!("Delete of non-canonical track id '{}' ignored", id),
            }
        }

        for track in validated {
            self.insert(track);
        }

        let summary = MergeSummary {
            updated: upsert.len(),
            deleted: delete.len(),
        };
        info!(
            "Merged {} upserts and {} deletes, {} tracks remain",
            summary.updated,
            summary.deleted,
            self.len()
        );
        Ok(summary)
    }
}

impl FromIterator<Track> for TrackCollection {
    fn from_iter<I: IntoIterator<Item = Track>>(iter: I) -> Self {
        let mut collection = Self::new();
        for track in iter {
            collection.insert(track);
        }
        collection
    }
}

impl IntoIterator for TrackCollection {
    type Item = Track;
    type IntoIter = btree_map::IntoValues<TrackId, Track>;

    fn into_iter(self) -> Self::IntoIter {
        self.tracks.into_values()
    }
}

impl<'a> IntoIterator for &'a TrackCollection {
    type Item = &'a Track;
    type IntoIter = btree_map::Values<'a, TrackId, Track>;

    fn into_iter(self) -> Self::IntoIter {
        self.tracks.values()
    }
}
