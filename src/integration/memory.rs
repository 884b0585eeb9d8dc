//! In-memory `DetectionStore`, used for tests and embedding.

use std::collections::HashMap;
use std::convert::Infallible;

use super::{ClipRef, DetectionStore, StoredDetections};

/// Detections kept in a map. Writes always store a `.json` document.
#[derive(Debug, Default)]
pub struct MemoryStore {
    clips: HashMap<ClipRef, StoredDetections>,
    writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a clip with stored bytes, e.g. a legacy CSV.
    pub fn insert(&mut self, clip: ClipRef, detections: StoredDetections) {
        self.clips.insert(clip, detections);
    }

    pub fn get(&self, clip: &ClipRef) -> Option<&StoredDetections> {
        self.clips.get(clip)
    }

    /// Number of `write` calls served so far.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl DetectionStore for MemoryStore {
    type Error = Infallible;

    fn read(&self, clip: &ClipRef) -> Result<Option<StoredDetections>, Self::Error> {
        Ok(self.clips.get(clip).cloned())
    }

    fn write(&mut self, clip: &ClipRef, bytes: Vec<u8>) -> Result<(), Self::Error> {
        self.writes += 1;
        self.clips.insert(
            clip.clone(),
            StoredDetections {
                name: format!("{clip}.json"),
                exts: vec!["json".to_string()],
                bytes,
            },
        );
        Ok(())
    }
}
