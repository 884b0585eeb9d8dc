//! DetectionService wiring a store to the codec, merge and export.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::info;

use crate::codec::{self, SourceFormat};
use crate::collection::{MergeSummary, TrackCollection};
use crate::config::{ClipContext, CodecConfig};
use crate::error::{Error, ExportError, Result};
use crate::export::{CsvLines, ExportOptions, ExportRows};

use super::{ClipRef, DetectionStore, StoredDetections};

/// Body of a save call: tracks to upsert and track ids to delete.
///
/// Delete ids may be given as JSON numbers or strings.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SaveRequest {
    #[serde(default)]
    pub upsert: Vec<Value>,
    #[serde(default, deserialize_with = "ids_as_strings")]
    pub delete: Vec<String>,
}

fn ids_as_strings<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Vec<String>, D::Error> {
    let ids = Vec::<Value>::deserialize(deserializer)?;
    Ok(ids
        .into_iter()
        .map(|id| match id {
            Value::String(s) => s,
            other => other.to_string(),
        })
        .collect())
}

/// A prepared export: the decoded collection plus the options to stream it.
///
/// Rows are produced only when [`DetectionExport::lines`] or
/// [`DetectionExport::rows`] is drained, and each call starts over.
#[derive(Debug, Clone)]
pub struct DetectionExport {
    /// Suggested download name, e.g. `tracks.csv`.
    pub filename: String,
    pub collection: TrackCollection,
    pub options: ExportOptions,
}

impl DetectionExport {
    pub fn rows(&self) -> std::result::Result<ExportRows<'_>, ExportError> {
        ExportRows::new(&self.collection, &self.options)
    }

    pub fn lines(&self) -> std::result::Result<CsvLines<'_>, ExportError> {
        Ok(CsvLines::new(self.rows()?))
    }
}

/// Service bundling a `DetectionStore` with the track codec.
///
/// Every call decodes fresh from the store; nothing is cached between calls.
pub struct DetectionService<S: DetectionStore> {
    store: S,
    config: CodecConfig,
}

impl<S: DetectionStore> DetectionService<S> {
    /// Create a new service over the given store and codec config.
    pub fn new(store: S, config: CodecConfig) -> Self {
        Self { store, config }
    }

    /// Create a new service with the default codec configuration.
    pub fn with_default_config(store: S) -> Self {
        Self::new(store, CodecConfig::default())
    }

    fn read(&self, clip: &ClipRef) -> Result<Option<StoredDetections>> {
        self.store
            .read(clip)
            .map_err(|e| Error::Store(e.to_string()))
    }

    fn decode(&self, stored: &StoredDetections) -> Result<TrackCollection> {
        let format = SourceFormat::detect(&stored.exts, &stored.bytes);
        Ok(codec::decode(&stored.bytes, format, &self.config)?)
    }

    /// Decode a clip's detections, failing with `NotFound` when it has none.
    pub fn load(&self, clip: &ClipRef) -> Result<TrackCollection> {
        let stored = self
            .read(clip)?
            .ok_or_else(|| Error::NotFound(clip.to_string()))?;
        self.decode(&stored)
    }

    /// Decode a clip's detections; a clip without detections reads as an
    /// empty collection.
    pub fn get_detection(&self, clip: &ClipRef) -> Result<TrackCollection> {
        match self.read(clip)? {
            Some(stored) => self.decode(&stored),
            None => Ok(TrackCollection::new()),
        }
    }

    /// Apply an upsert/delete batch and write the result back.
    ///
    /// An empty batch skips the write entirely. A legacy document is
    /// rewritten in the native format on the first non-empty save.
    pub fn save_detection(&mut self, clip: &ClipRef, request: &SaveRequest) -> Result<MergeSummary> {
        let mut tracks = self.get_detection(clip)?;
        let summary = tracks.merge(&request.upsert, &request.delete, self.config.unknown_fields)?;

        if !summary.is_noop() {
            let bytes = codec::encode_native(&tracks)?;
            self.store
                .write(clip, bytes)
                .map_err(|e| Error::Store(e.to_string()))?;
            info!(
                "Saved {} tracks for {} ({} updated, {} deleted)",
                tracks.len(),
                clip,
                summary.updated,
                summary.deleted
            );
        }
        Ok(summary)
    }

    /// Prepare a CSV export of a clip's detections.
    pub fn export_detections(
        &self,
        clip: &ClipRef,
        context: &ClipContext,
        exclude_below_threshold: bool,
    ) -> Result<DetectionExport> {
        let stored = self
            .read(clip)?
            .ok_or_else(|| Error::NotFound(clip.to_string()))?;
        let collection = self.decode(&stored)?;
        let options = ExportOptions::from_context(context, exclude_below_threshold);
        options.validate()?;

        info!(
            "Exporting {} tracks for {} (exclude_below_threshold={})",
            collection.len(),
            clip,
            exclude_below_threshold
        );
        Ok(DetectionExport {
            filename: export_filename(&stored.name),
            collection,
            options,
        })
    }

    /// Get a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Get a mutable reference to the underlying store.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }
}

/// Swap the stored file's extension for `csv`.
fn export_filename(name: &str) -> String {
    match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => format!("{stem}.csv"),
        _ => format!("{name}.csv"),
    }
}
