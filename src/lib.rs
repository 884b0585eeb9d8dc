//! Track collections for annotated video and image sequences.
//!
//! A clip's detections are stored as a mapping of track id to [`Track`].
//! This crate validates tracks, decodes the stored representation (native
//! JSON or the legacy VIAME CSV layout), applies upsert/delete batches, and
//! streams a tabular CSV export with confidence filtering and per-frame
//! time/filename enrichment.

pub mod codec;
pub mod collection;
pub mod config;
pub mod error;
pub mod export;
pub mod integration;
pub mod model;

pub use codec::{SourceFormat, decode, encode_native};
pub use collection::{MergeSummary, TrackCollection};
pub use config::{ClipContext, CodecConfig, UnknownFields};
pub use error::{DecodeError, Error, ExportError, Result, ValidationError};
pub use export::{CsvLines, ExportOptions, ExportRow, ExportRows};
pub use integration::{
    ClipRef, DetectionExport, DetectionService, DetectionStore, MemoryStore, SaveRequest,
    StoredDetections,
};
pub use model::{Attributes, ConfidencePair, Feature, Rect, Track, TrackBuilder, TrackId};
