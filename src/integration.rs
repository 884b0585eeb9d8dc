//! Integration module connecting storage backends with the track codec.
//!
//! Storage is an external collaborator reached through [`DetectionStore`].
//! [`DetectionService`] runs the read/decode, merge/write-back and export
//! flows over any store.

mod memory;
mod service;
mod store;

pub use memory::MemoryStore;
pub use service::{DetectionExport, DetectionService, SaveRequest};
pub use store::{ClipRef, DetectionStore, StoredDetections};
