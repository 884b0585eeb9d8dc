//! Trait for the storage backend holding each clip's detections.

use std::fmt;

/// Opaque reference to a clip's detections in the backing store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClipRef(pub String);

impl fmt::Display for ClipRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ClipRef {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Raw detections as held by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDetections {
    /// File name, used to name exports.
    pub name: String,
    /// Extension list used as the format hint, e.g. `["json"]`.
    pub exts: Vec<String>,
    pub bytes: Vec<u8>,
}

/// Trait for storage backends.
///
/// Implement this trait to connect any file or object store. The store is
/// responsible for read-modify-write atomicity between concurrent writers;
/// a written document must never be observed half-written.
///
/// # Example
///
/// ```ignore
/// use trackstore_rs::{ClipRef, DetectionStore, StoredDetections};
///
/// struct FolderStore {
///     // Your storage client here
/// }
///
/// impl DetectionStore for FolderStore {
///     type Error = std::io::Error;
///
///     fn read(&self, clip: &ClipRef) -> Result<Option<StoredDetections>, Self::Error> {
///         Ok(None)
///     }
///
///     fn write(&mut self, clip: &ClipRef, bytes: Vec<u8>) -> Result<(), Self::Error> {
///         Ok(())
///     }
/// }
/// ```
pub trait DetectionStore {
    /// Error type for storage failures.
    type Error: fmt::Display;

    /// Fetch the current detections of a clip, `None` if it has none.
    fn read(&self, clip: &ClipRef) -> Result<Option<StoredDetections>, Self::Error>;

    /// Replace the clip's detections with a native JSON document.
    fn write(&mut self, clip: &ClipRef, bytes: Vec<u8>) -> Result<(), Self::Error>;
}
