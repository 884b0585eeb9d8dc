//! Tabular export of a track collection.
//!
//! Export runs in two phases. [`ExportRows::new`] walks every track once to
//! collect the distinct confidence labels in first-seen order (ascending
//! track id, then pair order); these fix the header. Rows are then produced
//! lazily, one per feature, as the caller pulls them.

mod options;
mod render;
mod rows;

pub use options::{DEFAULT_THRESHOLD_KEY, ExportOptions};
pub use render::CsvLines;
pub use rows::{ExportRow, ExportRows};
