//! Codec configuration and per-export clip context.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::{Error, Result};

/// What to do with record fields the model does not know about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownFields {
    /// Keep them opaquely and write them back unchanged.
    #[default]
    Preserve,
    /// Discard them during validation.
    Drop,
}

/// Decoding and validation settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    pub unknown_fields: UnknownFields,
    /// Validate each record of a native document while decoding.
    pub validate_native: bool,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            unknown_fields: UnknownFields::Preserve,
            validate_native: true,
        }
    }
}

impl CodecConfig {
    /// Parse a `[codec]` table (or a bare table) from TOML.
    ///
    /// Missing keys fall back to defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let value: toml::Value =
            toml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        let table = value.get("codec").cloned().unwrap_or(value);
        table
            .try_into::<CodecConfig>()
            .map_err(|e: toml::de::Error| Error::Config(e.to_string()))
    }
}

/// Clip-level context supplied by the caller for one export.
///
/// Video clips carry a frame rate; image sequences carry the ordered list
/// of image filenames. `thresholds` maps labels to minimum confidences, with
/// the key `default` applying to labels that have no entry of their own.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClipContext {
    pub fps: Option<f64>,
    pub filenames: Option<Vec<String>>,
    #[serde(alias = "confidenceFilters")]
    pub thresholds: BTreeMap<String, f64>,
}

impl ClipContext {
    pub fn video(fps: f64) -> Self {
        Self {
            fps: Some(fps),
            ..Self::default()
        }
    }

    pub fn image_sequence(filenames: Vec<String>) -> Self {
        Self {
            filenames: Some(filenames),
            ..Self::default()
        }
    }

    pub fn with_threshold(mut self, label: impl Into<String>, threshold: f64) -> Self {
        self.thresholds.insert(label.into(), threshold);
        self
    }
}
