use std::collections::BTreeMap;

use crate::config::ClipContext;
use crate::error::ExportError;

/// Threshold key applied to labels without their own entry.
pub const DEFAULT_THRESHOLD_KEY: &str = "default";

/// Settings for one export call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportOptions {
    /// Blank out confidences below their label's threshold.
    pub exclude_below_threshold: bool,
    pub thresholds: BTreeMap<String, f64>,
    /// Image filename per frame index; adds a `filename` column.
    pub filenames: Option<Vec<String>>,
    /// Frame rate; adds a `time` column in seconds.
    pub fps: Option<f64>,
}

impl ExportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options for a clip, as supplied by the caller.
    pub fn from_context(context: &ClipContext, exclude_below_threshold: bool) -> Self {
        Self {
            exclude_below_threshold,
            thresholds: context.thresholds.clone(),
            filenames: context.filenames.clone(),
            fps: context.fps,
        }
    }

    pub fn exclude_below_threshold(mut self, exclude: bool) -> Self {
        self.exclude_below_threshold = exclude;
        self
    }

    pub fn threshold(mut self, label: impl Into<String>, threshold: f64) -> Self {
        self.thresholds.insert(label.into(), threshold);
        self
    }

    pub fn filenames(mut self, filenames: Vec<String>) -> Self {
        self.filenames = Some(filenames);
        self
    }

    pub fn fps(mut self, fps: f64) -> Self {
        self.fps = Some(fps);
        self
    }

    pub(crate) fn validate(&self) -> Result<(), ExportError> {
        match self.fps {
            Some(fps) if !(fps.is_finite() && fps > 0.0) => Err(ExportError::InvalidFps(fps)),
            _ => Ok(()),
        }
    }

    /// Whether a confidence for `label` is written to its column.
    ///
    /// Without an explicit threshold (per label or `default`) the cut-off
    /// is zero and only zero-confidence values are blanked.
    pub fn passes(&self, label: &str, confidence: f64) -> bool {
        if !self.exclude_below_threshold {
            return true;
        }
        match self
            .thresholds
            .get(label)
            .or_else(|| self.thresholds.get(DEFAULT_THRESHOLD_KEY))
        {
            Some(threshold) => confidence >= *threshold,
            None => confidence > 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_everything_passes_without_exclusion() {
        let options = ExportOptions::new().threshold("fish", 0.9);
        assert!(options.passes("fish", 0.1));
        assert!(options.passes("crab", 0.0));
    }

    #[test]
    fn test_label_then_default_threshold() {
        let options = ExportOptions::new()
            .exclude_below_threshold(true)
            .threshold("fish", 0.5)
            .threshold(DEFAULT_THRESHOLD_KEY, 0.3);
        assert!(options.passes("fish", 0.5));
        assert!(!options.passes("fish", 0.49));
        assert!(options.passes("crab", 0.3));
        assert!(!options.passes("crab", 0.29));
    }

    #[test]
    fn test_implicit_threshold_excludes_only_zero() {
        let options = ExportOptions::new().exclude_below_threshold(true);
        assert!(options.passes("fish", 0.01));
        assert!(!options.passes("fish", 0.0));
    }

    #[test]
    fn test_fps_must_be_positive() {
        assert_eq!(
            ExportOptions::new().fps(0.0).validate(),
            Err(ExportError::InvalidFps(0.0))
        );
        assert!(ExportOptions::new().fps(29.97).validate().is_ok());
    }

    #[test]
    fn test_from_context() {
        let context = ClipContext::video(15.0).with_threshold("fish", 0.4);
        let options = ExportOptions::from_context(&context, true);
        assert_eq!(options.fps, Some(15.0));
        assert!(options.exclude_below_threshold);
        assert!(!options.passes("fish", 0.3));
    }
}
