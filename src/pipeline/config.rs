//! Options for [`PanopticImageProcessor`](super::PanopticImageProcessor).

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::config::{ConfigError, ConfigValidator, ConfigValidatorExt, ParallelPolicy};
use crate::core::constants::{
    DEFAULT_MAX_SIZE, DEFAULT_OBJECT_MASK_THRESHOLD, DEFAULT_OVERLAP_MASK_AREA_THRESHOLD,
    IMAGE_CHANNELS, IMAGENET_MEAN, IMAGENET_STD,
};
use crate::core::errors::PanopticError;
use crate::processors::{PanopticPostProcessConfig, TargetSize};

/// Pre- and post-processing options.
///
/// Every field has a default, so partial JSON documents are accepted:
///
/// ```
/// use oar_panoptic::pipeline::ImageProcessorConfig;
///
/// let config = ImageProcessorConfig::from_json_str(r#"{"size": 512}"#).unwrap();
/// assert_eq!(config.max_size, Some(1333));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageProcessorConfig {
    /// Whether to resize images before normalization.
    pub do_resize: bool,
    /// Shortest-edge length or exact output size.
    pub size: TargetSize,
    /// Cap on the longer edge for shortest-edge resizing.
    pub max_size: Option<u32>,
    /// Whether to apply mean/std normalization. When off, pixels are only rescaled to `[0, 1]`.
    pub do_normalize: bool,
    /// Per-channel mean in RGB order.
    pub image_mean: Vec<f32>,
    /// Per-channel standard deviation in RGB order.
    pub image_std: Vec<f32>,
    /// Minimum class score for a query to survive the panoptic merge.
    pub object_mask_threshold: f32,
    /// Minimum won-to-predicted area ratio for a query to become a segment.
    pub overlap_mask_area_threshold: f32,
    /// Batch parallelism.
    pub parallel: ParallelPolicy,
}

impl Default for ImageProcessorConfig {
    fn default() -> Self {
        Self {
            do_resize: true,
            size: TargetSize::default(),
            max_size: Some(DEFAULT_MAX_SIZE),
            do_normalize: true,
            image_mean: IMAGENET_MEAN.to_vec(),
            image_std: IMAGENET_STD.to_vec(),
            object_mask_threshold: DEFAULT_OBJECT_MASK_THRESHOLD,
            overlap_mask_area_threshold: DEFAULT_OVERLAP_MASK_AREA_THRESHOLD,
            parallel: ParallelPolicy::default(),
        }
    }
}

impl ImageProcessorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_size(mut self, size: impl Into<TargetSize>) -> Self {
        self.size = size.into();
        self
    }

    pub fn with_max_size(mut self, max_size: Option<u32>) -> Self {
        self.max_size = max_size;
        self
    }

    pub fn with_resize(mut self, enabled: bool) -> Self {
        self.do_resize = enabled;
        self
    }

    pub fn with_normalize(mut self, enabled: bool) -> Self {
        self.do_normalize = enabled;
        self
    }

    pub fn with_thresholds(mut self, object_mask: f32, overlap_mask_area: f32) -> Self {
        self.object_mask_threshold = object_mask;
        self.overlap_mask_area_threshold = overlap_mask_area;
        self
    }

    pub fn with_parallel(mut self, parallel: ParallelPolicy) -> Self {
        self.parallel = parallel;
        self
    }

    /// Thresholds for the panoptic merge.
    pub fn panoptic_config(&self) -> PanopticPostProcessConfig {
        PanopticPostProcessConfig {
            object_mask_threshold: self.object_mask_threshold,
            overlap_mask_area_threshold: self.overlap_mask_area_threshold,
        }
    }

    /// Parses and validates a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, PanopticError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, PanopticError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}

impl ConfigValidator for ImageProcessorConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if !self.size.is_positive() {
            return Err(ConfigError::Invalid(format!(
                "'size' must be positive, got {:?}",
                self.size
            )));
        }
        if let Some(max_size) = self.max_size {
            Self::validate_positive_usize("max_size", max_size as usize)?;
        }

        Self::validate_len("image_mean", &self.image_mean, IMAGE_CHANNELS)?;
        Self::validate_len("image_std", &self.image_std, IMAGE_CHANNELS)?;
        if let Some(std) = self.image_std.iter().find(|&&s| s.is_nan() || s <= 0.0) {
            return Err(ConfigError::OutOfRange {
                field: "image_std".to_string(),
                range: "(0, inf)".to_string(),
                value: std.to_string(),
            });
        }

        self.panoptic_config().validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ImageProcessorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.size, TargetSize::ShortestEdge(800));
        assert_eq!(config.max_size, Some(1333));
        assert!(config.do_resize && config.do_normalize);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = ImageProcessorConfig::from_json_str(
            r#"{"size": {"width": 640, "height": 480}, "do_normalize": false}"#,
        )
        .unwrap();
        assert_eq!(config.size, TargetSize::from((640, 480)));
        assert!(!config.do_normalize);
        assert_eq!(config.image_mean, IMAGENET_MEAN.to_vec());
        assert_eq!(config.parallel, ParallelPolicy::default());
    }

    #[test]
    fn test_json_with_invalid_threshold_rejected() {
        let err = ImageProcessorConfig::from_json_str(r#"{"object_mask_threshold": 0.0}"#)
            .unwrap_err();
        assert!(matches!(err, PanopticError::ConfigError { .. }));
        assert!(err.to_string().contains("object_mask_threshold"));
    }

    #[test]
    fn test_malformed_json_rejected() {
        assert!(matches!(
            ImageProcessorConfig::from_json_str("{"),
            Err(PanopticError::Serialization(_))
        ));
    }

    #[test]
    fn test_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preprocessor.json");
        std::fs::write(
            &path,
            r#"{"size": 384, "max_size": null, "overlap_mask_area_threshold": 0.5}"#,
        )
        .unwrap();

        let config = ImageProcessorConfig::from_json_file(&path).unwrap();
        assert_eq!(config.size, TargetSize::ShortestEdge(384));
        assert_eq!(config.max_size, None);
        assert_eq!(config.overlap_mask_area_threshold, 0.5);

        assert!(matches!(
            ImageProcessorConfig::from_json_file(dir.path().join("absent.json")),
            Err(PanopticError::Io(_))
        ));
    }

    #[test]
    fn test_validation_failures() {
        let bad_std = ImageProcessorConfig {
            image_std: vec![0.2, 0.0, 0.2],
            ..Default::default()
        };
        assert!(bad_std.validate().is_err());

        let short_mean = ImageProcessorConfig {
            image_mean: vec![0.5],
            ..Default::default()
        };
        assert_eq!(
            short_mean.validate(),
            Err(ConfigError::InvalidLength {
                field: "image_mean".to_string(),
                expected: 3,
                actual: 1,
            })
        );

        assert!(ImageProcessorConfig::new().with_size(0u32).validate().is_err());
        assert!(
            ImageProcessorConfig::new()
                .with_max_size(Some(0))
                .validate()
                .is_err()
        );
        assert!(
            ImageProcessorConfig::new()
                .with_thresholds(0.8, 1.2)
                .validate()
                .is_err()
        );
    }
}
