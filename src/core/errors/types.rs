//! Core error types for the segmentation pipeline.
//!
//! This module defines the error types shared by every stage of the pipeline,
//! from resizing and padding to panoptic post-processing.

use thiserror::Error;

/// Errors that can occur while resampling images or masks.
#[derive(Debug, Error)]
pub enum ImageProcessError {
    /// The requested output size has a zero dimension.
    #[error("Invalid target size ({width}, {height})")]
    InvalidTargetSize {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },
    /// The source image or mask has a zero dimension.
    #[error("Empty source ({width}, {height})")]
    EmptySource {
        /// Source width.
        width: usize,
        /// Source height.
        height: usize,
    },
}

/// Enum representing different stages of processing in the pipeline.
///
/// Used to identify which stage an error occurred in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProcessingStage {
    /// Error occurred during image or mask resizing.
    Resize,
    /// Error occurred during semantic or panoptic post-processing.
    PostProcessing,
}

impl std::fmt::Display for ProcessingStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessingStage::Resize => write!(f, "resize"),
            ProcessingStage::PostProcessing => write!(f, "post-processing"),
        }
    }
}

/// Enum representing the errors that can occur in the pipeline.
#[derive(Error, Debug)]
pub enum PanopticError {
    /// Error occurred while loading an image.
    #[error("image load")]
    ImageLoad(#[source] image::ImageError),

    /// Error occurred during processing.
    #[error("{kind} failed: {context}")]
    Processing {
        /// The stage of processing where the error occurred.
        kind: ProcessingStage,
        /// Additional context about the error.
        context: String,
        /// The underlying error that caused this error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Error indicating invalid input.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// A message describing the invalid input.
        message: String,
    },

    /// Error indicating a configuration problem.
    #[error("configuration: {message}")]
    ConfigError {
        /// A message describing the configuration error.
        message: String,
    },

    /// Error from tensor operations with detailed context.
    #[error(
        "tensor operation '{operation}' failed: expected shape {expected_shape:?}, got {actual_shape:?} in {context}"
    )]
    TensorOperation {
        /// The tensor operation that failed.
        operation: String,
        /// The expected tensor shape.
        expected_shape: Vec<usize>,
        /// The actual tensor shape.
        actual_shape: Vec<usize>,
        /// Additional context about where the error occurred.
        context: String,
        /// The underlying error that caused this error.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Error from basic tensor operations (fallback for ndarray errors).
    #[error("tensor operation")]
    Tensor(#[from] ndarray::ShapeError),

    /// IO error.
    #[error("io")]
    Io(#[from] std::io::Error),

    /// Error while (de)serializing configuration or results.
    #[error("serialization")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience alias for results produced by this crate.
pub type PanopticResult<T> = Result<T, PanopticError>;

impl From<image::ImageError> for PanopticError {
    fn from(error: image::ImageError) -> Self {
        Self::ImageLoad(error)
    }
}

impl From<crate::core::config::ConfigError> for PanopticError {
    fn from(error: crate::core::config::ConfigError) -> Self {
        Self::ConfigError {
            message: error.to_string(),
        }
    }
}

impl From<ImageProcessError> for PanopticError {
    fn from(error: ImageProcessError) -> Self {
        Self::Processing {
            kind: ProcessingStage::Resize,
            context: "Image processing failed".to_string(),
            source: Box::new(error),
        }
    }
}

impl PanopticError {
    /// Creates an invalid input error from a message.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Creates a shape mismatch error without an underlying source.
    ///
    /// # Arguments
    ///
    /// * `operation` - The operation that detected the mismatch
    /// * `expected` - The shape the operation expected
    /// * `actual` - The shape it received
    /// * `context` - Where the mismatch was detected
    pub fn shape_mismatch(
        operation: impl Into<String>,
        expected: &[usize],
        actual: &[usize],
        context: impl Into<String>,
    ) -> Self {
        Self::TensorOperation {
            operation: operation.into(),
            expected_shape: expected.to_vec(),
            actual_shape: actual.to_vec(),
            context: context.into(),
            source: None,
        }
    }

    /// Wraps an ndarray shape error with the shapes involved.
    pub fn tensor_operation_error(
        operation: &str,
        expected: &[usize],
        actual: &[usize],
        context: &str,
        error: ndarray::ShapeError,
    ) -> Self {
        Self::TensorOperation {
            operation: operation.to_string(),
            expected_shape: expected.to_vec(),
            actual_shape: actual.to_vec(),
            context: context.to_string(),
            source: Some(Box::new(error)),
        }
    }

    /// Wraps an error raised in a particular processing stage.
    pub fn processing(
        kind: ProcessingStage,
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Processing {
            kind,
            context: context.into(),
            source: Box::new(source),
        }
    }

    /// Creates a configuration error for invalid field values.
    ///
    /// # Arguments
    ///
    /// * `field` - The name of the field with an invalid value
    /// * `expected` - Description of what was expected
    /// * `actual` - Description of what was actually provided
    pub fn invalid_field(
        field: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::ConfigError {
            message: format!(
                "invalid value for field '{}': expected {}, got {}",
                field.into(),
                expected.into(),
                actual.into()
            ),
        }
    }
}
