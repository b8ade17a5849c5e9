//! The core module of the segmentation pipeline.
//!
//! This module contains the fundamental components shared by every processor:
//! - Configuration management
//! - Constants used throughout the pipeline
//! - Error handling
//! - Tensor type aliases
//! - Input validation

pub mod batch;
pub mod config;
pub mod constants;
pub mod errors;
pub mod validation;

pub use batch::{LabelMap, Mask3D, Tensor2D, Tensor3D, Tensor4D};
pub use config::{ConfigError, ConfigValidator, ConfigValidatorExt, ParallelPolicy};
pub use constants::*;
pub use errors::{ImageProcessError, PanopticError, PanopticResult, ProcessingStage};
pub use validation::{
    validate_non_empty, validate_positive_dimensions, validate_same_length,
    validate_tensor_shape,
};
