//! Configuration management for the segmentation pipeline.
//!
//! This module provides the validation traits and shared configuration types
//! used by the processors and the high-level image processor.

pub mod errors;
pub mod parallel;

pub use errors::{ConfigError, ConfigValidator, ConfigValidatorExt};
pub use parallel::ParallelPolicy;
