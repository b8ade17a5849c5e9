//! Error handling for the segmentation pipeline.

mod types;

pub use types::{ImageProcessError, PanopticError, PanopticResult, ProcessingStage};
