//! High-level pipeline around the individual processors.
//!
//! [`PanopticImageProcessor`] turns a list of images (and optional training
//! annotations) into a padded model batch, and turns the model's per-query
//! logits back into semantic heat-maps or panoptic segmentations.

pub mod config;
pub mod processor;
pub mod types;

pub use config::ImageProcessorConfig;
pub use processor::PanopticImageProcessor;
pub use types::{Annotation, EncodedInputs, SegmentationModelOutput};
