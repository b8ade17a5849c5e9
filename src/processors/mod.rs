//! Image processors for mask-classification segmentation models.
//!
//! - [`resize`]: aspect-ratio preserving resizing of images and instance masks
//! - [`normalization`]: per-channel normalization into CHW tensors
//! - [`padding`]: packing variable-sized images into one padded batch
//! - [`segmentation`]: semantic decoding of query predictions
//! - [`panoptic`]: merging query predictions into panoptic segment maps

pub mod normalization;
pub mod padding;
pub mod panoptic;
pub mod resize;
pub mod segmentation;
pub mod types;

pub use normalization::NormalizeImage;
pub use padding::{PackedBatch, max_by_axis, pad_images, pad_instance_masks};
pub use panoptic::{
    ClassSpec, PanopticPostProcess, PanopticPostProcessConfig, PanopticSegmentation, Segment,
    predict_queries, remove_low_and_no_objects,
};
pub use resize::{ResizeImage, get_output_size, get_size_with_aspect_ratio, resize_instance_masks};
pub use segmentation::{SemanticPostProcess, sigmoid, softmax_last_axis};
pub use types::TargetSize;
