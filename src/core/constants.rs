//! Constants used throughout the segmentation pipeline.

/// Default target length of the shorter image edge.
pub const DEFAULT_SHORTEST_EDGE: u32 = 800;

/// Default cap on the longer image edge after resizing.
pub const DEFAULT_MAX_SIZE: u32 = 1333;

/// Default rescale factor applied before normalization.
pub const DEFAULT_RESCALE_FACTOR: f32 = 1.0 / 255.0;

/// ImageNet per-channel mean in RGB order.
pub const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];

/// ImageNet per-channel standard deviation in RGB order.
pub const IMAGENET_STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Number of channels in every image handled by the pipeline.
pub const IMAGE_CHANNELS: usize = 3;

/// Default minimum class score for a query to survive filtering.
pub const DEFAULT_OBJECT_MASK_THRESHOLD: f32 = 0.8;

/// Default minimum ratio of won pixels to predicted support for a query to be kept.
pub const DEFAULT_OVERLAP_MASK_AREA_THRESHOLD: f32 = 0.8;

/// Probability at or above which a mask pixel counts as part of the query's support.
pub const MASK_PROBABILITY_THRESHOLD: f32 = 0.5;
