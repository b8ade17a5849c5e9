//! # OAR Panoptic
//!
//! Batch preparation and post-processing for mask-classification segmentation
//! models (MaskFormer-style networks that predict a class and a mask per query).
//!
//! The crate covers everything around the model itself:
//!
//! - aspect-ratio preserving resizing with a cap on the long edge
//! - ImageNet-style normalization into CHW tensors
//! - padding heterogeneous images into one batch with a validity mask
//! - semantic decoding of query predictions into per-class heat-maps
//! - panoptic merging into one labelled map plus a segment list per image
//!
//! # Quick start
//!
//! ```
//! use image::RgbImage;
//! use ndarray::{Array3, Array4};
//! use oar_panoptic::prelude::*;
//!
//! let processor = PanopticImageProcessor::new(ImageProcessorConfig::default())?;
//! let inputs = processor.preprocess(vec![RgbImage::new(640, 480)], None)?;
//! assert_eq!(inputs.pixel_values.shape(), &[1, 3, 800, 1066]);
//!
//! // run the model on `inputs.pixel_values`, then:
//! let outputs = SegmentationModelOutput::new(
//!     Array3::zeros((1, 100, 3)),
//!     Array4::zeros((1, 100, 8, 8)),
//! )?;
//! let classes = [ClassSpec::stuff("sky"), ClassSpec::thing("cat")];
//! let panoptic = processor.post_process_panoptic_segmentation(&outputs, &classes)?;
//! assert!(panoptic[0].segments.is_empty());
//! # Ok::<(), oar_panoptic::core::PanopticError>(())
//! ```
//!
//! # Modules
//!
//! * [`core`] - errors, configuration, constants and validation helpers
//! * [`processors`] - the individual resize, normalize, pad and decode steps
//! * [`pipeline`] - [`pipeline::PanopticImageProcessor`] tying the steps together
//! * [`utils`] - image loading and logging setup

pub mod core;
pub mod pipeline;
pub mod processors;
pub mod utils;

/// Commonly used types.
pub mod prelude {
    pub use crate::core::config::{ConfigValidator, ParallelPolicy};
    pub use crate::core::errors::{PanopticError, PanopticResult};
    pub use crate::pipeline::{
        Annotation, EncodedInputs, ImageProcessorConfig, PanopticImageProcessor,
        SegmentationModelOutput,
    };
    pub use crate::processors::{
        ClassSpec, PanopticPostProcess, PanopticPostProcessConfig, PanopticSegmentation, Segment,
        SemanticPostProcess, TargetSize,
    };
    pub use crate::utils::{init_tracing, load_image};
}
