//! End-to-end batch preparation and post-processing.

use image::RgbImage;
use ndarray::Axis;
use rayon::prelude::*;
use tracing::debug;

use crate::core::config::ConfigValidator;
use crate::core::constants::DEFAULT_RESCALE_FACTOR;
use crate::core::errors::PanopticError;
use crate::core::{
    Tensor3D, Tensor4D, validate_non_empty, validate_positive_dimensions, validate_same_length,
};
use crate::pipeline::config::ImageProcessorConfig;
use crate::pipeline::types::{Annotation, EncodedInputs, SegmentationModelOutput};
use crate::processors::{
    ClassSpec, NormalizeImage, PanopticPostProcess, PanopticSegmentation, ResizeImage,
    SemanticPostProcess, pad_images, pad_instance_masks,
};

/// Prepares image batches for a mask-classification model and decodes its output.
///
/// # Example
///
/// ```
/// use image::{Rgb, RgbImage};
/// use oar_panoptic::pipeline::{ImageProcessorConfig, PanopticImageProcessor};
///
/// let config = ImageProcessorConfig::new().with_size(32u32);
/// let processor = PanopticImageProcessor::new(config).unwrap();
/// let images = vec![
///     RgbImage::from_pixel(64, 48, Rgb([120, 30, 200])),
///     RgbImage::from_pixel(40, 40, Rgb([0, 0, 0])),
/// ];
/// let inputs = processor.preprocess(images, None).unwrap();
/// assert_eq!(inputs.pixel_values.shape(), &[2, 3, 32, 42]);
/// ```
#[derive(Debug, Clone)]
pub struct PanopticImageProcessor {
    config: ImageProcessorConfig,
    resizer: ResizeImage,
    normalizer: NormalizeImage,
    semantic: SemanticPostProcess,
    panoptic: PanopticPostProcess,
}

impl PanopticImageProcessor {
    /// Builds a processor, validating the configuration first.
    pub fn new(config: ImageProcessorConfig) -> Result<Self, PanopticError> {
        config.validate()?;

        let resizer = ResizeImage::new(config.size, config.max_size);
        let normalizer = if config.do_normalize {
            NormalizeImage::new(
                Some(DEFAULT_RESCALE_FACTOR),
                Some(config.image_mean.clone()),
                Some(config.image_std.clone()),
            )?
        } else {
            NormalizeImage::rescale_only()?
        };
        let semantic = SemanticPostProcess::new(config.parallel.clone());
        let panoptic = PanopticPostProcess::new(config.panoptic_config(), config.parallel.clone())?;

        Ok(Self {
            config,
            resizer,
            normalizer,
            semantic,
            panoptic,
        })
    }

    pub fn config(&self) -> &ImageProcessorConfig {
        &self.config
    }

    /// Resizes, normalizes and pads a batch of images.
    ///
    /// Annotations, when given, must have one entry per image with masks at the
    /// image's resolution. They are resized alongside their image and padded to
    /// the same canvas.
    ///
    /// # Errors
    ///
    /// Fails on an empty batch, an annotation count that differs from the image
    /// count, zero-sized images, or masks that do not match their image.
    pub fn preprocess(
        &self,
        images: Vec<RgbImage>,
        annotations: Option<Vec<Annotation>>,
    ) -> Result<EncodedInputs, PanopticError> {
        validate_non_empty(&images, "preprocess")?;
        let batch_size = images.len();

        let items: Vec<(RgbImage, Option<Annotation>)> = match annotations {
            Some(annotations) => {
                validate_same_length(batch_size, annotations.len(), "images", "annotations")?;
                images
                    .into_iter()
                    .zip(annotations.into_iter().map(Some))
                    .collect()
            }
            None => images.into_iter().map(|image| (image, None)).collect(),
        };
        let annotated = items.iter().any(|(_, annotation)| annotation.is_some());

        let prepared: Vec<(Tensor3D, Option<Annotation>)> =
            if self.config.parallel.should_parallelize(batch_size) {
                items
                    .into_par_iter()
                    .map(|(image, annotation)| self.prepare(image, annotation))
                    .collect::<Result<_, _>>()?
            } else {
                items
                    .into_iter()
                    .map(|(image, annotation)| self.prepare(image, annotation))
                    .collect::<Result<_, _>>()?
            };

        let (pixels, annotations): (Vec<Tensor3D>, Vec<Option<Annotation>>) =
            prepared.into_iter().unzip();
        let batch = pad_images(&pixels, &self.config.parallel)?;
        let (height, width) = batch.canvas_size();

        let (mask_labels, class_labels) = if annotated {
            let mut mask_labels = Vec::with_capacity(batch_size);
            let mut class_labels = Vec::with_capacity(batch_size);
            for annotation in annotations.into_iter().flatten() {
                mask_labels.push(pad_instance_masks(&annotation.masks, height, width)?);
                class_labels.push(annotation.labels);
            }
            (Some(mask_labels), Some(class_labels))
        } else {
            (None, None)
        };

        debug!(
            "preprocess: {} images -> canvas {}x{}",
            batch_size, height, width
        );

        Ok(EncodedInputs {
            pixel_values: batch.pixel_values,
            pixel_mask: batch.pixel_mask,
            mask_labels,
            class_labels,
        })
    }

    fn prepare(
        &self,
        image: RgbImage,
        annotation: Option<Annotation>,
    ) -> Result<(Tensor3D, Option<Annotation>), PanopticError> {
        let (width, height) = image.dimensions();
        validate_positive_dimensions(width as usize, height as usize, "preprocess")?;

        let (image, annotation) = match annotation {
            Some(annotation) => {
                validate_same_length(
                    annotation.masks.len_of(Axis(0)),
                    annotation.labels.len(),
                    "masks",
                    "labels",
                )?;
                if self.config.do_resize {
                    let (image, masks) = self.resizer.apply_with_masks(image, &annotation.masks)?;
                    (
                        image,
                        Some(Annotation {
                            masks,
                            labels: annotation.labels,
                        }),
                    )
                } else {
                    let (_, mask_height, mask_width) = annotation.masks.dim();
                    if (mask_height, mask_width) != (height as usize, width as usize) {
                        return Err(PanopticError::shape_mismatch(
                            "preprocess",
                            &[height as usize, width as usize],
                            &[mask_height, mask_width],
                            "instance masks must match their image",
                        ));
                    }
                    (image, Some(annotation))
                }
            }
            None if self.config.do_resize => (self.resizer.apply(image)?, None),
            None => (image, None),
        };

        Ok((self.normalizer.normalize(&image), annotation))
    }

    /// Decodes model output into `(batch, num_classes, height, width)` heat-maps.
    pub fn post_process_segmentation(
        &self,
        outputs: &SegmentationModelOutput,
    ) -> Result<Tensor4D, PanopticError> {
        self.semantic
            .apply(outputs.class_logits(), outputs.mask_logits())
    }

    /// Merges model output into one panoptic segmentation per image.
    pub fn post_process_panoptic_segmentation(
        &self,
        outputs: &SegmentationModelOutput,
        class_specs: &[ClassSpec],
    ) -> Result<Vec<PanopticSegmentation>, PanopticError> {
        self.panoptic
            .apply(outputs.class_logits(), outputs.mask_logits(), class_specs)
    }
}
