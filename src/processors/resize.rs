//! Aspect-ratio preserving resizing for images and their instance masks.
//!
//! The output size is derived from a [`TargetSize`] and an optional cap on the
//! longer edge. Image pixels are resampled with a bilinear filter; instance
//! masks are resampled plane by plane with nearest-neighbour sampling and
//! re-binarized so their boundaries stay hard.

use image::RgbImage;
use image::imageops::{self, FilterType};
use ndarray::{Array3, ArrayView3, Axis, Zip};
use tracing::debug;

use crate::core::constants::MASK_PROBABILITY_THRESHOLD;
use crate::core::errors::{ImageProcessError, PanopticError};
use crate::core::{Mask3D, validate_positive_dimensions};
use crate::processors::types::TargetSize;

/// Computes the output `(height, width)` when matching the shorter edge to `size`.
///
/// If `max_size` is given and scaling would push the longer edge past it, the
/// short-edge target shrinks to `round(max_size * short / long)` and the long
/// edge is pinned to `max_size`. When the matching edge already equals the
/// target, the original size is returned untouched.
///
/// # Arguments
///
/// * `width` - Source width (must be positive)
/// * `height` - Source height (must be positive)
/// * `size` - Target length of the shorter edge
/// * `max_size` - Optional cap on the longer edge
///
/// # Returns
///
/// The output size as `(height, width)`.
pub fn get_size_with_aspect_ratio(
    width: u32,
    height: u32,
    size: u32,
    max_size: Option<u32>,
) -> (u32, u32) {
    let min_original = f64::from(width.min(height));
    let max_original = f64::from(width.max(height));

    let mut size = size;
    let mut capped_long_edge = None;
    if let Some(max_size) = max_size
        && max_original / min_original * f64::from(size) > f64::from(max_size)
    {
        size = ((f64::from(max_size) * min_original / max_original).round_ties_even() as u32)
            .max(1);
        capped_long_edge = Some(max_size);
    }

    if (width <= height && width == size) || (height <= width && height == size) {
        return (height, width);
    }

    let long_edge = capped_long_edge
        .unwrap_or_else(|| (f64::from(size) * max_original / min_original) as u32)
        .max(1);

    if width < height {
        (long_edge, size)
    } else {
        (size, long_edge)
    }
}

/// Computes the output `(width, height)` for an image of the given size.
///
/// Exact targets are returned verbatim; shortest-edge targets go through
/// [`get_size_with_aspect_ratio`].
pub fn get_output_size(
    width: u32,
    height: u32,
    size: TargetSize,
    max_size: Option<u32>,
) -> (u32, u32) {
    match size {
        TargetSize::Exact { width, height } => (width, height),
        TargetSize::ShortestEdge(edge) => {
            let (out_height, out_width) =
                get_size_with_aspect_ratio(width, height, edge, max_size);
            (out_width, out_height)
        }
    }
}

/// Resizes every instance plane to `(height, width)` with nearest-neighbour sampling.
///
/// Source pixels are picked with `floor(dst * in / out)` per axis. Each sampled
/// value is re-binarized at [`MASK_PROBABILITY_THRESHOLD`]; the instance axis is
/// left untouched.
pub fn resize_instance_masks(
    masks: ArrayView3<bool>,
    height: usize,
    width: usize,
) -> Result<Mask3D, PanopticError> {
    let (instances, src_height, src_width) = masks.dim();
    if height == 0 || width == 0 {
        return Err(ImageProcessError::InvalidTargetSize {
            width: width as u32,
            height: height as u32,
        }
        .into());
    }
    if instances > 0 && (src_height == 0 || src_width == 0) {
        return Err(ImageProcessError::EmptySource {
            width: src_width,
            height: src_height,
        }
        .into());
    }

    let row_index = nearest_indices(src_height, height);
    let col_index = nearest_indices(src_width, width);

    let mut resized = Array3::from_elem((instances, height, width), false);
    Zip::from(resized.axis_iter_mut(Axis(0)))
        .and(masks.axis_iter(Axis(0)))
        .for_each(|mut dst, src| {
            for ((y, x), value) in dst.indexed_iter_mut() {
                let probability = if src[[row_index[y], col_index[x]]] {
                    1.0
                } else {
                    0.0
                };
                *value = probability > MASK_PROBABILITY_THRESHOLD;
            }
        });

    Ok(resized)
}

fn nearest_indices(src_len: usize, dst_len: usize) -> Vec<usize> {
    let scale = src_len as f64 / dst_len as f64;
    (0..dst_len)
        .map(|dst| ((dst as f64 * scale).floor() as usize).min(src_len.saturating_sub(1)))
        .collect()
}

/// Resizes images (and optionally their instance masks) to a target size.
#[derive(Debug, Clone)]
pub struct ResizeImage {
    /// Target size for the shorter edge or the exact output size.
    pub size: TargetSize,
    /// Optional cap on the longer edge; ignored for exact targets.
    pub max_size: Option<u32>,
    /// Resampling filter used for image pixels.
    pub filter: FilterType,
}

impl ResizeImage {
    /// Creates a resizer with a bilinear filter.
    pub fn new(size: TargetSize, max_size: Option<u32>) -> Self {
        Self {
            size,
            max_size,
            filter: FilterType::Triangle,
        }
    }

    /// Overrides the resampling filter used for image pixels.
    pub fn with_filter(mut self, filter: FilterType) -> Self {
        self.filter = filter;
        self
    }

    /// Computes the output `(width, height)` for a source of the given size.
    pub fn target_size(&self, width: u32, height: u32) -> Result<(u32, u32), PanopticError> {
        validate_positive_dimensions(width as usize, height as usize, "resize source")?;
        let (out_width, out_height) = get_output_size(width, height, self.size, self.max_size);
        if out_width == 0 || out_height == 0 {
            return Err(ImageProcessError::InvalidTargetSize {
                width: out_width,
                height: out_height,
            }
            .into());
        }
        Ok((out_width, out_height))
    }

    /// Resizes a single image.
    ///
    /// Images already at the target size are returned without resampling.
    pub fn apply(&self, image: RgbImage) -> Result<RgbImage, PanopticError> {
        let (width, height) = image.dimensions();
        let (out_width, out_height) = self.target_size(width, height)?;
        if (out_width, out_height) == (width, height) {
            return Ok(image);
        }

        debug!(
            "ResizeImage: {}x{} -> {}x{}",
            width, height, out_width, out_height
        );
        Ok(imageops::resize(&image, out_width, out_height, self.filter))
    }

    /// Resizes an image together with its `(instance, height, width)` masks.
    ///
    /// The masks must share the image's spatial size.
    pub fn apply_with_masks(
        &self,
        image: RgbImage,
        masks: &Mask3D,
    ) -> Result<(RgbImage, Mask3D), PanopticError> {
        let (width, height) = image.dimensions();
        let (_, mask_height, mask_width) = masks.dim();
        if (mask_width, mask_height) != (width as usize, height as usize) {
            return Err(PanopticError::shape_mismatch(
                "resize_instance_masks",
                &[height as usize, width as usize],
                &[mask_height, mask_width],
                "instance masks must match their image",
            ));
        }

        let resized = self.apply(image)?;
        let (out_width, out_height) = resized.dimensions();
        let masks = resize_instance_masks(masks.view(), out_height as usize, out_width as usize)?;
        Ok((resized, masks))
    }
}
