//! Batch padding of heterogeneously sized images and masks.
//!
//! Every item is copied into the top-left corner of a zero-filled canvas whose
//! size is the per-axis maximum over the batch. A validity mask records which
//! canvas cells hold real pixels.

use ndarray::parallel::prelude::*;
use ndarray::{Array3, ArrayViewMut2, ArrayViewMut3, Axis, s};
use tracing::debug;

use crate::core::config::ParallelPolicy;
use crate::core::{Mask3D, PanopticError, Tensor3D, Tensor4D, validate_non_empty};

/// Returns the element-wise maximum over a list of shapes.
///
/// Returns `None` for an empty list.
pub fn max_by_axis<const N: usize>(shapes: &[[usize; N]]) -> Option<[usize; N]> {
    let (first, rest) = shapes.split_first()?;
    let mut maxes = *first;
    for shape in rest {
        for (max, &dim) in maxes.iter_mut().zip(shape) {
            *max = (*max).max(dim);
        }
    }
    Some(maxes)
}

/// A batch of images padded to a common canvas.
#[derive(Debug, Clone)]
pub struct PackedBatch {
    /// Padded pixel values with shape `(batch, channel, max_height, max_width)`.
    pub pixel_values: Tensor4D,
    /// Validity mask with shape `(batch, max_height, max_width)`; `true` marks real pixels.
    pub pixel_mask: Mask3D,
}

impl PackedBatch {
    /// Number of items in the batch.
    pub fn batch_size(&self) -> usize {
        self.pixel_values.shape()[0]
    }

    /// Canvas size as `(height, width)`.
    pub fn canvas_size(&self) -> (usize, usize) {
        let (_, height, width) = self.pixel_mask.dim();
        (height, width)
    }

    /// Validity mask as 0/1 integers, the layout models usually take as input.
    pub fn pixel_mask_i64(&self) -> Array3<i64> {
        self.pixel_mask.mapv(i64::from)
    }
}

/// Pads `(channel, height, width)` images to a common canvas.
///
/// # Errors
///
/// Returns an error if the batch is empty or the images disagree on channel count.
pub fn pad_images(
    images: &[Tensor3D],
    policy: &ParallelPolicy,
) -> Result<PackedBatch, PanopticError> {
    validate_non_empty(images, "pad_images")?;

    let shapes: Vec<[usize; 3]> = images.iter().map(|img| img.dim().into()).collect();
    let channels = shapes[0][0];
    if let Some((idx, shape)) = shapes.iter().enumerate().find(|(_, s)| s[0] != channels) {
        return Err(PanopticError::shape_mismatch(
            "pad_images",
            &[channels],
            &[shape[0]],
            &format!("channel count of image {idx}"),
        ));
    }

    let [channels, height, width] =
        max_by_axis(&shapes).ok_or_else(|| PanopticError::invalid_input("empty batch"))?;
    let batch_size = images.len();
    debug!(
        "pad_images: {} images -> canvas {}x{}x{}",
        batch_size, channels, height, width
    );

    let mut pixel_values = Tensor4D::zeros((batch_size, channels, height, width));
    let mut pixel_mask = Mask3D::from_elem((batch_size, height, width), false);

    if policy.should_parallelize(batch_size) {
        pixel_values
            .axis_iter_mut(Axis(0))
            .into_par_iter()
            .zip(pixel_mask.axis_iter_mut(Axis(0)).into_par_iter())
            .zip(images.par_iter())
            .for_each(|(slot, image)| copy_into_slot(slot, image));
    } else {
        pixel_values
            .axis_iter_mut(Axis(0))
            .zip(pixel_mask.axis_iter_mut(Axis(0)))
            .zip(images.iter())
            .for_each(|(slot, image)| copy_into_slot(slot, image));
    }

    Ok(PackedBatch {
        pixel_values,
        pixel_mask,
    })
}

fn copy_into_slot(
    (mut canvas, mut valid): (ArrayViewMut3<f32>, ArrayViewMut2<bool>),
    image: &Tensor3D,
) {
    let (c, h, w) = image.dim();
    canvas.slice_mut(s![..c, ..h, ..w]).assign(image);
    valid.slice_mut(s![..h, ..w]).fill(true);
}

/// Pads `(instance, height, width)` masks to a `(height, width)` canvas.
///
/// Each instance plane is padded independently; the instance count is kept.
///
/// # Errors
///
/// Returns an error if the masks are larger than the canvas.
pub fn pad_instance_masks(
    masks: &Mask3D,
    height: usize,
    width: usize,
) -> Result<Mask3D, PanopticError> {
    let (instances, mask_height, mask_width) = masks.dim();
    if mask_height > height || mask_width > width {
        return Err(PanopticError::shape_mismatch(
            "pad_instance_masks",
            &[instances, height, width],
            &[instances, mask_height, mask_width],
            "masks exceed the padded canvas",
        ));
    }

    let mut padded = Mask3D::from_elem((instances, height, width), false);
    padded
        .slice_mut(s![.., ..mask_height, ..mask_width])
        .assign(masks);
    Ok(padded)
}
