//! Tensor type aliases shared by the processors.

use ndarray::{Array2, Array3, Array4};

/// A 2D tensor of f32 values, e.g. `(query, class)` logits.
pub type Tensor2D = Array2<f32>;
/// A 3D tensor of f32 values, e.g. a `(channel, height, width)` image.
pub type Tensor3D = Array3<f32>;
/// A 4D tensor of f32 values, e.g. a `(batch, channel, height, width)` batch.
pub type Tensor4D = Array4<f32>;

/// A 3D boolean mask, `(instance, height, width)` or `(batch, height, width)`.
pub type Mask3D = Array3<bool>;

/// A 2D integer label map `(height, width)`.
pub type LabelMap = Array2<i32>;
