//! Inputs and outputs of [`PanopticImageProcessor`](super::PanopticImageProcessor).

use ndarray::{Array3, Array4, ArrayView3, ArrayView4, Axis};

use crate::core::errors::PanopticError;
use crate::core::{Mask3D, Tensor4D, validate_same_length, validate_tensor_shape};

/// Ground-truth instances for one training image.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    /// `(instance, height, width)` binary masks at the image's resolution.
    pub masks: Mask3D,
    /// Class index of every instance.
    pub labels: Vec<usize>,
}

impl Annotation {
    /// Creates an annotation, checking that every mask has a label.
    pub fn new(masks: Mask3D, labels: Vec<usize>) -> Result<Self, PanopticError> {
        validate_same_length(masks.len_of(Axis(0)), labels.len(), "masks", "labels")?;
        Ok(Self { masks, labels })
    }

    pub fn num_instances(&self) -> usize {
        self.labels.len()
    }
}

/// A model-ready batch.
#[derive(Debug, Clone)]
pub struct EncodedInputs {
    /// `(batch, 3, height, width)` normalized pixels, zero-padded.
    pub pixel_values: Tensor4D,
    /// `(batch, height, width)`; `true` marks real pixels.
    pub pixel_mask: Mask3D,
    /// Padded `(instance, height, width)` masks per image, when annotations were given.
    pub mask_labels: Option<Vec<Mask3D>>,
    /// Instance class indices per image, when annotations were given.
    pub class_labels: Option<Vec<Vec<usize>>>,
}

impl EncodedInputs {
    pub fn batch_size(&self) -> usize {
        self.pixel_values.len_of(Axis(0))
    }

    /// Validity mask as 0/1 integers.
    pub fn pixel_mask_i64(&self) -> Array3<i64> {
        self.pixel_mask.mapv(i64::from)
    }
}

/// Raw per-query predictions of a mask-classification model.
#[derive(Debug, Clone)]
pub struct SegmentationModelOutput {
    /// `(batch, query, num_classes + 1)`; the last column is the null class.
    pub class_queries_logits: Array3<f32>,
    /// `(batch, query, height, width)`.
    pub masks_queries_logits: Array4<f32>,
}

impl SegmentationModelOutput {
    /// Wraps model outputs after checking that batch and query axes agree.
    pub fn new(
        class_queries_logits: Array3<f32>,
        masks_queries_logits: Array4<f32>,
    ) -> Result<Self, PanopticError> {
        let (batch, queries, _) = class_queries_logits.dim();
        let (mask_batch, mask_queries, height, width) = masks_queries_logits.dim();
        validate_tensor_shape(
            &[mask_batch, mask_queries, height, width],
            &[batch, queries, height, width],
            "SegmentationModelOutput::new",
            "masks_queries_logits",
        )?;
        Ok(Self {
            class_queries_logits,
            masks_queries_logits,
        })
    }

    pub fn class_logits(&self) -> ArrayView3<'_, f32> {
        self.class_queries_logits.view()
    }

    pub fn mask_logits(&self) -> ArrayView4<'_, f32> {
        self.masks_queries_logits.view()
    }

    pub fn batch_size(&self) -> usize {
        self.class_queries_logits.len_of(Axis(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_output_shape_check() {
        assert!(
            SegmentationModelOutput::new(Array3::zeros((2, 5, 4)), Array4::zeros((2, 5, 3, 3)))
                .is_ok()
        );
        let err =
            SegmentationModelOutput::new(Array3::zeros((2, 5, 4)), Array4::zeros((2, 4, 3, 3)))
                .unwrap_err();
        assert!(matches!(err, PanopticError::TensorOperation { .. }));
        assert!(
            SegmentationModelOutput::new(Array3::zeros((1, 5, 4)), Array4::zeros((2, 5, 3, 3)))
                .is_err()
        );
    }

    #[test]
    fn test_annotation_requires_label_per_mask() {
        let masks = Mask3D::from_elem((2, 3, 3), false);
        assert!(Annotation::new(masks.clone(), vec![0]).is_err());
        assert_eq!(Annotation::new(masks, vec![0, 4]).unwrap().num_instances(), 2);
    }
}
