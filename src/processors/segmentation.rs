//! Semantic decoding of per-query class and mask predictions.
//!
//! A mask-classification model predicts, for every query, a distribution over
//! classes (plus a trailing "no object" class) and a soft mask. The dense
//! semantic heat-map is the query-weighted superposition of those masks:
//!
//! `out[c, h, w] = sum_q softmax(class_logits)[q, c] * sigmoid(mask_logits)[q, h, w]`

use ndarray::{ArrayView2, ArrayView3, ArrayView4, Axis, s};
use rayon::prelude::*;
use tracing::debug;

use crate::core::config::ParallelPolicy;
use crate::core::{PanopticError, ProcessingStage, Tensor2D, Tensor3D, Tensor4D};

/// Logistic sigmoid.
#[inline]
pub fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Row-wise softmax over the last axis of a `(query, class)` array.
///
/// Each row is shifted by its maximum before exponentiation.
pub fn softmax_last_axis(logits: ArrayView2<f32>) -> Tensor2D {
    let mut probs = logits.to_owned();
    for mut row in probs.rows_mut() {
        let max = row.fold(f32::NEG_INFINITY, |acc, &v| acc.max(v));
        row.mapv_inplace(|v| (v - max).exp());
        let sum = row.sum();
        if sum > 0.0 {
            row.mapv_inplace(|v| v / sum);
        }
    }
    probs
}

/// Decodes model outputs into dense per-class heat-maps.
#[derive(Debug, Clone, Default)]
pub struct SemanticPostProcess {
    /// Controls parallelism across the batch.
    pub parallel: ParallelPolicy,
}

impl SemanticPostProcess {
    /// Creates a decoder with the given parallel policy.
    pub fn new(parallel: ParallelPolicy) -> Self {
        Self { parallel }
    }

    /// Decodes a batch.
    ///
    /// # Arguments
    ///
    /// * `class_logits` - `(batch, query, num_classes + 1)` raw class scores
    /// * `mask_logits` - `(batch, query, height, width)` raw mask scores
    ///
    /// # Returns
    ///
    /// A `(batch, num_classes, height, width)` tensor.
    pub fn apply(
        &self,
        class_logits: ArrayView3<f32>,
        mask_logits: ArrayView4<f32>,
    ) -> Result<Tensor4D, PanopticError> {
        let batch_size = class_logits.len_of(Axis(0));
        if mask_logits.len_of(Axis(0)) != batch_size {
            return Err(PanopticError::shape_mismatch(
                "semantic_segmentation",
                &[batch_size],
                &[mask_logits.len_of(Axis(0))],
                "batch size of mask logits",
            ));
        }

        let per_image: Vec<Tensor3D> = if self.parallel.should_parallelize(batch_size) {
            (0..batch_size)
                .into_par_iter()
                .map(|idx| {
                    self.process(
                        class_logits.index_axis(Axis(0), idx),
                        mask_logits.index_axis(Axis(0), idx),
                    )
                })
                .collect::<Result<_, _>>()?
        } else {
            class_logits
                .outer_iter()
                .zip(mask_logits.outer_iter())
                .map(|(classes, masks)| self.process(classes, masks))
                .collect::<Result<_, _>>()?
        };

        if per_image.is_empty() {
            let (_, _, height, width) = mask_logits.dim();
            let num_classes = class_logits.len_of(Axis(2)).saturating_sub(1);
            return Ok(Tensor4D::zeros((0, num_classes, height, width)));
        }

        let views: Vec<_> = per_image.iter().map(|t| t.view()).collect();
        ndarray::stack(Axis(0), &views).map_err(|e| {
            PanopticError::processing(
                ProcessingStage::PostProcessing,
                "stacking decoded images",
                e,
            )
        })
    }

    /// Decodes a single image.
    ///
    /// # Arguments
    ///
    /// * `class_logits` - `(query, num_classes + 1)` raw class scores
    /// * `mask_logits` - `(query, height, width)` raw mask scores
    ///
    /// # Returns
    ///
    /// A `(num_classes, height, width)` tensor of non-negative weights.
    pub fn process(
        &self,
        class_logits: ArrayView2<f32>,
        mask_logits: ArrayView3<f32>,
    ) -> Result<Tensor3D, PanopticError> {
        let (num_queries, num_classes_with_null) = class_logits.dim();
        let (mask_queries, height, width) = mask_logits.dim();
        if num_queries != mask_queries {
            return Err(PanopticError::shape_mismatch(
                "semantic_segmentation",
                &[num_queries, height, width],
                &[mask_queries, height, width],
                "query count of mask logits",
            ));
        }
        if num_classes_with_null == 0 {
            return Err(PanopticError::invalid_input(
                "class logits must include the null class column",
            ));
        }
        let num_classes = num_classes_with_null - 1;

        let class_probs = softmax_last_axis(class_logits);
        let class_probs = class_probs.slice(s![.., ..num_classes]);

        let mask_probs = mask_logits.mapv(sigmoid);
        let mask_probs = mask_probs
            .to_shape((num_queries, height * width))
            .map_err(|e| {
                PanopticError::tensor_operation_error(
                    "semantic_segmentation",
                    &[num_queries, height * width],
                    &[mask_queries, height, width],
                    "flattening mask probabilities",
                    e,
                )
            })?;

        debug!(
            "SemanticPostProcess: {} queries, {} classes, {}x{}",
            num_queries, num_classes, height, width
        );

        let segmentation = class_probs.t().dot(&mask_probs);
        Ok(segmentation
            .to_shape((num_classes, height, width))?
            .into_owned())
    }
}
