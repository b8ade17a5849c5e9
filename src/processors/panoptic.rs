//! Panoptic merging of query predictions into a labelled segment map.
//!
//! Every query carries a class distribution and a soft mask. Queries predicting
//! the null class or scoring at or below `object_mask_threshold` are dropped.
//! The survivors compete per pixel on `sigmoid(mask) * score`, and a survivor
//! becomes a segment only if it keeps enough of its own predicted support.
//! Stuff classes collapse into a single segment per image.

use std::collections::HashMap;

use ndarray::{Array2, Array3, ArrayView2, ArrayView3, ArrayView4, Axis, Zip};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::core::config::{ConfigError, ConfigValidator, ConfigValidatorExt, ParallelPolicy};
use crate::core::constants::{
    DEFAULT_OBJECT_MASK_THRESHOLD, DEFAULT_OVERLAP_MASK_AREA_THRESHOLD,
    MASK_PROBABILITY_THRESHOLD,
};
use crate::core::{LabelMap, PanopticError, validate_same_length};
use crate::processors::segmentation::{sigmoid, softmax_last_axis};

/// Static description of one real class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassSpec {
    /// Countable objects are things; amorphous regions are stuff.
    pub is_thing: bool,
    /// Human readable class name.
    pub label: String,
}

impl ClassSpec {
    /// A countable class; every accepted query yields its own segment.
    pub fn thing(label: impl Into<String>) -> Self {
        Self {
            is_thing: true,
            label: label.into(),
        }
    }

    /// An amorphous class; accepted queries merge into one segment per image.
    pub fn stuff(label: impl Into<String>) -> Self {
        Self {
            is_thing: false,
            label: label.into(),
        }
    }

    pub fn is_stuff(&self) -> bool {
        !self.is_thing
    }
}

/// One labelled region of a [`PanopticSegmentation`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    /// Positive id, unique within the image; matches the map cells it covers.
    pub id: u32,
    /// Index into the class list.
    pub category_id: usize,
    pub is_thing: bool,
    pub label: String,
}

/// Result of merging one image.
#[derive(Debug, Clone, PartialEq)]
pub struct PanopticSegmentation {
    /// `(height, width)` map; 0 marks unlabelled pixels, anything else a [`Segment::id`].
    pub segmentation: LabelMap,
    /// Segments in creation order.
    pub segments: Vec<Segment>,
}

impl PanopticSegmentation {
    /// An all-zero map with no segments.
    pub fn empty(height: usize, width: usize) -> Self {
        Self {
            segmentation: LabelMap::zeros((height, width)),
            segments: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Looks up a segment by id.
    pub fn segment(&self, id: u32) -> Option<&Segment> {
        self.segments.iter().find(|segment| segment.id == id)
    }

    /// Number of map cells labelled with `id`.
    pub fn area(&self, id: u32) -> usize {
        let id = id as i32;
        self.segmentation.iter().filter(|&&cell| cell == id).count()
    }
}

/// Thresholds for the panoptic merge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanopticPostProcessConfig {
    /// Queries whose top class probability is at or below this are dropped.
    pub object_mask_threshold: f32,
    /// Minimum share of a query's own support it must win to become a segment.
    pub overlap_mask_area_threshold: f32,
}

impl Default for PanopticPostProcessConfig {
    fn default() -> Self {
        Self {
            object_mask_threshold: DEFAULT_OBJECT_MASK_THRESHOLD,
            overlap_mask_area_threshold: DEFAULT_OVERLAP_MASK_AREA_THRESHOLD,
        }
    }
}

impl ConfigValidator for PanopticPostProcessConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        Self::validate_left_open_range(
            "object_mask_threshold",
            self.object_mask_threshold,
            0.0,
            1.0,
        )?;
        Self::validate_left_open_range(
            "overlap_mask_area_threshold",
            self.overlap_mask_area_threshold,
            0.0,
            1.0,
        )
    }
}

/// Returns the predicted class and its probability for every query.
///
/// Ties resolve to the lowest class index.
pub fn predict_queries(class_logits: ArrayView2<f32>) -> (Vec<f32>, Vec<usize>) {
    let probs = softmax_last_axis(class_logits);
    probs
        .rows()
        .into_iter()
        .map(|row| {
            let mut best = (f32::NEG_INFINITY, 0usize);
            for (class, &p) in row.iter().enumerate() {
                if p > best.0 {
                    best = (p, class);
                }
            }
            best
        })
        .unzip()
}

/// Drops queries that predict the null class or score at or below the threshold.
///
/// `num_labels` is the number of real classes, so the null class index equals it.
///
/// # Returns
///
/// The surviving masks, scores and labels, in their original order.
///
/// # Errors
///
/// Returns an error if the three inputs disagree on the query count.
pub fn remove_low_and_no_objects(
    masks: ArrayView3<f32>,
    scores: &[f32],
    labels: &[usize],
    object_mask_threshold: f32,
    num_labels: usize,
) -> Result<(Array3<f32>, Vec<f32>, Vec<usize>), PanopticError> {
    let num_masks = masks.len_of(Axis(0));
    validate_same_length(num_masks, scores.len(), "masks", "scores")?;
    validate_same_length(num_masks, labels.len(), "masks", "labels")?;

    let keep: Vec<usize> = labels
        .iter()
        .zip(scores)
        .enumerate()
        .filter(|&(_, (&label, &score))| label != num_labels && score > object_mask_threshold)
        .map(|(idx, _)| idx)
        .collect();

    let kept_masks = masks.select(Axis(0), &keep);
    let kept_scores = keep.iter().map(|&idx| scores[idx]).collect();
    let kept_labels = keep.iter().map(|&idx| labels[idx]).collect();
    Ok((kept_masks, kept_scores, kept_labels))
}

/// Per-image merge state. Created and dropped inside one merge call.
struct SegmentAccumulator<'a> {
    class_specs: &'a [ClassSpec],
    segmentation: LabelMap,
    segments: Vec<Segment>,
    stuff_memory: HashMap<usize, u32>,
    next_id: u32,
}

impl<'a> SegmentAccumulator<'a> {
    fn new(class_specs: &'a [ClassSpec], height: usize, width: usize) -> Self {
        Self {
            class_specs,
            segmentation: LabelMap::zeros((height, width)),
            segments: Vec::new(),
            stuff_memory: HashMap::new(),
            next_id: 1,
        }
    }

    /// Returns the id to write an accepted query's pixels under.
    fn claim(&mut self, category_id: usize, spec: &ClassSpec) -> u32 {
        if spec.is_stuff()
            && let Some(&id) = self.stuff_memory.get(&category_id)
        {
            trace!("merging stuff class {} into segment {}", category_id, id);
            return id;
        }

        let id = self.next_id;
        self.next_id += 1;
        self.segments.push(Segment {
            id,
            category_id,
            is_thing: spec.is_thing,
            label: spec.label.clone(),
        });
        if spec.is_stuff() {
            self.stuff_memory.insert(category_id, id);
        }
        id
    }

    fn spec(&self, category_id: usize) -> Result<&'a ClassSpec, PanopticError> {
        self.class_specs.get(category_id).ok_or_else(|| {
            PanopticError::invalid_input(format!(
                "no class spec for predicted class {category_id} ({} specs given)",
                self.class_specs.len()
            ))
        })
    }

    fn write(&mut self, winners: &Array2<usize>, survivor: usize, id: u32) {
        let id = id as i32;
        Zip::from(&mut self.segmentation)
            .and(winners)
            .for_each(|cell, &winner| {
                if winner == survivor {
                    *cell = id;
                }
            });
    }

    fn finish(self) -> PanopticSegmentation {
        PanopticSegmentation {
            segmentation: self.segmentation,
            segments: self.segments,
        }
    }
}

/// Merges query predictions into panoptic segmentations.
#[derive(Debug, Clone, Default)]
pub struct PanopticPostProcess {
    pub config: PanopticPostProcessConfig,
    pub parallel: ParallelPolicy,
}

impl PanopticPostProcess {
    /// Creates a merger after validating the thresholds.
    pub fn new(
        config: PanopticPostProcessConfig,
        parallel: ParallelPolicy,
    ) -> Result<Self, PanopticError> {
        config.validate()?;
        Ok(Self { config, parallel })
    }

    /// Merges a batch; images are independent and results keep batch order.
    ///
    /// # Arguments
    ///
    /// * `class_logits` - `(batch, query, num_classes + 1)` raw class scores
    /// * `mask_logits` - `(batch, query, height, width)` raw mask scores
    /// * `class_specs` - One entry per real class
    pub fn apply(
        &self,
        class_logits: ArrayView3<f32>,
        mask_logits: ArrayView4<f32>,
        class_specs: &[ClassSpec],
    ) -> Result<Vec<PanopticSegmentation>, PanopticError> {
        let batch_size = class_logits.len_of(Axis(0));
        if mask_logits.len_of(Axis(0)) != batch_size {
            return Err(PanopticError::shape_mismatch(
                "panoptic_segmentation",
                &[batch_size],
                &[mask_logits.len_of(Axis(0))],
                "batch size of mask logits",
            ));
        }

        if self.parallel.should_parallelize(batch_size) {
            (0..batch_size)
                .into_par_iter()
                .map(|idx| {
                    self.process(
                        class_logits.index_axis(Axis(0), idx),
                        mask_logits.index_axis(Axis(0), idx),
                        class_specs,
                    )
                })
                .collect()
        } else {
            class_logits
                .outer_iter()
                .zip(mask_logits.outer_iter())
                .map(|(classes, masks)| self.process(classes, masks, class_specs))
                .collect()
        }
    }

    /// Merges a single image.
    ///
    /// # Arguments
    ///
    /// * `class_logits` - `(query, num_classes + 1)` raw class scores
    /// * `mask_logits` - `(query, height, width)` raw mask scores
    /// * `class_specs` - One entry per real class
    ///
    /// # Errors
    ///
    /// Fails if the query counts disagree or a surviving query predicts a class
    /// with no entry in `class_specs`. Having no survivors is not an error.
    pub fn process(
        &self,
        class_logits: ArrayView2<f32>,
        mask_logits: ArrayView3<f32>,
        class_specs: &[ClassSpec],
    ) -> Result<PanopticSegmentation, PanopticError> {
        let (num_queries, num_classes_with_null) = class_logits.dim();
        let (mask_queries, height, width) = mask_logits.dim();
        if num_queries != mask_queries {
            return Err(PanopticError::shape_mismatch(
                "panoptic_segmentation",
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
        let num_labels = num_classes_with_null - 1;
        if class_specs.len() != num_labels {
            warn!(
                "{} class specs given for {} predicted classes",
                class_specs.len(),
                num_labels
            );
        }

        let (scores, labels) = predict_queries(class_logits);
        let (masks, scores, labels) = remove_low_and_no_objects(
            mask_logits,
            &scores,
            &labels,
            self.config.object_mask_threshold,
            num_labels,
        )?;

        debug!(
            "PanopticPostProcess: {}/{} queries survive, {}x{}",
            scores.len(),
            num_queries,
            height,
            width
        );

        let mut accumulator = SegmentAccumulator::new(class_specs, height, width);
        if scores.is_empty() {
            return Ok(accumulator.finish());
        }

        let probs = masks.mapv(sigmoid);
        let winners = pixel_winners(&probs, &scores);

        let mut assigned_area = vec![0usize; scores.len()];
        for &winner in winners.iter() {
            assigned_area[winner] += 1;
        }

        for (survivor, (&category_id, query_probs)) in
            labels.iter().zip(probs.outer_iter()).enumerate()
        {
            let spec = accumulator.spec(category_id)?;
            let assigned = assigned_area[survivor];
            let raw = query_probs
                .iter()
                .filter(|&&p| p >= MASK_PROBABILITY_THRESHOLD)
                .count();

            if assigned == 0 || raw == 0 {
                trace!(
                    "query {} ({}) skipped: assigned {} raw {}",
                    survivor, spec.label, assigned, raw
                );
                continue;
            }

            let ratio = assigned as f32 / raw as f32;
            if ratio <= self.config.overlap_mask_area_threshold {
                trace!(
                    "query {} ({}) skipped: overlap ratio {:.3}",
                    survivor, spec.label, ratio
                );
                continue;
            }

            let id = accumulator.claim(category_id, spec);
            accumulator.write(&winners, survivor, id);
        }

        let result = accumulator.finish();
        debug!(
            "PanopticPostProcess: {} segments emitted",
            result.segments.len()
        );
        Ok(result)
    }
}

/// For every pixel, the index of the survivor with the highest `prob * score`.
///
/// Ties go to the earliest survivor.
fn pixel_winners(probs: &Array3<f32>, scores: &[f32]) -> Array2<usize> {
    let (_, height, width) = probs.dim();
    Array2::from_shape_fn((height, width), |(y, x)| {
        let mut best = 0;
        let mut best_value = probs[[0, y, x]] * scores[0];
        for (survivor, &score) in scores.iter().enumerate().skip(1) {
            let value = probs[[survivor, y, x]] * score;
            if value > best_value {
                best = survivor;
                best_value = value;
            }
        }
        best
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array4, array};
    use std::collections::HashSet;

    const HIGH: f32 = 10.0;
    const LOW: f32 = -10.0;

    fn merger() -> PanopticPostProcess {
        PanopticPostProcess::default()
    }

    fn sky_and_cat() -> Vec<ClassSpec> {
        vec![ClassSpec::stuff("sky"), ClassSpec::thing("cat")]
    }

    /// Class logits that put almost all mass on `class`.
    fn confident(class: usize, num_classes_with_null: usize) -> Vec<f32> {
        (0..num_classes_with_null)
            .map(|c| if c == class { 5.0 } else { -5.0 })
            .collect()
    }

    fn class_rows(rows: &[Vec<f32>]) -> Array2<f32> {
        let cols = rows[0].len();
        Array2::from_shape_vec((rows.len(), cols), rows.concat()).unwrap()
    }

    #[test]
    fn test_sky_and_cat_end_to_end() {
        let class_logits = class_rows(&[confident(0, 3), confident(1, 3)]);
        let mask_logits = Array3::from_shape_fn((2, 3, 3), |(q, y, _)| {
            let sky_row = y < 2;
            if (q == 0) == sky_row { HIGH } else { LOW }
        });

        let result = merger()
            .process(class_logits.view(), mask_logits.view(), &sky_and_cat())
            .unwrap();

        let ids: HashSet<u32> = result.segments.iter().map(|s| s.id).collect();
        assert_eq!(ids, HashSet::from([1, 2]));

        let sky = result.segments.iter().find(|s| s.label == "sky").unwrap();
        let cat = result.segments.iter().find(|s| s.label == "cat").unwrap();
        assert!(!sky.is_thing);
        assert!(cat.is_thing);
        assert_eq!(cat.category_id, 1);
        for x in 0..3 {
            assert_eq!(result.segmentation[[0, x]], sky.id as i32);
            assert_eq!(result.segmentation[[1, x]], sky.id as i32);
            assert_eq!(result.segmentation[[2, x]], cat.id as i32);
        }
    }

    #[test]
    fn test_single_low_score_query_filtered() {
        // equal logits: class 0 wins the tie with probability 0.5
        let class_logits = array![[0.0f32, 0.0]];
        let mask_logits = Array3::from_elem((1, 2, 2), HIGH);

        let result = merger()
            .process(
                class_logits.view(),
                mask_logits.view(),
                &[ClassSpec::thing("cat")],
            )
            .unwrap();

        assert!(result.is_empty());
        assert!(result.segmentation.iter().all(|&v| v == 0));
        assert_eq!(result.segmentation.dim(), (2, 2));
    }

    #[test]
    fn test_score_equal_to_threshold_is_dropped() {
        // softmax([ln 4, 0]) = [0.8, 0.2]
        let class_logits = array![[4.0f32.ln(), 0.0]];
        let mask_logits = Array3::from_elem((1, 1, 1), HIGH);
        let (scores, _) = predict_queries(class_logits.view());
        let config = PanopticPostProcessConfig {
            object_mask_threshold: scores[0],
            ..Default::default()
        };
        let result = PanopticPostProcess::new(config, ParallelPolicy::default())
            .unwrap()
            .process(
                class_logits.view(),
                mask_logits.view(),
                &[ClassSpec::thing("cat")],
            )
            .unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_all_queries_below_threshold_yield_empty_map() {
        let class_logits = Array2::from_shape_fn((4, 3), |(q, c)| (q + c) as f32 * 0.01);
        let mask_logits = Array3::from_shape_fn((4, 3, 5), |(q, y, x)| (q + y + x) as f32);

        for threshold in [0.5f32, 0.8, 1.0] {
            let config = PanopticPostProcessConfig {
                object_mask_threshold: threshold,
                ..Default::default()
            };
            let result = PanopticPostProcess::new(config, ParallelPolicy::default())
                .unwrap()
                .process(class_logits.view(), mask_logits.view(), &sky_and_cat())
                .unwrap();
            assert!(result.is_empty());
            assert!(result.segmentation.iter().all(|&v| v == 0));
        }
    }

    #[test]
    fn test_null_class_queries_filtered() {
        let class_logits = class_rows(&[confident(2, 3)]);
        let mask_logits = Array3::from_elem((1, 2, 2), HIGH);
        let result = merger()
            .process(class_logits.view(), mask_logits.view(), &sky_and_cat())
            .unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_stuff_queries_merge_into_one_segment() {
        let class_logits = class_rows(&[confident(0, 3), confident(0, 3)]);
        // query 0 owns the left column, query 1 the right column
        let mask_logits =
            Array3::from_shape_fn((2, 2, 2), |(q, _, x)| if q == x { HIGH } else { LOW });

        let result = merger()
            .process(class_logits.view(), mask_logits.view(), &sky_and_cat())
            .unwrap();

        assert_eq!(result.segments.len(), 1);
        assert_eq!(result.segments[0].id, 1);
        assert_eq!(result.segments[0].label, "sky");
        assert!(result.segmentation.iter().all(|&v| v == 1));
        assert_eq!(result.area(1), 4);
    }

    #[test]
    fn test_thing_queries_stay_separate() {
        let class_logits = class_rows(&[confident(1, 3), confident(1, 3)]);
        let mask_logits =
            Array3::from_shape_fn((2, 2, 2), |(q, _, x)| if q == x { HIGH } else { LOW });

        let result = merger()
            .process(class_logits.view(), mask_logits.view(), &sky_and_cat())
            .unwrap();

        assert_eq!(result.segments.len(), 2);
        assert_eq!(result.segmentation, array![[1, 2], [1, 2]]);
        assert!(result.segments.iter().all(|s| s.category_id == 1));
    }

    #[test]
    fn test_pixel_ties_go_to_first_survivor() {
        let class_logits = class_rows(&[confident(1, 3), confident(1, 3)]);
        let mask_logits = Array3::from_elem((2, 2, 2), HIGH);

        let result = merger()
            .process(class_logits.view(), mask_logits.view(), &sky_and_cat())
            .unwrap();

        // the second query wins nothing and is skipped
        assert_eq!(result.segments.len(), 1);
        assert!(result.segmentation.iter().all(|&v| v == 1));
    }

    #[test]
    fn test_contested_query_rejected_by_overlap_ratio() {
        let class_logits = class_rows(&[confident(1, 3), confident(1, 3)]);
        // query 1 covers all four pixels but loses three of them to query 0
        let mask_logits = Array3::from_shape_fn((2, 2, 2), |(q, y, x)| match (q, y, x) {
            (0, 1, 1) => LOW,
            (0, _, _) => 12.0,
            _ => HIGH,
        });

        let result = merger()
            .process(class_logits.view(), mask_logits.view(), &sky_and_cat())
            .unwrap();

        assert_eq!(result.segments.len(), 1);
        assert_eq!(result.segmentation, array![[1, 1], [1, 0]]);
    }

    #[test]
    fn test_raw_area_uses_unscaled_probability() {
        // score 0.9; sigmoid(0.08) ~ 0.52 clears 0.5 but 0.52 * 0.9 does not
        let class_logits = array![[9.0f32.ln(), 0.0]];
        let mask_logits = Array3::from_elem((1, 2, 2), 0.08f32);
        let (scores, _) = predict_queries(class_logits.view());
        assert!((scores[0] - 0.9).abs() < 1e-5);

        let result = merger()
            .process(
                class_logits.view(),
                mask_logits.view(),
                &[ClassSpec::thing("cat")],
            )
            .unwrap();

        assert_eq!(result.segments.len(), 1);
        assert_eq!(result.area(1), 4);
    }

    #[test]
    fn test_ids_unique_and_consistent_with_map() {
        let specs = vec![
            ClassSpec::stuff("sky"),
            ClassSpec::thing("cat"),
            ClassSpec::stuff("grass"),
            ClassSpec::thing("dog"),
        ];
        let class_logits =
            Array2::from_shape_fn((8, 5), |(q, c)| if c == q % 4 { 6.0 } else { 0.0 });
        let mask_logits = Array3::from_shape_fn((8, 6, 6), |(q, y, x)| {
            if (y * 6 + x) % 8 == q { HIGH } else { LOW }
        });

        let result = merger()
            .process(class_logits.view(), mask_logits.view(), &specs)
            .unwrap();

        let ids: Vec<u32> = result.segments.iter().map(|s| s.id).collect();
        let unique: HashSet<u32> = ids.iter().copied().collect();
        assert_eq!(ids.len(), unique.len());
        assert!(ids.iter().all(|&id| id > 0));
        for &cell in result.segmentation.iter() {
            assert!(cell == 0 || unique.contains(&(cell as u32)));
        }
        // two stuff classes merge, two thing classes split into two queries each
        assert_eq!(result.segments.len(), 6);
    }

    #[test]
    fn test_missing_class_spec_rejected() {
        let class_logits = class_rows(&[confident(2, 4)]);
        let mask_logits = Array3::from_elem((1, 2, 2), HIGH);
        let err = merger()
            .process(class_logits.view(), mask_logits.view(), &sky_and_cat())
            .unwrap_err();
        assert!(matches!(err, PanopticError::InvalidInput { .. }));
    }

    #[test]
    fn test_query_count_mismatch_rejected() {
        let class_logits = class_rows(&[confident(0, 3)]);
        let mask_logits = Array3::from_elem((2, 2, 2), HIGH);
        assert!(
            merger()
                .process(class_logits.view(), mask_logits.view(), &sky_and_cat())
                .is_err()
        );
    }

    #[test]
    fn test_remove_low_and_no_objects() {
        let masks = Array3::from_shape_fn((4, 1, 1), |(q, _, _)| q as f32);
        let scores = [0.9f32, 0.95, 0.5, 0.85];
        let labels = [0usize, 2, 1, 1];
        let (kept_masks, scores, labels) =
            remove_low_and_no_objects(masks.view(), &scores, &labels, 0.8, 2).unwrap();

        assert_eq!(labels, vec![0, 1]);
        assert_eq!(scores, vec![0.9, 0.85]);
        assert_eq!(kept_masks[[0, 0, 0]], 0.0);
        assert_eq!(kept_masks[[1, 0, 0]], 3.0);

        assert!(remove_low_and_no_objects(masks.view(), &[0.9], &[0, 1, 1, 1], 0.8, 2).is_err());
    }

    #[test]
    fn test_predict_queries_first_max_wins() {
        let (scores, labels) = predict_queries(array![[1.0f32, 1.0, 0.0]].view());
        assert_eq!(labels, vec![0]);
        assert!(scores[0] < 0.5);
    }

    #[test]
    fn test_config_validation() {
        assert!(PanopticPostProcessConfig::default().validate().is_ok());
        let zero = PanopticPostProcessConfig {
            object_mask_threshold: 0.0,
            ..Default::default()
        };
        assert!(zero.validate().is_err());
        let above_one = PanopticPostProcessConfig {
            overlap_mask_area_threshold: 1.5,
            ..Default::default()
        };
        assert!(PanopticPostProcess::new(above_one, ParallelPolicy::default()).is_err());
    }

    #[test]
    fn test_batch_matches_per_image_merge() {
        let class_logits = Array3::from_shape_fn((3, 2, 3), |(b, q, c)| {
            if c == (b + q) % 2 { 5.0 } else { -5.0 }
        });
        let mask_logits = Array4::from_shape_fn((3, 2, 3, 3), |(b, q, y, x)| {
            if (y + x + b) % 2 == q { HIGH } else { LOW }
        });
        let merger = PanopticPostProcess::new(
            PanopticPostProcessConfig::default(),
            ParallelPolicy::new().with_batch_threshold(0),
        )
        .unwrap();

        let batch = merger
            .apply(class_logits.view(), mask_logits.view(), &sky_and_cat())
            .unwrap();
        assert_eq!(batch.len(), 3);
        for (b, merged) in batch.iter().enumerate() {
            let single = merger
                .process(
                    class_logits.index_axis(Axis(0), b),
                    mask_logits.index_axis(Axis(0), b),
                    &sky_and_cat(),
                )
                .unwrap();
            assert_eq!(merged, &single);
        }
    }

    #[test]
    fn test_segments_serialize_to_json() {
        let segment = Segment {
            id: 1,
            category_id: 0,
            is_thing: false,
            label: "sky".to_string(),
        };
        let json = serde_json::to_string(&segment).unwrap();
        assert!(json.contains("\"category_id\":0"));
        let back: Segment = serde_json::from_str(&json).unwrap();
        assert_eq!(back, segment);
    }
}
