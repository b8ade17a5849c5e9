//! Image normalization utilities.
//!
//! Converts RGB images into CHW `f32` tensors, applying
//! `(pixel * scale - mean) / std` per channel.

use image::RgbImage;
use rayon::prelude::*;

use crate::core::config::ParallelPolicy;
use crate::core::constants::{DEFAULT_RESCALE_FACTOR, IMAGE_CHANNELS, IMAGENET_MEAN, IMAGENET_STD};
use crate::core::{PanopticError, Tensor3D};

/// Normalizes images into CHW tensors.
///
/// The affine transform is folded into per-channel `alpha = scale / std` and
/// `beta = -mean / std`, so each pixel costs one multiply-add.
#[derive(Debug, Clone)]
pub struct NormalizeImage {
    /// Scaling factors for each channel (alpha = scale / std)
    pub alpha: Vec<f32>,
    /// Offset values for each channel (beta = -mean / std)
    pub beta: Vec<f32>,
}

impl NormalizeImage {
    /// Creates a new NormalizeImage instance with the specified parameters.
    ///
    /// # Arguments
    ///
    /// * `scale` - Optional scaling factor (defaults to 1.0/255.0)
    /// * `mean` - Optional mean values for each channel (defaults to ImageNet mean)
    /// * `std` - Optional standard deviation values for each channel (defaults to ImageNet std)
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// * Scale is less than or equal to 0
    /// * Mean or std vectors don't have exactly 3 elements
    /// * Any standard deviation value is less than or equal to 0
    pub fn new(
        scale: Option<f32>,
        mean: Option<Vec<f32>>,
        std: Option<Vec<f32>>,
    ) -> Result<Self, PanopticError> {
        let scale = scale.unwrap_or(DEFAULT_RESCALE_FACTOR);
        let mean = mean.unwrap_or_else(|| IMAGENET_MEAN.to_vec());
        let std = std.unwrap_or_else(|| IMAGENET_STD.to_vec());

        if scale <= 0.0 {
            return Err(PanopticError::invalid_field("scale", "> 0", scale.to_string()));
        }

        if mean.len() != IMAGE_CHANNELS {
            return Err(PanopticError::ConfigError {
                message: "Mean must have exactly 3 elements (3-channel normalization)".to_string(),
            });
        }

        if std.len() != IMAGE_CHANNELS {
            return Err(PanopticError::ConfigError {
                message: "Std must have exactly 3 elements (3-channel normalization)".to_string(),
            });
        }

        for (i, &s) in std.iter().enumerate() {
            if s <= 0.0 {
                return Err(PanopticError::ConfigError {
                    message: format!(
                        "Standard deviation at index {i} must be greater than 0, got {s}"
                    ),
                });
            }
        }

        let alpha: Vec<f32> = std.iter().map(|s| scale / s).collect();
        let beta: Vec<f32> = mean.iter().zip(&std).map(|(m, s)| -m / s).collect();

        Ok(Self { alpha, beta })
    }

    /// Creates an ImageNet normalizer (mean/std in RGB order, pixels scaled by 1/255).
    pub fn imagenet() -> Result<Self, PanopticError> {
        Self::new(None, None, None)
    }

    /// Creates a normalizer that only rescales pixels into `[0, 1]`.
    pub fn rescale_only() -> Result<Self, PanopticError> {
        Self::new(None, Some(vec![0.0; 3]), Some(vec![1.0; 3]))
    }

    /// Normalizes a single image into a `(3, height, width)` tensor.
    pub fn normalize(&self, img: &RgbImage) -> Tensor3D {
        let (width, height) = img.dimensions();
        Tensor3D::from_shape_fn(
            (IMAGE_CHANNELS, height as usize, width as usize),
            |(c, y, x)| {
                let pixel = img.get_pixel(x as u32, y as u32);
                pixel[c] as f32 * self.alpha[c] + self.beta[c]
            },
        )
    }

    /// Normalizes a batch of images, keeping their individual sizes.
    ///
    /// Images are processed in parallel when the policy allows it; the output
    /// order always matches the input order.
    pub fn normalize_batch(&self, imgs: &[RgbImage], policy: &ParallelPolicy) -> Vec<Tensor3D> {
        if policy.should_parallelize(imgs.len()) {
            imgs.par_iter().map(|img| self.normalize(img)).collect()
        } else {
            imgs.iter().map(|img| self.normalize(img)).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_normalize_mean_std_applied_per_channel() {
        let mut img = RgbImage::new(1, 1);
        img.put_pixel(0, 0, Rgb([11, 22, 33]));

        let normalizer = NormalizeImage::new(
            Some(1.0),
            Some(vec![1.0, 2.0, 3.0]),
            Some(vec![2.0, 4.0, 5.0]),
        )
        .unwrap();

        let out = normalizer.normalize(&img);
        assert_eq!(out.shape(), &[3, 1, 1]);
        // (R-1)/2, (G-2)/4, (B-3)/5
        for (value, expected) in out.iter().zip([5.0f32, 5.0, 6.0]) {
            assert!((value - expected).abs() < 1e-5, "{value} vs {expected}");
        }
    }

    #[test]
    fn test_normalize_layout_is_chw() {
        let mut img = RgbImage::new(2, 1);
        img.put_pixel(0, 0, Rgb([1, 2, 3]));
        img.put_pixel(1, 0, Rgb([4, 5, 6]));

        let normalizer =
            NormalizeImage::new(Some(1.0), Some(vec![0.0; 3]), Some(vec![1.0; 3])).unwrap();
        let out = normalizer.normalize(&img);

        assert_eq!(out.shape(), &[3, 1, 2]);
        assert_eq!(out[[0, 0, 1]], 4.0);
        assert_eq!(out[[2, 0, 0]], 3.0);
    }

    #[test]
    fn test_rescale_only_maps_to_unit_range() {
        let mut img = RgbImage::new(1, 1);
        img.put_pixel(0, 0, Rgb([255, 0, 51]));
        let out = NormalizeImage::rescale_only().unwrap().normalize(&img);
        assert!((out[[0, 0, 0]] - 1.0).abs() < 1e-6);
        assert_eq!(out[[1, 0, 0]], 0.0);
        assert!((out[[2, 0, 0]] - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_imagenet_defaults() {
        let normalizer = NormalizeImage::imagenet().unwrap();
        let expected_beta = -0.485 / 0.229;
        assert!((normalizer.beta[0] - expected_beta).abs() < 1e-6);
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        assert!(NormalizeImage::new(Some(0.0), None, None).is_err());
        assert!(NormalizeImage::new(None, Some(vec![0.5; 2]), None).is_err());
        assert!(NormalizeImage::new(None, None, Some(vec![1.0, 0.0, 1.0])).is_err());
    }

    #[test]
    fn test_normalize_batch_preserves_order_and_sizes() {
        let imgs = vec![
            RgbImage::from_pixel(2, 3, Rgb([10, 10, 10])),
            RgbImage::from_pixel(4, 1, Rgb([20, 20, 20])),
            RgbImage::from_pixel(1, 1, Rgb([30, 30, 30])),
        ];
        let normalizer =
            NormalizeImage::new(Some(1.0), Some(vec![0.0; 3]), Some(vec![1.0; 3])).unwrap();
        let out = normalizer.normalize_batch(&imgs, &ParallelPolicy::default());

        assert_eq!(out.len(), 3);
        assert_eq!(out[0].shape(), &[3, 3, 2]);
        assert_eq!(out[1].shape(), &[3, 1, 4]);
        assert_eq!(out[2][[0, 0, 0]], 30.0);
    }
}
