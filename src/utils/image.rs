//! Image loading helpers.

use std::path::Path;

use image::{DynamicImage, RgbImage};
use rayon::prelude::*;
use tracing::debug;

use crate::core::config::ParallelPolicy;
use crate::core::errors::PanopticError;

/// Converts any decoded image into 8-bit RGB.
pub fn dynamic_to_rgb(img: DynamicImage) -> RgbImage {
    match img {
        DynamicImage::ImageRgb8(rgb) => rgb,
        other => other.to_rgb8(),
    }
}

/// Loads an image from disk as 8-bit RGB.
///
/// # Errors
///
/// Returns [`PanopticError::ImageLoad`] if the file cannot be opened or decoded.
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<RgbImage, PanopticError> {
    let path = path.as_ref();
    let img = image::open(path)?;
    debug!("loaded {} ({}x{})", path.display(), img.width(), img.height());
    Ok(dynamic_to_rgb(img))
}

/// Loads several images, in parallel when the policy allows it.
///
/// The output order matches `paths`; the first failure is returned.
pub fn load_images<P: AsRef<Path> + Sync>(
    paths: &[P],
    policy: &ParallelPolicy,
) -> Result<Vec<RgbImage>, PanopticError> {
    if policy.should_parallelize(paths.len()) {
        paths.par_iter().map(load_image).collect()
    } else {
        paths.iter().map(load_image).collect()
    }
}
