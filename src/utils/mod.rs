//! Utility functions for the segmentation pipeline.
//!
//! Image loading helpers and logging setup.

pub mod image;

pub use image::{dynamic_to_rgb, load_image, load_images};

/// Installs a `tracing` fmt subscriber filtered by `RUST_LOG` (default `info`).
///
/// Calling this more than once, or after another subscriber was installed, is
/// a no-op.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing_is_idempotent() {
        init_tracing();
        init_tracing();
        tracing::debug!("subscriber installed");
    }
}
