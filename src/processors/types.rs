//! Types used in image processing operations.

use serde::{Deserialize, Serialize};

use crate::core::constants::DEFAULT_SHORTEST_EDGE;

/// Target size for resizing.
///
/// Serialized untagged, so configuration files can say either `"size": 800`
/// or `"size": {"width": 640, "height": 480}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TargetSize {
    /// Scale so the shorter edge matches this length, preserving aspect ratio.
    ShortestEdge(u32),
    /// Resize to exactly this `(width, height)`.
    Exact {
        /// Output width in pixels.
        width: u32,
        /// Output height in pixels.
        height: u32,
    },
}

impl Default for TargetSize {
    fn default() -> Self {
        TargetSize::ShortestEdge(DEFAULT_SHORTEST_EDGE)
    }
}

impl TargetSize {
    /// Returns true if every length in the target is non-zero.
    pub fn is_positive(&self) -> bool {
        match *self {
            TargetSize::ShortestEdge(size) => size > 0,
            TargetSize::Exact { width, height } => width > 0 && height > 0,
        }
    }
}

impl From<u32> for TargetSize {
    fn from(size: u32) -> Self {
        TargetSize::ShortestEdge(size)
    }
}

impl From<(u32, u32)> for TargetSize {
    /// Interprets the pair as `(width, height)`.
    fn from((width, height): (u32, u32)) -> Self {
        TargetSize::Exact { width, height }
    }
}
