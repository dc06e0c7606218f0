use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_MIN_BOX_WEIGHT, DEFAULT_MIN_LOCAL_MAX_DIST};
use crate::error::{CellspotError, Result};

/// Pixel grid the emitted boxes are expressed in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoordinateSpace {
    /// Mask pixels, i.e. the downsampled grid when `window_size > 1`.
    #[default]
    Mask,
    /// Source frame pixels: boxes are scaled up by the mask's factor.
    Source,
}

impl std::fmt::Display for CoordinateSpace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mask => write!(f, "Mask"),
            Self::Source => write!(f, "Source"),
        }
    }
}

/// Parameters of peak finding, segmentation and box filtering.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Boxes with area below `min_box_weight * mean area` are discarded.
    /// 0 disables the filter.
    #[serde(default = "default_min_box_weight")]
    pub min_box_weight: f64,
    /// Minimum Euclidean distance in pixels between two seeds.
    #[serde(default = "default_min_local_max_dist")]
    pub min_local_max_dist: usize,
    #[serde(default)]
    pub coordinate_space: CoordinateSpace,
}

fn default_min_box_weight() -> f64 {
    DEFAULT_MIN_BOX_WEIGHT
}
fn default_min_local_max_dist() -> usize {
    DEFAULT_MIN_LOCAL_MAX_DIST
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            min_box_weight: DEFAULT_MIN_BOX_WEIGHT,
            min_local_max_dist: DEFAULT_MIN_LOCAL_MAX_DIST,
            coordinate_space: CoordinateSpace::default(),
        }
    }
}

impl DetectionConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.min_box_weight.is_finite() || self.min_box_weight < 0.0 {
            return Err(CellspotError::invalid(
                "min_box_weight",
                format!("must be a finite number >= 0, got {}", self.min_box_weight),
            ));
        }
        if self.min_local_max_dist == 0 {
            return Err(CellspotError::invalid(
                "min_local_max_dist",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}
