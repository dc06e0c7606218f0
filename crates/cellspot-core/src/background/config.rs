use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_BLOCK_SIZE, DEFAULT_SUBTRACTED_CONSTANT, DEFAULT_WINDOW_SIZE};
use crate::error::{CellspotError, Result};

/// Which side of the local threshold counts as foreground.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Polarity {
    /// Bright cells on a dark background: foreground is above the threshold.
    #[default]
    DarkBackground,
    /// Dark cells on a light background: foreground is below the threshold.
    LightBackground,
}

impl Polarity {
    /// Parse the numeric `background_relative` flag (0 = dark, 1 = light).
    pub fn from_flag(flag: u8) -> Result<Self> {
        match flag {
            0 => Ok(Self::DarkBackground),
            1 => Ok(Self::LightBackground),
            other => Err(CellspotError::invalid(
                "background_relative",
                format!("expected 0 or 1, got {other}"),
            )),
        }
    }

    pub fn as_flag(self) -> u8 {
        match self {
            Self::DarkBackground => 0,
            Self::LightBackground => 1,
        }
    }

    /// Classify a pixel against its local threshold.
    #[inline]
    pub fn is_foreground(self, value: f32, threshold: f32) -> bool {
        match self {
            Self::DarkBackground => value > threshold,
            Self::LightBackground => value < threshold,
        }
    }
}

impl std::fmt::Display for Polarity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DarkBackground => write!(f, "Dark background"),
            Self::LightBackground => write!(f, "Light background"),
        }
    }
}

/// How the local background level is estimated around each pixel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdaptiveMethod {
    /// Unweighted mean of the block.
    Mean,
    /// Gaussian-weighted mean of the block.
    #[default]
    Gaussian,
}

impl std::fmt::Display for AdaptiveMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mean => write!(f, "Mean"),
            Self::Gaussian => write!(f, "Gaussian"),
        }
    }
}

/// Parameters of the adaptive background remover.
///
/// `block_size` has to be large compared to a cell, otherwise the local mean
/// follows the cell itself and its interior drops out of the mask. That is a
/// tuning concern and is not validated here.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BackgroundConfig {
    /// Downsampling factor applied before thresholding (1 = full resolution).
    #[serde(default = "default_window_size")]
    pub window_size: usize,
    /// Side of the square neighborhood used for the local mean. Odd, > 1.
    #[serde(default = "default_block_size")]
    pub block_size: usize,
    /// Constant subtracted from the local mean, in 8-bit intensity units.
    #[serde(default = "default_subtracted_constant")]
    pub subtracted_constant: f32,
    #[serde(default)]
    pub polarity: Polarity,
    #[serde(default)]
    pub method: AdaptiveMethod,
}

fn default_window_size() -> usize {
    DEFAULT_WINDOW_SIZE
}
fn default_block_size() -> usize {
    DEFAULT_BLOCK_SIZE
}
fn default_subtracted_constant() -> f32 {
    DEFAULT_SUBTRACTED_CONSTANT
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            block_size: DEFAULT_BLOCK_SIZE,
            subtracted_constant: DEFAULT_SUBTRACTED_CONSTANT,
            polarity: Polarity::default(),
            method: AdaptiveMethod::default(),
        }
    }
}

impl BackgroundConfig {
    /// Reject parameter sets no frame can be processed with.
    pub fn validate(&self) -> Result<()> {
        if self.window_size == 0 {
            return Err(CellspotError::invalid("window_size", "must be at least 1"));
        }
        if self.block_size <= 1 || self.block_size % 2 == 0 {
            return Err(CellspotError::invalid(
                "block_size",
                format!("must be odd and greater than 1, got {}", self.block_size),
            ));
        }
        if !self.subtracted_constant.is_finite() {
            return Err(CellspotError::invalid(
                "subtracted_constant",
                "must be a finite number",
            ));
        }
        Ok(())
    }
}
