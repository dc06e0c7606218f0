use ndarray::Array2;

use crate::error::{CellspotError, Result};
use crate::filters::{box_mean_array, gaussian_blur_array, gaussian_kernel_for_block};
use crate::frame::{Frame, Mask};

use super::config::{AdaptiveMethod, BackgroundConfig};
use super::resample::downsample_area;
use super::threshold::adaptive_threshold;

/// Read-only state shared by every frame of a background-removal batch.
///
/// Holds the validated parameters and the reference frame geometry. With the
/// Gaussian method it also keeps the precomputed window. Never mutated after
/// construction.
#[derive(Clone, Debug)]
pub struct BackgroundContext {
    config: BackgroundConfig,
    kernel: Option<Vec<f32>>,
    source_dim: (usize, usize),
}

impl BackgroundContext {
    /// Validate `config` and prepare a context for frames of `source_dim`
    /// (height, width).
    pub fn new(config: &BackgroundConfig, source_dim: (usize, usize)) -> Result<Self> {
        config.validate()?;
        if source_dim.0 == 0 || source_dim.1 == 0 {
            return Err(CellspotError::InvalidDimensions {
                width: source_dim.1 as u32,
                height: source_dim.0 as u32,
            });
        }

        let kernel = match config.method {
            AdaptiveMethod::Gaussian => Some(gaussian_kernel_for_block(config.block_size)),
            AdaptiveMethod::Mean => None,
        };

        Ok(Self {
            config: config.clone(),
            kernel,
            source_dim,
        })
    }

    /// Context whose reference geometry is the most common frame size in
    /// `frames`. Ties go to the size seen first, so a single odd frame
    /// cannot make the rest of the batch fail.
    pub fn for_frames(config: &BackgroundConfig, frames: &[Frame]) -> Result<Self> {
        let dim = dominant_dim(frames).ok_or(CellspotError::EmptySequence)?;
        Self::new(config, dim)
    }

    pub fn config(&self) -> &BackgroundConfig {
        &self.config
    }

    /// (height, width) every frame of the batch must have.
    pub fn source_dim(&self) -> (usize, usize) {
        self.source_dim
    }

    /// (height, width) of the masks this context produces.
    pub fn mask_dim(&self) -> (usize, usize) {
        Mask::expected_dim(self.source_dim, self.config.window_size)
    }

    /// Remove the background of one frame.
    pub fn apply(&self, frame: &Frame) -> Result<Mask> {
        let actual = frame.data.dim();
        if actual != self.source_dim {
            return Err(CellspotError::DimensionMismatch {
                expected: self.source_dim,
                actual,
            });
        }

        let data = downsample_area(&frame.data, self.config.window_size);
        if data.dim() != self.mask_dim() {
            return Err(CellspotError::DimensionMismatch {
                expected: self.mask_dim(),
                actual: data.dim(),
            });
        }

        let local_mean = self.local_mean(&data);
        let foreground = adaptive_threshold(
            &data,
            &local_mean,
            self.config.subtracted_constant,
            self.config.polarity,
        );

        Ok(Mask {
            data: foreground,
            scale: self.config.window_size,
            source_dim: self.source_dim,
        })
    }

    fn local_mean(&self, data: &Array2<f32>) -> Array2<f32> {
        match &self.kernel {
            Some(kernel) => gaussian_blur_array(data, kernel),
            None => box_mean_array(data, self.config.block_size),
        }
    }
}

fn dominant_dim(frames: &[Frame]) -> Option<(usize, usize)> {
    // (dim, count) in order of first appearance.
    let mut counts: Vec<((usize, usize), usize)> = Vec::new();
    for frame in frames {
        let dim = frame.data.dim();
        match counts.iter_mut().find(|(d, _)| *d == dim) {
            Some((_, n)) => *n += 1,
            None => counts.push((dim, 1)),
        }
    }
    let best = counts.iter().map(|&(_, n)| n).max()?;
    counts.into_iter().find(|&(_, n)| n == best).map(|(d, _)| d)
}
