//! Cell detection on foreground masks: distance transform, peak finding,
//! watershed segmentation and bounding-box extraction.

pub mod boxes;
pub mod config;
pub mod distance;
pub mod peaks;
pub mod watershed;

use std::collections::BTreeMap;
use std::fmt;

use ndarray::Array2;
use rayon::prelude::*;
use serde::ser::{Serialize, Serializer};
use tracing::{debug, info, warn};

use crate::consts::PARALLEL_FRAME_THRESHOLD;
use crate::error::{CellspotError, Result};
use crate::frame::Mask;

pub use boxes::{extract_boxes, filter_boxes, BoundingBox};
pub use config::{CoordinateSpace, DetectionConfig};
pub use distance::{distance_transform, DistanceField};
pub use peaks::{find_peaks, Peak};
pub use watershed::{watershed, Labels};

/// Boxes detected in one frame. The box index is its position.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameResult {
    pub boxes: Vec<BoundingBox>,
}

impl FrameResult {
    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&BoundingBox> {
        self.boxes.get(index)
    }

    /// `(box index, box)` pairs in index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &BoundingBox)> {
        self.boxes.iter().enumerate()
    }

    /// Boxes mapped from a grid downsampled by `scale` to `source_dim`.
    pub fn scaled(&self, scale: usize, source_dim: (usize, usize)) -> Self {
        Self {
            boxes: self
                .boxes
                .iter()
                .map(|b| b.scaled(scale, source_dim))
                .collect(),
        }
    }
}

/// Serialized as a map from box index to box.
impl Serialize for FrameResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

/// Dict-style dump: `{0: {'x': 3, 'y': 4, 'width': 10, 'height': 11}}`.
impl fmt::Display for FrameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, b) in self.iter() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(
                f,
                "{i}: {{'x': {}, 'y': {}, 'width': {}, 'height': {}}}",
                b.x, b.y, b.width, b.height
            )?;
        }
        write!(f, "}}")
    }
}

/// Per-frame outcomes of a detection batch, keyed by the frame's position
/// in the batch and iterated in frame order.
#[derive(Debug, Default)]
pub struct Detections {
    frames: BTreeMap<usize, Result<FrameResult>>,
}

impl Detections {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, frame: usize, outcome: Result<FrameResult>) {
        self.frames.insert(frame, outcome);
    }

    pub fn get(&self, frame: usize) -> Option<&Result<FrameResult>> {
        self.frames.get(&frame)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &Result<FrameResult>)> {
        self.frames.iter().map(|(&k, v)| (k, v))
    }

    /// Frames that were processed successfully.
    pub fn successes(&self) -> impl Iterator<Item = (usize, &FrameResult)> {
        self.iter()
            .filter_map(|(k, v)| v.as_ref().ok().map(|r| (k, r)))
    }

    /// Frames whose processing failed, with the reason.
    pub fn failures(&self) -> impl Iterator<Item = (usize, &CellspotError)> {
        self.iter().filter_map(|(k, v)| v.as_ref().err().map(|e| (k, e)))
    }

    /// Textual key of a frame, `"frame N"`.
    pub fn frame_key(frame: usize) -> String {
        format!("frame {frame}")
    }
}

impl FromIterator<(usize, Result<FrameResult>)> for Detections {
    fn from_iter<I: IntoIterator<Item = (usize, Result<FrameResult>)>>(iter: I) -> Self {
        Self {
            frames: iter.into_iter().collect(),
        }
    }
}

/// Intermediate products of segmenting one mask.
#[derive(Clone, Debug)]
pub struct Segmentation {
    pub distance: DistanceField,
    pub peaks: Vec<Peak>,
    pub labels: Labels,
}

impl Segmentation {
    fn empty(dim: (usize, usize)) -> Self {
        Self {
            distance: DistanceField::zeros(dim),
            peaks: Vec::new(),
            labels: Labels::zeros(dim),
        }
    }

    /// Number of labels in use; label `k` belongs to `peaks[k - 1]`.
    pub fn region_count(&self) -> usize {
        self.peaks.len()
    }
}

/// Distance transform, peak finding and watershed on one mask.
///
/// A mask with no foreground, or no background, has no peaks and no regions.
pub fn segment(mask: &Array2<bool>, min_local_max_dist: usize) -> Result<Segmentation> {
    if !mask.iter().any(|&v| v) {
        return Ok(Segmentation::empty(mask.dim()));
    }

    let distance = distance_transform(mask);
    let peaks = find_peaks(&distance, mask, min_local_max_dist)?;
    let labels = watershed(&distance, mask, &peaks)?;

    Ok(Segmentation {
        distance,
        peaks,
        labels,
    })
}

/// Detect cells in a single mask.
pub fn detect_frame(mask: &Mask, config: &DetectionConfig) -> Result<FrameResult> {
    if mask.scale == 0 {
        return Err(CellspotError::invalid("scale", "mask scale must be at least 1"));
    }
    let expected = Mask::expected_dim(mask.source_dim, mask.scale);
    if mask.data.dim() != expected {
        return Err(CellspotError::DimensionMismatch {
            expected,
            actual: mask.data.dim(),
        });
    }

    let segmentation = segment(&mask.data, config.min_local_max_dist)?;
    let raw = extract_boxes(&segmentation.labels, segmentation.region_count());
    let raw_count = raw.len();
    let mut boxes = filter_boxes(raw, config.min_box_weight);

    if config.coordinate_space == CoordinateSpace::Source {
        for b in &mut boxes {
            *b = b.scaled(mask.scale, mask.source_dim);
        }
    }

    debug!(
        peaks = segmentation.peaks.len(),
        regions = raw_count,
        kept = boxes.len(),
        "Frame segmented"
    );

    Ok(FrameResult { boxes })
}

/// Detect cells in every mask of a batch.
///
/// The configuration is validated once up front; an invalid configuration
/// fails the whole batch. Errors of individual frames are kept in their slot
/// of the returned [`Detections`].
pub fn detect(masks: &[Mask], config: &DetectionConfig) -> Result<Detections> {
    detect_with_progress(masks, config, |_| {})
}

/// [`detect`], calling `on_frame` with each frame's position once it is done.
pub fn detect_with_progress<F>(
    masks: &[Mask],
    config: &DetectionConfig,
    on_frame: F,
) -> Result<Detections>
where
    F: Fn(usize) + Sync,
{
    config.validate()?;
    info!(
        frames = masks.len(),
        min_box_weight = config.min_box_weight,
        min_local_max_dist = config.min_local_max_dist,
        coordinates = %config.coordinate_space,
        "Detecting cells"
    );

    let run = |(ordinal, mask): (usize, &Mask)| {
        let outcome = detect_frame(mask, config);
        if let Err(ref e) = outcome {
            warn!(frame = ordinal, error = %e, "Detection failed");
        }
        on_frame(ordinal);
        (ordinal, outcome)
    };

    let outcomes: Vec<(usize, Result<FrameResult>)> = if masks.len() >= PARALLEL_FRAME_THRESHOLD {
        masks.par_iter().enumerate().map(run).collect()
    } else {
        masks.iter().enumerate().map(run).collect()
    };

    Ok(outcomes.into_iter().collect())
}
