use std::collections::HashMap;

use ndarray::Array2;

use crate::error::{CellspotError, Result};

use super::distance::DistanceField;

/// A local maximum of the distance field, used as a watershed seed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Peak {
    pub row: usize,
    pub col: usize,
    /// Distance-field value at the peak.
    pub value: f32,
}

impl Peak {
    /// Squared Euclidean distance to another peak, in pixels.
    pub fn distance_sq(&self, other: &Peak) -> usize {
        let dr = self.row.abs_diff(other.row);
        let dc = self.col.abs_diff(other.col);
        dr * dr + dc * dc
    }
}

/// Foreground pixels whose value is at least that of each of their 8
/// neighbors, in raster order. Non-finite values (a mask without background)
/// never qualify.
pub fn local_maxima(field: &DistanceField, mask: &Array2<bool>) -> Vec<Peak> {
    let (h, w) = field.dim();
    let mut candidates = Vec::new();

    for row in 0..h {
        for col in 0..w {
            let value = field[[row, col]];
            if !mask[[row, col]] || !value.is_finite() || value <= 0.0 {
                continue;
            }

            let mut is_max = true;
            'neighbors: for nr in row.saturating_sub(1)..=(row + 1).min(h - 1) {
                for nc in col.saturating_sub(1)..=(col + 1).min(w - 1) {
                    if field[[nr, nc]] > value {
                        is_max = false;
                        break 'neighbors;
                    }
                }
            }

            if is_max {
                candidates.push(Peak { row, col, value });
            }
        }
    }

    candidates
}

/// Find watershed seeds: local maxima of `field` at least
/// `min_local_max_dist` pixels apart.
///
/// Candidates are visited by descending value, equal values in raster order,
/// and a candidate closer than `min_local_max_dist` to an accepted peak is
/// dropped. The result is in acceptance order (strongest first) and is fully
/// determined by the input.
pub fn find_peaks(
    field: &DistanceField,
    mask: &Array2<bool>,
    min_local_max_dist: usize,
) -> Result<Vec<Peak>> {
    if field.dim() != mask.dim() {
        return Err(CellspotError::DimensionMismatch {
            expected: mask.dim(),
            actual: field.dim(),
        });
    }

    let mut candidates = local_maxima(field, mask);
    // Stable sort keeps raster order among equal values.
    candidates.sort_by(|a, b| b.value.total_cmp(&a.value));

    // No two pixels of the field are farther apart than its diagonal, so
    // larger distances behave the same and are clamped before squaring.
    let (h, w) = field.dim();
    let diagonal = ((h * h + w * w) as f64).sqrt().ceil() as usize + 1;
    let min_dist = min_local_max_dist.clamp(1, diagonal);
    let min_dist_sq = min_dist * min_dist;

    // Accepted peaks bucketed on a grid of `min_dist` cells, so only the
    // 3x3 surrounding buckets need checking.
    let mut buckets: HashMap<(usize, usize), Vec<Peak>> = HashMap::new();
    let mut accepted = Vec::new();

    for candidate in candidates {
        let (br, bc) = (candidate.row / min_dist, candidate.col / min_dist);
        let too_close = (br.saturating_sub(1)..=br + 1).any(|r| {
            (bc.saturating_sub(1)..=bc + 1).any(|c| {
                buckets.get(&(r, c)).is_some_and(|peaks| {
                    peaks
                        .iter()
                        .any(|p| p.distance_sq(&candidate) < min_dist_sq)
                })
            })
        });

        if !too_close {
            buckets.entry((br, bc)).or_default().push(candidate);
            accepted.push(candidate);
        }
    }

    Ok(accepted)
}
