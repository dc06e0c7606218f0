use std::cmp::Ordering;
use std::collections::BinaryHeap;

use ndarray::Array2;

use crate::error::{CellspotError, Result};

use super::distance::DistanceField;
use super::peaks::Peak;

/// Region label per pixel. 0 = unlabeled; label `k` was grown from seed `k - 1`.
pub type Labels = Array2<u32>;

/// Heap entry of the priority flood. The heap pops the highest distance
/// first (the flood runs over the negated field); equal levels pop in the
/// order they were pushed.
struct FloodEntry {
    level: f32,
    age: u64,
    row: usize,
    col: usize,
}

impl Ord for FloodEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.level
            .total_cmp(&other.level)
            .then_with(|| other.age.cmp(&self.age))
    }
}

impl PartialOrd for FloodEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for FloodEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FloodEntry {}

/// Marker-controlled watershed of the foreground of `mask`.
///
/// Each seed floods outward over 4-connected foreground pixels, deepest
/// basin (largest distance) first. A pixel takes the label of whichever
/// region reaches it first; there are no watershed lines, so touching
/// regions share a boundary without a gap. Background pixels are never
/// entered, and foreground components without a seed stay unlabeled.
///
/// Seeds off the mask, out of bounds, or on an already seeded pixel are
/// skipped; their label is simply never used.
pub fn watershed(field: &DistanceField, mask: &Array2<bool>, seeds: &[Peak]) -> Result<Labels> {
    if field.dim() != mask.dim() {
        return Err(CellspotError::DimensionMismatch {
            expected: mask.dim(),
            actual: field.dim(),
        });
    }

    let (h, w) = mask.dim();
    let mut labels = Labels::zeros((h, w));
    let mut heap = BinaryHeap::new();
    let mut age = 0u64;

    for (i, seed) in seeds.iter().enumerate() {
        let (row, col) = (seed.row, seed.col);
        if row >= h || col >= w || !mask[[row, col]] || labels[[row, col]] != 0 {
            continue;
        }
        labels[[row, col]] = i as u32 + 1;
        heap.push(FloodEntry {
            level: field[[row, col]],
            age,
            row,
            col,
        });
        age += 1;
    }

    while let Some(FloodEntry { row, col, .. }) = heap.pop() {
        let label = labels[[row, col]];
        let neighbors = [
            (row.wrapping_sub(1), col),
            (row + 1, col),
            (row, col.wrapping_sub(1)),
            (row, col + 1),
        ];
        for (nr, nc) in neighbors {
            if nr >= h || nc >= w || !mask[[nr, nc]] || labels[[nr, nc]] != 0 {
                continue;
            }
            labels[[nr, nc]] = label;
            heap.push(FloodEntry {
                level: field[[nr, nc]],
                age,
                row: nr,
                col: nc,
            });
            age += 1;
        }
    }

    Ok(labels)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flood_stops_at_background() {
        // Two foreground runs separated by a background column.
        let mut mask = Array2::from_elem((3, 5), true);
        for row in 0..3 {
            mask[[row, 2]] = false;
        }
        let field = Array2::from_elem((3, 5), 1.0f32);
        let seeds = [Peak {
            row: 1,
            col: 0,
            value: 1.0,
        }];
        let labels = watershed(&field, &mask, &seeds).unwrap();
        assert_eq!(labels[[0, 1]], 1);
        assert_eq!(labels[[1, 2]], 0);
        assert_eq!(labels[[1, 4]], 0);
    }

    #[test]
    fn seed_on_background_is_skipped() {
        let mask = Array2::from_elem((2, 2), false);
        let field = Array2::<f32>::zeros((2, 2));
        let seeds = [Peak {
            row: 0,
            col: 0,
            value: 0.0,
        }];
        let labels = watershed(&field, &mask, &seeds).unwrap();
        assert!(labels.iter().all(|&l| l == 0));
    }
}
