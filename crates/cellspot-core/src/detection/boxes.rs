use serde::{Deserialize, Serialize};

use super::watershed::Labels;

/// Axis-aligned rectangle in pixels, top-left origin. `width` and `height`
/// count pixels and are always at least 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl BoundingBox {
    pub fn area(&self) -> usize {
        self.width * self.height
    }

    /// One past the last column.
    pub fn right(&self) -> usize {
        self.x + self.width
    }

    /// One past the last row.
    pub fn bottom(&self) -> usize {
        self.y + self.height
    }

    /// Map a box from a mask downsampled by `scale` back to source pixels,
    /// clipped to `source_dim` (height, width).
    pub fn scaled(&self, scale: usize, source_dim: (usize, usize)) -> Self {
        if scale <= 1 {
            return *self;
        }
        let (h, w) = source_dim;
        let x = self.x * scale;
        let y = self.y * scale;
        Self {
            x,
            y,
            width: (self.right() * scale).min(w) - x,
            height: (self.bottom() * scale).min(h) - y,
        }
    }
}

/// Minimal bounding rectangle of every label `1..=num_labels`, in label
/// order. Labels without pixels produce no box.
pub fn extract_boxes(labels: &Labels, num_labels: usize) -> Vec<BoundingBox> {
    // (min_row, max_row, min_col, max_col) per label.
    let mut extents: Vec<Option<(usize, usize, usize, usize)>> = vec![None; num_labels];

    for ((row, col), &label) in labels.indexed_iter() {
        if label == 0 || label as usize > num_labels {
            continue;
        }
        let entry = &mut extents[label as usize - 1];
        match entry {
            Some(bbox) => {
                bbox.0 = bbox.0.min(row);
                bbox.1 = bbox.1.max(row);
                bbox.2 = bbox.2.min(col);
                bbox.3 = bbox.3.max(col);
            }
            None => *entry = Some((row, row, col, col)),
        }
    }

    extents
        .into_iter()
        .flatten()
        .map(|(min_row, max_row, min_col, max_col)| BoundingBox {
            x: min_col,
            y: min_row,
            width: max_col - min_col + 1,
            height: max_row - min_row + 1,
        })
        .collect()
}

/// Drop boxes whose area is below `min_box_weight` times the mean box area.
///
/// Order is preserved. No boxes in, no boxes out; a weight of 0 keeps all.
pub fn filter_boxes(boxes: Vec<BoundingBox>, min_box_weight: f64) -> Vec<BoundingBox> {
    if boxes.is_empty() || min_box_weight <= 0.0 {
        return boxes;
    }

    let total: usize = boxes.iter().map(BoundingBox::area).sum();
    let mean_area = total as f64 / boxes.len() as f64;
    let min_area = min_box_weight * mean_area;

    boxes
        .into_iter()
        .filter(|b| b.area() as f64 >= min_area)
        .collect()
}
