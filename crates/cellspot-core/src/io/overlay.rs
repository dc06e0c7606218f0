use ndarray::Array2;

use crate::consts::{OVERLAY_INTENSITY, OVERLAY_LABEL_OFFSET, OVERLAY_LINE_THICKNESS};
use crate::detection::{BoundingBox, FrameResult};

/// 3x5 digit glyphs, one 3-bit row per entry, most significant bit leftmost.
const DIGITS: [[u8; 5]; 10] = [
    [0b111, 0b101, 0b101, 0b101, 0b111],
    [0b010, 0b110, 0b010, 0b010, 0b111],
    [0b111, 0b001, 0b111, 0b100, 0b111],
    [0b111, 0b001, 0b111, 0b001, 0b111],
    [0b101, 0b101, 0b111, 0b001, 0b001],
    [0b111, 0b100, 0b111, 0b001, 0b111],
    [0b111, 0b100, 0b111, 0b101, 0b111],
    [0b111, 0b001, 0b001, 0b001, 0b001],
    [0b111, 0b101, 0b111, 0b101, 0b111],
    [0b111, 0b101, 0b111, 0b001, 0b111],
];
const GLYPH_WIDTH: usize = 3;
const GLYPH_HEIGHT: usize = 5;
const GLYPH_SPACING: usize = 1;

/// Copy of `frame` with every box outlined and labelled with its index.
///
/// Boxes must be in the frame's pixel grid (see `CoordinateSpace`); anything
/// falling outside the frame is clipped.
pub fn draw_detections(frame: &Array2<u8>, result: &FrameResult) -> Array2<u8> {
    let mut canvas = frame.clone();
    for (index, b) in result.iter() {
        draw_rectangle(&mut canvas, b);
        let baseline = b.y as isize - OVERLAY_LABEL_OFFSET as isize;
        draw_number(&mut canvas, index, b.x as isize, baseline);
    }
    canvas
}

fn put(canvas: &mut Array2<u8>, row: isize, col: isize) {
    let (h, w) = canvas.dim();
    if row >= 0 && col >= 0 && (row as usize) < h && (col as usize) < w {
        canvas[[row as usize, col as usize]] = OVERLAY_INTENSITY;
    }
}

/// Outline from the top-left corner to `(right, bottom)` inclusive, growing
/// inwards by the line thickness.
fn draw_rectangle(canvas: &mut Array2<u8>, b: &BoundingBox) {
    let (x0, y0) = (b.x as isize, b.y as isize);
    let (x1, y1) = (b.right() as isize, b.bottom() as isize);

    for t in 0..OVERLAY_LINE_THICKNESS as isize {
        for col in x0..=x1 {
            put(canvas, y0 + t, col);
            put(canvas, y1 - t, col);
        }
        for row in y0..=y1 {
            put(canvas, row, x0 + t);
            put(canvas, row, x1 - t);
        }
    }
}

/// Draw `value` in decimal with its bottom-left corner at `(baseline, left)`.
fn draw_number(canvas: &mut Array2<u8>, value: usize, left: isize, baseline: isize) {
    let top = baseline - GLYPH_HEIGHT as isize + 1;
    for (i, ch) in value.to_string().bytes().enumerate() {
        let glyph = &DIGITS[(ch - b'0') as usize];
        let x = left + (i * (GLYPH_WIDTH + GLYPH_SPACING)) as isize;
        for (dy, bits) in glyph.iter().enumerate() {
            for dx in 0..GLYPH_WIDTH {
                if bits & (1 << (GLYPH_WIDTH - 1 - dx)) != 0 {
                    put(canvas, top + dy as isize, x + dx as isize);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digit_one_shape() {
        let mut canvas = Array2::<u8>::zeros((5, 3));
        draw_number(&mut canvas, 1, 0, 4);
        let lit: Vec<bool> = canvas.iter().map(|&v| v > 0).collect();
        #[rustfmt::skip]
        let expected = [
            false, true, false,
            true, true, false,
            false, true, false,
            false, true, false,
            true, true, true,
        ];
        assert_eq!(lit, expected);
    }
}
