use ndarray::Array2;

use crate::frame::Mask;

/// Convert a frame to f32 intensities, averaging `factor x factor` blocks.
///
/// Edge blocks that run past the image average only the pixels they cover,
/// so the output shape is `ceil(h / factor) x ceil(w / factor)`. A factor of
/// 1 is a plain conversion.
pub fn downsample_area(data: &Array2<u8>, factor: usize) -> Array2<f32> {
    if factor <= 1 {
        return data.mapv(|v| v as f32);
    }

    let (h, w) = data.dim();
    let (out_h, out_w) = Mask::expected_dim((h, w), factor);
    let mut result = Array2::<f32>::zeros((out_h, out_w));

    for out_row in 0..out_h {
        let row_start = out_row * factor;
        let row_end = (row_start + factor).min(h);
        for out_col in 0..out_w {
            let col_start = out_col * factor;
            let col_end = (col_start + factor).min(w);

            let mut sum = 0u32;
            for row in row_start..row_end {
                for col in col_start..col_end {
                    sum += data[[row, col]] as u32;
                }
            }
            let count = ((row_end - row_start) * (col_end - col_start)) as f32;
            result[[out_row, out_col]] = sum as f32 / count;
        }
    }

    result
}

/// Nearest-neighbor upscale of a mask back to its source frame resolution.
pub fn upscale_mask(mask: &Mask) -> Array2<bool> {
    if mask.scale <= 1 {
        return mask.data.clone();
    }
    let (h, w) = mask.source_dim;
    let (mh, mw) = mask.data.dim();
    Array2::from_shape_fn((h, w), |(row, col)| {
        let r = (row / mask.scale).min(mh.saturating_sub(1));
        let c = (col / mask.scale).min(mw.saturating_sub(1));
        mask.data[[r, c]]
    })
}
