use ndarray::{Array2, ArrayViewMut1, Axis};
use rayon::prelude::*;

use crate::consts::PARALLEL_PIXEL_THRESHOLD;

/// Sigma of the Gaussian window used for an adaptive threshold of the given
/// block size, following the usual `0.3 * ((size - 1) / 2 - 1) + 0.8` rule.
pub fn block_sigma(block_size: usize) -> f32 {
    0.3 * ((block_size as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Normalized 1D Gaussian kernel with exactly `block_size` taps.
pub fn gaussian_kernel_for_block(block_size: usize) -> Vec<f32> {
    make_gaussian_kernel(block_size, block_sigma(block_size))
}

fn make_gaussian_kernel(size: usize, sigma: f32) -> Vec<f32> {
    let radius = (size / 2) as f32;
    let s2 = 2.0 * sigma * sigma;
    let mut kernel: Vec<f32> = (0..size)
        .map(|i| {
            let x = i as f32 - radius;
            (-x * x / s2).exp()
        })
        .collect();

    let sum: f32 = kernel.iter().sum();
    for v in &mut kernel {
        *v /= sum;
    }

    kernel
}

/// Separable Gaussian smoothing with a precomputed kernel. Borders replicate
/// the edge pixel.
pub fn gaussian_blur_array(data: &Array2<f32>, kernel: &[f32]) -> Array2<f32> {
    let row_pass = convolve_rows(data, kernel);
    convolve_cols(&row_pass, kernel)
}

fn convolve_rows(data: &Array2<f32>, kernel: &[f32]) -> Array2<f32> {
    let (h, w) = data.dim();
    let radius = kernel.len() / 2;
    let mut result = Array2::<f32>::zeros((h, w));

    let fill = |row: usize, mut out: ArrayViewMut1<f32>| {
        let src = data.row(row);
        for col in 0..w {
            let mut sum = 0.0f32;
            for (ki, &kv) in kernel.iter().enumerate() {
                let src_col =
                    (col as isize + ki as isize - radius as isize).clamp(0, w as isize - 1);
                sum += src[src_col as usize] * kv;
            }
            out[col] = sum;
        }
    };

    if h * w >= PARALLEL_PIXEL_THRESHOLD {
        result
            .axis_iter_mut(Axis(0))
            .into_par_iter()
            .enumerate()
            .for_each(|(row, out)| fill(row, out));
    } else {
        for (row, out) in result.axis_iter_mut(Axis(0)).enumerate() {
            fill(row, out);
        }
    }
    result
}

fn convolve_cols(data: &Array2<f32>, kernel: &[f32]) -> Array2<f32> {
    let (h, w) = data.dim();
    let radius = kernel.len() / 2;
    let mut result = Array2::<f32>::zeros((h, w));

    // Accumulate whole source rows so the inner loop stays contiguous.
    let fill = |row: usize, mut out: ArrayViewMut1<f32>| {
        for (ki, &kv) in kernel.iter().enumerate() {
            let src_row = (row as isize + ki as isize - radius as isize).clamp(0, h as isize - 1);
            out.scaled_add(kv, &data.row(src_row as usize));
        }
    };

    if h * w >= PARALLEL_PIXEL_THRESHOLD {
        result
            .axis_iter_mut(Axis(0))
            .into_par_iter()
            .enumerate()
            .for_each(|(row, out)| fill(row, out));
    } else {
        for (row, out) in result.axis_iter_mut(Axis(0)).enumerate() {
            fill(row, out);
        }
    }
    result
}
