use ndarray::{Array2, ArrayView2};

/// Mean over a `size x size` window centered on each pixel, with replicated
/// borders. Runs in time independent of `size` using running sums.
pub fn box_mean_array(data: &Array2<f32>, size: usize) -> Array2<f32> {
    let horizontal = mean_along_rows(data.view(), size);
    let vertical = mean_along_rows(horizontal.t(), size);
    vertical.reversed_axes().as_standard_layout().into_owned()
}

fn mean_along_rows(data: ArrayView2<f32>, size: usize) -> Array2<f32> {
    let (h, w) = data.dim();
    let mut result = Array2::<f32>::zeros((h, w));
    if w == 0 {
        return result;
    }

    let radius = size / 2;
    let mut prefix = vec![0.0f64; w + 2 * radius + 1];

    for row in 0..h {
        let src = data.row(row);
        for i in 0..w + 2 * radius {
            let col = (i as isize - radius as isize).clamp(0, w as isize - 1) as usize;
            prefix[i + 1] = prefix[i] + src[col] as f64;
        }
        for col in 0..w {
            let sum = prefix[col + 2 * radius + 1] - prefix[col];
            result[[row, col]] = (sum / (2 * radius + 1) as f64) as f32;
        }
    }

    result
}
