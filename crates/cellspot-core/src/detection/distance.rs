use ndarray::{Array2, ArrayViewMut1, Axis, Zip};

use crate::consts::PARALLEL_PIXEL_THRESHOLD;

/// Per-pixel Euclidean distance to the nearest background pixel.
///
/// Zero on background. Pixels outside the image are not background, so a
/// mask without any background pixel maps to `f32::INFINITY` everywhere.
pub type DistanceField = Array2<f32>;

/// Stand-in for "no background on this line yet". Finite so the parabola
/// intersections below never see `inf - inf`.
const FAR: f64 = 1e20;

/// Exact Euclidean distance transform of a binary mask.
///
/// Separable lower-envelope-of-parabolas algorithm (Felzenszwalb and
/// Huttenlocher): one pass down the columns, one along the rows, on squared
/// distances. Linear in the number of pixels.
pub fn distance_transform(mask: &Array2<bool>) -> DistanceField {
    let (h, w) = mask.dim();
    let mut grid = mask.mapv(|fg| if fg { FAR } else { 0.0 });
    if h == 0 || w == 0 {
        return grid.mapv(|v| v as f32);
    }

    let parallel = h * w >= PARALLEL_PIXEL_THRESHOLD;
    transform_lanes(&mut grid, Axis(0), parallel);
    transform_lanes(&mut grid, Axis(1), parallel);

    grid.mapv(|sq| {
        if sq >= FAR / 2.0 {
            f32::INFINITY
        } else {
            sq.sqrt() as f32
        }
    })
}

/// Run the 1D squared-distance transform on every lane along `axis`.
fn transform_lanes(grid: &mut Array2<f64>, axis: Axis, parallel: bool) {
    let run = |mut lane: ArrayViewMut1<f64>| {
        let f = lane.to_vec();
        let d = lower_envelope(&f);
        for (out, v) in lane.iter_mut().zip(d) {
            *out = v;
        }
    };

    if parallel {
        Zip::from(grid.lanes_mut(axis)).par_for_each(run);
    } else {
        Zip::from(grid.lanes_mut(axis)).for_each(run);
    }
}

/// `d[q] = min_p (q - p)^2 + f[p]`.
fn lower_envelope(f: &[f64]) -> Vec<f64> {
    let n = f.len();
    let mut d = vec![0.0; n];
    if n == 0 {
        return d;
    }

    // v: parabola vertices in the envelope, z: boundaries between them.
    let mut v = vec![0usize; n];
    let mut z = vec![0.0f64; n + 1];
    let mut k = 0usize;
    z[0] = f64::NEG_INFINITY;
    z[1] = f64::INFINITY;

    let intersect = |q: usize, p: usize| -> f64 {
        let (qf, pf) = (q as f64, p as f64);
        ((f[q] + qf * qf) - (f[p] + pf * pf)) / (2.0 * qf - 2.0 * pf)
    };

    for q in 1..n {
        let mut s = intersect(q, v[k]);
        while s <= z[k] {
            k -= 1;
            s = intersect(q, v[k]);
        }
        k += 1;
        v[k] = q;
        z[k] = s;
        z[k + 1] = f64::INFINITY;
    }

    k = 0;
    for (q, out) in d.iter_mut().enumerate() {
        while z[k + 1] < q as f64 {
            k += 1;
        }
        let dq = q as f64 - v[k] as f64;
        *out = dq * dq + f[v[k]];
    }

    d
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lower_envelope_matches_brute_force() {
        let f = [FAR, 0.0, FAR, FAR, 4.0, FAR, 0.0, FAR];
        let d = lower_envelope(&f);
        for q in 0..f.len() {
            let brute = (0..f.len())
                .map(|p| (q as f64 - p as f64).powi(2) + f[p])
                .fold(f64::INFINITY, f64::min);
            assert!((d[q] - brute).abs() < 1e-6, "q={q}: {} vs {brute}", d[q]);
        }
    }
}
