use ndarray::{Array2, Zip};

use super::config::Polarity;

/// Classify every pixel against `local_mean - subtracted_constant`.
///
/// Polarity only flips the comparison; the intensities are never inverted.
pub fn adaptive_threshold(
    data: &Array2<f32>,
    local_mean: &Array2<f32>,
    subtracted_constant: f32,
    polarity: Polarity,
) -> Array2<bool> {
    debug_assert_eq!(data.dim(), local_mean.dim());
    Zip::from(data)
        .and(local_mean)
        .map_collect(|&v, &mean| polarity.is_foreground(v, mean - subtracted_constant))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn polarity_flips_comparison_only() {
        let data = Array2::from_shape_vec((1, 3), vec![90.0f32, 100.0, 120.0]).unwrap();
        let mean = Array2::from_elem((1, 3), 100.0f32);

        let dark = adaptive_threshold(&data, &mean, -10.0, Polarity::DarkBackground);
        assert_eq!(dark.as_slice().unwrap(), &[false, false, true]);

        let light = adaptive_threshold(&data, &mean, 5.0, Polarity::LightBackground);
        assert_eq!(light.as_slice().unwrap(), &[true, false, false]);
    }

    #[test]
    fn pixel_on_threshold_is_background() {
        let data = Array2::from_elem((2, 2), 110.0f32);
        let mean = Array2::from_elem((2, 2), 100.0f32);
        let dark = adaptive_threshold(&data, &mean, -10.0, Polarity::DarkBackground);
        assert!(dark.iter().all(|&v| !v));
        let light = adaptive_threshold(&data, &mean, -10.0, Polarity::LightBackground);
        assert!(light.iter().all(|&v| !v));
    }
}
