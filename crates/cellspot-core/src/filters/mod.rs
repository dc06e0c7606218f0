//! Smoothing primitives used to estimate the local background level.

pub mod box_filter;
pub mod gaussian_blur;

pub use box_filter::box_mean_array;
pub use gaussian_blur::{gaussian_blur_array, gaussian_kernel_for_block};
