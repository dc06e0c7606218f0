/// Minimum pixel count (h*w) to use row-level Rayon parallelism.
pub const PARALLEL_PIXEL_THRESHOLD: usize = 65_536;

/// Minimum frame count to use frame-level Rayon parallelism.
pub const PARALLEL_FRAME_THRESHOLD: usize = 4;

/// Default fraction of the mean box area below which a box is discarded (`-w`).
pub const DEFAULT_MIN_BOX_WEIGHT: f64 = 0.2;

/// Default minimum distance in pixels between two accepted peaks (`-d`).
pub const DEFAULT_MIN_LOCAL_MAX_DIST: usize = 7;

/// Default downsampling factor before thresholding (`-n`). 1 disables resampling.
pub const DEFAULT_WINDOW_SIZE: usize = 1;

/// Default neighborhood size of the adaptive threshold (`-b`). Must be odd.
pub const DEFAULT_BLOCK_SIZE: usize = 1001;

/// Default constant subtracted from the local mean (`-c`), in 8-bit intensity units.
pub const DEFAULT_SUBTRACTED_CONSTANT: f32 = -10.0;

/// Pixel value written for foreground when a mask is rendered as an image.
pub const MASK_FOREGROUND_VALUE: u8 = 255;

/// Intensity of rectangles and labels drawn on annotated frames.
pub const OVERLAY_INTENSITY: u8 = 255;

/// Line thickness in pixels of drawn bounding boxes.
pub const OVERLAY_LINE_THICKNESS: usize = 2;

/// Vertical offset in pixels of a box label above the box's top edge.
pub const OVERLAY_LABEL_OFFSET: usize = 10;

/// ITU-R BT.601 luminance coefficient for the red channel.
pub const LUMINANCE_R: f32 = 0.299;

/// ITU-R BT.601 luminance coefficient for the green channel.
pub const LUMINANCE_G: f32 = 0.587;

/// ITU-R BT.601 luminance coefficient for the blue channel.
pub const LUMINANCE_B: f32 = 0.114;
