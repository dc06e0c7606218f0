use std::path::PathBuf;

use ndarray::Array2;

/// A single 8-bit grayscale video frame.
#[derive(Clone, Debug)]
pub struct Frame {
    /// Pixel data, row-major, shape = (height, width)
    pub data: Array2<u8>,
    /// Optional per-frame metadata
    pub metadata: FrameMetadata,
}

impl Frame {
    pub fn new(data: Array2<u8>) -> Self {
        Self {
            data,
            metadata: FrameMetadata::default(),
        }
    }

    pub fn with_index(data: Array2<u8>, frame_index: usize) -> Self {
        Self {
            data,
            metadata: FrameMetadata {
                frame_index,
                timestamp_us: None,
            },
        }
    }

    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    pub fn height(&self) -> usize {
        self.data.nrows()
    }
}

#[derive(Clone, Debug, Default)]
pub struct FrameMetadata {
    /// Absolute frame number within the source video.
    pub frame_index: usize,
    pub timestamp_us: Option<u64>,
}

/// Binary foreground mask produced by background removal.
///
/// The mask lives at the resolution it was thresholded at: a frame of
/// `source_dim` downsampled by `scale` gives a mask of
/// `ceil(source_dim / scale)`.
#[derive(Clone, Debug, PartialEq)]
pub struct Mask {
    /// `true` marks foreground, shape = (height, width)
    pub data: Array2<bool>,
    /// Downsampling factor between the source frame and this mask.
    pub scale: usize,
    /// (height, width) of the frame the mask was computed from.
    pub source_dim: (usize, usize),
}

impl Mask {
    /// Wrap a full-resolution mask (scale 1).
    pub fn new(data: Array2<bool>) -> Self {
        let source_dim = data.dim();
        Self {
            data,
            scale: 1,
            source_dim,
        }
    }

    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    pub fn height(&self) -> usize {
        self.data.nrows()
    }

    pub fn foreground_count(&self) -> usize {
        self.data.iter().filter(|&&v| v).count()
    }

    /// Shape a mask of `source_dim` downsampled by `scale` must have.
    pub fn expected_dim(source_dim: (usize, usize), scale: usize) -> (usize, usize) {
        let scale = scale.max(1);
        (source_dim.0.div_ceil(scale), source_dim.1.div_ceil(scale))
    }
}

/// Kind of container a frame sequence was read from.
#[derive(Clone, Debug, PartialEq)]
pub enum SourceKind {
    /// SER video file.
    Ser { color_id: i32, bit_depth: u8 },
    /// A single still image.
    Image,
    /// A directory of still images, one per frame.
    ImageSequence,
}

/// Metadata about a frame source.
#[derive(Clone, Debug)]
pub struct SourceInfo {
    pub path: PathBuf,
    pub kind: SourceKind,
    pub total_frames: usize,
    pub width: u32,
    pub height: u32,
}
