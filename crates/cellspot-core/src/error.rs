use thiserror::Error;

#[derive(Error, Debug)]
pub enum CellspotError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid SER file: {0}")]
    InvalidSer(String),

    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error(
        "Dimension mismatch: expected {}x{}, got {}x{}",
        expected.1, expected.0, actual.1, actual.0
    )]
    DimensionMismatch {
        /// Expected (height, width).
        expected: (usize, usize),
        /// Actual (height, width).
        actual: (usize, usize),
    },

    #[error("Frame index {index} out of range (total: {total})")]
    FrameIndexOutOfRange { index: usize, total: usize },

    #[error("Unsupported input format: {0}")]
    UnsupportedFormat(String),

    #[error("Image format error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Empty frame sequence")]
    EmptySequence,
}

impl CellspotError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CellspotError>;
