//! File-facing collaborators of the detection core: frame sources, image
//! files, overlays and per-frame output files.

pub mod image_io;
pub mod overlay;
pub mod report;
pub mod ser;
pub mod source;

pub use report::{BoxFormat, OutputLayout};
pub use source::FrameSource;
