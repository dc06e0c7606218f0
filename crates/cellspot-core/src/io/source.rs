use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{CellspotError, Result};
use crate::frame::{Frame, SourceInfo, SourceKind};

use super::image_io::load_frame;
use super::ser::SerReader;

const IMAGE_EXTENSIONS: &[&str] = &["png", "tif", "tiff", "jpg", "jpeg", "bmp", "pgm"];

/// An ordered sequence of grayscale frames on disk.
pub enum FrameSource {
    /// A SER video.
    Ser { path: PathBuf, reader: SerReader },
    /// One or more still images, one frame each.
    Images {
        path: PathBuf,
        files: Vec<PathBuf>,
        kind: SourceKind,
    },
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
}

impl FrameSource {
    /// Open a `.ser` video, a single image, or a directory of images
    /// (frames ordered by file name).
    pub fn open(path: &Path) -> Result<Self> {
        if path.is_dir() {
            let mut files: Vec<PathBuf> = std::fs::read_dir(path)?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| p.is_file() && is_image(p))
                .collect();
            files.sort();
            if files.is_empty() {
                return Err(CellspotError::EmptySequence);
            }
            debug!(dir = %path.display(), frames = files.len(), "Opened image sequence");
            return Ok(Self::Images {
                path: path.to_path_buf(),
                files,
                kind: SourceKind::ImageSequence,
            });
        }

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("ser") => Ok(Self::Ser {
                path: path.to_path_buf(),
                reader: SerReader::open(path)?,
            }),
            _ if is_image(path) => Ok(Self::Images {
                path: path.to_path_buf(),
                files: vec![path.to_path_buf()],
                kind: SourceKind::Image,
            }),
            _ => Err(CellspotError::UnsupportedFormat(path.display().to_string())),
        }
    }

    pub fn frame_count(&self) -> usize {
        match self {
            Self::Ser { reader, .. } => reader.frame_count(),
            Self::Images { files, .. } => files.len(),
        }
    }

    pub fn read_frame(&self, index: usize) -> Result<Frame> {
        match self {
            Self::Ser { reader, .. } => reader.read_frame(index),
            Self::Images { files, .. } => {
                let file = files.get(index).ok_or(CellspotError::FrameIndexOutOfRange {
                    index,
                    total: files.len(),
                })?;
                load_frame(file, index)
            }
        }
    }

    /// Read frames `start..end` (`end` exclusive, clamped to the frame
    /// count; `None` reads to the end).
    pub fn read_range(&self, start: usize, end: Option<usize>) -> Result<Vec<Frame>> {
        let total = self.frame_count();
        let end = end.unwrap_or(total).min(total);
        if start >= total {
            return Err(CellspotError::FrameIndexOutOfRange { index: start, total });
        }
        if start >= end {
            return Err(CellspotError::EmptySequence);
        }
        (start..end).map(|i| self.read_frame(i)).collect()
    }

    pub fn info(&self) -> Result<SourceInfo> {
        match self {
            Self::Ser { path, reader } => Ok(reader.source_info(path)),
            Self::Images { path, files, kind } => {
                let first = self.read_frame(0)?;
                Ok(SourceInfo {
                    path: path.clone(),
                    kind: kind.clone(),
                    total_frames: files.len(),
                    width: first.width() as u32,
                    height: first.height() as u32,
                })
            }
        }
    }
}
