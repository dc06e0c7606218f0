use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::background::upscale_mask;
use crate::detection::FrameResult;
use crate::error::Result;
use crate::frame::{Frame, Mask};

use super::image_io::{save_gray, save_mask};
use super::overlay::draw_detections;

/// Encoding of the per-frame box files.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoxFormat {
    /// Dict-style dump, e.g. `{0: {'x': 3, 'y': 4, 'width': 10, 'height': 11}}`.
    #[default]
    Text,
    /// JSON object keyed by box index.
    Json,
}

impl BoxFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Text => "txt",
            Self::Json => "json",
        }
    }
}

/// Names per-frame output files after an output path: `out/run.avi` gives
/// `out/run_frame_12.tif`, `out/run_frame_12.txt`, `out/run_mask_12.png`.
#[derive(Clone, Debug)]
pub struct OutputLayout {
    stem: PathBuf,
}

impl OutputLayout {
    pub fn new(output: &Path) -> Self {
        Self {
            stem: output.with_extension(""),
        }
    }

    fn with_suffix(&self, suffix: &str) -> PathBuf {
        let mut name = self.stem.as_os_str().to_os_string();
        name.push(suffix);
        PathBuf::from(name)
    }

    pub fn annotated_path(&self, frame_number: usize) -> PathBuf {
        self.with_suffix(&format!("_frame_{frame_number}.tif"))
    }

    pub fn boxes_path(&self, frame_number: usize, format: BoxFormat) -> PathBuf {
        self.with_suffix(&format!("_frame_{frame_number}.{}", format.extension()))
    }

    pub fn mask_path(&self, frame_number: usize) -> PathBuf {
        self.with_suffix(&format!("_mask_{frame_number}.png"))
    }

    /// Create the directory the outputs go to, if needed.
    pub fn prepare(&self) -> Result<()> {
        if let Some(parent) = self.stem.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

pub fn format_boxes(result: &FrameResult, format: BoxFormat) -> Result<String> {
    Ok(match format {
        BoxFormat::Text => format!("{result}\n"),
        BoxFormat::Json => serde_json::to_string_pretty(result)? + "\n",
    })
}

/// Write the annotated frame and the box file of one frame.
///
/// `scale` is the factor between the frame and the grid the boxes are in;
/// the box file keeps the boxes as given, the overlay maps them onto the
/// frame first.
pub fn write_frame_outputs(
    layout: &OutputLayout,
    frame_number: usize,
    frame: &Frame,
    result: &FrameResult,
    scale: usize,
    format: BoxFormat,
) -> Result<()> {
    let annotated = if scale > 1 {
        draw_detections(&frame.data, &result.scaled(scale, frame.data.dim()))
    } else {
        draw_detections(&frame.data, result)
    };
    save_gray(&annotated, &layout.annotated_path(frame_number))?;
    std::fs::write(
        layout.boxes_path(frame_number, format),
        format_boxes(result, format)?,
    )?;
    Ok(())
}

/// Write a tuning-mode mask, upscaled to the resolution of its frame.
pub fn write_mask_output(layout: &OutputLayout, frame_number: usize, mask: &Mask) -> Result<()> {
    let full = Mask::new(upscale_mask(mask));
    save_mask(&full, &layout.mask_path(frame_number))
}
