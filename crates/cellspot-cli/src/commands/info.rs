use std::path::PathBuf;

use anyhow::{Context, Result};
use cellspot_core::frame::SourceKind;
use cellspot_core::io::FrameSource;
use clap::Args;

#[derive(Args)]
pub struct InfoArgs {
    /// SER video, image file or directory of images
    pub input: PathBuf,
}

pub fn run(args: &InfoArgs) -> Result<()> {
    let source = FrameSource::open(&args.input)
        .with_context(|| format!("Failed to open {}", args.input.display()))?;
    let info = source.info()?;

    println!("Input:       {}", info.path.display());
    println!("Frames:      {}", info.total_frames);
    println!("Dimensions:  {}x{}", info.width, info.height);

    match info.kind {
        SourceKind::Ser {
            color_id,
            bit_depth,
        } => {
            println!("Format:      SER");
            println!("Bit depth:   {}", bit_depth);
            println!("Color ID:    {}", color_id);
        }
        SourceKind::Image => println!("Format:      image"),
        SourceKind::ImageSequence => println!("Format:      image sequence"),
    }

    if let FrameSource::Ser { reader, .. } = &source {
        if let Some(frame_bytes) = reader.header.frame_byte_size() {
            let total_mb = (frame_bytes * info.total_frames) as f64 / (1024.0 * 1024.0);
            println!("Data size:   {:.1} MB", total_mb);
        }
    }

    Ok(())
}
