use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use cellspot_core::background::{AdaptiveMethod, BackgroundConfig, Polarity};
use cellspot_core::detection::{CoordinateSpace, DetectionConfig, Detections};
use cellspot_core::frame::{Frame, Mask};
use cellspot_core::io::report::{write_frame_outputs, write_mask_output};
use cellspot_core::io::{BoxFormat, FrameSource, OutputLayout};
use cellspot_core::pipeline::{run_pipeline_reported, PipelineConfig, PipelineOutput};
use clap::{Args, ValueEnum};
use tracing::{info, warn};

use crate::progress::BarReporter;
use crate::summary::{print_detections, print_run_summary};

#[derive(Clone, ValueEnum)]
pub enum AdaptiveMethodArg {
    Mean,
    Gaussian,
}

#[derive(Clone, ValueEnum)]
pub enum CoordinatesArg {
    /// Boxes on the (possibly downsampled) mask grid
    Mask,
    /// Boxes scaled back to source frame pixels
    Source,
}

#[derive(Clone, ValueEnum)]
pub enum FormatArg {
    Text,
    Json,
}

#[derive(Args)]
pub struct RunArgs {
    /// SER video, image file or directory of images
    pub input: PathBuf,

    /// Output path; per-frame files are named after its stem
    pub output: PathBuf,

    /// Pipeline config file (TOML); replaces the parameter flags below
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Drop boxes smaller than this fraction of the mean box area (0 keeps all)
    #[arg(short = 'w', long, default_value = "0.2")]
    pub min_box_weight: f64,

    /// Minimum distance in pixels between two cell centers
    #[arg(short = 'd', long, default_value = "7")]
    pub min_local_max_dist: usize,

    /// Downsampling factor before thresholding (1 = full resolution)
    #[arg(short = 'n', long, default_value = "1")]
    pub window_size: usize,

    /// Odd neighborhood size of the adaptive threshold
    #[arg(short = 'b', long, default_value = "1001")]
    pub block_size: usize,

    /// Constant subtracted from the local mean
    #[arg(short = 'c', long, default_value = "-10", allow_negative_numbers = true)]
    pub subtracted_constant: f32,

    /// 0 = bright cells on a dark background, 1 = dark cells on a light one
    #[arg(
        short = 'r',
        long,
        default_value = "0",
        value_parser = clap::value_parser!(u8).range(0..=1)
    )]
    pub background_relative: u8,

    /// Write foreground masks instead of running detection
    #[arg(short = 't', long)]
    pub tuning_mode: bool,

    /// Local mean used by the adaptive threshold
    #[arg(long, value_enum, default_value = "gaussian")]
    pub adaptive_method: AdaptiveMethodArg,

    /// Pixel grid of the reported boxes
    #[arg(long, value_enum, default_value = "mask")]
    pub coordinates: CoordinatesArg,

    /// First frame to process
    #[arg(long, default_value = "0")]
    pub start: usize,

    /// Frame to stop before (default: end of input)
    #[arg(long)]
    pub end: Option<usize>,

    /// Encoding of the per-frame box files
    #[arg(long, value_enum, default_value = "text")]
    pub format: FormatArg,
}

pub fn run(args: &RunArgs) -> Result<()> {
    let config = if let Some(ref config_path) = args.config {
        let contents = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config {}", config_path.display()))?;
        toml::from_str(&contents).context("Invalid pipeline config")?
    } else {
        build_config_from_args(args)?
    };
    config.validate().context("Invalid pipeline parameters")?;

    let source = FrameSource::open(&args.input)
        .with_context(|| format!("Failed to open {}", args.input.display()))?;
    let info = source.info()?;
    let frames = source
        .read_range(args.start, args.end)
        .context("Failed to read frames")?;
    let end = args.start + frames.len();

    print_run_summary(&info, &args.output, &config, (args.start, end));

    let reporter = BarReporter::new()?;
    let output = run_pipeline_reported(&frames, &config, &reporter)?;

    let layout = OutputLayout::new(&args.output);
    layout.prepare().with_context(|| {
        format!(
            "Failed to create output directory for {}",
            args.output.display()
        )
    })?;

    match output {
        PipelineOutput::Masks(masks) => write_masks(&layout, args.start, &masks),
        PipelineOutput::Detections(detections) => {
            let format = match args.format {
                FormatArg::Text => BoxFormat::Text,
                FormatArg::Json => BoxFormat::Json,
            };
            write_detections(&layout, args.start, &frames, &detections, &config, format)?;
            print_detections(&detections, args.start);
            Ok(())
        }
    }
}

fn build_config_from_args(args: &RunArgs) -> Result<PipelineConfig> {
    let method = match args.adaptive_method {
        AdaptiveMethodArg::Mean => AdaptiveMethod::Mean,
        AdaptiveMethodArg::Gaussian => AdaptiveMethod::Gaussian,
    };
    let coordinate_space = match args.coordinates {
        CoordinatesArg::Mask => CoordinateSpace::Mask,
        CoordinatesArg::Source => CoordinateSpace::Source,
    };

    Ok(PipelineConfig {
        background: BackgroundConfig {
            window_size: args.window_size,
            block_size: args.block_size,
            subtracted_constant: args.subtracted_constant,
            polarity: Polarity::from_flag(args.background_relative)?,
            method,
        },
        detection: DetectionConfig {
            min_box_weight: args.min_box_weight,
            min_local_max_dist: args.min_local_max_dist,
            coordinate_space,
        },
        tuning_mode: args.tuning_mode,
    })
}

fn write_masks(
    layout: &OutputLayout,
    start: usize,
    masks: &[cellspot_core::error::Result<Mask>],
) -> Result<()> {
    let mut written = 0;
    for (ordinal, mask) in masks.iter().enumerate() {
        let frame_number = start + ordinal;
        match mask {
            Ok(mask) => {
                write_mask_output(layout, frame_number, mask).with_context(|| {
                    format!("Failed to write mask {}", layout.mask_path(frame_number).display())
                })?;
                written += 1;
            }
            Err(e) => {
                warn!(frame = frame_number, error = %e, "No mask written");
                eprintln!("{}: {e}", Detections::frame_key(frame_number));
            }
        }
    }

    if written == 0 {
        bail!("Background removal failed for every frame");
    }
    println!("\n{written} mask(s) written next to {}", layout.mask_path(start).display());
    Ok(())
}

fn write_detections(
    layout: &OutputLayout,
    start: usize,
    frames: &[Frame],
    detections: &Detections,
    config: &PipelineConfig,
    format: BoxFormat,
) -> Result<()> {
    // Mask-space boxes are mapped onto the frame for the overlay only.
    let overlay_scale = match config.detection.coordinate_space {
        CoordinateSpace::Mask => config.background.window_size,
        CoordinateSpace::Source => 1,
    };

    for (ordinal, result) in detections.successes() {
        let frame_number = start + ordinal;
        let Some(frame) = frames.get(ordinal) else {
            continue;
        };
        write_frame_outputs(layout, frame_number, frame, result, overlay_scale, format)
            .with_context(|| format!("Failed to write outputs of frame {frame_number}"))?;
        info!(frame = frame_number, boxes = result.len(), "Outputs written");
    }
    Ok(())
}
