use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;
use tracing::{info, warn};

use crate::background::{remove_background_with, BackgroundContext};
use crate::consts::PARALLEL_FRAME_THRESHOLD;
use crate::detection::{detect_frame, Detections, FrameResult};
use crate::error::{CellspotError, Result};
use crate::frame::{Frame, Mask};

use super::config::PipelineConfig;
use super::types::{NoOpReporter, PipelineOutput, PipelineStage, ProgressReporter};

/// Run background removal and, unless in tuning mode, detection.
pub fn run_pipeline(frames: &[Frame], config: &PipelineConfig) -> Result<PipelineOutput> {
    run_pipeline_reported(frames, config, &NoOpReporter)
}

/// Run the pipeline with a thread-safe progress reporter.
///
/// The configuration is validated before any frame is touched. A frame that
/// fails background removal keeps its error through detection, so the
/// output still has one entry per input frame.
pub fn run_pipeline_reported(
    frames: &[Frame],
    config: &PipelineConfig,
    reporter: &dyn ProgressReporter,
) -> Result<PipelineOutput> {
    config.validate()?;
    if frames.is_empty() {
        return Err(CellspotError::EmptySequence);
    }

    let context = BackgroundContext::for_frames(&config.background, frames)?;
    let (h, w) = context.source_dim();
    info!(
        frames = frames.len(),
        width = w,
        height = h,
        tuning_mode = config.tuning_mode,
        "Starting pipeline"
    );

    reporter.begin_stage(PipelineStage::RemovingBackground, Some(frames.len()));
    let done = AtomicUsize::new(0);
    let masks = remove_background_with(&context, frames, |_| {
        reporter.advance(done.fetch_add(1, Ordering::Relaxed) + 1);
    });
    reporter.finish_stage();

    if config.tuning_mode {
        info!("Tuning mode: returning masks without segmentation");
        return Ok(PipelineOutput::Masks(masks));
    }

    reporter.begin_stage(PipelineStage::Detecting, Some(masks.len()));
    let done = AtomicUsize::new(0);
    let run = |(ordinal, mask): (usize, Result<Mask>)| {
        let outcome = mask.and_then(|m| detect_frame(&m, &config.detection));
        if let Err(ref e) = outcome {
            warn!(frame = ordinal, error = %e, "Frame failed");
        }
        reporter.advance(done.fetch_add(1, Ordering::Relaxed) + 1);
        (ordinal, outcome)
    };
    let outcomes: Vec<(usize, Result<FrameResult>)> = if masks.len() >= PARALLEL_FRAME_THRESHOLD {
        masks.into_par_iter().enumerate().map(run).collect()
    } else {
        masks.into_iter().enumerate().map(run).collect()
    };
    reporter.finish_stage();

    let detections: Detections = outcomes.into_iter().collect();
    let boxes: usize = detections.successes().map(|(_, r)| r.len()).sum();
    info!(
        frames = detections.len(),
        failed = detections.failures().count(),
        boxes,
        "Pipeline complete"
    );

    Ok(PipelineOutput::Detections(detections))
}
