use crate::detection::Detections;
use crate::error::Result;
use crate::frame::Mask;

/// Stage names shown by progress reporters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineStage {
    RemovingBackground,
    Detecting,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RemovingBackground => write!(f, "Removing background"),
            Self::Detecting => write!(f, "Detecting cells"),
        }
    }
}

/// Result of the pipeline.
#[derive(Debug)]
pub enum PipelineOutput {
    /// Tuning mode: one mask (or per-frame error) per input frame.
    Masks(Vec<Result<Mask>>),
    /// Detection results keyed by frame position.
    Detections(Detections),
}

/// Progress sink for [`run_pipeline_reported`](super::run_pipeline_reported).
///
/// Calls may come from rayon workers, hence `Send + Sync`. Every method
/// defaults to doing nothing.
pub trait ProgressReporter: Send + Sync {
    /// `stage` starts with `total_items` frames to go, if known.
    fn begin_stage(&self, _stage: PipelineStage, _total_items: Option<usize>) {}

    /// `items_done` frames of the current stage are finished. Counts from
    /// parallel workers can arrive slightly out of order.
    fn advance(&self, _items_done: usize) {}

    fn finish_stage(&self) {}
}

pub(super) struct NoOpReporter;
impl ProgressReporter for NoOpReporter {}
