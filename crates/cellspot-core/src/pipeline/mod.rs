pub mod config;
pub mod orchestrator;
pub mod types;

pub use config::PipelineConfig;
pub use orchestrator::{run_pipeline, run_pipeline_reported};
pub use types::{PipelineOutput, PipelineStage, ProgressReporter};
