use serde::{Deserialize, Serialize};

use crate::background::BackgroundConfig;
use crate::detection::DetectionConfig;
use crate::error::Result;

/// Everything needed to turn a frame sequence into detections.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub background: BackgroundConfig,
    #[serde(default)]
    pub detection: DetectionConfig,
    /// Stop after background removal and return the masks.
    #[serde(default)]
    pub tuning_mode: bool,
}

impl PipelineConfig {
    /// Validate both stages; called once before any frame is processed.
    pub fn validate(&self) -> Result<()> {
        self.background.validate()?;
        self.detection.validate()
    }
}
