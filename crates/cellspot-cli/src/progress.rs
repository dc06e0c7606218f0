use std::sync::Mutex;

use anyhow::Result;
use cellspot_core::pipeline::{PipelineStage, ProgressReporter};
use indicatif::{ProgressBar, ProgressStyle};

/// Drives one `indicatif` bar per pipeline stage.
pub struct BarReporter {
    style: ProgressStyle,
    bar: Mutex<Option<ProgressBar>>,
}

impl BarReporter {
    pub fn new() -> Result<Self> {
        let style = ProgressStyle::default_bar()
            .template("{msg:20} [{bar:40}] {pos}/{len} frames")?
            .progress_chars("=> ");
        Ok(Self {
            style,
            bar: Mutex::new(None),
        })
    }
}

impl ProgressReporter for BarReporter {
    fn begin_stage(&self, stage: PipelineStage, total_items: Option<usize>) {
        let pb = match total_items {
            Some(total) => ProgressBar::new(total as u64).with_style(self.style.clone()),
            None => ProgressBar::new_spinner(),
        };
        pb.set_message(stage.to_string());
        if let Ok(mut bar) = self.bar.lock() {
            *bar = Some(pb);
        }
    }

    fn advance(&self, items_done: usize) {
        if let Ok(bar) = self.bar.lock() {
            // Workers finish out of order; never move the bar backwards.
            if let Some(pb) = bar.as_ref().filter(|pb| items_done as u64 > pb.position()) {
                pb.set_position(items_done as u64);
            }
        }
    }

    fn finish_stage(&self) {
        if let Ok(mut bar) = self.bar.lock() {
            if let Some(pb) = bar.take() {
                pb.finish();
            }
        }
    }
}
