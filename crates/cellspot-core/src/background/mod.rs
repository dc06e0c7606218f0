//! Adaptive background removal: grayscale frames to binary foreground masks.

pub mod config;
pub mod context;
pub mod resample;
pub mod threshold;

use rayon::prelude::*;
use tracing::{info, warn};

use crate::consts::PARALLEL_FRAME_THRESHOLD;
use crate::error::Result;
use crate::frame::{Frame, Mask};

pub use config::{AdaptiveMethod, BackgroundConfig, Polarity};
pub use context::BackgroundContext;
pub use resample::upscale_mask;

/// Remove the background of a batch of frames.
///
/// Parameters are validated once, before any frame is touched; an invalid
/// parameter fails the whole batch. The reference geometry is the most
/// common frame size in the batch; a frame of a different size yields an
/// error in its own slot while the others are still processed. Output order matches input order.
pub fn remove_background(frames: &[Frame], config: &BackgroundConfig) -> Result<Vec<Result<Mask>>> {
    config.validate()?;
    if frames.is_empty() {
        return Ok(Vec::new());
    }

    let context = BackgroundContext::for_frames(config, frames)?;
    info!(
        frames = frames.len(),
        window_size = config.window_size,
        block_size = config.block_size,
        method = %config.method,
        polarity = %config.polarity,
        "Removing background"
    );
    Ok(remove_background_with(&context, frames, |_| {}))
}

/// Apply an existing shared context to every frame.
///
/// `on_frame` receives the position of each frame in `frames` once its mask
/// is done; with frame-level parallelism the calls arrive out of order.
pub fn remove_background_with<F>(
    context: &BackgroundContext,
    frames: &[Frame],
    on_frame: F,
) -> Vec<Result<Mask>>
where
    F: Fn(usize) + Sync,
{
    let apply = |(ordinal, frame): (usize, &Frame)| {
        let mask = context.apply(frame);
        if let Err(ref e) = mask {
            warn!(frame = frame.metadata.frame_index, error = %e, "Background removal failed");
        }
        on_frame(ordinal);
        mask
    };

    if frames.len() >= PARALLEL_FRAME_THRESHOLD {
        frames.par_iter().enumerate().map(apply).collect()
    } else {
        frames.iter().enumerate().map(apply).collect()
    }
}
