//! Offscreen capture: render a fixed number of frames of one season and
//! save the last one as a PNG.

use std::path::Path;

use seasons_core::DemoConfig;
use seasons_render::{HeadlessContext, RenderError};
use seasons_runtime::Season;
use tracing::info;

use crate::scene::Scene;

/// Simulated time per captured frame
pub const CAPTURE_STEP: f64 = 1.0 / 60.0;

pub fn capture(
    config: DemoConfig,
    season: Season,
    frames: u32,
    output: &Path,
) -> Result<(), RenderError> {
    let context = pollster::block_on(HeadlessContext::new(
        config.window.width,
        config.window.height,
    ))?;

    let mut scene = Scene::new(config);
    scene.start(context.gpu(), season)?;

    let frames = frames.max(1);
    for _ in 0..frames {
        scene.clock.step(CAPTURE_STEP);
        scene.frame(context.gpu(), context.target())?;
    }
    info!(%season, frames, "Capture rendered");

    context.save_png(output)?;
    scene.shutdown();
    Ok(())
}
