//! Scene driver: owns the season director, the frame clock and input, and
//! runs one update/render step per frame.

use seasons_core::DemoConfig;
use seasons_render::{FrameTarget, Gpu, RenderError};
use seasons_runtime::{FrameOutcome, GameClock, InputState, SceneFlags, Season, SeasonDirector};
use tracing::info;

use crate::season_state::SeasonState;

pub struct Scene {
    config: DemoConfig,
    director: SeasonDirector<SeasonState>,
    pub flags: SceneFlags,
    pub clock: GameClock,
    pub input: InputState,
}

impl Scene {
    pub fn new(config: DemoConfig) -> Self {
        Self {
            config,
            director: SeasonDirector::new(),
            flags: SceneFlags::default(),
            clock: GameClock::new(),
            input: InputState::new(),
        }
    }

    /// Enter the first season
    pub fn start(&mut self, gpu: Gpu<'_>, season: Season) -> Result<(), RenderError> {
        let config = &self.config;
        self.director
            .start(season, |s| SeasonState::initialise(gpu, s, config))
    }

    /// Update and render one frame. The clock must already be advanced.
    ///
    /// When the active season reports it is over, it is torn down and its
    /// successor built; that frame draws nothing.
    pub fn frame(&mut self, gpu: Gpu<'_>, target: FrameTarget<'_>) -> Result<(), RenderError> {
        if !self.flags.should_render() {
            self.input.end_frame();
            return Ok(());
        }

        let (input, clock, config) = (&self.input, &self.clock, &self.config);
        let outcome = self.director.run_frame(
            |state| state.update(gpu.queue, input, clock),
            |season| SeasonState::initialise(gpu, season, config),
            |state| state.render(gpu, target),
        );
        self.input.end_frame();

        if let FrameOutcome::Changed(next) = outcome? {
            info!(season = %next, transitions = self.director.transitions(), "Season changed");
        }
        Ok(())
    }

    /// Track a new surface size
    pub fn resize(&mut self, width: u32, height: u32) {
        let was_minimised = self.flags.minimised;
        self.flags.set_size(width, height);
        if was_minimised && !self.flags.minimised {
            self.clock.resume();
        }
        if width > 0 && height > 0 {
            if let Some(state) = self.director.state_mut() {
                state.set_aspect(width as f32 / height as f32);
            }
        }
    }

    /// Focus loss pauses the scene; regaining it discards the paused time
    pub fn set_focused(&mut self, focused: bool) {
        self.flags.paused = !focused;
        if focused {
            self.clock.resume();
        } else {
            self.input.release_all();
        }
    }

    pub fn season(&self) -> Option<Season> {
        self.director.season()
    }

    pub fn state(&self) -> Option<&SeasonState> {
        self.director.state()
    }

    /// Tear down the active season
    pub fn shutdown(&mut self) {
        self.director.shutdown();
    }

    pub fn config(&self) -> &DemoConfig {
        &self.config
    }
}
