//! Frame clock

use std::time::Instant;

/// Longest frame the clock reports, in seconds
const MAX_FRAME_TIME: f64 = 0.25;

/// Scene time and the time since the previous frame. Stalls count as one
/// frame of at most `MAX_FRAME_TIME`.
#[derive(Debug, Clone)]
pub struct GameClock {
    scene_time: f64,
    dt: f64,
    /// `None` until the first tick, and again after `resume`
    last_tick: Option<Instant>,
}

impl Default for GameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl GameClock {
    pub fn new() -> Self {
        Self {
            scene_time: 0.0,
            dt: 0.0,
            last_tick: None,
        }
    }

    /// Advance from the wall clock. Call once per rendered frame.
    pub fn tick(&mut self) {
        let now = Instant::now();
        let elapsed = self
            .last_tick
            .map_or(0.0, |last| now.duration_since(last).as_secs_f64());
        self.last_tick = Some(now);
        self.step(elapsed);
    }

    /// Advance by a fixed amount
    pub fn step(&mut self, seconds: f64) {
        self.dt = seconds.clamp(0.0, MAX_FRAME_TIME);
        self.scene_time += self.dt;
    }

    /// Drop the time spent while rendering was gated; the next tick reports zero
    pub fn resume(&mut self) {
        self.last_tick = None;
    }

    pub fn dt(&self) -> f32 {
        self.dt as f32
    }

    pub fn scene_time(&self) -> f32 {
        self.scene_time as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_tick_has_zero_delta() {
        let mut clock = GameClock::new();
        clock.tick();
        assert_eq!(clock.dt(), 0.0);
        assert_eq!(clock.scene_time(), 0.0);
    }

    #[test]
    fn fixed_steps_accumulate() {
        let mut clock = GameClock::new();
        for _ in 0..60 {
            clock.step(1.0 / 60.0);
        }
        assert!((clock.scene_time() - 1.0).abs() < 1e-5);
        assert!((clock.dt() - 1.0 / 60.0).abs() < 1e-6);
    }

    #[test]
    fn long_frames_are_clamped() {
        let mut clock = GameClock::new();
        clock.step(3.0);
        assert_eq!(clock.dt(), MAX_FRAME_TIME as f32);
        assert_eq!(clock.scene_time(), MAX_FRAME_TIME as f32);
    }

    #[test]
    fn untaken_frames_fold_into_next_delta() {
        let mut clock = GameClock::new();
        clock.tick();
        std::thread::sleep(std::time::Duration::from_millis(20));
        clock.tick();
        assert!(clock.dt() >= 0.02);
        assert_eq!(clock.scene_time(), clock.dt());
    }

    #[test]
    fn resume_discards_gated_time() {
        let mut clock = GameClock::new();
        clock.tick();
        clock.step(0.1);
        clock.resume();
        clock.tick();
        assert_eq!(clock.dt(), 0.0);
        assert!((clock.scene_time() - 0.1).abs() < 1e-6);
    }
}
