//! Host-side particle system state: seeding, timing and frame planning.
//!
//! The host never learns how many particles are alive. It only decides which
//! buffer a simulate pass reads, which it writes, and which one is drawn.

use glam::{Vec3, Vec4};
use seasons_core::{Result, SeasonsError};
use tracing::debug;

use crate::buffers::PingPong;
use crate::effect::{ParticleEffect, ParticleKind};

/// Simulation phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Only the init buffer is valid; the next pass reads the emitter seed
    Seeding,
    /// Both slots are in use and the render slot holds live particles
    Steady,
}

/// Where a simulate pass reads its input records from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceBuffer {
    /// The single-emitter init buffer
    Init,
    /// One of the two ping-pong slots
    Slot(usize),
}

/// The buffers one frame's simulate and draw passes use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FramePlan {
    pub source: SourceBuffer,
    /// Slot the simulate pass writes
    pub target: usize,
    /// Slot the draw pass reads
    pub draw: usize,
    /// True when this frame seeded the system from the init buffer
    pub seeded: bool,
}

/// State of one particle system, independent of any GPU objects
#[derive(Debug, Clone)]
pub struct ParticleState {
    kind: ParticleKind,
    effect: ParticleEffect,
    max_particles: u32,
    phase: Phase,
    ping_pong: PingPong,
    age: f32,
    scene_time: f32,
    time_step: f32,
    eye_pos: Vec4,
    emit_pos: Vec4,
    emit_dir: Vec4,
}

impl ParticleState {
    pub fn new(kind: ParticleKind, max_particles: u32) -> Result<Self> {
        if max_particles == 0 {
            return Err(SeasonsError::ParticleError(format!(
                "{} system needs a capacity of at least one particle",
                kind.name()
            )));
        }

        Ok(Self {
            kind,
            effect: kind.effect(),
            max_particles,
            phase: Phase::Seeding,
            ping_pong: PingPong::new(),
            age: 0.0,
            scene_time: 0.0,
            time_step: 0.0,
            eye_pos: Vec4::new(0.0, 0.0, 0.0, 1.0),
            emit_pos: Vec4::new(0.0, 0.0, 0.0, 1.0),
            emit_dir: Vec4::new(0.0, 1.0, 0.0, 0.0),
        })
    }

    /// Restart the effect from the emitter seed.
    ///
    /// Slot identities are kept; the next frame reads the init buffer.
    pub fn reset(&mut self) {
        self.phase = Phase::Seeding;
        self.age = 0.0;
        debug!(kind = self.kind.name(), "Particle system reset");
    }

    /// Advance the clock. Touches no GPU state.
    pub fn update(&mut self, dt: f32, scene_time: f32) {
        self.age += dt;
        self.scene_time = scene_time;
        self.time_step = dt;
    }

    /// Decide this frame's buffers, then perform the seeding transition and
    /// the ping-pong swap. Call exactly once per rendered frame.
    pub fn plan_frame(&mut self) -> FramePlan {
        let source = match self.phase {
            Phase::Seeding => SourceBuffer::Init,
            Phase::Steady => SourceBuffer::Slot(self.ping_pong.render()),
        };
        let target = self.ping_pong.stream_out();

        let seeded = self.phase == Phase::Seeding;
        if seeded {
            self.phase = Phase::Steady;
            debug!(kind = self.kind.name(), "Particle system seeded");
        }

        self.ping_pong.swap();

        FramePlan {
            source,
            target,
            draw: self.ping_pong.render(),
            seeded,
        }
    }

    pub fn set_eye_pos(&mut self, pos: Vec3) {
        self.eye_pos = pos.extend(1.0);
    }

    pub fn set_emit_pos(&mut self, pos: Vec3) {
        self.emit_pos = pos.extend(1.0);
    }

    pub fn set_emit_dir(&mut self, dir: Vec3) {
        self.emit_dir = dir.extend(0.0);
    }

    pub fn kind(&self) -> ParticleKind {
        self.kind
    }

    pub fn effect(&self) -> &ParticleEffect {
        &self.effect
    }

    pub fn max_particles(&self) -> u32 {
        self.max_particles
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn ping_pong(&self) -> &PingPong {
        &self.ping_pong
    }

    /// Seconds simulated since the last reset
    pub fn age(&self) -> f32 {
        self.age
    }

    pub fn scene_time(&self) -> f32 {
        self.scene_time
    }

    pub fn time_step(&self) -> f32 {
        self.time_step
    }

    pub fn eye_pos(&self) -> Vec4 {
        self.eye_pos
    }

    pub fn emit_pos(&self) -> Vec4 {
        self.emit_pos
    }

    pub fn emit_dir(&self) -> Vec4 {
        self.emit_dir
    }
}
