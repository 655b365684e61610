//! Seasons Particles - GPU stream-out particle model
//!
//! Everything here is GPU-free: the particle record layout shared with the
//! shaders, the weather effect tables, the ping-pong slot bookkeeping and
//! the Seeding/Steady state machine that plans each frame's passes.
//! `seasons-render` owns the actual buffers and pipelines.

pub mod buffers;
pub mod effect;
pub mod particle;
pub mod rand;
pub mod system;

pub use buffers::PingPong;
pub use effect::{ParticleBlendMode, ParticleEffect, ParticleKind};
pub use particle::{ParticleArgs, ParticleVertex};
pub use system::{FramePlan, ParticleState, Phase, SourceBuffer};

#[cfg(test)]
mod tests {
    use super::*;
    use seasons_core::ParticleLimits;

    fn snow() -> ParticleState {
        ParticleState::new(ParticleKind::Snow, 100_000).unwrap()
    }

    #[test]
    fn record_layouts_match_shaders() {
        assert_eq!(std::mem::size_of::<ParticleVertex>(), 48);
        assert_eq!(std::mem::size_of::<ParticleArgs>(), 32);
        assert_eq!(particle::buffer_size(100_000), 4_800_000);
    }

    #[test]
    fn emitter_seed() {
        let e = ParticleVertex::emitter();
        assert!(e.is_emitter());
        assert_eq!(e.age, 0.0);
        assert_eq!(e.kind, particle::KIND_EMITTER);
    }

    #[test]
    fn args_dispatch_covers_count() {
        let args = ParticleArgs::with_count(1);
        assert_eq!(args.vertex_count, particle::BILLBOARD_VERTICES);
        assert_eq!(args.instance_count, 1);
        assert_eq!(args.dispatch_x, 1);
        assert_eq!(ParticleArgs::with_count(64).dispatch_x, 1);
        assert_eq!(ParticleArgs::with_count(65).dispatch_x, 2);
        assert_eq!(ParticleArgs::empty().dispatch_x, 0);
    }

    #[test]
    fn winter_snow_seeds_then_draws_from_previous_target() {
        let mut state = snow();
        state.reset();
        state.update(1.0 / 60.0, 0.0);

        let first = state.plan_frame();
        assert_eq!(first.source, SourceBuffer::Init);
        assert!(first.seeded);
        assert_eq!(state.phase(), Phase::Steady);

        state.update(1.0 / 60.0, 1.0 / 60.0);
        let second = state.plan_frame();
        assert_eq!(second.source, SourceBuffer::Slot(first.target));
        assert!(!second.seeded);
    }

    #[test]
    fn draw_source_is_the_target_written_that_frame() {
        let mut state = snow();
        for _ in 0..10 {
            let plan = state.plan_frame();
            assert_eq!(plan.draw, plan.target);
            if let SourceBuffer::Slot(src) = plan.source {
                assert_ne!(src, plan.target);
            }
        }
    }

    #[test]
    fn n_frames_swap_n_times() {
        let mut state = snow();
        let start = state.ping_pong().swaps();
        for _ in 0..7 {
            state.plan_frame();
        }
        assert_eq!(state.ping_pong().swaps() - start, 7);
    }

    #[test]
    fn seeding_happens_once_per_reset() {
        let mut state = snow();
        let seeded = (0..5).filter(|_| state.plan_frame().seeded).count();
        assert_eq!(seeded, 1);

        state.reset();
        assert_eq!(state.phase(), Phase::Seeding);
        let plans: Vec<_> = (0..5).map(|_| state.plan_frame()).collect();
        assert!(plans[0].seeded);
        assert_eq!(plans.iter().filter(|p| p.seeded).count(), 1);
    }

    #[test]
    fn reset_keeps_slot_identities_and_zeroes_age() {
        let mut state = snow();
        state.update(0.5, 0.5);
        state.plan_frame();
        let before = *state.ping_pong();

        state.reset();
        assert_eq!(state.age(), 0.0);
        assert_eq!(*state.ping_pong(), before);

        // The reseeding pass writes the slot that was next in line
        let plan = state.plan_frame();
        assert_eq!(plan.target, before.stream_out());
    }

    #[test]
    fn update_is_bookkeeping_only() {
        let mut state = snow();
        state.update(0.25, 3.0);
        state.update(0.25, 3.25);
        assert_eq!(state.age(), 0.5);
        assert_eq!(state.scene_time(), 3.25);
        assert_eq!(state.time_step(), 0.25);
        assert_eq!(state.phase(), Phase::Seeding);
        assert_eq!(state.ping_pong().swaps(), 0);
    }

    #[test]
    fn emit_direction_defaults_up() {
        let state = snow();
        assert_eq!(state.emit_dir(), glam::Vec4::new(0.0, 1.0, 0.0, 0.0));
    }

    #[test]
    fn emitter_fits_any_accepted_capacity() {
        // One slot holds the emitter alone, even when a burst spawns more
        let state = ParticleState::new(ParticleKind::Rain, 1).unwrap();
        assert!(state.effect().spawn_count > state.max_particles());
        assert!(particle::EMITTER_SLOT < state.max_particles());

        let reset = ParticleArgs::target_reset();
        assert_eq!(reset.instance_count, particle::EMITTER_SLOT + 1);
        assert!(reset.instance_count <= state.max_particles());
    }

    #[test]
    fn zero_capacity_is_rejected() {
        assert!(ParticleState::new(ParticleKind::Rain, 0).is_err());
    }

    #[test]
    fn capacities_follow_limits() {
        let limits = ParticleLimits::default();
        assert_eq!(ParticleKind::Snow.capacity(&limits), 100_000);
        assert_eq!(ParticleKind::Leaves.capacity(&limits), 1_000);
        assert_eq!(ParticleKind::Rain.capacity(&limits), 10_000);
    }

    #[test]
    fn effects_are_well_formed() {
        for kind in ParticleKind::ALL {
            let effect = kind.effect();
            assert!(effect.lifetime > 0.0);
            assert!(effect.spawn_interval > 0.0);
            assert!(effect.spawn_count > 0);
            assert!(!effect.sprites.is_empty());
        }
        assert_eq!(ParticleKind::Leaves.effect().blend_mode, ParticleBlendMode::Alpha);
    }
}
