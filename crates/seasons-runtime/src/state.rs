//! Season hand-off and scene gating.
//!
//! The director owns at most one live season state. Advancing tears the
//! current state down completely before the successor is constructed, so two
//! states never hold GPU resources at the same time.

use seasons_core::SeasonsError;
use tracing::info;

use crate::season::Season;

/// What one call to [`SeasonDirector::run_frame`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// The live state was updated and rendered
    Rendered,
    /// The live state finished; its successor was built and nothing was drawn
    Changed(Season),
    /// No state is active
    Idle,
}

/// Owns the active season state and runs the strict hand-off between states
pub struct SeasonDirector<S> {
    season: Option<Season>,
    state: Option<S>,
    transitions: u64,
}

impl<S> SeasonDirector<S> {
    /// An empty director; call [`start`](Self::start) to enter the first season
    pub fn new() -> Self {
        Self {
            season: None,
            state: None,
            transitions: 0,
        }
    }

    /// Enter `season`, tearing down whatever was active first
    pub fn start<E>(
        &mut self,
        season: Season,
        init: impl FnOnce(Season) -> Result<S, E>,
    ) -> Result<(), E> {
        self.shutdown();
        let state = init(season)?;
        info!(%season, "Season initialised");
        self.season = Some(season);
        self.state = Some(state);
        Ok(())
    }

    /// Hand off to the next season in the cycle.
    ///
    /// Order: take the outgoing state, drop it, pick the successor, build it.
    /// When `init` fails the director is left empty and the error is returned.
    pub fn advance<E>(&mut self, init: impl FnOnce(Season) -> Result<S, E>) -> Result<Season, E>
    where
        E: From<SeasonsError>,
    {
        let current = self.season.ok_or_else(|| {
            SeasonsError::StateError("no active season to advance from".into())
        })?;

        self.shutdown();

        let next = current.next();
        let state = init(next)?;
        info!(season = %next, "Season initialised");

        self.season = Some(next);
        self.state = Some(state);
        self.transitions += 1;
        Ok(next)
    }

    /// Update the live state, then either render it or, when it reports it
    /// is over, hand off to its successor.
    ///
    /// A hand-off frame draws nothing, so a state is only ever rendered after
    /// its own `update` has run.
    pub fn run_frame<E>(
        &mut self,
        update: impl FnOnce(&mut S) -> bool,
        init: impl FnOnce(Season) -> Result<S, E>,
        render: impl FnOnce(&mut S) -> Result<(), E>,
    ) -> Result<FrameOutcome, E>
    where
        E: From<SeasonsError>,
    {
        let Some(state) = self.state.as_mut() else {
            return Ok(FrameOutcome::Idle);
        };

        if update(state) {
            return self.advance(init).map(FrameOutcome::Changed);
        }

        render(state)?;
        Ok(FrameOutcome::Rendered)
    }

    /// Drop the active state, if any
    pub fn shutdown(&mut self) {
        if let Some(state) = self.state.take() {
            drop(state);
            if let Some(season) = self.season {
                info!(%season, "Season deinitialised");
            }
        }
        self.season = None;
    }

    pub fn season(&self) -> Option<Season> {
        self.season
    }

    pub fn state(&self) -> Option<&S> {
        self.state.as_ref()
    }

    pub fn state_mut(&mut self) -> Option<&mut S> {
        self.state.as_mut()
    }

    pub fn is_active(&self) -> bool {
        self.state.is_some()
    }

    /// Completed hand-offs since construction
    pub fn transitions(&self) -> u64 {
        self.transitions
    }
}

impl<S> Default for SeasonDirector<S> {
    fn default() -> Self {
        Self::new()
    }
}

/// Window conditions that suspend updating and rendering without
/// releasing any resources
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SceneFlags {
    /// Window lost focus
    pub paused: bool,
    /// Window has a zero-sized client area
    pub minimised: bool,
    /// A resize is in progress
    pub resizing: bool,
}

impl SceneFlags {
    pub fn should_render(&self) -> bool {
        !(self.paused || self.minimised || self.resizing)
    }

    /// Track the window size; zero in either dimension counts as minimised
    pub fn set_size(&mut self, width: u32, height: u32) {
        self.minimised = width == 0 || height == 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    struct Tracked {
        season: Season,
        log: Rc<RefCell<Vec<String>>>,
        alive: Rc<Cell<u32>>,
    }

    impl Drop for Tracked {
        fn drop(&mut self) {
            self.alive.set(self.alive.get() - 1);
            self.log.borrow_mut().push(format!("deinit {}", self.season));
        }
    }

    struct Harness {
        log: Rc<RefCell<Vec<String>>>,
        alive: Rc<Cell<u32>>,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                log: Rc::default(),
                alive: Rc::default(),
            }
        }

        fn init(&self) -> impl FnOnce(Season) -> Result<Tracked, SeasonsError> + '_ {
            move |season| {
                assert_eq!(self.alive.get(), 0, "previous state still alive");
                self.alive.set(self.alive.get() + 1);
                self.log.borrow_mut().push(format!("init {season}"));
                Ok(Tracked {
                    season,
                    log: self.log.clone(),
                    alive: self.alive.clone(),
                })
            }
        }
    }

    #[test]
    fn hand_off_tears_down_before_building() {
        let h = Harness::new();
        let mut director = SeasonDirector::new();
        director.start(Season::Spring, h.init()).unwrap();
        let next = director.advance(h.init()).unwrap();

        assert_eq!(next, Season::Summer);
        assert_eq!(director.season(), Some(Season::Summer));
        assert_eq!(
            *h.log.borrow(),
            vec!["init spring", "deinit spring", "init summer"]
        );
        assert_eq!(h.alive.get(), 1);
    }

    #[test]
    fn full_cycle_returns_to_spring() {
        let h = Harness::new();
        let mut director = SeasonDirector::new();
        director.start(Season::Spring, h.init()).unwrap();

        let visited: Vec<Season> = (0..4).map(|_| director.advance(h.init()).unwrap()).collect();
        assert_eq!(
            visited,
            vec![Season::Summer, Season::Autumn, Season::Winter, Season::Spring]
        );
        assert_eq!(director.transitions(), 4);
        assert_eq!(h.alive.get(), 1);
    }

    #[test]
    fn failed_init_leaves_director_empty() {
        let h = Harness::new();
        let mut director = SeasonDirector::new();
        director.start(Season::Autumn, h.init()).unwrap();

        let result = director.advance(|_| -> Result<Tracked, SeasonsError> {
            Err(SeasonsError::AssetError("missing tree".into()))
        });
        assert!(result.is_err());
        assert!(!director.is_active());
        assert_eq!(director.season(), None);
        assert_eq!(h.alive.get(), 0);

        // Nothing to advance from any more
        assert!(director.advance(h.init()).is_err());
    }

    #[test]
    fn start_replaces_active_state() {
        let h = Harness::new();
        let mut director = SeasonDirector::new();
        director.start(Season::Spring, h.init()).unwrap();
        director.start(Season::Winter, h.init()).unwrap();
        assert_eq!(director.state().map(|p| p.season), Some(Season::Winter));
        assert_eq!(h.alive.get(), 1);
        assert_eq!(director.transitions(), 0);
    }

    #[test]
    fn hand_off_frame_skips_render() {
        let h = Harness::new();
        let mut director = SeasonDirector::new();
        director.start(Season::Spring, h.init()).unwrap();

        let render = |s: &mut Tracked| -> Result<(), SeasonsError> {
            s.log.borrow_mut().push(format!("render {}", s.season));
            Ok(())
        };
        let update = |over: bool| {
            move |s: &mut Tracked| {
                s.log.borrow_mut().push(format!("update {}", s.season));
                over
            }
        };

        let outcome = director.run_frame(update(false), h.init(), render).unwrap();
        assert_eq!(outcome, FrameOutcome::Rendered);

        let outcome = director.run_frame(update(true), h.init(), render).unwrap();
        assert_eq!(outcome, FrameOutcome::Changed(Season::Summer));

        let outcome = director.run_frame(update(false), h.init(), render).unwrap();
        assert_eq!(outcome, FrameOutcome::Rendered);

        assert_eq!(
            *h.log.borrow(),
            vec![
                "init spring",
                "update spring",
                "render spring",
                "update spring",
                "deinit spring",
                "init summer",
                "update summer",
                "render summer",
            ]
        );
    }

    #[test]
    fn empty_director_runs_nothing() {
        let h = Harness::new();
        let mut director: SeasonDirector<Tracked> = SeasonDirector::new();
        let outcome = director
            .run_frame(|_| panic!("no state to update"), h.init(), |_| Ok(()))
            .unwrap();
        assert_eq!(outcome, FrameOutcome::Idle);
        assert!(h.log.borrow().is_empty());
    }

    #[test]
    fn scene_flags_gate_rendering() {
        let mut flags = SceneFlags::default();
        assert!(flags.should_render());

        flags.set_size(0, 600);
        assert!(flags.minimised);
        assert!(!flags.should_render());

        flags.set_size(800, 600);
        flags.paused = true;
        assert!(!flags.should_render());

        flags.paused = false;
        flags.resizing = true;
        assert!(!flags.should_render());
    }
}
