#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative level state for Star Guide.
//!
//! The world owns the active level, the deflectors the player placed on it
//! and the latest beam trace. Every command that changes the board or the
//! level re-traces the beam from scratch before returning.

mod deflectors;
mod levels;

use log::debug;
use star_guide_core::{
    AdvanceError, BeamTrace, Command, Event, Level, RetreatError, ToggleError, WELCOME_BANNER,
};
use star_guide_system_beam_tracing::BeamTracer;

pub use deflectors::{DeflectorChange, DeflectorMap};
pub use levels::{LevelPack, LevelPackError, DEFAULT_GRID_SIZE};

/// Represents the authoritative Star Guide world state.
#[derive(Clone, Debug)]
pub struct World {
    banner: &'static str,
    pack: LevelPack,
    tracer: BeamTracer,
    level_index: usize,
    deflectors: DeflectorMap,
    trace: BeamTrace,
}

impl World {
    /// Creates a world playing the built-in levels with the default tracer.
    #[must_use]
    pub fn new() -> Self {
        Self::with_levels(LevelPack::builtin(), BeamTracer::new())
    }

    /// Creates a world playing `pack`, starting at its first level.
    #[must_use]
    pub fn with_levels(pack: LevelPack, tracer: BeamTracer) -> Self {
        let level = pack.levels()[0];
        let deflectors = DeflectorMap::for_level(&level);
        let trace = tracer.trace(&level, pack.grid(), deflectors.view());
        Self {
            banner: WELCOME_BANNER,
            pack,
            tracer,
            level_index: 0,
            deflectors,
            trace,
        }
    }

    fn level(&self) -> &Level {
        &self.pack.levels()[self.level_index]
    }

    fn is_won(&self) -> bool {
        self.trace.reached_target()
    }

    fn enter_level(&mut self, index: usize, out_events: &mut Vec<Event>) {
        self.level_index = index % self.pack.level_count();
        let level = *self.level();
        self.deflectors = DeflectorMap::for_level(&level);
        debug!("level {} started", level.id().get());
        out_events.push(Event::LevelStarted {
            index: self.level_index,
            level: level.id(),
        });
        self.retrace(false, out_events);
    }

    fn retrace(&mut self, was_won: bool, out_events: &mut Vec<Event>) {
        let level = *self.level();
        self.trace = self
            .tracer
            .trace(&level, self.pack.grid(), self.deflectors.view());
        out_events.push(Event::BeamTraced {
            outcome: self.trace.outcome(),
            length: self.trace.path().len(),
        });

        if self.is_won() && !was_won {
            debug!("level {} completed", level.id().get());
            out_events.push(Event::LevelCompleted { level: level.id() });
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ToggleDeflector { cell } => {
            let rejection = if world.is_won() {
                Some(ToggleError::LevelComplete)
            } else if !world.pack.grid().contains(cell) {
                Some(ToggleError::OutOfBounds)
            } else {
                None
            };
            if let Some(reason) = rejection {
                debug!("toggle at {cell:?} rejected: {reason:?}");
                out_events.push(Event::DeflectorToggleRejected { cell, reason });
                return;
            }

            let Some(change) = world.deflectors.toggle(cell) else {
                debug!("toggle at {cell:?} rejected: protected cell");
                out_events.push(Event::DeflectorToggleRejected {
                    cell,
                    reason: ToggleError::ProtectedCell,
                });
                return;
            };

            out_events.push(Event::DeflectorChanged {
                cell,
                previous: change.previous,
                current: change.current,
            });
            world.retrace(false, out_events);
        }
        Command::ResetBoard => {
            let was_won = world.is_won();
            let removed = world.deflectors.clear();
            debug!("board cleared, {removed} deflectors removed");
            out_events.push(Event::BoardCleared {
                level: world.level().id(),
                removed,
            });
            world.retrace(was_won, out_events);
        }
        Command::InstallLayout { deflectors } => {
            let grid = world.pack.grid();
            match world.deflectors.with_layout(grid, &deflectors) {
                Ok(rebuilt) => {
                    let was_won = world.is_won();
                    world.deflectors = rebuilt;
                    let placed = world.deflectors.len();
                    debug!("layout installed with {placed} deflectors");
                    out_events.push(Event::LayoutInstalled {
                        level: world.level().id(),
                        placed,
                    });
                    world.retrace(was_won, out_events);
                }
                Err((cell, reason)) => {
                    debug!("layout rejected at {cell:?}: {reason:?}");
                    out_events.push(Event::LayoutRejected { cell, reason });
                }
            }
        }
        Command::AdvanceLevel => {
            if !world.is_won() {
                out_events.push(Event::AdvanceRejected {
                    level: world.level().id(),
                    reason: AdvanceError::LevelIncomplete,
                });
                return;
            }

            let next = world.level_index + 1;
            world.enter_level(next, out_events);
        }
        Command::RetreatLevel => {
            if world.level_index == 0 {
                out_events.push(Event::RetreatRejected {
                    level: world.level().id(),
                    reason: RetreatError::FirstLevel,
                });
                return;
            }

            let previous = world.level_index - 1;
            world.enter_level(previous, out_events);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use star_guide_core::{
        BeamTrace, CellCoord, DeflectorOrientation, DeflectorView, GridSize, Level, TraceOutcome,
    };

    use super::World;

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Board size shared by every level.
    #[must_use]
    pub fn grid_size(world: &World) -> GridSize {
        world.pack.grid()
    }

    /// Definition of the active level.
    #[must_use]
    pub fn level(world: &World) -> &Level {
        world.level()
    }

    /// Zero-based position of the active level within the pack.
    #[must_use]
    pub fn level_index(world: &World) -> usize {
        world.level_index
    }

    /// Number of levels in the pack.
    #[must_use]
    pub fn level_count(world: &World) -> usize {
        world.pack.level_count()
    }

    /// Reports whether advancing from the active level wraps to the first one.
    #[must_use]
    pub fn is_final_level(world: &World) -> bool {
        world.level_index + 1 == world.pack.level_count()
    }

    /// Reports whether a previous level exists to go back to.
    #[must_use]
    pub fn can_retreat(world: &World) -> bool {
        world.level_index > 0
    }

    /// Read-only view of the deflectors placed on the active level.
    #[must_use]
    pub fn deflectors(world: &World) -> DeflectorView<'_> {
        world.deflectors.view()
    }

    /// Orientation of the deflector occupying `cell`, if any.
    #[must_use]
    pub fn deflector_at(world: &World, cell: CellCoord) -> Option<DeflectorOrientation> {
        world.deflectors.get(cell)
    }

    /// Latest beam trace for the active board.
    #[must_use]
    pub fn beam_trace(world: &World) -> &BeamTrace {
        &world.trace
    }

    /// Cells visited by the beam in order, starting at the source.
    #[must_use]
    pub fn beam_path(world: &World) -> &[CellCoord] {
        world.trace.path()
    }

    /// How the latest beam trace terminated.
    #[must_use]
    pub fn trace_outcome(world: &World) -> TraceOutcome {
        world.trace.outcome()
    }

    /// Reports whether the beam currently reaches the nest.
    #[must_use]
    pub fn is_won(world: &World) -> bool {
        world.is_won()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use star_guide_core::{CellCoord, DeflectorOrientation, LevelId, TraceOutcome};

    fn advance_to_second_level(world: &mut World) {
        let mut events = Vec::new();
        apply(world, Command::AdvanceLevel, &mut events);
        assert_eq!(query::level(world).id(), LevelId::new(2));
    }

    #[test]
    fn new_world_starts_on_first_level_already_solved() {
        let world = World::new();

        assert_eq!(query::level_index(&world), 0);
        assert_eq!(query::level_count(&world), 6);
        assert!(query::is_won(&world));
        assert_eq!(query::beam_path(&world).len(), 6);
        assert!(query::deflectors(&world).is_empty());
        assert!(!query::can_retreat(&world));
    }

    #[test]
    fn toggle_emits_change_then_trace() {
        let mut world = World::new();
        advance_to_second_level(&mut world);
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::ToggleDeflector {
                cell: CellCoord::new(1, 0),
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![
                Event::DeflectorChanged {
                    cell: CellCoord::new(1, 0),
                    previous: None,
                    current: Some(DeflectorOrientation::Falling),
                },
                Event::BeamTraced {
                    outcome: TraceOutcome::Exited,
                    length: 7,
                },
            ]
        );
    }

    #[test]
    fn toggle_outside_grid_is_rejected() {
        let mut world = World::new();
        advance_to_second_level(&mut world);
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::ToggleDeflector {
                cell: CellCoord::new(6, 0),
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::DeflectorToggleRejected {
                cell: CellCoord::new(6, 0),
                reason: ToggleError::OutOfBounds,
            }]
        );
        assert!(query::deflectors(&world).is_empty());
    }

    #[test]
    fn completing_a_level_is_announced_once() {
        let mut world = World::new();
        advance_to_second_level(&mut world);
        let mut events = Vec::new();

        // Falling at (1, 5) misses the nest; the second activation rotates it
        // to Rising, which completes the level and freezes the board.
        for cell in [
            CellCoord::new(1, 0),
            CellCoord::new(1, 5),
            CellCoord::new(1, 5),
            CellCoord::new(1, 5),
        ] {
            apply(&mut world, Command::ToggleDeflector { cell }, &mut events);
        }

        let completions = events
            .iter()
            .filter(|event| matches!(event, Event::LevelCompleted { .. }))
            .count();
        assert_eq!(completions, 1);
        assert!(query::is_won(&world));
        assert_eq!(
            events.last(),
            Some(&Event::DeflectorToggleRejected {
                cell: CellCoord::new(1, 5),
                reason: ToggleError::LevelComplete,
            })
        );
    }

    #[test]
    fn reset_on_trivially_solved_level_does_not_repeat_completion() {
        let mut world = World::new();
        let mut events = Vec::new();

        apply(&mut world, Command::ResetBoard, &mut events);

        assert_eq!(
            events,
            vec![
                Event::BoardCleared {
                    level: LevelId::new(1),
                    removed: 0,
                },
                Event::BeamTraced {
                    outcome: TraceOutcome::Reached,
                    length: 6,
                },
            ]
        );
    }
}
