#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure beam tracing system that walks the star across the board.
//!
//! The tracer never mutates its inputs. Given a level, the board size and a
//! snapshot of the placed deflectors it produces the ordered cells the beam
//! visits together with the reason the walk stopped. Termination is
//! guaranteed structurally by remembering every `(cell, heading)` pair the
//! beam has occupied; the step cap is an independent upper bound on the path
//! length.

use std::collections::HashSet;

use log::trace;
use star_guide_core::{
    BeamTrace, CellCoord, DeflectorView, Direction, GridSize, Level, TraceOutcome,
};

/// Most steps the beam takes before the tracer gives up.
pub const DEFAULT_STEP_CAP: usize = 50;

/// Beam tracing system.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BeamTracer {
    step_cap: usize,
}

impl Default for BeamTracer {
    fn default() -> Self {
        Self::new()
    }
}

impl BeamTracer {
    /// Creates a tracer bounded by [`DEFAULT_STEP_CAP`].
    #[must_use]
    pub const fn new() -> Self {
        Self {
            step_cap: DEFAULT_STEP_CAP,
        }
    }

    /// Creates a tracer that lets the beam take at most `step_cap` steps.
    #[must_use]
    pub const fn with_step_cap(step_cap: usize) -> Self {
        Self { step_cap }
    }

    /// Most steps the beam may take.
    #[must_use]
    pub const fn step_cap(&self) -> usize {
        self.step_cap
    }

    /// Traces the beam of `level` across a board holding `deflectors`.
    ///
    /// A deflector redirects the beam on the cell it occupies, before the beam
    /// steps off that cell. Revisit detection keys on the heading the beam had
    /// when it arrived, so crossing a cell twice along different headings is
    /// not mistaken for a loop. The beam takes at most `step_cap` steps; the
    /// step that lands on the target wins even when it is the last one.
    #[must_use]
    pub fn trace(&self, level: &Level, grid: GridSize, deflectors: DeflectorView<'_>) -> BeamTrace {
        let source = level.source();
        let target = level.target();
        let mut cell = source.cell();
        let mut heading = source.direction();
        let mut path = vec![cell];

        if !grid.contains(cell) {
            trace!("beam source {cell:?} lies outside a {}-cell grid", grid.get());
            return BeamTrace::new(path, TraceOutcome::Exited);
        }

        let mut visited: HashSet<(CellCoord, Direction)> = HashSet::new();
        loop {
            if !visited.insert((cell, heading)) {
                trace!("beam revisited {cell:?} heading {heading:?}");
                return BeamTrace::new(path, TraceOutcome::Cycle);
            }

            if let Some(orientation) = deflectors.get(cell) {
                heading = orientation.deflect(heading);
            }

            let Some(next) = cell.neighbor(heading, grid) else {
                trace!("beam left the board from {cell:?} heading {heading:?}");
                return BeamTrace::new(path, TraceOutcome::Exited);
            };

            path.push(next);
            if next == target {
                trace!("beam reached the nest after {} cells", path.len());
                return BeamTrace::new(path, TraceOutcome::Reached);
            }

            // The path holds the source plus one cell per step taken.
            if path.len() > self.step_cap {
                trace!("beam exhausted the {}-step cap", self.step_cap);
                return BeamTrace::new(path, TraceOutcome::Cycle);
            }

            cell = next;
        }
    }
}
