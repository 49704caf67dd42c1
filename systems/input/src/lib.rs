#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure input system that turns player gestures into world commands.

use star_guide_core::{CellCoord, Command, Event};

/// Input snapshot distilled from adapter-provided pointer and button data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BoardInput {
    /// Cell the player tapped on this frame, if any.
    pub activated_cell: Option<CellCoord>,
    /// Indicates whether the player pressed the reset button.
    pub reset_requested: bool,
    /// Indicates whether the player pressed the next/play-again button.
    pub advance_requested: bool,
    /// Indicates whether the player pressed the back button.
    pub back_requested: bool,
}

impl BoardInput {
    /// Input describing a single tap on `cell`.
    #[must_use]
    pub const fn activate(cell: CellCoord) -> Self {
        Self {
            activated_cell: Some(cell),
            reset_requested: false,
            advance_requested: false,
            back_requested: false,
        }
    }
}

/// Input system that routes gestures to the world.
///
/// The router mirrors the world's completion state from the event stream so
/// that taps on a finished board and premature advance presses are dropped
/// before they reach the world.
#[derive(Clone, Debug, Default)]
pub struct InputRouter {
    level_won: bool,
}

impl InputRouter {
    /// Creates a router for a world whose completion state is `level_won`.
    #[must_use]
    pub const fn new(level_won: bool) -> Self {
        Self { level_won }
    }

    /// Reports whether the router believes the active level is complete.
    #[must_use]
    pub const fn level_won(&self) -> bool {
        self.level_won
    }

    /// Consumes world events and player input to emit commands.
    ///
    /// Commands are emitted in the order board edit, reset, back, advance.
    pub fn handle(&mut self, events: &[Event], input: BoardInput, out: &mut Vec<Command>) {
        for event in events {
            if let Event::BeamTraced { outcome, .. } = event {
                self.level_won = outcome.is_success();
            }
        }

        if let Some(cell) = input.activated_cell {
            if !self.level_won {
                out.push(Command::ToggleDeflector { cell });
            }
        }

        if input.reset_requested {
            out.push(Command::ResetBoard);
        }

        if input.back_requested {
            out.push(Command::RetreatLevel);
        }

        if input.advance_requested && self.level_won {
            out.push(Command::AdvanceLevel);
        }
    }
}
