#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure bootstrap system that prepares the Star Guide experience.

use star_guide_core::{GridSize, Level};
use star_guide_world::{query, World};

/// Label shown on the win overlay while more levels remain.
pub const NEXT_LEVEL_LABEL: &str = "Next!";

/// Label shown on the win overlay of the final level.
pub const PLAY_AGAIN_LABEL: &str = "Play Again";

/// Produces data required to greet the player and caption the board.
#[derive(Debug, Default)]
pub struct Bootstrap;

impl Bootstrap {
    /// Derives the banner that should be shown when the experience starts.
    #[must_use]
    pub fn welcome_banner<'world>(&self, world: &'world World) -> &'world str {
        query::welcome_banner(world)
    }

    /// Exposes the board size required for rendering.
    #[must_use]
    pub fn grid_size(&self, world: &World) -> GridSize {
        query::grid_size(world)
    }

    /// Exposes the active level for presentation purposes.
    #[must_use]
    pub fn level<'world>(&self, world: &'world World) -> &'world Level {
        query::level(world)
    }

    /// Caption printed above the board.
    #[must_use]
    pub fn level_caption(&self, world: &World) -> String {
        format!(
            "Level {}: Help the star reach the nest!",
            query::level(world).id().get()
        )
    }

    /// Label for the button that leaves a completed level.
    #[must_use]
    pub fn advance_label(&self, world: &World) -> &'static str {
        if query::is_final_level(world) {
            PLAY_AGAIN_LABEL
        } else {
            NEXT_LEVEL_LABEL
        }
    }
}
