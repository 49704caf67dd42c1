#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Star Guide adapters.

use anyhow::Result as AnyResult;
use glam::Vec2;
use star_guide_core::{
    BeamTrace, CellCoord, DeflectorOrientation, DeflectorView, Direction, Level, TraceOutcome,
};
use thiserror::Error;

/// Glyphs the helpers are drawn with: panda, rabbit, fox and koala.
pub const HELPER_GLYPHS: [char; 4] = ['🐼', '🐰', '🦊', '🐨'];

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

/// Yellow used for the star and its trail.
pub const STAR_YELLOW: Color = Color::from_rgb_u8(0xff, 0xd7, 0x00);

/// Square board layout expressed in world units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoardPresentation {
    /// Number of cells along each edge of the board.
    pub cells_per_side: u32,
    /// Side length of a single cell expressed in world units.
    pub cell_length: f32,
    /// Color used when drawing grid lines.
    pub line_color: Color,
}

impl BoardPresentation {
    /// Cell length used by the reference layout, matching a 100-unit tile.
    pub const DEFAULT_CELL_LENGTH: f32 = 100.0;

    /// Creates a new board descriptor.
    ///
    /// Returns an error when `cell_length` is not strictly positive.
    pub fn new(
        cells_per_side: u32,
        cell_length: f32,
        line_color: Color,
    ) -> Result<Self, RenderingError> {
        if !(cell_length > 0.0) {
            return Err(RenderingError::InvalidCellLength { cell_length });
        }

        Ok(Self {
            cells_per_side,
            cell_length,
            line_color,
        })
    }

    /// Total width (and height) of the board in world units.
    #[must_use]
    pub fn side_length(&self) -> f32 {
        self.cells_per_side as f32 * self.cell_length
    }

    /// Centre of `cell` in world units.
    #[must_use]
    pub fn cell_center(&self, cell: CellCoord) -> Vec2 {
        let half = self.cell_length * 0.5;
        Vec2::new(
            cell.column() as f32 * self.cell_length + half,
            cell.row() as f32 * self.cell_length + half,
        )
    }

    /// Cell under a world-space pointer position, if the pointer is on the board.
    #[must_use]
    pub fn cell_at(&self, position: Vec2) -> Option<CellCoord> {
        let side = self.side_length();
        if !position.is_finite()
            || position.x < 0.0
            || position.y < 0.0
            || position.x >= side
            || position.y >= side
        {
            return None;
        }

        let last = self.cells_per_side.saturating_sub(1);
        let column = ((position.x / self.cell_length) as u32).min(last);
        let row = ((position.y / self.cell_length) as u32).min(last);
        Some(CellCoord::new(column, row))
    }
}

/// Beam origin drawn on the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SourcePresentation {
    /// Cell holding the star.
    pub cell: CellCoord,
    /// Heading the star leaves in.
    pub direction: Direction,
}

/// Helper occupying a cell and deflecting the beam.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HelperPresentation {
    /// Cell the helper stands on.
    pub cell: CellCoord,
    /// Orientation reported by the world.
    pub orientation: DeflectorOrientation,
    /// Cosmetic glyph picked by the adapter layer.
    pub glyph: char,
    /// Rotation applied to the helper sprite in degrees.
    pub rotation_degrees: f32,
}

impl HelperPresentation {
    /// Dresses a deflector with a glyph and a sprite rotation.
    ///
    /// The glyph depends only on the cell so a helper keeps its look while
    /// it is rotated.
    #[must_use]
    pub fn for_deflector(cell: CellCoord, orientation: DeflectorOrientation) -> Self {
        let seed = cell
            .column()
            .wrapping_mul(31)
            .wrapping_add(cell.row().wrapping_mul(17));
        let glyph = HELPER_GLYPHS[seed as usize % HELPER_GLYPHS.len()];
        let rotation_degrees = match orientation {
            DeflectorOrientation::Falling => 0.0,
            DeflectorOrientation::Rising => 90.0,
        };

        Self {
            cell,
            orientation,
            glyph,
            rotation_degrees,
        }
    }
}

/// Beam trail drawn from the star toward the nest.
#[derive(Clone, Debug, PartialEq)]
pub struct BeamPresentation {
    /// Cells visited by the beam in order.
    pub cells: Vec<CellCoord>,
    /// Cell centres of the visited cells in world units, forming a polyline.
    pub points: Vec<Vec2>,
    /// How the trace terminated.
    pub outcome: TraceOutcome,
}

impl BeamPresentation {
    /// Projects a trace onto the board.
    #[must_use]
    pub fn from_trace(board: &BoardPresentation, trace: &BeamTrace) -> Self {
        Self {
            cells: trace.path().to_vec(),
            points: trace
                .path()
                .iter()
                .map(|cell| board.cell_center(*cell))
                .collect(),
            outcome: trace.outcome(),
        }
    }

    /// Reports whether the trail has at least one segment to draw.
    #[must_use]
    pub fn is_drawable(&self) -> bool {
        self.points.len() > 1
    }
}

/// Text and buttons surrounding the board.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OverlayPresentation {
    /// Caption shown above the board.
    pub caption: String,
    /// Indicates whether the win overlay is visible.
    pub won: bool,
    /// Label of the button leaving a completed level.
    pub advance_label: &'static str,
    /// Indicates whether the back button is enabled.
    pub can_retreat: bool,
}

/// Scene description combining the board and everything drawn on it.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Board layout.
    pub board: BoardPresentation,
    /// Star marker.
    pub source: SourcePresentation,
    /// Nest marker.
    pub target: CellCoord,
    /// Helpers in row-major order.
    pub helpers: Vec<HelperPresentation>,
    /// Beam trail.
    pub beam: BeamPresentation,
    /// Captions and buttons.
    pub overlay: OverlayPresentation,
}

impl Scene {
    /// Creates a new scene from world snapshots.
    #[must_use]
    pub fn new(
        board: BoardPresentation,
        level: &Level,
        deflectors: DeflectorView<'_>,
        trace: &BeamTrace,
        overlay: OverlayPresentation,
    ) -> Self {
        let source = level.source();
        Self {
            board,
            source: SourcePresentation {
                cell: source.cell(),
                direction: source.direction(),
            },
            target: level.target(),
            helpers: deflectors
                .iter()
                .map(|(cell, orientation)| HelperPresentation::for_deflector(cell, orientation))
                .collect(),
            beam: BeamPresentation::from_trace(&board, trace),
            overlay,
        }
    }

    /// Helper standing on `cell`, if any.
    #[must_use]
    pub fn helper_at(&self, cell: CellCoord) -> Option<&HelperPresentation> {
        self.helpers.iter().find(|helper| helper.cell == cell)
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title shown by the backend.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Star Guide scenes.
pub trait RenderingBackend {
    /// Draws the provided presentation.
    ///
    /// Called once after every world transition; the scene always reflects a
    /// freshly recomputed beam.
    fn present(&mut self, presentation: &Presentation) -> AnyResult<()>;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum RenderingError {
    /// Cells must have a positive side length.
    #[error("cell_length must be positive (received {cell_length})")]
    InvalidCellLength {
        /// Provided length that failed validation.
        cell_length: f32,
    },
}
