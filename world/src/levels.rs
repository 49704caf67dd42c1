//! Static level content played by the world.

use std::collections::BTreeSet;

use star_guide_core::{BeamSource, CellCoord, Direction, GridSize, Level, LevelId};
use thiserror::Error;

/// Board size used by the built-in levels.
pub const DEFAULT_GRID_SIZE: GridSize = GridSize::new(6);

const BUILTIN_LEVELS: [Level; 6] = [
    Level::new(
        LevelId::new(1),
        BeamSource::new(CellCoord::new(0, 2), Direction::Right),
        CellCoord::new(5, 2),
    ),
    Level::new(
        LevelId::new(2),
        BeamSource::new(CellCoord::new(0, 0), Direction::Right),
        CellCoord::new(0, 5),
    ),
    Level::new(
        LevelId::new(3),
        BeamSource::new(CellCoord::new(0, 0), Direction::Right),
        CellCoord::new(5, 5),
    ),
    Level::new(
        LevelId::new(4),
        BeamSource::new(CellCoord::new(5, 0), Direction::Left),
        CellCoord::new(0, 5),
    ),
    Level::new(
        LevelId::new(5),
        BeamSource::new(CellCoord::new(2, 0), Direction::Down),
        CellCoord::new(3, 5),
    ),
    Level::new(
        LevelId::new(6),
        BeamSource::new(CellCoord::new(0, 5), Direction::Up),
        CellCoord::new(5, 0),
    ),
];

/// Ordered, validated list of levels sharing one board size.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LevelPack {
    grid: GridSize,
    levels: Vec<Level>,
}

impl LevelPack {
    /// Validates and wraps the provided levels.
    ///
    /// Every source and target must lie on the board, a level may not use one
    /// cell for both, and level identifiers must be unique.
    pub fn new(grid: GridSize, levels: Vec<Level>) -> Result<Self, LevelPackError> {
        if grid.get() == 0 {
            return Err(LevelPackError::EmptyGrid);
        }
        if levels.is_empty() {
            return Err(LevelPackError::NoLevels);
        }

        let mut seen = BTreeSet::new();
        for level in &levels {
            let id = level.id();
            let source = level.source().cell();
            if !grid.contains(source) {
                return Err(LevelPackError::SourceOutOfBounds {
                    level: id,
                    cell: source,
                    size: grid.get(),
                });
            }
            if !grid.contains(level.target()) {
                return Err(LevelPackError::TargetOutOfBounds {
                    level: id,
                    cell: level.target(),
                    size: grid.get(),
                });
            }
            if source == level.target() {
                return Err(LevelPackError::SourceIsTarget { level: id });
            }
            if !seen.insert(id) {
                return Err(LevelPackError::DuplicateId { level: id });
            }
        }

        Ok(Self { grid, levels })
    }

    /// Six-level pack played on a 6x6 board.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            grid: DEFAULT_GRID_SIZE,
            levels: BUILTIN_LEVELS.to_vec(),
        }
    }

    /// Board size shared by every level.
    #[must_use]
    pub const fn grid(&self) -> GridSize {
        self.grid
    }

    /// Levels in play order.
    #[must_use]
    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    /// Number of levels in the pack. Never zero.
    #[must_use]
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }
}

/// Errors reported while validating level content.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum LevelPackError {
    /// The board has no cells.
    #[error("grid size must be positive")]
    EmptyGrid,
    /// The pack contains no levels.
    #[error("level pack contains no levels")]
    NoLevels,
    /// A level starts its beam outside the board.
    #[error("level {} places its source at ({}, {}) outside the {size}x{size} grid", .level.get(), .cell.column(), .cell.row())]
    SourceOutOfBounds {
        /// Offending level.
        level: LevelId,
        /// Cell provided for the source.
        cell: CellCoord,
        /// Board size the cell was checked against.
        size: u32,
    },
    /// A level places its nest outside the board.
    #[error("level {} places its target at ({}, {}) outside the {size}x{size} grid", .level.get(), .cell.column(), .cell.row())]
    TargetOutOfBounds {
        /// Offending level.
        level: LevelId,
        /// Cell provided for the target.
        cell: CellCoord,
        /// Board size the cell was checked against.
        size: u32,
    },
    /// A level uses one cell for both source and target.
    #[error("level {} uses the same cell for its source and target", .level.get())]
    SourceIsTarget {
        /// Offending level.
        level: LevelId,
    },
    /// Two levels share an identifier.
    #[error("level id {} appears more than once", .level.get())]
    DuplicateId {
        /// Repeated identifier.
        level: LevelId,
    },
}
