#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Star Guide engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing player intent, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values describing what
//! changed. The beam tracer consumes immutable [`DeflectorView`] snapshots and
//! answers with a [`BeamTrace`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Star Guide.";

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Command {
    /// Places, rotates or removes the deflector occupying the provided cell.
    ToggleDeflector {
        /// Cell activated by the player.
        cell: CellCoord,
    },
    /// Removes every deflector from the active level.
    ResetBoard,
    /// Replaces the board of the active level with the provided deflectors.
    ///
    /// The layout is applied as a whole or not at all.
    InstallLayout {
        /// Deflectors to place, at most one per cell.
        deflectors: Vec<(CellCoord, DeflectorOrientation)>,
    },
    /// Moves on to the next level once the active level is complete.
    AdvanceLevel,
    /// Returns to the previous level.
    RetreatLevel,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that the deflector state of a cell changed.
    DeflectorChanged {
        /// Cell whose deflector changed.
        cell: CellCoord,
        /// Orientation held before the change, if any.
        previous: Option<DeflectorOrientation>,
        /// Orientation held after the change, if any.
        current: Option<DeflectorOrientation>,
    },
    /// Confirms that every deflector was removed from the active level.
    BoardCleared {
        /// Level whose board was cleared.
        level: LevelId,
        /// Number of deflectors that were removed.
        removed: usize,
    },
    /// Confirms that a layout replaced the board of the active level.
    LayoutInstalled {
        /// Level whose board was replaced.
        level: LevelId,
        /// Number of deflectors now on the board.
        placed: usize,
    },
    /// Reports that a layout was refused and the board left untouched.
    LayoutRejected {
        /// First cell that could not take its deflector.
        cell: CellCoord,
        /// Specific reason the layout was refused.
        reason: LayoutError,
    },
    /// Announces that a level became active with an empty board.
    LevelStarted {
        /// Zero-based position of the level within the level pack.
        index: usize,
        /// Identifier of the level.
        level: LevelId,
    },
    /// Reports the result of the latest beam recomputation.
    BeamTraced {
        /// How the trace terminated.
        outcome: TraceOutcome,
        /// Number of cells recorded along the beam path.
        length: usize,
    },
    /// Announces that the beam reached the nest of the active level.
    LevelCompleted {
        /// Identifier of the completed level.
        level: LevelId,
    },
    /// Reports that a deflector toggle request was rejected.
    DeflectorToggleRejected {
        /// Cell provided in the toggle request.
        cell: CellCoord,
        /// Specific reason the toggle was ignored.
        reason: ToggleError,
    },
    /// Reports that a request to advance was rejected.
    AdvanceRejected {
        /// Level that remained active.
        level: LevelId,
        /// Specific reason the advance was ignored.
        reason: AdvanceError,
    },
    /// Reports that a request to go back was rejected.
    RetreatRejected {
        /// Level that remained active.
        level: LevelId,
        /// Specific reason the retreat was ignored.
        reason: RetreatError,
    },
}

/// Cardinal headings available to the beam.
///
/// Rows grow downward, so [`Direction::Down`] increases the row index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Movement toward decreasing row indices.
    Up,
    /// Movement toward increasing column indices.
    Right,
    /// Movement toward increasing row indices.
    Down,
    /// Movement toward decreasing column indices.
    Left,
}

impl Direction {
    /// Every direction in clockwise order starting from [`Direction::Up`].
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    /// Unit displacement expressed as `(column, row)` deltas.
    #[must_use]
    pub const fn displacement(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Right => (1, 0),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
        }
    }
}

/// Orientation held by a deflector.
///
/// The two orientations behave like the two diagonal mirrors of a square
/// cell. A freshly placed deflector starts as [`DeflectorOrientation::Falling`]
/// and rotates to [`DeflectorOrientation::Rising`] on the next activation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeflectorOrientation {
    /// Orientation A, the `\` diagonal: right↔down and left↔up.
    Falling,
    /// Orientation B, the `/` diagonal: right↔up and left↔down.
    Rising,
}

impl DeflectorOrientation {
    /// Heading of a beam leaving a cell occupied by this deflector.
    #[must_use]
    pub const fn deflect(self, heading: Direction) -> Direction {
        match (self, heading) {
            (Self::Falling, Direction::Right) => Direction::Down,
            (Self::Falling, Direction::Down) => Direction::Right,
            (Self::Falling, Direction::Left) => Direction::Up,
            (Self::Falling, Direction::Up) => Direction::Left,
            (Self::Rising, Direction::Right) => Direction::Up,
            (Self::Rising, Direction::Up) => Direction::Right,
            (Self::Rising, Direction::Left) => Direction::Down,
            (Self::Rising, Direction::Down) => Direction::Left,
        }
    }

    /// State that follows `current` in the empty → A → B → empty cycle.
    #[must_use]
    pub const fn cycle(current: Option<Self>) -> Option<Self> {
        match current {
            None => Some(Self::Falling),
            Some(Self::Falling) => Some(Self::Rising),
            Some(Self::Rising) => None,
        }
    }
}

/// Side length of the square board measured in cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GridSize(u32);

impl GridSize {
    /// Creates a new grid size wrapper.
    #[must_use]
    pub const fn new(cells_per_side: u32) -> Self {
        Self(cells_per_side)
    }

    /// Number of cells along each edge of the board.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Reports whether the cell lies on the board.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column < self.0 && cell.row < self.0
    }

    /// Total number of cells on the board.
    #[must_use]
    pub const fn cell_count(&self) -> u64 {
        self.0 as u64 * self.0 as u64
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Cell reached by taking one step in `direction`.
    ///
    /// Returns `None` when the step leaves the board.
    #[must_use]
    pub fn neighbor(self, direction: Direction, grid: GridSize) -> Option<CellCoord> {
        let (column_delta, row_delta) = direction.displacement();
        let column = self.column.checked_add_signed(column_delta)?;
        let row = self.row.checked_add_signed(row_delta)?;
        let next = CellCoord::new(column, row);
        grid.contains(next).then_some(next)
    }
}

/// Identifier printed alongside a level, e.g. "Level 3".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LevelId(u32);

impl LevelId {
    /// Creates a new level identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Fixed origin of the beam within a level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BeamSource {
    cell: CellCoord,
    direction: Direction,
}

impl BeamSource {
    /// Creates a beam source leaving `cell` toward `direction`.
    #[must_use]
    pub const fn new(cell: CellCoord, direction: Direction) -> Self {
        Self { cell, direction }
    }

    /// Cell the beam starts from.
    #[must_use]
    pub const fn cell(&self) -> CellCoord {
        self.cell
    }

    /// Initial heading of the beam.
    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }
}

/// Immutable puzzle definition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Level {
    id: LevelId,
    source: BeamSource,
    target: CellCoord,
}

impl Level {
    /// Creates a new level definition.
    #[must_use]
    pub const fn new(id: LevelId, source: BeamSource, target: CellCoord) -> Self {
        Self { id, source, target }
    }

    /// Identifier of the level.
    #[must_use]
    pub const fn id(&self) -> LevelId {
        self.id
    }

    /// Origin of the beam.
    #[must_use]
    pub const fn source(&self) -> BeamSource {
        self.source
    }

    /// Cell the beam must reach to complete the level.
    #[must_use]
    pub const fn target(&self) -> CellCoord {
        self.target
    }

    /// Reports whether the cell is the source or the target and therefore
    /// can never hold a deflector.
    #[must_use]
    pub fn is_protected(&self, cell: CellCoord) -> bool {
        cell == self.source.cell || cell == self.target
    }
}

/// Reason a beam trace stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TraceOutcome {
    /// The beam stepped onto the target cell.
    Reached,
    /// The beam left the board.
    Exited,
    /// The beam repeated a position and heading, or exhausted the step cap.
    Cycle,
}

impl TraceOutcome {
    /// Reports whether the trace completed the level.
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Reached)
    }
}

/// Result of tracing the beam across a board.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BeamTrace {
    path: Vec<CellCoord>,
    outcome: TraceOutcome,
}

impl BeamTrace {
    /// Creates a new trace from the visited cells and the termination cause.
    #[must_use]
    pub fn new(path: Vec<CellCoord>, outcome: TraceOutcome) -> Self {
        Self { path, outcome }
    }

    /// Cells visited by the beam in order, starting at the source.
    #[must_use]
    pub fn path(&self) -> &[CellCoord] {
        &self.path
    }

    /// How the trace terminated.
    #[must_use]
    pub const fn outcome(&self) -> TraceOutcome {
        self.outcome
    }

    /// Reports whether the beam reached the target.
    #[must_use]
    pub const fn reached_target(&self) -> bool {
        self.outcome.is_success()
    }
}

/// Read-only view into the deflectors placed on the board.
#[derive(Clone, Copy, Debug)]
pub struct DeflectorView<'a> {
    entries: &'a BTreeMap<CellCoord, DeflectorOrientation>,
}

impl<'a> DeflectorView<'a> {
    /// Captures a new view backed by the provided map.
    #[must_use]
    pub fn new(entries: &'a BTreeMap<CellCoord, DeflectorOrientation>) -> Self {
        Self { entries }
    }

    /// Returns the orientation of the deflector occupying `cell`, if any.
    #[must_use]
    pub fn get(&self, cell: CellCoord) -> Option<DeflectorOrientation> {
        self.entries.get(&cell).copied()
    }

    /// Iterator over the placed deflectors in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, DeflectorOrientation)> + 'a {
        let mut cells: Vec<_> = self
            .entries
            .iter()
            .map(|(cell, orientation)| (*cell, *orientation))
            .collect();
        cells.sort_by_key(|(cell, _)| (cell.row(), cell.column()));
        cells.into_iter()
    }

    /// Number of placed deflectors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Reports whether the board holds no deflectors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Reasons a deflector toggle request may be ignored by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToggleError {
    /// The active level is already complete, so the board is frozen.
    LevelComplete,
    /// The cell holds the source or the target.
    ProtectedCell,
    /// The cell lies outside the board.
    OutOfBounds,
}

/// Reasons a layout may be refused by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LayoutError {
    /// The cell holds the source or the target.
    ProtectedCell,
    /// The cell lies outside the board.
    OutOfBounds,
    /// The layout lists the cell more than once.
    DuplicateCell,
}

/// Reasons an advance request may be ignored by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AdvanceError {
    /// The beam has not reached the target yet.
    LevelIncomplete,
}

/// Reasons a retreat request may be ignored by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RetreatError {
    /// The first level is active, so there is nothing to go back to.
    FirstLevel,
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::{
        BeamSource, CellCoord, DeflectorOrientation, DeflectorView, Direction, GridSize, Level,
        LevelId,
    };

    #[test]
    fn falling_deflector_swaps_right_with_down_and_left_with_up() {
        let falling = DeflectorOrientation::Falling;
        assert_eq!(falling.deflect(Direction::Right), Direction::Down);
        assert_eq!(falling.deflect(Direction::Down), Direction::Right);
        assert_eq!(falling.deflect(Direction::Left), Direction::Up);
        assert_eq!(falling.deflect(Direction::Up), Direction::Left);
    }

    #[test]
    fn rising_deflector_swaps_right_with_up_and_left_with_down() {
        let rising = DeflectorOrientation::Rising;
        assert_eq!(rising.deflect(Direction::Right), Direction::Up);
        assert_eq!(rising.deflect(Direction::Up), Direction::Right);
        assert_eq!(rising.deflect(Direction::Left), Direction::Down);
        assert_eq!(rising.deflect(Direction::Down), Direction::Left);
    }

    #[test]
    fn deflecting_twice_restores_heading() {
        for orientation in [DeflectorOrientation::Falling, DeflectorOrientation::Rising] {
            for heading in Direction::ALL {
                assert_eq!(orientation.deflect(orientation.deflect(heading)), heading);
            }
        }
    }

    #[test]
    fn cycle_visits_falling_then_rising_then_empty() {
        let first = DeflectorOrientation::cycle(None);
        let second = DeflectorOrientation::cycle(first);
        let third = DeflectorOrientation::cycle(second);
        assert_eq!(
            [first, second, third],
            [
                Some(DeflectorOrientation::Falling),
                Some(DeflectorOrientation::Rising),
                None
            ]
        );
    }

    #[test]
    fn manhattan_distance_matches_expectation() {
        let origin = CellCoord::new(1, 1);
        let destination = CellCoord::new(4, 3);
        assert_eq!(origin.manhattan_distance(destination), 5);
        assert_eq!(destination.manhattan_distance(origin), 5);
    }

    #[test]
    fn neighbor_stays_within_grid() {
        let grid = GridSize::new(6);
        let corner = CellCoord::new(0, 0);
        assert_eq!(corner.neighbor(Direction::Up, grid), None);
        assert_eq!(corner.neighbor(Direction::Left, grid), None);
        assert_eq!(
            corner.neighbor(Direction::Right, grid),
            Some(CellCoord::new(1, 0))
        );
        assert_eq!(
            corner.neighbor(Direction::Down, grid),
            Some(CellCoord::new(0, 1))
        );

        let far_corner = CellCoord::new(5, 5);
        assert_eq!(far_corner.neighbor(Direction::Right, grid), None);
        assert_eq!(far_corner.neighbor(Direction::Down, grid), None);
    }

    #[test]
    fn protected_cells_cover_source_and_target() {
        let level = Level::new(
            LevelId::new(1),
            BeamSource::new(CellCoord::new(0, 2), Direction::Right),
            CellCoord::new(5, 2),
        );
        assert!(level.is_protected(CellCoord::new(0, 2)));
        assert!(level.is_protected(CellCoord::new(5, 2)));
        assert!(!level.is_protected(CellCoord::new(3, 2)));
    }

    #[test]
    fn deflector_view_iterates_in_row_major_order() {
        let mut entries = BTreeMap::new();
        let _ = entries.insert(CellCoord::new(4, 0), DeflectorOrientation::Rising);
        let _ = entries.insert(CellCoord::new(1, 2), DeflectorOrientation::Falling);
        let _ = entries.insert(CellCoord::new(2, 0), DeflectorOrientation::Falling);
        let view = DeflectorView::new(&entries);

        let cells: Vec<_> = view.iter().map(|(cell, _)| cell).collect();
        assert_eq!(
            cells,
            vec![
                CellCoord::new(2, 0),
                CellCoord::new(4, 0),
                CellCoord::new(1, 2)
            ]
        );
        assert_eq!(view.len(), 3);
        assert_eq!(
            view.get(CellCoord::new(4, 0)),
            Some(DeflectorOrientation::Rising)
        );
        assert_eq!(view.get(CellCoord::new(3, 3)), None);
    }

    #[test]
    fn level_round_trips_through_bincode() {
        let level = Level::new(
            LevelId::new(5),
            BeamSource::new(CellCoord::new(2, 0), Direction::Down),
            CellCoord::new(3, 5),
        );
        let bytes = bincode::serialize(&level).expect("serialize");
        let restored: Level = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(restored, level);
    }
}
