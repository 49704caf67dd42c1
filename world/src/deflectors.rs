//! Editable deflector layout for a single level.

use std::collections::BTreeMap;

use star_guide_core::{CellCoord, DeflectorOrientation, DeflectorView, GridSize, Level, LayoutError};

/// Before/after orientation of a cell touched by [`DeflectorMap::toggle`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeflectorChange {
    /// Orientation held before the toggle, if any.
    pub previous: Option<DeflectorOrientation>,
    /// Orientation held after the toggle, if any.
    pub current: Option<DeflectorOrientation>,
}

/// Deflectors placed by the player on the active level.
///
/// The source and target cells of the level the map was created for can
/// never hold an entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeflectorMap {
    protected: [CellCoord; 2],
    entries: BTreeMap<CellCoord, DeflectorOrientation>,
}

impl DeflectorMap {
    /// Creates an empty map guarding the source and target of `level`.
    #[must_use]
    pub fn for_level(level: &Level) -> Self {
        Self {
            protected: [level.source().cell(), level.target()],
            entries: BTreeMap::new(),
        }
    }

    /// Advances `cell` through empty → A → B → empty.
    ///
    /// Returns `None` without touching the map when `cell` is the source or
    /// the target.
    pub fn toggle(&mut self, cell: CellCoord) -> Option<DeflectorChange> {
        if self.protected.contains(&cell) {
            return None;
        }

        let previous = self.get(cell);
        let current = DeflectorOrientation::cycle(previous);
        match current {
            Some(orientation) => {
                let _ = self.entries.insert(cell, orientation);
            }
            None => {
                let _ = self.entries.remove(&cell);
            }
        }

        Some(DeflectorChange { previous, current })
    }

    /// Builds a map for the same level holding exactly `layout`.
    ///
    /// Each deflector is reached through the regular toggle sequence on a
    /// scratch map, so `self` is untouched and the first refused cell aborts
    /// the whole layout.
    pub fn with_layout(
        &self,
        grid: GridSize,
        layout: &[(CellCoord, DeflectorOrientation)],
    ) -> Result<Self, (CellCoord, LayoutError)> {
        let mut scratch = Self {
            protected: self.protected,
            entries: BTreeMap::new(),
        };

        for &(cell, orientation) in layout {
            if !grid.contains(cell) {
                return Err((cell, LayoutError::OutOfBounds));
            }
            if scratch.get(cell).is_some() {
                return Err((cell, LayoutError::DuplicateCell));
            }
            while scratch.get(cell) != Some(orientation) {
                if scratch.toggle(cell).is_none() {
                    return Err((cell, LayoutError::ProtectedCell));
                }
            }
        }

        Ok(scratch)
    }

    /// Removes every deflector, returning how many were present.
    pub fn clear(&mut self) -> usize {
        let removed = self.entries.len();
        self.entries.clear();
        removed
    }

    /// Orientation of the deflector occupying `cell`, if any.
    #[must_use]
    pub fn get(&self, cell: CellCoord) -> Option<DeflectorOrientation> {
        self.entries.get(&cell).copied()
    }

    /// Read-only snapshot consumed by the tracer and adapters.
    #[must_use]
    pub fn view(&self) -> DeflectorView<'_> {
        DeflectorView::new(&self.entries)
    }

    /// Number of placed deflectors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Reports whether no deflector is placed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use star_guide_core::{BeamSource, Direction, LevelId};

    fn level() -> Level {
        Level::new(
            LevelId::new(2),
            BeamSource::new(CellCoord::new(0, 0), Direction::Right),
            CellCoord::new(0, 5),
        )
    }

    #[test]
    fn three_toggles_return_cell_to_empty() {
        let mut map = DeflectorMap::for_level(&level());
        let cell = CellCoord::new(3, 3);

        let mut states = Vec::new();
        for _ in 0..3 {
            let change = map.toggle(cell).expect("cell is editable");
            assert_eq!(change.current, map.get(cell));
            states.push(change.current);
        }

        assert_eq!(
            states,
            vec![
                Some(DeflectorOrientation::Falling),
                Some(DeflectorOrientation::Rising),
                None
            ]
        );
        assert!(map.is_empty());
    }

    #[test]
    fn protected_cells_ignore_toggles() {
        let mut map = DeflectorMap::for_level(&level());
        let _ = map.toggle(CellCoord::new(2, 2));
        let before = map.clone();

        assert_eq!(map.toggle(CellCoord::new(0, 0)), None);
        assert_eq!(map.toggle(CellCoord::new(0, 5)), None);
        assert_eq!(map, before);
        assert_eq!(map.get(CellCoord::new(0, 0)), None);
        assert_eq!(map.get(CellCoord::new(0, 5)), None);
    }

    #[test]
    fn clear_reports_removed_entries() {
        let mut map = DeflectorMap::for_level(&level());
        let _ = map.toggle(CellCoord::new(1, 0));
        let _ = map.toggle(CellCoord::new(2, 0));
        let _ = map.toggle(CellCoord::new(2, 0));

        assert_eq!(map.len(), 2);
        assert_eq!(map.clear(), 2);
        assert!(map.is_empty());
        assert!(map.view().is_empty());
    }

    #[test]
    fn with_layout_builds_rising_deflectors_without_touching_self() {
        let mut map = DeflectorMap::for_level(&level());
        let _ = map.toggle(CellCoord::new(4, 4));
        let before = map.clone();

        let rebuilt = map
            .with_layout(
                GridSize::new(6),
                &[
                    (CellCoord::new(1, 0), DeflectorOrientation::Rising),
                    (CellCoord::new(2, 3), DeflectorOrientation::Falling),
                ],
            )
            .expect("layout fits the board");

        assert_eq!(map, before);
        assert_eq!(rebuilt.len(), 2);
        assert_eq!(
            rebuilt.get(CellCoord::new(1, 0)),
            Some(DeflectorOrientation::Rising)
        );
        assert_eq!(
            rebuilt.get(CellCoord::new(2, 3)),
            Some(DeflectorOrientation::Falling)
        );
        assert_eq!(rebuilt.get(CellCoord::new(4, 4)), None);
    }

    #[test]
    fn with_layout_refuses_invalid_cells() {
        let map = DeflectorMap::for_level(&level());
        let grid = GridSize::new(6);

        assert_eq!(
            map.with_layout(grid, &[(CellCoord::new(0, 5), DeflectorOrientation::Falling)]),
            Err((CellCoord::new(0, 5), LayoutError::ProtectedCell))
        );
        assert_eq!(
            map.with_layout(grid, &[(CellCoord::new(6, 0), DeflectorOrientation::Rising)]),
            Err((CellCoord::new(6, 0), LayoutError::OutOfBounds))
        );
        assert_eq!(
            map.with_layout(
                grid,
                &[
                    (CellCoord::new(2, 2), DeflectorOrientation::Falling),
                    (CellCoord::new(2, 2), DeflectorOrientation::Rising),
                ]
            ),
            Err((CellCoord::new(2, 2), LayoutError::DuplicateCell))
        );
    }

    #[test]
    fn view_reflects_current_entries() {
        let mut map = DeflectorMap::for_level(&level());
        let _ = map.toggle(CellCoord::new(4, 1));
        let _ = map.toggle(CellCoord::new(4, 1));

        let view = map.view();
        assert_eq!(view.len(), 1);
        assert_eq!(
            view.get(CellCoord::new(4, 1)),
            Some(DeflectorOrientation::Rising)
        );
    }
}
