use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};
use star_guide_core::{CellCoord, Command, DeflectorOrientation, Event, LevelId};
use star_guide_world::{apply, query, World};
use thiserror::Error;

const LAYOUT_DOMAIN: &str = "star";
const LAYOUT_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded layout payload.
pub(crate) const LAYOUT_HEADER: &str = "star:v1";
/// Delimiter used to separate the prefix, grid dimensions and payload.
const FIELD_DELIMITER: char = ':';

/// Deflectors placed on one level, captured for clipboard transfer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct BoardLayout {
    /// Number of cells along each edge of the board.
    pub(crate) grid_size: u32,
    /// Level the deflectors were placed on.
    pub(crate) level: LevelId,
    /// Deflectors in row-major order.
    pub(crate) deflectors: Vec<LayoutDeflector>,
}

/// Deflector description captured within a layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct LayoutDeflector {
    /// Cell holding the deflector.
    pub(crate) cell: CellCoord,
    /// Orientation of the deflector.
    pub(crate) orientation: DeflectorOrientation,
}

#[derive(Debug, Serialize, Deserialize)]
struct SerializableLayout {
    level: LevelId,
    deflectors: Vec<LayoutDeflector>,
}

impl BoardLayout {
    /// Captures the board of the world's active level.
    #[must_use]
    pub(crate) fn capture(world: &World) -> Self {
        Self {
            grid_size: query::grid_size(world).get(),
            level: query::level(world).id(),
            deflectors: query::deflectors(world)
                .iter()
                .map(|(cell, orientation)| LayoutDeflector { cell, orientation })
                .collect(),
        }
    }

    /// Encodes the layout into a single-line string suitable for clipboard transfer.
    pub(crate) fn encode(&self) -> Result<String, LayoutTransferError> {
        let payload = SerializableLayout {
            level: self.level,
            deflectors: self.deflectors.clone(),
        };
        let json = serde_json::to_vec(&payload).map_err(LayoutTransferError::InvalidPayload)?;
        let encoded = STANDARD_NO_PAD.encode(json);
        Ok(format!(
            "{LAYOUT_HEADER}:{size}x{size}:{encoded}",
            size = self.grid_size
        ))
    }

    /// Decodes a layout from the provided string representation.
    pub(crate) fn decode(value: &str) -> Result<Self, LayoutTransferError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(LayoutTransferError::EmptyPayload);
        }

        let mut parts = trimmed.split(FIELD_DELIMITER);
        let domain = parts.next().ok_or(LayoutTransferError::MissingPrefix)?;
        let version = parts.next().ok_or(LayoutTransferError::MissingVersion)?;
        let dimensions = parts.next().ok_or(LayoutTransferError::MissingDimensions)?;
        let payload = parts.next().ok_or(LayoutTransferError::MissingPayload)?;

        if domain != LAYOUT_DOMAIN {
            return Err(LayoutTransferError::InvalidPrefix(domain.to_owned()));
        }
        if version != LAYOUT_VERSION {
            return Err(LayoutTransferError::UnsupportedVersion(version.to_owned()));
        }

        let grid_size = parse_dimensions(dimensions)?;
        let bytes = STANDARD_NO_PAD
            .decode(payload.as_bytes())
            .map_err(LayoutTransferError::InvalidEncoding)?;
        let decoded: SerializableLayout =
            serde_json::from_slice(&bytes).map_err(LayoutTransferError::InvalidPayload)?;

        Ok(Self {
            grid_size,
            level: decoded.level,
            deflectors: decoded.deflectors,
        })
    }

    /// Rebuilds the layout on the world's active level.
    ///
    /// The world installs the layout in one step or refuses it as a whole;
    /// a refusal surfaces as a rejection event in `out_events`.
    pub(crate) fn restore(
        &self,
        world: &mut World,
        out_events: &mut Vec<Event>,
    ) -> Result<(), LayoutTransferError> {
        let grid_size = query::grid_size(world).get();
        if self.grid_size != grid_size {
            return Err(LayoutTransferError::GridMismatch {
                expected: grid_size,
                found: self.grid_size,
            });
        }
        let active = query::level(world).id();
        if self.level != active {
            return Err(LayoutTransferError::LevelMismatch {
                expected: active.get(),
                found: self.level.get(),
            });
        }

        let deflectors = self
            .deflectors
            .iter()
            .map(|deflector| (deflector.cell, deflector.orientation))
            .collect();
        apply(world, Command::InstallLayout { deflectors }, out_events);

        Ok(())
    }
}

/// Errors that can occur while transferring layout strings.
#[derive(Debug, Error)]
pub(crate) enum LayoutTransferError {
    /// The provided string was empty or contained only whitespace.
    #[error("layout string was empty")]
    EmptyPayload,
    /// The prefix segment was missing from the encoded layout.
    #[error("layout string is missing the prefix")]
    MissingPrefix,
    /// The encoded layout did not contain a version segment.
    #[error("layout string is missing the version")]
    MissingVersion,
    /// The encoded layout did not include grid dimensions.
    #[error("layout string is missing the grid dimensions")]
    MissingDimensions,
    /// The encoded layout did not include the payload segment.
    #[error("layout string is missing the payload")]
    MissingPayload,
    /// The encoded layout used an unexpected prefix segment.
    #[error("layout prefix '{0}' is not supported")]
    InvalidPrefix(String),
    /// The encoded layout used an unsupported version identifier.
    #[error("layout version '{0}' is not supported")]
    UnsupportedVersion(String),
    /// The grid dimensions could not be parsed or were not square.
    #[error("could not parse grid dimensions '{0}'")]
    InvalidDimensions(String),
    /// The base64 payload could not be decoded.
    #[error("could not decode layout payload: {0}")]
    InvalidEncoding(#[source] base64::DecodeError),
    /// The payload could not be serialised or deserialised.
    #[error("could not parse layout payload: {0}")]
    InvalidPayload(#[source] serde_json::Error),
    /// The layout was captured on a board of another size.
    #[error("layout targets a {found}x{found} board but this board is {expected}x{expected}")]
    GridMismatch {
        /// Size of the active board.
        expected: u32,
        /// Size recorded in the layout.
        found: u32,
    },
    /// The layout was captured on another level.
    #[error("layout belongs to level {found} but level {expected} is active")]
    LevelMismatch {
        /// Identifier of the active level.
        expected: u32,
        /// Identifier recorded in the layout.
        found: u32,
    },
}

fn parse_dimensions(dimensions: &str) -> Result<u32, LayoutTransferError> {
    let invalid = || LayoutTransferError::InvalidDimensions(dimensions.to_owned());
    let (columns, rows) = dimensions.split_once(['x', 'X']).ok_or_else(invalid)?;

    let columns = columns.trim().parse::<u32>().map_err(|_| invalid())?;
    let rows = rows.trim().parse::<u32>().map_err(|_| invalid())?;

    if columns == 0 || columns != rows {
        return Err(invalid());
    }

    Ok(columns)
}
