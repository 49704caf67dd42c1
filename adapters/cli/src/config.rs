//! TOML level packs loaded through `--levels`.

use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use star_guide_core::{BeamSource, CellCoord, Direction, GridSize, Level, LevelId};
use star_guide_world::LevelPack;

const SUPPORTED_LEVEL_FILE_VERSION: u32 = 1;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LevelPackFile {
    version: u32,
    grid_size: u32,
    levels: Vec<LevelEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LevelEntry {
    id: u32,
    source: [u32; 2],
    direction: Direction,
    target: [u32; 2],
}

impl LevelEntry {
    fn to_level(&self) -> Level {
        Level::new(
            LevelId::new(self.id),
            BeamSource::new(CellCoord::new(self.source[0], self.source[1]), self.direction),
            CellCoord::new(self.target[0], self.target[1]),
        )
    }
}

/// Reads and validates the level pack stored at `path`.
pub(crate) fn load_level_pack(path: &Path) -> Result<LevelPack> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read level pack at {}", path.display()))?;
    parse_level_pack(&contents)
        .with_context(|| format!("invalid level pack at {}", path.display()))
}

fn parse_level_pack(contents: &str) -> Result<LevelPack> {
    let file: LevelPackFile =
        toml::from_str(contents).context("failed to parse level pack toml contents")?;
    if file.version != SUPPORTED_LEVEL_FILE_VERSION {
        bail!(
            "unsupported level pack version {}; expected {}",
            file.version,
            SUPPORTED_LEVEL_FILE_VERSION
        );
    }

    let levels = file.levels.iter().map(LevelEntry::to_level).collect();
    let pack = LevelPack::new(GridSize::new(file.grid_size), levels)?;
    Ok(pack)
}
