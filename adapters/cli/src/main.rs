#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs Star Guide in a terminal.

mod config;
mod layout_transfer;
mod session;
mod text_backend;

use std::{io, path::PathBuf};

use anyhow::Result;
use clap::Parser;
use log::info;
use star_guide_system_beam_tracing::{BeamTracer, DEFAULT_STEP_CAP};
use star_guide_world::{LevelPack, World};

use crate::{session::Session, text_backend::TextBackend};

/// Guide the star to its nest by placing helpers on the board.
#[derive(Debug, Parser)]
#[command(name = "star-guide", version)]
struct CliArgs {
    /// TOML level pack replacing the built-in levels.
    #[arg(long, value_name = "FILE")]
    levels: Option<PathBuf>,
    /// Most steps the star takes before it gives up.
    #[arg(long, value_name = "STEPS", default_value_t = DEFAULT_STEP_CAP)]
    step_cap: usize,
    /// Semicolon-separated commands to run instead of reading stdin.
    #[arg(long, value_name = "COMMANDS")]
    script: Option<String>,
}

/// Entry point for the Star Guide command-line interface.
fn main() -> Result<()> {
    env_logger::init();
    let args = CliArgs::parse();

    let pack = match &args.levels {
        Some(path) => config::load_level_pack(path)?,
        None => LevelPack::builtin(),
    };
    info!(
        "loaded {} levels on a {}x{} board",
        pack.level_count(),
        pack.grid().get(),
        pack.grid().get()
    );
    let tracer = BeamTracer::with_step_cap(args.step_cap);
    info!("beams give up after {} steps", tracer.step_cap());
    let world = World::with_levels(pack, tracer);
    let mut session = Session::new(world, TextBackend::new(io::stdout()))?;

    match args.script {
        Some(script) => {
            let lines = script.replace(';', "\n");
            session.run(lines.as_bytes(), io::stdout())
        }
        None => session.run(io::stdin().lock(), io::stdout()),
    }
}
