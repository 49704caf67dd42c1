//! Plain-text rendering backend for terminals.

use std::{collections::BTreeSet, fmt::Write as _, io::Write};

use anyhow::{Context, Result};
use star_guide_core::{CellCoord, DeflectorOrientation, TraceOutcome};
use star_guide_rendering::{Presentation, RenderingBackend, Scene};

/// Draws every presented scene as an ASCII board.
#[derive(Debug)]
pub(crate) struct TextBackend<W> {
    out: W,
}

impl<W: Write> TextBackend<W> {
    /// Creates a backend writing frames to `out`.
    pub(crate) fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> RenderingBackend for TextBackend<W> {
    fn present(&mut self, presentation: &Presentation) -> Result<()> {
        let frame = render_frame(presentation);
        self.out
            .write_all(frame.as_bytes())
            .and_then(|()| self.out.flush())
            .context("failed to write board to the terminal")
    }
}

fn render_frame(presentation: &Presentation) -> String {
    let scene = &presentation.scene;
    let mut frame = String::new();
    let _ = writeln!(frame, "{}", scene.overlay.caption);
    render_board(scene, &mut frame);

    if !scene.helpers.is_empty() {
        let helpers: Vec<String> = scene
            .helpers
            .iter()
            .map(|helper| {
                format!(
                    "{} ({}, {}) {}",
                    helper.glyph,
                    helper.cell.column(),
                    helper.cell.row(),
                    orientation_glyph(helper.orientation)
                )
            })
            .collect();
        let _ = writeln!(frame, "helpers: {}", helpers.join(", "));
    }

    let cells = scene.beam.cells.len();
    let _ = match scene.beam.outcome {
        TraceOutcome::Exited if !scene.beam.is_drawable() => {
            writeln!(frame, "The star left the board straight away.")
        }
        TraceOutcome::Reached => writeln!(frame, "The star reached the nest in {cells} cells!"),
        TraceOutcome::Exited => writeln!(frame, "The star left the board after {cells} cells."),
        TraceOutcome::Cycle => writeln!(frame, "The star is going in circles ({cells} cells)."),
    };

    let advance = format!("[n] {}", scene.overlay.advance_label);
    let mut buttons = vec!["[r] Reset"];
    if scene.overlay.can_retreat {
        buttons.push("[b] Back");
    }
    if scene.overlay.won {
        buttons.push(&advance);
    }
    let _ = writeln!(frame, "{}", buttons.join("  "));
    frame
}

fn render_board(scene: &Scene, frame: &mut String) {
    let size = scene.board.cells_per_side;
    let beam: BTreeSet<CellCoord> = if scene.beam.is_drawable() {
        scene.beam.cells.iter().copied().collect()
    } else {
        BTreeSet::new()
    };

    frame.push_str("  ");
    for column in 0..size {
        let _ = write!(frame, " {}", column % 10);
    }
    frame.push('\n');

    for row in 0..size {
        let _ = write!(frame, "{:>2}", row % 100);
        for column in 0..size {
            let cell = CellCoord::new(column, row);
            let glyph = if cell == scene.source.cell {
                'S'
            } else if cell == scene.target {
                'N'
            } else if let Some(helper) = scene.helper_at(cell) {
                orientation_glyph(helper.orientation)
            } else if beam.contains(&cell) {
                '*'
            } else {
                '.'
            };
            frame.push(' ');
            frame.push(glyph);
        }
        frame.push('\n');
    }
}

fn orientation_glyph(orientation: DeflectorOrientation) -> char {
    match orientation {
        DeflectorOrientation::Falling => '\\',
        DeflectorOrientation::Rising => '/',
    }
}
