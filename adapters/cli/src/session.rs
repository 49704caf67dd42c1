//! Line-oriented session that feeds player commands to the world.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use glam::Vec2;
use log::{debug, warn};
use star_guide_core::{CellCoord, Command, Event, LayoutError, ToggleError};
use star_guide_rendering::{
    BoardPresentation, Color, OverlayPresentation, Presentation, RenderingBackend, Scene,
    STAR_YELLOW,
};
use star_guide_system_bootstrap::Bootstrap;
use star_guide_system_input::{BoardInput, InputRouter};
use star_guide_world::{apply, query, World};
use thiserror::Error;

use crate::layout_transfer::BoardLayout;

const WINDOW_TITLE: &str = "Star Guide";
const NIGHT_SKY: Color = Color::from_rgb_u8(0x1b, 0x1f, 0x3b);
const GRID_LINE_COLOR: Color = Color::from_rgb_u8(0x9a, 0xa5, 0xd1);

const SOLVED_NOTICE: &str = "The star already reached the nest. Press n to continue.";
const UNSOLVED_NOTICE: &str = "Guide the star to the nest before moving on.";
const OFF_BOARD_NOTICE: &str = "That point is off the board.";

/// Player request typed on a single line.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum SessionCommand {
    /// Place, rotate or remove the helper on a cell.
    Toggle(CellCoord),
    /// Activate whichever cell lies under a point in board units.
    Click(Vec2),
    /// Remove every helper.
    Reset,
    /// Move to the next level.
    Advance,
    /// Move to the previous level.
    Back,
    /// Print the current layout string.
    Export,
    /// Rebuild the board from a layout string.
    Import(String),
    /// End the session.
    Quit,
}

/// Reasons a typed line could not be understood.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub(crate) enum CommandParseError {
    /// The first word names no command.
    #[error("unknown command '{0}'; expected t, c, r, n, b, export, import or q")]
    Unknown(String),
    /// The toggle command lacked valid coordinates.
    #[error("usage: t <column> <row>")]
    ToggleUsage,
    /// The click command lacked a point.
    #[error("usage: c <x> <y>")]
    ClickUsage,
    /// The import command lacked a layout string.
    #[error("usage: import <layout>")]
    ImportUsage,
}

/// Parses one input line. Blank lines and `#` comments yield `None`.
pub(crate) fn parse_command(line: &str) -> Result<Option<SessionCommand>, CommandParseError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let mut words = line.split_whitespace();
    let Some(name) = words.next() else {
        return Ok(None);
    };
    let command = match name {
        "t" | "toggle" => {
            let mut coordinate = || words.next().and_then(|word| word.parse::<u32>().ok());
            let (Some(column), Some(row)) = (coordinate(), coordinate()) else {
                return Err(CommandParseError::ToggleUsage);
            };
            SessionCommand::Toggle(CellCoord::new(column, row))
        }
        "c" | "click" => {
            let mut coordinate = || words.next().and_then(|word| word.parse::<f32>().ok());
            let (Some(x), Some(y)) = (coordinate(), coordinate()) else {
                return Err(CommandParseError::ClickUsage);
            };
            SessionCommand::Click(Vec2::new(x, y))
        }
        "r" | "reset" => SessionCommand::Reset,
        "n" | "next" => SessionCommand::Advance,
        "b" | "back" => SessionCommand::Back,
        "export" => SessionCommand::Export,
        "import" => {
            let layout = words.next().ok_or(CommandParseError::ImportUsage)?;
            SessionCommand::Import(layout.to_owned())
        }
        "q" | "quit" => SessionCommand::Quit,
        other => return Err(CommandParseError::Unknown(other.to_owned())),
    };

    if words.next().is_some() {
        return Err(match command {
            SessionCommand::Toggle(_) => CommandParseError::ToggleUsage,
            SessionCommand::Click(_) => CommandParseError::ClickUsage,
            SessionCommand::Import(_) => CommandParseError::ImportUsage,
            _ => CommandParseError::Unknown(line.to_owned()),
        });
    }

    Ok(Some(command))
}

/// What the session wants printed after a command.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Reply {
    Continue,
    Message(String),
    Quit,
}

/// Owns the world and presents it after every command.
#[derive(Debug)]
pub(crate) struct Session<B> {
    world: World,
    router: InputRouter,
    bootstrap: Bootstrap,
    board: BoardPresentation,
    backend: B,
    events: Vec<Event>,
    commands: Vec<Command>,
}

impl<B: RenderingBackend> Session<B> {
    /// Creates a session presenting `world` through `backend`.
    pub(crate) fn new(world: World, backend: B) -> Result<Self> {
        let board = BoardPresentation::new(
            query::grid_size(&world).get(),
            BoardPresentation::DEFAULT_CELL_LENGTH,
            GRID_LINE_COLOR,
        )?;
        let router = InputRouter::new(query::is_won(&world));

        Ok(Self {
            world,
            router,
            bootstrap: Bootstrap,
            board,
            backend,
            events: Vec::new(),
            commands: Vec::new(),
        })
    }

    /// Greets the player, then executes lines from `input` until it ends or
    /// the player quits.
    pub(crate) fn run<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> Result<()> {
        writeln!(output, "{}", self.bootstrap.welcome_banner(&self.world))?;
        self.present()?;

        for line in input.lines() {
            let line = line.context("failed to read command")?;
            let command = match parse_command(&line) {
                Ok(Some(command)) => command,
                Ok(None) => continue,
                Err(error) => {
                    warn!("ignoring '{line}': {error}");
                    writeln!(output, "{error}")?;
                    continue;
                }
            };

            match self.execute(command)? {
                Reply::Continue => {}
                Reply::Message(message) => writeln!(output, "{message}")?,
                Reply::Quit => break,
            }
        }

        output.flush().context("failed to flush session output")
    }

    fn execute(&mut self, command: SessionCommand) -> Result<Reply> {
        let input = match command {
            SessionCommand::Toggle(cell) => BoardInput::activate(cell),
            SessionCommand::Click(position) => match self.board.cell_at(position) {
                Some(cell) => BoardInput::activate(cell),
                None => {
                    debug!("click at {position} missed the board");
                    return Ok(Reply::Message(OFF_BOARD_NOTICE.to_owned()));
                }
            },
            SessionCommand::Reset => BoardInput {
                reset_requested: true,
                ..BoardInput::default()
            },
            SessionCommand::Advance => BoardInput {
                advance_requested: true,
                ..BoardInput::default()
            },
            SessionCommand::Back => BoardInput {
                back_requested: true,
                ..BoardInput::default()
            },
            SessionCommand::Export => {
                let encoded = BoardLayout::capture(&self.world).encode()?;
                return Ok(Reply::Message(encoded));
            }
            SessionCommand::Import(layout) => return self.import(&layout),
            SessionCommand::Quit => return Ok(Reply::Quit),
        };

        self.submit(input)
    }

    /// Lets the router observe the previous command's events, then queues
    /// the commands `input` maps to.
    fn route(&mut self, input: BoardInput) {
        self.commands.clear();
        self.router.handle(&self.events, input, &mut self.commands);
        self.events.clear();
    }

    fn submit(&mut self, input: BoardInput) -> Result<Reply> {
        self.route(input);
        if self.commands.is_empty() {
            debug!("input {input:?} produced no commands");
            let notice = if self.router.level_won() {
                SOLVED_NOTICE
            } else {
                UNSOLVED_NOTICE
            };
            return Ok(Reply::Message(notice.to_owned()));
        }

        for command in self.commands.drain(..) {
            apply(&mut self.world, command, &mut self.events);
        }

        self.present()?;
        Ok(self.rejection_reply())
    }

    fn import(&mut self, layout: &str) -> Result<Reply> {
        self.route(BoardInput::default());
        let restored = BoardLayout::decode(layout)
            .and_then(|layout| layout.restore(&mut self.world, &mut self.events));
        if let Err(error) = restored {
            warn!("layout import failed: {error}");
            return Ok(Reply::Message(format!("could not import layout: {error}")));
        }

        self.present()?;
        Ok(self.rejection_reply())
    }

    fn rejection_reply(&self) -> Reply {
        let notices: Vec<String> = self.events.iter().filter_map(describe_rejection).collect();
        if notices.is_empty() {
            return Reply::Continue;
        }

        for notice in &notices {
            warn!("{notice}");
        }
        Reply::Message(notices.join("\n"))
    }

    fn present(&mut self) -> Result<()> {
        let won = query::is_won(&self.world);
        let overlay = OverlayPresentation {
            caption: self.bootstrap.level_caption(&self.world),
            won,
            advance_label: self.bootstrap.advance_label(&self.world),
            can_retreat: query::can_retreat(&self.world),
        };
        let scene = Scene::new(
            self.board,
            self.bootstrap.level(&self.world),
            query::deflectors(&self.world),
            query::beam_trace(&self.world),
            overlay,
        );
        let clear_color = if won {
            STAR_YELLOW.lighten(0.8)
        } else {
            NIGHT_SKY
        };

        self.backend
            .present(&Presentation::new(WINDOW_TITLE, clear_color, scene))
    }
}

fn describe_rejection(event: &Event) -> Option<String> {
    match event {
        Event::DeflectorToggleRejected { cell, reason } => Some(match reason {
            ToggleError::LevelComplete => SOLVED_NOTICE.to_owned(),
            ToggleError::ProtectedCell => format!(
                "({}, {}) holds the star or the nest and cannot take a helper.",
                cell.column(),
                cell.row()
            ),
            ToggleError::OutOfBounds => {
                format!("({}, {}) is outside the board.", cell.column(), cell.row())
            }
        }),
        Event::LayoutRejected { cell, reason } => {
            let problem = match reason {
                LayoutError::ProtectedCell => "holds the star or the nest",
                LayoutError::OutOfBounds => "is outside the board",
                LayoutError::DuplicateCell => "appears twice",
            };
            Some(format!(
                "Layout not imported: ({}, {}) {problem}.",
                cell.column(),
                cell.row()
            ))
        }
        Event::AdvanceRejected { .. } => Some(UNSOLVED_NOTICE.to_owned()),
        Event::RetreatRejected { .. } => Some("This is already the first level.".to_owned()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use star_guide_core::{DeflectorOrientation, LevelId};

    #[derive(Debug, Default)]
    struct RecordingBackend {
        frames: Vec<Presentation>,
    }

    impl RenderingBackend for RecordingBackend {
        fn present(&mut self, presentation: &Presentation) -> Result<()> {
            self.frames.push(presentation.clone());
            Ok(())
        }
    }

    fn session() -> Session<RecordingBackend> {
        Session::new(World::new(), RecordingBackend::default()).expect("session starts")
    }

    fn run_script(session: &mut Session<RecordingBackend>, script: &str) -> String {
        let mut output = Vec::new();
        session
            .run(script.as_bytes(), &mut output)
            .expect("script runs");
        String::from_utf8(output).expect("output is utf-8")
    }

    #[test]
    fn parses_commands_and_aliases() {
        assert_eq!(
            parse_command("t 3 4"),
            Ok(Some(SessionCommand::Toggle(CellCoord::new(3, 4))))
        );
        assert_eq!(
            parse_command("  toggle 0 5 "),
            Ok(Some(SessionCommand::Toggle(CellCoord::new(0, 5))))
        );
        assert_eq!(
            parse_command("c 150 50.5"),
            Ok(Some(SessionCommand::Click(Vec2::new(150.0, 50.5))))
        );
        assert_eq!(parse_command("r"), Ok(Some(SessionCommand::Reset)));
        assert_eq!(parse_command("next"), Ok(Some(SessionCommand::Advance)));
        assert_eq!(parse_command("b"), Ok(Some(SessionCommand::Back)));
        assert_eq!(parse_command("export"), Ok(Some(SessionCommand::Export)));
        assert_eq!(
            parse_command("import star:v1:6x6:abc"),
            Ok(Some(SessionCommand::Import("star:v1:6x6:abc".to_owned())))
        );
        assert_eq!(parse_command("q"), Ok(Some(SessionCommand::Quit)));
        assert_eq!(parse_command("   "), Ok(None));
        assert_eq!(parse_command("# solve level two"), Ok(None));
    }

    #[test]
    fn rejects_malformed_commands() {
        assert_eq!(parse_command("t 3"), Err(CommandParseError::ToggleUsage));
        assert_eq!(parse_command("t a b"), Err(CommandParseError::ToggleUsage));
        assert_eq!(parse_command("t -1 2"), Err(CommandParseError::ToggleUsage));
        assert_eq!(parse_command("t 1 2 3"), Err(CommandParseError::ToggleUsage));
        assert_eq!(parse_command("c 10"), Err(CommandParseError::ClickUsage));
        assert_eq!(parse_command("click x 10"), Err(CommandParseError::ClickUsage));
        assert_eq!(parse_command("import"), Err(CommandParseError::ImportUsage));
        assert_eq!(
            parse_command("jump"),
            Err(CommandParseError::Unknown("jump".to_owned()))
        );
    }

    #[test]
    fn greets_and_presents_the_first_level() {
        let mut session = session();
        let output = run_script(&mut session, "");

        assert_eq!(output, "Welcome to Star Guide.\n");
        let frame = session.backend.frames.last().expect("a frame was drawn");
        assert_eq!(
            frame.scene.overlay.caption,
            "Level 1: Help the star reach the nest!"
        );
        assert!(frame.scene.overlay.won);
        assert_eq!(frame.scene.overlay.advance_label, "Next!");
        assert!(!frame.scene.overlay.can_retreat);
    }

    #[test]
    fn solving_level_two_shows_the_win_overlay() {
        let mut session = session();
        let output = run_script(&mut session, "n\nt 1 0\nt 1 5\nt 1 5\n");

        assert_eq!(output, "Welcome to Star Guide.\n");
        assert_eq!(query::level(&session.world).id(), LevelId::new(2));
        let frame = session.backend.frames.last().expect("a frame was drawn");
        assert!(frame.scene.overlay.won);
        assert!(frame.scene.overlay.can_retreat);
        assert_eq!(frame.scene.helpers.len(), 2);
        assert_eq!(
            frame.scene.helper_at(CellCoord::new(1, 5)).map(|h| h.orientation),
            Some(DeflectorOrientation::Rising)
        );
    }

    #[test]
    fn gated_inputs_explain_themselves() {
        let mut session = session();
        let output = run_script(&mut session, "t 2 2\nn\nn\nt 0 0\nt 9 9\nb\nb\n");

        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Welcome to Star Guide.",
                SOLVED_NOTICE,
                UNSOLVED_NOTICE,
                "(0, 0) holds the star or the nest and cannot take a helper.",
                "(9, 9) is outside the board.",
                "This is already the first level.",
            ]
        );
        assert_eq!(query::level_index(&session.world), 0);
    }

    #[test]
    fn clicks_activate_the_cell_under_the_point() {
        let mut session = session();
        let output = run_script(&mut session, "n\nc 150 50\n");

        assert_eq!(output, "Welcome to Star Guide.\n");
        assert_eq!(
            query::deflector_at(&session.world, CellCoord::new(1, 0)),
            Some(DeflectorOrientation::Falling)
        );
    }

    #[test]
    fn clicks_off_the_board_change_nothing() {
        let mut session = session();
        let output = run_script(&mut session, "n\nc NaN 10\nc 10 inf\nc 600 10\n");

        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Welcome to Star Guide.",
                OFF_BOARD_NOTICE,
                OFF_BOARD_NOTICE,
                OFF_BOARD_NOTICE,
            ]
        );
        assert!(query::deflectors(&session.world).is_empty());
    }

    #[test]
    fn quit_stops_reading_commands() {
        let mut session = session();
        let _ = run_script(&mut session, "q\nn\n");

        assert_eq!(query::level_index(&session.world), 0);
    }

    #[test]
    fn exported_layout_imports_after_reset() {
        let mut session = session();
        let output = run_script(&mut session, "n\nt 1 0\nt 1 5\nt 1 5\nexport\nr\n");
        let layout = output
            .lines()
            .find(|line| line.starts_with("star:v1:6x6:"))
            .expect("layout was exported")
            .to_owned();
        assert!(query::deflectors(&session.world).is_empty());

        let output = run_script(&mut session, &format!("import {layout}\n"));

        assert_eq!(output, "Welcome to Star Guide.\n");
        assert!(query::is_won(&session.world));
        assert_eq!(query::deflectors(&session.world).len(), 2);
    }

    #[test]
    fn refused_layouts_keep_the_board() {
        let mut session = session();
        let _ = run_script(&mut session, "n\nt 2 2\n");
        let layout = BoardLayout {
            grid_size: 6,
            level: LevelId::new(2),
            deflectors: vec![crate::layout_transfer::LayoutDeflector {
                cell: CellCoord::new(0, 0),
                orientation: DeflectorOrientation::Falling,
            }],
        }
        .encode()
        .expect("layout encodes");

        let output = run_script(&mut session, &format!("import {layout}\n"));

        assert!(output
            .lines()
            .any(|line| line == "Layout not imported: (0, 0) holds the star or the nest."));
        assert_eq!(
            query::deflector_at(&session.world, CellCoord::new(2, 2)),
            Some(DeflectorOrientation::Falling)
        );
    }

    #[test]
    fn bad_layouts_are_reported() {
        let mut session = session();
        let output = run_script(&mut session, "import moon:v1:6x6:e30\n");

        assert!(output
            .lines()
            .any(|line| line == "could not import layout: layout prefix 'moon' is not supported"));
    }
}
