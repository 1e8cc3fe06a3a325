#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Delve adapters.

use std::{fmt, io::Write};

use anyhow::{Context, Result as AnyResult};
use delve_core::{Position, Tile, TileView};

/// ANSI sequence that clears the terminal and homes the cursor.
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Heads-up display shown beneath the grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Hud {
    /// Cell occupied by the player.
    pub player: Position,
    /// Objectives collected so far.
    pub collected: u32,
    /// Objectives required to win.
    pub target: u32,
    /// Current health.
    pub health: u32,
    /// Maximum health.
    pub max_health: u32,
    /// Tile remembered beneath the player.
    pub beneath: Tile,
    /// Free-form status message.
    pub status: String,
}

impl Hud {
    fn lines(&self) -> [String; 3] {
        [
            format!(
                "Position {}   Keys {}/{}   Health {}/{}",
                self.player, self.collected, self.target, self.health, self.max_health
            ),
            format!("Standing on {}", self.beneath.description()),
            self.status.clone(),
        ]
    }
}

/// Frame ready for presentation: glyph rows plus the HUD.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    rows: Vec<String>,
    hud: Hud,
}

impl Frame {
    /// Captures the grid glyphs from `tiles`. The first row holds the
    /// highest `y`.
    #[must_use]
    pub fn capture(tiles: TileView<'_>, hud: Hud) -> Self {
        let (columns, rows) = tiles.dimensions();
        let columns = i32::try_from(columns).unwrap_or(i32::MAX);
        let rows = i32::try_from(rows).unwrap_or(i32::MAX);

        let rows = (0..rows)
            .rev()
            .map(|y| {
                (0..columns)
                    .map(|x| tiles.get(Position::new(x, y)).unwrap_or_default().glyph())
                    .collect()
            })
            .collect();
        Self { rows, hud }
    }

    /// Glyph rows from top to bottom.
    #[must_use]
    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    /// HUD attached to the frame.
    #[must_use]
    pub fn hud(&self) -> &Hud {
        &self.hud
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.rows {
            writeln!(f, "{row}")?;
        }
        for line in self.hud.lines() {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

/// Rendering backend capable of presenting Delve frames.
pub trait RenderingBackend {
    /// Presents a single frame.
    fn present(&mut self, frame: &Frame) -> AnyResult<()>;
}

/// Backend that writes frames as plain text.
#[derive(Debug)]
pub struct TextBackend<W> {
    writer: W,
    clear_screen: bool,
}

impl<W: Write> TextBackend<W> {
    /// Creates a backend writing to `writer`.
    #[must_use]
    pub const fn new(writer: W) -> Self {
        Self {
            writer,
            clear_screen: false,
        }
    }

    /// Clears the terminal before each frame when enabled.
    #[must_use]
    pub const fn with_clear_screen(mut self, clear_screen: bool) -> Self {
        self.clear_screen = clear_screen;
        self
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> RenderingBackend for TextBackend<W> {
    fn present(&mut self, frame: &Frame) -> AnyResult<()> {
        if self.clear_screen {
            self.writer
                .write_all(CLEAR_SCREEN.as_bytes())
                .context("failed to clear the terminal")?;
        }
        write!(self.writer, "{frame}").context("failed to write frame")?;
        self.writer.flush().context("failed to flush frame")
    }
}
