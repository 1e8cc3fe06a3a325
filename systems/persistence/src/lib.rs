#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Flat text persistence for Delve sessions.
//!
//! A save records only the dynamic overlay of a session. The layout itself is
//! regenerated from the stored seed when the session is restored.

use std::{
    fmt::Write as _,
    fs, io,
    path::{Path, PathBuf},
    str::Lines,
};

use delve_core::{GameState, Position, Tile};
use log::info;
use thiserror::Error;

/// File name used when no explicit save path is configured.
pub const DEFAULT_SAVE_FILE: &str = "save.txt";

/// Errors raised while reading or writing saves.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// No save exists at the configured location.
    #[error("no saved game found at {}", path.display())]
    NoSavedGame {
        /// Location that was probed.
        path: PathBuf,
    },
    /// The save could not be read or written.
    #[error("could not access save file {}", path.display())]
    Io {
        /// Location of the save file.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// A line of the save did not hold the expected record.
    #[error("line {line}: {reason}")]
    Malformed {
        /// One-based line number of the offending record.
        line: usize,
        /// Description of the expected record.
        reason: String,
    },
    /// The remembered tile description is not recognised.
    #[error("line {line}: unknown tile description '{description}'")]
    UnknownTile {
        /// One-based line number of the offending record.
        line: usize,
        /// Description that failed to resolve.
        description: String,
    },
}

/// Serialises the overlay into the line-oriented save format.
#[must_use]
pub fn encode(state: &GameState) -> String {
    let mut text = String::new();
    let _ = writeln!(text, "{}", state.seed);
    push_position(&mut text, state.player);
    let _ = writeln!(text, "{}", state.previous_tile.description());
    let _ = writeln!(text, "{}", state.objectives_collected);
    push_positions(&mut text, &state.objectives);
    push_positions(&mut text, &state.traps);
    let _ = writeln!(text, "{} {}", state.health, state.max_health);
    push_positions(&mut text, &state.adversaries);
    text
}

fn push_position(text: &mut String, position: Position) {
    let _ = writeln!(text, "{} {}", position.x(), position.y());
}

fn push_positions(text: &mut String, positions: &[Position]) {
    let _ = writeln!(text, "{}", positions.len());
    for position in positions {
        push_position(text, *position);
    }
}

/// Parses a save produced by [`encode`].
///
/// # Errors
///
/// Returns [`PersistenceError::Malformed`] naming the first line that is
/// missing or unparsable, or [`PersistenceError::UnknownTile`] when the
/// remembered tile cannot be resolved. Nothing is partially applied.
pub fn decode(text: &str) -> Result<GameState, PersistenceError> {
    let mut records = Records::new(text);

    let seed = records.scalar("seed")?;
    let player = records.position("player position")?;
    let (line, description) = records.next("tile beneath the player")?;
    let previous_tile =
        Tile::from_description(description).ok_or_else(|| PersistenceError::UnknownTile {
            line,
            description: description.trim().to_owned(),
        })?;
    let objectives_collected = records.scalar("collected objective count")?;
    let objectives = records.positions("objective")?;
    let traps = records.positions("trap")?;
    let (health, max_health) = records.pair("health")?;
    let adversaries = records.positions("adversary")?;
    records.finish()?;

    Ok(GameState {
        seed,
        player,
        previous_tile,
        objectives_collected,
        objectives,
        traps,
        health,
        max_health,
        adversaries,
    })
}

struct Records<'a> {
    lines: Lines<'a>,
    line: usize,
}

impl<'a> Records<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines(),
            line: 0,
        }
    }

    fn malformed(&self, reason: String) -> PersistenceError {
        PersistenceError::Malformed {
            line: self.line,
            reason,
        }
    }

    fn next(&mut self, expected: &str) -> Result<(usize, &'a str), PersistenceError> {
        self.line += 1;
        match self.lines.next() {
            Some(record) => Ok((self.line, record)),
            None => Err(self.malformed(format!("missing {expected}"))),
        }
    }

    fn scalar<T: std::str::FromStr>(&mut self, expected: &str) -> Result<T, PersistenceError> {
        let (_, record) = self.next(expected)?;
        record
            .trim()
            .parse()
            .map_err(|_| self.malformed(format!("expected {expected}, found '{record}'")))
    }

    fn pair<T: std::str::FromStr>(&mut self, expected: &str) -> Result<(T, T), PersistenceError> {
        let (_, record) = self.next(expected)?;
        let mut fields = record.split_whitespace().map(str::parse::<T>);
        match (fields.next(), fields.next(), fields.next()) {
            (Some(Ok(first)), Some(Ok(second)), None) => Ok((first, second)),
            _ => Err(self.malformed(format!(
                "expected {expected} as two numbers, found '{record}'"
            ))),
        }
    }

    fn position(&mut self, expected: &str) -> Result<Position, PersistenceError> {
        let (x, y) = self.pair(expected)?;
        Ok(Position::new(x, y))
    }

    fn positions(&mut self, entity: &str) -> Result<Vec<Position>, PersistenceError> {
        let count: usize = self.scalar(&format!("{entity} count"))?;
        let mut positions = Vec::new();
        for _ in 0..count {
            positions.push(self.position(&format!("{entity} position"))?);
        }
        Ok(positions)
    }

    fn finish(&mut self) -> Result<(), PersistenceError> {
        while let Some(record) = self.lines.next() {
            self.line += 1;
            if !record.trim().is_empty() {
                return Err(self.malformed(format!("unexpected trailing record '{record}'")));
            }
        }
        Ok(())
    }
}

/// File-backed save slot.
#[derive(Clone, Debug)]
pub struct SaveStore {
    path: PathBuf,
}

impl SaveStore {
    /// Creates a store that reads and writes `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the save file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reports whether a save is present.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Writes `state`, replacing any previous save.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::Io`] when the file cannot be written.
    pub fn save(&self, state: &GameState) -> Result<(), PersistenceError> {
        fs::write(&self.path, encode(state)).map_err(|source| PersistenceError::Io {
            path: self.path.clone(),
            source,
        })?;
        info!(
            "saved session {} to {}",
            state.seed,
            self.path.display()
        );
        Ok(())
    }

    /// Reads the stored overlay.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::NoSavedGame`] when the file is absent and
    /// propagates read and parse failures otherwise.
    pub fn load(&self) -> Result<GameState, PersistenceError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(source) if source.kind() == io::ErrorKind::NotFound => {
                return Err(PersistenceError::NoSavedGame {
                    path: self.path.clone(),
                })
            }
            Err(source) => {
                return Err(PersistenceError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        let state = decode(&text)?;
        info!(
            "loaded session {} from {}",
            state.seed,
            self.path.display()
        );
        Ok(state)
    }
}

impl Default for SaveStore {
    fn default() -> Self {
        Self::new(DEFAULT_SAVE_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> GameState {
        GameState {
            seed: 42,
            player: Position::new(3, 4),
            previous_tile: Tile::HallwayFloor,
            objectives_collected: 1,
            objectives: vec![Position::new(10, 10), Position::new(20, 5)],
            traps: vec![Position::new(7, 7)],
            health: 3,
            max_health: 5,
            adversaries: Vec::new(),
        }
    }

    #[test]
    fn encodes_fixed_line_order() {
        let text = encode(&sample());
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines,
            vec![
                "42",
                "3 4",
                "hallway floor",
                "1",
                "2",
                "10 10",
                "20 5",
                "1",
                "7 7",
                "3 5",
                "0",
            ]
        );
    }

    #[test]
    fn decodes_what_it_encodes() {
        let state = sample();
        assert_eq!(decode(&encode(&state)).expect("save parses"), state);
    }

    #[test]
    fn truncated_save_names_missing_line() {
        let text = "42\n3 4\nroom floor\n1\n2\n10 10\n";

        match decode(text) {
            Err(PersistenceError::Malformed { line, reason }) => {
                assert_eq!(line, 7);
                assert!(reason.contains("objective position"), "{reason}");
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn garbled_position_is_malformed() {
        let text = "42\nthree 4\n";

        assert!(matches!(
            decode(text),
            Err(PersistenceError::Malformed { line: 2, .. })
        ));
    }

    #[test]
    fn unknown_tile_is_reported() {
        let text = encode(&sample()).replace("hallway floor", "lava");

        assert!(matches!(
            decode(&text),
            Err(PersistenceError::UnknownTile { line: 3, ref description }) if description == "lava"
        ));
    }

    #[test]
    fn trailing_records_are_rejected() {
        let text = format!("{}9 9\n", encode(&sample()));

        assert!(matches!(
            decode(&text),
            Err(PersistenceError::Malformed { line: 12, .. })
        ));
    }
}
