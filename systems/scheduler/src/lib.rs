#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Tick scheduler that drives a Delve session.
//!
//! Each tick applies at most one player intent, resolves trap collisions,
//! lets every ready adversary act, advances traps on their slower cadence and
//! reports whether the session ended and whether a redraw is needed.

use std::{collections::VecDeque, thread, time::Duration};

use delve_core::{Command, Direction, Event, GameState, Intent, ScheduleConfig};
use delve_system_persistence::{PersistenceError, SaveStore};
use delve_system_pursuit::Pursuit;
use delve_world::{self as world, query, World};
use log::debug;

/// Key that arms the quit sequence.
pub const COMMAND_PREFIX: char = ':';
/// Key that saves and quits when typed after [`COMMAND_PREFIX`].
pub const QUIT_KEY: char = 'q';
/// Key that leaves the session without saving.
pub const ESCAPE_KEY: char = '\u{1b}';

/// Non-blocking source of player keystrokes.
pub trait InputSource {
    /// Returns the next pending character, if any.
    fn poll(&mut self) -> Option<char>;
}

/// Destination for the session overlay when the player quits.
pub trait SaveSink {
    /// Persists `state`.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the state could not be stored.
    fn save(&mut self, state: &GameState) -> Result<(), PersistenceError>;
}

impl SaveSink for SaveStore {
    fn save(&mut self, state: &GameState) -> Result<(), PersistenceError> {
        SaveStore::save(self, state)
    }
}

/// Input source that replays a fixed keystroke script.
#[derive(Clone, Debug, Default)]
pub struct ScriptedInput {
    keys: VecDeque<char>,
}

impl ScriptedInput {
    /// Creates a script from the characters of `keys`.
    #[must_use]
    pub fn new(keys: &str) -> Self {
        Self {
            keys: keys.chars().collect(),
        }
    }

    /// Number of keystrokes not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.keys.len()
    }
}

impl InputSource for ScriptedInput {
    fn poll(&mut self) -> Option<char> {
        self.keys.pop_front()
    }
}

/// Decodes raw keystrokes into intents, tracking the quit prefix.
#[derive(Clone, Copy, Debug, Default)]
pub struct IntentDecoder {
    armed: bool,
}

impl IntentDecoder {
    /// Decodes a single keystroke.
    ///
    /// A keystroke following [`COMMAND_PREFIX`] that is not [`QUIT_KEY`]
    /// disarms the sequence and is decoded normally.
    pub fn decode(&mut self, key: char) -> Option<Intent> {
        if key == COMMAND_PREFIX {
            self.armed = true;
            return None;
        }
        let armed = std::mem::take(&mut self.armed);
        if armed && key.to_ascii_lowercase() == QUIT_KEY {
            return Some(Intent::Quit);
        }
        if key == ESCAPE_KEY {
            return Some(Intent::Leave);
        }
        Direction::from_intent(key).map(Intent::Move)
    }
}

/// State of the session after a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionStatus {
    /// The session continues.
    Running,
    /// Every objective was collected.
    Won,
    /// The player died.
    Lost,
    /// The player saved and quit.
    Quit,
    /// The player left without saving.
    Left,
}

impl SessionStatus {
    /// Reports whether the session has ended.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Running)
    }
}

/// Result of a single tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickOutcome {
    /// Session state after the tick.
    pub status: SessionStatus,
    /// Indicates whether the tick changed anything visible.
    pub render: bool,
}

/// Drives the per-tick ordering of player, trap and adversary updates.
#[derive(Debug)]
pub struct GameLoop {
    decoder: IntentDecoder,
    pursuit: Pursuit,
    trap_interval: u32,
    tick_interval: Duration,
    trap_counter: u32,
    events: Vec<Event>,
}

impl GameLoop {
    /// Creates a scheduler using the provided cadence settings.
    #[must_use]
    pub fn new(config: &ScheduleConfig) -> Self {
        Self {
            decoder: IntentDecoder::default(),
            pursuit: Pursuit,
            trap_interval: config.trap_interval.max(1),
            tick_interval: Duration::from_millis(config.tick_interval_ms),
            trap_counter: 0,
            events: Vec::new(),
        }
    }

    /// Events produced by the most recent tick.
    #[must_use]
    pub fn last_events(&self) -> &[Event] {
        &self.events
    }

    /// Runs a single tick with at most one keystroke.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the quit save fails. The world is
    /// left untouched in that case.
    pub fn tick(
        &mut self,
        world: &mut World,
        input: Option<char>,
        sink: &mut dyn SaveSink,
    ) -> Result<TickOutcome, PersistenceError> {
        self.events.clear();

        match input.and_then(|key| self.decoder.decode(key)) {
            Some(Intent::Quit) => {
                sink.save(&query::game_state(world))?;
                debug!("session {} saved on quit", query::seed(world));
                return Ok(self.outcome(SessionStatus::Quit));
            }
            Some(Intent::Leave) => {
                debug!("session {} left without saving", query::seed(world));
                return Ok(self.outcome(SessionStatus::Left));
            }
            Some(Intent::Move(direction)) => {
                world::apply(world, Command::MovePlayer { direction }, &mut self.events);
                world::apply(world, Command::ResolveTrapCollisions, &mut self.events);
            }
            None => {}
        }

        if let Some(status) = terminal_status(world) {
            return Ok(self.outcome(status));
        }

        world::apply(world, Command::Tick, &mut self.events);
        self.advance_adversaries(world);
        self.advance_traps(world);

        let status = terminal_status(world).unwrap_or(SessionStatus::Running);
        Ok(self.outcome(status))
    }

    fn advance_adversaries(&mut self, world: &mut World) {
        for id in query::ready_adversaries(world) {
            if query::is_lost(world) {
                break;
            }
            let adversaries = query::adversary_view(world);
            let Some(snapshot) = adversaries.iter().find(|snapshot| snapshot.id == id) else {
                continue;
            };
            let plan = self.pursuit.plan(
                snapshot,
                query::tile_view(world),
                query::player_position(world),
            );
            if let Some(command) = plan {
                debug!("adversary {} plans {command:?}", id.get());
                world::apply(world, command, &mut self.events);
            }
        }
    }

    fn advance_traps(&mut self, world: &mut World) {
        self.trap_counter += 1;
        if self.trap_counter < self.trap_interval {
            return;
        }
        self.trap_counter = 0;

        let first = self.events.len();
        world::apply(world, Command::AdvanceTraps, &mut self.events);
        let moved = self.events[first..]
            .iter()
            .any(|event| matches!(event, Event::TrapMoved { .. }));
        if moved {
            debug!("traps moved on tick {}", query::tick_index(world));
            world::apply(world, Command::ResolveTrapCollisions, &mut self.events);
        }
    }

    fn outcome(&self, status: SessionStatus) -> TickOutcome {
        TickOutcome {
            status,
            render: self.events.iter().any(Event::is_visible_change),
        }
    }

    /// Drives ticks until the session ends.
    ///
    /// `present` is invoked once before the first tick and after every tick
    /// that changed something visible.
    ///
    /// # Errors
    ///
    /// Propagates the first save failure or error returned by `present`.
    pub fn run<I, P, E>(
        &mut self,
        world: &mut World,
        input: &mut I,
        sink: &mut dyn SaveSink,
        mut present: P,
    ) -> Result<SessionStatus, E>
    where
        I: InputSource + ?Sized,
        P: FnMut(&World, SessionStatus) -> Result<(), E>,
        E: From<PersistenceError>,
    {
        present(world, SessionStatus::Running)?;
        loop {
            let outcome = self.tick(world, input.poll(), sink)?;
            if outcome.render || outcome.status.is_terminal() {
                present(world, outcome.status)?;
            }
            if outcome.status.is_terminal() {
                return Ok(outcome.status);
            }
            if !self.tick_interval.is_zero() {
                thread::sleep(self.tick_interval);
            }
        }
    }
}

fn terminal_status(world: &World) -> Option<SessionStatus> {
    if query::is_lost(world) {
        Some(SessionStatus::Lost)
    } else if query::is_won(world) {
        Some(SessionStatus::Won)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn movement_keys_decode_case_insensitively() {
        let mut decoder = IntentDecoder::default();

        assert_eq!(decoder.decode('w'), Some(Intent::Move(Direction::North)));
        assert_eq!(decoder.decode('A'), Some(Intent::Move(Direction::West)));
        assert_eq!(decoder.decode('x'), None);
    }

    #[test]
    fn quit_requires_prefix() {
        let mut decoder = IntentDecoder::default();

        assert_eq!(decoder.decode('q'), None);
        assert_eq!(decoder.decode(COMMAND_PREFIX), None);
        assert_eq!(decoder.decode('Q'), Some(Intent::Quit));
        assert_eq!(decoder.decode('q'), None);
    }

    #[test]
    fn interrupted_prefix_decodes_key_normally() {
        let mut decoder = IntentDecoder::default();

        assert_eq!(decoder.decode(COMMAND_PREFIX), None);
        assert_eq!(decoder.decode('d'), Some(Intent::Move(Direction::East)));
        assert_eq!(decoder.decode('q'), None);
    }

    #[test]
    fn escape_leaves() {
        let mut decoder = IntentDecoder::default();

        assert_eq!(decoder.decode(ESCAPE_KEY), Some(Intent::Leave));
    }

    #[test]
    fn scripted_input_drains_in_order() {
        let mut input = ScriptedInput::new("wd");

        assert_eq!(input.poll(), Some('w'));
        assert_eq!(input.remaining(), 1);
        assert_eq!(input.poll(), Some('d'));
        assert_eq!(input.poll(), None);
    }
}
