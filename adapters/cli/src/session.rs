use std::{io, path::Path};

use anyhow::Result;
use delve_core::{GameConfig, GameState};
use delve_rendering::{Frame, Hud, RenderingBackend, TextBackend};
use delve_system_persistence::{PersistenceError, SaveStore};
use delve_system_scheduler::{GameLoop, SaveSink, SessionStatus};
use delve_world::{query, Connectivity, World};
use log::debug;

use crate::input::StdinInput;

/// Plays an interactive session in the terminal until it ends.
pub(crate) fn play(world: &mut World, config: &GameConfig, mut store: SaveStore) -> Result<SessionStatus> {
    let save_path = store.path().to_path_buf();
    let mut backend = TextBackend::new(io::stdout().lock()).with_clear_screen(true);
    let mut input = StdinInput::spawn();
    let mut game_loop = GameLoop::new(&config.schedule);

    game_loop.run(world, &mut input, &mut store, |world, status| {
        backend.present(&capture(world, &status_message(world, status, Some(&save_path))))
    })
}

/// Applies `inputs` one keystroke per tick, followed by `idle` empty ticks,
/// and returns the final frame.
pub(crate) fn replay(world: &mut World, config: &GameConfig, inputs: &str, idle: u32) -> Result<Frame> {
    let mut game_loop = GameLoop::new(&config.schedule);
    let mut sink = DiscardSave;
    let mut status = SessionStatus::Running;

    let keys = inputs
        .chars()
        .map(Some)
        .chain((0..idle).map(|_| None));
    for key in keys {
        status = game_loop.tick(world, key, &mut sink)?.status;
        if status.is_terminal() {
            break;
        }
    }
    Ok(capture(world, &status_message(world, status, None)))
}

/// Builds the presentation frame for the current world state.
pub(crate) fn capture(world: &World, status: &str) -> Frame {
    let health = query::health(world);
    let objectives = query::objectives(world);
    let hud = Hud {
        player: query::player_position(world),
        collected: objectives.collected,
        target: objectives.target,
        health: health.current,
        max_health: health.max,
        beneath: query::tile_beneath_player(world),
        status: status.to_owned(),
    };
    Frame::capture(query::tile_view(world), hud)
}

fn status_message(world: &World, status: SessionStatus, save_path: Option<&Path>) -> String {
    match status {
        SessionStatus::Running => {
            let mut message = format!(
                "{} Collect {} keys. Move with w/a/s/d, :q saves and quits, Esc leaves.",
                query::welcome_banner(world),
                query::objectives(world).target
            );
            if let Some(notice) = layout_notice(query::connectivity(world)) {
                message.push(' ');
                message.push_str(&notice);
            }
            message
        }
        SessionStatus::Won => String::from("Every key is yours. You win!"),
        SessionStatus::Lost => String::from("You died."),
        SessionStatus::Quit => match save_path {
            Some(path) => format!("Game saved to {}.", path.display()),
            None => String::from("Quit without saving during replay."),
        },
        SessionStatus::Left => String::from("Left without saving."),
    }
}

fn layout_notice(connectivity: &Connectivity) -> Option<String> {
    match connectivity {
        Connectivity::Connected => None,
        Connectivity::Disconnected { unreachable_rooms } => Some(format!(
            "Warning: {} rooms cannot be reached.",
            unreachable_rooms.len()
        )),
    }
}

/// Save sink that drops quit saves during headless replays.
struct DiscardSave;

impl SaveSink for DiscardSave {
    fn save(&mut self, state: &GameState) -> Result<(), PersistenceError> {
        debug!("replay discarded save of session {}", state.seed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replay_is_deterministic() {
        let config = GameConfig::default();
        let mut first = World::new(&config, 77).expect("world generates");
        let mut second = World::new(&config, 77).expect("world generates");

        let first = replay(&mut first, &config, "ddwwsaad", 20).expect("replay runs");
        let second = replay(&mut second, &config, "ddwwsaad", 20).expect("replay runs");

        assert_eq!(first, second);
    }

    #[test]
    fn frame_reports_player_and_status() {
        let config = GameConfig::default();
        let world = World::new(&config, 5).expect("world generates");

        let frame = capture(&world, "hello");

        assert_eq!(frame.hud().player, query::player_position(&world));
        assert_eq!(frame.hud().status, "hello");
        assert_eq!(frame.rows().len(), 50);
    }

    #[test]
    fn disconnected_layout_is_reported() {
        let connectivity = Connectivity::Disconnected {
            unreachable_rooms: vec![2, 5],
        };

        assert_eq!(
            layout_notice(&connectivity).as_deref(),
            Some("Warning: 2 rooms cannot be reached.")
        );
        assert_eq!(layout_notice(&Connectivity::Connected), None);
    }

    #[test]
    fn running_status_carries_layout_notice() {
        let config = GameConfig::default();
        let world = World::new(&config, 5).expect("world generates");

        let message = status_message(&world, SessionStatus::Running, None);

        assert_eq!(
            message.contains("cannot be reached"),
            !query::connectivity(&world).is_connected()
        );
    }

    #[test]
    fn quit_during_replay_does_not_write_files() {
        let config = GameConfig::default();
        let mut world = World::new(&config, 5).expect("world generates");

        let frame = replay(&mut world, &config, ":q", 0).expect("replay runs");

        assert_eq!(frame.hud().status, "Quit without saving during replay.");
    }
}
