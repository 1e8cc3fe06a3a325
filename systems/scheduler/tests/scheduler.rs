use delve_core::{Command, Event, GameConfig, GameState, Position, Tile};
use delve_system_persistence::PersistenceError;
use delve_system_scheduler::{
    GameLoop, SaveSink, ScriptedInput, SessionStatus, COMMAND_PREFIX, ESCAPE_KEY,
};
use delve_world::{self as world, query, World};

#[derive(Default)]
struct RecordingSink {
    saved: Vec<GameState>,
}

impl SaveSink for RecordingSink {
    fn save(&mut self, state: &GameState) -> Result<(), PersistenceError> {
        self.saved.push(state.clone());
        Ok(())
    }
}

fn calm_config() -> GameConfig {
    let mut config = GameConfig::default();
    config.entities.adversary_count = 0;
    config.entities.traps_per_room = 0;
    config.schedule.tick_interval_ms = 0;
    config
}

fn floor_neighbor(world: &World) -> Position {
    let player = query::player_position(world);
    player
        .cardinal_neighbors()
        .into_iter()
        .find(|cell| query::tile_view(world).get(*cell).is_some_and(Tile::is_floor))
        .expect("player has a floor neighbour")
}

fn replay(seed: u64, script: &str) -> (GameState, Vec<Vec<Event>>, SessionStatus) {
    let config = GameConfig::default();
    let mut world = World::new(&config, seed).expect("world generates");
    let mut game_loop = GameLoop::new(&config.schedule);
    let mut sink = RecordingSink::default();
    let mut trace = Vec::new();
    let mut status = SessionStatus::Running;

    for key in script.chars().map(Some).chain(std::iter::repeat(None).take(40)) {
        let outcome = game_loop
            .tick(&mut world, key, &mut sink)
            .expect("recording sink never fails");
        trace.push(game_loop.last_events().to_vec());
        status = outcome.status;
        if status.is_terminal() {
            break;
        }
    }
    (query::game_state(&world), trace, status)
}

#[test]
fn replaying_same_script_is_deterministic() {
    let script = "ddddwwwwaassdddwwwssaaddwd";

    let first = replay(99, script);
    let second = replay(99, script);

    assert_eq!(first, second);
}

#[test]
fn quit_sequence_saves_current_state() {
    let config = calm_config();
    let mut world = World::new(&config, 5).expect("world generates");
    let mut game_loop = GameLoop::new(&config.schedule);
    let mut sink = RecordingSink::default();

    let armed = game_loop
        .tick(&mut world, Some(COMMAND_PREFIX), &mut sink)
        .expect("tick succeeds");
    assert_eq!(armed.status, SessionStatus::Running);
    let quit = game_loop
        .tick(&mut world, Some('q'), &mut sink)
        .expect("tick succeeds");

    assert_eq!(quit.status, SessionStatus::Quit);
    assert_eq!(sink.saved, vec![query::game_state(&world)]);
}

#[test]
fn escape_leaves_without_saving() {
    let config = calm_config();
    let mut world = World::new(&config, 5).expect("world generates");
    let mut game_loop = GameLoop::new(&config.schedule);
    let mut sink = RecordingSink::default();

    let outcome = game_loop
        .tick(&mut world, Some(ESCAPE_KEY), &mut sink)
        .expect("tick succeeds");

    assert_eq!(outcome.status, SessionStatus::Left);
    assert!(sink.saved.is_empty());
}

#[test]
fn adjacent_adversary_strikes_on_its_cadence() {
    let config = calm_config();
    let mut world = World::new(&config, 21).expect("world generates");
    let cell = floor_neighbor(&world);
    let floor = query::tile_view(&world).get(cell);
    let mut events = Vec::new();
    world::apply(&mut world, Command::SpawnAdversary { cell }, &mut events);
    let mut game_loop = GameLoop::new(&config.schedule);
    let mut sink = RecordingSink::default();

    for _ in 1..config.entities.adversary_cadence {
        let outcome = game_loop
            .tick(&mut world, None, &mut sink)
            .expect("tick succeeds");
        assert_eq!(outcome.status, SessionStatus::Running);
    }
    assert_eq!(query::health(&world).current, 5);

    let outcome = game_loop
        .tick(&mut world, None, &mut sink)
        .expect("tick succeeds");

    assert!(outcome.render);
    assert_eq!(query::health(&world).current, 4);
    assert!(query::adversary_view(&world).is_empty());
    assert_eq!(query::tile_view(&world).get(cell), floor);
}

#[test]
fn collecting_last_objective_wins() {
    let config = calm_config();
    let fresh = World::new(&config, 27).expect("world generates");
    let player = query::player_position(&fresh);
    let cell = floor_neighbor(&fresh);
    let mut state = query::game_state(&fresh);
    state.objectives = vec![cell];
    state.objectives_collected = config.entities.objective_count - 1;
    let mut world = World::restore(&config, &state).expect("state restores");
    let key = ['d', 'a', 'w', 's']
        .into_iter()
        .find(|key| {
            delve_core::Direction::from_intent(*key)
                .is_some_and(|direction| player.step(direction) == cell)
        })
        .expect("neighbour is one step away");
    let mut game_loop = GameLoop::new(&config.schedule);
    let mut sink = RecordingSink::default();

    let outcome = game_loop
        .tick(&mut world, Some(key), &mut sink)
        .expect("tick succeeds");

    assert_eq!(outcome.status, SessionStatus::Won);
    assert!(outcome.render);
    assert!(game_loop
        .last_events()
        .iter()
        .any(|event| matches!(event, Event::ObjectiveCollected { .. })));
}

#[test]
fn run_stops_when_player_leaves() {
    let config = calm_config();
    let mut world = World::new(&config, 3).expect("world generates");
    let mut game_loop = GameLoop::new(&config.schedule);
    let mut sink = RecordingSink::default();
    let mut input = ScriptedInput::new(&format!("dw{ESCAPE_KEY}"));
    let mut frames = Vec::new();

    let status = game_loop
        .run(&mut world, &mut input, &mut sink, |world, status| {
            frames.push((query::player_position(world), status));
            Ok::<(), PersistenceError>(())
        })
        .expect("session runs");

    assert_eq!(status, SessionStatus::Left);
    assert_eq!(input.remaining(), 0);
    assert_eq!(frames.first().map(|frame| frame.1), Some(SessionStatus::Running));
    assert_eq!(frames.last().map(|frame| frame.1), Some(SessionStatus::Left));
    assert!(sink.saved.is_empty());
}
