#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Delve.
//!
//! The world owns the single tile grid of a session together with the
//! player, health, objectives, adversaries and traps that live on it. All
//! mutation flows through [`apply`]; read access goes through [`query`].

use delve_core::{
    stream_rng, Command, ConfigError, Direction, EntityConfig, Event, GameConfig, GameState,
    Position, Room, Tile, TileGrid, LAYOUT_STREAM, SESSION_STREAM, WELCOME_BANNER,
};
use delve_system_generation::generate;
use log::{debug, info, warn};

pub use delve_system_generation::Connectivity;
use rand_chacha::ChaCha8Rng;

mod adversaries;
mod health;
mod objectives;
mod player;
mod traps;

use adversaries::{random_cell, AdversaryRoster};
use health::HealthManager;
use objectives::ObjectiveTracker;
use player::Player;
use traps::{TrapRoster, TrapRules};

/// Represents the authoritative Delve world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    seed: u64,
    config: EntityConfig,
    grid: TileGrid,
    rooms: Vec<Room>,
    connectivity: Connectivity,
    player: Player,
    health: HealthManager,
    objectives: ObjectiveTracker,
    adversaries: AdversaryRoster,
    traps: TrapRoster,
    rng: ChaCha8Rng,
    tick_index: u64,
}

impl World {
    /// Generates a fresh session from `seed`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the configuration is invalid or the
    /// generated layout cannot host the requested objectives or the player.
    pub fn new(config: &GameConfig, seed: u64) -> Result<Self, ConfigError> {
        let layout = generate(config, &mut stream_rng(seed, LAYOUT_STREAM))?;
        let connectivity = layout.connectivity().clone();
        let (mut grid, rooms) = layout.into_parts();
        let mut rng = stream_rng(seed, SESSION_STREAM);

        let mut objectives = ObjectiveTracker::new(config.entities.objective_count);
        objectives.generate(&rooms, &mut rng)?;
        let marked = objectives.remaining_positions();
        for cell in &marked {
            let _ = grid.set(*cell, Tile::Objective);
        }

        let player = Player::place(&mut grid).ok_or(ConfigError::NoPlayerStart)?;
        let mut world = Self::assemble(config, seed, grid, rooms, connectivity, player, objectives, rng);
        let mut events = Vec::new();

        let trap_rooms: Vec<Room> = world
            .rooms
            .iter()
            .filter(|room| !marked.contains(&room.center()))
            .copied()
            .collect();
        let planned = world.traps.plan(&world.grid, &trap_rooms, &mut world.rng);
        for (cell, kind) in planned {
            apply(&mut world, Command::PlaceTrap { cell, kind }, &mut events);
        }
        info!(
            "placed {} traps across {} rooms without objectives",
            world.traps.positions().len(),
            trap_rooms.len()
        );

        let requested = config.entities.adversary_count;
        world.populate(requested, config.entities.adversary_spawn_attempts, &mut events);
        let spawned = world.adversaries.positions().len();
        if spawned < usize::try_from(requested).unwrap_or(usize::MAX) {
            warn!("spawned {spawned} of {requested} adversaries");
        } else {
            info!("spawned {spawned} adversaries");
        }

        Ok(world)
    }

    /// Rebuilds a session from a saved overlay.
    ///
    /// The layout is regenerated from the saved seed and traps receive
    /// freshly randomised kinds. Traps on cells a trap could not enter and
    /// adversaries off free floor are dropped. A remembered standing tile
    /// that is not floor is replaced by the floor of the player's cell.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the configuration is invalid or the saved
    /// player position is not a floor cell of the layout.
    pub fn restore(config: &GameConfig, state: &GameState) -> Result<Self, ConfigError> {
        let layout = generate(config, &mut stream_rng(state.seed, LAYOUT_STREAM))?;
        let connectivity = layout.connectivity().clone();
        let (mut grid, rooms) = layout.into_parts();
        let rng = stream_rng(state.seed, SESSION_STREAM);

        let floor = grid
            .get(state.player)
            .filter(|tile| tile.is_floor())
            .ok_or(ConfigError::NoPlayerStart)?;
        let beneath = if state.previous_tile.is_floor() {
            state.previous_tile
        } else {
            warn!(
                "saved standing tile {:?} is not floor; using {:?}",
                state.previous_tile, floor
            );
            floor
        };
        let _ = grid.set(state.player, Tile::Avatar);
        let player = Player::new(state.player, beneath);

        let mut objectives = ObjectiveTracker::new(config.entities.objective_count);
        objectives.restore(&state.objectives, state.objectives_collected);
        for cell in objectives.remaining_positions() {
            if cell != state.player {
                let _ = grid.set(cell, Tile::Objective);
            }
        }

        let mut world =
            Self::assemble(config, state.seed, grid, rooms, connectivity, player, objectives, rng);
        let traps = world.traps.restore(
            &mut world.grid,
            &state.traps,
            &world.player,
            &mut world.rng,
        );

        let mut discarded = Vec::new();
        world
            .health
            .restore(state.health, state.max_health, &mut discarded);

        let adversaries =
            world
                .adversaries
                .restore(&mut world.grid, &state.adversaries, world.player.position());
        info!(
            "restored session {} with {} of {} traps and {} of {} adversaries",
            state.seed,
            traps,
            state.traps.len(),
            adversaries,
            state.adversaries.len()
        );

        Ok(world)
    }

    #[allow(clippy::too_many_arguments)]
    fn assemble(
        config: &GameConfig,
        seed: u64,
        grid: TileGrid,
        rooms: Vec<Room>,
        connectivity: Connectivity,
        player: Player,
        objectives: ObjectiveTracker,
        rng: ChaCha8Rng,
    ) -> Self {
        let entities = config.entities.clone();
        Self {
            banner: WELCOME_BANNER,
            seed,
            grid,
            rooms,
            connectivity,
            player,
            health: HealthManager::new(entities.max_health),
            objectives,
            adversaries: AdversaryRoster::new(entities.adversary_cadence),
            traps: TrapRoster::new(TrapRules::from(&entities)),
            rng,
            tick_index: 0,
            config: entities,
        }
    }

    /// Spawns up to `count` adversaries, giving each `attempts` random cells.
    fn populate(&mut self, count: u32, attempts: u32, out_events: &mut Vec<Event>) {
        let player = self.player.position();
        for _ in 0..count {
            let cell = (0..attempts)
                .map(|_| random_cell(&self.grid, &mut self.rng))
                .find(|cell| self.adversaries.can_spawn(&self.grid, *cell, player));
            if let Some(cell) = cell {
                apply(self, Command::SpawnAdversary { cell }, out_events);
            }
        }
    }

    /// Floor kind of the region containing `cell`.
    fn region_floor(&self, cell: Position) -> Tile {
        if self.rooms.iter().any(|room| room.contains(cell)) {
            Tile::RoomFloor
        } else {
            Tile::HallwayFloor
        }
    }

    fn move_player(&mut self, direction: Direction, out_events: &mut Vec<Event>) {
        if self.health.is_dead() {
            return;
        }

        let to = self.player.position().step(direction);
        let Some(destination) = self
            .grid
            .get(to)
            .filter(|tile| tile.is_player_walkable())
        else {
            out_events.push(Event::PlayerBlocked { direction });
            return;
        };

        let beneath = if destination.is_trap() {
            self.region_floor(to)
        } else {
            destination
        };
        let left_behind = self.player.beneath();
        let from = self.player.relocate(&mut self.grid, to, beneath);
        let _ = self.traps.reveal_at(&mut self.grid, from, left_behind);
        self.traps.conceal_at(to);
        out_events.push(Event::PlayerMoved { from, to });

        if self.objectives.check_collection(to) {
            let floor = self.region_floor(to);
            self.player.set_beneath(floor);
            out_events.push(Event::ObjectiveCollected {
                cell: to,
                collected: self.objectives.collected(),
                target: self.objectives.target(),
            });
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::MovePlayer { direction } => world.move_player(direction, out_events),
        Command::ResolveTrapCollisions => world.traps.resolve_collisions(
            &world.player,
            &mut world.health,
            &mut world.grid,
            out_events,
        ),
        Command::Tick => {
            world.tick_index = world.tick_index.saturating_add(1);
            world.adversaries.tick();
            out_events.push(Event::TimeAdvanced {
                tick: world.tick_index,
            });
        }
        Command::StepAdversary { adversary, to } => {
            if to == world.player.position() {
                return;
            }
            if let Some(from) = world.adversaries.step(&mut world.grid, adversary, to) {
                out_events.push(Event::AdversaryAdvanced {
                    adversary,
                    from,
                    to,
                });
            }
        }
        Command::StrikePlayer { adversary } => {
            let Some(cell) =
                world
                    .adversaries
                    .strike(&mut world.grid, adversary, world.player.position())
            else {
                return;
            };
            out_events.push(Event::AdversaryStruck { adversary, cell });
            let damage = world.config.adversary_damage;
            if world.health.take_damage(damage, out_events) {
                debug!("adversary {} delivered the killing blow", adversary.get());
            }
        }
        Command::AdvanceTraps => {
            let _ = world.traps.advance(
                &mut world.grid,
                &world.player,
                &mut world.rng,
                out_events,
            );
        }
        Command::SpawnAdversary { cell } => {
            if let Some(adversary) =
                world
                    .adversaries
                    .spawn(&mut world.grid, cell, world.player.position())
            {
                out_events.push(Event::AdversarySpawned { adversary, cell });
            }
        }
        Command::PlaceTrap { cell, kind } => {
            if let Some(trap) = world.traps.place(&mut world.grid, cell, kind) {
                out_events.push(Event::TrapPlaced { trap, cell, kind });
            }
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use delve_core::{
        AdversaryId, AdversaryView, GameState, Position, Room, Tile, TileView, TrapSnapshot,
    };

    use super::{Connectivity, World};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Seed the session layout was generated from.
    #[must_use]
    pub fn seed(world: &World) -> u64 {
        world.seed
    }

    /// Number of ticks applied since the world was created.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Captures a read-only view of the tile grid.
    #[must_use]
    pub fn tile_view(world: &World) -> TileView<'_> {
        world.grid.view()
    }

    /// Rooms produced by the layout generator.
    #[must_use]
    pub fn rooms(world: &World) -> &[Room] {
        &world.rooms
    }

    /// Reachability verdict of the generated layout.
    #[must_use]
    pub fn connectivity(world: &World) -> &Connectivity {
        &world.connectivity
    }

    /// Cell currently occupied by the player.
    #[must_use]
    pub fn player_position(world: &World) -> Position {
        world.player.position()
    }

    /// Tile remembered beneath the player.
    #[must_use]
    pub fn tile_beneath_player(world: &World) -> Tile {
        world.player.beneath()
    }

    /// Current and maximum health of the player.
    #[must_use]
    pub fn health(world: &World) -> HealthStatus {
        HealthStatus {
            current: world.health.current(),
            max: world.health.max(),
            dead: world.health.is_dead(),
        }
    }

    /// Objective collection progress.
    #[must_use]
    pub fn objectives(world: &World) -> ObjectiveProgress {
        ObjectiveProgress {
            collected: world.objectives.collected(),
            target: world.objectives.target(),
            remaining: world.objectives.remaining_positions(),
        }
    }

    /// Reports whether every objective has been collected.
    #[must_use]
    pub fn is_won(world: &World) -> bool {
        world.objectives.is_complete()
    }

    /// Reports whether the player has died.
    #[must_use]
    pub fn is_lost(world: &World) -> bool {
        world.health.is_dead()
    }

    /// Captures a read-only view of the live adversaries.
    #[must_use]
    pub fn adversary_view(world: &World) -> AdversaryView {
        AdversaryView::from_snapshots(world.adversaries.snapshots())
    }

    /// Identifiers of adversaries whose turn is due.
    #[must_use]
    pub fn ready_adversaries(world: &World) -> Vec<AdversaryId> {
        adversary_view(world)
            .iter()
            .filter(|snapshot| snapshot.ready)
            .map(|snapshot| snapshot.id)
            .collect()
    }

    /// Snapshots of every active trap in identifier order.
    #[must_use]
    pub fn traps(world: &World) -> Vec<TrapSnapshot> {
        world.traps.snapshots()
    }

    /// Captures the dynamic overlay required to rebuild the session.
    #[must_use]
    pub fn game_state(world: &World) -> GameState {
        GameState {
            seed: world.seed,
            player: world.player.position(),
            previous_tile: world.player.beneath(),
            objectives_collected: world.objectives.collected(),
            objectives: world.objectives.remaining_positions(),
            traps: world.traps.positions(),
            health: world.health.current(),
            max_health: world.health.max(),
            adversaries: world.adversaries.positions(),
        }
    }

    /// Player health as reported to presentation layers.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct HealthStatus {
        /// Current health.
        pub current: u32,
        /// Maximum health.
        pub max: u32,
        /// Indicates whether the player has died.
        pub dead: bool,
    }

    /// Objective collection progress.
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct ObjectiveProgress {
        /// Markers collected so far.
        pub collected: u32,
        /// Markers required to win.
        pub target: u32,
        /// Cells of the uncollected markers.
        pub remaining: Vec<Position>,
    }
}
