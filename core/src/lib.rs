#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Delve dungeon engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. The scheduler submits [`Command`]
//! values describing desired mutations, the world executes those commands via
//! its `apply` entry point, and then broadcasts [`Event`] values that systems
//! and presentation layers react to. Systems read the grid exclusively through
//! [`TileView`] snapshots and respond with new commands.

use std::fmt;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

mod config;

pub use config::{
    EntityConfig, GameConfig, GenerationConfig, ScheduleConfig, TrapWeights, MAX_GRID_EXTENT,
};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Delve.";

/// Label of the random stream consumed by the world generator.
pub const LAYOUT_STREAM: &str = "layout";

/// Label of the random stream consumed by entity placement and behaviour.
pub const SESSION_STREAM: &str = "session";

/// Location of a single grid cell expressed as signed column and row values.
///
/// Rows grow upward: [`Direction::North`] increases `y`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    x: i32,
    y: i32,
}

impl Position {
    /// Creates a new grid position.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Zero-based column of the position.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Zero-based row of the position.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Computes the Manhattan distance between two positions.
    #[must_use]
    pub fn manhattan_distance(self, other: Position) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Returns the neighbouring position one step in `direction`.
    #[must_use]
    pub const fn step(self, direction: Direction) -> Self {
        match direction {
            Direction::North => Self::new(self.x, self.y.saturating_add(1)),
            Direction::East => Self::new(self.x.saturating_add(1), self.y),
            Direction::South => Self::new(self.x, self.y.saturating_sub(1)),
            Direction::West => Self::new(self.x.saturating_sub(1), self.y),
        }
    }

    /// Cardinal neighbours in expansion order: east, west, north, south.
    #[must_use]
    pub const fn cardinal_neighbors(self) -> [Position; 4] {
        [
            self.step(Direction::East),
            self.step(Direction::West),
            self.step(Direction::North),
            self.step(Direction::South),
        ]
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Cardinal movement directions available to every entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward increasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward decreasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

impl Direction {
    /// Every direction in a fixed order.
    pub const ALL: [Direction; 4] = [
        Direction::East,
        Direction::North,
        Direction::West,
        Direction::South,
    ];

    /// Returns the opposite direction.
    #[must_use]
    pub const fn reversed(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::East => Self::West,
            Self::South => Self::North,
            Self::West => Self::East,
        }
    }

    /// Maps a movement letter (`w`, `a`, `s`, `d`) to a direction.
    #[must_use]
    pub fn from_intent(key: char) -> Option<Self> {
        match key.to_ascii_lowercase() {
            'w' => Some(Self::North),
            'a' => Some(Self::West),
            's' => Some(Self::South),
            'd' => Some(Self::East),
            _ => None,
        }
    }
}

/// Behavioural variants of the hazards scattered through rooms.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrapKind {
    /// Stationary pickup that restores health once.
    HealthPotion,
    /// Stationary explosive that damages the player once.
    Bomb,
    /// Projectile that travels along a heading and bounces off obstructions.
    Arrow {
        /// Direction the arrow currently travels.
        heading: Direction,
    },
    /// Flame that wanders in random directions.
    Fire,
}

impl TrapKind {
    /// Reports whether the trap advances on its own cadence.
    #[must_use]
    pub const fn is_mobile(self) -> bool {
        matches!(self, Self::Arrow { .. } | Self::Fire)
    }

    /// Reports whether the trap disappears after one triggering interaction.
    #[must_use]
    pub const fn is_single_use(self) -> bool {
        matches!(self, Self::HealthPotion | Self::Bomb)
    }

    /// Human-readable description shared with the tile classification.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::HealthPotion => "health potion",
            Self::Bomb => "bomb",
            Self::Arrow { .. } => "arrow trap",
            Self::Fire => "fire",
        }
    }

    /// Glyph used when the trap is presented.
    #[must_use]
    pub const fn glyph(self) -> char {
        match self {
            Self::HealthPotion => '♥',
            Self::Bomb => '●',
            Self::Arrow { heading } => match heading {
                Direction::North => '↑',
                Direction::East => '→',
                Direction::South => '↓',
                Direction::West => '←',
            },
            Self::Fire => 'Ψ',
        }
    }
}

/// Categorised grid cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tile {
    /// Unused space outside rooms and corridors.
    #[default]
    Nothing,
    /// Floor carved inside a room.
    RoomFloor,
    /// Floor carved by a connecting corridor.
    HallwayFloor,
    /// Blocking wall.
    Wall,
    /// Locked marker holding an uncollected objective.
    Objective,
    /// Cell currently occupied by the player.
    Avatar,
    /// Cell currently occupied by an adversary.
    Adversary,
    /// Cell currently occupied by a visible trap.
    Trap(TrapKind),
}

impl Tile {
    const DESCRIBED: [Tile; 7] = [
        Tile::Nothing,
        Tile::RoomFloor,
        Tile::HallwayFloor,
        Tile::Wall,
        Tile::Objective,
        Tile::Avatar,
        Tile::Adversary,
    ];

    /// Human-readable description used by presentation and the save format.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Nothing => "nothing",
            Self::RoomFloor => "room floor",
            Self::HallwayFloor => "hallway floor",
            Self::Wall => "wall",
            Self::Objective => "locked door",
            Self::Avatar => "player",
            Self::Adversary => "adversary",
            Self::Trap(kind) => kind.description(),
        }
    }

    /// Resolves a tile from its [`Tile::description`].
    ///
    /// Arrow traps resolve with an eastward heading since the heading is not
    /// part of the description.
    #[must_use]
    pub fn from_description(description: &str) -> Option<Self> {
        let trimmed = description.trim();
        if let Some(tile) = Self::DESCRIBED
            .into_iter()
            .find(|tile| tile.description() == trimmed)
        {
            return Some(tile);
        }

        [
            TrapKind::HealthPotion,
            TrapKind::Bomb,
            TrapKind::Arrow {
                heading: Direction::East,
            },
            TrapKind::Fire,
        ]
        .into_iter()
        .find(|kind| kind.description() == trimmed)
        .map(Self::Trap)
    }

    /// Glyph used by text presentation.
    #[must_use]
    pub const fn glyph(self) -> char {
        match self {
            Self::Nothing => ' ',
            Self::RoomFloor => '.',
            Self::HallwayFloor => ',',
            Self::Wall => '#',
            Self::Objective => '+',
            Self::Avatar => '@',
            Self::Adversary => 'X',
            Self::Trap(kind) => kind.glyph(),
        }
    }

    /// Room or hallway floor.
    #[must_use]
    pub const fn is_floor(self) -> bool {
        matches!(self, Self::RoomFloor | Self::HallwayFloor)
    }

    /// Any visible trap.
    #[must_use]
    pub const fn is_trap(self) -> bool {
        matches!(self, Self::Trap(_))
    }

    /// Cells the player may step onto.
    #[must_use]
    pub const fn is_player_walkable(self) -> bool {
        self.is_floor() || self.is_trap() || matches!(self, Self::Objective)
    }

    /// Cells the pathfinder may expand through.
    ///
    /// The avatar counts as passable so searches can terminate on the
    /// player's cell.
    #[must_use]
    pub const fn is_search_passable(self) -> bool {
        self.is_floor() || matches!(self, Self::Avatar)
    }

    /// Cells a mobile trap may move into.
    #[must_use]
    pub const fn is_trap_enterable(self) -> bool {
        self.is_floor() || self.is_trap() || matches!(self, Self::Objective | Self::Avatar)
    }
}

/// Rectangular room carved during generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Room {
    x: i32,
    y: i32,
    width: i32,
    height: i32,
    objective: Option<Position>,
}

impl Room {
    /// Creates a room anchored at its lower-left cell.
    #[must_use]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            objective: None,
        }
    }

    /// Leftmost interior column.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Lowest interior row.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Width of the interior in cells.
    #[must_use]
    pub const fn width(&self) -> i32 {
        self.width
    }

    /// Height of the interior in cells.
    #[must_use]
    pub const fn height(&self) -> i32 {
        self.height
    }

    /// Center cell used for objectives and forced links.
    #[must_use]
    pub const fn center(&self) -> Position {
        Position::new(self.x + self.width / 2, self.y + self.height / 2)
    }

    /// Reports whether the interior contains `position`.
    #[must_use]
    pub const fn contains(&self, position: Position) -> bool {
        position.x >= self.x
            && position.x < self.x + self.width
            && position.y >= self.y
            && position.y < self.y + self.height
    }

    /// Overlap test that keeps `margin` free cells between rooms on every side.
    #[must_use]
    pub const fn overlaps(&self, other: &Room, margin: i32) -> bool {
        if self.x - margin >= other.x + other.width + margin {
            return false;
        }
        if self.x + self.width + margin <= other.x - margin {
            return false;
        }
        if self.y - margin >= other.y + other.height + margin {
            return false;
        }
        if self.y + self.height + margin <= other.y - margin {
            return false;
        }
        true
    }

    /// Iterates over every interior cell, row by row.
    pub fn cells(&self) -> impl Iterator<Item = Position> {
        let Self {
            x,
            y,
            width,
            height,
            ..
        } = *self;
        (y..y + height).flat_map(move |row| (x..x + width).map(move |column| Position::new(column, row)))
    }

    /// Iterates over the one-cell ring surrounding the interior, corners included.
    pub fn perimeter(&self) -> impl Iterator<Item = Position> {
        let room = *self;
        (room.y - 1..=room.y + room.height)
            .flat_map(move |row| {
                (room.x - 1..=room.x + room.width).map(move |column| Position::new(column, row))
            })
            .filter(move |cell| !room.contains(*cell))
    }

    /// Midpoints just outside each side: top, bottom, left, right.
    #[must_use]
    pub const fn side_entrances(&self) -> [Position; 4] {
        let middle_column = self.x + self.width / 2;
        let middle_row = self.y + self.height / 2;
        [
            Position::new(middle_column, self.y + self.height),
            Position::new(middle_column, self.y - 1),
            Position::new(self.x - 1, middle_row),
            Position::new(self.x + self.width, middle_row),
        ]
    }

    /// Places an objective marker at the room center.
    pub fn place_objective(&mut self) {
        self.objective = Some(self.center());
    }

    /// Removes the objective marker, reporting whether one was present.
    pub fn remove_objective(&mut self) -> bool {
        self.objective.take().is_some()
    }

    /// Position of the uncollected objective, if any.
    #[must_use]
    pub const fn objective(&self) -> Option<Position> {
        self.objective
    }

    /// Reports whether the room still holds an objective.
    #[must_use]
    pub const fn has_objective(&self) -> bool {
        self.objective.is_some()
    }

    /// Reports whether an uncollected objective sits at `position`.
    #[must_use]
    pub fn has_objective_at(&self, position: Position) -> bool {
        self.objective == Some(position)
    }
}

/// Fixed-size row-major tile arena.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileGrid {
    columns: u32,
    rows: u32,
    tiles: Vec<Tile>,
}

impl TileGrid {
    /// Creates a grid filled with [`Tile::Nothing`].
    ///
    /// Extents beyond [`MAX_GRID_EXTENT`] are clamped to it.
    #[must_use]
    pub fn new(columns: u32, rows: u32) -> Self {
        let columns = columns.min(MAX_GRID_EXTENT);
        let rows = rows.min(MAX_GRID_EXTENT);
        let capacity = usize::try_from(columns * rows).unwrap_or(usize::MAX);
        Self {
            columns,
            rows,
            tiles: vec![Tile::Nothing; capacity],
        }
    }

    /// Number of columns contained in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows contained in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Reports whether the position lies inside the grid.
    #[must_use]
    pub fn contains(&self, position: Position) -> bool {
        index(self.columns, self.rows, position).is_some()
    }

    /// Retrieves the tile at `position`, or `None` outside the grid.
    #[must_use]
    pub fn get(&self, position: Position) -> Option<Tile> {
        index(self.columns, self.rows, position).and_then(|offset| self.tiles.get(offset).copied())
    }

    /// Replaces the tile at `position`. Out-of-bounds writes are ignored.
    pub fn set(&mut self, position: Position, tile: Tile) -> bool {
        let Some(offset) = index(self.columns, self.rows, position) else {
            return false;
        };
        match self.tiles.get_mut(offset) {
            Some(slot) => {
                *slot = tile;
                true
            }
            None => false,
        }
    }

    /// Captures a read-only view of the grid.
    #[must_use]
    pub fn view(&self) -> TileView<'_> {
        TileView {
            tiles: &self.tiles,
            columns: self.columns,
            rows: self.rows,
        }
    }
}

/// Read-only view into the tile arena.
#[derive(Clone, Copy, Debug)]
pub struct TileView<'a> {
    tiles: &'a [Tile],
    columns: u32,
    rows: u32,
}

impl<'a> TileView<'a> {
    /// Retrieves the tile at `position`, or `None` outside the grid.
    #[must_use]
    pub fn get(&self, position: Position) -> Option<Tile> {
        index(self.columns, self.rows, position).and_then(|offset| self.tiles.get(offset).copied())
    }

    /// Reports whether the position lies inside the grid.
    #[must_use]
    pub fn contains(&self, position: Position) -> bool {
        index(self.columns, self.rows, position).is_some()
    }

    /// Provides the dimensions of the underlying grid.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    /// Iterates over every cell with its tile, row by row from `y = 0`.
    pub fn cells(&self) -> impl Iterator<Item = (Position, Tile)> + 'a {
        let columns = self.columns.max(1);
        self.tiles.iter().enumerate().map(move |(offset, tile)| {
            let offset = u32::try_from(offset).unwrap_or(u32::MAX);
            let x = i32::try_from(offset % columns).unwrap_or(i32::MAX);
            let y = i32::try_from(offset / columns).unwrap_or(i32::MAX);
            (Position::new(x, y), *tile)
        })
    }
}

fn index(columns: u32, rows: u32, position: Position) -> Option<usize> {
    let x = u32::try_from(position.x()).ok()?;
    let y = u32::try_from(position.y()).ok()?;
    if x >= columns || y >= rows {
        return None;
    }
    let width = usize::try_from(columns).ok()?;
    let row = usize::try_from(y).ok()?;
    let column = usize::try_from(x).ok()?;
    row.checked_mul(width)?.checked_add(column)
}

/// Unique identifier assigned to an adversary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AdversaryId(u32);

impl AdversaryId {
    /// Creates a new adversary identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a trap.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TrapId(u32);

impl TrapId {
    /// Creates a new trap identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Decoded player intent consumed by the scheduler.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Intent {
    /// Move the player one cell.
    Move(Direction),
    /// Save the session and terminate.
    Quit,
    /// Terminate without saving.
    Leave,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Attempts to move the player one cell.
    MovePlayer {
        /// Direction of travel.
        direction: Direction,
    },
    /// Applies trap effects to the player and removes spent traps.
    ResolveTrapCollisions,
    /// Advances the world clock and every adversary's turn counter.
    Tick,
    /// Requests that an adversary advance onto a neighbouring cell.
    StepAdversary {
        /// Adversary attempting to move.
        adversary: AdversaryId,
        /// Destination cell.
        to: Position,
    },
    /// Requests that an adversary strike the adjacent player.
    StrikePlayer {
        /// Adversary delivering the strike.
        adversary: AdversaryId,
    },
    /// Advances every active mobile trap by one trap update.
    AdvanceTraps,
    /// Requests a new adversary at the provided cell.
    SpawnAdversary {
        /// Cell the adversary should occupy.
        cell: Position,
    },
    /// Requests a new trap at the provided cell.
    PlaceTrap {
        /// Cell the trap should occupy.
        cell: Position,
        /// Behaviour of the trap.
        kind: TrapKind,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Indicates that the world clock advanced.
    TimeAdvanced {
        /// Number of ticks elapsed since the world was created.
        tick: u64,
    },
    /// Confirms that the player moved between two cells.
    PlayerMoved {
        /// Cell the player left.
        from: Position,
        /// Cell the player entered.
        to: Position,
    },
    /// Reports that a movement request hit an obstruction or the grid edge.
    PlayerBlocked {
        /// Requested direction.
        direction: Direction,
    },
    /// Confirms that an objective marker was collected.
    ObjectiveCollected {
        /// Cell that held the marker.
        cell: Position,
        /// Number of markers collected so far.
        collected: u32,
        /// Number of markers required to win.
        target: u32,
    },
    /// Broadcast on every change to the player's health.
    HealthChanged {
        /// Health after the change.
        current: u32,
        /// Maximum health.
        max: u32,
    },
    /// Announces that the player's health reached zero.
    PlayerDied,
    /// Confirms that an adversary entered the world.
    AdversarySpawned {
        /// Identifier allocated to the adversary.
        adversary: AdversaryId,
        /// Cell the adversary occupies.
        cell: Position,
    },
    /// Confirms that an adversary moved between two cells.
    AdversaryAdvanced {
        /// Adversary that moved.
        adversary: AdversaryId,
        /// Cell it left.
        from: Position,
        /// Cell it entered.
        to: Position,
    },
    /// Confirms that an adversary struck the player and was consumed.
    AdversaryStruck {
        /// Adversary that struck.
        adversary: AdversaryId,
        /// Cell the adversary vacated.
        cell: Position,
    },
    /// Confirms that a trap was placed.
    TrapPlaced {
        /// Identifier allocated to the trap.
        trap: TrapId,
        /// Cell the trap occupies.
        cell: Position,
        /// Behaviour of the trap.
        kind: TrapKind,
    },
    /// Confirms that a mobile trap moved.
    TrapMoved {
        /// Trap that moved.
        trap: TrapId,
        /// Cell it left.
        from: Position,
        /// Cell it entered.
        to: Position,
    },
    /// Reports that a trap affected the player.
    TrapTriggered {
        /// Trap that fired.
        trap: TrapId,
        /// Cell shared by the trap and the player.
        cell: Position,
        /// Signed health effect: negative damages, positive heals.
        effect: i32,
    },
    /// Confirms that a spent trap left the world.
    TrapRemoved {
        /// Trap that was removed.
        trap: TrapId,
        /// Cell it occupied.
        cell: Position,
    },
}

impl Event {
    /// Reports whether the event describes a visible change to the world.
    #[must_use]
    pub const fn is_visible_change(&self) -> bool {
        !matches!(self, Self::TimeAdvanced { .. } | Self::PlayerBlocked { .. })
    }
}

/// Immutable representation of a single adversary used for queries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdversarySnapshot {
    /// Unique identifier assigned to the adversary.
    pub id: AdversaryId,
    /// Cell currently occupied by the adversary.
    pub cell: Position,
    /// Indicates whether the adversary may act this tick.
    pub ready: bool,
}

/// Read-only snapshot describing all live adversaries.
#[derive(Clone, Debug, Default)]
pub struct AdversaryView {
    snapshots: Vec<AdversarySnapshot>,
}

impl AdversaryView {
    /// Creates a new view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<AdversarySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &AdversarySnapshot> {
        self.snapshots.iter()
    }

    /// Number of captured adversaries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether no adversaries were captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

/// Immutable representation of a single trap used for queries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrapSnapshot {
    /// Unique identifier assigned to the trap.
    pub id: TrapId,
    /// Cell currently occupied by the trap.
    pub cell: Position,
    /// Behaviour of the trap.
    pub kind: TrapKind,
}

/// Dynamic overlay persisted between sessions.
///
/// The grid is never stored; it is regenerated from `seed`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameState {
    /// Seed the layout was generated from.
    pub seed: u64,
    /// Cell occupied by the player.
    pub player: Position,
    /// Tile beneath the player.
    pub previous_tile: Tile,
    /// Number of objectives collected.
    pub objectives_collected: u32,
    /// Cells holding uncollected objectives.
    pub objectives: Vec<Position>,
    /// Cells holding active traps.
    pub traps: Vec<Position>,
    /// Current health.
    pub health: u32,
    /// Maximum health.
    pub max_health: u32,
    /// Cells holding live adversaries.
    pub adversaries: Vec<Position>,
}

/// Invalid static configuration. Always fatal.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Grid dimensions were zero or exceeded the supported extent.
    #[error("grid dimensions {columns}x{rows} are outside 1..={limit}")]
    GridExtent {
        /// Requested column count.
        columns: u32,
        /// Requested row count.
        rows: u32,
        /// Largest supported extent on either axis.
        limit: u32,
    },
    /// Room size bounds were zero or inverted.
    #[error("room size bounds {min}..={max} are invalid")]
    RoomBounds {
        /// Smallest room edge.
        min: u32,
        /// Largest room edge.
        max: u32,
    },
    /// The largest room plus edge margins does not fit inside the grid.
    #[error("rooms of up to {max} cells do not fit inside a {columns}x{rows} grid")]
    RoomsDoNotFit {
        /// Largest room edge.
        max: u32,
        /// Grid columns.
        columns: u32,
        /// Grid rows.
        rows: u32,
    },
    /// A cadence or interval was zero.
    #[error("{field} must be positive")]
    ZeroCadence {
        /// Name of the offending setting.
        field: &'static str,
    },
    /// Every trap weight was zero, negative, or not finite.
    #[error("trap weights must contain at least one positive entry")]
    TrapWeights,
    /// More objectives were requested than rooms were generated.
    #[error("{required} objectives need as many rooms, but only {available} were generated")]
    NotEnoughRooms {
        /// Objectives required by the configuration.
        required: u32,
        /// Rooms produced by the generator.
        available: usize,
    },
    /// The generated layout contains no floor for the player.
    #[error("no floor cell is available for the player")]
    NoPlayerStart,
}

/// Derives the seed of a labelled random stream from the session seed.
#[must_use]
pub fn derive_stream_seed(seed: u64, label: &str) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(seed.to_le_bytes());
    hasher.update(label.as_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0_u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}

/// Creates the deterministic generator backing a labelled stream.
#[must_use]
pub fn stream_rng(seed: u64, label: &str) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(derive_stream_seed(seed, label))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{de::DeserializeOwned, Serialize};

    #[test]
    fn manhattan_distance_matches_expectation() {
        let origin = Position::new(1, 1);
        let destination = Position::new(4, -3);
        assert_eq!(origin.manhattan_distance(destination), 7);
        assert_eq!(destination.manhattan_distance(origin), 7);
    }

    #[test]
    fn north_increases_row() {
        let origin = Position::new(3, 3);
        assert_eq!(origin.step(Direction::North), Position::new(3, 4));
        assert_eq!(origin.step(Direction::West), Position::new(2, 3));
        assert_eq!(Direction::North.reversed(), Direction::South);
    }

    #[test]
    fn movement_letters_map_to_directions() {
        assert_eq!(Direction::from_intent('w'), Some(Direction::North));
        assert_eq!(Direction::from_intent('A'), Some(Direction::West));
        assert_eq!(Direction::from_intent('s'), Some(Direction::South));
        assert_eq!(Direction::from_intent('d'), Some(Direction::East));
        assert_eq!(Direction::from_intent('q'), None);
    }

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn trap_tile_round_trips_through_bincode() {
        assert_round_trip(&Tile::Trap(TrapKind::Arrow {
            heading: Direction::West,
        }));
    }

    #[test]
    fn oversized_grid_is_clamped_to_extent_limit() {
        let grid = TileGrid::new(MAX_GRID_EXTENT + 904, 2);

        assert_eq!(grid.columns(), MAX_GRID_EXTENT);
        assert_eq!(grid.rows(), 2);
        let limit = i32::try_from(MAX_GRID_EXTENT).expect("limit fits");
        assert_eq!(grid.get(Position::new(limit - 1, 1)), Some(Tile::Nothing));
        assert_eq!(grid.get(Position::new(limit, 0)), None);
    }

    #[test]
    fn descriptions_resolve_back_to_tiles() {
        for tile in Tile::DESCRIBED {
            assert_eq!(Tile::from_description(tile.description()), Some(tile));
        }
        assert_eq!(
            Tile::from_description("bomb"),
            Some(Tile::Trap(TrapKind::Bomb))
        );
        assert_eq!(Tile::from_description("lava"), None);
    }

    #[test]
    fn walkability_classification() {
        assert!(Tile::Objective.is_player_walkable());
        assert!(Tile::Trap(TrapKind::Fire).is_player_walkable());
        assert!(!Tile::Wall.is_player_walkable());
        assert!(!Tile::Adversary.is_player_walkable());
        assert!(Tile::Avatar.is_search_passable());
        assert!(!Tile::Objective.is_search_passable());
        assert!(Tile::Avatar.is_trap_enterable());
        assert!(!Tile::Adversary.is_trap_enterable());
    }

    #[test]
    fn rooms_overlap_within_margin() {
        let room = Room::new(5, 5, 4, 4);
        let touching = Room::new(11, 5, 4, 4);
        let spaced = Room::new(13, 5, 4, 4);

        assert!(room.overlaps(&touching, 2));
        assert!(touching.overlaps(&room, 2));
        assert!(!room.overlaps(&spaced, 2));
        assert!(!spaced.overlaps(&room, 2));
    }

    #[test]
    fn room_perimeter_surrounds_interior() {
        let room = Room::new(2, 2, 3, 2);
        let ring: Vec<Position> = room.perimeter().collect();
        assert_eq!(ring.len(), 5 * 4 - 3 * 2);
        assert!(ring.iter().all(|cell| !room.contains(*cell)));
        assert_eq!(room.cells().count(), 6);
    }

    #[test]
    fn objective_is_removed_once() {
        let mut room = Room::new(0, 0, 5, 5);
        room.place_objective();
        assert!(room.has_objective_at(Position::new(2, 2)));
        assert!(room.remove_objective());
        assert!(!room.remove_objective());
        assert!(!room.has_objective());
    }

    #[test]
    fn grid_ignores_out_of_bounds_access() {
        let mut grid = TileGrid::new(3, 2);
        assert!(!grid.set(Position::new(3, 0), Tile::Wall));
        assert!(!grid.set(Position::new(0, -1), Tile::Wall));
        assert_eq!(grid.get(Position::new(-1, 0)), None);
        assert!(grid.set(Position::new(2, 1), Tile::Wall));
        assert_eq!(grid.view().get(Position::new(2, 1)), Some(Tile::Wall));

        let cells: Vec<(Position, Tile)> = grid.view().cells().collect();
        assert_eq!(cells.len(), 6);
        assert_eq!(cells[5], (Position::new(2, 1), Tile::Wall));
    }

    #[test]
    fn stream_seeds_differ_per_label() {
        let layout = derive_stream_seed(7, LAYOUT_STREAM);
        let session = derive_stream_seed(7, SESSION_STREAM);
        assert_ne!(layout, session);
        assert_eq!(layout, derive_stream_seed(7, LAYOUT_STREAM));
    }
}
