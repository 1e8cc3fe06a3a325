#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Seeded dungeon layout generator.
//!
//! Generation runs in four passes over a single [`TileGrid`]: rooms are
//! scattered without overlap, corridors link every room into one component,
//! walls seal the carved floor, and a flood fill verifies that each room is
//! reachable from the first one. The same configuration and random stream
//! always yield the same layout.

use std::collections::{HashSet, VecDeque};

use delve_core::{ConfigError, GameConfig, GenerationConfig, Position, Room, Tile, TileGrid};
use log::{info, warn};
use rand::Rng;

mod hallways;
mod walls;

/// Reachability verdict computed after generation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Connectivity {
    /// Every room is reachable from the first room.
    Connected,
    /// Some rooms could not be reached.
    Disconnected {
        /// Indices of the unreachable rooms in generation order.
        unreachable_rooms: Vec<usize>,
    },
}

impl Connectivity {
    /// Reports whether every room is reachable.
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }
}

/// Output of a generation run.
#[derive(Clone, Debug)]
pub struct Layout {
    grid: TileGrid,
    rooms: Vec<Room>,
    hallways: Vec<Position>,
    connectivity: Connectivity,
}

impl Layout {
    /// Tile grid containing rooms, corridors and walls.
    #[must_use]
    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    /// Rooms in placement order.
    #[must_use]
    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    /// Distinct corridor cells in carving order.
    #[must_use]
    pub fn hallways(&self) -> &[Position] {
        &self.hallways
    }

    /// Reachability verdict of the layout.
    #[must_use]
    pub fn connectivity(&self) -> &Connectivity {
        &self.connectivity
    }

    /// Splits the layout into its grid and rooms.
    #[must_use]
    pub fn into_parts(self) -> (TileGrid, Vec<Room>) {
        (self.grid, self.rooms)
    }
}

/// Generates a layout from the provided configuration and random stream.
///
/// # Errors
///
/// Returns [`ConfigError`] when the configuration cannot produce a grid.
pub fn generate<R>(config: &GameConfig, rng: &mut R) -> Result<Layout, ConfigError>
where
    R: Rng + ?Sized,
{
    config.validate()?;
    let generation = &config.generation;

    let mut grid = TileGrid::new(generation.columns, generation.rows);
    let rooms = place_rooms(generation, &mut grid, rng);
    let hallways = hallways::connect(&mut grid, &rooms, rng);
    walls::seal(&mut grid, &rooms, &hallways);
    let connectivity = validate_connectivity(&grid, &rooms);

    info!(
        "generated {}x{} layout with {} rooms and {} corridor cells",
        generation.columns,
        generation.rows,
        rooms.len(),
        hallways.len()
    );
    if let Connectivity::Disconnected { unreachable_rooms } = &connectivity {
        warn!(
            "{} rooms are unreachable from the first room: {:?}",
            unreachable_rooms.len(),
            unreachable_rooms
        );
    }

    Ok(Layout {
        grid,
        rooms,
        hallways,
        connectivity,
    })
}

fn place_rooms<R>(config: &GenerationConfig, grid: &mut TileGrid, rng: &mut R) -> Vec<Room>
where
    R: Rng + ?Sized,
{
    let columns = to_coordinate(config.columns);
    let rows = to_coordinate(config.rows);
    let min_size = to_coordinate(config.room_min_size);
    let max_size = to_coordinate(config.room_max_size);
    let edge = to_coordinate(config.edge_margin);
    let margin = to_coordinate(config.room_margin);

    let target = usize::try_from(config.max_rooms).unwrap_or(usize::MAX);
    let attempts = config
        .max_rooms
        .saturating_mul(config.placement_attempts_per_room);

    let mut rooms: Vec<Room> = Vec::new();
    for _ in 0..attempts {
        if rooms.len() >= target {
            break;
        }

        let width = rng.gen_range(min_size..=max_size);
        let height = rng.gen_range(min_size..=max_size);
        let x = rng.gen_range(edge..=columns - edge - width);
        let y = rng.gen_range(edge..=rows - edge - height);
        let candidate = Room::new(x, y, width, height);

        if rooms.iter().any(|room| candidate.overlaps(room, margin)) {
            continue;
        }

        for cell in candidate.cells() {
            let _ = grid.set(cell, Tile::RoomFloor);
        }
        rooms.push(candidate);
    }

    if rooms.len() < target {
        warn!(
            "placed {} of {} rooms after {} attempts",
            rooms.len(),
            target,
            attempts
        );
    }

    rooms
}

fn validate_connectivity(grid: &TileGrid, rooms: &[Room]) -> Connectivity {
    let Some(first) = rooms.first() else {
        return Connectivity::Connected;
    };

    let view = grid.view();
    let origin = first.center();
    let mut visited = HashSet::new();
    let mut frontier = VecDeque::new();
    if view.get(origin).is_some_and(Tile::is_floor) {
        let _ = visited.insert(origin);
        frontier.push_back(origin);
    }

    while let Some(cell) = frontier.pop_front() {
        for neighbor in cell.cardinal_neighbors() {
            if !view.get(neighbor).is_some_and(Tile::is_floor) {
                continue;
            }
            if visited.insert(neighbor) {
                frontier.push_back(neighbor);
            }
        }
    }

    let unreachable_rooms: Vec<usize> = rooms
        .iter()
        .enumerate()
        .filter(|(_, room)| {
            !visited.contains(&room.center()) && !room.cells().any(|cell| visited.contains(&cell))
        })
        .map(|(index, _)| index)
        .collect();

    if unreachable_rooms.is_empty() {
        Connectivity::Connected
    } else {
        Connectivity::Disconnected { unreachable_rooms }
    }
}

fn to_coordinate(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}
