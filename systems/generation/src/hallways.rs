//! Corridor carving that links every room into one component.

use std::collections::HashSet;

use delve_core::{Position, Room, Tile, TileGrid};
use rand::Rng;

/// Links all rooms and returns the carved corridor cells in carving order.
pub(crate) fn connect<R>(grid: &mut TileGrid, rooms: &[Room], rng: &mut R) -> Vec<Position>
where
    R: Rng + ?Sized,
{
    let mut carver = Carver::new(grid, rooms);
    if rooms.len() < 2 {
        return carver.finish();
    }

    let entrances: Vec<Vec<Position>> = rooms
        .iter()
        .map(|room| {
            room.side_entrances()
                .into_iter()
                .filter(|cell| carver.is_carvable(*cell))
                .collect()
        })
        .collect();

    let mut connected = vec![false; rooms.len()];
    let mut served = vec![false; rooms.len()];
    connected[rng.gen_range(0..rooms.len())] = true;

    while connected.iter().any(|linked| !linked) {
        match closest_entrance_pair(&entrances, &connected) {
            Some(link) => {
                carver.corridor(link.from, link.to, rng);
                served[link.from_room] = true;
                served[link.to_room] = true;
                connected[link.to_room] = true;
            }
            None => {
                force_link_remaining(&mut carver, rooms, &mut connected, &mut served, rng);
                break;
            }
        }
    }

    for (index, candidates) in entrances.iter().enumerate() {
        if served[index] {
            continue;
        }
        if let Some(stub) = candidates.first() {
            carver.carve(*stub);
        }
    }

    carver.finish()
}

struct EntranceLink {
    from_room: usize,
    to_room: usize,
    from: Position,
    to: Position,
}

fn closest_entrance_pair(entrances: &[Vec<Position>], connected: &[bool]) -> Option<EntranceLink> {
    let mut best: Option<(u32, EntranceLink)> = None;

    for (from_room, from_candidates) in entrances.iter().enumerate() {
        if !connected[from_room] {
            continue;
        }
        for (to_room, to_candidates) in entrances.iter().enumerate() {
            if connected[to_room] {
                continue;
            }
            for from in from_candidates {
                for to in to_candidates {
                    let distance = from.manhattan_distance(*to);
                    if best.as_ref().is_some_and(|(shortest, _)| distance >= *shortest) {
                        continue;
                    }
                    best = Some((
                        distance,
                        EntranceLink {
                            from_room,
                            to_room,
                            from: *from,
                            to: *to,
                        },
                    ));
                }
            }
        }
    }

    best.map(|(_, link)| link)
}

fn force_link_remaining<R>(
    carver: &mut Carver<'_>,
    rooms: &[Room],
    connected: &mut [bool],
    served: &mut [bool],
    rng: &mut R,
) where
    R: Rng + ?Sized,
{
    for index in 0..rooms.len() {
        if connected[index] {
            continue;
        }
        let center = rooms[index].center();
        let nearest = rooms
            .iter()
            .enumerate()
            .filter(|(candidate, _)| connected[*candidate])
            .min_by_key(|(_, room)| room.center().manhattan_distance(center))
            .map(|(candidate, _)| candidate);

        if let Some(nearest) = nearest {
            carver.corridor(rooms[nearest].center(), center, rng);
            served[nearest] = true;
            served[index] = true;
            connected[index] = true;
        }
    }
}

struct Carver<'a> {
    grid: &'a mut TileGrid,
    rooms: &'a [Room],
    carved: Vec<Position>,
    seen: HashSet<Position>,
}

impl<'a> Carver<'a> {
    fn new(grid: &'a mut TileGrid, rooms: &'a [Room]) -> Self {
        Self {
            grid,
            rooms,
            carved: Vec::new(),
            seen: HashSet::new(),
        }
    }

    fn finish(self) -> Vec<Position> {
        self.carved
    }

    fn is_inside_border(&self, cell: Position) -> bool {
        let columns = i32::try_from(self.grid.columns()).unwrap_or(i32::MAX);
        let rows = i32::try_from(self.grid.rows()).unwrap_or(i32::MAX);
        cell.x() > 0 && cell.x() < columns - 1 && cell.y() > 0 && cell.y() < rows - 1
    }

    fn is_inside_room(&self, cell: Position) -> bool {
        self.rooms.iter().any(|room| room.contains(cell))
    }

    fn is_carvable(&self, cell: Position) -> bool {
        self.is_inside_border(cell) && !self.is_inside_room(cell)
    }

    fn carve(&mut self, cell: Position) {
        if !self.is_carvable(cell) {
            return;
        }
        let _ = self.grid.set(cell, Tile::HallwayFloor);
        if self.seen.insert(cell) {
            self.carved.push(cell);
        }
    }

    fn corridor<R>(&mut self, start: Position, end: Position, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        self.carve(start);
        self.carve(end);

        if self.is_straight_and_clear(start, end) {
            if start.y() == end.y() {
                self.horizontal(start.x(), end.x(), start.y());
            } else {
                self.vertical(start.x(), start.y(), end.y());
            }
            return;
        }

        let horizontal_span = start.x().abs_diff(end.x());
        let vertical_span = start.y().abs_diff(end.y());
        let horizontal_first = if horizontal_span > vertical_span.saturating_mul(2) {
            true
        } else if vertical_span > horizontal_span.saturating_mul(2) {
            false
        } else {
            rng.gen_bool(0.5)
        };

        if horizontal_first {
            self.horizontal(start.x(), end.x(), start.y());
            self.vertical(end.x(), start.y(), end.y());
        } else {
            self.vertical(start.x(), start.y(), end.y());
            self.horizontal(start.x(), end.x(), end.y());
        }
    }

    fn is_straight_and_clear(&self, start: Position, end: Position) -> bool {
        let line: Vec<Position> = if start.y() == end.y() {
            span(start.x(), end.x())
                .map(|x| Position::new(x, start.y()))
                .collect()
        } else if start.x() == end.x() {
            span(start.y(), end.y())
                .map(|y| Position::new(start.x(), y))
                .collect()
        } else {
            return false;
        };

        line.into_iter().all(|cell| {
            let endpoint = cell == start || cell == end;
            self.is_inside_border(cell) && (endpoint || !self.is_inside_room(cell))
        })
    }

    fn horizontal(&mut self, from: i32, to: i32, y: i32) {
        for x in span(from, to) {
            self.carve(Position::new(x, y));
        }
    }

    fn vertical(&mut self, x: i32, from: i32, to: i32) {
        for y in span(from, to) {
            self.carve(Position::new(x, y));
        }
    }
}

fn span(a: i32, b: i32) -> std::ops::RangeInclusive<i32> {
    a.min(b)..=a.max(b)
}
