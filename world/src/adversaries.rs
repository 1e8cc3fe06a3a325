//! Adversary roster: spawning, turn cadence and movement bookkeeping.

use delve_core::{AdversaryId, AdversarySnapshot, Position, Tile, TileGrid};
use rand::Rng;

/// Draws a uniformly random cell of the grid.
pub(crate) fn random_cell<R>(grid: &TileGrid, rng: &mut R) -> Position
where
    R: Rng + ?Sized,
{
    let columns = i32::try_from(grid.columns()).unwrap_or(i32::MAX).max(1);
    let rows = i32::try_from(grid.rows()).unwrap_or(i32::MAX).max(1);
    Position::new(rng.gen_range(0..columns), rng.gen_range(0..rows))
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Adversary {
    id: AdversaryId,
    position: Position,
    beneath: Tile,
    turns: u32,
}

/// Live adversaries ordered by identifier.
#[derive(Clone, Debug)]
pub(crate) struct AdversaryRoster {
    adversaries: Vec<Adversary>,
    next_id: u32,
    cadence: u32,
}

impl AdversaryRoster {
    pub(crate) fn new(cadence: u32) -> Self {
        Self {
            adversaries: Vec::new(),
            next_id: 0,
            cadence: cadence.max(1),
        }
    }

    /// Reports whether an adversary may appear at `cell`.
    pub(crate) fn can_spawn(&self, grid: &TileGrid, cell: Position, player: Position) -> bool {
        cell != player
            && self.occupant(cell).is_none()
            && grid.get(cell).is_some_and(Tile::is_floor)
    }

    /// Places a single adversary on a free floor cell.
    pub(crate) fn spawn(
        &mut self,
        grid: &mut TileGrid,
        cell: Position,
        player: Position,
    ) -> Option<AdversaryId> {
        if !self.can_spawn(grid, cell, player) {
            return None;
        }
        let beneath = grid.get(cell)?;

        let id = AdversaryId::new(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        let _ = grid.set(cell, Tile::Adversary);
        self.adversaries.push(Adversary {
            id,
            position: cell,
            beneath,
            turns: 0,
        });
        Some(id)
    }

    /// Replaces the roster, dropping positions that are not free floor.
    pub(crate) fn restore(&mut self, grid: &mut TileGrid, positions: &[Position], player: Position) -> usize {
        for adversary in self.adversaries.drain(..) {
            let _ = grid.set(adversary.position, adversary.beneath);
        }
        positions
            .iter()
            .filter(|cell| self.spawn(grid, **cell, player).is_some())
            .count()
    }

    /// Advances every adversary's turn counter.
    pub(crate) fn tick(&mut self) {
        for adversary in &mut self.adversaries {
            adversary.turns = adversary.turns.saturating_add(1);
        }
    }

    fn is_ready(&self, adversary: &Adversary) -> bool {
        adversary.turns > 0 && adversary.turns % self.cadence == 0
    }

    fn ready_index(&self, id: AdversaryId) -> Option<usize> {
        self.adversaries
            .iter()
            .position(|adversary| adversary.id == id)
            .filter(|index| self.is_ready(&self.adversaries[*index]))
    }

    /// Moves a ready adversary onto a neighbouring floor cell.
    pub(crate) fn step(&mut self, grid: &mut TileGrid, id: AdversaryId, to: Position) -> Option<Position> {
        let index = self.ready_index(id)?;
        let adversary = &mut self.adversaries[index];
        if adversary.position.manhattan_distance(to) != 1 {
            return None;
        }
        let destination = grid.get(to).filter(|tile| tile.is_floor())?;

        let from = adversary.position;
        let _ = grid.set(from, adversary.beneath);
        adversary.beneath = destination;
        adversary.position = to;
        let _ = grid.set(to, Tile::Adversary);
        Some(from)
    }

    /// Consumes a ready adversary adjacent to the player, returning its cell.
    pub(crate) fn strike(&mut self, grid: &mut TileGrid, id: AdversaryId, player: Position) -> Option<Position> {
        let index = self.ready_index(id)?;
        if self.adversaries[index].position.manhattan_distance(player) != 1 {
            return None;
        }
        let adversary = self.adversaries.remove(index);
        let _ = grid.set(adversary.position, adversary.beneath);
        Some(adversary.position)
    }

    pub(crate) fn occupant(&self, cell: Position) -> Option<AdversaryId> {
        self.adversaries
            .iter()
            .find(|adversary| adversary.position == cell)
            .map(|adversary| adversary.id)
    }

    pub(crate) fn snapshots(&self) -> Vec<AdversarySnapshot> {
        self.adversaries
            .iter()
            .map(|adversary| AdversarySnapshot {
                id: adversary.id,
                cell: adversary.position,
                ready: self.is_ready(adversary),
            })
            .collect()
    }

    pub(crate) fn positions(&self) -> Vec<Position> {
        self.adversaries
            .iter()
            .map(|adversary| adversary.position)
            .collect()
    }
}
