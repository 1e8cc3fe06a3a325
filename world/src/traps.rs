//! Trap roster: placement, behaviour dispatch and collision effects.

use delve_core::{
    Direction, EntityConfig, Event, Position, Room, Tile, TileGrid, TrapId, TrapKind,
    TrapSnapshot,
};
use rand::{
    distributions::{Distribution, WeightedIndex},
    Rng,
};

use crate::{health::HealthManager, player::Player};

/// Tuning shared by every trap.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct TrapRules {
    per_room: u32,
    attempts: u32,
    spacing: u32,
    weights: [f64; 4],
    arrow_cadence: u32,
    fire_cadence: u32,
    damage: u32,
    heal: u32,
}

impl From<&EntityConfig> for TrapRules {
    fn from(config: &EntityConfig) -> Self {
        Self {
            per_room: config.traps_per_room,
            attempts: config.trap_placement_attempts,
            spacing: config.trap_spacing,
            weights: config.trap_weights.as_array(),
            arrow_cadence: config.arrow_cadence.max(1),
            fire_cadence: config.fire_cadence.max(1),
            damage: config.trap_damage,
            heal: config.trap_heal,
        }
    }
}

impl TrapRules {
    fn cadence(&self, kind: TrapKind) -> Option<u32> {
        match kind {
            TrapKind::Arrow { .. } => Some(self.arrow_cadence),
            TrapKind::Fire => Some(self.fire_cadence),
            TrapKind::HealthPotion | TrapKind::Bomb => None,
        }
    }

    /// Signed health effect of touching a trap: negative damages, positive heals.
    fn effect(&self, kind: TrapKind) -> i32 {
        match kind {
            TrapKind::HealthPotion => i32::try_from(self.heal).unwrap_or(i32::MAX),
            TrapKind::Bomb | TrapKind::Arrow { .. } | TrapKind::Fire => {
                -i32::try_from(self.damage).unwrap_or(i32::MAX)
            }
        }
    }

    fn choose_kind<R>(&self, rng: &mut R) -> Option<TrapKind>
    where
        R: Rng + ?Sized,
    {
        let distribution = WeightedIndex::new(self.weights.iter()).ok()?;
        let kind = match distribution.sample(rng) {
            0 => TrapKind::HealthPotion,
            1 => TrapKind::Arrow {
                heading: random_direction(rng),
            },
            2 => TrapKind::Bomb,
            _ => TrapKind::Fire,
        };
        Some(kind)
    }
}

fn is_enterable(grid: &TileGrid, cell: Position) -> bool {
    grid.get(cell).is_some_and(Tile::is_trap_enterable)
}

fn random_direction<R>(rng: &mut R) -> Direction
where
    R: Rng + ?Sized,
{
    Direction::ALL[rng.gen_range(0..Direction::ALL.len())]
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Trap {
    id: TrapId,
    kind: TrapKind,
    position: Position,
    beneath: Tile,
    drawn: bool,
    counter: u32,
}

/// Active traps ordered by identifier. Spent traps leave the roster.
#[derive(Clone, Debug)]
pub(crate) struct TrapRoster {
    traps: Vec<Trap>,
    next_id: u32,
    rules: TrapRules,
}

impl TrapRoster {
    pub(crate) fn new(rules: TrapRules) -> Self {
        Self {
            traps: Vec::new(),
            next_id: 0,
            rules,
        }
    }

    /// Chooses cells and kinds for traps scattered through the provided rooms.
    pub(crate) fn plan<'r, R, I>(
        &self,
        grid: &TileGrid,
        rooms: I,
        rng: &mut R,
    ) -> Vec<(Position, TrapKind)>
    where
        R: Rng + ?Sized,
        I: IntoIterator<Item = &'r Room>,
    {
        let mut planned = Vec::new();
        for room in rooms {
            for _ in 0..self.rules.per_room {
                let Some(cell) = self.find_cell(grid, room, &planned, rng) else {
                    continue;
                };
                let Some(kind) = self.rules.choose_kind(rng) else {
                    continue;
                };
                planned.push((cell, kind));
            }
        }
        planned
    }

    fn find_cell<R>(
        &self,
        grid: &TileGrid,
        room: &Room,
        planned: &[(Position, TrapKind)],
        rng: &mut R,
    ) -> Option<Position>
    where
        R: Rng + ?Sized,
    {
        let columns = (room.width() - 2).max(1);
        let rows = (room.height() - 2).max(1);
        for _ in 0..self.rules.attempts {
            let cell = Position::new(
                rng.gen_range(0..columns) + room.x() + 1,
                rng.gen_range(0..rows) + room.y() + 1,
            );
            let is_floor = grid.get(cell).is_some_and(Tile::is_floor);
            let is_spaced = self
                .traps
                .iter()
                .map(|trap| trap.position)
                .chain(planned.iter().map(|(other, _)| *other))
                .all(|other| other != cell && other.manhattan_distance(cell) >= self.rules.spacing);
            if is_floor && is_spaced {
                return Some(cell);
            }
        }
        None
    }

    /// Places a trap on a floor cell and draws it.
    pub(crate) fn place(&mut self, grid: &mut TileGrid, cell: Position, kind: TrapKind) -> Option<TrapId> {
        let beneath = grid.get(cell).filter(|tile| tile.is_floor())?;
        let id = self.allocate_id();
        let _ = grid.set(cell, Tile::Trap(kind));
        self.traps.push(Trap {
            id,
            kind,
            position: cell,
            beneath,
            drawn: true,
            counter: 0,
        });
        Some(id)
    }

    fn allocate_id(&mut self) -> TrapId {
        let id = TrapId::new(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        id
    }

    /// Replaces the roster with freshly randomised traps at the given cells.
    ///
    /// Traps land on any cell a moving trap could enter, so traps resting on
    /// objectives or on each other survive. A trap on the player's cell is
    /// restored hidden beneath the avatar.
    pub(crate) fn restore<R>(
        &mut self,
        grid: &mut TileGrid,
        positions: &[Position],
        player: &Player,
        rng: &mut R,
    ) -> usize
    where
        R: Rng + ?Sized,
    {
        for trap in self.traps.drain(..) {
            if trap.drawn {
                let _ = grid.set(trap.position, trap.beneath);
            }
        }

        let mut restored = 0;
        for cell in positions {
            let under_player = *cell == player.position();
            if !under_player && !is_enterable(grid, *cell) {
                continue;
            }
            let Some(kind) = self.rules.choose_kind(rng) else {
                continue;
            };
            let id = self.allocate_id();
            self.traps.push(Trap {
                id,
                kind,
                position: *cell,
                beneath: player.beneath(),
                drawn: false,
                counter: 0,
            });
            if !under_player {
                let index = self.traps.len() - 1;
                self.cover(index, *cell, grid);
            }
            restored += 1;
        }
        restored
    }

    /// Runs one trap update. Returns whether any trap changed cells.
    pub(crate) fn advance<R>(
        &mut self,
        grid: &mut TileGrid,
        player: &Player,
        rng: &mut R,
        out_events: &mut Vec<Event>,
    ) -> bool
    where
        R: Rng + ?Sized,
    {
        let mut moved = false;
        for index in 0..self.traps.len() {
            let Some(cadence) = self.rules.cadence(self.traps[index].kind) else {
                continue;
            };
            let trap = &mut self.traps[index];
            trap.counter = trap.counter.saturating_add(1);
            if trap.counter < cadence {
                continue;
            }
            trap.counter = 0;

            let Some(to) = Self::plan_move(trap, grid, rng) else {
                continue;
            };
            let from = self.relocate(index, to, grid, player);
            out_events.push(Event::TrapMoved {
                trap: self.traps[index].id,
                from,
                to,
            });
            moved = true;
        }
        moved
    }

    fn plan_move<R>(trap: &mut Trap, grid: &mut TileGrid, rng: &mut R) -> Option<Position>
    where
        R: Rng + ?Sized,
    {
        match trap.kind {
            TrapKind::Arrow { heading } => {
                let next = trap.position.step(heading);
                if is_enterable(grid, next) {
                    return Some(next);
                }
                trap.kind = TrapKind::Arrow {
                    heading: heading.reversed(),
                };
                if trap.drawn {
                    let _ = grid.set(trap.position, Tile::Trap(trap.kind));
                }
                None
            }
            TrapKind::Fire => (0..4)
                .map(|_| trap.position.step(random_direction(rng)))
                .find(|cell| is_enterable(grid, *cell)),
            TrapKind::HealthPotion | TrapKind::Bomb => None,
        }
    }

    fn relocate(&mut self, index: usize, to: Position, grid: &mut TileGrid, player: &Player) -> Position {
        let from = self.traps[index].position;
        if self.traps[index].drawn {
            self.uncover(index, grid);
        }

        if to == player.position() {
            let trap = &mut self.traps[index];
            trap.drawn = false;
            trap.beneath = player.beneath();
            trap.position = to;
        } else {
            self.cover(index, to, grid);
        }
        from
    }

    /// Draws a trap at `cell`, hiding any drawn trap already there.
    fn cover(&mut self, index: usize, cell: Position, grid: &mut TileGrid) {
        let mut beneath = grid.get(cell).unwrap_or_default();
        for (other, trap) in self.traps.iter_mut().enumerate() {
            if other != index && trap.position == cell && trap.drawn {
                trap.drawn = false;
                beneath = trap.beneath;
            }
        }
        let trap = &mut self.traps[index];
        trap.position = cell;
        trap.beneath = beneath;
        trap.drawn = true;
        let _ = grid.set(cell, Tile::Trap(trap.kind));
    }

    /// Restores the cell under a drawn trap, revealing any trap it covered.
    fn uncover(&mut self, index: usize, grid: &mut TileGrid) {
        let cell = self.traps[index].position;
        let beneath = self.traps[index].beneath;
        self.traps[index].drawn = false;

        let hidden = self
            .traps
            .iter_mut()
            .enumerate()
            .find(|(other, trap)| *other != index && trap.position == cell);
        match hidden {
            Some((_, trap)) => {
                trap.drawn = true;
                let _ = grid.set(cell, Tile::Trap(trap.kind));
            }
            None => {
                let _ = grid.set(cell, beneath);
            }
        }
    }

    /// Applies the effect of every trap sharing the player's cell.
    ///
    /// Single-use traps leave the roster after triggering.
    pub(crate) fn resolve_collisions(
        &mut self,
        player: &Player,
        health: &mut HealthManager,
        grid: &mut TileGrid,
        out_events: &mut Vec<Event>,
    ) {
        let cell = player.position();
        let mut spent = Vec::new();
        for (index, trap) in self.traps.iter().enumerate() {
            if trap.position != cell {
                continue;
            }
            let effect = self.rules.effect(trap.kind);
            if effect < 0 {
                let _ = health.take_damage(effect.unsigned_abs(), out_events);
            } else {
                health.heal(effect.unsigned_abs(), out_events);
            }
            out_events.push(Event::TrapTriggered {
                trap: trap.id,
                cell,
                effect,
            });
            if trap.kind.is_single_use() {
                spent.push(index);
            }
        }

        for index in spent.into_iter().rev() {
            if self.traps[index].drawn {
                self.uncover(index, grid);
            }
            let trap = self.traps.remove(index);
            out_events.push(Event::TrapRemoved {
                trap: trap.id,
                cell: trap.position,
            });
        }
    }

    /// Marks every trap in `cell` as covered by the player.
    pub(crate) fn conceal_at(&mut self, cell: Position) {
        for trap in self.traps.iter_mut().filter(|trap| trap.position == cell) {
            trap.drawn = false;
        }
    }

    /// Redraws a trap left behind by the player. Returns whether one was drawn.
    pub(crate) fn reveal_at(&mut self, grid: &mut TileGrid, cell: Position, floor: Tile) -> bool {
        let Some(trap) = self.traps.iter_mut().find(|trap| trap.position == cell) else {
            return false;
        };
        trap.drawn = true;
        trap.beneath = floor;
        let _ = grid.set(cell, Tile::Trap(trap.kind));
        true
    }

    pub(crate) fn snapshots(&self) -> Vec<TrapSnapshot> {
        self.traps
            .iter()
            .map(|trap| TrapSnapshot {
                id: trap.id,
                cell: trap.position,
                kind: trap.kind,
            })
            .collect()
    }

    pub(crate) fn positions(&self) -> Vec<Position> {
        self.traps.iter().map(|trap| trap.position).collect()
    }
}
