//! Static tuning for generation, entities and scheduling.

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Largest grid extent accepted on either axis.
/// Largest accepted grid extent along either axis.
pub const MAX_GRID_EXTENT: u32 = 4096;

/// Complete static configuration of a session.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Layout generation parameters.
    pub generation: GenerationConfig,
    /// Population and behaviour of entities.
    pub entities: EntityConfig,
    /// Tick scheduling.
    pub schedule: ScheduleConfig,
}

impl GameConfig {
    /// Rejects configurations the engine cannot run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let generation = &self.generation;
        if generation.columns == 0
            || generation.rows == 0
            || generation.columns > MAX_GRID_EXTENT
            || generation.rows > MAX_GRID_EXTENT
        {
            return Err(ConfigError::GridExtent {
                columns: generation.columns,
                rows: generation.rows,
                limit: MAX_GRID_EXTENT,
            });
        }

        if generation.room_min_size == 0 || generation.room_min_size > generation.room_max_size {
            return Err(ConfigError::RoomBounds {
                min: generation.room_min_size,
                max: generation.room_max_size,
            });
        }

        let footprint = u64::from(generation.room_max_size) + 2 * u64::from(generation.edge_margin);
        if footprint > u64::from(generation.columns) || footprint > u64::from(generation.rows) {
            return Err(ConfigError::RoomsDoNotFit {
                max: generation.room_max_size,
                columns: generation.columns,
                rows: generation.rows,
            });
        }

        let cadences = [
            ("entities.adversary_cadence", self.entities.adversary_cadence),
            ("entities.arrow_cadence", self.entities.arrow_cadence),
            ("entities.fire_cadence", self.entities.fire_cadence),
            ("schedule.trap_interval", self.schedule.trap_interval),
        ];
        if let Some((field, _)) = cadences.into_iter().find(|(_, value)| *value == 0) {
            return Err(ConfigError::ZeroCadence { field });
        }

        if !self.entities.trap_weights.has_positive_entry() {
            return Err(ConfigError::TrapWeights);
        }

        Ok(())
    }
}

/// Parameters of the layout generator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Grid width in cells.
    pub columns: u32,
    /// Grid height in cells.
    pub rows: u32,
    /// Upper bound on the number of rooms.
    pub max_rooms: u32,
    /// Smallest room edge.
    pub room_min_size: u32,
    /// Largest room edge.
    pub room_max_size: u32,
    /// Free cells kept between rooms on every side.
    pub room_margin: u32,
    /// Placement attempts budgeted per room.
    pub placement_attempts_per_room: u32,
    /// Free cells kept between rooms and the grid border.
    pub edge_margin: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            columns: 80,
            rows: 50,
            max_rooms: 30,
            room_min_size: 4,
            room_max_size: 8,
            room_margin: 2,
            placement_attempts_per_room: 10,
            edge_margin: 1,
        }
    }
}

/// Population and behaviour of entities.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityConfig {
    /// Objectives the player must collect to win.
    pub objective_count: u32,
    /// Maximum player health.
    pub max_health: u32,
    /// Adversaries spawned in a fresh session.
    pub adversary_count: u32,
    /// Ticks between adversary turns.
    pub adversary_cadence: u32,
    /// Spawn attempts budgeted per adversary.
    pub adversary_spawn_attempts: u32,
    /// Damage dealt by an adversary strike.
    pub adversary_damage: u32,
    /// Traps placed in each room without an objective.
    pub traps_per_room: u32,
    /// Placement attempts budgeted per trap.
    pub trap_placement_attempts: u32,
    /// Minimum Manhattan distance between traps.
    pub trap_spacing: u32,
    /// Relative likelihood of each trap kind.
    pub trap_weights: TrapWeights,
    /// Trap updates between arrow moves.
    pub arrow_cadence: u32,
    /// Trap updates between fire moves.
    pub fire_cadence: u32,
    /// Damage dealt by bombs, arrows and fire.
    pub trap_damage: u32,
    /// Health restored by a potion.
    pub trap_heal: u32,
}

impl Default for EntityConfig {
    fn default() -> Self {
        Self {
            objective_count: 3,
            max_health: 5,
            adversary_count: 3,
            adversary_cadence: 10,
            adversary_spawn_attempts: 1000,
            adversary_damage: 1,
            traps_per_room: 2,
            trap_placement_attempts: 50,
            trap_spacing: 2,
            trap_weights: TrapWeights::default(),
            arrow_cadence: 3,
            fire_cadence: 4,
            trap_damage: 1,
            trap_heal: 1,
        }
    }
}

/// Weighted distribution over trap kinds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrapWeights {
    /// Weight of health potions.
    pub health_potion: f64,
    /// Weight of arrow traps.
    pub arrow: f64,
    /// Weight of bombs.
    pub bomb: f64,
    /// Weight of fire.
    pub fire: f64,
}

impl TrapWeights {
    /// Weights in selection order: potion, arrow, bomb, fire.
    ///
    /// Negative and non-finite weights are reported as zero.
    #[must_use]
    pub fn as_array(&self) -> [f64; 4] {
        [self.health_potion, self.arrow, self.bomb, self.fire]
            .map(|weight| if weight.is_finite() && weight > 0.0 { weight } else { 0.0 })
    }

    fn has_positive_entry(&self) -> bool {
        self.as_array().into_iter().any(|weight| weight > 0.0)
    }
}

impl Default for TrapWeights {
    fn default() -> Self {
        Self {
            health_potion: 0.15,
            arrow: 0.40,
            bomb: 0.30,
            fire: 0.15,
        }
    }
}

/// Tick scheduling parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Ticks between trap updates.
    pub trap_interval: u32,
    /// Wall-clock sleep between ticks in milliseconds.
    pub tick_interval_ms: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            trap_interval: 5,
            tick_interval_ms: 50,
        }
    }
}
