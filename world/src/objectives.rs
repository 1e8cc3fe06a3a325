//! Objective marker placement and collection.

use delve_core::{ConfigError, Position, Room};
use rand::Rng;

/// Tracks objective-bearing rooms and the number of collected markers.
#[derive(Clone, Debug)]
pub(crate) struct ObjectiveTracker {
    target: u32,
    rooms: Vec<Room>,
    collected: u32,
}

impl ObjectiveTracker {
    pub(crate) fn new(target: u32) -> Self {
        Self {
            target,
            rooms: Vec::new(),
            collected: 0,
        }
    }

    /// Places one marker at the center of `target` distinct random rooms.
    pub(crate) fn generate<R>(&mut self, rooms: &[Room], rng: &mut R) -> Result<(), ConfigError>
    where
        R: Rng + ?Sized,
    {
        let required = usize::try_from(self.target).unwrap_or(usize::MAX);
        if rooms.len() < required {
            return Err(ConfigError::NotEnoughRooms {
                required: self.target,
                available: rooms.len(),
            });
        }

        let mut available: Vec<Room> = rooms.to_vec();
        self.rooms.clear();
        self.collected = 0;
        for _ in 0..required {
            let mut room = available.remove(rng.gen_range(0..available.len()));
            room.place_objective();
            self.rooms.push(room);
        }
        Ok(())
    }

    /// Replaces the markers with synthetic single-cell rooms.
    pub(crate) fn restore(&mut self, positions: &[Position], collected: u32) {
        self.rooms = positions
            .iter()
            .map(|position| {
                let mut room = Room::new(position.x(), position.y(), 1, 1);
                room.place_objective();
                room
            })
            .collect();
        self.collected = collected.min(self.target);
    }

    /// Collects the marker at `position`, reporting whether one was taken.
    pub(crate) fn check_collection(&mut self, position: Position) -> bool {
        let Some(room) = self
            .rooms
            .iter_mut()
            .find(|room| room.has_objective_at(position))
        else {
            return false;
        };
        if !room.remove_objective() {
            return false;
        }
        self.collected = self.collected.saturating_add(1).min(self.target);
        true
    }

    pub(crate) fn is_complete(&self) -> bool {
        self.collected >= self.target
    }

    pub(crate) const fn collected(&self) -> u32 {
        self.collected
    }

    pub(crate) const fn target(&self) -> u32 {
        self.target
    }

    pub(crate) fn remaining_positions(&self) -> Vec<Position> {
        self.rooms.iter().filter_map(Room::objective).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rooms() -> Vec<Room> {
        (0..4).map(|index| Room::new(index * 10, 0, 5, 5)).collect()
    }

    #[test]
    fn markers_land_on_distinct_room_centers() {
        let rooms = rooms();
        let mut tracker = ObjectiveTracker::new(3);
        let mut rng = ChaCha8Rng::seed_from_u64(5);

        tracker.generate(&rooms, &mut rng).expect("enough rooms");

        let mut positions = tracker.remaining_positions();
        assert_eq!(positions.len(), 3);
        positions.sort();
        positions.dedup();
        assert_eq!(positions.len(), 3);
        for position in positions {
            assert!(rooms.iter().any(|room| room.center() == position));
        }
    }

    #[test]
    fn too_few_rooms_is_an_error() {
        let mut tracker = ObjectiveTracker::new(3);
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        assert_eq!(
            tracker.generate(&rooms()[..2], &mut rng),
            Err(ConfigError::NotEnoughRooms {
                required: 3,
                available: 2
            })
        );
    }

    #[test]
    fn marker_is_collected_once() {
        let mut tracker = ObjectiveTracker::new(3);
        tracker.restore(&[Position::new(4, 4), Position::new(8, 8)], 1);

        assert!(tracker.check_collection(Position::new(4, 4)));
        assert!(!tracker.check_collection(Position::new(4, 4)));
        assert!(!tracker.check_collection(Position::new(5, 5)));
        assert_eq!(tracker.collected(), 2);
        assert!(!tracker.is_complete());

        assert!(tracker.check_collection(Position::new(8, 8)));
        assert!(tracker.is_complete());
        assert!(tracker.remaining_positions().is_empty());
    }

    #[test]
    fn restored_count_is_clamped() {
        let mut tracker = ObjectiveTracker::new(3);
        tracker.restore(&[], 7);
        assert_eq!(tracker.collected(), 3);
        assert!(tracker.is_complete());
    }
}
