//! Player health bookkeeping.

use delve_core::Event;

/// Tracks the player's health and death state.
///
/// Every observable change is reported as [`Event::HealthChanged`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct HealthManager {
    current: u32,
    max: u32,
    dead: bool,
}

impl HealthManager {
    pub(crate) fn new(max: u32) -> Self {
        Self {
            current: max,
            max,
            dead: max == 0,
        }
    }

    pub(crate) const fn current(&self) -> u32 {
        self.current
    }

    pub(crate) const fn max(&self) -> u32 {
        self.max
    }

    pub(crate) const fn is_dead(&self) -> bool {
        self.dead
    }

    /// Applies damage and reports whether this call killed the player.
    pub(crate) fn take_damage(&mut self, amount: u32, out_events: &mut Vec<Event>) -> bool {
        if self.dead || amount == 0 {
            return false;
        }

        self.current = self.current.saturating_sub(amount);
        self.push_changed(out_events);
        if self.current == 0 {
            self.dead = true;
            out_events.push(Event::PlayerDied);
            return true;
        }
        false
    }

    pub(crate) fn heal(&mut self, amount: u32, out_events: &mut Vec<Event>) {
        if self.dead || amount == 0 {
            return;
        }

        let healed = self.current.saturating_add(amount).min(self.max);
        if healed != self.current {
            self.current = healed;
            self.push_changed(out_events);
        }
    }

    /// Overwrites both values, clamping `current` into `0..=max`.
    pub(crate) fn restore(&mut self, current: u32, max: u32, out_events: &mut Vec<Event>) {
        self.max = max;
        self.current = current.min(max);
        self.dead = self.current == 0;
        self.push_changed(out_events);
    }

    fn push_changed(&self, out_events: &mut Vec<Event>) {
        out_events.push(Event::HealthChanged {
            current: self.current,
            max: self.max,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn damage_clamps_at_zero_and_kills_once() {
        let mut health = HealthManager::new(3);
        let mut events = Vec::new();

        assert!(!health.take_damage(1, &mut events));
        assert!(health.take_damage(5, &mut events));
        assert_eq!(health.current(), 0);
        assert!(health.is_dead());
        assert!(!health.take_damage(1, &mut events));

        assert_eq!(
            events,
            vec![
                Event::HealthChanged { current: 2, max: 3 },
                Event::HealthChanged { current: 0, max: 3 },
                Event::PlayerDied,
            ]
        );
    }

    #[test]
    fn zero_damage_is_ignored() {
        let mut health = HealthManager::new(3);
        let mut events = Vec::new();
        assert!(!health.take_damage(0, &mut events));
        assert!(events.is_empty());
    }

    #[test]
    fn heal_clamps_at_max() {
        let mut health = HealthManager::new(5);
        let mut events = Vec::new();
        let _ = health.take_damage(1, &mut events);
        events.clear();

        health.heal(3, &mut events);
        assert_eq!(health.current(), 5);
        health.heal(1, &mut events);

        assert_eq!(events, vec![Event::HealthChanged { current: 5, max: 5 }]);
    }

    #[test]
    fn dead_player_cannot_heal() {
        let mut health = HealthManager::new(1);
        let mut events = Vec::new();
        let _ = health.take_damage(1, &mut events);

        health.heal(1, &mut events);
        assert_eq!(health.current(), 0);
        assert!(health.is_dead());
    }

    #[test]
    fn restore_clamps_and_recomputes_death() {
        let mut health = HealthManager::new(5);
        let mut events = Vec::new();

        health.restore(9, 4, &mut events);
        assert_eq!((health.current(), health.max()), (4, 4));
        assert!(!health.is_dead());

        health.restore(0, 4, &mut events);
        assert!(health.is_dead());
        assert_eq!(events.len(), 2);
    }
}
