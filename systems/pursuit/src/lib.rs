#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Adversary AI that chases the player along shortest paths.

use delve_core::{AdversarySnapshot, Command, Position, TileView};
use delve_system_pathfinding::find_path;

/// Pure system that turns ready adversaries into movement or strike commands.
#[derive(Debug, Default)]
pub struct Pursuit;

impl Pursuit {
    /// Plans the next action of a single adversary.
    ///
    /// Returns `None` when the adversary is not ready or no path reaches the
    /// player.
    #[must_use]
    pub fn plan(
        &self,
        adversary: &AdversarySnapshot,
        tiles: TileView<'_>,
        player: Position,
    ) -> Option<Command> {
        if !adversary.ready {
            return None;
        }

        let path = find_path(tiles, adversary.cell, player);
        let next = *path.get(1)?;
        if next == player {
            Some(Command::StrikePlayer {
                adversary: adversary.id,
            })
        } else {
            Some(Command::StepAdversary {
                adversary: adversary.id,
                to: next,
            })
        }
    }
}
