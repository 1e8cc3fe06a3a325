//! Player placement and the tile remembered beneath the avatar.

use delve_core::{Position, Tile, TileGrid};

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Player {
    position: Position,
    beneath: Tile,
}

impl Player {
    pub(crate) const fn new(position: Position, beneath: Tile) -> Self {
        Self { position, beneath }
    }

    /// Places the player on the first floor cell, scanning rows bottom-up.
    pub(crate) fn place(grid: &mut TileGrid) -> Option<Self> {
        let (position, beneath) = grid.view().cells().find(|(_, tile)| tile.is_floor())?;
        let _ = grid.set(position, Tile::Avatar);
        Some(Self::new(position, beneath))
    }

    pub(crate) const fn position(&self) -> Position {
        self.position
    }

    pub(crate) const fn beneath(&self) -> Tile {
        self.beneath
    }

    pub(crate) fn set_beneath(&mut self, tile: Tile) {
        self.beneath = tile;
    }

    /// Moves the avatar, restoring the origin and remembering the destination.
    ///
    /// The caller validates the destination and supplies the tile to
    /// remember beneath the player there.
    pub(crate) fn relocate(&mut self, grid: &mut TileGrid, to: Position, beneath: Tile) -> Position {
        let from = self.position;
        let _ = grid.set(from, self.beneath);
        let _ = grid.set(to, Tile::Avatar);
        self.position = to;
        self.beneath = beneath;
        from
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placement_scans_rows_from_the_bottom() {
        let mut grid = TileGrid::new(4, 4);
        let _ = grid.set(Position::new(3, 2), Tile::HallwayFloor);
        let _ = grid.set(Position::new(1, 1), Tile::RoomFloor);

        let player = Player::place(&mut grid).expect("floor exists");

        assert_eq!(player.position(), Position::new(1, 1));
        assert_eq!(player.beneath(), Tile::RoomFloor);
        assert_eq!(grid.get(Position::new(1, 1)), Some(Tile::Avatar));
    }

    #[test]
    fn placement_fails_without_floor() {
        let mut grid = TileGrid::new(2, 2);
        assert!(Player::place(&mut grid).is_none());
    }

    #[test]
    fn relocation_restores_origin() {
        let mut grid = TileGrid::new(3, 1);
        let _ = grid.set(Position::new(0, 0), Tile::HallwayFloor);
        let _ = grid.set(Position::new(1, 0), Tile::RoomFloor);
        let mut player = Player::place(&mut grid).expect("floor exists");

        let from = player.relocate(&mut grid, Position::new(1, 0), Tile::RoomFloor);

        assert_eq!(from, Position::new(0, 0));
        assert_eq!(grid.get(from), Some(Tile::HallwayFloor));
        assert_eq!(grid.get(Position::new(1, 0)), Some(Tile::Avatar));
    }
}
