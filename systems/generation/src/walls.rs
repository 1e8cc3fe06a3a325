//! Wall sealing around rooms and corridors.

use delve_core::{Position, Room, Tile, TileGrid};

/// Seals carved floor with walls. Only empty cells are ever converted.
pub(crate) fn seal(grid: &mut TileGrid, rooms: &[Room], hallways: &[Position]) {
    for room in rooms {
        for cell in room.perimeter() {
            wall_if_empty(grid, cell);
        }
    }

    for cell in hallways {
        for neighbor in surrounding(*cell) {
            wall_if_empty(grid, neighbor);
        }
    }

    let floor: Vec<Position> = grid
        .view()
        .cells()
        .filter(|(_, tile)| tile.is_floor())
        .map(|(cell, _)| cell)
        .collect();
    for cell in floor {
        for neighbor in surrounding(cell) {
            wall_if_empty(grid, neighbor);
        }
    }
}

fn wall_if_empty(grid: &mut TileGrid, cell: Position) {
    if grid.get(cell) == Some(Tile::Nothing) {
        let _ = grid.set(cell, Tile::Wall);
    }
}

fn surrounding(cell: Position) -> impl Iterator<Item = Position> {
    (-1..=1).flat_map(move |dy| {
        (-1..=1)
            .filter(move |dx| *dx != 0 || dy != 0)
            .map(move |dx| Position::new(cell.x() + dx, cell.y() + dy))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_floor_cell_is_enclosed() {
        let mut grid = TileGrid::new(12, 8);
        let room = Room::new(2, 2, 3, 3);
        for cell in room.cells() {
            let _ = grid.set(cell, Tile::RoomFloor);
        }
        let hallways: Vec<Position> = (5..9).map(|x| Position::new(x, 3)).collect();
        for cell in &hallways {
            let _ = grid.set(*cell, Tile::HallwayFloor);
        }

        seal(&mut grid, &[room], &hallways);

        for (cell, tile) in grid.view().cells() {
            if !tile.is_floor() {
                continue;
            }
            for neighbor in surrounding(cell) {
                assert_ne!(grid.get(neighbor), Some(Tile::Nothing), "gap next to {cell}");
            }
        }
        assert_eq!(grid.get(Position::new(0, 0)), Some(Tile::Nothing));
        assert_eq!(grid.get(Position::new(1, 1)), Some(Tile::Wall));
        assert_eq!(grid.get(Position::new(3, 3)), Some(Tile::RoomFloor));
    }

    #[test]
    fn surrounding_yields_eight_neighbors() {
        let cells: Vec<Position> = surrounding(Position::new(0, 0)).collect();
        assert_eq!(cells.len(), 8);
        assert!(!cells.contains(&Position::new(0, 0)));
    }
}
