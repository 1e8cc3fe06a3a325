use delve_core::{Position, Tile, TileGrid};
use delve_system_pathfinding::find_path;

fn grid_from(rows: &[&str]) -> TileGrid {
    let height = u32::try_from(rows.len()).expect("row count fits");
    let width = u32::try_from(rows[0].chars().count()).expect("column count fits");
    let mut grid = TileGrid::new(width, height);
    for (offset, row) in rows.iter().enumerate() {
        let y = i32::try_from(rows.len() - 1 - offset).expect("row fits");
        for (x, glyph) in row.chars().enumerate() {
            let tile = match glyph {
                '.' => Tile::RoomFloor,
                ',' => Tile::HallwayFloor,
                '@' => Tile::Avatar,
                '+' => Tile::Objective,
                'X' => Tile::Adversary,
                _ => Tile::Wall,
            };
            let x = i32::try_from(x).expect("column fits");
            let _ = grid.set(Position::new(x, y), tile);
        }
    }
    grid
}

#[test]
fn straight_corridor_path_is_monotone() {
    let grid = grid_from(&["#########", "#,,,,,,,#", "#########"]);
    let start = Position::new(1, 1);
    let goal = Position::new(7, 1);

    let path = find_path(grid.view(), start, goal);

    assert_eq!(path.len(), 7);
    assert_eq!(path.first(), Some(&start));
    assert_eq!(path.last(), Some(&goal));
    for pair in path.windows(2) {
        assert_eq!(pair[1].x(), pair[0].x() + 1);
        assert_eq!(pair[1].y(), 1);
    }
}

#[test]
fn disconnected_regions_yield_empty_path() {
    let grid = grid_from(&["#######", "#..#..#", "#..#..#", "#######"]);
    let path = find_path(grid.view(), Position::new(1, 1), Position::new(5, 2));
    assert!(path.is_empty());
}

#[test]
fn path_detours_around_walls() {
    let grid = grid_from(&[
        "#######", //
        "#.....#", //
        "#.###.#", //
        "#.#@#.#", //
        "#.#.#.#", //
        "#.....#", //
        "#######",
    ]);
    let start = Position::new(3, 2);
    let goal = Position::new(3, 3);

    let path = find_path(grid.view(), Position::new(1, 5), Position::new(5, 5));
    assert_eq!(path.len(), 5);

    let around = find_path(grid.view(), start, goal);
    assert_eq!(around, vec![start, goal]);
}

#[test]
fn path_ends_on_avatar_and_skips_objectives() {
    let grid = grid_from(&["#####", "#.+@#", "#...#", "#####"]);
    let start = Position::new(1, 2);
    let goal = Position::new(3, 2);

    let path = find_path(grid.view(), start, goal);

    assert_eq!(path.len(), 5);
    assert!(!path.contains(&Position::new(2, 2)));
    assert_eq!(path.last(), Some(&goal));
}

#[test]
fn start_cell_may_hold_an_adversary() {
    let grid = grid_from(&["#####", "#X..#", "#####"]);
    let path = find_path(grid.view(), Position::new(1, 1), Position::new(3, 1));
    assert_eq!(
        path,
        vec![Position::new(1, 1), Position::new(2, 1), Position::new(3, 1)]
    );
}

#[test]
fn ties_resolve_identically_between_runs() {
    let grid = grid_from(&["######", "#....#", "#....#", "#....#", "######"]);
    let start = Position::new(1, 1);
    let goal = Position::new(4, 3);

    let first = find_path(grid.view(), start, goal);
    let second = find_path(grid.view(), start, goal);

    assert_eq!(first.len(), 6);
    assert_eq!(first, second);
}
