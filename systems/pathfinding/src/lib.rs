#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic A* search over the dungeon tile grid.
//!
//! Moves are cardinal with uniform cost and the heuristic is the Manhattan
//! distance. Among open nodes with equal `f` the one pushed first is expanded
//! first, and neighbours are expanded in [`Position::cardinal_neighbors`]
//! order, so identical grids always yield identical paths.

use std::{cmp::Reverse, collections::BinaryHeap};

use delve_core::{Position, TileView};

/// Finds a shortest cardinal path from `start` to `goal`.
///
/// The returned path includes both endpoints. It is empty when the goal is
/// unreachable or when either endpoint lies outside the grid. Only
/// [`delve_core::Tile::is_search_passable`] cells are entered; the start cell
/// itself may hold any tile.
#[must_use]
pub fn find_path(view: TileView<'_>, start: Position, goal: Position) -> Vec<Position> {
    let (columns, rows) = view.dimensions();
    let Some(start_index) = node_index(columns, rows, start) else {
        return Vec::new();
    };
    let Some(goal_index) = node_index(columns, rows, goal) else {
        return Vec::new();
    };

    let node_count_u64 = u64::from(columns) * u64::from(rows);
    let node_count = usize::try_from(node_count_u64).unwrap_or(0);
    let mut best_cost = vec![u32::MAX; node_count];
    let mut parent: Vec<Option<usize>> = vec![None; node_count];
    let mut closed = vec![false; node_count];
    let mut open = BinaryHeap::new();
    let mut sequence: u64 = 0;

    best_cost[start_index] = 0;
    open.push(Reverse((start.manhattan_distance(goal), sequence, start_index, start)));

    while let Some(Reverse((_, _, current_index, current))) = open.pop() {
        if closed[current_index] {
            continue;
        }
        if current_index == goal_index {
            return reconstruct(&parent, columns, goal_index);
        }
        closed[current_index] = true;

        let tentative = best_cost[current_index].saturating_add(1);
        for neighbor in current.cardinal_neighbors() {
            if !view.get(neighbor).is_some_and(|tile| tile.is_search_passable()) {
                continue;
            }
            let Some(neighbor_index) = node_index(columns, rows, neighbor) else {
                continue;
            };
            if closed[neighbor_index] || tentative >= best_cost[neighbor_index] {
                continue;
            }

            best_cost[neighbor_index] = tentative;
            parent[neighbor_index] = Some(current_index);
            sequence = sequence.saturating_add(1);
            let estimate = tentative.saturating_add(neighbor.manhattan_distance(goal));
            open.push(Reverse((estimate, sequence, neighbor_index, neighbor)));
        }
    }

    Vec::new()
}

fn reconstruct(parent: &[Option<usize>], columns: u32, goal_index: usize) -> Vec<Position> {
    let mut path = Vec::new();
    let mut cursor = Some(goal_index);
    while let Some(index) = cursor {
        path.push(position_of(columns, index));
        cursor = parent.get(index).copied().flatten();
    }
    path.reverse();
    path
}

fn node_index(columns: u32, rows: u32, position: Position) -> Option<usize> {
    let x = u32::try_from(position.x()).ok()?;
    let y = u32::try_from(position.y()).ok()?;
    if x >= columns || y >= rows {
        return None;
    }
    let row = usize::try_from(y).ok()?;
    let width = usize::try_from(columns).ok()?;
    let column = usize::try_from(x).ok()?;
    Some(row * width + column)
}

fn position_of(columns: u32, index: usize) -> Position {
    let width = usize::try_from(columns.max(1)).unwrap_or(1);
    let x = i32::try_from(index % width).unwrap_or(i32::MAX);
    let y = i32::try_from(index / width).unwrap_or(i32::MAX);
    Position::new(x, y)
}
