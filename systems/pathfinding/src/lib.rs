#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Stateless grid search shared by the agents and the map generator.
//!
//! [`find_path`] runs A* with the Manhattan heuristic over 4-connected
//! unit-cost moves. [`DistanceField`] runs a breadth-first flood fill. Neither
//! touches anything outside the grid it is given.

use std::{cmp::Reverse, collections::BinaryHeap};

use gridpath_core::{Cell, Direction, Grid, Position};

mod field;

pub use field::{flood_fill, DistanceField};

/// Ordered sequence of positions produced by a search.
pub type Path = Vec<Position>;

/// Finds a shortest 4-connected path from `start` to `goal`.
///
/// Only in-bounds cells accepted by `is_walkable` are entered; the start cell
/// itself is never tested. Neighbours are expanded up, down, left, right and
/// frontier ties on `f = g + h` resolve in insertion order, so identical
/// inputs always produce the identical path. A node is relaxed only when a
/// strictly cheaper `g` is found.
///
/// With `include_start` the returned path begins at `start`; without it the
/// path begins with the first step. Returns `None` when `goal` is unreachable.
#[must_use]
pub fn find_path<F>(
    grid: &Grid,
    mut is_walkable: F,
    start: Position,
    goal: Position,
    include_start: bool,
) -> Option<Path>
where
    F: FnMut(Cell) -> bool,
{
    let rows = grid.rows();
    let columns = grid.columns();
    if !grid.contains(start) || !grid.contains(goal) {
        return None;
    }

    let cell_count = usize::try_from(grid.area()).ok()?;
    let mut g_score = vec![u32::MAX; cell_count];
    let mut came_from: Vec<Option<Position>> = vec![None; cell_count];
    let mut open = BinaryHeap::new();
    let mut sequence: u64 = 0;

    g_score[dense_index(columns, start)?] = 0;
    open.push(Reverse((start.manhattan_distance(goal), sequence, 0_u32, start)));

    while let Some(Reverse((_, _, g, current))) = open.pop() {
        if current == goal {
            return Some(reconstruct(&came_from, columns, start, goal, include_start));
        }

        let current_index = dense_index(columns, current)?;
        if g > g_score[current_index] {
            continue;
        }

        let tentative = g.saturating_add(1);
        for neighbor in neighbors(current, rows, columns) {
            let walkable = grid.get(neighbor).map_or(false, &mut is_walkable);
            if !walkable {
                continue;
            }

            let Some(neighbor_index) = dense_index(columns, neighbor) else {
                continue;
            };
            if tentative >= g_score[neighbor_index] {
                continue;
            }

            g_score[neighbor_index] = tentative;
            came_from[neighbor_index] = Some(current);
            sequence += 1;
            let f = tentative.saturating_add(neighbor.manhattan_distance(goal));
            open.push(Reverse((f, sequence, tentative, neighbor)));
        }
    }

    None
}

fn reconstruct(
    came_from: &[Option<Position>],
    columns: u32,
    start: Position,
    goal: Position,
    include_start: bool,
) -> Path {
    let mut path = vec![goal];
    let mut current = goal;

    while current != start {
        let Some(previous) = dense_index(columns, current).and_then(|index| came_from[index])
        else {
            break;
        };
        path.push(previous);
        current = previous;
    }

    path.reverse();
    if !include_start && path.first() == Some(&start) {
        let _ = path.remove(0);
    }
    path
}

/// In-bounds orthogonal neighbours in up, down, left, right order.
pub(crate) fn neighbors(
    position: Position,
    rows: u32,
    columns: u32,
) -> impl Iterator<Item = Position> {
    Direction::SCAN_ORDER.into_iter().filter_map(move |direction| {
        position
            .step(direction)
            .filter(|next| next.row() < rows && next.column() < columns)
    })
}

pub(crate) fn dense_index(columns: u32, position: Position) -> Option<usize> {
    let row = usize::try_from(position.row()).ok()?;
    let column = usize::try_from(position.column()).ok()?;
    let width = usize::try_from(columns).ok()?;
    row.checked_mul(width)?.checked_add(column)
}
