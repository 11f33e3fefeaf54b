//! Breadth-first distance field used for flood fills and reachability checks.

use std::collections::VecDeque;

use gridpath_core::{Cell, Grid, Position};

use crate::{dense_index, neighbors};

/// Dense breadth-first distance grid seeded from one or more cells.
///
/// The field mirrors the grid's dimensions and stores the number of steps
/// from the nearest seed. Cells the search never reached hold `u32::MAX`
/// so callers can distinguish walls and disconnected pockets from
/// traversable ground.
#[derive(Clone, Debug, Default)]
pub struct DistanceField {
    rows: u32,
    columns: u32,
    distances: Vec<u32>,
}

impl DistanceField {
    /// Builds the field with a breadth-first search from `seeds`.
    ///
    /// Seeds outside the grid or rejected by `is_walkable` are skipped.
    #[must_use]
    pub fn build<F>(grid: &Grid, seeds: &[Position], mut is_walkable: F) -> Self
    where
        F: FnMut(Cell) -> bool,
    {
        let rows = grid.rows();
        let columns = grid.columns();
        let cell_count = usize::try_from(grid.area()).unwrap_or(0);
        let mut field = Self {
            rows,
            columns,
            distances: vec![u32::MAX; cell_count],
        };

        let mut walkable = |position: Position| grid.get(position).map_or(false, &mut is_walkable);
        let mut queue = VecDeque::new();

        for &seed in seeds {
            if !walkable(seed) {
                continue;
            }

            let Some(index) = dense_index(columns, seed) else {
                continue;
            };
            if field.distances[index] == 0 {
                continue;
            }

            field.distances[index] = 0;
            queue.push_back(seed);
        }

        while let Some(position) = queue.pop_front() {
            let Some(current_index) = dense_index(columns, position) else {
                continue;
            };
            let next_distance = field.distances[current_index].saturating_add(1);

            for neighbor in neighbors(position, rows, columns) {
                if !walkable(neighbor) {
                    continue;
                }

                let Some(neighbor_index) = dense_index(columns, neighbor) else {
                    continue;
                };

                if field.distances[neighbor_index] <= next_distance {
                    continue;
                }

                field.distances[neighbor_index] = next_distance;
                queue.push_back(neighbor);
            }
        }

        field
    }

    /// Number of rows covered by the field.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Number of columns covered by the field.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Steps from the nearest seed, or `None` when unreachable or out of bounds.
    #[must_use]
    pub fn distance(&self, position: Position) -> Option<u32> {
        if position.row() >= self.rows || position.column() >= self.columns {
            return None;
        }

        dense_index(self.columns, position)
            .and_then(|index| self.distances.get(index).copied())
            .filter(|distance| *distance != u32::MAX)
    }

    /// Reports whether the search reached `position`.
    #[must_use]
    pub fn is_reachable(&self, position: Position) -> bool {
        self.distance(position).is_some()
    }

    /// Number of reached cells, seeds included.
    #[must_use]
    pub fn reachable_count(&self) -> usize {
        self.distances
            .iter()
            .filter(|distance| **distance != u32::MAX)
            .count()
    }
}

/// Flood fills from `seed` over cells accepted by `is_walkable`.
#[must_use]
pub fn flood_fill<F>(grid: &Grid, seed: Position, is_walkable: F) -> DistanceField
where
    F: FnMut(Cell) -> bool,
{
    DistanceField::build(grid, &[seed], is_walkable)
}
