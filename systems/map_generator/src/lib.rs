#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Generator for maps that are always solvable.
//!
//! Generation runs three phases in a single pass:
//!
//! 1. Carve: pick a start in the top-left quadrant and an exit in the
//!    bottom-right quadrant, then open the A* route between them on an
//!    all-wall grid.
//! 2. Sparsify: open every other cell independently with probability
//!    `1 - wall_density`.
//! 3. Prune: place the player and exit markers, flood fill from the start and
//!    turn every unreached cell back into a wall.
//!
//! Every open cell of the result is reachable from the player, so no attempt
//! is ever rejected or retried.

use std::collections::HashSet;

use gridpath_core::{Cell, Grid, GridError, Position};
use gridpath_system_pathfinding::{find_path, flood_fill};
use log::info;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Deserialize;
use thiserror::Error;

/// Size and density of generated maps.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Number of rows.
    pub rows: u32,
    /// Number of columns.
    pub columns: u32,
    /// Probability that a cell off the carved route stays a wall.
    pub wall_density: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            rows: 15,
            columns: 25,
            wall_density: 0.35,
        }
    }
}

/// Failures raised while configuring or running the generator.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum GeneratorError {
    /// The grid cannot hold a distinct start and exit.
    #[error("a {rows}x{columns} grid cannot hold separate start and exit cells")]
    GridTooSmall {
        /// Requested rows.
        rows: u32,
        /// Requested columns.
        columns: u32,
    },
    /// The wall density lies outside `[0, 1]`.
    #[error("wall density {0} is outside [0, 1]")]
    InvalidWallDensity(f64),
    /// Building the grid failed.
    #[error(transparent)]
    Grid(#[from] GridError),
}

/// Seeded map generator.
#[derive(Clone, Debug)]
pub struct MapGenerator {
    config: GeneratorConfig,
    rng: ChaCha8Rng,
}

impl MapGenerator {
    /// Validates `config` and seeds the generator.
    pub fn new(config: GeneratorConfig, seed: u64) -> Result<Self, GeneratorError> {
        if !(0.0..=1.0).contains(&config.wall_density) {
            return Err(GeneratorError::InvalidWallDensity(config.wall_density));
        }
        if config.rows == 0 || config.columns == 0 {
            return Err(GridError::InvalidDimensions {
                rows: config.rows,
                columns: config.columns,
            }
            .into());
        }
        if u64::from(config.rows) * u64::from(config.columns) < 2 {
            return Err(GeneratorError::GridTooSmall {
                rows: config.rows,
                columns: config.columns,
            });
        }

        Ok(Self {
            config,
            rng: ChaCha8Rng::seed_from_u64(seed),
        })
    }

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Produces a new map with exactly one player and one exit.
    pub fn generate(&mut self) -> Result<Grid, GeneratorError> {
        let rows = self.config.rows;
        let columns = self.config.columns;

        let start = Position::new(
            self.rng.gen_range(0..=rows / 4),
            self.rng.gen_range(0..=columns / 4),
        );
        let exit = Position::new(
            self.rng.gen_range(rows * 3 / 4..rows),
            self.rng.gen_range(columns * 3 / 4..columns),
        );

        let open = Grid::new(rows, columns, Cell::Floor)?;
        let route = find_path(&open, |_| true, start, exit, true).unwrap_or_default();

        let mut grid = Grid::new(rows, columns, Cell::Wall)?;
        let carved: HashSet<Position> = route.iter().copied().collect();
        for &position in &carved {
            grid.set(position, Cell::Floor)?;
        }

        for row in 0..rows {
            for column in 0..columns {
                let position = Position::new(row, column);
                if carved.contains(&position) {
                    continue;
                }
                if self.rng.gen::<f64>() > self.config.wall_density {
                    grid.set(position, Cell::Floor)?;
                }
            }
        }

        grid.set(start, Cell::Player)?;
        grid.set(exit, Cell::Exit)?;

        let reachable = flood_fill(&grid, start, |cell| cell != Cell::Wall);
        let mut pruned = 0;
        for row in 0..rows {
            for column in 0..columns {
                let position = Position::new(row, column);
                if !reachable.is_reachable(position) && grid.get(position)? != Cell::Wall {
                    grid.set(position, Cell::Wall)?;
                    pruned += 1;
                }
            }
        }

        info!(
            "generated {rows}x{columns} map: start {start}, exit {exit}, route {} cells, {} open, {pruned} pruned",
            carved.len(),
            reachable.reachable_count()
        );
        Ok(grid)
    }
}
