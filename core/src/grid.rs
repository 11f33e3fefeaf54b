//! Fixed-size rectangular cell store with bounds-checked access.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Cell, Position, Walkability};

/// Failures raised by [`Grid`] construction and coordinate access.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum GridError {
    /// Either dimension was zero.
    #[error("grid dimensions must be positive, got {rows}x{columns}")]
    InvalidDimensions {
        /// Requested number of rows.
        rows: u32,
        /// Requested number of columns.
        columns: u32,
    },
    /// A coordinate fell outside `[0, rows) x [0, columns)`.
    #[error("position {position} is outside the {rows}x{columns} grid")]
    OutOfBounds {
        /// Offending coordinate.
        position: Position,
        /// Number of rows in the grid.
        rows: u32,
        /// Number of columns in the grid.
        columns: u32,
    },
    /// A row supplied to [`Grid::from_rows`] did not match the first row's width.
    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        /// Zero-based index of the mismatched row.
        row: u32,
        /// Width established by the first row.
        expected: u32,
        /// Width of the mismatched row.
        found: u32,
    },
    /// Decoded cell storage did not match the decoded dimensions.
    #[error("expected {expected} cells, found {found}")]
    CellCount {
        /// `rows * columns`.
        expected: u64,
        /// Number of cells supplied.
        found: u64,
    },
}

/// Dense row-major grid of [`Cell`] tags.
///
/// Dimensions are fixed at construction. Every read and write is range
/// checked and fails with [`GridError::OutOfBounds`] instead of clamping.
/// The grid does not police how many player or exit markers it holds; that
/// is the simulation's job.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "GridRecord")]
pub struct Grid {
    rows: u32,
    columns: u32,
    cells: Vec<Cell>,
}

/// Unchecked wire form of a [`Grid`], validated on conversion.
#[derive(Deserialize)]
struct GridRecord {
    rows: u32,
    columns: u32,
    cells: Vec<Cell>,
}

impl TryFrom<GridRecord> for Grid {
    type Error = GridError;

    fn try_from(record: GridRecord) -> Result<Self, Self::Error> {
        let GridRecord {
            rows,
            columns,
            cells,
        } = record;
        if rows == 0 || columns == 0 {
            return Err(GridError::InvalidDimensions { rows, columns });
        }

        let expected = u64::from(rows) * u64::from(columns);
        let found = u64::try_from(cells.len()).unwrap_or(u64::MAX);
        if found != expected {
            return Err(GridError::CellCount { expected, found });
        }

        Ok(Self {
            rows,
            columns,
            cells,
        })
    }
}

impl Grid {
    /// Creates a grid with every cell set to `fill`.
    pub fn new(rows: u32, columns: u32, fill: Cell) -> Result<Self, GridError> {
        if rows == 0 || columns == 0 {
            return Err(GridError::InvalidDimensions { rows, columns });
        }

        let count = usize::try_from(u64::from(rows) * u64::from(columns))
            .map_err(|_| GridError::InvalidDimensions { rows, columns })?;

        Ok(Self {
            rows,
            columns,
            cells: vec![fill; count],
        })
    }

    /// Builds a grid from explicit rows of cells.
    ///
    /// All rows must share the width of the first row.
    pub fn from_rows(rows: Vec<Vec<Cell>>) -> Result<Self, GridError> {
        let height = u32::try_from(rows.len()).unwrap_or(u32::MAX);
        let width = rows
            .first()
            .map_or(0, |row| u32::try_from(row.len()).unwrap_or(u32::MAX));

        if height == 0 || width == 0 {
            return Err(GridError::InvalidDimensions {
                rows: height,
                columns: width,
            });
        }

        let mut cells = Vec::with_capacity(rows.len() * rows[0].len());
        for (index, row) in rows.into_iter().enumerate() {
            let found = u32::try_from(row.len()).unwrap_or(u32::MAX);
            if found != width {
                return Err(GridError::RaggedRow {
                    row: u32::try_from(index).unwrap_or(u32::MAX),
                    expected: width,
                    found,
                });
            }
            cells.extend(row);
        }

        Ok(Self {
            rows: height,
            columns: width,
            cells,
        })
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Total number of cells.
    #[must_use]
    pub fn area(&self) -> u64 {
        u64::from(self.rows) * u64::from(self.columns)
    }

    /// Reports whether the position lies inside the grid.
    #[must_use]
    pub const fn contains(&self, position: Position) -> bool {
        position.row() < self.rows && position.column() < self.columns
    }

    /// Reads the cell stored at `position`.
    pub fn get(&self, position: Position) -> Result<Cell, GridError> {
        self.index(position)
            .and_then(|index| self.cells.get(index).copied())
            .ok_or_else(|| self.out_of_bounds(position))
    }

    /// Overwrites the cell stored at `position`.
    pub fn set(&mut self, position: Position, cell: Cell) -> Result<(), GridError> {
        let error = self.out_of_bounds(position);
        let slot = self
            .index(position)
            .and_then(|index| self.cells.get_mut(index))
            .ok_or(error)?;
        *slot = cell;
        Ok(())
    }

    /// First position in row-major order holding `cell`.
    #[must_use]
    pub fn find_first(&self, cell: Cell) -> Option<Position> {
        self.iter()
            .find(|(_, candidate)| *candidate == cell)
            .map(|(position, _)| position)
    }

    /// Number of cells holding `cell`.
    #[must_use]
    pub fn count(&self, cell: Cell) -> usize {
        self.cells.iter().filter(|candidate| **candidate == cell).count()
    }

    /// Reports whether `position` is inside the grid and permitted by `walkability`.
    #[must_use]
    pub fn is_walkable(&self, position: Position, walkability: Walkability) -> bool {
        self.get(position)
            .map_or(false, |cell| walkability.permits(cell))
    }

    /// Iterates every position and its cell in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (Position, Cell)> + '_ {
        let columns = self.columns;
        self.cells.iter().enumerate().map(move |(index, cell)| {
            let index = u32::try_from(index).unwrap_or(u32::MAX);
            (Position::new(index / columns, index % columns), *cell)
        })
    }

    /// Iterates the rows of the grid from top to bottom.
    pub fn row_slices(&self) -> impl Iterator<Item = &[Cell]> + '_ {
        let width = usize::try_from(self.columns).unwrap_or(usize::MAX);
        self.cells.chunks(width)
    }

    fn index(&self, position: Position) -> Option<usize> {
        if !self.contains(position) {
            return None;
        }

        let row = usize::try_from(position.row()).ok()?;
        let column = usize::try_from(position.column()).ok()?;
        let width = usize::try_from(self.columns).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }

    fn out_of_bounds(&self, position: Position) -> GridError {
        GridError::OutOfBounds {
            position,
            rows: self.rows,
            columns: self.columns,
        }
    }
}
