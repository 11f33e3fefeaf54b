//! Plain-text map format: one row per line, whitespace-separated symbols.

use gridpath_core::{Cell, Grid};
use log::{info, warn};

use crate::{locate_markers, WorldError};

/// Parses the map text format into a grid.
///
/// Trailing blank lines are ignored. Every remaining line must contain the
/// same number of single-character symbols drawn from `. X P E V`. Marker
/// uniqueness is not checked here; see [`ActiveMap`].
pub fn parse_map(text: &str) -> Result<Grid, WorldError> {
    let lines: Vec<&str> = text.lines().map(str::trim_end).collect();
    let used = lines
        .iter()
        .rposition(|line| !line.is_empty())
        .map_or(0, |last| last + 1);

    if used == 0 {
        return Err(WorldError::MalformedMap {
            line: 0,
            reason: "map is empty".to_owned(),
        });
    }

    let mut rows: Vec<Vec<Cell>> = Vec::with_capacity(used);
    for (index, line) in lines[..used].iter().enumerate() {
        let number = index + 1;
        let row = line
            .split_whitespace()
            .map(|token| parse_symbol(token, number))
            .collect::<Result<Vec<_>, _>>()?;

        if row.is_empty() {
            return Err(WorldError::MalformedMap {
                line: number,
                reason: "row is empty".to_owned(),
            });
        }

        if let Some(first) = rows.first() {
            if first.len() != row.len() {
                return Err(WorldError::MalformedMap {
                    line: number,
                    reason: format!("expected {} columns, found {}", first.len(), row.len()),
                });
            }
        }

        rows.push(row);
    }

    Ok(Grid::from_rows(rows)?)
}

fn parse_symbol(token: &str, line: usize) -> Result<Cell, WorldError> {
    let mut chars = token.chars();
    match (chars.next(), chars.next()) {
        (Some(symbol), None) => Cell::from_symbol(symbol).ok_or_else(|| WorldError::MalformedMap {
            line,
            reason: format!("unknown symbol '{symbol}'"),
        }),
        _ => Err(WorldError::MalformedMap {
            line,
            reason: format!("'{token}' is not a single symbol"),
        }),
    }
}

/// Writes `grid` in the map text format accepted by [`parse_map`].
#[must_use]
pub fn render_map(grid: &Grid) -> String {
    let mut text = String::new();
    for row in grid.row_slices() {
        let symbols: Vec<String> = row.iter().map(|cell| cell.symbol().to_string()).collect();
        text.push_str(&symbols.join(" "));
        text.push('\n');
    }
    text
}

/// The playable map currently selected for new runs.
///
/// Loads are all-or-nothing: a rejected load leaves the previous map in place.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActiveMap {
    grid: Grid,
}

impl ActiveMap {
    /// Wraps a grid after checking it holds exactly one player and one exit.
    pub fn new(grid: Grid) -> Result<Self, WorldError> {
        let _ = locate_markers(&grid)?;
        Ok(Self { grid })
    }

    /// Grid new runs start from.
    #[must_use]
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Swaps in a new playable grid, keeping the current one on failure.
    pub fn replace(&mut self, grid: Grid) -> Result<(), WorldError> {
        let _ = locate_markers(&grid)?;
        self.grid = grid;
        Ok(())
    }

    /// Parses `text` and makes it the active map.
    ///
    /// On failure the error is logged and returned and the previous map stays
    /// active.
    pub fn load_str(&mut self, text: &str) -> Result<(), WorldError> {
        match parse_map(text).and_then(|grid| self.replace(grid)) {
            Ok(()) => {
                info!(
                    "loaded {}x{} map",
                    self.grid.rows(),
                    self.grid.columns()
                );
                Ok(())
            }
            Err(error) => {
                warn!("rejected map load: {error}");
                Err(error)
            }
        }
    }
}
