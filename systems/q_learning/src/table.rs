use std::{
    collections::HashMap,
    fs::{self, File},
    io::{BufReader, BufWriter, ErrorKind},
    path::Path,
};

use gridpath_core::{Direction, Position, SimulationView};
use log::info;
use serde::{Deserialize, Serialize};

use crate::{PolicyError, VisitedMemory};

/// Learner state: the player position together with the visited cells.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StateKey {
    position: Position,
    visited: Vec<Position>,
}

impl StateKey {
    /// Creates a key; the visited cells are stored sorted and deduplicated.
    #[must_use]
    pub fn new(position: Position, visited: impl IntoIterator<Item = Position>) -> Self {
        let mut visited: Vec<Position> = visited.into_iter().collect();
        visited.sort_unstable();
        visited.dedup();
        Self { position, visited }
    }

    /// Captures the state of a run as seen through `view`.
    #[must_use]
    pub fn observe(view: &SimulationView<'_>, memory: VisitedMemory) -> Self {
        let visited = view.visited();
        match memory {
            VisitedMemory::Full => Self::new(view.player(), visited.iter().copied()),
            VisitedMemory::Recent(limit) => {
                Self::new(view.player(), visited.iter().rev().take(limit).copied())
            }
        }
    }

    /// Player position.
    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Visited cells in ascending order.
    #[must_use]
    pub fn visited(&self) -> &[Position] {
        &self.visited
    }
}

#[derive(Serialize, Deserialize)]
struct TableEntry {
    state: StateKey,
    action: Direction,
    value: f64,
}

/// Action values per state; unseen pairs are worth zero.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QTable {
    values: HashMap<StateKey, [f64; 4]>,
}

impl QTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of states with stored values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Reports whether nothing has been learned yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Values of every action in `state`, ordered like [`Direction::ALL`].
    #[must_use]
    pub fn values(&self, state: &StateKey) -> [f64; 4] {
        self.values.get(state).copied().unwrap_or([0.0; 4])
    }

    /// Value of `action` in `state`.
    #[must_use]
    pub fn value(&self, state: &StateKey, action: Direction) -> f64 {
        self.values(state)[action_index(action)]
    }

    /// Highest action value in `state`.
    #[must_use]
    pub fn max_value(&self, state: &StateKey) -> f64 {
        self.values(state)
            .into_iter()
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Stores the value of `action` in `state`.
    pub fn set(&mut self, state: &StateKey, action: Direction, value: f64) {
        let index = action_index(action);
        if let Some(values) = self.values.get_mut(state) {
            values[index] = value;
            return;
        }

        let mut values = [0.0; 4];
        values[index] = value;
        let _ = self.values.insert(state.clone(), values);
    }

    /// Writes the table to `path`, creating missing parent directories.
    ///
    /// Entries are written sorted by state and action so identical tables
    /// produce identical files.
    pub fn save(&self, path: &Path) -> Result<(), PolicyError> {
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut states: Vec<(&StateKey, &[f64; 4])> = self.values.iter().collect();
        states.sort_unstable_by(|left, right| left.0.cmp(right.0));
        let entries: Vec<TableEntry> = states
            .into_iter()
            .flat_map(|(state, values)| {
                Direction::ALL
                    .into_iter()
                    .zip(values.iter().copied())
                    .map(move |(action, value)| TableEntry {
                        state: state.clone(),
                        action,
                        value,
                    })
            })
            .collect();

        let writer = BufWriter::new(File::create(path)?);
        bincode::serialize_into(writer, &entries)?;
        info!("saved {} states to {}", self.len(), path.display());
        Ok(())
    }

    /// Reads a table written by [`QTable::save`].
    ///
    /// A missing file yields [`PolicyError::PolicyNotTrained`].
    pub fn load(path: &Path) -> Result<Self, PolicyError> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(error) if error.kind() == ErrorKind::NotFound => {
                return Err(PolicyError::PolicyNotTrained {
                    path: path.to_path_buf(),
                })
            }
            Err(error) => return Err(error.into()),
        };

        let entries: Vec<TableEntry> = bincode::deserialize_from(BufReader::new(file))?;
        let mut table = Self::new();
        for entry in entries {
            table.set(&entry.state, entry.action, entry.value);
        }
        info!("loaded {} states from {}", table.len(), path.display());
        Ok(table)
    }
}

const fn action_index(action: Direction) -> usize {
    match action {
        Direction::North => 0,
        Direction::East => 1,
        Direction::South => 2,
        Direction::West => 3,
    }
}
