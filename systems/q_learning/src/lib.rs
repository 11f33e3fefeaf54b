#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Tabular Q-learning over the grid simulation.
//!
//! The learner's state is the player position together with the set of cells
//! visited so far in the episode, and its actions are the four compass
//! directions in [`Direction::ALL`](gridpath_core::Direction::ALL) order.
//! [`Trainer`] runs episodes through a [`Controller`](gridpath_world::Controller)
//! and [`TrainedAgent`] replays the learned table greedily.
//!
//! Keying states by the full visited set makes the state space grow with the
//! power set of the walkable cells. Training is therefore only practical on
//! small grids unless [`VisitedMemory::Recent`] bounds the key.

use std::path::PathBuf;

use gridpath_world::WorldError;
use thiserror::Error;

mod config;
mod policy;
mod table;
mod trainer;

pub use config::{ContinuityBonus, QLearningConfig, RewardShaping, VisitedMemory};
pub use policy::QPolicy;
pub use table::{QTable, StateKey};
pub use trainer::{EpisodeSummary, TrainedAgent, Trainer, TrainingReport};

/// Failures raised while training, persisting or loading a policy.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// Evaluation was requested before any table was saved.
    #[error("no trained policy found at {}; train one first", path.display())]
    PolicyNotTrained {
        /// Location that was searched.
        path: PathBuf,
    },
    /// Reading or writing the table file failed.
    #[error("policy table I/O failed: {0}")]
    Io(#[from] std::io::Error),
    /// The table file could not be encoded or decoded.
    #[error("policy table is corrupt: {0}")]
    Codec(#[from] bincode::Error),
    /// The simulation rejected an operation.
    #[error(transparent)]
    World(#[from] WorldError),
}
