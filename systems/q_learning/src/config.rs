use std::path::PathBuf;

use gridpath_core::Direction;
use gridpath_world::StepReport;
use serde::Deserialize;

/// Hyperparameters for tabular Q-learning.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct QLearningConfig {
    /// Step size α of the value update.
    pub learning_rate: f64,
    /// Discount factor γ applied to the best next-state value.
    pub discount_factor: f64,
    /// Exploration rate ε at the start of training.
    pub epsilon: f64,
    /// Amount subtracted from ε after every completed episode.
    pub epsilon_decay: f64,
    /// Floor below which ε never decays.
    pub min_epsilon: f64,
    /// Number of training episodes.
    pub episodes: u32,
    /// Step budget of a single episode, in training and evaluation alike.
    pub steps_per_episode: u32,
    /// Seed for exploration and tie-breaking; unset means `0` here and an
    /// entropy seed in the command line.
    pub seed: Option<u64>,
    /// Location of the persisted table.
    pub table_path: PathBuf,
    /// How much of the visited set enters the state key.
    pub visited_memory: VisitedMemory,
}

impl Default for QLearningConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            discount_factor: 0.99,
            epsilon: 1.0,
            epsilon_decay: 0.001,
            min_epsilon: 0.01,
            episodes: 1_000,
            steps_per_episode: 2_000,
            seed: None,
            table_path: PathBuf::from("data/q_table.bin"),
            visited_memory: VisitedMemory::Full,
        }
    }
}

/// Portion of the visited set folded into a state key.
///
/// With [`VisitedMemory::Full`] the number of distinct states grows with the
/// power set of the walkable cells, which keeps training practical only on
/// small grids. [`VisitedMemory::Recent`] bounds the key to the most recently
/// discovered cells.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisitedMemory {
    /// Every visited cell.
    #[default]
    Full,
    /// Only the given number of most recently discovered cells.
    Recent(usize),
}

/// Rewards handed to the learner after every step.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct RewardShaping {
    /// Reward for bumping into a wall or the grid edge.
    pub wall: f64,
    /// Reward for stepping onto the exit.
    pub exit: f64,
    /// Reward for stepping onto an already visited cell.
    pub revisit: f64,
    /// Reward for stepping onto a cell for the first time.
    pub new_cell: f64,
    /// Optional bias toward straight-line movement.
    pub continuity: Option<ContinuityBonus>,
}

impl Default for RewardShaping {
    fn default() -> Self {
        Self {
            wall: -5.0,
            exit: 10.0,
            revisit: -0.2,
            new_cell: 1.0,
            continuity: None,
        }
    }
}

/// Extra reward depending on whether the action repeats the previous one.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ContinuityBonus {
    /// Added when the action repeats the previous action.
    pub straight: f64,
    /// Added when the action differs from the previous action.
    pub turn: f64,
}

impl Default for ContinuityBonus {
    fn default() -> Self {
        Self {
            straight: 0.05,
            turn: -0.1,
        }
    }
}

impl RewardShaping {
    /// Reward for taking `action` with outcome `report`.
    ///
    /// `previous` is the action of the preceding step in the same episode.
    #[must_use]
    pub fn reward(&self, report: &StepReport, previous: Option<Direction>, action: Direction) -> f64 {
        let base = match report {
            StepReport::Blocked => self.wall,
            StepReport::Moved {
                reached_exit: true, ..
            } => self.exit,
            StepReport::Moved {
                first_visit: false, ..
            } => self.revisit,
            StepReport::Moved { .. } => self.new_cell,
        };

        let continuity = match (self.continuity, previous) {
            (Some(bonus), Some(previous)) if previous == action => bonus.straight,
            (Some(bonus), Some(_)) => bonus.turn,
            _ => 0.0,
        };

        base + continuity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridpath_core::Position;

    fn moved(first_visit: bool, reached_exit: bool) -> StepReport {
        StepReport::Moved {
            from: Position::new(0, 0),
            to: Position::new(0, 1),
            first_visit,
            reached_exit,
        }
    }

    #[test]
    fn base_rewards_follow_the_step_outcome() {
        let shaping = RewardShaping::default();

        assert_eq!(shaping.reward(&StepReport::Blocked, None, Direction::North), -5.0);
        assert_eq!(shaping.reward(&moved(true, true), None, Direction::East), 10.0);
        assert_eq!(shaping.reward(&moved(false, true), None, Direction::East), 10.0);
        assert_eq!(shaping.reward(&moved(false, false), None, Direction::East), -0.2);
        assert_eq!(shaping.reward(&moved(true, false), None, Direction::East), 1.0);
    }

    #[test]
    fn continuity_bonus_rewards_straight_lines() {
        let shaping = RewardShaping {
            continuity: Some(ContinuityBonus::default()),
            ..RewardShaping::default()
        };

        let straight = shaping.reward(&moved(true, false), Some(Direction::East), Direction::East);
        let turn = shaping.reward(&moved(true, false), Some(Direction::South), Direction::East);
        let first = shaping.reward(&moved(true, false), None, Direction::East);

        assert!((straight - 1.05).abs() < 1e-9);
        assert!((turn - 0.9).abs() < 1e-9);
        assert_eq!(first, 1.0);
    }
}
