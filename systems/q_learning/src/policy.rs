use gridpath_core::Direction;
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::{QLearningConfig, QTable, StateKey};

/// Epsilon-greedy policy over a [`QTable`].
#[derive(Clone, Debug)]
pub struct QPolicy {
    table: QTable,
    rng: ChaCha8Rng,
    learning_rate: f64,
    discount_factor: f64,
    epsilon: f64,
    epsilon_decay: f64,
    min_epsilon: f64,
}

impl QPolicy {
    /// Creates a policy with an empty table.
    #[must_use]
    pub fn new(config: &QLearningConfig) -> Self {
        Self::with_table(QTable::new(), config)
    }

    /// Creates a policy that continues from an existing table.
    #[must_use]
    pub fn with_table(table: QTable, config: &QLearningConfig) -> Self {
        Self {
            table,
            rng: ChaCha8Rng::seed_from_u64(config.seed.unwrap_or_default()),
            learning_rate: config.learning_rate,
            discount_factor: config.discount_factor,
            epsilon: config.epsilon,
            epsilon_decay: config.epsilon_decay,
            min_epsilon: config.min_epsilon,
        }
    }

    /// Forces exploitation: ε becomes zero and stays there.
    #[must_use]
    pub fn exploit_only(mut self) -> Self {
        self.epsilon = 0.0;
        self.min_epsilon = 0.0;
        self
    }

    /// Current exploration rate.
    #[must_use]
    pub const fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Learned action values.
    #[must_use]
    pub const fn table(&self) -> &QTable {
        &self.table
    }

    /// Releases the learned action values.
    #[must_use]
    pub fn into_table(self) -> QTable {
        self.table
    }

    /// Picks an action for `state`.
    ///
    /// With probability ε the action is uniformly random. Otherwise it is the
    /// highest valued action, with ties broken uniformly at random.
    pub fn choose_action(&mut self, state: &StateKey) -> Direction {
        if self.rng.gen::<f64>() < self.epsilon {
            return Direction::ALL[self.rng.gen_range(0..Direction::ALL.len())];
        }

        let values = self.table.values(state);
        let best = values.into_iter().fold(f64::NEG_INFINITY, f64::max);
        let candidates: Vec<Direction> = Direction::ALL
            .into_iter()
            .zip(values)
            .filter(|(_, value)| *value == best)
            .map(|(action, _)| action)
            .collect();

        candidates
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(Direction::North)
    }

    /// One-step tabular update toward `reward + γ · max Q(next_state)`.
    pub fn update(&mut self, state: &StateKey, action: Direction, reward: f64, next_state: &StateKey) {
        let current = self.table.value(state, action);
        let target = reward + self.discount_factor * self.table.max_value(next_state);
        let updated = current + self.learning_rate * (target - current);
        self.table.set(state, action, updated);
    }

    /// Lowers ε by the configured decay without going below the floor.
    pub fn decay(&mut self) {
        self.epsilon = (self.epsilon - self.epsilon_decay).max(self.min_epsilon);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridpath_core::Position;

    fn state() -> StateKey {
        StateKey::new(Position::new(0, 0), [Position::new(0, 0)])
    }

    fn config() -> QLearningConfig {
        QLearningConfig {
            seed: Some(11),
            ..QLearningConfig::default()
        }
    }

    #[test]
    fn update_moves_toward_the_target() {
        let mut policy = QPolicy::new(&config());
        let next = StateKey::new(Position::new(0, 1), [Position::new(0, 0), Position::new(0, 1)]);
        policy.table.set(&next, Direction::South, 2.0);

        policy.update(&state(), Direction::East, 1.0, &next);

        let expected = 0.1 * (1.0 + 0.99 * 2.0);
        assert!((policy.table().value(&state(), Direction::East) - expected).abs() < 1e-12);
    }

    #[test]
    fn exploitation_picks_the_best_action() {
        let mut table = QTable::new();
        table.set(&state(), Direction::North, -1.0);
        table.set(&state(), Direction::East, 3.0);
        table.set(&state(), Direction::South, 0.5);
        let mut policy = QPolicy::with_table(table, &config()).exploit_only();

        for _ in 0..20 {
            assert_eq!(policy.choose_action(&state()), Direction::East);
        }
    }

    #[test]
    fn ties_are_broken_among_the_maximal_actions() {
        let mut table = QTable::new();
        table.set(&state(), Direction::North, -1.0);
        table.set(&state(), Direction::West, -1.0);
        let mut policy = QPolicy::with_table(table, &config()).exploit_only();

        let mut seen = Vec::new();
        for _ in 0..64 {
            let action = policy.choose_action(&state());
            assert!(matches!(action, Direction::East | Direction::South));
            if !seen.contains(&action) {
                seen.push(action);
            }
        }
        assert_eq!(seen.len(), 2);
    }

    #[test]
    fn decay_stops_at_the_floor() {
        let mut policy = QPolicy::new(&QLearningConfig {
            epsilon: 0.5,
            epsilon_decay: 0.2,
            min_epsilon: 0.05,
            ..config()
        });

        policy.decay();
        assert!((policy.epsilon() - 0.3).abs() < 1e-12);
        policy.decay();
        policy.decay();
        assert_eq!(policy.epsilon(), 0.05);
    }

    #[test]
    fn identical_seeds_explore_identically() {
        let mut first = QPolicy::new(&config());
        let mut second = QPolicy::new(&config());

        let first_actions: Vec<_> = (0..32).map(|_| first.choose_action(&state())).collect();
        let second_actions: Vec<_> = (0..32).map(|_| second.choose_action(&state())).collect();

        assert_eq!(first_actions, second_actions);
    }
}
