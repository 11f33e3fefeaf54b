use gridpath_core::{
    Agent, AgentMode, ControlSignal, Decision, Direction, Finish, SimulationView,
};
use gridpath_world::{Controller, Frontend, Gate, StepReport};
use log::{debug, info};

use crate::{PolicyError, QLearningConfig, QPolicy, QTable, RewardShaping, StateKey, VisitedMemory};

/// Outcome of a single training episode.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EpisodeSummary {
    /// One-based episode number.
    pub episode: u32,
    /// Sum of the rewards collected.
    pub total_reward: f64,
    /// Steps taken.
    pub steps: u32,
    /// Whether the episode ended on the exit.
    pub reached_exit: bool,
    /// Exploration rate after the episode's decay.
    pub epsilon: f64,
}

/// Summary of a training session.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TrainingReport {
    /// Completed episodes in order.
    pub episodes: Vec<EpisodeSummary>,
    /// Control signal that cut training short, if any.
    pub interrupted: Option<ControlSignal>,
}

impl TrainingReport {
    /// Number of episodes that reached the exit.
    #[must_use]
    pub fn successes(&self) -> usize {
        self.episodes
            .iter()
            .filter(|summary| summary.reached_exit)
            .count()
    }
}

/// Runs training episodes through a controller.
#[derive(Clone, Debug)]
pub struct Trainer {
    policy: QPolicy,
    rewards: RewardShaping,
    memory: VisitedMemory,
    episodes: u32,
    steps_per_episode: u32,
}

impl Trainer {
    /// Creates a trainer starting from an empty table.
    #[must_use]
    pub fn new(config: &QLearningConfig, rewards: RewardShaping) -> Self {
        Self::with_policy(QPolicy::new(config), config, rewards)
    }

    /// Creates a trainer that refines an existing policy.
    #[must_use]
    pub fn with_policy(policy: QPolicy, config: &QLearningConfig, rewards: RewardShaping) -> Self {
        Self {
            policy,
            rewards,
            memory: config.visited_memory,
            episodes: config.episodes,
            steps_per_episode: config.steps_per_episode,
        }
    }

    /// Policy learned so far.
    #[must_use]
    pub const fn policy(&self) -> &QPolicy {
        &self.policy
    }

    /// Releases the learned table.
    #[must_use]
    pub fn into_table(self) -> QTable {
        self.policy.into_table()
    }

    /// Trains for the configured number of episodes.
    ///
    /// Each episode restarts from the start cell with a fresh visited set and
    /// ends on the exit or when the step budget runs out. Pause and interrupt
    /// commands are honoured between steps; an interrupt ends training and
    /// the interrupted episode is not recorded.
    pub fn train<F>(
        &mut self,
        controller: &mut Controller,
        frontend: &mut F,
    ) -> Result<TrainingReport, PolicyError>
    where
        F: Frontend + ?Sized,
    {
        let mut report = TrainingReport::default();
        controller.begin_run(AgentMode::QLearningTraining);

        for episode in 1..=self.episodes {
            controller.reset_episode();
            controller.present(frontend);

            let Some((total_reward, steps, reached_exit)) =
                self.run_episode(controller, frontend, &mut report)?
            else {
                break;
            };

            self.policy.decay();
            report.episodes.push(EpisodeSummary {
                episode,
                total_reward,
                steps,
                reached_exit,
                epsilon: self.policy.epsilon(),
            });

            if episode % 10 == 0 {
                info!(
                    "episode {episode}/{} - reward {total_reward:.2} - epsilon {:.3}",
                    self.episodes,
                    self.policy.epsilon()
                );
            }
        }

        info!(
            "training finished: {} episodes, {} reached the exit, {} states learned",
            report.episodes.len(),
            report.successes(),
            self.policy.table().len()
        );
        Ok(report)
    }

    fn run_episode<F>(
        &mut self,
        controller: &mut Controller,
        frontend: &mut F,
        report: &mut TrainingReport,
    ) -> Result<Option<(f64, u32, bool)>, PolicyError>
    where
        F: Frontend + ?Sized,
    {
        let mut total_reward = 0.0;
        let mut steps = 0;
        let mut previous: Option<Direction> = None;

        while steps < self.steps_per_episode {
            match controller.gate()? {
                Gate::Open => {}
                Gate::Paused => {
                    controller.present(frontend);
                    continue;
                }
                Gate::Interrupted(signal) => {
                    info!("training interrupted: {signal:?}");
                    report.interrupted = Some(signal);
                    return Ok(None);
                }
            }

            let state = StateKey::observe(&controller.simulation().view(), self.memory);
            let action = self.policy.choose_action(&state);
            let outcome = controller.step_player(action)?;
            let reward = self.rewards.reward(&outcome, previous, action);
            let next_state = StateKey::observe(&controller.simulation().view(), self.memory);
            self.policy.update(&state, action, reward, &next_state);

            total_reward += reward;
            steps += 1;
            previous = Some(action);
            controller.present(frontend);

            if matches!(
                outcome,
                StepReport::Moved {
                    reached_exit: true,
                    ..
                }
            ) {
                return Ok(Some((total_reward, steps, true)));
            }
        }

        Ok(Some((total_reward, steps, false)))
    }
}

/// Agent replaying a trained table with exploration switched off.
#[derive(Clone, Debug)]
pub struct TrainedAgent {
    policy: QPolicy,
    memory: VisitedMemory,
    step_budget: u32,
    steps: u32,
}

impl TrainedAgent {
    /// Wraps a trained table.
    #[must_use]
    pub fn new(table: QTable, config: &QLearningConfig) -> Self {
        Self {
            policy: QPolicy::with_table(table, config).exploit_only(),
            memory: config.visited_memory,
            step_budget: config.steps_per_episode,
            steps: 0,
        }
    }

    /// Loads the table persisted at the configured path.
    ///
    /// Fails with [`PolicyError::PolicyNotTrained`] when no table exists yet.
    pub fn load(config: &QLearningConfig) -> Result<Self, PolicyError> {
        let table = QTable::load(&config.table_path)?;
        Ok(Self::new(table, config))
    }

    /// Steps taken in the current run.
    #[must_use]
    pub const fn steps(&self) -> u32 {
        self.steps
    }
}

impl Agent for TrainedAgent {
    fn mode(&self) -> AgentMode {
        AgentMode::QLearningEvaluation
    }

    fn begin(&mut self, _view: &SimulationView<'_>) {
        self.steps = 0;
    }

    fn next_move(&mut self, view: &SimulationView<'_>) -> Decision {
        if view.player() == view.exit() {
            return Decision::Finish(Finish::ReachedExit);
        }
        if self.steps >= self.step_budget {
            return Decision::Finish(Finish::BudgetExhausted);
        }

        self.steps += 1;
        let state = StateKey::observe(view, self.memory);
        let action = self.policy.choose_action(&state);
        debug!("step {} from {}: {action:?}", self.steps, view.player());
        Decision::Step(action)
    }
}
