//! Tick loop that drives an agent against a simulation.

use std::collections::VecDeque;

use gridpath_core::{
    Agent, AgentMode, ControlCommand, ControlSignal, Decision, Direction, Finish,
};
use log::{info, warn};

use crate::{Simulation, StepReport, WorldError};

/// Rendering and input collaborator consulted at every tick boundary.
///
/// Implementations may redraw, wait for the current step delay, and push any
/// commands the user issued since the previous call. While the simulation is
/// paused the controller keeps calling `present`, so an implementation that
/// never resumes a paused run keeps the run suspended.
pub trait Frontend {
    /// Presents the current state and collects pending user commands.
    fn present(&mut self, simulation: &Simulation, commands: &mut Vec<ControlCommand>);
}

/// Frontend that draws nothing and never issues commands.
#[derive(Clone, Copy, Debug, Default)]
pub struct Headless;

impl Frontend for Headless {
    fn present(&mut self, _simulation: &Simulation, _commands: &mut Vec<ControlCommand>) {}
}

/// Frontend that replays a fixed command script, one command per tick.
#[derive(Clone, Debug, Default)]
pub struct ScriptedFrontend {
    script: VecDeque<Option<ControlCommand>>,
    exhausted: Option<ControlCommand>,
    presented: u64,
}

impl ScriptedFrontend {
    /// Creates a frontend issuing `script[i]` at the `i`-th tick boundary.
    ///
    /// `None` entries let a tick pass without input.
    #[must_use]
    pub fn new(script: impl IntoIterator<Item = Option<ControlCommand>>) -> Self {
        Self {
            script: script.into_iter().collect(),
            exhausted: None,
            presented: 0,
        }
    }

    /// Issues `command` on every tick once the script runs out.
    #[must_use]
    pub fn then_repeat(mut self, command: ControlCommand) -> Self {
        self.exhausted = Some(command);
        self
    }

    /// Number of tick boundaries presented so far.
    #[must_use]
    pub const fn presented(&self) -> u64 {
        self.presented
    }
}

impl Frontend for ScriptedFrontend {
    fn present(&mut self, _simulation: &Simulation, commands: &mut Vec<ControlCommand>) {
        self.presented += 1;
        let next = match self.script.pop_front() {
            Some(entry) => entry,
            None => self.exhausted,
        };
        commands.extend(next);
    }
}

/// Whether the next tick may consult the agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Gate {
    /// The run may advance.
    Open,
    /// The run is paused; state is kept, nothing advances.
    Paused,
    /// The user raised a control signal; the run must unwind.
    Interrupted(ControlSignal),
}

/// Result of a single controller tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// The agent was consulted and its decision applied.
    Advanced(Option<StepReport>),
    /// The run is paused.
    Paused,
    /// The agent reported a terminal condition.
    Finished(Finish),
    /// A control signal pre-empted the agent.
    Interrupted(ControlSignal),
}

/// How a run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunEnding {
    /// The agent finished on its own.
    Finished(Finish),
    /// The user interrupted the run.
    Interrupted(ControlSignal),
}

/// Summary returned when a run unwinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunOutcome {
    /// Reason the run ended.
    pub ending: RunEnding,
    /// Ticks in which the agent was consulted, the finishing tick included.
    pub ticks: u64,
    /// Steps that actually moved the player, by the agent or by key press.
    pub moves: u64,
    /// Distinct positions visited.
    pub visited: usize,
}

/// Owns a simulation and advances it one agent decision per tick.
#[derive(Debug)]
pub struct Controller {
    simulation: Simulation,
    pending: VecDeque<ControlCommand>,
    ticks: u64,
    moves: u64,
}

impl Controller {
    /// Takes exclusive ownership of `simulation`.
    #[must_use]
    pub fn new(simulation: Simulation) -> Self {
        Self {
            simulation,
            pending: VecDeque::new(),
            ticks: 0,
            moves: 0,
        }
    }

    /// Read-only access to the owned simulation.
    #[must_use]
    pub const fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    /// Releases the owned simulation.
    #[must_use]
    pub fn into_simulation(self) -> Simulation {
        self.simulation
    }

    /// Queues a user command for the next tick boundary.
    pub fn submit(&mut self, command: ControlCommand) {
        self.pending.push_back(command);
    }

    /// Applies queued commands and reports whether the next tick may advance.
    ///
    /// Manual moves carried by the commands count towards the run's moves.
    pub fn gate(&mut self) -> Result<Gate, WorldError> {
        while let Some(command) = self.pending.pop_front() {
            let report = self.simulation.apply_command(command)?;
            self.record(report);
        }

        Ok(match (self.simulation.signal(), self.simulation.is_paused()) {
            (ControlSignal::Continue, false) => Gate::Open,
            (ControlSignal::Continue, true) => Gate::Paused,
            (signal, _) => Gate::Interrupted(signal),
        })
    }

    /// Runs one tick: honour control input, then apply one agent decision.
    pub fn tick(&mut self, agent: &mut dyn Agent) -> Result<TickOutcome, WorldError> {
        match self.gate()? {
            Gate::Interrupted(signal) => return Ok(TickOutcome::Interrupted(signal)),
            Gate::Paused => return Ok(TickOutcome::Paused),
            Gate::Open => {}
        }

        self.ticks += 1;
        let decision = agent.next_move(&self.simulation.view());
        let report = match decision {
            Decision::Move(target) => Some(self.simulation.move_player(target).map_err(|error| {
                warn!("{} proposed {target}: {error}", agent.mode().title());
                error
            })?),
            Decision::Step(direction) => Some(self.simulation.try_step(direction)?),
            Decision::Hold => None,
            Decision::Finish(finish) => return Ok(TickOutcome::Finished(finish)),
        };

        self.record(report);
        Ok(TickOutcome::Advanced(report))
    }

    /// Starts a fresh run of `agent` and ticks until it finishes or is interrupted.
    ///
    /// `frontend` is consulted once before the first tick and after every
    /// tick, including paused ones.
    pub fn run<F>(&mut self, agent: &mut dyn Agent, frontend: &mut F) -> Result<RunOutcome, WorldError>
    where
        F: Frontend + ?Sized,
    {
        self.begin_run(agent.mode());
        agent.begin(&self.simulation.view());
        self.present(frontend);

        let ending = loop {
            match self.tick(agent)? {
                TickOutcome::Advanced(_) | TickOutcome::Paused => {}
                TickOutcome::Finished(finish) => break RunEnding::Finished(finish),
                TickOutcome::Interrupted(signal) => break RunEnding::Interrupted(signal),
            }
            self.present(frontend);
        };

        let outcome = RunOutcome {
            ending,
            ticks: self.ticks,
            moves: self.moves,
            visited: self.simulation.visited().len(),
        };
        info!(
            "{} ended after {} ticks ({} moves): {:?}",
            agent.mode().title(),
            outcome.ticks,
            outcome.moves,
            outcome.ending
        );
        Ok(outcome)
    }

    /// Hands the current state to `frontend` and queues the commands it returns.
    pub fn present<F>(&mut self, frontend: &mut F)
    where
        F: Frontend + ?Sized,
    {
        let mut commands = Vec::new();
        frontend.present(&self.simulation, &mut commands);
        self.pending.extend(commands);
    }

    /// Resets run state and counters for a run in `mode`.
    ///
    /// [`Controller::run`] calls this itself; loops driven from outside, such
    /// as training, call it directly.
    pub fn begin_run(&mut self, mode: AgentMode) {
        self.simulation.begin_run(mode);
        self.ticks = 0;
        self.moves = 0;
    }

    /// Resets the player and visited set to the start without touching control flags.
    pub fn reset_episode(&mut self) {
        self.simulation.reset_run();
    }

    /// Attempts a single player step on behalf of an external loop.
    pub fn step_player(&mut self, direction: Direction) -> Result<StepReport, WorldError> {
        self.simulation.try_step(direction)
    }

    fn record(&mut self, report: Option<StepReport>) {
        if matches!(report, Some(StepReport::Moved { .. })) {
            self.moves += 1;
        }
    }
}
