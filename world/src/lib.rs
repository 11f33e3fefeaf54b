#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative simulation state for GridPath.
//!
//! A [`Simulation`] exclusively owns the grid of one run together with the
//! player, exit and visited bookkeeping. Every grid mutation flows through
//! [`Simulation::move_player`]; agents only ever see a read-only
//! [`SimulationView`]. The [`Controller`] drives agents tick by tick and
//! honours the user's pause, speed and interrupt commands at tick boundaries.

use std::time::Duration;

use gridpath_core::{
    AgentMode, Cell, ControlCommand, ControlSignal, Direction, Grid, GridError, Position,
    SimulationView, Walkability,
};
use indexmap::IndexSet;
use log::{debug, info};
use serde::Deserialize;
use thiserror::Error;

mod controller;
mod manual;
mod map_text;

pub use controller::{
    Controller, Frontend, Gate, Headless, RunEnding, RunOutcome, ScriptedFrontend, TickOutcome,
};
pub use manual::ManualControl;
pub use map_text::{parse_map, render_map, ActiveMap};

/// Failures raised while building or mutating a simulation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorldError {
    /// The grid lacks a player or an exit marker.
    #[error("map must contain a player ('P') and an exit ('E'); found {players} and {exits}")]
    MissingPlayerOrExit {
        /// Number of player markers found.
        players: usize,
        /// Number of exit markers found.
        exits: usize,
    },
    /// The grid holds more than one copy of a unique marker.
    #[error("map contains {count} {cell:?} markers, expected exactly one")]
    DuplicateMarker {
        /// Marker that appears more than once.
        cell: Cell,
        /// Number of occurrences.
        count: usize,
    },
    /// Map text violated the load format.
    #[error("malformed map at line {line}: {reason}")]
    MalformedMap {
        /// One-based line number of the violation, zero for whole-file problems.
        line: usize,
        /// Description of the violation.
        reason: String,
    },
    /// A move was requested that is not a single step onto walkable ground.
    #[error("illegal move from {from} to {to}")]
    IllegalMove {
        /// Player position before the request.
        from: Position,
        /// Requested destination.
        to: Position,
    },
    /// Underlying grid access failed.
    #[error(transparent)]
    Grid(#[from] GridError),
}

/// Pacing configuration for a run.
///
/// Delays are expressed in milliseconds. The current delay is clamped to
/// `min_step_delay_ms..=max_step_delay_ms` and moves by
/// `step_delay_increment_ms` per speed command.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Initial delay between ticks.
    pub step_delay_ms: u64,
    /// Shortest permitted delay.
    pub min_step_delay_ms: u64,
    /// Longest permitted delay.
    pub max_step_delay_ms: u64,
    /// Change applied by one speed command.
    pub step_delay_increment_ms: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            step_delay_ms: 150,
            min_step_delay_ms: 10,
            max_step_delay_ms: 1_000,
            step_delay_increment_ms: 50,
        }
    }
}

/// Delay between ticks, bounded to a configured range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StepDelay {
    current: Duration,
    min: Duration,
    max: Duration,
    increment: Duration,
}

impl StepDelay {
    /// Builds the delay from configuration, clamping the initial value.
    #[must_use]
    pub fn from_config(config: &SimulationConfig) -> Self {
        let low = config.min_step_delay_ms.min(config.max_step_delay_ms);
        let high = config.min_step_delay_ms.max(config.max_step_delay_ms);
        Self {
            current: Duration::from_millis(config.step_delay_ms.max(low).min(high)),
            min: Duration::from_millis(low),
            max: Duration::from_millis(high),
            increment: Duration::from_millis(config.step_delay_increment_ms),
        }
    }

    /// Current delay.
    #[must_use]
    pub const fn current(&self) -> Duration {
        self.current
    }

    /// Shortens the delay without dropping below the minimum.
    pub fn speed_up(&mut self) {
        self.current = self.current.saturating_sub(self.increment).max(self.min);
    }

    /// Lengthens the delay without exceeding the maximum.
    pub fn slow_down(&mut self) {
        self.current = self.current.saturating_add(self.increment).min(self.max);
    }
}

/// Result of a single attempted player step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepReport {
    /// The target was a wall or off the grid; the player did not move.
    Blocked,
    /// The player moved.
    Moved {
        /// Position before the move.
        from: Position,
        /// Position after the move.
        to: Position,
        /// Whether `to` had not been visited earlier in the run.
        first_visit: bool,
        /// Whether `to` is the exit.
        reached_exit: bool,
    },
}

/// State of one run: grid, markers, player, visited set and control flags.
#[derive(Clone, Debug)]
pub struct Simulation {
    pristine: Grid,
    grid: Grid,
    walkability: Walkability,
    start: Position,
    exit: Position,
    player: Position,
    visited: IndexSet<Position>,
    mode: AgentMode,
    signal: ControlSignal,
    paused: bool,
    step_delay: StepDelay,
}

impl Simulation {
    /// Creates a simulation over `grid`.
    ///
    /// The grid must hold exactly one player and one exit marker. The player
    /// marker becomes the immutable start position.
    pub fn new(
        grid: Grid,
        walkability: Walkability,
        config: &SimulationConfig,
    ) -> Result<Self, WorldError> {
        let (start, exit) = locate_markers(&grid)?;
        let mut visited = IndexSet::new();
        let _ = visited.insert(start);

        Ok(Self {
            pristine: grid.clone(),
            grid,
            walkability,
            start,
            exit,
            player: start,
            visited,
            mode: AgentMode::Manual,
            signal: ControlSignal::Continue,
            paused: false,
            step_delay: StepDelay::from_config(config),
        })
    }

    /// Current cell grid.
    #[must_use]
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Walkability rule in force.
    #[must_use]
    pub const fn walkability(&self) -> Walkability {
        self.walkability
    }

    /// Start position, fixed at construction.
    #[must_use]
    pub const fn start(&self) -> Position {
        self.start
    }

    /// Exit position, fixed at construction.
    #[must_use]
    pub const fn exit(&self) -> Position {
        self.exit
    }

    /// Current player position.
    #[must_use]
    pub const fn player(&self) -> Position {
        self.player
    }

    /// Positions visited during the current run, in first-visit order.
    #[must_use]
    pub const fn visited(&self) -> &IndexSet<Position> {
        &self.visited
    }

    /// Mode of the agent driving the current run.
    #[must_use]
    pub const fn mode(&self) -> AgentMode {
        self.mode
    }

    /// Pending control signal.
    #[must_use]
    pub const fn signal(&self) -> ControlSignal {
        self.signal
    }

    /// Whether tick advancement is suspended.
    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    /// Delay the frontend should wait between ticks.
    #[must_use]
    pub const fn step_delay(&self) -> Duration {
        self.step_delay.current()
    }

    /// Read-only view handed to agents.
    #[must_use]
    pub fn view(&self) -> SimulationView<'_> {
        SimulationView::new(
            &self.grid,
            self.walkability,
            self.start,
            self.exit,
            self.player,
            &self.visited,
        )
    }

    /// Restores the grid, player and visited set to their state at construction.
    pub fn reset_run(&mut self) {
        self.grid.clone_from(&self.pristine);
        self.player = self.start;
        self.visited.clear();
        let _ = self.visited.insert(self.start);
    }

    /// Resets run state and clears control flags ahead of a new run.
    pub fn begin_run(&mut self, mode: AgentMode) {
        self.reset_run();
        self.mode = mode;
        self.signal = ControlSignal::Continue;
        self.paused = false;
        info!("starting run: {}", mode.title());
    }

    /// Moves the player onto an orthogonally adjacent walkable position.
    ///
    /// This is the only operation that mutates the grid during a run. The
    /// vacated cell becomes [`Cell::Visited`], except the exit which keeps its
    /// tag.
    pub fn move_player(&mut self, to: Position) -> Result<StepReport, WorldError> {
        let from = self.player;
        if from.manhattan_distance(to) != 1 || !self.grid.is_walkable(to, self.walkability) {
            return Err(WorldError::IllegalMove { from, to });
        }

        let vacated = if from == self.exit {
            Cell::Exit
        } else {
            Cell::Visited
        };
        self.grid.set(from, vacated)?;
        self.grid.set(to, Cell::Player)?;
        self.player = to;
        let first_visit = self.visited.insert(to);

        Ok(StepReport::Moved {
            from,
            to,
            first_visit,
            reached_exit: to == self.exit,
        })
    }

    /// Attempts one step in `direction`; walls and grid edges block the step.
    pub fn try_step(&mut self, direction: Direction) -> Result<StepReport, WorldError> {
        match self.player.step(direction) {
            Some(target) if self.grid.is_walkable(target, self.walkability) => {
                self.move_player(target)
            }
            _ => Ok(StepReport::Blocked),
        }
    }

    /// Raises a control signal.
    pub fn request(&mut self, signal: ControlSignal) {
        self.signal = signal;
    }

    /// Applies a user command.
    ///
    /// Move commands act only in manual mode and return the step they
    /// attempted. Pause and speed commands act only while an automated agent
    /// is running.
    pub fn apply_command(
        &mut self,
        command: ControlCommand,
    ) -> Result<Option<StepReport>, WorldError> {
        if let Some(signal) = command.interrupt() {
            self.request(signal);
            return Ok(None);
        }

        if self.mode == AgentMode::Manual {
            return match command.move_direction() {
                Some(direction) => self.try_step(direction).map(Some),
                None => Ok(None),
            };
        }

        match command {
            ControlCommand::TogglePause => self.paused = !self.paused,
            ControlCommand::SpeedUp => self.step_delay.speed_up(),
            ControlCommand::SpeedDown => self.step_delay.slow_down(),
            _ => debug!("ignoring {command:?} in {:?} mode", self.mode),
        }
        Ok(None)
    }
}

/// Finds the unique player and exit markers of a playable grid.
pub fn locate_markers(grid: &Grid) -> Result<(Position, Position), WorldError> {
    let players = grid.count(Cell::Player);
    let exits = grid.count(Cell::Exit);

    for (cell, count) in [(Cell::Player, players), (Cell::Exit, exits)] {
        if count > 1 {
            return Err(WorldError::DuplicateMarker { cell, count });
        }
    }

    match (grid.find_first(Cell::Player), grid.find_first(Cell::Exit)) {
        (Some(start), Some(exit)) => Ok((start, exit)),
        _ => Err(WorldError::MissingPlayerOrExit { players, exits }),
    }
}

/// Query functions that provide read-only access to a simulation.
pub mod query {
    use gridpath_core::{Finish, Position};

    use super::Simulation;

    /// Number of distinct cells the player has entered this run.
    #[must_use]
    pub fn visited_count(simulation: &Simulation) -> usize {
        simulation.visited.len()
    }

    /// Reports whether the player currently stands on the exit.
    #[must_use]
    pub fn at_exit(simulation: &Simulation) -> bool {
        simulation.player == simulation.exit
    }

    /// Title for the frame header, including the finish reason once known.
    #[must_use]
    pub fn status_line(simulation: &Simulation, finish: Option<Finish>) -> String {
        let mut line = format!(
            "{} | player {} | visited {}",
            simulation.mode.title(),
            simulation.player,
            simulation.visited.len()
        );
        if simulation.paused {
            line.push_str(" | paused");
        }
        if let Some(finish) = finish {
            line.push_str(&format!(" | {finish}"));
        }
        line
    }

    /// Walkable positions the player has not yet entered.
    #[must_use]
    pub fn unvisited_walkable(simulation: &Simulation) -> Vec<Position> {
        simulation
            .grid
            .iter()
            .filter(|(position, cell)| {
                simulation.walkability.permits(*cell) && !simulation.visited.contains(position)
            })
            .map(|(position, _)| position)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corridor() -> Grid {
        let mut grid = Grid::new(1, 4, Cell::Floor).expect("grid");
        grid.set(Position::new(0, 0), Cell::Player).expect("in bounds");
        grid.set(Position::new(0, 2), Cell::Wall).expect("in bounds");
        grid.set(Position::new(0, 3), Cell::Exit).expect("in bounds");
        grid
    }

    fn simulation(grid: Grid) -> Simulation {
        Simulation::new(grid, Walkability::walls_only(), &SimulationConfig::default())
            .expect("playable grid")
    }

    #[test]
    fn construction_requires_markers() {
        let grid = Grid::new(2, 2, Cell::Floor).expect("grid");
        assert_eq!(
            Simulation::new(grid, Walkability::walls_only(), &SimulationConfig::default())
                .map(|_| ()),
            Err(WorldError::MissingPlayerOrExit {
                players: 0,
                exits: 0,
            })
        );
    }

    #[test]
    fn construction_rejects_duplicate_exits() {
        let mut grid = corridor();
        grid.set(Position::new(0, 1), Cell::Exit).expect("in bounds");

        assert_eq!(
            locate_markers(&grid),
            Err(WorldError::DuplicateMarker {
                cell: Cell::Exit,
                count: 2,
            })
        );
    }

    #[test]
    fn move_marks_vacated_cell_visited() {
        let mut simulation = simulation(corridor());

        let report = simulation.move_player(Position::new(0, 1)).expect("legal");

        assert_eq!(
            report,
            StepReport::Moved {
                from: Position::new(0, 0),
                to: Position::new(0, 1),
                first_visit: true,
                reached_exit: false,
            }
        );
        assert_eq!(simulation.grid().get(Position::new(0, 0)), Ok(Cell::Visited));
        assert_eq!(simulation.grid().get(Position::new(0, 1)), Ok(Cell::Player));
        assert_eq!(query::visited_count(&simulation), 2);
    }

    #[test]
    fn illegal_moves_are_rejected_without_mutation() {
        let mut simulation = simulation(corridor());
        let before = simulation.grid().clone();

        assert!(matches!(
            simulation.move_player(Position::new(0, 3)),
            Err(WorldError::IllegalMove { .. })
        ));
        assert_eq!(simulation.grid(), &before);
        assert_eq!(simulation.player(), Position::new(0, 0));
    }

    #[test]
    fn blocked_steps_leave_player_in_place() {
        let mut simulation = simulation(corridor());

        assert_eq!(simulation.try_step(Direction::North), Ok(StepReport::Blocked));
        assert_eq!(simulation.try_step(Direction::East).map(|_| ()), Ok(()));
        assert_eq!(simulation.try_step(Direction::East), Ok(StepReport::Blocked));
        assert_eq!(simulation.player(), Position::new(0, 1));
    }

    #[test]
    fn leaving_the_exit_restores_its_tag() {
        let mut grid = Grid::new(1, 3, Cell::Floor).expect("grid");
        grid.set(Position::new(0, 0), Cell::Player).expect("in bounds");
        grid.set(Position::new(0, 1), Cell::Exit).expect("in bounds");
        let mut simulation = simulation(grid);

        let _ = simulation.move_player(Position::new(0, 1)).expect("legal");
        let _ = simulation.move_player(Position::new(0, 2)).expect("legal");

        assert_eq!(simulation.grid().get(Position::new(0, 1)), Ok(Cell::Exit));
        assert_eq!(simulation.grid().count(Cell::Exit), 1);
    }

    #[test]
    fn reset_run_restores_the_original_grid() {
        let mut simulation = simulation(corridor());
        let _ = simulation.move_player(Position::new(0, 1)).expect("legal");

        simulation.reset_run();

        assert_eq!(simulation.grid(), &corridor());
        assert_eq!(simulation.player(), simulation.start());
        assert_eq!(simulation.visited().len(), 1);
    }

    #[test]
    fn manual_mode_ignores_pause_and_honours_moves() {
        let mut simulation = simulation(corridor());
        simulation.begin_run(AgentMode::Manual);

        let paused = simulation
            .apply_command(ControlCommand::TogglePause)
            .expect("command");
        let moved = simulation
            .apply_command(ControlCommand::MoveRight)
            .expect("command");

        assert_eq!(paused, None);
        assert!(matches!(
            moved,
            Some(StepReport::Moved {
                first_visit: true,
                ..
            })
        ));
        assert!(!simulation.is_paused());
        assert_eq!(simulation.player(), Position::new(0, 1));
    }

    #[test]
    fn automated_modes_ignore_moves_and_honour_pause() {
        let mut simulation = simulation(corridor());
        simulation.begin_run(AgentMode::Greedy);

        let ignored = simulation
            .apply_command(ControlCommand::MoveRight)
            .expect("command");
        let _ = simulation
            .apply_command(ControlCommand::TogglePause)
            .expect("command");

        assert_eq!(ignored, None);
        assert!(simulation.is_paused());
        assert_eq!(simulation.player(), Position::new(0, 0));
    }

    #[test]
    fn step_delay_is_clamped() {
        let mut delay = StepDelay::from_config(&SimulationConfig::default());
        assert_eq!(delay.current(), Duration::from_millis(150));

        for _ in 0..10 {
            delay.speed_up();
        }
        assert_eq!(delay.current(), Duration::from_millis(10));

        for _ in 0..100 {
            delay.slow_down();
        }
        assert_eq!(delay.current(), Duration::from_millis(1_000));
    }

    #[test]
    fn interrupts_set_the_signal() {
        let mut simulation = simulation(corridor());
        simulation.begin_run(AgentMode::AStar);

        let _ = simulation.apply_command(ControlCommand::NewMap).expect("command");

        assert_eq!(simulation.signal(), ControlSignal::NewMap);
        simulation.begin_run(AgentMode::AStar);
        assert_eq!(simulation.signal(), ControlSignal::Continue);
    }

    #[test]
    fn status_line_reports_mode_and_pause() {
        let mut simulation = simulation(corridor());
        simulation.begin_run(AgentMode::Frontier);
        let _ = simulation
            .apply_command(ControlCommand::TogglePause)
            .expect("command");

        let line = query::status_line(&simulation, None);

        assert!(line.starts_with("Frontier Exploration AI"));
        assert!(line.ends_with("paused"));
        assert_eq!(query::unvisited_walkable(&simulation).len(), 2);
    }
}
