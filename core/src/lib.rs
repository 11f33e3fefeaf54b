#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the GridPath workspace.
//!
//! This crate defines the vocabulary that connects the simulation, the
//! navigation agents and the adapters. The grid stores [`Cell`] tags addressed
//! by [`Position`]. Agents implement [`Agent`] and observe the simulation only
//! through a read-only [`SimulationView`], answering each tick with a
//! [`Decision`] that the simulation applies through its single move primitive.
//! Adapters translate key presses into [`ControlCommand`] values.

use std::fmt;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

mod grid;

pub use grid::{Grid, GridError};

/// Location of a single grid cell expressed as row and column indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    row: u32,
    column: u32,
}

impl Position {
    /// Creates a new grid position.
    #[must_use]
    pub const fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }

    /// Zero-based row index.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Zero-based column index.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Computes the Manhattan distance between two positions.
    #[must_use]
    pub fn manhattan_distance(self, other: Position) -> u32 {
        self.row.abs_diff(other.row) + self.column.abs_diff(other.column)
    }

    /// Neighbouring position one step in `direction`.
    ///
    /// Returns `None` when the step would leave the non-negative quadrant.
    /// Upper bounds are the grid's concern.
    #[must_use]
    pub fn step(self, direction: Direction) -> Option<Position> {
        let (row, column) = match direction {
            Direction::North => (self.row.checked_sub(1)?, self.column),
            Direction::East => (self.row, self.column.checked_add(1)?),
            Direction::South => (self.row.checked_add(1)?, self.column),
            Direction::West => (self.row, self.column.checked_sub(1)?),
        };
        Some(Position::new(row, column))
    }

    /// Direction leading from `self` to an orthogonally adjacent `other`.
    #[must_use]
    pub fn direction_to(self, other: Position) -> Option<Direction> {
        Direction::ALL
            .into_iter()
            .find(|direction| self.step(*direction) == Some(other))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.column)
    }
}

/// Cardinal movement directions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

impl Direction {
    /// All directions in clockwise order starting from north.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Neighbour scan order used wherever ties must resolve deterministically:
    /// up, down, left, right.
    pub const SCAN_ORDER: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::West,
        Direction::East,
    ];

    /// Direction after a 90 degree counter-clockwise turn.
    #[must_use]
    pub const fn turn_left(self) -> Self {
        match self {
            Self::North => Self::West,
            Self::East => Self::North,
            Self::South => Self::East,
            Self::West => Self::South,
        }
    }

    /// Direction after a 90 degree clockwise turn.
    #[must_use]
    pub const fn turn_right(self) -> Self {
        match self {
            Self::North => Self::East,
            Self::East => Self::South,
            Self::South => Self::West,
            Self::West => Self::North,
        }
    }

    /// Opposite direction.
    #[must_use]
    pub const fn reverse(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::East => Self::West,
            Self::South => Self::North,
            Self::West => Self::East,
        }
    }
}

/// Tag stored in every grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Cell {
    /// Open, unvisited ground.
    Floor,
    /// Obstacle.
    Wall,
    /// Current player location.
    Player,
    /// Goal location.
    Exit,
    /// Ground the player has already walked over.
    Visited,
}

impl Cell {
    /// Every cell tag in legend order.
    pub const ALL: [Cell; 5] = [
        Cell::Floor,
        Cell::Wall,
        Cell::Player,
        Cell::Exit,
        Cell::Visited,
    ];

    /// Character used for the tag in the map text format.
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::Floor => '.',
            Self::Wall => 'X',
            Self::Player => 'P',
            Self::Exit => 'E',
            Self::Visited => 'V',
        }
    }

    /// Parses a map text symbol.
    #[must_use]
    pub const fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            '.' => Some(Self::Floor),
            'X' => Some(Self::Wall),
            'P' => Some(Self::Player),
            'E' => Some(Self::Exit),
            'V' => Some(Self::Visited),
            _ => None,
        }
    }

    /// Display colour the rendering collaborator should use for the tag.
    #[must_use]
    pub const fn color(self) -> CellColor {
        match self {
            Self::Floor => CellColor::from_rgb(0xd3, 0xd3, 0xd3),
            Self::Wall => CellColor::from_rgb(0x34, 0x49, 0x5e),
            Self::Player => CellColor::from_rgb(0x34, 0x98, 0xdb),
            Self::Exit => CellColor::from_rgb(0x2e, 0xcc, 0x71),
            Self::Visited => CellColor::from_rgb(0xfe, 0xf0, 0x8a),
        }
    }
}

/// Opaque RGB colour published in the legend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CellColor {
    red: u8,
    green: u8,
    blue: u8,
}

impl CellColor {
    /// Creates a new colour from byte RGB components.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Red component of the colour.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Green component of the colour.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Blue component of the colour.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }

    /// Hex notation such as `#2ecc71`.
    #[must_use]
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.red, self.green, self.blue)
    }
}

/// Legend mapping every tag to its display colour.
#[must_use]
pub fn legend() -> [(Cell, CellColor); 5] {
    Cell::ALL.map(|cell| (cell, cell.color()))
}

/// Set of cell tags the player may stand on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Walkability {
    blocked: u8,
}

impl Walkability {
    /// Only walls block movement.
    #[must_use]
    pub const fn walls_only() -> Self {
        Self {
            blocked: Self::bit(Cell::Wall),
        }
    }

    /// Every tag in `blocked` obstructs movement.
    #[must_use]
    pub fn blocking(blocked: &[Cell]) -> Self {
        Self {
            blocked: blocked
                .iter()
                .fold(0, |mask, cell| mask | Self::bit(*cell)),
        }
    }

    /// Reports whether the player may enter a cell with the given tag.
    #[must_use]
    pub const fn permits(self, cell: Cell) -> bool {
        self.blocked & Self::bit(cell) == 0
    }

    const fn bit(cell: Cell) -> u8 {
        1 << cell as u8
    }
}

impl Default for Walkability {
    fn default() -> Self {
        Self::walls_only()
    }
}

/// Run-level request raised by the user and honoured at tick boundaries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ControlSignal {
    /// Keep running.
    #[default]
    Continue,
    /// Reset the current run and start it again.
    Restart,
    /// Discard the map and start over on a freshly generated one.
    NewMap,
    /// Return to the agent selection menu.
    MainMenu,
    /// Leave the program.
    Exit,
}

/// Discrete commands delivered by the input collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ControlCommand {
    /// Move the player one row up (manual mode only).
    MoveUp,
    /// Move the player one row down (manual mode only).
    MoveDown,
    /// Move the player one column left (manual mode only).
    MoveLeft,
    /// Move the player one column right (manual mode only).
    MoveRight,
    /// Pause or resume tick advancement.
    TogglePause,
    /// Shorten the delay between ticks.
    SpeedUp,
    /// Lengthen the delay between ticks.
    SpeedDown,
    /// Raise [`ControlSignal::Exit`].
    Exit,
    /// Raise [`ControlSignal::Restart`].
    Restart,
    /// Raise [`ControlSignal::NewMap`].
    NewMap,
    /// Raise [`ControlSignal::MainMenu`].
    MainMenu,
}

impl ControlCommand {
    /// Maps a key name to a command. Unknown keys yield `None` and are ignored.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "up" => Some(Self::MoveUp),
            "down" => Some(Self::MoveDown),
            "left" => Some(Self::MoveLeft),
            "right" => Some(Self::MoveRight),
            "p" => Some(Self::TogglePause),
            "f" => Some(Self::SpeedUp),
            "s" => Some(Self::SpeedDown),
            "e" => Some(Self::Exit),
            "r" => Some(Self::Restart),
            "n" => Some(Self::NewMap),
            "m" => Some(Self::MainMenu),
            _ => None,
        }
    }

    /// Control signal raised by the command, if it interrupts the run.
    #[must_use]
    pub const fn interrupt(self) -> Option<ControlSignal> {
        match self {
            Self::Exit => Some(ControlSignal::Exit),
            Self::Restart => Some(ControlSignal::Restart),
            Self::NewMap => Some(ControlSignal::NewMap),
            Self::MainMenu => Some(ControlSignal::MainMenu),
            _ => None,
        }
    }

    /// Direction of a manual move command.
    #[must_use]
    pub const fn move_direction(self) -> Option<Direction> {
        match self {
            Self::MoveUp => Some(Direction::North),
            Self::MoveDown => Some(Direction::South),
            Self::MoveLeft => Some(Direction::West),
            Self::MoveRight => Some(Direction::East),
            _ => None,
        }
    }
}

/// Identifies the strategy currently driving the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AgentMode {
    /// Player moves only in response to move commands.
    Manual,
    /// Greedy Manhattan descent toward the exit.
    Greedy,
    /// Replays the optimal A* route.
    AStar,
    /// Left-hand rule coverage.
    WallFollower,
    /// Frontier-driven coverage.
    Frontier,
    /// Tabular Q-learning while training.
    QLearningTraining,
    /// Tabular Q-learning replaying a trained policy.
    QLearningEvaluation,
}

impl AgentMode {
    /// Title shown by the rendering collaborator.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Manual => "Manual Control",
            Self::Greedy => "Greedy AI",
            Self::AStar => "A* AI",
            Self::WallFollower => "Wall Follower AI",
            Self::Frontier => "Frontier Exploration AI",
            Self::QLearningTraining => "Q-Learning (Training)",
            Self::QLearningEvaluation => "Q-Learning (Trained)",
        }
    }
}

/// Terminal condition reported by an agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Finish {
    /// The player stands on the exit.
    ReachedExit,
    /// The agent cannot make progress.
    Stuck,
    /// No route from start to exit exists.
    NoPath,
    /// The agent believes every reachable cell has been visited.
    Covered,
    /// A frontier target turned out to be unreachable.
    TargetUnreachable,
    /// The step budget ran out before the exit was reached.
    BudgetExhausted,
}

impl fmt::Display for Finish {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::ReachedExit => "reached the exit",
            Self::Stuck => "got stuck",
            Self::NoPath => "found no path to the exit",
            Self::Covered => "covered all reachable area",
            Self::TargetUnreachable => "could not reach the chosen frontier cell",
            Self::BudgetExhausted => "exhausted its step budget",
        };
        f.write_str(text)
    }
}

/// Answer an agent gives for a single tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    /// Move to an orthogonally adjacent walkable position.
    Move(Position),
    /// Attempt a step; a blocked step leaves the player in place.
    Step(Direction),
    /// Stay put this tick.
    Hold,
    /// Stop the run.
    Finish(Finish),
}

/// Navigation strategy driven one tick at a time by the controller.
pub trait Agent {
    /// Mode tag the simulation records while this agent is active.
    fn mode(&self) -> AgentMode;

    /// Prepares per-run state. Called once before the first tick of every run.
    fn begin(&mut self, _view: &SimulationView<'_>) {}

    /// Chooses the next move.
    fn next_move(&mut self, view: &SimulationView<'_>) -> Decision;
}

/// Read-only window onto the simulation handed to agents.
#[derive(Clone, Copy, Debug)]
pub struct SimulationView<'a> {
    grid: &'a Grid,
    walkability: Walkability,
    start: Position,
    exit: Position,
    player: Position,
    visited: &'a IndexSet<Position>,
}

impl<'a> SimulationView<'a> {
    /// Captures a new view over simulation state.
    #[must_use]
    pub fn new(
        grid: &'a Grid,
        walkability: Walkability,
        start: Position,
        exit: Position,
        player: Position,
        visited: &'a IndexSet<Position>,
    ) -> Self {
        Self {
            grid,
            walkability,
            start,
            exit,
            player,
            visited,
        }
    }

    /// Current cell grid.
    #[must_use]
    pub const fn grid(&self) -> &'a Grid {
        self.grid
    }

    /// Walkability rule in force for the run.
    #[must_use]
    pub const fn walkability(&self) -> Walkability {
        self.walkability
    }

    /// Position the player started the run from.
    #[must_use]
    pub const fn start(&self) -> Position {
        self.start
    }

    /// Position of the exit.
    #[must_use]
    pub const fn exit(&self) -> Position {
        self.exit
    }

    /// Current player position.
    #[must_use]
    pub const fn player(&self) -> Position {
        self.player
    }

    /// Reports whether `position` is in bounds and walkable.
    #[must_use]
    pub fn is_walkable(&self, position: Position) -> bool {
        self.grid.is_walkable(position, self.walkability)
    }

    /// Reports whether the player visited `position` during this run.
    #[must_use]
    pub fn is_visited(&self, position: Position) -> bool {
        self.visited.contains(&position)
    }

    /// Number of distinct positions visited during this run.
    #[must_use]
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// Visited positions in the order they were first entered.
    #[must_use]
    pub fn visited(&self) -> &'a IndexSet<Position> {
        self.visited
    }

    /// Walkable neighbours of `position`, in the order given by `order`.
    pub fn walkable_neighbors(
        &self,
        position: Position,
        order: [Direction; 4],
    ) -> impl Iterator<Item = (Direction, Position)> + 'a {
        let grid = self.grid;
        let walkability = self.walkability;
        order.into_iter().filter_map(move |direction| {
            let neighbor = position.step(direction)?;
            grid.is_walkable(neighbor, walkability)
                .then_some((direction, neighbor))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn manhattan_distance_matches_expectation() {
        let origin = Position::new(1, 1);
        let destination = Position::new(4, 3);
        assert_eq!(origin.manhattan_distance(destination), 5);
        assert_eq!(destination.manhattan_distance(origin), 5);
    }

    #[test]
    fn step_refuses_to_underflow() {
        let corner = Position::new(0, 0);
        assert_eq!(corner.step(Direction::North), None);
        assert_eq!(corner.step(Direction::West), None);
        assert_eq!(corner.step(Direction::South), Some(Position::new(1, 0)));
        assert_eq!(corner.step(Direction::East), Some(Position::new(0, 1)));
    }

    #[test]
    fn direction_to_neighbors() {
        let origin = Position::new(3, 3);
        assert_eq!(origin.direction_to(Position::new(2, 3)), Some(Direction::North));
        assert_eq!(origin.direction_to(Position::new(3, 4)), Some(Direction::East));
        assert_eq!(origin.direction_to(Position::new(4, 3)), Some(Direction::South));
        assert_eq!(origin.direction_to(Position::new(3, 2)), Some(Direction::West));
        assert_eq!(origin.direction_to(origin), None);
        assert_eq!(origin.direction_to(Position::new(4, 4)), None);
    }

    #[test]
    fn turns_compose() {
        for direction in Direction::ALL {
            assert_eq!(direction.turn_left().turn_right(), direction);
            assert_eq!(direction.turn_right().turn_right(), direction.reverse());
        }
        assert_eq!(Direction::South.turn_left(), Direction::East);
    }

    #[test]
    fn symbols_round_trip() {
        for cell in Cell::ALL {
            assert_eq!(Cell::from_symbol(cell.symbol()), Some(cell));
        }
        assert_eq!(Cell::from_symbol('#'), None);
    }

    #[test]
    fn legend_exposes_every_tag() {
        let legend = legend();
        assert_eq!(legend.len(), Cell::ALL.len());
        assert_eq!(Cell::Exit.color().to_hex(), "#2ecc71");
        assert_eq!(Cell::Visited.color().to_hex(), "#fef08a");
    }

    #[test]
    fn walkability_blocks_only_listed_tags() {
        let walls = Walkability::walls_only();
        assert!(!walls.permits(Cell::Wall));
        assert!(walls.permits(Cell::Exit));
        assert!(walls.permits(Cell::Visited));

        let strict = Walkability::blocking(&[Cell::Wall, Cell::Visited]);
        assert!(!strict.permits(Cell::Visited));
        assert!(strict.permits(Cell::Floor));
    }

    #[test]
    fn unknown_keys_are_ignored() {
        assert_eq!(ControlCommand::from_key("p"), Some(ControlCommand::TogglePause));
        assert_eq!(ControlCommand::from_key("q"), None);
        assert_eq!(
            ControlCommand::from_key("n").and_then(ControlCommand::interrupt),
            Some(ControlSignal::NewMap)
        );
        assert_eq!(ControlCommand::SpeedUp.interrupt(), None);
    }

    #[test]
    fn position_round_trips_through_bincode() {
        assert_round_trip(&Position::new(7, 11));
    }

    #[test]
    fn grid_round_trips_through_bincode() {
        let mut grid = Grid::new(2, 3, Cell::Floor).expect("grid");
        grid.set(Position::new(1, 2), Cell::Exit).expect("in bounds");
        assert_round_trip(&grid);
    }

    #[test]
    fn view_lists_walkable_neighbors_in_requested_order() {
        let mut grid = Grid::new(3, 3, Cell::Floor).expect("grid");
        grid.set(Position::new(0, 1), Cell::Wall).expect("in bounds");
        let visited = IndexSet::from([Position::new(1, 1)]);
        let view = SimulationView::new(
            &grid,
            Walkability::walls_only(),
            Position::new(1, 1),
            Position::new(2, 2),
            Position::new(1, 1),
            &visited,
        );

        let neighbors: Vec<_> = view
            .walkable_neighbors(Position::new(1, 1), Direction::SCAN_ORDER)
            .map(|(_, position)| position)
            .collect();

        assert_eq!(
            neighbors,
            vec![
                Position::new(2, 1),
                Position::new(1, 0),
                Position::new(1, 2),
            ]
        );
        assert!(view.is_visited(Position::new(1, 1)));
        assert_eq!(view.visited_count(), 1);
    }
}
