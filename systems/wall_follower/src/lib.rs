#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Left-hand rule coverage agent.
//!
//! The agent keeps one hand on the wall: each tick it tries to turn left, go
//! straight, turn right and finally turn back, moving into the first walkable
//! cell and facing the way it moved.
//!
//! Coverage completion is a heuristic. The run stops with
//! [`Finish::Covered`] once more than `rows * columns` consecutive ticks pass
//! without entering a new cell. The rule only ever touches cells adjacent to
//! the wall it follows, so open room interiors wider than one cell away from
//! any wall and islands detached from the outer boundary are never reached.

use gridpath_core::{Agent, AgentMode, Decision, Direction, Finish, SimulationView};
use log::debug;

/// Agent following the wall on its left-hand side.
#[derive(Clone, Debug)]
pub struct WallFollower {
    initial_facing: Direction,
    facing: Direction,
    last_visited: usize,
    idle_ticks: u64,
}

impl WallFollower {
    /// Creates an agent that starts the run facing south.
    #[must_use]
    pub fn new() -> Self {
        Self::facing(Direction::South)
    }

    /// Creates an agent that starts every run facing `direction`.
    #[must_use]
    pub fn facing(direction: Direction) -> Self {
        Self {
            initial_facing: direction,
            facing: direction,
            last_visited: 0,
            idle_ticks: 0,
        }
    }

    /// Direction the agent currently faces.
    #[must_use]
    pub const fn current_facing(&self) -> Direction {
        self.facing
    }
}

impl Default for WallFollower {
    fn default() -> Self {
        Self::new()
    }
}

impl Agent for WallFollower {
    fn mode(&self) -> AgentMode {
        AgentMode::WallFollower
    }

    fn begin(&mut self, view: &SimulationView<'_>) {
        self.facing = self.initial_facing;
        self.last_visited = view.visited_count();
        self.idle_ticks = 0;
    }

    fn next_move(&mut self, view: &SimulationView<'_>) -> Decision {
        let visited = view.visited_count();
        if visited > self.last_visited {
            self.last_visited = visited;
            self.idle_ticks = 0;
        } else {
            self.idle_ticks += 1;
            if self.idle_ticks > view.grid().area() {
                debug!("no new cell for {} ticks", self.idle_ticks);
                return Decision::Finish(Finish::Covered);
            }
        }

        let facing = self.facing;
        let candidates = [
            facing.turn_left(),
            facing,
            facing.turn_right(),
            facing.reverse(),
        ];

        match view.walkable_neighbors(view.player(), candidates).next() {
            Some((direction, next)) => {
                self.facing = direction;
                Decision::Move(next)
            }
            None => {
                self.facing = facing.reverse();
                Decision::Hold
            }
        }
    }
}
