#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Optimal route replay.
//!
//! The agent plans the full shortest route from the start to the exit once,
//! when the run begins, and then emits one position per tick.

use std::collections::VecDeque;

use gridpath_core::{Agent, AgentMode, Decision, Finish, Position, SimulationView};
use gridpath_system_pathfinding::find_path;
use log::{debug, info};

/// Agent that replays an A* route from start to exit.
#[derive(Clone, Debug, Default)]
pub struct AStar {
    route: Option<VecDeque<Position>>,
}

impl AStar {
    /// Creates an agent with no route planned.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Steps still to be replayed, or `None` when no route exists.
    #[must_use]
    pub fn remaining(&self) -> Option<usize> {
        self.route.as_ref().map(VecDeque::len)
    }
}

impl Agent for AStar {
    fn mode(&self) -> AgentMode {
        AgentMode::AStar
    }

    fn begin(&mut self, view: &SimulationView<'_>) {
        let walkability = view.walkability();
        let path = find_path(
            view.grid(),
            |cell| walkability.permits(cell),
            view.start(),
            view.exit(),
            false,
        );

        match &path {
            Some(path) => info!("planned a {}-step route to the exit", path.len()),
            None => info!("no route from {} to {}", view.start(), view.exit()),
        }
        self.route = path.map(VecDeque::from);
    }

    fn next_move(&mut self, view: &SimulationView<'_>) -> Decision {
        let Some(route) = self.route.as_mut() else {
            return Decision::Finish(Finish::NoPath);
        };

        match route.pop_front() {
            Some(next) => {
                debug!("replaying step to {next}");
                Decision::Move(next)
            }
            None if view.player() == view.exit() => Decision::Finish(Finish::ReachedExit),
            None => Decision::Finish(Finish::Stuck),
        }
    }
}
