#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Greedy descent toward the exit.
//!
//! Each tick the agent steps onto the walkable neighbour closest to the exit
//! by Manhattan distance, scanning up, down, left, right and keeping the first
//! minimum. It keeps no memory of where it has been, so concave obstacles can
//! trap it in a loop. A loop is detected when more than `rows * columns`
//! consecutive ticks pass without entering a new cell, at which point the
//! agent gives up with [`Finish::Stuck`].

use gridpath_core::{Agent, AgentMode, Decision, Direction, Finish, SimulationView};
use log::debug;

/// Memoryless agent that always moves toward the exit.
#[derive(Clone, Debug, Default)]
pub struct Greedy {
    last_visited: usize,
    stalled_ticks: u64,
}

impl Greedy {
    /// Creates a greedy agent.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn stalled(&mut self, view: &SimulationView<'_>) -> bool {
        let visited = view.visited_count();
        if visited > self.last_visited {
            self.last_visited = visited;
            self.stalled_ticks = 0;
            return false;
        }

        self.stalled_ticks += 1;
        self.stalled_ticks > view.grid().area()
    }
}

impl Agent for Greedy {
    fn mode(&self) -> AgentMode {
        AgentMode::Greedy
    }

    fn begin(&mut self, view: &SimulationView<'_>) {
        self.last_visited = view.visited_count();
        self.stalled_ticks = 0;
    }

    fn next_move(&mut self, view: &SimulationView<'_>) -> Decision {
        let player = view.player();
        let exit = view.exit();
        if player == exit {
            return Decision::Finish(Finish::ReachedExit);
        }

        if self.stalled(view) {
            debug!("greedy agent made no progress for {} ticks", self.stalled_ticks);
            return Decision::Finish(Finish::Stuck);
        }

        view.walkable_neighbors(player, Direction::SCAN_ORDER)
            .map(|(_, neighbor)| neighbor)
            .min_by_key(|neighbor| neighbor.manhattan_distance(exit))
            .map_or(Decision::Finish(Finish::Stuck), Decision::Move)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridpath_core::{Position, Walkability};
    use gridpath_world::{parse_map, Simulation, SimulationConfig};

    fn simulation(map: &str) -> Simulation {
        let grid = parse_map(map).expect("well formed");
        Simulation::new(grid, Walkability::walls_only(), &SimulationConfig::default())
            .expect("playable")
    }

    #[test]
    fn prefers_the_first_neighbor_in_scan_order_on_ties() {
        let simulation = simulation("P . .\n. . .\n. . E\n");
        let mut agent = Greedy::new();
        agent.begin(&simulation.view());

        assert_eq!(
            agent.next_move(&simulation.view()),
            Decision::Move(Position::new(1, 0))
        );
    }

    #[test]
    fn enclosed_player_is_stuck() {
        let simulation = simulation("P X\nX E\n");
        let mut agent = Greedy::new();
        agent.begin(&simulation.view());

        assert_eq!(
            agent.next_move(&simulation.view()),
            Decision::Finish(Finish::Stuck)
        );
    }

    #[test]
    fn finishes_on_the_exit() {
        let mut simulation = simulation("E P\n");
        let _ = simulation.move_player(Position::new(0, 0)).expect("legal");
        let mut agent = Greedy::new();

        assert_eq!(
            agent.next_move(&simulation.view()),
            Decision::Finish(Finish::ReachedExit)
        );
    }

    #[test]
    fn stall_counter_trips_after_the_grid_area() {
        let simulation = simulation("P .\n. E\n");
        let mut agent = Greedy::new();
        agent.begin(&simulation.view());

        for _ in 0..4 {
            assert!(!agent.stalled(&simulation.view()));
        }
        assert!(agent.stalled(&simulation.view()));
    }
}
