#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Frontier-driven coverage agent.
//!
//! The agent repeatedly picks the closest frontier cell, an unvisited walkable
//! cell next to something it has already visited, plans an A* route there and
//! walks it one step per tick. Exploration is complete once no frontier is
//! left.

use std::collections::VecDeque;

use gridpath_core::{Agent, AgentMode, Decision, Direction, Finish, Position, SimulationView};
use gridpath_system_pathfinding::find_path;
use indexmap::IndexSet;
use log::{debug, warn};

/// Agent that explores by walking to the nearest frontier cell.
#[derive(Clone, Debug, Default)]
pub struct FrontierExplorer {
    visited: IndexSet<Position>,
    route: VecDeque<Position>,
}

impl FrontierExplorer {
    /// Creates an explorer with empty bookkeeping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cells the explorer has visited, in first-visit order.
    #[must_use]
    pub const fn visited(&self) -> &IndexSet<Position> {
        &self.visited
    }

    /// Unvisited walkable cells adjacent to a visited cell.
    ///
    /// Cells appear in the order they are discovered: visited cells in
    /// first-visit order, each scanned up, down, left, right.
    #[must_use]
    pub fn frontier(&self, view: &SimulationView<'_>) -> IndexSet<Position> {
        let mut frontier = IndexSet::new();
        for &cell in &self.visited {
            for (_, neighbor) in view.walkable_neighbors(cell, Direction::SCAN_ORDER) {
                if !self.visited.contains(&neighbor) {
                    let _ = frontier.insert(neighbor);
                }
            }
        }
        frontier
    }

    fn plan(&mut self, view: &SimulationView<'_>) -> Result<(), Finish> {
        let player = view.player();
        let frontier = self.frontier(view);
        let Some(&target) = frontier
            .iter()
            .min_by_key(|cell| cell.manhattan_distance(player))
        else {
            return Err(Finish::Covered);
        };

        let walkability = view.walkability();
        let Some(path) = find_path(view.grid(), |cell| walkability.permits(cell), player, target, false)
        else {
            warn!("frontier cell {target} is unreachable from {player}");
            return Err(Finish::TargetUnreachable);
        };

        debug!(
            "heading for frontier cell {target} ({} steps, {} candidates)",
            path.len(),
            frontier.len()
        );
        self.route = path.into();
        Ok(())
    }
}

impl Agent for FrontierExplorer {
    fn mode(&self) -> AgentMode {
        AgentMode::Frontier
    }

    fn begin(&mut self, view: &SimulationView<'_>) {
        self.visited.clear();
        let _ = self.visited.insert(view.start());
        self.route.clear();
    }

    fn next_move(&mut self, view: &SimulationView<'_>) -> Decision {
        if self.route.is_empty() {
            if let Err(finish) = self.plan(view) {
                return Decision::Finish(finish);
            }
        }

        match self.route.pop_front() {
            Some(next) => {
                let _ = self.visited.insert(next);
                Decision::Move(next)
            }
            None => Decision::Finish(Finish::TargetUnreachable),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridpath_core::Walkability;
    use gridpath_world::{parse_map, Simulation, SimulationConfig};

    fn simulation(map: &str) -> Simulation {
        let grid = parse_map(map).expect("well formed");
        Simulation::new(grid, Walkability::walls_only(), &SimulationConfig::default())
            .expect("playable")
    }

    #[test]
    fn frontier_lists_unvisited_walkable_neighbors() {
        let simulation = simulation(". X .\nP . .\n. . E\n");
        let mut agent = FrontierExplorer::new();
        agent.begin(&simulation.view());

        let frontier: Vec<_> = agent.frontier(&simulation.view()).into_iter().collect();

        assert_eq!(
            frontier,
            vec![Position::new(0, 0), Position::new(2, 0), Position::new(1, 1)]
        );
    }

    #[test]
    fn first_nearest_frontier_cell_wins() {
        let simulation = simulation(". X .\nP . .\n. . E\n");
        let mut agent = FrontierExplorer::new();
        agent.begin(&simulation.view());

        assert_eq!(
            agent.next_move(&simulation.view()),
            Decision::Move(Position::new(0, 0))
        );
        assert!(agent.visited().contains(&Position::new(0, 0)));
    }

    #[test]
    fn isolated_start_is_already_covered() {
        let simulation = simulation("P X\nX E\n");
        let mut agent = FrontierExplorer::new();
        agent.begin(&simulation.view());

        assert_eq!(
            agent.next_move(&simulation.view()),
            Decision::Finish(Finish::Covered)
        );
    }
}
