use gridpath_core::{ControlCommand, ControlSignal, Finish, Position, Walkability};
use gridpath_system_astar::AStar;
use gridpath_world::{
    parse_map, Controller, Headless, RunEnding, ScriptedFrontend, Simulation, SimulationConfig,
};

fn controller(map: &str) -> Controller {
    let grid = parse_map(map).expect("well formed");
    Controller::new(
        Simulation::new(grid, Walkability::walls_only(), &SimulationConfig::default())
            .expect("playable"),
    )
}

const WALL_WITH_GAP: &str = "P . X . E\n\
                             . . X . .\n\
                             . . X . .\n\
                             . . X . .\n\
                             . . . . .\n";

#[test]
fn replays_the_tie_broken_route_on_an_open_grid() {
    let mut controller = controller("P . .\n. . .\n. . E\n");

    let outcome = controller.run(&mut AStar::new(), &mut Headless).expect("run");

    assert_eq!(outcome.ending, RunEnding::Finished(Finish::ReachedExit));
    assert_eq!(outcome.moves, 4);
    let visited: Vec<_> = controller.simulation().visited().iter().copied().collect();
    assert_eq!(
        visited,
        vec![
            Position::new(0, 0),
            Position::new(1, 0),
            Position::new(2, 0),
            Position::new(2, 1),
            Position::new(2, 2),
        ]
    );
}

#[test]
fn routes_through_the_gap() {
    let mut controller = controller(WALL_WITH_GAP);

    let outcome = controller.run(&mut AStar::new(), &mut Headless).expect("run");

    assert_eq!(outcome.ending, RunEnding::Finished(Finish::ReachedExit));
    assert_eq!(outcome.moves, 12);
    assert!(controller
        .simulation()
        .visited()
        .contains(&Position::new(4, 2)));
}

#[test]
fn sealed_exit_finishes_without_moving() {
    let mut controller = controller("P . X\n. . X\nX X E\n");

    let outcome = controller.run(&mut AStar::new(), &mut Headless).expect("run");

    assert_eq!(outcome.ending, RunEnding::Finished(Finish::NoPath));
    assert_eq!(outcome.moves, 0);
}

#[test]
fn restart_replans_from_the_start() {
    let mut controller = controller(WALL_WITH_GAP);
    let mut agent = AStar::new();
    let mut interrupted = ScriptedFrontend::new([None, None, Some(ControlCommand::Restart)]);

    let first = controller.run(&mut agent, &mut interrupted).expect("run");
    let second = controller.run(&mut agent, &mut Headless).expect("run");

    assert_eq!(first.ending, RunEnding::Interrupted(ControlSignal::Restart));
    assert_eq!(second.ending, RunEnding::Finished(Finish::ReachedExit));
    assert_eq!(second.moves, 12);
}
