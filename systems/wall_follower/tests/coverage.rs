use gridpath_core::{Cell, Finish, Position, Walkability};
use gridpath_system_wall_follower::WallFollower;
use gridpath_world::{
    parse_map, query, Controller, Headless, RunEnding, Simulation, SimulationConfig,
};

fn controller(map: &str) -> Controller {
    let grid = parse_map(map).expect("well formed");
    Controller::new(
        Simulation::new(grid, Walkability::walls_only(), &SimulationConfig::default())
            .expect("playable"),
    )
}

fn area(controller: &Controller) -> u64 {
    controller.simulation().grid().area()
}

#[test]
fn covers_a_two_row_room() {
    let mut controller = controller(
        "P . . .\n\
         . . . E\n",
    );

    let outcome = controller
        .run(&mut WallFollower::new(), &mut Headless)
        .expect("run");

    assert_eq!(outcome.ending, RunEnding::Finished(Finish::Covered));
    assert_eq!(outcome.visited, 8);
    assert!(query::unvisited_walkable(controller.simulation()).is_empty());
    assert!(outcome.ticks <= 4 * area(&controller));
}

#[test]
fn open_room_interior_stays_unvisited() {
    let mut controller = controller(
        "P . . .\n\
         . . . .\n\
         . . . .\n\
         . . . E\n",
    );

    let outcome = controller
        .run(&mut WallFollower::new(), &mut Headless)
        .expect("run");

    assert_eq!(outcome.ending, RunEnding::Finished(Finish::Covered));
    assert_eq!(outcome.visited, 12);
    let mut interior = query::unvisited_walkable(controller.simulation());
    interior.sort();
    assert_eq!(
        interior,
        vec![
            Position::new(1, 1),
            Position::new(1, 2),
            Position::new(2, 1),
            Position::new(2, 2),
        ]
    );
}

#[test]
fn covers_a_branching_corridor() {
    let mut controller = controller(
        "P . .\n\
         X . X\n\
         X E X\n",
    );

    let outcome = controller
        .run(&mut WallFollower::new(), &mut Headless)
        .expect("run");

    assert_eq!(outcome.ending, RunEnding::Finished(Finish::Covered));
    assert_eq!(outcome.visited, 5);
    assert!(outcome.ticks <= 4 * area(&controller));
}

#[test]
fn leaving_the_exit_keeps_its_tag() {
    let mut controller = controller(
        "P . E\n\
         X . X\n",
    );

    let _ = controller
        .run(&mut WallFollower::new(), &mut Headless)
        .expect("run");

    assert_eq!(controller.simulation().grid().count(Cell::Exit), 1);
}
