use gridpath_core::{Cell, Walkability};
use gridpath_system_map_generator::{GeneratorConfig, MapGenerator};
use gridpath_system_pathfinding::flood_fill;
use gridpath_world::{locate_markers, Simulation, SimulationConfig};
use proptest::prelude::*;

proptest! {
    #[test]
    fn every_open_cell_is_reachable(
        rows in 2u32..20,
        columns in 2u32..20,
        wall_density in 0.0f64..=1.0,
        seed in any::<u64>()
    ) {
        let mut generator = MapGenerator::new(
            GeneratorConfig { rows, columns, wall_density },
            seed,
        ).expect("valid configuration");

        let grid = generator.generate().expect("generate");
        let (start, exit) = locate_markers(&grid).expect("exactly one player and exit");
        let field = flood_fill(&grid, start, |cell| cell != Cell::Wall);

        prop_assert!(field.is_reachable(exit));
        let open = grid.iter().filter(|(_, cell)| *cell != Cell::Wall).count();
        prop_assert_eq!(field.reachable_count(), open);
    }

    #[test]
    fn generated_maps_are_playable(seed in any::<u64>()) {
        let mut generator = MapGenerator::new(GeneratorConfig::default(), seed)
            .expect("valid configuration");

        let grid = generator.generate().expect("generate");

        prop_assert!(
            Simulation::new(grid, Walkability::walls_only(), &SimulationConfig::default()).is_ok()
        );
    }
}

#[test]
fn thin_grids_still_separate_start_and_exit() {
    for (rows, columns) in [(1, 2), (2, 1), (1, 7), (3, 1)] {
        let mut generator = MapGenerator::new(
            GeneratorConfig {
                rows,
                columns,
                wall_density: 0.5,
            },
            1,
        )
        .expect("valid configuration");

        let grid = generator.generate().expect("generate");

        assert!(locate_markers(&grid).is_ok(), "{rows}x{columns}");
    }
}
