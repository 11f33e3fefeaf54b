use std::{collections::VecDeque, thread};

use gridpath_core::{legend, AgentMode, ControlCommand};
use gridpath_world::{query, render_map, Frontend, Simulation};
use log::warn;

/// Parses a comma-separated key script such as `p,f,f,p,r`.
///
/// Unknown keys are skipped with a warning.
pub(crate) fn parse_script(keys: &str) -> Vec<ControlCommand> {
    keys.split(',')
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .filter_map(|key| {
            let command = ControlCommand::from_key(key);
            if command.is_none() {
                warn!("ignoring unknown key {key:?}");
            }
            command
        })
        .collect()
}

/// One line listing every cell symbol with its display colour.
pub(crate) fn legend_line() -> String {
    legend()
        .iter()
        .map(|(cell, color)| format!("{} {}", cell.symbol(), color.to_hex()))
        .collect::<Vec<_>>()
        .join("  ")
}

/// Stdout frontend fed by a key script instead of live key presses.
///
/// Once the script runs out a paused run is resumed and a manual run
/// returns to the menu, so scripted sessions always terminate.
#[derive(Debug)]
pub(crate) struct TerminalFrontend {
    script: VecDeque<ControlCommand>,
    render: bool,
    animate: bool,
}

impl TerminalFrontend {
    pub(crate) fn new(script: Vec<ControlCommand>, render: bool, animate: bool) -> Self {
        Self {
            script: script.into(),
            render,
            animate,
        }
    }

    fn draw(simulation: &Simulation) {
        println!("{}", query::status_line(simulation, None));
        print!("{}", render_map(simulation.grid()));
        println!();
    }
}

impl Frontend for TerminalFrontend {
    fn present(&mut self, simulation: &Simulation, commands: &mut Vec<ControlCommand>) {
        if self.render {
            Self::draw(simulation);
        }
        if self.animate {
            thread::sleep(simulation.step_delay());
        }

        match self.script.pop_front() {
            Some(command) => commands.push(command),
            None if simulation.mode() == AgentMode::Manual => {
                commands.push(ControlCommand::MainMenu);
            }
            None if simulation.is_paused() => commands.push(ControlCommand::TogglePause),
            None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridpath_core::{ControlSignal, Finish, Position, Walkability};
    use gridpath_system_greedy::Greedy;
    use gridpath_world::{parse_map, Controller, ManualControl, RunEnding, SimulationConfig};

    fn controller() -> Controller {
        let grid = parse_map("P . . E\n").expect("well formed");
        Controller::new(
            Simulation::new(grid, Walkability::walls_only(), &SimulationConfig::default())
                .expect("playable"),
        )
    }

    #[test]
    fn scripts_skip_unknown_keys() {
        assert_eq!(
            parse_script("p, f ,q,,right,n"),
            vec![
                ControlCommand::TogglePause,
                ControlCommand::SpeedUp,
                ControlCommand::MoveRight,
                ControlCommand::NewMap,
            ]
        );
    }

    #[test]
    fn legend_lists_every_symbol() {
        let line = legend_line();

        assert!(line.starts_with(". #d3d3d3"));
        assert!(line.contains("X #34495e"));
        assert!(line.ends_with("V #fef08a"));
    }

    #[test]
    fn exhausted_script_resumes_paused_runs() {
        let mut controller = controller();
        let mut frontend = TerminalFrontend::new(vec![ControlCommand::TogglePause], false, false);

        let outcome = controller.run(&mut Greedy::new(), &mut frontend).expect("run");

        assert_eq!(outcome.ending, RunEnding::Finished(Finish::ReachedExit));
        assert_eq!(outcome.moves, 3);
    }

    #[test]
    fn exhausted_script_ends_manual_runs() {
        let mut controller = controller();
        let mut frontend = TerminalFrontend::new(parse_script("right,right"), false, false);

        let outcome = controller.run(&mut ManualControl, &mut frontend).expect("run");

        assert_eq!(outcome.ending, RunEnding::Interrupted(ControlSignal::MainMenu));
        assert_eq!(controller.simulation().player(), Position::new(0, 2));
    }
}
