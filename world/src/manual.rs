use gridpath_core::{Agent, AgentMode, Decision, Finish, SimulationView};

/// Agent for runs steered entirely by user move commands.
///
/// Moves arrive as [`ControlCommand`](gridpath_core::ControlCommand) values and
/// are applied by the simulation before the agent is consulted, so the agent
/// itself only watches for the player reaching the exit.
#[derive(Clone, Copy, Debug, Default)]
pub struct ManualControl;

impl Agent for ManualControl {
    fn mode(&self) -> AgentMode {
        AgentMode::Manual
    }

    fn next_move(&mut self, view: &SimulationView<'_>) -> Decision {
        if view.player() == view.exit() {
            Decision::Finish(Finish::ReachedExit)
        } else {
            Decision::Hold
        }
    }
}
