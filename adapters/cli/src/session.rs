use std::{fs, path::Path};

use anyhow::{Context, Result};
use gridpath_core::{Agent, ControlSignal, Walkability};
use gridpath_system_map_generator::MapGenerator;
use gridpath_world::{
    ActiveMap, Controller, Frontend, RunEnding, RunOutcome, Simulation, SimulationConfig,
};
use log::info;

/// Map selection and run bookkeeping shared by the interactive commands.
#[derive(Debug)]
pub(crate) struct Session {
    generator: MapGenerator,
    active: ActiveMap,
    simulation: SimulationConfig,
}

/// What a session did before returning to the caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct SessionSummary {
    /// Runs started, restarts and new maps included.
    pub(crate) runs: u32,
    /// Outcome of the final run.
    pub(crate) last: RunOutcome,
}

impl Session {
    /// Starts on a freshly generated map, replaced by `map` when it loads.
    ///
    /// A map file that fails to parse is reported and the generated map is
    /// kept.
    pub(crate) fn new(
        mut generator: MapGenerator,
        simulation: SimulationConfig,
        map: Option<&Path>,
    ) -> Result<Self> {
        let mut active =
            ActiveMap::new(generator.generate()?).context("generated map is not playable")?;

        if let Some(path) = map {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read map {}", path.display()))?;
            if let Err(error) = active.load_str(&text) {
                eprintln!(
                    "could not load {}: {error}; keeping the generated map",
                    path.display()
                );
            }
        }

        Ok(Self {
            generator,
            active,
            simulation,
        })
    }

    /// Map new runs start from.
    pub(crate) fn active_map(&self) -> &ActiveMap {
        &self.active
    }

    /// Builds a controller over a fresh simulation of the active map.
    pub(crate) fn controller(&self) -> Result<Controller> {
        let simulation = Simulation::new(
            self.active.grid().clone(),
            Walkability::walls_only(),
            &self.simulation,
        )?;
        Ok(Controller::new(simulation))
    }

    /// Replaces the active map with a newly generated one.
    pub(crate) fn new_map(&mut self) -> Result<()> {
        let grid = self.generator.generate()?;
        self.active.replace(grid)?;
        Ok(())
    }

    /// Runs `agent` until it finishes or the user leaves.
    ///
    /// A restart re-runs the agent on the same map and a new-map request
    /// re-runs it on a freshly generated one.
    pub(crate) fn run_agent(
        &mut self,
        agent: &mut dyn Agent,
        frontend: &mut dyn Frontend,
    ) -> Result<SessionSummary> {
        let mut controller = self.controller()?;
        let mut runs = 0;

        loop {
            let outcome = controller.run(agent, frontend)?;
            runs += 1;

            match outcome.ending {
                RunEnding::Finished(finish) => {
                    println!(
                        "{} {finish} after {} ticks ({} moves, {} cells visited)",
                        agent.mode().title(),
                        outcome.ticks,
                        outcome.moves,
                        outcome.visited
                    );
                    return Ok(SessionSummary {
                        runs,
                        last: outcome,
                    });
                }
                RunEnding::Interrupted(ControlSignal::Restart) => info!("restarting run"),
                RunEnding::Interrupted(ControlSignal::NewMap) => {
                    self.new_map()?;
                    controller = self.controller()?;
                    info!("switched to a new map");
                }
                RunEnding::Interrupted(signal) => {
                    info!("leaving session: {signal:?}");
                    return Ok(SessionSummary {
                        runs,
                        last: outcome,
                    });
                }
            }
        }
    }
}
