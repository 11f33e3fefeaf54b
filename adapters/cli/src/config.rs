use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use gridpath_system_map_generator::GeneratorConfig;
use gridpath_system_q_learning::{QLearningConfig, RewardShaping};
use gridpath_world::SimulationConfig;
use serde::Deserialize;

/// Settings read from the optional TOML configuration file.
///
/// Every section is optional and falls back to its defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct AppConfig {
    pub(crate) simulation: SimulationConfig,
    pub(crate) generator: GeneratorConfig,
    pub(crate) q_learning: QLearningConfig,
    pub(crate) rewards: RewardShaping,
    pub(crate) cli: CliSettings,
}

/// Presentation defaults for interactive commands.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct CliSettings {
    /// Print every frame to stdout.
    pub(crate) render: bool,
    /// Wait for the step delay between frames.
    pub(crate) animate: bool,
    /// Map file used when no `--map` flag is given.
    pub(crate) map: Option<PathBuf>,
}

impl AppConfig {
    /// Reads the configuration at `path`, or the defaults when no file is given.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read configuration {}", path.display()))?;
        Self::parse(&text)
            .with_context(|| format!("invalid configuration in {}", path.display()))
    }

    /// Picks the run's seed: the `--seed` flag, then `[q_learning] seed`,
    /// then entropy. The chosen seed is written back so training reuses it.
    pub(crate) fn resolve_seed(&mut self, flag: Option<u64>) -> u64 {
        let seed = flag
            .or(self.q_learning.seed)
            .unwrap_or_else(rand::random);
        self.q_learning.seed = Some(seed);
        seed
    }

    fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }
}
