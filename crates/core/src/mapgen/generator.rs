//! High-level map generation entry point over the floor pipeline.

mod hazards;
mod pipeline;

use super::config::{ConfigError, GeneratorConfig};
use super::model::GeneratedFloor;
use super::progression::STARTING_FLOOR_INDEX;

#[derive(Clone, Debug)]
pub struct MapGenerator {
    run_seed: u64,
    config: GeneratorConfig,
}

impl MapGenerator {
    pub fn new(run_seed: u64, config: GeneratorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { run_seed, config })
    }

    pub fn with_defaults(run_seed: u64) -> Self {
        Self { run_seed, config: GeneratorConfig::default() }
    }

    pub fn run_seed(&self) -> u64 {
        self.run_seed
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Builds one floor. The same seed, config, and index always give the same floor.
    pub fn generate(&self, floor_index: u8) -> GeneratedFloor {
        pipeline::generate_floor(self.run_seed, &self.config, floor_index)
    }

    /// Every floor of the run, top to bottom.
    pub fn generate_run(&self) -> Vec<GeneratedFloor> {
        (STARTING_FLOOR_INDEX..=self.config.floor_count)
            .map(|floor_index| self.generate(floor_index))
            .collect()
    }
}
