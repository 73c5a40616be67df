//! Procedural floor generation split into coherent submodules.

pub mod access;
pub mod config;
pub mod connectivity;
pub mod corridors;
pub mod grid;
pub mod layout;
pub mod model;
pub mod progression;
pub mod room;
pub mod seed;
pub mod shapes;
pub mod validation;
pub mod vaults;

mod generator;
mod spawns;

pub use config::{ConfigError, GeneratorConfig};
pub use generator::MapGenerator;
pub use grid::GridMap;
pub use model::{EnemySpawn, GeneratedFloor, GenerationMetrics};
pub use progression::{FloorTheme, MAX_FLOORS, STARTING_FLOOR_INDEX};
pub use room::{Door, DoorState, Room, RoomRect, RoomShape, SizeTier, SpecialRoom, VaultFacet};
pub use seed::{MapRng, derive_floor_seed};
pub use validation::{ProgressionOutcome, is_completable};

/// One floor of a run with the default geometry.
pub fn generate_floor(run_seed: u64, floor_index: u8) -> GeneratedFloor {
    MapGenerator::with_defaults(run_seed).generate(floor_index)
}

/// Every floor of a run, validating `config` first.
pub fn generate_run(
    run_seed: u64,
    config: GeneratorConfig,
) -> Result<Vec<GeneratedFloor>, ConfigError> {
    Ok(MapGenerator::new(run_seed, config)?.generate_run())
}

#[cfg(test)]
mod tests {
    use super::{GeneratorConfig, MapGenerator};

    #[test]
    fn generate_floor_matches_map_generator_output() {
        let seed = 123_u64;
        let floor_index = 2_u8;

        let from_helper = super::generate_floor(seed, floor_index);
        let from_generator = MapGenerator::with_defaults(seed).generate(floor_index);

        assert_eq!(from_helper, from_generator);
    }

    #[test]
    fn generate_run_regenerates_each_floor_in_isolation() {
        let config = GeneratorConfig { floor_count: 4, ..GeneratorConfig::default() };
        let run = super::generate_run(77, config.clone()).expect("default geometry is valid");

        assert_eq!(run.len(), 4);
        let generator = MapGenerator::new(77, config).expect("default geometry is valid");
        assert_eq!(run[2], generator.generate(3));
        assert!(run.iter().zip(1_u8..).all(|(floor, index)| floor.floor_index == index));
    }
}
