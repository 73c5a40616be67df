pub mod mapgen;
pub mod types;

pub use mapgen::{
    GeneratedFloor, GeneratorConfig, GridMap, MapGenerator, generate_floor, generate_run,
};
pub use types::*;
