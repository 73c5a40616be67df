use anyhow::{Context, Result};
use clap::Parser;
use descent_core::{GeneratorConfig, MapGenerator};
use descent_tools::{audit_floor, init_logging};
use log::LevelFilter;
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    /// Number of whole runs to generate and audit
    #[arg(short, long, default_value_t = 200)]
    runs: u32,
    #[arg(long, default_value_t = LevelFilter::Error)]
    log_level: LevelFilter,
}

/// Geometry variations the runs rotate through.
const GEOMETRIES: [(usize, usize, usize, usize); 3] = [(40, 30, 3, 5), (64, 40, 5, 9), (24, 22, 2, 3)];

fn choose<T: Copy>(rng: &mut ChaCha8Rng, slice: &[T]) -> T {
    let p = rng.next_u64() as usize % slice.len();
    slice[p]
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_level);

    println!("Starting fuzz harness on seed {} for {} runs...", args.seed, args.runs);
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let mut floors_checked = 0_usize;
    let mut emergency_unlocks = 0_usize;

    for run in 0..args.runs {
        let run_seed = rng.next_u64();
        let (width, height, min_rooms, max_rooms) = choose(&mut rng, &GEOMETRIES);
        let config = GeneratorConfig {
            width,
            height,
            min_rooms,
            max_rooms,
            room_max_side: GeneratorConfig::default().room_max_side.min(width.min(height) - 5),
            ..GeneratorConfig::default()
        };
        let generator = MapGenerator::new(run_seed, config)
            .with_context(|| format!("run {run}: fuzz geometry {width}x{height} rejected"))?;

        for floor in generator.generate_run() {
            audit_floor(&floor)
                .with_context(|| format!("run {run} (seed {run_seed}) failed the audit"))?;
            if floor.metrics.progression.is_emergency() {
                emergency_unlocks += 1;
            }
            floors_checked += 1;
        }
    }

    println!(
        "Fuzzing completed successfully: {floors_checked} floors, {emergency_unlocks} emergency unlocks."
    );
    Ok(())
}
