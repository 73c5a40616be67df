use std::path::PathBuf;

use anyhow::{Context, Result, ensure};
use clap::Parser;
use descent_core::{GeneratedFloor, GeneratorConfig, MapGenerator};
use descent_tools::{FloorReport, floor_header, init_logging, load_config};
use log::LevelFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Run seed every floor is derived from
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    /// Single floor to generate; the whole run when omitted
    #[arg(short, long)]
    floor: Option<u8>,
    /// TOML file overriding the default generator config
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Print per-floor metrics as JSON instead of the ASCII map
    #[arg(long)]
    json: bool,
    #[arg(long, default_value_t = LevelFilter::Warn)]
    log_level: LevelFilter,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_level);

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => GeneratorConfig::default(),
    };
    let floor_count = config.floor_count;
    let generator = MapGenerator::new(args.seed, config).context("invalid generator config")?;

    let floors: Vec<GeneratedFloor> = match args.floor {
        Some(index) => {
            ensure!(
                (1..=floor_count).contains(&index),
                "floor {index} is outside 1..={floor_count}"
            );
            vec![generator.generate(index)]
        }
        None => generator.generate_run(),
    };

    if args.json {
        let reports: Vec<FloorReport<'_>> = floors.iter().map(FloorReport::new).collect();
        let json = serde_json::to_string_pretty(&reports)
            .context("failed to serialize floor metrics")?;
        println!("{json}");
        return Ok(());
    }

    for floor in &floors {
        println!("{}", floor_header(floor));
        println!("{}", floor.render_ascii());
    }
    Ok(())
}
