//! Shared plumbing for the `descent` and `fuzz` binaries.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result, ensure};
use descent_core::mapgen::access::find_accessible_tiles;
use descent_core::mapgen::{
    FloorTheme, GeneratedFloor, GenerationMetrics, GeneratorConfig, SpecialRoom, VaultFacet,
    is_completable,
};
use descent_core::{Pos, TileKind};
use log::{LevelFilter, Log, Metadata, Record};
use serde::Serialize;

/// Reads a TOML generator config. Missing keys keep their defaults.
pub fn load_config(path: &Path) -> Result<GeneratorConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;
    let config: GeneratorConfig = toml::from_str(&text)
        .with_context(|| format!("failed to parse config file: {}", path.display()))?;
    config.validate().with_context(|| format!("invalid config in {}", path.display()))?;
    Ok(config)
}

struct StderrLogger;

static LOGGER: StderrLogger = StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let mut stderr = io::stderr().lock();
        // Nowhere left to report a failed write to stderr.
        let _ = writeln!(stderr, "[{:<5} {}] {}", record.level(), record.target(), record.args());
    }

    fn flush(&self) {
        let _ = io::stderr().flush();
    }
}

/// Installs the stderr logger. Calling it twice keeps the first logger and only moves the level.
pub fn init_logging(level: LevelFilter) {
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(level);
}

/// Per-floor record printed by `descent --json`.
#[derive(Debug, Serialize)]
pub struct FloorReport<'a> {
    pub floor_index: u8,
    pub theme: FloorTheme,
    pub fingerprint: String,
    pub spawn_tile: Pos,
    pub arrival_tile: Pos,
    pub goal_tile: Pos,
    pub enemy_spawns: usize,
    pub metrics: &'a GenerationMetrics,
}

impl<'a> FloorReport<'a> {
    pub fn new(floor: &'a GeneratedFloor) -> Self {
        Self {
            floor_index: floor.floor_index,
            theme: floor.theme,
            fingerprint: format!("{:016x}", floor.fingerprint()),
            spawn_tile: floor.spawn_tile,
            arrival_tile: floor.arrival_tile,
            goal_tile: floor.goal_tile,
            enemy_spawns: floor.enemy_spawns.len(),
            metrics: &floor.metrics,
        }
    }
}

/// One-line header shown above each rendered floor.
pub fn floor_header(floor: &GeneratedFloor) -> String {
    format!(
        "floor {} ({:?}) {}x{} rooms={} enemies={} progression={:?} hash={:016x}",
        floor.floor_index,
        floor.theme,
        floor.grid.width(),
        floor.grid.height(),
        floor.rooms.len(),
        floor.enemy_spawns.len(),
        floor.metrics.progression,
        floor.fingerprint(),
    )
}

/// Structural checks every generated floor must pass.
pub fn audit_floor(floor: &GeneratedFloor) -> Result<()> {
    let grid = &floor.grid;
    let index = floor.floor_index;

    ensure!(
        is_completable(grid, floor.spawn_tile, floor.goal_tile),
        "floor {index}: goal {:?} unreachable from {:?}",
        floor.goal_tile,
        floor.spawn_tile
    );

    let vaults = floor.rooms.iter().filter(|room| room.special.is_vault()).count();
    ensure!(vaults <= 1, "floor {index}: {vaults} vaults");

    let (width, height) = (grid.width() as i32, grid.height() as i32);
    let border = (0..width)
        .flat_map(|x| [Pos::new(x, 0), Pos::new(x, height - 1)])
        .chain((0..height).flat_map(|y| [Pos::new(0, y), Pos::new(width - 1, y)]));
    for pos in border {
        ensure!(grid.tile_at(pos) == TileKind::Wall, "floor {index}: border {pos:?} is open");
    }

    let accessible = find_accessible_tiles(grid, floor.spawn_tile);
    for room in &floor.rooms {
        if let SpecialRoom::Vault(VaultFacet { key: Some(key), locked: true, .. }) = &room.special {
            ensure!(!room.rect.contains(*key), "floor {index}: key {key:?} inside its vault");
            ensure!(accessible.contains(key), "floor {index}: key {key:?} behind a lock");
        }
    }

    for spawn in &floor.enemy_spawns {
        ensure!(
            spawn.pos != floor.spawn_tile && spawn.pos != floor.goal_tile,
            "floor {index}: enemy on stairs at {:?}",
            spawn.pos
        );
        ensure!(
            grid.tile_at(spawn.pos).is_walkable(),
            "floor {index}: enemy inside a wall at {:?}",
            spawn.pos
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use descent_core::MapGenerator;
    use tempfile::NamedTempFile;

    fn write_config(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(contents.as_bytes()).expect("write config");
        file
    }

    #[test]
    fn partial_toml_config_keeps_defaults() {
        let file = write_config("width = 64\nheight = 40\nmax_rooms = 8\n");

        let config = load_config(file.path()).expect("config should load");

        assert_eq!(config.width, 64);
        assert_eq!(config.height, 40);
        assert_eq!(config.max_rooms, 8);
        assert_eq!(config.min_rooms, GeneratorConfig::default().min_rooms);
    }

    #[test]
    fn invalid_geometry_is_reported_with_the_path() {
        let file = write_config("width = 12\nheight = 12\n");

        let error = load_config(file.path()).expect_err("room sides do not fit");

        let message = format!("{error:#}");
        assert!(message.contains("invalid config"), "{message}");
        assert!(message.contains("does not fit"), "{message}");
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let file = write_config("width = \"wide\"\n");
        let error = load_config(file.path()).expect_err("width must be a number");
        assert!(format!("{error:#}").contains("failed to parse"));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let error = load_config(&dir.path().join("absent.toml")).expect_err("no such file");
        assert!(format!("{error:#}").contains("failed to read"));
    }

    #[test]
    fn generated_run_passes_the_audit() {
        for floor in MapGenerator::with_defaults(2_024).generate_run() {
            audit_floor(&floor).expect("generated floor should pass the audit");
        }
    }

    #[test]
    fn report_serializes_metrics() {
        let floor = MapGenerator::with_defaults(5).generate(3);
        let json = serde_json::to_value(FloorReport::new(&floor)).expect("report serializes");

        assert_eq!(json["floor_index"], 3);
        assert_eq!(json["metrics"]["room_count"], floor.rooms.len());
        assert_eq!(json["fingerprint"].as_str().map(str::len), Some(16));
    }
}
