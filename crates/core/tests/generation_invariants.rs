use descent_core::mapgen::access::find_accessible_tiles;
use descent_core::mapgen::{
    GeneratedFloor, GeneratorConfig, MAX_FLOORS, MapGenerator, SpecialRoom, VaultFacet,
    is_completable,
};
use descent_core::{Pos, TileKind};
use proptest::{
    arbitrary::any,
    test_runner::{Config as ProptestConfig, TestCaseError, TestRunner},
};

fn check_floor(floor: &GeneratedFloor) -> Result<(), String> {
    let grid = &floor.grid;
    let label = format!("floor {}", floor.floor_index);

    if !is_completable(grid, floor.spawn_tile, floor.goal_tile) {
        return Err(format!("{label}: goal {:?} unreachable", floor.goal_tile));
    }

    let vaults = floor.rooms.iter().filter(|room| room.special.is_vault()).count();
    if vaults > 1 {
        return Err(format!("{label}: {vaults} vaults"));
    }

    for x in 0..grid.width() as i32 {
        for y in [0, grid.height() as i32 - 1] {
            if grid.get_tile(x, y) != TileKind::Wall {
                return Err(format!("{label}: border cell ({x},{y}) is not wall"));
            }
        }
    }
    for y in 0..grid.height() as i32 {
        for x in [0, grid.width() as i32 - 1] {
            if grid.get_tile(x, y) != TileKind::Wall {
                return Err(format!("{label}: border cell ({x},{y}) is not wall"));
            }
        }
    }
    for (x, y) in [(-1, 0), (0, -1), (grid.width() as i32, 3), (3, grid.height() as i32)] {
        if grid.get_tile(x, y) != TileKind::Wall {
            return Err(format!("{label}: out-of-bounds ({x},{y}) is not wall"));
        }
    }

    if floor.floor_index == 1 && grid.tile_at(floor.arrival_tile) != TileKind::Floor {
        return Err(format!("{label}: arrival tile {:?} is not bare floor", floor.arrival_tile));
    }

    let accessible = find_accessible_tiles(grid, floor.spawn_tile);
    for room in &floor.rooms {
        let SpecialRoom::Vault(VaultFacet { key: Some(key), locked, .. }) = &room.special else {
            continue;
        };
        if room.rect.contains(*key) {
            return Err(format!("{label}: key {key:?} inside its own vault"));
        }
        if *locked && !accessible.contains(key) {
            return Err(format!("{label}: key {key:?} sits behind a lock"));
        }
        if *locked && grid.tile_at(*key) != TileKind::Key {
            return Err(format!("{label}: key tile at {key:?} was overwritten"));
        }
    }

    for spawn in &floor.enemy_spawns {
        if spawn.pos == floor.spawn_tile || spawn.pos == floor.goal_tile {
            return Err(format!("{label}: enemy on stairs at {:?}", spawn.pos));
        }
        if grid.is_position_in_break_room(spawn.pos.x, spawn.pos.y) {
            return Err(format!("{label}: enemy inside a break room at {:?}", spawn.pos));
        }
    }
    Ok(())
}

#[test]
fn proptest_generated_floors_hold_structural_invariants() {
    let mut runner = TestRunner::new(ProptestConfig { cases: 128, ..ProptestConfig::default() });
    runner
        .run(&(any::<u64>(), 1_u8..=MAX_FLOORS), |(seed, floor_index)| {
            let floor = MapGenerator::with_defaults(seed).generate(floor_index);
            check_floor(&floor).map_err(|message| {
                TestCaseError::fail(format!("seed {seed}: {message}"))
            })
        })
        .expect("generated floors must satisfy the structural invariants");
}

#[test]
fn proptest_larger_maps_stay_completable() {
    let config = GeneratorConfig {
        width: 64,
        height: 40,
        min_rooms: 5,
        max_rooms: 9,
        ..GeneratorConfig::default()
    };
    let mut runner = TestRunner::new(ProptestConfig { cases: 48, ..ProptestConfig::default() });
    runner
        .run(&(any::<u64>(), 1_u8..=MAX_FLOORS), |(seed, floor_index)| {
            let generator =
                MapGenerator::new(seed, config.clone()).expect("config should validate");
            let floor = generator.generate(floor_index);
            check_floor(&floor).map_err(|message| {
                TestCaseError::fail(format!("seed {seed}: {message}"))
            })
        })
        .expect("larger floors must satisfy the structural invariants");
}

#[test]
fn first_floor_arrival_tile_stays_clear() {
    for seed in 0..400_u64 {
        let floor = MapGenerator::with_defaults(seed).generate(1);
        assert_eq!(floor.arrival_tile, floor.spawn_tile);
        assert_eq!(floor.tile_at(floor.spawn_tile), TileKind::Floor, "seed {seed}");
    }
}

#[test]
fn whole_runs_are_reproducible_from_the_run_seed() {
    for seed in [7_u64, 8_088, 123_456_789] {
        let first: Vec<u64> = MapGenerator::with_defaults(seed)
            .generate_run()
            .iter()
            .map(GeneratedFloor::fingerprint)
            .collect();
        let second: Vec<u64> = MapGenerator::with_defaults(seed)
            .generate_run()
            .iter()
            .map(GeneratedFloor::fingerprint)
            .collect();
        assert_eq!(first, second, "seed {seed}");

        let mut distinct = first.clone();
        distinct.sort_unstable();
        distinct.dedup();
        assert_eq!(distinct.len(), first.len(), "seed {seed} repeated a floor");
    }
}

#[test]
fn rendering_matches_grid_dimensions() {
    let floor = MapGenerator::with_defaults(99).generate(5);
    let rendered = floor.render_ascii();
    let lines: Vec<&str> = rendered.lines().collect();

    assert_eq!(lines.len(), floor.grid.height());
    assert!(lines.iter().all(|line| line.chars().count() == floor.grid.width()));
    let goal = floor.goal_tile;
    let goal_glyph = lines[goal.y as usize].chars().nth(goal.x as usize);
    assert_eq!(goal_glyph, Some(TileKind::StairsDown.glyph()));
}

#[test]
fn tile_mutation_is_idempotent() {
    let mut floor = MapGenerator::with_defaults(31).generate(2);
    let target = Pos::new(3, 3);
    assert!(floor.grid.set_tile_at(target, TileKind::Water));
    let once = floor.grid.clone();
    assert!(floor.grid.set_tile_at(target, TileKind::Water));
    assert_eq!(floor.grid, once);
}
