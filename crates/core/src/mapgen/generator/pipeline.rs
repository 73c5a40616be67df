//! Floor-construction pipeline that composes mapgen subsystems in a fixed order.

use log::{error, info};

use crate::types::{Pos, TileKind};

use super::super::access::{assign_special_rooms, place_doors, place_keys};
use super::super::config::GeneratorConfig;
use super::super::connectivity::{reachable_set, repair_connectivity};
use super::super::corridors::carve_corridors;
use super::super::grid::GridMap;
use super::super::layout::{build_connection_graph, place_rooms};
use super::super::model::{GeneratedFloor, GenerationMetrics, RoomProfile};
use super::super::progression::{self, FloorTheme};
use super::super::room::{Room, SpecialRoom};
use super::super::seed::{MapRng, derive_floor_seed};
use super::super::spawns::{SpawnContext, generate_enemy_spawns, place_pickups};
use super::super::validation::{is_completable, validate_progression};
use super::super::vaults::apply_vault_templates;
use super::hazards::{HazardContext, apply_hazards, mark_bashable_walls};

pub(super) fn generate_floor(
    run_seed: u64,
    config: &GeneratorConfig,
    floor_index: u8,
) -> GeneratedFloor {
    let floor_seed = derive_floor_seed(run_seed, floor_index);
    let mut rng = MapRng::from_seed(floor_seed);
    let theme = FloorTheme::for_floor(floor_index);
    let mut grid = GridMap::new(config.width, config.height);

    let placement = place_rooms(&mut grid, config, &mut rng);
    let mut rooms = placement.rooms;
    let tree_edges = build_connection_graph(&rooms);
    let corridors = carve_corridors(&mut grid, &rooms, &tree_edges, &mut rng);
    let mut edges = corridors.edges;
    let repairs = repair_connectivity(&mut grid, &rooms, &mut rng);
    let orphans_repaired = repairs.len();
    edges.extend(repairs);

    let spawn_tile = rooms[0].center();
    let goal_tile = resolve_goal_tile(&grid, &rooms, spawn_tile);
    place_stairs(&mut grid, &mut rooms, floor_index, config.floor_count, spawn_tile, goal_tile);

    assign_special_rooms(&mut rooms, &mut rng);
    apply_vault_templates(&mut grid, &mut rooms, &mut rng);
    let doors = place_doors(&mut grid, &mut rooms, &mut rng);
    let keys = place_keys(&mut grid, &mut rooms, spawn_tile, &mut rng);
    let progression_outcome = validate_progression(&mut grid, &mut rooms, spawn_tile, goal_tile);
    if !is_completable(&grid, spawn_tile, goal_tile) {
        error!("floor {floor_index} (seed {floor_seed:#x}) still incomplete after validation");
    }

    let hazards = apply_hazards(
        &mut grid,
        &HazardContext { rooms: &rooms, theme, spawn_tile, goal_tile },
        &mut rng,
    );
    let spawn_context = SpawnContext { floor_index, rooms: &rooms, spawn_tile, goal_tile };
    let pickups = place_pickups(&mut grid, &spawn_context, &mut rng);
    let enemy_spawns = generate_enemy_spawns(&grid, &spawn_context, &mut rng);
    let bashable_walls = mark_bashable_walls(&mut grid, &rooms, theme, &mut rng);

    let arrival_tile = if progression::is_first_floor(floor_index) {
        spawn_tile
    } else {
        grid.find_safe_spawn_near_upstairs()
    };

    let metrics = GenerationMetrics {
        room_count: rooms.len(),
        placement_attempts: placement.attempts,
        room_profiles: rooms
            .iter()
            .map(|room| RoomProfile { tier: room.tier, shape: room.shape })
            .collect(),
        corridor_edges: edges.len(),
        secondary_loops: corridors.secondary_loops,
        walk_fallbacks: corridors.walk_fallbacks,
        orphans_repaired,
        doors,
        keys,
        vault_template: rooms.iter().find_map(|room| match &room.special {
            SpecialRoom::Vault(facet) => facet.template,
            _ => None,
        }),
        progression: progression_outcome,
        bashable_walls,
        hazards,
        pickups,
    };
    info!(
        "floor {floor_index} ({theme:?}): {} rooms in {} attempts, {} corridors ({} loops, {} fallbacks, {} repairs), doors {}/{}/{} open/closed/locked, keys {} placed {} failed, vault {:?}, {:?}, {} bashable walls",
        metrics.room_count,
        metrics.placement_attempts,
        metrics.corridor_edges,
        metrics.secondary_loops,
        metrics.walk_fallbacks,
        metrics.orphans_repaired,
        metrics.doors.open,
        metrics.doors.closed,
        metrics.doors.locked,
        metrics.keys.placed,
        metrics.keys.failed,
        metrics.vault_template,
        metrics.progression,
        metrics.bashable_walls,
    );

    GeneratedFloor {
        floor_index,
        theme,
        grid,
        rooms,
        edges,
        spawn_tile,
        arrival_tile,
        goal_tile,
        enemy_spawns,
        metrics,
    }
}

/// The last room's center, or on single-room floors the reachable cell farthest from spawn.
fn resolve_goal_tile(grid: &GridMap, rooms: &[Room], spawn_tile: Pos) -> Pos {
    let last_center = rooms[rooms.len() - 1].center();
    if last_center != spawn_tile {
        return last_center;
    }
    farthest_reachable_tile(grid, spawn_tile)
}

fn farthest_reachable_tile(grid: &GridMap, start: Pos) -> Pos {
    let mut farthest = start;
    let mut farthest_distance = 0;
    for pos in reachable_set(grid, start) {
        let distance = pos.manhattan(start);
        if distance > farthest_distance {
            farthest = pos;
            farthest_distance = distance;
        }
    }
    farthest
}

fn place_stairs(
    grid: &mut GridMap,
    rooms: &mut [Room],
    floor_index: u8,
    floor_count: u8,
    spawn_tile: Pos,
    goal_tile: Pos,
) {
    let spawn_kind = if progression::is_first_floor(floor_index) {
        TileKind::Floor
    } else {
        TileKind::StairsUp
    };
    let goal_kind = if progression::is_final_floor(floor_index, floor_count) {
        TileKind::Toilet
    } else {
        TileKind::StairsDown
    };
    grid.set_tile_at(spawn_tile, spawn_kind);
    grid.set_tile_at(goal_tile, goal_kind);
    for room in rooms.iter_mut() {
        room.features.retain(|&pos| pos != spawn_tile && pos != goal_tile);
    }
}
