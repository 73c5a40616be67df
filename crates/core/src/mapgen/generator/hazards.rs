//! Theme-driven hazards and gameplay hints laid over a finished floor.

use std::collections::BTreeSet;

use crate::types::{Pos, TileKind};

use super::super::grid::GridMap;
use super::super::model::HazardReport;
use super::super::progression::FloorTheme;
use super::super::room::{Room, SpecialRoom};
use super::super::seed::MapRng;

const MIN_TRAPS: usize = 1;
const MAX_TRAPS: usize = 3;
const PUDDLE_CHANCE: f64 = 0.5;
const MAX_PUDDLE_CELLS: usize = 4;

pub(super) struct HazardContext<'a> {
    pub(super) rooms: &'a [Room],
    pub(super) theme: FloorTheme,
    pub(super) spawn_tile: Pos,
    pub(super) goal_tile: Pos,
}

pub(super) fn apply_hazards(
    grid: &mut GridMap,
    context: &HazardContext<'_>,
    rng: &mut MapRng,
) -> HazardReport {
    let traps = place_traps(grid, context, rng);
    let water_tiles = if context.theme.has_water() { scatter_water(grid, context, rng) } else { 0 };
    let break_rooms = register_break_rooms(grid, context.rooms);
    HazardReport { traps, water_tiles, break_rooms }
}

fn open_floor(grid: &GridMap, context: &HazardContext<'_>, room: &Room) -> Vec<Pos> {
    room.rect
        .interior_cells()
        .filter(|&pos| grid.tile_at(pos) == TileKind::Floor)
        .filter(|&pos| pos.manhattan(context.spawn_tile) > 1 && pos != context.goal_tile)
        .collect()
}

fn place_traps(grid: &mut GridMap, context: &HazardContext<'_>, rng: &mut MapRng) -> usize {
    let mut placed = 0;
    for room in context.rooms.iter().filter(|room| room.special == SpecialRoom::Trap) {
        let target = rng.range_inclusive(MIN_TRAPS, MAX_TRAPS);
        let mut candidates = open_floor(grid, context, room);
        rng.shuffle(&mut candidates);
        for pos in candidates.into_iter().take(target) {
            grid.set_tile_at(pos, TileKind::Trap);
            placed += 1;
        }
    }
    placed
}

/// Small walkable puddles grown from a seed cell in ordinary, non-stairs rooms.
fn scatter_water(grid: &mut GridMap, context: &HazardContext<'_>, rng: &mut MapRng) -> usize {
    let last_room = context.rooms.len().saturating_sub(1);
    let mut flooded = 0;
    for (room_index, room) in context.rooms.iter().enumerate() {
        if room_index == 0 || room_index == last_room || room.special.is_special() {
            continue;
        }
        if !rng.chance(PUDDLE_CHANCE) {
            continue;
        }
        let candidates = open_floor(grid, context, room);
        let Some(&origin) = rng.pick(&candidates) else {
            continue;
        };
        let allowed: BTreeSet<Pos> = candidates.into_iter().collect();
        let size = rng.range_inclusive(1, MAX_PUDDLE_CELLS);
        let mut puddle = vec![origin];
        while puddle.len() < size {
            let frontier: Vec<Pos> = puddle
                .iter()
                .flat_map(|pos| pos.neighbors())
                .filter(|next| allowed.contains(next) && !puddle.contains(next))
                .collect();
            let Some(&next) = rng.pick(&frontier) else {
                break;
            };
            puddle.push(next);
        }
        for pos in puddle {
            grid.set_tile_at(pos, TileKind::Water);
            flooded += 1;
        }
    }
    flooded
}

fn register_break_rooms(grid: &mut GridMap, rooms: &[Room]) -> usize {
    let mut registered = 0;
    for room in rooms.iter().filter(|room| room.special == SpecialRoom::Shrine) {
        grid.add_break_room(room.rect);
        registered += 1;
    }
    registered
}

/// Flags interior walls as breakable with the theme's odds. The outer ring and vault
/// perimeters are never flagged.
pub(super) fn mark_bashable_walls(
    grid: &mut GridMap,
    rooms: &[Room],
    theme: FloorTheme,
    rng: &mut MapRng,
) -> usize {
    let walls: Vec<Pos> = grid
        .interior_positions()
        .filter(|&pos| grid.tile_at(pos) == TileKind::Wall)
        .filter(|&pos| {
            !rooms.iter().any(|room| room.special.is_vault() && room.rect.is_perimeter(pos))
        })
        .collect();
    let chance = theme.bashable_chance();
    for pos in walls {
        if rng.chance(chance) {
            grid.set_wall_bashable(pos.x, pos.y, true);
        }
    }
    grid.bashable_count()
}
