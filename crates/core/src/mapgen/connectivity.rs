//! Geometric reachability ignoring locks, and the orphan repair pass.

use std::collections::BTreeSet;

use log::warn;

use crate::types::{Pos, TileKind};

use super::corridors::{ConnectionEdge, carve_path, l_shaped_path};
use super::grid::GridMap;
use super::room::Room;
use super::seed::MapRng;

pub fn reachable_set(grid: &GridMap, start: Pos) -> BTreeSet<Pos> {
    grid.flood_fill(start, |tile| tile != TileKind::Wall)
}

pub fn validate_connectivity(grid: &GridMap, rooms: &[Room], start: Pos) -> bool {
    find_orphaned_rooms(grid, rooms, start).is_empty()
}

/// Indices of rooms whose center the flood fill from `start` never touches.
pub fn find_orphaned_rooms(grid: &GridMap, rooms: &[Room], start: Pos) -> Vec<usize> {
    let reachable = reachable_set(grid, start);
    rooms
        .iter()
        .enumerate()
        .filter(|(_, room)| !reachable.contains(&room.center()))
        .map(|(index, _)| index)
        .collect()
}

/// Carves a straight or L-shaped corridor between the two centers. The random walk is
/// never used here so the result is guaranteed.
pub fn force_connect_room(
    grid: &mut GridMap,
    orphan: &Room,
    anchor: &Room,
    rng: &mut MapRng,
) -> Vec<Pos> {
    let path = l_shaped_path(orphan.center(), anchor.center(), rng);
    carve_path(grid, &path);
    path
}

/// Links every orphan to room 0 and returns the repair edges that were added.
pub fn repair_connectivity(
    grid: &mut GridMap,
    rooms: &[Room],
    rng: &mut MapRng,
) -> Vec<ConnectionEdge> {
    let Some(anchor) = rooms.first() else {
        return Vec::new();
    };
    let start = anchor.center();
    let orphans = find_orphaned_rooms(grid, rooms, start);
    if orphans.is_empty() {
        return Vec::new();
    }

    warn!("connectivity check found {} orphaned room(s), force-connecting", orphans.len());
    let mut repairs = Vec::with_capacity(orphans.len());
    for orphan_index in orphans {
        let path = force_connect_room(grid, &rooms[orphan_index], anchor, rng);
        repairs.push(ConnectionEdge { from: orphan_index, to: 0, path, secondary: false });
    }

    if !validate_connectivity(grid, rooms, start) {
        warn!("connectivity still incomplete after repair");
    }
    repairs
}
