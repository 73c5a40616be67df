//! Room placement and the spanning-tree connection graph over room centers.

use log::debug;

use super::config::GeneratorConfig;
use super::grid::GridMap;
use super::room::{Room, RoomRect};
use super::seed::MapRng;
use super::shapes::{carve, categorize, choose_shape, decorate};

const EDGE_MARGIN: usize = 2;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoomPlacement {
    pub rooms: Vec<Room>,
    pub attempts: usize,
}

/// Scatters non-overlapping rooms, carving and decorating each one as soon as it is accepted.
pub fn place_rooms(grid: &mut GridMap, config: &GeneratorConfig, rng: &mut MapRng) -> RoomPlacement {
    let target_room_count = rng.range_inclusive(config.min_rooms, config.max_rooms);
    let mut rooms: Vec<Room> = Vec::with_capacity(target_room_count);
    let mut attempts = 0;

    while rooms.len() < target_room_count && attempts < config.placement_attempts {
        attempts += 1;

        let room_width = rng.range_inclusive(config.room_min_side, config.room_max_side);
        let room_height = rng.range_inclusive(config.room_min_side, config.room_max_side);
        let Some(candidate) = random_rect(grid, room_width, room_height, rng) else {
            continue;
        };

        let candidate_with_margin = candidate.expanded(1);
        if rooms
            .iter()
            .any(|existing: &Room| existing.rect.expanded(1).intersects(&candidate_with_margin))
        {
            continue;
        }

        rooms.push(build_room(grid, candidate, rng));
    }

    if rooms.is_empty() {
        let fallback = fallback_rect(grid, config.room_min_side);
        debug!("room placement exhausted {attempts} attempts, using fallback room {fallback:?}");
        rooms.push(build_room(grid, fallback, rng));
    }

    RoomPlacement { rooms, attempts }
}

fn random_rect(
    grid: &GridMap,
    room_width: usize,
    room_height: usize,
    rng: &mut MapRng,
) -> Option<RoomRect> {
    let x_span = grid.width().checked_sub(room_width + 2 * EDGE_MARGIN).filter(|&span| span > 0)?;
    let y_span =
        grid.height().checked_sub(room_height + 2 * EDGE_MARGIN).filter(|&span| span > 0)?;
    let x = EDGE_MARGIN + rng.below(x_span);
    let y = EDGE_MARGIN + rng.below(y_span);
    Some(RoomRect::new(x, y, room_width, room_height))
}

fn fallback_rect(grid: &GridMap, side: usize) -> RoomRect {
    let width = side.min(grid.width().saturating_sub(2 * EDGE_MARGIN)).max(1);
    let height = side.min(grid.height().saturating_sub(2 * EDGE_MARGIN)).max(1);
    RoomRect::new((grid.width() - width) / 2, (grid.height() - height) / 2, width, height)
}

pub(super) fn build_room(grid: &mut GridMap, rect: RoomRect, rng: &mut MapRng) -> Room {
    let tier = categorize(rect.width, rect.height);
    let shape = choose_shape(tier, rng);
    carve(grid, rect, shape, rng);
    let mut room = Room::new(rect, tier, shape);
    decorate(grid, &mut room, rng);
    room
}

/// Prim-style spanning tree: room 0 starts connected and each step links the closest
/// (connected, unconnected) pair by Manhattan distance between centers.
pub fn build_connection_graph(rooms: &[Room]) -> Vec<(usize, usize)> {
    if rooms.len() < 2 {
        return Vec::new();
    }

    let mut connected_room_indices = vec![0_usize];
    let mut pending_room_indices: Vec<usize> = (1..rooms.len()).collect();
    let mut edges = Vec::with_capacity(rooms.len() - 1);

    while !pending_room_indices.is_empty() {
        let mut best_choice: Option<(u32, usize, usize)> = None;
        for &connected_index in &connected_room_indices {
            let connected_center = rooms[connected_index].center();
            for &pending_index in &pending_room_indices {
                let distance = connected_center.manhattan(rooms[pending_index].center());
                if best_choice.is_none_or(|(best_distance, _, _)| distance < best_distance) {
                    best_choice = Some((distance, connected_index, pending_index));
                }
            }
        }

        let Some((_, connected_index, pending_index)) = best_choice else {
            break;
        };
        edges.push((connected_index, pending_index));
        connected_room_indices.push(pending_index);
        pending_room_indices.retain(|&index| index != pending_index);
    }

    edges
}
