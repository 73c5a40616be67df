//! Special-room roles, door placement, and key drops that respect the lock they open.

use std::collections::BTreeSet;

use log::{debug, warn};
use serde::Serialize;

use crate::types::{Pos, TileKind};

use super::grid::GridMap;
use super::room::{Door, DoorState, Room, SpecialRoom, VaultFacet};
use super::seed::MapRng;
pub use super::vaults::find_room_entrances;

const VAULT_CHANCE: f64 = 0.75;
const MAX_SPECIAL_ROOMS: usize = 2;
const KEY_PLACEMENT_ATTEMPTS: usize = 50;

/// Picks 1-2 rooms between the stairs rooms and gives each a special role. The first
/// pick usually becomes the single vault. Returns how many rooms were assigned.
pub fn assign_special_rooms(rooms: &mut [Room], rng: &mut MapRng) -> usize {
    if rooms.len() < 2 {
        return 0;
    }
    let mut candidates: Vec<usize> = (1..rooms.len() - 1).collect();
    if candidates.is_empty() {
        return 0;
    }
    rng.shuffle(&mut candidates);
    let chosen_count = rng.range_inclusive(1, MAX_SPECIAL_ROOMS).min(candidates.len());

    for (pick, &room_index) in candidates.iter().take(chosen_count).enumerate() {
        let special = if pick == 0 && rng.chance(VAULT_CHANCE) {
            SpecialRoom::Vault(VaultFacet { locked: true, ..VaultFacet::default() })
        } else {
            random_plain_special(rng)
        };
        debug!("room {room_index} assigned {special:?}");
        rooms[room_index].special = special;
    }
    chosen_count
}

fn random_plain_special(rng: &mut MapRng) -> SpecialRoom {
    match rng.below(4) {
        0 => SpecialRoom::Shrine,
        1 => SpecialRoom::Arena,
        2 => SpecialRoom::Library,
        _ => SpecialRoom::Trap,
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DoorTally {
    pub open: usize,
    pub closed: usize,
    pub locked: usize,
}

impl DoorTally {
    fn record(&mut self, state: DoorState) {
        match state {
            DoorState::Open => self.open += 1,
            DoorState::Closed => self.closed += 1,
            DoorState::Locked => self.locked += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.open + self.closed + self.locked
    }
}

/// Puts a door on every corridor entrance. A locked vault seals only its first entrance.
pub fn place_doors(grid: &mut GridMap, rooms: &mut [Room], rng: &mut MapRng) -> DoorTally {
    let mut tally = DoorTally::default();
    for room in rooms.iter_mut() {
        let entrances = find_room_entrances(room.rect, grid);
        for (entrance_index, pos) in entrances.into_iter().enumerate() {
            let state = match &room.special {
                SpecialRoom::Vault(facet) if facet.locked && entrance_index == 0 => {
                    DoorState::Locked
                }
                SpecialRoom::Ordinary if rng.chance(0.5) => DoorState::Closed,
                SpecialRoom::Ordinary => DoorState::Open,
                _ if rng.chance(0.5) => DoorState::Open,
                _ => DoorState::Closed,
            };
            grid.set_tile_at(pos, state.tile());
            room.doors.push(Door { pos, state });
            tally.record(state);
        }
    }
    tally
}

/// Everything reachable from `start` without passing a wall or a locked door.
pub fn find_accessible_tiles(grid: &GridMap, start: Pos) -> BTreeSet<Pos> {
    grid.flood_fill(start, |tile| !matches!(tile, TileKind::Wall | TileKind::DoorLocked))
}

pub fn find_accessible_rooms(grid: &GridMap, rooms: &[Room], start: Pos) -> Vec<usize> {
    let accessible = find_accessible_tiles(grid, start);
    rooms
        .iter()
        .enumerate()
        .filter(|(_, room)| accessible.contains(&room.center()))
        .map(|(index, _)| index)
        .collect()
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct KeyPlacement {
    pub placed: usize,
    pub failed: usize,
}

/// Drops one key per locked vault in a room reachable from `spawn` before any lock opens.
pub fn place_keys(
    grid: &mut GridMap,
    rooms: &mut [Room],
    spawn: Pos,
    rng: &mut MapRng,
) -> KeyPlacement {
    let mut outcome = KeyPlacement::default();
    let vault_indices: Vec<usize> = rooms
        .iter()
        .enumerate()
        .filter(|(_, room)| room.key_required())
        .map(|(index, _)| index)
        .collect();

    for vault_index in vault_indices {
        let accessible = find_accessible_tiles(grid, spawn);
        let eligible: Vec<usize> = find_accessible_rooms(grid, rooms, spawn)
            .into_iter()
            .filter(|&index| index != vault_index)
            .collect();
        let Some(&key_room) = rng.pick(&eligible) else {
            warn!("no accessible room can hold the key for vault room {vault_index}");
            outcome.failed += 1;
            continue;
        };

        match choose_key_cell(grid, &rooms[key_room], &accessible, spawn, rng) {
            Some(pos) => {
                grid.set_tile_at(pos, TileKind::Key);
                debug!("key for vault room {vault_index} placed at {pos:?} in room {key_room}");
                if let Some(facet) = rooms[vault_index].vault_mut() {
                    facet.key = Some(pos);
                }
                outcome.placed += 1;
            }
            None => {
                warn!("failed to place key for vault room {vault_index} in room {key_room}");
                outcome.failed += 1;
            }
        }
    }
    outcome
}

/// The spawn cell is never a candidate: the player arrives there on the first floor.
fn choose_key_cell(
    grid: &GridMap,
    room: &Room,
    accessible: &BTreeSet<Pos>,
    spawn: Pos,
    rng: &mut MapRng,
) -> Option<Pos> {
    let usable = |pos: Pos| grid.tile_at(pos) == TileKind::Floor && pos != spawn;
    let rect = room.rect;
    if rect.width > 2 && rect.height > 2 {
        for _ in 0..KEY_PLACEMENT_ATTEMPTS {
            let pos = Pos::new(
                (rect.x + 1 + rng.below(rect.width - 2)) as i32,
                (rect.y + 1 + rng.below(rect.height - 2)) as i32,
            );
            if usable(pos) && accessible.contains(&pos) {
                return Some(pos);
            }
        }
    }
    let center = room.center();
    usable(center).then_some(center)
}
