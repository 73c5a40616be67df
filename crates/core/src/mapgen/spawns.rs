//! Pickup tiles and enemy spawn points, placed once the floor layout is final.

use std::iter;

use crate::types::{Pos, TileKind};

use super::grid::GridMap;
use super::model::EnemySpawn;
use super::progression;
use super::room::{Room, SpecialRoom};
use super::seed::MapRng;

const VAULT_PICKUPS: usize = 2;
const ORDINARY_PICKUP_CHANCE: f64 = 0.35;
const WEAPON_PICKUP_CHANCE: f64 = 0.3;
const ARENA_ROOM_WEIGHT: usize = 3;
const SPAWN_ATTEMPTS_PER_ENEMY: usize = 4;

pub(super) struct SpawnContext<'a> {
    pub(super) floor_index: u8,
    pub(super) rooms: &'a [Room],
    pub(super) spawn_tile: Pos,
    pub(super) goal_tile: Pos,
}

impl SpawnContext<'_> {
    fn is_stairs_room(&self, room_index: usize) -> bool {
        room_index == 0 || room_index + 1 == self.rooms.len()
    }

    fn free_floor_cells(&self, grid: &GridMap, room: &Room) -> Vec<Pos> {
        room.rect
            .interior_cells()
            .filter(|&pos| grid.tile_at(pos) == TileKind::Floor)
            .filter(|&pos| pos != self.spawn_tile && pos != self.goal_tile)
            .collect()
    }
}

/// Replaces floor cells with pickups: two per vault, a consumable per library, and an
/// occasional find elsewhere. Stairs rooms stay empty. Returns the number placed.
pub(super) fn place_pickups(
    grid: &mut GridMap,
    context: &SpawnContext<'_>,
    rng: &mut MapRng,
) -> usize {
    let mut placed = 0;
    for (room_index, room) in context.rooms.iter().enumerate() {
        if context.is_stairs_room(room_index) {
            continue;
        }
        let (count, forced_kind) = match room.special {
            SpecialRoom::Vault(_) => (VAULT_PICKUPS, None),
            SpecialRoom::Library => (1, Some(TileKind::ConsumablePickup)),
            _ => (usize::from(rng.chance(ORDINARY_PICKUP_CHANCE)), None),
        };

        for _ in 0..count {
            let candidates = context.free_floor_cells(grid, room);
            let Some(&pos) = rng.pick(&candidates) else {
                break;
            };
            let kind = forced_kind.unwrap_or_else(|| roll_pickup_kind(rng));
            grid.set_tile_at(pos, kind);
            placed += 1;
        }
    }
    placed
}

fn roll_pickup_kind(rng: &mut MapRng) -> TileKind {
    if rng.chance(WEAPON_PICKUP_CHANCE) {
        TileKind::WeaponPickup
    } else {
        TileKind::ConsumablePickup
    }
}

/// Spawn points scaled by depth with extra weight on arenas. The spawn room and break
/// rooms never host enemies, nor does any cell next to the spawn tile.
pub(super) fn generate_enemy_spawns(
    grid: &GridMap,
    context: &SpawnContext<'_>,
    rng: &mut MapRng,
) -> Vec<EnemySpawn> {
    let arena_rooms =
        context.rooms.iter().filter(|room| room.special == SpecialRoom::Arena).count();
    let enemy_count = progression::enemy_spawn_count(context.floor_index, arena_rooms);

    let mut weighted_rooms = Vec::new();
    for (room_index, room) in context.rooms.iter().enumerate().skip(1) {
        if grid.is_position_in_break_room(room.center().x, room.center().y) {
            continue;
        }
        let weight = if room.special == SpecialRoom::Arena { ARENA_ROOM_WEIGHT } else { 1 };
        weighted_rooms.extend(iter::repeat_n(room_index, weight));
    }

    let mut enemy_spawns: Vec<EnemySpawn> = Vec::with_capacity(enemy_count);
    for _ in 0..enemy_count * SPAWN_ATTEMPTS_PER_ENEMY {
        if enemy_spawns.len() >= enemy_count {
            break;
        }
        let Some(&room_index) = rng.pick(&weighted_rooms) else {
            break;
        };
        let candidates: Vec<Pos> = context
            .free_floor_cells(grid, &context.rooms[room_index])
            .into_iter()
            .filter(|&pos| pos.manhattan(context.spawn_tile) > 1)
            .filter(|&pos| !grid.is_position_in_break_room(pos.x, pos.y))
            .filter(|&pos| !enemy_spawns.iter().any(|spawn| spawn.pos == pos))
            .collect();
        if let Some(&pos) = rng.pick(&candidates) {
            enemy_spawns.push(EnemySpawn { pos, room: room_index });
        }
    }

    enemy_spawns.sort_by_key(|spawn| (spawn.pos.y, spawn.pos.x));
    enemy_spawns
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapgen::room::{RoomRect, RoomShape, SizeTier, VaultFacet};

    fn row_of_rooms(grid: &mut GridMap, specials: &[SpecialRoom]) -> Vec<Room> {
        specials
            .iter()
            .enumerate()
            .map(|(slot, special)| {
                let rect = RoomRect::new(2 + slot * 10, 4, 7, 7);
                for pos in rect.cells() {
                    grid.set_tile_at(pos, TileKind::Floor);
                }
                let mut room = Room::new(rect, SizeTier::Normal, RoomShape::Rectangular);
                room.special = special.clone();
                room
            })
            .collect()
    }

    fn context<'a>(floor_index: u8, rooms: &'a [Room]) -> SpawnContext<'a> {
        SpawnContext {
            floor_index,
            rooms,
            spawn_tile: rooms[0].center(),
            goal_tile: rooms[rooms.len() - 1].center(),
        }
    }

    #[test]
    fn vaults_and_libraries_always_get_their_pickups() {
        let specials = [
            SpecialRoom::Ordinary,
            SpecialRoom::Vault(VaultFacet::default()),
            SpecialRoom::Library,
            SpecialRoom::Ordinary,
        ];
        for seed in 0..20 {
            let mut grid = GridMap::new(50, 16);
            let rooms = row_of_rooms(&mut grid, &specials);
            let mut rng = MapRng::from_seed(seed);

            let placed = place_pickups(&mut grid, &context(1, &rooms), &mut rng);

            let in_room = |index: usize| {
                rooms[index].rect.cells().filter(|&pos| grid.tile_at(pos).is_pickup()).count()
            };
            assert_eq!(placed, 3);
            assert_eq!(in_room(0), 0);
            assert_eq!(in_room(1), 2);
            assert_eq!(in_room(3), 0);
            let library_pickups: Vec<TileKind> = rooms[2]
                .rect
                .cells()
                .map(|pos| grid.tile_at(pos))
                .filter(|tile| tile.is_pickup())
                .collect();
            assert_eq!(library_pickups, vec![TileKind::ConsumablePickup]);
        }
    }

    #[test]
    fn enemies_avoid_spawn_room_and_break_rooms() {
        let specials = [
            SpecialRoom::Ordinary,
            SpecialRoom::Shrine,
            SpecialRoom::Arena,
            SpecialRoom::Ordinary,
        ];
        for seed in 0..20 {
            let mut grid = GridMap::new(50, 16);
            let rooms = row_of_rooms(&mut grid, &specials);
            grid.add_break_room(rooms[1].rect);
            let context = context(6, &rooms);
            let mut rng = MapRng::from_seed(seed);

            let spawns = generate_enemy_spawns(&grid, &context, &mut rng);

            assert!(!spawns.is_empty());
            assert!(spawns.len() <= progression::enemy_spawn_count(6, 1));
            for spawn in &spawns {
                assert!(spawn.room == 2 || spawn.room == 3, "seed {seed}: {spawn:?}");
                assert!(rooms[spawn.room].rect.contains(spawn.pos));
                assert_ne!(spawn.pos, context.goal_tile);
                assert_eq!(grid.tile_at(spawn.pos), TileKind::Floor);
            }
            let mut positions: Vec<Pos> = spawns.iter().map(|spawn| spawn.pos).collect();
            positions.dedup();
            assert_eq!(positions.len(), spawns.len());
        }
    }

    #[test]
    fn single_room_floor_has_no_enemies() {
        let mut grid = GridMap::new(20, 16);
        let rooms = row_of_rooms(&mut grid, &[SpecialRoom::Ordinary]);
        let mut rng = MapRng::from_seed(5);
        assert!(generate_enemy_spawns(&grid, &context(3, &rooms), &mut rng).is_empty());
    }
}
