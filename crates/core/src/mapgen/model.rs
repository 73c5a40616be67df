//! Public data models for generated floors, spawn hints, and generation metrics.

use serde::Serialize;
use xxhash_rust::xxh3::xxh3_64;

use crate::types::{Pos, TileKind};

use super::access::{DoorTally, KeyPlacement};
use super::corridors::ConnectionEdge;
use super::grid::GridMap;
use super::progression::FloorTheme;
use super::room::{DoorState, Room, RoomShape, SizeTier, SpecialRoom};
use super::validation::ProgressionOutcome;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct EnemySpawn {
    pub pos: Pos,
    /// Index into [`GeneratedFloor::rooms`].
    pub room: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct RoomProfile {
    pub tier: SizeTier,
    pub shape: RoomShape,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct HazardReport {
    pub traps: usize,
    pub water_tiles: usize,
    pub break_rooms: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GenerationMetrics {
    pub room_count: usize,
    pub placement_attempts: usize,
    pub room_profiles: Vec<RoomProfile>,
    pub corridor_edges: usize,
    pub secondary_loops: usize,
    pub walk_fallbacks: usize,
    pub orphans_repaired: usize,
    pub doors: DoorTally,
    pub keys: KeyPlacement,
    pub vault_template: Option<&'static str>,
    pub progression: ProgressionOutcome,
    pub bashable_walls: usize,
    pub hazards: HazardReport,
    pub pickups: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GeneratedFloor {
    pub floor_index: u8,
    pub theme: FloorTheme,
    pub grid: GridMap,
    pub rooms: Vec<Room>,
    pub edges: Vec<ConnectionEdge>,
    /// Start of every reachability check: the first room's center.
    pub spawn_tile: Pos,
    /// Where the player is dropped on arrival; beside the up-stairs when there are any.
    pub arrival_tile: Pos,
    pub goal_tile: Pos,
    pub enemy_spawns: Vec<EnemySpawn>,
    pub metrics: GenerationMetrics,
}

impl GeneratedFloor {
    pub fn tile_at(&self, pos: Pos) -> TileKind {
        self.grid.tile_at(pos)
    }

    pub fn render_ascii(&self) -> String {
        self.grid.render_ascii()
    }

    /// Stable byte encoding of everything gameplay can observe. Metrics are excluded.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.push(self.floor_index);
        bytes.extend((self.grid.width() as u32).to_le_bytes());
        bytes.extend((self.grid.height() as u32).to_le_bytes());
        bytes.extend(self.grid.tiles().iter().map(|tile| tile.code()));

        bytes.extend((self.grid.bashable_count() as u32).to_le_bytes());
        for pos in self.grid.bashable_walls() {
            push_pos(&mut bytes, pos);
        }
        bytes.extend((self.grid.break_rooms().len() as u32).to_le_bytes());
        for rect in self.grid.break_rooms() {
            for value in [rect.x, rect.y, rect.width, rect.height] {
                bytes.extend((value as u32).to_le_bytes());
            }
        }

        push_pos(&mut bytes, self.spawn_tile);
        push_pos(&mut bytes, self.arrival_tile);
        push_pos(&mut bytes, self.goal_tile);

        bytes.extend((self.rooms.len() as u32).to_le_bytes());
        for room in &self.rooms {
            for value in [room.rect.x, room.rect.y, room.rect.width, room.rect.height] {
                bytes.extend((value as u32).to_le_bytes());
            }
            bytes.push(special_code(&room.special));
            bytes.extend((room.doors.len() as u32).to_le_bytes());
            for door in &room.doors {
                push_pos(&mut bytes, door.pos);
                bytes.push(match door.state {
                    DoorState::Open => 0,
                    DoorState::Closed => 1,
                    DoorState::Locked => 2,
                });
            }
        }

        bytes.extend((self.enemy_spawns.len() as u32).to_le_bytes());
        for spawn in &self.enemy_spawns {
            push_pos(&mut bytes, spawn.pos);
            bytes.extend((spawn.room as u32).to_le_bytes());
        }
        bytes
    }

    pub fn fingerprint(&self) -> u64 {
        xxh3_64(&self.canonical_bytes())
    }
}

fn push_pos(bytes: &mut Vec<u8>, pos: Pos) {
    bytes.extend(pos.y.to_le_bytes());
    bytes.extend(pos.x.to_le_bytes());
}

fn special_code(special: &SpecialRoom) -> u8 {
    match special {
        SpecialRoom::Ordinary => 0,
        SpecialRoom::Vault(facet) => 1 + u8::from(facet.locked),
        SpecialRoom::Shrine => 3,
        SpecialRoom::Arena => 4,
        SpecialRoom::Library => 5,
        SpecialRoom::Trap => 6,
    }
}
