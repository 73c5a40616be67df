//! Floor progression and depth-themed rules used by map generation.

use serde::Serialize;

pub const MAX_FLOORS: u8 = 10;
pub const STARTING_FLOOR_INDEX: u8 = 1;

const BASE_ENEMY_COUNT_BY_FLOOR: [usize; MAX_FLOORS as usize] = [2, 3, 3, 4, 4, 5, 5, 6, 6, 7];
const ARENA_ENEMY_BONUS: usize = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum FloorTheme {
    Office,
    Maintenance,
    Sewers,
    Throne,
}

impl FloorTheme {
    pub fn for_floor(floor_index: u8) -> Self {
        match floor_slot(floor_index) {
            0..=2 => FloorTheme::Office,
            3..=5 => FloorTheme::Maintenance,
            6..=8 => FloorTheme::Sewers,
            _ => FloorTheme::Throne,
        }
    }

    /// Odds that an interior wall is marked bashable.
    pub fn bashable_chance(self) -> f64 {
        match self {
            FloorTheme::Office => 0.6,
            FloorTheme::Maintenance => 0.4,
            FloorTheme::Sewers | FloorTheme::Throne => 0.3,
        }
    }

    pub fn has_water(self) -> bool {
        self == FloorTheme::Sewers
    }
}

pub fn is_first_floor(floor_index: u8) -> bool {
    floor_index <= STARTING_FLOOR_INDEX
}

pub fn is_final_floor(floor_index: u8, floor_count: u8) -> bool {
    floor_index >= floor_count
}

pub(super) fn enemy_spawn_count(floor_index: u8, arena_rooms: usize) -> usize {
    let slot = floor_slot(floor_index).min(BASE_ENEMY_COUNT_BY_FLOOR.len() - 1);
    BASE_ENEMY_COUNT_BY_FLOOR[slot] + arena_rooms * ARENA_ENEMY_BONUS
}

fn floor_slot(floor_index: u8) -> usize {
    floor_index.saturating_sub(STARTING_FLOOR_INDEX) as usize
}
