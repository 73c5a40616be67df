//! Floor geometry knobs. Probability tables stay as constants next to the code that rolls them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::progression::MAX_FLOORS;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub width: usize,
    pub height: usize,
    pub min_rooms: usize,
    pub max_rooms: usize,
    pub placement_attempts: usize,
    pub room_min_side: usize,
    pub room_max_side: usize,
    pub floor_count: u8,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            width: 40,
            height: 30,
            min_rooms: 3,
            max_rooms: 5,
            placement_attempts: 100,
            room_min_side: 5,
            room_max_side: 16,
            floor_count: MAX_FLOORS,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("map must be at least {min}x{min}, got {width}x{height}")]
    MapTooSmall { width: usize, height: usize, min: usize },
    #[error("room side {side} does not fit a {width}x{height} map with margins")]
    RoomTooLarge { side: usize, width: usize, height: usize },
    #[error("room side range {min}..={max} is invalid")]
    InvalidRoomSides { min: usize, max: usize },
    #[error("room count range {min}..={max} is invalid")]
    InvalidRoomCount { min: usize, max: usize },
    #[error("placement attempt cap must be positive")]
    NoPlacementAttempts,
    #[error("a run needs at least one floor")]
    NoFloors,
}

const MIN_MAP_SIDE: usize = 10;
const MIN_ROOM_SIDE: usize = 3;

impl GeneratorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width < MIN_MAP_SIDE || self.height < MIN_MAP_SIDE {
            return Err(ConfigError::MapTooSmall {
                width: self.width,
                height: self.height,
                min: MIN_MAP_SIDE,
            });
        }
        if self.room_min_side < MIN_ROOM_SIDE || self.room_min_side > self.room_max_side {
            return Err(ConfigError::InvalidRoomSides {
                min: self.room_min_side,
                max: self.room_max_side,
            });
        }
        // Room origins are drawn two tiles in from each edge with at least one free column.
        if self.room_max_side + 5 > self.width.min(self.height) {
            return Err(ConfigError::RoomTooLarge {
                side: self.room_max_side,
                width: self.width,
                height: self.height,
            });
        }
        if self.min_rooms == 0 || self.min_rooms > self.max_rooms {
            return Err(ConfigError::InvalidRoomCount { min: self.min_rooms, max: self.max_rooms });
        }
        if self.placement_attempts == 0 {
            return Err(ConfigError::NoPlacementAttempts);
        }
        if self.floor_count == 0 {
            return Err(ConfigError::NoFloors);
        }
        Ok(())
    }
}
