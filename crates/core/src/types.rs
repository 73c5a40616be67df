use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Pos {
    pub y: i32,
    pub x: i32,
}

impl Pos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { y, x }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self { y: self.y + dy, x: self.x + dx }
    }

    /// Orthogonal neighbors in west, east, north, south order.
    pub fn neighbors(self) -> [Pos; 4] {
        [self.offset(-1, 0), self.offset(1, 0), self.offset(0, -1), self.offset(0, 1)]
    }

    pub fn manhattan(self, other: Pos) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TileKind {
    Floor,
    Wall,
    StairsDown,
    StairsUp,
    Toilet,
    Pillar,
    Feature,
    DoorOpen,
    DoorClosed,
    DoorLocked,
    Key,
    Water,
    Chasm,
    Trap,
    WeaponPickup,
    ConsumablePickup,
}

impl TileKind {
    /// Whether an actor may stand on the tile without first changing it.
    pub fn is_walkable(self) -> bool {
        match self {
            TileKind::Floor
            | TileKind::StairsDown
            | TileKind::StairsUp
            | TileKind::Toilet
            | TileKind::Feature
            | TileKind::DoorOpen
            | TileKind::Key
            | TileKind::Water
            | TileKind::Trap
            | TileKind::WeaponPickup
            | TileKind::ConsumablePickup => true,
            TileKind::Wall
            | TileKind::Pillar
            | TileKind::DoorClosed
            | TileKind::DoorLocked
            | TileKind::Chasm => false,
        }
    }

    pub fn is_door(self) -> bool {
        matches!(self, TileKind::DoorOpen | TileKind::DoorClosed | TileKind::DoorLocked)
    }

    pub fn is_pickup(self) -> bool {
        matches!(self, TileKind::Key | TileKind::WeaponPickup | TileKind::ConsumablePickup)
    }

    pub fn glyph(self) -> char {
        match self {
            TileKind::Floor => '.',
            TileKind::Wall => '#',
            TileKind::StairsDown => '>',
            TileKind::StairsUp => '<',
            TileKind::Toilet => '&',
            TileKind::Pillar => 'O',
            TileKind::Feature => '*',
            TileKind::DoorOpen => '\'',
            TileKind::DoorClosed => '+',
            TileKind::DoorLocked => '=',
            TileKind::Key => 'k',
            TileKind::Water => '~',
            TileKind::Chasm => ':',
            TileKind::Trap => '^',
            TileKind::WeaponPickup => '/',
            TileKind::ConsumablePickup => '!',
        }
    }

    pub(crate) fn code(self) -> u8 {
        match self {
            TileKind::Floor => 0,
            TileKind::Wall => 1,
            TileKind::StairsDown => 2,
            TileKind::StairsUp => 3,
            TileKind::Toilet => 4,
            TileKind::Pillar => 5,
            TileKind::Feature => 6,
            TileKind::DoorOpen => 7,
            TileKind::DoorClosed => 8,
            TileKind::DoorLocked => 9,
            TileKind::Key => 10,
            TileKind::Water => 11,
            TileKind::Chasm => 12,
            TileKind::Trap => 13,
            TileKind::WeaponPickup => 14,
            TileKind::ConsumablePickup => 15,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doors_only_block_when_closed_or_locked() {
        assert!(TileKind::DoorOpen.is_walkable());
        assert!(!TileKind::DoorClosed.is_walkable());
        assert!(!TileKind::DoorLocked.is_walkable());
    }

    #[test]
    fn decorative_blockers_are_not_walkable() {
        assert!(!TileKind::Pillar.is_walkable());
        assert!(!TileKind::Chasm.is_walkable());
        assert!(TileKind::Feature.is_walkable());
        assert!(TileKind::Water.is_walkable());
    }

    #[test]
    fn neighbors_are_orthogonal_and_adjacent() {
        let origin = Pos::new(5, 5);
        for neighbor in origin.neighbors() {
            assert_eq!(origin.manhattan(neighbor), 1);
        }
    }
}
