//! Room geometry and the metadata accreted on rooms during generation.

use serde::Serialize;

use crate::types::{Pos, TileKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct RoomRect {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl RoomRect {
    pub fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(self) -> usize {
        self.x + self.width - 1
    }

    pub fn bottom(self) -> usize {
        self.y + self.height - 1
    }

    pub fn center(self) -> Pos {
        Pos { y: (self.y + (self.height / 2)) as i32, x: (self.x + (self.width / 2)) as i32 }
    }

    pub fn expanded(self, margin: usize) -> Self {
        let expanded_x = self.x.saturating_sub(margin);
        let expanded_y = self.y.saturating_sub(margin);
        let expanded_right = self.right().saturating_add(margin);
        let expanded_bottom = self.bottom().saturating_add(margin);
        Self {
            x: expanded_x,
            y: expanded_y,
            width: expanded_right - expanded_x + 1,
            height: expanded_bottom - expanded_y + 1,
        }
    }

    pub fn intersects(self, other: &Self) -> bool {
        self.x <= other.right()
            && self.right() >= other.x
            && self.y <= other.bottom()
            && self.bottom() >= other.y
    }

    pub fn contains(self, pos: Pos) -> bool {
        if pos.x < 0 || pos.y < 0 {
            return false;
        }
        let px = pos.x as usize;
        let py = pos.y as usize;
        px >= self.x && px <= self.right() && py >= self.y && py <= self.bottom()
    }

    pub fn is_perimeter(self, pos: Pos) -> bool {
        self.contains(pos)
            && (pos.x as usize == self.x
                || pos.x as usize == self.right()
                || pos.y as usize == self.y
                || pos.y as usize == self.bottom())
    }

    pub fn cells(self) -> impl Iterator<Item = Pos> {
        (self.y..=self.bottom()).flat_map(move |y| {
            (self.x..=self.right()).map(move |x| Pos { y: y as i32, x: x as i32 })
        })
    }

    /// Cells of the rectangle shrunk by one tile on every side.
    pub fn interior_cells(self) -> impl Iterator<Item = Pos> {
        let rows = (self.y + 1)..self.bottom();
        rows.flat_map(move |y| {
            ((self.x + 1)..self.right()).map(move |x| Pos { y: y as i32, x: x as i32 })
        })
    }

    pub fn perimeter_cells(self) -> impl Iterator<Item = Pos> {
        self.cells().filter(move |&pos| self.is_perimeter(pos))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum SizeTier {
    Closet,
    Small,
    Normal,
    Large,
    Grand,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum RoomShape {
    Rectangular,
    Circular,
    Cross,
    LShape,
    TShape,
    Diamond,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum DoorState {
    Open,
    Closed,
    Locked,
}

impl DoorState {
    pub fn tile(self) -> TileKind {
        match self {
            DoorState::Open => TileKind::DoorOpen,
            DoorState::Closed => TileKind::DoorClosed,
            DoorState::Locked => TileKind::DoorLocked,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Door {
    pub pos: Pos,
    pub state: DoorState,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct VaultFacet {
    pub locked: bool,
    pub key: Option<Pos>,
    pub template: Option<&'static str>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub enum SpecialRoom {
    #[default]
    Ordinary,
    Vault(VaultFacet),
    Shrine,
    Arena,
    Library,
    Trap,
}

impl SpecialRoom {
    pub fn is_special(&self) -> bool {
        !matches!(self, SpecialRoom::Ordinary)
    }

    pub fn is_vault(&self) -> bool {
        matches!(self, SpecialRoom::Vault(_))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Room {
    pub rect: RoomRect,
    pub tier: SizeTier,
    pub shape: RoomShape,
    pub features: Vec<Pos>,
    pub special: SpecialRoom,
    pub doors: Vec<Door>,
    pub template_entrance: Option<Pos>,
}

impl Room {
    pub fn new(rect: RoomRect, tier: SizeTier, shape: RoomShape) -> Self {
        Self {
            rect,
            tier,
            shape,
            features: Vec::new(),
            special: SpecialRoom::Ordinary,
            doors: Vec::new(),
            template_entrance: None,
        }
    }

    pub fn center(&self) -> Pos {
        self.rect.center()
    }

    pub fn has_locked_door(&self) -> bool {
        matches!(&self.special, SpecialRoom::Vault(facet) if facet.locked)
    }

    /// A sealed vault is the only room whose contents demand a key.
    pub fn key_required(&self) -> bool {
        self.has_locked_door()
    }

    pub fn vault_mut(&mut self) -> Option<&mut VaultFacet> {
        match &mut self.special {
            SpecialRoom::Vault(facet) => Some(facet),
            _ => None,
        }
    }

    pub(super) fn clear_locks(&mut self) {
        if let Some(facet) = self.vault_mut() {
            facet.locked = false;
        }
        for door in &mut self.doors {
            if door.state == DoorState::Locked {
                door.state = DoorState::Open;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rooms_with_single_tile_gap_intersect_after_margin() {
        let left = RoomRect::new(2, 2, 5, 5);
        let touching = RoomRect::new(8, 2, 5, 5);
        let spaced = RoomRect::new(9, 2, 5, 5);
        assert!(left.expanded(1).intersects(&touching.expanded(1)));
        assert!(!left.expanded(1).intersects(&spaced.expanded(1)));
    }

    #[test]
    fn perimeter_and_interior_partition_the_rectangle() {
        let rect = RoomRect::new(3, 4, 6, 5);
        let perimeter = rect.perimeter_cells().count();
        let interior = rect.interior_cells().count();
        assert_eq!(perimeter + interior, rect.cells().count());
        assert_eq!(interior, 4 * 3);
    }

    #[test]
    fn contains_rejects_negative_positions() {
        let rect = RoomRect::new(0, 0, 4, 4);
        assert!(!rect.contains(Pos::new(-1, 0)));
        assert!(rect.contains(Pos::new(3, 3)));
    }

    #[test]
    fn clearing_locks_opens_vault_doors() {
        let mut room = Room::new(RoomRect::new(2, 2, 8, 8), SizeTier::Normal, RoomShape::Cross);
        room.special = SpecialRoom::Vault(VaultFacet { locked: true, ..VaultFacet::default() });
        room.doors.push(Door { pos: Pos::new(2, 5), state: DoorState::Locked });
        assert!(room.has_locked_door());

        room.clear_locks();

        assert!(!room.has_locked_door());
        assert!(!room.key_required());
        assert_eq!(room.doors[0].state, DoorState::Open);
    }
}
