//! The tile grid handed from generation to gameplay, plus flood-fill primitives.

use std::collections::{BTreeSet, VecDeque};

use serde::Serialize;

use crate::types::{Pos, TileKind};

use super::room::RoomRect;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GridMap {
    width: usize,
    height: usize,
    tiles: Vec<TileKind>,
    bashable: BTreeSet<Pos>,
    break_rooms: Vec<RoomRect>,
}

impl GridMap {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            tiles: vec![TileKind::Wall; width * height],
            bashable: BTreeSet::new(),
            break_rooms: Vec::new(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn tiles(&self) -> &[TileKind] {
        &self.tiles
    }

    pub fn in_bounds(&self, pos: Pos) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.width && (pos.y as usize) < self.height
    }

    /// Cells on the outermost ring are never carved.
    pub fn is_interior(&self, pos: Pos) -> bool {
        pos.x > 0
            && pos.y > 0
            && (pos.x as usize) < self.width.saturating_sub(1)
            && (pos.y as usize) < self.height.saturating_sub(1)
    }

    pub fn tile_at(&self, pos: Pos) -> TileKind {
        if !self.in_bounds(pos) {
            return TileKind::Wall;
        }
        self.tiles[self.index(pos)]
    }

    pub fn get_tile(&self, x: i32, y: i32) -> TileKind {
        self.tile_at(Pos { y, x })
    }

    pub fn set_tile_at(&mut self, pos: Pos, kind: TileKind) -> bool {
        if !self.in_bounds(pos) {
            return false;
        }
        let index = self.index(pos);
        self.tiles[index] = kind;
        true
    }

    pub fn set_tile(&mut self, x: i32, y: i32, kind: TileKind) -> bool {
        self.set_tile_at(Pos { y, x }, kind)
    }

    pub fn fill(&mut self, kind: TileKind) {
        self.tiles.fill(kind);
    }

    pub fn is_walkable(&self, x: i32, y: i32) -> bool {
        self.tile_at(Pos { y, x }).is_walkable()
    }

    pub fn is_wall_bashable(&self, x: i32, y: i32) -> bool {
        self.bashable.contains(&Pos { y, x })
    }

    pub fn set_wall_bashable(&mut self, x: i32, y: i32, bashable: bool) {
        let pos = Pos { y, x };
        if !self.in_bounds(pos) {
            return;
        }
        if bashable {
            self.bashable.insert(pos);
        } else {
            self.bashable.remove(&pos);
        }
    }

    pub fn bashable_count(&self) -> usize {
        self.bashable.len()
    }

    pub fn bashable_walls(&self) -> impl Iterator<Item = Pos> + '_ {
        self.bashable.iter().copied()
    }

    pub fn add_break_room(&mut self, rect: RoomRect) {
        self.break_rooms.push(rect);
    }

    pub fn break_rooms(&self) -> &[RoomRect] {
        &self.break_rooms
    }

    pub fn is_position_in_break_room(&self, x: i32, y: i32) -> bool {
        let pos = Pos { y, x };
        self.break_rooms.iter().any(|rect| rect.contains(pos))
    }

    /// Row-major scan for the first walkable interior tile.
    pub fn find_walkable_position(&self) -> Pos {
        self.interior_positions()
            .find(|&pos| self.tile_at(pos).is_walkable())
            .unwrap_or(Pos { y: (self.height / 2) as i32, x: (self.width / 2) as i32 })
    }

    pub fn find_up_stairs_position(&self) -> Option<Pos> {
        self.find_tile(TileKind::StairsUp)
    }

    pub fn find_down_stairs_position(&self) -> Option<Pos> {
        self.find_tile(TileKind::StairsDown)
    }

    pub fn find_toilet_position(&self) -> Option<Pos> {
        self.find_tile(TileKind::Toilet)
    }

    /// Prefers a walkable cell next to the up-stairs so arriving never re-triggers
    /// the transition.
    pub fn find_safe_spawn_near_upstairs(&self) -> Pos {
        let Some(stairs) = self.find_up_stairs_position() else {
            return self.find_walkable_position();
        };
        stairs
            .neighbors()
            .into_iter()
            .find(|&pos| self.tile_at(pos).is_walkable())
            .unwrap_or(stairs)
    }

    pub fn find_tile(&self, kind: TileKind) -> Option<Pos> {
        self.positions().find(|&pos| self.tile_at(pos) == kind)
    }

    pub fn count_tiles(&self, kind: TileKind) -> usize {
        self.tiles.iter().filter(|&&tile| tile == kind).count()
    }

    pub fn positions(&self) -> impl Iterator<Item = Pos> + '_ {
        (0..self.height).flat_map(move |y| {
            (0..self.width).map(move |x| Pos { y: y as i32, x: x as i32 })
        })
    }

    pub fn interior_positions(&self) -> impl Iterator<Item = Pos> + '_ {
        self.positions().filter(move |&pos| self.is_interior(pos))
    }

    /// Four-directional flood fill from `start` over cells accepted by `passable`.
    /// The start cell is always part of the result.
    pub fn flood_fill<F>(&self, start: Pos, passable: F) -> BTreeSet<Pos>
    where
        F: Fn(TileKind) -> bool,
    {
        let mut visited = BTreeSet::new();
        if !self.in_bounds(start) {
            return visited;
        }

        let mut queue = VecDeque::from([start]);
        visited.insert(start);
        while let Some(current) = queue.pop_front() {
            for neighbor in current.neighbors() {
                if !self.in_bounds(neighbor) || visited.contains(&neighbor) {
                    continue;
                }
                if passable(self.tile_at(neighbor)) {
                    visited.insert(neighbor);
                    queue.push_back(neighbor);
                }
            }
        }
        visited
    }

    pub fn render_ascii(&self) -> String {
        let mut out = String::with_capacity((self.width + 1) * self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                out.push(self.tiles[y * self.width + x].glyph());
            }
            out.push('\n');
        }
        out
    }

    fn index(&self, pos: Pos) -> usize {
        (pos.y as usize) * self.width + (pos.x as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_bounds_reads_as_wall() {
        let mut grid = GridMap::new(10, 8);
        grid.fill(TileKind::Floor);
        assert_eq!(grid.get_tile(-1, 3), TileKind::Wall);
        assert_eq!(grid.get_tile(3, -1), TileKind::Wall);
        assert_eq!(grid.get_tile(10, 3), TileKind::Wall);
        assert_eq!(grid.get_tile(3, 8), TileKind::Wall);
        assert_eq!(grid.get_tile(3, 3), TileKind::Floor);
    }

    #[test]
    fn set_tile_out_of_bounds_is_rejected() {
        let mut grid = GridMap::new(5, 5);
        assert!(!grid.set_tile(5, 0, TileKind::Floor));
        assert!(grid.set_tile(2, 2, TileKind::Floor));
    }

    #[test]
    fn repeated_set_tile_is_idempotent() {
        let mut once = GridMap::new(6, 6);
        let mut twice = GridMap::new(6, 6);
        once.set_tile(2, 3, TileKind::Key);
        twice.set_tile(2, 3, TileKind::Key);
        twice.set_tile(2, 3, TileKind::Key);
        assert_eq!(once, twice);
    }

    #[test]
    fn empty_grid_has_no_interior() {
        let grid = GridMap::new(0, 0);
        assert!(!grid.is_interior(Pos::new(0, 0)));
        assert!(!grid.is_interior(Pos::new(1, 1)));
        assert_eq!(grid.interior_positions().count(), 0);
        assert_eq!(grid.get_tile(0, 0), TileKind::Wall);
    }

    #[test]
    fn bashable_flags_toggle() {
        let mut grid = GridMap::new(6, 6);
        grid.set_wall_bashable(2, 2, true);
        assert!(grid.is_wall_bashable(2, 2));
        grid.set_wall_bashable(2, 2, false);
        assert!(!grid.is_wall_bashable(2, 2));
        grid.set_wall_bashable(-1, 2, true);
        assert_eq!(grid.bashable_count(), 0);
    }

    #[test]
    fn flood_fill_respects_predicate() {
        let mut grid = GridMap::new(7, 3);
        for x in 1..6 {
            grid.set_tile(x, 1, TileKind::Floor);
        }
        grid.set_tile(3, 1, TileKind::DoorLocked);

        let open = grid.flood_fill(Pos::new(1, 1), |tile| tile != TileKind::Wall);
        let locked = grid.flood_fill(Pos::new(1, 1), |tile| {
            tile != TileKind::Wall && tile != TileKind::DoorLocked
        });

        assert!(open.contains(&Pos::new(5, 1)));
        assert!(!locked.contains(&Pos::new(5, 1)));
        assert_eq!(locked.len(), 2);
    }

    #[test]
    fn safe_spawn_sits_next_to_up_stairs() {
        let mut grid = GridMap::new(7, 5);
        for x in 1..6 {
            grid.set_tile(x, 2, TileKind::Floor);
        }
        grid.set_tile(3, 2, TileKind::StairsUp);

        let spawn = grid.find_safe_spawn_near_upstairs();

        assert_eq!(spawn, Pos::new(2, 2));
        assert_eq!(grid.find_up_stairs_position(), Some(Pos::new(3, 2)));
    }

    #[test]
    fn safe_spawn_without_up_stairs_falls_back_to_first_walkable() {
        let mut grid = GridMap::new(6, 6);
        grid.set_tile(3, 2, TileKind::Floor);
        assert_eq!(grid.find_up_stairs_position(), None);
        assert_eq!(grid.find_safe_spawn_near_upstairs(), Pos::new(3, 2));
    }

    #[test]
    fn break_room_lookup_uses_registered_rectangles() {
        let mut grid = GridMap::new(20, 20);
        grid.add_break_room(RoomRect::new(4, 4, 5, 5));
        assert!(grid.is_position_in_break_room(6, 6));
        assert!(!grid.is_position_in_break_room(10, 6));
    }
}
