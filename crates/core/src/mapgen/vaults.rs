//! Hand-authored vault layouts and their stamping into vault rooms.

use log::{debug, warn};

use crate::types::{Pos, TileKind};

use super::connectivity::reachable_set;
use super::corridors::l_shaped_path_with;
use super::grid::GridMap;
use super::room::{Room, RoomRect};
use super::seed::MapRng;

/// A fixed layout written as rows of glyphs: `#` wall, `.` floor, `*` feature, `O` pillar.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VaultTemplate {
    pub name: &'static str,
    pub rows: &'static [&'static str],
    /// Template-local entrance, always on the template border.
    pub entrance: Pos,
}

impl VaultTemplate {
    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, |row| row.len())
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn tile(&self, local: Pos) -> TileKind {
        let glyph = self
            .rows
            .get(local.y as usize)
            .and_then(|row| row.as_bytes().get(local.x as usize))
            .copied()
            .unwrap_or(b'#');
        match glyph {
            b'.' => TileKind::Floor,
            b'*' => TileKind::Feature,
            b'O' => TileKind::Pillar,
            _ => TileKind::Wall,
        }
    }
}

pub const VAULT_TEMPLATES: [VaultTemplate; 5] = [
    VaultTemplate {
        name: "Treasure Cross",
        rows: &["#######", "###.###", "##.*.##", "#.***.#", "##.*.##", "###.###", "###.###"],
        entrance: Pos { y: 6, x: 3 },
    },
    VaultTemplate {
        name: "Prison Cells",
        rows: &[
            "#########",
            "#*#.#.#*#",
            "#.#.#.#.#",
            "#.......#",
            "#.#.#.#.#",
            "#*#.#.#*#",
            "####.####",
        ],
        entrance: Pos { y: 6, x: 4 },
    },
    VaultTemplate {
        name: "Pillared Hall",
        rows: &[
            "#########",
            "#.......#",
            "#.O.*.O.#",
            "#.......#",
            "#.*.*.*.#",
            "#.......#",
            "#.O.*.O.#",
            "#.......#",
            "####.####",
        ],
        entrance: Pos { y: 8, x: 4 },
    },
    VaultTemplate {
        name: "Shrine",
        rows: &["#######", "#.....#", "#..*..#", "#.***.#", "#..*..#", "#.....#", "###.###"],
        entrance: Pos { y: 6, x: 3 },
    },
    VaultTemplate {
        name: "Treasure Chamber",
        rows: &[
            "#########",
            "#*.....*#",
            "#.#####.#",
            "#.#***#.#",
            "#.#####.#",
            "#*.....*#",
            "####.####",
        ],
        entrance: Pos { y: 6, x: 4 },
    },
];

pub fn pick_random(rng: &mut MapRng) -> &'static VaultTemplate {
    &VAULT_TEMPLATES[rng.below(VAULT_TEMPLATES.len())]
}

pub fn fits(rect: RoomRect, template: &VaultTemplate) -> bool {
    template.width() <= rect.width && template.height() <= rect.height
}

/// Copies the template centered in `rect` and returns the entrance in world coordinates.
pub fn stamp(grid: &mut GridMap, rect: RoomRect, template: &VaultTemplate) -> Pos {
    let origin = template_origin(rect, template);
    for ty in 0..template.height() {
        for tx in 0..template.width() {
            let local = Pos { y: ty as i32, x: tx as i32 };
            grid.set_tile_at(origin.offset(local.x, local.y), template.tile(local));
        }
    }
    origin.offset(template.entrance.x, template.entrance.y)
}

fn template_origin(rect: RoomRect, template: &VaultTemplate) -> Pos {
    Pos {
        y: (rect.y + (rect.height - template.height()) / 2) as i32,
        x: (rect.x + (rect.width - template.width()) / 2) as i32,
    }
}

/// Perimeter floor cells with a floor neighbor outside the room: where corridors arrive.
pub fn find_room_entrances(rect: RoomRect, grid: &GridMap) -> Vec<Pos> {
    rect.perimeter_cells()
        .filter(|&pos| grid.tile_at(pos) == TileKind::Floor)
        .filter(|&pos| {
            pos.neighbors()
                .into_iter()
                .any(|next| !rect.contains(next) && grid.tile_at(next) == TileKind::Floor)
        })
        .collect()
}

/// Replaces each vault room's interior with a catalog layout, keeping existing corridor
/// entrances connected to the layout's own entrance.
pub fn apply_vault_templates(grid: &mut GridMap, rooms: &mut [Room], rng: &mut MapRng) {
    for room in rooms.iter_mut().filter(|room| room.special.is_vault()) {
        let template = pick_random(rng);
        if !fits(room.rect, template) {
            debug!(
                "vault template {} ({}x{}) does not fit room {:?}",
                template.name,
                template.width(),
                template.height(),
                room.rect
            );
            continue;
        }

        let entrances = find_room_entrances(room.rect, grid);
        room.features.clear();
        for pos in room.rect.interior_cells() {
            grid.set_tile_at(pos, TileKind::Floor);
        }

        let world_entrance = stamp(grid, room.rect, template);
        for entrance in &entrances {
            carve_connector(grid, *entrance, world_entrance);
        }
        if entrances.is_empty() {
            warn!("vault room {:?} has no corridor entrance to link", room.rect);
        }
        // Even-sized rooms can center on a template wall; keep the room center reachable.
        if !reachable_set(grid, world_entrance).contains(&room.center()) {
            carve_connector(grid, world_entrance, room.center());
        }

        room.features.extend(
            room.rect
                .cells()
                .filter(|&pos| matches!(grid.tile_at(pos), TileKind::Feature | TileKind::Pillar)),
        );
        room.template_entrance = Some(world_entrance);
        if let Some(facet) = room.vault_mut() {
            facet.template = Some(template.name);
        }
    }
}

/// Right-angle link that turns any blocking cell on the way into floor, features excepted.
fn carve_connector(grid: &mut GridMap, from: Pos, to: Pos) {
    let horizontal_first = from.y == to.y || (from.x != to.x && from.y > to.y);
    for pos in l_shaped_path_with(from, to, horizontal_first) {
        if matches!(grid.tile_at(pos), TileKind::Wall | TileKind::Pillar) && grid.is_interior(pos) {
            grid.set_tile_at(pos, TileKind::Floor);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapgen::room::{RoomShape, SizeTier, SpecialRoom, VaultFacet};

    #[test]
    fn catalog_entrances_are_floor_on_the_border() {
        for template in &VAULT_TEMPLATES {
            assert!(template.rows.iter().all(|row| row.len() == template.width()));
            let entrance = template.entrance;
            assert_eq!(template.tile(entrance), TileKind::Floor, "{}", template.name);
            let on_border = entrance.x == 0
                || entrance.y == 0
                || entrance.x as usize == template.width() - 1
                || entrance.y as usize == template.height() - 1;
            assert!(on_border, "{} entrance must touch the border", template.name);
        }
    }

    #[test]
    fn fits_compares_both_sides() {
        let template = &VAULT_TEMPLATES[2];
        assert!(fits(RoomRect::new(2, 2, 9, 9), template));
        assert!(!fits(RoomRect::new(2, 2, 8, 12), template));
        assert!(!fits(RoomRect::new(2, 2, 12, 8), template));
    }

    #[test]
    fn stamp_centers_template_and_translates_entrance() {
        let mut grid = GridMap::new(30, 30);
        let rect = RoomRect::new(4, 6, 11, 9);
        let template = &VAULT_TEMPLATES[0];

        let entrance = stamp(&mut grid, rect, template);

        assert_eq!(entrance, Pos::new(4 + 2 + 3, 6 + 1 + 6));
        assert_eq!(grid.tile_at(Pos::new(4 + 2 + 3, 6 + 1 + 3)), TileKind::Feature);
        assert_eq!(grid.tile_at(entrance), TileKind::Floor);
    }

    #[test]
    fn entrances_are_perimeter_cells_touching_outside_floor() {
        let mut grid = GridMap::new(30, 20);
        let rect = RoomRect::new(5, 5, 6, 6);
        for pos in rect.cells() {
            grid.set_tile_at(pos, TileKind::Floor);
        }
        for x in 11..15 {
            grid.set_tile(x, 7, TileKind::Floor);
        }

        assert_eq!(find_room_entrances(rect, &grid), vec![Pos::new(10, 7)]);
    }

    #[test]
    fn stamped_vault_stays_reachable_from_its_corridor() {
        for seed in 0..25 {
            let mut grid = GridMap::new(40, 30);
            let rect = RoomRect::new(10, 8, 12, 12);
            for pos in rect.cells() {
                grid.set_tile_at(pos, TileKind::Floor);
            }
            // Corridor arriving from the north, away from every template entrance.
            for y in 2..8 {
                grid.set_tile(13, y, TileKind::Floor);
            }
            let mut room = Room::new(rect, SizeTier::Large, RoomShape::Rectangular);
            room.special = SpecialRoom::Vault(VaultFacet { locked: true, ..Default::default() });
            let mut rooms = vec![room];
            let mut rng = MapRng::from_seed(seed);

            apply_vault_templates(&mut grid, &mut rooms, &mut rng);

            let entrance = rooms[0].template_entrance.expect("12x12 fits every template");
            let reachable = reachable_set(&grid, Pos::new(13, 2));
            assert!(reachable.contains(&entrance), "seed {seed}");
            assert!(reachable.contains(&rooms[0].center()), "seed {seed}");
            assert_eq!(grid.tile_at(Pos::new(13, 8)), TileKind::Floor);
        }
    }

    #[test]
    fn oversized_template_leaves_room_untouched() {
        let mut grid = GridMap::new(30, 20);
        let rect = RoomRect::new(5, 5, 6, 6);
        for pos in rect.cells() {
            grid.set_tile_at(pos, TileKind::Floor);
        }
        let before = grid.clone();
        let mut room = Room::new(rect, SizeTier::Small, RoomShape::Rectangular);
        room.special = SpecialRoom::Vault(VaultFacet::default());
        let mut rooms = vec![room];
        let mut rng = MapRng::from_seed(1);

        apply_vault_templates(&mut grid, &mut rooms, &mut rng);

        assert_eq!(grid, before);
        assert_eq!(rooms[0].template_entrance, None);
    }
}
