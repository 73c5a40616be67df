//! Room size tiers, carved footprints, and architectural decoration.

use crate::types::{Pos, TileKind};

use super::grid::GridMap;
use super::room::{Room, RoomRect, RoomShape, SizeTier};
use super::seed::MapRng;

const PILLAR_INSET: usize = 2;
const PILLAR_MIN_SIDE: usize = 8;
const GRAND_CENTER_CLUSTER_CHANCE: f64 = 0.5;
const DECORATION_SPACING: u32 = 2;

pub fn categorize(width: usize, height: usize) -> SizeTier {
    match width.min(height) {
        0..=4 => SizeTier::Closet,
        5..=7 => SizeTier::Small,
        8..=10 => SizeTier::Normal,
        11..=13 => SizeTier::Large,
        _ => SizeTier::Grand,
    }
}

pub fn choose_shape(tier: SizeTier, rng: &mut MapRng) -> RoomShape {
    let roll = rng.unit();
    match tier {
        SizeTier::Closet => RoomShape::Rectangular,
        SizeTier::Small => {
            if roll < 0.7 {
                RoomShape::Rectangular
            } else {
                RoomShape::Circular
            }
        }
        SizeTier::Normal => {
            if roll < 0.3 {
                RoomShape::Rectangular
            } else if roll < 0.5 {
                RoomShape::Circular
            } else if roll < 0.7 {
                RoomShape::Cross
            } else {
                RoomShape::LShape
            }
        }
        SizeTier::Large => {
            if roll < 0.2 {
                RoomShape::Rectangular
            } else if roll < 0.35 {
                RoomShape::Circular
            } else if roll < 0.5 {
                RoomShape::Cross
            } else if roll < 0.65 {
                RoomShape::LShape
            } else if roll < 0.8 {
                RoomShape::TShape
            } else {
                RoomShape::Diamond
            }
        }
        SizeTier::Grand => {
            if roll < 0.1 {
                RoomShape::Rectangular
            } else if roll < 0.3 {
                RoomShape::Circular
            } else if roll < 0.5 {
                RoomShape::Cross
            } else if roll < 0.7 {
                RoomShape::TShape
            } else {
                RoomShape::Diamond
            }
        }
    }
}

pub fn carve(grid: &mut GridMap, rect: RoomRect, shape: RoomShape, rng: &mut MapRng) {
    match shape {
        RoomShape::Rectangular => carve_where(grid, rect, |_| true),
        RoomShape::Circular => carve_where(grid, rect, |pos| inside_ellipse(rect, pos)),
        RoomShape::Diamond => carve_where(grid, rect, |pos| inside_diamond(rect, pos)),
        RoomShape::Cross => carve_where(grid, rect, |pos| inside_cross(rect, pos)),
        RoomShape::TShape => carve_where(grid, rect, |pos| inside_t(rect, pos)),
        RoomShape::LShape => {
            let foot_height = rect.height / 2 + rng.below(3);
            let spine_width = rect.width / 2 + rng.below(3);
            carve_where(grid, rect, |pos| inside_l(rect, pos, foot_height, spine_width));
        }
    }
}

fn carve_where<F>(grid: &mut GridMap, rect: RoomRect, inside: F)
where
    F: Fn(Pos) -> bool,
{
    for pos in rect.cells() {
        if inside(pos) {
            grid.set_tile_at(pos, TileKind::Floor);
        }
    }
}

fn inside_ellipse(rect: RoomRect, pos: Pos) -> bool {
    let radius_x = rect.width as f64 / 2.0;
    let radius_y = rect.height as f64 / 2.0;
    let dx = (pos.x as f64 - (rect.x as f64 + radius_x)) / radius_x;
    let dy = (pos.y as f64 - (rect.y as f64 + radius_y)) / radius_y;
    dx * dx + dy * dy <= 1.0
}

fn inside_diamond(rect: RoomRect, pos: Pos) -> bool {
    let half_width = rect.width as f64 / 2.0;
    let half_height = rect.height as f64 / 2.0;
    let dx = (pos.x as f64 - (rect.x as f64 + half_width)).abs() / half_width;
    let dy = (pos.y as f64 - (rect.y as f64 + half_height)).abs() / half_height;
    dx + dy <= 1.0
}

/// Half-open band `[center - floor(span/2), center + ceil(span/2))`.
fn in_band(value: i32, center: i32, span: usize) -> bool {
    let low = center - (span / 2) as i32;
    let high = center + span.div_ceil(2) as i32;
    value >= low && value < high
}

fn inside_cross(rect: RoomRect, pos: Pos) -> bool {
    let center = rect.center();
    let arm_width = (rect.width / 3).max(3);
    let arm_height = (rect.height / 3).max(3);
    in_band(pos.y, center.y, arm_height) || in_band(pos.x, center.x, arm_width)
}

fn inside_t(rect: RoomRect, pos: Pos) -> bool {
    let stem_width = (rect.width / 3).max(3);
    let bar_height = (rect.height / 3).max(3);
    let in_bar = (pos.y as usize) < rect.y + bar_height;
    in_bar || in_band(pos.x, rect.center().x, stem_width)
}

fn inside_l(rect: RoomRect, pos: Pos, foot_height: usize, spine_width: usize) -> bool {
    let in_foot = (pos.y as usize) + foot_height >= rect.y + rect.height;
    let in_spine = (pos.x as usize) < rect.x + spine_width;
    in_foot || in_spine
}

/// Places pillars and walkable features on already-carved floor, recording them on the room.
pub fn decorate(grid: &mut GridMap, room: &mut Room, rng: &mut MapRng) {
    if matches!(room.tier, SizeTier::Large | SizeTier::Grand) {
        place_corner_pillars(grid, room);
        if room.tier == SizeTier::Grand && rng.chance(GRAND_CENTER_CLUSTER_CHANCE) {
            place_center_cluster(grid, room);
        }
    }
    if room.tier != SizeTier::Closet {
        scatter_features(grid, room, rng);
    }
}

fn place_corner_pillars(grid: &mut GridMap, room: &mut Room) {
    let rect = room.rect;
    if rect.width < PILLAR_MIN_SIDE || rect.height < PILLAR_MIN_SIDE {
        return;
    }
    let left = (rect.x + PILLAR_INSET) as i32;
    let right = (rect.right() - PILLAR_INSET) as i32;
    let top = (rect.y + PILLAR_INSET) as i32;
    let bottom = (rect.bottom() - PILLAR_INSET) as i32;
    let corners =
        [Pos::new(left, top), Pos::new(right, top), Pos::new(left, bottom), Pos::new(right, bottom)];
    place_pillars(grid, room, &corners);
}

fn place_center_cluster(grid: &mut GridMap, room: &mut Room) {
    let center = room.center();
    let cluster = [center.offset(-1, -1), center.offset(0, -1), center.offset(-1, 0), center];
    place_pillars(grid, room, &cluster);
}

fn place_pillars(grid: &mut GridMap, room: &mut Room, positions: &[Pos]) {
    for &pos in positions {
        if grid.tile_at(pos) == TileKind::Floor {
            grid.set_tile_at(pos, TileKind::Pillar);
            room.features.push(pos);
        }
    }
}

fn decoration_target(tier: SizeTier, rng: &mut MapRng) -> usize {
    match tier {
        SizeTier::Closet => usize::from(rng.chance(0.5)),
        SizeTier::Small => rng.range_inclusive(0, 2),
        SizeTier::Normal => rng.range_inclusive(1, 3),
        SizeTier::Large => rng.range_inclusive(2, 4),
        SizeTier::Grand => rng.range_inclusive(2, 5),
    }
}

fn scatter_features(grid: &mut GridMap, room: &mut Room, rng: &mut MapRng) {
    let target = decoration_target(room.tier, rng);
    let mut candidates: Vec<Pos> =
        room.rect.interior_cells().filter(|&pos| grid.tile_at(pos) == TileKind::Floor).collect();

    for _ in 0..target {
        let Some(&chosen) = rng.pick(&candidates) else {
            break;
        };
        grid.set_tile_at(chosen, TileKind::Feature);
        room.features.push(chosen);
        candidates.retain(|&pos| pos.manhattan(chosen) >= DECORATION_SPACING);
    }
}
