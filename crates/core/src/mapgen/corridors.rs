//! Winding corridor paths between room centers and wall-only carving.

use log::debug;
use serde::Serialize;

use crate::types::{Pos, TileKind};

use super::grid::GridMap;
use super::room::Room;
use super::seed::MapRng;

const TOWARD_TARGET_CHANCE: f64 = 0.7;
const WALK_CAP_FACTOR: u32 = 3;
const SECONDARY_LOOP_RATIO: f64 = 0.25;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ConnectionEdge {
    pub from: usize,
    pub to: usize,
    pub path: Vec<Pos>,
    pub secondary: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CorridorPath {
    pub cells: Vec<Pos>,
    pub used_fallback: bool,
}

/// Biased random walk between the two room centers, replaced by an L-shaped run when
/// the walk exceeds its step cap.
pub fn find_path(from: &Room, to: &Room, grid: &GridMap, rng: &mut MapRng) -> CorridorPath {
    let start = from.center();
    let goal = to.center();
    let max_iterations = start.manhattan(goal) * WALK_CAP_FACTOR;

    let mut cells = vec![start];
    let mut current = start;
    let mut iterations = 0;
    while current != goal && iterations < max_iterations {
        iterations += 1;
        let next = if rng.chance(TOWARD_TARGET_CHANCE) {
            step_toward(current, goal)
        } else {
            let neighbors = current.neighbors();
            neighbors[rng.below(neighbors.len())]
        };
        if grid.is_interior(next) {
            current = next;
            cells.push(current);
        }
    }

    if current == goal {
        return CorridorPath { cells, used_fallback: false };
    }
    debug!("random walk {start:?}->{goal:?} gave up after {iterations} steps, using L-shaped path");
    CorridorPath { cells: l_shaped_path(start, goal, rng), used_fallback: true }
}

fn step_toward(current: Pos, goal: Pos) -> Pos {
    if current.x != goal.x {
        current.offset((goal.x - current.x).signum(), 0)
    } else {
        current.offset(0, (goal.y - current.y).signum())
    }
}

/// Straight run along one axis then the other; the axis order is a coin flip.
pub fn l_shaped_path(start: Pos, goal: Pos, rng: &mut MapRng) -> Vec<Pos> {
    let horizontal_first = rng.chance(0.5);
    l_shaped_path_with(start, goal, horizontal_first)
}

pub(super) fn l_shaped_path_with(start: Pos, goal: Pos, horizontal_first: bool) -> Vec<Pos> {
    let mut cells = Vec::new();
    if horizontal_first {
        push_horizontal(&mut cells, start.y, start.x, goal.x);
        push_vertical(&mut cells, goal.x, start.y, goal.y);
    } else {
        push_vertical(&mut cells, start.x, start.y, goal.y);
        push_horizontal(&mut cells, goal.y, start.x, goal.x);
    }
    cells
}

fn push_horizontal(cells: &mut Vec<Pos>, y: i32, from_x: i32, to_x: i32) {
    for x in from_x.min(to_x)..=from_x.max(to_x) {
        cells.push(Pos { y, x });
    }
}

fn push_vertical(cells: &mut Vec<Pos>, x: i32, from_y: i32, to_y: i32) {
    for y in from_y.min(to_y)..=from_y.max(to_y) {
        cells.push(Pos { y, x });
    }
}

/// Converts path cells to floor only where they are still wall. Returns the cells changed.
pub fn carve_path(grid: &mut GridMap, path: &[Pos]) -> Vec<Pos> {
    let mut carved = Vec::new();
    for &pos in path {
        if grid.tile_at(pos) == TileKind::Wall && grid.is_interior(pos) {
            grid.set_tile_at(pos, TileKind::Floor);
            carved.push(pos);
        }
    }
    carved
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CorridorReport {
    pub edges: Vec<ConnectionEdge>,
    pub walk_fallbacks: usize,
    pub secondary_loops: usize,
}

/// Carves every spanning-tree edge, then the extra loop edges.
pub fn carve_corridors(
    grid: &mut GridMap,
    rooms: &[Room],
    tree_edges: &[(usize, usize)],
    rng: &mut MapRng,
) -> CorridorReport {
    let mut report = CorridorReport::default();
    for &(from, to) in tree_edges {
        connect(grid, rooms, from, to, false, rng, &mut report);
    }

    for (from, to) in secondary_pairs(rooms.len()) {
        connect(grid, rooms, from, to, true, rng, &mut report);
        report.secondary_loops += 1;
    }
    report
}

fn connect(
    grid: &mut GridMap,
    rooms: &[Room],
    from: usize,
    to: usize,
    secondary: bool,
    rng: &mut MapRng,
    report: &mut CorridorReport,
) {
    let path = find_path(&rooms[from], &rooms[to], grid, rng);
    if path.used_fallback {
        report.walk_fallbacks += 1;
    }
    carve_path(grid, &path.cells);
    report.edges.push(ConnectionEdge { from, to, path: path.cells, secondary });
}

/// Room `i` links to `i + 2`, or to `i + 1` when `i + 2` runs off the end.
pub(super) fn secondary_pairs(room_count: usize) -> Vec<(usize, usize)> {
    let loop_count = (room_count as f64 * SECONDARY_LOOP_RATIO).floor() as usize;
    (0..loop_count)
        .take_while(|&index| index + 1 < room_count)
        .map(|index| if index + 2 < room_count { (index, index + 2) } else { (index, index + 1) })
        .collect()
}
