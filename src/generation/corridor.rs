//! # Corridor Routing
//!
//! Connects generated regions with carved corridors.
//!
//! A complete graph over region centers, weighted by Manhattan distance,
//! is reduced to a minimum spanning tree; carving one corridor per MST
//! edge is the minimal edge set that connects every region in a single
//! pass. Ties between equal-weight edges break toward the lowest region
//! index so the tree is deterministic for a given center list.

use crate::game::{TileGrid, TileType};
use crate::generation::{CorridorStyle, RandomSource};
use crate::Position;

/// An ordered sequence of centerline tiles carved between two regions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Corridor {
    pub points: Vec<Position>,
}

/// Carves corridors between region centers.
pub struct CorridorRouter {
    style: CorridorStyle,
    width: u32,
}

impl CorridorRouter {
    pub fn new(style: CorridorStyle, width: u32) -> Self {
        Self { style, width }
    }

    /// Connects every center to every other through the MST edge set.
    /// Returns the carved corridors in edge order.
    pub fn connect(
        &self,
        grid: &mut TileGrid,
        centers: &[Position],
        rng: &mut RandomSource,
    ) -> Vec<Corridor> {
        if centers.len() < 2 {
            return Vec::new();
        }
        minimum_spanning_tree(centers)
            .into_iter()
            .map(|(a, b)| self.carve_between(grid, centers[a], centers[b], rng))
            .collect()
    }

    /// Carves one corridor between two points in the configured style.
    pub fn carve_between(
        &self,
        grid: &mut TileGrid,
        from: Position,
        to: Position,
        rng: &mut RandomSource,
    ) -> Corridor {
        match self.style {
            CorridorStyle::LShaped => self.carve_l(grid, from, to, rng.chance(0.5)),
            CorridorStyle::Diagonal => self.carve_diagonal(grid, from, to),
        }
    }

    /// Carves a repair corridor. Repairs take a fixed horizontal-first
    /// L-shape so the validator stays free of random state.
    pub fn carve_repair(&self, grid: &mut TileGrid, from: Position, to: Position) -> Corridor {
        self.carve_l(grid, from, to, true)
    }

    /// Two orthogonal segments meeting at a corner.
    fn carve_l(
        &self,
        grid: &mut TileGrid,
        from: Position,
        to: Position,
        horizontal_first: bool,
    ) -> Corridor {
        let mut points = Vec::new();
        if horizontal_first {
            self.carve_horizontal(grid, from.x, to.x, from.y, &mut points);
            self.carve_vertical(grid, from.y, to.y, to.x, &mut points);
        } else {
            self.carve_vertical(grid, from.y, to.y, from.x, &mut points);
            self.carve_horizontal(grid, from.x, to.x, to.y, &mut points);
        }
        Corridor { points }
    }

    fn carve_horizontal(
        &self,
        grid: &mut TileGrid,
        x1: i32,
        x2: i32,
        y: i32,
        points: &mut Vec<Position>,
    ) {
        for x in x1.min(x2)..=x1.max(x2) {
            let pos = Position::new(x, y);
            carve_tile(grid, pos);
            points.push(pos);
            for d in 1..self.width as i32 {
                carve_tile(grid, Position::new(x, y - d));
                carve_tile(grid, Position::new(x, y + d));
            }
        }
    }

    fn carve_vertical(
        &self,
        grid: &mut TileGrid,
        y1: i32,
        y2: i32,
        x: i32,
        points: &mut Vec<Position>,
    ) {
        for y in y1.min(y2)..=y1.max(y2) {
            let pos = Position::new(x, y);
            carve_tile(grid, pos);
            points.push(pos);
            for d in 1..self.width as i32 {
                carve_tile(grid, Position::new(x - d, y));
                carve_tile(grid, Position::new(x + d, y));
            }
        }
    }

    /// Bresenham line between the endpoints. Diagonal steps are only
    /// 4-connected when flanked, so the path always carves at least one
    /// tile to each side of the dominant axis.
    fn carve_diagonal(&self, grid: &mut TileGrid, from: Position, to: Position) -> Corridor {
        let points = bresenham_points(from, to);
        let x_dominant = (to.x - from.x).abs() >= (to.y - from.y).abs();
        let spread = (self.width.max(2) - 1) as i32;

        for &pos in &points {
            carve_tile(grid, pos);
            for d in 1..=spread {
                if x_dominant {
                    carve_tile(grid, Position::new(pos.x, pos.y - d));
                    carve_tile(grid, Position::new(pos.x, pos.y + d));
                } else {
                    carve_tile(grid, Position::new(pos.x - d, pos.y));
                    carve_tile(grid, Position::new(pos.x + d, pos.y));
                }
            }
        }
        Corridor { points }
    }
}

/// Carving only ever turns wall into floor; doors, stairs, altars, and
/// deposits that already exist are left untouched.
fn carve_tile(grid: &mut TileGrid, pos: Position) {
    if grid.in_bounds(pos) && grid.get(pos) == TileType::Wall {
        grid.set(pos, TileType::Floor);
    }
}

/// All points of a Bresenham line from `from` to `to`, inclusive.
fn bresenham_points(from: Position, to: Position) -> Vec<Position> {
    let mut points = Vec::new();
    let dx = (to.x - from.x).abs();
    let dy = (to.y - from.y).abs();
    let step_x = if from.x < to.x { 1 } else { -1 };
    let step_y = if from.y < to.y { 1 } else { -1 };
    let (mut x, mut y) = (from.x, from.y);
    let mut error = dx - dy;

    loop {
        points.push(Position::new(x, y));
        if x == to.x && y == to.y {
            break;
        }
        let doubled = 2 * error;
        if doubled > -dy {
            error -= dy;
            x += step_x;
        }
        if doubled < dx {
            error += dx;
            y += step_y;
        }
    }
    points
}

/// Prim's algorithm over the complete Manhattan-distance graph.
///
/// Returns (tree node, new node) index pairs. On equal weights the lowest
/// candidate index wins, which keeps reproducibility tests stable.
fn minimum_spanning_tree(centers: &[Position]) -> Vec<(usize, usize)> {
    let n = centers.len();
    let mut in_tree = vec![false; n];
    let mut best_cost = vec![u32::MAX; n];
    let mut best_parent = vec![0usize; n];
    let mut edges = Vec::with_capacity(n.saturating_sub(1));

    in_tree[0] = true;
    for i in 1..n {
        best_cost[i] = centers[0].manhattan_distance(centers[i]);
    }

    for _ in 1..n {
        let mut next = None;
        for i in 0..n {
            if !in_tree[i] && next.map_or(true, |j: usize| best_cost[i] < best_cost[j]) {
                next = Some(i);
            }
        }
        let Some(next) = next else { break };

        in_tree[next] = true;
        edges.push((best_parent[next], next));

        for i in 0..n {
            if !in_tree[i] {
                let cost = centers[next].manhattan_distance(centers[i]);
                if cost < best_cost[i] {
                    best_cost[i] = cost;
                    best_parent[i] = next;
                }
            }
        }
    }
    edges
}
