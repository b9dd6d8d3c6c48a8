//! # Connectivity Validation and Repair
//!
//! Proves every walkable tile of a level is reachable from the spawn tile,
//! and greedily carves repair corridors where it is not.
//!
//! All traversal here runs on an explicit worklist. Recursive flood fill
//! has overflowed the call stack on deep, large maps before; the iterative
//! form is a hard requirement, not a style preference.

use crate::game::TileGrid;
use crate::generation::CorridorRouter;
use crate::{DelveError, DelveResult, Position};
use std::collections::VecDeque;

/// Validates and repairs full reachability of a level grid.
pub struct ConnectivityValidator {
    max_repair_attempts: u32,
}

impl ConnectivityValidator {
    pub fn new(max_repair_attempts: u32) -> Self {
        Self { max_repair_attempts }
    }

    /// Iterative 4-connected flood fill over walkable tiles.
    ///
    /// Returns a row-major mask of the tiles reachable from `start`.
    pub fn reachable_mask(grid: &TileGrid, start: Position) -> Vec<bool> {
        let width = grid.width() as usize;
        let mut mask = vec![false; width * grid.height() as usize];
        if !grid.in_bounds(start) || !grid.get(start).is_walkable() {
            return mask;
        }

        let mut queue = VecDeque::new();
        mask[start.y as usize * width + start.x as usize] = true;
        queue.push_back(start);

        while let Some(pos) = queue.pop_front() {
            for next in pos.cardinal_adjacent_positions() {
                if !grid.in_bounds(next) || !grid.get(next).is_walkable() {
                    continue;
                }
                let index = next.y as usize * width + next.x as usize;
                if !mask[index] {
                    mask[index] = true;
                    queue.push_back(next);
                }
            }
        }
        mask
    }

    /// Whether every walkable tile is reachable from `spawn`.
    pub fn is_fully_connected(grid: &TileGrid, spawn: Position) -> bool {
        let mask = Self::reachable_mask(grid, spawn);
        Self::stranded_tiles(grid, &mask).is_empty()
    }

    /// All connected components of the walkable set, in scan order.
    pub fn components(grid: &TileGrid) -> Vec<Vec<Position>> {
        let width = grid.width() as usize;
        let mut visited = vec![false; width * grid.height() as usize];
        let mut components = Vec::new();

        for seed in grid.positions() {
            let index = seed.y as usize * width + seed.x as usize;
            if visited[index] || !grid.get(seed).is_walkable() {
                continue;
            }
            components.push(collect_component(grid, seed, &mut visited));
        }
        components
    }

    /// Walkable tiles missing from a reachability mask, in scan order.
    fn stranded_tiles(grid: &TileGrid, mask: &[bool]) -> Vec<Position> {
        let width = grid.width() as usize;
        grid.positions()
            .filter(|&p| {
                grid.get(p).is_walkable() && !mask[p.y as usize * width + p.x as usize]
            })
            .collect()
    }

    /// Connected components among the stranded tiles.
    fn stranded_components(grid: &TileGrid, mask: &[bool]) -> Vec<Vec<Position>> {
        let width = grid.width() as usize;
        let mut visited = mask.to_vec();
        let mut components = Vec::new();
        for seed in Self::stranded_tiles(grid, mask) {
            let index = seed.y as usize * width + seed.x as usize;
            if !visited[index] {
                components.push(collect_component(grid, seed, &mut visited));
            }
        }
        components
    }

    /// Certifies full reachability from `spawn`, carving repair corridors
    /// as needed. Returns the number of repairs made.
    ///
    /// Each pass reattaches the disconnected component nearest to the
    /// reached set, so the component count strictly decreases; a layout
    /// that still is not whole after `max_repair_attempts` passes is
    /// abandoned for this sub-seed.
    pub fn validate_and_repair(
        &self,
        grid: &mut TileGrid,
        spawn: Position,
        router: &CorridorRouter,
    ) -> DelveResult<u32> {
        let mut repairs = 0;
        for _ in 0..self.max_repair_attempts {
            let mask = Self::reachable_mask(grid, spawn);
            let components = Self::stranded_components(grid, &mask);
            if components.is_empty() {
                if repairs > 0 {
                    log::debug!("connectivity restored after {repairs} repair(s)");
                }
                return Ok(repairs);
            }

            let Some((from, to)) = nearest_repair_pair(grid, &mask, &components) else {
                break;
            };
            log::debug!(
                "repairing {} stranded component(s): carving {:?} -> {:?}",
                components.len(),
                from,
                to
            );
            router.carve_repair(grid, from, to);
            repairs += 1;
        }

        let mask = Self::reachable_mask(grid, spawn);
        let remaining = Self::stranded_components(grid, &mask);
        if remaining.is_empty() {
            Ok(repairs)
        } else {
            Err(DelveError::RepairFailed {
                components: remaining.len(),
            })
        }
    }
}

/// Iteratively collects the component containing `seed`, marking `visited`.
fn collect_component(grid: &TileGrid, seed: Position, visited: &mut [bool]) -> Vec<Position> {
    let width = grid.width() as usize;
    let mut component = Vec::new();
    let mut queue = VecDeque::new();

    visited[seed.y as usize * width + seed.x as usize] = true;
    queue.push_back(seed);

    while let Some(pos) = queue.pop_front() {
        component.push(pos);
        for next in pos.cardinal_adjacent_positions() {
            if !grid.in_bounds(next) || !grid.get(next).is_walkable() {
                continue;
            }
            let index = next.y as usize * width + next.x as usize;
            if !visited[index] {
                visited[index] = true;
                queue.push_back(next);
            }
        }
    }
    component
}

/// Picks the (stranded tile, reached tile) pair to carve between: for each
/// component, an expanding-ring search around its representative finds the
/// nearest already-reached tile, and the component with the shortest such
/// hop wins.
fn nearest_repair_pair(
    grid: &TileGrid,
    mask: &[bool],
    components: &[Vec<Position>],
) -> Option<(Position, Position)> {
    let mut best: Option<(u32, Position, Position)> = None;

    for component in components {
        let rep = component_representative(component);
        let Some(target) = nearest_reached_tile(grid, mask, rep) else {
            continue;
        };
        // Hop from the component tile closest to the found target.
        let from = component
            .iter()
            .copied()
            .min_by_key(|p| p.manhattan_distance(target))?;
        let distance = from.manhattan_distance(target);
        if best.map_or(true, |(d, _, _)| distance < d) {
            best = Some((distance, from, target));
        }
    }
    best.map(|(_, from, to)| (from, to))
}

/// The component tile nearest to the component's centroid.
pub(crate) fn component_representative(component: &[Position]) -> Position {
    let (sx, sy) = component
        .iter()
        .fold((0i64, 0i64), |(sx, sy), p| (sx + p.x as i64, sy + p.y as i64));
    let centroid = Position::new(
        (sx / component.len() as i64) as i32,
        (sy / component.len() as i64) as i32,
    );
    component
        .iter()
        .copied()
        .min_by_key(|p| p.manhattan_distance(centroid))
        .unwrap_or(component[0])
}

/// Expanding Chebyshev-ring scan for the closest reached walkable tile.
fn nearest_reached_tile(grid: &TileGrid, mask: &[bool], from: Position) -> Option<Position> {
    let width = grid.width() as usize;
    let reached = |pos: Position| {
        grid.in_bounds(pos) && mask[pos.y as usize * width + pos.x as usize]
    };
    let max_radius = grid.width().max(grid.height()) as i32;

    for radius in 1..=max_radius {
        // Top and bottom edges of the ring, then the side columns.
        for x in (from.x - radius)..=(from.x + radius) {
            for y in [from.y - radius, from.y + radius] {
                let pos = Position::new(x, y);
                if reached(pos) {
                    return Some(pos);
                }
            }
        }
        for y in (from.y - radius + 1)..(from.y + radius) {
            for x in [from.x - radius, from.x + radius] {
                let pos = Position::new(x, y);
                if reached(pos) {
                    return Some(pos);
                }
            }
        }
    }
    None
}
