//! # Cave Generation
//!
//! Cellular-automata caves: a random wall fill smoothed into organic
//! caverns. Connectivity between the resulting floor pockets is the
//! corridor router's and validator's job, not the automaton's.

use crate::game::{Theme, TileGrid, TileType};
use crate::generation::{Layout, RandomSource, ThemeGenerator, ThemeParams};
use crate::{DelveResult, Position};

/// Comfort band for the post-smoothing wall ratio. Values outside it are
/// accepted as-is and only logged; connectivity is what gets enforced,
/// not density.
pub const WALL_RATIO_BAND: (f64, f64) = (0.25, 0.60);

/// Generates cave levels with a cellular automaton.
///
/// Each interior cell starts as wall with probability
/// `cave_fill_probability`. Every smoothing pass recomputes a cell as wall
/// when at least `cave_neighbor_threshold` of its 8 neighbours are walls
/// (out-of-bounds neighbours count as walls). Single-tile floor pockets
/// left after smoothing are filled in since nothing can meaningfully
/// connect them.
pub struct CaveGenerator;

impl ThemeGenerator for CaveGenerator {
    fn theme(&self) -> Theme {
        Theme::Cave
    }

    fn generate(
        &self,
        grid: &mut TileGrid,
        params: &ThemeParams,
        rng: &mut RandomSource,
    ) -> DelveResult<Layout> {
        randomize(grid, params.cave_fill_probability, rng);

        for _ in 0..params.cave_smoothing_iterations {
            smooth(grid, params.cave_neighbor_threshold);
        }

        fill_isolated_pockets(grid);

        let ratio = grid.wall_ratio();
        if ratio < WALL_RATIO_BAND.0 || ratio > WALL_RATIO_BAND.1 {
            log::debug!(
                "cave depth {}: wall ratio {:.2} outside comfort band",
                params.depth,
                ratio
            );
        }

        Ok(Layout::default())
    }
}

/// Seeds the grid: border ring always wall, interior wall with `fill_probability`.
fn randomize(grid: &mut TileGrid, fill_probability: f64, rng: &mut RandomSource) {
    let (w, h) = (grid.width() as i32, grid.height() as i32);
    for y in 0..h {
        for x in 0..w {
            let pos = Position::new(x, y);
            let on_border = x == 0 || y == 0 || x == w - 1 || y == h - 1;
            let tile = if on_border || rng.chance(fill_probability) {
                TileType::Wall
            } else {
                TileType::Floor
            };
            grid.set(pos, tile);
        }
    }
}

/// One double-buffered smoothing pass of the automaton.
fn smooth(grid: &mut TileGrid, neighbor_threshold: u32) {
    let (w, h) = (grid.width() as i32, grid.height() as i32);
    let mut next = grid.clone();
    for y in 0..h {
        for x in 0..w {
            let pos = Position::new(x, y);
            let on_border = x == 0 || y == 0 || x == w - 1 || y == h - 1;
            let tile = if on_border || count_wall_neighbors(grid, pos) >= neighbor_threshold {
                TileType::Wall
            } else {
                TileType::Floor
            };
            next.set(pos, tile);
        }
    }
    *grid = next;
}

/// Counts walls among the 8 surrounding cells; out of bounds counts as wall.
fn count_wall_neighbors(grid: &TileGrid, pos: Position) -> u32 {
    let mut count = 0;
    for dy in -1..=1 {
        for dx in -1..=1 {
            if dx == 0 && dy == 0 {
                continue;
            }
            if grid.get(Position::new(pos.x + dx, pos.y + dy)) == TileType::Wall {
                count += 1;
            }
        }
    }
    count
}

/// Merges floor cells with no cardinal floor neighbour back into wall.
fn fill_isolated_pockets(grid: &mut TileGrid) {
    let stranded: Vec<Position> = grid
        .positions()
        .filter(|&pos| {
            grid.get(pos) == TileType::Floor
                && pos
                    .cardinal_adjacent_positions()
                    .iter()
                    .all(|&n| grid.get(n) == TileType::Wall)
        })
        .collect();
    for pos in stranded {
        grid.set(pos, TileType::Wall);
    }
}
