//! # Town Generation
//!
//! Structured town layouts: a street grid, walled buildings with redundant
//! perimeter door slots, and an altar at the town center.
//!
//! Buildings get two or three door slots each; a single slot proved too
//! fragile against isolated buildings, so the redundancy is part of the
//! layout contract, with the connectivity validator as the backstop.

use crate::game::{Theme, TileGrid, TileType};
use crate::generation::{Building, Layout, RandomSource, Room, RoomRole, ThemeGenerator, ThemeParams};
use crate::{DelveError, DelveResult, Position};

/// Total building placement attempts before the layout is taken as-is.
const BUILDING_PLACEMENT_ATTEMPTS: u32 = 250;

/// Generates the town level.
pub struct TownGenerator;

impl ThemeGenerator for TownGenerator {
    fn theme(&self) -> Theme {
        Theme::Town
    }

    fn generate(
        &self,
        grid: &mut TileGrid,
        params: &ThemeParams,
        rng: &mut RandomSource,
    ) -> DelveResult<Layout> {
        grid.fill(TileType::Wall);

        carve_streets(grid, params.town_street_width);

        let buildings = place_buildings(grid, params, rng);
        if buildings.len() < 2 {
            return Err(DelveError::AttemptsExhausted(format!(
                "placed only {} building(s) in a {}x{} town",
                buildings.len(),
                params.width,
                params.height
            )));
        }

        // The street crossing at the geometric center carries the altar.
        let center = Position::new(params.width as i32 / 2, params.height as i32 / 2);
        grid.set(center, TileType::Altar);

        log::debug!("town: placed {} buildings", buildings.len());

        Ok(Layout {
            buildings,
            altar: Some(center),
            ..Layout::default()
        })
    }
}

/// Carves the perimeter ring road and the central cross streets.
fn carve_streets(grid: &mut TileGrid, street_width: u32) {
    let (w, h) = (grid.width() as i32, grid.height() as i32);
    let sw = street_width as i32;

    let mut carve_rows = |y0: i32, y1: i32| {
        for y in y0..y1 {
            for x in 1..(w - 1) {
                grid.set(Position::new(x, y), TileType::Floor);
            }
        }
    };
    // Ring road: top and bottom bands
    carve_rows(1, 1 + sw);
    carve_rows(h - 1 - sw, h - 1);
    // Central horizontal street
    let mid_y = h / 2 - sw / 2;
    carve_rows(mid_y, mid_y + sw);

    let mut carve_cols = |x0: i32, x1: i32| {
        for x in x0..x1 {
            for y in 1..(h - 1) {
                grid.set(Position::new(x, y), TileType::Floor);
            }
        }
    };
    // Ring road: left and right bands
    carve_cols(1, 1 + sw);
    carve_cols(w - 1 - sw, w - 1);
    // Central vertical street
    let mid_x = w / 2 - sw / 2;
    carve_cols(mid_x, mid_x + sw);
}

/// Places non-overlapping buildings adjacent to the street network.
fn place_buildings(
    grid: &mut TileGrid,
    params: &ThemeParams,
    rng: &mut RandomSource,
) -> Vec<Building> {
    let mut buildings: Vec<Building> = Vec::new();
    let mut attempts = 0;

    while buildings.len() < params.target_rooms as usize && attempts < BUILDING_PLACEMENT_ATTEMPTS {
        attempts += 1;

        let bw = rng.range_u32(params.town_building_min_size, params.town_building_max_size);
        let bh = rng.range_u32(params.town_building_min_size, params.town_building_max_size);
        let x = rng.range_i32(2, params.width as i32 - bw as i32 - 2);
        let y = rng.range_i32(2, params.height as i32 - bh as i32 - 2);
        let bounds = Room::new(x, y, bw, bh, RoomRole::Plain);

        if buildings
            .iter()
            .any(|b| bounds.intersects_with_margin(&b.bounds, 1))
        {
            continue;
        }
        // Streets are already floor; a footprint that is not solid wall
        // would cut the road network.
        if bounds
            .perimeter_positions()
            .iter()
            .chain(bounds.interior_positions().iter())
            .any(|&p| grid.get(p) != TileType::Wall)
        {
            continue;
        }

        let mut slots = door_slots(grid, &bounds);
        if slots.len() < 2 {
            continue;
        }

        carve_building(grid, &bounds);

        rng.shuffle(&mut slots);
        let door_count = (rng.range_u32(2, 3) as usize).min(slots.len());
        let doors: Vec<Position> = slots.into_iter().take(door_count).collect();
        for &door in &doors {
            grid.set(door, TileType::Floor);
        }

        buildings.push(Building { bounds, doors });
    }

    buildings
}

/// Perimeter positions usable as doors: non-corner wall cells whose
/// outward neighbour is street floor.
fn door_slots(grid: &TileGrid, bounds: &Room) -> Vec<Position> {
    let right = bounds.x + bounds.width as i32 - 1;
    let bottom = bounds.y + bounds.height as i32 - 1;
    let mut slots = Vec::new();

    for x in (bounds.x + 1)..right {
        if grid.get(Position::new(x, bounds.y - 1)) == TileType::Floor {
            slots.push(Position::new(x, bounds.y));
        }
        if grid.get(Position::new(x, bottom + 1)) == TileType::Floor {
            slots.push(Position::new(x, bottom));
        }
    }
    for y in (bounds.y + 1)..bottom {
        if grid.get(Position::new(bounds.x - 1, y)) == TileType::Floor {
            slots.push(Position::new(bounds.x, y));
        }
        if grid.get(Position::new(right + 1, y)) == TileType::Floor {
            slots.push(Position::new(right, y));
        }
    }
    slots
}

/// Carves a building: wall shell, floor interior.
fn carve_building(grid: &mut TileGrid, bounds: &Room) {
    for pos in bounds.perimeter_positions() {
        grid.set(pos, TileType::Wall);
    }
    for pos in bounds.interior_positions() {
        grid.set(pos, TileType::Floor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::GenerationConfig;

    fn generate(seed: u64) -> (TileGrid, Layout) {
        let params = GenerationConfig::default().scaled_for_depth(1);
        let mut grid = TileGrid::new(params.width, params.height, TileType::Wall);
        let mut rng = RandomSource::for_depth(seed, 1, 0);
        let layout = TownGenerator.generate(&mut grid, &params, &mut rng).unwrap();
        (grid, layout)
    }

    #[test]
    fn test_altar_at_geometric_center() {
        let (grid, layout) = generate(42);
        let center = Position::new(grid.width() as i32 / 2, grid.height() as i32 / 2);
        assert_eq!(layout.altar, Some(center));
        assert_eq!(grid.get(center), TileType::Altar);
        assert_eq!(grid.count_tiles(|t| t == TileType::Altar), 1);
    }

    #[test]
    fn test_buildings_have_two_or_three_door_slots() {
        let (_, layout) = generate(42);
        assert!(layout.buildings.len() >= 2);
        for building in &layout.buildings {
            assert!(
                (2..=3).contains(&building.doors.len()),
                "building has {} door slots",
                building.doors.len()
            );
        }
    }

    #[test]
    fn test_door_slots_open_onto_streets() {
        let (grid, layout) = generate(7);
        for building in &layout.buildings {
            let connected = building.doors.iter().any(|&door| {
                door.cardinal_adjacent_positions().iter().any(|&n| {
                    !building.bounds.contains(n) && grid.get(n) == TileType::Floor
                })
            });
            assert!(connected, "building {:?} has no street-facing door", building.bounds);
        }
    }

    #[test]
    fn test_buildings_do_not_overlap() {
        let (_, layout) = generate(99);
        for (i, a) in layout.buildings.iter().enumerate() {
            for b in layout.buildings.iter().skip(i + 1) {
                assert!(!a.bounds.intersects(&b.bounds));
            }
        }
    }

    #[test]
    fn test_building_interiors_are_floor() {
        let (grid, layout) = generate(3);
        for building in &layout.buildings {
            for pos in building.bounds.interior_positions() {
                assert_eq!(grid.get(pos), TileType::Floor);
            }
        }
    }

    #[test]
    fn test_map_edges_are_wall() {
        let (grid, _) = generate(1);
        let (w, h) = (grid.width() as i32, grid.height() as i32);
        for x in 0..w {
            assert_eq!(grid.get(Position::new(x, 0)), TileType::Wall);
            assert_eq!(grid.get(Position::new(x, h - 1)), TileType::Wall);
        }
        for y in 0..h {
            assert_eq!(grid.get(Position::new(0, y)), TileType::Wall);
            assert_eq!(grid.get(Position::new(w - 1, y)), TileType::Wall);
        }
    }
}
