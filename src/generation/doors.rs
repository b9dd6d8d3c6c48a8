//! # Door Placement
//!
//! Converts selected boundary transitions into stateful door tiles.
//!
//! Runs after connectivity is certified. Closed doors stay in the walkable
//! set, so converting a floor transition into a door never breaks the
//! reachability proof.

use crate::game::{TileGrid, TileType};
use crate::generation::{Building, RandomSource, Room};
use crate::Position;

/// Places doors on room and building boundaries.
pub struct DoorPlacer;

impl DoorPlacer {
    /// Dungeon theme: each spot where a corridor breaches a room's wall
    /// shell becomes a closed door with probability `door_chance`.
    pub fn place_dungeon_doors(
        grid: &mut TileGrid,
        rooms: &[Room],
        door_chance: f64,
        rng: &mut RandomSource,
    ) {
        for room in rooms {
            for pos in room.perimeter_positions() {
                if grid.get(pos) != TileType::Floor {
                    continue;
                }
                if is_door_transition(grid, pos, room) && rng.chance(door_chance) {
                    grid.set(pos, TileType::DoorClosed);
                }
            }
        }
    }

    /// Town theme: every recorded building door slot is always a closed
    /// door; the slots were chosen for street adjacency at layout time.
    pub fn place_town_doors(grid: &mut TileGrid, buildings: &[Building]) {
        for building in buildings {
            for &slot in &building.doors {
                grid.set(slot, TileType::DoorClosed);
            }
        }
    }
}

/// A door fits where exactly two cardinal neighbours are floor: one inside
/// the room, one outside in the corridor. Wider breaches stay open.
fn is_door_transition(grid: &TileGrid, pos: Position, room: &Room) -> bool {
    let mut floor_neighbors = 0;
    let mut inside = false;
    let mut outside = false;

    for neighbor in pos.cardinal_adjacent_positions() {
        if grid.get(neighbor) != TileType::Floor {
            continue;
        }
        floor_neighbors += 1;
        if room.contains(neighbor) {
            inside = true;
        } else {
            outside = true;
        }
    }
    floor_neighbors == 2 && inside && outside
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::RoomRole;

    /// One room with a single-tile corridor entering from the east.
    fn room_with_corridor() -> (TileGrid, Room) {
        let mut grid = TileGrid::new(20, 12, TileType::Wall);
        let room = Room::new(2, 2, 6, 6, RoomRole::Plain);
        for pos in room.interior_positions() {
            grid.set(pos, TileType::Floor);
        }
        // Corridor breaching the east wall at y=5
        for x in 7..16 {
            grid.set(Position::new(x, 5), TileType::Floor);
        }
        (grid, room)
    }

    #[test]
    fn test_full_chance_places_door_at_breach() {
        let (mut grid, room) = room_with_corridor();
        let mut rng = RandomSource::new(1);
        DoorPlacer::place_dungeon_doors(&mut grid, &[room], 1.0, &mut rng);
        assert_eq!(grid.get(Position::new(7, 5)), TileType::DoorClosed);
    }

    #[test]
    fn test_zero_chance_places_no_doors() {
        let (mut grid, room) = room_with_corridor();
        let mut rng = RandomSource::new(1);
        DoorPlacer::place_dungeon_doors(&mut grid, &[room], 0.0, &mut rng);
        assert_eq!(grid.count_tiles(|t| t == TileType::DoorClosed), 0);
    }

    #[test]
    fn test_interior_floor_never_becomes_door() {
        let (mut grid, room) = room_with_corridor();
        let mut rng = RandomSource::new(2);
        DoorPlacer::place_dungeon_doors(&mut grid, &[room.clone()], 1.0, &mut rng);
        for pos in room.interior_positions() {
            assert_eq!(grid.get(pos), TileType::Floor);
        }
    }

    #[test]
    fn test_town_door_slots_always_become_doors() {
        let mut grid = TileGrid::new(20, 12, TileType::Wall);
        let bounds = Room::new(3, 3, 6, 5, RoomRole::Plain);
        for pos in bounds.perimeter_positions() {
            grid.set(pos, TileType::Wall);
        }
        for pos in bounds.interior_positions() {
            grid.set(pos, TileType::Floor);
        }
        let doors = vec![Position::new(5, 3), Position::new(8, 5)];
        for &d in &doors {
            grid.set(d, TileType::Floor);
        }
        let building = Building {
            bounds,
            doors: doors.clone(),
        };

        DoorPlacer::place_town_doors(&mut grid, &[building]);
        for &d in &doors {
            assert_eq!(grid.get(d), TileType::DoorClosed);
        }
    }
}
