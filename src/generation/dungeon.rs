//! # Dungeon Generation
//!
//! Room-and-corridor layout: randomly proposed rectangular rooms accepted
//! with collision detection, later connected by the corridor router.

use crate::game::{Theme, TileGrid, TileType};
use crate::generation::{Layout, RandomSource, Room, RoomRole, ThemeGenerator, ThemeParams};
use crate::{DelveError, DelveResult};

/// Placement attempts allowed per room before placement stops.
const PLACEMENT_ATTEMPTS_PER_ROOM: u32 = 100;

/// Chance that a non-starting room is tagged for special treatment.
const SPECIAL_ROOM_CHANCE: f64 = 0.08;

/// Generates dungeon levels from randomly placed rectangular rooms.
///
/// Rooms are proposed with dimensions in `[min_room_size, max_room_size]`
/// and accepted when they stay in bounds and keep the configured margin
/// from every previously accepted room. Running out of attempts is not an
/// error as long as at least two rooms were placed; corridors and the
/// connectivity validator take it from there.
pub struct DungeonGenerator;

impl ThemeGenerator for DungeonGenerator {
    fn theme(&self) -> Theme {
        Theme::Dungeon
    }

    fn generate(
        &self,
        grid: &mut TileGrid,
        params: &ThemeParams,
        rng: &mut RandomSource,
    ) -> DelveResult<Layout> {
        grid.fill(TileType::Wall);

        // Late-depth size scaling can outgrow small grids; rooms must leave
        // a one-tile border on each side.
        let max_size = params
            .max_room_size
            .min(params.width.saturating_sub(3))
            .min(params.height.saturating_sub(3));
        let min_size = params.min_room_size.min(max_size);
        let margin = params.room_margin as i32;

        let mut rooms: Vec<Room> = Vec::new();
        'rooms: for _ in 0..params.target_rooms {
            for _ in 0..PLACEMENT_ATTEMPTS_PER_ROOM {
                let w = rng.range_u32(min_size, max_size);
                let h = rng.range_u32(min_size, max_size);
                let x = rng.range_i32(1, params.width as i32 - w as i32 - 1);
                let y = rng.range_i32(1, params.height as i32 - h as i32 - 1);

                let role = if !rooms.is_empty() && rng.chance(SPECIAL_ROOM_CHANCE) {
                    RoomRole::Special
                } else {
                    RoomRole::Plain
                };
                let candidate = Room::new(x, y, w, h, role);

                if rooms
                    .iter()
                    .any(|existing| candidate.intersects_with_margin(existing, margin))
                {
                    continue;
                }

                carve_room(grid, &candidate);
                rooms.push(candidate);
                continue 'rooms;
            }
            // A full attempt budget without a fit means the grid is packed.
            break;
        }

        if rooms.len() < 2 {
            return Err(DelveError::AttemptsExhausted(format!(
                "placed only {} room(s) in a {}x{} dungeon",
                rooms.len(),
                params.width,
                params.height
            )));
        }

        log::debug!(
            "dungeon depth {}: placed {}/{} rooms",
            params.depth,
            rooms.len(),
            params.target_rooms
        );

        Ok(Layout {
            rooms,
            ..Layout::default()
        })
    }
}

/// Carves a room interior to floor, leaving its one-tile wall shell.
fn carve_room(grid: &mut TileGrid, room: &Room) {
    for pos in room.interior_positions() {
        grid.set(pos, TileType::Floor);
    }
}
