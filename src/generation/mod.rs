//! # Generation Module
//!
//! Procedural level generation: theme strategies, corridor routing,
//! connectivity validation, and door placement.
//!
//! The three theme builders (dungeon, cave, town) share no state, only a
//! common output contract, so they are modeled as a small strategy trait
//! rather than an inheritance hierarchy. The level manager picks a theme
//! per depth, scales the configured parameters, and drives the builders
//! through the generate → route → validate/repair → place-doors pipeline.

pub mod cave;
pub mod connectivity;
pub mod corridor;
pub mod doors;
pub mod dungeon;
pub mod rng;
pub mod town;

pub use cave::*;
pub use connectivity::*;
pub use corridor::*;
pub use doors::*;
pub use dungeon::*;
pub use rng::*;
pub use town::*;

use crate::game::{Theme, TileGrid};
use crate::{DelveError, DelveResult, Position};
use serde::{Deserialize, Serialize};

/// Shape of carved corridors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CorridorStyle {
    /// Two orthogonal segments meeting at a corner.
    LShaped,
    /// A Bresenham line between the endpoints.
    Diagonal,
}

/// Configuration for procedural generation.
///
/// Supplied by the surrounding application at session start and consumed
/// read-only at generation time. Values outside sane bounds are rejected
/// by [`GenerationConfig::validate`] before any tile is written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Level width in tiles
    pub default_width: u32,
    /// Level height in tiles
    pub default_height: u32,
    /// Minimum room edge length (including walls)
    pub min_room_size: u32,
    /// Maximum room edge length at depth 1; grows slowly with depth
    pub max_room_size: u32,
    /// Base room count before depth scaling
    pub max_rooms_base: u32,
    /// Additional rooms per depth level
    pub rooms_per_level: f64,
    /// Minimum clearance kept between any two rooms
    pub room_margin: u32,
    /// Corridor carving style
    pub corridor_style: CorridorStyle,
    /// Corridor width in tiles
    pub corridor_width: u32,
    /// Probability that a room-to-corridor transition becomes a door
    pub door_chance: f64,
    /// Initial wall probability for the cave automaton
    pub cave_fill_probability: f64,
    /// Number of cave smoothing passes
    pub cave_smoothing_iterations: u32,
    /// 8-neighbour wall count at or above which a cell becomes wall
    pub cave_neighbor_threshold: u32,
    /// Minimum building edge length in towns
    pub town_building_min_size: u32,
    /// Maximum building edge length in towns
    pub town_building_max_size: u32,
    /// Street width in towns
    pub town_street_width: u32,
    /// A cave level every N depths
    pub cave_frequency: u32,
    /// Deepest level; the terminal depth has no down stairs
    pub max_depth: u32,
    /// Repair passes the connectivity validator may spend per attempt
    pub max_repair_attempts: u32,
    /// Full regeneration attempts per depth before giving up
    pub max_generation_retries: u32,
    /// Per-floor-tile probability of a resource deposit
    pub resource_chance: f64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            default_width: 80,
            default_height: 50,
            min_room_size: 4,
            max_room_size: 12,
            max_rooms_base: 20,
            rooms_per_level: 0.5,
            room_margin: 1,
            corridor_style: CorridorStyle::LShaped,
            corridor_width: 1,
            door_chance: 0.2,
            cave_fill_probability: 0.45,
            cave_smoothing_iterations: 5,
            cave_neighbor_threshold: 4,
            town_building_min_size: 4,
            town_building_max_size: 8,
            town_street_width: 3,
            cave_frequency: 5,
            max_depth: 30,
            max_repair_attempts: 10,
            max_generation_retries: 5,
            resource_chance: 0.02,
        }
    }
}

impl GenerationConfig {
    /// Checks all parameters for sanity.
    ///
    /// Runs before any generation work so a bad configuration fails fast
    /// instead of producing a broken level.
    pub fn validate(&self) -> DelveResult<()> {
        let invalid = |msg: String| Err(DelveError::InvalidThemeParameters(msg));

        if self.default_width < 16 || self.default_height < 16 {
            return invalid(format!(
                "level dimensions {}x{} are too small (minimum 16x16)",
                self.default_width, self.default_height
            ));
        }
        if self.min_room_size < 3 {
            return invalid(format!(
                "min_room_size {} leaves no room interior (minimum 3)",
                self.min_room_size
            ));
        }
        if self.min_room_size > self.max_room_size {
            return invalid(format!(
                "min_room_size {} exceeds max_room_size {}",
                self.min_room_size, self.max_room_size
            ));
        }
        if self.max_room_size + 2 >= self.default_width.min(self.default_height) {
            return invalid(format!(
                "max_room_size {} does not fit inside {}x{}",
                self.max_room_size, self.default_width, self.default_height
            ));
        }
        if self.max_rooms_base < 2 {
            return invalid(format!(
                "max_rooms_base {} cannot yield a connectable layout (minimum 2)",
                self.max_rooms_base
            ));
        }
        if self.rooms_per_level < 0.0 {
            return invalid(format!("rooms_per_level {} is negative", self.rooms_per_level));
        }
        if !(1..=4).contains(&self.corridor_width) {
            return invalid(format!(
                "corridor_width {} outside supported range 1..=4",
                self.corridor_width
            ));
        }
        for (name, p) in [
            ("door_chance", self.door_chance),
            ("cave_fill_probability", self.cave_fill_probability),
            ("resource_chance", self.resource_chance),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return invalid(format!("{name} {p} is not a probability"));
            }
        }
        if !(1..=8).contains(&self.cave_neighbor_threshold) {
            return invalid(format!(
                "cave_neighbor_threshold {} outside 1..=8",
                self.cave_neighbor_threshold
            ));
        }
        if self.town_building_min_size < 4 {
            return invalid(format!(
                "town_building_min_size {} cannot hold an interior and door slots (minimum 4)",
                self.town_building_min_size
            ));
        }
        if self.town_building_min_size > self.town_building_max_size {
            return invalid(format!(
                "town_building_min_size {} exceeds town_building_max_size {}",
                self.town_building_min_size, self.town_building_max_size
            ));
        }
        if self.town_building_max_size + 4 >= self.default_width.min(self.default_height) {
            return invalid(format!(
                "town_building_max_size {} does not fit inside {}x{}",
                self.town_building_max_size, self.default_width, self.default_height
            ));
        }
        if !(1..=5).contains(&self.town_street_width) {
            return invalid(format!(
                "town_street_width {} outside supported range 1..=5",
                self.town_street_width
            ));
        }
        if self.cave_frequency < 2 {
            return invalid(format!(
                "cave_frequency {} must be at least 2",
                self.cave_frequency
            ));
        }
        if self.max_depth < 2 {
            return invalid(format!("max_depth {} must be at least 2", self.max_depth));
        }
        if self.max_repair_attempts == 0 || self.max_generation_retries == 0 {
            return invalid("retry budgets must be positive".to_string());
        }
        Ok(())
    }

    /// Theme selection rule: depth 1 is the town, every `cave_frequency`-th
    /// depth is a cave, everything else is a dungeon.
    pub fn theme_for_depth(&self, depth: u32) -> Theme {
        if depth <= 1 {
            Theme::Town
        } else if depth % self.cave_frequency == 0 {
            Theme::Cave
        } else {
            Theme::Dungeon
        }
    }

    /// Produces the depth-scaled parameter set a theme builder consumes.
    ///
    /// Deeper levels get more and larger rooms and slightly more open
    /// caves; growth is capped so late depths stay within the grid.
    pub fn scaled_for_depth(&self, depth: u32) -> ThemeParams {
        let room_cap = self.max_rooms_base.max(30);
        let size_cap = self.max_room_size.max(20);
        ThemeParams {
            depth,
            width: self.default_width,
            height: self.default_height,
            min_room_size: self.min_room_size,
            max_room_size: (self.max_room_size + depth / 3).min(size_cap),
            target_rooms: (self.max_rooms_base + (depth as f64 * self.rooms_per_level) as u32)
                .min(room_cap),
            room_margin: self.room_margin,
            corridor_style: self.corridor_style,
            corridor_width: self.corridor_width,
            door_chance: self.door_chance,
            cave_fill_probability: (self.cave_fill_probability - 0.01 * depth as f64).max(0.35),
            cave_smoothing_iterations: self.cave_smoothing_iterations,
            cave_neighbor_threshold: self.cave_neighbor_threshold,
            town_building_min_size: self.town_building_min_size,
            town_building_max_size: self.town_building_max_size,
            town_street_width: self.town_street_width,
            resource_chance: self.resource_chance,
        }
    }
}

/// Depth-scaled generation parameters handed to a theme builder.
#[derive(Debug, Clone, PartialEq)]
pub struct ThemeParams {
    pub depth: u32,
    pub width: u32,
    pub height: u32,
    pub min_room_size: u32,
    pub max_room_size: u32,
    pub target_rooms: u32,
    pub room_margin: u32,
    pub corridor_style: CorridorStyle,
    pub corridor_width: u32,
    pub door_chance: f64,
    pub cave_fill_probability: f64,
    pub cave_smoothing_iterations: u32,
    pub cave_neighbor_threshold: u32,
    pub town_building_min_size: u32,
    pub town_building_max_size: u32,
    pub town_street_width: u32,
    pub resource_chance: f64,
}

/// Role of a room within its level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomRole {
    Plain,
    Special,
}

/// An axis-aligned rectangular room.
///
/// The rectangle includes the one-tile wall shell; only the interior is
/// carved to floor.
///
/// # Examples
///
/// ```
/// use delve::{Position, Room, RoomRole};
///
/// let room = Room::new(5, 5, 10, 8, RoomRole::Plain);
/// assert_eq!(room.center(), Position::new(10, 9));
/// assert!(room.contains(Position::new(7, 7)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub role: RoomRole,
}

impl Room {
    /// Creates a new room with the given rectangle and role.
    pub fn new(x: i32, y: i32, width: u32, height: u32, role: RoomRole) -> Self {
        Self {
            x,
            y,
            width,
            height,
            role,
        }
    }

    /// Center point, used for routing and feature placement.
    pub fn center(&self) -> Position {
        Position::new(self.x + self.width as i32 / 2, self.y + self.height as i32 / 2)
    }

    /// Checks if a position lies inside the room rectangle (walls included).
    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= self.x
            && pos.y >= self.y
            && pos.x < self.x + self.width as i32
            && pos.y < self.y + self.height as i32
    }

    /// Checks rectangle overlap with another room.
    pub fn intersects(&self, other: &Room) -> bool {
        self.x < other.x + other.width as i32
            && self.x + self.width as i32 > other.x
            && self.y < other.y + other.height as i32
            && self.y + self.height as i32 > other.y
    }

    /// Checks overlap after inflating this room by `margin` on every side.
    pub fn intersects_with_margin(&self, other: &Room, margin: i32) -> bool {
        let inflated = Room::new(
            self.x - margin,
            self.y - margin,
            (self.width as i32 + 2 * margin) as u32,
            (self.height as i32 + 2 * margin) as u32,
            self.role,
        );
        inflated.intersects(other)
    }

    /// Interior positions (the carved floor area inside the wall shell),
    /// in row-major order.
    pub fn interior_positions(&self) -> Vec<Position> {
        let mut positions = Vec::new();
        for y in (self.y + 1)..(self.y + self.height as i32 - 1) {
            for x in (self.x + 1)..(self.x + self.width as i32 - 1) {
                positions.push(Position::new(x, y));
            }
        }
        positions
    }

    /// Positions on the wall shell of the room.
    pub fn perimeter_positions(&self) -> Vec<Position> {
        let mut positions = Vec::new();
        let right = self.x + self.width as i32 - 1;
        let bottom = self.y + self.height as i32 - 1;
        for x in self.x..=right {
            positions.push(Position::new(x, self.y));
            positions.push(Position::new(x, bottom));
        }
        for y in (self.y + 1)..bottom {
            positions.push(Position::new(self.x, y));
            positions.push(Position::new(right, y));
        }
        positions
    }
}

/// A town building: a walled rectangle with recorded perimeter door slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Building {
    pub bounds: Room,
    /// Perimeter positions that become closed doors; every building keeps
    /// at least one slot adjacent to a street tile.
    pub doors: Vec<Position>,
}

/// What a theme builder hands back besides the populated grid.
#[derive(Debug, Clone, Default)]
pub struct Layout {
    pub rooms: Vec<Room>,
    pub buildings: Vec<Building>,
    pub altar: Option<Position>,
}

/// Strategy interface for the per-theme builders.
///
/// The three builders share no state, only this output contract: populate
/// the grid and report the regions the router and door placer work from.
pub trait ThemeGenerator {
    /// The theme this builder produces.
    fn theme(&self) -> Theme;

    /// Populates `grid` and returns the generated layout.
    fn generate(
        &self,
        grid: &mut TileGrid,
        params: &ThemeParams,
        rng: &mut RandomSource,
    ) -> DelveResult<Layout>;
}

/// Creates the builder for a theme.
pub fn generator_for(theme: Theme) -> Box<dyn ThemeGenerator> {
    match theme {
        Theme::Dungeon => Box::new(DungeonGenerator),
        Theme::Cave => Box::new(CaveGenerator),
        Theme::Town => Box::new(TownGenerator),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(GenerationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_inverted_room_sizes_rejected() {
        let config = GenerationConfig {
            min_room_size: 10,
            max_room_size: 4,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(crate::DelveError::InvalidThemeParameters(_))
        ));
    }

    #[test]
    fn test_non_positive_dimensions_rejected() {
        let config = GenerationConfig {
            default_width: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_probability_rejected() {
        let config = GenerationConfig {
            door_chance: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_theme_for_depth_rules() {
        let config = GenerationConfig::default();
        assert_eq!(config.theme_for_depth(1), Theme::Town);
        assert_eq!(config.theme_for_depth(2), Theme::Dungeon);
        assert_eq!(config.theme_for_depth(5), Theme::Cave);
        assert_eq!(config.theme_for_depth(7), Theme::Dungeon);
        assert_eq!(config.theme_for_depth(10), Theme::Cave);
    }

    #[test]
    fn test_depth_scaling_grows_and_caps() {
        let config = GenerationConfig::default();
        let shallow = config.scaled_for_depth(1);
        let deep = config.scaled_for_depth(25);
        assert!(deep.target_rooms > shallow.target_rooms);
        assert!(deep.max_room_size > shallow.max_room_size);
        assert!(deep.target_rooms <= 30);
        assert!(deep.max_room_size <= 20);
        assert!(deep.cave_fill_probability >= 0.35);
    }

    #[test]
    fn test_room_geometry() {
        let room = Room::new(5, 5, 10, 8, RoomRole::Plain);
        assert_eq!(room.center(), Position::new(10, 9));
        assert!(room.contains(Position::new(5, 5)));
        assert!(room.contains(Position::new(14, 12)));
        assert!(!room.contains(Position::new(15, 12)));

        // 10x8 room: interior is 8x6
        assert_eq!(room.interior_positions().len(), 48);
        // Perimeter: 2*10 + 2*(8-2)
        assert_eq!(room.perimeter_positions().len(), 32);
    }

    #[test]
    fn test_room_overlap_with_margin() {
        let a = Room::new(5, 5, 6, 6, RoomRole::Plain);
        let touching = Room::new(11, 5, 6, 6, RoomRole::Plain);
        let clear = Room::new(13, 5, 6, 6, RoomRole::Plain);

        assert!(!a.intersects(&touching));
        assert!(a.intersects_with_margin(&touching, 1));
        assert!(!a.intersects_with_margin(&clear, 1));
        assert!(a.intersects_with_margin(&clear, 3));
    }

    #[test]
    fn test_generator_factory_matches_theme() {
        use crate::game::Theme;
        for theme in [Theme::Dungeon, Theme::Cave, Theme::Town] {
            assert_eq!(generator_for(theme).theme(), theme);
        }
    }
}
