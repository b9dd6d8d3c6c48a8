//! # World Representation
//!
//! Tile types, the fixed-size tile grid, and the generated `Level`.
//!
//! A `Level` is the unit this crate hands to the game loop: a validated,
//! fully-connected grid plus the structural metadata (rooms, buildings,
//! stairs, spawn, resource deposits) gameplay needs. After generation
//! commits a level, the wall/floor layout never changes; only door state
//! and resource presence mutate, through the hooks on `Level`.

use crate::generation::{Building, Room};
use crate::{DelveResult, Position};
use serde::{Deserialize, Serialize};

/// Kinds of harvestable resource deposits that can appear on floor tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    Wood,
    Stone,
    Ore,
    Crystal,
    Essence,
}

impl ResourceKind {
    /// All resource kinds, in spawn-table order.
    pub const ALL: [ResourceKind; 5] = [
        ResourceKind::Wood,
        ResourceKind::Stone,
        ResourceKind::Ore,
        ResourceKind::Crystal,
        ResourceKind::Essence,
    ];

    /// Spawn weight for this kind at the given depth. Common surface
    /// materials thin out with depth while ores and magical materials
    /// become more likely.
    pub fn spawn_weight(self, depth: u32) -> f64 {
        let d = depth as f64;
        match self {
            ResourceKind::Wood => (10.0 - d * 0.5).max(1.0),
            ResourceKind::Stone => 8.0,
            ResourceKind::Ore => 4.0 + d * 0.3,
            ResourceKind::Crystal => 1.0 + d * 0.2,
            ResourceKind::Essence => (d - 5.0).max(0.0) * 0.2,
        }
    }

    /// ASCII glyph used by map previews.
    pub fn glyph(self) -> char {
        match self {
            ResourceKind::Wood => 't',
            ResourceKind::Stone => 's',
            ResourceKind::Ore => 'o',
            ResourceKind::Crystal => '^',
            ResourceKind::Essence => '&',
        }
    }
}

/// The type of a single map tile.
///
/// Doors carry their open/closed state in the tile itself so that a level
/// snapshot captures everything gameplay can mutate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileType {
    Wall,
    Floor,
    DoorClosed,
    DoorOpen,
    StairsUp,
    StairsDown,
    Altar,
    Resource(ResourceKind),
}

impl TileType {
    /// Whether this tile belongs to the walkable set used for connectivity.
    ///
    /// Closed doors count as walkable: they can always be opened, so they
    /// never disconnect a region.
    pub fn is_walkable(self) -> bool {
        !matches!(self, TileType::Wall)
    }

    /// Whether this tile currently blocks movement. Closed doors block
    /// until the gameplay collaborator opens them.
    pub fn blocks_movement(self) -> bool {
        matches!(self, TileType::Wall | TileType::DoorClosed)
    }

    /// ASCII glyph used by map previews.
    pub fn glyph(self) -> char {
        match self {
            TileType::Wall => '#',
            TileType::Floor => '.',
            TileType::DoorClosed => '+',
            TileType::DoorOpen => '/',
            TileType::StairsUp => '<',
            TileType::StairsDown => '>',
            TileType::Altar => '*',
            TileType::Resource(kind) => kind.glyph(),
        }
    }
}

/// Fixed-size 2D tile storage.
///
/// Dimensions are fixed at creation; there is no resizing. Out-of-bounds
/// reads return `Wall` and out-of-bounds writes are ignored, which keeps
/// carving code free of per-tile bounds plumbing.
///
/// # Examples
///
/// ```
/// use delve::{Position, TileGrid, TileType};
///
/// let mut grid = TileGrid::new(10, 8, TileType::Wall);
/// grid.set(Position::new(3, 3), TileType::Floor);
/// assert_eq!(grid.get(Position::new(3, 3)), TileType::Floor);
/// assert_eq!(grid.get(Position::new(-1, 0)), TileType::Wall);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileGrid {
    width: u32,
    height: u32,
    tiles: Vec<TileType>,
}

impl TileGrid {
    /// Creates a grid of the given dimensions filled with `fill`.
    pub fn new(width: u32, height: u32, fill: TileType) -> Self {
        Self {
            width,
            height,
            tiles: vec![fill; (width * height) as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Checks whether a position lies within the grid.
    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as u32) < self.width && (pos.y as u32) < self.height
    }

    /// Gets the tile at `pos`; out of bounds reads as `Wall`.
    pub fn get(&self, pos: Position) -> TileType {
        if self.in_bounds(pos) {
            self.tiles[(pos.y as u32 * self.width + pos.x as u32) as usize]
        } else {
            TileType::Wall
        }
    }

    /// Sets the tile at `pos`; out-of-bounds writes are ignored.
    pub fn set(&mut self, pos: Position, tile: TileType) {
        if self.in_bounds(pos) {
            self.tiles[(pos.y as u32 * self.width + pos.x as u32) as usize] = tile;
        }
    }

    /// Overwrites every tile with `fill`.
    pub fn fill(&mut self, fill: TileType) {
        self.tiles.iter_mut().for_each(|t| *t = fill);
    }

    /// Iterates all grid positions in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        let width = self.width;
        (0..self.height)
            .flat_map(move |y| (0..width).map(move |x| Position::new(x as i32, y as i32)))
    }

    /// All walkable positions in row-major order.
    pub fn walkable_positions(&self) -> Vec<Position> {
        self.positions().filter(|&p| self.get(p).is_walkable()).collect()
    }

    /// Fraction of the grid occupied by wall tiles.
    pub fn wall_ratio(&self) -> f64 {
        let walls = self.tiles.iter().filter(|&&t| t == TileType::Wall).count();
        walls as f64 / self.tiles.len() as f64
    }

    /// Counts tiles matching the predicate.
    pub fn count_tiles(&self, pred: impl Fn(TileType) -> bool) -> usize {
        self.tiles.iter().filter(|&&t| pred(t)).count()
    }
}

/// Generation strategy used for a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Theme {
    Town,
    Cave,
    Dungeon,
}

/// A resource deposit sitting on a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDeposit {
    pub position: Position,
    pub kind: ResourceKind,
}

/// A fully generated, validated level.
///
/// Construction goes through the level manager's generation pipeline; once
/// built, the structural layout is immutable. Gameplay mutates door state
/// and resource presence only, through [`Level::open_door`],
/// [`Level::close_door`], and [`Level::remove_resource`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    depth: u32,
    theme: Theme,
    grid: TileGrid,
    rooms: Vec<Room>,
    buildings: Vec<Building>,
    stairs_up: Option<Position>,
    stairs_down: Option<Position>,
    spawn: Position,
    resources: Vec<ResourceDeposit>,
}

impl Level {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        depth: u32,
        theme: Theme,
        grid: TileGrid,
        rooms: Vec<Room>,
        buildings: Vec<Building>,
        stairs_up: Option<Position>,
        stairs_down: Option<Position>,
        spawn: Position,
        resources: Vec<ResourceDeposit>,
    ) -> Self {
        Self {
            depth,
            theme,
            grid,
            rooms,
            buildings,
            stairs_up,
            stairs_down,
            spawn,
            resources,
        }
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Read access to the full tile grid, e.g. for rendering or persistence.
    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    /// Rooms placed by the dungeon theme; empty for other themes.
    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    /// Buildings placed by the town theme; empty for other themes.
    pub fn buildings(&self) -> &[Building] {
        &self.buildings
    }

    pub fn stairs_up(&self) -> Option<Position> {
        self.stairs_up
    }

    pub fn stairs_down(&self) -> Option<Position> {
        self.stairs_down
    }

    /// The tile a session begins on when first entering this level.
    pub fn spawn(&self) -> Position {
        self.spawn
    }

    /// Resource deposits still present on the level.
    pub fn resources(&self) -> &[ResourceDeposit] {
        &self.resources
    }

    /// Tile type at the given coordinates; out of bounds reads as `Wall`.
    pub fn tile_at(&self, x: i32, y: i32) -> TileType {
        self.grid.get(Position::new(x, y))
    }

    /// Whether movement onto `(x, y)` is currently blocked.
    pub fn is_blocked(&self, x: i32, y: i32) -> bool {
        self.tile_at(x, y).blocks_movement()
    }

    /// Opens a closed door. Returns false if the tile is not a closed door.
    pub fn open_door(&mut self, pos: Position) -> bool {
        if self.grid.get(pos) == TileType::DoorClosed {
            self.grid.set(pos, TileType::DoorOpen);
            true
        } else {
            false
        }
    }

    /// Closes an open door. Returns false if the tile is not an open door.
    pub fn close_door(&mut self, pos: Position) -> bool {
        if self.grid.get(pos) == TileType::DoorOpen {
            self.grid.set(pos, TileType::DoorClosed);
            true
        } else {
            false
        }
    }

    /// Removes a harvested resource deposit, reverting the tile to floor.
    /// Returns the kind that was removed, if any.
    pub fn remove_resource(&mut self, pos: Position) -> Option<ResourceKind> {
        match self.grid.get(pos) {
            TileType::Resource(kind) => {
                self.grid.set(pos, TileType::Floor);
                self.resources.retain(|d| d.position != pos);
                Some(kind)
            }
            _ => None,
        }
    }

    /// Serializes the full level state (layout plus mutable door/resource
    /// state) for a persistence collaborator.
    pub fn to_json(&self) -> DelveResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Restores a level from a snapshot produced by [`Level::to_json`].
    pub fn from_json(json: &str) -> DelveResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_level() -> Level {
        let mut grid = TileGrid::new(8, 6, TileType::Wall);
        for y in 1..5 {
            for x in 1..7 {
                grid.set(Position::new(x, y), TileType::Floor);
            }
        }
        grid.set(Position::new(3, 1), TileType::DoorClosed);
        grid.set(Position::new(4, 2), TileType::Resource(ResourceKind::Ore));
        Level::new(
            2,
            Theme::Dungeon,
            grid,
            Vec::new(),
            Vec::new(),
            Some(Position::new(1, 1)),
            Some(Position::new(6, 4)),
            Position::new(2, 2),
            vec![ResourceDeposit {
                position: Position::new(4, 2),
                kind: ResourceKind::Ore,
            }],
        )
    }

    #[test]
    fn test_grid_bounds() {
        let grid = TileGrid::new(10, 8, TileType::Wall);
        assert!(grid.in_bounds(Position::new(0, 0)));
        assert!(grid.in_bounds(Position::new(9, 7)));
        assert!(!grid.in_bounds(Position::new(10, 7)));
        assert!(!grid.in_bounds(Position::new(-1, 3)));
        assert_eq!(grid.get(Position::new(50, 50)), TileType::Wall);
    }

    #[test]
    fn test_grid_set_ignores_out_of_bounds() {
        let mut grid = TileGrid::new(4, 4, TileType::Wall);
        grid.set(Position::new(-1, 2), TileType::Floor);
        grid.set(Position::new(4, 2), TileType::Floor);
        assert_eq!(grid.count_tiles(|t| t == TileType::Floor), 0);
    }

    #[test]
    fn test_wall_ratio() {
        let mut grid = TileGrid::new(4, 4, TileType::Wall);
        for x in 0..4 {
            grid.set(Position::new(x, 0), TileType::Floor);
        }
        assert!((grid.wall_ratio() - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn test_walkability_predicates() {
        assert!(!TileType::Wall.is_walkable());
        assert!(TileType::Floor.is_walkable());
        assert!(TileType::DoorClosed.is_walkable());
        assert!(TileType::StairsDown.is_walkable());
        assert!(TileType::Resource(ResourceKind::Wood).is_walkable());

        assert!(TileType::Wall.blocks_movement());
        assert!(TileType::DoorClosed.blocks_movement());
        assert!(!TileType::DoorOpen.blocks_movement());
        assert!(!TileType::Altar.blocks_movement());
    }

    #[test]
    fn test_door_toggling() {
        let mut level = small_level();
        let door = Position::new(3, 1);

        assert!(level.is_blocked(3, 1));
        assert!(level.open_door(door));
        assert!(!level.is_blocked(3, 1));
        assert!(!level.open_door(door)); // Already open
        assert!(level.close_door(door));
        assert_eq!(level.tile_at(3, 1), TileType::DoorClosed);

        // Not a door at all
        assert!(!level.open_door(Position::new(2, 2)));
    }

    #[test]
    fn test_resource_removal() {
        let mut level = small_level();
        let pos = Position::new(4, 2);

        assert_eq!(level.resources().len(), 1);
        assert_eq!(level.remove_resource(pos), Some(ResourceKind::Ore));
        assert_eq!(level.tile_at(4, 2), TileType::Floor);
        assert!(level.resources().is_empty());
        assert_eq!(level.remove_resource(pos), None);
    }

    #[test]
    fn test_level_snapshot_roundtrip() {
        let level = small_level();
        let json = level.to_json().unwrap();
        let restored = Level::from_json(&json).unwrap();
        assert_eq!(level, restored);
    }
}
