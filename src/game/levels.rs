//! # Level Management
//!
//! Orchestrates generation per depth and owns the session level cache.
//!
//! For each depth the manager picks a theme, scales the configured
//! parameters, and drives the generate → route → validate/repair →
//! place-doors pipeline, retrying under perturbed sub-seeds when a theme
//! builder or the repair pass gives up. A level that comes out of the
//! pipeline is cached for the rest of the session; visited levels are
//! retained indefinitely.

use crate::game::{
    Level, ResourceDeposit, ResourceKind, StairDirection, Theme, TileGrid, TileType,
};
use crate::generation::connectivity::component_representative;
use crate::generation::{
    generator_for, ConnectivityValidator, CorridorRouter, DoorPlacer, GenerationConfig, Layout,
    RandomSource, Room, ThemeParams,
};
use crate::{DelveError, DelveResult, Position};
use std::collections::{HashMap, HashSet};

/// Manages level generation and caching for one game session.
///
/// The cache is an explicitly owned mapping so multiple sessions (for
/// example in tests) stay independent.
///
/// # Examples
///
/// ```
/// use delve::{GenerationConfig, LevelManager};
///
/// let mut manager = LevelManager::new(GenerationConfig::default(), 42).unwrap();
/// let level = manager.get_or_generate(1).unwrap();
/// assert_eq!(level.depth(), 1);
/// ```
#[derive(Debug)]
pub struct LevelManager {
    config: GenerationConfig,
    session_seed: u64,
    current_depth: u32,
    levels: HashMap<u32, Level>,
    failed_depths: HashSet<u32>,
}

impl LevelManager {
    /// Creates a manager for a session. The configuration is checked here,
    /// before any generation work.
    pub fn new(config: GenerationConfig, session_seed: u64) -> DelveResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            session_seed,
            current_depth: 1,
            levels: HashMap::new(),
            failed_depths: HashSet::new(),
        })
    }

    /// The depth the session currently occupies.
    pub fn current_depth(&self) -> u32 {
        self.current_depth
    }

    /// The level cached for a depth, if it has been visited.
    pub fn level(&self, depth: u32) -> Option<&Level> {
        self.levels.get(&depth)
    }

    /// Returns the level for a depth, generating and caching it on first
    /// visit. A depth whose retries were exhausted stays failed for the
    /// session.
    pub fn get_or_generate(&mut self, depth: u32) -> DelveResult<&Level> {
        if depth < 1 || depth > self.config.max_depth {
            return Err(DelveError::InvalidThemeParameters(format!(
                "depth {} outside 1..={}",
                depth, self.config.max_depth
            )));
        }
        if self.failed_depths.contains(&depth) {
            return Err(DelveError::GenerationFailed(format!(
                "depth {depth} already failed this session"
            )));
        }
        if self.levels.contains_key(&depth) {
            return Ok(&self.levels[&depth]);
        }

        match self.generate_level(depth) {
            Ok(level) => {
                self.levels.insert(depth, level);
                Ok(&self.levels[&depth])
            }
            Err(err) => {
                self.failed_depths.insert(depth);
                Err(err)
            }
        }
    }

    /// Moves the session to a depth and resolves where to arrive: the tile
    /// adjacent to the matching stairs in the target level.
    ///
    /// Arriving via down stairs lands beside the target's up stairs and
    /// vice versa; if the stairs have no open neighbour the stairs tile
    /// itself is used, and a level without matching stairs falls back to
    /// its spawn.
    pub fn transition_to(&mut self, depth: u32, via: StairDirection) -> DelveResult<Position> {
        let level = self.get_or_generate(depth)?;
        let stairs = match via {
            StairDirection::Down => level.stairs_up(),
            StairDirection::Up => level.stairs_down(),
        };
        let arrival = stairs
            .and_then(|s| {
                s.cardinal_adjacent_positions()
                    .into_iter()
                    .find(|&n| !level.tile_at(n.x, n.y).blocks_movement())
            })
            .or(stairs)
            .unwrap_or_else(|| level.spawn());

        self.current_depth = depth;
        Ok(arrival)
    }

    /// Runs the full pipeline for a depth, retrying under perturbed
    /// sub-seeds until it succeeds or the retry budget runs out.
    fn generate_level(&self, depth: u32) -> DelveResult<Level> {
        let mut last_error: Option<DelveError> = None;

        for attempt in 0..self.config.max_generation_retries {
            let mut rng = RandomSource::for_depth(self.session_seed, depth, attempt);
            match self.build_level(depth, &mut rng) {
                Ok(level) => {
                    log::info!(
                        "generated depth {} ({:?}) on attempt {}",
                        depth,
                        level.theme(),
                        attempt + 1
                    );
                    return Ok(level);
                }
                Err(err @ (DelveError::AttemptsExhausted(_) | DelveError::RepairFailed { .. })) => {
                    log::warn!("depth {depth} attempt {}: {err}", attempt + 1);
                    last_error = Some(err);
                }
                Err(fatal) => return Err(fatal),
            }
        }

        Err(DelveError::GenerationFailed(format!(
            "depth {depth}: {} attempts exhausted (last error: {})",
            self.config.max_generation_retries,
            last_error.map_or_else(|| "none".to_string(), |e| e.to_string())
        )))
    }

    /// One generation attempt: theme build, routing, validation and
    /// repair, doors, stairs, resources, final certification.
    fn build_level(&self, depth: u32, rng: &mut RandomSource) -> DelveResult<Level> {
        let theme = self.config.theme_for_depth(depth);
        let params = self.config.scaled_for_depth(depth);
        let router = CorridorRouter::new(params.corridor_style, params.corridor_width);
        let validator = ConnectivityValidator::new(self.config.max_repair_attempts);

        let mut grid = TileGrid::new(params.width, params.height, TileType::Wall);
        let layout = generator_for(theme).generate(&mut grid, &params, rng)?;

        // Route regions together; the town's street grid already is the
        // routing, stragglers there are the validator's business.
        match theme {
            Theme::Dungeon => {
                let centers: Vec<Position> = layout.rooms.iter().map(Room::center).collect();
                router.connect(&mut grid, &centers, rng);
            }
            Theme::Cave => {
                let centers: Vec<Position> = ConnectivityValidator::components(&grid)
                    .iter()
                    .map(|c| component_representative(c))
                    .collect();
                router.connect(&mut grid, &centers, rng);
            }
            Theme::Town => {}
        }

        let spawn = choose_spawn(&grid, theme, &layout)?;
        validator.validate_and_repair(&mut grid, spawn, &router)?;

        match theme {
            Theme::Dungeon => {
                DoorPlacer::place_dungeon_doors(&mut grid, &layout.rooms, params.door_chance, rng)
            }
            Theme::Town => DoorPlacer::place_town_doors(&mut grid, &layout.buildings),
            Theme::Cave => {}
        }

        let (stairs_up, stairs_down) =
            place_stairs(&mut grid, theme, &layout, depth, self.config.max_depth, spawn, rng)?;
        let resources = place_resources(&mut grid, &params, spawn, rng);

        // Doors, stairs, and deposits are all walkable, so this holds; a
        // level that fails it is abandoned rather than returned.
        validator.validate_and_repair(&mut grid, spawn, &router)?;

        Ok(Level::new(
            depth,
            theme,
            grid,
            layout.rooms,
            layout.buildings,
            stairs_up,
            stairs_down,
            spawn,
            resources,
        ))
    }
}

/// Picks the spawn tile for a freshly generated grid.
fn choose_spawn(grid: &TileGrid, theme: Theme, layout: &Layout) -> DelveResult<Position> {
    let spawn = match theme {
        Theme::Dungeon => layout.rooms.first().map(Room::center),
        Theme::Town => layout.altar.and_then(|altar| {
            altar
                .cardinal_adjacent_positions()
                .into_iter()
                .find(|&n| grid.get(n) == TileType::Floor)
        }),
        Theme::Cave => {
            let center = Position::new(grid.width() as i32 / 2, grid.height() as i32 / 2);
            grid.positions()
                .filter(|&p| grid.get(p) == TileType::Floor)
                .min_by_key(|p| p.manhattan_distance(center))
        }
    };
    spawn
        .filter(|&p| grid.get(p).is_walkable())
        .ok_or_else(|| DelveError::AttemptsExhausted("no walkable spawn tile".to_string()))
}

/// Places stairs on validated floor: up stairs on every non-first level,
/// down stairs on every non-terminal level.
fn place_stairs(
    grid: &mut TileGrid,
    theme: Theme,
    layout: &Layout,
    depth: u32,
    max_depth: u32,
    spawn: Position,
    rng: &mut RandomSource,
) -> DelveResult<(Option<Position>, Option<Position>)> {
    let (up_candidate, down_candidate) = match theme {
        Theme::Dungeon => {
            let first = layout.rooms.first();
            let last = layout.rooms.last();
            (
                first.and_then(|r| floor_tile_in_room(grid, r, spawn)),
                last.and_then(|r| floor_tile_in_room(grid, r, spawn)),
            )
        }
        Theme::Town => {
            let first = layout.buildings.first();
            let last = layout.buildings.last();
            (
                first.and_then(|b| floor_tile_in_room(grid, &b.bounds, spawn)),
                last.and_then(|b| floor_tile_in_room(grid, &b.bounds, spawn)),
            )
        }
        Theme::Cave => {
            let floors: Vec<Position> = grid
                .positions()
                .filter(|&p| grid.get(p) == TileType::Floor && p != spawn)
                .collect();
            let up = rng.choose(&floors).copied();
            let down = up.and_then(|u| {
                floors
                    .iter()
                    .copied()
                    .filter(|&p| p != u)
                    .max_by_key(|p| p.manhattan_distance(u))
            });
            (up, down)
        }
    };

    let mut stairs_up = None;
    if depth > 1 {
        let pos = up_candidate.ok_or_else(|| {
            DelveError::AttemptsExhausted("no floor tile for up stairs".to_string())
        })?;
        grid.set(pos, TileType::StairsUp);
        stairs_up = Some(pos);
    }

    let mut stairs_down = None;
    if depth < max_depth {
        let pos = down_candidate
            .filter(|&p| grid.get(p) == TileType::Floor)
            .ok_or_else(|| {
                DelveError::AttemptsExhausted("no floor tile for down stairs".to_string())
            })?;
        grid.set(pos, TileType::StairsDown);
        stairs_down = Some(pos);
    }

    Ok((stairs_up, stairs_down))
}

/// A floor tile inside a room, preferring its center, never the spawn.
fn floor_tile_in_room(grid: &TileGrid, room: &Room, spawn: Position) -> Option<Position> {
    let center = room.center();
    if center != spawn && grid.get(center) == TileType::Floor {
        return Some(center);
    }
    room.interior_positions()
        .into_iter()
        .find(|&p| p != spawn && grid.get(p) == TileType::Floor)
}

/// Scatters resource deposits over plain floor tiles with a depth-scaled
/// kind distribution.
fn place_resources(
    grid: &mut TileGrid,
    params: &ThemeParams,
    spawn: Position,
    rng: &mut RandomSource,
) -> Vec<ResourceDeposit> {
    let weights: Vec<(ResourceKind, f64)> = ResourceKind::ALL
        .iter()
        .map(|&kind| (kind, kind.spawn_weight(params.depth)))
        .collect();

    let candidates: Vec<Position> = grid
        .positions()
        .filter(|&p| p != spawn && grid.get(p) == TileType::Floor)
        .collect();

    let mut deposits = Vec::new();
    for pos in candidates {
        if !rng.chance(params.resource_chance) {
            continue;
        }
        if let Some(&kind) = rng.weighted(&weights) {
            grid.set(pos, TileType::Resource(kind));
            deposits.push(ResourceDeposit { position: pos, kind });
        }
    }
    deposits
}
