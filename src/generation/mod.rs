//! # Generation Module
//!
//! Procedural level generation: room layout, corridors and population.
//!
//! Two interchangeable layout strategies produce a [`TileGrid`] with its
//! rooms registered on it. Either way every room is reachable from every
//! other one through walkable tiles, and the outer ring of the map stays wall.
//! Population then fills the rooms with enemies, items and the stairs.

pub mod bsp;
pub mod dungeon;
pub mod encounters;
pub mod loot;

pub use bsp::*;
pub use dungeon::*;
pub use encounters::*;
pub use loot::*;

use crate::config;
use crate::game::{Level, Position, TileGrid};
use crate::{BreakdownError, BreakdownResult};
use log::info;
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Layout algorithm used for a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GenerationStrategy {
    /// Recursive binary space partitioning
    #[default]
    Bsp,
    /// Randomly placed, non-overlapping rectangles chained by corridors
    RandomRooms,
}

impl std::fmt::Display for GenerationStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerationStrategy::Bsp => write!(f, "bsp"),
            GenerationStrategy::RandomRooms => write!(f, "rooms"),
        }
    }
}

/// Configuration for procedural generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Random seed for reproducible generation
    pub seed: u64,
    /// Map width in tiles
    pub width: i32,
    /// Map height in tiles
    pub height: i32,
    /// Layout algorithm
    pub strategy: GenerationStrategy,
    /// Minimum room size, walls included
    pub room_min_size: i32,
    /// Maximum room size for random rooms, walls included
    pub room_max_size: i32,
    /// Candidate rectangles tried by the random-rooms strategy
    pub max_room_attempts: u32,
    /// Fewer rooms than this is a generation failure
    pub min_rooms: usize,
    /// Maximum recursion depth of the partition tree
    pub bsp_depth: u32,
    /// Whether BSP rooms fill their whole partition
    pub bsp_full_rooms: bool,
    /// Upper bound on enemies per room
    pub max_room_enemies: u32,
    /// Upper bound on items per room
    pub max_room_items: u32,
}

impl GenerationConfig {
    /// Creates the default configuration for a full-size level.
    ///
    /// # Examples
    ///
    /// ```
    /// use breakdown::{GenerationConfig, GenerationStrategy};
    ///
    /// let config = GenerationConfig::new(7);
    /// assert_eq!((config.width, config.height), (100, 80));
    /// assert_eq!(config.strategy, GenerationStrategy::Bsp);
    /// assert!(config.validate().is_ok());
    /// ```
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            width: config::MAP_WIDTH,
            height: config::MAP_HEIGHT,
            strategy: GenerationStrategy::Bsp,
            room_min_size: config::ROOM_MIN_SIZE,
            room_max_size: config::ROOM_MAX_SIZE,
            max_room_attempts: config::MAX_ROOM_ATTEMPTS,
            min_rooms: 2,
            bsp_depth: config::BSP_DEPTH,
            bsp_full_rooms: false,
            max_room_enemies: config::MAX_ROOM_ENEMIES,
            max_room_items: config::MAX_ROOM_ITEMS,
        }
    }

    /// Creates a configuration with a smaller map for tests.
    pub fn for_testing(seed: u64) -> Self {
        Self {
            width: 60,
            height: 40,
            bsp_depth: 6,
            ..Self::new(seed)
        }
    }

    pub fn with_strategy(mut self, strategy: GenerationStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Checks that the map can hold at least one room of every size the
    /// configuration may ask for.
    pub fn validate(&self) -> BreakdownResult<()> {
        if self.room_min_size < 3 {
            return Err(BreakdownError::GenerationFailed(format!(
                "room_min_size {} leaves no interior",
                self.room_min_size
            )));
        }
        if self.room_max_size < self.room_min_size {
            return Err(BreakdownError::GenerationFailed(format!(
                "room_max_size {} is below room_min_size {}",
                self.room_max_size, self.room_min_size
            )));
        }
        let needed = self.room_max_size.max(self.room_min_size + 1) + 2;
        if self.width < needed || self.height < needed {
            return Err(BreakdownError::GenerationFailed(format!(
                "{}x{} map is too small for rooms of size {}",
                self.width, self.height, self.room_max_size
            )));
        }
        Ok(())
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::new(42)
    }
}

/// Rectangular room on the map.
///
/// `(x1, y1)` and `(x2, y2)` are the corners of the outer rectangle. The
/// outer ring is wall; the floor is the interior `x1 + 1 ..= x2 - 1` by
/// `y1 + 1 ..= y2 - 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: usize,
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl Room {
    /// Creates a room from its top-left corner and extent.
    ///
    /// # Examples
    ///
    /// ```
    /// use breakdown::{Position, Room};
    ///
    /// let room = Room::new(0, 5, 5, 10, 8);
    /// assert_eq!((room.x2, room.y2), (15, 13));
    /// assert_eq!(room.center(), Position::new(10, 9));
    /// assert!(room.contains_floor(Position::new(6, 6)));
    /// assert!(!room.contains_floor(Position::new(5, 6)));
    /// ```
    pub fn new(id: usize, x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            id,
            x1: x,
            y1: y,
            x2: x + width,
            y2: y + height,
        }
    }

    pub fn from_corners(id: usize, x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { id, x1, y1, x2, y2 }
    }

    pub fn width(&self) -> i32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> i32 {
        self.y2 - self.y1
    }

    pub fn center(&self) -> Position {
        Position::new((self.x1 + self.x2) / 2, (self.y1 + self.y2) / 2)
    }

    /// Whether the outer rectangles touch or overlap.
    pub fn intersects(&self, other: &Room) -> bool {
        self.x1 <= other.x2 && self.x2 >= other.x1 && self.y1 <= other.y2 && self.y2 >= other.y1
    }

    pub fn contains_floor(&self, pos: Position) -> bool {
        pos.x > self.x1 && pos.x < self.x2 && pos.y > self.y1 && pos.y < self.y2
    }

    /// Interior positions, row by row.
    pub fn floor_positions(&self) -> Vec<Position> {
        let mut positions = Vec::new();
        for y in (self.y1 + 1)..self.y2 {
            for x in (self.x1 + 1)..self.x2 {
                positions.push(Position::new(x, y));
            }
        }
        positions
    }

    /// A uniformly random interior position.
    pub fn random_floor_position(&self, rng: &mut StdRng) -> Position {
        Position::new(
            rng.gen_range(self.x1 + 1..=self.x2 - 1),
            rng.gen_range(self.y1 + 1..=self.y2 - 1),
        )
    }
}

/// Trait for layout generators.
pub trait Generator<T> {
    /// Generates content using the provided configuration and random number generator.
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> BreakdownResult<T>;

    /// Validates that the generated content meets requirements.
    fn validate(&self, content: &T, config: &GenerationConfig) -> BreakdownResult<()>;

    /// Gets the generator type name for logging and debugging.
    fn generator_type(&self) -> &'static str;
}

/// Trait for systems that fill an already laid out level.
pub trait Populator {
    /// Places content on `level` and returns how many things were placed.
    fn populate(&self, level: &mut Level, config: &GenerationConfig, rng: &mut StdRng) -> usize;

    fn populator_type(&self) -> &'static str;
}

/// Lays out a grid with the configured strategy and picks its starting room.
pub fn generate_grid(config: &GenerationConfig, rng: &mut StdRng) -> BreakdownResult<TileGrid> {
    config.validate()?;
    let mut grid = match config.strategy {
        GenerationStrategy::Bsp => {
            let generator = BspGenerator::new();
            let grid = generator.generate(config, rng)?;
            generator.validate(&grid, config)?;
            grid
        }
        GenerationStrategy::RandomRooms => {
            let generator = RoomCorridorGenerator::new();
            let grid = generator.generate(config, rng)?;
            generator.validate(&grid, config)?;
            grid
        }
    };

    let start = utils::choose_starting_room(&grid, rng)?;
    grid.set_starting_room(start);
    utils::validate_connectivity(&grid)?;
    Ok(grid)
}

/// Generates and populates a complete level.
///
/// Stairs go to the center of the last generated room. Enemies avoid the
/// starting room; items do not.
pub fn generate_level(
    config: &GenerationConfig,
    depth: u32,
    rng: &mut StdRng,
) -> BreakdownResult<Level> {
    let grid = generate_grid(config, rng)?;
    let stairs = grid
        .rooms()
        .last()
        .map(Room::center)
        .ok_or_else(|| BreakdownError::GenerationFailed("level has no rooms".to_string()))?;

    let room_count = grid.rooms().len();
    let mut level = Level::new(depth, grid, stairs);
    let enemies = EncounterGenerator::new().populate(&mut level, config, rng);
    let items = LootGenerator::new().populate(&mut level, config, rng);

    info!(
        "Generated level {} ({}): {} rooms, {} enemies, {} items, stairs at {}",
        depth, config.strategy, room_count, enemies, items, stairs
    );
    Ok(level)
}

/// Utility functions for generation algorithms.
pub mod utils {
    use super::*;
    use crate::game::TerrainKind;
    use rand::SeedableRng;
    use std::collections::{HashSet, VecDeque};

    /// Creates a seeded random number generator from the config.
    pub fn create_rng(config: &GenerationConfig) -> StdRng {
        StdRng::seed_from_u64(config.seed)
    }

    /// Picks the starting room uniformly among the generated rooms.
    pub fn choose_starting_room(grid: &TileGrid, rng: &mut StdRng) -> BreakdownResult<usize> {
        if grid.rooms().is_empty() {
            return Err(BreakdownError::GenerationFailed(
                "no room to start in".to_string(),
            ));
        }
        Ok(rng.gen_range(0..grid.rooms().len()))
    }

    /// Floods walkable tiles from `start` through cardinal neighbours.
    pub fn reachable_from(grid: &TileGrid, start: Position) -> HashSet<Position> {
        let mut visited = HashSet::new();
        if !grid.in_bounds(start) || !grid.is_walkable(start) {
            return visited;
        }

        let mut queue = VecDeque::new();
        visited.insert(start);
        queue.push_back(start);

        while let Some(pos) = queue.pop_front() {
            for next in pos.cardinal_adjacent_positions() {
                if grid.in_bounds(next) && grid.is_walkable(next) && visited.insert(next) {
                    queue.push_back(next);
                }
            }
        }

        visited
    }

    /// Checks that every room's floor is reachable from the starting room
    /// (or the first room when none has been chosen yet).
    pub fn validate_connectivity(grid: &TileGrid) -> BreakdownResult<()> {
        let origin = grid
            .starting_room()
            .or_else(|| grid.rooms().first())
            .ok_or_else(|| BreakdownError::GenerationFailed("no rooms generated".to_string()))?;

        let reachable = reachable_from(grid, origin.center());
        for room in grid.rooms() {
            if let Some(pos) = room.floor_positions().into_iter().find(|p| !reachable.contains(p)) {
                return Err(BreakdownError::GenerationFailed(format!(
                    "room {} is not connected (unreachable tile {})",
                    room.id, pos
                )));
            }
        }
        Ok(())
    }

    /// Basic sanity checks on a freshly laid out grid.
    pub fn validate_grid(grid: &TileGrid, config: &GenerationConfig) -> BreakdownResult<()> {
        if grid.rooms().len() < config.min_rooms {
            return Err(BreakdownError::GenerationFailed(format!(
                "placed {} rooms, need at least {}",
                grid.rooms().len(),
                config.min_rooms
            )));
        }
        if grid.count_terrain(TerrainKind::Floor) == 0 {
            return Err(BreakdownError::GenerationFailed(
                "level has no floor tiles".to_string(),
            ));
        }

        let (w, h) = (grid.width(), grid.height());
        let border_breached = (0..w)
            .flat_map(|x| [Position::new(x, 0), Position::new(x, h - 1)])
            .chain((0..h).flat_map(|y| [Position::new(0, y), Position::new(w - 1, y)]))
            .any(|pos| grid.is_walkable(pos));
        if border_breached {
            return Err(BreakdownError::GenerationFailed(
                "map border is not intact".to_string(),
            ));
        }

        Ok(())
    }
}
