//! # Dungeon Generation
//!
//! Random-rooms layout: rectangles dropped at random, kept when they do not
//! touch an earlier room, and chained to their predecessor with an L-shaped
//! corridor.

use crate::game::{Position, TileGrid};
use crate::generation::{utils, GenerationConfig, Generator, Room};
use crate::{BreakdownError, BreakdownResult};
use log::{debug, warn};
use rand::{rngs::StdRng, Rng};

/// Order in which the two legs of an L corridor are carved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorridorOrder {
    HorizontalFirst,
    VerticalFirst,
}

/// Room-and-corridor generator.
///
/// Every accepted room is connected to the previously accepted one, so the
/// rooms form a chain in acceptance order.
#[derive(Debug, Clone, Default)]
pub struct RoomCorridorGenerator;

impl RoomCorridorGenerator {
    /// Creates a new room-and-corridor generator.
    ///
    /// # Examples
    ///
    /// ```
    /// use breakdown::{generation::utils, GenerationConfig, Generator, RoomCorridorGenerator};
    ///
    /// let config = GenerationConfig::for_testing(5);
    /// let mut rng = utils::create_rng(&config);
    /// let grid = RoomCorridorGenerator::new().generate(&config, &mut rng).unwrap();
    /// assert!(grid.rooms().len() >= config.min_rooms);
    /// ```
    pub fn new() -> Self {
        Self
    }

    /// Samples a candidate room that fits inside the map border.
    fn room_candidate(&self, id: usize, config: &GenerationConfig, rng: &mut StdRng) -> Room {
        let w = rng.gen_range(config.room_min_size..=config.room_max_size);
        let h = rng.gen_range(config.room_min_size..=config.room_max_size);
        let x = rng.gen_range(0..=config.width - w - 1);
        let y = rng.gen_range(0..=config.height - h - 1);
        Room::new(id, x, y, w, h)
    }

    /// Carves an L-shaped corridor between two points.
    pub fn carve_l_corridor(
        &self,
        grid: &mut TileGrid,
        start: Position,
        end: Position,
        order: CorridorOrder,
    ) {
        match order {
            CorridorOrder::HorizontalFirst => {
                grid.carve_horizontal(start.x, end.x, start.y);
                grid.carve_vertical(start.y, end.y, end.x);
            }
            CorridorOrder::VerticalFirst => {
                grid.carve_vertical(start.y, end.y, start.x);
                grid.carve_horizontal(start.x, end.x, end.y);
            }
        }
    }
}

impl Generator<TileGrid> for RoomCorridorGenerator {
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> BreakdownResult<TileGrid> {
        config.validate()?;
        let mut grid = TileGrid::new(config.width, config.height);
        let mut rooms: Vec<Room> = Vec::new();
        let mut rejected = 0;

        for _ in 0..config.max_room_attempts {
            let candidate = self.room_candidate(rooms.len(), config, rng);
            if rooms.iter().any(|other| candidate.intersects(other)) {
                rejected += 1;
                continue;
            }

            grid.carve_room(&candidate);
            if let Some(previous) = rooms.last() {
                let order = if rng.gen_bool(0.5) {
                    CorridorOrder::HorizontalFirst
                } else {
                    CorridorOrder::VerticalFirst
                };
                self.carve_l_corridor(&mut grid, previous.center(), candidate.center(), order);
            }
            rooms.push(candidate);
        }

        if rejected > 0 {
            warn!(
                "{}: rejected {} of {} overlapping room candidates",
                self.generator_type(),
                rejected,
                config.max_room_attempts
            );
        }
        if rooms.len() < config.min_rooms {
            return Err(BreakdownError::GenerationFailed(format!(
                "placed {} rooms, need at least {}",
                rooms.len(),
                config.min_rooms
            )));
        }

        debug!("{}: placed {} rooms", self.generator_type(), rooms.len());
        for room in rooms {
            grid.add_room(room);
        }
        Ok(grid)
    }

    fn validate(&self, grid: &TileGrid, config: &GenerationConfig) -> BreakdownResult<()> {
        utils::validate_grid(grid, config)?;
        let rooms = grid.rooms();
        for (i, a) in rooms.iter().enumerate() {
            if let Some(b) = rooms[i + 1..].iter().find(|b| a.intersects(b)) {
                return Err(BreakdownError::GenerationFailed(format!(
                    "rooms {} and {} overlap",
                    a.id, b.id
                )));
            }
        }
        utils::validate_connectivity(grid)
    }

    fn generator_type(&self) -> &'static str {
        "RoomCorridorGenerator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::TerrainKind;

    #[test]
    fn test_generation_with_small_level() {
        let generator = RoomCorridorGenerator::new();
        let config = GenerationConfig::for_testing(12345);
        let mut rng = utils::create_rng(&config);

        let grid = generator.generate(&config, &mut rng).unwrap();
        assert_eq!(grid.width(), config.width);
        assert_eq!(grid.height(), config.height);
        assert!(grid.count_terrain(TerrainKind::Floor) > 0);
        assert!(generator.validate(&grid, &config).is_ok());
    }

    #[test]
    fn test_rooms_are_chained_in_acceptance_order() {
        let generator = RoomCorridorGenerator::new();
        let config = GenerationConfig::for_testing(8);
        let mut rng = utils::create_rng(&config);
        let grid = generator.generate(&config, &mut rng).unwrap();

        for pair in grid.rooms().windows(2) {
            let reachable = utils::reachable_from(&grid, pair[0].center());
            assert!(reachable.contains(&pair[1].center()));
        }
    }

    #[test]
    fn test_l_corridor_carving() {
        let generator = RoomCorridorGenerator::new();
        let start = Position::new(5, 5);
        let end = Position::new(15, 12);

        let mut grid = TileGrid::new(20, 20);
        generator.carve_l_corridor(&mut grid, start, end, CorridorOrder::HorizontalFirst);
        assert!(grid.is_walkable(start));
        assert!(grid.is_walkable(end));
        assert!(grid.is_walkable(Position::new(15, 5)));
        assert!(!grid.is_walkable(Position::new(5, 12)));

        let mut grid = TileGrid::new(20, 20);
        generator.carve_l_corridor(&mut grid, start, end, CorridorOrder::VerticalFirst);
        assert!(grid.is_walkable(Position::new(5, 12)));
        assert!(!grid.is_walkable(Position::new(15, 5)));
        assert_eq!(grid.count_terrain(TerrainKind::Floor), 8 + 10);
    }

    #[test]
    fn test_too_few_rooms_is_an_error() {
        let config = GenerationConfig {
            max_room_attempts: 1,
            ..GenerationConfig::for_testing(1)
        };
        let mut rng = utils::create_rng(&config);
        let result = RoomCorridorGenerator::new().generate(&config, &mut rng);
        assert!(matches!(result, Err(BreakdownError::GenerationFailed(_))));
    }
}
