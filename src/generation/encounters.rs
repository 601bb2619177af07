//! # Encounter Generation
//!
//! Enemy placement. Every room except the starting one gets up to
//! `max_room_enemies` enemies on random interior tiles.

use crate::game::{ArchetypeId, Character, Level};
use crate::generation::{GenerationConfig, Populator};
use log::debug;
use rand::{rngs::StdRng, Rng};

/// Places enemies into the rooms of a level.
#[derive(Debug, Clone)]
pub struct EncounterGenerator {
    /// Rolls in `0..=100` below this spawn a robo-miner
    pub miner_chance: u32,
}

impl EncounterGenerator {
    pub fn new() -> Self {
        Self { miner_chance: 80 }
    }

    /// Rolls the archetype for one enemy.
    pub fn roll_archetype(&self, rng: &mut StdRng) -> ArchetypeId {
        if rng.gen_range(0..=100) < self.miner_chance {
            ArchetypeId::RoboMiner
        } else {
            ArchetypeId::RoboGuard
        }
    }
}

impl Default for EncounterGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl Populator for EncounterGenerator {
    fn populate(&self, level: &mut Level, config: &GenerationConfig, rng: &mut StdRng) -> usize {
        let start = level.grid.starting_room_index();
        let rooms = level.grid.rooms().to_vec();
        let mut placed = 0;

        for (index, room) in rooms.iter().enumerate() {
            if Some(index) == start {
                continue;
            }
            let count = rng.gen_range(0..=config.max_room_enemies);
            for _ in 0..count {
                let pos = room.random_floor_position(rng);
                let archetype = self.roll_archetype(rng);
                // a blocked tile just means one enemy fewer
                if level.grid.is_blocked(pos) {
                    continue;
                }
                let enemy = Character::from_archetype(archetype, pos, &level.grid);
                level.spawn(enemy);
                placed += 1;
            }
        }

        debug!("{}: placed {} enemies", self.populator_type(), placed);
        placed
    }

    fn populator_type(&self) -> &'static str {
        "EncounterGenerator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::{generate_grid, utils};

    #[test]
    fn test_starting_room_is_left_empty() {
        for seed in 0..10 {
            let config = GenerationConfig::for_testing(seed);
            let mut rng = utils::create_rng(&config);
            let grid = generate_grid(&config, &mut rng).unwrap();
            let start = grid.starting_room().copied().unwrap();
            let mut level = Level::new(1, grid, start.center());

            let placed = EncounterGenerator::new().populate(&mut level, &config, &mut rng);
            assert_eq!(placed, level.characters.len());
            for enemy in &level.characters {
                assert!(!start.contains_floor(enemy.position));
                assert!(level.grid.is_occupied(enemy.position));
            }
        }
    }

    #[test]
    fn test_per_room_cap() {
        let config = GenerationConfig::for_testing(31);
        let mut rng = utils::create_rng(&config);
        let grid = generate_grid(&config, &mut rng).unwrap();
        let rooms = grid.rooms().to_vec();
        let mut level = Level::new(1, grid, rooms[0].center());
        EncounterGenerator::new().populate(&mut level, &config, &mut rng);

        for room in &rooms {
            let inside = level
                .characters
                .iter()
                .filter(|c| room.contains_floor(c.position))
                .count();
            assert!(inside as u32 <= config.max_room_enemies);
        }
    }

    #[test]
    fn test_archetype_roll_covers_both() {
        let config = GenerationConfig::new(5);
        let mut rng = utils::create_rng(&config);
        let generator = EncounterGenerator::new();
        let rolls: Vec<_> = (0..500).map(|_| generator.roll_archetype(&mut rng)).collect();
        let miners = rolls.iter().filter(|&&id| id == ArchetypeId::RoboMiner).count();
        assert!(miners > 300 && miners < 500);
    }
}
