//! # Loot Generation
//!
//! Floor item placement. Every room, the starting one included, gets up to
//! `max_room_items` consumables, and one laser rifle lies at the center of a
//! random room.

use crate::game::{FloorItem, Item, ItemKind, Level};
use crate::generation::{GenerationConfig, Populator};
use log::debug;
use rand::{rngs::StdRng, Rng};

/// Cumulative roll thresholds out of `0..=100`.
const LOOT_TABLE: [(u32, ItemKind); 3] = [
    (70, ItemKind::Stimulator),
    (80, ItemKind::DischargeGenerator),
    (90, ItemKind::ImpulseGrenade),
];

/// Places items into the rooms of a level.
#[derive(Debug, Clone, Default)]
pub struct LootGenerator;

impl LootGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Maps a roll in `0..=100` to an item kind.
    pub fn item_for_roll(roll: u32) -> ItemKind {
        LOOT_TABLE
            .iter()
            .find(|(threshold, _)| roll < *threshold)
            .map(|&(_, kind)| kind)
            .unwrap_or(ItemKind::BehavioralModulator)
    }
}

impl Populator for LootGenerator {
    fn populate(&self, level: &mut Level, config: &GenerationConfig, rng: &mut StdRng) -> usize {
        let rooms = level.grid.rooms().to_vec();
        let mut placed = 0;

        for room in &rooms {
            let count = rng.gen_range(0..=config.max_room_items);
            for _ in 0..count {
                let pos = room.random_floor_position(rng);
                if level.grid.is_blocked(pos) {
                    continue;
                }
                let kind = Self::item_for_roll(rng.gen_range(0..=100));
                level.drop_item(FloorItem::new(Item::new(kind), pos));
                placed += 1;
            }
        }

        if !rooms.is_empty() {
            let gun_room = rooms[rng.gen_range(0..rooms.len())];
            level.drop_item(FloorItem::new(Item::new(ItemKind::LaserRifle), gun_room.center()));
            placed += 1;
        }

        debug!("{}: placed {} items", self.populator_type(), placed);
        placed
    }

    fn populator_type(&self) -> &'static str {
        "LootGenerator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::{generate_grid, utils};

    #[test]
    fn test_roll_table() {
        assert_eq!(LootGenerator::item_for_roll(0), ItemKind::Stimulator);
        assert_eq!(LootGenerator::item_for_roll(69), ItemKind::Stimulator);
        assert_eq!(LootGenerator::item_for_roll(70), ItemKind::DischargeGenerator);
        assert_eq!(LootGenerator::item_for_roll(85), ItemKind::ImpulseGrenade);
        assert_eq!(LootGenerator::item_for_roll(90), ItemKind::BehavioralModulator);
        assert_eq!(LootGenerator::item_for_roll(100), ItemKind::BehavioralModulator);
    }

    #[test]
    fn test_every_level_has_one_rifle_on_a_room_center() {
        let config = GenerationConfig::for_testing(17);
        let mut rng = utils::create_rng(&config);
        let grid = generate_grid(&config, &mut rng).unwrap();
        let rooms = grid.rooms().to_vec();
        let mut level = Level::new(1, grid, rooms[0].center());

        let placed = LootGenerator::new().populate(&mut level, &config, &mut rng);
        assert_eq!(placed, level.items.len());

        let rifles: Vec<_> = level
            .items
            .iter()
            .filter(|floor| floor.item.kind == ItemKind::LaserRifle)
            .collect();
        assert_eq!(rifles.len(), 1);
        assert!(rooms.iter().any(|room| room.center() == rifles[0].position));
        assert!(level.items.iter().all(|floor| level.grid.is_walkable(floor.position)));
    }
}
