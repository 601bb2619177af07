//! # Level
//!
//! One floor of the station: its grid, live roster, floor items and stairs.

use crate::game::{Character, Color, EntityId, FloorItem, Position, TileGrid};
use serde::{Deserialize, Serialize};

/// The way down to the next level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stairs {
    pub position: Position,
    pub name: String,
    pub icon: char,
    pub color: Color,
}

impl Stairs {
    pub fn new(position: Position) -> Self {
        Self {
            position,
            name: "stairs".to_string(),
            icon: '<',
            color: Color::WHITE,
        }
    }
}

/// A generated level.
///
/// `characters` is the live roster of non-player characters in insertion
/// order. The player is not part of it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Level {
    pub depth: u32,
    pub grid: TileGrid,
    pub characters: Vec<Character>,
    pub items: Vec<FloorItem>,
    pub stairs: Stairs,
}

impl Level {
    /// Creates an empty level around an already generated grid.
    pub fn new(depth: u32, grid: TileGrid, stairs: Position) -> Self {
        Self {
            depth,
            grid,
            characters: Vec::new(),
            items: Vec::new(),
            stairs: Stairs::new(stairs),
        }
    }

    /// Adds a character to the end of the roster and claims its tile.
    pub fn spawn(&mut self, mut character: Character) -> EntityId {
        let id = character.id;
        let position = character.position;
        character.place(&mut self.grid, position);
        self.characters.push(character);
        id
    }

    /// Removes a character from the roster and releases its tile.
    pub fn remove_character(&mut self, id: EntityId) -> Option<Character> {
        let index = self.characters.iter().position(|c| c.id == id)?;
        let character = self.characters.remove(index);
        if character.blocks_path {
            self.grid.set_occupied(character.position, false);
        }
        Some(character)
    }

    pub fn character(&self, id: EntityId) -> Option<&Character> {
        self.characters.iter().find(|c| c.id == id)
    }

    pub fn character_mut(&mut self, id: EntityId) -> Option<&mut Character> {
        self.characters.iter_mut().find(|c| c.id == id)
    }

    /// The non-player character standing on `pos`, if any.
    pub fn character_at(&self, pos: Position) -> Option<&Character> {
        self.characters.iter().find(|c| c.is_here(pos))
    }

    /// Roster ids in turn order.
    pub fn roster(&self) -> Vec<EntityId> {
        self.characters.iter().map(|c| c.id).collect()
    }

    pub fn drop_item(&mut self, item: FloorItem) {
        self.items.push(item);
    }

    /// Index of the first floor item lying on `pos`.
    pub fn item_at(&self, pos: Position) -> Option<usize> {
        self.items.iter().position(|floor| floor.position == pos)
    }

    pub fn take_item(&mut self, index: usize) -> Option<FloorItem> {
        if index < self.items.len() {
            Some(self.items.remove(index))
        } else {
            None
        }
    }

    /// Rebuilds every occupancy flag from character positions.
    pub fn rebuild_occupancy(&mut self, player: &Character) {
        self.grid.clear_occupancy();
        for character in self.characters.iter().chain(std::iter::once(player)) {
            if character.blocks_path {
                self.grid.set_occupied(character.position, true);
            }
        }
    }
}
