//! # Entities
//!
//! Characters: the player and every non-player inhabitant of a level.

use crate::game::{
    new_entity_id, ArchetypeId, Behavior, Color, DeathBehavior, EntityId, Equipment, Fighter,
    Inventory, Position, TileGrid, VisibilityField, PLAYER_PROFILE,
};
use serde::{Deserialize, Serialize};

/// Whether a character is the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityRole {
    Player,
    NonPlayer,
}

/// Result of a single movement attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved { from: Position, to: Position },
    Blocked,
}

impl MoveOutcome {
    pub fn moved(&self) -> bool {
        matches!(self, MoveOutcome::Moved { .. })
    }
}

/// Any character on a level.
///
/// Characters hold their position as plain coordinates. Occupancy on the
/// grid is only ever changed through [`Character::move_by`] and the level's
/// spawn/remove helpers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Character {
    pub id: EntityId,
    pub name: String,
    pub icon: char,
    pub color: Color,
    pub role: EntityRole,
    pub position: Position,
    /// Makes the occupied tile impassable to others
    pub blocks_path: bool,
    /// Drawn on explored tiles even when out of view
    pub always_visible: bool,
    pub fighter: Fighter,
    pub ai: Option<Behavior>,
    pub inventory: Inventory,
    pub equipment: Equipment,
    pub archetype: Option<ArchetypeId>,
    #[serde(skip)]
    pub fov: VisibilityField,
}

impl Character {
    /// Creates the player character at `position`.
    pub fn player(position: Position, grid: &TileGrid) -> Self {
        let profile = PLAYER_PROFILE;
        Self {
            id: new_entity_id(),
            name: profile.name.to_string(),
            icon: profile.icon,
            color: profile.color,
            role: EntityRole::Player,
            position,
            blocks_path: true,
            always_visible: false,
            fighter: Fighter::new(profile.hp, profile.defense, profile.power)
                .with_death(DeathBehavior::Player),
            ai: None,
            inventory: Inventory::new(),
            equipment: Equipment::new(),
            archetype: None,
            fov: VisibilityField::new(grid),
        }
    }

    /// Creates a non-player character from its archetype.
    ///
    /// # Examples
    ///
    /// ```
    /// use breakdown::{ArchetypeId, Behavior, Character, Position, TileGrid};
    ///
    /// let grid = TileGrid::new(10, 10);
    /// let miner = Character::from_archetype(ArchetypeId::RoboMiner, Position::new(3, 3), &grid);
    /// assert_eq!(miner.name, "robo-miner");
    /// assert_eq!(miner.ai, Some(Behavior::Aggressive));
    /// ```
    pub fn from_archetype(id: ArchetypeId, position: Position, grid: &TileGrid) -> Self {
        let archetype = id.archetype();
        Self {
            id: new_entity_id(),
            name: archetype.name.to_string(),
            icon: archetype.icon,
            color: archetype.color,
            role: EntityRole::NonPlayer,
            position,
            blocks_path: true,
            always_visible: false,
            fighter: Fighter::new(archetype.hp, archetype.defense, archetype.power)
                .with_xp(archetype.xp)
                .with_death(archetype.death),
            ai: Some((archetype.behavior)()),
            inventory: Inventory::new(),
            equipment: Equipment::new(),
            archetype: Some(id),
            fov: VisibilityField::new(grid),
        }
    }

    pub fn is_player(&self) -> bool {
        self.role == EntityRole::Player
    }

    pub fn is_alive(&self) -> bool {
        self.fighter.is_alive()
    }

    pub fn is_here(&self, pos: Position) -> bool {
        self.position == pos
    }

    pub fn distance_to(&self, other: &Character) -> f64 {
        self.position.euclidean_distance(other.position)
    }

    pub fn distance(&self, pos: Position) -> f64 {
        self.position.euclidean_distance(pos)
    }

    /// Steps by `delta` unless the destination is blocked.
    ///
    /// A successful move clears the old tile's occupancy and sets the new
    /// one's in a single grid call, and marks the visibility field stale.
    pub fn move_by(&mut self, grid: &mut TileGrid, delta: Position) -> MoveOutcome {
        let from = self.position;
        let to = from + delta;
        if to == from || grid.is_blocked(to) {
            return MoveOutcome::Blocked;
        }

        if self.blocks_path {
            grid.relocate_occupant(from, to);
        }
        self.position = to;
        self.fov.mark_dirty();
        MoveOutcome::Moved { from, to }
    }

    /// Places the character on a tile without moving through the grid, e.g.
    /// when entering a new level.
    pub fn place(&mut self, grid: &mut TileGrid, position: Position) {
        self.position = position;
        if self.blocks_path {
            grid.set_occupied(position, true);
        }
        self.reset_fov(grid);
    }

    /// Discards the visibility field and builds a fresh one for `grid`.
    pub fn reset_fov(&mut self, grid: &TileGrid) {
        self.fov = VisibilityField::new(grid);
    }

    /// Recomputes the visibility field if the character moved.
    pub fn refresh_fov(&mut self, grid: &TileGrid) -> bool {
        self.fov.recompute(grid, self.position)
    }
}
