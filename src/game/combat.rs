//! # Combat
//!
//! Fighter stats and damage resolution.

use crate::game::ItemKind;
use serde::{Deserialize, Serialize};

/// What happens to a character when its fighter dies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathBehavior {
    /// The game ends
    Player,
    /// Removed from the level, optionally leaving remains behind
    Enemy { remains: Option<ItemKind> },
}

/// Result of one attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackOutcome {
    Damaged { damage: i32 },
    NoEffect,
}

/// Combat stats of a character.
///
/// Hit points are clamped to `0..=max_hp`. Once a fighter has died it is
/// inert: further damage and healing change nothing and the death behavior
/// is never reported again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fighter {
    pub hp: i32,
    pub max_hp: i32,
    pub defense: i32,
    pub power: i32,
    pub xp: u32,
    pub death: Option<DeathBehavior>,
    dead: bool,
}

impl Fighter {
    /// Creates a fighter at full health.
    pub fn new(hp: i32, defense: i32, power: i32) -> Self {
        Self {
            hp,
            max_hp: hp,
            defense,
            power,
            xp: 0,
            death: None,
            dead: false,
        }
    }

    pub fn with_xp(mut self, xp: u32) -> Self {
        self.xp = xp;
        self
    }

    pub fn with_death(mut self, death: DeathBehavior) -> Self {
        self.death = Some(death);
        self
    }

    pub fn is_alive(&self) -> bool {
        !self.dead
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    /// Damage this fighter would take from an attacker with the given power.
    pub fn damage_from(&self, power: i32) -> i32 {
        power - self.defense
    }

    /// Applies damage.
    ///
    /// Non-positive damage is ignored. Returns the death behavior exactly
    /// once, on the call that brings hit points to zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use breakdown::{DeathBehavior, Fighter};
    ///
    /// let mut fighter = Fighter::new(10, 0, 1).with_death(DeathBehavior::Player);
    /// assert_eq!(fighter.take_damage(4), None);
    /// assert_eq!(fighter.take_damage(20), Some(DeathBehavior::Player));
    /// assert_eq!(fighter.hp, 0);
    /// assert_eq!(fighter.take_damage(5), None);
    /// ```
    pub fn take_damage(&mut self, damage: i32) -> Option<DeathBehavior> {
        if damage <= 0 || self.dead {
            return None;
        }

        self.hp = (self.hp - damage).max(0);
        if self.hp == 0 {
            self.dead = true;
            return self.death;
        }
        None
    }

    /// Restores hit points up to `max_hp`. Returns the amount actually healed.
    pub fn heal(&mut self, amount: i32) -> i32 {
        if self.dead || amount <= 0 {
            return 0;
        }
        let before = self.hp;
        self.hp = (self.hp + amount).min(self.max_hp);
        self.hp - before
    }

    pub fn is_wounded(&self) -> bool {
        self.hp < self.max_hp
    }
}
