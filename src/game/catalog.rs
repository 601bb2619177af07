//! # Catalog
//!
//! Static archetype and item tables.
//!
//! Both tables are closed enumerations with a `const` record per variant.
//! The simulation only ever looks records up by identifier; nothing here is
//! mutable at runtime.

use crate::config;
use crate::game::{Behavior, Color, DeathBehavior, EquipmentSlot, UseEffect};
use serde::{Deserialize, Serialize};

/// Identifiers for the non-player character archetypes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArchetypeId {
    RoboMiner,
    RoboGuard,
}

/// Static description of a non-player character archetype.
#[derive(Debug, Clone, Copy)]
pub struct Archetype {
    pub name: &'static str,
    pub icon: char,
    pub color: Color,
    pub hp: i32,
    pub defense: i32,
    pub power: i32,
    /// Experience credited to whoever kills it
    pub xp: u32,
    pub death: DeathBehavior,
    /// Builds a fresh behavior for a newly spawned character
    pub behavior: fn() -> Behavior,
}

const ROBO_MINER: Archetype = Archetype {
    name: "robo-miner",
    icon: 'm',
    color: Color::LIGHT_CYAN,
    hp: 50,
    defense: 0,
    power: 10,
    xp: 25,
    death: DeathBehavior::Enemy {
        remains: Some(ItemKind::RoboMinerRemains),
    },
    behavior: Behavior::aggressive,
};

const ROBO_GUARD: Archetype = Archetype {
    name: "robo-guard",
    icon: 'G',
    color: Color::DARKEST_HAN,
    hp: 75,
    defense: 5,
    power: 20,
    xp: 100,
    death: DeathBehavior::Enemy {
        remains: Some(ItemKind::RoboGuardRemains),
    },
    behavior: Behavior::aggressive,
};

impl ArchetypeId {
    /// Looks up the archetype record.
    ///
    /// # Examples
    ///
    /// ```
    /// use breakdown::ArchetypeId;
    ///
    /// let guard = ArchetypeId::RoboGuard.archetype();
    /// assert_eq!(guard.name, "robo-guard");
    /// assert_eq!(guard.hp, 75);
    /// ```
    pub fn archetype(self) -> &'static Archetype {
        match self {
            ArchetypeId::RoboMiner => &ROBO_MINER,
            ArchetypeId::RoboGuard => &ROBO_GUARD,
        }
    }
}

/// Stats and presentation of the player character.
#[derive(Debug, Clone, Copy)]
pub struct PlayerProfile {
    pub name: &'static str,
    pub icon: char,
    pub color: Color,
    pub hp: i32,
    pub defense: i32,
    pub power: i32,
}

pub const PLAYER_PROFILE: PlayerProfile = PlayerProfile {
    name: "hero",
    icon: '@',
    color: Color::WHITE,
    hp: 150,
    defense: 5,
    power: 20,
};

/// Items every new game starts with in the player's inventory.
pub const STARTING_KIT: [ItemKind; 4] = [
    ItemKind::Stimulator,
    ItemKind::DischargeGenerator,
    ItemKind::ImpulseGrenade,
    ItemKind::BehavioralModulator,
];

/// Identifiers for every item the station can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    Stimulator,
    DischargeGenerator,
    ImpulseGrenade,
    BehavioralModulator,
    RoboMinerRemains,
    RoboGuardRemains,
    LaserRifle,
    LaserPistol,
}

/// Static description of an item kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemTemplate {
    pub name: &'static str,
    pub icon: char,
    pub color: Color,
    pub effect: Option<UseEffect>,
    /// Destroyed after one successful use
    pub disposable: bool,
    pub slot: Option<EquipmentSlot>,
}

const STIMULATOR: ItemTemplate = ItemTemplate {
    name: "stimulator",
    icon: '!',
    color: Color::PINK,
    effect: Some(UseEffect::Heal {
        amount: config::STIM_HEAL_AMOUNT,
    }),
    disposable: true,
    slot: None,
};

const DISCHARGE_GENERATOR: ItemTemplate = ItemTemplate {
    name: "discharge generator",
    icon: '#',
    color: Color::CYAN,
    effect: Some(UseEffect::Discharge {
        damage: config::DISCHARGE_DAMAGE,
        range: config::ITEM_USING_RANGE,
    }),
    disposable: true,
    slot: None,
};

const IMPULSE_GRENADE: ItemTemplate = ItemTemplate {
    name: "impulse grenade",
    icon: '#',
    color: Color::RED,
    effect: Some(UseEffect::Grenade {
        radius: config::GRENADE_RADIUS,
        damage: config::GRENADE_DAMAGE,
    }),
    disposable: true,
    slot: None,
};

const BEHAVIORAL_MODULATOR: ItemTemplate = ItemTemplate {
    name: "behavioral modulator",
    icon: '#',
    color: Color::GREEN,
    effect: Some(UseEffect::Confuse {
        turns: config::CONFUSE_TURNS,
        range: config::ITEM_USING_RANGE,
    }),
    disposable: true,
    slot: None,
};

const ROBO_MINER_REMAINS: ItemTemplate = ItemTemplate {
    name: "remains of robo-miner",
    icon: '%',
    color: Color::DARK_RED,
    effect: None,
    disposable: false,
    slot: None,
};

const ROBO_GUARD_REMAINS: ItemTemplate = ItemTemplate {
    name: "remains of robo-guard",
    icon: '%',
    color: Color::DARK_RED,
    effect: None,
    disposable: false,
    slot: None,
};

const LASER_RIFLE: ItemTemplate = ItemTemplate {
    name: "laser rifle",
    icon: ')',
    color: Color::DARK_BLUE,
    effect: Some(UseEffect::Laser {
        damage: config::LASER_RIFLE_DAMAGE,
        range: config::WEAPON_RANGE,
    }),
    disposable: false,
    slot: Some(EquipmentSlot::Weapon),
};

const LASER_PISTOL: ItemTemplate = ItemTemplate {
    name: "laser pistol",
    icon: ')',
    color: Color::LIGHT_BLUE,
    effect: Some(UseEffect::Laser {
        damage: config::LASER_PISTOL_DAMAGE,
        range: config::WEAPON_RANGE,
    }),
    disposable: false,
    slot: Some(EquipmentSlot::Weapon),
};

impl ItemKind {
    /// Looks up the item template.
    pub fn template(self) -> &'static ItemTemplate {
        match self {
            ItemKind::Stimulator => &STIMULATOR,
            ItemKind::DischargeGenerator => &DISCHARGE_GENERATOR,
            ItemKind::ImpulseGrenade => &IMPULSE_GRENADE,
            ItemKind::BehavioralModulator => &BEHAVIORAL_MODULATOR,
            ItemKind::RoboMinerRemains => &ROBO_MINER_REMAINS,
            ItemKind::RoboGuardRemains => &ROBO_GUARD_REMAINS,
            ItemKind::LaserRifle => &LASER_RIFLE,
            ItemKind::LaserPistol => &LASER_PISTOL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_archetype_stats() {
        let miner = ArchetypeId::RoboMiner.archetype();
        assert_eq!((miner.hp, miner.defense, miner.power, miner.xp), (50, 0, 10, 25));
        assert_eq!((miner.behavior)(), Behavior::Aggressive);

        let guard = ArchetypeId::RoboGuard.archetype();
        assert_eq!((guard.hp, guard.defense, guard.power, guard.xp), (75, 5, 20, 100));
        assert_eq!(
            guard.death,
            DeathBehavior::Enemy {
                remains: Some(ItemKind::RoboGuardRemains)
            }
        );
    }

    #[test]
    fn test_weapons_are_equipment() {
        for kind in [ItemKind::LaserRifle, ItemKind::LaserPistol] {
            let template = kind.template();
            assert_eq!(template.slot, Some(EquipmentSlot::Weapon));
            assert!(!template.disposable);
        }
    }

    #[test]
    fn test_remains_have_no_effect() {
        assert!(ItemKind::RoboMinerRemains.template().effect.is_none());
        assert!(ItemKind::RoboGuardRemains.template().effect.is_none());
    }

    #[test]
    fn test_starting_kit_is_consumables() {
        for kind in STARTING_KIT {
            let template = kind.template();
            assert!(template.disposable);
            assert!(template.slot.is_none());
        }
    }
}
