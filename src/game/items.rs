//! # Items
//!
//! Items, inventories and equipment slots.
//!
//! An item lives in exactly one place at a time: a character's [`Inventory`]
//! or a level's floor list as a [`FloorItem`]. Moving it between the two is
//! always a remove followed by an insert of the owned value, so it can never
//! be in both.

use crate::config;
use crate::game::{new_entity_id, Color, EntityId, ItemKind, Position};
use serde::{Deserialize, Serialize};

/// Unique identifier of a single item instance.
pub type ItemId = EntityId;

/// Equipment slots a character has. At most one item per slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EquipmentSlot {
    Weapon,
}

impl std::fmt::Display for EquipmentSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EquipmentSlot::Weapon => write!(f, "weapon"),
        }
    }
}

/// What happens when an item is used.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum UseEffect {
    /// Restore hit points to the user
    Heal { amount: i32 },
    /// Strike the closest visible enemy within range
    Discharge { damage: i32, range: f64 },
    /// Confuse a chosen enemy within range
    Confuse { turns: u32, range: f64 },
    /// Damage every character around a chosen tile
    Grenade { radius: f64, damage: i32 },
    /// Shoot a chosen enemy with a clear line of fire
    Laser { damage: i32, range: f64 },
}

/// Result of applying a use effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UseOutcome {
    Used,
    Cancelled,
}

/// A single item instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub kind: ItemKind,
    pub name: String,
    pub icon: char,
    pub color: Color,
    pub effect: Option<UseEffect>,
    pub disposable: bool,
    pub slot: Option<EquipmentSlot>,
}

impl Item {
    /// Creates a new item instance from its catalog template.
    ///
    /// # Examples
    ///
    /// ```
    /// use breakdown::{Item, ItemKind};
    ///
    /// let rifle = Item::new(ItemKind::LaserRifle);
    /// assert_eq!(rifle.name, "laser rifle");
    /// assert!(rifle.is_equipment());
    /// ```
    pub fn new(kind: ItemKind) -> Self {
        let template = kind.template();
        Self {
            id: new_entity_id(),
            kind,
            name: template.name.to_string(),
            icon: template.icon,
            color: template.color,
            effect: template.effect,
            disposable: template.disposable,
            slot: template.slot,
        }
    }

    pub fn is_equipment(&self) -> bool {
        self.slot.is_some()
    }
}

/// An item lying on a level's floor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloorItem {
    pub item: Item,
    pub position: Position,
}

impl FloorItem {
    pub fn new(item: Item, position: Position) -> Self {
        Self { item, position }
    }
}

/// Bounded, ordered list of carried items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    items: Vec<Item>,
    capacity: usize,
}

impl Inventory {
    pub fn new() -> Self {
        Self::with_capacity(config::MAX_INVENTORY_SIZE)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::new(),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Adds an item, handing it back when the inventory is full.
    pub fn add(&mut self, item: Item) -> Result<(), Item> {
        if self.is_full() {
            return Err(item);
        }
        self.items.push(item);
        Ok(())
    }

    /// Removes the item at `index`, preserving the order of the rest.
    pub fn remove(&mut self, index: usize) -> Option<Item> {
        if index < self.items.len() {
            Some(self.items.remove(index))
        } else {
            None
        }
    }

    pub fn get(&self, index: usize) -> Option<&Item> {
        self.items.get(index)
    }

    /// Finds the index of an item by id.
    pub fn position_of(&self, id: ItemId) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.iter()
    }
}

impl Default for Inventory {
    fn default() -> Self {
        Self::new()
    }
}

/// Equipped items, by slot. Slots refer to items held in the inventory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equipment {
    weapon: Option<ItemId>,
}

impl Equipment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Item currently in a slot.
    pub fn get(&self, slot: EquipmentSlot) -> Option<ItemId> {
        match slot {
            EquipmentSlot::Weapon => self.weapon,
        }
    }

    fn slot_mut(&mut self, slot: EquipmentSlot) -> &mut Option<ItemId> {
        match slot {
            EquipmentSlot::Weapon => &mut self.weapon,
        }
    }

    /// Puts an item into a slot, returning the previous occupant.
    pub fn equip(&mut self, slot: EquipmentSlot, item: ItemId) -> Option<ItemId> {
        self.slot_mut(slot).replace(item)
    }

    /// Empties a slot, returning what was in it.
    pub fn unequip(&mut self, slot: EquipmentSlot) -> Option<ItemId> {
        self.slot_mut(slot).take()
    }

    /// Finds the slot an item is equipped in, if any.
    pub fn slot_of(&self, item: ItemId) -> Option<EquipmentSlot> {
        [EquipmentSlot::Weapon]
            .into_iter()
            .find(|&slot| self.get(slot) == Some(item))
    }

    pub fn is_equipped(&self, item: ItemId) -> bool {
        self.slot_of(item).is_some()
    }
}
