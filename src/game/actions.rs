//! # Actions
//!
//! Player intents and their resolution.
//!
//! An [`Intent`] is what the input side asks for. Resolving it either
//! consumes the player's turn, after which every NPC acts, or leaves the
//! turn untouched (cancelled prompts, walking into walls, full inventory).

use crate::game::{
    is_targetable, Behavior, EntityId, EquipmentSlot, FloorItem, GameEvent, GameState, Position,
    TargetSelector, UseEffect, UseOutcome,
};
use crate::BreakdownResult;
use log::debug;
use serde::{Deserialize, Serialize};

/// Discrete request from the input collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Intent {
    /// Step in a direction, attacking whoever stands there
    Move { dx: i32, dy: i32 },
    /// Attack the adjacent tile without moving
    Attack { dx: i32, dy: i32 },
    Wait,
    PickUp,
    /// Drop the inventory item at this index
    Drop(usize),
    /// Use the inventory item at this index
    UseItem(usize),
    /// Equip the inventory item at this index
    Equip(usize),
    /// Use the equipped weapon
    Fire,
    Descend,
}

impl Intent {
    /// Movement intent for a compass direction.
    pub fn step(direction: crate::game::Direction) -> Self {
        let delta = direction.to_delta();
        Intent::Move {
            dx: delta.x,
            dy: delta.y,
        }
    }
}

/// Whether resolving an intent used up the player's turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionOutcome {
    Consumed,
    NotConsumed,
}

impl ActionOutcome {
    pub fn consumes_turn(&self) -> bool {
        *self == ActionOutcome::Consumed
    }
}

impl From<bool> for ActionOutcome {
    fn from(consumed: bool) -> Self {
        if consumed {
            ActionOutcome::Consumed
        } else {
            ActionOutcome::NotConsumed
        }
    }
}

impl GameState {
    /// Resolves one player intent. NPCs do not act here; see
    /// [`GameState::process_intent`].
    pub fn resolve_intent(
        &mut self,
        intent: Intent,
        selector: &mut dyn TargetSelector,
    ) -> BreakdownResult<ActionOutcome> {
        debug!("turn {}: player intent {:?}", self.turn, intent);
        let outcome = match intent {
            Intent::Move { dx, dy } => self.player_move_or_attack(Position::new(dx, dy)),
            Intent::Attack { dx, dy } => self.player_attack_towards(Position::new(dx, dy)),
            Intent::Wait => ActionOutcome::Consumed,
            Intent::PickUp => self.pick_up(),
            Intent::Drop(index) => self.drop_item(index),
            Intent::UseItem(index) => self.use_item(index, selector),
            Intent::Equip(index) => self.equip(index),
            Intent::Fire => self.fire(selector),
            Intent::Descend => return self.descend_stairs(),
        };
        Ok(outcome)
    }

    /// Deltas are clamped to a single step.
    fn step_target(&self, delta: Position) -> Position {
        self.player.position + Position::new(delta.x.signum(), delta.y.signum())
    }

    fn player_move_or_attack(&mut self, delta: Position) -> ActionOutcome {
        let target = self.step_target(delta);
        if target == self.player.position {
            return ActionOutcome::NotConsumed;
        }

        if let Some(enemy) = self.level.character_at(target).map(|c| c.id) {
            let player = self.player.id;
            self.attack(player, enemy);
            return ActionOutcome::Consumed;
        }

        let player = self.player.id;
        self.move_character(player, target - self.player.position)
            .moved()
            .into()
    }

    fn player_attack_towards(&mut self, delta: Position) -> ActionOutcome {
        let target = self.step_target(delta);
        match self.level.character_at(target).map(|c| c.id) {
            Some(enemy) if target != self.player.position => {
                let player = self.player.id;
                self.attack(player, enemy);
                ActionOutcome::Consumed
            }
            _ => {
                self.emit(GameEvent::NothingToAttack { target });
                ActionOutcome::NotConsumed
            }
        }
    }

    /// Picks up the first item lying under the player.
    pub fn pick_up(&mut self) -> ActionOutcome {
        let position = self.player.position;
        let Some(index) = self.level.item_at(position) else {
            self.emit(GameEvent::NothingToPickUp);
            return ActionOutcome::NotConsumed;
        };

        if self.player.inventory.is_full() {
            let item = self.level.items[index].item.name.clone();
            self.emit(GameEvent::InventoryFull { item });
            return ActionOutcome::NotConsumed;
        }

        let Some(floor) = self.level.take_item(index) else {
            return ActionOutcome::NotConsumed;
        };
        let name = floor.item.name.clone();
        match self.player.inventory.add(floor.item) {
            Ok(()) => {
                self.emit(GameEvent::ItemPickedUp { item: name });
                ActionOutcome::Consumed
            }
            Err(item) => {
                self.level.drop_item(FloorItem::new(item, position));
                self.emit(GameEvent::InventoryFull { item: name });
                ActionOutcome::NotConsumed
            }
        }
    }

    /// Drops an inventory item at the player's feet, unequipping it first.
    pub fn drop_item(&mut self, index: usize) -> ActionOutcome {
        let Some(item) = self.player.inventory.remove(index) else {
            self.emit(GameEvent::NoSuchItem { index });
            return ActionOutcome::NotConsumed;
        };

        if let Some(slot) = self.player.equipment.slot_of(item.id) {
            self.player.equipment.unequip(slot);
            self.emit(GameEvent::ItemUnequipped {
                item: item.name.clone(),
                slot,
            });
        }

        let name = item.name.clone();
        let position = self.player.position;
        self.level.drop_item(FloorItem::new(item, position));
        self.emit(GameEvent::ItemDropped { item: name });
        ActionOutcome::Consumed
    }

    /// Uses an inventory item.
    ///
    /// Items without an effect still cost the turn. A cancelled effect keeps
    /// the item and the turn; a successful one removes disposable items.
    pub fn use_item(&mut self, index: usize, selector: &mut dyn TargetSelector) -> ActionOutcome {
        let Some(item) = self.player.inventory.get(index).cloned() else {
            self.emit(GameEvent::NoSuchItem { index });
            return ActionOutcome::NotConsumed;
        };

        if item.is_equipment() {
            self.emit(GameEvent::CannotUseEquipment { item: item.name });
            return ActionOutcome::NotConsumed;
        }
        let Some(effect) = item.effect else {
            self.emit(GameEvent::ItemCannotBeUsed { item: item.name });
            return ActionOutcome::Consumed;
        };

        match self.apply_effect(effect, selector) {
            UseOutcome::Cancelled => ActionOutcome::NotConsumed,
            UseOutcome::Used => {
                if item.disposable {
                    if let Some(index) = self.player.inventory.position_of(item.id) {
                        self.player.inventory.remove(index);
                    }
                }
                self.emit(GameEvent::ItemUsed { item: item.name });
                ActionOutcome::Consumed
            }
        }
    }

    /// Equips an inventory item, replacing whatever held its slot.
    /// Equipping the item already in its slot takes it off instead.
    pub fn equip(&mut self, index: usize) -> ActionOutcome {
        let Some(item) = self.player.inventory.get(index).cloned() else {
            self.emit(GameEvent::NoSuchItem { index });
            return ActionOutcome::NotConsumed;
        };
        let Some(slot) = item.slot else {
            self.emit(GameEvent::NotEquipment { item: item.name });
            return ActionOutcome::NotConsumed;
        };

        if self.player.equipment.get(slot) == Some(item.id) {
            self.player.equipment.unequip(slot);
            self.emit(GameEvent::ItemUnequipped {
                item: item.name,
                slot,
            });
            return ActionOutcome::Consumed;
        }
        if let Some(previous) = self.player.equipment.unequip(slot) {
            let name = self
                .player
                .inventory
                .position_of(previous)
                .and_then(|i| self.player.inventory.get(i))
                .map(|previous| previous.name.clone())
                .unwrap_or_default();
            self.emit(GameEvent::ItemUnequipped { item: name, slot });
        }
        self.player.equipment.equip(slot, item.id);
        self.emit(GameEvent::ItemEquipped {
            item: item.name,
            slot,
        });
        ActionOutcome::Consumed
    }

    /// Fires the equipped weapon.
    pub fn fire(&mut self, selector: &mut dyn TargetSelector) -> ActionOutcome {
        let weapon = self
            .player
            .equipment
            .get(EquipmentSlot::Weapon)
            .and_then(|id| self.player.inventory.position_of(id))
            .and_then(|index| self.player.inventory.get(index))
            .and_then(|item| item.effect.map(|effect| (item.name.clone(), effect)));
        let Some((name, effect)) = weapon else {
            self.emit(GameEvent::NoWeaponEquipped);
            return ActionOutcome::NotConsumed;
        };

        match self.apply_effect(effect, selector) {
            UseOutcome::Cancelled => ActionOutcome::NotConsumed,
            UseOutcome::Used => {
                self.emit(GameEvent::ItemUsed { item: name });
                ActionOutcome::Consumed
            }
        }
    }

    /// Takes the stairs if the player stands on them.
    pub fn descend_stairs(&mut self) -> BreakdownResult<ActionOutcome> {
        if self.player.position != self.level.stairs.position {
            self.emit(GameEvent::NotOnStairs);
            return Ok(ActionOutcome::NotConsumed);
        }
        self.descend()?;
        Ok(ActionOutcome::Consumed)
    }

    /// Applies an item effect on behalf of the player.
    pub fn apply_effect(
        &mut self,
        effect: UseEffect,
        selector: &mut dyn TargetSelector,
    ) -> UseOutcome {
        match effect {
            UseEffect::Heal { amount } => {
                if !self.player.fighter.is_wounded() {
                    self.emit(GameEvent::AlreadyHealthy);
                    return UseOutcome::Cancelled;
                }
                let healed = self.player.fighter.heal(amount);
                let entity = self.player.id;
                self.emit(GameEvent::Healed {
                    entity,
                    amount: healed,
                });
                UseOutcome::Used
            }
            UseEffect::Discharge { damage, range } => {
                let Some(target) = self.closest_visible_enemy(range) else {
                    self.emit(GameEvent::NoTargetInRange);
                    return UseOutcome::Cancelled;
                };
                self.strike(target, damage);
                UseOutcome::Used
            }
            UseEffect::Confuse { turns, range } => {
                let Some(target) = self.pick_enemy(selector, Some(range)) else {
                    return UseOutcome::Cancelled;
                };
                let Some(enemy) = self.level.character_mut(target) else {
                    return UseOutcome::Cancelled;
                };
                let previous = enemy.ai.take().unwrap_or_else(Behavior::aggressive);
                enemy.ai = Some(Behavior::confused(previous, turns));
                let name = enemy.name.clone();
                self.emit(GameEvent::Confused {
                    entity: target,
                    name,
                    turns,
                });
                UseOutcome::Used
            }
            UseEffect::Grenade { radius, damage } => {
                let Some(center) = self.pick_tile(selector, None) else {
                    return UseOutcome::Cancelled;
                };
                self.emit(GameEvent::GrenadeExploded { center, radius });

                let victims: Vec<EntityId> = self
                    .level
                    .characters
                    .iter()
                    .chain(std::iter::once(&self.player))
                    .filter(|c| c.position.euclidean_distance(center) <= radius)
                    .map(|c| c.id)
                    .collect();
                for victim in victims {
                    self.strike(victim, damage);
                }
                UseOutcome::Used
            }
            UseEffect::Laser { damage, range } => {
                let Some(target) = self.pick_enemy(selector, Some(range)) else {
                    return UseOutcome::Cancelled;
                };
                let Some(enemy) = self.level.character(target) else {
                    return UseOutcome::Cancelled;
                };
                if !is_targetable(&self.level.grid, self.player.position, enemy.position) {
                    let name = enemy.name.clone();
                    self.emit(GameEvent::TargetInaccessible { name });
                    return UseOutcome::Cancelled;
                }
                self.strike(target, damage);
                UseOutcome::Used
            }
        }
    }

    /// Effect damage: reported, then applied.
    fn strike(&mut self, target: EntityId, amount: i32) {
        let Some(name) = self.character(target).map(|c| c.name.clone()) else {
            return;
        };
        self.emit(GameEvent::Damaged {
            entity: target,
            name,
            amount,
        });
        self.damage(target, amount);
    }

    /// The closest NPC on a tile the player can currently see, within
    /// `range`.
    pub fn closest_visible_enemy(&self, range: f64) -> Option<EntityId> {
        self.level
            .characters
            .iter()
            .filter(|c| self.level.grid.tile(c.position).visible)
            .map(|c| (c.id, self.player.distance_to(c)))
            .filter(|&(_, distance)| distance <= range)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{
        ArchetypeId, Item, ItemKind, Level, ScriptedSelector, TargetInput, TerrainKind, TileGrid,
    };

    fn arena() -> GameState {
        let mut grid = TileGrid::new(20, 20);
        for y in 1..19 {
            for x in 1..19 {
                grid.set_terrain(Position::new(x, y), TerrainKind::Floor);
            }
        }
        let level = Level::new(1, grid, Position::new(17, 17));
        GameState::from_level(level, Position::new(5, 5), 3)
    }

    fn give(game: &mut GameState, kind: ItemKind) -> usize {
        game.player.inventory.add(Item::new(kind)).unwrap();
        game.player.inventory.len() - 1
    }

    #[test]
    fn test_move_into_wall_is_not_consumed() {
        let mut game = arena();
        game.player.place(&mut game.level.grid, Position::new(1, 1));
        let mut selector = ScriptedSelector::cancelling();
        let outcome = game
            .resolve_intent(Intent::Move { dx: -1, dy: 0 }, &mut selector)
            .unwrap();
        assert_eq!(outcome, ActionOutcome::NotConsumed);
        assert!(game
            .events()
            .contains(&GameEvent::MoveBlocked { target: Position::new(0, 1) }));
    }

    #[test]
    fn test_move_onto_enemy_attacks() {
        let mut game = arena();
        let miner = game.spawn_enemy(ArchetypeId::RoboMiner, Position::new(6, 5));
        let mut selector = ScriptedSelector::cancelling();
        let outcome = game
            .resolve_intent(Intent::Move { dx: 1, dy: 0 }, &mut selector)
            .unwrap();
        assert_eq!(outcome, ActionOutcome::Consumed);
        assert_eq!(game.player.position, Position::new(5, 5));
        // player power 20 vs miner defense 0
        assert_eq!(game.level.character(miner).map(|c| c.fighter.hp), Some(30));
    }

    #[test]
    fn test_pick_up_and_drop() {
        let mut game = arena();
        let here = game.player.position;
        game.level
            .drop_item(FloorItem::new(Item::new(ItemKind::Stimulator), here));

        assert_eq!(game.pick_up(), ActionOutcome::Consumed);
        assert_eq!(game.player.inventory.len(), 1);
        assert!(game.level.items.is_empty());
        assert_eq!(game.pick_up(), ActionOutcome::NotConsumed);

        assert_eq!(game.drop_item(0), ActionOutcome::Consumed);
        assert!(game.player.inventory.is_empty());
        assert_eq!(game.level.item_at(here), Some(0));
    }

    #[test]
    fn test_stimulator_at_full_health_is_cancelled() {
        let mut game = arena();
        let index = give(&mut game, ItemKind::Stimulator);
        let mut selector = ScriptedSelector::cancelling();

        assert_eq!(game.use_item(index, &mut selector), ActionOutcome::NotConsumed);
        assert_eq!(game.player.inventory.len(), 1);

        game.player.fighter.hp = 20;
        assert_eq!(game.use_item(index, &mut selector), ActionOutcome::Consumed);
        assert_eq!(game.player.fighter.hp, 70);
        assert!(game.player.inventory.is_empty());
    }

    #[test]
    fn test_remains_cannot_be_used_but_cost_the_turn() {
        let mut game = arena();
        let index = give(&mut game, ItemKind::RoboGuardRemains);
        let mut selector = ScriptedSelector::cancelling();
        assert_eq!(game.use_item(index, &mut selector), ActionOutcome::Consumed);
        assert_eq!(game.player.inventory.len(), 1);
    }

    #[test]
    fn test_discharge_hits_closest_visible_enemy() {
        let mut game = arena();
        let near = game.spawn_enemy(ArchetypeId::RoboGuard, Position::new(7, 5));
        let far = game.spawn_enemy(ArchetypeId::RoboGuard, Position::new(9, 5));
        game.player.fov.mark_dirty();
        game.refresh_player_view();

        let index = give(&mut game, ItemKind::DischargeGenerator);
        let mut selector = ScriptedSelector::cancelling();
        assert_eq!(game.use_item(index, &mut selector), ActionOutcome::Consumed);
        assert!(game.level.character(near).is_none());
        assert_eq!(game.level.character(far).map(|c| c.fighter.hp), Some(75));
    }

    #[test]
    fn test_discharge_without_target_keeps_item() {
        let mut game = arena();
        game.spawn_enemy(ArchetypeId::RoboMiner, Position::new(15, 15));
        let index = give(&mut game, ItemKind::DischargeGenerator);
        let mut selector = ScriptedSelector::cancelling();
        assert_eq!(game.use_item(index, &mut selector), ActionOutcome::NotConsumed);
        assert_eq!(game.player.inventory.len(), 1);
        assert!(game.events().contains(&GameEvent::NoTargetInRange));
    }

    #[test]
    fn test_cancelled_grenade_keeps_item_and_clears_highlights() {
        let mut game = arena();
        let index = give(&mut game, ItemKind::ImpulseGrenade);
        let mut selector = ScriptedSelector::new([
            TargetInput::Hover(Position::new(9, 9)),
            TargetInput::Cancel,
        ]);
        assert_eq!(game.use_item(index, &mut selector), ActionOutcome::NotConsumed);
        assert_eq!(game.player.inventory.len(), 1);
        assert!(game.level.grid.highlighted_positions().is_empty());
    }

    #[test]
    fn test_modulator_confuses_picked_enemy() {
        let mut game = arena();
        let target = Position::new(7, 6);
        let miner = game.spawn_enemy(ArchetypeId::RoboMiner, target);
        let index = give(&mut game, ItemKind::BehavioralModulator);
        let mut selector = ScriptedSelector::new([TargetInput::Select(target)]);

        assert_eq!(game.use_item(index, &mut selector), ActionOutcome::Consumed);
        let ai = game.level.character(miner).and_then(|c| c.ai.clone());
        assert_eq!(ai, Some(Behavior::confused(Behavior::Aggressive, 10)));
    }

    #[test]
    fn test_equipment_must_be_equipped_and_fired() {
        let mut game = arena();
        let index = give(&mut game, ItemKind::LaserPistol);
        let mut selector = ScriptedSelector::cancelling();

        assert_eq!(game.use_item(index, &mut selector), ActionOutcome::NotConsumed);
        assert_eq!(game.fire(&mut selector), ActionOutcome::NotConsumed);
        assert!(game.events().contains(&GameEvent::NoWeaponEquipped));

        assert_eq!(game.equip(index), ActionOutcome::Consumed);
        let target = Position::new(8, 5);
        let miner = game.spawn_enemy(ArchetypeId::RoboMiner, target);
        let mut selector = ScriptedSelector::new([TargetInput::Select(target)]);
        assert_eq!(game.fire(&mut selector), ActionOutcome::Consumed);
        assert_eq!(game.level.character(miner).map(|c| c.fighter.hp), Some(30));
        // weapons are not disposable
        assert_eq!(game.player.inventory.len(), 1);
    }

    #[test]
    fn test_equipping_replaces_previous_weapon() {
        let mut game = arena();
        let pistol = give(&mut game, ItemKind::LaserPistol);
        let rifle = give(&mut game, ItemKind::LaserRifle);
        game.equip(pistol);
        game.equip(rifle);

        let rifle_id = game.player.inventory.get(rifle).map(|i| i.id);
        assert_eq!(game.player.equipment.get(EquipmentSlot::Weapon), rifle_id);
        assert!(game.events().iter().any(|e| matches!(
            e,
            GameEvent::ItemUnequipped { item, .. } if item == "laser pistol"
        )));
    }

    #[test]
    fn test_equipping_the_worn_weapon_takes_it_off() {
        let mut game = arena();
        let rifle = give(&mut game, ItemKind::LaserRifle);
        assert_eq!(game.equip(rifle), ActionOutcome::Consumed);
        game.drain_events();

        assert_eq!(game.equip(rifle), ActionOutcome::Consumed);
        assert_eq!(game.player.equipment.get(EquipmentSlot::Weapon), None);
        assert_eq!(
            game.events(),
            &[GameEvent::ItemUnequipped {
                item: "laser rifle".to_string(),
                slot: EquipmentSlot::Weapon,
            }]
        );
        assert_eq!(game.player.inventory.len(), 1);
    }

    #[test]
    fn test_laser_needs_clear_line_of_fire() {
        let mut game = arena();
        let index = give(&mut game, ItemKind::LaserRifle);
        game.equip(index);
        let target = Position::new(9, 5);
        let guard = game.spawn_enemy(ArchetypeId::RoboGuard, target);
        game.spawn_enemy(ArchetypeId::RoboMiner, Position::new(7, 5));

        let mut selector = ScriptedSelector::new([TargetInput::Select(target)]);
        assert_eq!(game.fire(&mut selector), ActionOutcome::NotConsumed);
        assert_eq!(game.level.character(guard).map(|c| c.fighter.hp), Some(75));
    }

    #[test]
    fn test_descend_requires_stairs() {
        let mut game = arena();
        assert_eq!(game.descend_stairs().unwrap(), ActionOutcome::NotConsumed);
        assert!(game.events().contains(&GameEvent::NotOnStairs));
    }
}
