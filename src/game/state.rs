//! # Game State Module
//!
//! Central game state and the turn scheduler.
//!
//! [`GameState`] owns the player, the current level and the random number
//! generator. Everything that changes the world goes through it: movement
//! keeps tile occupancy in step, attacks route damage through the fighters,
//! and deaths are resolved in one place. Outcomes are reported as
//! [`GameEvent`]s that the caller drains after each turn.

use crate::config;
use crate::game::{
    ActionOutcome, ArchetypeId, AttackOutcome, Character, Color, DeathBehavior, EntityId,
    EquipmentSlot, FloorItem, Intent, Item, Level, MoveOutcome, Position, TargetRejection,
    TargetSelector, TileGrid, STARTING_KIT,
};
use crate::generation::{generate_level, GenerationConfig};
use crate::utils::Pathfinder;
use crate::{BreakdownError, BreakdownResult};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Scheduler state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameMode {
    /// Turns are being taken
    Playing,
    /// The player is dead; the state can only be observed
    GameOver,
}

/// Something that happened during a turn.
///
/// Events carry ids and names but no formatting; turning them into
/// messages is up to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Moved {
        entity: EntityId,
        from: Position,
        to: Position,
    },
    /// The player tried to walk into a blocked tile
    MoveBlocked { target: Position },
    Attacked {
        attacker: EntityId,
        defender: EntityId,
        damage: i32,
    },
    AttackNoEffect {
        attacker: EntityId,
        defender: EntityId,
    },
    NothingToAttack { target: Position },
    /// Damage from an item or effect rather than a melee attack
    Damaged {
        entity: EntityId,
        name: String,
        amount: i32,
    },
    Died {
        entity: EntityId,
        name: String,
        position: Position,
    },
    ExperienceGained { amount: u32 },
    Healed { entity: EntityId, amount: i32 },
    AlreadyHealthy,
    ItemPickedUp { item: String },
    ItemDropped { item: String },
    ItemUsed { item: String },
    ItemCannotBeUsed { item: String },
    /// Equipment has to be equipped and fired, not used
    CannotUseEquipment { item: String },
    ItemEquipped { item: String, slot: EquipmentSlot },
    ItemUnequipped { item: String, slot: EquipmentSlot },
    NotEquipment { item: String },
    NoSuchItem { index: usize },
    InventoryFull { item: String },
    NothingToPickUp,
    Confused {
        entity: EntityId,
        name: String,
        turns: u32,
    },
    NoLongerConfused { entity: EntityId, name: String },
    TargetingCancelled,
    TargetRejected { reason: TargetRejection },
    NoTargetInRange,
    TargetInaccessible { name: String },
    GrenadeExploded { center: Position, radius: f64 },
    NoWeaponEquipped,
    NotOnStairs,
    Descended { depth: u32 },
    GameOver,
}

/// One thing for a renderer to draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Drawable {
    pub position: Position,
    pub icon: char,
    pub color: Color,
    pub always_visible: bool,
}

impl Drawable {
    /// Visible tiles always draw; explored ones only for `always_visible`.
    pub fn should_draw(&self, grid: &TileGrid) -> bool {
        grid.get(self.position).map_or(false, |tile| {
            tile.visible || (self.always_visible && tile.explored)
        })
    }
}

fn default_rng() -> StdRng {
    StdRng::seed_from_u64(0)
}

/// Central game state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Seed the game was started with
    pub seed: u64,
    /// Generation settings reused for every level
    pub config: GenerationConfig,
    /// Number of completed turns
    pub turn: u64,
    pub mode: GameMode,
    pub player: Character,
    pub level: Level,
    #[serde(skip)]
    events: Vec<GameEvent>,
    #[serde(skip, default = "default_rng")]
    rng: StdRng,
    #[serde(skip)]
    pathfinder: Pathfinder,
}

impl GameState {
    /// Starts a new game on a freshly generated first level.
    ///
    /// # Examples
    ///
    /// ```
    /// use breakdown::{GameMode, GameState, GenerationConfig};
    ///
    /// let game = GameState::new(GenerationConfig::for_testing(42)).unwrap();
    /// assert_eq!(game.mode, GameMode::Playing);
    /// assert_eq!(game.level.depth, 1);
    /// assert_eq!(game.player.inventory.len(), 4);
    /// ```
    pub fn new(config: GenerationConfig) -> BreakdownResult<Self> {
        let mut rng = StdRng::seed_from_u64(config.seed);
        let mut level = generate_level(&config, config::STARTING_DEPTH, &mut rng)?;
        let start = level
            .grid
            .starting_room()
            .map(|room| room.center())
            .ok_or_else(|| BreakdownError::InvalidState("level has no starting room".to_string()))?;

        let mut player = Character::player(start, &level.grid);
        player.place(&mut level.grid, start);
        for kind in STARTING_KIT {
            let _ = player.inventory.add(Item::new(kind));
        }

        info!("New game with seed {} ({})", config.seed, config.strategy);
        let mut state = Self {
            seed: config.seed,
            config,
            turn: 0,
            mode: GameMode::Playing,
            player,
            level,
            events: Vec::new(),
            rng,
            pathfinder: Pathfinder::new(),
        };
        state.refresh_player_view();
        Ok(state)
    }

    /// Wraps an existing level, placing a player with an empty inventory on
    /// `player_pos`. Useful for hand-built scenarios.
    pub fn from_level(mut level: Level, player_pos: Position, seed: u64) -> Self {
        let mut player = Character::player(player_pos, &level.grid);
        player.place(&mut level.grid, player_pos);
        let config = GenerationConfig {
            width: level.grid.width(),
            height: level.grid.height(),
            ..GenerationConfig::new(seed)
        };

        let mut state = Self {
            seed,
            config,
            turn: 0,
            mode: GameMode::Playing,
            player,
            level,
            events: Vec::new(),
            rng: StdRng::seed_from_u64(seed),
            pathfinder: Pathfinder::new(),
        };
        state.refresh_player_view();
        state
    }

    /// Spawns an archetype at `pos` at the end of the roster.
    pub fn spawn_enemy(&mut self, archetype: ArchetypeId, pos: Position) -> EntityId {
        let enemy = Character::from_archetype(archetype, pos, &self.level.grid);
        self.level.spawn(enemy)
    }

    pub fn is_game_over(&self) -> bool {
        self.mode == GameMode::GameOver
    }

    pub fn depth(&self) -> u32 {
        self.level.depth
    }

    /// Looks a character up by id, the player included.
    pub fn character(&self, id: EntityId) -> Option<&Character> {
        if self.player.id == id {
            Some(&self.player)
        } else {
            self.level.character(id)
        }
    }

    pub fn character_mut(&mut self, id: EntityId) -> Option<&mut Character> {
        if self.player.id == id {
            Some(&mut self.player)
        } else {
            self.level.character_mut(id)
        }
    }

    pub fn emit(&mut self, event: GameEvent) {
        debug!("event: {:?}", event);
        self.events.push(event);
    }

    /// Events since the last drain.
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    pub fn pathfinder(&self) -> Pathfinder {
        self.pathfinder
    }

    /// Moves a character by `delta`, keeping tile occupancy consistent.
    ///
    /// A blocked move changes nothing. Only the player's blocked moves are
    /// reported; for anyone else it is just a lost step.
    pub fn move_character(&mut self, id: EntityId, delta: Position) -> MoveOutcome {
        let is_player = self.player.id == id;
        let grid = &mut self.level.grid;
        let character = if is_player {
            Some(&mut self.player)
        } else {
            self.level.characters.iter_mut().find(|c| c.id == id)
        };
        let Some(character) = character else {
            return MoveOutcome::Blocked;
        };

        let target = character.position + delta;
        if !grid.in_bounds(target) {
            if is_player {
                self.emit(GameEvent::MoveBlocked { target });
            }
            return MoveOutcome::Blocked;
        }

        let outcome = character.move_by(grid, delta);
        match outcome {
            MoveOutcome::Moved { from, to } => self.emit(GameEvent::Moved { entity: id, from, to }),
            MoveOutcome::Blocked if is_player => self.emit(GameEvent::MoveBlocked { target }),
            MoveOutcome::Blocked => {}
        }
        outcome
    }

    /// Melee attack: damage is `power - defense`, applied only when positive.
    ///
    /// Returns `None` if either side no longer exists.
    pub fn attack(&mut self, attacker: EntityId, defender: EntityId) -> Option<AttackOutcome> {
        let power = self.character(attacker)?.fighter.power;
        let damage = self.character(defender)?.fighter.damage_from(power);

        if damage > 0 {
            self.emit(GameEvent::Attacked {
                attacker,
                defender,
                damage,
            });
            self.damage(defender, damage);
            Some(AttackOutcome::Damaged { damage })
        } else {
            self.emit(GameEvent::AttackNoEffect { attacker, defender });
            Some(AttackOutcome::NoEffect)
        }
    }

    /// Applies damage to a character and resolves its death.
    pub fn damage(&mut self, target: EntityId, amount: i32) {
        let Some(character) = self.character_mut(target) else {
            return;
        };
        if let Some(death) = character.fighter.take_damage(amount) {
            self.handle_death(target, death);
        }
    }

    fn handle_death(&mut self, id: EntityId, death: DeathBehavior) {
        match death {
            DeathBehavior::Player => {
                let position = self.player.position;
                let name = self.player.name.clone();
                self.player.icon = '%';
                self.player.color = Color::DARK_RED;
                self.mode = GameMode::GameOver;
                info!("{} died on turn {}", name, self.turn);
                self.emit(GameEvent::Died {
                    entity: id,
                    name,
                    position,
                });
                self.emit(GameEvent::GameOver);
            }
            DeathBehavior::Enemy { remains } => {
                let Some(corpse) = self.level.remove_character(id) else {
                    return;
                };
                debug!("{} destroyed at {}", corpse.name, corpse.position);
                if let Some(kind) = remains {
                    self.level
                        .drop_item(FloorItem::new(Item::new(kind), corpse.position));
                }
                self.emit(GameEvent::Died {
                    entity: id,
                    name: corpse.name,
                    position: corpse.position,
                });

                let xp = corpse.fighter.xp;
                if xp > 0 {
                    self.player.fighter.xp += xp;
                    self.emit(GameEvent::ExperienceGained { amount: xp });
                }
            }
        }
    }

    /// Brings a character's visibility up to date. The player's field is
    /// also written into the grid's visible/explored flags.
    pub fn refresh_fov(&mut self, id: EntityId) {
        if self.player.id == id {
            self.refresh_player_view();
        } else if let Some(character) = self.level.characters.iter_mut().find(|c| c.id == id) {
            character.refresh_fov(&self.level.grid);
        }
    }

    pub fn refresh_player_view(&mut self) {
        if self.player.refresh_fov(&self.level.grid) {
            self.player.fov.apply_to_grid(&mut self.level.grid);
        }
    }

    /// Runs one player intent and, if it consumed the turn, every NPC turn.
    ///
    /// Does nothing once the game is over.
    pub fn process_intent(
        &mut self,
        intent: Intent,
        selector: &mut dyn TargetSelector,
    ) -> BreakdownResult<ActionOutcome> {
        if self.is_game_over() {
            return Ok(ActionOutcome::NotConsumed);
        }

        self.refresh_player_view();
        let outcome = self.resolve_intent(intent, selector)?;
        if outcome.consumes_turn() {
            self.run_npc_turns();
            self.turn += 1;
        }
        self.refresh_player_view();
        Ok(outcome)
    }

    /// Gives every NPC on the roster one turn, in roster order.
    ///
    /// The roster is snapshotted up front and each id looked up live, so
    /// characters removed earlier in the pass are skipped. The pass stops as
    /// soon as the player dies.
    pub fn run_npc_turns(&mut self) {
        for id in self.level.roster() {
            if self.is_game_over() {
                break;
            }
            let Some(behavior) = self.level.character_mut(id).and_then(|c| c.ai.take()) else {
                continue;
            };
            let next = behavior.take_turn(self, id);
            if let Some(character) = self.level.character_mut(id) {
                character.ai = Some(next);
            }
        }
    }

    /// Moves the player down to a newly generated level.
    ///
    /// The player recovers half of their maximum hit points on the way.
    /// A failed generation leaves the player and the current level untouched.
    pub fn descend(&mut self) -> BreakdownResult<()> {
        let depth = self.level.depth + 1;
        let mut level = generate_level(&self.config, depth, &mut self.rng)?;
        let start = level
            .grid
            .starting_room()
            .map(|room| room.center())
            .ok_or_else(|| BreakdownError::InvalidState("level has no starting room".to_string()))?;
        self.player.place(&mut level.grid, start);
        self.level = level;
        self.refresh_player_view();

        let healed = self.player.fighter.heal(self.player.fighter.max_hp / 2);
        if healed > 0 {
            let entity = self.player.id;
            self.emit(GameEvent::Healed {
                entity,
                amount: healed,
            });
        }

        info!("Descended to level {}", depth);
        self.emit(GameEvent::Descended { depth });
        Ok(())
    }

    /// Everything a renderer may want to draw: stairs, floor items, NPCs,
    /// then the player on top.
    pub fn drawables(&self) -> Vec<Drawable> {
        let stairs = &self.level.stairs;
        let mut drawables = vec![Drawable {
            position: stairs.position,
            icon: stairs.icon,
            color: stairs.color,
            always_visible: true,
        }];
        drawables.extend(self.level.items.iter().map(|floor| Drawable {
            position: floor.position,
            icon: floor.item.icon,
            color: floor.item.color,
            always_visible: true,
        }));
        drawables.extend(
            self.level
                .characters
                .iter()
                .chain(std::iter::once(&self.player))
                .map(|c| Drawable {
                    position: c.position,
                    icon: c.icon,
                    color: c.color,
                    always_visible: c.always_visible,
                }),
        );
        drawables
    }

    /// Serializes the game. Visibility fields and the RNG are not saved.
    pub fn save_to_json(&self) -> BreakdownResult<String> {
        serde_json::to_string_pretty(self).map_err(BreakdownError::from)
    }

    /// Restores a game saved with [`GameState::save_to_json`].
    pub fn load_from_json(json: &str) -> BreakdownResult<Self> {
        let mut state: GameState = serde_json::from_str(json)?;
        state.restore_runtime();
        Ok(state)
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> BreakdownResult<()> {
        std::fs::write(path, self.save_to_json()?)?;
        Ok(())
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> BreakdownResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::load_from_json(&json)
    }

    /// Rebuilds everything that is derived from positions and the grid.
    fn restore_runtime(&mut self) {
        self.rng = StdRng::seed_from_u64(self.seed.wrapping_add(self.turn));
        self.pathfinder = Pathfinder::new();
        self.events.clear();
        self.level.grid.clear_highlights();
        self.level.rebuild_occupancy(&self.player);
        self.player.reset_fov(&self.level.grid);
        for character in self.level.characters.iter_mut() {
            character.reset_fov(&self.level.grid);
        }
        self.refresh_player_view();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{ItemKind, ScriptedSelector, TerrainKind};

    /// Single open room with a wall border.
    fn arena(width: i32, height: i32) -> Level {
        let mut grid = TileGrid::new(width, height);
        for y in 1..height - 1 {
            for x in 1..width - 1 {
                grid.set_terrain(Position::new(x, y), TerrainKind::Floor);
            }
        }
        Level::new(1, grid, Position::new(width - 2, height - 2))
    }

    #[test]
    fn test_new_game_places_player_in_starting_room() {
        let game = GameState::new(GenerationConfig::for_testing(9)).unwrap();
        let start = game.level.grid.starting_room().unwrap();
        assert_eq!(game.player.position, start.center());
        assert!(game.level.grid.is_occupied(game.player.position));
        assert!(game.level.grid.tile(game.player.position).visible);
        assert!(game.level.grid.tile(game.player.position).explored);
    }

    #[test]
    fn test_character_lookup_includes_player() {
        let mut game = GameState::from_level(arena(10, 10), Position::new(2, 2), 1);
        let miner = game.spawn_enemy(ArchetypeId::RoboMiner, Position::new(5, 5));
        let player = game.player.id;
        assert_eq!(game.character(player).map(|c| c.icon), Some('@'));
        assert_eq!(game.character(miner).map(|c| c.icon), Some('m'));
    }

    #[test]
    fn test_attack_damage_and_no_effect() {
        let mut game = GameState::from_level(arena(10, 10), Position::new(2, 2), 1);
        let miner = game.spawn_enemy(ArchetypeId::RoboMiner, Position::new(3, 2));
        let player = game.player.id;

        // miner power 10 vs player defense 5
        assert_eq!(
            game.attack(miner, player),
            Some(AttackOutcome::Damaged { damage: 5 })
        );
        assert_eq!(game.player.fighter.hp, 145);

        game.player.fighter.defense = 10;
        assert_eq!(game.attack(miner, player), Some(AttackOutcome::NoEffect));
        assert_eq!(game.player.fighter.hp, 145);
        assert!(game
            .events()
            .iter()
            .any(|e| matches!(e, GameEvent::AttackNoEffect { .. })));
    }

    #[test]
    fn test_enemy_death_drops_remains_and_credits_xp() {
        let mut game = GameState::from_level(arena(10, 10), Position::new(2, 2), 1);
        let pos = Position::new(3, 2);
        let miner = game.spawn_enemy(ArchetypeId::RoboMiner, pos);

        game.damage(miner, 500);
        assert!(game.level.character(miner).is_none());
        assert!(!game.level.grid.is_occupied(pos));
        assert_eq!(game.player.fighter.xp, 25);
        let remains = game.level.item_at(pos).map(|i| game.level.items[i].item.kind);
        assert_eq!(remains, Some(ItemKind::RoboMinerRemains));

        game.damage(miner, 500);
        assert_eq!(game.player.fighter.xp, 25);
    }

    #[test]
    fn test_player_death_ends_the_game() {
        let mut game = GameState::from_level(arena(10, 10), Position::new(2, 2), 1);
        let player = game.player.id;
        game.damage(player, 1000);
        assert!(game.is_game_over());
        assert_eq!(game.player.icon, '%');
        assert_eq!(game.player.color, Color::DARK_RED);

        let mut selector = ScriptedSelector::cancelling();
        let outcome = game.process_intent(Intent::Wait, &mut selector).unwrap();
        assert_eq!(outcome, ActionOutcome::NotConsumed);
        assert_eq!(game.turn, 0);
    }

    #[test]
    fn test_drawables_visibility() {
        let mut game = GameState::from_level(arena(30, 10), Position::new(2, 2), 1);
        game.spawn_enemy(ArchetypeId::RoboGuard, Position::new(27, 8));
        let drawables = game.drawables();
        assert_eq!(drawables.last().map(|d| d.icon), Some('@'));

        let guard = drawables.iter().find(|d| d.icon == 'G').unwrap();
        assert!(!guard.should_draw(&game.level.grid));
        let player = drawables.last().unwrap();
        assert!(player.should_draw(&game.level.grid));
    }

    #[test]
    fn test_descend_heals_and_moves_to_new_level() {
        let mut game = GameState::new(GenerationConfig::for_testing(12)).unwrap();
        game.player.fighter.hp = 10;
        game.descend().unwrap();

        assert_eq!(game.depth(), 2);
        assert_eq!(game.player.fighter.hp, 10 + 75);
        let start = game.level.grid.starting_room().unwrap();
        assert_eq!(game.player.position, start.center());
        assert!(game.level.grid.is_occupied(game.player.position));
        assert!(game
            .drain_events()
            .contains(&GameEvent::Descended { depth: 2 }));
    }

    #[test]
    fn test_failed_descent_keeps_player_and_level() {
        let mut game = GameState::new(GenerationConfig::for_testing(12)).unwrap();
        game.player.fighter.hp = 10;
        let position = game.player.position;
        let rooms = game.level.grid.rooms().to_vec();
        game.drain_events();

        game.config.room_min_size = 2;
        assert!(matches!(
            game.descend(),
            Err(BreakdownError::GenerationFailed(_))
        ));
        assert_eq!(game.player.fighter.hp, 10);
        assert_eq!(game.depth(), 1);
        assert_eq!(game.player.position, position);
        assert_eq!(game.level.grid.rooms(), rooms.as_slice());
        assert!(game.events().is_empty());
    }

    #[test]
    fn test_json_round_trip_restores_runtime_state() {
        let mut game = GameState::new(GenerationConfig::for_testing(21)).unwrap();
        game.turn = 7;
        let json = game.save_to_json().unwrap();
        let restored = GameState::load_from_json(&json).unwrap();

        assert_eq!(restored.turn, 7);
        assert_eq!(restored.player.position, game.player.position);
        assert_eq!(restored.level.roster(), game.level.roster());
        assert!(restored.level.grid.is_occupied(restored.player.position));
        for npc in &restored.level.characters {
            assert!(restored.level.grid.is_occupied(npc.position));
            assert!(npc.fov.needs_recompute());
        }
        assert!(!restored.player.fov.needs_recompute());
    }
}
