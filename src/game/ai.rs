//! # AI Behavior
//!
//! Closed set of per-turn decision strategies for non-player characters.
//!
//! Status effects wrap the active behavior instead of replacing it: a
//! confused character carries its previous behavior boxed inside the
//! `Confused` variant and gets it back verbatim when the effect expires.

use crate::game::{Direction, EntityId, GameEvent, GameState, Position};
use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Behavior of a non-player character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Behavior {
    /// Chases the player once seen and attacks when adjacent
    Aggressive,
    /// Stumbles around at random until `remaining` runs out
    Confused {
        remaining: u32,
        previous: Box<Behavior>,
    },
}

impl Behavior {
    pub fn aggressive() -> Self {
        Behavior::Aggressive
    }

    /// Wraps `previous` in a confusion lasting `turns` turns.
    pub fn confused(previous: Behavior, turns: u32) -> Self {
        Behavior::Confused {
            remaining: turns,
            previous: Box::new(previous),
        }
    }

    pub fn is_confused(&self) -> bool {
        matches!(self, Behavior::Confused { .. })
    }

    /// Runs one turn for `actor` and returns the behavior for the next one.
    ///
    /// The caller takes the behavior out of the character before calling and
    /// stores the returned value back, so a variant can replace itself.
    pub fn take_turn(self, game: &mut GameState, actor: EntityId) -> Behavior {
        match self {
            Behavior::Aggressive => {
                chase_and_attack(game, actor);
                Behavior::Aggressive
            }
            Behavior::Confused {
                remaining,
                previous,
            } => {
                if remaining > 0 {
                    stumble(game, actor);
                    Behavior::Confused {
                        remaining: remaining - 1,
                        previous,
                    }
                } else {
                    if let Some(name) = game.character(actor).map(|c| c.name.clone()) {
                        debug!("{} recovers from confusion", name);
                        game.emit(GameEvent::NoLongerConfused {
                            entity: actor,
                            name,
                        });
                    }
                    *previous
                }
            }
        }
    }
}

fn chase_and_attack(game: &mut GameState, actor: EntityId) {
    game.refresh_fov(actor);

    let player_id = game.player.id;
    let target = game.player.position;
    let Some(npc) = game.character(actor) else {
        return;
    };
    if !npc.fov.is_visible(target) {
        return;
    }

    if npc.distance(target) >= 2.0 {
        let origin = npc.position;
        let step = game.pathfinder().route(&npc.fov, origin, target).first_step(origin);
        if step != Position::origin() {
            game.move_character(actor, step);
        }
    } else if game.player.fighter.hp > 0 {
        game.attack(actor, player_id);
    }
}

fn stumble(game: &mut GameState, actor: EntityId) {
    let directions = Direction::all();
    let direction = directions[game.rng().gen_range(0..directions.len())];
    game.move_character(actor, direction.to_delta());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confusion_wraps_previous_behavior() {
        let confused = Behavior::confused(Behavior::Aggressive, 3);
        assert!(confused.is_confused());
        match confused {
            Behavior::Confused {
                remaining,
                previous,
            } => {
                assert_eq!(remaining, 3);
                assert_eq!(*previous, Behavior::Aggressive);
            }
            Behavior::Aggressive => panic!("expected a confused behavior"),
        }
    }

    #[test]
    fn test_nested_confusion_restores_layer_by_layer() {
        let inner = Behavior::confused(Behavior::Aggressive, 2);
        let outer = Behavior::confused(inner.clone(), 1);
        if let Behavior::Confused { previous, .. } = outer {
            assert_eq!(*previous, inner);
        }
    }

    #[test]
    fn test_behavior_serializes() {
        let behavior = Behavior::confused(Behavior::Aggressive, 7);
        let json = serde_json::to_string(&behavior).unwrap();
        let restored: Behavior = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, behavior);
    }
}
