//! Integration tests for descending the station's stairs.

use breakdown::{
    ActionOutcome, GameEvent, GameState, GenerationConfig, Intent, Position, ScriptedSelector,
};

/// Teleports the player, keeping tile occupancy consistent.
fn put_player(game: &mut GameState, pos: Position) {
    let old = game.player.position;
    game.level.grid.set_occupied(old, false);
    game.player.place(&mut game.level.grid, pos);
    game.refresh_player_view();
}

#[test]
fn test_stairs_sit_in_the_last_room() {
    let game = GameState::new(GenerationConfig::for_testing(98765)).expect("new game");
    let last = game.level.grid.rooms().last().expect("rooms");
    assert_eq!(game.level.stairs.position, last.center());
    assert!(game.level.grid.is_walkable(game.level.stairs.position));
}

#[test]
fn test_descend_requires_standing_on_stairs() {
    let mut game = GameState::new(GenerationConfig::for_testing(98765)).expect("new game");
    let stairs = game.level.stairs.position;
    if game.player.position == stairs {
        return;
    }

    let mut selector = ScriptedSelector::cancelling();
    let outcome = game
        .process_intent(Intent::Descend, &mut selector)
        .expect("descend");
    assert_eq!(outcome, ActionOutcome::NotConsumed);
    assert_eq!(game.depth(), 1);
    assert_eq!(game.turn, 0);
    assert!(game.events().contains(&GameEvent::NotOnStairs));
}

#[test]
fn test_descend_generates_next_level() {
    let mut game = GameState::new(GenerationConfig::for_testing(4242)).expect("new game");
    let first_rooms = game.level.grid.rooms().to_vec();
    game.player.fighter.hp = 30;

    let stairs = game.level.stairs.position;
    put_player(&mut game, stairs);

    let mut selector = ScriptedSelector::cancelling();
    let outcome = game
        .resolve_intent(Intent::Descend, &mut selector)
        .expect("descend");
    assert_eq!(outcome, ActionOutcome::Consumed);

    assert_eq!(game.depth(), 2);
    assert_eq!(game.level.depth, 2);
    assert_ne!(game.level.grid.rooms(), first_rooms.as_slice());
    assert_eq!(game.player.fighter.hp, 30 + game.player.fighter.max_hp / 2);

    let start = game.level.grid.starting_room().expect("starting room");
    assert_eq!(game.player.position, start.center());
    assert!(game.level.grid.tile(game.player.position).visible);
    assert!(game
        .events()
        .iter()
        .any(|e| matches!(e, GameEvent::Healed { amount: 75, .. })));
}

#[test]
fn test_repeated_descent() {
    let mut game = GameState::new(GenerationConfig::for_testing(7)).expect("new game");
    let mut selector = ScriptedSelector::cancelling();

    for depth in 2..=4 {
        let stairs = game.level.stairs.position;
        put_player(&mut game, stairs);
        let turn = game.turn;
        game.process_intent(Intent::Descend, &mut selector)
            .expect("descend");
        assert_eq!(game.depth(), depth);
        assert_eq!(game.turn, turn + 1);
        assert!(game
            .drain_events()
            .contains(&GameEvent::Descended { depth }));
        if game.is_game_over() {
            break;
        }
    }
}

#[test]
fn test_stairs_stay_drawable_once_explored() {
    let mut game = GameState::new(GenerationConfig::for_testing(55)).expect("new game");
    let stairs = game.level.stairs.position;
    game.level.grid.tile_mut(stairs).explored = true;
    game.level.grid.tile_mut(stairs).visible = false;

    let drawable = game
        .drawables()
        .into_iter()
        .find(|d| d.position == stairs && d.icon == '<')
        .expect("stairs drawable");
    assert!(drawable.always_visible);
    assert!(drawable.should_draw(&game.level.grid));
}
