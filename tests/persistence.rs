//! Save/load round trips through the file system.

use breakdown::{
    BreakdownError, Behavior, GameState, GenerationConfig, Intent, Position, ScriptedSelector,
};
use tempfile::TempDir;

fn play_waits(game: &mut GameState, turns: usize) {
    let mut selector = ScriptedSelector::cancelling();
    for _ in 0..turns {
        game.process_intent(Intent::Wait, &mut selector).unwrap();
    }
}

fn npc_positions(game: &GameState) -> Vec<Position> {
    game.level.characters.iter().map(|c| c.position).collect()
}

#[test]
fn test_save_and_load_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("station.json");

    let mut game = GameState::new(GenerationConfig::for_testing(606)).unwrap();
    play_waits(&mut game, 3);
    game.save_to_file(&path).unwrap();
    assert!(path.exists());

    let loaded = GameState::load_from_file(&path).unwrap();
    assert_eq!(loaded.seed, 606);
    assert_eq!(loaded.turn, 3);
    assert_eq!(loaded.depth(), game.depth());
    assert_eq!(loaded.player.id, game.player.id);
    assert_eq!(loaded.player.position, game.player.position);
    assert_eq!(loaded.player.fighter, game.player.fighter);
    assert_eq!(loaded.player.inventory.len(), game.player.inventory.len());
    assert_eq!(loaded.level.roster(), game.level.roster());
    assert_eq!(loaded.level.items.len(), game.level.items.len());
    assert!(loaded.events().is_empty());
}

#[test]
fn test_loaded_games_continue_identically() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("branch.json");

    let mut game = GameState::new(GenerationConfig::for_testing(17)).unwrap();
    let first = game.level.characters.first().map(|c| c.id);
    if let Some(npc) = first.and_then(|id| game.level.character_mut(id)) {
        npc.ai = Some(Behavior::confused(Behavior::Aggressive, 5));
    }
    game.save_to_file(&path).unwrap();

    let mut a = GameState::load_from_file(&path).unwrap();
    let mut b = GameState::load_from_file(&path).unwrap();
    play_waits(&mut a, 6);
    play_waits(&mut b, 6);

    assert_eq!(npc_positions(&a), npc_positions(&b));
    assert_eq!(a.player.fighter.hp, b.player.fighter.hp);
    assert_eq!(a.turn, 6);
}

#[test]
fn test_visibility_is_rebuilt_on_load() {
    let game = GameState::new(GenerationConfig::for_testing(23)).unwrap();
    let json = game.save_to_json().unwrap();
    let loaded = GameState::load_from_json(&json).unwrap();

    assert!(loaded.level.grid.tile(loaded.player.position).visible);
    assert!(loaded.player.fov.is_visible(loaded.player.position));
    assert!(loaded.level.grid.highlighted_positions().is_empty());
    for npc in &loaded.level.characters {
        assert!(loaded.level.grid.is_occupied(npc.position));
    }
}

#[test]
fn test_load_errors() {
    let dir = TempDir::new().unwrap();

    let missing = GameState::load_from_file(dir.path().join("missing.json"));
    assert!(matches!(missing, Err(BreakdownError::Io(_))));

    let corrupt = dir.path().join("corrupt.json");
    std::fs::write(&corrupt, "{ not a save").unwrap();
    let result = GameState::load_from_file(&corrupt);
    assert!(matches!(result, Err(BreakdownError::Serde(_))));
}
