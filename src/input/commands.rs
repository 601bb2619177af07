//! # Command Scripts
//!
//! Parses whitespace-separated command scripts for headless play.
//!
//! | token   | meaning                               |
//! |---------|---------------------------------------|
//! | `1`-`9` | numpad move, `5` waits                |
//! | `a<d>`  | attack in numpad direction `d`        |
//! | `p`     | pick up                               |
//! | `u<n>`  | use inventory item `n`                |
//! | `d<n>`  | drop inventory item `n`               |
//! | `e<n>`  | equip inventory item `n`              |
//! | `f`     | fire the equipped weapon              |
//! | `<`     | descend                               |
//! | `~x,y`  | targeting: hover over a tile          |
//! | `@x,y`  | targeting: select a tile              |
//! | `!`     | targeting: cancel                     |
//!
//! Targeting tokens belong to the intent before them and are replayed to it
//! through a [`ScriptedSelector`].

use crate::game::{Intent, Position, ScriptedSelector, TargetInput};
use crate::input::numpad_direction;
use crate::{BreakdownError, BreakdownResult};

/// One scripted turn: an intent and the targeting inputs it will be fed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub intent: Intent,
    pub targets: Vec<TargetInput>,
}

impl Command {
    pub fn new(intent: Intent) -> Self {
        Self {
            intent,
            targets: Vec::new(),
        }
    }

    /// Selector that replays this command's targeting inputs.
    pub fn selector(&self) -> ScriptedSelector {
        ScriptedSelector::new(self.targets.iter().copied())
    }
}

/// Parses a command script.
///
/// # Examples
///
/// ```
/// use breakdown::{parse_script, Intent, Position, TargetInput};
///
/// let commands = parse_script("8 u2 @4,5 <").unwrap();
/// assert_eq!(commands.len(), 3);
/// assert_eq!(commands[1].intent, Intent::UseItem(2));
/// assert_eq!(commands[1].targets, vec![TargetInput::Select(Position::new(4, 5))]);
/// ```
pub fn parse_script(script: &str) -> BreakdownResult<Vec<Command>> {
    let mut commands: Vec<Command> = Vec::new();
    for token in script.split_whitespace() {
        if let Some(input) = parse_target(token)? {
            let Some(command) = commands.last_mut() else {
                return Err(invalid(token, "targeting input before any command"));
            };
            command.targets.push(input);
            continue;
        }
        commands.push(Command::new(parse_intent(token)?));
    }
    Ok(commands)
}

fn parse_target(token: &str) -> BreakdownResult<Option<TargetInput>> {
    if token == "!" {
        return Ok(Some(TargetInput::Cancel));
    }
    if let Some(rest) = token.strip_prefix('@') {
        return Ok(Some(TargetInput::Select(parse_position(token, rest)?)));
    }
    if let Some(rest) = token.strip_prefix('~') {
        return Ok(Some(TargetInput::Hover(parse_position(token, rest)?)));
    }
    Ok(None)
}

fn parse_intent(token: &str) -> BreakdownResult<Intent> {
    match token {
        "5" => return Ok(Intent::Wait),
        "p" => return Ok(Intent::PickUp),
        "f" => return Ok(Intent::Fire),
        "<" => return Ok(Intent::Descend),
        _ => {}
    }

    let mut chars = token.chars();
    let Some(head) = chars.next() else {
        return Err(invalid(token, "empty command"));
    };
    let rest = chars.as_str();

    if rest.is_empty() {
        return numpad_direction(head)
            .map(Intent::step)
            .ok_or_else(|| invalid(token, "unknown command"));
    }

    match head {
        'a' => {
            let mut direction = rest.chars();
            match (direction.next().and_then(numpad_direction), direction.next()) {
                (Some(direction), None) => {
                    let delta = direction.to_delta();
                    Ok(Intent::Attack {
                        dx: delta.x,
                        dy: delta.y,
                    })
                }
                _ => Err(invalid(token, "attack needs a numpad direction")),
            }
        }
        'u' => Ok(Intent::UseItem(parse_index(token, rest)?)),
        'd' => Ok(Intent::Drop(parse_index(token, rest)?)),
        'e' => Ok(Intent::Equip(parse_index(token, rest)?)),
        _ => Err(invalid(token, "unknown command")),
    }
}

fn parse_index(token: &str, digits: &str) -> BreakdownResult<usize> {
    digits
        .parse()
        .map_err(|_| invalid(token, "expected an inventory index"))
}

fn parse_position(token: &str, coords: &str) -> BreakdownResult<Position> {
    let parsed = coords
        .split_once(',')
        .and_then(|(x, y)| Some(Position::new(x.trim().parse().ok()?, y.trim().parse().ok()?)));
    parsed.ok_or_else(|| invalid(token, "expected x,y"))
}

fn invalid(token: &str, reason: &str) -> BreakdownError {
    BreakdownError::InvalidAction(format!("'{}': {}", token, reason))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movement_and_simple_commands() {
        let commands = parse_script("8 2 5 p f <").unwrap();
        let intents: Vec<Intent> = commands.iter().map(|c| c.intent).collect();
        assert_eq!(
            intents,
            vec![
                Intent::Move { dx: 0, dy: -1 },
                Intent::Move { dx: 0, dy: 1 },
                Intent::Wait,
                Intent::PickUp,
                Intent::Fire,
                Intent::Descend,
            ]
        );
        assert!(commands.iter().all(|c| c.targets.is_empty()));
    }

    #[test]
    fn test_indexed_commands() {
        let commands = parse_script("u0 d12 e3 a9").unwrap();
        assert_eq!(commands[0].intent, Intent::UseItem(0));
        assert_eq!(commands[1].intent, Intent::Drop(12));
        assert_eq!(commands[2].intent, Intent::Equip(3));
        assert_eq!(commands[3].intent, Intent::Attack { dx: 1, dy: -1 });
    }

    #[test]
    fn test_targets_attach_to_previous_command() {
        let commands = parse_script("u2 ~3,4 @ 5,6 !").unwrap_err();
        assert!(matches!(commands, BreakdownError::InvalidAction(_)));

        let commands = parse_script("u2 ~3,4 @5,6 ! 6").unwrap();
        assert_eq!(commands.len(), 2);
        assert_eq!(
            commands[0].targets,
            vec![
                TargetInput::Hover(Position::new(3, 4)),
                TargetInput::Select(Position::new(5, 6)),
                TargetInput::Cancel,
            ]
        );
        assert_eq!(commands[0].selector().remaining(), 3);
    }

    #[test]
    fn test_rejects_malformed_tokens() {
        assert!(parse_script("@1,1").is_err());
        assert!(parse_script("x").is_err());
        assert!(parse_script("0").is_err());
        assert!(parse_script("uX").is_err());
        assert!(parse_script("a5").is_err());
        assert!(parse_script("f @1").is_err());
        assert!(parse_script("").unwrap().is_empty());
    }
}
