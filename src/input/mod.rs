//! # Input Module
//!
//! Key mapping and command parsing for player interactions.
//!
//! The simulation only understands [`Intent`]s. Front ends translate their
//! key events through [`InputHandler`]; the headless runner reads a command
//! script through [`parse_script`].

pub mod commands;

pub use commands::*;

use crate::game::{Direction, Intent};

/// Maps keys to player input.
///
/// Movement follows the numeric keypad layout, with `5` as wait.
pub struct InputHandler {
    /// Whether to enable Vi-style movement keys (hjkl, yubn)
    pub vi_keys_enabled: bool,
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl InputHandler {
    /// Creates a new input handler.
    ///
    /// # Examples
    ///
    /// ```
    /// use breakdown::{Direction, InputHandler, PlayerInput};
    ///
    /// let input_handler = InputHandler::new();
    /// assert_eq!(input_handler.map_key('8'), Some(PlayerInput::Move(Direction::North)));
    /// ```
    pub fn new() -> Self {
        Self {
            vi_keys_enabled: false,
        }
    }

    /// Enables the Vi-style movement keys.
    pub fn with_vi_keys(mut self) -> Self {
        self.vi_keys_enabled = true;
        self
    }

    /// Maps a single key press to player input, if it means anything.
    pub fn map_key(&self, key: char) -> Option<PlayerInput> {
        if let Some(direction) = numpad_direction(key) {
            return Some(PlayerInput::Move(direction));
        }

        match key {
            '5' | '.' => Some(PlayerInput::Wait),
            'p' | 'g' | ',' => Some(PlayerInput::PickUp),
            'f' => Some(PlayerInput::Fire),
            '<' => Some(PlayerInput::Descend),
            'i' => Some(PlayerInput::ShowInventory),
            'q' => Some(PlayerInput::Quit),
            _ if self.vi_keys_enabled => vi_direction(key).map(PlayerInput::Move),
            _ => None,
        }
    }

    /// Converts player input to an intent.
    ///
    /// Inputs that only concern the front end (menus, quitting) have none.
    pub fn input_to_intent(&self, input: PlayerInput) -> Option<Intent> {
        match input {
            PlayerInput::Move(direction) => Some(Intent::step(direction)),
            PlayerInput::Wait => Some(Intent::Wait),
            PlayerInput::PickUp => Some(Intent::PickUp),
            PlayerInput::Fire => Some(Intent::Fire),
            PlayerInput::Descend => Some(Intent::Descend),
            PlayerInput::ShowInventory | PlayerInput::Quit => None,
        }
    }
}

/// Player input types that can be processed by the input handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerInput {
    /// Move (or attack) in a direction
    Move(Direction),
    /// Wait for one turn
    Wait,
    /// Pick up the item at the current position
    PickUp,
    /// Fire the equipped weapon
    Fire,
    /// Take the stairs down
    Descend,
    /// Open the inventory menu
    ShowInventory,
    /// Quit the game
    Quit,
}

/// Numeric keypad direction: 8 is north, 3 is south-east.
pub fn numpad_direction(key: char) -> Option<Direction> {
    match key {
        '1' => Some(Direction::Southwest),
        '2' => Some(Direction::South),
        '3' => Some(Direction::Southeast),
        '4' => Some(Direction::West),
        '6' => Some(Direction::East),
        '7' => Some(Direction::Northwest),
        '8' => Some(Direction::North),
        '9' => Some(Direction::Northeast),
        _ => None,
    }
}

fn vi_direction(key: char) -> Option<Direction> {
    match key {
        'h' => Some(Direction::West),
        'j' => Some(Direction::South),
        'k' => Some(Direction::North),
        'l' => Some(Direction::East),
        'y' => Some(Direction::Northwest),
        'u' => Some(Direction::Northeast),
        'b' => Some(Direction::Southwest),
        'n' => Some(Direction::Southeast),
        _ => None,
    }
}
