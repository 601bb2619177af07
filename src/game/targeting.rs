//! # Targeting
//!
//! Interactive tile and enemy selection for targeted effects.
//!
//! The simulation never blocks waiting for a choice. A [`TargetSelector`]
//! yields one input per poll (a frame, for an interactive front end) and
//! every path out of a [`TargetingSession`] clears the highlighted line.

use crate::game::{EntityId, GameEvent, GameState, Position, TileGrid};
use crate::utils::bresenham_line;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// One poll of the targeting input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetInput {
    /// Cursor is over a tile; highlight the line to it
    Hover(Position),
    /// Tile chosen
    Select(Position),
    /// Right-click or escape
    Cancel,
}

/// Supplies targeting input, one poll at a time.
pub trait TargetSelector {
    fn poll(&mut self) -> TargetInput;
}

/// Replays a fixed list of inputs, then cancels forever.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSelector {
    inputs: VecDeque<TargetInput>,
}

impl ScriptedSelector {
    pub fn new(inputs: impl IntoIterator<Item = TargetInput>) -> Self {
        Self {
            inputs: inputs.into_iter().collect(),
        }
    }

    /// A selector that cancels on the first poll.
    pub fn cancelling() -> Self {
        Self::default()
    }

    pub fn push(&mut self, input: TargetInput) {
        self.inputs.push_back(input);
    }

    pub fn remaining(&self) -> usize {
        self.inputs.len()
    }
}

impl TargetSelector for ScriptedSelector {
    fn poll(&mut self) -> TargetInput {
        self.inputs.pop_front().unwrap_or(TargetInput::Cancel)
    }
}

/// Why a selected tile was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetRejection {
    OutsideMap,
    NotVisible,
    OutOfRange,
    NoEnemy,
}

impl std::fmt::Display for TargetRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TargetRejection::OutsideMap => write!(f, "outside the map"),
            TargetRejection::NotVisible => write!(f, "not in view"),
            TargetRejection::OutOfRange => write!(f, "too far away"),
            TargetRejection::NoEnemy => write!(f, "no enemy there"),
        }
    }
}

/// A tile-picking session anchored at the shooter's position.
#[derive(Debug, Clone)]
pub struct TargetingSession {
    origin: Position,
    max_range: Option<f64>,
    highlighted: Vec<Position>,
}

impl TargetingSession {
    pub fn new(origin: Position, max_range: Option<f64>) -> Self {
        Self {
            origin,
            max_range,
            highlighted: Vec::new(),
        }
    }

    fn clear(&mut self, grid: &mut TileGrid) {
        for pos in self.highlighted.drain(..) {
            grid.set_highlighted(pos, false);
        }
    }

    /// Highlights the line from the origin to `cursor`, replacing the
    /// previous one.
    pub fn hover(&mut self, grid: &mut TileGrid, cursor: Position) {
        self.clear(grid);
        for pos in bresenham_line(self.origin, cursor) {
            if grid.in_bounds(pos) {
                grid.set_highlighted(pos, true);
                self.highlighted.push(pos);
            }
        }
    }

    /// Validates a chosen tile. Highlights are cleared either way.
    pub fn select(
        &mut self,
        grid: &mut TileGrid,
        cursor: Position,
    ) -> Result<Position, TargetRejection> {
        self.clear(grid);
        if !grid.in_bounds(cursor) {
            return Err(TargetRejection::OutsideMap);
        }
        if !grid.tile(cursor).visible {
            return Err(TargetRejection::NotVisible);
        }
        if let Some(range) = self.max_range {
            if self.origin.euclidean_distance(cursor) > range {
                return Err(TargetRejection::OutOfRange);
            }
        }
        Ok(cursor)
    }

    /// Abandons the session, clearing highlights.
    pub fn cancel(&mut self, grid: &mut TileGrid) {
        self.clear(grid);
    }
}

/// Whether every tile strictly between `from` and `to` is unblocked.
pub fn is_targetable(grid: &TileGrid, from: Position, to: Position) -> bool {
    let line = bresenham_line(from, to);
    line.iter()
        .filter(|&&pos| pos != from && pos != to)
        .all(|&pos| !grid.is_blocked(pos))
}

impl GameState {
    /// Asks the selector for a visible tile, optionally within `max_range`
    /// of the player. Returns `None` when the selector cancels.
    pub fn pick_tile(
        &mut self,
        selector: &mut dyn TargetSelector,
        max_range: Option<f64>,
    ) -> Option<Position> {
        let mut session = TargetingSession::new(self.player.position, max_range);
        loop {
            match selector.poll() {
                TargetInput::Hover(cursor) => session.hover(&mut self.level.grid, cursor),
                TargetInput::Select(cursor) => {
                    match session.select(&mut self.level.grid, cursor) {
                        Ok(pos) => return Some(pos),
                        Err(reason) => self.emit(GameEvent::TargetRejected { reason }),
                    }
                }
                TargetInput::Cancel => {
                    session.cancel(&mut self.level.grid);
                    self.emit(GameEvent::TargetingCancelled);
                    return None;
                }
            }
        }
    }

    /// Picks tiles until one holds a non-player character or the selector
    /// cancels.
    pub fn pick_enemy(
        &mut self,
        selector: &mut dyn TargetSelector,
        max_range: Option<f64>,
    ) -> Option<EntityId> {
        loop {
            let pos = self.pick_tile(selector, max_range)?;
            match self.level.character_at(pos) {
                Some(enemy) => return Some(enemy.id),
                None => self.emit(GameEvent::TargetRejected {
                    reason: TargetRejection::NoEnemy,
                }),
            }
        }
    }
}
