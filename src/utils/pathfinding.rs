//! # Pathfinding Algorithms
//!
//! Bounded A* over an entity's own view of the grid, with a greedy one-step
//! fallback when no short path is known.

use crate::config;
use crate::game::{Direction, Position};
use crate::utils::direction_towards;
use ::pathfinding::prelude::astar;
use log::trace;

/// A grid-shaped source of passability for path searches.
///
/// Implemented by the live tile grid and by each entity's visibility field,
/// so an entity can plan with what it has seen rather than with global truth.
pub trait CostMap {
    fn in_bounds(&self, pos: Position) -> bool;

    fn is_passable(&self, pos: Position) -> bool;
}

/// How to move towards a goal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Full A* path, excluding the origin and ending on the goal
    Path(Vec<Position>),
    /// Single greedy step offset; `(0, 0)` when already at the goal
    Direct(Position),
}

impl Route {
    /// Offset of the first step from `origin`.
    pub fn first_step(&self, origin: Position) -> Position {
        match self {
            Route::Path(path) => path
                .first()
                .map_or(Position::origin(), |&next| next - origin),
            Route::Direct(delta) => *delta,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Route::Direct(_))
    }
}

/// Bounded A* path planner.
#[derive(Debug, Clone, Copy)]
pub struct Pathfinder {
    /// Paths with this many steps or more are discarded
    pub step_limit: usize,
    pub orthogonal_cost: u32,
    pub diagonal_cost: u32,
}

impl Pathfinder {
    pub fn new() -> Self {
        Self {
            step_limit: config::PATH_STEP_LIMIT,
            orthogonal_cost: config::ORTHOGONAL_STEP_COST,
            diagonal_cost: config::DIAGONAL_STEP_COST,
        }
    }

    pub fn with_step_limit(step_limit: usize) -> Self {
        Self {
            step_limit,
            ..Self::new()
        }
    }

    /// Octile distance in cost units. Never overestimates.
    fn heuristic(&self, from: Position, to: Position) -> u32 {
        let dx = (from.x - to.x).unsigned_abs();
        let dy = (from.y - to.y).unsigned_abs();
        let (long, short) = if dx > dy { (dx, dy) } else { (dy, dx) };
        self.orthogonal_cost * (long - short) + self.diagonal_cost * short
    }

    /// Searches for a path shorter than the step limit.
    ///
    /// The goal itself is always enterable, so an occupied target can be
    /// approached. The search never leaves the square of radius `step_limit`
    /// around the origin, which caps its cost when the goal is unreachable.
    pub fn find_path<M: CostMap>(
        &self,
        map: &M,
        origin: Position,
        goal: Position,
    ) -> Option<Vec<Position>> {
        if origin == goal || !map.in_bounds(goal) {
            return None;
        }

        let bound = self.step_limit as u32;
        let successors = |&pos: &Position| -> Vec<(Position, u32)> {
            Direction::all()
                .into_iter()
                .filter_map(|direction| {
                    let delta = direction.to_delta();
                    let next = pos + delta;
                    if next.chebyshev_distance(origin) > bound || !map.in_bounds(next) {
                        return None;
                    }
                    if next != goal && !map.is_passable(next) {
                        return None;
                    }
                    let cost = if delta.x != 0 && delta.y != 0 {
                        self.diagonal_cost
                    } else {
                        self.orthogonal_cost
                    };
                    Some((next, cost))
                })
                .collect()
        };

        let (mut path, _cost) = astar(
            &origin,
            successors,
            |&pos| self.heuristic(pos, goal),
            |&pos| pos == goal,
        )?;

        // astar includes the start node
        path.remove(0);
        if path.len() < self.step_limit {
            Some(path)
        } else {
            None
        }
    }

    /// Plans a route, falling back to a greedy step when A* gives up.
    ///
    /// # Examples
    ///
    /// ```
    /// use breakdown::{Pathfinder, Position, Route, TileGrid};
    ///
    /// // Solid rock: no path, so the planner steps straight at the goal.
    /// let grid = TileGrid::new(20, 20);
    /// let route = Pathfinder::new().route(&grid, Position::new(2, 2), Position::new(9, 2));
    /// assert_eq!(route, Route::Direct(Position::new(1, 0)));
    /// ```
    pub fn route<M: CostMap>(&self, map: &M, origin: Position, goal: Position) -> Route {
        match self.find_path(map, origin, goal) {
            Some(path) => Route::Path(path),
            None => {
                let step = direction_towards(origin, goal);
                trace!(
                    "No bounded path from {} to {}, stepping {} directly",
                    origin,
                    goal,
                    step
                );
                Route::Direct(step)
            }
        }
    }
}

impl Default for Pathfinder {
    fn default() -> Self {
        Self::new()
    }
}
