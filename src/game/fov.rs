//! # Field of View
//!
//! Per-entity visibility using recursive shadowcasting.
//!
//! Every character owns a [`VisibilityField`]. It is recomputed lazily: a move
//! marks it dirty and the next [`VisibilityField::recompute`] clears the flag.
//! Only the player's field is ever written back into the grid's
//! `visible`/`explored` flags.

use crate::config;
use crate::game::{Position, TileGrid};
use crate::utils::CostMap;
use std::collections::HashSet;

/// Computes the set of positions visible from `origin`.
///
/// The origin is always visible. Opaque cells block sight to the cells behind
/// them; with `light_walls` the blocking cell itself is visible.
pub fn compute_fov<F>(
    origin: Position,
    radius: i32,
    light_walls: bool,
    is_opaque: F,
) -> HashSet<Position>
where
    F: Fn(Position) -> bool,
{
    let mut visible = HashSet::new();
    visible.insert(origin);

    for octant in 0..8 {
        cast_light(
            &mut visible,
            &is_opaque,
            ShadowcastParams {
                origin,
                radius,
                light_walls,
                row: 1,
                start_slope: 1.0,
                end_slope: 0.0,
                octant,
            },
        );
    }

    visible
}

#[derive(Clone, Copy)]
struct ShadowcastParams {
    origin: Position,
    radius: i32,
    light_walls: bool,
    row: i32,
    start_slope: f64,
    end_slope: f64,
    octant: u8,
}

/// Scans one octant row by row, recursing past each run of opaque cells.
fn cast_light<F>(visible: &mut HashSet<Position>, is_opaque: &F, params: ShadowcastParams)
where
    F: Fn(Position) -> bool,
{
    let ShadowcastParams {
        origin,
        radius,
        light_walls,
        row,
        mut start_slope,
        end_slope,
        octant,
    } = params;

    if start_slope < end_slope {
        return;
    }

    let radius_squared = radius * radius;
    let mut next_start_slope = start_slope;

    for distance in row..=radius {
        let dy = -distance;
        let mut blocked = false;

        for dx in -distance..=0 {
            let left_slope = (dx as f64 - 0.5) / (dy as f64 + 0.5);
            let right_slope = (dx as f64 + 0.5) / (dy as f64 - 0.5);

            if start_slope < right_slope {
                continue;
            }
            if end_slope > left_slope {
                break;
            }

            let (mx, my) = transform_octant(dx, dy, octant);
            let pos = Position::new(origin.x + mx, origin.y + my);
            let opaque = is_opaque(pos);

            if dx * dx + dy * dy <= radius_squared && (light_walls || !opaque) {
                visible.insert(pos);
            }

            if blocked {
                if opaque {
                    next_start_slope = right_slope;
                } else {
                    blocked = false;
                    start_slope = next_start_slope;
                }
            } else if opaque && distance < radius {
                blocked = true;
                cast_light(
                    visible,
                    is_opaque,
                    ShadowcastParams {
                        row: distance + 1,
                        start_slope,
                        end_slope: left_slope,
                        ..params
                    },
                );
                next_start_slope = right_slope;
            }
        }

        if blocked {
            break;
        }
    }
}

/// Maps octant-local `(col, row)` offsets to world `(dx, dy)`.
fn transform_octant(col: i32, row: i32, octant: u8) -> (i32, i32) {
    match octant {
        0 => (col, row),
        1 => (row, col),
        2 => (row, -col),
        3 => (col, -row),
        4 => (-col, -row),
        5 => (-row, -col),
        6 => (-row, col),
        _ => (-col, row),
    }
}

/// Visibility and remembered passability of one entity.
#[derive(Debug, Clone)]
pub struct VisibilityField {
    width: i32,
    height: i32,
    radius: i32,
    light_walls: bool,
    visible: Vec<bool>,
    known_passable: Vec<bool>,
    recompute_needed: bool,
}

impl VisibilityField {
    /// Creates a field for the given grid with the standard torch radius.
    pub fn new(grid: &TileGrid) -> Self {
        Self::with_radius(grid, config::TORCH_RADIUS, config::FOV_LIGHT_WALLS)
    }

    /// Creates a field with a custom sight radius.
    ///
    /// Passability is seeded from the grid as it is right now, so the owner
    /// starts out knowing the layout but not where anyone will move.
    pub fn with_radius(grid: &TileGrid, radius: i32, light_walls: bool) -> Self {
        let known_passable = grid.tiles().map(|tile| !tile.is_blocked()).collect();
        Self {
            width: grid.width(),
            height: grid.height(),
            radius,
            light_walls,
            visible: vec![false; (grid.width() * grid.height()) as usize],
            known_passable,
            recompute_needed: true,
        }
    }

    pub fn radius(&self) -> i32 {
        self.radius
    }

    /// Flags the field as stale. Called whenever the owner moves.
    pub fn mark_dirty(&mut self) {
        self.recompute_needed = true;
    }

    pub fn needs_recompute(&self) -> bool {
        self.recompute_needed
    }

    fn index(&self, pos: Position) -> usize {
        assert!(
            CostMap::in_bounds(self, pos),
            "visibility query out of bounds: {}",
            pos
        );
        (pos.y * self.width + pos.x) as usize
    }

    /// Recomputes visibility from `origin` if the field is stale.
    ///
    /// Returns whether a computation actually ran. Cells that become visible
    /// refresh their remembered passability from the grid.
    pub fn recompute(&mut self, grid: &TileGrid, origin: Position) -> bool {
        if !self.recompute_needed {
            return false;
        }

        let lit = compute_fov(origin, self.radius, self.light_walls, |pos| {
            grid.get(pos).map_or(true, |tile| !tile.transparent())
        });

        self.visible.iter_mut().for_each(|cell| *cell = false);
        for pos in lit {
            if !grid.in_bounds(pos) {
                continue;
            }
            let index = self.index(pos);
            self.visible[index] = true;
            self.known_passable[index] = !grid.is_blocked(pos);
        }

        self.recompute_needed = false;
        true
    }

    /// Whether a position is currently visible.
    ///
    /// Must not be called between a move and the following recompute.
    pub fn is_visible(&self, pos: Position) -> bool {
        debug_assert!(
            !self.recompute_needed,
            "stale visibility read; recompute after moving"
        );
        if !CostMap::in_bounds(self, pos) {
            return false;
        }
        self.visible[self.index(pos)]
    }

    /// All currently visible positions, row-major.
    pub fn visible_positions(&self) -> Vec<Position> {
        (0..self.height)
            .flat_map(|y| (0..self.width).map(move |x| Position::new(x, y)))
            .filter(|&pos| self.visible[(pos.y * self.width + pos.x) as usize])
            .collect()
    }

    /// Writes this field into the grid's `visible` flags and marks every
    /// visible tile explored. Only the player's field is applied.
    pub fn apply_to_grid(&self, grid: &mut TileGrid) {
        for (tile, &visible) in grid.tiles_mut().zip(self.visible.iter()) {
            tile.visible = visible;
            if visible {
                tile.explored = true;
            }
        }
    }
}

impl Default for VisibilityField {
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            radius: config::TORCH_RADIUS,
            light_walls: config::FOV_LIGHT_WALLS,
            visible: Vec::new(),
            known_passable: Vec::new(),
            recompute_needed: true,
        }
    }
}

impl CostMap for VisibilityField {
    fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height
    }

    fn is_passable(&self, pos: Position) -> bool {
        self.known_passable[self.index(pos)]
    }
}
