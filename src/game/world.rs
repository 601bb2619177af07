//! # Tile Grid
//!
//! Fixed-size grid of tiles with immutable-by-kind terrain and mutable
//! occupancy/explored/visible/highlighted flags.
//!
//! One grid exists per level. Entities never hold references into it: they
//! store a [`Position`] and every mutation goes through grid methods, which
//! keep the occupancy flags consistent.

use crate::game::{Color, Position};
use crate::generation::Room;
use crate::utils::CostMap;
use serde::{Deserialize, Serialize};

/// Kinds of terrain a tile can have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerrainKind {
    Floor,
    Wall,
}

/// Static properties shared by every tile of one terrain kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerrainProperties {
    pub title: &'static str,
    pub walkable: bool,
    pub transparent: bool,
    /// Colour while in the player's view
    pub lit_color: Color,
    /// Colour once explored but out of view
    pub dark_color: Color,
    /// Colour while highlighted by targeting
    pub highlight_color: Color,
}

const FLOOR: TerrainProperties = TerrainProperties {
    title: "floor",
    walkable: true,
    transparent: true,
    lit_color: Color::new(180, 155, 58),
    dark_color: Color::new(55, 46, 133),
    highlight_color: Color::new(105, 150, 211),
};

const WALL: TerrainProperties = TerrainProperties {
    title: "metal wall",
    walkable: false,
    transparent: false,
    lit_color: Color::new(148, 122, 23),
    dark_color: Color::new(22, 7, 115),
    highlight_color: Color::new(67, 128, 211),
};

impl TerrainKind {
    /// Looks up the shared properties for this terrain kind.
    pub fn properties(self) -> &'static TerrainProperties {
        match self {
            TerrainKind::Floor => &FLOOR,
            TerrainKind::Wall => &WALL,
        }
    }

    pub fn is_walkable(self) -> bool {
        self.properties().walkable
    }

    pub fn is_transparent(self) -> bool {
        self.properties().transparent
    }
}

/// A single cell of the grid.
///
/// Terrain-derived properties are read through [`TerrainKind::properties`],
/// so changing the kind changes walkability, transparency and colours in one
/// assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub x: i32,
    pub y: i32,
    terrain: TerrainKind,
    /// A path-blocking entity stands here
    pub occupied: bool,
    /// Has ever been in the player's view
    pub explored: bool,
    /// Is in the player's view right now
    pub visible: bool,
    /// Part of the current targeting line
    pub highlighted: bool,
}

impl Tile {
    /// Creates a wall tile at the given coordinates.
    pub fn new(x: i32, y: i32) -> Self {
        Self {
            x,
            y,
            terrain: TerrainKind::Wall,
            occupied: false,
            explored: false,
            visible: false,
            highlighted: false,
        }
    }

    pub fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }

    pub fn terrain(&self) -> TerrainKind {
        self.terrain
    }

    pub fn walkable(&self) -> bool {
        self.terrain.is_walkable()
    }

    pub fn transparent(&self) -> bool {
        self.terrain.is_transparent()
    }

    /// A tile is blocked iff its terrain is not walkable or something stands on it.
    pub fn is_blocked(&self) -> bool {
        !self.walkable() || self.occupied
    }

    /// Colour the renderer should use for this tile.
    pub fn display_color(&self) -> Color {
        if !self.explored {
            return Color::BLACK;
        }

        let properties = self.terrain.properties();
        if self.visible {
            if self.highlighted {
                properties.highlight_color
            } else {
                properties.lit_color
            }
        } else {
            properties.dark_color
        }
    }
}

/// Fixed-size 2D grid of tiles plus the rooms generated on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileGrid {
    width: i32,
    height: i32,
    tiles: Vec<Tile>,
    rooms: Vec<Room>,
    starting_room: Option<usize>,
}

impl TileGrid {
    /// Creates a grid where every tile is wall.
    ///
    /// # Examples
    ///
    /// ```
    /// use breakdown::{Position, TerrainKind, TileGrid};
    ///
    /// let grid = TileGrid::new(20, 10);
    /// assert_eq!(grid.tile(Position::new(3, 3)).terrain(), TerrainKind::Wall);
    /// assert!(grid.is_blocked(Position::new(3, 3)));
    /// ```
    pub fn new(width: i32, height: i32) -> Self {
        assert!(width > 0 && height > 0, "grid dimensions must be positive");

        let mut tiles = Vec::with_capacity((width * height) as usize);
        for y in 0..height {
            for x in 0..width {
                tiles.push(Tile::new(x, y));
            }
        }

        Self {
            width,
            height,
            tiles,
            rooms: Vec::new(),
            starting_room: None,
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Checks whether a position lies inside the grid.
    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height
    }

    /// Row-major index of a position.
    ///
    /// # Panics
    ///
    /// Panics when the position is outside the grid. Callers are expected to
    /// stay in bounds; an out-of-range access is a bug, not a game event.
    pub fn index(&self, pos: Position) -> usize {
        assert!(
            self.in_bounds(pos),
            "grid access out of bounds: {} on {}x{} grid",
            pos,
            self.width,
            self.height
        );
        (pos.y * self.width + pos.x) as usize
    }

    /// Gets the tile at a position. Panics when out of bounds.
    pub fn tile(&self, pos: Position) -> &Tile {
        &self.tiles[self.index(pos)]
    }

    /// Gets the tile at a position mutably. Panics when out of bounds.
    pub fn tile_mut(&mut self, pos: Position) -> &mut Tile {
        let index = self.index(pos);
        &mut self.tiles[index]
    }

    /// Gets the tile at a position, or `None` outside the grid.
    pub fn get(&self, pos: Position) -> Option<&Tile> {
        if self.in_bounds(pos) {
            Some(self.tile(pos))
        } else {
            None
        }
    }

    /// Iterates over every tile in row-major order.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }

    pub fn tiles_mut(&mut self) -> impl Iterator<Item = &mut Tile> {
        self.tiles.iter_mut()
    }

    /// Changes the terrain kind of a tile.
    pub fn set_terrain(&mut self, pos: Position, kind: TerrainKind) {
        self.tile_mut(pos).terrain = kind;
    }

    pub fn is_walkable(&self, pos: Position) -> bool {
        self.tile(pos).walkable()
    }

    pub fn is_transparent(&self, pos: Position) -> bool {
        self.tile(pos).transparent()
    }

    pub fn is_occupied(&self, pos: Position) -> bool {
        self.tile(pos).occupied
    }

    /// `!walkable || occupied` for the tile at `pos`.
    pub fn is_blocked(&self, pos: Position) -> bool {
        self.tile(pos).is_blocked()
    }

    pub fn set_occupied(&mut self, pos: Position, occupied: bool) {
        self.tile_mut(pos).occupied = occupied;
    }

    /// Moves an occupant from one tile to another in a single step.
    ///
    /// Both positions are validated before anything is written, so a failed
    /// bounds check leaves the grid untouched.
    pub fn relocate_occupant(&mut self, from: Position, to: Position) {
        let from_index = self.index(from);
        let to_index = self.index(to);
        self.tiles[from_index].occupied = false;
        self.tiles[to_index].occupied = true;
    }

    /// Clears the occupied flag on every tile.
    pub fn clear_occupancy(&mut self) {
        for tile in &mut self.tiles {
            tile.occupied = false;
        }
    }

    pub fn set_highlighted(&mut self, pos: Position, highlighted: bool) {
        self.tile_mut(pos).highlighted = highlighted;
    }

    /// Removes every targeting highlight.
    pub fn clear_highlights(&mut self) {
        for tile in &mut self.tiles {
            tile.highlighted = false;
        }
    }

    /// Positions currently highlighted, in row-major order.
    pub fn highlighted_positions(&self) -> Vec<Position> {
        self.tiles
            .iter()
            .filter(|tile| tile.highlighted)
            .map(Tile::position)
            .collect()
    }

    /// Carves the interior of a room to floor. The outer ring stays wall.
    pub fn carve_room(&mut self, room: &Room) {
        for pos in room.floor_positions() {
            self.set_terrain(pos, TerrainKind::Floor);
        }
    }

    /// Carves a horizontal corridor between two x coordinates (inclusive).
    pub fn carve_horizontal(&mut self, x1: i32, x2: i32, y: i32) {
        for x in x1.min(x2)..=x1.max(x2) {
            self.set_terrain(Position::new(x, y), TerrainKind::Floor);
        }
    }

    /// Carves a vertical corridor between two y coordinates (inclusive).
    pub fn carve_vertical(&mut self, y1: i32, y2: i32, x: i32) {
        for y in y1.min(y2)..=y1.max(y2) {
            self.set_terrain(Position::new(x, y), TerrainKind::Floor);
        }
    }

    /// Number of tiles with the given terrain.
    pub fn count_terrain(&self, kind: TerrainKind) -> usize {
        self.tiles.iter().filter(|tile| tile.terrain == kind).count()
    }

    /// Rooms in generation order.
    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    /// Registers a generated room.
    pub fn add_room(&mut self, room: Room) {
        self.rooms.push(room);
    }

    /// The room the player starts in, once one has been chosen.
    pub fn starting_room(&self) -> Option<&Room> {
        self.starting_room.and_then(|index| self.rooms.get(index))
    }

    pub fn starting_room_index(&self) -> Option<usize> {
        self.starting_room
    }

    /// Chooses the starting room by index into [`TileGrid::rooms`].
    pub fn set_starting_room(&mut self, index: usize) {
        assert!(index < self.rooms.len(), "starting room index out of range");
        self.starting_room = Some(index);
    }
}

impl CostMap for TileGrid {
    fn in_bounds(&self, pos: Position) -> bool {
        TileGrid::in_bounds(self, pos)
    }

    fn is_passable(&self, pos: Position) -> bool {
        !self.is_blocked(pos)
    }
}
