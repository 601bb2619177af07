//! # Breakdown
//!
//! Simulation core of a turn-based, grid-world exploration game set on a
//! failing space station.
//!
//! ## Architecture Overview
//!
//! The crate covers everything that decides *what happens* in a turn and
//! nothing that decides *how it looks*:
//!
//! - **Generation**: procedural levels from either random rectangular rooms
//!   or recursive spatial partitioning, both with connectivity guarantees
//! - **Tile grid**: terrain plus occupancy/explored/visible/highlighted flags
//! - **Visibility**: per-entity shadow-casting field of view
//! - **Pathfinding**: bounded A* over an entity's own view, with a greedy step
//!   fallback
//! - **Turn loop**: player intent, then every NPC behavior in roster order
//!
//! Rendering, menus and message formatting are left to the caller. The state
//! exposes flags, drawables and [`GameEvent`]s for them to consume.

pub mod game;
pub mod generation;
pub mod input;
pub mod utils;

pub use game::*;
pub use generation::*;
pub use input::*;
pub use utils::*;

/// Core error type for the Breakdown simulation.
#[derive(thiserror::Error, Debug)]
pub enum BreakdownError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Game state is invalid
    #[error("Invalid game state: {0}")]
    InvalidState(String),

    /// Action cannot be performed
    #[error("Invalid action: {0}")]
    InvalidAction(String),

    /// Generation failed
    #[error("Generation failed: {0}")]
    GenerationFailed(String),
}

/// Result type used throughout the Breakdown codebase.
pub type BreakdownResult<T> = Result<T, BreakdownError>;

/// Version information for the game.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Game configuration constants.
pub mod config {
    /// Default map width in tiles
    pub const MAP_WIDTH: i32 = 100;

    /// Default map height in tiles
    pub const MAP_HEIGHT: i32 = 80;

    /// Sight radius used by every visibility field
    pub const TORCH_RADIUS: i32 = 10;

    /// Whether the opaque cell bounding a lit area is itself visible
    pub const FOV_LIGHT_WALLS: bool = true;

    /// A* results with this many steps or more are discarded
    pub const PATH_STEP_LIMIT: usize = 25;

    /// Cost of an orthogonal step, in pathfinding cost units
    pub const ORTHOGONAL_STEP_COST: u32 = 100;

    /// Cost of a diagonal step (1.41 x orthogonal)
    pub const DIAGONAL_STEP_COST: u32 = 141;

    /// Maximum number of items a character can carry
    pub const MAX_INVENTORY_SIZE: usize = 26;

    /// Number of turns a behavioral modulator keeps an enemy confused
    pub const CONFUSE_TURNS: u32 = 10;

    /// Impulse grenade blast radius
    pub const GRENADE_RADIUS: f64 = 3.0;

    /// Impulse grenade damage
    pub const GRENADE_DAMAGE: i32 = 30;

    /// Hit points restored by a stimulator
    pub const STIM_HEAL_AMOUNT: i32 = 50;

    /// Damage dealt by a discharge generator
    pub const DISCHARGE_DAMAGE: i32 = 100;

    /// Range of targeted consumables
    pub const ITEM_USING_RANGE: f64 = 5.0;

    /// Range of ranged weapons
    pub const WEAPON_RANGE: f64 = 5.0;

    /// Laser pistol damage
    pub const LASER_PISTOL_DAMAGE: i32 = 20;

    /// Laser rifle damage
    pub const LASER_RIFLE_DAMAGE: i32 = 50;

    /// Maximum enemies placed in one room
    pub const MAX_ROOM_ENEMIES: u32 = 3;

    /// Maximum items placed in one room
    pub const MAX_ROOM_ITEMS: u32 = 3;

    /// Number of recursive BSP splits
    pub const BSP_DEPTH: u32 = 10;

    /// Minimum room size (outer rectangle, walls included)
    pub const ROOM_MIN_SIZE: i32 = 6;

    /// Maximum room size for the random-rooms strategy
    pub const ROOM_MAX_SIZE: i32 = 10;

    /// Placement attempts for the random-rooms strategy
    pub const MAX_ROOM_ATTEMPTS: u32 = 30;

    /// Level depth a new game starts on
    pub const STARTING_DEPTH: u32 = 1;
}
