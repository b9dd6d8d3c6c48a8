//! # Delve
//!
//! Procedural level generation core for a turn-based grid roguelike.
//!
//! ## Architecture Overview
//!
//! Delve generates playable world levels and proves every one of them is
//! fully traversable before handing it to gameplay. The crate is organized
//! around a small number of cooperating pieces:
//!
//! - **Game Model**: Tiles, grids, levels, and the session-scoped level cache
//! - **Generation System**: Theme strategies (dungeon, cave, town), corridor
//!   routing, connectivity validation and repair, door placement
//! - **Determinism**: Every level is a pure function of the session seed,
//!   the depth, and the generation parameters
//!
//! Rendering, entities, AI, and save formats are collaborators outside this
//! crate; levels expose read access to all tile state plus narrow mutation
//! hooks (door toggling, resource removal) for them.

pub mod game;
pub mod generation;

pub use game::*;
pub use generation::*;

/// Core error type for the Delve generation engine.
#[derive(thiserror::Error, Debug)]
pub enum DelveError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Configuration values are outside sane bounds; never retried
    #[error("Invalid theme parameters: {0}")]
    InvalidThemeParameters(String),

    /// A theme builder could not reach a minimally viable layout within
    /// its attempt budget; retried with a perturbed sub-seed
    #[error("Generation attempts exhausted: {0}")]
    AttemptsExhausted(String),

    /// Connectivity repair could not achieve full reachability; retried
    /// with a perturbed sub-seed
    #[error("Connectivity repair failed with {components} disconnected components remaining")]
    RepairFailed { components: usize },

    /// All regeneration retries for a depth were exhausted; fatal
    #[error("Generation failed: {0}")]
    GenerationFailed(String),
}

/// Result type used throughout the Delve codebase.
pub type DelveResult<T> = Result<T, DelveError>;

/// Version information for the crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
