// Allow unwrap and unreadable literals in tests (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::unreadable_literal))]
//! Skirmish: a deterministic, configurable turn-based grid combat engine.
//!
//! Players command units on a rectangular board. Each round every player
//! submits at most one order per unit; the engine resolves them in a
//! shuffled player order, moving units, resolving attacks, capturing
//! cells and regenerating idle units.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │   CLI / Driver (players, rounds)    │
//! ├─────────────────────────────────────┤
//! │   Snapshot text  │  TOML config     │
//! ├─────────────────────────────────────┤
//! │   Board::next (round resolution)    │
//! ├─────────────────────────────────────┤
//! │   Catalog · Grid · Units · Actions  │
//! └─────────────────────────────────────┘
//! ```
//!
//! All randomness flows through a single caller-supplied generator, so a
//! seed fully determines a game.

pub mod config;
pub mod driver;
pub mod error;
pub mod game;
pub mod snapshot;

pub use config::{ConfigError, GameConfig};
pub use driver::{Game, GameError, GameResult, Player, run_game};
pub use error::{BoardError, CatalogError};

// Re-export key game types at crate root for convenience
pub use game::{
    Action, Board, Coord, Direction, GameParams, Layout, PlayerId, Round, UnitCatalog, UnitId,
};
