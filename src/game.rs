//! Game layer for Skirmish.
//!
//! Implements the round rules:
//! - Unit type catalog loaded once per game
//! - Grid of cells with terrain, ownership and occupancy
//! - Per-player order queues
//! - Round resolution: movement, combat, capture, regeneration, scoring

mod action;
mod board;
mod catalog;
mod grid;
mod invariants;
mod unit;

pub use action::{Action, ActionParseError, Order, END_OF_ORDERS};
pub use board::{
    Board, DamageRange, GameParams, Layout, Rejection, Round, RoundEvent, UnitRecord,
    MAX_PLAYERS, MIN_DIMENSION, MIN_PLAYERS,
};
pub use catalog::{UnitCatalog, UnitTypeDescriptor, UnitTypeId};
pub use grid::{Cell, Coord, Direction, Grid, Quadrant, Terrain};
pub use invariants::{assert_invariants, check_invariants, InvariantViolation};
pub use unit::{PlayerId, Unit, UnitId, UnitSet};
