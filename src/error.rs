//! Error types for loading and advancing a board.
//!
//! Everything here is a load-time or invariant failure. Orders that break a
//! game rule during a round are not errors; see [`crate::game::Rejection`].

use thiserror::Error;

use crate::game::{Coord, PlayerId, UnitId};

/// Errors raised while building a [`crate::game::UnitCatalog`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// The catalog has no unit types.
    #[error("unit catalog is empty")]
    Empty,
    /// More types than a `UnitTypeId` can address.
    #[error("too many unit types: {0} (maximum 255)")]
    TooManyTypes(usize),
    /// Two types share a name.
    #[error("duplicate unit type name '{0}'")]
    DuplicateName(String),
    /// Two types share a symbol.
    #[error("duplicate unit type symbol '{0}'")]
    DuplicateSymbol(char),
    /// Symbols must be printable, and must not clash with grid glyphs.
    #[error("unit type '{name}' has unusable symbol '{symbol}'")]
    BadSymbol {
        /// Type name.
        name: String,
        /// Offending symbol.
        symbol: char,
    },
    /// `max_health` must be at least 1.
    #[error("unit type '{name}' has max_health {max_health} (must be >= 1)")]
    MaxHealth {
        /// Type name.
        name: String,
        /// Offending value.
        max_health: u32,
    },
    /// `initial_health` must be within `1..=max_health`.
    #[error("unit type '{name}' has initial_health {initial} outside 1..={max_health}")]
    InitialHealth {
        /// Type name.
        name: String,
        /// Offending value.
        initial: u32,
        /// Upper bound.
        max_health: u32,
    },
}

/// Errors raised while constructing or advancing a [`crate::game::Board`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BoardError {
    /// Player count outside the number of spawn quadrants.
    #[error("invalid number of players: {0} (must be 2..=4)")]
    PlayerCount(usize),
    /// Board is too small.
    #[error("invalid board dimensions {rows}x{cols} (both must be >= 4)")]
    Dimensions {
        /// Rows requested.
        rows: usize,
        /// Columns requested.
        cols: usize,
    },
    /// Grid dimensions disagree with the parameters.
    #[error("grid is {found_rows}x{found_cols}, expected {rows}x{cols}")]
    GridMismatch {
        /// Expected rows.
        rows: usize,
        /// Expected columns.
        cols: usize,
        /// Rows in the supplied grid.
        found_rows: usize,
        /// Columns in the supplied grid.
        found_cols: usize,
    },
    /// Combat parameters are inconsistent.
    #[error("invalid damage range: damage_min {min} > damage_max {max}")]
    DamageRange {
        /// Lower bound.
        min: u32,
        /// Upper bound.
        max: u32,
    },
    /// A per-player vector has the wrong length.
    #[error("expected {expected} {what}, found {found}")]
    PlayerVector {
        /// What the vector holds.
        what: &'static str,
        /// Number of players.
        expected: usize,
        /// Supplied length.
        found: usize,
    },
    /// Per-type counts do not match the catalog.
    #[error("expected a unit count for each of {expected} unit types, found {found}")]
    TypeCounts {
        /// Number of catalog types.
        expected: usize,
        /// Supplied counts.
        found: usize,
    },
    /// The unit list is neither empty nor complete.
    #[error("read {found} units, expected {expected} (a unit list must be empty or complete)")]
    PartialUnitList {
        /// Units supplied.
        found: usize,
        /// Units required.
        expected: usize,
    },
    /// A supplied unit breaks a board invariant.
    #[error("unit {unit}: {reason}")]
    BadUnit {
        /// Index in the supplied list.
        unit: UnitId,
        /// What is wrong with it.
        reason: String,
    },
    /// A cell carries an owner that is not a player.
    #[error("cell {coord} is owned by unknown player {owner}")]
    BadOwner {
        /// Cell position.
        coord: Coord,
        /// Offending owner.
        owner: PlayerId,
    },
    /// A wall cell carries an owner.
    #[error("wall at {0} cannot be owned")]
    OwnedWall(Coord),
    /// The round counter already reached the round limit.
    #[error("round {round} is not below the round limit {rounds}")]
    RoundLimit {
        /// Current round.
        round: u32,
        /// Limit.
        rounds: u32,
    },
    /// No free cell was left in a spawn quadrant.
    #[error("no free cell left in the spawn quadrant of player {0}")]
    QuadrantFull(PlayerId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_error_display() {
        let err = BoardError::PartialUnitList {
            found: 3,
            expected: 8,
        };
        let text = err.to_string();
        assert!(text.contains("read 3 units"));
        assert!(text.contains("expected 8"));

        let err = BoardError::Dimensions { rows: 3, cols: 10 };
        assert!(err.to_string().contains("3x10"));
    }

    #[test]
    fn test_catalog_error_display() {
        let err = CatalogError::InitialHealth {
            name: "knights".to_string(),
            initial: 0,
            max_health: 200,
        };
        assert!(err.to_string().contains("knights"));
        assert!(err.to_string().contains("1..=200"));
    }
}
