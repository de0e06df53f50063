//! Board invariants - sanity checks that detect resolver bugs.
//!
//! These must hold after construction and after every round. A violation
//! means the resolver itself is broken, never that a player misbehaved.

use crate::game::{Board, Terrain};

/// Invariant violation error.
#[derive(Debug, Clone)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub message: String,
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invariant violation: {}", self.message)
    }
}

impl std::error::Error for InvariantViolation {}

/// Check all board invariants.
///
/// Returns a list of violations found, or empty if all invariants hold.
#[must_use]
pub fn check_invariants(board: &Board) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();
    let mut report = |message: String| violations.push(InvariantViolation { message });
    let players = board.nb_players();

    // Every unit stands on a walkable cell that points back at it
    for unit in board.units() {
        let max_health = board.descriptor(unit).max_health;
        if unit.health == 0 || unit.health > max_health {
            report(format!(
                "Unit {} has health {} outside 1..={max_health}",
                unit.id, unit.health
            ));
        }
        if usize::from(unit.player) >= players {
            report(format!("Unit {} belongs to unknown player {}", unit.id, unit.player));
        }
        match board.cell(unit.pos) {
            None => report(format!("Unit {} is off the board at {}", unit.id, unit.pos)),
            Some(cell) => {
                if cell.terrain == Terrain::Wall {
                    report(format!("Unit {} stands on a wall at {}", unit.id, unit.pos));
                }
                if cell.unit != Some(unit.id) {
                    report(format!(
                        "Unit {} at {} but the cell holds {:?}",
                        unit.id, unit.pos, cell.unit
                    ));
                }
            }
        }
    }

    // Every occupied cell points at a unit standing on it
    for (coord, cell) in board.grid().iter() {
        if let Some(id) = cell.unit {
            match board.unit(id) {
                Some(unit) if unit.pos == coord => {}
                Some(unit) => report(format!(
                    "Cell {coord} holds unit {id} which is at {}",
                    unit.pos
                )),
                None => report(format!("Cell {coord} holds unknown unit {id}")),
            }
        }
        if let Some(owner) = cell.owner {
            if usize::from(owner) >= players {
                report(format!("Cell {coord} is owned by unknown player {owner}"));
            }
            if cell.terrain == Terrain::Wall {
                report(format!("Wall {coord} is owned by player {owner}"));
            }
        }
    }

    // Scores match the territory
    let territory = board.grid().territory(players);
    if board.scores() != territory.as_slice() {
        report(format!(
            "Scores {:?} do not match territory {territory:?}",
            board.scores()
        ));
    }

    violations
}

/// Assert all board invariants hold, panicking if any are violated.
///
/// Only active in debug builds. No-op in release builds.
///
/// # Panics
///
/// Panics with detailed message if any invariant is violated.
#[cfg(debug_assertions)]
pub fn assert_invariants(board: &Board) {
    let violations = check_invariants(board);
    if !violations.is_empty() {
        let messages: Vec<_> = violations.iter().map(|v| v.message.as_str()).collect();
        panic!("Board invariant violations:\n  - {}", messages.join("\n  - "));
    }
}

/// No-op in release builds.
#[cfg(not(debug_assertions))]
pub fn assert_invariants(_board: &Board) {}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;
    use crate::game::{Cell, Coord, DamageRange, Direction, GameParams, Grid, Layout, UnitCatalog};

    fn spawned_board(seed: u64) -> Board {
        let params = GameParams {
            game_name: "skirmish".to_string(),
            version: "1.0".to_string(),
            nb_players: 4,
            rounds: 50,
            rows: 12,
            cols: 14,
            damage: DamageRange::default(),
            units_per_type: vec![3, 2, 1],
            names: GameParams::default_names(4),
        };
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        Board::new(
            Arc::new(UnitCatalog::standard()),
            params,
            Layout::from_grid(Grid::new(12, 14).unwrap()),
            &mut rng,
        )
        .unwrap()
    }

    #[test]
    fn test_valid_board_passes() {
        let board = spawned_board(1);
        let violations = check_invariants(&board);
        assert!(violations.is_empty(), "{violations:?}");
    }

    #[test]
    fn test_invariants_hold_across_rounds() {
        let mut board = spawned_board(2);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for round in 0..30 {
            let actions: Vec<_> = (0..4u8)
                .map(|player| {
                    let mut action = crate::game::Action::new();
                    for id in board.units().owned_by(player).map(|u| u.id) {
                        action.submit(id, Direction::ALL[(id + round) % 4]);
                    }
                    action
                })
                .collect();
            board = board.next(&actions, &mut rng).board;
            let violations = check_invariants(&board);
            assert!(violations.is_empty(), "round {round}: {violations:?}");
        }
    }

    #[test]
    fn test_owned_wall_detected() {
        let mut board = spawned_board(3);
        let corner = Coord::new(0, 0);
        if let Some(cell) = board.grid_mut().get_mut(corner) {
            *cell = Cell {
                owner: Some(1),
                ..Cell::wall()
            };
        }
        let violations = check_invariants(&board);
        assert!(
            violations
                .iter()
                .any(|v| v.message == "Wall (0, 0) is owned by player 1"),
            "{violations:?}"
        );
    }

    #[test]
    fn test_violation_display() {
        let violation = InvariantViolation {
            message: "Unit 3 stands on a wall at (1, 1)".to_string(),
        };
        assert_eq!(
            violation.to_string(),
            "Invariant violation: Unit 3 stands on a wall at (1, 1)"
        );
    }
}
