//! Output formatting utilities for CLI.

use serde::Serialize;
use skirmish::GameResult;

/// JSON-serializable game result.
#[derive(Debug, Serialize)]
pub(super) struct JsonGameResult {
    /// Random seed used.
    pub(super) seed: u64,
    /// Winner player index (null if tied).
    pub(super) winner: Option<u8>,
    /// Total rounds played.
    pub(super) rounds_played: u32,
    /// Per-player results.
    pub(super) players: Vec<JsonPlayerResult>,
}

/// JSON-serializable player result.
#[derive(Debug, Serialize)]
pub(super) struct JsonPlayerResult {
    /// Player index (0-based).
    pub(super) id: u8,
    /// Display name.
    pub(super) name: String,
    /// Territory at the end of the game.
    pub(super) score: u32,
    /// Territory accumulated over all rounds.
    pub(super) total_score: u64,
}

impl JsonGameResult {
    /// Create from a GameResult.
    pub(super) fn from_game_result(result: &GameResult) -> Self {
        Self {
            seed: result.seed,
            winner: result.winner,
            rounds_played: result.rounds_played,
            players: result
                .names
                .iter()
                .zip(&result.scores)
                .zip(&result.total_scores)
                .zip(0..)
                .map(|(((name, &score), &total_score), id)| JsonPlayerResult {
                    id,
                    name: name.clone(),
                    score,
                    total_score,
                })
                .collect(),
        }
    }
}

/// Format a game result as human-readable text.
pub(super) fn format_text(result: &GameResult) -> String {
    let mut output = String::new();

    output.push_str(&format!("Game Result (seed: {})\n", result.seed));
    if let Some(winner) = result.winner {
        let name = result
            .names
            .get(usize::from(winner))
            .map_or("Unknown", String::as_str);
        output.push_str(&format!("  Winner: Player {winner} ({name})\n"));
    } else {
        output.push_str("  Winner: Tie\n");
    }
    output.push_str(&format!("  Rounds: {}\n\n", result.rounds_played));

    for (i, name) in result.names.iter().enumerate() {
        let score = result.scores.get(i).copied().unwrap_or(0);
        let total = result.total_scores.get(i).copied().unwrap_or(0);
        output.push_str(&format!(
            "  Player {i}: {total} points, {score} cells held ({name})\n"
        ));
    }

    output
}
