//! Run command implementation.

use super::output::{JsonGameResult, format_text};
use super::{CliError, OutputFormat};
use skirmish::driver::make_player;
use skirmish::game::{Grid, Layout};
use skirmish::snapshot::{MapFile, render_movements, render_preamble, render_round};
use skirmish::{BoardError, Game};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Options of the run command.
#[derive(Debug)]
pub(crate) struct RunOptions {
    /// Configuration file.
    pub(crate) config: Option<PathBuf>,
    /// Map or state file.
    pub(crate) map: Option<PathBuf>,
    /// Random seed.
    pub(crate) seed: Option<u64>,
    /// Round limit override.
    pub(crate) rounds: Option<u32>,
    /// Player kinds.
    pub(crate) players: Option<Vec<String>>,
    /// Output format.
    pub(crate) format: OutputFormat,
}

/// Execute the run command.
///
/// # Errors
///
/// Returns an error if the configuration or map is invalid, or the game fails to run.
pub(crate) fn execute(options: RunOptions) -> Result<(), CliError> {
    let mut config = super::load_config(options.config.as_deref())?;
    if let Some(kinds) = &options.players {
        config.game.players = u8::try_from(kinds.len())
            .map_err(|_| CliError::new(format!("Too many players: {}", kinds.len())))?;
    }
    if let Some(rounds) = options.rounds {
        config.game.rounds = rounds;
    }
    config.validate()?;

    // Map file settings override the configuration
    let MapFile {
        catalog,
        mut params,
        layout,
    } = match &options.map {
        Some(path) => super::load_map(path, &config)?,
        None => {
            let params = config.params(None)?;
            let grid = Grid::walled(params.rows, params.cols).ok_or(BoardError::Dimensions {
                rows: usize::from(params.rows),
                cols: usize::from(params.cols),
            })?;
            MapFile {
                catalog: config.catalog()?,
                params,
                layout: Layout::from_grid(grid),
            }
        }
    };
    if let Some(rounds) = options.rounds {
        params.rounds = rounds;
    }

    // Generate seed if not provided
    let seed = options.seed.unwrap_or_else(rand::random);
    info!(seed, "using seed");

    let kinds = options
        .players
        .clone()
        .unwrap_or_else(|| vec!["random".to_string(); usize::from(params.nb_players)]);
    let players = kinds
        .iter()
        .enumerate()
        .map(|(i, kind)| make_player(kind, i, seed))
        .collect::<Result<Vec<_>, _>>()?;
    if options.players.is_some() {
        params.names = players.iter().map(|p| p.name().to_string()).collect();
    }

    let mut game = Game::new(Arc::new(catalog), params, layout, players, seed)?;

    match options.format {
        OutputFormat::Text => {
            let result = game.run(|_| {})?;
            print!("{}", format_text(&result));
        }
        OutputFormat::Json => {
            let result = game.run(|_| {})?;
            let json = serde_json::to_string_pretty(&JsonGameResult::from_game_result(&result))
                .map_err(|e| CliError::new(format!("JSON serialization failed: {e}")))?;
            println!("{json}");
        }
        OutputFormat::Snapshot => {
            let mut out = io::stdout().lock();
            let board = game.board();
            out.write_all(render_preamble(board.params(), board.catalog()).as_bytes())?;
            out.write_all(render_round(board).as_bytes())?;

            while !game.is_over() {
                let round = game.play_round()?;
                out.write_all(render_movements(&round.executed).as_bytes())?;
                out.write_all(render_round(&round.board).as_bytes())?;
            }
            out.flush()?;
        }
    }

    Ok(())
}
