//! Game driver: collects orders from players and advances the board.
//!
//! Provides a pure function interface: `(seed, config, players) -> GameResult`
//!
//! Given the same seed, configuration and players, a game always produces
//! the same sequence of rounds.

use std::sync::Arc;

use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::{ConfigError, GameConfig};
use crate::error::BoardError;
use crate::game::{
    Action, Board, Direction, GameParams, Grid, Layout, PlayerId, Round, UnitCatalog,
};

/// Errors raised while setting up or running a game.
#[derive(Debug, Error)]
pub enum GameError {
    /// The number of players does not match the game parameters.
    #[error("game needs {expected} players, {found} given")]
    PlayerCount {
        /// Players required.
        expected: usize,
        /// Players supplied.
        found: usize,
    },
    /// A player kind is not known.
    #[error("unknown player kind '{0}' (expected 'idle' or 'random')")]
    UnknownPlayer(String),
    /// The round limit was already reached.
    #[error("game is over after {0} rounds")]
    Finished(u32),
    /// Configuration problem.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Board construction or resolution failed.
    #[error(transparent)]
    Board(#[from] BoardError),
}

/// Something that decides orders for one player each round.
pub trait Player {
    /// Display name.
    fn name(&self) -> &str;

    /// Orders for this round. `me` is the player's index on the board.
    fn play(&mut self, board: &Board, me: PlayerId) -> Action;
}

/// A player that never gives an order.
#[derive(Debug, Clone)]
pub struct IdlePlayer {
    name: String,
}

impl IdlePlayer {
    /// Create an idle player.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Player for IdlePlayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn play(&mut self, _board: &Board, _me: PlayerId) -> Action {
        Action::new()
    }
}

/// A player that orders every unit in a random direction.
#[derive(Debug, Clone)]
pub struct RandomPlayer {
    name: String,
    rng: ChaCha8Rng,
}

impl RandomPlayer {
    /// Create a random player with its own seeded stream.
    #[must_use]
    pub fn new(name: impl Into<String>, seed: u64) -> Self {
        Self {
            name: name.into(),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl Player for RandomPlayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn play(&mut self, board: &Board, me: PlayerId) -> Action {
        let mut action = Action::new();
        for unit in board.units().owned_by(me) {
            let dir = Direction::ALL
                .choose(&mut self.rng)
                .copied()
                .unwrap_or(Direction::None);
            action.submit(unit.id, dir);
        }
        action
    }
}

/// Build a player by kind name: `idle` or `random`.
///
/// # Errors
///
/// Returns an error for any other kind.
pub fn make_player(kind: &str, index: usize, seed: u64) -> Result<Box<dyn Player>, GameError> {
    let name = format!("{kind}{index}");
    match kind {
        "idle" => Ok(Box::new(IdlePlayer::new(name))),
        "random" => Ok(Box::new(RandomPlayer::new(
            name,
            seed.wrapping_add(index as u64 + 1),
        ))),
        _ => Err(GameError::UnknownPlayer(kind.to_string())),
    }
}

/// Final result of a game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameResult {
    /// The seed used for this game.
    pub seed: u64,
    /// Rounds played.
    pub rounds_played: u32,
    /// Player names.
    pub names: Vec<String>,
    /// Territory at the end of the game.
    pub scores: Vec<u32>,
    /// Territory accumulated over all rounds.
    pub total_scores: Vec<u64>,
    /// Player with the strictly highest total score, `None` on a tie.
    pub winner: Option<PlayerId>,
}

impl GameResult {
    fn from_board(board: &Board, seed: u64, rounds_played: u32) -> Self {
        let totals = board.total_scores();
        let best = totals.iter().copied().max().unwrap_or(0);
        let mut leaders = totals.iter().enumerate().filter(|&(_, &t)| t == best);
        let winner = match (leaders.next(), leaders.next()) {
            (Some((idx, _)), None) => PlayerId::try_from(idx).ok(),
            _ => None,
        };

        Self {
            seed,
            rounds_played,
            names: board.names().to_vec(),
            scores: board.scores().to_vec(),
            total_scores: totals.to_vec(),
            winner,
        }
    }
}

/// A running game.
pub struct Game {
    board: Board,
    players: Vec<Box<dyn Player>>,
    rng: ChaCha8Rng,
    seed: u64,
    rounds_played: u32,
}

impl std::fmt::Debug for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Game")
            .field("round", &self.board.round())
            .field("players", &self.players.len())
            .field("seed", &self.seed)
            .finish_non_exhaustive()
    }
}

impl Game {
    /// Set up a game. The board's random stream is seeded from `seed`.
    ///
    /// # Errors
    ///
    /// Returns an error if the player count does not match or the board
    /// cannot be built.
    pub fn new(
        catalog: Arc<UnitCatalog>,
        params: GameParams,
        layout: Layout,
        players: Vec<Box<dyn Player>>,
        seed: u64,
    ) -> Result<Self, GameError> {
        let expected = usize::from(params.nb_players);
        if players.len() != expected {
            return Err(GameError::PlayerCount {
                expected,
                found: players.len(),
            });
        }

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let board = Board::new(catalog, params, layout, &mut rng)?;
        info!(
            seed,
            players = expected,
            units = board.units().len(),
            rows = board.rows(),
            cols = board.cols(),
            "game started"
        );

        Ok(Self {
            board,
            players,
            rng,
            seed,
            rounds_played: 0,
        })
    }

    /// Current board.
    #[must_use]
    pub const fn board(&self) -> &Board {
        &self.board
    }

    /// Mutable board, for setting status values between rounds.
    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    /// Whether the round limit has been reached.
    #[must_use]
    pub fn is_over(&self) -> bool {
        self.board.is_over()
    }

    /// Collect every player's orders and resolve one round.
    ///
    /// # Errors
    ///
    /// Returns an error if the game is over.
    pub fn play_round(&mut self) -> Result<Round, GameError> {
        if self.is_over() {
            return Err(GameError::Finished(self.board.round()));
        }

        let board = &self.board;
        let actions: Vec<Action> = self
            .players
            .iter_mut()
            .zip(0..)
            .map(|(player, me)| player.play(board, me))
            .collect();

        let round = self.board.next(&actions, &mut self.rng);
        debug!(
            round = round.board.round(),
            executed = round.executed.len(),
            "round resolved"
        );
        self.board = round.board.clone();
        self.rounds_played += 1;
        Ok(round)
    }

    /// Play until the round limit, calling `on_round` after every round.
    ///
    /// # Errors
    ///
    /// Returns any error from [`Game::play_round`].
    pub fn run(mut self, mut on_round: impl FnMut(&Round)) -> Result<GameResult, GameError> {
        while !self.is_over() {
            let round = self.play_round()?;
            on_round(&round);
        }

        let result = self.result();
        info!(
            seed = result.seed,
            rounds = result.rounds_played,
            winner = ?result.winner,
            "game finished"
        );
        Ok(result)
    }

    /// Result so far.
    #[must_use]
    pub fn result(&self) -> GameResult {
        GameResult::from_board(&self.board, self.seed, self.rounds_played)
    }
}

/// Run a complete game on a walled, empty board built from `config`.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the player count is
/// wrong, or the board cannot be built.
pub fn run_game(
    seed: u64,
    config: &GameConfig,
    players: Vec<Box<dyn Player>>,
) -> Result<GameResult, GameError> {
    config.validate()?;
    let names = players.iter().map(|p| p.name().to_string()).collect();
    let params = config.params(Some(names))?;
    let grid = Grid::walled(params.rows, params.cols).ok_or(BoardError::Dimensions {
        rows: usize::from(params.rows),
        cols: usize::from(params.cols),
    })?;

    let game = Game::new(
        Arc::new(config.catalog()?),
        params,
        Layout::from_grid(grid),
        players,
        seed,
    )?;
    game.run(|_| {})
}
