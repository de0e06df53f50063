//! Multi-round integration tests.
//!
//! These tests run complete games through the driver, reload mid-game
//! snapshots and load games from files on disk.
//! Run with: cargo test --release game_integration

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use std::io::Write;
use std::sync::Arc;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tempfile::NamedTempFile;

use skirmish::driver::make_player;
use skirmish::game::check_invariants;
use skirmish::snapshot::{parse_map, render_state};
use skirmish::{Game, GameConfig, Player, run_game};

fn config(players: u8, rounds: u32) -> GameConfig {
    let mut config = GameConfig::default();
    config.game.players = players;
    config.game.rounds = rounds;
    config
}

fn players(kind: &str, n: usize, seed: u64) -> Vec<Box<dyn Player>> {
    (0..n).map(|i| make_player(kind, i, seed).unwrap()).collect()
}

fn new_game(config: &GameConfig, seed: u64) -> Game {
    let players = players("random", usize::from(config.game.players), seed);
    let names = players.iter().map(|p| p.name().to_string()).collect();
    let params = config.params(Some(names)).unwrap();
    let grid = skirmish::game::Grid::walled(params.rows, params.cols).unwrap();
    Game::new(
        Arc::new(config.catalog().unwrap()),
        params,
        skirmish::Layout::from_grid(grid),
        players,
        seed,
    )
    .unwrap()
}

#[test]
fn test_100_round_game_no_panic() {
    let result = run_game(12345, &config(2, 100), players("random", 2, 12345))
        .expect("game should complete without error");

    assert_eq!(result.rounds_played, 100);
    assert_eq!(result.scores.len(), 2);
    assert_eq!(result.total_scores.len(), 2);
}

#[test]
fn test_multiple_seeds_keep_board_consistent() {
    let config = config(2, 40);

    for seed in 0..20 {
        let game = new_game(&config, seed);
        let result = game.run(|round| {
            let violations = check_invariants(&round.board);
            assert!(
                violations.is_empty(),
                "seed {seed}, round {}: {violations:?}",
                round.board.round()
            );
        });
        assert!(result.is_ok(), "seed {seed} failed: {:?}", result.err());
    }
}

#[test]
fn test_four_player_game() {
    let result = run_game(9999, &config(4, 60), players("random", 4, 9999))
        .expect("4-player game should complete");

    assert_eq!(result.rounds_played, 60);
    assert_eq!(result.names.len(), 4);
    assert_eq!(result.names[3], "random3");
    for (&land, &total) in result.scores.iter().zip(&result.total_scores) {
        assert!(u64::from(land) <= total);
    }
}

#[test]
fn test_determinism() {
    let config = config(3, 50);
    let a = run_game(777, &config, players("random", 3, 777)).unwrap();
    let b = run_game(777, &config, players("random", 3, 777)).unwrap();

    assert_eq!(a, b, "same seed and players must give the same result");
}

#[test]
fn test_game_terminates() {
    let mut game = new_game(&config(2, 15), 5);
    let mut rounds = 0;
    while !game.is_over() {
        game.play_round().unwrap();
        rounds += 1;
        assert!(rounds <= 15, "game ran past its round limit");
    }

    assert_eq!(rounds, 15);
    assert_eq!(game.board().round(), 15);
    assert!(game.play_round().is_err());
}

#[test]
fn test_idle_game_winner_is_tie() {
    let result = run_game(1, &config(2, 10), players("idle", 2, 1)).unwrap();
    assert_eq!(result.winner, None);
    assert_eq!(result.total_scores[0], result.total_scores[1]);
}

#[test]
fn test_mid_game_snapshot_reloads() {
    let config = config(2, 60);
    let mut game = new_game(&config, 2024);
    for _ in 0..20 {
        game.play_round().unwrap();
    }
    game.board_mut().set_status(1, 0.5);
    let board = game.board().clone();

    let text = render_state(&board);
    let map = parse_map(&text, board.catalog(), board.params()).unwrap();
    let loaded = map.into_board(&mut ChaCha8Rng::seed_from_u64(0)).unwrap();

    assert_eq!(loaded.round(), 20);
    assert_eq!(loaded.grid(), board.grid());
    assert_eq!(loaded.units(), board.units());
    assert_eq!(loaded.scores(), board.scores());
    assert_eq!(loaded.total_scores(), board.total_scores());
    assert_eq!(loaded.status(), board.status());

    // Both boards resolve the next round identically.
    let a = board.next(&[], &mut ChaCha8Rng::seed_from_u64(9));
    let b = loaded.next(&[], &mut ChaCha8Rng::seed_from_u64(9));
    assert_eq!(a.board.units(), b.board.units());
    assert_eq!(a.board.total_scores(), b.board.total_scores());
}

#[test]
fn test_game_from_files() {
    let mut config_file = NamedTempFile::new().unwrap();
    write!(
        config_file,
        r#"
[game]
players = 2
rounds = 12
damage_min = 5
damage_max = 15

[[unit_types]]
name = "farmers"
symbol = "f"
max_health = 100
regen = 30
can_capture = true
count = 2

[[unit_types]]
name = "knights"
symbol = "k"
max_health = 200
regen = 30
can_attack = true
count = 1
"#
    )
    .unwrap();

    let mut map_file = NamedTempFile::new().unwrap();
    write!(
        map_file,
        "\
skirmish 1.0
nb_players 2
rows 8
cols 8
names north south
round 0
XXXXXXXX
X......X
X......X
X......X
X......X
X......X
X......X
XXXXXXXX
"
    )
    .unwrap();

    let config = GameConfig::load(config_file.path()).unwrap();
    assert_eq!(config.unit_types.len(), 2);

    let text = std::fs::read_to_string(map_file.path()).unwrap();
    let map = parse_map(&text, &config.catalog().unwrap(), &config.params(None).unwrap()).unwrap();
    assert_eq!(map.params.names, vec!["north", "south"]);
    assert_eq!(map.params.rounds, 12);

    let game = Game::new(
        Arc::new(map.catalog),
        map.params,
        map.layout,
        players("random", 2, 31),
        31,
    )
    .unwrap();
    assert_eq!(game.board().units().len(), 6);
    assert_eq!(game.board().scores(), &[2, 2]);

    let result = game
        .run(|round| assert!(check_invariants(&round.board).is_empty()))
        .unwrap();
    assert_eq!(result.rounds_played, 12);
}
