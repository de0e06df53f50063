#![no_main]

//! Snapshot parser fuzzer.
//!
//! Arbitrary text must be rejected with an error, never a panic. Text
//! that parses and builds a board must satisfy the board invariants.

use libfuzzer_sys::fuzz_target;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use skirmish::game::{check_invariants, GameParams, UnitCatalog};
use skirmish::snapshot::parse_map;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let catalog = UnitCatalog::standard();
    let defaults = GameParams {
        game_name: "fuzz".to_string(),
        version: "1.0".to_string(),
        nb_players: 2,
        rounds: 10,
        rows: 8,
        cols: 8,
        damage: Default::default(),
        units_per_type: vec![1, 1, 0],
        names: GameParams::default_names(2),
    };

    let Ok(map) = parse_map(text, &catalog, &defaults) else {
        return;
    };
    if let Ok(board) = map.into_board(&mut ChaCha8Rng::seed_from_u64(0)) {
        assert!(check_invariants(&board).is_empty());
    }
});
