#![no_main]

//! Round resolution fuzzer.
//!
//! Spawns a small board, then feeds arbitrary orders through several
//! rounds. Orders may name unknown units, foreign units or repeat a unit.
//! After every round the board must still satisfy its invariants.

use std::sync::Arc;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use skirmish::game::{
    check_invariants, Action, Board, DamageRange, Direction, GameParams, Grid, Layout,
    UnitCatalog,
};

/// A fuzzer-generated order.
#[derive(Arbitrary, Debug, Clone)]
struct FuzzOrder {
    player: u8,
    unit: u8,
    dir: u8,
}

/// Structured input for round fuzzing.
#[derive(Arbitrary, Debug)]
struct RoundInput {
    /// Extra players beyond the minimum of two.
    extra_players: u8,
    /// Damage range bounds.
    damage: (u8, u8),
    /// Orders per round.
    rounds: Vec<Vec<FuzzOrder>>,
    /// RNG seed for spawning and turn order.
    rng_seed: u64,
}

fuzz_target!(|input: RoundInput| {
    let players = 2 + input.extra_players % 3;
    let (low, high) = input.damage;
    let Ok(damage) = DamageRange::new(u32::from(low.min(high)), u32::from(low.max(high))) else {
        return;
    };

    let params = GameParams {
        game_name: "fuzz".to_string(),
        version: "1.0".to_string(),
        nb_players: players,
        rounds: 100,
        rows: 12,
        cols: 12,
        damage,
        units_per_type: vec![2, 2, 1],
        names: GameParams::default_names(players),
    };
    let Some(grid) = Grid::walled(12, 12) else {
        return;
    };

    let mut rng = ChaCha8Rng::seed_from_u64(input.rng_seed);
    let Ok(mut board) = Board::new(
        Arc::new(UnitCatalog::standard()),
        params,
        Layout::from_grid(grid),
        &mut rng,
    ) else {
        return;
    };

    for orders in input.rounds.iter().take(10) {
        let mut actions = vec![Action::new(); usize::from(players)];
        for order in orders.iter().take(40) {
            let action = &mut actions[usize::from(order.player % players)];
            let dir = Direction::ALL[usize::from(order.dir) % Direction::ALL.len()];
            action.submit(usize::from(order.unit % 24), dir);
        }

        let round = board.next(&actions, &mut rng);
        let violations = check_invariants(&round.board);
        assert!(violations.is_empty(), "invariants violated: {violations:?}");
        board = round.board;
    }
});
