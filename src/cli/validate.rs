//! Configuration and map validation command implementation.

use super::CliError;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::PathBuf;

/// Execute the validate command.
///
/// Builds the board once with a fixed seed, so spawn problems surface too.
///
/// # Errors
///
/// Returns an error if the configuration or map is invalid.
pub(crate) fn execute(config: Option<PathBuf>, map: Option<PathBuf>) -> Result<(), CliError> {
    match &config {
        Some(path) => println!("Validating config: {}", path.display()),
        None => println!("Validating standard config"),
    }
    println!();

    let config = super::load_config(config.as_deref());
    print_check("Configuration", config.is_ok());
    let config = config?;

    let catalog = config.catalog()?;
    println!();
    println!("Unit types:");
    for (_, descriptor) in catalog.iter() {
        println!(
            "  {} '{}': health {}/{}, regen {}, move {}, attack {}, capture {}",
            descriptor.name,
            descriptor.symbol,
            descriptor.initial_health,
            descriptor.max_health,
            descriptor.regen,
            descriptor.can_move,
            descriptor.can_attack,
            descriptor.can_capture
        );
    }

    if let Some(path) = map {
        println!();
        println!("Validating map: {}", path.display());
        let parsed = super::load_map(&path, &config);
        print_check("Map syntax", parsed.is_ok());
        let parsed = parsed?;

        let params = parsed.params.clone();
        let board = parsed.into_board(&mut ChaCha8Rng::seed_from_u64(0));
        print_check("Board setup", board.is_ok());
        let board = board?;

        println!();
        println!("Summary:");
        println!("  Players:      {} ({})", params.nb_players, params.names.join(", "));
        println!("  Board:        {}x{}", board.rows(), board.cols());
        println!("  Rounds:       {} (starting at {})", params.rounds, board.round());
        println!("  Units:        {}", board.units().len());
        println!(
            "  Damage:       {}..{}",
            params.damage.min(),
            params.damage.max()
        );
    }

    println!();
    println!("Validation successful!");

    Ok(())
}

fn print_check(name: &str, ok: bool) {
    let status = if ok { "OK" } else { "FAILED" };
    let symbol = if ok { "✓" } else { "✗" };
    println!("  {symbol} {name}: {status}");
}
