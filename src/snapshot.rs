//! Text snapshots of games: preamble, per-round state and map files.
//!
//! A map file and a saved state share one format:
//!
//! ```text
//! skirmish 1.0
//! nb_players 2
//! nb_rounds 200
//! nb_farmers 10
//! farmers_health 100
//! farmers_regen 30
//! damage_min 60
//! damage_max 90
//! rows 15
//! cols 20
//! names Player0 Player1
//! round 0
//! XXXXXXXXXXXXXXXXXXXX
//! X........1.........X
//! ...
//! score 0 1
//! total_score 0 1
//! status 0 0
//! f 0 3 4 100
//! k 1 9 14 200
//! ```
//!
//! Every key is optional and overrides the defaults handed to
//! [`parse_map`]. The `round` line and the grid are required. The unit
//! list must be either empty, in which case units are spawned, or
//! complete. The `score` line is informational; scores are recounted from
//! the grid.

// Allow format! with push_str for readability - the allocation overhead is negligible for text rendering
#![allow(clippy::format_push_string)]

use std::str::FromStr;

use rand::Rng;
use thiserror::Error;
use tracing::warn;

use crate::error::{BoardError, CatalogError};
use crate::game::{
    Action, Board, Cell, Coord, DamageRange, GameParams, Grid, Layout, PlayerId, Terrain,
    UnitCatalog, UnitRecord, UnitTypeDescriptor,
};

/// Errors raised while reading a map or state file.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SnapshotError {
    /// The text ended while more was expected.
    #[error("unexpected end of input, expected {0}")]
    UnexpectedEnd(&'static str),
    /// A key carries a value that does not parse.
    #[error("line {line}: invalid value for '{key}': '{value}'")]
    BadValue {
        /// 1-based line number.
        line: usize,
        /// Key being read.
        key: String,
        /// Offending text.
        value: String,
    },
    /// A grid row has the wrong width.
    #[error("line {line}: grid row has {found} cells, expected {expected}")]
    GridRow {
        /// 1-based line number.
        line: usize,
        /// Expected number of columns.
        expected: usize,
        /// Cells found.
        found: usize,
    },
    /// A grid row contains an unknown glyph.
    #[error("line {line}: unknown grid glyph '{glyph}'")]
    BadGlyph {
        /// 1-based line number.
        line: usize,
        /// Offending glyph.
        glyph: char,
    },
    /// A unit line names no known unit type.
    #[error("line {line}: unknown unit symbol '{symbol}'")]
    UnknownSymbol {
        /// 1-based line number.
        line: usize,
        /// Offending symbol.
        symbol: String,
    },
    /// A unit line does not have five fields.
    #[error("line {line}: malformed unit line '{text}'")]
    BadUnitLine {
        /// 1-based line number.
        line: usize,
        /// Line text.
        text: String,
    },
    /// Type overrides produced an invalid catalog.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    /// Values are individually fine but inconsistent.
    #[error(transparent)]
    Board(#[from] BoardError),
}

/// A parsed map or state file.
#[derive(Debug, Clone, PartialEq)]
pub struct MapFile {
    /// Catalog with per-type overrides applied.
    pub catalog: UnitCatalog,
    /// Game parameters.
    pub params: GameParams,
    /// Initial state.
    pub layout: Layout,
}

impl MapFile {
    /// Build the board described by the file.
    ///
    /// # Errors
    ///
    /// Returns any error from [`Board::new`].
    pub fn into_board<R: Rng + ?Sized>(self, rng: &mut R) -> Result<Board, BoardError> {
        Board::new(self.catalog.into(), self.params, self.layout, rng)
    }
}

/// Render the game preamble: header line and game-wide parameters.
#[must_use]
pub fn render_preamble(params: &GameParams, catalog: &UnitCatalog) -> String {
    let mut output = String::new();

    output.push_str(&format!("{} {}\n", params.game_name, params.version));
    output.push_str(&format!("nb_players {}\n", params.nb_players));
    output.push_str(&format!("nb_rounds {}\n", params.rounds));
    for ((_, descriptor), count) in catalog.iter().zip(&params.units_per_type) {
        output.push_str(&format!("nb_{} {count}\n", descriptor.name));
    }
    for (_, descriptor) in catalog.iter() {
        output.push_str(&format!("{}_health {}\n", descriptor.name, descriptor.max_health));
        output.push_str(&format!("{}_regen {}\n", descriptor.name, descriptor.regen));
    }
    output.push_str(&format!("damage_min {}\n", params.damage.min()));
    output.push_str(&format!("damage_max {}\n", params.damage.max()));
    output.push_str(&format!("rows {}\n", params.rows));
    output.push_str(&format!("cols {}\n", params.cols));
    output.push_str(&format!("names {}\n", params.names.join(" ")));

    output
}

/// Render the state of one round.
#[must_use]
pub fn render_round(board: &Board) -> String {
    let mut output = String::new();

    output.push_str(&format!("round {}\n", board.round()));

    for row in board.grid().row_slices() {
        output.extend(row.iter().map(cell_glyph));
        output.push('\n');
    }

    output.push_str(&format!("score {}\n", join(board.scores())));
    output.push_str(&format!("total_score {}\n", join(board.total_scores())));
    output.push_str(&format!("status {}\n", join(board.status())));

    for unit in board.units() {
        output.push_str(&format!(
            "{} {} {} {} {}\n",
            board.descriptor(unit).symbol,
            unit.player,
            unit.pos.row,
            unit.pos.col,
            unit.health
        ));
    }

    output
}

/// Render the executed-order log of a round.
#[must_use]
pub fn render_movements(executed: &Action) -> String {
    format!("movements\n{}", executed.to_text())
}

/// Render a complete, loadable state file.
#[must_use]
pub fn render_state(board: &Board) -> String {
    let mut output = render_preamble(board.params(), board.catalog());
    output.push_str(&render_round(board));
    output
}

fn cell_glyph(cell: &Cell) -> char {
    match (cell.terrain, cell.owner) {
        (Terrain::Wall, _) => 'X',
        (Terrain::Empty, None) => '.',
        (Terrain::Empty, Some(owner)) => char::from_digit(u32::from(owner), 10).unwrap_or('?'),
    }
}

fn join<T: ToString>(values: &[T]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse a map or state file.
///
/// `catalog` and `defaults` supply everything the file leaves out.
///
/// # Errors
///
/// Returns an error for malformed lines, a missing or malformed grid, or
/// overrides that leave the catalog or parameters inconsistent.
pub fn parse_map(
    text: &str,
    catalog: &UnitCatalog,
    defaults: &GameParams,
) -> Result<MapFile, SnapshotError> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty());

    let mut params = defaults.clone();
    let mut types: Vec<UnitTypeDescriptor> = catalog.iter().map(|(_, d)| d.clone()).collect();
    let mut damage = (params.damage.min(), params.damage.max());
    let mut names = None;
    let mut round = None;

    // Preamble, up to and including the round line
    let mut first = true;
    for (line_no, line) in lines.by_ref() {
        let mut words = line.split_whitespace();
        let key = words.next().unwrap_or_default();
        let values: Vec<&str> = words.collect();

        match key {
            "round" => {
                round = Some(single(line_no, key, &values)?);
                break;
            }
            "nb_players" => params.nb_players = single(line_no, key, &values)?,
            "nb_rounds" => params.rounds = single(line_no, key, &values)?,
            "rows" => params.rows = single(line_no, key, &values)?,
            "cols" => params.cols = single(line_no, key, &values)?,
            "damage_min" => damage.0 = single(line_no, key, &values)?,
            "damage_max" => damage.1 = single(line_no, key, &values)?,
            "names" => names = Some(values.iter().map(ToString::to_string).collect::<Vec<_>>()),
            "secgame" => {}
            _ => {
                if let Some(idx) = type_key(&types, key, "nb_", "") {
                    params.units_per_type.resize(types.len(), 0);
                    params.units_per_type[idx] = single(line_no, key, &values)?;
                } else if let Some(idx) = type_key(&types, key, "", "_health") {
                    let health: u32 = single(line_no, key, &values)?;
                    let descriptor = &mut types[idx];
                    descriptor.max_health = health;
                    descriptor.initial_health = descriptor.initial_health.min(health).max(1);
                } else if let Some(idx) = type_key(&types, key, "", "_regen") {
                    types[idx].regen = single(line_no, key, &values)?;
                } else if first && values.len() == 1 {
                    params.game_name = key.to_string();
                    params.version = values[0].to_string();
                } else {
                    warn!(line = line_no, key, "unknown key, skipping");
                }
            }
        }
        first = false;
    }

    let round = round.ok_or(SnapshotError::UnexpectedEnd("round line"))?;
    params.damage = DamageRange::new(damage.0, damage.1)?;
    if let Some(names) = names {
        params.names = names;
    } else if params.names.len() != usize::from(params.nb_players) {
        params.names = GameParams::default_names(params.nb_players);
    }
    let catalog = UnitCatalog::new(types)?;

    // Grid
    let mut grid = Grid::new(params.rows, params.cols).ok_or(BoardError::Dimensions {
        rows: usize::from(params.rows),
        cols: usize::from(params.cols),
    })?;
    for row in 0..params.rows {
        let (line_no, line) = lines.next().ok_or(SnapshotError::UnexpectedEnd("grid row"))?;
        let found = line.chars().count();
        if found != usize::from(params.cols) {
            return Err(SnapshotError::GridRow {
                line: line_no,
                expected: usize::from(params.cols),
                found,
            });
        }
        for (col, glyph) in (0..params.cols).zip(line.chars()) {
            let cell = parse_glyph(glyph).ok_or(SnapshotError::BadGlyph {
                line: line_no,
                glyph,
            })?;
            grid.set(Coord::new(row, col), cell);
        }
    }

    // Scores, status and units
    let mut layout = Layout {
        round,
        ..Layout::from_grid(grid)
    };
    for (line_no, line) in lines {
        let mut words = line.split_whitespace();
        let key = words.next().unwrap_or_default();
        let values: Vec<&str> = words.collect();

        match key {
            "score" => {}
            "total_score" => layout.total_scores = Some(list(line_no, key, &values)?),
            "status" => layout.status = list(line_no, key, &values)?,
            "movements" => break,
            _ => layout.units.push(parse_unit(line_no, line, &catalog)?),
        }
    }

    Ok(MapFile {
        catalog,
        params,
        layout,
    })
}

/// Index of the type named by `<prefix><name><suffix>`.
fn type_key(types: &[UnitTypeDescriptor], key: &str, prefix: &str, suffix: &str) -> Option<usize> {
    let name = key.strip_prefix(prefix)?.strip_suffix(suffix)?;
    types.iter().position(|d| d.name == name)
}

fn parse_glyph(glyph: char) -> Option<Cell> {
    match glyph {
        '.' => Some(Cell::empty()),
        'X' => Some(Cell::wall()),
        _ => {
            let owner = PlayerId::try_from(glyph.to_digit(10)?).ok()?;
            Some(Cell {
                owner: Some(owner),
                ..Cell::empty()
            })
        }
    }
}

fn parse_unit(line_no: usize, line: &str, catalog: &UnitCatalog) -> Result<UnitRecord, SnapshotError> {
    let bad_line = || SnapshotError::BadUnitLine {
        line: line_no,
        text: line.to_string(),
    };

    let words: Vec<&str> = line.split_whitespace().collect();
    let [symbol, player, row, col, health] = words.as_slice() else {
        return Err(bad_line());
    };

    let mut chars = symbol.chars();
    let kind = match (chars.next(), chars.next()) {
        (Some(c), None) => catalog.by_symbol(c).map(|(id, _)| id),
        _ => None,
    }
    .ok_or_else(|| SnapshotError::UnknownSymbol {
        line: line_no,
        symbol: (*symbol).to_string(),
    })?;

    Ok(UnitRecord {
        kind,
        player: value(line_no, "player", player)?,
        pos: Coord::new(value(line_no, "row", row)?, value(line_no, "col", col)?),
        health: value(line_no, "health", health)?,
    })
}

fn value<T: FromStr>(line: usize, key: &str, text: &str) -> Result<T, SnapshotError> {
    text.parse().map_err(|_| SnapshotError::BadValue {
        line,
        key: key.to_string(),
        value: text.to_string(),
    })
}

fn single<T: FromStr>(line: usize, key: &str, values: &[&str]) -> Result<T, SnapshotError> {
    match values {
        [text] => value(line, key, text),
        _ => Err(SnapshotError::BadValue {
            line,
            key: key.to_string(),
            value: values.join(" "),
        }),
    }
}

fn list<T: FromStr>(line: usize, key: &str, values: &[&str]) -> Result<Vec<T>, SnapshotError> {
    values.iter().map(|text| value(line, key, text)).collect()
}
