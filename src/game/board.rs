//! Board state and round resolution.
//!
//! A [`Board`] is an immutable round snapshot. [`Board::next`] clones it,
//! applies every player's orders and returns the new snapshot together with
//! the log of executed orders. The only source of randomness is the `rng`
//! handle threaded through construction and every round.

use std::sync::Arc;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::BoardError;
use crate::game::{
    Action, Cell, Coord, Direction, Grid, PlayerId, Quadrant, Terrain, Unit, UnitCatalog,
    UnitId, UnitSet, UnitTypeDescriptor, UnitTypeId, assert_invariants,
};

/// Smallest number of rows or columns a board may have.
pub const MIN_DIMENSION: u16 = 4;

/// Largest number of players: one per spawn quadrant.
pub const MAX_PLAYERS: usize = 4;

/// Smallest number of players.
pub const MIN_PLAYERS: usize = 2;

/// Random spawn attempts per quadrant cell before falling back to a scan.
const SPAWN_ATTEMPTS_PER_CELL: usize = 64;

/// Global combat damage range, `min..max` (half-open).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DamageRange {
    min: u32,
    max: u32,
}

impl DamageRange {
    /// Create a damage range.
    ///
    /// # Errors
    ///
    /// Returns an error if `max < min`.
    pub const fn new(min: u32, max: u32) -> Result<Self, BoardError> {
        if max < min {
            return Err(BoardError::DamageRange { min, max });
        }
        Ok(Self { min, max })
    }

    /// Lower bound, inclusive.
    #[must_use]
    pub const fn min(&self) -> u32 {
        self.min
    }

    /// Upper bound, exclusive unless equal to the lower bound.
    #[must_use]
    pub const fn max(&self) -> u32 {
        self.max
    }

    /// Roll a damage value in `min..max`, or exactly `min` when the range is empty.
    pub fn roll<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        if self.max > self.min {
            rng.gen_range(self.min..self.max)
        } else {
            self.min
        }
    }
}

impl Default for DamageRange {
    fn default() -> Self {
        Self { min: 60, max: 90 }
    }
}

/// Game-wide parameters shared by every round of a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameParams {
    /// Game name, first word of the preamble.
    pub game_name: String,
    /// Game version, second word of the preamble.
    pub version: String,
    /// Number of players.
    pub nb_players: u8,
    /// Round limit.
    pub rounds: u32,
    /// Board rows.
    pub rows: u16,
    /// Board columns.
    pub cols: u16,
    /// Global combat damage.
    pub damage: DamageRange,
    /// Units per player of each catalog type, indexed by [`UnitTypeId`].
    pub units_per_type: Vec<u32>,
    /// Display names, one per player.
    pub names: Vec<String>,
}

impl GameParams {
    /// Total number of units on a board with these parameters.
    #[must_use]
    pub fn expected_units(&self) -> usize {
        let per_player: u64 = self.units_per_type.iter().map(|&n| u64::from(n)).sum();
        usize::try_from(per_player * u64::from(self.nb_players)).unwrap_or(usize::MAX)
    }

    /// Default display names `Player0`, `Player1`, ...
    #[must_use]
    pub fn default_names(nb_players: u8) -> Vec<String> {
        (0..nb_players).map(|p| format!("Player{p}")).collect()
    }

    /// Check the parameters against a catalog.
    ///
    /// # Errors
    ///
    /// Returns the first inconsistency found.
    pub fn validate(&self, catalog: &UnitCatalog) -> Result<(), BoardError> {
        let players = usize::from(self.nb_players);
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&players) {
            return Err(BoardError::PlayerCount(players));
        }
        if self.rows < MIN_DIMENSION || self.cols < MIN_DIMENSION {
            return Err(BoardError::Dimensions {
                rows: usize::from(self.rows),
                cols: usize::from(self.cols),
            });
        }
        if self.names.len() != players {
            return Err(BoardError::PlayerVector {
                what: "player names",
                expected: players,
                found: self.names.len(),
            });
        }
        if self.units_per_type.len() != catalog.len() {
            return Err(BoardError::TypeCounts {
                expected: catalog.len(),
                found: self.units_per_type.len(),
            });
        }
        // Rebuild to re-check fields that may have been set directly.
        DamageRange::new(self.damage.min, self.damage.max)?;
        Ok(())
    }
}

/// A unit as supplied by a map or saved state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitRecord {
    /// Unit type.
    pub kind: UnitTypeId,
    /// Owning player.
    pub player: PlayerId,
    /// Position.
    pub pos: Coord,
    /// Current health.
    pub health: u32,
}

/// Initial state read from a map or a saved round.
///
/// An empty `units` list means "spawn units procedurally"; otherwise the
/// list must contain every unit of the game.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    /// Terrain and ownership. Occupants are ignored and rebuilt from `units`.
    pub grid: Grid,
    /// Units in id order, or empty.
    pub units: Vec<UnitRecord>,
    /// Round counter.
    pub round: u32,
    /// Per-player status values, or empty for all zeros.
    pub status: Vec<f64>,
    /// Cumulative scores, or `None` to start from the current territory.
    pub total_scores: Option<Vec<u64>>,
}

impl Layout {
    /// Layout with the given grid, no units, round 0.
    #[must_use]
    pub fn from_grid(grid: Grid) -> Self {
        Self {
            grid,
            units: Vec::new(),
            round: 0,
            status: Vec::new(),
            total_scores: None,
        }
    }
}

/// Why an order was discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Rejection {
    /// Unit id out of range.
    UnknownUnit,
    /// Unit has no health left.
    DeadUnit,
    /// Unit belongs to another player.
    NotOwner,
    /// Unit already had an order resolved this round.
    AlreadyResolved,
    /// Direction was [`Direction::None`].
    NoDirection,
    /// Destination lies outside the board.
    OffBoard,
    /// Destination is a wall.
    Wall,
    /// Destination holds a unit of the same player.
    Friendly,
    /// Destination holds an enemy and the unit type cannot attack.
    CannotAttack,
    /// Unit type cannot move.
    Immobile,
}

/// Something that happened while resolving a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RoundEvent {
    /// A unit relocated.
    Moved {
        /// Moving unit.
        unit: UnitId,
        /// Origin.
        from: Coord,
        /// Destination.
        to: Coord,
        /// Whether the destination became the mover's territory.
        claimed: bool,
    },
    /// A unit attacked an adjacent enemy.
    Attacked {
        /// Attacking unit.
        attacker: UnitId,
        /// Defending unit.
        defender: UnitId,
        /// Damage rolled.
        damage: u32,
        /// Position of the defender after capture, if it was captured.
        captured_to: Option<Coord>,
    },
    /// An order was discarded.
    Rejected {
        /// Unit named by the order.
        unit: UnitId,
        /// Player who submitted it.
        player: PlayerId,
        /// Reason.
        reason: Rejection,
    },
}

impl RoundEvent {
    const fn is_success(&self) -> bool {
        !matches!(self, RoundEvent::Rejected { .. })
    }
}

/// Result of resolving one round.
#[derive(Debug, Clone, PartialEq)]
pub struct Round {
    /// The new board.
    pub board: Board,
    /// Successful orders in resolution order.
    pub executed: Action,
    /// Everything that happened, in resolution order.
    pub events: Vec<RoundEvent>,
    /// Player resolution order drawn for this round.
    pub turn_order: Vec<PlayerId>,
}

/// Board state for one round.
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    catalog: Arc<UnitCatalog>,
    params: Arc<GameParams>,
    round: u32,
    grid: Grid,
    units: UnitSet,
    scores: Vec<u32>,
    total_scores: Vec<u64>,
    status: Vec<f64>,
}

impl Board {
    /// Build a board from parameters and an initial layout.
    ///
    /// With an empty unit list, `units_per_type[t]` units of every type are
    /// spawned for every player, player by player and type by type, at
    /// random free cells of the player's quadrant.
    ///
    /// # Errors
    ///
    /// Returns an error for inconsistent parameters, a grid of the wrong
    /// size, an owned wall, a partially populated unit list, an invalid
    /// unit, or a quadrant too full to spawn into.
    pub fn new<R: Rng + ?Sized>(
        catalog: Arc<UnitCatalog>,
        params: GameParams,
        layout: Layout,
        rng: &mut R,
    ) -> Result<Self, BoardError> {
        params.validate(&catalog)?;
        let players = usize::from(params.nb_players);

        let Layout {
            mut grid,
            units,
            round,
            status,
            total_scores,
        } = layout;

        if grid.rows() != params.rows || grid.cols() != params.cols {
            return Err(BoardError::GridMismatch {
                rows: usize::from(params.rows),
                cols: usize::from(params.cols),
                found_rows: usize::from(grid.rows()),
                found_cols: usize::from(grid.cols()),
            });
        }
        if round >= params.rounds {
            return Err(BoardError::RoundLimit {
                round,
                rounds: params.rounds,
            });
        }
        for (coord, cell) in grid.iter() {
            if let Some(owner) = cell.owner {
                if cell.terrain == Terrain::Wall {
                    return Err(BoardError::OwnedWall(coord));
                }
                if usize::from(owner) >= players {
                    return Err(BoardError::BadOwner { coord, owner });
                }
            }
        }
        grid.clear_units();

        let status = if status.is_empty() {
            vec![0.0; players]
        } else {
            check_player_vector("status values", &status, players)?;
            status
        };
        if let Some(totals) = &total_scores {
            check_player_vector("total scores", totals, players)?;
        }

        let mut board = Self {
            catalog,
            params: Arc::new(params),
            round,
            grid,
            units: UnitSet::new(),
            scores: vec![0; players],
            total_scores: vec![0; players],
            status,
        };

        let expected = board.params.expected_units();
        if units.is_empty() {
            board.generate_units(rng)?;
        } else if units.len() == expected {
            for (idx, record) in units.into_iter().enumerate() {
                board.place_record(idx, record)?;
            }
        } else {
            return Err(BoardError::PartialUnitList {
                found: units.len(),
                expected,
            });
        }

        board.scores = board.grid.territory(players);
        board.total_scores = total_scores
            .unwrap_or_else(|| board.scores.iter().map(|&s| u64::from(s)).collect());

        assert_invariants(&board);
        Ok(board)
    }

    fn generate_units<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), BoardError> {
        let params = Arc::clone(&self.params);
        let catalog = Arc::clone(&self.catalog);
        for player in 0..params.nb_players {
            for (kind, descriptor) in catalog.iter() {
                for _ in 0..params.units_per_type[kind.index()] {
                    let pos = self.find_spawn_cell(player, rng)?;
                    let id = self.units.push(kind, player, pos, descriptor.initial_health);
                    self.occupy(id, pos);
                    debug!(unit = id, player, kind = %descriptor.name, %pos, "spawned unit");
                }
            }
        }
        Ok(())
    }

    fn place_record(&mut self, idx: UnitId, record: UnitRecord) -> Result<(), BoardError> {
        let bad = |reason: String| BoardError::BadUnit { unit: idx, reason };

        if record.kind.index() >= self.catalog.len() {
            return Err(bad(format!("unknown unit type {}", record.kind.0)));
        }
        if record.player >= self.params.nb_players {
            return Err(bad(format!("unknown player {}", record.player)));
        }
        let max_health = self.catalog.get(record.kind).max_health;
        if record.health == 0 || record.health > max_health {
            return Err(bad(format!(
                "health {} outside 1..={max_health}",
                record.health
            )));
        }
        let Some(cell) = self.grid.get(record.pos) else {
            return Err(bad(format!("position {} is off the board", record.pos)));
        };
        if cell.terrain == Terrain::Wall {
            return Err(bad(format!("position {} is a wall", record.pos)));
        }
        if let Some(other) = cell.unit {
            return Err(bad(format!(
                "position {} is already occupied by unit {other}",
                record.pos
            )));
        }

        let id = self
            .units
            .push(record.kind, record.player, record.pos, record.health);
        if let Some(cell) = self.grid.get_mut(record.pos) {
            cell.unit = Some(id);
        }
        Ok(())
    }

    /// Pick a random free cell in a player's quadrant.
    ///
    /// Rejection sampling is capped; after that the quadrant is scanned in
    /// row-major order.
    fn find_spawn_cell<R: Rng + ?Sized>(
        &self,
        player: PlayerId,
        rng: &mut R,
    ) -> Result<Coord, BoardError> {
        let quadrant = Quadrant::for_player(player, self.grid.rows(), self.grid.cols())
            .ok_or(BoardError::QuadrantFull(player))?;

        let is_free = |coord: Coord| self.grid.get(coord).is_some_and(Cell::is_free);

        for _ in 0..quadrant.area() * SPAWN_ATTEMPTS_PER_CELL {
            let coord = Coord::new(
                rng.gen_range(quadrant.rows.clone()),
                rng.gen_range(quadrant.cols.clone()),
            );
            if is_free(coord) {
                return Ok(coord);
            }
        }

        warn!(player, "spawn sampling exhausted, scanning quadrant");
        quadrant
            .coords()
            .find(|&coord| is_free(coord))
            .ok_or(BoardError::QuadrantFull(player))
    }

    /// Put a unit on a free cell, vacating its previous cell if it still
    /// holds it. Capture-capable types claim the cell.
    fn occupy(&mut self, id: UnitId, pos: Coord) {
        let Some(unit) = self.units.get_mut(id) else {
            return;
        };
        let old = unit.pos;
        unit.pos = pos;
        let player = unit.player;
        let can_capture = self.catalog.get(unit.kind).can_capture;

        if old != pos {
            if let Some(cell) = self.grid.get_mut(old) {
                if cell.unit == Some(id) {
                    cell.unit = None;
                }
            }
        }
        if let Some(cell) = self.grid.get_mut(pos) {
            cell.unit = Some(id);
            if can_capture {
                cell.owner = Some(player);
            }
        }
    }

    /// Resolve one round.
    ///
    /// `actions[p]` holds player `p`'s orders; missing entries count as
    /// empty. Players are resolved in a freshly shuffled order, each
    /// player's orders in submission order. Invalid orders are discarded
    /// without affecting any other order. `self` is left untouched.
    ///
    /// A captured unit whose new owner's quadrant is full converts where it
    /// stands instead of respawning.
    pub fn next<R: Rng + ?Sized>(&self, actions: &[Action], rng: &mut R) -> Round {
        let mut board = self.clone();
        board.round += 1;

        let players = self.nb_players();
        if actions.len() > players {
            warn!(
                actions = actions.len(),
                players, "more actions than players, ignoring the extra ones"
            );
        }

        let mut turn_order: Vec<PlayerId> = (0..self.params.nb_players).collect();
        turn_order.shuffle(rng);

        let mut resolved = vec![false; board.units.len()];
        let mut acted = vec![false; board.units.len()];
        let mut executed = Action::new();
        let mut events = Vec::new();

        for &player in &turn_order {
            let Some(action) = actions.get(usize::from(player)) else {
                continue;
            };
            for order in action {
                let id = order.unit;
                let reject = |reason| RoundEvent::Rejected {
                    unit: id,
                    player,
                    reason,
                };

                let Some(unit) = board.units.get(id) else {
                    warn!(player, unit = id, "unit id out of range");
                    events.push(reject(Rejection::UnknownUnit));
                    continue;
                };
                if !unit.is_alive() {
                    warn!(player, unit = id, "order for a dead unit");
                    events.push(reject(Rejection::DeadUnit));
                    continue;
                }
                if unit.player != player {
                    warn!(
                        player,
                        unit = id,
                        owner = unit.player,
                        "order for another player's unit"
                    );
                    events.push(reject(Rejection::NotOwner));
                    continue;
                }
                if resolved[id] {
                    debug!(player, unit = id, "unit already resolved this round");
                    events.push(reject(Rejection::AlreadyResolved));
                    continue;
                }
                resolved[id] = true;

                let event = board.resolve_order(player, id, order.dir, rng);
                if event.is_success() {
                    acted[id] = true;
                    executed.submit(id, order.dir);
                } else {
                    debug!(player, unit = id, ?event, "order failed");
                }
                events.push(event);
            }
        }

        board.regenerate(&acted);
        board.update_scores();

        assert_invariants(&board);
        Round {
            board,
            executed,
            events,
            turn_order,
        }
    }

    /// Apply the move/attack rule for one unit.
    fn resolve_order<R: Rng + ?Sized>(
        &mut self,
        player: PlayerId,
        id: UnitId,
        dir: Direction,
        rng: &mut R,
    ) -> RoundEvent {
        let reject = |reason| RoundEvent::Rejected {
            unit: id,
            player,
            reason,
        };

        let Some(unit) = self.units.get(id).copied() else {
            return reject(Rejection::UnknownUnit);
        };
        if dir == Direction::None {
            return reject(Rejection::NoDirection);
        }
        let Some(dest) = unit.pos.step(dir).filter(|&c| self.grid.in_bounds(c)) else {
            return reject(Rejection::OffBoard);
        };
        let Some(cell) = self.grid.get(dest).copied() else {
            return reject(Rejection::OffBoard);
        };
        if cell.terrain == Terrain::Wall {
            return reject(Rejection::Wall);
        }
        let descriptor = self.catalog.get(unit.kind);

        match cell.unit {
            Some(target) => {
                let Some(defender) = self.units.get(target).copied() else {
                    return reject(Rejection::UnknownUnit);
                };
                if defender.player == player {
                    return reject(Rejection::Friendly);
                }
                if !descriptor.can_attack {
                    return reject(Rejection::CannotAttack);
                }
                let damage = self.params.damage.roll(rng);
                let captured_to = self.apply_damage(player, target, damage, rng);
                debug!(
                    attacker = id,
                    defender = target,
                    damage,
                    captured = captured_to.is_some(),
                    "attack"
                );
                RoundEvent::Attacked {
                    attacker: id,
                    defender: target,
                    damage,
                    captured_to,
                }
            }
            None => {
                if !descriptor.can_move {
                    return reject(Rejection::Immobile);
                }
                let claimed = descriptor.can_capture;
                self.occupy(id, dest);
                debug!(unit = id, from = %unit.pos, to = %dest, "move");
                RoundEvent::Moved {
                    unit: id,
                    from: unit.pos,
                    to: dest,
                    claimed,
                }
            }
        }
    }

    /// Damage a unit. A unit brought to zero health changes sides, heals
    /// fully and respawns in its new owner's quadrant, or stays put when
    /// that quadrant is full. Returns the unit's position after capture.
    fn apply_damage<R: Rng + ?Sized>(
        &mut self,
        attacker_player: PlayerId,
        target: UnitId,
        damage: u32,
        rng: &mut R,
    ) -> Option<Coord> {
        let (max_health, current) = {
            let defender = self.units.get_mut(target)?;
            defender.health = defender.health.saturating_sub(damage);
            if defender.health > 0 {
                return None;
            }
            defender.player = attacker_player;
            (self.catalog.get(defender.kind).max_health, defender.pos)
        };

        let pos = match self.find_spawn_cell(attacker_player, rng) {
            Ok(pos) => pos,
            Err(err) => {
                warn!(
                    unit = target,
                    player = attacker_player,
                    %err,
                    "no room to respawn, converting in place"
                );
                current
            }
        };
        if let Some(defender) = self.units.get_mut(target) {
            defender.health = max_health;
        }
        self.occupy(target, pos);
        debug!(unit = target, player = attacker_player, %pos, "unit captured");
        Some(pos)
    }

    /// Heal every unit that did not act.
    fn regenerate(&mut self, acted: &[bool]) {
        let catalog = Arc::clone(&self.catalog);
        for unit in self.units.iter_mut() {
            if acted.get(unit.id).copied().unwrap_or(false) {
                continue;
            }
            let descriptor = catalog.get(unit.kind);
            unit.health = unit
                .health
                .saturating_add(descriptor.regen)
                .min(descriptor.max_health);
        }
    }

    /// Recount territory and add it to the cumulative scores.
    fn update_scores(&mut self) {
        self.scores = self.grid.territory(self.nb_players());
        for (total, &land) in self.total_scores.iter_mut().zip(&self.scores) {
            *total += u64::from(land);
        }
    }

    /// Current round.
    #[must_use]
    pub const fn round(&self) -> u32 {
        self.round
    }

    /// Whether the round limit has been reached.
    #[must_use]
    pub fn is_over(&self) -> bool {
        self.round >= self.params.rounds
    }

    /// Game parameters.
    #[must_use]
    pub fn params(&self) -> &GameParams {
        &self.params
    }

    /// Unit type catalog.
    #[must_use]
    pub fn catalog(&self) -> &UnitCatalog {
        &self.catalog
    }

    /// Shared handle to the catalog.
    #[must_use]
    pub fn catalog_handle(&self) -> Arc<UnitCatalog> {
        Arc::clone(&self.catalog)
    }

    /// Number of players.
    #[must_use]
    pub fn nb_players(&self) -> usize {
        usize::from(self.params.nb_players)
    }

    /// Board rows.
    #[must_use]
    pub const fn rows(&self) -> u16 {
        self.grid.rows()
    }

    /// Board columns.
    #[must_use]
    pub const fn cols(&self) -> u16 {
        self.grid.cols()
    }

    /// The grid.
    #[must_use]
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Cell at a coordinate.
    #[must_use]
    pub fn cell(&self, coord: Coord) -> Option<&Cell> {
        self.grid.get(coord)
    }

    /// All units.
    #[must_use]
    pub const fn units(&self) -> &UnitSet {
        &self.units
    }

    /// Unit by id.
    #[must_use]
    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(id)
    }

    /// Descriptor of a unit's type.
    #[must_use]
    pub fn descriptor(&self, unit: &Unit) -> &UnitTypeDescriptor {
        self.catalog.get(unit.kind)
    }

    /// Territory owned by each player.
    #[must_use]
    pub fn scores(&self) -> &[u32] {
        &self.scores
    }

    /// Territory accumulated over all rounds so far.
    #[must_use]
    pub fn total_scores(&self) -> &[u64] {
        &self.total_scores
    }

    /// Per-player status values.
    #[must_use]
    pub fn status(&self) -> &[f64] {
        &self.status
    }

    /// Set a player's status value. Ignored for unknown players.
    pub fn set_status(&mut self, player: PlayerId, value: f64) {
        if let Some(slot) = self.status.get_mut(usize::from(player)) {
            *slot = value;
        }
    }

    /// Player display names.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.params.names
    }

    #[cfg(test)]
    pub(crate) fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }
}

fn check_player_vector<T>(
    what: &'static str,
    values: &[T],
    players: usize,
) -> Result<(), BoardError> {
    if values.len() == players {
        Ok(())
    } else {
        Err(BoardError::PlayerVector {
            what,
            expected: players,
            found: values.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const FARMER: UnitTypeId = UnitTypeId(0);
    const KNIGHT: UnitTypeId = UnitTypeId(1);

    fn params(rows: u16, cols: u16, counts: Vec<u32>) -> GameParams {
        GameParams {
            game_name: "skirmish".to_string(),
            version: "1.0".to_string(),
            nb_players: 2,
            rounds: 100,
            rows,
            cols,
            damage: DamageRange::new(1, 2).unwrap(),
            units_per_type: counts,
            names: GameParams::default_names(2),
        }
    }

    fn record(kind: UnitTypeId, player: PlayerId, row: u16, col: u16, health: u32) -> UnitRecord {
        UnitRecord {
            kind,
            player,
            pos: Coord::new(row, col),
            health,
        }
    }

    /// 6x6 board with one farmer and one knight per player.
    fn duel_board() -> Board {
        let layout = Layout {
            units: vec![
                record(FARMER, 0, 1, 1, 50),
                record(KNIGHT, 0, 2, 2, 200),
                record(FARMER, 1, 4, 4, 100),
                record(KNIGHT, 1, 2, 3, 200),
            ],
            ..Layout::from_grid(Grid::new(6, 6).unwrap())
        };
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        Board::new(
            Arc::new(UnitCatalog::standard()),
            params(6, 6, vec![1, 1, 0]),
            layout,
            &mut rng,
        )
        .unwrap()
    }

    fn orders(list: &[(UnitId, Direction)]) -> Action {
        let mut action = Action::new();
        for &(unit, dir) in list {
            action.submit(unit, dir);
        }
        action
    }

    #[test]
    fn test_damage_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let range = DamageRange::new(60, 90).unwrap();
        for _ in 0..1000 {
            let d = range.roll(&mut rng);
            assert!((60..90).contains(&d));
        }
        let fixed = DamageRange::new(7, 7).unwrap();
        assert_eq!(fixed.roll(&mut rng), 7);
        assert!(DamageRange::new(5, 4).is_err());
    }

    #[test]
    fn test_full_unit_list_is_placed_verbatim() {
        let board = duel_board();
        assert_eq!(board.units().len(), 4);
        assert_eq!(board.unit(1).unwrap().pos, Coord::new(2, 2));
        assert_eq!(board.cell(Coord::new(2, 2)).unwrap().unit, Some(1));
        assert_eq!(board.round(), 0);
        assert_eq!(board.scores(), &[0, 0]);
    }

    #[test]
    fn test_spawned_units_land_in_quadrants() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let board = Board::new(
            Arc::new(UnitCatalog::standard()),
            params(12, 12, vec![4, 2, 1]),
            Layout::from_grid(Grid::new(12, 12).unwrap()),
            &mut rng,
        )
        .unwrap();

        assert_eq!(board.units().len(), 14);
        for unit in board.units() {
            let quadrant = Quadrant::for_player(unit.player, 12, 12).unwrap();
            assert!(quadrant.contains(unit.pos));
            let descriptor = board.descriptor(unit);
            assert_eq!(unit.health, descriptor.initial_health);
            if descriptor.can_capture {
                assert_eq!(board.cell(unit.pos).unwrap().owner, Some(unit.player));
            }
        }
        // Ids are handed out player by player, type by type.
        assert_eq!(board.unit(0).unwrap().kind, FARMER);
        assert_eq!(board.unit(4).unwrap().kind, KNIGHT);
        assert_eq!(board.unit(7).unwrap().player, 1);
        // Farmers and witches claim their spawn cells.
        assert_eq!(board.scores(), &[5, 5]);
        assert_eq!(board.total_scores(), &[5, 5]);
    }

    #[test]
    fn test_partial_unit_list_rejected() {
        let layout = Layout {
            units: vec![record(FARMER, 0, 1, 1, 50)],
            ..Layout::from_grid(Grid::new(6, 6).unwrap())
        };
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let result = Board::new(
            Arc::new(UnitCatalog::standard()),
            params(6, 6, vec![1, 1, 0]),
            layout,
            &mut rng,
        );
        assert_eq!(
            result,
            Err(BoardError::PartialUnitList {
                found: 1,
                expected: 4
            })
        );
    }

    #[test]
    fn test_bad_parameters_rejected() {
        let catalog = Arc::new(UnitCatalog::standard());
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let result = Board::new(
            Arc::clone(&catalog),
            params(3, 6, vec![0, 0, 0]),
            Layout::from_grid(Grid::new(3, 6).unwrap()),
            &mut rng,
        );
        assert!(matches!(result, Err(BoardError::Dimensions { .. })));

        let result = Board::new(
            Arc::clone(&catalog),
            params(6, 6, vec![0, 0]),
            Layout::from_grid(Grid::new(6, 6).unwrap()),
            &mut rng,
        );
        assert!(matches!(result, Err(BoardError::TypeCounts { .. })));

        let result = Board::new(
            Arc::clone(&catalog),
            params(6, 6, vec![0, 0, 0]),
            Layout::from_grid(Grid::new(6, 7).unwrap()),
            &mut rng,
        );
        assert!(matches!(result, Err(BoardError::GridMismatch { .. })));

        let mut p = params(6, 6, vec![0, 0, 0]);
        p.nb_players = 5;
        p.names = GameParams::default_names(5);
        let result = Board::new(catalog, p, Layout::from_grid(Grid::new(6, 6).unwrap()), &mut rng);
        assert_eq!(result, Err(BoardError::PlayerCount(5)));
    }

    #[test]
    fn test_owned_wall_rejected() {
        let mut grid = Grid::new(6, 6).unwrap();
        grid.set(
            Coord::new(0, 0),
            Cell {
                owner: Some(0),
                ..Cell::wall()
            },
        );
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let result = Board::new(
            Arc::new(UnitCatalog::standard()),
            params(6, 6, vec![0, 0, 0]),
            Layout::from_grid(grid),
            &mut rng,
        );
        assert_eq!(result, Err(BoardError::OwnedWall(Coord::new(0, 0))));
    }

    #[test]
    fn test_unit_on_wall_rejected() {
        let mut grid = Grid::new(6, 6).unwrap();
        grid.set(Coord::new(1, 1), Cell::wall());
        let layout = Layout {
            units: vec![
                record(FARMER, 0, 1, 1, 50),
                record(KNIGHT, 0, 2, 2, 200),
                record(FARMER, 1, 4, 4, 100),
                record(KNIGHT, 1, 2, 3, 200),
            ],
            ..Layout::from_grid(grid)
        };
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let result = Board::new(
            Arc::new(UnitCatalog::standard()),
            params(6, 6, vec![1, 1, 0]),
            layout,
            &mut rng,
        );
        assert!(matches!(result, Err(BoardError::BadUnit { unit: 0, .. })));
    }

    #[test]
    fn test_full_quadrant_fails() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        // A 4x4 quadrant holds a single cell.
        let result = Board::new(
            Arc::new(UnitCatalog::standard()),
            params(4, 4, vec![2, 0, 0]),
            Layout::from_grid(Grid::new(4, 4).unwrap()),
            &mut rng,
        );
        assert_eq!(result.unwrap_err(), BoardError::QuadrantFull(0));
    }

    /// 4x4 board: every quadrant is one cell, and player 0's knight fills its own.
    fn crowded_board() -> Board {
        let layout = Layout {
            units: vec![record(KNIGHT, 0, 1, 1, 200), record(KNIGHT, 1, 1, 2, 1)],
            ..Layout::from_grid(Grid::new(4, 4).unwrap())
        };
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        Board::new(
            Arc::new(UnitCatalog::standard()),
            params(4, 4, vec![0, 1, 0]),
            layout,
            &mut rng,
        )
        .unwrap()
    }

    #[test]
    fn test_capture_into_full_quadrant_converts_in_place() {
        let board = crowded_board();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let round = board.next(&[orders(&[(0, Direction::East)]), Action::new()], &mut rng);

        let captured = round.board.unit(1).unwrap();
        assert_eq!(captured.player, 0);
        assert_eq!(captured.health, 200);
        assert_eq!(captured.pos, Coord::new(1, 2));
        assert_eq!(round.board.cell(Coord::new(1, 2)).unwrap().unit, Some(1));
        assert_eq!(
            round.events,
            vec![RoundEvent::Attacked {
                attacker: 0,
                defender: 1,
                damage: 1,
                captured_to: Some(Coord::new(1, 2)),
            }]
        );
    }

    #[test]
    fn test_full_quadrant_capture_keeps_other_orders() {
        let board = crowded_board();
        let actions = [
            orders(&[(0, Direction::East)]),
            orders(&[(1, Direction::South)]),
        ];

        for seed in 0..16 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let round = board.next(&actions, &mut rng);
            assert_eq!(round.board.round(), 1);

            if round.turn_order[0] == 1 {
                // The defender stepped away first, so the knight walks in.
                assert_eq!(round.board.unit(1).unwrap().pos, Coord::new(2, 2));
                assert_eq!(round.board.unit(0).unwrap().pos, Coord::new(1, 2));
                assert_eq!(round.executed.len(), 2);
            } else {
                assert_eq!(round.board.unit(1).unwrap().player, 0);
                assert!(round.events.contains(&RoundEvent::Rejected {
                    unit: 1,
                    player: 1,
                    reason: Rejection::NotOwner
                }));
            }
        }
    }

    #[test]
    fn test_next_leaves_old_board_untouched() {
        let board = duel_board();
        let before = board.clone();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let round = board.next(&[orders(&[(0, Direction::North)]), Action::new()], &mut rng);
        assert_eq!(board, before);
        assert_eq!(round.board.round(), 1);
        assert_eq!(round.board.unit(0).unwrap().pos, Coord::new(0, 1));
    }

    #[test]
    fn test_farmer_claims_destination_only() {
        let board = duel_board();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let round = board.next(&[orders(&[(0, Direction::East)]), Action::new()], &mut rng);
        let b = &round.board;
        assert_eq!(b.cell(Coord::new(1, 2)).unwrap().owner, Some(0));
        assert_eq!(b.cell(Coord::new(1, 1)).unwrap().owner, None);
        assert_eq!(b.scores(), &[1, 0]);
        assert_eq!(b.total_scores(), &[1, 0]);
    }

    #[test]
    fn test_knight_moves_without_claiming() {
        let board = duel_board();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let round = board.next(&[orders(&[(1, Direction::South)]), Action::new()], &mut rng);
        assert_eq!(round.board.unit(1).unwrap().pos, Coord::new(3, 2));
        assert_eq!(round.board.cell(Coord::new(3, 2)).unwrap().owner, None);
    }

    #[test]
    fn test_friendly_blocking() {
        let board = duel_board();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        // Unit 0 at (1,1) moving south lands on (2,1): free. Unit 1 at (2,2) moving
        // west lands on (2,1) as well, after unit 0 took it.
        let round = board.next(
            &[orders(&[(0, Direction::South), (1, Direction::West)]), Action::new()],
            &mut rng,
        );
        assert_eq!(round.executed.len(), 1);
        assert!(round.events.contains(&RoundEvent::Rejected {
            unit: 1,
            player: 0,
            reason: Rejection::Friendly
        }));
        assert_eq!(round.board.unit(1).unwrap().pos, Coord::new(2, 2));
    }

    #[test]
    fn test_attack_damages_without_moving() {
        let board = duel_board();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let round = board.next(&[orders(&[(1, Direction::East)]), Action::new()], &mut rng);
        let b = &round.board;
        assert_eq!(b.unit(1).unwrap().pos, Coord::new(2, 2));
        // 200 - 1 damage, then the defender regenerates back to its cap.
        assert_eq!(b.unit(3).unwrap().health, 200);
        assert_eq!(b.unit(3).unwrap().player, 1);
        assert!(matches!(
            round.events[0],
            RoundEvent::Attacked {
                attacker: 1,
                defender: 3,
                damage: 1,
                captured_to: None
            }
        ));
    }

    #[test]
    fn test_farmer_cannot_attack() {
        let layout = Layout {
            units: vec![
                record(FARMER, 0, 2, 2, 50),
                record(KNIGHT, 0, 1, 1, 200),
                record(FARMER, 1, 2, 3, 100),
                record(KNIGHT, 1, 4, 4, 200),
            ],
            ..Layout::from_grid(Grid::new(6, 6).unwrap())
        };
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let board = Board::new(
            Arc::new(UnitCatalog::standard()),
            params(6, 6, vec![1, 1, 0]),
            layout,
            &mut rng,
        )
        .unwrap();
        let round = board.next(&[orders(&[(0, Direction::East)]), Action::new()], &mut rng);
        assert!(round.executed.is_empty());
        assert!(round.events.contains(&RoundEvent::Rejected {
            unit: 0,
            player: 0,
            reason: Rejection::CannotAttack
        }));
        // Failed order still leaves the farmer eligible for regeneration.
        assert_eq!(round.board.unit(0).unwrap().health, 80);
    }

    #[test]
    fn test_order_for_foreign_unit_is_ignored() {
        let board = duel_board();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let round = board.next(
            &[orders(&[(2, Direction::North)]), orders(&[(2, Direction::West)])],
            &mut rng,
        );
        // Player 1's own order always goes through, whatever the turn order.
        assert_eq!(round.board.unit(2).unwrap().pos, Coord::new(4, 3));
        assert!(round.events.contains(&RoundEvent::Rejected {
            unit: 2,
            player: 0,
            reason: Rejection::NotOwner
        }));
    }

    #[test]
    fn test_unknown_unit_does_not_abort_round() {
        let board = duel_board();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let round = board.next(
            &[orders(&[(99, Direction::North), (0, Direction::North)]), Action::new()],
            &mut rng,
        );
        assert_eq!(round.executed.orders().len(), 1);
        assert_eq!(round.board.unit(0).unwrap().pos, Coord::new(0, 1));
    }

    #[test]
    fn test_immobile_type_cannot_move() {
        let catalog = UnitCatalog::new(vec![
            UnitTypeDescriptor::new("towers", 't', 10).immobile().attacker(),
        ])
        .unwrap();
        let layout = Layout {
            units: vec![record(UnitTypeId(0), 0, 1, 1, 10), record(UnitTypeId(0), 1, 4, 4, 10)],
            ..Layout::from_grid(Grid::new(6, 6).unwrap())
        };
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let board = Board::new(Arc::new(catalog), params(6, 6, vec![1]), layout, &mut rng).unwrap();
        let round = board.next(&[orders(&[(0, Direction::East)]), Action::new()], &mut rng);
        assert_eq!(round.board.unit(0).unwrap().pos, Coord::new(1, 1));
        assert!(round.executed.is_empty());
    }

    #[test]
    fn test_status_is_carried() {
        let mut board = duel_board();
        board.set_status(1, 0.25);
        board.set_status(9, 1.0);
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let round = board.next(&[], &mut rng);
        assert_eq!(round.board.status(), &[0.0, 0.25]);
    }

    #[test]
    fn test_round_limit() {
        let layout = Layout {
            round: 100,
            ..Layout::from_grid(Grid::new(6, 6).unwrap())
        };
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let result = Board::new(
            Arc::new(UnitCatalog::standard()),
            params(6, 6, vec![0, 0, 0]),
            layout,
            &mut rng,
        );
        assert!(matches!(result, Err(BoardError::RoundLimit { .. })));
    }
}
