//! Units and the dense unit table.

use serde::Serialize;

use crate::game::{Coord, UnitTypeId};

/// Index of a player, `0..nb_players`.
pub type PlayerId = u8;

/// Stable id of a unit, `0..nb_units`. Ids are never reused or removed.
pub type UnitId = usize;

/// A unit on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Unit {
    /// Stable identifier, equal to the unit's index in its [`UnitSet`].
    pub id: UnitId,
    /// Unit type.
    pub kind: UnitTypeId,
    /// Owning player.
    pub player: PlayerId,
    /// Current position.
    pub pos: Coord,
    /// Current health, always in `1..=max_health`.
    pub health: u32,
}

impl Unit {
    /// Whether the unit is alive. Capture resets health, so this only fails
    /// on a corrupted board.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.health > 0
    }
}

/// Dense collection of units addressable by id.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct UnitSet {
    units: Vec<Unit>,
}

impl UnitSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a unit, assigning it the next id.
    pub fn push(&mut self, kind: UnitTypeId, player: PlayerId, pos: Coord, health: u32) -> UnitId {
        let id = self.units.len();
        self.units.push(Unit {
            id,
            kind,
            player,
            pos,
            health,
        });
        id
    }

    /// Number of units.
    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Whether there are no units.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Unit by id.
    #[must_use]
    pub fn get(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(id)
    }

    /// Mutable unit by id.
    #[must_use]
    pub fn get_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.units.get_mut(id)
    }

    /// All units in id order.
    pub fn iter(&self) -> std::slice::Iter<'_, Unit> {
        self.units.iter()
    }

    /// Mutable iteration in id order.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Unit> {
        self.units.iter_mut()
    }

    /// Units owned by a player.
    pub fn owned_by(&self, player: PlayerId) -> impl Iterator<Item = &Unit> {
        self.units.iter().filter(move |u| u.player == player)
    }

    /// Ids of the units of one type owned by one player, in id order.
    pub fn ids_of(&self, kind: UnitTypeId, player: PlayerId) -> impl Iterator<Item = UnitId> + '_ {
        self.units
            .iter()
            .filter(move |u| u.kind == kind && u.player == player)
            .map(|u| u.id)
    }

    /// Count of units of one type owned by one player.
    #[must_use]
    pub fn count_of(&self, kind: UnitTypeId, player: PlayerId) -> usize {
        self.ids_of(kind, player).count()
    }
}

impl<'a> IntoIterator for &'a UnitSet {
    type Item = &'a Unit;
    type IntoIter = std::slice::Iter<'a, Unit>;

    fn into_iter(self) -> Self::IntoIter {
        self.units.iter()
    }
}
