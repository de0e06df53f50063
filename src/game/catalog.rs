//! Unit type catalog.
//!
//! Types are resolved once at load time into a dense table indexed by
//! [`UnitTypeId`]. The round resolver only ever touches the table by index.

use std::collections::HashSet;

use serde::Serialize;

use crate::error::CatalogError;

/// Dense index of a unit type inside its [`UnitCatalog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct UnitTypeId(pub u8);

impl UnitTypeId {
    /// Index into the catalog table.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Numeric parameters governing one unit type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitTypeDescriptor {
    /// Type name, e.g. `farmers`.
    pub name: String,
    /// Single-character symbol used in snapshots.
    pub symbol: char,
    /// Health cap, also the health a captured unit respawns with.
    pub max_health: u32,
    /// Health of a freshly spawned unit.
    pub initial_health: u32,
    /// Health regained on a round without a successful move or attack.
    pub regen: u32,
    /// Movement range. Resolution moves one cell per round.
    pub move_range: u32,
    /// Attack range. Resolution attacks the adjacent cell only.
    pub attack_range: u32,
    /// Per-type attack power. Combat rolls the board's global damage range instead.
    pub attack_power: u32,
    /// Per-type defense. Not consulted by combat.
    pub defense: u32,
    /// Whether the unit may relocate.
    pub can_move: bool,
    /// Whether the unit may attack enemy units.
    pub can_attack: bool,
    /// Whether cells the unit enters become its owner's territory.
    pub can_capture: bool,
    /// Free-form ability tags.
    pub abilities: Vec<String>,
}

impl UnitTypeDescriptor {
    /// Create a descriptor with full health, no regeneration and no capabilities
    /// apart from movement.
    #[must_use]
    pub fn new(name: impl Into<String>, symbol: char, max_health: u32) -> Self {
        Self {
            name: name.into(),
            symbol,
            max_health,
            initial_health: max_health,
            regen: 0,
            move_range: 1,
            attack_range: 1,
            attack_power: 0,
            defense: 0,
            can_move: true,
            can_attack: false,
            can_capture: false,
            abilities: Vec::new(),
        }
    }

    /// Set the per-round regeneration.
    #[must_use]
    pub fn with_regen(mut self, regen: u32) -> Self {
        self.regen = regen;
        self
    }

    /// Set the initial health.
    #[must_use]
    pub fn with_initial_health(mut self, initial_health: u32) -> Self {
        self.initial_health = initial_health;
        self
    }

    /// Allow the unit to attack.
    #[must_use]
    pub fn attacker(mut self) -> Self {
        self.can_attack = true;
        self
    }

    /// Allow the unit to capture cells.
    #[must_use]
    pub fn capturer(mut self) -> Self {
        self.can_capture = true;
        self
    }

    /// Forbid relocation.
    #[must_use]
    pub fn immobile(mut self) -> Self {
        self.can_move = false;
        self
    }

    fn validate(&self) -> Result<(), CatalogError> {
        if !self.symbol.is_ascii_graphic() || matches!(self.symbol, '.' | 'X' | '-') {
            return Err(CatalogError::BadSymbol {
                name: self.name.clone(),
                symbol: self.symbol,
            });
        }
        if self.max_health == 0 {
            return Err(CatalogError::MaxHealth {
                name: self.name.clone(),
                max_health: self.max_health,
            });
        }
        if self.initial_health == 0 || self.initial_health > self.max_health {
            return Err(CatalogError::InitialHealth {
                name: self.name.clone(),
                initial: self.initial_health,
                max_health: self.max_health,
            });
        }
        Ok(())
    }
}

/// Immutable registry of unit types.
///
/// Iteration order is the load order and is stable, so generated unit ids
/// are reproducible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitCatalog {
    types: Vec<UnitTypeDescriptor>,
}

impl UnitCatalog {
    /// Build a catalog, rejecting any inconsistent descriptor.
    ///
    /// # Errors
    ///
    /// Returns an error if the list is empty or too long, if names or symbols
    /// repeat, or if any descriptor has impossible health values.
    pub fn new(types: Vec<UnitTypeDescriptor>) -> Result<Self, CatalogError> {
        if types.is_empty() {
            return Err(CatalogError::Empty);
        }
        if types.len() > usize::from(u8::MAX) {
            return Err(CatalogError::TooManyTypes(types.len()));
        }

        let mut names = HashSet::new();
        let mut symbols = HashSet::new();
        for descriptor in &types {
            descriptor.validate()?;
            if !names.insert(descriptor.name.as_str()) {
                return Err(CatalogError::DuplicateName(descriptor.name.clone()));
            }
            if !symbols.insert(descriptor.symbol) {
                return Err(CatalogError::DuplicateSymbol(descriptor.symbol));
            }
        }

        Ok(Self { types })
    }

    /// The standard three-type game: farmers capture land, knights fight,
    /// witches do both.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            types: vec![
                UnitTypeDescriptor::new("farmers", 'f', 100)
                    .with_regen(30)
                    .capturer(),
                UnitTypeDescriptor::new("knights", 'k', 200)
                    .with_regen(30)
                    .attacker(),
                UnitTypeDescriptor::new("witches", 'w', 100)
                    .with_regen(10)
                    .attacker()
                    .capturer(),
            ],
        }
    }

    /// Number of types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether the catalog is empty. Never true for a validated catalog.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Descriptor for a type id.
    ///
    /// # Panics
    ///
    /// Panics if the id did not come from this catalog.
    #[must_use]
    pub fn get(&self, id: UnitTypeId) -> &UnitTypeDescriptor {
        &self.types[id.index()]
    }

    /// Look a type up by name.
    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<(UnitTypeId, &UnitTypeDescriptor)> {
        self.iter().find(|(_, d)| d.name == name)
    }

    /// Look a type up by symbol.
    #[must_use]
    pub fn by_symbol(&self, symbol: char) -> Option<(UnitTypeId, &UnitTypeDescriptor)> {
        self.iter().find(|(_, d)| d.symbol == symbol)
    }

    /// Type names in load order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.types.iter().map(|d| d.name.as_str())
    }

    /// All types with their ids, in load order.
    pub fn iter(&self) -> impl Iterator<Item = (UnitTypeId, &UnitTypeDescriptor)> {
        self.types.iter().enumerate().map(|(idx, d)| {
            #[allow(clippy::cast_possible_truncation)]
            let id = UnitTypeId(idx as u8);
            (id, d)
        })
    }
}
