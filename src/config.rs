//! Game configuration loaded from TOML.
//!
//! ```toml
//! [game]
//! name = "skirmish"
//! players = 2
//! rounds = 200
//! rows = 20
//! cols = 20
//! damage_min = 60
//! damage_max = 90
//!
//! [[unit_types]]
//! name = "farmers"
//! symbol = "f"
//! max_health = 100
//! regen = 30
//! can_capture = true
//! count = 8
//! ```
//!
//! Every field has a default; an empty file yields the standard game.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{BoardError, CatalogError};
use crate::game::{
    DamageRange, GameParams, MAX_PLAYERS, MIN_DIMENSION, MIN_PLAYERS, UnitCatalog,
    UnitTypeDescriptor,
};

/// Errors raised while loading a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid TOML for a configuration.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    /// No rounds to play.
    #[error("rounds must be at least 1")]
    NoRounds,
    /// The unit types are inconsistent.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    /// The board parameters are inconsistent.
    #[error(transparent)]
    Board(#[from] BoardError),
}

/// Game-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSection {
    /// Game name.
    pub name: String,
    /// Game version.
    pub version: String,
    /// Number of players.
    #[serde(alias = "max_players")]
    pub players: u8,
    /// Round limit.
    pub rounds: u32,
    /// Board rows.
    pub rows: u16,
    /// Board columns.
    pub cols: u16,
    /// Minimum combat damage.
    pub damage_min: u32,
    /// Maximum combat damage, exclusive.
    pub damage_max: u32,
}

impl Default for GameSection {
    fn default() -> Self {
        let damage = DamageRange::default();
        Self {
            name: "skirmish".to_string(),
            version: "1.0".to_string(),
            players: 2,
            rounds: 200,
            rows: 20,
            cols: 20,
            damage_min: damage.min(),
            damage_max: damage.max(),
        }
    }
}

/// One unit type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitTypeConfig {
    /// Type name.
    pub name: String,
    /// Snapshot symbol.
    pub symbol: char,
    /// Health cap.
    pub max_health: u32,
    /// Spawn health, `max_health` when omitted.
    #[serde(default)]
    pub initial_health: Option<u32>,
    /// Health regained per idle round.
    #[serde(default)]
    pub regen: u32,
    /// Movement range.
    #[serde(default = "one")]
    pub move_range: u32,
    /// Attack range.
    #[serde(default = "one")]
    pub attack_range: u32,
    /// Attack power.
    #[serde(default)]
    pub attack_power: u32,
    /// Defense.
    #[serde(default)]
    pub defense: u32,
    /// Whether entered cells become territory.
    #[serde(default)]
    pub can_capture: bool,
    /// Whether the unit may relocate.
    #[serde(default = "yes")]
    pub can_move: bool,
    /// Whether the unit may attack.
    #[serde(default)]
    pub can_attack: bool,
    /// Free-form ability tags.
    #[serde(default)]
    pub abilities: Vec<String>,
    /// Units of this type per player.
    #[serde(default)]
    pub count: u32,
}

const fn one() -> u32 {
    1
}

const fn yes() -> bool {
    true
}

impl UnitTypeConfig {
    fn from_descriptor(descriptor: &UnitTypeDescriptor, count: u32) -> Self {
        Self {
            name: descriptor.name.clone(),
            symbol: descriptor.symbol,
            max_health: descriptor.max_health,
            initial_health: Some(descriptor.initial_health),
            regen: descriptor.regen,
            move_range: descriptor.move_range,
            attack_range: descriptor.attack_range,
            attack_power: descriptor.attack_power,
            defense: descriptor.defense,
            can_capture: descriptor.can_capture,
            can_move: descriptor.can_move,
            can_attack: descriptor.can_attack,
            abilities: descriptor.abilities.clone(),
            count,
        }
    }

    fn to_descriptor(&self) -> UnitTypeDescriptor {
        UnitTypeDescriptor {
            name: self.name.clone(),
            symbol: self.symbol,
            max_health: self.max_health,
            initial_health: self.initial_health.unwrap_or(self.max_health),
            regen: self.regen,
            move_range: self.move_range,
            attack_range: self.attack_range,
            attack_power: self.attack_power,
            defense: self.defense,
            can_move: self.can_move,
            can_attack: self.can_attack,
            can_capture: self.can_capture,
            abilities: self.abilities.clone(),
        }
    }
}

/// Complete game configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Game-wide settings.
    #[serde(default)]
    pub game: GameSection,
    /// Unit types in load order.
    #[serde(default = "standard_unit_types")]
    pub unit_types: Vec<UnitTypeConfig>,
}

fn standard_unit_types() -> Vec<UnitTypeConfig> {
    const STANDARD_COUNTS: [u32; 3] = [8, 4, 2];
    UnitCatalog::standard()
        .iter()
        .zip(STANDARD_COUNTS)
        .map(|((_, descriptor), count)| UnitTypeConfig::from_descriptor(descriptor, count))
        .collect()
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            game: GameSection::default(),
            unit_types: standard_unit_types(),
        }
    }
}

impl GameConfig {
    /// Parse and validate a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text does not parse or the result is invalid.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, does not parse, or is invalid.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Check the configuration.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let players = usize::from(self.game.players);
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&players) {
            return Err(BoardError::PlayerCount(players).into());
        }
        if self.game.rounds == 0 {
            return Err(ConfigError::NoRounds);
        }
        if self.game.rows < MIN_DIMENSION || self.game.cols < MIN_DIMENSION {
            return Err(BoardError::Dimensions {
                rows: usize::from(self.game.rows),
                cols: usize::from(self.game.cols),
            }
            .into());
        }
        DamageRange::new(self.game.damage_min, self.game.damage_max)?;
        self.catalog()?;
        Ok(())
    }

    /// Build the unit catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the unit types are inconsistent.
    pub fn catalog(&self) -> Result<UnitCatalog, ConfigError> {
        let types = self.unit_types.iter().map(UnitTypeConfig::to_descriptor).collect();
        Ok(UnitCatalog::new(types)?)
    }

    /// Build the game parameters. Missing names default to `Player<n>`.
    ///
    /// # Errors
    ///
    /// Returns an error if the damage range is inconsistent.
    pub fn params(&self, names: Option<Vec<String>>) -> Result<GameParams, ConfigError> {
        Ok(GameParams {
            game_name: self.game.name.clone(),
            version: self.game.version.clone(),
            nb_players: self.game.players,
            rounds: self.game.rounds,
            rows: self.game.rows,
            cols: self.game.cols,
            damage: DamageRange::new(self.game.damage_min, self.game.damage_max)?,
            units_per_type: self.unit_types.iter().map(|t| t.count).collect(),
            names: names.unwrap_or_else(|| GameParams::default_names(self.game.players)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_standard_game() {
        let config = GameConfig::default();
        config.validate().unwrap();
        assert_eq!(config.catalog().unwrap(), UnitCatalog::standard());

        let params = config.params(None).unwrap();
        assert_eq!(params.units_per_type, vec![8, 4, 2]);
        assert_eq!(params.names, vec!["Player0", "Player1"]);
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(GameConfig::from_toml_str("").unwrap(), GameConfig::default());
    }

    #[test]
    fn test_parse_custom_types() {
        let config = GameConfig::from_toml_str(
            r#"
            [game]
            max_players = 3
            rounds = 50
            rows = 10
            cols = 12

            [[unit_types]]
            name = "archers"
            symbol = "a"
            max_health = 80
            initial_health = 40
            attack_range = 3
            can_attack = true
            abilities = ["volley"]
            count = 2

            [[unit_types]]
            name = "towers"
            symbol = "t"
            max_health = 300
            can_move = false
            can_attack = true
            count = 1
            "#,
        )
        .unwrap();

        assert_eq!(config.game.players, 3);
        let catalog = config.catalog().unwrap();
        let (_, archers) = catalog.by_name("archers").unwrap();
        assert_eq!(archers.initial_health, 40);
        assert_eq!(archers.attack_range, 3);
        assert_eq!(archers.move_range, 1);
        assert!(archers.can_move);
        assert_eq!(archers.abilities, vec!["volley"]);
        let (_, towers) = catalog.by_symbol('t').unwrap();
        assert!(!towers.can_move);
        assert_eq!(towers.initial_health, 300);

        let params = config.params(Some(vec!["a".into(), "b".into(), "c".into()])).unwrap();
        assert_eq!(params.units_per_type, vec![2, 1]);
        assert_eq!(params.rounds, 50);
    }

    #[test]
    fn test_validation_errors() {
        let err = GameConfig::from_toml_str("[game]\nplayers = 5\n").unwrap_err();
        assert!(matches!(err, ConfigError::Board(BoardError::PlayerCount(5))));

        let err = GameConfig::from_toml_str("[game]\nrounds = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::NoRounds));

        let err = GameConfig::from_toml_str("[game]\nrows = 3\n").unwrap_err();
        assert!(matches!(err, ConfigError::Board(BoardError::Dimensions { .. })));

        let err = GameConfig::from_toml_str("[game]\ndamage_min = 10\ndamage_max = 5\n").unwrap_err();
        assert!(matches!(err, ConfigError::Board(BoardError::DamageRange { .. })));

        let err = GameConfig::from_toml_str(
            "[[unit_types]]\nname = \"a\"\nsymbol = \"a\"\nmax_health = 0\n",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Catalog(CatalogError::MaxHealth { .. })));

        let err = GameConfig::from_toml_str("unit_types = 3").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = GameConfig::load(Path::new("/nonexistent/skirmish.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("skirmish.toml"));
    }
}
