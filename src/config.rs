//! Server and level configuration.
//!
//! Both structs load from TOML with every field optional; missing fields
//! fall back to the classic 10x10 game.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::game::{CoinTier, DEFAULT_HEIGHT, DEFAULT_WIDTH};

/// Walls placed on a default board.
pub const DEFAULT_WALLS: u16 = 7;

/// Coins per tier on a default board, indexed by tier value minus one.
pub const DEFAULT_COINS: [u16; 3] = [3, 2, 1];

/// Largest board, in cells, a lobby may generate.
pub const MAX_CELLS: usize = 1 << 16;

/// Shape of the board generated when a lobby starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LevelConfig {
    /// Board width in columns.
    pub width: i16,
    /// Board height in rows.
    pub height: i16,
    /// Number of wall cells.
    pub walls: u16,
    /// Coins of tier 1, 2 and 3.
    pub coins: [u16; 3],
    /// Fixed seed for level generation. Each lobby mixes in its own name,
    /// so lobbies still differ. `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            walls: DEFAULT_WALLS,
            coins: DEFAULT_COINS,
            seed: None,
        }
    }
}

impl LevelConfig {
    /// Number of coins of one tier.
    #[must_use]
    pub const fn coins_of(&self, tier: CoinTier) -> u16 {
        self.coins[tier as usize - 1]
    }

    /// Total number of coins across all tiers.
    #[must_use]
    pub fn total_coins(&self) -> usize {
        self.coins.iter().map(|&n| usize::from(n)).sum()
    }

    /// Number of cells on the board, treating negative sides as their size.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        usize::from(self.width.unsigned_abs()) * usize::from(self.height.unsigned_abs())
    }
}

/// Top-level server configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Level used for every new lobby.
    pub level: LevelConfig,
    /// Number of lobby worker threads.
    pub workers: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            level: LevelConfig::default(),
            workers: 4,
        }
    }
}

/// Failure to load a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    /// The file is not valid TOML for this schema.
    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),
    /// The values parse but cannot describe a playable server.
    #[error("invalid config: {0}")]
    Invalid(String),
}

impl ServerConfig {
    /// Parse a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML, has unknown keys, or
    /// describes an empty or oversized board, a level without coins, or
    /// zero workers.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Check values that deserialize fine but cannot run.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.level.width <= 0 || self.level.height <= 0 {
            return Err(ConfigError::Invalid(format!(
                "board must be at least 1x1, got {}x{}",
                self.level.width, self.level.height
            )));
        }
        if self.level.cell_count() > MAX_CELLS {
            return Err(ConfigError::Invalid(format!(
                "board of {}x{} exceeds {MAX_CELLS} cells",
                self.level.width, self.level.height
            )));
        }
        if self.level.total_coins() == 0 {
            return Err(ConfigError::Invalid("level must place at least one coin".to_string()));
        }
        if self.workers == 0 {
            return Err(ConfigError::Invalid("workers must be at least 1".to_string()));
        }
        Ok(())
    }
}
