//! Game configuration.
//!
//! Tunables for a game session. Every field has a default, so a JSON file
//! only needs to list what it overrides.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::board::Faction;

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration for a single game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Seed for the shared random generator.
    pub seed: u64,
    /// Influence tie-break fires once the turn counter exceeds this.
    pub turn_limit: u32,
    /// Consecutive round boundaries a faction must hold every key junction.
    pub control_threshold: u32,
    /// Battle reports kept in the snapshot.
    pub battle_history_capacity: usize,
    /// Narration entries kept in the snapshot.
    pub journal_capacity: usize,
    /// Chance (0-100) that a fluctuation event fires on FLUCTUATION entry.
    pub event_chance_percent: u32,
    /// Faction that opens every turn.
    pub first_player: Faction,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            seed: 0,
            turn_limit: 20,
            control_threshold: 2,
            battle_history_capacity: 5,
            journal_capacity: 200,
            event_chance_percent: 60,
            first_player: Faction::Blue,
        }
    }
}

impl GameConfig {
    pub fn from_json_str(json: &str) -> Result<GameConfig, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<GameConfig, ConfigError> {
        let text = fs::read_to_string(path)?;
        GameConfig::from_json_str(&text)
    }
}
