//! Configuration System
//!
//! Loads tuning parameters from tuning.toml for easy adjustment without
//! recompiling.

use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::social::InteractionKind;
use crate::systems::EncounterSettings;

/// Default tuning file path
pub const DEFAULT_TUNING_PATH: &str = "tuning.toml";

/// Top-level configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub simulation: SimulationConfig,
    pub population: PopulationConfig,
    pub encounter: EncounterConfig,
}

/// Simulation parameters
#[derive(Debug, Clone, Deserialize)]
pub struct SimulationConfig {
    pub default_ticks: u64,
    pub snapshot_interval: u64,
    pub seed: u64,
}

/// Population mix and starting conditions
#[derive(Debug, Clone, Deserialize)]
pub struct PopulationConfig {
    pub citizens: usize,
    pub merchants: usize,
    pub watch: usize,
    pub underworld: usize,
    pub starting_coin: i64,
    /// NPCs spawn with homes scattered inside this radius.
    pub town_radius: f32,
}

/// Ambient encounter tuning
#[derive(Debug, Clone, Deserialize)]
pub struct EncounterConfig {
    pub scan_interval: u64,
    pub ambient_chance: f32,
    pub friendly_floor: i32,
    pub hostile_ceiling: i32,
    pub friendly_weights: WeightTable,
    pub hostile_weights: WeightTable,
    pub mixed_weights: WeightTable,
}

/// Per-kind interaction weights as they appear in the tuning file. Absent
/// kinds weigh zero and are dropped from the table.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WeightTable {
    #[serde(default)]
    pub greeting: u32,
    #[serde(default)]
    pub conversation: u32,
    #[serde(default)]
    pub trade: u32,
    #[serde(default)]
    pub help_request: u32,
    #[serde(default)]
    pub argument: u32,
}

impl WeightTable {
    fn to_weights(&self) -> Vec<(InteractionKind, u32)> {
        [
            (InteractionKind::Greeting, self.greeting),
            (InteractionKind::Conversation, self.conversation),
            (InteractionKind::Trade, self.trade),
            (InteractionKind::HelpRequest, self.help_request),
            (InteractionKind::Argument, self.argument),
        ]
        .into_iter()
        .filter(|(_, w)| *w > 0)
        .collect()
    }
}

impl EncounterConfig {
    /// Builds the resource the encounter systems read.
    pub fn to_settings(&self) -> EncounterSettings {
        EncounterSettings {
            scan_interval: self.scan_interval.max(1),
            ambient_chance: self.ambient_chance.clamp(0.0, 1.0),
            friendly_floor: self.friendly_floor,
            hostile_ceiling: self.hostile_ceiling,
            friendly_weights: self.friendly_weights.to_weights(),
            hostile_weights: self.hostile_weights.to_weights(),
            mixed_weights: self.mixed_weights.to_weights(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration from default path, or use defaults if not found
    pub fn load_or_default() -> Self {
        Self::load(DEFAULT_TUNING_PATH).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "could not load tuning.toml, using defaults");
            Self::default()
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            simulation: SimulationConfig {
                default_ticks: 48_000,
                snapshot_interval: 6_000,
                seed: 42,
            },
            population: PopulationConfig {
                citizens: 12,
                merchants: 6,
                watch: 4,
                underworld: 4,
                starting_coin: 500,
                town_radius: 40.0,
            },
            encounter: EncounterConfig {
                scan_interval: 50,
                ambient_chance: 0.1,
                friendly_floor: 30,
                hostile_ceiling: -30,
                friendly_weights: WeightTable {
                    greeting: 2,
                    conversation: 4,
                    trade: 2,
                    help_request: 2,
                    argument: 0,
                },
                hostile_weights: WeightTable {
                    greeting: 1,
                    conversation: 0,
                    trade: 0,
                    help_request: 0,
                    argument: 5,
                },
                mixed_weights: WeightTable {
                    greeting: 4,
                    conversation: 2,
                    trade: 1,
                    help_request: 0,
                    argument: 1,
                },
            },
        }
    }
}

/// Configuration error type
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),
}
