//! Snapshot Types
//!
//! String-typed observability records the core writes as JSON. Enum-valued
//! fields are rendered as plain strings so readers do not need the engine's
//! type definitions.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Psychological readout for one NPC at snapshot time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NpcSnapshot {
    pub id: Uuid,
    pub name: String,
    pub faction: String,
    pub energy: f32,
    pub safety: f32,
    pub sleeping: bool,
    pub emotion: String,
    pub emotion_intensity: f32,
    pub price_modifier: f32,
    pub social_modifier: f32,
    pub archetype: String,
    pub memory_subjects: usize,
    pub known_rumors: usize,
}

/// Average disposition of one faction's NPCs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactionMoodSnapshot {
    pub faction: String,
    pub members: usize,
    pub average_energy: f32,
    pub average_safety: f32,
}

/// A full world snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub tick: u64,
    pub day: u64,
    pub reason: String,
    pub npcs: Vec<NpcSnapshot>,
    pub faction_moods: Vec<FactionMoodSnapshot>,
    pub tracked_rumor_subjects: usize,
    pub active_rumors: usize,
}

impl WorldSnapshot {
    /// Creates an empty snapshot shell for the given moment.
    pub fn new(tick: u64, day: u64, reason: impl Into<String>) -> Self {
        Self {
            tick,
            day,
            reason: reason.into(),
            npcs: Vec::new(),
            faction_moods: Vec::new(),
            tracked_rumor_subjects: 0,
            active_rumors: 0,
        }
    }
}
