//! External Event Types
//!
//! The input surface of the engine: things that happen to NPCs from outside
//! the ambient simulation (player trades, witnessed crimes, gifts, threats).
//! The host pushes these into the core's event queue; one system drains and
//! applies them each tick.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What happened, and to whom.
///
/// `actor` is the outside identity (usually a player) the affected NPC will
/// remember; `npc` is the NPC whose state absorbs the event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SocialEventKind {
    /// A completed trade between an actor and an NPC.
    Transaction {
        actor: Uuid,
        npc: Uuid,
        value: i64,
        fair: bool,
    },
    /// An NPC saw the actor commit a crime.
    CrimeWitnessed {
        actor: Uuid,
        npc: Uuid,
        /// Severity in 1..=10; out-of-range values are clamped downstream.
        severity: i32,
        /// Crimes against the underworld itself earn no underworld favor.
        against_underworld: bool,
        x: f32,
        y: f32,
    },
    /// The actor gave an NPC something for nothing.
    Gift { actor: Uuid, npc: Uuid, value: i64 },
    /// The actor helped an NPC out.
    HelpGiven { actor: Uuid, npc: Uuid },
    /// The actor threatened an NPC.
    ThreatMade { actor: Uuid, npc: Uuid },
    /// The actor completed a task for an NPC.
    QuestCompleted { actor: Uuid, npc: Uuid },
    /// The host removed an entity; registries drop their records of it.
    ActorDeparted { actor: Uuid },
}

/// An event envelope with identity and timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialEvent {
    pub id: Uuid,
    /// Tick at which the event occurred.
    pub tick: u64,
    #[serde(flatten)]
    pub kind: SocialEventKind,
}

impl SocialEvent {
    /// Creates an event with a fresh id.
    pub fn new(tick: u64, kind: SocialEventKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            tick,
            kind,
        }
    }
}
