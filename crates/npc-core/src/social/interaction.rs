//! Interaction Arbitration
//!
//! World-scoped brokering of NPC-to-NPC interactions: range and cooldown
//! checks, one live context per participant, and fixed per-kind durations
//! and relation effects. Durations and cooldowns are countdown integers
//! decremented once per world tick, never wall-clock timers.

use std::collections::BTreeMap;

use bevy_ecs::prelude::*;
use uuid::Uuid;

use crate::components::emotions::EmotionState;
use crate::components::memory::memory_tags;
use super::relations::RelationGraph;

/// Range, cooldown and trust tuning for interactions.
pub mod interaction_constants {
    /// Interactions only start within this squared distance (range 8).
    pub const INTERACTION_RANGE_SQ: f32 = 64.0;
    /// Ticks a pair must wait between interactions.
    pub const PAIR_COOLDOWN_TICKS: u32 = 600;
    /// Relation raise granted to both directions by a mediation.
    pub const MEDIATION_BONUS: i32 = 10;
    /// Base chance a warning is believed before honesty adjustment.
    pub const WARNING_BASE_TRUST: f32 = 0.5;
    /// Honesty points per full point of warning trust.
    pub const WARNING_HONESTY_DIVISOR: f32 = 200.0;
    /// Importance of the memory a believed warning leaves behind.
    pub const WARNING_MEMORY_IMPORTANCE: u8 = 5;
}

/// The interactions NPCs can strike up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InteractionKind {
    Greeting,
    Conversation,
    Trade,
    HelpRequest,
    Argument,
    Warning,
}

/// Per-kind duration and relation effect, indexed by `InteractionKind as usize`.
pub struct InteractionProfile {
    pub name: &'static str,
    pub duration_ticks: u32,
    /// Applied to both directions of the pair's relation when it finishes.
    pub relation_delta: i32,
}

pub const INTERACTION_TABLE: [InteractionProfile; 6] = [
    InteractionProfile {
        name: "greeting",
        duration_ticks: 200,
        relation_delta: 1,
    },
    InteractionProfile {
        name: "conversation",
        duration_ticks: 400,
        relation_delta: 2,
    },
    InteractionProfile {
        name: "trade",
        duration_ticks: 200,
        relation_delta: 3,
    },
    InteractionProfile {
        name: "help_request",
        duration_ticks: 300,
        relation_delta: 4,
    },
    InteractionProfile {
        name: "argument",
        duration_ticks: 300,
        relation_delta: -5,
    },
    InteractionProfile {
        name: "warning",
        duration_ticks: 250,
        relation_delta: 0,
    },
];

pub fn interaction_profile(kind: InteractionKind) -> &'static InteractionProfile {
    &INTERACTION_TABLE[kind as usize]
}

/// A live interaction between two NPCs. Exists only while active; never
/// persisted.
#[derive(Debug, Clone)]
pub struct InteractionContext {
    pub a: Uuid,
    pub b: Uuid,
    pub kind: InteractionKind,
    pub ticks_remaining: u32,
    finished: bool,
}

impl InteractionContext {
    pub fn new(a: Uuid, b: Uuid, kind: InteractionKind) -> Self {
        Self {
            a,
            b,
            kind,
            ticks_remaining: interaction_profile(kind).duration_ticks,
            finished: false,
        }
    }

    pub fn tick(&mut self) {
        self.ticks_remaining = self.ticks_remaining.saturating_sub(1);
        if self.ticks_remaining == 0 {
            self.finished = true;
        }
    }

    pub fn finish(&mut self) {
        self.finished = true;
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn involves(&self, npc: Uuid) -> bool {
        self.a == npc || self.b == npc
    }

    pub fn partner_of(&self, npc: Uuid) -> Option<Uuid> {
        if self.a == npc {
            Some(self.b)
        } else if self.b == npc {
            Some(self.a)
        } else {
            None
        }
    }
}

/// Unordered pair key for cooldowns and contexts.
fn pair_key(a: Uuid, b: Uuid) -> (Uuid, Uuid) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Resource: who is interacting with whom, and which pairs are cooling down.
#[derive(Resource, Debug, Default)]
pub struct InteractionArbiter {
    contexts: BTreeMap<(Uuid, Uuid), InteractionContext>,
    cooldowns: BTreeMap<(Uuid, Uuid), u32>,
}

impl InteractionArbiter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self, npc: Uuid) -> bool {
        self.contexts.values().any(|c| c.involves(npc))
    }

    pub fn is_on_cooldown(&self, a: Uuid, b: Uuid) -> bool {
        self.cooldowns.contains_key(&pair_key(a, b))
    }

    /// The full gate: distinct participants, in range, pair not cooling
    /// down, and neither side already occupied.
    pub fn can_interact(&self, a: Uuid, b: Uuid, distance_sq: f32) -> bool {
        a != b
            && distance_sq <= interaction_constants::INTERACTION_RANGE_SQ
            && !self.is_on_cooldown(a, b)
            && !self.is_busy(a)
            && !self.is_busy(b)
    }

    /// Opens a context for the pair and starts their cooldown. The caller
    /// is expected to have checked `can_interact`; a pair that is somehow
    /// already engaged is refused.
    pub fn begin(&mut self, a: Uuid, b: Uuid, kind: InteractionKind) -> bool {
        let key = pair_key(a, b);
        if self.contexts.contains_key(&key) {
            return false;
        }
        self.contexts.insert(key, InteractionContext::new(a, b, kind));
        self.cooldowns
            .insert(key, interaction_constants::PAIR_COOLDOWN_TICKS);
        true
    }

    pub fn active_context(&self, npc: Uuid) -> Option<&InteractionContext> {
        self.contexts.values().find(|c| c.involves(npc))
    }

    pub fn finish_pair(&mut self, a: Uuid, b: Uuid) {
        if let Some(context) = self.contexts.get_mut(&pair_key(a, b)) {
            context.finish();
        }
    }

    /// Counts down contexts and cooldowns, returning the contexts that
    /// completed this tick so their effects can be applied.
    pub fn tick(&mut self) -> Vec<InteractionContext> {
        let mut completed = Vec::new();
        for context in self.contexts.values_mut() {
            context.tick();
        }
        let finished_keys: Vec<(Uuid, Uuid)> = self
            .contexts
            .iter()
            .filter(|(_, c)| c.is_finished())
            .map(|(k, _)| *k)
            .collect();
        for key in finished_keys {
            if let Some(context) = self.contexts.remove(&key) {
                completed.push(context);
            }
        }
        self.cooldowns.retain(|_, remaining| {
            *remaining = remaining.saturating_sub(1);
            *remaining > 0
        });
        completed
    }

    /// Clears an NPC out of every context and cooldown.
    pub fn forget_npc(&mut self, npc: Uuid) {
        self.contexts.retain(|key, _| key.0 != npc && key.1 != npc);
        self.cooldowns.retain(|key, _| key.0 != npc && key.1 != npc);
    }

    pub fn active_count(&self) -> usize {
        self.contexts.len()
    }

    pub fn cooldown_count(&self) -> usize {
        self.cooldowns.len()
    }
}

/// Outside push to patch up a soured pair: only applies when the mutual
/// relation is actually negative, then raises both directions by a fixed
/// amount.
pub fn mediate_conflict(relations: &mut RelationGraph, a: Uuid, b: Uuid) -> bool {
    if relations.mutual(a, b) >= 0 {
        return false;
    }
    relations.adjust_mutual(a, b, interaction_constants::MEDIATION_BONUS);
    true
}

/// What one NPC can warn another about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WarningKind {
    Criminal,
    Dangerous,
    Thief,
}

/// Effects a believed warning applies to the listener, indexed by
/// `WarningKind as usize`.
pub struct WarningProfile {
    pub name: &'static str,
    /// Tag stamped on the listener's profile of the warned-about subject.
    pub tag: &'static str,
    pub emotion: EmotionState,
    pub emotion_intensity: f32,
    /// Immediate safety reduction on the listener.
    pub safety_penalty: f32,
}

pub const WARNING_TABLE: [WarningProfile; 3] = [
    WarningProfile {
        name: "criminal",
        tag: memory_tags::TAG_CRIMINAL,
        emotion: EmotionState::Suspicious,
        emotion_intensity: 40.0,
        safety_penalty: 0.0,
    },
    WarningProfile {
        name: "dangerous",
        tag: memory_tags::TAG_DANGEROUS,
        emotion: EmotionState::Fearful,
        emotion_intensity: 50.0,
        safety_penalty: 20.0,
    },
    WarningProfile {
        name: "thief",
        tag: memory_tags::TAG_THIEF,
        emotion: EmotionState::Suspicious,
        emotion_intensity: 30.0,
        safety_penalty: 0.0,
    },
];

pub fn warning_profile(kind: WarningKind) -> &'static WarningProfile {
    &WARNING_TABLE[kind as usize]
}

/// Chance a warning is believed, from the warner's honesty.
pub fn warning_trust(honesty: i32) -> f32 {
    use interaction_constants::*;
    (WARNING_BASE_TRUST + honesty as f32 / WARNING_HONESTY_DIVISOR).clamp(0.0, 1.0)
}
