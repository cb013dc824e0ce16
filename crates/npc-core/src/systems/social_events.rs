//! Social Event Intake
//!
//! External events (trades, crimes, gifts, threats) enter through a queue
//! resource and are applied to NPC state in one system: the named NPC's
//! memory and emotions, the actor's faction reputation, the crime log, and
//! the rumor network all absorb their share of each event.

use bevy_ecs::prelude::*;
use npc_events::{SocialEvent, SocialEventKind, TICKS_PER_DAY};

use crate::components::{
    memory_profile, memory_tags, EmotionState, LifeData, MemoryEntry, MemoryKind, Npc, NpcId,
};
use crate::social::{
    Affiliation, InteractionArbiter, PendingRumor, RelationGraph, ReputationLedger, RumorKind,
    RumorNetwork,
};
use crate::systems::life_cycle::CrimeLog;
use crate::SimRng;

/// Thresholds and effect sizes for event intake.
pub mod event_constants {
    /// Transaction importance grows by one per this many coins.
    pub const TRANSACTION_IMPORTANCE_DIVISOR: i64 = 500;
    /// Importance ceiling for routine commerce.
    pub const TRANSACTION_IMPORTANCE_CAP: i64 = 5;
    /// Minimum fair-trade value that registers as a good deal.
    pub const GOOD_DEAL_VALUE: i64 = 200;
    /// Minimum fair-trade value that starts a generosity rumor.
    pub const GENEROUS_TRADE_VALUE: i64 = 500;
    /// Coins of gift value per point of reputation gained.
    pub const GIFT_REPUTATION_DIVISOR: i64 = 50;
    /// Reputation for helping an NPC out.
    pub const HELP_REPUTATION: i32 = 5;
    /// Reputation for completing a task for an NPC.
    pub const QUEST_REPUTATION: i32 = 8;
    /// Reputation lost for threatening an NPC.
    pub const THREAT_REPUTATION_PENALTY: i32 = 4;

    /// Emotional intensity of being threatened.
    pub const THREAT_INTENSITY: f32 = 50.0;
    /// Base emotional intensity of witnessing a crime.
    pub const CRIME_FEAR_BASE: f32 = 30.0;
    /// Additional witness intensity per severity point.
    pub const CRIME_FEAR_PER_SEVERITY: f32 = 5.0;
    /// Glow after a notably good trade.
    pub const GOOD_TRADE_INTENSITY: f32 = 30.0;
    /// Sting after an unfair trade.
    pub const BAD_TRADE_INTENSITY: f32 = 40.0;
    /// Glow after receiving a gift.
    pub const GIFT_INTENSITY: f32 = 40.0;
    /// Glow after being helped.
    pub const HELP_INTENSITY: f32 = 30.0;
    /// Glow after someone finished a job for the NPC.
    pub const QUEST_INTENSITY: f32 = 50.0;
}

/// Inbox for host-pushed events, drained once per tick.
#[derive(Resource, Debug, Default)]
pub struct SocialEventQueue {
    events: Vec<SocialEvent>,
}

impl SocialEventQueue {
    pub fn push(&mut self, event: SocialEvent) {
        self.events.push(event);
    }

    pub fn extend(&mut self, events: impl IntoIterator<Item = SocialEvent>) {
        self.events.extend(events);
    }

    /// Takes all queued events, leaving the queue empty.
    pub fn drain(&mut self) -> Vec<SocialEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Which rumor a witnessed crime seeds, by severity.
fn crime_rumor_kind(severity: i32) -> RumorKind {
    match severity {
        ..=3 => RumorKind::Theft,
        4..=6 => RumorKind::Violent,
        _ => RumorKind::Smuggling,
    }
}

/// Drains the event queue and applies every event. Events naming an NPC that
/// no longer exists are dropped; their world-level side effects (crime log)
/// still land.
pub fn process_social_events(
    mut queue: ResMut<SocialEventQueue>,
    mut ledger: ResMut<ReputationLedger>,
    mut relations: ResMut<RelationGraph>,
    mut rumors: ResMut<RumorNetwork>,
    mut crimes: ResMut<CrimeLog>,
    mut arbiter: ResMut<InteractionArbiter>,
    mut rng: ResMut<SimRng>,
    mut query: Query<(&NpcId, &Affiliation, &mut LifeData), With<Npc>>,
) {
    for event in queue.drain() {
        let tick = event.tick;
        let day = tick / TICKS_PER_DAY;
        match event.kind {
            SocialEventKind::Transaction {
                actor,
                npc,
                value,
                fair,
            } => {
                let Some((_, affiliation, mut life)) =
                    query.iter_mut().find(|(id, _, _)| id.0 == npc)
                else {
                    continue;
                };
                let importance = (1 + value / event_constants::TRANSACTION_IMPORTANCE_DIVISOR)
                    .min(event_constants::TRANSACTION_IMPORTANCE_CAP)
                    as u8;
                life.memory.remember(MemoryEntry::new(
                    MemoryKind::Transaction,
                    actor,
                    format!("{value} coins"),
                    importance,
                    tick,
                ));
                if !fair {
                    life.memory.add_tag(actor, memory_tags::TAG_STINGY, tick);
                    life.emotions
                        .trigger(EmotionState::Angry, event_constants::BAD_TRADE_INTENSITY);
                } else if value >= event_constants::GOOD_DEAL_VALUE {
                    life.emotions
                        .trigger(EmotionState::Happy, event_constants::GOOD_TRADE_INTENSITY);
                }
                if fair && value >= event_constants::GENEROUS_TRADE_VALUE {
                    life.memory.add_tag(actor, memory_tags::TAG_GENEROUS, tick);
                }
                ledger.on_transaction(actor, affiliation.0, value, fair);
                if !fair {
                    rumors.add_rumor(
                        PendingRumor::new(actor, RumorKind::Cheat)
                            .with_details("shorted on a deal")
                            .with_importance(3)
                            .with_source(npc),
                        day,
                    );
                } else if value >= event_constants::GENEROUS_TRADE_VALUE {
                    rumors.add_rumor(
                        PendingRumor::new(actor, RumorKind::Generous)
                            .with_details("pays well over the asking price")
                            .with_importance(2)
                            .with_source(npc),
                        day,
                    );
                }
            }
            SocialEventKind::CrimeWitnessed {
                actor,
                npc,
                severity,
                against_underworld,
                x,
                y,
            } => {
                let severity = severity.clamp(1, 10);
                crimes.record(x, y, tick);
                let Some((_, _, mut life)) = query.iter_mut().find(|(id, _, _)| id.0 == npc)
                else {
                    continue;
                };
                life.memory.remember(
                    MemoryEntry::new(
                        MemoryKind::CrimeWitnessed,
                        actor,
                        format!("severity {severity}"),
                        (4 + severity).min(10) as u8,
                        tick,
                    )
                    .with_location(x, y),
                );
                let intensity = event_constants::CRIME_FEAR_BASE
                    + severity as f32 * event_constants::CRIME_FEAR_PER_SEVERITY;
                let emotion = if intensity >= life.personality.fear_threshold() {
                    EmotionState::Fearful
                } else {
                    EmotionState::Suspicious
                };
                life.emotions.trigger(emotion, intensity);
                if life.personality.would_report(severity, &mut rng.0) {
                    ledger.on_crime_committed(actor, severity, against_underworld);
                    tracing::debug!(actor = %actor, witness = %npc, severity, "crime reported");
                }
                rumors.add_rumor(
                    PendingRumor::new(actor, crime_rumor_kind(severity))
                        .with_details("seen breaking the law")
                        .with_importance((3 + severity / 2) as u8)
                        .with_source(npc),
                    day,
                );
            }
            SocialEventKind::Gift { actor, npc, value } => {
                let Some((_, affiliation, mut life)) =
                    query.iter_mut().find(|(id, _, _)| id.0 == npc)
                else {
                    continue;
                };
                let importance = if value >= event_constants::GENEROUS_TRADE_VALUE {
                    6
                } else {
                    memory_profile(MemoryKind::GiftReceived).default_importance
                };
                life.memory.remember(MemoryEntry::new(
                    MemoryKind::GiftReceived,
                    actor,
                    format!("{value} coins"),
                    importance,
                    tick,
                ));
                life.emotions
                    .trigger(EmotionState::Happy, event_constants::GIFT_INTENSITY);
                let deed = (value / event_constants::GIFT_REPUTATION_DIVISOR).clamp(1, 10) as i32;
                ledger.on_good_deed(actor, affiliation.0, deed);
                rumors.add_rumor(
                    PendingRumor::new(actor, RumorKind::Generous)
                        .with_details("gives without being asked")
                        .with_importance(3)
                        .with_source(npc),
                    day,
                );
            }
            SocialEventKind::HelpGiven { actor, npc } => {
                let Some((_, affiliation, mut life)) =
                    query.iter_mut().find(|(id, _, _)| id.0 == npc)
                else {
                    continue;
                };
                life.memory.remember(MemoryEntry::new(
                    MemoryKind::HelpReceived,
                    actor,
                    "lent a hand",
                    memory_profile(MemoryKind::HelpReceived).default_importance,
                    tick,
                ));
                life.emotions
                    .trigger(EmotionState::Happy, event_constants::HELP_INTENSITY);
                ledger.on_good_deed(actor, affiliation.0, event_constants::HELP_REPUTATION);
                rumors.add_rumor(
                    PendingRumor::new(actor, RumorKind::Helpful)
                        .with_details("helps out when it counts")
                        .with_importance(3)
                        .with_source(npc),
                    day,
                );
            }
            SocialEventKind::ThreatMade { actor, npc } => {
                let Some((_, affiliation, mut life)) =
                    query.iter_mut().find(|(id, _, _)| id.0 == npc)
                else {
                    continue;
                };
                life.memory.remember(MemoryEntry::new(
                    MemoryKind::ThreatReceived,
                    actor,
                    "made threats",
                    memory_profile(MemoryKind::ThreatReceived).default_importance,
                    tick,
                ));
                let intensity = event_constants::THREAT_INTENSITY;
                let emotion = if intensity >= life.personality.fear_threshold() {
                    EmotionState::Fearful
                } else {
                    EmotionState::Angry
                };
                life.emotions.trigger(emotion, intensity);
                ledger.modify_reputation(
                    actor,
                    affiliation.0,
                    -event_constants::THREAT_REPUTATION_PENALTY,
                );
                rumors.add_rumor(
                    PendingRumor::new(actor, RumorKind::Violent)
                        .with_details("throws threats around")
                        .with_importance(4)
                        .with_source(npc),
                    day,
                );
            }
            SocialEventKind::QuestCompleted { actor, npc } => {
                let Some((_, affiliation, mut life)) =
                    query.iter_mut().find(|(id, _, _)| id.0 == npc)
                else {
                    continue;
                };
                life.memory.remember(MemoryEntry::new(
                    MemoryKind::QuestCompleted,
                    actor,
                    "finished a job for me",
                    6,
                    tick,
                ));
                life.emotions
                    .trigger(EmotionState::Happy, event_constants::QUEST_INTENSITY);
                ledger.modify_reputation(actor, affiliation.0, event_constants::QUEST_REPUTATION);
                rumors.add_rumor(
                    PendingRumor::new(actor, RumorKind::Brave)
                        .with_details("gets dangerous work done")
                        .with_importance(4)
                        .with_source(npc),
                    day,
                );
            }
            SocialEventKind::ActorDeparted { actor } => {
                ledger.forget_actor(actor);
                relations.forget_npc(actor);
                rumors.forget_npc(actor);
                arbiter.forget_npc(actor);
                tracing::info!(actor = %actor, "actor departed; registry records dropped");
            }
        }
    }
}
