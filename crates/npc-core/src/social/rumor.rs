//! Rumor Network
//!
//! World-scoped gossip: rumors about a subject spread NPC-to-NPC, losing
//! credibility with each retelling until they fall under the believability
//! floor and are swept at day change. Duplicate sightings reinforce an
//! existing rumor instead of stacking new ones. Per-subject and global caps
//! bound the whole structure with deterministic eviction.

use std::collections::{BTreeMap, BTreeSet};

use bevy_ecs::prelude::*;
use rand::Rng;
use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Spread, decay and capacity tuning for the rumor network.
pub mod rumor_constants {
    /// Rumors below this credibility are no longer believed.
    pub const CREDIBILITY_FLOOR: i32 = 20;
    /// Credibility lost on each successful retelling.
    pub const SPREAD_CREDIBILITY_LOSS: i32 = 5;
    /// Retelling never drags credibility below this.
    pub const MIN_CREDIBILITY_AFTER_SPREAD: i32 = 10;
    /// Each prior retelling multiplies spread chance by this.
    pub const SPREAD_DECAY: f32 = 0.9;
    /// Credibility gained when a duplicate report reinforces a rumor.
    pub const REINFORCE_CREDIBILITY: i32 = 20;
    /// Rumors tracked per subject before the oldest is evicted.
    pub const PER_SUBJECT_CAP: usize = 20;
    /// Subjects tracked before new ones are rejected outright.
    pub const GLOBAL_SUBJECT_CAP: usize = 128;
    /// NPC knowledge sets tracked before the least-informed is evicted.
    pub const GLOBAL_KNOWLEDGE_CAP: usize = 256;
    /// Rumors exchanged per side of one conversation.
    pub const EXCHANGE_CAP: usize = 3;
    /// Base credibility of a fresh rumor before importance scaling.
    pub const BASE_CREDIBILITY: i32 = 50;
    /// Credibility added per point of reported importance.
    pub const CREDIBILITY_PER_IMPORTANCE: i32 = 10;
}

/// What a rumor alleges about its subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum RumorKind {
    Helpful,
    Generous,
    Brave,
    #[default]
    Unreliable,
    Cheat,
    Theft,
    Violent,
    Smuggling,
}

/// Per-kind coefficients, indexed by `RumorKind as usize`.
pub struct RumorProfile {
    pub name: &'static str,
    /// Days a fresh rumor lives without reinforcement.
    pub base_duration_days: u64,
    /// Base chance per spread attempt at full credibility.
    pub spread_chance: f32,
    /// Reputation impact at full credibility.
    pub reputation_impact: i32,
    /// Whether this alleges a crime.
    pub criminal: bool,
}

pub const RUMOR_TABLE: [RumorProfile; 8] = [
    RumorProfile {
        name: "helpful",
        base_duration_days: 5,
        spread_chance: 0.3,
        reputation_impact: 3,
        criminal: false,
    },
    RumorProfile {
        name: "generous",
        base_duration_days: 7,
        spread_chance: 0.4,
        reputation_impact: 5,
        criminal: false,
    },
    RumorProfile {
        name: "brave",
        base_duration_days: 6,
        spread_chance: 0.35,
        reputation_impact: 4,
        criminal: false,
    },
    RumorProfile {
        name: "unreliable",
        base_duration_days: 10,
        spread_chance: 0.35,
        reputation_impact: -4,
        criminal: false,
    },
    RumorProfile {
        name: "cheat",
        base_duration_days: 12,
        spread_chance: 0.4,
        reputation_impact: -6,
        criminal: false,
    },
    RumorProfile {
        name: "theft",
        base_duration_days: 14,
        spread_chance: 0.5,
        reputation_impact: -10,
        criminal: true,
    },
    RumorProfile {
        name: "violent",
        base_duration_days: 10,
        spread_chance: 0.45,
        reputation_impact: -8,
        criminal: true,
    },
    RumorProfile {
        name: "smuggling",
        base_duration_days: 21,
        spread_chance: 0.45,
        reputation_impact: -15,
        criminal: true,
    },
];

pub fn rumor_profile(kind: RumorKind) -> &'static RumorProfile {
    &RUMOR_TABLE[kind as usize]
}

impl RumorKind {
    pub fn name(self) -> &'static str {
        rumor_profile(self).name
    }

    /// Unknown names fall back to the vaguest allegation.
    pub fn from_name(name: &str) -> Self {
        const ALL: [RumorKind; 8] = [
            RumorKind::Helpful,
            RumorKind::Generous,
            RumorKind::Brave,
            RumorKind::Unreliable,
            RumorKind::Cheat,
            RumorKind::Theft,
            RumorKind::Violent,
            RumorKind::Smuggling,
        ];
        ALL.into_iter()
            .find(|kind| kind.name() == name)
            .unwrap_or_default()
    }
}

impl Serialize for RumorKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for RumorKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(RumorKind::from_name(&name))
    }
}

/// One live rumor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rumor {
    pub subject: Uuid,
    pub kind: RumorKind,
    pub details: String,
    pub created_day: u64,
    pub expiration_day: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Uuid>,
    pub spread_count: u32,
    pub credibility: i32,
}

impl Rumor {
    /// Identity key; one rumor per subject, kind and creation day.
    pub fn key(&self) -> String {
        format!("{}_{}_{}", self.subject, self.kind.name(), self.created_day)
    }

    pub fn is_expired(&self, day: u64) -> bool {
        day >= self.expiration_day
    }

    pub fn is_credible(&self) -> bool {
        self.credibility >= rumor_constants::CREDIBILITY_FLOOR
    }

    /// Current reputation pull of this rumor, scaled by credibility.
    pub fn reputation_impact(&self) -> i32 {
        rumor_profile(self.kind).reputation_impact * self.credibility / 100
    }

    /// One retelling attempt. Chance is the kind's base rate scaled by
    /// credibility and damped for every retelling so far; a success makes
    /// the rumor both wider-spread and less believable.
    pub fn try_spread<R: Rng>(&mut self, rng: &mut R) -> bool {
        use rumor_constants::*;
        let chance = rumor_profile(self.kind).spread_chance
            * (self.credibility as f32 / 100.0)
            * SPREAD_DECAY.powi(self.spread_count as i32);
        if rng.gen::<f32>() < chance {
            self.spread_count += 1;
            self.credibility =
                (self.credibility - SPREAD_CREDIBILITY_LOSS).max(MIN_CREDIBILITY_AFTER_SPREAD);
            true
        } else {
            false
        }
    }

    /// A duplicate report makes the rumor more believable and keeps it
    /// alive longer.
    fn reinforce(&mut self, day: u64) {
        use rumor_constants::*;
        self.credibility = (self.credibility + REINFORCE_CREDIBILITY).min(100);
        let extended = day + rumor_profile(self.kind).base_duration_days / 2;
        self.expiration_day = self.expiration_day.max(extended);
    }
}

/// A rumor being reported, before the network has dated it. Duration stays
/// a duration here; it only becomes an absolute expiration day when the
/// network resolves the report at insertion.
#[derive(Debug, Clone)]
pub struct PendingRumor {
    subject: Uuid,
    kind: RumorKind,
    details: String,
    duration_days: Option<u64>,
    importance: u8,
    source: Option<Uuid>,
}

impl PendingRumor {
    pub fn new(subject: Uuid, kind: RumorKind) -> Self {
        Self {
            subject,
            kind,
            details: String::new(),
            duration_days: None,
            importance: 3,
            source: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = details.into();
        self
    }

    pub fn with_duration_days(mut self, days: u64) -> Self {
        self.duration_days = Some(days);
        self
    }

    pub fn with_importance(mut self, importance: u8) -> Self {
        self.importance = importance.clamp(1, 10);
        self
    }

    pub fn with_source(mut self, source: Uuid) -> Self {
        self.source = Some(source);
        self
    }

    /// Dates the report against the current day. Called exactly once, by
    /// the network, at insertion.
    fn resolve(self, day: u64) -> Rumor {
        use rumor_constants::*;
        let duration = self
            .duration_days
            .unwrap_or(rumor_profile(self.kind).base_duration_days);
        Rumor {
            subject: self.subject,
            kind: self.kind,
            details: self.details,
            created_day: day,
            expiration_day: day + duration,
            source: self.source,
            spread_count: 0,
            credibility: (BASE_CREDIBILITY
                + self.importance as i32 * CREDIBILITY_PER_IMPORTANCE)
                .min(100),
        }
    }
}

/// Evicts the oldest rumor by creation day, earliest list position among
/// ties.
fn evict_oldest(bucket: &mut Vec<Rumor>) {
    if let Some(evict) = bucket
        .iter()
        .enumerate()
        .min_by_key(|(idx, r)| (r.created_day, *idx))
        .map(|(idx, _)| idx)
    {
        bucket.remove(evict);
    }
}

/// Resource: all rumors in a world plus per-NPC knowledge of them.
#[derive(Resource, Debug, Default, Clone, Serialize, Deserialize)]
pub struct RumorNetwork {
    rumors: BTreeMap<Uuid, Vec<Rumor>>,
    knowledge: BTreeMap<Uuid, BTreeSet<String>>,
}

impl RumorNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Files a report. An equivalent live rumor (same subject and kind) is
    /// reinforced instead of duplicated. Entirely new subjects are rejected
    /// once the global subject cap is reached; known subjects stay
    /// updatable. Returns whether the report took effect.
    pub fn add_rumor(&mut self, pending: PendingRumor, day: u64) -> bool {
        use rumor_constants::*;
        let subject = pending.subject;
        if let Some(bucket) = self.rumors.get_mut(&subject) {
            if let Some(existing) = bucket.iter_mut().find(|r| r.kind == pending.kind) {
                existing.reinforce(day);
                if let Some(source) = pending.source {
                    let key = existing.key();
                    self.mark_known(source, key);
                }
                return true;
            }
        } else if self.rumors.len() >= GLOBAL_SUBJECT_CAP {
            tracing::debug!(subject = %subject, "rumor subject cap reached, report dropped");
            return false;
        }
        let rumor = pending.resolve(day);
        let key = rumor.key();
        let source = rumor.source;
        let bucket = self.rumors.entry(subject).or_default();
        if bucket.len() >= PER_SUBJECT_CAP {
            evict_oldest(bucket);
        }
        bucket.push(rumor);
        if let Some(source) = source {
            self.mark_known(source, key);
        }
        true
    }

    /// Files a report with full credibility, as if cried on the square.
    pub fn broadcast_rumor(&mut self, pending: PendingRumor, day: u64) -> bool {
        let subject = pending.subject;
        let kind = pending.kind;
        if !self.add_rumor(pending, day) {
            return false;
        }
        if let Some(rumor) = self
            .rumors
            .get_mut(&subject)
            .and_then(|b| b.iter_mut().find(|r| r.kind == kind))
        {
            rumor.credibility = 100;
        }
        true
    }

    /// One NPC retelling a rumor to another. The teller must know it, a
    /// listener who already knows is a no-op, and the rumor itself decides
    /// whether the retelling lands.
    pub fn try_spread_rumor<R: Rng>(
        &mut self,
        subject: Uuid,
        kind: RumorKind,
        from: Uuid,
        to: Uuid,
        rng: &mut R,
    ) -> bool {
        let Some(rumor) = self
            .rumors
            .get_mut(&subject)
            .and_then(|b| b.iter_mut().find(|r| r.kind == kind))
        else {
            return false;
        };
        let key = rumor.key();
        let from_knows = self
            .knowledge
            .get(&from)
            .map(|k| k.contains(&key))
            .unwrap_or(false);
        let to_knows = self
            .knowledge
            .get(&to)
            .map(|k| k.contains(&key))
            .unwrap_or(false);
        if !from_knows || to_knows {
            return false;
        }
        if rumor.try_spread(rng) {
            self.mark_known(to, key);
            true
        } else {
            false
        }
    }

    /// Both sides of a conversation pass on a few rumors the other has not
    /// heard yet.
    pub fn exchange_rumors<R: Rng>(&mut self, a: Uuid, b: Uuid, rng: &mut R) -> u32 {
        let mut passed = 0;
        for (from, to) in [(a, b), (b, a)] {
            let candidates: Vec<(Uuid, RumorKind)> = self
                .rumors
                .values()
                .flatten()
                .filter(|r| {
                    let key = r.key();
                    self.knows_key(from, &key) && !self.knows_key(to, &key)
                })
                .map(|r| (r.subject, r.kind))
                .take(rumor_constants::EXCHANGE_CAP)
                .collect();
            for (subject, kind) in candidates {
                if self.try_spread_rumor(subject, kind, from, to, rng) {
                    passed += 1;
                }
            }
        }
        passed
    }

    /// Records that an NPC has heard a rumor. Once the knowledge cap is
    /// reached, the least-informed tracked NPC is evicted to make room.
    pub fn mark_known(&mut self, npc: Uuid, key: String) {
        use rumor_constants::*;
        if !self.knowledge.contains_key(&npc) && self.knowledge.len() >= GLOBAL_KNOWLEDGE_CAP {
            let evict = self
                .knowledge
                .iter()
                .map(|(id, keys)| (keys.len(), *id))
                .min();
            if let Some((_, id)) = evict {
                tracing::debug!(npc = %id, "knowledge cap reached, dropping least-informed");
                self.knowledge.remove(&id);
            }
        }
        self.knowledge.entry(npc).or_default().insert(key);
    }

    fn knows_key(&self, npc: Uuid, key: &str) -> bool {
        self.knowledge
            .get(&npc)
            .map(|k| k.contains(key))
            .unwrap_or(false)
    }

    pub fn knows(&self, npc: Uuid, rumor: &Rumor) -> bool {
        self.knows_key(npc, &rumor.key())
    }

    /// Sweeps expired and no-longer-credible rumors, drops stale knowledge
    /// keys, and enforces the global caps by evicting the least-rumored
    /// subjects and least-informed NPCs first.
    pub fn on_day_change(&mut self, day: u64) {
        use rumor_constants::*;
        for bucket in self.rumors.values_mut() {
            bucket.retain(|r| !r.is_expired(day) && r.credibility >= CREDIBILITY_FLOOR);
        }
        self.rumors.retain(|_, bucket| !bucket.is_empty());

        while self.rumors.len() > GLOBAL_SUBJECT_CAP {
            let evict = self
                .rumors
                .iter()
                .map(|(id, bucket)| (bucket.len(), *id))
                .min();
            match evict {
                Some((_, id)) => {
                    self.rumors.remove(&id);
                }
                None => break,
            }
        }
        while self.knowledge.len() > GLOBAL_KNOWLEDGE_CAP {
            let evict = self
                .knowledge
                .iter()
                .map(|(id, keys)| (keys.len(), *id))
                .min();
            match evict {
                Some((_, id)) => {
                    self.knowledge.remove(&id);
                }
                None => break,
            }
        }

        let live_keys: BTreeSet<String> = self
            .rumors
            .values()
            .flatten()
            .map(Rumor::key)
            .collect();
        for keys in self.knowledge.values_mut() {
            keys.retain(|k| live_keys.contains(k));
        }
        self.knowledge.retain(|_, keys| !keys.is_empty());
    }

    pub fn rumors_about(&self, subject: Uuid) -> &[Rumor] {
        self.rumors.get(&subject).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Net reputation pull of everything credible said about a subject.
    pub fn reputation_from_rumors(&self, subject: Uuid) -> i32 {
        self.rumors_about(subject)
            .iter()
            .filter(|r| r.is_credible())
            .map(Rumor::reputation_impact)
            .sum()
    }

    pub fn has_negative_rumors(&self, subject: Uuid) -> bool {
        self.rumors_about(subject)
            .iter()
            .any(|r| r.is_credible() && rumor_profile(r.kind).reputation_impact < 0)
    }

    pub fn has_crime_rumors(&self, subject: Uuid) -> bool {
        self.rumors_about(subject)
            .iter()
            .any(|r| r.is_credible() && rumor_profile(r.kind).criminal)
    }

    /// The credible rumor with the harshest reputation pull, if any.
    pub fn most_severe(&self, subject: Uuid) -> Option<&Rumor> {
        self.rumors_about(subject)
            .iter()
            .filter(|r| r.is_credible())
            .min_by_key(|r| r.reputation_impact())
    }

    pub fn known_count(&self, npc: Uuid) -> usize {
        self.knowledge.get(&npc).map(BTreeSet::len).unwrap_or(0)
    }

    pub fn subject_count(&self) -> usize {
        self.rumors.len()
    }

    pub fn rumor_count(&self) -> usize {
        self.rumors.values().map(Vec::len).sum()
    }

    pub fn tracked_npc_count(&self) -> usize {
        self.knowledge.len()
    }

    /// Drops an NPC both as a rumor subject and as a listener.
    pub fn forget_npc(&mut self, npc: Uuid) {
        self.rumors.remove(&npc);
        self.knowledge.remove(&npc);
    }
}
