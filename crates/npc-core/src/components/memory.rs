//! Tiered NPC memory.
//!
//! Three retention tiers per NPC: short-lived detail entries (per subject,
//! capacity-bounded, cleared every day change), per-subject daily summaries
//! (pruned after a retention window), and permanent subject profiles whose
//! counters only ever grow. Compaction runs at day change: details fold into
//! one summary per subject, then the detail tier is emptied.

use std::collections::BTreeMap;

use npc_events::TICKS_PER_DAY;
use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Capacity and threshold tuning for the memory tiers.
pub mod memory_constants {
    /// Detail entries kept per subject before eviction.
    pub const DETAIL_CAP_PER_SUBJECT: usize = 10;
    /// Daily summaries older than this many days are pruned.
    pub const SUMMARY_RETENTION_DAYS: u64 = 30;
    /// Daily summaries kept before the oldest is evicted.
    pub const SUMMARY_CAP: usize = 30;
    /// Permanent profiles kept before the stalest is evicted.
    pub const PROFILE_CAP: usize = 50;
    /// Minimum importance for an entry to become a summary highlight.
    pub const HIGHLIGHT_IMPORTANCE: u8 = 7;
    /// Highlights kept per daily summary.
    pub const HIGHLIGHT_CAP: usize = 3;
    /// One side must outnumber the other by this factor to tilt the mood.
    pub const MOOD_RATIO: u32 = 2;
    /// Relation points per recorded transaction, and their cap.
    pub const TX_RELATION_STEP: i32 = 2;
    pub const TX_RELATION_CAP: i32 = 30;
    /// Relation points per help received, and their cap.
    pub const HELP_RELATION_STEP: i32 = 10;
    pub const HELP_RELATION_CAP: i32 = 40;
    /// Trade volume above this grants the full volume contribution.
    pub const TRADE_VOLUME_GOOD_CUSTOMER: i64 = 10_000;
    pub const VOLUME_RELATION_CAP: i32 = 20;
    pub const VOLUME_RELATION_DIVISOR: i64 = 500;
    /// Relation points lost per witnessed crime.
    pub const CRIME_RELATION_PENALTY: i32 = 15;
    /// Counter thresholds that award profile tags.
    pub const TRANSACTIONS_REGULAR_CUSTOMER: u32 = 50;
    pub const HELPS_FOR_HELPFUL: u32 = 3;
    pub const HELPS_FOR_BENEFACTOR: u32 = 10;
    pub const CRIMES_FOR_SUSPICIOUS: u32 = 1;
    pub const CRIMES_FOR_CRIMINAL: u32 = 3;
    pub const CRIMES_FOR_DANGEROUS: u32 = 5;
}

/// Well-known profile tags.
pub mod memory_tags {
    pub const TAG_GOOD_CUSTOMER: &str = "good_customer";
    pub const TAG_REGULAR_CUSTOMER: &str = "regular_customer";
    pub const TAG_HELPFUL: &str = "helpful";
    pub const TAG_BENEFACTOR: &str = "benefactor";
    pub const TAG_SUSPICIOUS: &str = "suspicious";
    pub const TAG_CRIMINAL: &str = "criminal";
    pub const TAG_DANGEROUS: &str = "dangerous";
    pub const TAG_GENEROUS: &str = "generous";
    pub const TAG_STINGY: &str = "stingy";
    pub const TAG_THIEF: &str = "thief";

    /// The tags the relation formula weighs. Tags outside this table (thief,
    /// generous, stingy) mark the subject without moving the relation level.
    pub const TAG_ADJUSTMENTS: &[(&str, i32)] = &[
        (TAG_GOOD_CUSTOMER, 10),
        (TAG_REGULAR_CUSTOMER, 15),
        (TAG_HELPFUL, 20),
        (TAG_BENEFACTOR, 25),
        (TAG_SUSPICIOUS, -15),
        (TAG_CRIMINAL, -30),
        (TAG_DANGEROUS, -50),
    ];

    pub fn tag_adjustment(tag: &str) -> i32 {
        TAG_ADJUSTMENTS
            .iter()
            .find(|(name, _)| *name == tag)
            .map(|(_, delta)| *delta)
            .unwrap_or(0)
    }
}

/// What kind of interaction a memory records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MemoryKind {
    Transaction,
    #[default]
    Conversation,
    CrimeWitnessed,
    CrimeVictim,
    ThreatReceived,
    QuestCompleted,
    Helped,
    HelpReceived,
    BribeOffered,
    Traded,
    RumorHeard,
    GiftReceived,
}

/// Which permanent profile counter a memory kind feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterKind {
    Trade,
    Crime,
    Help,
    None,
}

/// Per-kind coefficients, indexed by `MemoryKind as usize`.
pub struct MemoryProfile {
    pub name: &'static str,
    /// Negative memories tilt the daily mood; everything else counts
    /// positive.
    pub negative: bool,
    pub counter: CounterKind,
    /// Importance used when the engine itself records this kind.
    pub default_importance: u8,
}

pub const MEMORY_TABLE: [MemoryProfile; 12] = [
    MemoryProfile {
        name: "transaction",
        negative: false,
        counter: CounterKind::Trade,
        default_importance: 2,
    },
    MemoryProfile {
        name: "conversation",
        negative: false,
        counter: CounterKind::None,
        default_importance: 1,
    },
    MemoryProfile {
        name: "crime_witnessed",
        negative: true,
        counter: CounterKind::Crime,
        default_importance: 6,
    },
    MemoryProfile {
        name: "crime_victim",
        negative: true,
        counter: CounterKind::Crime,
        default_importance: 8,
    },
    MemoryProfile {
        name: "threat_received",
        negative: true,
        counter: CounterKind::None,
        default_importance: 6,
    },
    MemoryProfile {
        name: "quest_completed",
        negative: false,
        counter: CounterKind::None,
        default_importance: 4,
    },
    MemoryProfile {
        name: "helped",
        negative: false,
        counter: CounterKind::None,
        default_importance: 4,
    },
    MemoryProfile {
        name: "help_received",
        negative: false,
        counter: CounterKind::Help,
        default_importance: 5,
    },
    MemoryProfile {
        name: "bribe_offered",
        negative: true,
        counter: CounterKind::None,
        default_importance: 5,
    },
    MemoryProfile {
        name: "traded",
        negative: false,
        counter: CounterKind::None,
        default_importance: 2,
    },
    MemoryProfile {
        name: "rumor_heard",
        negative: false,
        counter: CounterKind::None,
        default_importance: 3,
    },
    MemoryProfile {
        name: "gift_received",
        negative: false,
        counter: CounterKind::None,
        default_importance: 4,
    },
];

pub fn memory_profile(kind: MemoryKind) -> &'static MemoryProfile {
    &MEMORY_TABLE[kind as usize]
}

impl MemoryKind {
    pub fn name(self) -> &'static str {
        memory_profile(self).name
    }

    /// Unknown names fall back to the conversation kind.
    pub fn from_name(name: &str) -> Self {
        const ALL: [MemoryKind; 12] = [
            MemoryKind::Transaction,
            MemoryKind::Conversation,
            MemoryKind::CrimeWitnessed,
            MemoryKind::CrimeVictim,
            MemoryKind::ThreatReceived,
            MemoryKind::QuestCompleted,
            MemoryKind::Helped,
            MemoryKind::HelpReceived,
            MemoryKind::BribeOffered,
            MemoryKind::Traded,
            MemoryKind::RumorHeard,
            MemoryKind::GiftReceived,
        ];
        ALL.into_iter()
            .find(|kind| kind.name() == name)
            .unwrap_or_default()
    }
}

impl Serialize for MemoryKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for MemoryKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(MemoryKind::from_name(&name))
    }
}

/// Collapsed tone of a whole day with one subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mood {
    Positive,
    #[default]
    Neutral,
    Negative,
}

impl Mood {
    pub fn name(self) -> &'static str {
        match self {
            Mood::Positive => "positive",
            Mood::Neutral => "neutral",
            Mood::Negative => "negative",
        }
    }

    pub fn from_name(name: &str) -> Self {
        match name {
            "positive" => Mood::Positive,
            "negative" => Mood::Negative,
            _ => Mood::Neutral,
        }
    }
}

impl Serialize for Mood {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Mood {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Mood::from_name(&name))
    }
}

/// One short-term memory about a subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryEntry {
    pub kind: MemoryKind,
    pub subject: Uuid,
    pub details: String,
    pub importance: u8,
    pub tick: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<(f32, f32)>,
}

impl MemoryEntry {
    pub fn new(
        kind: MemoryKind,
        subject: Uuid,
        details: impl Into<String>,
        importance: u8,
        tick: u64,
    ) -> Self {
        Self {
            kind,
            subject,
            details: details.into(),
            importance: importance.clamp(1, 10),
            tick,
            location: None,
        }
    }

    pub fn with_location(mut self, x: f32, y: f32) -> Self {
        self.location = Some((x, y));
        self
    }

    pub fn day(&self) -> u64 {
        self.tick / TICKS_PER_DAY
    }
}

/// One compacted day of dealings with a single subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub day: u64,
    pub subject: Uuid,
    pub total_interactions: u32,
    pub positive_events: u32,
    pub negative_events: u32,
    pub trade_value: i64,
    pub mood: Mood,
    pub highlights: Vec<String>,
}

/// Permanent aggregate record of one subject. Counters never decrease.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectProfile {
    pub subject: Uuid,
    pub total_transactions: u32,
    pub total_trade_volume: i64,
    pub crime_count: u32,
    pub help_count: u32,
    pub first_interaction_tick: u64,
    pub last_interaction_tick: u64,
    pub tags: Vec<String>,
}

impl SubjectProfile {
    pub fn new(subject: Uuid, tick: u64) -> Self {
        Self {
            subject,
            total_transactions: 0,
            total_trade_volume: 0,
            crime_count: 0,
            help_count: 0,
            first_interaction_tick: tick,
            last_interaction_tick: tick,
            tags: Vec::new(),
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn add_tag(&mut self, tag: &str) {
        if !self.has_tag(tag) {
            self.tags.push(tag.to_string());
        }
    }

    /// Explicit removal is the only way a tag ever goes away.
    pub fn remove_tag(&mut self, tag: &str) {
        self.tags.retain(|t| t != tag);
    }

    /// Awards every tag whose counter threshold has been crossed.
    fn refresh_tags(&mut self) {
        use memory_constants::*;
        use memory_tags::*;
        if self.total_transactions > TRANSACTIONS_REGULAR_CUSTOMER {
            self.add_tag(TAG_REGULAR_CUSTOMER);
        }
        if self.total_trade_volume > TRADE_VOLUME_GOOD_CUSTOMER {
            self.add_tag(TAG_GOOD_CUSTOMER);
        }
        if self.help_count >= HELPS_FOR_HELPFUL {
            self.add_tag(TAG_HELPFUL);
        }
        if self.help_count >= HELPS_FOR_BENEFACTOR {
            self.add_tag(TAG_BENEFACTOR);
        }
        if self.crime_count >= CRIMES_FOR_SUSPICIOUS {
            self.add_tag(TAG_SUSPICIOUS);
        }
        if self.crime_count >= CRIMES_FOR_CRIMINAL {
            self.add_tag(TAG_CRIMINAL);
        }
        if self.crime_count >= CRIMES_FOR_DANGEROUS {
            self.add_tag(TAG_DANGEROUS);
        }
    }

    /// Overall disposition toward this subject in [-100,100]. Capped positive
    /// contributions from trade and help, a flat penalty per crime, and fixed
    /// per-tag adjustments. The volume contribution caps at its top tier: any
    /// volume past the good-customer line earns the same 20 points.
    pub fn relation_level(&self) -> i32 {
        use memory_constants::*;
        let tx = (self.total_transactions as i32 * TX_RELATION_STEP).min(TX_RELATION_CAP);
        let help = (self.help_count as i32 * HELP_RELATION_STEP).min(HELP_RELATION_CAP);
        let volume = if self.total_trade_volume > TRADE_VOLUME_GOOD_CUSTOMER {
            VOLUME_RELATION_CAP
        } else {
            (self.total_trade_volume / VOLUME_RELATION_DIVISOR) as i32
        };
        let mut level = tx + help + volume - self.crime_count as i32 * CRIME_RELATION_PENALTY;
        for tag in &self.tags {
            level += memory_tags::tag_adjustment(tag);
        }
        level.clamp(-100, 100)
    }
}

/// Concatenated digits of a details string, read as a trade value.
/// Digit soup that overflows reads as zero, same as no digits at all.
fn parse_trade_value(details: &str) -> i64 {
    let digits: String = details.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse().unwrap_or(0)
}

/// Per-NPC tiered memory store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Memory {
    entries: BTreeMap<Uuid, Vec<MemoryEntry>>,
    summaries: Vec<DailySummary>,
    profiles: BTreeMap<Uuid, SubjectProfile>,
}

impl Memory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a detail entry and updates the subject's permanent profile.
    /// A full detail list evicts its least-important entry (oldest among
    /// ties) to admit the new one.
    pub fn remember(&mut self, entry: MemoryEntry) {
        self.update_profile(&entry);
        let bucket = self.entries.entry(entry.subject).or_default();
        if bucket.len() >= memory_constants::DETAIL_CAP_PER_SUBJECT {
            if let Some(evict) = bucket
                .iter()
                .enumerate()
                .min_by_key(|(idx, e)| (e.importance, *idx))
                .map(|(idx, _)| idx)
            {
                bucket.remove(evict);
            }
        }
        bucket.push(entry);
    }

    fn update_profile(&mut self, entry: &MemoryEntry) {
        if !self.profiles.contains_key(&entry.subject)
            && self.profiles.len() >= memory_constants::PROFILE_CAP
        {
            let stalest = self
                .profiles
                .values()
                .map(|p| (p.last_interaction_tick, p.subject))
                .min();
            if let Some((_, subject)) = stalest {
                self.profiles.remove(&subject);
            }
        }
        let profile = self
            .profiles
            .entry(entry.subject)
            .or_insert_with(|| SubjectProfile::new(entry.subject, entry.tick));
        profile.last_interaction_tick = entry.tick;
        match memory_profile(entry.kind).counter {
            CounterKind::Trade => {
                profile.total_transactions += 1;
                profile.total_trade_volume += parse_trade_value(&entry.details);
            }
            CounterKind::Crime => profile.crime_count += 1,
            CounterKind::Help => profile.help_count += 1,
            CounterKind::None => {}
        }
        profile.refresh_tags();
    }

    /// Folds each subject's detail entries into one daily summary, clears
    /// the detail tier, and prunes summaries past the retention window and
    /// count cap.
    pub fn on_day_change(&mut self, current_day: u64) {
        use memory_constants::*;
        for (subject, bucket) in &self.entries {
            if bucket.is_empty() {
                continue;
            }
            let day = bucket
                .iter()
                .map(MemoryEntry::day)
                .max()
                .unwrap_or_else(|| current_day.saturating_sub(1));
            let mut positive = 0;
            let mut negative = 0;
            let mut trade_value = 0i64;
            let mut highlights = Vec::new();
            for entry in bucket {
                let profile = memory_profile(entry.kind);
                if profile.negative {
                    negative += 1;
                } else {
                    positive += 1;
                }
                if profile.counter == CounterKind::Trade {
                    trade_value += parse_trade_value(&entry.details);
                }
                if entry.importance >= HIGHLIGHT_IMPORTANCE && highlights.len() < HIGHLIGHT_CAP {
                    highlights.push(entry.details.clone());
                }
            }
            let mood = if positive > negative * MOOD_RATIO {
                Mood::Positive
            } else if negative > positive * MOOD_RATIO {
                Mood::Negative
            } else {
                Mood::Neutral
            };
            self.summaries.push(DailySummary {
                day,
                subject: *subject,
                total_interactions: bucket.len() as u32,
                positive_events: positive,
                negative_events: negative,
                trade_value,
                mood,
                highlights,
            });
        }
        self.entries.clear();
        self.summaries
            .retain(|s| current_day.saturating_sub(s.day) <= SUMMARY_RETENTION_DAYS);
        while self.summaries.len() > SUMMARY_CAP {
            if let Some(oldest) = self
                .summaries
                .iter()
                .enumerate()
                .min_by_key(|(idx, s)| (s.day, *idx))
                .map(|(idx, _)| idx)
            {
                self.summaries.remove(oldest);
            }
        }
    }

    pub fn knows(&self, subject: Uuid) -> bool {
        self.entries.contains_key(&subject) || self.profiles.contains_key(&subject)
    }

    pub fn memories_about(&self, subject: Uuid) -> &[MemoryEntry] {
        self.entries.get(&subject).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn memories_of_kind(&self, kind: MemoryKind) -> Vec<&MemoryEntry> {
        self.entries
            .values()
            .flatten()
            .filter(|e| e.kind == kind)
            .collect()
    }

    pub fn profile(&self, subject: Uuid) -> Option<&SubjectProfile> {
        self.profiles.get(&subject)
    }

    pub fn profile_mut(&mut self, subject: Uuid) -> Option<&mut SubjectProfile> {
        self.profiles.get_mut(&subject)
    }

    pub fn get_or_create_profile(&mut self, subject: Uuid, tick: u64) -> &mut SubjectProfile {
        self.profiles
            .entry(subject)
            .or_insert_with(|| SubjectProfile::new(subject, tick))
    }

    pub fn has_tag(&self, subject: Uuid, tag: &str) -> bool {
        self.profiles
            .get(&subject)
            .map(|p| p.has_tag(tag))
            .unwrap_or(false)
    }

    pub fn add_tag(&mut self, subject: Uuid, tag: &str, tick: u64) {
        self.get_or_create_profile(subject, tick).add_tag(tag);
    }

    pub fn remove_tag(&mut self, subject: Uuid, tag: &str) {
        if let Some(profile) = self.profiles.get_mut(&subject) {
            profile.remove_tag(tag);
        }
    }

    /// All subjects carrying a tag, in id order.
    pub fn subjects_with_tag(&self, tag: &str) -> Vec<Uuid> {
        self.profiles
            .values()
            .filter(|p| p.has_tag(tag))
            .map(|p| p.subject)
            .collect()
    }

    /// Disposition toward a subject; unknown subjects rate zero.
    pub fn relation_level(&self, subject: Uuid) -> i32 {
        self.profiles
            .get(&subject)
            .map(SubjectProfile::relation_level)
            .unwrap_or(0)
    }

    pub fn summaries(&self) -> &[DailySummary] {
        &self.summaries
    }

    pub fn summaries_for(&self, subject: Uuid) -> Vec<&DailySummary> {
        self.summaries.iter().filter(|s| s.subject == subject).collect()
    }

    /// Drops detail entries of one kind about a subject, keeping the rest.
    pub fn forget(&mut self, kind: MemoryKind, subject: Uuid) {
        if let Some(bucket) = self.entries.get_mut(&subject) {
            bucket.retain(|e| e.kind != kind);
            if bucket.is_empty() {
                self.entries.remove(&subject);
            }
        }
    }

    /// Drops every trace of a subject across all three tiers.
    pub fn forget_subject(&mut self, subject: Uuid) {
        self.entries.remove(&subject);
        self.summaries.retain(|s| s.subject != subject);
        self.profiles.remove(&subject);
    }

    pub fn subject_count(&self) -> usize {
        self.profiles.len()
    }

    pub fn total_entries(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    /// Clamps loaded importances back into range.
    pub fn sanitize(&mut self) {
        for bucket in self.entries.values_mut() {
            for entry in bucket {
                entry.importance = entry.importance.clamp(1, 10);
            }
        }
    }
}
