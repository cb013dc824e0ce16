//! Life Data
//!
//! The per-NPC aggregate: needs, emotions, memory and personality under one
//! component, together with the tick scheduling that drives them. Needs and
//! emotions advance on a frequent sub-interval; the safety recompute runs on
//! its own coarser cadence from the systems layer; day changes are detected
//! here by comparing the world clock against the last seen day.

use bevy_ecs::prelude::*;
use npc_events::WorldClock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::emotions::{EmotionState, Emotions};
use super::memory::Memory;
use super::needs::{need_constants, Needs, NeedKind};
use super::personality::Personality;

/// Gate values for the combined decision predicates.
pub mod life_constants {
    /// Minimum social modifier at which an NPC still makes conversation.
    pub const TALK_SOCIAL_FLOOR: f32 = 0.3;
}

/// Marker component identifying an entity as a simulated NPC.
#[derive(Component, Debug, Clone, Default)]
pub struct Npc;

/// Stable identity. Survives save/load; entity ids do not.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NpcId(pub Uuid);

/// Human-readable name for logs and snapshots.
#[derive(Component, Debug, Clone, Serialize, Deserialize)]
pub struct NpcName(pub String);

/// Flat world position.
#[derive(Component, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_sq(&self, other: &Position) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

/// Where this NPC feels at home.
#[derive(Component, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Home {
    pub x: f32,
    pub y: f32,
}

/// Spendable coin.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    pub balance: i64,
}

impl Wallet {
    pub fn new(balance: i64) -> Self {
        Self { balance }
    }

    pub fn can_afford(&self, amount: i64) -> bool {
        self.balance >= amount
    }

    pub fn credit(&mut self, amount: i64) {
        self.balance += amount.max(0);
    }

    /// Takes up to `amount`, never overdrawing. Returns what was taken.
    pub fn debit(&mut self, amount: i64) -> i64 {
        let taken = amount.clamp(0, self.balance);
        self.balance -= taken;
        taken
    }
}

/// Marker for NPCs carrying a visible weapon.
#[derive(Component, Debug, Clone, Default)]
pub struct Armed;

/// The psychological core of one NPC.
#[derive(Component, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifeData {
    pub needs: Needs,
    pub emotions: Emotions,
    pub memory: Memory,
    pub personality: Personality,
    /// Disabled NPCs skip all per-tick work but keep their state.
    pub enabled: bool,
    pub age_in_days: u64,
    pub last_known_day: Option<u64>,
    #[serde(skip)]
    tick_counter: u64,
}

impl Default for LifeData {
    fn default() -> Self {
        Self::new(Personality::balanced())
    }
}

impl LifeData {
    pub fn new(personality: Personality) -> Self {
        Self {
            needs: Needs::new(),
            emotions: Emotions::new(),
            memory: Memory::new(),
            personality,
            enabled: true,
            age_in_days: 0,
            last_known_day: None,
            tick_counter: 0,
        }
    }

    /// Advances the NPC by one world tick. Needs and emotions update every
    /// `UPDATE_INTERVAL` ticks; day-change work runs whenever the clock has
    /// rolled into a new day since the last call.
    pub fn tick(&mut self, clock: &WorldClock) {
        if !self.enabled {
            return;
        }
        self.tick_counter = self.tick_counter.wrapping_add(1);
        if self.tick_counter % need_constants::UPDATE_INTERVAL == 0 {
            self.needs.tick();
            self.emotions.tick();
        }
        self.check_day_change(clock.day());
    }

    /// The first observed day is only recorded; later increases age the NPC,
    /// compact memory, and hand out the woke-up-rested energy bonus to NPCs
    /// who are already awake. A multi-day clock jump counts as one observed
    /// rollover.
    fn check_day_change(&mut self, day: u64) {
        match self.last_known_day {
            None => self.last_known_day = Some(day),
            Some(last) if day > last => {
                self.age_in_days += 1;
                self.memory.on_day_change(day);
                if !self.needs.is_sleeping() {
                    self.needs
                        .satisfy(NeedKind::Energy, need_constants::WAKE_REST_BONUS);
                }
                self.last_known_day = Some(day);
            }
            _ => {}
        }
    }

    /// Personality and emotion price effects compose multiplicatively.
    pub fn combined_price_modifier(&self) -> f32 {
        self.personality.trade_modifier() * self.emotions.price_modifier()
    }

    /// Talkativeness carries no personality term; the mood decides alone.
    pub fn combined_social_modifier(&self) -> f32 {
        self.emotions.social_modifier()
    }

    /// No deals while feeling unsafe, terrified, or furious. Milder moods,
    /// suspicion included, still trade (at adjusted prices).
    pub fn is_willing_to_trade(&self) -> bool {
        if self.needs.is_critical(NeedKind::Safety) {
            return false;
        }
        let current = self.emotions.current();
        let intensity = self.emotions.intensity();
        if current == EmotionState::Fearful && intensity > 50.0 {
            return false;
        }
        if current == EmotionState::Angry && intensity > 70.0 {
            return false;
        }
        true
    }

    /// Exhausted and frightened NPCs keep to themselves; everyone else talks
    /// as long as their mood leaves enough of a social modifier.
    pub fn is_willing_to_talk(&self) -> bool {
        if self.needs.is_critical(NeedKind::Energy) {
            return false;
        }
        if self.emotions.current() == EmotionState::Fearful {
            return false;
        }
        self.emotions.social_modifier() > life_constants::TALK_SOCIAL_FLOOR
    }

    /// Repairs anything a lenient load may have let through.
    pub fn sanitize(&mut self) {
        self.needs.sanitize();
        self.emotions.sanitize();
        self.memory.sanitize();
        self.personality.sanitize();
    }
}
