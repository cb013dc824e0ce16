//! Needs
//!
//! Per-NPC decaying/recovering scalar state. Energy drains while awake and
//! recovers while sleeping; safety has no passive decay and is instead
//! recomputed from an environmental report on a coarser cadence.
//!
//! All values are clamped to [0,100] after every operation; bad input is
//! clamped, never rejected.

use serde::{Deserialize, Serialize};

/// Tuning constants for the needs subsystem.
pub mod need_constants {
    /// Ticks between needs updates; `Needs::tick` covers this many ticks.
    pub const UPDATE_INTERVAL: u64 = 20;
    /// Ticks between safety recomputes; these involve spatial queries and
    /// run on a much coarser cadence than the needs update.
    pub const SAFETY_UPDATE_INTERVAL: u64 = 100;
    /// Below this a need is critical and gates behavior hard.
    pub const CRITICAL_THRESHOLD: f32 = 20.0;
    /// Below this a need is low and worth acting on.
    pub const LOW_THRESHOLD: f32 = 40.0;
    /// Comfortable level; used by spawn defaults.
    pub const NORMAL_THRESHOLD: f32 = 60.0;
    /// Energy regained per simulated hour of sleep.
    pub const SLEEP_REGEN_PER_HOUR: f32 = 20.0;
    /// Energy restored on waking into a new day.
    pub const WAKE_REST_BONUS: f32 = 10.0;
}

/// Additive terms of the safety recompute.
pub mod safety_constants {
    /// Starting point before bonuses and penalties.
    pub const BASE_SAFETY: f32 = 50.0;
    /// Being at or near the NPC's own home.
    pub const HOME_BONUS: f32 = 40.0;
    /// A watch member close enough to call for.
    pub const WATCH_BONUS: f32 = 20.0;
    /// A liked NPC nearby.
    pub const FRIEND_BONUS: f32 = 10.0;
    /// Night time away from home.
    pub const NIGHT_EXPOSED_PENALTY: f32 = 20.0;
    /// A crime happened nearby recently.
    pub const RECENT_CRIME_PENALTY: f32 = 30.0;
    /// Someone this NPC remembers as a criminal is close.
    pub const KNOWN_CRIMINAL_PENALTY: f32 = 50.0;
    /// A stranger with a visible weapon; applied at most once per recompute.
    pub const ARMED_STRANGER_PENALTY: f32 = 40.0;

    /// Squared radius counting as "at home".
    pub const HOME_RADIUS_SQ: f32 = 25.0;
    /// Radius within which watch presence is felt.
    pub const WATCH_RADIUS: f32 = 30.0;
    /// Radius within which a friend is reassuring.
    pub const FRIEND_RADIUS: f32 = 15.0;
    /// Radius within which armed strangers are threatening.
    pub const ARMED_RADIUS: f32 = 10.0;
    /// Radius within which a remembered criminal is felt.
    pub const CRIMINAL_RADIUS: f32 = 12.0;
    /// Radius within which a recent crime is unsettling.
    pub const CRIME_RADIUS: f32 = 16.0;
    /// How long a crime stays "recent", in ticks.
    pub const CRIME_MEMORY_TICKS: u64 = 24_000;

    /// Minimum relation score for another NPC to count as a friend.
    pub const FRIEND_RELATION_FLOOR: i32 = 20;
}

/// The two need axes. Runtime-only; the persisted state stores the values
/// themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NeedKind {
    Energy,
    Safety,
}

/// Per-variant coefficients for a need.
#[derive(Debug, Clone, Copy)]
pub struct NeedProfile {
    /// Passive loss per tick while awake.
    pub decay_per_tick: f32,
}

const NEED_TABLE: [NeedProfile; 2] = [
    // Energy
    NeedProfile {
        decay_per_tick: 0.005,
    },
    // Safety: recomputed, never passively decayed
    NeedProfile {
        decay_per_tick: 0.0,
    },
];

/// Looks up the coefficient row for a need.
pub fn need_profile(kind: NeedKind) -> &'static NeedProfile {
    &NEED_TABLE[kind as usize]
}

/// What the NPC can currently see and remember about its surroundings.
///
/// Built by the safety system from spatial queries; a default (all-false)
/// report means "no context available" and yields exactly the base value.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SafetyReport {
    pub near_home: bool,
    pub watch_nearby: bool,
    pub friend_nearby: bool,
    pub exposed_at_night: bool,
    pub recent_crime_nearby: bool,
    pub known_criminal_nearby: bool,
    pub armed_stranger_nearby: bool,
}

/// Computes a safety value from an environment report, clamped to [0,100].
pub fn compute_safety(report: &SafetyReport) -> f32 {
    use safety_constants::*;

    let mut safety = BASE_SAFETY;
    if report.near_home {
        safety += HOME_BONUS;
    }
    if report.watch_nearby {
        safety += WATCH_BONUS;
    }
    if report.friend_nearby {
        safety += FRIEND_BONUS;
    }
    if report.exposed_at_night {
        safety -= NIGHT_EXPOSED_PENALTY;
    }
    if report.recent_crime_nearby {
        safety -= RECENT_CRIME_PENALTY;
    }
    if report.known_criminal_nearby {
        safety -= KNOWN_CRIMINAL_PENALTY;
    }
    if report.armed_stranger_nearby {
        safety -= ARMED_STRANGER_PENALTY;
    }
    safety.clamp(0.0, 100.0)
}

/// Per-NPC need state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Needs {
    energy: f32,
    safety: f32,
    sleeping: bool,
}

impl Default for Needs {
    fn default() -> Self {
        Self {
            energy: 100.0,
            safety: need_constants::NORMAL_THRESHOLD,
            sleeping: false,
        }
    }
}

impl Needs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances energy by one update interval's worth of decay or regen.
    ///
    /// Safety is untouched here; it is recomputed separately.
    pub fn tick(&mut self) {
        use need_constants::*;

        if self.sleeping {
            let regen =
                SLEEP_REGEN_PER_HOUR / npc_events::TICKS_PER_HOUR as f32 * UPDATE_INTERVAL as f32;
            self.energy = (self.energy + regen).min(100.0);
        } else {
            let decay = need_profile(NeedKind::Energy).decay_per_tick * UPDATE_INTERVAL as f32;
            self.energy = (self.energy - decay).max(0.0);
        }
    }

    /// Replaces safety with the value computed from `report`.
    pub fn apply_safety(&mut self, report: &SafetyReport) {
        self.safety = compute_safety(report);
    }

    pub fn get(&self, kind: NeedKind) -> f32 {
        match kind {
            NeedKind::Energy => self.energy,
            NeedKind::Safety => self.safety,
        }
    }

    /// Raises a need, clamped to 100.
    pub fn satisfy(&mut self, kind: NeedKind, amount: f32) {
        let v = (self.get(kind) + amount).clamp(0.0, 100.0);
        self.set(kind, v);
    }

    /// Lowers a need, clamped to 0.
    pub fn reduce(&mut self, kind: NeedKind, amount: f32) {
        let v = (self.get(kind) - amount).clamp(0.0, 100.0);
        self.set(kind, v);
    }

    fn set(&mut self, kind: NeedKind, value: f32) {
        match kind {
            NeedKind::Energy => self.energy = value,
            NeedKind::Safety => self.safety = value,
        }
    }

    pub fn is_critical(&self, kind: NeedKind) -> bool {
        self.get(kind) < need_constants::CRITICAL_THRESHOLD
    }

    pub fn is_low(&self, kind: NeedKind) -> bool {
        self.get(kind) < need_constants::LOW_THRESHOLD
    }

    /// Returns the lowest need, but only when it is actually low.
    pub fn most_critical(&self) -> Option<NeedKind> {
        let (kind, value) = if self.energy <= self.safety {
            (NeedKind::Energy, self.energy)
        } else {
            (NeedKind::Safety, self.safety)
        };
        (value < need_constants::LOW_THRESHOLD).then_some(kind)
    }

    /// Mean of all need values.
    pub fn overall(&self) -> f32 {
        (self.energy + self.safety) / 2.0
    }

    pub fn is_sleeping(&self) -> bool {
        self.sleeping
    }

    pub fn set_sleeping(&mut self, sleeping: bool) {
        self.sleeping = sleeping;
    }

    /// Re-clamps values after a lenient load.
    pub fn sanitize(&mut self) {
        self.energy = self.energy.clamp(0.0, 100.0);
        self.safety = self.safety.clamp(0.0, 100.0);
        if !self.energy.is_finite() {
            self.energy = 100.0;
        }
        if !self.safety.is_finite() {
            self.safety = need_constants::NORMAL_THRESHOLD;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let needs = Needs::new();
        assert_eq!(needs.get(NeedKind::Energy), 100.0);
        assert_eq!(needs.get(NeedKind::Safety), 60.0);
        assert!(!needs.is_sleeping());
    }

    #[test]
    fn test_awake_energy_decay() {
        let mut needs = Needs::new();
        needs.tick();
        assert!(needs.get(NeedKind::Energy) < 100.0);
        // 0.005 per tick over a 20-tick interval
        assert!((needs.get(NeedKind::Energy) - 99.9).abs() < 1e-4);
    }

    #[test]
    fn test_sleep_regen() {
        let mut needs = Needs::new();
        needs.reduce(NeedKind::Energy, 50.0);
        needs.set_sleeping(true);
        needs.tick();
        // 20 per hour prorated over a 20-tick interval
        assert!((needs.get(NeedKind::Energy) - 50.4).abs() < 1e-4);
    }

    #[test]
    fn test_energy_never_negative() {
        let mut needs = Needs::new();
        needs.reduce(NeedKind::Energy, 1_000.0);
        assert_eq!(needs.get(NeedKind::Energy), 0.0);
        for _ in 0..100 {
            needs.tick();
        }
        assert!(needs.get(NeedKind::Energy) >= 0.0);
    }

    #[test]
    fn test_regen_caps_at_hundred() {
        let mut needs = Needs::new();
        needs.set_sleeping(true);
        for _ in 0..1_000 {
            needs.tick();
        }
        assert_eq!(needs.get(NeedKind::Energy), 100.0);
    }

    #[test]
    fn test_satisfy_and_reduce_clamp() {
        let mut needs = Needs::new();
        needs.satisfy(NeedKind::Safety, 500.0);
        assert_eq!(needs.get(NeedKind::Safety), 100.0);
        needs.reduce(NeedKind::Safety, 500.0);
        assert_eq!(needs.get(NeedKind::Safety), 0.0);
    }

    #[test]
    fn test_threshold_predicates() {
        let mut needs = Needs::new();
        needs.reduce(NeedKind::Energy, 61.0); // 39.0
        assert!(needs.is_low(NeedKind::Energy));
        assert!(!needs.is_critical(NeedKind::Energy));
        needs.reduce(NeedKind::Energy, 20.0); // 19.0
        assert!(needs.is_critical(NeedKind::Energy));
    }

    #[test]
    fn test_most_critical_only_when_low() {
        let mut needs = Needs::new();
        assert_eq!(needs.most_critical(), None);
        needs.reduce(NeedKind::Safety, 30.0); // 30.0
        assert_eq!(needs.most_critical(), Some(NeedKind::Safety));
        needs.reduce(NeedKind::Energy, 75.0); // 25.0 < 30.0
        assert_eq!(needs.most_critical(), Some(NeedKind::Energy));
    }

    #[test]
    fn test_overall_is_mean() {
        let mut needs = Needs::new();
        needs.reduce(NeedKind::Energy, 40.0); // 60
        assert_eq!(needs.overall(), 60.0);
    }

    #[test]
    fn test_safety_base_with_empty_report() {
        let report = SafetyReport::default();
        assert_eq!(compute_safety(&report), 50.0);
    }

    #[test]
    fn test_safety_full_house() {
        let report = SafetyReport {
            near_home: true,
            watch_nearby: true,
            friend_nearby: true,
            ..Default::default()
        };
        assert_eq!(compute_safety(&report), 100.0);
    }

    #[test]
    fn test_safety_clamps_low() {
        let report = SafetyReport {
            exposed_at_night: true,
            recent_crime_nearby: true,
            known_criminal_nearby: true,
            armed_stranger_nearby: true,
            ..Default::default()
        };
        assert_eq!(compute_safety(&report), 0.0);
    }

    #[test]
    fn test_safety_home_outweighs_night() {
        let report = SafetyReport {
            near_home: true,
            exposed_at_night: true,
            ..Default::default()
        };
        assert_eq!(compute_safety(&report), 70.0);
    }

    #[test]
    fn test_apply_safety() {
        let mut needs = Needs::new();
        needs.apply_safety(&SafetyReport {
            known_criminal_nearby: true,
            ..Default::default()
        });
        assert_eq!(needs.get(NeedKind::Safety), 0.0);
    }

    #[test]
    fn test_sanitize_repairs_bad_values() {
        let mut needs = Needs::new();
        needs.energy = 250.0;
        needs.safety = -40.0;
        needs.sanitize();
        assert_eq!(needs.get(NeedKind::Energy), 100.0);
        assert_eq!(needs.get(NeedKind::Safety), 0.0);
    }

    #[test]
    fn test_serde_roundtrip() {
        let mut needs = Needs::new();
        needs.reduce(NeedKind::Energy, 25.5);
        needs.set_sleeping(true);
        let json = serde_json::to_string(&needs).unwrap();
        let parsed: Needs = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, needs);
    }
}
