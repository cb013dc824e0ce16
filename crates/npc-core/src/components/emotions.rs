//! Emotions
//!
//! Per-NPC active-emotion state machine. Discrete triggers raise an emotion
//! with an intensity and a countdown; ticking decays it back toward the
//! baseline. Price and social modifiers interpolate between neutral and the
//! emotion's endpoint by intensity.
//!
//! Per-variant coefficients live in a table indexed by the plain enum tag;
//! the enum itself carries no behavior beyond name parsing.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Tuning constants for the emotion state machine.
pub mod emotion_constants {
    /// Intensity lost per tick inside the final decay window.
    pub const DECAY_PER_TICK: f32 = 0.02;
    /// Remaining-tick window in which intensity starts bleeding off.
    pub const FINAL_DECAY_WINDOW: u32 = 1_200;
    /// At or above this an emotion is considered strong.
    pub const STRONG_THRESHOLD: f32 = 70.0;
    /// Below this an emotion no longer counts as active.
    pub const ACTIVE_THRESHOLD: f32 = 20.0;
    /// Intensity floor for fleeing.
    pub const FLEE_INTENSITY: f32 = 50.0;
    /// Intensity floor for fighting.
    pub const FIGHT_INTENSITY: f32 = 70.0;
    /// Intensity at which a non-trading emotion actually blocks trade.
    pub const TRADE_BLOCK_INTENSITY: f32 = 50.0;
    /// Intensity floor for calling the watch.
    pub const WATCH_CALL_INTENSITY: f32 = 60.0;
    /// Transition progress gained per tick.
    pub const TRANSITION_STEP: f32 = 0.05;
    /// Fraction of a same-emotion retrigger's intensity added on reinforce.
    pub const REINFORCE_FACTOR: f32 = 0.3;
}

/// The emotion an NPC can be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EmotionState {
    #[default]
    Neutral,
    Happy,
    Sad,
    Angry,
    Fearful,
    Suspicious,
}

impl EmotionState {
    pub fn name(self) -> &'static str {
        match self {
            EmotionState::Neutral => "neutral",
            EmotionState::Happy => "happy",
            EmotionState::Sad => "sad",
            EmotionState::Angry => "angry",
            EmotionState::Fearful => "fearful",
            EmotionState::Suspicious => "suspicious",
        }
    }

    /// Parses a persisted name; unknown names fall back to `Neutral`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "happy" => EmotionState::Happy,
            "sad" => EmotionState::Sad,
            "angry" => EmotionState::Angry,
            "fearful" => EmotionState::Fearful,
            "suspicious" => EmotionState::Suspicious,
            _ => EmotionState::Neutral,
        }
    }
}

impl Serialize for EmotionState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for EmotionState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(EmotionState::from_name(&s))
    }
}

/// Per-variant coefficients for an emotion.
#[derive(Debug, Clone, Copy)]
pub struct EmotionProfile {
    /// Price endpoint at intensity 100 (1.0 = unaffected).
    pub base_price_modifier: f32,
    /// Talkativeness endpoint at intensity 100.
    pub base_social_modifier: f32,
    /// Countdown used when a trigger gives no explicit duration.
    pub default_duration_ticks: u32,
    /// Whether this emotion leaves the NPC open to trading at all.
    pub trades: bool,
    /// Whether this emotion can drive the NPC to flee.
    pub can_flee: bool,
    /// Whether this emotion can drive the NPC to fight.
    pub can_fight: bool,
}

const EMOTION_TABLE: [EmotionProfile; 6] = [
    // Neutral
    EmotionProfile {
        base_price_modifier: 1.0,
        base_social_modifier: 1.0,
        default_duration_ticks: 0,
        trades: true,
        can_flee: false,
        can_fight: false,
    },
    // Happy
    EmotionProfile {
        base_price_modifier: 0.9,
        base_social_modifier: 1.3,
        default_duration_ticks: 6_000,
        trades: true,
        can_flee: false,
        can_fight: false,
    },
    // Sad
    EmotionProfile {
        base_price_modifier: 1.1,
        base_social_modifier: 0.6,
        default_duration_ticks: 12_000,
        trades: true,
        can_flee: false,
        can_fight: false,
    },
    // Angry
    EmotionProfile {
        base_price_modifier: 1.3,
        base_social_modifier: 0.3,
        default_duration_ticks: 9_000,
        trades: false,
        can_flee: false,
        can_fight: true,
    },
    // Fearful
    EmotionProfile {
        base_price_modifier: 1.5,
        base_social_modifier: 0.1,
        default_duration_ticks: 4_800,
        trades: false,
        can_flee: true,
        can_fight: false,
    },
    // Suspicious
    EmotionProfile {
        base_price_modifier: 1.2,
        base_social_modifier: 0.7,
        default_duration_ticks: 12_000,
        trades: false,
        can_flee: false,
        can_fight: false,
    },
];

/// Looks up the coefficient row for an emotion.
pub fn emotion_profile(state: EmotionState) -> &'static EmotionProfile {
    &EMOTION_TABLE[state as usize]
}

/// Default countdown for an emotion triggered without an explicit duration.
pub fn default_duration(state: EmotionState) -> u32 {
    emotion_profile(state).default_duration_ticks
}

fn full_progress() -> f32 {
    1.0
}

/// Per-NPC emotion state.
///
/// Only the fields needed to resume are persisted; transition smoothing
/// restarts at "settled" after a load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Emotions {
    current: EmotionState,
    intensity: f32,
    remaining_ticks: u32,
    baseline: EmotionState,
    #[serde(skip)]
    previous: EmotionState,
    #[serde(skip_serializing, default = "full_progress")]
    transition_progress: f32,
}

impl Default for Emotions {
    fn default() -> Self {
        Self {
            current: EmotionState::Neutral,
            intensity: 0.0,
            remaining_ticks: 0,
            baseline: EmotionState::Neutral,
            previous: EmotionState::Neutral,
            transition_progress: 1.0,
        }
    }
}

impl Emotions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Triggers an emotion with the table's default duration.
    pub fn trigger(&mut self, emotion: EmotionState, intensity: f32) {
        self.trigger_with_duration(emotion, intensity, default_duration(emotion));
    }

    /// Triggers an emotion with an explicit countdown.
    ///
    /// A different emotion replaces the current one outright. Retriggering
    /// the current emotion never shortens its countdown: the duration is
    /// extended to the maximum of old and new, and intensity either jumps to
    /// the higher value or is reinforced by 30% of the weaker trigger.
    pub fn trigger_with_duration(&mut self, emotion: EmotionState, intensity: f32, duration: u32) {
        let intensity = intensity.clamp(0.0, 100.0);
        if emotion != self.current {
            self.previous = self.current;
            self.current = emotion;
            self.intensity = intensity;
            self.remaining_ticks = duration;
            self.transition_progress = 0.0;
        } else {
            self.remaining_ticks = self.remaining_ticks.max(duration);
            self.intensity = if intensity > self.intensity {
                intensity
            } else {
                (self.intensity + intensity * emotion_constants::REINFORCE_FACTOR).min(100.0)
            };
        }
    }

    /// Advances the state machine by one tick.
    pub fn tick(&mut self) {
        use emotion_constants::*;

        self.transition_progress = (self.transition_progress + TRANSITION_STEP).min(1.0);

        if self.current != self.baseline {
            if self.remaining_ticks > 0 {
                self.remaining_ticks -= 1;
                if self.remaining_ticks < FINAL_DECAY_WINDOW {
                    self.intensity = (self.intensity - DECAY_PER_TICK).max(0.0);
                }
            }
            if self.remaining_ticks == 0 || self.intensity < ACTIVE_THRESHOLD {
                self.decay_to_baseline();
            }
        }
    }

    fn decay_to_baseline(&mut self) {
        self.previous = self.current;
        self.current = self.baseline;
        self.intensity = 0.0;
        self.remaining_ticks = 0;
        self.transition_progress = 0.0;
    }

    /// Immediately returns to baseline with no transition animation.
    pub fn reset(&mut self) {
        self.decay_to_baseline();
        self.transition_progress = 1.0;
    }

    pub fn has_active_emotion(&self) -> bool {
        self.current != EmotionState::Neutral
            && self.intensity >= emotion_constants::ACTIVE_THRESHOLD
    }

    /// Multiplier applied to this NPC's prices; 1.0 when nothing is active.
    pub fn price_modifier(&self) -> f32 {
        if !self.has_active_emotion() {
            return 1.0;
        }
        let base = emotion_profile(self.current).base_price_modifier;
        1.0 + (base - 1.0) * self.intensity / 100.0
    }

    /// Multiplier applied to this NPC's talkativeness.
    pub fn social_modifier(&self) -> f32 {
        if !self.has_active_emotion() {
            return 1.0;
        }
        let base = emotion_profile(self.current).base_social_modifier;
        1.0 + (base - 1.0) * self.intensity / 100.0
    }

    pub fn would_flee(&self) -> bool {
        emotion_profile(self.current).can_flee
            && self.intensity >= emotion_constants::FLEE_INTENSITY
    }

    pub fn would_fight(&self) -> bool {
        emotion_profile(self.current).can_fight
            && self.intensity >= emotion_constants::FIGHT_INTENSITY
    }

    pub fn would_trade(&self) -> bool {
        emotion_profile(self.current).trades
            || self.intensity < emotion_constants::TRADE_BLOCK_INTENSITY
    }

    pub fn would_call_watch(&self) -> bool {
        matches!(self.current, EmotionState::Fearful | EmotionState::Angry)
            && self.intensity >= emotion_constants::WATCH_CALL_INTENSITY
    }

    pub fn current(&self) -> EmotionState {
        self.current
    }

    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    pub fn remaining_ticks(&self) -> u32 {
        self.remaining_ticks
    }

    pub fn baseline(&self) -> EmotionState {
        self.baseline
    }

    pub fn previous(&self) -> EmotionState {
        self.previous
    }

    pub fn transition_progress(&self) -> f32 {
        self.transition_progress
    }

    pub fn set_baseline(&mut self, baseline: EmotionState) {
        self.baseline = baseline;
    }

    /// Re-clamps values after a lenient load.
    pub fn sanitize(&mut self) {
        if !self.intensity.is_finite() {
            self.intensity = 0.0;
        }
        self.intensity = self.intensity.clamp(0.0, 100.0);
        self.transition_progress = self.transition_progress.clamp(0.0, 1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let emotions = Emotions::new();
        assert_eq!(emotions.current(), EmotionState::Neutral);
        assert_eq!(emotions.intensity(), 0.0);
        assert!(!emotions.has_active_emotion());
        assert_eq!(emotions.price_modifier(), 1.0);
    }

    #[test]
    fn test_trigger_sets_state() {
        let mut emotions = Emotions::new();
        emotions.trigger(EmotionState::Happy, 50.0);
        assert_eq!(emotions.current(), EmotionState::Happy);
        assert_eq!(emotions.intensity(), 50.0);
        assert_eq!(emotions.remaining_ticks(), 6_000);
        assert_eq!(emotions.transition_progress(), 0.0);
    }

    #[test]
    fn test_different_emotion_replaces() {
        let mut emotions = Emotions::new();
        emotions.trigger(EmotionState::Sad, 30.0);
        emotions.trigger(EmotionState::Angry, 60.0);
        assert_eq!(emotions.current(), EmotionState::Angry);
        assert_eq!(emotions.intensity(), 60.0);
        assert_eq!(emotions.previous(), EmotionState::Sad);
    }

    #[test]
    fn test_same_emotion_reinforces() {
        let mut emotions = Emotions::new();
        emotions.trigger_with_duration(EmotionState::Happy, 50.0, 1_000);
        emotions.trigger_with_duration(EmotionState::Happy, 40.0, 2_000);
        // 50 + 40 * 0.3
        assert!((emotions.intensity() - 62.0).abs() < 1e-4);
        assert_eq!(emotions.remaining_ticks(), 2_000);
    }

    #[test]
    fn test_retrigger_never_shortens_countdown() {
        let mut emotions = Emotions::new();
        emotions.trigger_with_duration(EmotionState::Happy, 50.0, 10_000);
        emotions.trigger_with_duration(EmotionState::Happy, 90.0, 100);
        assert_eq!(emotions.remaining_ticks(), 10_000);
        assert_eq!(emotions.intensity(), 90.0);
    }

    #[test]
    fn test_intensity_caps_at_hundred() {
        let mut emotions = Emotions::new();
        emotions.trigger(EmotionState::Happy, 95.0);
        emotions.trigger(EmotionState::Happy, 90.0);
        assert_eq!(emotions.intensity(), 100.0);
        emotions.trigger(EmotionState::Angry, 500.0);
        assert_eq!(emotions.intensity(), 100.0);
    }

    #[test]
    fn test_price_modifier_endpoints() {
        let mut emotions = Emotions::new();
        emotions.trigger(EmotionState::Happy, 100.0);
        assert!((emotions.price_modifier() - 0.9).abs() < 1e-4);

        let mut emotions = Emotions::new();
        emotions.trigger(EmotionState::Fearful, 100.0);
        assert!((emotions.price_modifier() - 1.5).abs() < 1e-4);

        let mut emotions = Emotions::new();
        emotions.trigger(EmotionState::Fearful, 50.0);
        assert!((emotions.price_modifier() - 1.25).abs() < 1e-4);
    }

    #[test]
    fn test_angry_price_scenario() {
        let mut emotions = Emotions::new();
        emotions.trigger(EmotionState::Angry, 80.0);
        assert_eq!(emotions.current(), EmotionState::Angry);
        assert!((emotions.price_modifier() - 1.24).abs() < 1e-4);
    }

    #[test]
    fn test_angry_reverts_after_default_duration() {
        let mut emotions = Emotions::new();
        emotions.trigger(EmotionState::Angry, 80.0);
        for _ in 0..9_001 {
            emotions.tick();
        }
        assert_eq!(emotions.current(), EmotionState::Neutral);
        assert_eq!(emotions.price_modifier(), 1.0);
        assert!(!emotions.has_active_emotion());
    }

    #[test]
    fn test_social_modifier_endpoints() {
        let mut emotions = Emotions::new();
        emotions.trigger(EmotionState::Angry, 100.0);
        assert!((emotions.social_modifier() - 0.3).abs() < 1e-4);

        let mut emotions = Emotions::new();
        emotions.trigger(EmotionState::Happy, 100.0);
        assert!((emotions.social_modifier() - 1.3).abs() < 1e-4);
    }

    #[test]
    fn test_inactive_below_threshold() {
        let mut emotions = Emotions::new();
        emotions.trigger(EmotionState::Happy, 15.0);
        assert!(!emotions.has_active_emotion());
        assert_eq!(emotions.price_modifier(), 1.0);
    }

    #[test]
    fn test_would_flee() {
        let mut emotions = Emotions::new();
        emotions.trigger(EmotionState::Fearful, 60.0);
        assert!(emotions.would_flee());

        let mut emotions = Emotions::new();
        emotions.trigger(EmotionState::Fearful, 40.0);
        assert!(!emotions.would_flee());

        let mut emotions = Emotions::new();
        emotions.trigger(EmotionState::Angry, 90.0);
        assert!(!emotions.would_flee());
    }

    #[test]
    fn test_would_fight() {
        let mut emotions = Emotions::new();
        emotions.trigger(EmotionState::Angry, 80.0);
        assert!(emotions.would_fight());

        let mut emotions = Emotions::new();
        emotions.trigger(EmotionState::Angry, 60.0);
        assert!(!emotions.would_fight());
    }

    #[test]
    fn test_would_trade() {
        let emotions = Emotions::new();
        assert!(emotions.would_trade());

        let mut emotions = Emotions::new();
        emotions.trigger(EmotionState::Fearful, 80.0);
        assert!(!emotions.would_trade());

        let mut emotions = Emotions::new();
        emotions.trigger(EmotionState::Suspicious, 30.0);
        assert!(emotions.would_trade());
    }

    #[test]
    fn test_would_call_watch() {
        let mut emotions = Emotions::new();
        emotions.trigger(EmotionState::Fearful, 70.0);
        assert!(emotions.would_call_watch());

        let mut emotions = Emotions::new();
        emotions.trigger(EmotionState::Happy, 100.0);
        assert!(!emotions.would_call_watch());
    }

    #[test]
    fn test_inactive_implies_baseline() {
        let mut emotions = Emotions::new();
        emotions.trigger(EmotionState::Suspicious, 25.0);
        // Retrigger and decay through several cycles; whenever the emotion
        // goes inactive, the current state must equal the baseline.
        for _ in 0..30_000 {
            emotions.tick();
            if !emotions.has_active_emotion() && emotions.remaining_ticks() == 0 {
                assert_eq!(emotions.current(), emotions.baseline());
            }
        }
    }

    #[test]
    fn test_baseline_reversion_target() {
        let mut emotions = Emotions::new();
        emotions.set_baseline(EmotionState::Suspicious);
        emotions.trigger_with_duration(EmotionState::Angry, 50.0, 10);
        for _ in 0..11 {
            emotions.tick();
        }
        assert_eq!(emotions.current(), EmotionState::Suspicious);
        assert_eq!(emotions.intensity(), 0.0);
    }

    #[test]
    fn test_reset() {
        let mut emotions = Emotions::new();
        emotions.trigger(EmotionState::Angry, 90.0);
        emotions.reset();
        assert_eq!(emotions.current(), EmotionState::Neutral);
        assert_eq!(emotions.intensity(), 0.0);
        assert_eq!(emotions.transition_progress(), 1.0);
    }

    #[test]
    fn test_transition_progress_advances() {
        let mut emotions = Emotions::new();
        emotions.trigger(EmotionState::Happy, 50.0);
        assert_eq!(emotions.transition_progress(), 0.0);
        for _ in 0..10 {
            emotions.tick();
        }
        assert!((emotions.transition_progress() - 0.5).abs() < 1e-4);
        for _ in 0..20 {
            emotions.tick();
        }
        assert_eq!(emotions.transition_progress(), 1.0);
    }

    #[test]
    fn test_unknown_name_falls_back_to_neutral() {
        assert_eq!(EmotionState::from_name("ecstatic"), EmotionState::Neutral);
        assert_eq!(EmotionState::from_name("angry"), EmotionState::Angry);
    }

    #[test]
    fn test_serde_roundtrip() {
        let mut emotions = Emotions::new();
        emotions.trigger(EmotionState::Fearful, 66.0);
        let json = serde_json::to_string(&emotions).unwrap();
        let parsed: Emotions = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.current(), EmotionState::Fearful);
        assert_eq!(parsed.intensity(), 66.0);
        assert_eq!(parsed.remaining_ticks(), emotions.remaining_ticks());
        // Transition smoothing restarts settled after a load.
        assert_eq!(parsed.transition_progress(), 1.0);
    }

    #[test]
    fn test_lenient_load_of_unknown_emotion() {
        let json = r#"{"current":"vengeful","intensity":55.0,"remaining_ticks":100,"baseline":"neutral"}"#;
        let parsed: Emotions = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.current(), EmotionState::Neutral);
    }
}
