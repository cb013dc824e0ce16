//! Personality
//!
//! Fixed per-NPC personality vector: three independent axes in [-100,100].
//! Every behavioral coefficient is a pure function of the axes, linearly
//! interpolated between fixed endpoints. The slopes differ on the two sides
//! of zero where the original tuning had them differ; that asymmetry is
//! intentional and load-bearing for game balance.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Tuning constants for personality-derived coefficients.
pub mod personality_constants {
    /// Standard deviation used when rolling random personalities.
    pub const RANDOM_STDDEV: f32 = 40.0;
    /// Trade modifier slope above zero greed.
    pub const TRADE_SLOPE_GREEDY: f32 = 0.3;
    /// Trade modifier slope below zero greed.
    pub const TRADE_SLOPE_GENEROUS: f32 = 0.2;
    /// Fear threshold swing contributed by courage.
    pub const FEAR_COURAGE_SPAN: f32 = 30.0;
    /// Report chance swing contributed by honesty.
    pub const REPORT_HONESTY_SPAN: f32 = 0.45;
    /// Report chance gained per point of crime severity.
    pub const REPORT_SEVERITY_STEP: f32 = 0.03;
    /// Extra report chance for the notably brave.
    pub const REPORT_COURAGE_BONUS: f32 = 0.1;
    /// Hard cap on any report chance.
    pub const REPORT_CHANCE_CAP: f32 = 0.95;
}

/// Coarse starting temperament for spawned NPCs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonalityPreset {
    /// Careful with money, fairly honest.
    Frugal,
    /// Dead average on every axis.
    Balanced,
    /// Brave, a little loose with the truth, openhanded.
    Impulsive,
}

/// Display archetype derived from the axes. Cosmetic only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Archetype {
    Hero,
    Gangster,
    Citizen,
    Coward,
    Upright,
    Trader,
    Shady,
    Average,
}

impl Archetype {
    pub fn name(self) -> &'static str {
        match self {
            Archetype::Hero => "hero",
            Archetype::Gangster => "gangster",
            Archetype::Citizen => "citizen",
            Archetype::Coward => "coward",
            Archetype::Upright => "upright",
            Archetype::Trader => "trader",
            Archetype::Shady => "shady",
            Archetype::Average => "average",
        }
    }
}

/// Per-NPC personality axes.
///
/// Values are clamped to [-100,100] on every mutation path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Personality {
    pub courage: i32,
    pub honesty: i32,
    pub greed: i32,
}

/// Sum of 12 uniforms, shifted; a close approximation of a standard normal.
fn gaussian_approx<R: Rng>(rng: &mut R) -> f32 {
    let sum: f32 = (0..12).map(|_| rng.gen::<f32>()).sum();
    sum - 6.0
}

impl Personality {
    /// All axes at zero.
    pub fn balanced() -> Self {
        Self::default()
    }

    pub fn new(courage: i32, honesty: i32, greed: i32) -> Self {
        Self {
            courage: courage.clamp(-100, 100),
            honesty: honesty.clamp(-100, 100),
            greed: greed.clamp(-100, 100),
        }
    }

    /// Rolls a random personality around zero.
    pub fn randomized<R: Rng>(rng: &mut R) -> Self {
        let roll =
            |rng: &mut R| (gaussian_approx(rng) * personality_constants::RANDOM_STDDEV) as i32;
        Self::new(roll(rng), roll(rng), roll(rng))
    }

    pub fn from_preset(preset: PersonalityPreset) -> Self {
        match preset {
            PersonalityPreset::Frugal => Self::new(0, 30, 60),
            PersonalityPreset::Balanced => Self::new(0, 0, 0),
            PersonalityPreset::Impulsive => Self::new(40, -20, -30),
        }
    }

    /// Applies bounded deltas to the axes.
    pub fn modify(&mut self, d_courage: i32, d_honesty: i32, d_greed: i32) {
        self.courage = (self.courage + d_courage).clamp(-100, 100);
        self.honesty = (self.honesty + d_honesty).clamp(-100, 100);
        self.greed = (self.greed + d_greed).clamp(-100, 100);
    }

    /// Price multiplier from greed. Greedy NPCs charge more than generous
    /// ones discount: the slopes differ on purpose (-100 → 0.8, +100 → 1.3).
    pub fn trade_modifier(&self) -> f32 {
        use personality_constants::*;
        let greed = self.greed as f32 / 100.0;
        if self.greed >= 0 {
            1.0 + greed * TRADE_SLOPE_GREEDY
        } else {
            1.0 + greed * TRADE_SLOPE_GENEROUS
        }
    }

    /// Intensity a fear trigger needs before this NPC takes it seriously.
    pub fn fear_threshold(&self) -> f32 {
        50.0 + self.courage as f32 / 100.0 * personality_constants::FEAR_COURAGE_SPAN
    }

    /// Base chance of reporting a witnessed crime.
    pub fn report_chance(&self) -> f32 {
        0.5 + self.honesty as f32 / 100.0 * personality_constants::REPORT_HONESTY_SPAN
    }

    /// Chance this NPC accepts a bribe; dishonesty and greed both feed it.
    pub fn bribery_chance(&self) -> f32 {
        0.1 + ((-self.honesty + 100) as f32 / 200.0) * 0.3
            + ((self.greed + 100) as f32 / 200.0) * 0.3
    }

    /// Composite willingness to engage with others, in [-100,100].
    pub fn sociability(&self) -> i32 {
        (self.honesty / 2 - self.greed / 3 + self.courage / 4).clamp(-100, 100)
    }

    /// Haggling rounds this NPC tolerates before walking away.
    pub fn negotiation_patience(&self) -> u32 {
        if self.greed > 50 {
            2
        } else if self.greed > 0 {
            3
        } else if self.greed > -50 {
            4
        } else {
            5
        }
    }

    /// Rolls whether this NPC reports a crime of the given severity.
    pub fn would_report<R: Rng>(&self, severity: i32, rng: &mut R) -> bool {
        use personality_constants::*;
        let severity = severity.clamp(0, 10);
        let mut chance = self.report_chance() + severity as f32 * REPORT_SEVERITY_STEP;
        if self.courage > 50 {
            chance += REPORT_COURAGE_BONUS;
        }
        rng.gen::<f32>() < chance.min(REPORT_CHANCE_CAP)
    }

    pub fn would_investigate(&self) -> bool {
        self.courage > 20 && self.honesty > -30
    }

    pub fn would_keep_secret(&self) -> bool {
        self.honesty < 0
    }

    /// First-match rule table over the axes; used for display and debugging.
    pub fn archetype(&self) -> Archetype {
        let (c, h, g) = (self.courage, self.honesty, self.greed);
        if c > 50 && h > 50 && g < 0 {
            Archetype::Hero
        } else if c > 50 && h < -50 && g > 50 {
            Archetype::Gangster
        } else if c < -50 && h > 50 && g < 0 {
            Archetype::Citizen
        } else if c < -50 && h < -50 && g > 50 {
            Archetype::Coward
        } else if c > 30 && h > 30 {
            Archetype::Upright
        } else if g > 50 && h < 0 {
            Archetype::Trader
        } else if c < -30 && h < -30 {
            Archetype::Shady
        } else {
            Archetype::Average
        }
    }

    pub fn describe_courage(&self) -> &'static str {
        match self.courage {
            c if c >= 70 => "fearless",
            c if c >= 30 => "brave",
            c if c >= -30 => "steady",
            c if c >= -70 => "wary",
            _ => "timid",
        }
    }

    pub fn describe_honesty(&self) -> &'static str {
        match self.honesty {
            h if h >= 70 => "honorable",
            h if h >= 30 => "honest",
            h if h >= -30 => "pragmatic",
            h if h >= -70 => "slippery",
            _ => "deceitful",
        }
    }

    pub fn describe_greed(&self) -> &'static str {
        match self.greed {
            g if g >= 70 => "rapacious",
            g if g >= 30 => "acquisitive",
            g if g >= -30 => "content",
            g if g >= -70 => "generous",
            _ => "selfless",
        }
    }

    /// Re-clamps the axes after a lenient load.
    pub fn sanitize(&mut self) {
        self.courage = self.courage.clamp(-100, 100);
        self.honesty = self.honesty.clamp(-100, 100);
        self.greed = self.greed.clamp(-100, 100);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_presets() {
        let frugal = Personality::from_preset(PersonalityPreset::Frugal);
        assert_eq!((frugal.courage, frugal.honesty, frugal.greed), (0, 30, 60));

        let balanced = Personality::from_preset(PersonalityPreset::Balanced);
        assert_eq!(balanced, Personality::balanced());

        let impulsive = Personality::from_preset(PersonalityPreset::Impulsive);
        assert_eq!(
            (impulsive.courage, impulsive.honesty, impulsive.greed),
            (40, -20, -30)
        );
    }

    #[test]
    fn test_new_clamps() {
        let p = Personality::new(500, -500, 0);
        assert_eq!(p.courage, 100);
        assert_eq!(p.honesty, -100);
    }

    #[test]
    fn test_trade_modifier_asymmetry() {
        assert!((Personality::new(0, 0, 100).trade_modifier() - 1.3).abs() < 1e-4);
        assert!((Personality::new(0, 0, -100).trade_modifier() - 0.8).abs() < 1e-4);
        assert!((Personality::new(0, 0, 0).trade_modifier() - 1.0).abs() < 1e-4);
        assert!((Personality::new(0, 0, 50).trade_modifier() - 1.15).abs() < 1e-4);
        assert!((Personality::new(0, 0, -50).trade_modifier() - 0.9).abs() < 1e-4);
    }

    #[test]
    fn test_fear_threshold() {
        assert!((Personality::new(100, 0, 0).fear_threshold() - 80.0).abs() < 1e-4);
        assert!((Personality::new(-100, 0, 0).fear_threshold() - 20.0).abs() < 1e-4);
        assert!((Personality::balanced().fear_threshold() - 50.0).abs() < 1e-4);
    }

    #[test]
    fn test_report_chance_span() {
        assert!((Personality::new(0, 100, 0).report_chance() - 0.95).abs() < 1e-4);
        assert!((Personality::new(0, -100, 0).report_chance() - 0.05).abs() < 1e-4);
    }

    #[test]
    fn test_bribery_chance_range() {
        let saint = Personality::new(0, 100, -100);
        assert!((saint.bribery_chance() - 0.1).abs() < 1e-4);
        let crook = Personality::new(0, -100, 100);
        assert!((crook.bribery_chance() - 0.7).abs() < 1e-4);
    }

    #[test]
    fn test_sociability() {
        let p = Personality::new(40, 60, -30);
        // 60/2 - (-30)/3 + 40/4 = 30 + 10 + 10
        assert_eq!(p.sociability(), 50);
        assert_eq!(Personality::new(-100, -100, 100).sociability(), -100);
    }

    #[test]
    fn test_negotiation_patience_buckets() {
        assert_eq!(Personality::new(0, 0, 80).negotiation_patience(), 2);
        assert_eq!(Personality::new(0, 0, 20).negotiation_patience(), 3);
        assert_eq!(Personality::new(0, 0, -20).negotiation_patience(), 4);
        assert_eq!(Personality::new(0, 0, -80).negotiation_patience(), 5);
    }

    #[test]
    fn test_would_report_extremes() {
        let mut rng = SmallRng::seed_from_u64(7);
        // Honest + brave + severe crime: capped at 0.95 but near certain.
        let upstanding = Personality::new(80, 100, 0);
        let reports = (0..1_000)
            .filter(|_| upstanding.would_report(10, &mut rng))
            .count();
        assert!(reports > 900);

        // Deceitful coward, trivial crime: nearly never.
        let lowlife = Personality::new(-80, -100, 0);
        let reports = (0..1_000)
            .filter(|_| lowlife.would_report(1, &mut rng))
            .count();
        assert!(reports < 200);
    }

    #[test]
    fn test_would_investigate_and_keep_secret() {
        assert!(Personality::new(30, 0, 0).would_investigate());
        assert!(!Personality::new(10, 0, 0).would_investigate());
        assert!(!Personality::new(30, -40, 0).would_investigate());
        assert!(Personality::new(0, -1, 0).would_keep_secret());
        assert!(!Personality::new(0, 0, 0).would_keep_secret());
    }

    #[test]
    fn test_archetype_rule_order() {
        // Hero matches before Upright even though both apply.
        assert_eq!(Personality::new(60, 60, -10).archetype(), Archetype::Hero);
        assert_eq!(Personality::new(40, 40, 10).archetype(), Archetype::Upright);
        assert_eq!(
            Personality::new(60, -60, 60).archetype(),
            Archetype::Gangster
        );
        assert_eq!(
            Personality::new(-60, 60, -10).archetype(),
            Archetype::Citizen
        );
        assert_eq!(
            Personality::new(-60, -60, 60).archetype(),
            Archetype::Coward
        );
        assert_eq!(Personality::new(0, -10, 60).archetype(), Archetype::Trader);
        assert_eq!(
            Personality::new(-40, -40, 0).archetype(),
            Archetype::Shady
        );
        assert_eq!(Personality::balanced().archetype(), Archetype::Average);
    }

    #[test]
    fn test_describe_labels() {
        assert_eq!(Personality::new(75, 0, 0).describe_courage(), "fearless");
        assert_eq!(Personality::new(0, -75, 0).describe_honesty(), "deceitful");
        assert_eq!(Personality::new(0, 0, 0).describe_greed(), "content");
    }

    #[test]
    fn test_modify_clamps() {
        let mut p = Personality::new(90, 0, 0);
        p.modify(50, -250, 10);
        assert_eq!(p.courage, 100);
        assert_eq!(p.honesty, -100);
        assert_eq!(p.greed, 10);
    }

    #[test]
    fn test_randomized_in_bounds() {
        let mut rng = SmallRng::seed_from_u64(42);
        for _ in 0..200 {
            let p = Personality::randomized(&mut rng);
            assert!((-100..=100).contains(&p.courage));
            assert!((-100..=100).contains(&p.honesty));
            assert!((-100..=100).contains(&p.greed));
        }
    }

    #[test]
    fn test_serde_roundtrip() {
        let p = Personality::new(12, -34, 56);
        let json = serde_json::to_string(&p).unwrap();
        let parsed: Personality = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, p);
    }
}
