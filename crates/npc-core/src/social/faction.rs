//! Factions
//!
//! The four fixed factions, their pairwise base relation table, and the
//! per-actor standing record. Base relations are authored values and are
//! deliberately not symmetric between perspectives; the watch despises the
//! underworld more than the underworld minds the watch.

use bevy_ecs::prelude::*;
use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// Reputation swings used by faction membership changes.
pub mod faction_constants {
    /// Base relation above which two factions count as allies.
    pub const ALLY_THRESHOLD: i32 = 50;
    /// Base relation below which two factions count as enemies.
    pub const ENEMY_THRESHOLD: i32 = -50;
    /// Reputation granted on joining a faction.
    pub const JOIN_BONUS: i32 = 20;
    /// Reputation lost on leaving a faction.
    pub const LEAVE_PENALTY: i32 = 30;
    /// Reputation changes at or above this magnitude make an actor known.
    pub const KNOWN_THRESHOLD: i32 = 10;
}

/// The four factions of the town.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Faction {
    CityWatch,
    Merchants,
    #[default]
    Citizens,
    Underworld,
}

pub const ALL_FACTIONS: [Faction; 4] = [
    Faction::CityWatch,
    Faction::Merchants,
    Faction::Citizens,
    Faction::Underworld,
];

/// Per-faction coefficients, indexed by `Faction as usize`.
pub struct FactionProfile {
    pub name: &'static str,
    pub display: &'static str,
    pub lawful: bool,
    /// Reputation every unknown actor starts with.
    pub base_reputation: i32,
    /// Reputation change per point of crime severity committed by an actor.
    pub crime_response: i32,
    /// Title granted to fresh members.
    pub member_title: &'static str,
}

pub const FACTION_TABLE: [FactionProfile; 4] = [
    FactionProfile {
        name: "city_watch",
        display: "City Watch",
        lawful: true,
        base_reputation: 0,
        crime_response: -5,
        member_title: "Recruit",
    },
    FactionProfile {
        name: "merchants",
        display: "Merchant Guild",
        lawful: true,
        base_reputation: 10,
        crime_response: -2,
        member_title: "Associate",
    },
    FactionProfile {
        name: "citizens",
        display: "Citizens",
        lawful: true,
        base_reputation: 0,
        crime_response: -3,
        member_title: "Resident",
    },
    FactionProfile {
        name: "underworld",
        display: "Underworld",
        lawful: false,
        base_reputation: -20,
        crime_response: 1,
        member_title: "Runner",
    },
];

/// Authored pairwise base relations, row = perspective, column = other.
/// Self-relation is 100 by definition.
const BASE_RELATION_TABLE: [[i32; 4]; 4] = [
    // city_watch's view of: watch, merchants, citizens, underworld
    [100, 40, 60, -80],
    // merchants
    [40, 100, 55, -30],
    // citizens
    [60, 45, 100, -50],
    // underworld
    [-60, -20, -40, 100],
];

pub fn faction_profile(faction: Faction) -> &'static FactionProfile {
    &FACTION_TABLE[faction as usize]
}

/// `from`'s base relation toward `to`. Not symmetric.
pub fn base_relation(from: Faction, to: Faction) -> i32 {
    BASE_RELATION_TABLE[from as usize][to as usize]
}

impl Faction {
    pub fn name(self) -> &'static str {
        faction_profile(self).name
    }

    pub fn display(self) -> &'static str {
        faction_profile(self).display
    }

    pub fn is_lawful(self) -> bool {
        faction_profile(self).lawful
    }

    /// Unknown names fall back to the citizenry.
    pub fn from_name(name: &str) -> Self {
        ALL_FACTIONS
            .into_iter()
            .find(|f| f.name() == name)
            .unwrap_or_default()
    }

    pub fn is_ally_of(self, other: Faction) -> bool {
        self != other && base_relation(self, other) > faction_constants::ALLY_THRESHOLD
    }

    pub fn is_hostile_to(self, other: Faction) -> bool {
        self != other && base_relation(self, other) < faction_constants::ENEMY_THRESHOLD
    }
}

impl Serialize for Faction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Faction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Faction::from_name(&name))
    }
}

/// Which faction an NPC belongs to.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Affiliation(pub Faction);

/// Discrete standing tiers derived from reputation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FactionStanding {
    Hostile,
    Unfriendly,
    Neutral,
    Friendly,
    Honored,
    Revered,
}

/// Per-tier permissions and pricing, indexed by `FactionStanding as usize`.
pub struct StandingProfile {
    pub name: &'static str,
    pub can_trade: bool,
    pub gives_quests: bool,
    pub will_help: bool,
    pub price_modifier: f32,
}

pub const STANDING_TABLE: [StandingProfile; 6] = [
    StandingProfile {
        name: "hostile",
        can_trade: false,
        gives_quests: false,
        will_help: false,
        price_modifier: 1.5,
    },
    StandingProfile {
        name: "unfriendly",
        can_trade: true,
        gives_quests: false,
        will_help: false,
        price_modifier: 1.2,
    },
    StandingProfile {
        name: "neutral",
        can_trade: true,
        gives_quests: true,
        will_help: false,
        price_modifier: 1.0,
    },
    StandingProfile {
        name: "friendly",
        can_trade: true,
        gives_quests: true,
        will_help: true,
        price_modifier: 0.95,
    },
    StandingProfile {
        name: "honored",
        can_trade: true,
        gives_quests: true,
        will_help: true,
        price_modifier: 0.9,
    },
    StandingProfile {
        name: "revered",
        can_trade: true,
        gives_quests: true,
        will_help: true,
        price_modifier: 0.85,
    },
];

pub fn standing_profile(standing: FactionStanding) -> &'static StandingProfile {
    &STANDING_TABLE[standing as usize]
}

/// Maps a reputation score onto its standing tier.
pub fn standing_for(reputation: i32) -> FactionStanding {
    if reputation <= -50 {
        FactionStanding::Hostile
    } else if reputation <= -20 {
        FactionStanding::Unfriendly
    } else if reputation <= 20 {
        FactionStanding::Neutral
    } else if reputation <= 50 {
        FactionStanding::Friendly
    } else if reputation <= 80 {
        FactionStanding::Honored
    } else {
        FactionStanding::Revered
    }
}

impl FactionStanding {
    pub fn name(self) -> &'static str {
        standing_profile(self).name
    }
}

/// One actor's record with one faction. Standing is always derived from the
/// current reputation, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactionRelation {
    pub reputation: i32,
    pub is_member: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_title: Option<String>,
    /// Whether the faction has taken note of this actor at all.
    pub is_known: bool,
}

impl FactionRelation {
    pub fn new(reputation: i32) -> Self {
        Self {
            reputation: reputation.clamp(-100, 100),
            is_member: false,
            member_title: None,
            is_known: false,
        }
    }

    pub fn standing(&self) -> FactionStanding {
        standing_for(self.reputation)
    }

    /// Members are helped regardless of standing.
    pub fn would_help(&self) -> bool {
        standing_profile(self.standing()).will_help || self.is_member
    }

    pub fn would_attack(&self) -> bool {
        self.standing() == FactionStanding::Hostile
    }

    /// Applies a bounded reputation delta and flags the actor as known when
    /// the change is big enough to be noticed.
    pub fn modify(&mut self, amount: i32) {
        self.reputation = (self.reputation + amount).clamp(-100, 100);
        if amount.abs() >= faction_constants::KNOWN_THRESHOLD {
            self.is_known = true;
        }
    }

    /// Points still needed to enter the next tier; zero at the top tier,
    /// which caps to itself.
    pub fn reputation_to_next_standing(&self) -> i32 {
        let next_floor = match self.standing() {
            FactionStanding::Hostile => -49,
            FactionStanding::Unfriendly => -19,
            FactionStanding::Neutral => 21,
            FactionStanding::Friendly => 51,
            FactionStanding::Honored => 81,
            FactionStanding::Revered => return 0,
        };
        next_floor - self.reputation
    }

    pub fn sanitize(&mut self) {
        self.reputation = self.reputation.clamp(-100, 100);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_self_relation_is_full() {
        for faction in ALL_FACTIONS {
            assert_eq!(base_relation(faction, faction), 100);
        }
    }

    #[test]
    fn test_base_relations_are_asymmetric() {
        assert_eq!(base_relation(Faction::CityWatch, Faction::Underworld), -80);
        assert_eq!(base_relation(Faction::Underworld, Faction::CityWatch), -60);
        assert_eq!(base_relation(Faction::Merchants, Faction::Citizens), 55);
        assert_eq!(base_relation(Faction::Citizens, Faction::Merchants), 45);
    }

    #[test]
    fn test_ally_and_enemy_predicates() {
        assert!(Faction::Citizens.is_ally_of(Faction::CityWatch));
        assert!(Faction::CityWatch.is_hostile_to(Faction::Underworld));
        // -50 exactly is cold, but not enemy territory
        assert!(!Faction::Citizens.is_hostile_to(Faction::Underworld));
        assert!(!Faction::Citizens.is_ally_of(Faction::Citizens));
    }

    #[test]
    fn test_standing_thresholds() {
        assert_eq!(standing_for(-100), FactionStanding::Hostile);
        assert_eq!(standing_for(-50), FactionStanding::Hostile);
        assert_eq!(standing_for(-49), FactionStanding::Unfriendly);
        assert_eq!(standing_for(-20), FactionStanding::Unfriendly);
        assert_eq!(standing_for(0), FactionStanding::Neutral);
        assert_eq!(standing_for(21), FactionStanding::Friendly);
        assert_eq!(standing_for(50), FactionStanding::Friendly);
        assert_eq!(standing_for(80), FactionStanding::Honored);
        assert_eq!(standing_for(81), FactionStanding::Revered);
    }

    #[test]
    fn test_standing_perks() {
        assert!(!standing_profile(FactionStanding::Hostile).can_trade);
        assert!(standing_profile(FactionStanding::Unfriendly).can_trade);
        assert!(!standing_profile(FactionStanding::Unfriendly).gives_quests);
        assert!(standing_profile(FactionStanding::Friendly).will_help);
        assert!((standing_profile(FactionStanding::Revered).price_modifier - 0.85).abs() < 1e-6);
    }

    #[test]
    fn test_relation_modify_clamps_and_marks_known() {
        let mut relation = FactionRelation::new(0);
        assert!(!relation.is_known);
        relation.modify(5);
        assert!(!relation.is_known);
        relation.modify(200);
        assert_eq!(relation.reputation, 100);
        assert!(relation.is_known);
        assert_eq!(relation.standing(), FactionStanding::Revered);
    }

    #[test]
    fn test_reputation_to_next_standing() {
        let mut relation = FactionRelation::new(60);
        assert_eq!(relation.standing(), FactionStanding::Honored);
        assert_eq!(relation.reputation_to_next_standing(), 21);
        relation.modify(40);
        // The top tier has nowhere further to go.
        assert_eq!(relation.reputation_to_next_standing(), 0);
    }

    #[test]
    fn test_unknown_faction_name_falls_back() {
        assert_eq!(Faction::from_name("pirates"), Faction::Citizens);
        assert_eq!(Faction::from_name("underworld"), Faction::Underworld);
        let parsed: Faction = serde_json::from_str("\"nomads\"").unwrap();
        assert_eq!(parsed, Faction::Citizens);
    }

    #[test]
    fn test_crime_response_signs() {
        assert!(faction_profile(Faction::CityWatch).crime_response < 0);
        assert!(faction_profile(Faction::Underworld).crime_response > 0);
    }
}
