//! Reputation Ledger
//!
//! World-scoped registry of actor-to-faction reputation. A reputation change
//! toward one faction echoes to the others through the authored base relation
//! table: allies pick up half of positive changes, enemies read positive
//! changes as a mark against you and negative ones as a point in your favor.
//! Echoes are computed from the state before the call and never cascade.

use std::collections::BTreeMap;

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::faction::{
    base_relation, faction_constants, faction_profile, standing_for, standing_profile,
    Faction, FactionRelation, FactionStanding, ALL_FACTIONS,
};

/// Tuning for the event-driven reputation hooks.
pub mod reputation_constants {
    /// Cap on reputation gained from one fair transaction.
    pub const FAIR_TRADE_CAP: i32 = 5;
    /// Coins of trade value per point of transaction reputation.
    pub const TRADE_VALUE_DIVISOR: i64 = 100;
    /// Flat loss for an unfair transaction.
    pub const UNFAIR_TRADE_PENALTY: i32 = 3;
    /// Divisor for how much of a good deed other factions credit.
    pub const GOOD_DEED_SPREAD_DIVISOR: i32 = 4;
}

/// Resource: every actor's record with every faction.
#[derive(Resource, Debug, Default, Clone, Serialize, Deserialize)]
pub struct ReputationLedger {
    relations: BTreeMap<Uuid, BTreeMap<Faction, FactionRelation>>,
}

impl ReputationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds all four faction records for an actor from the base table.
    fn ensure_actor(&mut self, actor: Uuid) {
        self.relations.entry(actor).or_insert_with(|| {
            ALL_FACTIONS
                .into_iter()
                .map(|f| (f, FactionRelation::new(faction_profile(f).base_reputation)))
                .collect()
        });
    }

    fn apply(&mut self, actor: Uuid, faction: Faction, amount: i32) {
        self.ensure_actor(actor);
        if let Some(relation) = self
            .relations
            .get_mut(&actor)
            .and_then(|m| m.get_mut(&faction))
        {
            relation.modify(amount);
        }
    }

    /// Applies a reputation change and its echoes. Ally factions (base
    /// relation above 50) receive half of positive changes only; enemy
    /// factions (below -50) receive `-amount/3` for positive changes and
    /// `-amount/4` for negative ones. All echo deltas are derived from the
    /// static base table, so one call never cascades into further echoes.
    pub fn modify_reputation(&mut self, actor: Uuid, faction: Faction, amount: i32) {
        let mut deltas = vec![(faction, amount)];
        for other in ALL_FACTIONS {
            if other == faction {
                continue;
            }
            let base = base_relation(other, faction);
            if base > faction_constants::ALLY_THRESHOLD && amount > 0 {
                deltas.push((other, amount / 2));
            } else if base < faction_constants::ENEMY_THRESHOLD {
                if amount > 0 {
                    deltas.push((other, -amount / 3));
                } else if amount < 0 {
                    deltas.push((other, -amount / 4));
                }
            }
        }
        for (target, delta) in deltas {
            if delta != 0 {
                self.apply(actor, target, delta);
            }
        }
    }

    /// Current reputation; unknown actors read from the base table.
    pub fn reputation(&self, actor: Uuid, faction: Faction) -> i32 {
        self.relations
            .get(&actor)
            .and_then(|m| m.get(&faction))
            .map(|r| r.reputation)
            .unwrap_or_else(|| faction_profile(faction).base_reputation)
    }

    pub fn standing(&self, actor: Uuid, faction: Faction) -> FactionStanding {
        standing_for(self.reputation(actor, faction))
    }

    pub fn relation(&self, actor: Uuid, faction: Faction) -> Option<&FactionRelation> {
        self.relations.get(&actor).and_then(|m| m.get(&faction))
    }

    pub fn relations_for(
        &self,
        actor: Uuid,
    ) -> impl Iterator<Item = (Faction, &FactionRelation)> {
        self.relations
            .get(&actor)
            .into_iter()
            .flat_map(|m| m.iter().map(|(f, r)| (*f, r)))
    }

    /// The faction an actor currently belongs to, if any.
    pub fn membership(&self, actor: Uuid) -> Option<Faction> {
        self.relations.get(&actor).and_then(|m| {
            m.iter()
                .find(|(_, r)| r.is_member)
                .map(|(f, _)| *f)
        })
    }

    /// Joining needs Friendly standing and no membership in a faction that
    /// is hostile to the target. Success grants a reputation bonus.
    pub fn join_faction(&mut self, actor: Uuid, faction: Faction) -> bool {
        self.ensure_actor(actor);
        if self.standing(actor, faction) < FactionStanding::Friendly {
            return false;
        }
        let blocked = self
            .relations
            .get(&actor)
            .map(|m| {
                m.iter()
                    .any(|(f, r)| *f != faction && r.is_member && faction.is_hostile_to(*f))
            })
            .unwrap_or(false);
        if blocked {
            return false;
        }
        if let Some(relation) = self
            .relations
            .get_mut(&actor)
            .and_then(|m| m.get_mut(&faction))
        {
            if relation.is_member {
                return false;
            }
            relation.is_member = true;
            relation.member_title = Some(faction_profile(faction).member_title.to_string());
        }
        // The joining bonus stays within the faction joined; no echoes.
        self.apply(actor, faction, faction_constants::JOIN_BONUS);
        tracing::info!(actor = %actor, faction = faction.name(), "joined faction");
        true
    }

    pub fn leave_faction(&mut self, actor: Uuid, faction: Faction) -> bool {
        let was_member = self
            .relations
            .get_mut(&actor)
            .and_then(|m| m.get_mut(&faction))
            .map(|relation| {
                let was = relation.is_member;
                relation.is_member = false;
                relation.member_title = None;
                was
            })
            .unwrap_or(false);
        if was_member {
            self.apply(actor, faction, -faction_constants::LEAVE_PENALTY);
            tracing::info!(actor = %actor, faction = faction.name(), "left faction");
        }
        was_member
    }

    /// A witnessed crime lands on every faction at once, scaled by severity
    /// through each faction's crime response, with each hit echoing like any
    /// other reputation change. A crime aimed at the underworld forfeits
    /// their approval; the lawful factions react the same either way.
    pub fn on_crime_committed(&mut self, actor: Uuid, severity: i32, against_underworld: bool) {
        let severity = severity.clamp(1, 10);
        for faction in ALL_FACTIONS {
            if faction == Faction::Underworld && against_underworld {
                continue;
            }
            let delta = faction_profile(faction).crime_response * severity;
            if delta != 0 {
                self.modify_reputation(actor, faction, delta);
            }
        }
    }

    /// A public good deed credits the target faction in full and every other
    /// faction a quarter share; the underworld neither receives a share nor
    /// spreads one when it is the beneficiary.
    pub fn on_good_deed(&mut self, actor: Uuid, faction: Faction, amount: i32) {
        let amount = amount.max(0);
        if amount == 0 {
            return;
        }
        self.modify_reputation(actor, faction, amount);
        if faction == Faction::Underworld {
            return;
        }
        let share = amount / reputation_constants::GOOD_DEED_SPREAD_DIVISOR;
        if share == 0 {
            return;
        }
        for other in ALL_FACTIONS {
            if other != faction && other != Faction::Underworld {
                self.modify_reputation(actor, other, share);
            }
        }
    }

    /// Routine trades move reputation with the merchant's faction only.
    pub fn on_transaction(&mut self, actor: Uuid, faction: Faction, value: i64, fair: bool) {
        use reputation_constants::*;
        if fair {
            let delta = ((value / TRADE_VALUE_DIVISOR) as i32).min(FAIR_TRADE_CAP);
            if delta > 0 {
                self.modify_reputation(actor, faction, delta);
            }
        } else {
            self.modify_reputation(actor, faction, -UNFAIR_TRADE_PENALTY);
        }
    }

    /// Standing perk or membership; a faction never refuses its own members.
    pub fn would_help(&self, actor: Uuid, faction: Faction) -> bool {
        self.relation(actor, faction)
            .map(FactionRelation::would_help)
            .unwrap_or_else(|| standing_profile(self.standing(actor, faction)).will_help)
    }

    pub fn would_attack(&self, actor: Uuid, faction: Faction) -> bool {
        self.standing(actor, faction) == FactionStanding::Hostile
    }

    pub fn can_trade_with(&self, actor: Uuid, faction: Faction) -> bool {
        standing_profile(self.standing(actor, faction)).can_trade
    }

    pub fn price_modifier(&self, actor: Uuid, faction: Faction) -> f32 {
        standing_profile(self.standing(actor, faction)).price_modifier
    }

    pub fn best_faction(&self, actor: Uuid) -> Option<(Faction, i32)> {
        self.relations.get(&actor).and_then(|m| {
            m.iter()
                .map(|(f, r)| (*f, r.reputation))
                .max_by_key(|(f, rep)| (*rep, std::cmp::Reverse(*f)))
        })
    }

    pub fn worst_faction(&self, actor: Uuid) -> Option<(Faction, i32)> {
        self.relations.get(&actor).and_then(|m| {
            m.iter()
                .map(|(f, r)| (*f, r.reputation))
                .min_by_key(|(f, rep)| (*rep, *f))
        })
    }

    /// Drops an actor's records entirely, e.g. when they leave the world.
    pub fn forget_actor(&mut self, actor: Uuid) {
        self.relations.remove(&actor);
    }

    pub fn actor_count(&self) -> usize {
        self.relations.len()
    }

    /// Clamps anything a lenient load let through and restores faction
    /// records a truncated save dropped, so every known actor always carries
    /// all four.
    pub fn sanitize(&mut self) {
        let mut fixed = 0usize;
        let mut filled = 0usize;
        for factions in self.relations.values_mut() {
            for faction in ALL_FACTIONS {
                factions.entry(faction).or_insert_with(|| {
                    filled += 1;
                    FactionRelation::new(faction_profile(faction).base_reputation)
                });
            }
            for relation in factions.values_mut() {
                if !(-100..=100).contains(&relation.reputation) {
                    relation.sanitize();
                    fixed += 1;
                }
            }
        }
        if fixed > 0 {
            tracing::warn!(fixed, "clamped out-of-range faction reputations on load");
        }
        if filled > 0 {
            tracing::warn!(filled, "restored missing faction records on load");
        }
    }
}
