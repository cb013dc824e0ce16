//! Ambient Encounter Systems
//!
//! NPC-to-NPC social life: a periodic scan pairs idle NPCs that are close
//! together, the arbiter times the resulting interaction, and a completion
//! pass applies its effects. What a pair does is drawn from weight tables
//! keyed on how they feel about each other, so friends mostly chat and trade
//! while rivals pick arguments.

use bevy_ecs::prelude::*;
use rand::Rng;
use uuid::Uuid;

use crate::components::{
    memory_profile, memory_tags, EmotionState, LifeData, Memory, MemoryEntry, MemoryKind, NeedKind,
    Npc, Personality, Wallet,
};
use crate::social::{
    interaction_constants, interaction_profile, warning_profile, warning_trust, InteractionArbiter,
    InteractionKind, RelationGraph, RumorNetwork, WarningKind,
};
use crate::systems::life_cycle::PositionIndex;
use crate::{SimClock, SimRng};

/// Effect sizes for ambient interactions.
pub mod encounter_constants {
    /// Smallest NPC-to-NPC trade.
    pub const TRADE_MIN_VALUE: i64 = 10;
    /// Largest NPC-to-NPC trade.
    pub const TRADE_MAX_VALUE: i64 = 100;
    /// Anger from a finished argument.
    pub const ARGUMENT_INTENSITY: f32 = 35.0;
    /// Glow from received ambient help.
    pub const HELP_GLOW_INTENSITY: f32 = 25.0;
    /// Seller's glow from an ambient sale.
    pub const TRADE_GLOW_INTENSITY: f32 = 20.0;
    /// Importance of the memory an argument leaves.
    pub const ARGUMENT_MEMORY_IMPORTANCE: u8 = 3;
}

/// Tuning for the ambient pairing scan, built from config at world setup.
#[derive(Resource, Debug, Clone)]
pub struct EncounterSettings {
    /// Ticks between pairing scans.
    pub scan_interval: u64,
    /// Chance an eligible pair starts something on a scan.
    pub ambient_chance: f32,
    /// Mutual relation above which the friendly table applies.
    pub friendly_floor: i32,
    /// Mutual relation below which the hostile table applies.
    pub hostile_ceiling: i32,
    pub friendly_weights: Vec<(InteractionKind, u32)>,
    pub hostile_weights: Vec<(InteractionKind, u32)>,
    pub mixed_weights: Vec<(InteractionKind, u32)>,
}

impl Default for EncounterSettings {
    fn default() -> Self {
        Self {
            scan_interval: 50,
            ambient_chance: 0.1,
            friendly_floor: 30,
            hostile_ceiling: -30,
            friendly_weights: vec![
                (InteractionKind::Greeting, 2),
                (InteractionKind::Conversation, 4),
                (InteractionKind::Trade, 2),
                (InteractionKind::HelpRequest, 2),
            ],
            hostile_weights: vec![
                (InteractionKind::Greeting, 1),
                (InteractionKind::Argument, 5),
            ],
            mixed_weights: vec![
                (InteractionKind::Greeting, 4),
                (InteractionKind::Conversation, 2),
                (InteractionKind::Trade, 1),
                (InteractionKind::Argument, 1),
            ],
        }
    }
}

impl EncounterSettings {
    /// The weight table a pair with this mutual relation draws from.
    pub fn weights_for(&self, mutual: i32) -> &[(InteractionKind, u32)] {
        if mutual > self.friendly_floor {
            &self.friendly_weights
        } else if mutual < self.hostile_ceiling {
            &self.hostile_weights
        } else {
            &self.mixed_weights
        }
    }
}

/// Draws one kind from a weight table; `None` when all weights are zero.
pub fn weighted_pick<R: Rng>(
    rng: &mut R,
    weights: &[(InteractionKind, u32)],
) -> Option<InteractionKind> {
    let total: u32 = weights.iter().map(|(_, w)| w).sum();
    if total == 0 {
        return None;
    }
    let mut roll = rng.gen_range(0..total);
    for (kind, weight) in weights {
        if roll < *weight {
            return Some(*kind);
        }
        roll -= weight;
    }
    None
}

/// Periodic scan that pairs up idle, willing, nearby NPCs.
pub fn run_ambient_encounters(
    clock: Res<SimClock>,
    settings: Res<EncounterSettings>,
    index: Res<PositionIndex>,
    relations: Res<RelationGraph>,
    mut arbiter: ResMut<InteractionArbiter>,
    mut rng: ResMut<SimRng>,
    query: Query<&LifeData, With<Npc>>,
) {
    if clock.0.tick % settings.scan_interval != 0 {
        return;
    }
    let entries = index.entries();
    for i in 0..entries.len() {
        for j in (i + 1)..entries.len() {
            let (a, b) = (&entries[i], &entries[j]);
            let dx = a.x - b.x;
            let dy = a.y - b.y;
            let dist_sq = dx * dx + dy * dy;
            if dist_sq > interaction_constants::INTERACTION_RANGE_SQ {
                continue;
            }
            if !arbiter.can_interact(a.id, b.id, dist_sq) {
                continue;
            }
            if rng.0.gen::<f32>() >= settings.ambient_chance {
                continue;
            }
            let (Ok(life_a), Ok(life_b)) = (query.get(a.entity), query.get(b.entity)) else {
                continue;
            };
            if !life_a.enabled || !life_b.enabled {
                continue;
            }
            if life_a.needs.is_sleeping() || life_b.needs.is_sleeping() {
                continue;
            }
            if !life_a.is_willing_to_talk() || !life_b.is_willing_to_talk() {
                continue;
            }
            let mutual = relations.mutual(a.id, b.id);
            let Some(kind) = weighted_pick(&mut rng.0, settings.weights_for(mutual)) else {
                continue;
            };
            if kind == InteractionKind::Trade
                && !(life_a.is_willing_to_trade() && life_b.is_willing_to_trade())
            {
                continue;
            }
            if arbiter.begin(a.id, b.id, kind) {
                tracing::debug!(
                    a = %a.id,
                    b = %b.id,
                    kind = interaction_profile(kind).name,
                    mutual,
                    "ambient encounter started"
                );
            }
        }
    }
}

/// Advances all running interactions and applies the effects of the ones
/// that finished this tick.
pub fn tick_interactions(
    clock: Res<SimClock>,
    index: Res<PositionIndex>,
    mut arbiter: ResMut<InteractionArbiter>,
    mut relations: ResMut<RelationGraph>,
    mut rumors: ResMut<RumorNetwork>,
    mut rng: ResMut<SimRng>,
    mut query: Query<(&mut LifeData, &mut Wallet), With<Npc>>,
) {
    let now = clock.0.tick;
    for context in arbiter.tick() {
        let delta = interaction_profile(context.kind).relation_delta;
        if delta != 0 {
            relations.adjust_mutual(context.a, context.b, delta);
        }
        let (Some(entity_a), Some(entity_b)) =
            (index.entity_of(context.a), index.entity_of(context.b))
        else {
            continue;
        };
        let Ok([(mut life_a, mut wallet_a), (mut life_b, mut wallet_b)]) =
            query.get_many_mut([entity_a, entity_b])
        else {
            continue;
        };
        match context.kind {
            InteractionKind::Greeting => {}
            InteractionKind::Conversation => {
                let importance = memory_profile(MemoryKind::Conversation).default_importance;
                life_a.memory.remember(MemoryEntry::new(
                    MemoryKind::Conversation,
                    context.b,
                    "small talk",
                    importance,
                    now,
                ));
                life_b.memory.remember(MemoryEntry::new(
                    MemoryKind::Conversation,
                    context.a,
                    "small talk",
                    importance,
                    now,
                ));
                let exchanged = rumors.exchange_rumors(context.a, context.b, &mut rng.0);
                if exchanged > 0 {
                    tracing::debug!(a = %context.a, b = %context.b, exchanged, "rumors traded");
                }
                if let Some((subject, kind)) = pick_warning_subject(&life_a.memory, context.b) {
                    deliver_warning(
                        &life_a.personality,
                        &mut life_b,
                        subject,
                        kind,
                        now,
                        &mut rng.0,
                    );
                }
            }
            InteractionKind::Trade => {
                let asking = rng.0.gen_range(
                    encounter_constants::TRADE_MIN_VALUE..=encounter_constants::TRADE_MAX_VALUE,
                );
                let paid = wallet_a.debit(asking);
                if paid > 0 {
                    wallet_b.credit(paid);
                    let details = format!("{paid} coins");
                    let importance = memory_profile(MemoryKind::Traded).default_importance;
                    life_a.memory.remember(MemoryEntry::new(
                        MemoryKind::Traded,
                        context.b,
                        details.clone(),
                        importance,
                        now,
                    ));
                    life_b.memory.remember(MemoryEntry::new(
                        MemoryKind::Traded,
                        context.a,
                        details,
                        importance,
                        now,
                    ));
                    life_b
                        .emotions
                        .trigger(EmotionState::Happy, encounter_constants::TRADE_GLOW_INTENSITY);
                }
            }
            InteractionKind::HelpRequest => {
                life_a.memory.remember(MemoryEntry::new(
                    MemoryKind::HelpReceived,
                    context.b,
                    "came through for me",
                    memory_profile(MemoryKind::HelpReceived).default_importance,
                    now,
                ));
                life_b.memory.remember(MemoryEntry::new(
                    MemoryKind::Helped,
                    context.a,
                    "asked for a hand",
                    memory_profile(MemoryKind::Helped).default_importance,
                    now,
                ));
                life_a
                    .emotions
                    .trigger(EmotionState::Happy, encounter_constants::HELP_GLOW_INTENSITY);
            }
            InteractionKind::Argument => {
                for (life, partner) in [(&mut life_a, context.b), (&mut life_b, context.a)] {
                    life.memory.remember(MemoryEntry::new(
                        MemoryKind::ThreatReceived,
                        partner,
                        "heated argument",
                        encounter_constants::ARGUMENT_MEMORY_IMPORTANCE,
                        now,
                    ));
                    life.emotions
                        .trigger(EmotionState::Angry, encounter_constants::ARGUMENT_INTENSITY);
                }
            }
            // Warnings are delivered inside conversations, not scheduled.
            InteractionKind::Warning => {}
        }
    }
}

/// The most alarming tagged subject worth warning a partner about.
fn pick_warning_subject(memory: &Memory, partner: Uuid) -> Option<(Uuid, WarningKind)> {
    for (tag, kind) in [
        (memory_tags::TAG_DANGEROUS, WarningKind::Dangerous),
        (memory_tags::TAG_CRIMINAL, WarningKind::Criminal),
        (memory_tags::TAG_THIEF, WarningKind::Thief),
    ] {
        if let Some(subject) = memory
            .subjects_with_tag(tag)
            .into_iter()
            .find(|s| *s != partner)
        {
            return Some((subject, kind));
        }
    }
    None
}

/// One NPC warning another about a third party. Whether the listener believes
/// it rides on the warner's honesty; a believed warning stamps the tag,
/// leaves a memory, and shakes the listener up.
pub fn deliver_warning<R: Rng>(
    warner: &Personality,
    listener: &mut LifeData,
    subject: Uuid,
    kind: WarningKind,
    tick: u64,
    rng: &mut R,
) -> bool {
    if rng.gen::<f32>() >= warning_trust(warner.honesty) {
        return false;
    }
    let profile = warning_profile(kind);
    listener.memory.add_tag(subject, profile.tag, tick);
    listener.memory.remember(MemoryEntry::new(
        MemoryKind::RumorHeard,
        subject,
        format!("warned: {}", profile.name),
        interaction_constants::WARNING_MEMORY_IMPORTANCE,
        tick,
    ));
    listener
        .emotions
        .trigger(profile.emotion, profile.emotion_intensity);
    if profile.safety_penalty > 0.0 {
        listener.needs.reduce(NeedKind::Safety, profile.safety_penalty);
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{NpcId, Position};
    use crate::social::{Affiliation, Faction};
    use crate::systems::life_cycle::build_position_index;
    use npc_events::WorldClock;
    use rand::{rngs::SmallRng, SeedableRng};

    fn test_world() -> World {
        let mut world = World::new();
        world.insert_resource(SimClock(WorldClock::start()));
        world.insert_resource(EncounterSettings::default());
        world.insert_resource(PositionIndex::default());
        world.insert_resource(RelationGraph::new());
        world.insert_resource(RumorNetwork::new());
        world.insert_resource(InteractionArbiter::new());
        world.insert_resource(SimRng(SmallRng::seed_from_u64(11)));
        world
    }

    fn spawn_npc(world: &mut World, id: Uuid, x: f32, y: f32, life: LifeData) -> Entity {
        world
            .spawn((
                Npc,
                NpcId(id),
                Position::new(x, y),
                Affiliation(Faction::Citizens),
                life,
                Wallet::new(500),
            ))
            .id()
    }

    #[test]
    fn test_weighted_pick_follows_weights() {
        let mut rng = SmallRng::seed_from_u64(3);
        let weights = vec![
            (InteractionKind::Greeting, 1),
            (InteractionKind::Conversation, 3),
        ];
        let mut conversations = 0;
        for _ in 0..1000 {
            if weighted_pick(&mut rng, &weights) == Some(InteractionKind::Conversation) {
                conversations += 1;
            }
        }
        assert!((650..=850).contains(&conversations), "{conversations}");
    }

    #[test]
    fn test_weighted_pick_degenerate_tables() {
        let mut rng = SmallRng::seed_from_u64(3);
        assert_eq!(weighted_pick(&mut rng, &[]), None);
        assert_eq!(weighted_pick(&mut rng, &[(InteractionKind::Trade, 0)]), None);
    }

    #[test]
    fn test_ambient_scan_pairs_nearby_npcs() {
        let mut world = test_world();
        world.resource_mut::<EncounterSettings>().scan_interval = 1;
        world.resource_mut::<EncounterSettings>().ambient_chance = 1.0;
        world.resource_mut::<EncounterSettings>().mixed_weights =
            vec![(InteractionKind::Greeting, 1)];

        let a = Uuid::from_u128(1);
        let b = Uuid::from_u128(2);
        spawn_npc(&mut world, a, 0.0, 0.0, LifeData::default());
        spawn_npc(&mut world, b, 3.0, 0.0, LifeData::default());

        let mut schedule = Schedule::default();
        schedule.add_systems((build_position_index, run_ambient_encounters).chain());
        schedule.run(&mut world);

        let arbiter = world.resource::<InteractionArbiter>();
        assert_eq!(arbiter.active_count(), 1);
        assert!(arbiter.is_busy(a));
        assert!(arbiter.is_busy(b));
    }

    #[test]
    fn test_ambient_scan_skips_the_unwilling() {
        let mut world = test_world();
        world.resource_mut::<EncounterSettings>().scan_interval = 1;
        world.resource_mut::<EncounterSettings>().ambient_chance = 1.0;

        let mut panicked = LifeData::default();
        panicked.emotions.trigger(EmotionState::Fearful, 80.0);
        spawn_npc(&mut world, Uuid::from_u128(1), 0.0, 0.0, panicked);
        spawn_npc(&mut world, Uuid::from_u128(2), 3.0, 0.0, LifeData::default());

        let mut sleeping = LifeData::default();
        sleeping.needs.set_sleeping(true);
        spawn_npc(&mut world, Uuid::from_u128(3), 100.0, 100.0, sleeping);
        spawn_npc(
            &mut world,
            Uuid::from_u128(4),
            103.0,
            100.0,
            LifeData::default(),
        );

        let mut schedule = Schedule::default();
        schedule.add_systems((build_position_index, run_ambient_encounters).chain());
        schedule.run(&mut world);

        assert_eq!(world.resource::<InteractionArbiter>().active_count(), 0);
    }

    #[test]
    fn test_greeting_completion_warms_relation() {
        let mut world = test_world();
        let a = Uuid::from_u128(1);
        let b = Uuid::from_u128(2);
        spawn_npc(&mut world, a, 0.0, 0.0, LifeData::default());
        spawn_npc(&mut world, b, 3.0, 0.0, LifeData::default());
        world
            .resource_mut::<InteractionArbiter>()
            .begin(a, b, InteractionKind::Greeting);

        let mut schedule = Schedule::default();
        schedule.add_systems((build_position_index, tick_interactions).chain());
        for _ in 0..interaction_profile(InteractionKind::Greeting).duration_ticks {
            schedule.run(&mut world);
        }

        let arbiter = world.resource::<InteractionArbiter>();
        assert_eq!(arbiter.active_count(), 0);
        assert!(arbiter.is_on_cooldown(a, b));
        let relations = world.resource::<RelationGraph>();
        assert_eq!(relations.get(a, b), 1);
        assert_eq!(relations.get(b, a), 1);
    }

    #[test]
    fn test_conversation_passes_on_a_warning() {
        let mut world = test_world();
        let a = Uuid::from_u128(1);
        let b = Uuid::from_u128(2);
        let thug = Uuid::from_u128(9);

        // A scrupulously honest warner is always believed.
        let mut warner = LifeData::new(Personality::new(0, 100, 0));
        warner.memory.add_tag(thug, memory_tags::TAG_DANGEROUS, 0);
        let entity_a = spawn_npc(&mut world, a, 0.0, 0.0, warner);
        let entity_b = spawn_npc(&mut world, b, 3.0, 0.0, LifeData::default());
        world
            .resource_mut::<InteractionArbiter>()
            .begin(a, b, InteractionKind::Conversation);

        let mut schedule = Schedule::default();
        schedule.add_systems((build_position_index, tick_interactions).chain());
        for _ in 0..interaction_profile(InteractionKind::Conversation).duration_ticks {
            schedule.run(&mut world);
        }

        let listener = world.get::<LifeData>(entity_b).unwrap();
        assert!(listener.memory.has_tag(thug, memory_tags::TAG_DANGEROUS));
        assert_eq!(listener.emotions.current(), EmotionState::Fearful);
        assert!((listener.needs.get(NeedKind::Safety) - 40.0).abs() < f32::EPSILON);
        assert!(listener
            .memory
            .memories_about(thug)
            .iter()
            .any(|m| m.kind == MemoryKind::RumorHeard));

        // Both sides remember the chat itself.
        assert!(!listener.memory.memories_about(a).is_empty());
        let warner = world.get::<LifeData>(entity_a).unwrap();
        assert!(!warner.memory.memories_about(b).is_empty());
    }

    #[test]
    fn test_trade_completion_moves_coin() {
        let mut world = test_world();
        let a = Uuid::from_u128(1);
        let b = Uuid::from_u128(2);
        let entity_a = spawn_npc(&mut world, a, 0.0, 0.0, LifeData::default());
        let entity_b = spawn_npc(&mut world, b, 3.0, 0.0, LifeData::default());
        world
            .resource_mut::<InteractionArbiter>()
            .begin(a, b, InteractionKind::Trade);

        let mut schedule = Schedule::default();
        schedule.add_systems((build_position_index, tick_interactions).chain());
        for _ in 0..interaction_profile(InteractionKind::Trade).duration_ticks {
            schedule.run(&mut world);
        }

        let paid = world.get::<Wallet>(entity_b).unwrap().balance - 500;
        assert!(
            (encounter_constants::TRADE_MIN_VALUE..=encounter_constants::TRADE_MAX_VALUE)
                .contains(&paid)
        );
        assert_eq!(world.get::<Wallet>(entity_a).unwrap().balance, 500 - paid);

        let buyer = world.get::<LifeData>(entity_a).unwrap();
        assert_eq!(buyer.memory.memories_of_kind(MemoryKind::Traded).len(), 1);
        let seller = world.get::<LifeData>(entity_b).unwrap();
        assert_eq!(seller.memory.memories_of_kind(MemoryKind::Traded).len(), 1);
        assert_eq!(seller.emotions.current(), EmotionState::Happy);
    }

    #[test]
    fn test_argument_completion_sours_both() {
        let mut world = test_world();
        let a = Uuid::from_u128(1);
        let b = Uuid::from_u128(2);
        let entity_a = spawn_npc(&mut world, a, 0.0, 0.0, LifeData::default());
        let entity_b = spawn_npc(&mut world, b, 3.0, 0.0, LifeData::default());
        world
            .resource_mut::<InteractionArbiter>()
            .begin(a, b, InteractionKind::Argument);

        let mut schedule = Schedule::default();
        schedule.add_systems((build_position_index, tick_interactions).chain());
        for _ in 0..interaction_profile(InteractionKind::Argument).duration_ticks {
            schedule.run(&mut world);
        }

        let relations = world.resource::<RelationGraph>();
        assert_eq!(relations.get(a, b), -5);
        assert_eq!(relations.get(b, a), -5);
        for entity in [entity_a, entity_b] {
            let life = world.get::<LifeData>(entity).unwrap();
            assert_eq!(life.emotions.current(), EmotionState::Angry);
            assert_eq!(
                life.memory.memories_of_kind(MemoryKind::ThreatReceived).len(),
                1
            );
        }
    }

    #[test]
    fn test_warning_from_a_liar_is_ignored() {
        let liar = Personality::new(0, -100, 0);
        let mut listener = LifeData::default();
        let subject = Uuid::from_u128(9);
        let mut rng = SmallRng::seed_from_u64(1);

        let believed = deliver_warning(
            &liar,
            &mut listener,
            subject,
            WarningKind::Thief,
            0,
            &mut rng,
        );
        assert!(!believed);
        assert!(!listener.memory.has_tag(subject, memory_tags::TAG_THIEF));
        assert!(!listener.memory.knows(subject));
    }
}
