//! Population Spawning
//!
//! Spawns the starting NPC population: faction-flavored names, randomized
//! personalities with a faction lean, homes scattered around town, and
//! personal relations seeded from the faction relation table.

use bevy_ecs::prelude::*;
use rand::rngs::SmallRng;
use rand::Rng;
use std::f32::consts::TAU;
use uuid::Uuid;

use crate::components::{
    Armed, Home, LifeData, Npc, NpcId, NpcName, Personality, Position, Wallet,
};
use crate::config::PopulationConfig;
use crate::social::{base_relation, Affiliation, Faction, RelationGraph};

/// Name pools per faction
const CITIZEN_NAMES: &[&str] = &[
    "Mara", "Tomas", "Edda", "Joren", "Liss", "Petra", "Wence", "Hanna", "Bram", "Sela", "Ruta",
    "Cobb", "Ilsa", "Dorn", "Greta", "Pavel",
];

const MERCHANT_NAMES: &[&str] = &[
    "Corvin", "Amara", "Silas", "Odette", "Bertram", "Yusra", "Felix", "Nadia", "Orlan", "Vesna",
    "Dimitri", "Sabine", "Anton", "Lucia", "Marek", "Rosa",
];

const WATCH_NAMES: &[&str] = &[
    "Aldric", "Berta", "Hugh", "Roderick", "Maeve", "Godwin", "Tilda", "Osric", "Brenna", "Falk",
    "Imke", "Stellan", "Wera", "Kort", "Alys", "Brand",
];

const UNDERWORLD_NAMES: &[&str] = &[
    "Shiv", "Weasel", "Magpie", "Vex", "Quill", "Sable", "Ferret", "Moth", "Rook", "Cinder",
    "Nix", "Sly", "Ember", "Crow", "Fitch", "Dace",
];

/// Faction base relations scaled down to starting personal relations.
const RELATION_SEED_DIVISOR: i32 = 5;

fn name_list(faction: Faction) -> &'static [&'static str] {
    match faction {
        Faction::Citizens => CITIZEN_NAMES,
        Faction::Merchants => MERCHANT_NAMES,
        Faction::CityWatch => WATCH_NAMES,
        Faction::Underworld => UNDERWORLD_NAMES,
    }
}

fn generate_name(faction: Faction, index: usize, rng: &mut SmallRng) -> String {
    let names = name_list(faction);
    let base = names[(index + rng.gen_range(0..names.len())) % names.len()];
    let epithet = match faction {
        Faction::Citizens => "of the Quarter",
        Faction::Merchants => "the Trader",
        Faction::CityWatch => "of the Watch",
        Faction::Underworld => "the Quiet",
    };
    format!("{base} {epithet}")
}

/// Random personality with a faction lean on top.
fn faction_personality(faction: Faction, rng: &mut SmallRng) -> Personality {
    let mut personality = Personality::randomized(rng);
    match faction {
        Faction::Citizens => {}
        Faction::Merchants => personality.modify(0, 0, 20),
        Faction::CityWatch => personality.modify(20, 20, -10),
        Faction::Underworld => personality.modify(10, -30, 20),
    }
    personality
}

/// Uniform point inside a disc of the given radius.
fn scatter(radius: f32, rng: &mut SmallRng) -> (f32, f32) {
    let angle = rng.gen_range(0.0..TAU);
    let r = radius * rng.gen::<f32>().sqrt();
    (r * angle.cos(), r * angle.sin())
}

fn starting_coin(faction: Faction, config: &PopulationConfig, rng: &mut SmallRng) -> i64 {
    let base = match faction {
        Faction::Merchants => config.starting_coin * 3,
        _ => config.starting_coin,
    };
    let spread = base / 2;
    base + rng.gen_range(-spread..=spread)
}

fn spawn_group(
    world: &mut World,
    faction: Faction,
    count: usize,
    config: &PopulationConfig,
    rng: &mut SmallRng,
    roster: &mut Vec<(Uuid, Faction)>,
) {
    for index in 0..count {
        let id = Uuid::from_u128(rng.gen());
        let name = generate_name(faction, index, rng);
        let personality = faction_personality(faction, rng);
        let (x, y) = scatter(config.town_radius, rng);
        let coin = starting_coin(faction, config, rng);

        let mut entity = world.spawn((
            Npc,
            NpcId(id),
            NpcName(name),
            Position::new(x, y),
            Home { x, y },
            Wallet::new(coin),
            Affiliation(faction),
            LifeData::new(personality),
        ));
        // The watch is always armed on duty; the underworld goes armed half
        // the time.
        if faction == Faction::CityWatch
            || (faction == Faction::Underworld && rng.gen_bool(0.5))
        {
            entity.insert(Armed);
        }
        roster.push((id, faction));
    }
}

/// Spawns the whole starting population and seeds the relation graph.
/// Returns the roster in spawn order.
pub fn spawn_population(
    world: &mut World,
    config: &PopulationConfig,
    rng: &mut SmallRng,
) -> Vec<(Uuid, Faction)> {
    let mut roster = Vec::new();
    spawn_group(world, Faction::Citizens, config.citizens, config, rng, &mut roster);
    spawn_group(world, Faction::Merchants, config.merchants, config, rng, &mut roster);
    spawn_group(world, Faction::CityWatch, config.watch, config, rng, &mut roster);
    spawn_group(
        world,
        Faction::Underworld,
        config.underworld,
        config,
        rng,
        &mut roster,
    );

    seed_relations(world, &roster);
    tracing::info!(population = roster.len(), "population spawned");
    roster
}

/// Personal relations start from the faction relation table, scaled down.
/// The table is asymmetric, so both directions are written separately.
fn seed_relations(world: &mut World, roster: &[(Uuid, Faction)]) {
    let mut relations = world.resource_mut::<RelationGraph>();
    for (i, (id_a, faction_a)) in roster.iter().enumerate() {
        for (j, (id_b, faction_b)) in roster.iter().enumerate() {
            if i == j {
                continue;
            }
            let seed = base_relation(*faction_a, *faction_b) / RELATION_SEED_DIVISOR;
            if seed != 0 {
                relations.set(*id_a, *id_b, seed);
            }
        }
    }
}
