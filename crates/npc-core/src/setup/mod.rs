//! World Setup
//!
//! World construction and population spawning. Every registry resource is
//! created eagerly when the world is built, so systems never have to create
//! anything lazily.

pub mod population;

pub use population::*;

use bevy_ecs::prelude::*;
use npc_events::WorldClock;
use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::config::Config;
use crate::social::{InteractionArbiter, RelationGraph, ReputationLedger, RumorNetwork};
use crate::systems::{CrimeLog, DayTracker, PositionIndex, SocialEventQueue};
use crate::{SimClock, SimRng};

/// Builds a ready-to-tick world from configuration.
pub fn build_world(config: &Config) -> World {
    let mut world = World::new();
    let mut rng = SmallRng::seed_from_u64(config.simulation.seed);

    world.insert_resource(SimClock(WorldClock::start()));
    world.insert_resource(ReputationLedger::new());
    world.insert_resource(RelationGraph::new());
    world.insert_resource(RumorNetwork::new());
    world.insert_resource(InteractionArbiter::new());
    world.insert_resource(SocialEventQueue::default());
    world.insert_resource(PositionIndex::default());
    world.insert_resource(CrimeLog::default());
    world.insert_resource(DayTracker::default());
    world.insert_resource(config.encounter.to_settings());

    spawn_population(&mut world, &config.population, &mut rng);
    world.insert_resource(SimRng(rng));

    world
}
