//! NPC Social & Psychological Simulation Engine
//!
//! Models each NPC's internal state (needs, emotions, personality, tiered
//! memory), faction reputation with propagation, a rumor network with
//! credibility decay, and proximity-based interaction arbitration. NPC
//! reactions (prices, willingness to talk or trade, flee/fight decisions)
//! emerge from this numeric state rather than scripted branches.
//!
//! Per-NPC state lives in components; world-scoped registries are resources
//! owned by the `bevy_ecs::World`, constructed eagerly when the world is
//! built. One `World` is one game world; hosts running several worlds build
//! several, each ticked by its own single-threaded loop.

use bevy_ecs::prelude::*;
use npc_events::WorldClock;
use rand::rngs::SmallRng;

pub mod components;
pub mod config;
pub mod output;
pub mod setup;
pub mod social;
pub mod systems;

pub use components::*;
pub use social::*;

/// Seeded random number generator resource.
///
/// Every stochastic decision in the engine draws from this so a run is
/// reproducible from its seed.
#[derive(Resource)]
pub struct SimRng(pub SmallRng);

/// World clock resource. The driver advances it once per loop iteration,
/// before any system runs, so every system in a pass sees the same tick.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct SimClock(pub WorldClock);
