//! ECS Systems
//!
//! All simulation systems: per-tick life upkeep, external event intake, and
//! ambient NPC-to-NPC encounters.

pub mod encounter;
pub mod life_cycle;
pub mod social_events;

// Re-export commonly used systems and their resources
pub use life_cycle::{
    build_position_index, roll_world_day, tick_life, update_safety, update_sleep_state, CrimeLog,
    CrimeRecord, DayTracker, IndexedNpc, PositionIndex,
};
pub use social_events::{event_constants, process_social_events, SocialEventQueue};
pub use encounter::{
    deliver_warning, encounter_constants, run_ambient_encounters, tick_interactions, weighted_pick,
    EncounterSettings,
};
