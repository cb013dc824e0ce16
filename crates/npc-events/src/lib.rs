//! Shared clock, event, and snapshot types for the NPC simulation.
//!
//! This crate contains pure data structures with no simulation logic.
//! It is a dependency for every other crate in the workspace.

pub mod clock;
pub mod event;
pub mod snapshot;

// Re-export clock types
pub use clock::{WorldClock, NIGHT_END_TICK, NIGHT_START_TICK, TICKS_PER_DAY, TICKS_PER_HOUR};

// Re-export event types
pub use event::{SocialEvent, SocialEventKind};

// Re-export snapshot types
pub use snapshot::{FactionMoodSnapshot, NpcSnapshot, WorldSnapshot};
