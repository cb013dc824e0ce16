//! Social Registries
//!
//! World-scoped shared state: faction reputation, NPC-to-NPC relations,
//! the rumor network, and interaction arbitration. Each is a resource
//! owned by the world it belongs to, built eagerly at world setup.

pub mod faction;
pub mod interaction;
pub mod relations;
pub mod reputation;
pub mod rumor;

pub use faction::*;
pub use interaction::*;
pub use relations::*;
pub use reputation::*;
pub use rumor::*;
