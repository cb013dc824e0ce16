//! NPC Components
//!
//! Component types attached to NPC entities: the psychological core
//! (needs, emotions, memory, personality, aggregated by `LifeData`) and
//! the small identity/world-state components around it.

pub mod emotions;
pub mod life;
pub mod memory;
pub mod needs;
pub mod personality;

pub use emotions::*;
pub use life::*;
pub use memory::*;
pub use needs::*;
pub use personality::*;
