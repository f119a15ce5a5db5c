//! Battle runtime: the synchronous driver plus concrete collaborator
//! implementations around the `battle-core` sequence engine.
//!
//! The driver owns state and content, resolves targeting, and pumps the
//! active move sequence once per tick. Everything is single-threaded
//! cooperative polling; there are no background tasks and no hidden
//! clocks.
pub mod collab;
pub mod driver;
pub mod error;

pub use collab::{RecordingVfx, ScriptedAnimations, StandardResolver, TurnLedger};
pub use driver::{BattleDriver, BattleDriverBuilder};
pub use error::{Result, RuntimeError};
