//! Concrete collaborator implementations behind the engine's trait seams.
mod anims;
mod damage;
mod ledger;
mod vfx;

pub use anims::ScriptedAnimations;
pub use damage::StandardResolver;
pub use ledger::TurnLedger;
pub use vfx::RecordingVfx;
