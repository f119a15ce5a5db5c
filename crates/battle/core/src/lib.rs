//! Deterministic battle-move sequence engine.
//!
//! `battle-core` owns the branching step state machine that drives one
//! move execution (Start, Main, Success/Failed/Miss, End), the action
//! commands layered under it, and the stylish bonus-input protocol.
//! Rendering, sound, damage math, and turn scheduling live behind the
//! collaborator traits in [`env`]; time is threaded explicitly so every
//! run is reproducible under test.
pub mod clock;
pub mod combat;
pub mod command;
pub mod ease;
pub mod env;
pub mod input;
pub mod moves;
pub mod sequence;
pub mod state;

pub use clock::Millis;
pub use combat::{
    DamageProperties, DamageRequest, Element, InteractionResult, MAX_TARGETS, TargetSet,
};
pub use command::{
    ActionCommand, ButtonSeries, CommandEvent, CommandOutcome, CommandRank, CommandResponse,
    HoldBar, MashBar, TimedPress,
};
pub use ease::{Ease, interpolate};
pub use env::{
    AnimStatus, AnimationDriver, BattleContext, DamageResolver, MoveOracle, TurnScheduler,
    VfxKind, VfxRequest, VfxSink,
};
pub use input::{Buttons, InputFrame};
pub use moves::{
    BounceRule, FamilySpec, HammerScript, HammerSpec, JumpScript, JumpSpec, MoveKind, MoveSpec,
    StylishSpec, TargetMode, TornadoJumpScript, TornadoSpec,
};
pub use sequence::{
    MoveScript, Sequence, SequenceAction, SequenceBranch, SequenceCore, SequenceError,
    StylishData, StylishHandle,
};
pub use state::{ActorState, BattleState, EntityFlags, EntityId, HitPoints, MotionPath, Vec2};

#[cfg(test)]
pub(crate) mod testutil;
