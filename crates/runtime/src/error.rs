//! Driver-level errors.
//!
//! These cover misuse of the driver API and content loading problems.
//! In-battle outcomes (failed commands, misses, interruptions) are never
//! errors; they are branch outcomes inside the sequence engine.

use battle_core::{EntityId, MoveKind};

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// Move data failed to load or parse.
    #[error("content error: {0}")]
    Content(String),

    /// The requested move has no record in the registry.
    #[error("unknown move: {0}")]
    UnknownMove(MoveKind),

    /// A sequence is already running; one action resolves at a time.
    #[error("an action is already in progress")]
    ActionInProgress,

    /// The acting entity is not in the battle.
    #[error("actor not found: {0}")]
    MissingActor(EntityId),

    /// Target resolution produced nothing to act on.
    #[error("no valid targets for {0}")]
    NoValidTargets(MoveKind),
}

pub type Result<T> = std::result::Result<T, RuntimeError>;
