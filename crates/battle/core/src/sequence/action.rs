//! Atomic waitable steps.
//!
//! A [`SequenceAction`] is the single unit of work a sequence waits on:
//! created fresh by a branch step, polled once per tick, discarded the
//! tick it reports done. Exactly one (or none) is in flight at any time.

use tracing::warn;

use crate::clock::Millis;
use crate::env::{AnimStatus, BattleContext};
use crate::state::{EntityId, MotionPath};

/// Progress report from pumping an action for one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionProgress {
    Pending,
    Done,
    /// `WaitForCommand` hit its deadline with the command unresolved.
    /// The caller must cancel the command and route a failure.
    TimedOut,
}

/// The atomic, resumable unit of work a sequence waits on.
#[derive(Debug)]
pub enum SequenceAction {
    /// Done once `duration` has elapsed.
    Wait { duration: Millis, elapsed: Millis },

    /// Done once the motion's duration has elapsed; the entity's position
    /// is a pure function of elapsed time along `path`, so pausing and
    /// resuming never drifts.
    Move {
        entity: EntityId,
        path: MotionPath,
        elapsed: Millis,
    },

    /// Done when the named animation reports finished. Driven by the
    /// animation's own duration; never assume a fixed tick count.
    WaitForAnimation { entity: EntityId, key: String },

    /// Done when the armed command resolves or `timeout` elapses.
    /// With `enabled == false` this resolves instantly (auto-success
    /// path for command-less entities).
    WaitForCommand {
        timeout: Option<Millis>,
        elapsed: Millis,
        enabled: bool,
    },
}

impl SequenceAction {
    /// Advances the action by `dt`.
    ///
    /// `command_resolved` tells a `WaitForCommand` whether the armed
    /// command has already reported its terminal outcome this or an
    /// earlier tick.
    pub fn pump(
        &mut self,
        dt: Millis,
        ctx: &mut BattleContext<'_>,
        command_resolved: bool,
    ) -> ActionProgress {
        match self {
            SequenceAction::Wait { duration, elapsed } => {
                *elapsed += dt;
                if *elapsed >= *duration {
                    ActionProgress::Done
                } else {
                    ActionProgress::Pending
                }
            }

            SequenceAction::Move {
                entity,
                path,
                elapsed,
            } => {
                *elapsed += dt;
                // A target or user removed mid-motion is expected; the
                // motion simply times out with nothing to move.
                if let Some(actor) = ctx.state.actor_mut(*entity) {
                    actor.position = path.at(*elapsed);
                }
                if *elapsed >= path.duration {
                    ActionProgress::Done
                } else {
                    ActionProgress::Pending
                }
            }

            SequenceAction::WaitForAnimation { entity, key } => {
                match ctx.anims.status(*entity, key) {
                    AnimStatus::Playing => ActionProgress::Pending,
                    AnimStatus::Finished => ActionProgress::Done,
                    AnimStatus::Missing => {
                        warn!(%entity, key, "animation key missing, skipping wait");
                        ActionProgress::Done
                    }
                }
            }

            SequenceAction::WaitForCommand {
                timeout,
                elapsed,
                enabled,
            } => {
                if !*enabled || command_resolved {
                    return ActionProgress::Done;
                }
                *elapsed += dt;
                match timeout {
                    Some(limit) if *elapsed > *limit => ActionProgress::TimedOut,
                    _ => ActionProgress::Pending,
                }
            }
        }
    }
}
