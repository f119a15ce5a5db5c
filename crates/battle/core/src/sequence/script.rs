//! Per-move behavior plugged into the sequence state machine.

use crate::combat::Element;
use crate::command::CommandResponse;
use crate::env::BattleContext;
use crate::moves::MoveKind;

use super::{SequenceBranch, SequenceCore};

/// Authoring errors surfaced by branch step tables.
///
/// These indicate a bug in move authoring, not a gameplay failure: the
/// sequence logs them and halts in a safe, inspectable state instead of
/// looping or crashing the battle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SequenceError {
    #[error("no authored step {step} in branch {branch}")]
    UnhandledStep { branch: SequenceBranch, step: u32 },

    #[error("no authored step {step} in stylish interlude {index}")]
    UnhandledStylishStep { index: u32, step: u32 },
}

/// The per-move strategy driving a [`super::Sequence`].
///
/// One state-machine type, many move behaviors: a script authors the
/// branch step tables and overrides the reaction hooks it cares about.
/// Every hook has a sensible default so simple moves only write
/// `branch_step`.
///
/// Hooks receive the core and the tick context; they may set the next
/// action, queue a branch change, deal damage, or end the sequence.
pub trait MoveScript {
    /// Which move this script is running, for logs and lookups.
    fn kind(&self) -> MoveKind;

    /// Runs one authored step of `branch`. Called only when no action is
    /// in flight. Returning an error halts the sequence.
    fn branch_step(
        &mut self,
        branch: SequenceBranch,
        step: u32,
        seq: &mut SequenceCore,
        ctx: &mut BattleContext<'_>,
    ) -> Result<(), SequenceError>;

    /// Runs one step of the stylish interlude `index`. Only moves that
    /// offer stylish windows author this.
    fn stylish_step(
        &mut self,
        index: u32,
        step: u32,
        _seq: &mut SequenceCore,
        _ctx: &mut BattleContext<'_>,
    ) -> Result<(), SequenceError> {
        Err(SequenceError::UnhandledStylishStep { index, step })
    }

    /// Sequence construction finished and Start is about to run.
    fn on_start(&mut self, _seq: &mut SequenceCore, _ctx: &mut BattleContext<'_>) {}

    /// The action command resolved successfully.
    fn on_command_success(&mut self, seq: &mut SequenceCore, _ctx: &mut BattleContext<'_>) {
        seq.change_branch(SequenceBranch::Success);
    }

    /// The action command failed or timed out.
    fn on_command_failed(&mut self, seq: &mut SequenceCore, _ctx: &mut BattleContext<'_>) {
        seq.change_branch(SequenceBranch::Failed);
    }

    /// A multi-part command reported intermediate progress.
    fn on_command_response(
        &mut self,
        _response: CommandResponse,
        _seq: &mut SequenceCore,
        _ctx: &mut BattleContext<'_>,
    ) {
    }

    /// The target cannot be hit at all. Distinct from a failed command:
    /// Miss deals nothing.
    fn on_miss(&mut self, seq: &mut SequenceCore, _ctx: &mut BattleContext<'_>) {
        seq.jump_branch(SequenceBranch::Miss);
    }

    /// An external event aborted the move mid-flight.
    fn on_interruption(
        &mut self,
        element: Element,
        seq: &mut SequenceCore,
        _ctx: &mut BattleContext<'_>,
    ) {
        seq.record_interruption(element);
        seq.jump_branch(SequenceBranch::End);
    }

    /// A stylish window was hit; divert into its interlude.
    fn handle_stylish(&mut self, index: u32, seq: &mut SequenceCore, _ctx: &mut BattleContext<'_>) {
        seq.begin_stylish(index);
    }

    /// The sequence is ending (normally or by cancellation).
    fn on_end(&mut self, _seq: &mut SequenceCore, _ctx: &mut BattleContext<'_>) {}
}
