//! Action commands: real-time skill checks tied to a move.
//!
//! A command accepts raw input over a bounded stretch of time and produces
//! a graded outcome. Multi-part commands report intermediate progress as
//! [`CommandEvent::Response`] payloads without terminating.
//!
//! Shared contract for every mini-game:
//! - input is consumed only while [`ActionCommand::accepting_input`]
//! - exactly one [`CommandEvent::Finished`] is ever emitted
//! - cancellation stops input consumption immediately
//! - timing and threshold checks are closed-interval

mod button_series;
mod hold_bar;
mod mash_bar;
mod rank;
mod timed_press;

pub use button_series::ButtonSeries;
pub use hold_bar::HoldBar;
pub use mash_bar::MashBar;
pub use rank::CommandRank;
pub use timed_press::TimedPress;

use crate::clock::Millis;
use crate::input::InputFrame;

/// Terminal result of an action command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommandOutcome {
    Success(CommandRank),
    Failure,
}

impl CommandOutcome {
    pub fn rank(self) -> CommandRank {
        match self {
            CommandOutcome::Success(rank) => rank,
            CommandOutcome::Failure => CommandRank::Fail,
        }
    }

    pub fn is_success(self) -> bool {
        matches!(self, CommandOutcome::Success(_))
    }
}

/// Intermediate progress report from a multi-part command.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CommandResponse {
    /// Which sub-goal completed (button index, circle index, ...).
    pub index: u32,
    /// Command-specific magnitude (time remaining fraction, fill level).
    pub value: f64,
}

/// Everything a command can report from one update.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CommandEvent {
    Response(CommandResponse),
    Finished(CommandOutcome),
}

/// A real-time input mini-game.
///
/// Implementations are plain state machines: `update` advances internal
/// progress by `dt` and consumes the tick's input frame, pushing whatever
/// events that produced. After the terminal event the command ignores all
/// further input and emits nothing.
pub trait ActionCommand {
    /// Begins accepting input.
    fn start(&mut self);

    /// Whether raw input is currently being consumed.
    fn accepting_input(&self) -> bool;

    /// Advances the mini-game by `dt`, consuming this tick's input.
    fn update(&mut self, dt: Millis, input: &InputFrame, events: &mut Vec<CommandEvent>);

    /// External cancellation (sequence aborted). No terminal event fires.
    fn cancel(&mut self);
}
