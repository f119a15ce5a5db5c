//! Press-the-button-at-the-right-instant command.

use crate::clock::Millis;
use crate::input::{Buttons, InputFrame};

use super::{ActionCommand, CommandEvent, CommandOutcome, CommandRank};

/// Press `button` inside the closed window `[open, close]`.
///
/// The ideal instant is the window's closing edge (the moment of contact);
/// rank is graded by how close to it the press lands. Presses before the
/// window opens are ignored. The window closing with no press is a
/// failure.
#[derive(Clone, Debug)]
pub struct TimedPress {
    button: Buttons,
    open: Millis,
    close: Millis,
    elapsed: Millis,
    accepting: bool,
    done: bool,
}

impl TimedPress {
    pub fn new(button: Buttons, open: Millis, close: Millis) -> Self {
        debug_assert!(open <= close, "window must not be inverted");
        Self {
            button,
            open,
            close,
            elapsed: Millis::ZERO,
            accepting: false,
            done: false,
        }
    }

    fn finish(&mut self, outcome: CommandOutcome, events: &mut Vec<CommandEvent>) {
        self.done = true;
        self.accepting = false;
        events.push(CommandEvent::Finished(outcome));
    }
}

impl ActionCommand for TimedPress {
    fn start(&mut self) {
        self.elapsed = Millis::ZERO;
        self.accepting = true;
    }

    fn accepting_input(&self) -> bool {
        self.accepting && !self.done
    }

    fn update(&mut self, dt: Millis, input: &InputFrame, events: &mut Vec<CommandEvent>) {
        if self.done || !self.accepting {
            return;
        }
        self.elapsed += dt;

        if input.just_pressed(self.button) && self.elapsed >= self.open {
            if self.elapsed <= self.close {
                let span = self.close - self.open;
                let quality = if span.0 <= 0.0 {
                    1.0
                } else {
                    1.0 - (self.close - self.elapsed) / span
                };
                self.finish(CommandOutcome::Success(CommandRank::grade(quality)), events);
            } else {
                // Late press: the window already closed this very tick.
                self.finish(CommandOutcome::Failure, events);
            }
            return;
        }

        if self.elapsed > self.close {
            self.finish(CommandOutcome::Failure, events);
        }
    }

    fn cancel(&mut self) {
        self.done = true;
        self.accepting = false;
    }
}
