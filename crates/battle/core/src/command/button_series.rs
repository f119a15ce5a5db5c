//! Ordered button-series command (multi-response).

use arrayvec::ArrayVec;

use crate::clock::Millis;
use crate::input::{Buttons, InputFrame};

use super::{ActionCommand, CommandEvent, CommandOutcome, CommandRank, CommandResponse};

/// Maximum prompt length for a button series.
pub const MAX_PROMPTS: usize = 8;

/// Press the prompted buttons in order before the deadline.
///
/// Each correct press reports a [`CommandResponse`] carrying the prompt
/// index without ending the command, so the sequence can react per press
/// (Tornado Jump spins one enemy per button). Completing the series
/// succeeds, graded by time to spare; a wrong press or the deadline
/// passing fails.
#[derive(Clone, Debug)]
pub struct ButtonSeries {
    prompts: ArrayVec<Buttons, MAX_PROMPTS>,
    time_limit: Millis,
    next: usize,
    elapsed: Millis,
    accepting: bool,
    done: bool,
}

impl ButtonSeries {
    pub fn new(prompts: &[Buttons], time_limit: Millis) -> Self {
        Self {
            prompts: prompts.iter().copied().collect(),
            time_limit,
            next: 0,
            elapsed: Millis::ZERO,
            accepting: false,
            done: false,
        }
    }

    /// Index of the next prompt awaiting input, for the prompt display.
    pub fn next_prompt(&self) -> Option<Buttons> {
        self.prompts.get(self.next).copied()
    }

    fn finish(&mut self, outcome: CommandOutcome, events: &mut Vec<CommandEvent>) {
        self.done = true;
        self.accepting = false;
        events.push(CommandEvent::Finished(outcome));
    }
}

impl ActionCommand for ButtonSeries {
    fn start(&mut self) {
        self.next = 0;
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

        if !input.pressed.is_empty() {
            let Some(expected) = self.prompts.get(self.next).copied() else {
                return;
            };
            if input.just_pressed(expected) {
                let to_spare = 1.0 - self.elapsed.progress(self.time_limit);
                events.push(CommandEvent::Response(CommandResponse {
                    index: self.next as u32,
                    value: to_spare,
                }));
                self.next += 1;
                if self.next == self.prompts.len() {
                    self.finish(
                        CommandOutcome::Success(CommandRank::grade(to_spare)),
                        events,
                    );
                    return;
                }
            } else {
                // Wrong button breaks the series.
                self.finish(CommandOutcome::Failure, events);
                return;
            }
        }

        if self.elapsed > self.time_limit {
            self.finish(CommandOutcome::Failure, events);
        }
    }

    fn cancel(&mut self) {
        self.done = true;
        self.accepting = false;
    }
}
