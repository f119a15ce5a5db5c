//! Mash-to-fill bar command.

use crate::clock::Millis;
use crate::input::{Buttons, InputFrame};

use super::{ActionCommand, CommandEvent, CommandOutcome, CommandRank};

/// Mash `button` to fill a decaying bar before the deadline.
///
/// Each press adds `fill_per_press`; the bar drains at `decay_per_sec`
/// continuously. Reaching a full bar within `time_limit` succeeds, graded
/// by the fraction of time left to spare. The deadline passing first is a
/// failure.
#[derive(Clone, Debug)]
pub struct MashBar {
    button: Buttons,
    fill_per_press: f64,
    decay_per_sec: f64,
    time_limit: Millis,
    fill: f64,
    elapsed: Millis,
    accepting: bool,
    done: bool,
}

impl MashBar {
    pub fn new(
        button: Buttons,
        fill_per_press: f64,
        decay_per_sec: f64,
        time_limit: Millis,
    ) -> Self {
        Self {
            button,
            fill_per_press,
            decay_per_sec,
            time_limit,
            fill: 0.0,
            elapsed: Millis::ZERO,
            accepting: false,
            done: false,
        }
    }

    pub fn fill(&self) -> f64 {
        self.fill
    }

    fn finish(&mut self, outcome: CommandOutcome, events: &mut Vec<CommandEvent>) {
        self.done = true;
        self.accepting = false;
        events.push(CommandEvent::Finished(outcome));
    }
}

impl ActionCommand for MashBar {
    fn start(&mut self) {
        self.fill = 0.0;
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
        self.fill = (self.fill - self.decay_per_sec * dt.as_secs()).max(0.0);

        if input.just_pressed(self.button) {
            self.fill += self.fill_per_press;
        }

        if self.fill >= 1.0 {
            let to_spare = 1.0 - self.elapsed.progress(self.time_limit);
            self.finish(
                CommandOutcome::Success(CommandRank::grade(to_spare)),
                events,
            );
            return;
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
