//! Hold-and-release bar command (the hammer family).

use crate::clock::Millis;
use crate::input::{Buttons, InputFrame};

use super::{ActionCommand, CommandEvent, CommandOutcome, CommandRank};

/// Hold `button` to fill a bar, release inside the success zone.
///
/// The bar fills linearly over `fill_time` while the button is held.
/// Releasing with the fill fraction inside the closed zone
/// `[zone_start, zone_end]` succeeds; rank is graded by depth into the
/// zone. Releasing outside the zone, or holding until the bar overfills,
/// fails.
#[derive(Clone, Debug)]
pub struct HoldBar {
    button: Buttons,
    fill_time: Millis,
    zone_start: f64,
    zone_end: f64,
    fill: f64,
    was_held: bool,
    accepting: bool,
    done: bool,
}

impl HoldBar {
    pub fn new(button: Buttons, fill_time: Millis, zone_start: f64, zone_end: f64) -> Self {
        debug_assert!((0.0..=1.0).contains(&zone_start) && zone_start <= zone_end);
        Self {
            button,
            fill_time,
            zone_start,
            zone_end,
            fill: 0.0,
            was_held: false,
            accepting: false,
            done: false,
        }
    }

    /// Current fill fraction, for the on-screen bar.
    pub fn fill(&self) -> f64 {
        self.fill
    }

    fn finish(&mut self, outcome: CommandOutcome, events: &mut Vec<CommandEvent>) {
        self.done = true;
        self.accepting = false;
        events.push(CommandEvent::Finished(outcome));
    }
}

impl ActionCommand for HoldBar {
    fn start(&mut self) {
        self.fill = 0.0;
        self.was_held = false;
        self.accepting = true;
    }

    fn accepting_input(&self) -> bool {
        self.accepting && !self.done
    }

    fn update(&mut self, dt: Millis, input: &InputFrame, events: &mut Vec<CommandEvent>) {
        if self.done || !self.accepting {
            return;
        }

        let held = input.is_held(self.button);
        if held {
            self.fill += dt / self.fill_time;
            if self.fill > 1.0 {
                // Overcharged while still holding.
                self.finish(CommandOutcome::Failure, events);
                return;
            }
        }

        if self.was_held && !held {
            let outcome = if self.fill >= self.zone_start && self.fill <= self.zone_end {
                let span = self.zone_end - self.zone_start;
                let quality = if span <= 0.0 {
                    1.0
                } else {
                    (self.fill - self.zone_start) / span
                };
                CommandOutcome::Success(CommandRank::grade(quality))
            } else {
                CommandOutcome::Failure
            };
            self.finish(outcome, events);
            return;
        }

        self.was_held = held;
    }

    fn cancel(&mut self) {
        self.done = true;
        self.accepting = false;
    }
}
