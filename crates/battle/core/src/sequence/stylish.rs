//! Stylish-move bonus windows.
//!
//! A sequence may open a short bonus-input window during its Main or
//! Success branch. Hitting it diverts the state machine into the Stylish
//! branch for a small interlude, then returns control to exactly the
//! branch and step that were pending before. Missing the window has no
//! effect whatsoever on the primary move's outcome or timing.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::clock::Millis;
use crate::input::{Buttons, InputFrame};

use super::SequenceBranch;

/// Indicator state shared with the VFX layer.
///
/// The sequence owns the cell; the on-screen indicator holds a [`Weak`]
/// and reads without owning lifecycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StylishData {
    /// The bonus input is currently inside its success timing window.
    pub within_range: bool,
    /// Terminal flag; the indicator stops rendering once set.
    pub finished: bool,
}

/// Non-owning view of a stylish indicator cell.
pub type StylishHandle = Weak<RefCell<StylishData>>;

/// An open bonus-input offer.
///
/// The window opens `lead` after the offer and stays open for `duration`;
/// both edges are inside the success range (closed interval).
#[derive(Debug)]
pub struct StylishWindow {
    pub index: u32,
    pub button: Buttons,
    lead: Millis,
    duration: Millis,
    elapsed: Millis,
    data: Rc<RefCell<StylishData>>,
}

/// What one tick of window bookkeeping produced.
#[derive(Debug, PartialEq, Eq)]
pub enum WindowPoll {
    /// Still open (or not yet open).
    Open,
    /// The bonus input landed inside the range.
    Hit,
    /// The window expired unhit.
    Expired,
}

impl StylishWindow {
    pub fn new(index: u32, button: Buttons, lead: Millis, duration: Millis) -> Self {
        Self {
            index,
            button,
            lead,
            duration,
            elapsed: Millis::ZERO,
            data: Rc::new(RefCell::new(StylishData::default())),
        }
    }

    pub fn handle(&self) -> StylishHandle {
        Rc::downgrade(&self.data)
    }

    pub fn data_cell(&self) -> Rc<RefCell<StylishData>> {
        Rc::clone(&self.data)
    }

    /// Advances the window and checks this tick's input against it.
    pub fn poll(&mut self, dt: Millis, input: &InputFrame) -> WindowPoll {
        self.elapsed += dt;
        let close = self.lead + self.duration;
        let within = self.elapsed >= self.lead && self.elapsed <= close;
        self.data.borrow_mut().within_range = within;

        if within && input.just_pressed(self.button) {
            return WindowPoll::Hit;
        }
        if self.elapsed > close {
            self.data.borrow_mut().finished = true;
            return WindowPoll::Expired;
        }
        WindowPoll::Open
    }

    /// Marks the indicator finished without a hit (sequence ended early).
    pub fn abandon(&mut self) {
        let mut data = self.data.borrow_mut();
        data.within_range = false;
        data.finished = true;
    }
}

/// Saved continuation for an interlude in flight.
///
/// The interlude selector plus an explicit resume point keep the state
/// machine inspectable instead of hiding the continuation in a function
/// pointer.
#[derive(Debug)]
pub struct StylishState {
    /// Which bonus tier was hit (some moves author two distinct
    /// interludes).
    pub index: u32,
    /// Interlude-local step counter, separate from the primary branch
    /// counters.
    pub step: u32,
    /// Branch that was active when the interlude began.
    pub return_branch: SequenceBranch,
    /// Step the primary branch resumes at.
    pub return_step: u32,
    /// Indicator cell carried over from the window.
    pub data: Rc<RefCell<StylishData>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_edges_are_inclusive() {
        let mut w = StylishWindow::new(0, Buttons::A, Millis::new(100.0), Millis::new(50.0));
        // Land exactly on the opening edge.
        assert_eq!(
            w.poll(Millis::new(100.0), &InputFrame::press(Buttons::A)),
            WindowPoll::Hit
        );

        let mut w = StylishWindow::new(0, Buttons::A, Millis::new(100.0), Millis::new(50.0));
        assert_eq!(w.poll(Millis::new(150.0), &InputFrame::IDLE), WindowPoll::Open);
        // Land exactly on the closing edge.
        assert_eq!(
            w.poll(Millis::ZERO, &InputFrame::press(Buttons::A)),
            WindowPoll::Hit
        );
    }

    #[test]
    fn expiry_sets_finished_on_the_indicator() {
        let mut w = StylishWindow::new(0, Buttons::A, Millis::new(10.0), Millis::new(10.0));
        let handle = w.handle();
        assert_eq!(w.poll(Millis::new(30.0), &InputFrame::IDLE), WindowPoll::Expired);
        let cell = handle.upgrade().expect("owner still alive");
        assert!(cell.borrow().finished);
        assert!(!cell.borrow().within_range);
    }

    #[test]
    fn press_outside_range_does_not_hit() {
        let mut w = StylishWindow::new(0, Buttons::A, Millis::new(100.0), Millis::new(50.0));
        assert_eq!(
            w.poll(Millis::new(40.0), &InputFrame::press(Buttons::A)),
            WindowPoll::Open
        );
    }
}
