//! Raw input delivered to action commands.
//!
//! The platform layer samples its devices once per tick and hands the
//! engine an [`InputFrame`]: the buttons that went down this tick, the
//! buttons currently held, and the main axis. Commands never poll hardware
//! themselves.

use bitflags::bitflags;

bitflags! {
    /// Button mask used by both edge and held sets.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    #[cfg_attr(feature = "serde", serde(transparent))]
    pub struct Buttons: u16 {
        const A      = 1 << 0;
        const B      = 1 << 1;
        const X      = 1 << 2;
        const Y      = 1 << 3;
        const LEFT   = 1 << 4;
        const RIGHT  = 1 << 5;
        const UP     = 1 << 6;
        const DOWN   = 1 << 7;
        const GUARD  = 1 << 8;
    }
}

/// One tick's worth of raw input.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct InputFrame {
    /// Buttons that transitioned to down on this tick.
    pub pressed: Buttons,
    /// Buttons currently held down (includes `pressed`).
    pub held: Buttons,
    /// Main stick, each component in `[-1, 1]`.
    pub axis: (f32, f32),
}

impl InputFrame {
    /// Frame with no input at all.
    pub const IDLE: Self = Self {
        pressed: Buttons::empty(),
        held: Buttons::empty(),
        axis: (0.0, 0.0),
    };

    /// Frame where `buttons` were just pressed (and are held).
    pub fn press(buttons: Buttons) -> Self {
        Self {
            pressed: buttons,
            held: buttons,
            axis: (0.0, 0.0),
        }
    }

    /// Frame where `buttons` are held but none were newly pressed.
    pub fn hold(buttons: Buttons) -> Self {
        Self {
            pressed: Buttons::empty(),
            held: buttons,
            axis: (0.0, 0.0),
        }
    }

    pub fn just_pressed(&self, buttons: Buttons) -> bool {
        self.pressed.intersects(buttons)
    }

    pub fn is_held(&self, buttons: Buttons) -> bool {
        self.held.intersects(buttons)
    }
}
