//! Entity handles and per-actor battle data.

use core::fmt;

use bitflags::bitflags;

use crate::clock::Millis;
use crate::ease::{Ease, interpolate};

/// Stable handle for an entity participating in the battle.
///
/// Sequences store handles, never references, so a target leaving the
/// battle mid-sequence shows up as a failed lookup instead of a dangling
/// borrow.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityId(pub u32);

impl EntityId {
    /// The player character.
    pub const PLAYER: Self = Self(0);
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entity#{}", self.0)
    }
}

/// 2D stage position in world units.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn add(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x + other.x, self.y + other.y)
    }

    /// Eased interpolation between two positions at normalized time `t`.
    pub fn lerp(from: Vec2, to: Vec2, t: f64, ease: Ease) -> Vec2 {
        Vec2::new(
            interpolate(from.x, to.x, t, ease),
            interpolate(from.y, to.y, t, ease),
        )
    }
}

bitflags! {
    /// Contact-relevant properties of a battle entity.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct EntityFlags: u8 {
        /// Direct stomp contact hurts the attacker instead.
        const SPIKED   = 1 << 0;
        /// Airborne; grounded moves whiff, aerial follow-ups can connect.
        const FLYING   = 1 << 1;
        /// Hit points reached zero; skipped by damage application.
        const DEFEATED = 1 << 2;
        /// Cannot act, but can still be hit.
        const IMMOBILE = 1 << 3;
    }
}

/// Integer hit-point meter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HitPoints {
    pub current: u32,
    pub maximum: u32,
}

impl HitPoints {
    pub fn full(maximum: u32) -> Self {
        Self {
            current: maximum,
            maximum,
        }
    }

    /// Applies damage, clamping at zero. Returns the new current value.
    pub fn damage(&mut self, amount: u32) -> u32 {
        self.current = self.current.saturating_sub(amount);
        self.current
    }

    pub fn is_depleted(&self) -> bool {
        self.current == 0
    }
}

/// One battle participant.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActorState {
    pub id: EntityId,
    pub position: Vec2,
    /// Idle spot the entity returns to after acting.
    pub home: Vec2,
    pub hp: HitPoints,
    pub fp: u32,
    pub attack: u32,
    pub defense: u32,
    pub flags: EntityFlags,
}

impl ActorState {
    pub fn new(id: EntityId, home: Vec2, hp: u32) -> Self {
        Self {
            id,
            position: home,
            home,
            hp: HitPoints::full(hp),
            fp: 0,
            attack: 0,
            defense: 0,
            flags: EntityFlags::empty(),
        }
    }

    pub fn with_flags(mut self, flags: EntityFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_stats(mut self, attack: u32, defense: u32) -> Self {
        self.attack = attack;
        self.defense = defense;
        self
    }

    pub fn with_fp(mut self, fp: u32) -> Self {
        self.fp = fp;
        self
    }

    /// A target that can still be affected by battle effects.
    pub fn is_targetable(&self) -> bool {
        !self.flags.contains(EntityFlags::DEFEATED)
    }
}

/// Snapshot of a position interpolation in flight.
///
/// Position is a pure function of elapsed time, so pausing and resuming a
/// sequence never drifts an entity off its authored path.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MotionPath {
    pub from: Vec2,
    pub to: Vec2,
    pub duration: Millis,
    pub ease: Ease,
}

impl MotionPath {
    /// Position along the path at `elapsed` since the motion started.
    pub fn at(&self, elapsed: Millis) -> Vec2 {
        Vec2::lerp(self.from, self.to, elapsed.progress(self.duration), self.ease)
    }
}
