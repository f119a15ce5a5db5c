//! Move roster: configuration records and the scripts that run them.
//!
//! The source material expressed per-move behavior as a deep class
//! hierarchy; here a small set of parameterized scripts covers the whole
//! roster, with every balance number (damage, FP, waits, command windows)
//! living in a [`MoveSpec`] record loaded from data rather than inline in
//! state-machine code.

mod hammer;
mod jump;
mod tornado;

pub use hammer::HammerScript;
pub use jump::JumpScript;
pub use tornado::TornadoJumpScript;

use crate::clock::Millis;
use crate::combat::Element;
use crate::env::BattleContext;
use crate::input::Buttons;
use crate::sequence::{SequenceCore, SequenceError};
use crate::state::{EntityId, Vec2};

/// Every move the roster knows.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum MoveKind {
    Jump,
    Multibounce,
    PowerBounce,
    TornadoJump,
    Hammer,
    PowerSmash,
    MegaSmash,
    IceSmash,
    QuakeHammer,
}

/// How the menu resolves this move's target set before execution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum TargetMode {
    /// One chosen enemy.
    Single,
    /// The front-most living enemy.
    First,
    /// Every living enemy.
    All,
}

/// Bonus-input window configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StylishSpec {
    pub button: Buttons,
    /// Delay after the offer before the window opens.
    pub lead: Millis,
    /// How long the window stays open.
    pub duration: Millis,
    /// Length of the interlude flourish animation.
    pub flourish: Millis,
}

/// How repeated landings chain for the jump family.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BounceRule {
    /// Bounce across the target list, one landing per enemy.
    NextTarget,
    /// Bounce repeatedly on the same enemy.
    SameTarget {
        max_bounces: u32,
        /// Damage lost per successful bounce, floored at 1.
        decay_per_bounce: u32,
    },
}

/// Timing and rule knobs for the jump family.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JumpSpec {
    pub bounce: BounceRule,
    pub approach: Millis,
    pub crouch: Millis,
    /// Airtime of one leap; the press window closes at its end.
    pub leap: Millis,
    pub press_window: Millis,
    pub land_wait: Millis,
    pub recoil_wait: Millis,
    pub miss_wait: Millis,
    pub return_time: Millis,
    pub stylish: Option<StylishSpec>,
}

/// Timing and rule knobs for the hammer family.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HammerSpec {
    pub approach: Millis,
    /// Hold-bar fill time and success zone.
    pub fill_time: Millis,
    pub zone_start: f64,
    pub zone_end: f64,
    pub command_timeout: Millis,
    pub slam_wait: Millis,
    pub miss_wait: Millis,
    pub return_time: Millis,
    /// Damage multiplier applied on command success.
    pub success_multiplier: u32,
    /// Shockwave variants hit every grounded enemy.
    pub hits_all_grounded: bool,
    /// Whether the strike counts as body contact (payback-relevant).
    pub contact: bool,
    pub stylish_first: Option<StylishSpec>,
    pub stylish_second: Option<StylishSpec>,
}

/// Timing and rule knobs for Tornado Jump's two phases.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TornadoSpec {
    pub approach: Millis,
    pub crouch: Millis,
    pub leap: Millis,
    pub press_window: Millis,
    pub land_wait: Millis,
    /// Second-phase button prompts, pressed in order.
    pub prompts: Vec<Buttons>,
    pub series_time: Millis,
    /// Damage dealt to each airborne enemy by the spin.
    pub spin_damage: u32,
    pub recoil_wait: Millis,
    pub miss_wait: Millis,
    pub return_time: Millis,
}

/// Family-specific configuration.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FamilySpec {
    Jump(JumpSpec),
    Hammer(HammerSpec),
    TornadoJump(TornadoSpec),
}

/// Complete configuration record for one move.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MoveSpec {
    pub kind: MoveKind,
    pub name: String,
    pub fp_cost: u32,
    pub base_damage: u32,
    pub target_mode: TargetMode,
    pub element: Element,
    pub family: FamilySpec,
}

// ============================================================================
// Shared script helpers
// ============================================================================

/// Offset from a target at which the attacker stops its approach.
const APPROACH_OFFSET: Vec2 = Vec2 { x: -40.0, y: 0.0 };

/// Height above a target at the top of a leap.
const LEAP_HEIGHT: f64 = 50.0;

/// Stand-off point next to `target_pos`.
pub(crate) fn approach_point(target_pos: Vec2) -> Vec2 {
    target_pos.add(APPROACH_OFFSET)
}

/// Point above `target_pos` a jump arcs through.
pub(crate) fn leap_point(target_pos: Vec2) -> Vec2 {
    target_pos.add(Vec2::new(0.0, LEAP_HEIGHT))
}

/// Deducts the move's flower-point cost from the user.
pub(crate) fn spend_fp(ctx: &mut BattleContext<'_>, user: EntityId, fp_cost: u32) {
    if let Some(actor) = ctx.state.actor_mut(user) {
        actor.fp = actor.fp.saturating_sub(fp_cost);
    }
}

/// The shared two-step stylish flourish: play the flourish animation, then
/// burst the indicator VFX and hand control back to the saved branch.
pub(crate) fn flourish_interlude(
    index: u32,
    step: u32,
    anim: &str,
    flourish: Millis,
    seq: &mut SequenceCore,
    ctx: &mut BattleContext<'_>,
) -> Result<(), SequenceError> {
    match step {
        0 => {
            ctx.anims.play(seq.user(), anim);
            seq.wait(flourish);
        }
        1 => {
            let at = ctx
                .state
                .actor(seq.user())
                .map(|a| a.position)
                .unwrap_or(Vec2::ZERO);
            ctx.vfx.spawn(crate::env::VfxRequest {
                kind: crate::env::VfxKind::StylishBurst(index),
                at,
            });
            seq.finish_stylish();
        }
        _ => return Err(SequenceError::UnhandledStylishStep { index, step }),
    }
    Ok(())
}
