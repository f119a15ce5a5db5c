//! Damage-resolution interface.
//!
//! Damage math itself is a collaborator behind [`DamageResolver`]
//! (see `env`); the sequence engine only builds requests and inspects the
//! hit/payback fields of the results to pick VFX and follow-up branches.

use arrayvec::ArrayVec;
use bitflags::bitflags;

use crate::state::EntityId;

/// Upper bound on simultaneously affected targets.
pub const MAX_TARGETS: usize = 8;

/// Resolved target set for one move execution.
pub type TargetSet = ArrayVec<EntityId, MAX_TARGETS>;

/// Elemental alignment of an attack or interruption source.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Element {
    #[default]
    Normal,
    Sharp,
    Ice,
    Fire,
    Explosion,
    Quake,
}

bitflags! {
    /// Properties describing how a damage attempt interacts with targets.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct DamageProperties: u8 {
        /// The attacker physically touches the target; Spiked targets
        /// hurt the attacker back.
        const CONTACT         = 1 << 0;
        /// Ignores the target's defense stat.
        const IGNORES_DEFENSE = 1 << 1;
        /// Reaches targets behind the front-most one.
        const PIERCING        = 1 << 2;
        /// Suppresses payback even on contact (e.g. Spike Shield).
        const NO_PAYBACK      = 1 << 3;
        /// Only connects with airborne targets.
        const AERIAL_ONLY     = 1 << 4;
    }
}

/// One damage attempt handed to the resolver.
#[derive(Clone, Debug, PartialEq)]
pub struct DamageRequest {
    pub attacker: EntityId,
    pub targets: TargetSet,
    pub amount: u32,
    pub element: Element,
    pub properties: DamageProperties,
    /// `true` when `amount` is the final total; `false` when the resolver
    /// should still apply its own modifiers.
    pub is_total: bool,
}

/// Outcome of one target's damage interaction.
///
/// Mirrors the black-box resolver contract: the engine reads exactly these
/// three fields and nothing else.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InteractionResult {
    pub target: Option<EntityId>,
    /// The victim actually took the hit.
    pub was_victim_hit: bool,
    /// Contact backfired and the attacker was hurt instead.
    pub was_attacker_hit: bool,
    /// Damage dealt to whichever side was hit.
    pub total_damage: u32,
}

impl InteractionResult {
    /// A no-op result for a target that was gone before resolution.
    pub fn skipped() -> Self {
        Self::default()
    }
}
