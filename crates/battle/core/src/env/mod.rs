//! Collaborator seams around the sequence engine.
//!
//! The engine drives rendering, sound, damage math, and turn scheduling
//! through these traits without coupling to concrete implementations. All
//! calls are synchronous and single-threaded; one-shot notifications (VFX
//! spawns, the action-complete signal) are direct method calls, not a
//! queued event bus.

use crate::combat::{DamageRequest, InteractionResult};
use crate::command::CommandRank;
use crate::moves::{MoveKind, MoveSpec};
use crate::state::{BattleState, EntityId, Vec2};

/// Playback state of a named animation on an entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnimStatus {
    Playing,
    Finished,
    /// The key is not known for this entity. The engine degrades by
    /// treating the dependent wait as already satisfied.
    Missing,
}

/// Animation playback collaborator.
///
/// Durations are owned by the animation system, not the sequence; a
/// sequence waiting on an animation must not assume a fixed tick count.
pub trait AnimationDriver {
    /// Starts `key` on `entity`, replacing whatever was playing.
    fn play(&mut self, entity: EntityId, key: &str);

    /// Current playback status of `key` on `entity`.
    fn status(&self, entity: EntityId, key: &str) -> AnimStatus;
}

/// One-shot visual effect requests raised by branch logic.
#[derive(Clone, Debug, PartialEq)]
pub enum VfxKind {
    /// Rank badge shown when an action command lands.
    RankBadge(CommandRank),
    /// Floating damage number over a victim.
    DamageNumber(u32),
    /// Attacker took contact payback.
    PaybackFlash,
    /// The move whiffed entirely.
    MissText,
    /// Stylish window indicator burst for the given tier.
    StylishBurst(u32),
}

#[derive(Clone, Debug, PartialEq)]
pub struct VfxRequest {
    pub kind: VfxKind,
    pub at: Vec2,
}

/// Sink for one-shot VFX spawns.
pub trait VfxSink {
    fn spawn(&mut self, request: VfxRequest);
}

/// Opaque damage resolution collaborator.
///
/// The engine never computes damage itself; it submits a request and reads
/// back per-target interaction results.
pub trait DamageResolver {
    fn attempt_damage(
        &mut self,
        request: &DamageRequest,
        state: &mut BattleState,
    ) -> Vec<InteractionResult>;
}

/// Receives the single "this entity's action is fully complete" signal.
pub trait TurnScheduler {
    fn action_complete(&mut self, entity: EntityId);
}

/// Read-only move configuration records.
pub trait MoveOracle {
    fn spec(&self, kind: MoveKind) -> Option<&MoveSpec>;
}

/// Aggregates the mutable collaborators a sequence needs for one tick.
///
/// Rebuilt by the driver each tick from its owned components; the borrows
/// are disjoint so damage resolution can mutate state while the other
/// collaborators stay reachable.
pub struct BattleContext<'a> {
    pub state: &'a mut BattleState,
    pub anims: &'a mut dyn AnimationDriver,
    pub vfx: &'a mut dyn VfxSink,
    pub damage: &'a mut dyn DamageResolver,
    pub scheduler: &'a mut dyn TurnScheduler,
}
