//! Stub collaborators for unit tests.

use std::collections::HashSet;

use crate::combat::{DamageProperties, DamageRequest, InteractionResult};
use crate::env::{
    AnimStatus, AnimationDriver, BattleContext, DamageResolver, TurnScheduler, VfxRequest,
    VfxSink,
};
use crate::state::{BattleState, EntityFlags, EntityId};

/// Animation driver whose animations finish instantly unless listed.
#[derive(Default)]
pub struct StubAnims {
    /// Keys reported as unknown, to exercise the degrade path.
    pub missing: HashSet<String>,
    /// Keys that stay in `Playing` forever.
    pub stuck: HashSet<String>,
    pub played: Vec<(EntityId, String)>,
}

impl AnimationDriver for StubAnims {
    fn play(&mut self, entity: EntityId, key: &str) {
        self.played.push((entity, key.to_owned()));
    }

    fn status(&self, _entity: EntityId, key: &str) -> AnimStatus {
        if self.missing.contains(key) {
            AnimStatus::Missing
        } else if self.stuck.contains(key) {
            AnimStatus::Playing
        } else {
            AnimStatus::Finished
        }
    }
}

/// VFX sink that records every spawn.
#[derive(Default)]
pub struct CollectVfx {
    pub spawned: Vec<VfxRequest>,
}

impl VfxSink for CollectVfx {
    fn spawn(&mut self, request: VfxRequest) {
        self.spawned.push(request);
    }
}

/// Minimal damage resolver: defense subtraction, spiked contact payback.
#[derive(Default)]
pub struct FlatResolver;

impl DamageResolver for FlatResolver {
    fn attempt_damage(
        &mut self,
        request: &DamageRequest,
        state: &mut BattleState,
    ) -> Vec<InteractionResult> {
        let mut results = Vec::new();
        for &target in &request.targets {
            let Some(actor) = state.actor(target) else {
                results.push(InteractionResult::skipped());
                continue;
            };
            if !actor.is_targetable() {
                results.push(InteractionResult::skipped());
                continue;
            }

            let spiked = actor.flags.contains(EntityFlags::SPIKED);
            let contact = request.properties.contains(DamageProperties::CONTACT)
                && !request.properties.contains(DamageProperties::NO_PAYBACK);
            if spiked && contact {
                if let Some(attacker) = state.actor_mut(request.attacker) {
                    attacker.hp.damage(1);
                }
                results.push(InteractionResult {
                    target: Some(target),
                    was_victim_hit: false,
                    was_attacker_hit: true,
                    total_damage: 1,
                });
                continue;
            }

            let defense = if request.properties.contains(DamageProperties::IGNORES_DEFENSE) {
                0
            } else {
                actor.defense
            };
            let dealt = request.amount.saturating_sub(defense);
            let actor = state.actor_mut(target).expect("target just looked up");
            actor.hp.damage(dealt);
            if actor.hp.is_depleted() {
                actor.flags.insert(EntityFlags::DEFEATED);
            }
            results.push(InteractionResult {
                target: Some(target),
                was_victim_hit: true,
                was_attacker_hit: false,
                total_damage: dealt,
            });
        }
        results
    }
}

/// Scheduler that records action-complete signals.
#[derive(Default)]
pub struct RecordScheduler {
    pub completed: Vec<EntityId>,
}

impl TurnScheduler for RecordScheduler {
    fn action_complete(&mut self, entity: EntityId) {
        self.completed.push(entity);
    }
}

/// Bundle of state plus stub collaborators.
#[derive(Default)]
pub struct TestHarness {
    pub state: BattleState,
    pub anims: StubAnims,
    pub vfx: CollectVfx,
    pub damage: FlatResolver,
    pub scheduler: RecordScheduler,
}

impl TestHarness {
    pub fn ctx(&mut self) -> BattleContext<'_> {
        BattleContext {
            state: &mut self.state,
            anims: &mut self.anims,
            vfx: &mut self.vfx,
            damage: &mut self.damage,
            scheduler: &mut self.scheduler,
        }
    }
}
