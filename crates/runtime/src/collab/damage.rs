//! Standard damage resolution.
//!
//! The sequence engine treats this as a black box: it submits a request
//! and reads back which side each interaction actually hit. The rules
//! here are the stock ones; badge and status modifiers would layer in
//! without the engine noticing.

use tracing::debug;

use battle_core::{
    BattleState, DamageProperties, DamageRequest, DamageResolver, EntityFlags,
    InteractionResult,
};

/// Damage dealt back to an attacker that stomps something spiked.
const PAYBACK_DAMAGE: u32 = 1;

#[derive(Debug, Default)]
pub struct StandardResolver;

impl StandardResolver {
    pub fn new() -> Self {
        Self
    }
}

impl DamageResolver for StandardResolver {
    fn attempt_damage(
        &mut self,
        request: &DamageRequest,
        state: &mut BattleState,
    ) -> Vec<InteractionResult> {
        let mut results = Vec::with_capacity(request.targets.len());
        for &target in &request.targets {
            let Some(actor) = state.actor(target) else {
                results.push(InteractionResult::skipped());
                continue;
            };
            if !actor.is_targetable() {
                results.push(InteractionResult::skipped());
                continue;
            }
            if request.properties.contains(DamageProperties::AERIAL_ONLY)
                && !actor.flags.contains(EntityFlags::FLYING)
            {
                results.push(InteractionResult::skipped());
                continue;
            }

            // Spiked contact resolves against the attacker instead.
            let payback = actor.flags.contains(EntityFlags::SPIKED)
                && request.properties.contains(DamageProperties::CONTACT)
                && !request.properties.contains(DamageProperties::NO_PAYBACK);
            if payback {
                if let Some(attacker) = state.actor_mut(request.attacker) {
                    attacker.hp.damage(PAYBACK_DAMAGE);
                }
                debug!(attacker = %request.attacker, %target, "spiked payback");
                results.push(InteractionResult {
                    target: Some(target),
                    was_victim_hit: false,
                    was_attacker_hit: true,
                    total_damage: PAYBACK_DAMAGE,
                });
                continue;
            }

            let defense = if request.is_total
                || request.properties.contains(DamageProperties::IGNORES_DEFENSE)
            {
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
            debug!(%target, dealt, hp = actor.hp.current, "damage applied");
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
