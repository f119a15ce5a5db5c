//! The jump family: Jump, Multibounce, Power Bounce.
//!
//! One parameterized script covers the whole family; the [`BounceRule`]
//! decides whether successful landings chain onto the same enemy (with
//! decaying damage) or walk down the target list.

use tracing::trace;

use crate::clock::Millis;
use crate::combat::{DamageProperties, Element};
use crate::command::TimedPress;
use crate::ease::Ease;
use crate::env::{BattleContext, VfxKind, VfxRequest};
use crate::input::Buttons;
use crate::moves::{
    BounceRule, JumpSpec, MoveKind, MoveSpec, approach_point, flourish_interlude, leap_point,
    spend_fp,
};
use crate::sequence::{MoveScript, SequenceBranch, SequenceCore, SequenceError};
use crate::state::{EntityFlags, EntityId, Vec2};

pub struct JumpScript {
    spec: MoveSpec,
    jump: JumpSpec,
    /// Successful landings so far.
    bounces: u32,
    /// Damage of the next landing (decays for Power Bounce).
    damage: u32,
    /// Index into the target set (advances under `NextTarget`).
    target_idx: usize,
}

impl JumpScript {
    pub fn new(spec: MoveSpec, jump: JumpSpec) -> Self {
        let damage = spec.base_damage;
        Self {
            spec,
            jump,
            bounces: 0,
            damage,
            target_idx: 0,
        }
    }

    fn current_target(&self, seq: &SequenceCore) -> Option<EntityId> {
        seq.targets().get(self.target_idx).copied()
    }

    /// The landing target, provided it is still standing and reachable by
    /// a stomp.
    fn reachable_target(
        &self,
        seq: &SequenceCore,
        ctx: &BattleContext<'_>,
    ) -> Option<(EntityId, Vec2)> {
        let id = self.current_target(seq)?;
        let actor = ctx.state.actor(id)?;
        if !actor.is_targetable() || actor.flags.contains(EntityFlags::FLYING) {
            return None;
        }
        Some((id, actor.position))
    }

    /// Whether another landing should follow this one.
    fn wants_another_bounce(&mut self, seq: &SequenceCore, ctx: &BattleContext<'_>) -> bool {
        match self.jump.bounce {
            BounceRule::NextTarget => {
                if self.target_idx + 1 < seq.targets().len() {
                    self.target_idx += 1;
                    true
                } else {
                    false
                }
            }
            BounceRule::SameTarget { max_bounces, .. } => {
                self.bounces < max_bounces
                    && self
                        .current_target(seq)
                        .and_then(|id| ctx.state.actor(id))
                        .is_some_and(|a| a.is_targetable())
            }
        }
    }

    /// Lands on the target: damage, payback check, VFX. Returns `false`
    /// when contact backfired and the script has already diverted.
    fn land_on_target(
        &mut self,
        amount: u32,
        seq: &mut SequenceCore,
        ctx: &mut BattleContext<'_>,
    ) -> bool {
        let Some(target) = self.current_target(seq) else {
            return true;
        };
        let results = seq.attempt_damage(
            ctx,
            amount,
            &[target],
            self.spec.element,
            DamageProperties::CONTACT,
            false,
        );

        if results.iter().any(|r| r.was_attacker_hit) {
            let at = ctx
                .state
                .actor(seq.user())
                .map(|a| a.position)
                .unwrap_or(Vec2::ZERO);
            ctx.vfx.spawn(VfxRequest {
                kind: VfxKind::PaybackFlash,
                at,
            });
            self.on_interruption(Element::Sharp, seq, ctx);
            return false;
        }

        for result in results.iter().filter(|r| r.was_victim_hit) {
            let at = ctx
                .state
                .actor(target)
                .map(|a| a.position)
                .unwrap_or(Vec2::ZERO);
            ctx.vfx.spawn(VfxRequest {
                kind: VfxKind::DamageNumber(result.total_damage),
                at,
            });
        }
        true
    }
}

impl MoveScript for JumpScript {
    fn kind(&self) -> MoveKind {
        self.spec.kind
    }

    fn on_start(&mut self, seq: &mut SequenceCore, ctx: &mut BattleContext<'_>) {
        spend_fp(ctx, seq.user(), self.spec.fp_cost);
    }

    fn branch_step(
        &mut self,
        branch: SequenceBranch,
        step: u32,
        seq: &mut SequenceCore,
        ctx: &mut BattleContext<'_>,
    ) -> Result<(), SequenceError> {
        let user = seq.user();
        match branch {
            SequenceBranch::Start => match step {
                0 => {
                    let Some((_, target_pos)) = self.reachable_target(seq, ctx) else {
                        self.on_miss(seq, ctx);
                        return Ok(());
                    };
                    ctx.anims.play(user, "run");
                    seq.move_to(
                        ctx,
                        user,
                        approach_point(target_pos),
                        self.jump.approach,
                        Ease::QuadOut,
                    );
                }
                1 => {
                    ctx.anims.play(user, "crouch");
                    seq.wait(self.jump.crouch);
                    seq.change_branch(SequenceBranch::Main);
                }
                _ => return Err(SequenceError::UnhandledStep { branch, step }),
            },

            SequenceBranch::Main => match step {
                0 => {
                    // Re-checked every bounce: the enemy may have taken
                    // flight or gone down since the last landing.
                    let Some((_, target_pos)) = self.reachable_target(seq, ctx) else {
                        self.on_miss(seq, ctx);
                        return Ok(());
                    };
                    let close = self.jump.leap;
                    let open = Millis::new((close - self.jump.press_window).0.max(0.0));
                    seq.arm_command(Box::new(TimedPress::new(Buttons::A, open, close)));
                    ctx.anims.play(user, "leap");
                    seq.move_to(ctx, user, leap_point(target_pos), self.jump.leap, Ease::QuadOut);
                }
                1 => {
                    // Only reached when the command is still unresolved as
                    // the arc finishes.
                    seq.wait_for_command(Some(self.jump.leap));
                }
                _ => return Err(SequenceError::UnhandledStep { branch, step }),
            },

            SequenceBranch::Success => match step {
                0 => {
                    ctx.anims.play(user, "stomp");
                    let amount = self.damage;
                    if !self.land_on_target(amount, seq, ctx) {
                        return Ok(());
                    }
                    let at = ctx
                        .state
                        .actor(user)
                        .map(|a| a.position)
                        .unwrap_or(Vec2::ZERO);
                    ctx.vfx.spawn(VfxRequest {
                        kind: VfxKind::RankBadge(seq.best_rank()),
                        at,
                    });

                    self.bounces += 1;
                    if let BounceRule::SameTarget {
                        decay_per_bounce, ..
                    } = self.jump.bounce
                        && decay_per_bounce > 0
                        && self.damage > 1
                    {
                        self.damage = self.damage.saturating_sub(decay_per_bounce).max(1);
                    }
                    trace!(bounces = self.bounces, next_damage = self.damage, "landed");

                    seq.wait(self.jump.land_wait);
                    if self.wants_another_bounce(seq, ctx) {
                        seq.change_branch(SequenceBranch::Main);
                    } else {
                        if let Some(stylish) = self.jump.stylish {
                            seq.offer_stylish(0, stylish.button, stylish.lead, stylish.duration);
                        }
                        seq.change_branch(SequenceBranch::End);
                    }
                }
                _ => return Err(SequenceError::UnhandledStep { branch, step }),
            },

            SequenceBranch::Failed => match step {
                0 => {
                    // A muffed landing still connects, just without the
                    // chain continuing.
                    ctx.anims.play(user, "stomp_weak");
                    let amount = self.damage;
                    if !self.land_on_target(amount, seq, ctx) {
                        return Ok(());
                    }
                    seq.wait(self.jump.recoil_wait);
                    seq.change_branch(SequenceBranch::End);
                }
                _ => return Err(SequenceError::UnhandledStep { branch, step }),
            },

            SequenceBranch::Miss => match step {
                0 => {
                    ctx.anims.play(user, "whiff");
                    let at = ctx
                        .state
                        .actor(user)
                        .map(|a| a.position)
                        .unwrap_or(Vec2::ZERO);
                    ctx.vfx.spawn(VfxRequest {
                        kind: VfxKind::MissText,
                        at,
                    });
                    seq.wait(self.jump.miss_wait);
                    seq.change_branch(SequenceBranch::End);
                }
                _ => return Err(SequenceError::UnhandledStep { branch, step }),
            },

            SequenceBranch::End => {
                let interrupted = seq.interruption().is_some();
                match (interrupted, step) {
                    // Spiked recoil: a hurt hop backwards instead of the
                    // normal walk home.
                    (true, 0) => {
                        ctx.anims.play(user, "hurt");
                        seq.move_by(
                            ctx,
                            user,
                            Vec2::new(-30.0, 0.0),
                            Millis::new(300.0),
                            Ease::QuadOut,
                        );
                    }
                    (false, 0) => {
                        let home = ctx
                            .state
                            .actor(user)
                            .map(|a| a.home)
                            .unwrap_or(Vec2::ZERO);
                        ctx.anims.play(user, "run");
                        seq.move_to(ctx, user, home, self.jump.return_time, Ease::QuadInOut);
                    }
                    (_, 1) => {
                        ctx.anims.play(user, "idle");
                        seq.end_sequence();
                    }
                    _ => return Err(SequenceError::UnhandledStep { branch, step }),
                }
            }

            SequenceBranch::Stylish => {
                return Err(SequenceError::UnhandledStep { branch, step });
            }
        }
        Ok(())
    }

    fn stylish_step(
        &mut self,
        index: u32,
        step: u32,
        seq: &mut SequenceCore,
        ctx: &mut BattleContext<'_>,
    ) -> Result<(), SequenceError> {
        let Some(stylish) = self.jump.stylish else {
            return Err(SequenceError::UnhandledStylishStep { index, step });
        };
        flourish_interlude(index, step, "flip", stylish.flourish, seq, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::TargetSet;
    use crate::moves::{FamilySpec, TargetMode};
    use crate::sequence::Sequence;
    use crate::state::ActorState;
    use crate::testutil::TestHarness;

    const USER: EntityId = EntityId(0);
    const FOE: EntityId = EntityId(5);
    const FOE_B: EntityId = EntityId(6);

    fn jump_spec(bounce: BounceRule, base_damage: u32) -> (MoveSpec, JumpSpec) {
        let jump = JumpSpec {
            bounce,
            approach: Millis::new(100.0),
            crouch: Millis::new(50.0),
            leap: Millis::new(100.0),
            press_window: Millis::new(50.0),
            land_wait: Millis::new(50.0),
            recoil_wait: Millis::new(50.0),
            miss_wait: Millis::new(50.0),
            return_time: Millis::new(100.0),
            stylish: None,
        };
        let spec = MoveSpec {
            kind: MoveKind::PowerBounce,
            name: "Power Bounce".into(),
            fp_cost: 3,
            base_damage,
            target_mode: TargetMode::Single,
            element: Element::Normal,
            family: FamilySpec::Jump(jump),
        };
        (spec, jump)
    }

    fn harness() -> TestHarness {
        let mut h = TestHarness::default();
        h.state
            .insert(ActorState::new(USER, Vec2::ZERO, 10).with_fp(5));
        h.state
            .insert(ActorState::new(FOE, Vec2::new(120.0, 0.0), 20));
        h
    }

    fn run(mut seq: Sequence, h: &mut TestHarness) {
        seq.start(&mut h.ctx());
        let mut ticks = 0;
        while !seq.is_finished() && !seq.is_halted() {
            assert!(ticks < 1000, "sequence did not finish");
            seq.update(
                Millis::new(25.0),
                &crate::input::InputFrame::IDLE,
                &mut h.ctx(),
            );
            ticks += 1;
        }
        assert!(seq.is_finished());
    }

    #[test]
    fn power_bounce_decays_damage_and_stops_at_cap() {
        let (spec, jump) = jump_spec(
            BounceRule::SameTarget {
                max_bounces: 3,
                decay_per_bounce: 1,
            },
            3,
        );
        let mut h = harness();
        let script = Box::new(JumpScript::new(spec, jump));
        let targets: TargetSet = [FOE].into_iter().collect();
        // Auto-success per bounce drives the full loop.
        let seq = Sequence::new(script, USER, targets, false);
        run(seq, &mut h);

        // Landings deal 3, 2, 1 and the chain stops after the cap.
        assert_eq!(h.state.actor(FOE).unwrap().hp.current, 14);
        let landings = h
            .anims
            .played
            .iter()
            .filter(|(_, key)| key == "stomp")
            .count();
        assert_eq!(landings, 3);
    }

    #[test]
    fn bounce_damage_never_drops_below_one() {
        let (spec, jump) = jump_spec(
            BounceRule::SameTarget {
                max_bounces: 5,
                decay_per_bounce: 1,
            },
            3,
        );
        let mut h = harness();
        let script = Box::new(JumpScript::new(spec, jump));
        let targets: TargetSet = [FOE].into_iter().collect();
        let seq = Sequence::new(script, USER, targets, false);
        run(seq, &mut h);

        // 3 + 2 + 1 + 1 + 1
        assert_eq!(h.state.actor(FOE).unwrap().hp.current, 12);
    }

    #[test]
    fn multibounce_walks_the_target_list() {
        let (spec, jump) = jump_spec(BounceRule::NextTarget, 2);
        let mut h = harness();
        h.state
            .insert(ActorState::new(FOE_B, Vec2::new(180.0, 0.0), 20));
        let script = Box::new(JumpScript::new(spec, jump));
        let targets: TargetSet = [FOE, FOE_B].into_iter().collect();
        let seq = Sequence::new(script, USER, targets, false);
        run(seq, &mut h);

        assert_eq!(h.state.actor(FOE).unwrap().hp.current, 18);
        assert_eq!(h.state.actor(FOE_B).unwrap().hp.current, 18);
    }

    #[test]
    fn flying_target_is_a_miss_not_a_failure() {
        let (spec, jump) = jump_spec(BounceRule::NextTarget, 2);
        let mut h = harness();
        h.state
            .actor_mut(FOE)
            .unwrap()
            .flags
            .insert(EntityFlags::FLYING);
        let script = Box::new(JumpScript::new(spec, jump));
        let targets: TargetSet = [FOE].into_iter().collect();
        let seq = Sequence::new(script, USER, targets, false);
        run(seq, &mut h);

        assert_eq!(h.state.actor(FOE).unwrap().hp.current, 20);
        assert!(h.anims.played.iter().any(|(_, key)| key == "whiff"));
    }

    #[test]
    fn spiked_target_interrupts_with_payback() {
        let (spec, jump) = jump_spec(
            BounceRule::SameTarget {
                max_bounces: 2,
                decay_per_bounce: 0,
            },
            2,
        );
        let mut h = harness();
        h.state
            .actor_mut(FOE)
            .unwrap()
            .flags
            .insert(EntityFlags::SPIKED);
        let script = Box::new(JumpScript::new(spec, jump));
        let targets: TargetSet = [FOE].into_iter().collect();
        let seq = Sequence::new(script, USER, targets, false);
        run(seq, &mut h);

        // Contact backfired: the foe is untouched, the user took the
        // payback and played the hurt exit instead of the walk home.
        assert_eq!(h.state.actor(FOE).unwrap().hp.current, 20);
        assert_eq!(h.state.actor(USER).unwrap().hp.current, 9);
        assert!(h.anims.played.iter().any(|(_, key)| key == "hurt"));
    }

    #[test]
    fn fp_cost_is_spent_on_start() {
        let (spec, jump) = jump_spec(BounceRule::NextTarget, 2);
        let mut h = harness();
        let script = Box::new(JumpScript::new(spec, jump));
        let targets: TargetSet = [FOE].into_iter().collect();
        let mut seq = Sequence::new(script, USER, targets, false);
        seq.start(&mut h.ctx());
        assert_eq!(h.state.actor(USER).unwrap().fp, 2);
        seq.end(&mut h.ctx());
    }
}
