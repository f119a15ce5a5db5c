//! The hammer family: Hammer, Power Smash, Mega Smash, Ice Smash,
//! Quake Hammer.
//!
//! One parameterized script: the record supplies element, the
//! command-success damage multiplier, and whether the strike is a single
//! smash or a grounded shockwave. Two stylish windows demonstrate the
//! interlude protocol returning to a mid-branch resume point.

use crate::command::HoldBar;
use crate::ease::Ease;
use crate::env::{BattleContext, VfxKind, VfxRequest};
use crate::input::Buttons;
use crate::moves::{HammerSpec, MoveKind, MoveSpec, approach_point, flourish_interlude, spend_fp};
use crate::sequence::{MoveScript, SequenceBranch, SequenceCore, SequenceError};
use crate::combat::{DamageProperties, TargetSet};
use crate::state::{EntityFlags, EntityId, Vec2};

pub struct HammerScript {
    spec: MoveSpec,
    hammer: HammerSpec,
}

impl HammerScript {
    pub fn new(spec: MoveSpec, hammer: HammerSpec) -> Self {
        Self { spec, hammer }
    }

    fn primary_target(
        &self,
        seq: &SequenceCore,
        ctx: &BattleContext<'_>,
    ) -> Option<(EntityId, Vec2)> {
        let id = seq.primary_target()?;
        let actor = ctx.state.actor(id)?;
        // A hammer swings at ground level; an airborne enemy is out of
        // reach entirely.
        if !actor.is_targetable() || actor.flags.contains(EntityFlags::FLYING) {
            return None;
        }
        Some((id, actor.position))
    }

    fn strike_targets(&self, seq: &SequenceCore, ctx: &BattleContext<'_>) -> TargetSet {
        if self.hammer.hits_all_grounded {
            seq.targets()
                .iter()
                .copied()
                .filter(|&id| {
                    ctx.state
                        .actor(id)
                        .is_some_and(|a| a.is_targetable() && !a.flags.contains(EntityFlags::FLYING))
                })
                .collect()
        } else {
            self.primary_target(seq, ctx)
                .map(|(id, _)| id)
                .into_iter()
                .collect()
        }
    }

    fn properties(&self) -> DamageProperties {
        if self.hammer.contact {
            DamageProperties::CONTACT
        } else {
            DamageProperties::empty()
        }
    }

    fn strike(&self, amount: u32, seq: &mut SequenceCore, ctx: &mut BattleContext<'_>) {
        let targets = self.strike_targets(seq, ctx);
        let results = seq.attempt_damage(
            ctx,
            amount,
            &targets,
            self.spec.element,
            self.properties(),
            false,
        );
        for result in results.iter().filter(|r| r.was_victim_hit) {
            let at = result
                .target
                .and_then(|id| ctx.state.actor(id))
                .map(|a| a.position)
                .unwrap_or(Vec2::ZERO);
            ctx.vfx.spawn(VfxRequest {
                kind: VfxKind::DamageNumber(result.total_damage),
                at,
            });
        }
    }
}

impl MoveScript for HammerScript {
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
                    let Some((_, target_pos)) = self.primary_target(seq, ctx) else {
                        self.on_miss(seq, ctx);
                        return Ok(());
                    };
                    ctx.anims.play(user, "run");
                    seq.move_to(
                        ctx,
                        user,
                        approach_point(target_pos),
                        self.hammer.approach,
                        Ease::QuadOut,
                    );
                }
                1 => {
                    // The wind-up runs as long as its animation does;
                    // speed-adjusted raises stretch or shrink this step.
                    ctx.anims.play(user, "hammer_raise");
                    seq.wait_for_animation(user, "hammer_raise");
                    seq.change_branch(SequenceBranch::Main);
                }
                _ => return Err(SequenceError::UnhandledStep { branch, step }),
            },

            SequenceBranch::Main => match step {
                0 => {
                    if self.primary_target(seq, ctx).is_none() {
                        self.on_miss(seq, ctx);
                        return Ok(());
                    }
                    seq.start_action_command(
                        Box::new(HoldBar::new(
                            Buttons::A,
                            self.hammer.fill_time,
                            self.hammer.zone_start,
                            self.hammer.zone_end,
                        )),
                        Some(self.hammer.command_timeout),
                    );
                }
                _ => return Err(SequenceError::UnhandledStep { branch, step }),
            },

            SequenceBranch::Success => match step {
                0 => {
                    ctx.anims.play(user, "hammer_slam");
                    // Command success doubles (or more) the damage.
                    let amount = self.spec.base_damage * self.hammer.success_multiplier;
                    self.strike(amount, seq, ctx);
                    let at = ctx
                        .state
                        .actor(user)
                        .map(|a| a.position)
                        .unwrap_or(Vec2::ZERO);
                    ctx.vfx.spawn(VfxRequest {
                        kind: VfxKind::RankBadge(seq.best_rank()),
                        at,
                    });
                    if let Some(stylish) = self.hammer.stylish_first {
                        seq.offer_stylish(0, stylish.button, stylish.lead, stylish.duration);
                    }
                    seq.wait(self.hammer.slam_wait);
                }
                1 => {
                    if let Some(stylish) = self.hammer.stylish_second {
                        seq.offer_stylish(1, stylish.button, stylish.lead, stylish.duration);
                    }
                    seq.change_branch(SequenceBranch::End);
                }
                _ => return Err(SequenceError::UnhandledStep { branch, step }),
            },

            SequenceBranch::Failed => match step {
                0 => {
                    // The swing still lands, at base damage only.
                    ctx.anims.play(user, "hammer_slam");
                    self.strike(self.spec.base_damage, seq, ctx);
                    seq.wait(self.hammer.slam_wait);
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
                    seq.wait(self.hammer.miss_wait);
                    seq.change_branch(SequenceBranch::End);
                }
                _ => return Err(SequenceError::UnhandledStep { branch, step }),
            },

            SequenceBranch::End => match step {
                0 => {
                    let home = ctx
                        .state
                        .actor(user)
                        .map(|a| a.home)
                        .unwrap_or(Vec2::ZERO);
                    ctx.anims.play(user, "run");
                    seq.move_to(ctx, user, home, self.hammer.return_time, Ease::QuadInOut);
                }
                1 => {
                    ctx.anims.play(user, "idle");
                    seq.end_sequence();
                }
                _ => return Err(SequenceError::UnhandledStep { branch, step }),
            },

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
        let (anim, spec) = match index {
            0 => ("hammer_twirl", self.hammer.stylish_first),
            1 => ("backflip", self.hammer.stylish_second),
            _ => return Err(SequenceError::UnhandledStylishStep { index, step }),
        };
        let Some(stylish) = spec else {
            return Err(SequenceError::UnhandledStylishStep { index, step });
        };
        flourish_interlude(index, step, anim, stylish.flourish, seq, ctx)
    }
}
