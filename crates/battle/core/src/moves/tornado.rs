//! Tornado Jump: a stomp phase, then a button-series spin that sweeps
//! every airborne enemy.
//!
//! The second phase demonstrates multi-response commands: each correct
//! press arrives through `on_command_response` while the series is still
//! running.

use crate::clock::Millis;
use crate::combat::{DamageProperties, Element};
use crate::command::{ButtonSeries, CommandResponse, TimedPress};
use crate::ease::Ease;
use crate::env::{BattleContext, VfxKind, VfxRequest};
use crate::input::Buttons;
use crate::moves::{MoveKind, MoveSpec, TornadoSpec, approach_point, leap_point, spend_fp};
use crate::sequence::{MoveScript, SequenceBranch, SequenceCore, SequenceError};
use crate::state::{EntityFlags, EntityId, Vec2};

/// Which command the script is currently listening for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TornadoPhase {
    Leap,
    Spin,
}

pub struct TornadoJumpScript {
    spec: MoveSpec,
    tornado: TornadoSpec,
    phase: TornadoPhase,
}

impl TornadoJumpScript {
    pub fn new(spec: MoveSpec, tornado: TornadoSpec) -> Self {
        Self {
            spec,
            tornado,
            phase: TornadoPhase::Leap,
        }
    }

    fn grounded_target(
        &self,
        seq: &SequenceCore,
        ctx: &BattleContext<'_>,
    ) -> Option<(EntityId, Vec2)> {
        let id = seq.primary_target()?;
        let actor = ctx.state.actor(id)?;
        if !actor.is_targetable() || actor.flags.contains(EntityFlags::FLYING) {
            return None;
        }
        Some((id, actor.position))
    }

    fn airborne_enemies(&self, seq: &SequenceCore, ctx: &BattleContext<'_>) -> Vec<EntityId> {
        ctx.state
            .living()
            .filter(|a| a.id != seq.user() && a.flags.contains(EntityFlags::FLYING))
            .map(|a| a.id)
            .collect()
    }
}

impl MoveScript for TornadoJumpScript {
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
                    let Some((_, target_pos)) = self.grounded_target(seq, ctx) else {
                        self.on_miss(seq, ctx);
                        return Ok(());
                    };
                    ctx.anims.play(user, "run");
                    seq.move_to(
                        ctx,
                        user,
                        approach_point(target_pos),
                        self.tornado.approach,
                        Ease::QuadOut,
                    );
                }
                1 => {
                    ctx.anims.play(user, "crouch");
                    seq.wait(self.tornado.crouch);
                    seq.change_branch(SequenceBranch::Main);
                }
                _ => return Err(SequenceError::UnhandledStep { branch, step }),
            },

            SequenceBranch::Main => match step {
                0 => {
                    let Some((_, target_pos)) = self.grounded_target(seq, ctx) else {
                        self.on_miss(seq, ctx);
                        return Ok(());
                    };
                    let close = self.tornado.leap;
                    let open = Millis::new((close - self.tornado.press_window).0.max(0.0));
                    seq.arm_command(Box::new(TimedPress::new(Buttons::A, open, close)));
                    ctx.anims.play(user, "leap");
                    seq.move_to(
                        ctx,
                        user,
                        leap_point(target_pos),
                        self.tornado.leap,
                        Ease::QuadOut,
                    );
                }
                1 => {
                    seq.wait_for_command(Some(self.tornado.leap));
                }
                _ => return Err(SequenceError::UnhandledStep { branch, step }),
            },

            SequenceBranch::Success => match step {
                0 => {
                    ctx.anims.play(user, "stomp");
                    if let Some(target) = seq.primary_target() {
                        let results = seq.attempt_damage(
                            ctx,
                            self.spec.base_damage,
                            &[target],
                            self.spec.element,
                            DamageProperties::CONTACT,
                            false,
                        );
                        if results.iter().any(|r| r.was_attacker_hit) {
                            self.on_interruption(Element::Sharp, seq, ctx);
                            return Ok(());
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
                    }
                    seq.wait(self.tornado.land_wait);
                }
                1 => {
                    // Second phase: spin up and prompt the series.
                    self.phase = TornadoPhase::Spin;
                    ctx.anims.play(user, "spin");
                    seq.start_action_command(
                        Box::new(ButtonSeries::new(
                            &self.tornado.prompts,
                            self.tornado.series_time,
                        )),
                        Some(self.tornado.series_time + Millis::new(250.0)),
                    );
                }
                _ => return Err(SequenceError::UnhandledStep { branch, step }),
            },

            SequenceBranch::Failed => match step {
                0 => {
                    ctx.anims.play(user, "stomp_weak");
                    if let Some(target) = seq.primary_target() {
                        let results = seq.attempt_damage(
                            ctx,
                            self.spec.base_damage,
                            &[target],
                            self.spec.element,
                            DamageProperties::CONTACT,
                            false,
                        );
                        if results.iter().any(|r| r.was_attacker_hit) {
                            self.on_interruption(Element::Sharp, seq, ctx);
                            return Ok(());
                        }
                    }
                    seq.wait(self.tornado.recoil_wait);
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
                    seq.wait(self.tornado.miss_wait);
                    seq.change_branch(SequenceBranch::End);
                }
                _ => return Err(SequenceError::UnhandledStep { branch, step }),
            },

            SequenceBranch::End => {
                let interrupted = seq.interruption().is_some();
                match (interrupted, step) {
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
                        seq.move_to(ctx, user, home, self.tornado.return_time, Ease::QuadInOut);
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

    fn on_command_success(&mut self, seq: &mut SequenceCore, ctx: &mut BattleContext<'_>) {
        match self.phase {
            TornadoPhase::Leap => seq.change_branch(SequenceBranch::Success),
            TornadoPhase::Spin => {
                // Full series: the whirlwind sweeps every airborne enemy.
                let airborne = self.airborne_enemies(seq, ctx);
                let results = seq.attempt_damage(
                    ctx,
                    self.tornado.spin_damage,
                    &airborne,
                    self.spec.element,
                    DamageProperties::AERIAL_ONLY,
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
                let at = ctx
                    .state
                    .actor(seq.user())
                    .map(|a| a.position)
                    .unwrap_or(Vec2::ZERO);
                ctx.vfx.spawn(VfxRequest {
                    kind: VfxKind::RankBadge(seq.best_rank()),
                    at,
                });
                seq.change_branch(SequenceBranch::End);
            }
        }
    }

    fn on_command_failed(&mut self, seq: &mut SequenceCore, _ctx: &mut BattleContext<'_>) {
        match self.phase {
            TornadoPhase::Leap => seq.change_branch(SequenceBranch::Failed),
            // A broken series just skips the sweep; the stomp already
            // landed.
            TornadoPhase::Spin => seq.change_branch(SequenceBranch::End),
        }
    }

    fn on_command_response(
        &mut self,
        _response: CommandResponse,
        seq: &mut SequenceCore,
        ctx: &mut BattleContext<'_>,
    ) {
        if self.phase == TornadoPhase::Spin {
            // Each press tightens the spin.
            ctx.anims.play(seq.user(), "spin");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::TargetSet;
    use crate::moves::{FamilySpec, TargetMode};
    use crate::sequence::{Sequence, SequenceBranch};
    use crate::state::ActorState;
    use crate::testutil::TestHarness;

    const USER: EntityId = EntityId(0);
    const GROUNDED: EntityId = EntityId(2);
    const FLYER: EntityId = EntityId(3);

    fn tornado_spec() -> (MoveSpec, TornadoSpec) {
        let tornado = TornadoSpec {
            approach: Millis::new(100.0),
            crouch: Millis::new(50.0),
            leap: Millis::new(100.0),
            press_window: Millis::new(50.0),
            land_wait: Millis::new(50.0),
            prompts: vec![Buttons::A, Buttons::B],
            series_time: Millis::new(1000.0),
            spin_damage: 2,
            recoil_wait: Millis::new(50.0),
            miss_wait: Millis::new(50.0),
            return_time: Millis::new(100.0),
        };
        let spec = MoveSpec {
            kind: MoveKind::TornadoJump,
            name: "Tornado Jump".into(),
            fp_cost: 3,
            base_damage: 2,
            target_mode: TargetMode::Single,
            element: Element::Normal,
            family: FamilySpec::TornadoJump(tornado.clone()),
        };
        (spec, tornado)
    }

    fn harness() -> TestHarness {
        let mut h = TestHarness::default();
        h.state
            .insert(ActorState::new(USER, Vec2::ZERO, 10).with_fp(5));
        h.state
            .insert(ActorState::new(GROUNDED, Vec2::new(120.0, 0.0), 20));
        h.state.insert(
            ActorState::new(FLYER, Vec2::new(180.0, 40.0), 20).with_flags(EntityFlags::FLYING),
        );
        h
    }

    fn run_idle(seq: &mut Sequence, h: &mut TestHarness) {
        let mut ticks = 0;
        while !seq.is_finished() && !seq.is_halted() {
            assert!(ticks < 1000, "sequence did not finish");
            seq.update(Millis::new(25.0), &crate::input::InputFrame::IDLE, &mut h.ctx());
            ticks += 1;
        }
    }

    #[test]
    fn auto_success_runs_both_phases() {
        let (spec, tornado) = tornado_spec();
        let mut h = harness();
        let script = Box::new(TornadoJumpScript::new(spec, tornado));
        let targets: TargetSet = [GROUNDED].into_iter().collect();
        let mut seq = Sequence::new(script, USER, targets, false);
        seq.start(&mut h.ctx());
        run_idle(&mut seq, &mut h);

        // Stomp on the grounded target, whirlwind on the flyer.
        assert_eq!(h.state.actor(GROUNDED).unwrap().hp.current, 18);
        assert_eq!(h.state.actor(FLYER).unwrap().hp.current, 18);
        assert_eq!(h.scheduler.completed, vec![USER]);
    }

    #[test]
    fn full_series_sweeps_airborne_enemies() {
        let (spec, tornado) = tornado_spec();
        let mut h = harness();
        let script = Box::new(TornadoJumpScript::new(spec, tornado));
        let targets: TargetSet = [GROUNDED].into_iter().collect();
        let mut seq = Sequence::new(script, USER, targets, true);
        seq.start(&mut h.ctx());

        // Ride into Main, where the leap command arms.
        let mut guard = 0;
        while seq.branch() != SequenceBranch::Main {
            seq.update(Millis::new(25.0), &crate::input::InputFrame::IDLE, &mut h.ctx());
            guard += 1;
            assert!(guard < 100);
        }
        // Land the press exactly on the window's opening edge.
        seq.update(Millis::new(25.0), &crate::input::InputFrame::IDLE, &mut h.ctx());
        seq.update(
            Millis::new(25.0),
            &crate::input::InputFrame::press(Buttons::A),
            &mut h.ctx(),
        );

        // Ride out the arc until the stomp lands.
        guard = 0;
        while h.state.actor(GROUNDED).unwrap().hp.current == 20 {
            seq.update(Millis::new(25.0), &crate::input::InputFrame::IDLE, &mut h.ctx());
            guard += 1;
            assert!(guard < 100);
        }

        // Land wait, then the series arms; answer both prompts.
        seq.update(Millis::new(25.0), &crate::input::InputFrame::IDLE, &mut h.ctx());
        seq.update(Millis::new(25.0), &crate::input::InputFrame::IDLE, &mut h.ctx());
        seq.update(
            Millis::new(25.0),
            &crate::input::InputFrame::press(Buttons::A),
            &mut h.ctx(),
        );
        seq.update(
            Millis::new(25.0),
            &crate::input::InputFrame::press(Buttons::B),
            &mut h.ctx(),
        );
        run_idle(&mut seq, &mut h);

        assert_eq!(h.state.actor(GROUNDED).unwrap().hp.current, 18);
        assert_eq!(h.state.actor(FLYER).unwrap().hp.current, 18);
    }

    #[test]
    fn broken_series_skips_the_sweep() {
        let (spec, tornado) = tornado_spec();
        let mut h = harness();
        let script = Box::new(TornadoJumpScript::new(spec, tornado));
        let targets: TargetSet = [GROUNDED].into_iter().collect();
        let mut seq = Sequence::new(script, USER, targets, true);
        seq.start(&mut h.ctx());

        let mut guard = 0;
        while seq.branch() != SequenceBranch::Main {
            seq.update(Millis::new(25.0), &crate::input::InputFrame::IDLE, &mut h.ctx());
            guard += 1;
            assert!(guard < 100);
        }
        seq.update(Millis::new(25.0), &crate::input::InputFrame::IDLE, &mut h.ctx());
        seq.update(
            Millis::new(25.0),
            &crate::input::InputFrame::press(Buttons::A),
            &mut h.ctx(),
        );
        guard = 0;
        while h.state.actor(GROUNDED).unwrap().hp.current == 20 {
            seq.update(Millis::new(25.0), &crate::input::InputFrame::IDLE, &mut h.ctx());
            guard += 1;
            assert!(guard < 100);
        }
        seq.update(Millis::new(25.0), &crate::input::InputFrame::IDLE, &mut h.ctx());
        seq.update(Millis::new(25.0), &crate::input::InputFrame::IDLE, &mut h.ctx());
        // Wrong button: the series breaks and only the stomp connects.
        seq.update(
            Millis::new(25.0),
            &crate::input::InputFrame::press(Buttons::B),
            &mut h.ctx(),
        );
        run_idle(&mut seq, &mut h);

        assert_eq!(h.state.actor(GROUNDED).unwrap().hp.current, 18);
        assert_eq!(h.state.actor(FLYER).unwrap().hp.current, 20);
    }
}
