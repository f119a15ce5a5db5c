//! The branching step state machine driving one move execution.
//!
//! A [`Sequence`] owns the acting entity's handle, the resolved target
//! set, and a boxed [`MoveScript`] supplying per-move behavior. Each
//! scheduler tick pumps at most one in-flight [`SequenceAction`] and
//! performs at most one branch-step dispatch; transitions are
//! edge-triggered on tick boundaries so every animation or VFX side
//! effect gets at least one frame before the next step can fire.

mod action;
mod branch;
mod script;
mod stylish;

pub use action::{ActionProgress, SequenceAction};
pub use branch::SequenceBranch;
pub use script::{MoveScript, SequenceError};
pub use stylish::{StylishData, StylishHandle, StylishState, StylishWindow, WindowPoll};

use tracing::{debug, error, trace};

use crate::clock::Millis;
use crate::combat::{
    DamageProperties, DamageRequest, Element, InteractionResult, TargetSet,
};
use crate::command::{ActionCommand, CommandEvent, CommandOutcome, CommandRank};
use crate::ease::Ease;
use crate::env::BattleContext;
use crate::input::{Buttons, InputFrame};
use crate::state::{EntityId, MotionPath, Vec2};

/// Rank synthesized when a command-less entity auto-succeeds.
const AUTO_SUCCESS_RANK: CommandRank = CommandRank::Nice;

/// Mutable state of one executing move, exposed to its script.
///
/// Scripts receive `&mut SequenceCore` in every hook and use it to set
/// the next action, queue branch changes, arm commands, deal damage, and
/// open stylish windows.
pub struct SequenceCore {
    user: EntityId,
    targets: TargetSet,
    branch: SequenceBranch,
    step: u32,
    /// Set by branch changes; consumed by the dispatcher to decide
    /// whether to advance the step counter.
    branch_changed: bool,
    cur_action: Option<SequenceAction>,

    command: Option<Box<dyn ActionCommand>>,
    command_enabled: bool,
    /// Auto-success queued because the command system is disabled.
    pending_auto: bool,
    /// The armed command has reported its terminal outcome.
    command_resolved: bool,
    /// A jump-branch fired while a pump held the command boxed out.
    command_aborted: bool,
    best_rank: CommandRank,

    stylish_window: Option<StylishWindow>,
    stylish: Option<StylishState>,
    /// Finished indicator cells, kept alive until the sequence is dropped
    /// so weak observers can still read the terminal state.
    retired_stylish: Vec<std::rc::Rc<std::cell::RefCell<StylishData>>>,

    interruption: Option<Element>,
    end_requested: bool,
    finished: bool,
    halted: bool,
}

impl SequenceCore {
    fn new(user: EntityId, targets: TargetSet, command_enabled: bool) -> Self {
        Self {
            user,
            targets,
            branch: SequenceBranch::Start,
            step: 0,
            branch_changed: false,
            cur_action: None,
            command: None,
            command_enabled,
            pending_auto: false,
            command_resolved: false,
            command_aborted: false,
            best_rank: CommandRank::Fail,
            stylish_window: None,
            stylish: None,
            retired_stylish: Vec::new(),
            interruption: None,
            end_requested: false,
            finished: false,
            halted: false,
        }
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn user(&self) -> EntityId {
        self.user
    }

    pub fn targets(&self) -> &[EntityId] {
        &self.targets
    }

    /// The front target, when one is still listed.
    pub fn primary_target(&self) -> Option<EntityId> {
        self.targets.first().copied()
    }

    pub fn branch(&self) -> SequenceBranch {
        self.branch
    }

    /// Branch-local step index of the next dispatch.
    pub fn step(&self) -> u32 {
        self.step
    }

    pub fn command_enabled(&self) -> bool {
        self.command_enabled
    }

    /// Best rank achieved by any command this execution.
    pub fn best_rank(&self) -> CommandRank {
        self.best_rank
    }

    pub fn has_pending_action(&self) -> bool {
        self.cur_action.is_some()
    }

    pub fn interruption(&self) -> Option<Element> {
        self.interruption
    }

    fn is_active(&self) -> bool {
        !self.finished && !self.halted
    }

    fn is_alive(&self) -> bool {
        self.is_active() && !self.end_requested
    }

    // ------------------------------------------------------------------
    // Branch control
    // ------------------------------------------------------------------

    /// Queues a branch change: the new branch's step 0 runs at the next
    /// dispatch, never within the current one. Resets the step counter.
    /// An in-flight action keeps running to completion.
    ///
    /// While a stylish interlude is running, a primary-branch change
    /// retargets the interlude's saved return point instead of clobbering
    /// the Stylish branch.
    pub fn change_branch(&mut self, branch: SequenceBranch) {
        if self.branch == SequenceBranch::Stylish
            && let Some(stylish) = self.stylish.as_mut()
        {
            trace!(to = %branch, "branch change deferred behind stylish interlude");
            stylish.return_branch = branch;
            stylish.return_step = 0;
            return;
        }
        trace!(from = %self.branch, to = %branch, "branch change");
        self.branch = branch;
        self.step = 0;
        self.branch_changed = true;
    }

    /// The only synchronous transition path: aborts the in-flight action
    /// and armed command, then switches branch immediately.
    ///
    /// Reserved for the miss/interruption protocol: call sites are the
    /// `on_miss` and `on_interruption` hooks, never ordinary branch-step
    /// logic.
    pub fn jump_branch(&mut self, branch: SequenceBranch) {
        debug!(from = %self.branch, to = %branch, "jump branch");
        self.cur_action = None;
        if let Some(mut command) = self.command.take() {
            command.cancel();
        }
        self.command_aborted = true;
        self.pending_auto = false;
        self.retire_stylish();
        self.branch = branch;
        self.step = 0;
        self.branch_changed = true;
    }

    /// Records why the move was interrupted, for End-branch overrides.
    pub fn record_interruption(&mut self, element: Element) {
        self.interruption = Some(element);
    }

    /// Requests the terminal protocol: `on_end`, cleanup, and the single
    /// action-complete signal run before control returns to the driver.
    /// Safe to call from any branch or step; idempotent.
    pub fn end_sequence(&mut self) {
        self.end_requested = true;
    }

    // ------------------------------------------------------------------
    // Action constructors
    // ------------------------------------------------------------------

    fn set_action(&mut self, action: SequenceAction) {
        debug_assert!(
            self.cur_action.is_none(),
            "a sequence waits on at most one action"
        );
        self.cur_action = Some(action);
    }

    /// Waits for a fixed duration.
    pub fn wait(&mut self, duration: Millis) {
        self.set_action(SequenceAction::Wait {
            duration,
            elapsed: Millis::ZERO,
        });
    }

    /// Eases `entity` to an absolute position over `duration`.
    pub fn move_to(
        &mut self,
        ctx: &mut BattleContext<'_>,
        entity: EntityId,
        to: Vec2,
        duration: Millis,
        ease: Ease,
    ) {
        let from = ctx
            .state
            .actor(entity)
            .map(|a| a.position)
            .unwrap_or(to);
        self.set_action(SequenceAction::Move {
            entity,
            path: MotionPath {
                from,
                to,
                duration,
                ease,
            },
            elapsed: Millis::ZERO,
        });
    }

    /// Eases `entity` by a relative offset from where it stands now.
    pub fn move_by(
        &mut self,
        ctx: &mut BattleContext<'_>,
        entity: EntityId,
        delta: Vec2,
        duration: Millis,
        ease: Ease,
    ) {
        let from = ctx
            .state
            .actor(entity)
            .map(|a| a.position)
            .unwrap_or(Vec2::ZERO);
        self.set_action(SequenceAction::Move {
            entity,
            path: MotionPath {
                from,
                to: from.add(delta),
                duration,
                ease,
            },
            elapsed: Millis::ZERO,
        });
    }

    /// Waits until the named animation reports finished.
    pub fn wait_for_animation(&mut self, entity: EntityId, key: impl Into<String>) {
        self.set_action(SequenceAction::WaitForAnimation {
            entity,
            key: key.into(),
        });
    }

    // ------------------------------------------------------------------
    // Command control
    // ------------------------------------------------------------------

    /// Arms a command without blocking on it, so movement can run under
    /// the input window. With the command system disabled, queues the
    /// deterministic auto-success instead.
    pub fn arm_command(&mut self, mut command: Box<dyn ActionCommand>) {
        self.command_resolved = false;
        if self.command_enabled {
            command.start();
            self.command = Some(command);
        } else {
            self.pending_auto = true;
        }
    }

    /// Blocks on the armed command: done when it resolves or `timeout`
    /// elapses (a timeout is routed as a failure, not an error).
    pub fn wait_for_command(&mut self, timeout: Option<Millis>) {
        self.set_action(SequenceAction::WaitForCommand {
            timeout,
            elapsed: Millis::ZERO,
            enabled: self.command_enabled,
        });
    }

    /// Arms a command and immediately blocks on it. The classic shape:
    /// the branch step does nothing else until the skill check resolves.
    pub fn start_action_command(
        &mut self,
        command: Box<dyn ActionCommand>,
        timeout: Option<Millis>,
    ) {
        self.arm_command(command);
        self.wait_for_command(timeout);
    }

    fn resolve_command(&mut self, outcome: CommandOutcome) {
        self.command_resolved = true;
        self.best_rank = self.best_rank.max(outcome.rank());
    }

    // ------------------------------------------------------------------
    // Damage
    // ------------------------------------------------------------------

    /// Submits a damage attempt against `targets`, skipping entities that
    /// have already left the battle. Returns the resolver's per-target
    /// interaction results.
    pub fn attempt_damage(
        &mut self,
        ctx: &mut BattleContext<'_>,
        amount: u32,
        targets: &[EntityId],
        element: Element,
        properties: DamageProperties,
        is_total: bool,
    ) -> Vec<InteractionResult> {
        let valid: TargetSet = targets
            .iter()
            .copied()
            .filter(|&id| {
                let present = ctx.state.actor(id).is_some_and(|a| a.is_targetable());
                if !present {
                    trace!(target = %id, "target gone, skipping damage");
                }
                present
            })
            .collect();

        if valid.is_empty() {
            return targets.iter().map(|_| InteractionResult::skipped()).collect();
        }

        let request = DamageRequest {
            attacker: self.user,
            targets: valid,
            amount,
            element,
            properties,
            is_total,
        };
        ctx.damage.attempt_damage(&request, ctx.state)
    }

    // ------------------------------------------------------------------
    // Stylish protocol
    // ------------------------------------------------------------------

    /// Opens a bonus-input window layered over the current branch.
    /// Returns the indicator handle for the VFX layer.
    pub fn offer_stylish(
        &mut self,
        index: u32,
        button: Buttons,
        lead: Millis,
        duration: Millis,
    ) -> StylishHandle {
        debug_assert!(
            self.branch.allows_stylish(),
            "stylish windows open from Main or Success only"
        );
        // A newer offer supersedes an unhit earlier one.
        if let Some(mut previous) = self.stylish_window.take() {
            previous.abandon();
            self.retired_stylish.push(previous.data_cell());
        }
        let window = StylishWindow::new(index, button, lead, duration);
        let handle = window.handle();
        self.stylish_window = Some(window);
        handle
    }

    /// Diverts into the stylish interlude `index`, saving the branch and
    /// step to resume at once the interlude completes.
    pub fn begin_stylish(&mut self, index: u32) {
        let data = match self.stylish_window.take() {
            Some(window) => window.data_cell(),
            None => return,
        };
        self.stylish = Some(StylishState {
            index,
            step: 0,
            return_branch: self.branch,
            return_step: self.step,
            data,
        });
        self.branch = SequenceBranch::Stylish;
        self.branch_changed = true;
    }

    /// Ends the interlude and returns control to the saved branch/step.
    pub fn finish_stylish(&mut self) {
        let Some(state) = self.stylish.take() else {
            return;
        };
        state.data.borrow_mut().finished = true;
        self.branch = state.return_branch;
        self.step = state.return_step;
        self.branch_changed = true;
        self.retired_stylish.push(state.data);
    }

    /// Weak view of the active stylish indicator, if any.
    pub fn stylish_indicator(&self) -> Option<StylishHandle> {
        if let Some(window) = &self.stylish_window {
            return Some(window.handle());
        }
        self.stylish
            .as_ref()
            .map(|s| std::rc::Rc::downgrade(&s.data))
    }

    // ------------------------------------------------------------------
    // Cleanup
    // ------------------------------------------------------------------

    /// Marks any stylish state finished and keeps the cells alive for
    /// weak observers.
    fn retire_stylish(&mut self) {
        if let Some(mut window) = self.stylish_window.take() {
            window.abandon();
            self.retired_stylish.push(window.data_cell());
        }
        if let Some(state) = self.stylish.take() {
            state.data.borrow_mut().finished = true;
            self.retired_stylish.push(state.data);
        }
    }

    fn cleanup(&mut self) {
        self.cur_action = None;
        if let Some(mut command) = self.command.take() {
            command.cancel();
        }
        self.pending_auto = false;
        self.retire_stylish();
        self.targets.clear();
    }
}

/// One executing move: the state machine plus its per-move script.
pub struct Sequence {
    script: Box<dyn MoveScript>,
    core: SequenceCore,
}

impl Sequence {
    /// Builds a sequence over an already-resolved target set. Targeting
    /// ("Single"/"First"/"All") is locked by the caller before this.
    pub fn new(
        script: Box<dyn MoveScript>,
        user: EntityId,
        targets: TargetSet,
        command_enabled: bool,
    ) -> Self {
        Self {
            script,
            core: SequenceCore::new(user, targets, command_enabled),
        }
    }

    // ------------------------------------------------------------------
    // Read-only queries for rendering collaborators
    // ------------------------------------------------------------------

    pub fn user(&self) -> EntityId {
        self.core.user()
    }

    pub fn branch(&self) -> SequenceBranch {
        self.core.branch()
    }

    pub fn step(&self) -> u32 {
        self.core.step()
    }

    pub fn best_rank(&self) -> CommandRank {
        self.core.best_rank()
    }

    pub fn stylish_indicator(&self) -> Option<StylishHandle> {
        self.core.stylish_indicator()
    }

    pub fn has_pending_action(&self) -> bool {
        self.core.has_pending_action()
    }

    pub fn is_finished(&self) -> bool {
        self.core.finished
    }

    /// Halted on an authoring error; inspectable but inert.
    pub fn is_halted(&self) -> bool {
        self.core.halted
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Begins execution: Start branch, step 0, with the first step
    /// evaluated synchronously so the move starts animating the same
    /// frame it was confirmed.
    pub fn start(&mut self, ctx: &mut BattleContext<'_>) {
        let Self { script, core } = self;
        debug!(kind = %script.kind(), user = %core.user, "sequence start");
        core.branch = SequenceBranch::Start;
        core.step = 0;
        script.on_start(core, ctx);
        if core.is_alive() {
            Self::dispatch(script.as_mut(), core, ctx);
        }
        Self::finalize(script.as_mut(), core, ctx);
    }

    /// One scheduler tick.
    pub fn update(&mut self, dt: Millis, input: &InputFrame, ctx: &mut BattleContext<'_>) {
        if !self.core.is_active() {
            return;
        }
        let Self { script, core } = self;

        Self::pump_stylish(script.as_mut(), core, ctx, dt, input);
        Self::pump_command(script.as_mut(), core, ctx, dt, input);

        let mut ready = true;
        if let Some(mut action) = core.cur_action.take() {
            match action.pump(dt, ctx, core.command_resolved) {
                ActionProgress::Pending => {
                    core.cur_action = Some(action);
                    ready = false;
                }
                ActionProgress::Done => {}
                ActionProgress::TimedOut => {
                    // Deadline with the command unresolved: failure, not
                    // an error state.
                    if let Some(mut command) = core.command.take() {
                        command.cancel();
                    }
                    core.resolve_command(CommandOutcome::Failure);
                    script.on_command_failed(core, ctx);
                }
            }
        }

        if ready && core.is_alive() {
            Self::dispatch(script.as_mut(), core, ctx);
        }
        Self::finalize(script.as_mut(), core, ctx);
    }

    /// External abort: the attacker was pre-empted or contact resolved
    /// against it. Routes through the script's interruption hook.
    pub fn interrupt(&mut self, element: Element, ctx: &mut BattleContext<'_>) {
        if !self.core.is_active() {
            return;
        }
        let Self { script, core } = self;
        debug!(user = %core.user, %element, "sequence interrupted");
        script.on_interruption(element, core, ctx);
        Self::finalize(script.as_mut(), core, ctx);
    }

    /// External cancellation straight to the terminal protocol.
    pub fn end(&mut self, ctx: &mut BattleContext<'_>) {
        let Self { script, core } = self;
        core.end_sequence();
        Self::finalize(script.as_mut(), core, ctx);
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn pump_stylish(
        script: &mut dyn MoveScript,
        core: &mut SequenceCore,
        ctx: &mut BattleContext<'_>,
        dt: Millis,
        input: &InputFrame,
    ) {
        let (poll, index) = match core.stylish_window.as_mut() {
            Some(window) => {
                let index = window.index;
                (window.poll(dt, input), index)
            }
            None => return,
        };
        match poll {
            WindowPoll::Open => {}
            WindowPoll::Expired => {
                if let Some(window) = core.stylish_window.take() {
                    core.retired_stylish.push(window.data_cell());
                }
            }
            WindowPoll::Hit => {
                debug!(index, "stylish window hit");
                script.handle_stylish(index, core, ctx);
            }
        }
    }

    fn pump_command(
        script: &mut dyn MoveScript,
        core: &mut SequenceCore,
        ctx: &mut BattleContext<'_>,
        dt: Millis,
        input: &InputFrame,
    ) {
        if core.pending_auto {
            core.pending_auto = false;
            core.resolve_command(CommandOutcome::Success(AUTO_SUCCESS_RANK));
            script.on_command_success(core, ctx);
            return;
        }

        core.command_aborted = false;
        let Some(mut command) = core.command.take() else {
            return;
        };
        if !command.accepting_input() {
            core.command = Some(command);
            return;
        }

        let mut events = Vec::new();
        command.update(dt, input, &mut events);

        let mut terminal = None;
        for event in events {
            match event {
                CommandEvent::Response(response) => {
                    script.on_command_response(response, core, ctx);
                }
                CommandEvent::Finished(outcome) => terminal = Some(outcome),
            }
        }

        match terminal {
            Some(outcome) => {
                core.resolve_command(outcome);
                match outcome {
                    CommandOutcome::Success(_) => script.on_command_success(core, ctx),
                    CommandOutcome::Failure => script.on_command_failed(core, ctx),
                }
            }
            None => {
                // A hook may have jump-branched while we held the box.
                if core.command_aborted {
                    command.cancel();
                } else {
                    core.command = Some(command);
                }
            }
        }
    }

    /// Exactly one branch-step dispatch. Advances the step counter unless
    /// the step changed branch (branch changes reset it to 0).
    fn dispatch(
        script: &mut dyn MoveScript,
        core: &mut SequenceCore,
        ctx: &mut BattleContext<'_>,
    ) {
        core.branch_changed = false;
        let result = if core.branch == SequenceBranch::Stylish {
            let Some((index, step)) = core.stylish.as_ref().map(|s| (s.index, s.step)) else {
                error!("stylish branch with no interlude state, halting");
                core.halted = true;
                return;
            };
            script.stylish_step(index, step, core, ctx)
        } else {
            script.branch_step(core.branch, core.step, core, ctx)
        };

        match result {
            Ok(()) => {
                if !core.branch_changed && core.is_alive() {
                    if core.branch == SequenceBranch::Stylish {
                        if let Some(stylish) = core.stylish.as_mut() {
                            stylish.step += 1;
                        }
                    } else {
                        core.step += 1;
                    }
                }
            }
            Err(err) => {
                // Authoring bug: halt in place rather than loop or crash
                // the battle.
                error!(kind = %script.kind(), %err, "sequence halted");
                core.halted = true;
            }
        }
    }

    fn finalize(
        script: &mut dyn MoveScript,
        core: &mut SequenceCore,
        ctx: &mut BattleContext<'_>,
    ) {
        if core.end_requested && !core.finished {
            script.on_end(core, ctx);
            core.finished = true;
            core.cleanup();
            ctx.scheduler.action_complete(core.user);
            debug!(user = %core.user, "sequence complete");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::command::TimedPress;
    use crate::moves::MoveKind;
    use crate::state::{ActorState, EntityFlags};
    use crate::testutil::TestHarness;

    const USER: EntityId = EntityId(0);
    const FOE: EntityId = EntityId(7);

    #[derive(Default)]
    struct Probe {
        successes: u32,
        failures: u32,
        dispatched: Vec<(SequenceBranch, u32)>,
        stylish_steps: Vec<(u32, u32)>,
    }

    /// Minimal four-branch script: two Start steps, one Main step with a
    /// timed-press command, Success/Failed/Miss waits, two-step End.
    struct TestScript {
        probe: Rc<RefCell<Probe>>,
        /// Offer a stylish window in Success step 0.
        offer_window: bool,
        /// Simulate an unreachable target during Main.
        miss_in_main: bool,
        /// Author no Main steps at all, to exercise the halt path.
        unauthored_main: bool,
        /// Closing edge of the press window.
        command_close: Millis,
        command_timeout: Option<Millis>,
    }

    impl TestScript {
        fn new(probe: Rc<RefCell<Probe>>) -> Self {
            Self {
                probe,
                offer_window: false,
                miss_in_main: false,
                unauthored_main: false,
                command_close: Millis::new(300.0),
                command_timeout: Some(Millis::new(500.0)),
            }
        }
    }

    impl MoveScript for TestScript {
        fn kind(&self) -> MoveKind {
            MoveKind::Jump
        }

        fn branch_step(
            &mut self,
            branch: SequenceBranch,
            step: u32,
            seq: &mut SequenceCore,
            ctx: &mut BattleContext<'_>,
        ) -> Result<(), SequenceError> {
            self.probe.borrow_mut().dispatched.push((branch, step));
            match (branch, step) {
                (SequenceBranch::Start, 0) => seq.wait(Millis::new(100.0)),
                (SequenceBranch::Start, 1) => {
                    seq.wait(Millis::new(100.0));
                    seq.change_branch(SequenceBranch::Main);
                }
                (SequenceBranch::Main, 0) if !self.unauthored_main => {
                    if self.miss_in_main {
                        seq.wait(Millis::new(1000.0));
                        self.on_miss(seq, ctx);
                        return Ok(());
                    }
                    seq.start_action_command(
                        Box::new(TimedPress::new(Buttons::A, Millis::ZERO, self.command_close)),
                        self.command_timeout,
                    );
                }
                (SequenceBranch::Success, 0) => {
                    let targets: Vec<EntityId> = seq.targets().to_vec();
                    seq.attempt_damage(
                        ctx,
                        2,
                        &targets,
                        Element::Normal,
                        DamageProperties::empty(),
                        false,
                    );
                    if self.offer_window {
                        seq.offer_stylish(0, Buttons::B, Millis::ZERO, Millis::new(100.0));
                    }
                    seq.wait(Millis::new(50.0));
                    seq.change_branch(SequenceBranch::End);
                }
                (SequenceBranch::Failed, 0) | (SequenceBranch::Miss, 0) => {
                    seq.wait(Millis::new(50.0));
                    seq.change_branch(SequenceBranch::End);
                }
                (SequenceBranch::End, 0) => seq.wait(Millis::new(50.0)),
                (SequenceBranch::End, 1) => seq.end_sequence(),
                _ => return Err(SequenceError::UnhandledStep { branch, step }),
            }
            Ok(())
        }

        fn stylish_step(
            &mut self,
            index: u32,
            step: u32,
            seq: &mut SequenceCore,
            _ctx: &mut BattleContext<'_>,
        ) -> Result<(), SequenceError> {
            self.probe.borrow_mut().stylish_steps.push((index, step));
            match step {
                0 => seq.wait(Millis::new(30.0)),
                1 => seq.finish_stylish(),
                _ => return Err(SequenceError::UnhandledStylishStep { index, step }),
            }
            Ok(())
        }

        fn on_command_success(&mut self, seq: &mut SequenceCore, _ctx: &mut BattleContext<'_>) {
            self.probe.borrow_mut().successes += 1;
            seq.change_branch(SequenceBranch::Success);
        }

        fn on_command_failed(&mut self, seq: &mut SequenceCore, _ctx: &mut BattleContext<'_>) {
            self.probe.borrow_mut().failures += 1;
            seq.change_branch(SequenceBranch::Failed);
        }
    }

    fn harness() -> TestHarness {
        let mut h = TestHarness::default();
        h.state.insert(ActorState::new(USER, Vec2::ZERO, 10));
        h.state.insert(ActorState::new(FOE, Vec2::new(100.0, 0.0), 10));
        h
    }

    fn sequence(probe: &Rc<RefCell<Probe>>, command_enabled: bool) -> Sequence {
        let script = Box::new(TestScript::new(Rc::clone(probe)));
        let targets: TargetSet = [FOE].into_iter().collect();
        Sequence::new(script, USER, targets, command_enabled)
    }

    fn tick_until_finished(seq: &mut Sequence, h: &mut TestHarness, dt: f64) -> u32 {
        let mut ticks = 0;
        while !seq.is_finished() && !seq.is_halted() {
            assert!(ticks < 1000, "sequence did not finish");
            seq.update(Millis::new(dt), &InputFrame::IDLE, &mut h.ctx());
            ticks += 1;
        }
        ticks
    }

    #[test]
    fn pending_action_blocks_step_advance() {
        let probe = Rc::new(RefCell::new(Probe::default()));
        let mut h = harness();
        let mut seq = sequence(&probe, false);
        seq.start(&mut h.ctx());

        assert_eq!(probe.borrow().dispatched, vec![(SequenceBranch::Start, 0)]);
        assert_eq!(seq.step(), 1);
        assert!(seq.has_pending_action());

        for _ in 0..5 {
            seq.update(Millis::new(10.0), &InputFrame::IDLE, &mut h.ctx());
            assert_eq!(seq.step(), 1);
        }
        assert_eq!(probe.borrow().dispatched.len(), 1);
    }

    #[test]
    fn branch_change_resets_step() {
        let probe = Rc::new(RefCell::new(Probe::default()));
        let mut h = harness();
        let mut seq = sequence(&probe, false);
        seq.start(&mut h.ctx());

        // Finishes Start step 0's wait and dispatches step 1, which
        // changes branch.
        seq.update(Millis::new(100.0), &InputFrame::IDLE, &mut h.ctx());
        assert_eq!(seq.branch(), SequenceBranch::Main);
        assert_eq!(seq.step(), 0);
        // The branch change left the closing wait in flight.
        assert!(seq.has_pending_action());
    }

    #[test]
    fn disabled_command_auto_succeeds() {
        let probe = Rc::new(RefCell::new(Probe::default()));
        let mut h = harness();
        let mut seq = sequence(&probe, false);
        seq.start(&mut h.ctx());
        tick_until_finished(&mut seq, &mut h, 50.0);

        assert_eq!(probe.borrow().successes, 1);
        assert_eq!(probe.borrow().failures, 0);
        assert_eq!(seq.best_rank(), CommandRank::Nice);
        assert_eq!(h.scheduler.completed, vec![USER]);
    }

    #[test]
    fn end_sequence_is_idempotent() {
        let probe = Rc::new(RefCell::new(Probe::default()));
        let mut h = harness();
        let mut seq = sequence(&probe, false);
        seq.start(&mut h.ctx());

        seq.end(&mut h.ctx());
        seq.end(&mut h.ctx());
        assert!(seq.is_finished());
        assert_eq!(h.scheduler.completed, vec![USER]);

        // Updates after the end are inert.
        let dispatched = probe.borrow().dispatched.len();
        seq.update(Millis::new(100.0), &InputFrame::IDLE, &mut h.ctx());
        assert_eq!(probe.borrow().dispatched.len(), dispatched);
    }

    #[test]
    fn command_success_routes_through_success_branch() {
        let probe = Rc::new(RefCell::new(Probe::default()));
        let mut h = harness();
        let mut seq = sequence(&probe, true);
        seq.start(&mut h.ctx());

        // Two 100ms waits bring us into Main, which arms the command.
        seq.update(Millis::new(100.0), &InputFrame::IDLE, &mut h.ctx());
        seq.update(Millis::new(100.0), &InputFrame::IDLE, &mut h.ctx());
        assert_eq!(seq.branch(), SequenceBranch::Main);

        // Press inside the window: success resolves, the wrapping action
        // completes, and Success step 0 dispatches on the same tick.
        seq.update(Millis::new(10.0), &InputFrame::press(Buttons::A), &mut h.ctx());
        assert_eq!(probe.borrow().successes, 1);
        assert!(
            probe
                .borrow()
                .dispatched
                .contains(&(SequenceBranch::Success, 0))
        );
        assert!(seq.best_rank().is_success());
        assert_eq!(h.state.actor(FOE).unwrap().hp.current, 8);
    }

    #[test]
    fn command_timeout_routes_to_failed() {
        let probe = Rc::new(RefCell::new(Probe::default()));
        let mut h = harness();
        // Window far beyond the wrapper timeout: the command cannot
        // resolve on its own first.
        let script = Box::new(TestScript {
            command_close: Millis::new(10_000.0),
            command_timeout: Some(Millis::new(500.0)),
            ..TestScript::new(Rc::clone(&probe))
        });
        let targets: TargetSet = [FOE].into_iter().collect();
        let mut seq = Sequence::new(script, USER, targets, true);
        seq.start(&mut h.ctx());
        seq.update(Millis::new(100.0), &InputFrame::IDLE, &mut h.ctx());
        seq.update(Millis::new(100.0), &InputFrame::IDLE, &mut h.ctx());
        assert_eq!(seq.branch(), SequenceBranch::Main);

        // 501ms with no qualifying input: a timeout counts as failure.
        seq.update(Millis::new(501.0), &InputFrame::IDLE, &mut h.ctx());
        assert_eq!(probe.borrow().failures, 1);
        assert_eq!(probe.borrow().successes, 0);
        assert_eq!(seq.branch(), SequenceBranch::Failed);
        assert!(!seq.is_halted());
    }

    #[test]
    fn miss_jump_cancels_in_flight_action() {
        let probe = Rc::new(RefCell::new(Probe::default()));
        let mut h = harness();
        let script = Box::new(TestScript {
            miss_in_main: true,
            ..TestScript::new(Rc::clone(&probe))
        });
        let targets: TargetSet = [FOE].into_iter().collect();
        let mut seq = Sequence::new(script, USER, targets, true);
        seq.start(&mut h.ctx());
        seq.update(Millis::new(100.0), &InputFrame::IDLE, &mut h.ctx());

        // Main step 0 queued a long wait, then the miss jumped branches:
        // unlike change_branch, the jump drops the pending action.
        seq.update(Millis::new(100.0), &InputFrame::IDLE, &mut h.ctx());
        assert_eq!(seq.branch(), SequenceBranch::Miss);
        assert!(!seq.has_pending_action());

        // Success and Failed are never entered and the foe is untouched.
        tick_until_finished(&mut seq, &mut h, 50.0);
        let dispatched = probe.borrow().dispatched.clone();
        assert!(dispatched.contains(&(SequenceBranch::Miss, 0)));
        assert!(!dispatched.iter().any(|(b, _)| *b == SequenceBranch::Success));
        assert!(!dispatched.iter().any(|(b, _)| *b == SequenceBranch::Failed));
        assert_eq!(h.state.actor(FOE).unwrap().hp.current, 10);
    }

    #[test]
    fn unauthored_step_halts_without_finishing() {
        let probe = Rc::new(RefCell::new(Probe::default()));
        let mut h = harness();
        let script = Box::new(TestScript {
            unauthored_main: true,
            ..TestScript::new(Rc::clone(&probe))
        });
        let targets: TargetSet = [FOE].into_iter().collect();
        let mut seq = Sequence::new(script, USER, targets, false);
        seq.start(&mut h.ctx());
        seq.update(Millis::new(100.0), &InputFrame::IDLE, &mut h.ctx());
        seq.update(Millis::new(100.0), &InputFrame::IDLE, &mut h.ctx());

        assert!(seq.is_halted());
        assert!(!seq.is_finished());
        assert!(h.scheduler.completed.is_empty());

        // Halted means inert, not crashed.
        let dispatched = probe.borrow().dispatched.len();
        seq.update(Millis::new(100.0), &InputFrame::IDLE, &mut h.ctx());
        assert_eq!(probe.borrow().dispatched.len(), dispatched);
    }

    #[test]
    fn unhit_stylish_window_changes_nothing() {
        let run = |offer: bool| {
            let probe = Rc::new(RefCell::new(Probe::default()));
            let mut h = harness();
            let script = Box::new(TestScript {
                offer_window: offer,
                ..TestScript::new(Rc::clone(&probe))
            });
            let targets: TargetSet = [FOE].into_iter().collect();
            let mut seq = Sequence::new(script, USER, targets, false);
            seq.start(&mut h.ctx());
            let ticks = tick_until_finished(&mut seq, &mut h, 10.0);
            (ticks, h.state.actor(FOE).unwrap().hp.current)
        };

        assert_eq!(run(true), run(false));
    }

    #[test]
    fn stylish_hit_diverts_and_returns() {
        let probe = Rc::new(RefCell::new(Probe::default()));
        let mut h = harness();
        let script = Box::new(TestScript {
            offer_window: true,
            ..TestScript::new(Rc::clone(&probe))
        });
        let targets: TargetSet = [FOE].into_iter().collect();
        let mut seq = Sequence::new(script, USER, targets, false);
        seq.start(&mut h.ctx());

        // Reach Success step 0, which opens the window.
        let mut guard = 0;
        while !probe
            .borrow()
            .dispatched
            .contains(&(SequenceBranch::Success, 0))
        {
            seq.update(Millis::new(10.0), &InputFrame::IDLE, &mut h.ctx());
            guard += 1;
            assert!(guard < 100);
        }
        let indicator = seq.stylish_indicator().expect("window open");

        // Hit the bonus input inside the window.
        seq.update(Millis::new(10.0), &InputFrame::press(Buttons::B), &mut h.ctx());
        assert_eq!(seq.branch(), SequenceBranch::Stylish);

        tick_until_finished(&mut seq, &mut h, 10.0);
        assert_eq!(probe.borrow().stylish_steps, vec![(0, 0), (0, 1)]);
        // The interlude returned to the primary timeline and the move
        // completed exactly once.
        assert_eq!(h.scheduler.completed, vec![USER]);
        let cell = indicator.upgrade().expect("sequence still owns the data");
        assert!(cell.borrow().finished);
    }

    #[test]
    fn vanished_target_is_skipped_not_fatal() {
        let probe = Rc::new(RefCell::new(Probe::default()));
        let mut h = harness();
        let mut seq = sequence(&probe, false);
        seq.start(&mut h.ctx());

        // The foe flees mid-sequence.
        h.state.remove(FOE);
        tick_until_finished(&mut seq, &mut h, 50.0);
        assert!(seq.is_finished());
        assert_eq!(h.scheduler.completed, vec![USER]);
    }

    #[test]
    fn defeated_target_is_not_damaged_again() {
        let probe = Rc::new(RefCell::new(Probe::default()));
        let mut h = harness();
        h.state
            .actor_mut(FOE)
            .unwrap()
            .flags
            .insert(EntityFlags::DEFEATED);
        let mut seq = sequence(&probe, false);
        seq.start(&mut h.ctx());
        tick_until_finished(&mut seq, &mut h, 50.0);
        assert_eq!(h.state.actor(FOE).unwrap().hp.current, 10);
    }
}
