//! Synchronous battle driver.
//!
//! Owns the authoritative [`BattleState`], the move registry, and the
//! concrete collaborators, and pumps the active [`Sequence`] once per
//! tick. Exactly one action resolves at a time; the menu layer calls
//! [`BattleDriver::begin_move`] once targeting is locked, then feeds
//! clock deltas and raw input frames through [`BattleDriver::tick`].

use tracing::info;

use battle_core::{
    ActorState, BattleContext, BattleState, Element, EntityId, InputFrame, MAX_TARGETS, Millis,
    MoveKind, MoveOracle, MoveSpec, Sequence, SequenceBranch, TargetMode, TargetSet, VfxRequest,
};
use battle_content::{MoveRegistry, script_for};

use crate::collab::{RecordingVfx, ScriptedAnimations, StandardResolver, TurnLedger};
use crate::error::{Result, RuntimeError};

pub struct BattleDriver {
    state: BattleState,
    registry: MoveRegistry,
    anims: ScriptedAnimations,
    vfx: RecordingVfx,
    damage: StandardResolver,
    ledger: TurnLedger,
    active: Option<Sequence>,
    /// Master toggle for player action commands (enemies never get them).
    action_commands: bool,
}

impl BattleDriver {
    pub fn builder() -> BattleDriverBuilder {
        BattleDriverBuilder::new()
    }

    pub fn state(&self) -> &BattleState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut BattleState {
        &mut self.state
    }

    pub fn registry(&self) -> &MoveRegistry {
        &self.registry
    }

    pub fn ledger(&self) -> &TurnLedger {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut TurnLedger {
        &mut self.ledger
    }

    /// Pending one-shot VFX requests.
    pub fn vfx(&self) -> &[VfxRequest] {
        self.vfx.requests()
    }

    pub fn drain_vfx(&mut self) -> Vec<VfxRequest> {
        self.vfx.drain()
    }

    pub fn is_idle(&self) -> bool {
        self.active.is_none()
    }

    /// Branch of the running sequence, if one is active.
    pub fn active_branch(&self) -> Option<SequenceBranch> {
        self.active.as_ref().map(|seq| seq.branch())
    }

    /// The running sequence halted on an authoring error and is waiting
    /// to be inspected or aborted.
    pub fn active_halted(&self) -> bool {
        self.active.as_ref().is_some_and(|seq| seq.is_halted())
    }

    pub fn active(&self) -> Option<&Sequence> {
        self.active.as_ref()
    }

    /// Confirms a move for execution. Targeting must already be locked:
    /// `chosen` names the enemy for single-target moves and is ignored
    /// otherwise.
    pub fn begin_move(
        &mut self,
        user: EntityId,
        kind: MoveKind,
        chosen: Option<EntityId>,
    ) -> Result<()> {
        if self.active.is_some() {
            return Err(RuntimeError::ActionInProgress);
        }
        if self.state.actor(user).is_none() {
            return Err(RuntimeError::MissingActor(user));
        }
        let spec = MoveOracle::spec(&self.registry, kind)
            .ok_or(RuntimeError::UnknownMove(kind))?
            .clone();
        let targets = self.resolve_targets(&spec, user, chosen)?;
        let command_enabled = self.action_commands && user == EntityId::PLAYER;
        info!(%user, %kind, ?targets, command_enabled, "move confirmed");

        let mut sequence = Sequence::new(script_for(&spec), user, targets, command_enabled);
        let Self {
            state,
            anims,
            vfx,
            damage,
            ledger,
            ..
        } = self;
        let mut ctx = BattleContext {
            state,
            anims,
            vfx,
            damage,
            scheduler: ledger,
        };
        sequence.start(&mut ctx);
        if !sequence.is_finished() {
            self.active = Some(sequence);
        }
        Ok(())
    }

    /// One scheduler tick: advances animation playback and pumps the
    /// active sequence with this tick's input.
    pub fn tick(&mut self, dt: Millis, input: InputFrame) {
        let Self {
            state,
            anims,
            vfx,
            damage,
            ledger,
            active,
            ..
        } = self;
        anims.advance(dt);
        if let Some(sequence) = active.as_mut() {
            let mut ctx = BattleContext {
                state,
                anims,
                vfx,
                damage,
                scheduler: ledger,
            };
            sequence.update(dt, &input, &mut ctx);
            if sequence.is_finished() {
                *active = None;
            }
        }
    }

    /// Routes an external interruption (pre-empting status, contact
    /// resolution) into the active sequence.
    pub fn interrupt_active(&mut self, element: Element) {
        let Self {
            state,
            anims,
            vfx,
            damage,
            ledger,
            active,
            ..
        } = self;
        if let Some(sequence) = active.as_mut() {
            let mut ctx = BattleContext {
                state,
                anims,
                vfx,
                damage,
                scheduler: ledger,
            };
            sequence.interrupt(element, &mut ctx);
            if sequence.is_finished() {
                *active = None;
            }
        }
    }

    /// Forces the active sequence through its terminal protocol.
    pub fn abort_active(&mut self) {
        let Self {
            state,
            anims,
            vfx,
            damage,
            ledger,
            active,
            ..
        } = self;
        if let Some(sequence) = active.as_mut() {
            let mut ctx = BattleContext {
                state,
                anims,
                vfx,
                damage,
                scheduler: ledger,
            };
            sequence.end(&mut ctx);
        }
        *active = None;
    }

    fn resolve_targets(
        &self,
        spec: &MoveSpec,
        user: EntityId,
        chosen: Option<EntityId>,
    ) -> Result<TargetSet> {
        let targets: TargetSet = match spec.target_mode {
            TargetMode::Single => {
                let chosen = chosen.ok_or(RuntimeError::NoValidTargets(spec.kind))?;
                if !self
                    .state
                    .actor(chosen)
                    .is_some_and(|actor| actor.is_targetable())
                {
                    return Err(RuntimeError::NoValidTargets(spec.kind));
                }
                [chosen].into_iter().collect()
            }
            TargetMode::First => self
                .state
                .living()
                .filter(|actor| actor.id != user)
                .map(|actor| actor.id)
                .take(1)
                .collect(),
            TargetMode::All => self
                .state
                .living()
                .filter(|actor| actor.id != user)
                .map(|actor| actor.id)
                .take(MAX_TARGETS)
                .collect(),
        };
        if targets.is_empty() {
            return Err(RuntimeError::NoValidTargets(spec.kind));
        }
        Ok(targets)
    }
}

/// Builder for [`BattleDriver`] with flexible configuration.
pub struct BattleDriverBuilder {
    state: BattleState,
    anims: Option<ScriptedAnimations>,
    action_commands: bool,
}

impl BattleDriverBuilder {
    fn new() -> Self {
        Self {
            state: BattleState::new(),
            anims: None,
            action_commands: true,
        }
    }

    pub fn with_state(mut self, state: BattleState) -> Self {
        self.state = state;
        self
    }

    pub fn with_actor(mut self, actor: ActorState) -> Self {
        self.state.insert(actor);
        self
    }

    pub fn animations(mut self, anims: ScriptedAnimations) -> Self {
        self.anims = Some(anims);
        self
    }

    /// Disables player action commands (everything auto-succeeds), as
    /// the simulator mode does.
    pub fn action_commands(mut self, enabled: bool) -> Self {
        self.action_commands = enabled;
        self
    }

    pub fn build(self) -> Result<BattleDriver> {
        let registry = MoveRegistry::load().map_err(RuntimeError::Content)?;
        Ok(BattleDriver {
            state: self.state,
            registry,
            anims: self.anims.unwrap_or_else(ScriptedAnimations::standard),
            vfx: RecordingVfx::new(),
            damage: StandardResolver::new(),
            ledger: TurnLedger::new(),
            active: None,
            action_commands: self.action_commands,
        })
    }
}
