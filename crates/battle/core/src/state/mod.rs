//! Authoritative battle state.
//!
//! Owns the actor table that sequences read and mutate through handles.
//! Targets that have been removed or defeated are an expected, reachable
//! state for in-flight sequences; lookups return `Option` and callers skip
//! misses non-fatally.

pub mod types;

pub use types::{ActorState, EntityFlags, EntityId, HitPoints, MotionPath, Vec2};

/// All entities participating in the current battle.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleState {
    actors: Vec<ActorState>,
}

impl BattleState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an actor. Replaces any existing actor with the same id.
    pub fn insert(&mut self, actor: ActorState) {
        if let Some(slot) = self.actors.iter_mut().find(|a| a.id == actor.id) {
            *slot = actor;
        } else {
            self.actors.push(actor);
        }
    }

    /// Removes an actor outright (fled, swallowed, scripted exit).
    pub fn remove(&mut self, id: EntityId) -> Option<ActorState> {
        let idx = self.actors.iter().position(|a| a.id == id)?;
        Some(self.actors.remove(idx))
    }

    pub fn actor(&self, id: EntityId) -> Option<&ActorState> {
        self.actors.iter().find(|a| a.id == id)
    }

    pub fn actor_mut(&mut self, id: EntityId) -> Option<&mut ActorState> {
        self.actors.iter_mut().find(|a| a.id == id)
    }

    /// Targets that are still present and not defeated.
    pub fn living(&self) -> impl Iterator<Item = &ActorState> {
        self.actors.iter().filter(|a| a.is_targetable())
    }

    pub fn len(&self) -> usize {
        self.actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }
}
