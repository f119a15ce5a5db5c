//! Turn-completion ledger.

use battle_core::{EntityId, TurnScheduler};

/// Receives the action-complete signal the battle scheduler consumes.
#[derive(Debug, Default)]
pub struct TurnLedger {
    completed: Vec<EntityId>,
}

impl TurnLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entities whose actions have fully completed, in order.
    pub fn completed(&self) -> &[EntityId] {
        &self.completed
    }

    /// Pops the oldest completion, for a polling scheduler.
    pub fn take_completed(&mut self) -> Option<EntityId> {
        if self.completed.is_empty() {
            None
        } else {
            Some(self.completed.remove(0))
        }
    }
}

impl TurnScheduler for TurnLedger {
    fn action_complete(&mut self, entity: EntityId) {
        self.completed.push(entity);
    }
}
