// Move record loader
//!
//! Loads move records from RON data files.

use std::collections::HashMap;

use battle_core::moves::{FamilySpec, MoveKind, MoveSpec};
use battle_core::sequence::MoveScript;
use battle_core::{HammerScript, JumpScript, MoveOracle, TornadoJumpScript};

/// Registry for move records.
///
/// Loads [`MoveSpec`] data from RON files and provides lookup by
/// [`MoveKind`].
#[derive(Debug, Clone)]
pub struct MoveRegistry {
    specs: HashMap<MoveKind, MoveSpec>,
}

impl MoveRegistry {
    /// Loads all move records from embedded RON data files.
    pub fn load() -> Result<Self, String> {
        let mut specs = HashMap::new();

        // Jump family (Jump, Multibounce, Power Bounce, Tornado Jump)
        let jump_ron = include_str!("../../data/moves/jump.ron");
        let jump_specs: Vec<MoveSpec> =
            ron::from_str(jump_ron).map_err(|e| format!("Failed to parse jump.ron: {}", e))?;
        for spec in jump_specs {
            specs.insert(spec.kind, spec);
        }

        // Hammer family (Hammer, Power/Mega/Ice Smash, Quake Hammer)
        let hammer_ron = include_str!("../../data/moves/hammer.ron");
        let hammer_specs: Vec<MoveSpec> =
            ron::from_str(hammer_ron).map_err(|e| format!("Failed to parse hammer.ron: {}", e))?;
        for spec in hammer_specs {
            specs.insert(spec.kind, spec);
        }

        Ok(Self { specs })
    }

    /// Gets a move record by kind.
    ///
    /// # Panics
    ///
    /// Panics if the move record is not registered.
    pub fn get(&self, kind: MoveKind) -> &MoveSpec {
        self.specs
            .get(&kind)
            .unwrap_or_else(|| panic!("MoveSpec not found for {:?}", kind))
    }

    /// Returns an iterator over all registered move kinds.
    pub fn kinds(&self) -> impl Iterator<Item = MoveKind> + '_ {
        self.specs.keys().copied()
    }

    /// Returns the number of registered move records.
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Returns true if no move records are registered.
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

impl MoveOracle for MoveRegistry {
    fn spec(&self, kind: MoveKind) -> Option<&MoveSpec> {
        self.specs.get(&kind)
    }
}

/// Instantiates the script that runs `spec`.
pub fn script_for(spec: &MoveSpec) -> Box<dyn MoveScript> {
    match &spec.family {
        FamilySpec::Jump(jump) => Box::new(JumpScript::new(spec.clone(), *jump)),
        FamilySpec::Hammer(hammer) => Box::new(HammerScript::new(spec.clone(), *hammer)),
        FamilySpec::TornadoJump(tornado) => {
            Box::new(TornadoJumpScript::new(spec.clone(), tornado.clone()))
        }
    }
}
