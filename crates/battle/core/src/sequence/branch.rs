//! Named scripts a sequence can be executing.

/// Which branch of the move script the state machine is currently running.
///
/// Step indices are branch-local: every branch change resets the step
/// counter to zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum SequenceBranch {
    /// Walk-up and wind-up. Always flows into `Main`; there is no failure
    /// path out of Start.
    #[default]
    Start,
    /// The phase holding the action-command window.
    Main,
    /// The command landed; apply full effects. Multi-hit moves loop back
    /// into `Main` from here.
    Success,
    /// The command was muffed; apply reduced effects.
    Failed,
    /// The target could not be hit at all. No damage, special animation.
    Miss,
    /// Bonus-input interlude layered over Main/Success.
    Stylish,
    /// Walk-back and cleanup; the terminal branch.
    End,
}

impl SequenceBranch {
    /// Branches from which a stylish interlude may be entered.
    pub fn allows_stylish(self) -> bool {
        matches!(self, SequenceBranch::Main | SequenceBranch::Success)
    }
}
