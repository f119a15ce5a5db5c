//! Graded quality of a successful action command.

/// Command rank, ordered worst to best.
///
/// `Fail` sorts below every success tier so "best rank achieved" folds
/// with `max`.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum CommandRank {
    #[default]
    Fail,
    NiceM2,
    NiceM1,
    Nice,
    Good,
    Great,
    Wonderful,
    Excellent,
}

impl CommandRank {
    /// Grades a quality fraction in `[0, 1]` into a success tier.
    ///
    /// Thresholds are inclusive on their lower bound, matching the
    /// closed-interval convention used by command timing windows.
    pub fn grade(quality: f64) -> Self {
        let q = quality.clamp(0.0, 1.0);
        if q >= 0.95 {
            Self::Excellent
        } else if q >= 0.85 {
            Self::Wonderful
        } else if q >= 0.70 {
            Self::Great
        } else if q >= 0.50 {
            Self::Good
        } else if q >= 0.30 {
            Self::Nice
        } else if q >= 0.15 {
            Self::NiceM1
        } else {
            Self::NiceM2
        }
    }

    pub fn is_success(self) -> bool {
        self != Self::Fail
    }
}
