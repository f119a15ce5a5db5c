//! Easing curves for movement and timing visuals.
//!
//! Each curve is a pure function from normalized time `t ∈ [0, 1]` to eased
//! time `t' ∈ [0, 1]`. The formulas are the standard catalogue; visual
//! timing is a tuned gameplay-feel property, so the exact shapes matter.

use std::f64::consts::PI;

/// Interpolation curve selector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Ease {
    #[default]
    Linear,
    QuadIn,
    QuadOut,
    QuadInOut,
    CubicIn,
    CubicOut,
    CubicInOut,
    ExpoIn,
    ExpoOut,
    ExpoInOut,
    SineIn,
    SineOut,
    SineInOut,
}

impl Ease {
    /// Maps normalized time to eased time.
    ///
    /// Input outside `[0, 1]` is clamped first; every curve maps 0 to 0 and
    /// 1 to 1 exactly.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Ease::Linear => t,
            Ease::QuadIn => t * t,
            Ease::QuadOut => 1.0 - (1.0 - t) * (1.0 - t),
            Ease::QuadInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Ease::CubicIn => t * t * t,
            Ease::CubicOut => 1.0 - (1.0 - t).powi(3),
            Ease::CubicInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Ease::ExpoIn => {
                if t == 0.0 {
                    0.0
                } else {
                    (10.0 * t - 10.0).exp2()
                }
            }
            Ease::ExpoOut => {
                if t == 1.0 {
                    1.0
                } else {
                    1.0 - (-10.0 * t).exp2()
                }
            }
            Ease::ExpoInOut => {
                if t == 0.0 {
                    0.0
                } else if t == 1.0 {
                    1.0
                } else if t < 0.5 {
                    (20.0 * t - 10.0).exp2() / 2.0
                } else {
                    (2.0 - (-20.0 * t + 10.0).exp2()) / 2.0
                }
            }
            Ease::SineIn => 1.0 - (t * PI / 2.0).cos(),
            Ease::SineOut => (t * PI / 2.0).sin(),
            Ease::SineInOut => -((PI * t).cos() - 1.0) / 2.0,
        }
    }
}

/// Interpolates from `start` to `end` at normalized time `t` along `ease`.
pub fn interpolate(start: f64, end: f64, t: f64, ease: Ease) -> f64 {
    start + (end - start) * ease.apply(t)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Ease; 13] = [
        Ease::Linear,
        Ease::QuadIn,
        Ease::QuadOut,
        Ease::QuadInOut,
        Ease::CubicIn,
        Ease::CubicOut,
        Ease::CubicInOut,
        Ease::ExpoIn,
        Ease::ExpoOut,
        Ease::ExpoInOut,
        Ease::SineIn,
        Ease::SineOut,
        Ease::SineInOut,
    ];

    #[test]
    fn endpoints_are_exact() {
        for ease in ALL {
            let a = interpolate(-3.5, 12.25, 0.0, ease);
            let b = interpolate(-3.5, 12.25, 1.0, ease);
            assert!((a - -3.5).abs() < 1e-9, "{ease}: f(0) = {a}");
            assert!((b - 12.25).abs() < 1e-9, "{ease}: f(1) = {b}");
        }
    }

    #[test]
    fn output_stays_in_unit_interval() {
        for ease in ALL {
            for i in 0..=100 {
                let v = ease.apply(i as f64 / 100.0);
                assert!((-1e-9..=1.0 + 1e-9).contains(&v), "{ease}({i}%) = {v}");
            }
        }
    }

    #[test]
    fn out_of_range_time_is_clamped() {
        for ease in ALL {
            assert_eq!(ease.apply(-2.0), 0.0, "{ease}");
            assert_eq!(ease.apply(3.0), 1.0, "{ease}");
        }
    }

    #[test]
    fn cubic_out_matches_reference_formula() {
        for i in 0..=10 {
            let t = i as f64 / 10.0;
            let expect = 1.0 - (1.0 - t).powi(3);
            assert!((Ease::CubicOut.apply(t) - expect).abs() < 1e-12);
        }
    }
}
