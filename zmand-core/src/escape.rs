//! Escape-time iteration of `z ← z² + c` with continuous (smooth) escape
//! measure, plus the zoom-dependent iteration budget.

use std::f64::consts::LN_2;

use crate::view::ViewState;

/// Squared bailout radius. An orbit with `|z|² > 4` has escaped.
pub const ESCAPE_RADIUS_SQ: f64 = 4.0;

/// Outcome of iterating a single point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Escape {
    /// The orbit left the escape radius. `iteration` is the 0-based step at
    /// which the test first failed and `norm_sq` is `|z|²` at that moment.
    Escaped { iteration: u32, norm_sq: f64 },

    /// No escape within the iteration budget.
    Inside,
}

impl Escape {
    /// Continuous escape measure `ν`, or `None` for inside points.
    #[inline]
    pub fn smooth(&self) -> Option<f64> {
        match *self {
            Self::Escaped { iteration, norm_sq } => Some(smooth_value(iteration, norm_sq)),
            Self::Inside => None,
        }
    }
}

/// Iterate `z ← z² + c` for `c = u + vi`, starting from `z₀ = 0`.
///
/// Real and imaginary parts are tracked directly so the loop stays free of
/// any complex-number abstraction.
#[inline]
pub fn iterate(u: f64, v: f64, max_iterations: u32) -> Escape {
    let mut re = 0.0_f64;
    let mut im = 0.0_f64;

    for i in 0..max_iterations {
        let next_re = re * re - im * im + u;
        im = re * im * 2.0 + v;
        re = next_re;

        let norm_sq = re * re + im * im;
        if norm_sq > ESCAPE_RADIUS_SQ {
            return Escape::Escaped {
                iteration: i,
                norm_sq,
            };
        }
    }

    Escape::Inside
}

/// Renormalized iteration count:
///   ν = i + 1 − ln(½·ln(|z|²) / ln 2) / ln 2
///
/// `norm_sq > 4` on every escaped orbit, so the inner logarithm is positive.
#[inline]
pub fn smooth_value(iteration: u32, norm_sq: f64) -> f64 {
    iteration as f64 + 1.0 - (0.5 * norm_sq.ln() / LN_2).ln() / LN_2
}

/// Precision multiplier for a given span: `exp(log10(span₀ / span) / 2)`.
///
/// Exactly `1.0` at the initial span and growing as the view zooms in.
pub fn precision(span: f64) -> f64 {
    ((ViewState::INITIAL_SPAN / span).log10() / 2.0).exp()
}

/// Iteration budget for a palette of `palette_size` entries at `precision`.
///
/// Never less than one, so zooming far out still runs the divergence test.
pub fn max_iterations(palette_size: usize, precision: f64) -> u32 {
    // `as` saturates on overflow and maps NaN to 0.
    ((palette_size as f64 * precision).round() as u32).max(1)
}
