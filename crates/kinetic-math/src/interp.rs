//! Log-spaced table axes, linear interpolation and CDF bracketing.
//!
//! The radiation cross-section tables are sampled on log₁₀-spaced abscissae;
//! every query clamps to the table domain instead of failing, so the callers
//! never have to branch on out-of-range quantum parameters.

use kinetic_types::error::{KineticError, KineticResult};

/// A log₁₀-spaced axis with `n` points from `min` to `max` inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogAxis {
    pub log10_min: f64,
    pub delta: f64,
    pub inv_delta: f64,
    pub n: usize,
}

impl LogAxis {
    pub fn new(min: f64, max: f64, n: usize) -> KineticResult<Self> {
        if !(min.is_finite() && max.is_finite()) || min <= 0.0 || max <= min {
            return Err(KineticError::ConfigError(format!(
                "log axis needs 0 < min < max, got min={min}, max={max}"
            )));
        }
        if n < 2 {
            return Err(KineticError::ConfigError(format!(
                "log axis needs at least 2 points, got {n}"
            )));
        }
        let log10_min = min.log10();
        let delta = (max.log10() - log10_min) / (n - 1) as f64;
        Ok(LogAxis {
            log10_min,
            delta,
            inv_delta: 1.0 / delta,
            n,
        })
    }

    /// Lower bracket index and fraction for `x`, clamped to the axis.
    ///
    /// The returned index is in `[0, n-2]` and the fraction in `[0, 1]`.
    pub fn locate(&self, x: f64) -> (usize, f64) {
        let t = (x.log10() - self.log10_min) * self.inv_delta;
        if !(t > 0.0) {
            return (0, 0.0);
        }
        if t >= (self.n - 1) as f64 {
            return (self.n - 2, 1.0);
        }
        let i = t as usize;
        // t < n-1 can still floor to n-1 after the cast on exact boundaries
        let i = i.min(self.n - 2);
        (i, t - i as f64)
    }

    /// Abscissa of point `i`.
    pub fn value(&self, i: usize) -> f64 {
        10.0_f64.powf(self.log10_min + i as f64 * self.delta)
    }

    pub fn min(&self) -> f64 {
        self.value(0)
    }

    pub fn max(&self) -> f64 {
        self.value(self.n - 1)
    }
}

/// Linear interpolation of `table` on `axis` at `x`, clamped to the domain.
pub fn interp_log1d(table: &[f64], axis: &LogAxis, x: f64) -> f64 {
    let (i, t) = axis.locate(x);
    table[i] * (1.0 - t) + table[i + 1] * t
}

/// Bracket a uniform deviate inside a monotone CDF row.
///
/// Returns the largest `j` with `row[j] <= u` (capped at `len - 2`) and the
/// linear fraction of `u` between `row[j]` and `row[j + 1]`. `u` below the
/// first entry or above the last clamps to the corresponding end.
pub fn bracket_cdf(row: &[f64], u: f64) -> (usize, f64) {
    debug_assert!(row.len() >= 2);
    bracket_cdf_fn(row.len(), |j| row[j], u)
}

/// [`bracket_cdf`] over a virtual row `f(0..n)`.
///
/// Lets the caller bracket a row blended on the fly from two table rows
/// without materialising it.
pub fn bracket_cdf_fn(n: usize, f: impl Fn(usize) -> f64, u: f64) -> (usize, f64) {
    debug_assert!(n >= 2);
    // first index whose CDF value exceeds u
    let mut lo = 0usize;
    let mut hi = n;
    while lo < hi {
        let mid = (lo + hi) / 2;
        if f(mid) <= u {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    if lo == 0 {
        return (0, 0.0);
    }
    if lo >= n {
        return (n - 2, 1.0);
    }
    let j = lo - 1;
    let width = f(j + 1) - f(j);
    if width <= 0.0 {
        return (j, 0.0);
    }
    (j, ((u - f(j)) / width).clamp(0.0, 1.0))
}
