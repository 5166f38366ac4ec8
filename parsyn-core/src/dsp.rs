//! Math backend and timing helpers shared by the oscillator and the engine.
//!
//! Design goals:
//! - `no_std` ready (guarded by the crate feature `no-std`)
//! - Math backend selection that works in both `std` and `no_std` contexts
//! - Optional `fast-math` cosine for the oscillator hot loop
//! - Every helper is deterministic: the same inputs give the same bits on
//!   every call, which the block renderer relies on.
//!
//! Features used by this file:
//! - `fast-math` : polynomial cosine (faster, approx.)
//! - `no-std`    : `libm` math backend

use core::f64::consts::PI as PI_F64;

use cfg_if::cfg_if;
use num_traits::ToPrimitive;

// ----------------------------- Math backend selection -----------------------------

cfg_if! {
    // libm (C math) in no_std
    if #[cfg(feature = "no-std")] {
        #[inline] fn m_cos(x: f64) -> f64 { libm::cos(x) }
        #[inline] fn m_sqrt(x: f64) -> f64 { libm::sqrt(x) }
        #[inline] fn m_floor(x: f64) -> f64 { libm::floor(x) }
        #[inline] fn m_round(x: f64) -> f64 { libm::round(x) }
        #[allow(dead_code)]
        #[inline] fn m_abs(x: f64) -> f64 { libm::fabs(x) }
    // std backend
    } else {
        #[inline] fn m_cos(x: f64) -> f64 { x.cos() }
        #[inline] fn m_sqrt(x: f64) -> f64 { x.sqrt() }
        #[inline] fn m_floor(x: f64) -> f64 { x.floor() }
        #[inline] fn m_round(x: f64) -> f64 { x.round() }
        #[allow(dead_code)]
        #[inline] fn m_abs(x: f64) -> f64 { x.abs() }
    }
}

// --------------------------------- Constants -------------------------------------

/// π
pub const PI: f64 = PI_F64;

/// 2π
pub const TAU: f64 = 2.0 * PI_F64;

// --------------------------------- Utilities -------------------------------------

#[inline]
pub fn sqrt(x: f64) -> f64 {
    m_sqrt(x)
}

/// Wrap a phase in radians into [-π, π].
#[inline]
pub fn wrap_phase(p: f64) -> f64 {
    let k = m_round(p / TAU);
    p - k * TAU
}

/// Cosine used by the oscillator. Exact unless `fast-math` is enabled.
#[inline]
pub fn cos(x: f64) -> f64 {
    #[cfg(feature = "fast-math")]
    {
        fast_cos(x)
    }
    #[cfg(not(feature = "fast-math"))]
    {
        m_cos(x)
    }
}

/// Range reduce to [0, π], fold into [0, π/2], then Taylor to x^10.
/// Max abs error ~5e-7.
#[cfg(feature = "fast-math")]
#[inline]
fn fast_cos(x: f64) -> f64 {
    let mut xr = m_abs(wrap_phase(x));
    let mut sign = 1.0;
    if xr > 0.5 * PI {
        xr = PI - xr;
        sign = -1.0;
    }
    let x2 = xr * xr;
    sign * (1.0
        + x2 * (-1.0 / 2.0
            + x2 * (1.0 / 24.0
                + x2 * (-1.0 / 720.0 + x2 * (1.0 / 40_320.0 + x2 * (-1.0 / 3_628_800.0))))))
}

// --------------------------------- Timing ----------------------------------------

/// Sample index of `time` seconds at `rate` Hz, rounding half up.
///
/// Negative and NaN inputs map to 0; values beyond the index range saturate.
#[inline]
pub fn sample_index(time: f64, rate: f64) -> usize {
    let x = m_floor(time * rate + 0.5);
    x.to_usize()
        .unwrap_or(if x > 0.0 { usize::MAX } else { 0 })
}

// --------------------------------- Tests (std only) ------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_index_rounds_half_up() {
        assert_eq!(sample_index(0.0, 48000.0), 0);
        assert_eq!(sample_index(0.1, 48000.0), 4800);
        // 1.5 samples rounds up, 1.49 rounds down
        assert_eq!(sample_index(1.5 / 1000.0, 1000.0), 2);
        assert_eq!(sample_index(1.49 / 1000.0, 1000.0), 1);
    }

    #[test]
    fn sample_index_saturates() {
        assert_eq!(sample_index(-1.0, 48000.0), 0);
        assert_eq!(sample_index(f64::NAN, 48000.0), 0);
        assert_eq!(sample_index(f64::INFINITY, 48000.0), usize::MAX);
    }

    #[test]
    fn wrap_phase_stays_in_range() {
        for p in [-20.0, -PI, -1.0, 0.0, 1.0, PI + 0.1, 7.0, 123.456] {
            let w = wrap_phase(p);
            assert!((-PI..=PI).contains(&w), "p={p} w={w}");
            assert!((cos(w) - cos(p)).abs() < 1e-5, "p={p}");
        }
    }
}
