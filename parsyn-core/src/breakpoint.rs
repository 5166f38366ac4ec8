//! Breakpoints: instantaneous spectral snapshots of a partial.
//!
//! A [`Breakpoint`] carries frequency, amplitude, bandwidth and phase. Its time
//! lives next to it, as the first element of a `(time, Breakpoint)` pair, both
//! in a [`Partial`](crate::partial::Partial) and in the engine's render tables.
//!
//! Null breakpoints (zero amplitude, zero bandwidth) are synthesized at either
//! end of a partial so that onsets and releases fade instead of clicking:
//! - [`make_null_before`] : a null preceding `bp` by `fade_time` seconds
//! - [`make_null_after`]  : a null following `bp` by `fade_time` seconds

use serde::{Deserialize, Serialize};

use crate::dsp::{wrap_phase, TAU};

/// One snapshot of a sinusoidal trajectory.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Breakpoint {
    /// Hz
    pub frequency: f64,
    /// linear
    pub amplitude: f64,
    /// noisiness in [0, 1]; 0 is a pure sinusoid
    pub bandwidth: f64,
    /// radians
    pub phase: f64,
}

impl Breakpoint {
    #[inline]
    pub fn new(frequency: f64, amplitude: f64, bandwidth: f64, phase: f64) -> Self {
        Self { frequency, amplitude, bandwidth: bandwidth.clamp(0.0, 1.0), phase }
    }

    /// A pure sinusoid breakpoint with zero phase.
    #[inline]
    pub fn sine(frequency: f64, amplitude: f64) -> Self {
        Self::new(frequency, amplitude, 0.0, 0.0)
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        self.amplitude == 0.0
    }
}

/// Null breakpoint preceding `bp` by `fade_time` seconds.
///
/// Frequency is held, so the phase is rolled back by `2π f fade_time`: a
/// segment from the null to `bp` at constant frequency lands on `bp.phase`.
#[inline]
pub fn make_null_before(bp: &Breakpoint, fade_time: f64) -> Breakpoint {
    let dp = TAU * fade_time * bp.frequency;
    Breakpoint {
        frequency: bp.frequency,
        amplitude: 0.0,
        bandwidth: 0.0,
        phase: wrap_phase(bp.phase - dp),
    }
}

/// Null breakpoint following `bp` by `fade_time` seconds.
#[inline]
pub fn make_null_after(bp: &Breakpoint, fade_time: f64) -> Breakpoint {
    let dp = TAU * fade_time * bp.frequency;
    Breakpoint {
        frequency: bp.frequency,
        amplitude: 0.0,
        bandwidth: 0.0,
        phase: wrap_phase(bp.phase + dp),
    }
}
