//! Band-limited noise for bandwidth enhancement.
//!
//! `NoiseSource` is a xorshift generator followed by a one-pole low-pass in
//! the `y += a * (x - y)` form. The whole state is two numbers and is part of
//! the oscillator's [`Envelope`](crate::oscillator::Envelope) snapshot, so a
//! partial that is suspended and resumed draws exactly the noise it would have
//! drawn in one go.

use serde::{Deserialize, Serialize};

/// One-pole coefficient applied to the raw white noise.
const LP_COEFF: f64 = 0.5;

/// Restores unit variance after the low-pass: uniform [-1, 1] has variance
/// 1/3 and the filter keeps a/(2-a) of it, 1/9 overall for a = 0.5.
const GAIN: f64 = 3.0;

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NoiseSource {
    state: u32,
    y: f64,
}

impl Default for NoiseSource {
    fn default() -> Self {
        Self::new(0x9E37_79B9)
    }
}

impl NoiseSource {
    /// Zero seeds are remapped, xorshift would be stuck at 0 forever.
    #[inline]
    pub fn new(seed: u32) -> Self {
        Self { state: if seed == 0 { 0x9E37_79B9 } else { seed }, y: 0.0 }
    }

    #[inline]
    fn white(&mut self) -> f64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        // map to [-1, 1]
        f64::from(x) / f64::from(u32::MAX) * 2.0 - 1.0
    }

    /// Next low-passed sample with roughly unit variance.
    #[inline]
    pub fn sample(&mut self) -> f64 {
        let x = self.white();
        self.y += LP_COEFF * (x - self.y);
        self.y * GAIN
    }
}
