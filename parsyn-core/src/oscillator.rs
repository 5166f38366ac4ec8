//! Bandwidth-enhanced sinusoidal oscillator.
//!
//! The oscillator renders one breakpoint-to-breakpoint *segment* at a time:
//! amplitude, frequency and bandwidth move linearly from the segment origin
//! (the oscillator state when the segment started) to the target breakpoint,
//! and the phase is accumulated with the trapezoid rule, so a segment of `L`
//! samples advances the phase by exactly `π (f0 + f1) L / sr`.
//!
//! A segment may be rendered in several calls. Interpolated values depend only
//! on the absolute position inside the segment ([`Segment::offset`]), never on
//! how the segment was cut up, and all running state (phase, noise, origin)
//! lives in the [`Envelope`] snapshot. Suspending a partial is `envelopes()`,
//! resuming it is `restore_envelopes()`; the samples come out bit-identical
//! to an uninterrupted render.
//!
//! Output is *accumulated* into the caller's window (`out[i] += sample`).

use serde::{Deserialize, Serialize};

use crate::breakpoint::Breakpoint;
use crate::dsp::{cos, sqrt, wrap_phase, PI};
use crate::noise::NoiseSource;

/// Serializable oscillator state, carried by a partial between render calls.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub amplitude: f64,
    pub frequency: f64,
    pub bandwidth: f64,
    pub phase: f64,
    origin: Origin,
    noise: NoiseSource,
}

/// Envelope values at the start of the segment being rendered.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
struct Origin {
    amplitude: f64,
    frequency: f64,
    bandwidth: f64,
}

impl Envelope {
    /// Oscillator state sitting exactly on `bp`.
    #[inline]
    pub fn at(bp: &Breakpoint) -> Self {
        Self {
            amplitude: bp.amplitude,
            frequency: bp.frequency,
            bandwidth: bp.bandwidth,
            phase: bp.phase,
            origin: Origin {
                amplitude: bp.amplitude,
                frequency: bp.frequency,
                bandwidth: bp.bandwidth,
            },
            noise: NoiseSource::default(),
        }
    }

    /// Same envelope with its own noise sequence.
    #[inline]
    pub fn with_noise_seed(mut self, seed: u32) -> Self {
        self.noise = NoiseSource::new(seed);
        self
    }
}

impl Default for Envelope {
    fn default() -> Self {
        Self::at(&Breakpoint::default())
    }
}

impl From<&Breakpoint> for Envelope {
    fn from(bp: &Breakpoint) -> Self {
        Self::at(bp)
    }
}

/// Position inside a breakpoint-to-breakpoint segment.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Segment {
    /// Total samples from the previous breakpoint to the target breakpoint.
    pub length: usize,
    /// Samples of this segment already rendered.
    pub offset: usize,
}

impl Segment {
    #[inline]
    pub fn new(length: usize, offset: usize) -> Self {
        Self { length, offset: offset.min(length) }
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.length - self.offset
    }
}

/// What the block renderer needs from an oscillator.
pub trait Oscillate {
    /// Load a previously saved snapshot.
    fn restore_envelopes(&mut self, env: &Envelope);

    /// Snapshot of the current state.
    fn envelopes(&self) -> Envelope;

    /// Instantaneous amplitude of the next sample.
    fn amplitude(&self) -> f64;

    /// Running phase in radians.
    fn phase(&self) -> f64;

    /// Override the running phase before rendering a segment.
    fn set_phase(&mut self, phase: f64);

    /// Current frequency multiplier, 1 at the analysis pitch.
    fn frequency_scaling(&self) -> f64;

    /// Multiplier applied to every frequency from the next sample on.
    fn set_frequency_scaling(&mut self, scale: f64);

    /// Render `out.len()` samples of the segment towards `target`, adding
    /// them into `out`. Rendering stops early at the end of the segment. When
    /// the segment completes, the envelope lands exactly on `target`.
    fn oscillate(&mut self, out: &mut [f32], target: &Breakpoint, segment: Segment, sample_rate: f64);
}

/// Default bandwidth-enhanced sinusoidal oscillator.
#[derive(Clone, Debug)]
pub struct Oscillator {
    env: Envelope,
    scaling: f64,
}

impl Default for Oscillator {
    fn default() -> Self {
        Self::new()
    }
}

impl Oscillator {
    #[inline]
    pub fn new() -> Self {
        Self { env: Envelope::default(), scaling: 1.0 }
    }

    #[inline]
    fn lerp(a: f64, b: f64, t: f64) -> f64 {
        a + (b - a) * t
    }
}

impl Oscillate for Oscillator {
    #[inline]
    fn restore_envelopes(&mut self, env: &Envelope) {
        self.env = *env;
    }

    #[inline]
    fn envelopes(&self) -> Envelope {
        self.env
    }

    #[inline]
    fn amplitude(&self) -> f64 {
        self.env.amplitude
    }

    #[inline]
    fn phase(&self) -> f64 {
        self.env.phase
    }

    #[inline]
    fn set_phase(&mut self, phase: f64) {
        self.env.phase = wrap_phase(phase);
    }

    #[inline]
    fn frequency_scaling(&self) -> f64 {
        self.scaling
    }

    #[inline]
    fn set_frequency_scaling(&mut self, scale: f64) {
        self.scaling = scale;
    }

    fn oscillate(&mut self, out: &mut [f32], target: &Breakpoint, segment: Segment, sample_rate: f64) {
        let env = &mut self.env;
        if segment.offset == 0 {
            env.origin = Origin {
                amplitude: env.amplitude,
                frequency: env.frequency,
                bandwidth: env.bandwidth,
            };
        }

        let n = out.len().min(segment.remaining());
        let origin = env.origin;
        let len = segment.length as f64;
        // trapezoid rule: phase += 2π * (f[k] + f[k+1]) / 2 / sr
        let half_step = PI * self.scaling / sample_rate;

        let mut amp = env.amplitude;
        let mut freq = env.frequency;
        let mut bw = env.bandwidth;
        let mut phase = env.phase;

        for (j, y) in out[..n].iter_mut().enumerate() {
            let mut a = amp;
            if bw > 0.0 {
                a *= sqrt(1.0 - bw) + env.noise.sample() * sqrt(2.0 * bw);
            }
            *y += (a * cos(phase)) as f32;

            let t = (segment.offset + j + 1) as f64 / len;
            let next_freq = Self::lerp(origin.frequency, target.frequency, t);
            phase += (freq + next_freq) * half_step;
            if phase > PI || phase < -PI {
                phase = wrap_phase(phase);
            }

            amp = Self::lerp(origin.amplitude, target.amplitude, t);
            freq = next_freq;
            bw = Self::lerp(origin.bandwidth, target.bandwidth, t);
        }

        if segment.offset + n == segment.length {
            amp = target.amplitude;
            freq = target.frequency;
            bw = target.bandwidth;
        }

        env.amplitude = amp;
        env.frequency = freq;
        env.bandwidth = bw;
        env.phase = phase;
    }
}
