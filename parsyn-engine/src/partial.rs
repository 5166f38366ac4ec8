//! Render partials: source partials prepared for block-by-block synthesis.
//!
//! Preparation brackets every source partial with two null breakpoints, one
//! fade time before its first breakpoint (clamped at time zero) and one fade
//! time after its last. The breakpoint table is frozen in a boxed slice; the
//! only mutable part of a [`RenderPartial`] is its [`SynthesisState`].

use parsyn_core::dsp::sample_index;
use parsyn_core::{make_null_after, make_null_before, Breakpoint, Envelope, Partial};
use tracing::{debug, warn};

use crate::config::InvalidPartialPolicy;
use crate::error::{InvalidReason, Result, SynthError};

/// Cursor and oscillator checkpoint of one partial.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct SynthesisState {
    /// Absolute index of the next sample this partial renders.
    pub current_sample: usize,
    /// Last breakpoint reached; `None` until the first segment completes.
    pub last_rendered: Option<usize>,
    /// Oscillator snapshot at `current_sample`.
    pub envelope: Envelope,
    /// Frequency of the last breakpoint reached, used for the onset phase fix.
    pub previous_frequency: f64,
}

#[derive(Clone, Debug)]
pub struct RenderPartial {
    start_time: f64,
    end_time: f64,
    breakpoints: Box<[(f64, Breakpoint)]>,
    pub(crate) state: SynthesisState,
}

impl RenderPartial {
    /// Bracket `partial` with fade-in and fade-out nulls.
    ///
    /// The partial must hold at least one breakpoint and start at or after 0.
    pub fn new(partial: &Partial, fade_time: f64) -> core::result::Result<Self, InvalidReason> {
        let (Some(&(first_time, first)), Some(&(last_time, last))) = (partial.first(), partial.last())
        else {
            return Err(InvalidReason::NoBreakpoints);
        };
        if partial.iter().any(|(t, _)| !t.is_finite()) {
            return Err(InvalidReason::NonFiniteTime);
        }
        if first_time < 0.0 {
            return Err(InvalidReason::NegativeStartTime);
        }

        let start_time = (first_time - fade_time).max(0.0);
        let end_time = last_time + fade_time;

        let mut breakpoints = Vec::with_capacity(partial.len() + 2);
        breakpoints.push((start_time, make_null_before(&first, first_time - start_time)));
        breakpoints.extend(partial.iter().copied());
        breakpoints.push((end_time, make_null_after(&last, fade_time)));

        Ok(Self {
            start_time,
            end_time,
            breakpoints: breakpoints.into_boxed_slice(),
            state: SynthesisState::default(),
        })
    }

    /// Time of the fade-in null.
    #[inline] pub fn start_time(&self) -> f64 { self.start_time }
    /// Time of the fade-out null.
    #[inline] pub fn end_time(&self) -> f64 { self.end_time }
    #[inline] pub fn breakpoints(&self) -> &[(f64, Breakpoint)] { &self.breakpoints }
    #[inline] pub fn state(&self) -> &SynthesisState { &self.state }

    #[inline]
    pub fn start_sample(&self, rate: f64) -> usize {
        sample_index(self.start_time, rate)
    }

    /// Every breakpoint has been reached.
    #[inline]
    pub fn is_finished(&self) -> bool {
        self.state.last_rendered == Some(self.breakpoints.len() - 1)
    }

    /// Frozen breakpoints alongside the mutable cursor.
    #[inline]
    pub(crate) fn split_mut(&mut self) -> (&[(f64, Breakpoint)], &mut SynthesisState) {
        (&self.breakpoints, &mut self.state)
    }

    /// Rewind the cursor to the fade-in null at `start_sample`.
    pub(crate) fn activate(&mut self, start_sample: usize, noise_seed: u32) {
        let (_, null) = &self.breakpoints[0];
        // index 0 is the fade-in null, 1 the first real breakpoint
        let (_, first) = &self.breakpoints[1];
        self.state = SynthesisState {
            current_sample: start_sample,
            last_rendered: None,
            envelope: Envelope::at(null).with_noise_seed(noise_seed),
            previous_frequency: first.frequency,
        };
    }
}

/// Prepare `partials` for rendering.
///
/// Invalid partials are dropped or rejected per `policy`. The prepared list
/// must be in non-decreasing start time order; it is validated, not sorted.
pub(crate) fn prepare(
    partials: &[Partial],
    fade_time: f64,
    policy: InvalidPartialPolicy,
) -> Result<Box<[RenderPartial]>> {
    let mut prepared: Vec<RenderPartial> = Vec::with_capacity(partials.len());
    let mut dropped = 0usize;

    for (index, partial) in partials.iter().enumerate() {
        let rp = match RenderPartial::new(partial, fade_time) {
            Ok(rp) => rp,
            Err(reason) => match policy {
                InvalidPartialPolicy::Drop => {
                    warn!(index, %reason, "dropping partial");
                    dropped += 1;
                    continue;
                }
                InvalidPartialPolicy::Reject => {
                    return Err(SynthError::InvalidPartial { index, reason });
                }
            },
        };
        if prepared.last().is_some_and(|prev| rp.start_time < prev.start_time) {
            return Err(SynthError::UnsortedPartials { index });
        }
        prepared.push(rp);
    }

    debug!(prepared = prepared.len(), dropped, fade_time, "partials prepared");
    Ok(prepared.into_boxed_slice())
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    fn partial(points: &[(f64, f64, f64)]) -> Partial {
        points
            .iter()
            .map(|&(t, f, a)| (t, Breakpoint::sine(f, a)))
            .collect()
    }

    #[test]
    fn fades_bracket_the_partial() {
        let p = partial(&[(0.5, 440.0, 0.8), (0.6, 450.0, 0.4)]);
        let rp = RenderPartial::new(&p, 0.01).unwrap();
        let bps = rp.breakpoints();
        assert_eq!(bps.len(), p.len() + 2);
        assert!(approx_eq!(f64, rp.start_time(), 0.49, epsilon = 1e-12));
        assert!(approx_eq!(f64, rp.end_time(), 0.61, epsilon = 1e-12));
        assert_eq!(bps[0].1.amplitude, 0.0);
        assert_eq!(bps[bps.len() - 1].1.amplitude, 0.0);
        // first two breakpoints ramp from silence to the original amplitude
        assert_eq!(bps[1], (0.5, Breakpoint::sine(440.0, 0.8)));
        assert_eq!(bps[0].1.frequency, 440.0);
        assert_eq!(bps[bps.len() - 1].1.frequency, 450.0);
    }

    #[test]
    fn early_partial_gets_shorter_fade() {
        let p = partial(&[(0.004, 100.0, 1.0), (0.1, 100.0, 1.0)]);
        let rp = RenderPartial::new(&p, 0.01).unwrap();
        assert_eq!(rp.start_time(), 0.0);
        // null phase rolled back over the 4 ms that remain, not the full fade
        let expected = parsyn_core::dsp::wrap_phase(-parsyn_core::dsp::TAU * 100.0 * 0.004);
        assert!(approx_eq!(f64, rp.breakpoints()[0].1.phase, expected, epsilon = 1e-12));
    }

    #[test]
    fn degenerate_partials_are_invalid() {
        assert_eq!(RenderPartial::new(&Partial::new(), 0.01).unwrap_err(), InvalidReason::NoBreakpoints);
        let p = partial(&[(-0.1, 100.0, 1.0)]);
        assert_eq!(RenderPartial::new(&p, 0.01).unwrap_err(), InvalidReason::NegativeStartTime);
        let p = partial(&[(0.0, 100.0, 1.0), (f64::INFINITY, 100.0, 1.0)]);
        assert_eq!(RenderPartial::new(&p, 0.01).unwrap_err(), InvalidReason::NonFiniteTime);
    }

    #[test]
    fn drop_policy_skips_invalid_partials() {
        let list = [
            partial(&[(0.0, 100.0, 1.0)]),
            Partial::new(),
            partial(&[(0.1, 200.0, 1.0)]),
        ];
        let prepared = prepare(&list, 0.001, InvalidPartialPolicy::Drop).unwrap();
        assert_eq!(prepared.len(), 2);
        assert_eq!(prepared[1].breakpoints()[1].1.frequency, 200.0);
    }

    #[test]
    fn reject_policy_reports_index() {
        let list = [partial(&[(0.0, 100.0, 1.0)]), Partial::new()];
        let err = prepare(&list, 0.001, InvalidPartialPolicy::Reject).unwrap_err();
        assert!(matches!(
            err,
            SynthError::InvalidPartial { index: 1, reason: InvalidReason::NoBreakpoints }
        ));
    }

    #[test]
    fn unsorted_list_is_rejected() {
        let list = [partial(&[(0.5, 100.0, 1.0)]), partial(&[(0.1, 200.0, 1.0)])];
        let err = prepare(&list, 0.001, InvalidPartialPolicy::Drop).unwrap_err();
        assert!(matches!(err, SynthError::UnsortedPartials { index: 1 }));
    }

    #[test]
    fn activation_resets_the_cursor() {
        let p = partial(&[(0.1, 440.0, 1.0), (0.2, 440.0, 1.0)]);
        let mut rp = RenderPartial::new(&p, 0.01).unwrap();
        rp.state.last_rendered = Some(3);
        assert!(rp.is_finished());
        rp.activate(rp.start_sample(48_000.0), 1);
        assert!(!rp.is_finished());
        assert_eq!(rp.state().current_sample, 4320);
        assert_eq!(rp.state().last_rendered, None);
        assert_eq!(rp.state().envelope.amplitude, 0.0);
        assert_eq!(rp.state().previous_frequency, 440.0);
    }
}
