//! Per-partial segment synthesis.
//!
//! [`advance`] moves one partial forward by at most `out.len()` samples,
//! segment by segment. A segment that does not fit in the budget is clipped
//! and picked up again on the next call with the same target breakpoint; the
//! oscillator receives the absolute position inside the segment, so the
//! resumed samples are the ones an uninterrupted render would have produced.

use parsyn_core::dsp::{sample_index, PI};
use parsyn_core::{Oscillate, Segment};

use crate::partial::RenderPartial;

/// Sample rate with its reciprocal cached for the per-segment phase math.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Timebase {
    rate: f64,
    inv_rate: f64,
}

impl Timebase {
    /// `rate` must be finite and positive; the session validates it.
    #[inline]
    pub fn new(rate: f64) -> Self {
        Self { rate, inv_rate: 1.0 / rate }
    }

    #[inline] pub fn rate(&self) -> f64 { self.rate }
    #[inline] pub fn inv_rate(&self) -> f64 { self.inv_rate }

    #[inline]
    pub fn sample(&self, time: f64) -> usize {
        sample_index(time, self.rate)
    }
}

/// Render up to `out.len()` samples of `partial` into `out`, starting at the
/// partial's current sample. Returns the number of samples rendered.
pub fn advance<O: Oscillate>(
    osc: &mut O,
    partial: &mut RenderPartial,
    out: &mut [f32],
    timebase: Timebase,
) -> usize {
    let budget = out.len();
    if budget == 0 || partial.is_finished() {
        return 0;
    }

    let (breakpoints, state) = partial.split_mut();
    osc.restore_envelopes(&state.envelope);

    let mut consumed = 0;
    let mut next = state.last_rendered.map_or(1, |i| i + 1);

    while next < breakpoints.len() && consumed < budget {
        let segment_start = timebase.sample(breakpoints[next - 1].0);
        let (time, target) = &breakpoints[next];
        let target_sample = timebase.sample(*time);

        // saturating: a sample rate change mid-stream may leave the cursor
        // outside the segment; it then completes immediately
        let span = target_sample.saturating_sub(state.current_sample);
        let offset = state.current_sample.saturating_sub(segment_start);
        let take = span.min(budget - consumed);

        // The null breakpoint phases come from intervals in seconds, not
        // samples. Recompute the starting phase so the oscillator hits the
        // target phase exactly at the target sample.
        if osc.amplitude() == 0.0 && target.amplitude != 0.0 {
            // exact at the analysis pitch only; frequency scaling is not included
            let dphase =
                PI * (state.previous_frequency + target.frequency) * span as f64 * timebase.inv_rate();
            osc.set_phase(target.phase - dphase);
        }

        osc.oscillate(
            &mut out[consumed..consumed + take],
            target,
            Segment::new(offset + span, offset),
            timebase.rate(),
        );

        consumed += take;
        state.current_sample += take;

        if take == span {
            state.previous_frequency = target.frequency;
            state.last_rendered = Some(next);
            next += 1;
        }
    }

    state.envelope = osc.envelopes();
    consumed
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use parsyn_core::dsp::wrap_phase;
    use parsyn_core::{Breakpoint, Oscillator, Partial};

    const SR: f64 = 48_000.0;

    fn ramp() -> RenderPartial {
        let p: Partial = [
            (0.01, Breakpoint::new(440.0, 1.0, 0.0, 0.5)),
            (0.02, Breakpoint::new(460.0, 0.5, 0.0, 1.0)),
        ]
        .into_iter()
        .collect();
        let mut rp = RenderPartial::new(&p, 0.005).unwrap();
        rp.activate(rp.start_sample(SR), 1);
        rp
    }

    #[test]
    fn whole_partial_in_one_call() {
        let mut rp = ramp();
        let mut osc = Oscillator::new();
        let mut out = vec![0.0f32; 2000];
        // 5 ms .. 25 ms at 48 kHz
        let n = advance(&mut osc, &mut rp, &mut out, Timebase::new(SR));
        assert_eq!(n, 960);
        assert!(rp.is_finished());
        assert_eq!(rp.state().current_sample, 1200);
        assert!(out[960..].iter().all(|&s| s == 0.0));
    }

    #[test]
    fn clipped_segment_resumes_where_it_stopped() {
        let tb = Timebase::new(SR);
        let mut whole = ramp();
        let mut a = vec![0.0f32; 960];
        advance(&mut Oscillator::new(), &mut whole, &mut a, tb);

        let mut split = ramp();
        let mut b = vec![0.0f32; 960];
        let mut at = 0;
        for chunk in [100, 1, 239, 300, 320] {
            // a fresh oscillator each time: all state must live in the partial
            at += advance(&mut Oscillator::new(), &mut split, &mut b[at..at + chunk], tb);
        }
        assert_eq!(at, 960);
        assert_eq!(a, b);
        assert_eq!(whole.state(), split.state());
    }

    #[test]
    fn clipping_does_not_advance_breakpoint() {
        let mut rp = ramp();
        let mut out = vec![0.0f32; 10];
        advance(&mut Oscillator::new(), &mut rp, &mut out, Timebase::new(SR));
        assert_eq!(rp.state().last_rendered, None);
        assert_eq!(rp.state().current_sample, 240 + 10);
        assert_eq!(rp.state().previous_frequency, 440.0);
    }

    #[test]
    fn onset_phase_lands_on_breakpoint_phase() {
        let mut rp = ramp();
        // fade-in null at 5 ms (240), first breakpoint at 10 ms (480)
        let mut out = vec![0.0f32; 240];
        advance(&mut Oscillator::new(), &mut rp, &mut out, Timebase::new(SR));
        assert_eq!(rp.state().last_rendered, Some(1));
        let phase = rp.state().envelope.phase;
        assert!(approx_eq!(f64, phase, wrap_phase(0.5), epsilon = 1e-9), "phase={phase}");
    }

    #[test]
    fn finished_partial_is_not_touched() {
        let mut rp = ramp();
        let mut out = vec![0.0f32; 2000];
        advance(&mut Oscillator::new(), &mut rp, &mut out, Timebase::new(SR));
        let before = *rp.state();
        let mut more = vec![0.0f32; 100];
        assert_eq!(advance(&mut Oscillator::new(), &mut rp, &mut more, Timebase::new(SR)), 0);
        assert_eq!(*rp.state(), before);
        assert!(more.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn zero_budget_is_a_no_op() {
        let mut rp = ramp();
        let before = *rp.state();
        assert_eq!(advance(&mut Oscillator::new(), &mut rp, &mut [], Timebase::new(SR)), 0);
        assert_eq!(*rp.state(), before);
    }
}
