//! The synthesis session and its incremental block renderer.
//!
//! A [`Synthesizer`] owns the prepared partials, the active set and one
//! oscillator that is shared by every partial (each partial brings its own
//! envelope snapshot). The caller owns the output buffer and hands it in on
//! every [`Synthesizer::render_block`] call.
//!
//! Rendering in blocks of any size gives the same samples as rendering
//! everything at once:
//! - active partials resume from their snapshot at the first sample of the block
//! - newly due partials start at their exact offset inside the block
//! - contributions are summed in partial order regardless of block boundaries

use parsyn_core::{Oscillate, Oscillator, Partial};
use tracing::{debug, trace};

use crate::active::ActiveSet;
use crate::config::{check_fade_time, SynthConfig};
use crate::error::{positive, Result, SynthError};
use crate::partial::{prepare, RenderPartial};
use crate::segment::{advance, Timebase};

/// Per-partial noise seed; spreads consecutive indices over the seed space.
#[inline]
fn noise_seed(index: usize) -> u32 {
    (index as u32).wrapping_mul(0x9E37_79B9).wrapping_add(1)
}

/// One synthesis session: prepared partials, the active set and the shared
/// oscillator. Rendering goes through [`render_block`](Self::render_block).
pub struct Synthesizer<O: Oscillate = Oscillator> {
    config: SynthConfig,
    timebase: Timebase,
    /// pitch the partials were analysed at, Hz
    pitch: f64,
    partials: Box<[RenderPartial]>,
    next_partial: usize,
    processed_samples: usize,
    active: ActiveSet,
    osc: O,
}

impl<O: Oscillate> core::fmt::Debug for Synthesizer<O> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Synthesizer")
            .field("config", &self.config)
            .field("partials", &self.partials.len())
            .field("next_partial", &self.next_partial)
            .field("processed_samples", &self.processed_samples)
            .field("active", &self.active.len())
            .finish()
    }
}

impl Synthesizer<Oscillator> {
    pub fn new(config: SynthConfig) -> Result<Self> {
        Self::with_oscillator(config, Oscillator::new())
    }
}

impl<O: Oscillate> Synthesizer<O> {
    /// Session rendering through `osc`. No partials until [`setup`](Self::setup).
    pub fn with_oscillator(config: SynthConfig, osc: O) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            timebase: Timebase::new(config.sample_rate),
            pitch: 1.0,
            partials: Box::default(),
            next_partial: 0,
            processed_samples: 0,
            active: ActiveSet::default(),
            osc,
        })
    }

    /// Replace the session's partials with `partials`, analysed at `pitch` Hz.
    ///
    /// Partials must be sorted by start time. On error the previous session
    /// is left as it was. On success the session is rewound and renders at
    /// the original pitch.
    pub fn setup(&mut self, partials: &[Partial], pitch: f64) -> Result<()> {
        let pitch = positive("pitch", pitch)?;
        let prepared = prepare(partials, self.config.fade_time, self.config.invalid_partials)?;

        self.active = ActiveSet::with_capacity(prepared.len());
        self.partials = prepared;
        self.pitch = pitch;
        self.osc.set_frequency_scaling(1.0);
        self.reset();
        Ok(())
    }

    /// Samples already scheduled in flight keep their indices; a rate change
    /// mid-stream is audible. Partials whose start falls behind the stream
    /// after the change join at the next block instead of running late.
    pub fn set_sample_rate(&mut self, rate: f64) -> Result<()> {
        let rate = positive("sample rate", rate)?;
        self.config.sample_rate = rate;
        self.timebase = Timebase::new(rate);
        debug!(rate, "sample rate set");
        Ok(())
    }

    /// Applies to the next [`setup`](Self::setup).
    pub fn set_fade_time(&mut self, seconds: f64) -> Result<()> {
        self.config.fade_time = check_fade_time(seconds)?;
        Ok(())
    }

    /// Render at `frequency` Hz instead of the analysed pitch, from the next
    /// sample on.
    pub fn set_pitch(&mut self, frequency: f64) -> Result<()> {
        let frequency = positive("pitch", frequency)?;
        let scale = frequency / self.pitch;
        self.osc.set_frequency_scaling(scale);
        debug!(frequency, scale, "pitch set");
        Ok(())
    }

    /// Start over from time zero without preparing the partials again.
    pub fn reset(&mut self) {
        self.next_partial = 0;
        self.processed_samples = 0;
        self.active.clear();
        debug!(partials = self.partials.len(), "reset");
    }

    /// Render the next `samples` samples into `out[..samples]`.
    ///
    /// `out` is overwritten, not mixed into. Fails without touching `out` or
    /// the session when `out` is shorter than `samples`.
    pub fn render_block(&mut self, out: &mut [f32], samples: usize) -> Result<()> {
        if out.len() < samples {
            return Err(SynthError::BufferTooSmall { requested: samples, capacity: out.len() });
        }
        if samples == 0 {
            return Ok(());
        }

        let block_start = self.processed_samples;
        // due-checks below use the end of the block
        self.processed_samples = block_start.saturating_add(samples);
        let processed = self.processed_samples;

        let window = &mut out[..samples];
        window.fill(0.0);

        let Self { timebase, partials, next_partial, active, osc, .. } = self;
        let timebase = *timebase;

        active.retain(|index| {
            let partial = &mut partials[index];
            advance(osc, partial, window, timebase);
            !partial.is_finished()
        });

        while let Some(partial) = partials.get_mut(*next_partial) {
            let start = partial.start_sample(timebase.rate());
            if start > processed {
                break;
            }
            // a partial left behind by a sample rate change joins in time
            partial.activate(start.max(block_start), noise_seed(*next_partial));

            let offset = start.saturating_sub(block_start).min(samples);
            advance(osc, partial, &mut window[offset..], timebase);
            trace!(index = *next_partial, start, "partial activated");

            if !partial.is_finished() {
                active.push(*next_partial);
            }
            *next_partial += 1;
        }

        Ok(())
    }

    #[inline] pub fn config(&self) -> &SynthConfig { &self.config }
    #[inline] pub fn sample_rate(&self) -> f64 { self.timebase.rate() }
    #[inline] pub fn fade_time(&self) -> f64 { self.config.fade_time }
    #[inline] pub fn frequency_scaling(&self) -> f64 { self.osc.frequency_scaling() }
    #[inline] pub fn processed_samples(&self) -> usize { self.processed_samples }
    #[inline] pub fn partial_count(&self) -> usize { self.partials.len() }
    #[inline] pub fn active_count(&self) -> usize { self.active.len() }
    #[inline] pub fn partials(&self) -> &[RenderPartial] { &self.partials }
    #[inline] pub fn oscillator(&self) -> &O { &self.osc }

    /// Every partial has been activated and has retired.
    #[inline]
    pub fn is_finished(&self) -> bool {
        self.next_partial == self.partials.len() && self.active.is_empty()
    }
}
