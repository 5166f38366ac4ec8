//! Output adapters: interleaved frames and (feature `realtime`) a CPAL stream.

use parsyn_core::Oscillate;

use crate::error::{Result, SynthError};
use crate::synthesizer::Synthesizer;

/// Fill `out` with interleaved frames of `channels` channels, the same mono
/// sample on every channel.
///
/// Renders through `scratch` in chunks of at most `scratch.len()` frames. A
/// trailing partial frame in `out` is zeroed and does not advance the session.
pub fn render_interleaved<O: Oscillate>(
    synth: &mut Synthesizer<O>,
    scratch: &mut [f32],
    out: &mut [f32],
    channels: usize,
) -> Result<()> {
    if channels == 0 {
        return Err(SynthError::InvalidParameter { name: "channels", value: 0.0 });
    }
    let frames = out.len() / channels;
    let (body, tail) = out.split_at_mut(frames * channels);
    tail.fill(0.0);
    if body.is_empty() {
        return Ok(());
    }
    if scratch.is_empty() {
        return Err(SynthError::BufferTooSmall { requested: frames, capacity: 0 });
    }

    for chunk in body.chunks_mut(scratch.len() * channels) {
        let n = chunk.len() / channels;
        synth.render_block(scratch, n)?;
        for (frame, &s) in chunk.chunks_exact_mut(channels).zip(&scratch[..n]) {
            frame.fill(s);
        }
    }
    Ok(())
}

#[cfg(feature = "realtime")]
pub use realtime::build_output_stream;

#[cfg(feature = "realtime")]
mod realtime {
    use cpal::traits::{DeviceTrait, StreamTrait};
    use parsyn_core::Oscillate;
    use tracing::{error, info};

    use crate::error::Result;
    use crate::synthesizer::Synthesizer;

    /// Move `synth` into a playing output stream on `device`.
    ///
    /// The session is switched to the stream's sample rate and rendered in
    /// blocks of at most `max_block` frames; scratch space is allocated here,
    /// not in the callback. Output is clamped to [-1, 1].
    pub fn build_output_stream<T, O>(
        device: &cpal::Device,
        config: &cpal::StreamConfig,
        mut synth: Synthesizer<O>,
        max_block: usize,
        err_fn: impl FnMut(cpal::StreamError) + Send + 'static,
    ) -> Result<cpal::Stream>
    where
        T: cpal::Sample + cpal::FromSample<f32> + cpal::SizedSample + Send + 'static,
        O: Oscillate + Send + 'static,
    {
        synth.set_sample_rate(f64::from(config.sample_rate.0))?;
        let channels = usize::from(config.channels).max(1);
        let mut scratch = vec![0.0f32; max_block.max(1)];
        info!(
            rate = config.sample_rate.0,
            channels,
            max_block = scratch.len(),
            partials = synth.partial_count(),
            "building output stream"
        );

        let stream = device.build_output_stream(
            config,
            move |output: &mut [T], _| {
                for chunk in output.chunks_mut(scratch.len() * channels) {
                    let n = chunk.len() / channels;
                    if let Err(e) = synth.render_block(&mut scratch, n) {
                        error!(%e, "render failed; writing silence");
                        chunk.fill(T::EQUILIBRIUM);
                        continue;
                    }
                    for (frame, &s) in chunk.chunks_mut(channels).zip(&scratch[..n]) {
                        frame.fill(T::from_sample(s.clamp(-1.0, 1.0)));
                    }
                }
            },
            err_fn,
            None,
        )?;

        stream.play()?;
        Ok(stream)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SynthConfig;
    use parsyn_core::{Breakpoint, Partial};

    fn synth() -> Synthesizer {
        let p: Partial = [(0.0, Breakpoint::sine(440.0, 0.5)), (0.05, Breakpoint::sine(440.0, 0.5))]
            .into_iter()
            .collect();
        let mut s = Synthesizer::new(SynthConfig::default().with_sample_rate(48_000.0)).unwrap();
        s.setup(&[p], 440.0).unwrap();
        s
    }

    #[test]
    fn interleaves_the_mono_render() {
        let mut mono = vec![0.0f32; 300];
        synth().render_block(&mut mono, 300).unwrap();

        let mut s = synth();
        let mut scratch = [0.0f32; 64];
        let mut out = vec![0.0f32; 600];
        render_interleaved(&mut s, &mut scratch, &mut out, 2).unwrap();

        assert_eq!(s.processed_samples(), 300);
        for (frame, &m) in out.chunks_exact(2).zip(&mono) {
            assert_eq!(frame, [m, m]);
        }
    }

    #[test]
    fn partial_trailing_frame_is_silent() {
        let mut s = synth();
        let mut scratch = [0.0f32; 16];
        let mut out = [9.0f32; 20];
        render_interleaved(&mut s, &mut scratch, &mut out, 3).unwrap();
        assert_eq!(s.processed_samples(), 6);
        assert_eq!(out[18..], [0.0, 0.0]);
    }

    #[test]
    fn rejects_degenerate_layouts() {
        let mut s = synth();
        let mut out = [0.0f32; 8];
        assert!(render_interleaved(&mut s, &mut [0.0; 4], &mut out, 0).is_err());
        assert!(matches!(
            render_interleaved(&mut s, &mut [], &mut out, 2),
            Err(SynthError::BufferTooSmall { requested: 4, capacity: 0 })
        ));
        assert_eq!(s.processed_samples(), 0);
    }
}
