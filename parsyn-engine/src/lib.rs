//! parsyn engine: incremental rendering of bandwidth-enhanced partials.
//!
//! Crate layout:
//! - [`config`]      : `SynthConfig`, defaults, invalid-partial policy
//! - [`error`]       : `SynthError` and the crate `Result`
//! - [`partial`]     : render partials with fade-in/fade-out nulls
//! - [`active`]      : bounded set of partials currently sounding
//! - [`segment`]     : per-partial segment synthesis over a sample budget
//! - [`synthesizer`] : the session and its `render_block`
//! - [`stream`]      : interleaving and, with `realtime`, a CPAL output stream
//!
//! Partials are prepared once in `setup`; after that `render_block` does not
//! allocate, so a session can be driven from an audio callback. Any sequence
//! of block sizes renders the same samples as one block covering them all.

pub mod active;
pub mod config;
pub mod error;
pub mod partial;
pub mod segment;
pub mod stream;
pub mod synthesizer;

pub use config::{InvalidPartialPolicy, SynthConfig, DEFAULT_FADE_TIME, DEFAULT_SAMPLE_RATE};
pub use error::{InvalidReason, Result, SynthError};
pub use partial::{RenderPartial, SynthesisState};
pub use stream::render_interleaved;
pub use synthesizer::Synthesizer;

#[cfg(feature = "realtime")]
pub use stream::build_output_stream;

// Source-side types, so hosts only need this crate.
pub use parsyn_core::{Breakpoint, Envelope, Oscillate, Oscillator, Partial};
