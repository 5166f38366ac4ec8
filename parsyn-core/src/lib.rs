#![cfg_attr(not(feature = "std"), no_std)]
//! parsyn core — breakpoints, partials and the bandwidth-enhanced oscillator.
//!
//! Features
//! - `std`      : (default) use the Rust standard library
//! - `no-std`   : build with `#![no_std]` and use `libm` for math
//! - `fast-math`: polynomial cosine in the oscillator hot loop
//!
//! Modules
//! - [`dsp`]        : math backend, phase wrapping, time → sample index
//! - [`breakpoint`] : `Breakpoint` snapshots and null-breakpoint synthesis
//! - [`partial`]    : time-ordered source `Partial`
//! - [`noise`]      : deterministic band-limited noise for bandwidth enhancement
//! - [`oscillator`] : `Oscillate` trait, default `Oscillator`, `Envelope` snapshot
//!
//! Design
//! - No heap allocations outside `Partial`
//! - Every piece of running oscillator state is in a `Copy` snapshot, so the
//!   engine can suspend and resume partials at any sample

extern crate alloc;

pub mod breakpoint;
pub mod dsp;
pub mod noise;
pub mod oscillator;
pub mod partial;

pub use breakpoint::{make_null_after, make_null_before, Breakpoint};
pub use oscillator::{Envelope, Oscillate, Oscillator, Segment};
pub use partial::Partial;

/// Commonly used types/functions for convenience:
pub mod prelude {
    pub use crate::breakpoint::{make_null_after, make_null_before, Breakpoint};
    pub use crate::dsp::{sample_index, wrap_phase, PI, TAU};
    pub use crate::oscillator::{Envelope, Oscillate, Oscillator, Segment};
    pub use crate::partial::Partial;
}
