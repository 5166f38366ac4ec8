//! Engine errors.

use thiserror::Error;

/// Why a source partial could not be prepared.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InvalidReason {
    NoBreakpoints,
    NegativeStartTime,
    NonFiniteTime,
}

impl core::fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            InvalidReason::NoBreakpoints => write!(f, "partial has no breakpoints"),
            InvalidReason::NegativeStartTime => write!(f, "partial starts before time zero"),
            InvalidReason::NonFiniteTime => write!(f, "partial has a non-finite breakpoint time"),
        }
    }
}

#[derive(Debug, Error)]
pub enum SynthError {
    #[error("invalid partial at index {index}: {reason}")]
    InvalidPartial { index: usize, reason: InvalidReason },

    #[error("partial {index} starts before its predecessor; partials must be sorted by start time")]
    UnsortedPartials { index: usize },

    #[error("output buffer holds {capacity} samples, {requested} requested")]
    BufferTooSmall { requested: usize, capacity: usize },

    #[error("invalid {name}: {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    #[cfg(feature = "realtime")]
    #[error("output stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[cfg(feature = "realtime")]
    #[error("output stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),
}

pub type Result<T, E = SynthError> = core::result::Result<T, E>;

/// Checks that `value` is finite and strictly positive.
pub(crate) fn positive(name: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(SynthError::InvalidParameter { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_problem() {
        let e = SynthError::BufferTooSmall { requested: 512, capacity: 256 };
        assert_eq!(e.to_string(), "output buffer holds 256 samples, 512 requested");
        let e = SynthError::UnsortedPartials { index: 3 };
        assert!(e.to_string().starts_with("partial 3 starts before its predecessor"));
        let e = SynthError::InvalidPartial { index: 0, reason: InvalidReason::NoBreakpoints };
        assert_eq!(e.to_string(), "invalid partial at index 0: partial has no breakpoints");
    }

    #[test]
    fn positive_rejects_zero_and_nan() {
        assert!(positive("rate", 0.0).is_err());
        assert!(positive("rate", f64::NAN).is_err());
        assert!(positive("rate", -1.0).is_err());
        assert_eq!(positive("rate", 44_100.0).ok(), Some(44_100.0));
    }
}
