//! Session configuration.
//!
//! `SynthConfig` deserializes with `#[serde(default)]`, so hosts can store a
//! partial config (e.g. only the fade time) and let the rest default.

use serde::{Deserialize, Serialize};

use crate::error::{positive, Result, SynthError};

/// Default fade applied at both ends of every partial (1 ms).
pub const DEFAULT_FADE_TIME: f64 = 0.001;

pub const DEFAULT_SAMPLE_RATE: f64 = 44_100.0;

/// What `setup` does with a partial that cannot be rendered.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InvalidPartialPolicy {
    /// Log it and leave it out; the remaining partials are prepared.
    #[default]
    Drop,
    /// Fail `setup` and keep the previous session.
    Reject,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthConfig {
    /// Hz
    pub sample_rate: f64,
    /// seconds
    pub fade_time: f64,
    pub invalid_partials: InvalidPartialPolicy,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            fade_time: DEFAULT_FADE_TIME,
            invalid_partials: InvalidPartialPolicy::Drop,
        }
    }
}

impl SynthConfig {
    #[inline]
    pub fn with_sample_rate(mut self, rate: f64) -> Self {
        self.sample_rate = rate;
        self
    }

    #[inline]
    pub fn with_fade_time(mut self, seconds: f64) -> Self {
        self.fade_time = seconds;
        self
    }

    #[inline]
    pub fn with_invalid_partials(mut self, policy: InvalidPartialPolicy) -> Self {
        self.invalid_partials = policy;
        self
    }

    pub fn validate(&self) -> Result<()> {
        positive("sample rate", self.sample_rate)?;
        check_fade_time(self.fade_time)?;
        Ok(())
    }
}

/// Fade time must be finite and non-negative; zero disables the fades.
pub(crate) fn check_fade_time(seconds: f64) -> Result<f64> {
    if seconds.is_finite() && seconds >= 0.0 {
        Ok(seconds)
    } else {
        Err(SynthError::InvalidParameter { name: "fade time", value: seconds })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(SynthConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_bad_values() {
        assert!(SynthConfig::default().with_sample_rate(0.0).validate().is_err());
        assert!(SynthConfig::default().with_fade_time(-0.1).validate().is_err());
        assert!(SynthConfig::default().with_fade_time(f64::INFINITY).validate().is_err());
        assert!(SynthConfig::default().with_fade_time(0.0).validate().is_ok());
    }

    #[test]
    fn missing_fields_take_defaults() {
        let cfg: SynthConfig =
            serde_json::from_str(r#"{ "fade_time": 0.01, "invalid_partials": "reject" }"#).unwrap();
        assert_eq!(cfg.fade_time, 0.01);
        assert_eq!(cfg.sample_rate, DEFAULT_SAMPLE_RATE);
        assert_eq!(cfg.invalid_partials, InvalidPartialPolicy::Reject);
    }
}
