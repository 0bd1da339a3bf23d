//! Synth configuration.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Construction-time settings for a [`MidiSynth`](crate::MidiSynth).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthConfig {
    pub sample_rate: f64,
    pub gain: f32,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100.0,
            gain: 1.0,
        }
    }
}

impl SynthConfig {
    pub fn validate(&self) -> Result<()> {
        validate_sample_rate(self.sample_rate)?;
        validate_gain(self.gain)
    }
}

pub(crate) fn validate_sample_rate(sample_rate: f64) -> Result<()> {
    if !(8000.0..=384000.0).contains(&sample_rate) {
        return Err(Error::InvalidConfig(format!(
            "sample_rate {} out of range (8000-384000 Hz)",
            sample_rate
        )));
    }
    Ok(())
}

pub(crate) fn validate_gain(gain: f32) -> Result<()> {
    if !gain.is_finite() || gain < 0.0 {
        return Err(Error::InvalidGain(gain));
    }
    Ok(())
}
