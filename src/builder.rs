//! Builder for configuring and constructing a `SynthEngine`.

use crate::{Result, SynthEngine};
use midisynth_core::{MidiSynth, SoundfontBank, SynthConfig};
use std::sync::Arc;
use tracing::debug;

/// # Example
///
/// ```
/// use midisynth::prelude::*;
///
/// let engine = SynthEngine::builder()
///     .sample_rate(48000.0)
///     .gain(0.8)
///     .default_soundfont("General MIDI")
///     .build()?;
///
/// assert_eq!(engine.sample_rate(), 48000.0);
/// # Ok::<(), midisynth::Error>(())
/// ```
pub struct SynthEngineBuilder {
    config: SynthConfig,
    default_soundfont: String,
    soundfonts: Vec<String>,
}

impl Default for SynthEngineBuilder {
    fn default() -> Self {
        Self {
            config: SynthConfig::default(),
            default_soundfont: "default".to_string(),
            soundfonts: Vec::new(),
        }
    }
}

impl SynthEngineBuilder {
    /// Default: 44100.0
    pub fn sample_rate(mut self, sample_rate: f64) -> Self {
        self.config.sample_rate = sample_rate;
        self
    }

    /// Default: 1.0
    pub fn gain(mut self, gain: f32) -> Self {
        self.config.gain = gain;
        self
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: SynthConfig) -> Self {
        self.config = config;
        self
    }

    /// Name of the soundfont id `0` resolves to.
    pub fn default_soundfont(mut self, name: impl Into<String>) -> Self {
        self.default_soundfont = name.into();
        self
    }

    /// Register a soundfont up front. Ids are assigned in call order, starting at 1.
    pub fn soundfont(mut self, name: impl Into<String>) -> Self {
        self.soundfonts.push(name.into());
        self
    }

    pub fn build(self) -> Result<SynthEngine> {
        let synth = MidiSynth::with_config(&self.config)?;

        let bank = SoundfontBank::with_default(self.default_soundfont);
        for name in self.soundfonts {
            bank.add(name);
        }

        debug!(
            "Built synth engine at {} Hz with {} soundfonts",
            self.config.sample_rate,
            bank.len()
        );

        Ok(SynthEngine::from_parts(Arc::new(synth), Arc::new(bank)))
    }
}
