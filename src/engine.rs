//! SynthEngine: the synth plus its soundfont registry, and the pull entry
//! point an audio output backend drives.

use crate::Result;
use midisynth_core::{
    EventSink, MidiEvent, MidiSynth, SoundfontBank, SoundfontSet, SynthState,
};
use std::sync::Arc;

/// Scheduling engine shared between the application and the output backend.
///
/// Cloning is cheap; clones share the same synth and registry.
///
/// # Example
///
/// ```
/// use midisynth::prelude::*;
///
/// struct Silence;
/// impl EventSink for Silence {
///     fn handle_event(&mut self, _event: &MidiEvent) {}
///     fn render(&mut self, _frames: usize, _gain: f32) {}
/// }
///
/// let engine = SynthEngine::builder().sample_rate(48000.0).build()?;
/// engine.select_soundfonts(&[0])?;
/// engine.note_on(0, 0, 60, 100)?;
/// engine.play();
///
/// // Called by the output backend once per buffer.
/// engine.mix(256, 48000.0, &mut Silence)?;
/// # Ok::<(), midisynth::Error>(())
/// ```
#[derive(Clone)]
pub struct SynthEngine {
    synth: Arc<MidiSynth>,
    soundfonts: Arc<SoundfontBank>,
}

impl SynthEngine {
    pub fn builder() -> crate::SynthEngineBuilder {
        crate::SynthEngineBuilder::default()
    }

    pub(crate) fn from_parts(synth: Arc<MidiSynth>, soundfonts: Arc<SoundfontBank>) -> Self {
        Self { synth, soundfonts }
    }

    pub fn synth(&self) -> &Arc<MidiSynth> {
        &self.synth
    }

    pub fn soundfont_bank(&self) -> &Arc<SoundfontBank> {
        &self.soundfonts
    }

    // ---------------------------------------------------------------------
    // Pull contract
    // ---------------------------------------------------------------------

    /// Produce one output buffer of `frames` samples at `sample_rate`.
    ///
    /// Picks up a device rate change first, then drains due events into
    /// `sink` and advances the clock.
    pub fn mix<S>(&self, frames: usize, sample_rate: f64, sink: &mut S) -> Result<()>
    where
        S: EventSink + ?Sized,
    {
        self.synth.update(sample_rate)?;
        self.synth.process(frames, sink);
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Control API
    // ---------------------------------------------------------------------

    pub fn insert_event(&self, time: u64, event: u32, param1: i32, param2: i32) -> Result<()> {
        Ok(self.synth.insert_event(time, event, param1, param2)?)
    }

    pub fn insert_sysex_event(&self, time: u64, data: &[u8]) -> Result<()> {
        Ok(self.synth.insert_sysex_event(time, data)?)
    }

    pub fn note_on(&self, time: u64, channel: u8, note: u8, velocity: u8) -> Result<()> {
        Ok(self
            .synth
            .insert(MidiEvent::note_on(time, channel, note, velocity))?)
    }

    pub fn note_off(&self, time: u64, channel: u8, note: u8) -> Result<()> {
        Ok(self.synth.insert(MidiEvent::note_off(time, channel, note, 0))?)
    }

    pub fn control_change(&self, time: u64, channel: u8, cc: u8, value: u8) -> Result<()> {
        Ok(self
            .synth
            .insert(MidiEvent::control_change(time, channel, cc, value))?)
    }

    /// Register a soundfont with this engine's registry and return its id.
    pub fn add_soundfont(&self, name: impl Into<String>) -> u32 {
        self.soundfonts.add(name)
    }

    /// Select soundfonts by id from this engine's registry (`0` = default).
    pub fn select_soundfonts(&self, ids: &[u32]) -> Result<()> {
        Ok(self.synth.select_soundfonts(self.soundfonts.as_ref(), ids)?)
    }

    pub fn active_soundfonts(&self) -> Arc<SoundfontSet> {
        self.synth.soundfonts()
    }

    pub fn set_gain(&self, gain: f32) -> Result<()> {
        Ok(self.synth.set_gain(gain)?)
    }

    pub fn gain(&self) -> f32 {
        self.synth.gain()
    }

    pub fn set_state(&self, state: SynthState) {
        self.synth.set_state(state);
    }

    pub fn state(&self) -> SynthState {
        self.synth.state()
    }

    pub fn play(&self) {
        self.synth.play();
    }

    pub fn stop(&self) {
        self.synth.stop();
    }

    pub fn reset(&self) {
        self.synth.reset();
    }

    pub fn set_sample_rate(&self, sample_rate: f64) -> Result<()> {
        Ok(self.synth.set_sample_rate(sample_rate)?)
    }

    pub fn sample_rate(&self) -> f64 {
        self.synth.sample_rate()
    }

    pub fn current_time(&self) -> u64 {
        self.synth.current_time()
    }
}

impl std::fmt::Debug for SynthEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SynthEngine")
            .field("synth", &self.synth)
            .field("registered_soundfonts", &self.soundfonts.len())
            .finish()
    }
}
