//! The MIDI synth scheduling core.
//!
//! Two threads share a [`MidiSynth`]:
//!
//! - the control thread inserts events, switches soundfonts, changes state
//!   and sample rate;
//! - the render thread calls [`MidiSynth::process`] once per audio buffer.
//!
//! Queue and clock sit behind one `RwLock`. `process` holds the write lock
//! for the whole drain-and-advance sequence, so an event inserted during a
//! callback is either seen by that callback's drain or left for the next
//! one. Gain, state and the soundfont set can be read without the lock.

use crate::clock::SynthClock;
use crate::config::{validate_gain, validate_sample_rate, SynthConfig};
use crate::error::{Error, Result};
use crate::lockfree::{AtomicFloat, AtomicState};
use crate::soundfont::{SoundfontRegistry, SoundfontSet};
use crate::state::SynthState;
use arc_swap::ArcSwap;
use midisynth_events::{EventQueue, MidiEvent};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, trace};

/// Receives matured events and renders audio between them.
///
/// Implemented by the DSP side. Calls arrive in timeline order: every
/// `render` covers the frames up to the next due event, so events land on
/// the sample their timestamp maps to.
pub trait EventSink {
    fn handle_event(&mut self, event: &MidiEvent);

    /// Render `frames` samples at `gain`.
    fn render(&mut self, frames: usize, gain: f32);
}

#[derive(Debug)]
struct Timeline {
    queue: EventQueue,
    clock: SynthClock,
}

impl Timeline {
    fn reset(&mut self) {
        self.queue.reset();
        self.clock.reset();
    }
}

pub struct MidiSynth {
    timeline: RwLock<Timeline>,
    soundfonts: ArcSwap<SoundfontSet>,
    gain: AtomicFloat,
    state: AtomicState,
}

impl MidiSynth {
    /// Create a synth in [`SynthState::Initial`] with unit gain.
    ///
    /// Fails with [`Error::InvalidConfig`] if `sample_rate` is outside the
    /// supported device range.
    pub fn new(sample_rate: f64) -> Result<Self> {
        validate_sample_rate(sample_rate)?;
        Ok(Self {
            timeline: RwLock::new(Timeline {
                queue: EventQueue::new(),
                clock: SynthClock::new(sample_rate),
            }),
            soundfonts: ArcSwap::from_pointee(SoundfontSet::empty()),
            gain: AtomicFloat::new(1.0),
            state: AtomicState::new(SynthState::Initial),
        })
    }

    pub fn with_config(config: &SynthConfig) -> Result<Self> {
        config.validate()?;
        let synth = Self::new(config.sample_rate)?;
        synth.gain.set(config.gain);
        Ok(synth)
    }

    // ---------------------------------------------------------------------
    // Event insertion
    // ---------------------------------------------------------------------

    /// Queue a channel/control event at tick `time`.
    pub fn insert_event(&self, time: u64, event: u32, param1: i32, param2: i32) -> Result<()> {
        self.insert(MidiEvent::control(time, event, param1, param2))
    }

    /// Queue a system-exclusive event. `data` is copied; the copy belongs to
    /// the queue once inserted and is dropped here if insertion fails.
    pub fn insert_sysex_event(&self, time: u64, data: &[u8]) -> Result<()> {
        self.insert(MidiEvent::sysex(time, data)?)
    }

    /// Queue a prebuilt event.
    pub fn insert(&self, event: MidiEvent) -> Result<()> {
        let time = event.time();
        let mut timeline = self.timeline.write();
        timeline.queue.insert(event)?;
        if timeline.clock.schedule(time) {
            trace!(time, "next synth wake-up moved");
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Soundfonts
    // ---------------------------------------------------------------------

    /// Replace the active soundfont list.
    ///
    /// Only legal in [`SynthState::Initial`] or [`SynthState::Stopped`]. All
    /// ids are resolved before anything is committed; the new set is then
    /// swapped in as one handle and the previous set released afterwards.
    pub fn select_soundfonts<R>(&self, registry: &R, ids: &[u32]) -> Result<()>
    where
        R: SoundfontRegistry + ?Sized,
    {
        let _timeline = self.timeline.write();

        let state = self.state.get();
        if !state.allows_soundfont_selection() {
            return Err(Error::InvalidOperation { state });
        }

        let set = Arc::new(SoundfontSet::resolve(registry, ids)?);
        let previous = self.soundfonts.swap(set);
        debug!(
            "Selected {} soundfonts (replacing {}): {:?}",
            ids.len(),
            previous.len(),
            ids
        );
        drop(previous);
        Ok(())
    }

    /// Snapshot of the active soundfont set. Lock-free.
    pub fn soundfonts(&self) -> Arc<SoundfontSet> {
        self.soundfonts.load_full()
    }

    // ---------------------------------------------------------------------
    // Gain / state
    // ---------------------------------------------------------------------

    pub fn set_gain(&self, gain: f32) -> Result<()> {
        validate_gain(gain)?;
        self.gain.set(gain);
        Ok(())
    }

    #[inline]
    pub fn gain(&self) -> f32 {
        self.gain.get()
    }

    #[inline]
    pub fn state(&self) -> SynthState {
        self.state.get()
    }

    /// Transition to `state`. Entering [`SynthState::Stopped`] discards all
    /// queued events and rewinds the clock.
    pub fn set_state(&self, state: SynthState) {
        let mut timeline = self.timeline.write();
        let previous = self.state.swap(state);
        if state == SynthState::Stopped {
            timeline.reset();
        }
        if previous != state {
            debug!("Synth state {} -> {}", previous, state);
        }
    }

    pub fn play(&self) {
        self.set_state(SynthState::Playing);
    }

    pub fn stop(&self) {
        self.set_state(SynthState::Stopped);
    }

    /// Stop and return to [`SynthState::Initial`].
    pub fn reset(&self) {
        let mut timeline = self.timeline.write();
        timeline.reset();
        let previous = self.state.swap(SynthState::Initial);
        debug!("Synth reset from {}", previous);
    }

    // ---------------------------------------------------------------------
    // Time base
    // ---------------------------------------------------------------------

    pub fn set_sample_rate(&self, sample_rate: f64) -> Result<()> {
        validate_sample_rate(sample_rate)?;
        let mut timeline = self.timeline.write();
        let previous = timeline.clock.sample_rate();
        timeline.clock.set_sample_rate(sample_rate);
        debug!("Synth sample rate {} -> {} Hz", previous, sample_rate);
        Ok(())
    }

    /// Apply the device rate if it differs from the current one.
    pub fn update(&self, sample_rate: f64) -> Result<()> {
        if self.timeline.read().clock.sample_rate() == sample_rate {
            return Ok(());
        }
        self.set_sample_rate(sample_rate)
    }

    pub fn sample_rate(&self) -> f64 {
        self.timeline.read().clock.sample_rate()
    }

    /// Current tick, clamped between the last matured and next pending event.
    pub fn current_time(&self) -> u64 {
        self.timeline.read().clock.current_time()
    }

    /// Time of the earliest unconsumed event.
    pub fn next_event_time(&self) -> Option<u64> {
        self.timeline.read().queue.next_time()
    }

    pub fn pending_events(&self) -> usize {
        self.timeline.read().queue.pending()
    }

    /// Copy of the clock state.
    pub fn clock(&self) -> SynthClock {
        self.timeline.read().clock.clone()
    }

    // ---------------------------------------------------------------------
    // Render path
    // ---------------------------------------------------------------------

    /// Render one buffer of `frames` samples, delivering every event that
    /// matures inside it at its sample position.
    ///
    /// Outside [`SynthState::Playing`] the sink still renders (voice tails),
    /// but no events are consumed and the clock does not move.
    pub fn process<S>(&self, frames: usize, sink: &mut S)
    where
        S: EventSink + ?Sized,
    {
        let gain = self.gain.get();
        let mut timeline = self.timeline.write();

        if self.state.get() != SynthState::Playing {
            sink.render(frames, gain);
            return;
        }

        let Timeline { queue, clock } = &mut *timeline;
        let mut done = 0;
        while done < frames {
            let remaining = frames - done;
            match clock.next_event_time() {
                None => {
                    sink.render(remaining, gain);
                    clock.advance(remaining);
                    done = frames;
                }
                Some(_) if clock.samples_to_next() >= 1.0 => {
                    let todo = remaining.min(clock.samples_to_next() as usize);
                    sink.render(todo, gain);
                    clock.advance(todo);
                    done += todo;
                }
                Some(next) => {
                    let moved = clock.mature(next);
                    while let Some(event) = queue.pop_due(next) {
                        sink.handle_event(event);
                    }
                    if moved {
                        clock.set_next(queue.next_time());
                    } else {
                        clock.resync_next(queue.next_time());
                    }
                }
            }
        }
    }
}

impl std::fmt::Debug for MidiSynth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MidiSynth")
            .field("state", &self.state())
            .field("gain", &self.gain())
            .field("soundfonts", &self.soundfonts.load().ids())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::soundfont::SoundfontBank;
    use midisynth_events::EventKind;

    /// Records each event with the frame it landed on.
    #[derive(Default)]
    struct RecordingSink {
        frame: usize,
        events: Vec<(usize, u64)>,
        renders: Vec<(usize, f32)>,
    }

    impl EventSink for RecordingSink {
        fn handle_event(&mut self, event: &MidiEvent) {
            self.events.push((self.frame, event.time()));
        }

        fn render(&mut self, frames: usize, gain: f32) {
            self.frame += frames;
            self.renders.push((frames, gain));
        }
    }

    fn playing_synth() -> MidiSynth {
        let synth = MidiSynth::new(48000.0).unwrap();
        synth.play();
        synth
    }

    #[test]
    fn test_new_synth_defaults() {
        let synth = MidiSynth::new(48000.0).unwrap();
        assert_eq!(synth.state(), SynthState::Initial);
        assert_eq!(synth.gain(), 1.0);
        assert_eq!(synth.current_time(), 0);
        assert_eq!(synth.next_event_time(), None);
        assert!(synth.soundfonts().is_empty());
    }

    #[test]
    fn test_with_config_applies_gain() {
        let synth = MidiSynth::with_config(&SynthConfig {
            sample_rate: 96000.0,
            gain: 0.5,
        })
        .unwrap();
        assert_eq!(synth.gain(), 0.5);
        assert_eq!(synth.sample_rate(), 96000.0);
    }

    #[test]
    fn test_insert_orders_events() {
        let synth = MidiSynth::new(48000.0).unwrap();
        synth.insert_event(100, 0x90, 1, 0).unwrap();
        synth.insert_event(50, 0x90, 2, 0).unwrap();
        synth.insert_event(50, 0x90, 3, 0).unwrap();
        synth.insert_event(200, 0x90, 4, 0).unwrap();

        assert_eq!(synth.next_event_time(), Some(50));
        assert_eq!(synth.pending_events(), 4);
        assert_eq!(synth.clock().next_event_time(), Some(50));
    }

    #[test]
    fn test_process_delivers_events_on_their_sample() {
        let synth = playing_synth();
        synth.insert_event(2_000, 0x80, 60, 0).unwrap();
        synth.insert_event(1_000, 0x90, 60, 100).unwrap();

        let mut sink = RecordingSink::default();
        synth.process(128, &mut sink);

        assert_eq!(sink.frame, 128);
        assert_eq!(sink.events, vec![(48, 1_000), (96, 2_000)]);
        assert_eq!(synth.pending_events(), 0);
        assert_eq!(synth.clock().last_event_time(), 2_000);
        assert_eq!(synth.clock().next_event_time(), None);
    }

    #[test]
    fn test_process_spans_buffers() {
        let synth = playing_synth();
        synth.insert_event(3_000, 0x90, 60, 100).unwrap();

        let mut sink = RecordingSink::default();
        synth.process(64, &mut sink);
        assert!(sink.events.is_empty());
        assert_eq!(synth.current_time(), 1_333);

        synth.process(128, &mut sink);
        assert_eq!(sink.events, vec![(144, 3_000)]);
    }

    #[test]
    fn test_simultaneous_events_delivered_together() {
        let synth = playing_synth();
        synth.insert_event(1_000, 0x90, 60, 100).unwrap();
        synth.insert_event(1_000, 0x90, 64, 100).unwrap();
        synth.insert_sysex_event(1_000, &[0xF0, 0x7F, 0xF7]).unwrap();

        let mut sink = RecordingSink::default();
        synth.process(256, &mut sink);
        assert_eq!(sink.events, vec![(48, 1_000), (48, 1_000), (48, 1_000)]);
    }

    #[test]
    fn test_event_inserted_at_zero_fires_immediately() {
        let synth = playing_synth();
        synth.insert_event(0, 0xB0, 7, 100).unwrap();

        let mut sink = RecordingSink::default();
        synth.process(32, &mut sink);
        assert_eq!(sink.events, vec![(0, 0)]);
        assert_eq!(sink.renders, vec![(32, 1.0)]);
    }

    #[test]
    fn test_late_event_does_not_pull_next_event_forward() {
        let synth = playing_synth();
        synth.insert_event(1_000, 0x90, 60, 100).unwrap();
        let mut sink = RecordingSink::default();
        synth.process(49, &mut sink);
        assert_eq!(sink.events, vec![(48, 1_000)]);

        synth.insert_event(2_000, 0x80, 60, 0).unwrap();
        synth.insert_event(500, 0x90, 64, 100).unwrap();
        synth.process(100, &mut sink);

        // The late event fires at once; 2000 still lands 1000 ticks after 1000.
        assert_eq!(sink.events, vec![(48, 1_000), (49, 500), (96, 2_000)]);
        assert_eq!(synth.clock().last_event_time(), 2_000);
    }

    #[test]
    fn test_new_rejects_unsupported_sample_rate() {
        for rate in [0.0, -48000.0, f64::NAN, 1_000_000.0] {
            assert!(
                matches!(MidiSynth::new(rate), Err(Error::InvalidConfig(_))),
                "{rate} accepted"
            );
        }
        assert!(MidiSynth::new(8000.0).is_ok());
    }

    #[test]
    fn test_process_idle_when_not_playing() {
        let synth = MidiSynth::new(48000.0).unwrap();
        synth.insert_event(0, 0x90, 60, 100).unwrap();

        let mut sink = RecordingSink::default();
        synth.process(64, &mut sink);
        assert!(sink.events.is_empty());
        assert_eq!(sink.frame, 64);
        assert_eq!(synth.clock().samples_since_last(), 0.0);
        assert_eq!(synth.pending_events(), 1);
    }

    #[test]
    fn test_process_uses_current_gain() {
        let synth = playing_synth();
        synth.set_gain(0.25).unwrap();

        let mut sink = RecordingSink::default();
        synth.process(16, &mut sink);
        assert_eq!(sink.renders, vec![(16, 0.25)]);
    }

    #[test]
    fn test_stop_discards_queue_and_rewinds_clock() {
        let synth = playing_synth();
        synth.insert_event(1_000, 0x90, 60, 100).unwrap();
        synth.insert_event(5_000, 0x80, 60, 0).unwrap();
        let mut sink = RecordingSink::default();
        synth.process(100, &mut sink);

        synth.stop();
        assert_eq!(synth.state(), SynthState::Stopped);
        assert_eq!(synth.pending_events(), 0);
        let clock = synth.clock();
        assert_eq!(clock.last_event_time(), 0);
        assert_eq!(clock.next_event_time(), None);
        assert_eq!(clock.samples_since_last(), 0.0);
        assert_eq!(clock.samples_to_next(), 0.0);
    }

    #[test]
    fn test_reset_returns_to_initial() {
        let synth = playing_synth();
        synth.insert_event(10, 0x90, 60, 100).unwrap();
        synth.reset();
        assert_eq!(synth.state(), SynthState::Initial);
        assert_eq!(synth.pending_events(), 0);
    }

    #[test]
    fn test_select_soundfonts_replaces_set() {
        let bank = SoundfontBank::new();
        let piano = bank.add("piano");
        let drums = bank.add("drums");
        let synth = MidiSynth::new(44100.0).unwrap();

        synth.select_soundfonts(&bank, &[piano, 0]).unwrap();
        assert_eq!(synth.soundfonts().ids(), vec![piano, 0]);

        let piano_font = bank.lookup(piano).unwrap();
        let held = Arc::strong_count(&piano_font);

        synth.select_soundfonts(&bank, &[drums]).unwrap();
        assert_eq!(synth.soundfonts().ids(), vec![drums]);
        assert_eq!(Arc::strong_count(&piano_font), held - 1);
    }

    #[test]
    fn test_select_soundfonts_while_playing_is_rejected() {
        let bank = SoundfontBank::new();
        let piano = bank.add("piano");
        let synth = MidiSynth::new(44100.0).unwrap();
        synth.select_soundfonts(&bank, &[piano]).unwrap();
        let before = synth.soundfonts();

        synth.play();
        let err = synth.select_soundfonts(&bank, &[0]).unwrap_err();
        assert_eq!(
            err,
            Error::InvalidOperation {
                state: SynthState::Playing
            }
        );
        assert!(Arc::ptr_eq(&before, &synth.soundfonts()));

        synth.stop();
        synth.select_soundfonts(&bank, &[0]).unwrap();
        assert_eq!(synth.soundfonts().ids(), vec![0]);
    }

    #[test]
    fn test_select_unknown_soundfont_changes_nothing() {
        let bank = SoundfontBank::new();
        let piano = bank.add("piano");
        let synth = MidiSynth::new(44100.0).unwrap();
        synth.select_soundfonts(&bank, &[piano]).unwrap();

        let before = synth.soundfonts();
        let piano_font = bank.lookup(piano).unwrap();
        let held = Arc::strong_count(&piano_font);

        let err = synth.select_soundfonts(&bank, &[0, 77]).unwrap_err();
        assert_eq!(err, Error::InvalidValue { id: 77 });
        assert!(Arc::ptr_eq(&before, &synth.soundfonts()));
        assert_eq!(Arc::strong_count(&piano_font), held);
    }

    #[test]
    fn test_gain_validation() {
        let synth = MidiSynth::new(44100.0).unwrap();
        assert!(synth.set_gain(2.0).is_ok());
        assert_eq!(synth.gain(), 2.0);
        assert_eq!(synth.set_gain(-1.0), Err(Error::InvalidGain(-1.0)));
        assert_eq!(synth.gain(), 2.0);
    }

    #[test]
    fn test_update_only_changes_differing_rate() {
        let synth = MidiSynth::new(48000.0).unwrap();
        synth.update(48000.0).unwrap();
        assert_eq!(synth.sample_rate(), 48000.0);
        synth.update(44100.0).unwrap();
        assert_eq!(synth.clock().samples_per_tick(), 44100.0 / 1_000_000.0);
        assert!(synth.update(0.0).is_err());
        assert_eq!(synth.clock().samples_per_tick(), 44100.0 / 1_000_000.0);
    }

    #[test]
    fn test_sysex_payload_reaches_sink() {
        struct SysexSink(Vec<Vec<u8>>);
        impl EventSink for SysexSink {
            fn handle_event(&mut self, event: &MidiEvent) {
                if let EventKind::SysEx(data) = event.kind() {
                    self.0.push(data.as_bytes().to_vec());
                }
            }
            fn render(&mut self, _frames: usize, _gain: f32) {}
        }

        let synth = playing_synth();
        synth.insert_sysex_event(0, &[0xF0, 0x43, 0x10, 0xF7]).unwrap();
        let mut sink = SysexSink(Vec::new());
        synth.process(8, &mut sink);
        assert_eq!(sink.0, vec![vec![0xF0, 0x43, 0x10, 0xF7]]);
    }
}
