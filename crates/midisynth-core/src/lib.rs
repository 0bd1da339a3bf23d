//! Scheduling core of the midisynth software synthesizer.
//!
//! - **[`MidiSynth`]** - event insertion, lifecycle, and the per-buffer render step
//! - **[`SynthClock`]** - incremental tick/sample time base
//! - **[`SoundfontSet`]** - atomically swapped list of active soundfonts
//! - **[`SoundfontBank`]** - concurrent soundfont registry
//!
//! # Quick Start
//!
//! ```
//! use midisynth_core::{EventSink, MidiEvent, MidiSynth, SoundfontBank};
//!
//! struct Silence;
//! impl EventSink for Silence {
//!     fn handle_event(&mut self, _event: &MidiEvent) {}
//!     fn render(&mut self, _frames: usize, _gain: f32) {}
//! }
//!
//! let bank = SoundfontBank::new();
//! let synth = MidiSynth::new(48000.0)?;
//! synth.select_soundfonts(&bank, &[0])?;
//! synth.insert_event(1_000, 0x90, 60, 100)?;
//! synth.play();
//! synth.process(256, &mut Silence);
//! assert_eq!(synth.pending_events(), 0);
//! # Ok::<(), midisynth_core::Error>(())
//! ```

pub mod error;
pub use error::{Error, Result};

mod clock;
pub use clock::SynthClock;

mod config;
pub use config::SynthConfig;

mod lockfree;
pub use lockfree::{AtomicFloat, AtomicState};

pub mod soundfont;
pub use soundfont::{
    Soundfont, SoundfontBank, SoundfontRegistry, SoundfontSet, DEFAULT_SOUNDFONT_ID,
};

mod state;
pub use state::SynthState;

mod synth;
pub use synth::{EventSink, MidiSynth};

// Re-export event types so users don't need midisynth-events directly
pub use midisynth_events::{EventKind, EventQueue, MidiEvent, SysExData, TICKS_PER_SECOND};
