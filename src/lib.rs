//! # midisynth - MIDI synth scheduling core
//!
//! Orders timestamped MIDI events and exposes the sample-accurate clock a
//! render callback uses to decide which events are due.
//!
//! ## Architecture
//!
//! midisynth is an umbrella crate that coordinates:
//! - **midisynth-events** - Event types and the time-ordered event queue
//! - **midisynth-core** - Synth clock, lifecycle state, soundfont set, render step
//!
//! ## Quick Start
//!
//! ```
//! use midisynth::prelude::*;
//!
//! let engine = SynthEngine::builder()
//!     .sample_rate(44100.0)
//!     .soundfont("piano")
//!     .build()?;
//!
//! engine.select_soundfonts(&[1])?;
//! engine.note_on(0, 0, 60, 100)?;
//! engine.note_off(500_000, 0, 60)?;
//! engine.play();
//! # Ok::<(), midisynth::Error>(())
//! ```
//!
//! The output backend then calls [`SynthEngine::mix`] once per buffer with an
//! [`EventSink`] that renders audio.

/// Re-export of midisynth-core for direct access
pub use midisynth_core as core;

/// Re-export of midisynth-events for direct access
pub use midisynth_events as events;

pub use midisynth_core::{
    EventKind, EventQueue, EventSink, MidiEvent, MidiSynth, Soundfont, SoundfontBank,
    SoundfontRegistry, SoundfontSet, SynthClock, SynthConfig, SynthState, SysExData,
    DEFAULT_SOUNDFONT_ID, TICKS_PER_SECOND,
};

pub mod error;
pub use error::{Error, Result};

mod builder;
mod engine;

pub use builder::SynthEngineBuilder;
pub use engine::SynthEngine;

/// Convenience prelude for common imports
pub mod prelude {
    pub use crate::{SynthEngine, SynthEngineBuilder};

    pub use crate::{EventKind, EventSink, MidiEvent, SynthState};

    pub use crate::{SoundfontBank, SoundfontRegistry};
}
