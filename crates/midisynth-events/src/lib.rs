//! Timestamped MIDI events for midisynth.
//!
//! - **[`MidiEvent`]** - tick-stamped channel or system-exclusive event
//! - **[`EventQueue`]** - time-ordered buffer with a read cursor and lazy
//!   reclamation of consumed entries
//!
//! Times are absolute ticks at [`TICKS_PER_SECOND`] resolution, independent
//! of the audio sample rate.
//!
//! # Example
//!
//! ```
//! use midisynth_events::{EventQueue, MidiEvent};
//!
//! let mut queue = EventQueue::new();
//! queue.insert(MidiEvent::note_on(1_000, 0, 60, 100)).unwrap();
//! queue.insert(MidiEvent::note_off(500, 0, 60, 0)).unwrap();
//!
//! assert_eq!(queue.next_time(), Some(500));
//! ```

pub mod error;
pub use error::{Error, InsertError, Result};

mod event;
pub use event::{
    EventKind, MidiEvent, SysExData, CONTROL_CHANGE, NOTE_OFF, NOTE_ON, PITCH_BEND,
    PROGRAM_CHANGE, SYSEX_STATUS,
};

mod queue;
pub use queue::{EventQueue, INITIAL_CAPACITY};

/// Microsecond tick resolution.
pub const TICKS_PER_SECOND: u64 = 1_000_000;
