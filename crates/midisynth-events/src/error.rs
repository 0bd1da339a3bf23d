//! Error types for midisynth-events.

use crate::MidiEvent;
use thiserror::Error;

/// Errors that can occur while buffering events.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The allocator refused to grow the queue or copy a sysex payload.
    #[error("Out of memory: failed to allocate {requested} elements")]
    OutOfMemory { requested: usize },
}

/// Result type alias for midisynth-events operations.
pub type Result<T> = core::result::Result<T, Error>;

/// A rejected insertion.
///
/// The queue hands the event back so the caller keeps ownership of any
/// sysex payload it tried to hand over.
#[derive(Debug, Error)]
#[error("Failed to insert event at tick {}: {source}", .event.time())]
pub struct InsertError {
    pub event: MidiEvent,
    #[source]
    pub source: Error,
}

impl InsertError {
    /// Drop the rejected event and keep only the cause.
    pub fn into_error(self) -> Error {
        self.source
    }
}

impl From<InsertError> for Error {
    fn from(e: InsertError) -> Self {
        e.source
    }
}
