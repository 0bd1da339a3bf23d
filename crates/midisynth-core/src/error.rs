//! Error types for midisynth-core.

use crate::SynthState;
use thiserror::Error;

/// Errors returned by synth control operations.
///
/// Every failing operation leaves the synth in the state it had before the call.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// Allocation failed (queue growth, sysex copy, or soundfont array).
    #[error("Out of memory")]
    OutOfMemory,

    /// A soundfont id could not be resolved.
    #[error("Invalid value: unknown soundfont id {id}")]
    InvalidValue { id: u32 },

    /// The operation is not allowed in the current state.
    #[error("Invalid operation while {state}")]
    InvalidOperation { state: SynthState },

    #[error("Invalid gain: {0}. Must be finite and non-negative")]
    InvalidGain(f32),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

impl From<midisynth_events::Error> for Error {
    fn from(e: midisynth_events::Error) -> Self {
        match e {
            midisynth_events::Error::OutOfMemory { .. } => Error::OutOfMemory,
        }
    }
}

impl From<midisynth_events::InsertError> for Error {
    fn from(e: midisynth_events::InsertError) -> Self {
        e.into_error().into()
    }
}

/// Result type alias.
pub type Result<T> = core::result::Result<T, Error>;
