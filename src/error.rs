//! Centralized error type for the midisynth umbrella crate.
//!
//! Wraps the subsystem errors so `?` propagates naturally across crate boundaries.
//! Queue failures already arrive converted into [`midisynth_core::Error`].

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Synth(#[from] midisynth_core::Error),
}

impl Error {
    /// Underlying synth error.
    pub fn as_synth(&self) -> &midisynth_core::Error {
        match self {
            Error::Synth(e) => e,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
