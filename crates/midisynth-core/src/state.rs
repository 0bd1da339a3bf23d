//! Synth lifecycle state.

use core::fmt;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum SynthState {
    /// Constructed or reset; nothing played yet.
    #[default]
    Initial = 0,
    /// The render path is consuming events.
    Playing = 1,
    /// Playback halted; queue and clock were reset.
    Stopped = 2,
}

impl SynthState {
    /// Soundfont selection is only legal while not playing.
    #[inline]
    pub fn allows_soundfont_selection(self) -> bool {
        matches!(self, SynthState::Initial | SynthState::Stopped)
    }

    #[inline]
    pub(crate) fn from_u8(value: u8) -> Self {
        match value {
            1 => SynthState::Playing,
            2 => SynthState::Stopped,
            _ => SynthState::Initial,
        }
    }
}

impl fmt::Display for SynthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SynthState::Initial => "initial",
            SynthState::Playing => "playing",
            SynthState::Stopped => "stopped",
        })
    }
}
