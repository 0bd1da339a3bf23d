//! Timestamped MIDI events.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Status byte of a system-exclusive message.
pub const SYSEX_STATUS: u32 = 0xF0;

pub const NOTE_OFF: u32 = 0x80;
pub const NOTE_ON: u32 = 0x90;
pub const CONTROL_CHANGE: u32 = 0xB0;
pub const PROGRAM_CHANGE: u32 = 0xC0;
pub const PITCH_BEND: u32 = 0xE0;

/// Owned system-exclusive payload.
///
/// Freed exactly once, when the event holding it is dropped.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SysExData(Box<[u8]>);

impl SysExData {
    /// Copy `bytes` into a freshly allocated payload.
    ///
    /// Uses a fallible reservation so allocation failure surfaces as
    /// [`Error::OutOfMemory`] instead of aborting.
    pub fn copy_from(bytes: &[u8]) -> Result<Self> {
        let mut data = Vec::new();
        data.try_reserve_exact(bytes.len())
            .map_err(|_| Error::OutOfMemory {
                requested: bytes.len(),
            })?;
        data.extend_from_slice(bytes);
        Ok(Self(data.into_boxed_slice()))
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Box<[u8]>> for SysExData {
    fn from(data: Box<[u8]>) -> Self {
        Self(data)
    }
}

impl From<Vec<u8>> for SysExData {
    fn from(data: Vec<u8>) -> Self {
        Self(data.into_boxed_slice())
    }
}

/// Event payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    /// Compact channel/control message.
    Control { event: u32, param1: i32, param2: i32 },
    /// System-exclusive block with an owned payload.
    SysEx(SysExData),
}

/// MIDI event stamped with an absolute tick time (1 tick = 1 µs).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MidiEvent {
    time: u64,
    kind: EventKind,
}

impl MidiEvent {
    #[inline]
    pub fn new(time: u64, kind: EventKind) -> Self {
        Self { time, kind }
    }

    #[inline]
    pub fn control(time: u64, event: u32, param1: i32, param2: i32) -> Self {
        Self {
            time,
            kind: EventKind::Control {
                event,
                param1,
                param2,
            },
        }
    }

    /// Build a sysex event by copying `bytes`.
    pub fn sysex(time: u64, bytes: &[u8]) -> Result<Self> {
        Ok(Self {
            time,
            kind: EventKind::SysEx(SysExData::copy_from(bytes)?),
        })
    }

    #[inline]
    pub fn note_on(time: u64, channel: u8, note: u8, velocity: u8) -> Self {
        Self::control(
            time,
            NOTE_ON | (channel & 0x0F) as u32,
            note as i32,
            velocity as i32,
        )
    }

    #[inline]
    pub fn note_off(time: u64, channel: u8, note: u8, velocity: u8) -> Self {
        Self::control(
            time,
            NOTE_OFF | (channel & 0x0F) as u32,
            note as i32,
            velocity as i32,
        )
    }

    #[inline]
    pub fn control_change(time: u64, channel: u8, cc: u8, value: u8) -> Self {
        Self::control(
            time,
            CONTROL_CHANGE | (channel & 0x0F) as u32,
            cc as i32,
            value as i32,
        )
    }

    #[inline]
    pub fn program_change(time: u64, channel: u8, program: u8) -> Self {
        Self::control(
            time,
            PROGRAM_CHANGE | (channel & 0x0F) as u32,
            program as i32,
            0,
        )
    }

    /// 14-bit bend split into LSB/MSB like the wire format.
    #[inline]
    pub fn pitch_bend(time: u64, channel: u8, bend: u16) -> Self {
        Self::control(
            time,
            PITCH_BEND | (channel & 0x0F) as u32,
            (bend & 0x7F) as i32,
            ((bend >> 7) & 0x7F) as i32,
        )
    }

    #[inline]
    pub fn time(&self) -> u64 {
        self.time
    }

    #[inline]
    pub fn kind(&self) -> &EventKind {
        &self.kind
    }

    #[inline]
    pub fn into_kind(self) -> EventKind {
        self.kind
    }

    #[inline]
    pub fn is_sysex(&self) -> bool {
        matches!(self.kind, EventKind::SysEx(_))
    }

    /// Event code; `0xF0` for sysex.
    #[inline]
    pub fn status(&self) -> u32 {
        match self.kind {
            EventKind::Control { event, .. } => event,
            EventKind::SysEx(_) => SYSEX_STATUS,
        }
    }

    #[inline]
    pub fn sysex_data(&self) -> Option<&[u8]> {
        match &self.kind {
            EventKind::SysEx(data) => Some(data.as_bytes()),
            EventKind::Control { .. } => None,
        }
    }
}
