//! Lock-free cells read from the render thread.

use crate::SynthState;
use atomic_float::AtomicF32;
use core::sync::atomic::{AtomicU8, Ordering};

/// Cache-line aligned atomic f32.
#[derive(Debug)]
#[repr(align(64))]
pub struct AtomicFloat {
    value: AtomicF32,
}

impl AtomicFloat {
    pub fn new(value: f32) -> Self {
        Self {
            value: AtomicF32::new(value),
        }
    }

    #[inline]
    pub fn get(&self) -> f32 {
        self.value.load(Ordering::Acquire)
    }

    #[inline]
    pub fn set(&self, value: f32) {
        self.value.store(value, Ordering::Release);
    }
}

impl Default for AtomicFloat {
    fn default() -> Self {
        Self::new(0.0)
    }
}

/// Atomic [`SynthState`].
#[derive(Debug, Default)]
pub struct AtomicState {
    value: AtomicU8,
}

impl AtomicState {
    pub fn new(state: SynthState) -> Self {
        Self {
            value: AtomicU8::new(state as u8),
        }
    }

    #[inline]
    pub fn get(&self) -> SynthState {
        SynthState::from_u8(self.value.load(Ordering::Acquire))
    }

    #[inline]
    pub fn swap(&self, state: SynthState) -> SynthState {
        SynthState::from_u8(self.value.swap(state as u8, Ordering::AcqRel))
    }
}
