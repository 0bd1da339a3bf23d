//! Soundfont references and the active soundfont set.
//!
//! Parsing and sample data live outside this crate; a [`Soundfont`] here is
//! the shared handle a synth holds on to while the bank is selected.

mod registry;

pub use registry::{SoundfontBank, SoundfontRegistry, DEFAULT_SOUNDFONT_ID};

use crate::error::{Error, Result};
use std::sync::Arc;

/// Instrument bank shared between the registry and every synth using it.
#[derive(Debug, PartialEq, Eq)]
pub struct Soundfont {
    id: u32,
    name: String,
}

impl Soundfont {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    #[inline]
    pub fn id(&self) -> u32 {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Immutable, ordered list of soundfonts a synth renders with.
///
/// Published as one unit through `ArcSwap`, so the slice and its length can
/// never be observed out of step.
#[derive(Debug, Default)]
pub struct SoundfontSet {
    fonts: Box<[Arc<Soundfont>]>,
}

impl SoundfontSet {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Resolve every id before anything is committed.
    ///
    /// `0` maps to the registry's default soundfont. The first unknown id
    /// fails the whole resolution; the references taken so far are released
    /// when the partial list is dropped.
    pub fn resolve<R>(registry: &R, ids: &[u32]) -> Result<Self>
    where
        R: SoundfontRegistry + ?Sized,
    {
        let mut fonts = Vec::new();
        fonts
            .try_reserve_exact(ids.len())
            .map_err(|_| Error::OutOfMemory)?;

        for &id in ids {
            let font = if id == DEFAULT_SOUNDFONT_ID {
                registry.default_soundfont()
            } else {
                registry.lookup(id).ok_or(Error::InvalidValue { id })?
            };
            fonts.push(font);
        }

        Ok(Self {
            fonts: fonts.into_boxed_slice(),
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[Arc<Soundfont>] {
        &self.fonts
    }

    pub fn get(&self, index: usize) -> Option<&Arc<Soundfont>> {
        self.fonts.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Soundfont>> {
        self.fonts.iter()
    }

    pub fn ids(&self) -> Vec<u32> {
        self.fonts.iter().map(|font| font.id()).collect()
    }
}
