//! Soundfont lookup by id.

use super::Soundfont;
use core::sync::atomic::{AtomicU32, Ordering};
use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;

/// Id that always resolves to the registry's default soundfont.
pub const DEFAULT_SOUNDFONT_ID: u32 = 0;

/// Device-scoped soundfont lookup used by soundfont selection.
pub trait SoundfontRegistry {
    /// Soundfont used for id `0`.
    fn default_soundfont(&self) -> Arc<Soundfont>;

    fn lookup(&self, id: u32) -> Option<Arc<Soundfont>>;
}

/// Concurrent soundfont registry.
///
/// Lookups take a read shard lock only, so selection never contends with
/// other readers.
pub struct SoundfontBank {
    default: Arc<Soundfont>,
    soundfonts: DashMap<u32, Arc<Soundfont>>,
    next_id: AtomicU32,
}

impl SoundfontBank {
    pub fn new() -> Self {
        Self::with_default("default")
    }

    /// Create a bank whose default soundfont carries `name`.
    pub fn with_default(name: impl Into<String>) -> Self {
        Self {
            default: Arc::new(Soundfont::new(DEFAULT_SOUNDFONT_ID, name)),
            soundfonts: DashMap::new(),
            next_id: AtomicU32::new(1),
        }
    }

    /// Register a new soundfont and return its id.
    pub fn add(&self, name: impl Into<String>) -> u32 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let font = Arc::new(Soundfont::new(id, name));
        debug!("Registered soundfont {}: {}", id, font.name());
        self.soundfonts.insert(id, font);
        id
    }

    /// Unregister a soundfont. Synths that selected it keep their reference.
    pub fn remove(&self, id: u32) -> Option<Arc<Soundfont>> {
        self.soundfonts.remove(&id).map(|(_, font)| font)
    }

    /// Number of registered soundfonts, the default excluded.
    pub fn len(&self) -> usize {
        self.soundfonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.soundfonts.is_empty()
    }

    pub fn ids(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self.soundfonts.iter().map(|entry| *entry.key()).collect();
        ids.sort_unstable();
        ids
    }
}

impl Default for SoundfontBank {
    fn default() -> Self {
        Self::new()
    }
}

impl SoundfontRegistry for SoundfontBank {
    fn default_soundfont(&self) -> Arc<Soundfont> {
        Arc::clone(&self.default)
    }

    fn lookup(&self, id: u32) -> Option<Arc<Soundfont>> {
        if id == DEFAULT_SOUNDFONT_ID {
            return Some(self.default_soundfont());
        }
        self.soundfonts
            .get(&id)
            .map(|entry| Arc::clone(entry.value()))
    }
}
