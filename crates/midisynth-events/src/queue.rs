//! Time-ordered event queue with a read cursor.
//!
//! Events live in one contiguous buffer sorted by tick time. The owning synth
//! walks a cursor (`pos`) forward as events mature; everything before the
//! cursor is stale and kept only until the space is needed again. When the
//! buffer fills up, stale entries are reclaimed first and the buffer only
//! doubles when there is nothing to reclaim.

use tracing::trace;

use crate::error::{Error, InsertError, Result};
use crate::event::MidiEvent;

/// Capacity of the first allocation.
pub const INITIAL_CAPACITY: usize = 16;

#[derive(Debug, Default)]
pub struct EventQueue {
    events: Vec<MidiEvent>,
    /// Logical capacity; `events` never reallocates below this.
    capacity: usize,
    pos: usize,
}

impl EventQueue {
    /// Create an empty queue. Nothing is allocated until the first insert.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every stored event (stale ones included) and release the buffer.
    pub fn reset(&mut self) {
        self.events = Vec::new();
        self.capacity = 0;
        self.pos = 0;
    }

    /// Insert `event` after every queued event with the same or an earlier time.
    ///
    /// On allocation failure the queue is left untouched and the event is
    /// returned inside the error.
    pub fn insert(&mut self, event: MidiEvent) -> core::result::Result<(), InsertError> {
        if self.events.len() == self.capacity {
            if self.pos > 0 {
                self.reclaim_stale();
            } else if let Err(source) = self.grow() {
                return Err(InsertError { event, source });
            }
        }

        let index = self.insertion_point(event.time());
        self.events.insert(index, event);
        Ok(())
    }

    fn reclaim_stale(&mut self) {
        let stale = self.pos;
        // Dropping the drained events frees their sysex payloads.
        self.events.drain(..stale);
        self.pos = 0;
        trace!(stale, live = self.events.len(), "reclaimed stale events");
    }

    fn grow(&mut self) -> Result<()> {
        let new_capacity = match self.capacity {
            0 => INITIAL_CAPACITY,
            n => n.checked_mul(2).ok_or(Error::OutOfMemory {
                requested: usize::MAX,
            })?,
        };
        self.events
            .try_reserve_exact(new_capacity - self.events.len())
            .map_err(|_| Error::OutOfMemory {
                requested: new_capacity,
            })?;
        trace!(from = self.capacity, to = new_capacity, "grew event queue");
        self.capacity = new_capacity;
        Ok(())
    }

    fn insertion_point(&self, time: u64) -> usize {
        let mut index = self.pos + self.events[self.pos..].partition_point(|e| e.time() < time);
        while index < self.events.len() && self.events[index].time() == time {
            index += 1;
        }
        index
    }

    /// Next unconsumed event.
    #[inline]
    pub fn peek(&self) -> Option<&MidiEvent> {
        self.events.get(self.pos)
    }

    /// Time of the next unconsumed event.
    #[inline]
    pub fn next_time(&self) -> Option<u64> {
        self.peek().map(MidiEvent::time)
    }

    /// Move the cursor past the next event and return it.
    ///
    /// The event stays in storage (stale) until reclaimed or reset.
    pub fn advance(&mut self) -> Option<&MidiEvent> {
        if self.pos == self.events.len() {
            return None;
        }
        self.pos += 1;
        self.events.get(self.pos - 1)
    }

    /// Consume the next event if its time is at or before `time`.
    pub fn pop_due(&mut self, time: u64) -> Option<&MidiEvent> {
        match self.next_time() {
            Some(t) if t <= time => self.advance(),
            _ => None,
        }
    }

    /// Unconsumed events in time order.
    #[inline]
    pub fn live(&self) -> &[MidiEvent] {
        &self.events[self.pos..]
    }

    pub fn iter(&self) -> impl Iterator<Item = &MidiEvent> {
        self.live().iter()
    }

    /// Stored events, stale ones included.
    #[inline]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of unconsumed events.
    #[inline]
    pub fn pending(&self) -> usize {
        self.events.len() - self.pos
    }

    #[inline]
    pub fn pos(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
