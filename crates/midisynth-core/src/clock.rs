//! Tick to sample time base.
//!
//! Event timestamps are ticks ([`TICKS_PER_SECOND`] per second); the render
//! path counts samples. The clock keeps both sides incrementally: samples
//! elapsed since the last matured event and samples left until the next
//! pending one, so a mix callback never has to rescan the queue.

use midisynth_events::TICKS_PER_SECOND;

/// Signed tick distance as f64; late events yield negative distances.
#[inline]
fn tick_delta(from: u64, to: u64) -> f64 {
    to as f64 - from as f64
}

#[derive(Debug, Clone, PartialEq)]
pub struct SynthClock {
    last_event_time: u64,
    /// `None` when nothing is pending.
    next_event_time: Option<u64>,
    samples_since_last: f64,
    samples_to_next: f64,
    samples_per_tick: f64,
    sample_rate: f64,
}

impl SynthClock {
    /// `sample_rate` must already be validated; a zero rate would poison
    /// every later rescale.
    pub(crate) fn new(sample_rate: f64) -> Self {
        Self {
            last_event_time: 0,
            next_event_time: None,
            samples_since_last: 0.0,
            samples_to_next: 0.0,
            samples_per_tick: sample_rate / TICKS_PER_SECOND as f64,
            sample_rate,
        }
    }

    /// Current tick estimate, clamped into `[last_event_time, next_event_time]`.
    ///
    /// The clamp keeps accumulated float drift from running past an event
    /// that has not been delivered yet.
    pub fn current_time(&self) -> u64 {
        let estimate =
            self.last_event_time as f64 + self.samples_since_last / self.samples_per_tick;
        // `as` saturates, so NaN/overflow land on 0/u64::MAX before clamping.
        let upper = self.next_event_time.unwrap_or(u64::MAX);
        (estimate as u64).max(self.last_event_time).min(upper)
    }

    /// Account for `samples` frames just rendered.
    #[inline]
    pub fn advance(&mut self, samples: usize) {
        let samples = samples as f64;
        self.samples_since_last += samples;
        if self.next_event_time.is_some() {
            self.samples_to_next -= samples;
        }
    }

    /// Switch to a new device rate while keeping the tick meaning of the
    /// accumulated sample counts.
    pub(crate) fn set_sample_rate(&mut self, sample_rate: f64) {
        let samples_per_tick = sample_rate / TICKS_PER_SECOND as f64;
        let ratio = samples_per_tick / self.samples_per_tick;
        self.samples_since_last *= ratio;
        self.samples_to_next *= ratio;
        self.samples_per_tick = samples_per_tick;
        self.sample_rate = sample_rate;
    }

    /// Note a newly queued event. Only an event earlier than the current
    /// wake-up point moves it. Returns whether it did.
    pub fn schedule(&mut self, time: u64) -> bool {
        if self.next_event_time.is_some_and(|next| time >= next) {
            return false;
        }
        self.next_event_time = Some(time);
        self.samples_to_next =
            tick_delta(self.last_event_time, time) * self.samples_per_tick - self.samples_since_last;
        true
    }

    /// Move the reference point to an event that just matured.
    ///
    /// Late events (earlier than the last matured one) never move the clock
    /// backwards. Returns whether the reference point moved.
    pub fn mature(&mut self, time: u64) -> bool {
        if time <= self.last_event_time {
            return false;
        }
        let elapsed = tick_delta(self.last_event_time, time) * self.samples_per_tick;
        self.samples_since_last = (self.samples_since_last - elapsed).max(0.0);
        self.last_event_time = time;
        true
    }

    /// Set the wake-up point after a drain. `samples_to_next` keeps whatever
    /// fraction was left over from the previous span.
    pub fn set_next(&mut self, next: Option<u64>) {
        self.next_event_time = next;
        if let Some(next) = next {
            self.samples_to_next += tick_delta(self.last_event_time, next) * self.samples_per_tick;
        }
    }

    /// Set the wake-up point after draining an event that did not move the
    /// reference point. The distance is measured afresh from
    /// `last_event_time`, since the leftover in `samples_to_next` was taken
    /// against the late event.
    pub fn resync_next(&mut self, next: Option<u64>) {
        self.next_event_time = next;
        if let Some(next) = next {
            self.samples_to_next =
                tick_delta(self.last_event_time, next) * self.samples_per_tick - self.samples_since_last;
        }
    }

    pub fn reset(&mut self) {
        self.last_event_time = 0;
        self.next_event_time = None;
        self.samples_since_last = 0.0;
        self.samples_to_next = 0.0;
    }

    #[inline]
    pub fn last_event_time(&self) -> u64 {
        self.last_event_time
    }

    #[inline]
    pub fn next_event_time(&self) -> Option<u64> {
        self.next_event_time
    }

    #[inline]
    pub fn samples_since_last(&self) -> f64 {
        self.samples_since_last
    }

    /// Only meaningful while an event is pending.
    #[inline]
    pub fn samples_to_next(&self) -> f64 {
        self.samples_to_next
    }

    #[inline]
    pub fn samples_per_tick(&self) -> f64 {
        self.samples_per_tick
    }

    #[inline]
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_samples_per_tick_at_48k() {
        let clock = SynthClock::new(48000.0);
        assert_relative_eq!(clock.samples_per_tick(), 0.048);
        assert_eq!(clock.sample_rate(), 48000.0);
    }

    #[test]
    fn test_advance_without_pending_event() {
        let mut clock = SynthClock::new(48000.0);
        clock.advance(48000);
        assert_eq!(clock.samples_since_last(), 48000.0);
        assert_eq!(clock.samples_to_next(), 0.0);
        assert!(clock.current_time().abs_diff(TICKS_PER_SECOND) <= 1);
    }

    #[test]
    fn test_first_schedule_sets_wakeup() {
        let mut clock = SynthClock::new(48000.0);
        assert!(clock.schedule(1_000));
        assert_eq!(clock.next_event_time(), Some(1_000));
        assert_relative_eq!(clock.samples_to_next(), 48.0, epsilon = 1e-9);
    }

    #[test]
    fn test_later_event_does_not_move_wakeup() {
        let mut clock = SynthClock::new(48000.0);
        clock.schedule(1_000);
        assert!(!clock.schedule(2_000));
        assert!(!clock.schedule(1_000));
        assert_eq!(clock.next_event_time(), Some(1_000));

        assert!(clock.schedule(500));
        assert_eq!(clock.next_event_time(), Some(500));
        assert_relative_eq!(clock.samples_to_next(), 24.0, epsilon = 1e-9);
    }

    #[test]
    fn test_schedule_accounts_for_elapsed_samples() {
        let mut clock = SynthClock::new(48000.0);
        clock.advance(10);
        clock.schedule(1_000);
        assert_relative_eq!(clock.samples_to_next(), 38.0, epsilon = 1e-9);
    }

    #[test]
    fn test_current_time_clamped_to_next_event() {
        let mut clock = SynthClock::new(48000.0);
        clock.schedule(1_000);
        clock.advance(4800);
        assert_eq!(clock.current_time(), 1_000);
    }

    #[test]
    fn test_mature_moves_reference_point() {
        let mut clock = SynthClock::new(48000.0);
        clock.schedule(1_000);
        clock.advance(50);
        clock.mature(1_000);
        clock.set_next(None);

        assert_eq!(clock.last_event_time(), 1_000);
        assert_relative_eq!(clock.samples_since_last(), 2.0, epsilon = 1e-9);
        assert_eq!(clock.current_time(), 1_041);
    }

    #[test]
    fn test_late_event_does_not_rewind() {
        let mut clock = SynthClock::new(48000.0);
        clock.schedule(1_000);
        clock.advance(48);
        assert!(clock.mature(1_000));
        assert!(!clock.mature(10));
        assert_eq!(clock.last_event_time(), 1_000);
    }

    #[test]
    fn test_resync_after_late_event() {
        let mut clock = SynthClock::new(48000.0);
        clock.schedule(1_000);
        clock.advance(48);
        clock.mature(1_000);
        clock.set_next(None);
        clock.advance(1);

        clock.schedule(2_000);
        clock.schedule(500);
        assert_relative_eq!(clock.samples_to_next(), -25.0, epsilon = 1e-9);

        assert!(!clock.mature(500));
        clock.resync_next(Some(2_000));
        assert_eq!(clock.next_event_time(), Some(2_000));
        assert_relative_eq!(clock.samples_to_next(), 47.0, epsilon = 1e-9);
    }

    #[test]
    fn test_current_time_with_late_event_pending() {
        let mut clock = SynthClock::new(48000.0);
        clock.schedule(1_000);
        clock.advance(48);
        clock.mature(1_000);
        clock.set_next(None);
        clock.advance(480);

        // The window is inverted while a late event waits: the upper bound
        // wins, so the reading drops to the late event's time until it is
        // drained.
        clock.schedule(400);
        assert_eq!(clock.last_event_time(), 1_000);
        assert_eq!(clock.current_time(), 400);

        clock.mature(400);
        clock.resync_next(None);
        assert!(clock.current_time().abs_diff(11_000) <= 1);
    }

    #[test]
    fn test_rate_changes_preserve_tick_time() {
        let mut clock = SynthClock::new(44100.0);
        clock.advance(1234);
        let before = clock.current_time();

        for rate in [48000.0, 22050.0, 96000.0, 44100.0, 8000.0] {
            clock.set_sample_rate(rate);
            let now = clock.current_time();
            assert!(now.abs_diff(before) <= 1, "{now} vs {before} at {rate}");
        }
        clock.set_sample_rate(44100.0);
        assert_relative_eq!(clock.samples_since_last(), 1234.0, epsilon = 1e-6);
    }

    #[test]
    fn test_rate_change_rescales_samples_to_next() {
        let mut clock = SynthClock::new(48000.0);
        clock.schedule(1_000);
        clock.set_sample_rate(96000.0);
        assert_relative_eq!(clock.samples_to_next(), 96.0, epsilon = 1e-9);
    }

    #[test]
    fn test_reset() {
        let mut clock = SynthClock::new(48000.0);
        clock.schedule(10);
        clock.advance(100);
        clock.mature(10);
        clock.reset();
        assert_eq!(clock.last_event_time(), 0);
        assert_eq!(clock.next_event_time(), None);
        assert_eq!(clock.samples_since_last(), 0.0);
        assert_eq!(clock.samples_to_next(), 0.0);
        assert_relative_eq!(clock.samples_per_tick(), 0.048);
    }

    proptest! {
        #[test]
        fn prop_current_time_stays_in_window(
            ops in prop::collection::vec((any::<bool>(), 0u64..2_000_000, 0usize..4096), 1..100)
        ) {
            let mut clock = SynthClock::new(44100.0);
            for (insert, time, samples) in ops {
                if insert {
                    clock.schedule(clock.last_event_time() + time);
                } else {
                    clock.advance(samples);
                }
                let now = clock.current_time();
                prop_assert!(now >= clock.last_event_time());
                if let Some(next) = clock.next_event_time() {
                    prop_assert!(now <= next);
                }
            }
        }
    }
}
