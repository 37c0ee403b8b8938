use crate::DEFAULT_EVENT_INTERVAL;

/*
Event Timestamps
================

Each stream (amplitude or frequency) of each partial gets a new breakpoint
every `interval` samples. Blocks do not line up with that grid: a 128-sample
interval and a 300-sample block put a varying number of events in each
block, and sometimes none.

The tracker remembers the last sample it handed out and resumes exactly one
interval later, so the grid is continuous across blocks:

    block 1: generate_samples(0,   300)  ->  0, 128, 256
    block 2: generate_samples(301, 600)  ->  384, 512
    one go:  generate_samples(0,   600)  ->  0, 128, 256, 384, 512

Before the first event (or after `reset`) there is no grid yet, so the first
event lands on `block_start`.

The cursor only moves once the caller is done with the sequence. Dropping the
iterator commits the last value actually produced; abandoning it after three
values resumes after the third.
*/

/// Per-stream cursor for future event timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventTimestampTracker {
    interval: u64,
    last: Option<u64>,
}

impl EventTimestampTracker {
    pub fn new(interval: u64) -> Self {
        Self {
            interval: interval.max(1),
            last: None,
        }
    }

    /// Lazily produce every timestamp from the resume point through
    /// `target_sample`, inclusive.
    pub fn generate_samples(&mut self, block_start: u64, target_sample: u64) -> SampleRun<'_> {
        let next = self.first_sample(block_start);
        SampleRun {
            tracker: self,
            next,
            target: target_sample,
            produced: None,
        }
    }

    /// How many values `generate_samples` would produce. Does not move the
    /// cursor.
    pub fn count_events(&self, block_start: u64, target_sample: u64) -> usize {
        let first = self.first_sample(block_start);
        if first > target_sample {
            0
        } else {
            ((target_sample - first) / self.interval + 1) as usize
        }
    }

    /// Forget the grid. The next sequence starts at its `block_start`.
    pub fn reset(&mut self) {
        self.last = None;
    }

    /// Move the cursor to an event emitted outside the regular grid (the end
    /// of an override ramp). Regular scheduling resumes one interval later.
    pub fn mark_emitted(&mut self, sample: u64) {
        self.last = Some(sample);
    }

    pub fn last_sample(&self) -> Option<u64> {
        self.last
    }

    pub fn interval(&self) -> u64 {
        self.interval
    }

    fn first_sample(&self, block_start: u64) -> u64 {
        match self.last {
            Some(last) => last + self.interval,
            None => block_start,
        }
    }
}

impl Default for EventTimestampTracker {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_INTERVAL)
    }
}

/// Ascending timestamps for one stream. Commits its progress to the tracker
/// when dropped.
pub struct SampleRun<'a> {
    tracker: &'a mut EventTimestampTracker,
    next: u64,
    target: u64,
    produced: Option<u64>,
}

impl Iterator for SampleRun<'_> {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        if self.next > self.target {
            return None;
        }
        let sample = self.next;
        self.produced = Some(sample);
        self.next += self.tracker.interval;
        Some(sample)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = if self.next > self.target {
            0
        } else {
            ((self.target - self.next) / self.tracker.interval + 1) as usize
        };
        (remaining, Some(remaining))
    }
}

impl Drop for SampleRun<'_> {
    fn drop(&mut self) {
        if let Some(sample) = self.produced {
            self.tracker.last = Some(sample);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(tracker: &mut EventTimestampTracker, start: u64, target: u64) -> Vec<u64> {
        tracker.generate_samples(start, target).collect()
    }

    #[test]
    fn test_first_event_lands_on_block_start() {
        let mut tracker = EventTimestampTracker::new(128);
        assert_eq!(collect(&mut tracker, 1000, 1300), vec![1000, 1128, 1256]);
    }

    #[test]
    fn test_restart_matches_single_generation() {
        let mut split = EventTimestampTracker::new(128);
        let mut whole = EventTimestampTracker::new(128);

        let mut a = collect(&mut split, 0, 300);
        a.extend(collect(&mut split, 301, 600));
        let b = collect(&mut whole, 0, 600);

        assert_eq!(a, b);
        assert_eq!(a, vec![0, 128, 256, 384, 512]);
    }

    #[test]
    fn test_no_duplicates_across_many_blocks() {
        let mut tracker = EventTimestampTracker::new(128);
        let mut all = Vec::new();
        for block in 0..40u64 {
            let start = block * 100;
            all.extend(collect(&mut tracker, start, start + 100 + 128));
        }
        for pair in all.windows(2) {
            assert!(pair[0] < pair[1], "timestamps not increasing: {:?}", pair);
        }
    }

    #[test]
    fn test_count_matches_generation_and_does_not_mutate() {
        let mut tracker = EventTimestampTracker::new(128);
        for &(start, target) in &[(0u64, 0u64), (0, 127), (0, 128), (129, 700), (700, 650), (701, 5000)] {
            let before = tracker;
            let counted = tracker.count_events(start, target);
            assert_eq!(tracker, before, "count_events mutated the tracker");
            let produced = collect(&mut tracker, start, target).len();
            assert_eq!(
                counted, produced,
                "count mismatch for [{}, {}]",
                start, target
            );
        }
    }

    #[test]
    fn test_empty_run_keeps_cursor() {
        let mut tracker = EventTimestampTracker::new(128);
        collect(&mut tracker, 0, 0);
        assert_eq!(tracker.last_sample(), Some(0));
        // Next event is at 128, which is past 100
        assert!(collect(&mut tracker, 50, 100).is_empty());
        assert_eq!(tracker.last_sample(), Some(0));
    }

    #[test]
    fn test_partial_consumption_commits_last_produced() {
        let mut tracker = EventTimestampTracker::new(128);
        let taken: Vec<u64> = tracker.generate_samples(0, 10_000).take(2).collect();
        assert_eq!(taken, vec![0, 128]);
        assert_eq!(collect(&mut tracker, 0, 300), vec![256]);
    }

    #[test]
    fn test_reset_clears_grid() {
        let mut tracker = EventTimestampTracker::new(128);
        collect(&mut tracker, 0, 1000);
        tracker.reset();
        assert_eq!(tracker.last_sample(), None);
        assert_eq!(collect(&mut tracker, 5000, 5100), vec![5000]);
    }

    #[test]
    fn test_mark_emitted_resumes_one_interval_later() {
        let mut tracker = EventTimestampTracker::new(128);
        collect(&mut tracker, 0, 256);
        tracker.mark_emitted(300);
        assert_eq!(collect(&mut tracker, 300, 700), vec![428, 556]);
    }
}
