use crate::{MAX_EVENTS_PER_PARTIAL, NUM_PARTIALS};

/*
Event Batch Encoding
====================

Once per block the engine hands the renderer two flat arrays, one for
amplitude events and one for frequency events. Each array is a run of
per-sine segments:

    [sine_id, count, override, sample_0, value_0, sample_1, value_1, ...]
     \_______ header _______/  \____________ count pairs ____________/

The header is written first with `count = 0` and backfilled by `end_sine`
once we know how many events made it in. A segment that ends up with no
events is rewound, so the arrays only ever contain segments with at least
one event.

`override = 1` asks the renderer to throw away anything it has staged for
that sine at or after the segment's first sample before appending the new
events.

Everything is f64: sample positions stay exact up to 2^53, far beyond any
session length, and values need no conversion.

Capacity is fixed when the scheduler is built:

    max_sines * (3 + max_events * 2)

so writes can never run off the end. The per-sine event cap enforces it; an
event past the cap is refused and leaves the buffer untouched.
*/

const HEADER_LEN: usize = 3;

/// One of the two flat arrays plus the bookkeeping for its open segment.
struct EventLane {
    data: Box<[f64]>,
    len: usize,
    /// Offset of the open segment's header, if any
    header_at: Option<usize>,
    count: usize,
}

impl EventLane {
    fn new(capacity: usize) -> Self {
        Self {
            data: vec![0.0; capacity].into_boxed_slice(),
            len: 0,
            header_at: None,
            count: 0,
        }
    }

    fn clear(&mut self) {
        self.len = 0;
        self.header_at = None;
        self.count = 0;
    }

    fn open(&mut self, id: u32, override_pending: bool) {
        let at = self.len;
        self.data[at] = id as f64;
        self.data[at + 1] = 0.0;
        self.data[at + 2] = if override_pending { 1.0 } else { 0.0 };
        self.len += HEADER_LEN;
        self.header_at = Some(at);
        self.count = 0;
    }

    fn push(&mut self, sample: u64, value: f64, cap: usize) -> bool {
        if self.header_at.is_none() || self.count >= cap {
            return false;
        }
        self.data[self.len] = sample as f64;
        self.data[self.len + 1] = value;
        self.len += 2;
        self.count += 1;
        true
    }

    fn close(&mut self) {
        if let Some(at) = self.header_at.take() {
            if self.count == 0 {
                // Nothing was added, drop the header
                self.len = at;
            } else {
                self.data[at + 1] = self.count as f64;
            }
            self.count = 0;
        }
    }

    fn written(&self) -> &[f64] {
        &self.data[..self.len]
    }
}

/// Zero-allocation accumulator of per-sine event lists.
pub struct SineEventScheduler {
    amplitude: EventLane,
    frequency: EventLane,
    max_sines: usize,
    max_events: usize,
    sines_in_frame: usize,
}

impl SineEventScheduler {
    /// Allocate both buffers up front. Nothing allocates afterwards.
    pub fn new(max_sines: usize, max_events_per_sine: usize) -> Self {
        let capacity = max_sines * (HEADER_LEN + max_events_per_sine * 2);
        Self {
            amplitude: EventLane::new(capacity),
            frequency: EventLane::new(capacity),
            max_sines,
            max_events: max_events_per_sine,
            sines_in_frame: 0,
        }
    }

    /// Start a new block. Call exactly once per block before any `begin_sine`.
    pub fn begin_frame(&mut self) {
        self.amplitude.clear();
        self.frequency.clear();
        self.sines_in_frame = 0;
    }

    /// Open a segment for `id` in both buffers with the same override flag.
    ///
    /// Returns `false` if this frame already holds `max_sines` segments; the
    /// following adds for this sine are then refused.
    pub fn begin_sine(&mut self, id: u32, override_pending: bool) -> bool {
        self.begin_sine_streams(id, override_pending, override_pending)
    }

    /// Open a segment for `id` with an independent override flag per stream.
    pub fn begin_sine_streams(&mut self, id: u32, amp_override: bool, freq_override: bool) -> bool {
        self.close_open_segments();
        if self.sines_in_frame >= self.max_sines {
            return false;
        }
        self.sines_in_frame += 1;
        self.amplitude.open(id, amp_override);
        self.frequency.open(id, freq_override);
        true
    }

    pub fn add_amplitude_event(&mut self, sample: u64, value: f64) -> bool {
        self.amplitude.push(sample, value, self.max_events)
    }

    pub fn add_frequency_event(&mut self, sample: u64, frequency: f64) -> bool {
        self.frequency.push(sample, frequency, self.max_events)
    }

    /// Backfill the event counts of the open segment.
    pub fn end_sine(&mut self) {
        self.close_open_segments();
    }

    /// The encoded amplitude events written this frame.
    pub fn amplitude_buffer(&self) -> &[f64] {
        self.amplitude.written()
    }

    /// The encoded frequency events written this frame.
    pub fn frequency_buffer(&self) -> &[f64] {
        self.frequency.written()
    }

    pub fn has_amplitude_events(&self) -> bool {
        self.amplitude.len > 0
    }

    pub fn has_frequency_events(&self) -> bool {
        self.frequency.len > 0
    }

    pub fn max_events_per_sine(&self) -> usize {
        self.max_events
    }

    fn close_open_segments(&mut self) {
        self.amplitude.close();
        self.frequency.close();
    }
}

impl Default for SineEventScheduler {
    fn default() -> Self {
        Self::new(NUM_PARTIALS, MAX_EVENTS_PER_PARTIAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_sine_encoding() {
        let mut sched = SineEventScheduler::default();
        sched.begin_frame();
        sched.begin_sine(5, false);
        assert!(sched.add_amplitude_event(100, 0.5));
        assert!(sched.add_amplitude_event(228, 0.3));
        sched.end_sine();

        assert_eq!(sched.amplitude_buffer(), &[5.0, 2.0, 0.0, 100.0, 0.5, 228.0, 0.3]);
        assert!(sched.has_amplitude_events());
        assert!(!sched.has_frequency_events(), "empty frequency segment should be rewound");
        assert!(sched.frequency_buffer().is_empty());
    }

    #[test]
    fn test_override_flag_is_encoded() {
        let mut sched = SineEventScheduler::default();
        sched.begin_frame();
        sched.begin_sine(9, true);
        sched.add_frequency_event(40, 220.0);
        sched.end_sine();
        assert_eq!(sched.frequency_buffer(), &[9.0, 1.0, 1.0, 40.0, 220.0]);
    }

    #[test]
    fn test_independent_stream_overrides() {
        let mut sched = SineEventScheduler::default();
        sched.begin_frame();
        sched.begin_sine_streams(2, true, false);
        sched.add_amplitude_event(10, 0.1);
        sched.add_frequency_event(10, 110.0);
        sched.end_sine();
        assert_eq!(sched.amplitude_buffer()[2], 1.0);
        assert_eq!(sched.frequency_buffer()[2], 0.0);
    }

    #[test]
    fn test_cap_overflow_leaves_buffer_unchanged() {
        let cap = MAX_EVENTS_PER_PARTIAL;
        let mut sched = SineEventScheduler::default();
        sched.begin_frame();
        sched.begin_sine(1, false);
        for i in 0..cap {
            assert!(sched.add_amplitude_event(i as u64 * 128, 0.25), "event {} refused", i);
        }
        let snapshot: Vec<f64> = sched.amplitude_buffer().to_vec();

        assert!(!sched.add_amplitude_event(cap as u64 * 128, 0.25));
        assert_eq!(sched.amplitude_buffer(), snapshot.as_slice());

        sched.end_sine();
        assert_eq!(sched.amplitude_buffer()[1], cap as f64);
    }

    #[test]
    fn test_multiple_sines_back_to_back() {
        let mut sched = SineEventScheduler::default();
        sched.begin_frame();
        for id in 0..3u32 {
            sched.begin_sine(id, false);
            sched.add_amplitude_event(0, id as f64);
            sched.end_sine();
        }
        assert_eq!(
            sched.amplitude_buffer(),
            &[0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 2.0, 1.0, 0.0, 0.0, 2.0]
        );
    }

    #[test]
    fn test_begin_frame_resets_offsets() {
        let mut sched = SineEventScheduler::default();
        sched.begin_frame();
        sched.begin_sine(3, false);
        sched.add_amplitude_event(0, 1.0);
        sched.end_sine();
        sched.begin_frame();
        assert!(!sched.has_amplitude_events());
        assert!(sched.amplitude_buffer().is_empty());
    }

    #[test]
    fn test_adds_without_open_sine_are_refused() {
        let mut sched = SineEventScheduler::default();
        sched.begin_frame();
        assert!(!sched.add_amplitude_event(0, 1.0));
        assert!(!sched.add_frequency_event(0, 1.0));
    }

    #[test]
    fn test_full_frame_never_exceeds_capacity() {
        let mut sched = SineEventScheduler::new(4, 2);
        sched.begin_frame();
        for id in 0..4u32 {
            assert!(sched.begin_sine(id, false));
            for s in 0..5u64 {
                sched.add_amplitude_event(s, 1.0);
                sched.add_frequency_event(s, 1.0);
            }
            sched.end_sine();
        }
        assert!(!sched.begin_sine(4, false), "fifth sine must be refused");
        assert!(!sched.add_amplitude_event(0, 1.0));
        assert_eq!(sched.amplitude_buffer().len(), 4 * (3 + 2 * 2));
    }
}
