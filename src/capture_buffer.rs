//! Circular sample store for logic captures.

/// Physical slots allocated for windows up to half this size.
pub const DEFAULT_CAPACITY: usize = 2048;

/// Fixed-capacity ring of multi-channel samples.
///
/// Reads are gated by `valid_count`, which saturates at the display window
/// size rather than at the capacity. The extra slots are headroom so a frozen
/// window stays readable while newer samples keep arriving.
#[derive(Debug, Clone)]
pub struct CaptureBuffer {
    storage: Vec<u32>,
    index_mask: usize,
    window_size: usize,
    write_pointer: usize,
    valid_count: usize,
}

impl CaptureBuffer {
    /// Create a buffer for a display window of `window_size` samples, with
    /// capacity picked by [`CaptureBuffer::capacity_for`]. A zero window is
    /// raised to one sample.
    pub fn new(window_size: usize) -> Self {
        let window_size = window_size.max(1);
        Self::with_capacity(window_size, Self::capacity_for(window_size))
    }

    /// Create a buffer with an explicit capacity.
    ///
    /// A window size outside `1..=capacity` is clamped into range and logged.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is not a power of two; all index arithmetic masks
    /// with `capacity - 1`.
    pub fn with_capacity(window_size: usize, capacity: usize) -> Self {
        assert!(
            capacity.is_power_of_two(),
            "capture buffer capacity {} is not a power of two",
            capacity
        );

        let requested = window_size;
        let window_size = requested.clamp(1, capacity);
        if window_size != requested {
            log::warn!(
                "Window size {} does not fit a capacity of {}, using {}",
                requested,
                capacity,
                window_size
            );
        }

        Self {
            storage: vec![0; capacity],
            index_mask: capacity - 1,
            window_size,
            write_pointer: 0,
            valid_count: 0,
        }
    }

    /// Smallest power-of-two capacity that leaves at least a full window of
    /// headroom behind the display window.
    pub fn capacity_for(window_size: usize) -> usize {
        DEFAULT_CAPACITY.max((window_size.max(1) * 2).next_power_of_two())
    }

    #[inline]
    pub fn push(&mut self, sample: u32) {
        self.storage[self.write_pointer] = sample;
        self.write_pointer = (self.write_pointer + 1) & self.index_mask;
        if self.valid_count < self.window_size {
            self.valid_count += 1;
        }
    }

    /// The `k`-th most recent sample, `k = 1` being the newest.
    ///
    /// `k` must be in `1..=valid_count`.
    #[inline]
    pub fn sample_at(&self, k: usize) -> u32 {
        debug_assert!(
            k >= 1 && k <= self.valid_count,
            "sample_at({}) outside 1..={}",
            k,
            self.valid_count
        );
        self.sample_before(self.write_pointer, k)
    }

    /// The `k`-th sample written before `end_pointer`.
    ///
    /// Used to read windows frozen at an earlier write pointer. `k` must not
    /// reach back further than the samples written before `end_pointer`.
    #[inline]
    pub fn sample_before(&self, end_pointer: usize, k: usize) -> u32 {
        debug_assert!(k >= 1 && k <= self.storage.len());
        self.storage[end_pointer.wrapping_sub(k) & self.index_mask]
    }

    pub fn clear(&mut self) {
        self.write_pointer = 0;
        self.valid_count = 0;
    }

    pub fn is_full(&self) -> bool {
        self.valid_count == self.window_size
    }

    pub fn is_empty(&self) -> bool {
        self.valid_count == 0
    }

    pub fn valid_count(&self) -> usize {
        self.valid_count
    }

    pub fn write_pointer(&self) -> usize {
        self.write_pointer
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// Samples that can be written after `end_pointer` before its window
    /// starts being overwritten.
    pub fn headroom(&self) -> usize {
        self.capacity() - self.window_size
    }

    /// Newest-first iterator over the valid samples.
    pub fn iter_recent(&self) -> impl Iterator<Item = u32> + '_ {
        (1..=self.valid_count).map(move |k| self.sample_at(k))
    }
}
