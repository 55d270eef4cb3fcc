/// Fixed-capacity wrapping allocator for the argument-buffer backing store.
///
/// Each bound-set snapshot claims a contiguous region; when the remaining
/// capacity cannot hold the next claim the cursor wraps to zero. Nothing here
/// tracks which regions are still being read by the GPU: the caller must keep
/// few enough frames in flight that a wrap never overwrites a live region.
/// Wraps are counted so the hazard is at least observable.
#[derive(Debug)]
pub(crate) struct RingAllocator {
    capacity: u64,
    cursor: u64,
    wrap_count: u64,
}

impl RingAllocator {
    pub fn new(capacity: u64) -> Self {
        assert_ne!(capacity, 0);
        Self {
            capacity,
            cursor: 0,
            wrap_count: 0,
        }
    }

    /// Claims `size` bytes aligned to `align` and returns the region offset.
    pub fn claim(&mut self, size: u64, align: u64) -> u64 {
        assert!(size <= self.capacity);
        assert!(align.is_power_of_two());

        let mut offset = (self.cursor + align - 1) & !(align - 1);
        if offset + size > self.capacity {
            offset = 0;
            self.wrap_count += 1;
            log::warn!(
                "argument-buffer ring wrapped (count: {}); in-flight regions may be overwritten",
                self.wrap_count
            );
        }
        self.cursor = offset + size;
        offset
    }

    pub fn wrap_count(&self) -> u64 {
        self.wrap_count
    }
}

#[cfg(test)]
mod tests {
    use super::RingAllocator;

    #[test]
    fn claims_advance_and_align() {
        let mut ring = RingAllocator::new(1024);
        assert_eq!(ring.claim(100, 1), 0);
        assert_eq!(ring.claim(100, 256), 256);
        assert_eq!(ring.claim(8, 8), 360);
        assert_eq!(ring.wrap_count(), 0);
    }

    #[test]
    fn wraps_to_zero_when_exhausted() {
        let mut ring = RingAllocator::new(1024);
        assert_eq!(ring.claim(600, 1), 0);
        // 600 + 600 > 1024, so the cursor wraps
        assert_eq!(ring.claim(600, 1), 0);
        assert_eq!(ring.wrap_count(), 1);
        assert_eq!(ring.claim(100, 1), 600);
    }

    #[test]
    fn many_claims_accumulate_wrap_diagnostics() {
        let mut ring = RingAllocator::new(256);
        for _ in 0..10 {
            ring.claim(100, 1);
        }
        // 2 claims fit per lap, 10 claims = 4 wraps
        assert_eq!(ring.wrap_count(), 4);
    }
}
