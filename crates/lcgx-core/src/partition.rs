//! Byte range partitioning.
//!
//! `[0, N)` is split into `W` contiguous ranges. With `S = N / W`, ranges
//! `0..W-1` each get exactly `S` bytes and the last range absorbs the
//! remainder, so its length is `S + N % W`. When `N < W`, `S` is zero, the
//! leading ranges are empty, and the last range covers everything.

use std::ops::Range;

/// Half-open byte interval `[start, end)` owned by one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WorkRange {
    /// First index (inclusive)
    pub start: usize,
    /// One past the last index
    pub end: usize,
}

impl WorkRange {
    /// Create a range
    #[must_use]
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    /// Number of bytes in the range
    #[must_use]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the range covers no bytes
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// As a slice index
    #[must_use]
    pub fn as_range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Partition `[0, len)` into `workers` ranges.
///
/// `workers` is clamped to at least 1. The result always has exactly that
/// many entries.
#[must_use]
pub fn partition(len: usize, workers: usize) -> Vec<WorkRange> {
    let workers = workers.max(1);
    let base = len / workers;

    (0..workers)
        .map(|k| {
            let start = k * base;
            let end = if k + 1 == workers { len } else { start + base };
            WorkRange::new(start, end)
        })
        .collect()
}

/// Split `buf` into disjoint mutable slices, one per range.
///
/// `ranges` must be contiguous and start at 0, as produced by [`partition`].
/// Bytes past the last range are not handed out.
pub fn split_mut<'a>(mut buf: &'a mut [u8], ranges: &[WorkRange]) -> Vec<&'a mut [u8]> {
    let mut slices = Vec::with_capacity(ranges.len());
    let mut offset = 0;

    for range in ranges {
        debug_assert_eq!(range.start, offset, "ranges must be contiguous");
        let (head, tail) = std::mem::take(&mut buf).split_at_mut(range.len());
        slices.push(head);
        buf = tail;
        offset = range.end;
    }

    slices
}
