//! Fuzz target for range partitioning
//!
//! Every split must tile `[0, N)` exactly with the remainder on the last range.

#![no_main]

use lcgx_core::partition;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: (u32, u16)| {
    let len = input.0 as usize;
    let workers = usize::from(input.1);

    let ranges = partition(len, workers);
    let workers = workers.max(1);
    assert_eq!(ranges.len(), workers);

    let mut next = 0;
    for range in &ranges {
        assert_eq!(range.start, next);
        next = range.end;
    }
    assert_eq!(next, len);
    assert_eq!(ranges[workers - 1].len(), len / workers + len % workers);
});
