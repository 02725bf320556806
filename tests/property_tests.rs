//! Property-based tests for lcgx
//!
//! Uses proptest to verify invariants across large input spaces.

use proptest::prelude::*;

use lcgx_core::{partition, transform};
use lcgx_crypto::{CipherParameters, KeystreamGenerator};
use lcgx_integration_tests::{reference_keystream, reference_transform};

fn params_strategy() -> impl Strategy<Value = CipherParameters> {
    (any::<u64>(), any::<u64>(), any::<u64>(), 1u64..=u64::MAX)
        .prop_map(|(seed, a, c, m)| CipherParameters::new(seed, a, c, m).unwrap())
}

// ============================================================================
// Transform Properties
// ============================================================================

mod transform_properties {
    use super::*;

    proptest! {
        /// Applying the transform twice restores the input
        #[test]
        fn involution(
            params in params_strategy(),
            input in prop::collection::vec(any::<u8>(), 1..4096),
            workers in 1usize..12,
        ) {
            let once = transform(&params, &input, workers).unwrap();
            let twice = transform(&params, &once, workers).unwrap();
            prop_assert_eq!(twice, input);
        }

        /// Same parameters and input always give the same output
        #[test]
        fn deterministic(
            params in params_strategy(),
            input in prop::collection::vec(any::<u8>(), 1..2048),
        ) {
            prop_assert_eq!(
                transform(&params, &input, 4).unwrap(),
                transform(&params, &input, 4).unwrap()
            );
        }

        /// Output does not depend on how many workers share the range
        #[test]
        fn worker_count_independent(
            params in params_strategy(),
            input in prop::collection::vec(any::<u8>(), 1..4096),
            workers in 2usize..64,
        ) {
            prop_assert_eq!(
                transform(&params, &input, workers).unwrap(),
                transform(&params, &input, 1).unwrap()
            );
        }

        /// Parallel output equals the sequential reference
        #[test]
        fn matches_reference(
            params in params_strategy(),
            input in prop::collection::vec(any::<u8>(), 1..4096),
            workers in 1usize..16,
        ) {
            prop_assert_eq!(
                transform(&params, &input, workers).unwrap(),
                reference_transform(&params, &input)
            );
        }
    }
}

// ============================================================================
// Keystream Properties
// ============================================================================

mod keystream_properties {
    use super::*;

    proptest! {
        /// Buffered generation and the step function agree
        #[test]
        fn buffer_matches_step(params in params_strategy(), len in 0usize..2048) {
            let generator = KeystreamGenerator::new(params).unwrap();
            let keystream = generator.keystream(len).unwrap();
            prop_assert_eq!(&keystream[..], &reference_keystream(&params, len)[..]);
        }

        /// Every emitted byte is the low byte of a state below the modulus
        #[test]
        fn state_stays_below_modulus(params in params_strategy(), steps in 1usize..512) {
            let generator = KeystreamGenerator::new(params).unwrap();
            for _ in 0..steps {
                let byte = generator.next();
                let state = generator.state();
                prop_assert!(state < params.modulus);
                prop_assert_eq!(byte, (state & 0xFF) as u8);
            }
        }

        /// Consecutive calls continue the same sequence
        #[test]
        fn split_generation_continues(params in params_strategy(), a in 0usize..512, b in 0usize..512) {
            let generator = KeystreamGenerator::new(params).unwrap();
            let mut joined = generator.keystream(a).unwrap().to_vec();
            joined.extend_from_slice(&generator.keystream(b).unwrap());
            prop_assert_eq!(joined, reference_keystream(&params, a + b));
        }
    }
}

// ============================================================================
// Partition Properties
// ============================================================================

mod partition_properties {
    use super::*;

    proptest! {
        /// Ranges tile [0, N) in order with no gap or overlap
        #[test]
        fn ranges_tile_input(len in 1usize..1_000_000, workers in 1usize..512) {
            let ranges = partition(len, workers);
            prop_assert_eq!(ranges.len(), workers);
            prop_assert_eq!(ranges[0].start, 0);
            for pair in ranges.windows(2) {
                prop_assert_eq!(pair[0].end, pair[1].start);
            }
            prop_assert_eq!(ranges[workers - 1].end, len);
        }

        /// Only the last range differs from N / W
        #[test]
        fn last_range_takes_remainder(len in 1usize..1_000_000, workers in 1usize..512) {
            let ranges = partition(len, workers);
            let base = len / workers;
            prop_assert!(ranges[..workers - 1].iter().all(|r| r.len() == base));
            prop_assert_eq!(ranges[workers - 1].len(), base + len % workers);
        }
    }
}
