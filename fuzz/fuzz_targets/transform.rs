//! Fuzz target for the parallel transform
//!
//! Arbitrary parameters, data and worker counts must never panic, and a
//! second pass must restore the input.

#![no_main]

use arbitrary::Arbitrary;
use lcgx_core::transform;
use lcgx_crypto::CipherParameters;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct TransformInput {
    seed: u64,
    multiplier: u64,
    increment: u64,
    modulus: u64,
    workers: u8,
    data: Vec<u8>,
}

fuzz_target!(|input: TransformInput| {
    // Zero modulus is rejected, never a panic
    let Ok(params) =
        CipherParameters::new(input.seed, input.multiplier, input.increment, input.modulus)
    else {
        return;
    };

    let workers = usize::from(input.workers % 32) + 1;
    let Ok(once) = transform(&params, &input.data, workers) else {
        return;
    };
    assert_eq!(once.len(), input.data.len());

    let twice = transform(&params, &once, 1).expect("second pass");
    assert_eq!(twice, input.data);
});
