//! Single-use completion barrier.
//!
//! The coordinator and every worker arrive once. The barrier releases all of
//! them when the last party arrives and then stays released; it cannot be
//! reused for a second run. Unlike [`std::sync::Barrier`] it can be aborted,
//! which frees parties that would otherwise wait forever for a worker that
//! was never started.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use thiserror::Error;

/// Barrier errors
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BarrierError {
    /// A barrier needs at least one party
    #[error("barrier requires at least one party")]
    NoParties,

    /// The barrier was aborted before every party arrived
    #[error("barrier aborted before all parties arrived")]
    Aborted,

    /// The barrier already released its parties
    #[error("barrier already released")]
    AlreadyReleased,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Waiting,
    Released,
    Aborted,
}

#[derive(Debug)]
struct GateState {
    arrived: usize,
    phase: Phase,
}

/// Rendezvous point for a fixed number of parties.
#[derive(Debug)]
pub struct CompletionBarrier {
    parties: usize,
    state: Mutex<GateState>,
    released: Condvar,
}

impl CompletionBarrier {
    /// Create a barrier for `parties` participants.
    ///
    /// # Errors
    ///
    /// Returns [`BarrierError::NoParties`] if `parties` is zero.
    pub fn new(parties: usize) -> Result<Self, BarrierError> {
        if parties == 0 {
            return Err(BarrierError::NoParties);
        }
        Ok(Self {
            parties,
            state: Mutex::new(GateState {
                arrived: 0,
                phase: Phase::Waiting,
            }),
            released: Condvar::new(),
        })
    }

    /// Number of parties the barrier waits for
    #[must_use]
    pub fn parties(&self) -> usize {
        self.parties
    }

    /// Number of parties that have arrived so far
    #[must_use]
    pub fn arrived(&self) -> usize {
        self.lock().arrived
    }

    /// Whether every party has arrived and been released
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.lock().phase == Phase::Released
    }

    /// Whether the barrier was aborted
    #[must_use]
    pub fn is_aborted(&self) -> bool {
        self.lock().phase == Phase::Aborted
    }

    /// Arrive and block until all parties have arrived.
    ///
    /// # Errors
    ///
    /// - [`BarrierError::Aborted`] if the barrier is aborted before or while waiting
    /// - [`BarrierError::AlreadyReleased`] if the barrier has already released
    pub fn arrive_and_wait(&self) -> Result<(), BarrierError> {
        let mut state = self.lock();
        match state.phase {
            Phase::Released => return Err(BarrierError::AlreadyReleased),
            Phase::Aborted => return Err(BarrierError::Aborted),
            Phase::Waiting => {}
        }

        state.arrived += 1;
        if state.arrived == self.parties {
            state.phase = Phase::Released;
            self.released.notify_all();
            return Ok(());
        }

        let state = self
            .released
            .wait_while(state, |s| s.phase == Phase::Waiting)
            .unwrap_or_else(PoisonError::into_inner);

        match state.phase {
            Phase::Aborted => Err(BarrierError::Aborted),
            _ => Ok(()),
        }
    }

    /// Abort the barrier, waking every waiting party with an error.
    ///
    /// Returns `false` if the barrier had already released or aborted.
    pub fn abort(&self) -> bool {
        let mut state = self.lock();
        if state.phase != Phase::Waiting {
            return false;
        }
        state.phase = Phase::Aborted;
        self.released.notify_all();
        true
    }

    fn lock(&self) -> MutexGuard<'_, GateState> {
        // State transitions are single assignments; a poisoned guard is consistent.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
