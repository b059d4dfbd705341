//! Heartbeat bookkeeping shared by the receive loop and the heartbeat task

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use rand::Rng;

/// Last seen sequence number and whether the last beat was acknowledged
#[derive(Debug)]
pub struct HeartbeatState {
    sequence: Mutex<Option<u64>>,
    acked: AtomicBool,
}

impl HeartbeatState {
    pub fn new() -> Self {
        Self {
            sequence: Mutex::new(None),
            acked: AtomicBool::new(true),
        }
    }

    /// Remember a dispatch sequence number; never moves backwards
    pub fn record_sequence(&self, sequence: u64) {
        let mut last = self.sequence.lock();
        if last.map_or(true, |last| sequence > last) {
            *last = Some(sequence);
        }
    }

    pub fn last_sequence(&self) -> Option<u64> {
        *self.sequence.lock()
    }

    /// Server acknowledged the last beat
    pub fn ack(&self) {
        self.acked.store(true, Ordering::Release);
    }

    /// Consume the acknowledgement before sending the next beat
    ///
    /// Returns `false` when the previous beat was never acknowledged, meaning
    /// the connection is dead.
    pub fn take_ack(&self) -> bool {
        self.acked.swap(false, Ordering::AcqRel)
    }
}

impl Default for HeartbeatState {
    fn default() -> Self {
        Self::new()
    }
}

/// Delay before the first beat: a random fraction of the interval
pub fn first_beat_delay(interval: Duration) -> Duration {
    interval.mul_f64(rand::thread_rng().gen_range(0.0..1.0))
}
