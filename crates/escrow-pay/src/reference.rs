//! Per-call reference stamping.
//!
//! Escrow refuses a second transaction carrying a reference it has already
//! seen, so every outbound reference is suffixed with a millisecond stamp
//! that never repeats within the process.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Hands out strictly increasing Unix-millisecond stamps.
///
/// Normally the stamp is the wall clock. Two calls inside the same
/// millisecond (or a clock step backwards) get `last + 1` instead.
#[derive(Debug, Default)]
pub struct ReferenceStamp {
    last: AtomicU64,
}

impl ReferenceStamp {
    pub const fn new() -> Self {
        Self {
            last: AtomicU64::new(0),
        }
    }

    /// Next stamp given the current wall clock.
    pub fn next(&self) -> u64 {
        self.next_after(now_millis())
    }

    /// Next stamp given an explicit clock reading.
    pub fn next_after(&self, now_ms: u64) -> u64 {
        let mut current = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now_ms.max(current + 1);
            match self.last.compare_exchange_weak(
                current,
                candidate,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return candidate,
                Err(observed) => current = observed,
            }
        }
    }
}

/// `<base>-<stamp>`; `base` is expected to be truncated already.
pub fn unique_reference(base: &str, stamp: u64) -> String {
    format!("{base}-{stamp}")
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
