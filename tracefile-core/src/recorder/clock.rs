//! Timestamp and identity sources for trace events.

use once_cell::sync::Lazy;
use std::cell::Cell;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

/// Monotonic anchor paired with the wall-clock time it was taken at.
///
/// All timestamps are computed as the anchor's epoch offset plus the
/// monotonic time elapsed since the anchor, so they never go backwards
/// within a process while still lining up roughly with wall-clock time.
struct ClockAnchor {
    instant: Instant,
    epoch_us: u64,
}

static ANCHOR: Lazy<ClockAnchor> = Lazy::new(|| ClockAnchor {
    instant: Instant::now(),
    epoch_us: SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_micros() as u64)
        .unwrap_or(0),
});

/// Microseconds on the trace timeline.
#[inline]
pub fn now_us() -> u64 {
    let anchor = &*ANCHOR;
    anchor.epoch_us + anchor.instant.elapsed().as_micros() as u64
}

static NEXT_THREAD_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static THREAD_ID: Cell<u64> = const { Cell::new(0) };
}

/// Identifier of the calling thread.
///
/// Assigned on first use from a process-wide counter and cached for the
/// lifetime of the thread. Ids are never reused within a process.
#[inline]
pub fn thread_id() -> u64 {
    THREAD_ID.with(|cell| {
        let id = cell.get();
        if id != 0 {
            return id;
        }
        let id = NEXT_THREAD_ID.fetch_add(1, Ordering::Relaxed);
        cell.set(id);
        id
    })
}

/// Identifier of the current process.
#[inline]
pub fn process_id() -> u32 {
    std::process::id()
}
