use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Snapshot of link counters since the radio was opened.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LinkStats {
    pub frames_sent: u64,
    /// Frames handed to consumers, placeholders included.
    pub frames_received: u64,
    pub checksum_errors: u64,
    /// Frames delivered as undecoded placeholders.
    pub decode_errors: u64,
    /// Bytes dropped while looking for a start marker.
    pub skipped_bytes: u64,
    pub backlog_evictions: u64,
}

#[derive(Debug, Default)]
pub(crate) struct Counters {
    pub frames_sent: AtomicU64,
    pub frames_received: AtomicU64,
    pub checksum_errors: AtomicU64,
    pub decode_errors: AtomicU64,
    pub skipped_bytes: AtomicU64,
    pub backlog_evictions: AtomicU64,
}

impl Counters {
    pub fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> LinkStats {
        LinkStats {
            frames_sent: self.frames_sent.load(Ordering::Relaxed),
            frames_received: self.frames_received.load(Ordering::Relaxed),
            checksum_errors: self.checksum_errors.load(Ordering::Relaxed),
            decode_errors: self.decode_errors.load(Ordering::Relaxed),
            skipped_bytes: self.skipped_bytes.load(Ordering::Relaxed),
            backlog_evictions: self.backlog_evictions.load(Ordering::Relaxed),
        }
    }
}
