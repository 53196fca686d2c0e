//! Bounded, drop-oldest frame queue.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use xbeelink_command::ResponseFrame;

struct State {
    frames: VecDeque<ResponseFrame>,
    closed: bool,
}

/// Frames nobody has consumed yet, oldest first.
///
/// Pushing never blocks: at capacity the oldest frame is evicted to make
/// room. Receivers block until a frame arrives, the deadline passes, or the
/// backlog is closed.
pub struct Backlog {
    capacity: usize,
    state: Mutex<State>,
    ready: Condvar,
}

impl Backlog {
    /// `capacity` must be at least one.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            state: Mutex::new(State {
                frames: VecDeque::with_capacity(capacity.min(1024)),
                closed: false,
            }),
            ready: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a frame. Returns the evicted frame, if any.
    pub fn push(&self, frame: ResponseFrame) -> Option<ResponseFrame> {
        let evicted = {
            let mut state = self.lock();
            let evicted = if state.frames.len() >= self.capacity {
                state.frames.pop_front()
            } else {
                None
            };
            state.frames.push_back(frame);
            evicted
        };
        self.ready.notify_one();
        evicted
    }

    /// Take the oldest frame without waiting.
    pub fn try_recv(&self) -> Option<ResponseFrame> {
        self.lock().frames.pop_front()
    }

    /// Take the oldest frame, waiting up to `timeout` for one to arrive.
    ///
    /// Returns `None` on timeout, or at once when the backlog is closed and
    /// empty. A timeout too large to be a deadline waits without one.
    pub fn recv(&self, timeout: Duration) -> Option<ResponseFrame> {
        self.recv_until(Instant::now().checked_add(timeout))
    }

    fn recv_until(&self, deadline: Option<Instant>) -> Option<ResponseFrame> {
        let mut state = self.lock();
        loop {
            if let Some(frame) = state.frames.pop_front() {
                return Some(frame);
            }
            if state.closed {
                return None;
            }
            state = match deadline {
                None => self.ready.wait(state).unwrap_or_else(PoisonError::into_inner),
                Some(deadline) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    if remaining.is_zero() {
                        return None;
                    }
                    self.ready
                        .wait_timeout(state, remaining)
                        .unwrap_or_else(PoisonError::into_inner)
                        .0
                }
            };
        }
    }

    /// Gather frames until `wait` elapses or `stop` returns true.
    ///
    /// The frame that satisfied `stop` is included. Useful for node
    /// discovery, where each neighbor answers separately.
    pub fn collect<F>(&self, wait: Duration, mut stop: F) -> Vec<ResponseFrame>
    where
        F: FnMut(&ResponseFrame) -> bool,
    {
        let deadline = Instant::now().checked_add(wait);
        let mut frames = Vec::new();
        while let Some(frame) = self.recv_until(deadline) {
            let done = stop(&frame);
            frames.push(frame);
            if done {
                break;
            }
        }
        frames
    }

    pub fn len(&self) -> usize {
        self.lock().frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().frames.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop every queued frame. Returns how many were dropped.
    pub fn clear(&self) -> usize {
        let mut state = self.lock();
        let dropped = state.frames.len();
        state.frames.clear();
        dropped
    }

    /// Wake all receivers; later receives return queued frames, then `None`.
    pub(crate) fn close(&self) {
        self.lock().closed = true;
        self.ready.notify_all();
    }
}

impl std::fmt::Debug for Backlog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backlog")
            .field("capacity", &self.capacity)
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use xbeelink_command::ModemStatus;

    use super::*;

    fn status(code: u8) -> ResponseFrame {
        ResponseFrame::ModemStatus {
            status: ModemStatus::from_code(code),
        }
    }

    #[test]
    fn test_evicts_oldest_at_capacity() {
        let backlog = Backlog::new(3);
        for code in 0..3 {
            assert!(backlog.push(status(code)).is_none());
        }
        assert_eq!(backlog.push(status(3)), Some(status(0)));

        assert_eq!(backlog.len(), 3);
        let drained: Vec<_> = std::iter::from_fn(|| backlog.try_recv()).collect();
        assert_eq!(drained, vec![status(1), status(2), status(3)]);
    }

    #[test]
    fn test_recv_times_out_when_empty() {
        let backlog = Backlog::new(4);
        let start = Instant::now();
        assert!(backlog.recv(Duration::from_millis(30)).is_none());
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn test_recv_wakes_on_push() {
        let backlog = Arc::new(Backlog::new(4));
        let producer = {
            let backlog = Arc::clone(&backlog);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(20));
                backlog.push(status(6));
            })
        };
        assert_eq!(backlog.recv(Duration::from_secs(5)), Some(status(6)));
        producer.join().unwrap();
    }

    #[test]
    fn test_close_releases_receivers() {
        let backlog = Arc::new(Backlog::new(4));
        let waiter = {
            let backlog = Arc::clone(&backlog);
            thread::spawn(move || backlog.recv(Duration::from_secs(30)))
        };
        thread::sleep(Duration::from_millis(20));
        backlog.close();
        assert!(waiter.join().unwrap().is_none());
    }

    #[test]
    fn test_collect_stops_on_predicate() {
        let backlog = Backlog::new(8);
        for code in [0x00, 0x02, 0x06, 0x01] {
            backlog.push(status(code));
        }
        let frames = backlog.collect(Duration::from_secs(5), |f| *f == status(0x06));
        assert_eq!(frames, vec![status(0x00), status(0x02), status(0x06)]);
        assert_eq!(backlog.len(), 1);
    }

    #[test]
    fn test_collect_stops_at_deadline() {
        let backlog = Backlog::new(8);
        backlog.push(status(0x02));
        let frames = backlog.collect(Duration::from_millis(30), |_| false);
        assert_eq!(frames.len(), 1);
    }

    #[test]
    fn test_unbounded_wait() {
        let backlog = Arc::new(Backlog::new(4));
        let producer = {
            let backlog = Arc::clone(&backlog);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(20));
                backlog.push(status(0x02));
                backlog.push(status(0x06));
                thread::sleep(Duration::from_millis(20));
                backlog.close();
            })
        };
        assert_eq!(backlog.recv(Duration::MAX), Some(status(0x02)));
        let rest = backlog.collect(Duration::MAX, |_| false);
        assert_eq!(rest, vec![status(0x06)]);
        producer.join().unwrap();
    }

    #[test]
    fn test_clear() {
        let backlog = Backlog::new(8);
        backlog.push(status(0));
        backlog.push(status(1));
        assert_eq!(backlog.clear(), 2);
        assert!(backlog.is_empty());
    }
}
