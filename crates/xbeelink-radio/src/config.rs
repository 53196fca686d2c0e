use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use tracing::warn;
use xbeelink_command::ResponseFrame;

use crate::error::{RadioError, Result};

/// Frames kept when nobody drains the backlog.
pub const DEFAULT_BACKLOG_CAPACITY: usize = 100;

/// Wait used by [`Radio::send_sync_default`](crate::Radio::send_sync_default).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Predicate deciding which frames enter the backlog. Subscribers and
/// synchronous waiters still see every frame.
///
/// Runs on the reader thread for every frame and must return quickly. A
/// panicking filter is logged and the frame is kept out of the backlog.
pub type FrameFilter = Arc<dyn Fn(&ResponseFrame) -> bool + Send + Sync>;

/// Radio behavior configuration.
#[derive(Clone)]
pub struct RadioConfig {
    pub backlog_capacity: usize,
    pub backlog_filter: Option<FrameFilter>,
    pub default_timeout: Duration,
    /// How often the reader wakes to check for shutdown while the link is
    /// idle. Applied as the stream read timeout.
    pub reader_poll_interval: Duration,
    pub reader_thread_name: String,
}

impl RadioConfig {
    pub fn with_backlog_capacity(mut self, capacity: usize) -> Self {
        self.backlog_capacity = capacity;
        self
    }

    pub fn with_backlog_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&ResponseFrame) -> bool + Send + Sync + 'static,
    {
        self.backlog_filter = Some(Arc::new(filter));
        self
    }

    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    pub fn with_reader_poll_interval(mut self, interval: Duration) -> Self {
        self.reader_poll_interval = interval;
        self
    }

    pub fn with_reader_thread_name(mut self, name: impl Into<String>) -> Self {
        self.reader_thread_name = name.into();
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.backlog_capacity == 0 {
            return Err(RadioError::InvalidConfig("backlog capacity must be > 0"));
        }
        if self.reader_poll_interval.is_zero() {
            return Err(RadioError::InvalidConfig("reader poll interval must be > 0"));
        }
        Ok(())
    }

    pub(crate) fn accepts(&self, frame: &ResponseFrame) -> bool {
        let Some(filter) = &self.backlog_filter else {
            return true;
        };
        panic::catch_unwind(AssertUnwindSafe(|| filter(frame))).unwrap_or_else(|_| {
            warn!(frame_type = frame.frame_type(), "backlog filter panicked, frame not queued");
            false
        })
    }
}

impl Default for RadioConfig {
    fn default() -> Self {
        Self {
            backlog_capacity: DEFAULT_BACKLOG_CAPACITY,
            backlog_filter: None,
            default_timeout: DEFAULT_TIMEOUT,
            reader_poll_interval: DEFAULT_POLL_INTERVAL,
            reader_thread_name: "xbee-reader".to_string(),
        }
    }
}

impl fmt::Debug for RadioConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RadioConfig")
            .field("backlog_capacity", &self.backlog_capacity)
            .field("backlog_filter", &self.backlog_filter.is_some())
            .field("default_timeout", &self.default_timeout)
            .field("reader_poll_interval", &self.reader_poll_interval)
            .field("reader_thread_name", &self.reader_thread_name)
            .finish()
    }
}
