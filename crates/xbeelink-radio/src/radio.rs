use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, SyncSender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, error, info, trace, warn};
use xbeelink_command::{CommandRegistry, FrameId, FrameIdAllocator, Request, ResponseFrame};
use xbeelink_frame::{FrameConfig, FrameError, FrameReader, FrameWriter, RawFrame};
use xbeelink_transport::XbeeStream;

use crate::backlog::Backlog;
use crate::config::RadioConfig;
use crate::error::{RadioError, Result};
use crate::stats::{Counters, LinkStats};

/// Connection lifecycle: `Connected` from open until [`Radio::close`] or a
/// reader failure, `Closing` while shutdown is in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum LinkState {
    Disconnected = 0,
    Connected = 1,
    Closing = 2,
}

impl LinkState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => LinkState::Connected,
            2 => LinkState::Closing,
            _ => LinkState::Disconnected,
        }
    }
}

/// Handle returned by [`Radio::add_listener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Arc<dyn Fn(&ResponseFrame) + Send + Sync>;

struct Waiter {
    token: u64,
    tx: SyncSender<ResponseFrame>,
}

struct Shared {
    registry: CommandRegistry,
    config: RadioConfig,
    backlog: Backlog,
    state: AtomicU8,
    stop: AtomicBool,
    pending: Mutex<HashMap<FrameId, Waiter>>,
    next_token: AtomicU64,
    subscribers: Mutex<Vec<Sender<ResponseFrame>>>,
    listeners: Mutex<Vec<(ListenerId, Listener)>>,
    next_listener: AtomicU64,
    counters: Counters,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Shared {
    fn state(&self) -> LinkState {
        LinkState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn set_state(&self, state: LinkState) {
        self.state.store(state as u8, Ordering::Release);
    }

    fn decode(&self, raw: &RawFrame) -> ResponseFrame {
        match self.registry.decode(raw) {
            Ok(frame) => {
                trace!(frame_type = raw.frame_type, len = raw.len(), "received frame");
                frame
            }
            Err(err) => {
                Counters::bump(&self.counters.decode_errors);
                warn!(frame_type = raw.frame_type, error = %err, "delivering undecoded frame");
                ResponseFrame::undecoded(raw, err)
            }
        }
    }

    /// Hand one frame to every consumer, in a fixed order: the synchronous
    /// waiter for its frame ID, the backlog, subscribers, then listeners.
    fn dispatch(&self, frame: ResponseFrame) {
        Counters::bump(&self.counters.frames_received);

        if let Some(frame_id) = frame.frame_id() {
            if let Some(waiter) = lock(&self.pending).remove(&frame_id) {
                // The slot is fresh per wait; failure means the caller already gave up.
                let _ = waiter.tx.try_send(frame.clone());
                trace!(frame_id = %frame_id, "completed pending request");
            }
        }

        if self.config.accepts(&frame) && self.backlog.push(frame.clone()).is_some() {
            Counters::bump(&self.counters.backlog_evictions);
            debug!(capacity = self.backlog.capacity(), "backlog full, evicted oldest frame");
        }

        lock(&self.subscribers).retain(|tx| tx.send(frame.clone()).is_ok());

        let listeners: Vec<Listener> = lock(&self.listeners)
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            if panic::catch_unwind(AssertUnwindSafe(|| listener(&frame))).is_err() {
                warn!(frame_type = frame.frame_type(), "frame listener panicked");
            }
        }
    }

    /// Fail every synchronous waiter and end every subscription.
    fn release_waiters(&self) {
        let released = {
            let mut pending = lock(&self.pending);
            let count = pending.len();
            pending.clear();
            count
        };
        if released > 0 {
            debug!(released, "released pending requests");
        }
        lock(&self.subscribers).clear();
        self.backlog.close();
    }
}

/// Registration of one synchronous wait; removed again on drop.
struct PendingGuard<'a> {
    shared: &'a Shared,
    frame_id: FrameId,
    token: u64,
}

impl<'a> PendingGuard<'a> {
    fn register(
        shared: &'a Shared,
        frame_id: FrameId,
        tx: SyncSender<ResponseFrame>,
    ) -> Result<Self> {
        let mut pending = lock(&shared.pending);
        if shared.state() != LinkState::Connected {
            return Err(RadioError::NotConnected);
        }
        if pending.contains_key(&frame_id) {
            return Err(RadioError::FrameIdInUse(frame_id));
        }
        let token = shared.next_token.fetch_add(1, Ordering::Relaxed);
        pending.insert(frame_id, Waiter { token, tx });
        Ok(Self {
            shared,
            frame_id,
            token,
        })
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        let mut pending = lock(&self.shared.pending);
        // The reader may already have completed this wait and a new one
        // may have taken the same frame ID since.
        if pending.get(&self.frame_id).is_some_and(|w| w.token == self.token) {
            pending.remove(&self.frame_id);
        }
    }
}

/// Takes the link down when the reader thread ends, by return or unwind.
struct ReaderExit<'a>(&'a Shared);

impl Drop for ReaderExit<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            error!("radio reader panicked");
        }
        self.0.set_state(LinkState::Disconnected);
        self.0.release_waiters();
    }
}

fn read_loop(shared: Arc<Shared>, mut reader: FrameReader<XbeeStream>) {
    let _exit = ReaderExit(&shared);
    let mut skipped = 0;
    let outcome = loop {
        if shared.stop.load(Ordering::Acquire) {
            break Ok(());
        }

        let result = reader.read_frame();

        let now_skipped = reader.skipped_bytes();
        if now_skipped > skipped {
            shared
                .counters
                .skipped_bytes
                .fetch_add(now_skipped - skipped, Ordering::Relaxed);
            debug!(skipped = now_skipped - skipped, "skipped bytes before start marker");
            skipped = now_skipped;
        }

        match result {
            Ok(raw) => shared.dispatch(shared.decode(&raw)),
            Err(err) if err.is_timeout() => {}
            Err(err) if err.is_recoverable() => {
                if matches!(err, FrameError::ChecksumMismatch { .. }) {
                    Counters::bump(&shared.counters.checksum_errors);
                }
                warn!(error = %err, "dropping frame");
            }
            Err(FrameError::ConnectionClosed) => break Ok(()),
            Err(err) => break Err(err),
        }
    };

    let stopping = shared.stop.load(Ordering::Acquire);
    match outcome {
        Ok(()) if stopping => debug!("radio reader stopped"),
        Ok(()) => info!("radio link closed by peer"),
        Err(err) if stopping => debug!(error = %err, "radio reader stopped"),
        Err(err) => error!(error = %err, "radio reader failed"),
    }
}

/// One open radio link.
///
/// All methods take `&self`; share a `Radio` between threads with `Arc`.
/// Writes are serialized frame by frame. Each synchronous send waits only
/// for its own frame ID.
///
/// Serial ports ignore socket read timeouts: open them with a port timeout
/// no longer than [`RadioConfig::reader_poll_interval`] so [`close`](Self::close)
/// returns promptly.
pub struct Radio {
    shared: Arc<Shared>,
    writer: Mutex<FrameWriter<XbeeStream>>,
    control: XbeeStream,
    allocator: FrameIdAllocator,
    reader: Mutex<Option<JoinHandle<()>>>,
}

impl Radio {
    /// Start the reader on `stream` with the standard decoder table.
    pub fn open(stream: XbeeStream, config: RadioConfig) -> Result<Self> {
        Self::open_with_registry(stream, config, CommandRegistry::default())
    }

    /// Start the reader with a custom decoder table.
    pub fn open_with_registry(
        stream: XbeeStream,
        config: RadioConfig,
        registry: CommandRegistry,
    ) -> Result<Self> {
        config.validate()?;

        let reader_stream = stream.try_clone()?;
        let control = stream.try_clone()?;
        let frame_config = FrameConfig {
            read_timeout: Some(config.reader_poll_interval),
            ..FrameConfig::default()
        };
        let reader = FrameReader::with_config_stream(reader_stream, frame_config.clone())?;
        let writer = FrameWriter::with_config_stream(stream, frame_config)?;

        let thread_name = config.reader_thread_name.clone();
        let shared = Arc::new(Shared {
            registry,
            backlog: Backlog::new(config.backlog_capacity),
            config,
            state: AtomicU8::new(LinkState::Connected as u8),
            stop: AtomicBool::new(false),
            pending: Mutex::new(HashMap::new()),
            next_token: AtomicU64::new(0),
            subscribers: Mutex::new(Vec::new()),
            listeners: Mutex::new(Vec::new()),
            next_listener: AtomicU64::new(1),
            counters: Counters::default(),
        });

        let handle = thread::Builder::new()
            .name(thread_name)
            .spawn({
                let shared = Arc::clone(&shared);
                move || read_loop(shared, reader)
            })
            .map_err(RadioError::ReaderSpawn)?;

        info!(transport = control.kind(), "radio link open");
        Ok(Self {
            shared,
            writer: Mutex::new(writer),
            control,
            allocator: FrameIdAllocator::new(),
            reader: Mutex::new(Some(handle)),
        })
    }

    pub fn state(&self) -> LinkState {
        self.shared.state()
    }

    pub fn is_connected(&self) -> bool {
        self.state() == LinkState::Connected
    }

    /// Allocate a frame ID from this radio's allocator.
    pub fn next_frame_id(&self) -> FrameId {
        self.allocator.next()
    }

    /// Write a request without waiting for any reply.
    pub fn send(&self, request: &Request) -> Result<()> {
        if !self.is_connected() {
            return Err(RadioError::NotConnected);
        }
        let frame = request.encode();
        lock(&self.writer).write_frame(&frame)?;
        Counters::bump(&self.shared.counters.frames_sent);
        debug!(
            frame_id = %request.frame_id(),
            frame_type = frame.frame_type,
            len = frame.len(),
            "sent frame"
        );
        Ok(())
    }

    /// Write a request and wait for the first frame carrying its frame ID.
    ///
    /// A zero `timeout` waits until a response arrives or the link closes.
    /// The matching frame is also delivered to the backlog and subscribers.
    pub fn send_sync(&self, request: &Request, timeout: Duration) -> Result<ResponseFrame> {
        let frame_id = request.frame_id();
        if !frame_id.expects_response() {
            return Err(RadioError::NoResponseFrameId);
        }

        let (tx, rx) = mpsc::sync_channel(1);
        let _pending = PendingGuard::register(&self.shared, frame_id, tx)?;
        self.send(request)?;

        if timeout.is_zero() {
            return rx.recv().map_err(|_| RadioError::NotConnected);
        }
        match rx.recv_timeout(timeout) {
            Ok(frame) => Ok(frame),
            Err(RecvTimeoutError::Timeout) => {
                debug!(frame_id = %frame_id, ?timeout, "request timed out");
                Err(RadioError::Timeout(timeout))
            }
            Err(RecvTimeoutError::Disconnected) => Err(RadioError::NotConnected),
        }
    }

    /// [`send_sync`](Self::send_sync) with the configured default timeout.
    pub fn send_sync_default(&self, request: &Request) -> Result<ResponseFrame> {
        self.send_sync(request, self.shared.config.default_timeout)
    }

    /// Give `request` a fresh frame ID, send it and wait for the response.
    pub fn call(&self, request: impl Into<Request>, timeout: Duration) -> Result<ResponseFrame> {
        let mut request = request.into();
        request.set_frame_id(self.next_frame_id());
        self.send_sync(&request, timeout)
    }

    /// Receive every frame decoded from now on, in arrival order.
    ///
    /// The channel is unbounded so the reader never waits on it; drop the
    /// receiver to unsubscribe. It disconnects when the link closes.
    pub fn subscribe(&self) -> Receiver<ResponseFrame> {
        let (tx, rx) = mpsc::channel();
        let mut subscribers = lock(&self.shared.subscribers);
        if self.shared.state() == LinkState::Connected {
            subscribers.push(tx);
        }
        rx
    }

    /// Call `listener` on the reader thread for every frame.
    ///
    /// Listeners must return quickly. A panicking listener is logged and
    /// skipped; the others still see the frame.
    pub fn add_listener<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&ResponseFrame) + Send + Sync + 'static,
    {
        let id = ListenerId(self.shared.next_listener.fetch_add(1, Ordering::Relaxed));
        lock(&self.shared.listeners).push((id, Arc::new(listener)));
        id
    }

    /// Returns false if the listener was not registered.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let mut listeners = lock(&self.shared.listeners);
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    pub fn backlog(&self) -> &Backlog {
        &self.shared.backlog
    }

    /// Oldest backlog frame, waiting up to `timeout`.
    pub fn recv(&self, timeout: Duration) -> Option<ResponseFrame> {
        self.shared.backlog.recv(timeout)
    }

    pub fn try_recv(&self) -> Option<ResponseFrame> {
        self.shared.backlog.try_recv()
    }

    pub fn backlog_len(&self) -> usize {
        self.shared.backlog.len()
    }

    pub fn clear_backlog(&self) -> usize {
        self.shared.backlog.clear()
    }

    /// See [`Backlog::collect`].
    pub fn collect<F>(&self, wait: Duration, stop: F) -> Vec<ResponseFrame>
    where
        F: FnMut(&ResponseFrame) -> bool,
    {
        self.shared.backlog.collect(wait, stop)
    }

    /// Number of synchronous sends currently waiting.
    pub fn pending_requests(&self) -> usize {
        lock(&self.shared.pending).len()
    }

    pub fn stats(&self) -> LinkStats {
        self.shared.counters.snapshot()
    }

    /// Stop the reader, close the stream and release every waiter.
    ///
    /// Idempotent. Blocked synchronous sends fail with
    /// [`RadioError::NotConnected`].
    pub fn close(&self) -> Result<()> {
        let Some(handle) = lock(&self.reader).take() else {
            return Ok(());
        };

        self.shared.set_state(LinkState::Closing);
        self.shared.stop.store(true, Ordering::Release);
        let shutdown = self.control.shutdown();
        // A panic was already logged by the reader on its way out.
        let _ = handle.join();

        self.shared.set_state(LinkState::Disconnected);
        self.shared.release_waiters();
        info!("radio link closed");
        shutdown.map_err(RadioError::from)
    }
}

impl Drop for Radio {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            debug!(error = %err, "error closing radio on drop");
        }
    }
}

impl fmt::Debug for Radio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Radio")
            .field("transport", &self.control.kind())
            .field("state", &self.state())
            .field("pending", &self.pending_requests())
            .field("backlog", &self.shared.backlog)
            .finish()
    }
}
