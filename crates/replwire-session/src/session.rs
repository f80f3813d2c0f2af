use std::io::ErrorKind;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bytes::BytesMut;
use replwire_frame::{encode_frame, StreamBuffer};
use serde_json::Value;
use tracing::{debug, trace};

use crate::error::{Result, SessionError};
use crate::registry::MessageRegistry;
use crate::stream::SessionStream;

const DEFAULT_READ_CHUNK_SIZE: usize = 0x1000;

/// A typed message that can travel over a session.
pub trait WireMessage: Sized {
    /// The `status` discriminator value identifying this variant.
    fn status(&self) -> &'static str;

    /// Serialize to the on-wire JSON object, `status` field included.
    fn to_wire(&self) -> serde_json::Result<Value>;
}

/// Tuning knobs for a session's receive loop.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Bounded wait per poll cycle; also the cancellation granularity.
    pub poll_timeout: Duration,
    /// Maximum bytes consumed per read call.
    pub read_chunk_size: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            #[cfg(unix)]
            poll_timeout: crate::poll::DEFAULT_POLL_TIMEOUT,
            #[cfg(not(unix))]
            poll_timeout: Duration::from_millis(500),
            read_chunk_size: DEFAULT_READ_CHUNK_SIZE,
        }
    }
}

/// Cooperative cancellation signal for a blocking receive.
///
/// Cloneable and sendable to other threads (or a signal handler). After
/// [`shutdown`](Self::shutdown), an in-progress blocking receive returns
/// `Ok(None)` within one poll interval.
#[derive(Debug, Clone)]
pub struct ShutdownHandle(Arc<AtomicBool>);

impl ShutdownHandle {
    /// Stop the session's receive loop.
    pub fn shutdown(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    /// Whether the session is still accepting receive work.
    pub fn is_running(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

type Hook = Box<dyn FnMut(Value) -> Value + Send>;

/// A message session over a connected byte stream.
///
/// Owns the framing state (pending bytes + frame queue), the dispatch
/// registry, and optional send/receive hooks. One logical thread of
/// control: sends and receives are not internally synchronized, so
/// callers using a session from several threads must serialize access.
pub struct Session<S, M> {
    stream: S,
    buffer: StreamBuffer,
    registry: MessageRegistry<M>,
    on_send: Hook,
    on_recv: Hook,
    running: Arc<AtomicBool>,
    config: SessionConfig,
    scratch: BytesMut,
}

impl<S: SessionStream, M: WireMessage> Session<S, M> {
    /// Create a session over an already-connected stream with default
    /// configuration.
    pub fn new(stream: S, registry: MessageRegistry<M>) -> Self {
        Self::with_config(stream, registry, SessionConfig::default())
    }

    /// Create a session with explicit configuration.
    pub fn with_config(stream: S, registry: MessageRegistry<M>, config: SessionConfig) -> Self {
        Self {
            stream,
            buffer: StreamBuffer::new(),
            registry,
            on_send: Box::new(|wire| wire),
            on_recv: Box::new(|wire| wire),
            running: Arc::new(AtomicBool::new(true)),
            config,
            scratch: BytesMut::new(),
        }
    }

    /// Replace the pre-send hook. Identity by default; the hook sees the
    /// serialized wire object just before transmission and may transform
    /// or merely inspect it.
    pub fn on_send(mut self, hook: impl FnMut(Value) -> Value + Send + 'static) -> Self {
        self.on_send = Box::new(hook);
        self
    }

    /// Replace the post-receive hook. Identity by default; the hook sees
    /// the decoded wire object before registry dispatch.
    pub fn on_recv(mut self, hook: impl FnMut(Value) -> Value + Send + 'static) -> Self {
        self.on_recv = Box::new(hook);
        self
    }

    /// Handle for cooperative shutdown from another thread.
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle(Arc::clone(&self.running))
    }

    /// Whether a blocking receive would still wait for data.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Send one typed message.
    ///
    /// The message is serialized, passed through the send hook, framed,
    /// and written in full. A write the stream refuses to make progress
    /// on is escalated to [`SessionError::ConnectionClosed`]: a reliable
    /// stream write is all-or-nothing from the caller's perspective.
    pub fn send_message(&mut self, msg: &M) -> Result<()> {
        let wire = msg.to_wire().map_err(SessionError::Json)?;
        let wire = (self.on_send)(wire);
        self.send_value(&wire)
    }

    /// Send a raw wire object, bypassing the send hook.
    pub fn send_value(&mut self, wire: &Value) -> Result<()> {
        let text = serde_json::to_string(wire)?;
        self.scratch.clear();
        encode_frame(&text, &mut self.scratch);
        debug!(len = text.len(), "sending frame");

        let mut offset = 0usize;
        while offset < self.scratch.len() {
            match self.stream.write(&self.scratch[offset..]) {
                Ok(0) => return Err(SessionError::ConnectionClosed),
                Ok(written) => offset += written,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) if is_disconnect(&err) => return Err(SessionError::ConnectionClosed),
                Err(err) => return Err(err.into()),
            }
        }

        loop {
            match self.stream.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if is_disconnect(&err) => return Err(SessionError::ConnectionClosed),
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Receive one typed message.
    ///
    /// Already-queued frames are delivered without touching the network.
    /// Otherwise the session polls with a bounded timeout and reads when
    /// data is ready; with `block = false` an idle stream yields
    /// `Ok(None)` immediately, with `block = true` the poll repeats until
    /// a message arrives or the running flag is cleared (then `Ok(None)`).
    ///
    /// A zero-byte read means the remote closed the stream and fails with
    /// [`SessionError::ConnectionClosed`]. A frame whose object lacks a
    /// known `status` fails with [`SessionError::InvalidMessage`]; the
    /// frame is already consumed, so subsequent receives move on.
    pub fn recv_message(&mut self, block: bool) -> Result<Option<M>> {
        loop {
            if let Some(wire) = self.next_queued_value()? {
                let wire = (self.on_recv)(wire);
                return self.registry.decode(&wire).map(Some);
            }

            if !self.is_running() {
                return Ok(None);
            }

            if !self.stream.ready_to_read(self.config.poll_timeout)? {
                if !block {
                    return Ok(None);
                }
                continue;
            }

            let mut chunk = vec![0u8; self.config.read_chunk_size];
            let read = match self.stream.read(&mut chunk) {
                Ok(0) => return Err(SessionError::ConnectionClosed),
                Ok(read) => read,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if is_disconnect(&err) => return Err(SessionError::ConnectionClosed),
                Err(err) => return Err(err.into()),
            };
            self.buffer.feed(&chunk[..read])?;
        }
    }

    /// Pop queued frames until one parses into a wire object.
    ///
    /// Zero-length frames are bare delimiter boundaries and are skipped.
    fn next_queued_value(&mut self) -> Result<Option<Value>> {
        while let Some(frame) = self.buffer.pop_frame() {
            if frame.is_empty() {
                continue;
            }
            trace!(len = frame.len(), "dequeued frame");
            return Ok(Some(serde_json::from_str(&frame)?));
        }
        Ok(None)
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &S {
        &self.stream
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut S {
        &mut self.stream
    }

    /// Consume the session and return the inner stream.
    pub fn into_inner(self) -> S {
        self.stream
    }
}

/// OS errors that mean the peer is gone rather than a transient fault.
fn is_disconnect(err: &std::io::Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::BrokenPipe | ErrorKind::ConnectionReset | ErrorKind::ConnectionAborted
    )
}
