//! Message-oriented sessions over raw byte streams.
//!
//! This is the "just works" layer of replwire. A [`Session`] frames JSON
//! messages onto a connected stream, buffers partial frames across reads,
//! and dispatches complete frames to typed messages through a
//! discriminator [`registry`](MessageRegistry). Receives are driven by a
//! bounded readiness poll rather than a blocking read, so a session can be
//! shut down cooperatively from another thread via its [`ShutdownHandle`].
//!
//! The session never owns transport setup: it is handed an
//! already-connected stream and leaves teardown to the caller.

pub mod error;
#[cfg(unix)]
pub mod poll;
pub mod protocol;
pub mod registry;
pub mod session;
pub mod stream;

pub use error::{Result, SessionError};
#[cfg(unix)]
pub use poll::{wait_readable, DEFAULT_POLL_TIMEOUT};
pub use protocol::{
    CompletionRequest, CompletionResponse, InputRequest, InputResponse, ShellMessage, ShellOutput,
    STATUS_COMPLETION_REQUEST, STATUS_COMPLETION_RESPONSE, STATUS_INPUT_REQUEST,
    STATUS_INPUT_RESPONSE, STATUS_SHELL_OUTPUT,
};
pub use registry::{Decoder, MessageRegistry, RegistryBuilder};
pub use session::{Session, SessionConfig, ShutdownHandle, WireMessage};
pub use stream::SessionStream;
