/// Errors that can occur in session operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The remote side closed the stream, or a write could not complete.
    ///
    /// Terminal for the session: the caller must tear it down and, if
    /// desired, reconnect with a fresh session.
    #[error("connection closed by peer")]
    ConnectionClosed,

    /// A complete frame was semantically malformed: missing `status`
    /// field, or a discriminator no decoder is registered for.
    ///
    /// Recoverable: the offending frame has already been consumed, so the
    /// caller may log it and keep receiving.
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    /// A cooperative user abort while waiting on the session.
    ///
    /// Never produced by this crate itself; callers inject it (e.g. a
    /// Ctrl-C handler) so it travels the same call paths as the other
    /// session errors.
    #[error("interrupted while waiting on session")]
    Interrupted,

    /// A discriminator was registered twice while building a registry.
    #[error("duplicate status registration: {0}")]
    DuplicateStatus(String),

    /// Frame-level error.
    #[error("frame error: {0}")]
    Frame(#[from] replwire_frame::FrameError),

    /// JSON serialization/deserialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// An I/O error this crate does not classify; propagated unchanged.
    #[error("session I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SessionError>;
