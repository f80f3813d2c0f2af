/// Errors that can occur while encoding or splitting frames.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// A complete frame was not valid UTF-8 text.
    #[error("frame is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
}

pub type Result<T> = std::result::Result<T, FrameError>;
