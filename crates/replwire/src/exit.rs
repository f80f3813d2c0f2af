use std::fmt;
use std::io;

use replwire_frame::FrameError;
use replwire_session::SessionError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;
// 128 + SIGINT, the shell convention for Ctrl-C.
pub const INTERRUPTED: i32 = 130;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::ConnectionRefused | io::ErrorKind::NotFound => FAILURE,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    CliError::new(DATA_INVALID, format!("{context}: {err}"))
}

pub fn session_error(context: &str, err: SessionError) -> CliError {
    match err {
        SessionError::ConnectionClosed => CliError::new(FAILURE, format!("{context}: {err}")),
        SessionError::InvalidMessage(_) => CliError::new(DATA_INVALID, format!("{context}: {err}")),
        SessionError::Interrupted => CliError::new(INTERRUPTED, format!("{context}: {err}")),
        SessionError::Frame(err) => frame_error(context, err),
        SessionError::Json(err) => CliError::new(DATA_INVALID, format!("{context}: {err}")),
        SessionError::Io(err) => io_error(context, err),
        other => CliError::new(INTERNAL, format!("{context}: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interrupted_maps_to_sigint_convention() {
        let err = session_error("wait", SessionError::Interrupted);
        assert_eq!(err.code, INTERRUPTED);
    }

    #[test]
    fn connection_closed_is_plain_failure() {
        let err = session_error("recv", SessionError::ConnectionClosed);
        assert_eq!(err.code, FAILURE);
    }

    #[test]
    fn invalid_message_is_data_invalid() {
        let err = session_error(
            "recv",
            SessionError::InvalidMessage("unknown status bogus".to_string()),
        );
        assert_eq!(err.code, DATA_INVALID);
        assert!(err.message.contains("bogus"));
    }
}
