//! NUL-delimited JSON message sessions for remote REPLs.
//!
//! replwire frames discrete JSON messages onto a raw byte stream and
//! dispatches them to typed variants by their `status` discriminator.
//!
//! # Crate Structure
//!
//! - [`frame`] — NUL-delimited framing and partial-read buffering
//! - [`session`] — cooperatively-polled sessions, message registry, and
//!   the built-in remote-shell protocol

/// Re-export frame types.
pub mod frame {
    pub use replwire_frame::*;
}

/// Re-export session types.
pub mod session {
    pub use replwire_session::*;
}
