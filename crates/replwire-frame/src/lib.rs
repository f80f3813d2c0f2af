//! NUL-delimited message framing for replwire.
//!
//! This is the core value-add layer of replwire. Each message is one UTF-8
//! JSON document followed by a single NUL (0x00) delimiter byte — NUL can
//! never occur inside UTF-8 JSON text, so delimiter scanning is the only
//! framing mechanism. The codec turns raw read chunks into complete frames;
//! the [`StreamBuffer`] carries partial frames across reads.
//!
//! No partial reads, no buffer management in user code.

pub mod buffer;
pub mod codec;
pub mod error;

pub use buffer::StreamBuffer;
pub use codec::{encode_frame, split_frames, DELIMITER};
pub use error::{FrameError, Result};
