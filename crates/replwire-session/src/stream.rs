use std::io::{self, Read, Write};
use std::time::Duration;

/// A connected bidirectional byte stream usable by a session.
///
/// This is the transport seam: the session only needs `Read`, `Write`,
/// and a bounded readiness check, so anything from a socket to an
/// in-memory test double can back it. The stream's lifecycle stays with
/// the caller.
pub trait SessionStream: Read + Write {
    /// Wait until the stream has data to read or has errored, for at most
    /// `timeout`. Returns `Ok(false)` on timeout.
    fn ready_to_read(&self, timeout: Duration) -> io::Result<bool>;
}

#[cfg(unix)]
impl SessionStream for std::os::unix::net::UnixStream {
    fn ready_to_read(&self, timeout: Duration) -> io::Result<bool> {
        use std::os::fd::AsRawFd;
        crate::poll::wait_readable(self.as_raw_fd(), timeout)
    }
}

#[cfg(unix)]
impl SessionStream for std::net::TcpStream {
    fn ready_to_read(&self, timeout: Duration) -> io::Result<bool> {
        use std::os::fd::AsRawFd;
        crate::poll::wait_readable(self.as_raw_fd(), timeout)
    }
}
