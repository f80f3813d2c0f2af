use std::io::{self, ErrorKind};
use std::os::fd::RawFd;
use std::time::Duration;

/// Default bounded wait between checks of the session's running flag.
///
/// Balances responsiveness to shutdown against busy-polling overhead.
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_millis(500);

/// Wait until `fd` is readable or errored, for at most `timeout`.
///
/// Returns `Ok(false)` on timeout. Error conditions (`POLLERR`,
/// `POLLHUP`) count as readable so the caller's next read observes the
/// failure instead of blocking. `EINTR` is reported as not-ready, letting
/// the cooperative loop re-check its running flag and poll again.
pub fn wait_readable(fd: RawFd, timeout: Duration) -> io::Result<bool> {
    let mut fds = [libc::pollfd {
        fd,
        events: libc::POLLIN,
        revents: 0,
    }];
    let timeout_ms = libc::c_int::try_from(timeout.as_millis()).unwrap_or(libc::c_int::MAX);

    // SAFETY: `fds` is a valid, initialized array of one pollfd that
    // outlives the call, and the length passed matches it.
    let rc = unsafe { libc::poll(fds.as_mut_ptr(), 1, timeout_ms) };

    match rc {
        -1 => {
            let err = io::Error::last_os_error();
            if err.kind() == ErrorKind::Interrupted {
                Ok(false)
            } else {
                Err(err)
            }
        }
        0 => Ok(false),
        _ => Ok((fds[0].revents & (libc::POLLIN | libc::POLLERR | libc::POLLHUP)) != 0),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::os::fd::AsRawFd;
    use std::os::unix::net::UnixStream;

    use super::*;

    #[test]
    fn readable_when_data_is_buffered() {
        let (mut left, right) = UnixStream::pair().unwrap();
        left.write_all(b"x").unwrap();

        let ready = wait_readable(right.as_raw_fd(), Duration::from_millis(100)).unwrap();
        assert!(ready);
    }

    #[test]
    fn times_out_when_no_data() {
        let (_left, right) = UnixStream::pair().unwrap();

        let ready = wait_readable(right.as_raw_fd(), Duration::from_millis(10)).unwrap();
        assert!(!ready);
    }

    #[test]
    fn hangup_counts_as_readable() {
        let (left, right) = UnixStream::pair().unwrap();
        drop(left);

        let ready = wait_readable(right.as_raw_fd(), Duration::from_millis(100)).unwrap();
        assert!(ready);
    }
}
