//! Self-pipe used to interrupt the readiness wait from other threads.

use std::fs::File;
use std::io::{self, Read, Write};
use std::os::fd::{AsFd, AsRawFd, OwnedFd, RawFd};

use nix::fcntl::{FcntlArg, OFlag, fcntl};
use nix::unistd::pipe;

/// Non-blocking pipe. Writing a byte makes the read end readable.
#[derive(Debug)]
pub(crate) struct Waker {
    read: File,
    write: File,
}

impl Waker {
    pub fn new() -> io::Result<Self> {
        let (read, write) = pipe()?;
        set_nonblocking(&read)?;
        set_nonblocking(&write)?;
        Ok(Self {
            read: File::from(read),
            write: File::from(write),
        })
    }

    /// Descriptor to register for readability.
    pub fn read_fd(&self) -> RawFd {
        self.read.as_raw_fd()
    }

    /// Make the read end readable. A full pipe already is, so EAGAIN is fine.
    pub fn wake(&self) {
        let _ = (&self.write).write(&[1]);
    }

    /// Consume every pending wake byte.
    pub fn drain(&self) {
        let mut buf = [0u8; 64];
        loop {
            match (&self.read).read(&mut buf) {
                Ok(0) => break,
                Ok(_) => continue,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(_) => break,
            }
        }
    }
}

impl AsFd for Waker {
    fn as_fd(&self) -> std::os::fd::BorrowedFd<'_> {
        self.read.as_fd()
    }
}

fn set_nonblocking(fd: &OwnedFd) -> io::Result<()> {
    let raw = fd.as_raw_fd();
    let flags = OFlag::from_bits_truncate(fcntl(raw, FcntlArg::F_GETFL)?);
    fcntl(raw, FcntlArg::F_SETFL(flags | OFlag::O_NONBLOCK))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nix::poll::{PollFd, PollFlags, PollTimeout, poll};

    fn readable(waker: &Waker) -> bool {
        let mut fds = [PollFd::new(waker.as_fd(), PollFlags::POLLIN)];
        poll(&mut fds, PollTimeout::ZERO).unwrap() == 1
    }

    #[test]
    fn test_wake_then_drain() {
        let waker = Waker::new().unwrap();
        assert!(!readable(&waker));

        waker.wake();
        waker.wake();
        assert!(readable(&waker));

        waker.drain();
        assert!(!readable(&waker));
    }

    #[test]
    fn test_drain_when_empty_does_not_block() {
        let waker = Waker::new().unwrap();
        waker.drain();
    }

    #[test]
    fn test_wake_on_full_pipe_does_not_block() {
        let waker = Waker::new().unwrap();
        for _ in 0..100_000 {
            waker.wake();
        }
        assert!(readable(&waker));
        waker.drain();
        assert!(!readable(&waker));
    }
}
