//! Host readiness wait over `poll(2)`.

use std::io;
use std::os::fd::BorrowedFd;
use std::time::Duration;

use nix::errno::Errno;
use nix::poll::{PollFd, PollFlags, PollTimeout, poll};

use otbr_ncp::{Interest, MainloopContext, ReadySet};

/// Timeout in milliseconds, rounded up so a timer is never woken early.
fn timeout_ms(timeout: Duration) -> i32 {
    timeout.as_micros().div_ceil(1000).min(i32::MAX as u128) as i32
}

fn poll_timeout(timeout: Duration) -> PollTimeout {
    PollTimeout::try_from(timeout_ms(timeout)).unwrap_or(PollTimeout::MAX)
}

fn poll_flags(interest: Interest) -> PollFlags {
    let mut flags = PollFlags::empty();
    if interest.contains(Interest::READABLE) {
        flags |= PollFlags::POLLIN;
    }
    if interest.contains(Interest::WRITABLE) {
        flags |= PollFlags::POLLOUT;
    }
    flags
}

fn ready_interest(revents: PollFlags) -> Interest {
    let mut interest = Interest::default();
    if revents.contains(PollFlags::POLLIN) {
        interest |= Interest::READABLE;
    }
    if revents.contains(PollFlags::POLLOUT) {
        interest |= Interest::WRITABLE;
    }
    if revents.intersects(PollFlags::POLLERR | PollFlags::POLLHUP | PollFlags::POLLNVAL) {
        interest |= Interest::ERROR;
    }
    interest
}

/// Block until a registered descriptor is ready or the context timeout passes.
///
/// An interrupted wait returns an empty set so the caller re-runs the
/// iteration with a fresh timeout.
pub(crate) fn wait(context: &MainloopContext) -> io::Result<ReadySet> {
    let registrations = context.registrations();
    let mut fds: Vec<PollFd<'_>> = registrations
        .iter()
        .map(|&(fd, interest)| {
            // SAFETY: descriptors registered in a context stay open until the
            // iteration that registered them has finished processing.
            let fd = unsafe { BorrowedFd::borrow_raw(fd) };
            PollFd::new(fd, poll_flags(interest))
        })
        .collect();

    let mut ready = ReadySet::new();
    match poll(&mut fds, poll_timeout(context.timeout)) {
        Ok(_) => {}
        Err(Errno::EINTR) => return Ok(ready),
        Err(e) => return Err(e.into()),
    }

    for (pfd, &(fd, _)) in fds.iter().zip(registrations) {
        if let Some(revents) = pfd.revents().filter(|r| !r.is_empty()) {
            ready.insert(fd, ready_interest(revents));
        }
    }
    Ok(ready)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::waker::Waker;
    use std::time::Instant;

    #[test]
    fn test_timeout_rounds_up() {
        assert_eq!(timeout_ms(Duration::ZERO), 0);
        assert_eq!(timeout_ms(Duration::from_micros(1)), 1);
        assert_eq!(timeout_ms(Duration::from_millis(10)), 10);
        assert_eq!(timeout_ms(Duration::from_micros(10_001)), 11);
        assert_eq!(timeout_ms(Duration::from_secs(u64::MAX)), i32::MAX);
    }

    #[test]
    fn test_zero_timeout_returns_immediately() {
        let waker = Waker::new().unwrap();
        let mut ctx = MainloopContext::new(Duration::ZERO);
        ctx.register(waker.read_fd(), Interest::READABLE);

        let start = Instant::now();
        let ready = wait(&ctx).unwrap();

        assert!(ready.is_empty());
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_woken_descriptor_reported_readable() {
        let waker = Waker::new().unwrap();
        waker.wake();
        let mut ctx = MainloopContext::new(Duration::from_secs(5));
        ctx.register(waker.read_fd(), Interest::READABLE);

        let ready = wait(&ctx).unwrap();

        assert!(ready.is_ready(waker.read_fd(), Interest::READABLE));
    }

    #[test]
    fn test_no_descriptors_waits_timeout() {
        let ctx = MainloopContext::new(Duration::from_millis(5));
        let start = Instant::now();
        let ready = wait(&ctx).unwrap();

        assert!(ready.is_empty());
        assert!(start.elapsed() >= Duration::from_millis(5));
    }

    #[test]
    fn test_revents_mapping() {
        assert!(ready_interest(PollFlags::POLLIN).contains(Interest::READABLE));
        assert!(ready_interest(PollFlags::POLLHUP).contains(Interest::ERROR));
        assert!(ready_interest(PollFlags::empty()).is_empty());
    }

    #[test]
    fn test_interest_to_poll_flags() {
        assert_eq!(poll_flags(Interest::READABLE), PollFlags::POLLIN);
        assert_eq!(
            poll_flags(Interest::READABLE | Interest::WRITABLE),
            PollFlags::POLLIN | PollFlags::POLLOUT
        );
    }
}
