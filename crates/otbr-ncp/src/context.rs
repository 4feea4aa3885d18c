//! Per-iteration readiness wait parameters and results.

use std::ops::{BitOr, BitOrAssign};
use std::os::fd::RawFd;
use std::time::Duration;

/// I/O readiness interest for a descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Interest(u8);

impl Interest {
    pub const READABLE: Interest = Interest(1 << 0);
    pub const WRITABLE: Interest = Interest(1 << 1);
    /// Error or hang-up; always reported by the host wait.
    pub const ERROR: Interest = Interest(1 << 2);

    /// Raw bits.
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Check if every bit of `other` is set.
    pub const fn contains(self, other: Interest) -> bool {
        other.0 != 0 && (self.0 & other.0) == other.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for Interest {
    type Output = Interest;

    fn bitor(self, rhs: Interest) -> Interest {
        Interest(self.0 | rhs.0)
    }
}

impl BitOrAssign for Interest {
    fn bitor_assign(&mut self, rhs: Interest) {
        self.0 |= rhs.0;
    }
}

/// Input to one readiness wait: the descriptors to watch and how long to block.
#[derive(Debug, Clone)]
pub struct MainloopContext {
    /// Maximum time the host may block.
    pub timeout: Duration,
    registrations: Vec<(RawFd, Interest)>,
}

impl MainloopContext {
    /// Start a context with the host's default timeout.
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            registrations: Vec::new(),
        }
    }

    /// Watch `fd` for `interest`. Repeated registrations merge.
    pub fn register(&mut self, fd: RawFd, interest: Interest) {
        match self.registrations.iter_mut().find(|(f, _)| *f == fd) {
            Some((_, existing)) => *existing |= interest,
            None => self.registrations.push((fd, interest)),
        }
    }

    /// Registered descriptors.
    pub fn registrations(&self) -> &[(RawFd, Interest)] {
        &self.registrations
    }

    /// Lower the timeout to `timeout` if it is shorter.
    pub fn shrink_timeout(&mut self, timeout: Duration) {
        self.timeout = self.timeout.min(timeout);
    }
}

/// Descriptors reported ready by the host wait.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadySet {
    ready: Vec<(RawFd, Interest)>,
}

impl ReadySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record readiness for `fd`.
    pub fn insert(&mut self, fd: RawFd, interest: Interest) {
        match self.ready.iter_mut().find(|(f, _)| *f == fd) {
            Some((_, existing)) => *existing |= interest,
            None => self.ready.push((fd, interest)),
        }
    }

    /// Check if `fd` is ready for `interest`.
    pub fn is_ready(&self, fd: RawFd, interest: Interest) -> bool {
        self.ready
            .iter()
            .any(|(f, ready)| *f == fd && ready.contains(interest))
    }

    pub fn is_empty(&self) -> bool {
        self.ready.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (RawFd, Interest)> + '_ {
        self.ready.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_merges_interest() {
        let mut ctx = MainloopContext::new(Duration::from_secs(10));
        ctx.register(5, Interest::READABLE);
        ctx.register(5, Interest::WRITABLE);
        ctx.register(7, Interest::READABLE);

        assert_eq!(ctx.registrations().len(), 2);
        assert_eq!(ctx.registrations()[0], (5, Interest::READABLE | Interest::WRITABLE));
    }

    #[test]
    fn test_shrink_timeout_only_lowers() {
        let mut ctx = MainloopContext::new(Duration::from_millis(100));
        ctx.shrink_timeout(Duration::from_millis(500));
        assert_eq!(ctx.timeout, Duration::from_millis(100));
        ctx.shrink_timeout(Duration::from_millis(20));
        assert_eq!(ctx.timeout, Duration::from_millis(20));
    }

    #[test]
    fn test_ready_set_lookup() {
        let mut ready = ReadySet::new();
        assert!(ready.is_empty());
        ready.insert(3, Interest::READABLE);

        assert!(ready.is_ready(3, Interest::READABLE));
        assert!(!ready.is_ready(3, Interest::WRITABLE));
        assert!(!ready.is_ready(4, Interest::READABLE));
        assert_eq!(ready.iter().count(), 1);
    }

    #[test]
    fn test_empty_interest_never_contained() {
        assert!(!Interest::READABLE.contains(Interest::default()));
        assert!(Interest::default().is_empty());
    }
}
