//! Deferral of turn advancement while a blocking choice is pending.

/// Holds back at most one advance request until released.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AdvanceLock {
    held: bool,
    pending: bool,
}

impl AdvanceLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the lock was already held.
    pub fn acquire(&mut self) -> bool {
        !std::mem::replace(&mut self.held, true)
    }

    pub fn is_held(&self) -> bool {
        self.held
    }

    pub fn has_pending(&self) -> bool {
        self.pending
    }

    /// Record an advance request. Returns true if the request was deferred.
    ///
    /// Repeated requests while held collapse into one.
    pub fn defer(&mut self) -> bool {
        if self.held {
            self.pending = true;
        }
        self.held
    }

    /// Drop the lock. Returns whether a deferred advance must be flushed.
    pub fn release(&mut self) -> bool {
        self.held = false;
        std::mem::take(&mut self.pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requests_pass_through_when_unlocked() {
        let mut lock = AdvanceLock::new();
        assert!(!lock.defer());
        assert!(!lock.has_pending());
    }

    #[test]
    fn at_most_one_request_is_deferred() {
        let mut lock = AdvanceLock::new();
        assert!(lock.acquire());
        assert!(!lock.acquire());
        assert!(lock.defer());
        assert!(lock.defer());
        assert!(lock.release());
        assert!(!lock.is_held());
        assert!(!lock.release());
    }
}
