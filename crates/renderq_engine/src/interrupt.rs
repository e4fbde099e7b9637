use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use renderq_core::StopReason;

/// Pending operator control action plus the interruptible sleep that
/// observes it.
///
/// Cloning shares the same pending slot; the signal dispatcher raises and
/// the orchestrator's wait loops consume.
#[derive(Clone, Default)]
pub struct Interrupt {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    pending: Mutex<Option<StopReason>>,
    wake: Condvar,
}

impl Interrupt {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a control action and wakes any sleeper. A pending abort is
    /// kept over a later skip.
    pub fn raise(&self, reason: StopReason) {
        let mut pending = self.lock();
        let next = match pending.take() {
            Some(previous) => previous.merge(reason),
            None => reason,
        };
        *pending = Some(next);
        self.inner.wake.notify_all();
    }

    pub fn pending(&self) -> Option<StopReason> {
        self.lock().clone()
    }

    pub fn take(&self) -> Option<StopReason> {
        self.lock().take()
    }

    /// Returns immediately with the pending action, if any.
    pub fn check(&self) -> Result<(), StopReason> {
        match self.take() {
            Some(reason) => Err(reason),
            None => Ok(()),
        }
    }

    /// Sleeps for `duration` unless a control action arrives first.
    pub fn sleep(&self, duration: Duration) -> Result<(), StopReason> {
        let deadline = Instant::now() + duration;
        let mut pending = self.lock();
        loop {
            if let Some(reason) = pending.take() {
                return Err(reason);
            }
            let now = Instant::now();
            if now >= deadline {
                return Ok(());
            }
            pending = self
                .inner
                .wake
                .wait_timeout(pending, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }

    /// Drops a pending skip, leaving an abort in place.
    pub fn discard_skip(&self) -> Option<StopReason> {
        let mut pending = self.lock();
        match pending.as_ref() {
            Some(StopReason::Skip { .. }) => pending.take(),
            _ => None,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<StopReason>> {
        self.inner
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
