use core::time::Duration;
use std::sync::{Arc, Mutex};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::time::Instant;

/// Caps in-flight API requests and lets any task pause dispatch for everyone.
///
/// Call [`Throttler::acquire`] before each request and hold the permit until the
/// response has been consumed. When a task learns that the API quota is exhausted it
/// calls [`Throttler::pause_for`]; new acquisitions then wait until the pause expires.
/// Overlapping pauses keep whichever one ends last.
#[derive(Debug)]
pub struct Throttler {
    semaphore: Arc<Semaphore>,
    paused_until: Mutex<Option<Instant>>,
}

impl Throttler {
    /// Create a throttler allowing at most `max_concurrent` requests at once.
    pub fn new(max_concurrent: usize) -> Arc<Self> {
        Arc::new(Self {
            semaphore: Arc::new(Semaphore::new(max_concurrent.max(1))),
            paused_until: Mutex::new(None),
        })
    }

    /// Wait out any active pause, then take a concurrency slot.
    pub async fn acquire(&self) -> OwnedSemaphorePermit {
        loop {
            match self.pause_deadline() {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => {
                    return Arc::clone(&self.semaphore)
                        .acquire_owned()
                        .await
                        .expect("semaphore is never closed");
                }
            }
        }
    }

    /// Whether a pause is currently in effect.
    pub fn is_paused(&self) -> bool {
        self.pause_deadline().is_some()
    }

    /// Pause dispatch for `duration`.
    ///
    /// Returns `true` when this call extended the pause, `false` when an existing
    /// pause already lasts at least as long.
    pub fn pause_for(&self, duration: Duration) -> bool {
        let until = Instant::now() + duration;
        let mut guard = self.paused_until.lock().expect("lock not poisoned");

        if guard.is_some_and(|existing| existing >= until) {
            return false;
        }

        *guard = Some(until);
        true
    }

    fn pause_deadline(&self) -> Option<Instant> {
        let mut guard = self.paused_until.lock().expect("lock not poisoned");
        match *guard {
            Some(until) if until > Instant::now() => Some(until),
            Some(_) => {
                *guard = None;
                None
            }
            None => None,
        }
    }
}
