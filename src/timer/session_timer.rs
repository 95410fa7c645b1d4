use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::scheduler::{TickHandle, TickScheduler};

/// Monotonic elapsed-seconds counter for an active session.
///
/// Ticks once per interval while active; paused in lock-step with the
/// recorder by the controller. The timer itself knows nothing about the
/// recorder. Cancelling drops the tick source; leaking one is a defect.
pub struct SessionTimer {
    elapsed: Arc<AtomicU64>,
    active: Arc<AtomicBool>,
    handle: Option<TickHandle>,
}

impl SessionTimer {
    pub fn new() -> Self {
        Self {
            elapsed: Arc::new(AtomicU64::new(0)),
            active: Arc::new(AtomicBool::new(false)),
            handle: None,
        }
    }

    /// Start counting. Schedules the tick source; restarting an already
    /// running timer keeps the existing source and counter.
    pub fn start(&mut self, scheduler: &dyn TickScheduler, interval: Duration) {
        if self.handle.is_some() {
            return;
        }

        let elapsed = Arc::clone(&self.elapsed);
        let active = Arc::clone(&self.active);
        self.active.store(true, Ordering::SeqCst);

        self.handle = Some(scheduler.schedule(
            interval,
            Box::new(move || {
                if active.load(Ordering::SeqCst) {
                    elapsed.fetch_add(1, Ordering::SeqCst);
                }
            }),
        ));
    }

    /// Suspend counting without releasing the tick source.
    pub fn pause(&mut self) {
        self.active.store(false, Ordering::SeqCst);
    }

    /// Resume counting after a pause.
    pub fn resume(&mut self) {
        if self.handle.is_some() {
            self.active.store(true, Ordering::SeqCst);
        }
    }

    /// Zero the counter without touching the tick source.
    pub fn reset(&mut self) {
        self.elapsed.store(0, Ordering::SeqCst);
    }

    /// Cancel the underlying tick source. Safe to call repeatedly.
    pub fn cancel(&mut self) {
        self.active.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            handle.cancel();
        }
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed.load(Ordering::SeqCst)
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some() && self.active.load(Ordering::SeqCst)
    }
}

impl Default for SessionTimer {
    fn default() -> Self {
        Self::new()
    }
}
