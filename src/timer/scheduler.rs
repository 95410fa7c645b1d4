use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Callback invoked once per scheduled interval.
pub type TickCallback = Box<dyn FnMut() + Send>;

/// Periodic callback capability (`scheduleTick` in the host contract).
pub trait TickScheduler: Send + Sync {
    /// Schedule `callback` to fire every `interval`. The tick source runs
    /// until the returned handle is cancelled or dropped.
    fn schedule(&self, interval: Duration, callback: TickCallback) -> TickHandle;
}

/// Cancellation handle for a scheduled tick source.
///
/// Dropping the handle cancels the source; holding one past the owning
/// session's teardown is a defect.
pub struct TickHandle {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl TickHandle {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Cancel the tick source explicitly.
    pub fn cancel(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for TickHandle {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

/// Wall-clock scheduler backed by a tokio interval task.
pub struct TokioTickScheduler;

impl TickScheduler for TokioTickScheduler {
    fn schedule(&self, interval: Duration, mut callback: TickCallback) -> TickHandle {
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            // The first tick of a tokio interval completes immediately;
            // consume it so callbacks only fire after a full interval.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                callback();
            }
        });

        TickHandle::new(move || task.abort())
    }
}

/// Deterministic scheduler: callbacks fire only when the caller advances it.
///
/// Used by tests and by hosts that drive ticking from their own frame loop.
/// Callbacks must not call back into the scheduler.
#[derive(Clone, Default)]
pub struct ManualTickScheduler {
    slots: Arc<Mutex<HashMap<u64, TickCallback>>>,
    next_id: Arc<AtomicU64>,
}

impl ManualTickScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire every registered callback once per tick, `ticks` times.
    pub fn advance(&self, ticks: usize) {
        for _ in 0..ticks {
            let mut slots = self.slots.lock().unwrap();
            for callback in slots.values_mut() {
                callback();
            }
        }
    }

    /// Number of live tick sources. Zero after every session reaches a
    /// terminal state, or something leaked a handle.
    pub fn active_count(&self) -> usize {
        self.slots.lock().unwrap().len()
    }
}

impl TickScheduler for ManualTickScheduler {
    fn schedule(&self, _interval: Duration, callback: TickCallback) -> TickHandle {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.slots.lock().unwrap().insert(id, callback);

        let slots = Arc::clone(&self.slots);
        TickHandle::new(move || {
            slots.lock().unwrap().remove(&id);
        })
    }
}
