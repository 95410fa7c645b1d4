//! Timing primitives
//!
//! Ticking is an injectable capability so the state machines stay
//! deterministically testable without wall-clock waits: the recorder and
//! timer schedule callbacks through a `TickScheduler` and hold the returned
//! handle, which cancels the tick source on drop.

mod scheduler;
mod session_timer;

pub use scheduler::{ManualTickScheduler, TickCallback, TickHandle, TickScheduler, TokioTickScheduler};
pub use session_timer::SessionTimer;
