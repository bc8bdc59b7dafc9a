//! Two-phase dispatch scheduling
//!
//! Phase one always happens: the dispatch runs in its own spawned task, so it
//! can never start before the caller's current synchronous burst of
//! `enqueue` calls is over. Phase two is picked from the configuration:
//! yield one scheduler tick, or sleep until a fixed deadline.

use crate::config::BatcherConfig;
use std::time::Duration;
use tokio::time::Instant;

/// How long a fresh batch stays open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchSchedule {
    /// Dispatch on the next scheduler tick
    NextTick,
    /// Dispatch once the window, measured from batch creation, has elapsed
    Window(Duration),
}

impl DispatchSchedule {
    pub fn from_config(config: &BatcherConfig) -> Self {
        match config.delay_window_ms {
            0 => Self::NextTick,
            _ => Self::Window(config.delay_window()),
        }
    }

    /// Arm the schedule for a batch created now
    pub(crate) fn arm(self) -> DispatchTrigger {
        match self {
            Self::NextTick => DispatchTrigger::NextTick,
            Self::Window(window) => DispatchTrigger::At(Instant::now() + window),
        }
    }
}

/// One-shot trigger owned by a single batch's dispatch task
#[derive(Debug, Clone, Copy)]
pub(crate) enum DispatchTrigger {
    NextTick,
    At(Instant),
}

impl DispatchTrigger {
    /// Wait until the batch should be dispatched
    pub(crate) async fn fire(self) {
        match self {
            Self::NextTick => tokio::task::yield_now().await,
            Self::At(deadline) => tokio::time::sleep_until(deadline).await,
        }
    }
}
