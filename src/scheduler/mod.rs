//! Periodic task scheduling.
//!
//! Hosts refresh things like sidebars on a fixed interval. A tick runs to
//! completion before the next one starts; ticks missed while a slow tick was
//! running are skipped.

use std::time::Duration;

use futures::future::BoxFuture;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

/// A task run on every tick.
pub type PeriodicTask = Box<dyn FnMut() -> BoxFuture<'static, ()> + Send>;

/// Something that can run a task periodically.
pub trait Scheduler {
    /// Run `task` every `interval`, starting immediately.
    fn schedule_periodic(&self, interval: Duration, task: PeriodicTask) -> CancelHandle;
}

/// [`Scheduler`] backed by the current tokio runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioScheduler;

impl TokioScheduler {
    pub fn new() -> Self {
        Self
    }
}

impl Scheduler for TokioScheduler {
    fn schedule_periodic(&self, interval: Duration, mut task: PeriodicTask) -> CancelHandle {
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                task().await;
            }
        });

        debug!("Scheduled periodic task every {:?}", interval);
        CancelHandle { handle }
    }
}

/// Stops a scheduled task. Dropping the handle does not cancel it.
#[derive(Debug)]
pub struct CancelHandle {
    handle: JoinHandle<()>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}
