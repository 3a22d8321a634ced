//! Producer pause between two sends.

use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};

pub const DEFAULT_PRODUCER_DELAY: Duration = Duration::from_secs(2);

pub trait Pacer: Send + Sync {
    fn pause(&self) -> BoxFuture<'_, ()>;
}

/// Sleeps on the tokio timer, so paused test clocks control it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedDelay(pub Duration);

impl Default for FixedDelay {
    fn default() -> Self {
        Self(DEFAULT_PRODUCER_DELAY)
    }
}

impl Pacer for FixedDelay {
    fn pause(&self) -> BoxFuture<'_, ()> {
        tokio::time::sleep(self.0).boxed()
    }
}

/// Only yields back to the scheduler.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

impl Pacer for NoDelay {
    fn pause(&self) -> BoxFuture<'_, ()> {
        tokio::task::yield_now().boxed()
    }
}
