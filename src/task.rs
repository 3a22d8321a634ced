//! Producer and consumer loops.
//!
//! Both loops run until their cancellation token fires. The token is raced
//! against every await point, so a task blocked on a full or empty queue, or
//! sleeping between sends, stops promptly.

use std::fmt;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::pacing::Pacer;
use crate::queue::BoundedQueue;
use crate::sink::{Event, EventSink};
use crate::source::ValueSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Producer,
    Consumer,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Producer => f.write_str("producer"),
            Role::Consumer => f.write_str("consumer"),
        }
    }
}

/// What a task did before it was cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskReport {
    pub role: Role,
    pub id: usize,
    pub processed: u64,
}

// =============================================================================
// Producer
// =============================================================================

pub struct Producer {
    id: usize,
    queue: Arc<BoundedQueue<u32>>,
    source: Box<dyn ValueSource>,
    pacer: Arc<dyn Pacer>,
    sink: Arc<dyn EventSink>,
}

impl Producer {
    pub fn new(
        id: usize,
        queue: Arc<BoundedQueue<u32>>,
        source: Box<dyn ValueSource>,
        pacer: Arc<dyn Pacer>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            id,
            queue,
            source,
            pacer,
            sink,
        }
    }

    pub async fn run(mut self, cancel: CancellationToken) -> TaskReport {
        debug!(producer = self.id, "started");
        let mut sent = 0;

        loop {
            let value = self.source.next_value();
            if self.queue.is_full() {
                trace!(producer = self.id, value, "queue full, waiting for space");
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = self.queue.put(value) => {}
            }
            self.sink.record(Event::Sent {
                producer: self.id,
                value,
            });
            sent += 1;

            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = self.pacer.pause() => {}
            }
        }

        debug!(producer = self.id, sent, "stopped");
        TaskReport {
            role: Role::Producer,
            id: self.id,
            processed: sent,
        }
    }
}

// =============================================================================
// Consumer
// =============================================================================

pub struct Consumer {
    id: usize,
    queue: Arc<BoundedQueue<u32>>,
    sink: Arc<dyn EventSink>,
}

impl Consumer {
    pub fn new(id: usize, queue: Arc<BoundedQueue<u32>>, sink: Arc<dyn EventSink>) -> Self {
        Self { id, queue, sink }
    }

    pub async fn run(self, cancel: CancellationToken) -> TaskReport {
        debug!(consumer = self.id, "started");
        let mut received = 0;

        loop {
            let value = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                value = self.queue.get() => value,
            };
            self.sink.record(Event::Received {
                consumer: self.id,
                value,
            });
            received += 1;
        }

        debug!(consumer = self.id, received, "stopped");
        TaskReport {
            role: Role::Consumer,
            id: self.id,
            processed: received,
        }
    }
}
