//! Wires one bounded queue to N producers and M consumers and owns their
//! lifetime: tasks live in a `JoinSet` and share one cancellation token, so
//! shutting down is a cancel followed by a join of every task.

use std::future::Future;
use std::sync::Arc;

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, info_span, Instrument};

use crate::config::Config;
use crate::error::RunError;
use crate::pacing::{FixedDelay, Pacer};
use crate::queue::BoundedQueue;
use crate::sink::{ConsoleSink, EventSink};
use crate::source::{RandomSource, ValueSource};
use crate::task::{Consumer, Producer, Role, TaskReport};

// =============================================================================
// Run modes
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Single,
    Multi { producers: usize, consumers: usize },
}

impl Mode {
    pub fn multi(producers: usize, consumers: usize) -> Result<Self, RunError> {
        let mode = Mode::Multi {
            producers,
            consumers,
        };
        mode.validate()?;
        Ok(mode)
    }

    pub fn producers(&self) -> usize {
        match *self {
            Mode::Single => 1,
            Mode::Multi { producers, .. } => producers,
        }
    }

    pub fn consumers(&self) -> usize {
        match *self {
            Mode::Single => 1,
            Mode::Multi { consumers, .. } => consumers,
        }
    }

    fn validate(&self) -> Result<(), RunError> {
        if self.producers() == 0 || self.consumers() == 0 {
            return Err(RunError::InvalidMode {
                producers: self.producers(),
                consumers: self.consumers(),
            });
        }
        Ok(())
    }
}

// =============================================================================
// Summary
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub sent: u64,
    pub received: u64,
    /// Items still queued at shutdown, in queue order.
    pub undelivered: Vec<u32>,
    pub tasks: Vec<TaskReport>,
}

impl RunSummary {
    fn from_reports(mut tasks: Vec<TaskReport>, undelivered: Vec<u32>) -> Self {
        tasks.sort_by_key(|report| (report.role == Role::Consumer, report.id));
        let total = |role: Role| -> u64 {
            tasks
                .iter()
                .filter(|report| report.role == role)
                .map(|report| report.processed)
                .sum()
        };

        Self {
            sent: total(Role::Producer),
            received: total(Role::Consumer),
            undelivered,
            tasks,
        }
    }
}

// =============================================================================
// Orchestrator
// =============================================================================

pub type SourceFactory = Arc<dyn Fn(usize) -> Box<dyn ValueSource> + Send + Sync>;

pub struct Orchestrator {
    mode: Mode,
    capacity: usize,
    sources: SourceFactory,
    pacer: Arc<dyn Pacer>,
    sink: Arc<dyn EventSink>,
}

impl Orchestrator {
    /// Demo defaults: capacity 50, random values in 1..=100, 2 s producer
    /// pause, colored console output.
    pub fn new(mode: Mode) -> Self {
        Self::from_config(mode, &Config::default())
    }

    pub fn from_config(mode: Mode, config: &Config) -> Self {
        let range = config.value_range();
        let seed = config.seed;
        let sources: SourceFactory = Arc::new(move |id: usize| -> Box<dyn ValueSource> {
            match seed {
                Some(seed) => Box::new(RandomSource::seeded(
                    seed.wrapping_add(id as u64),
                    range.clone(),
                )),
                None => Box::new(RandomSource::new(range.clone())),
            }
        });

        Self {
            mode,
            capacity: config.capacity,
            sources,
            pacer: Arc::new(FixedDelay(config.producer_delay())),
            sink: Arc::new(ConsoleSink::new(config.color)),
        }
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// `factory` is called once per producer with the producer's index.
    pub fn with_sources<F>(mut self, factory: F) -> Self
    where
        F: Fn(usize) -> Box<dyn ValueSource> + Send + Sync + 'static,
    {
        self.sources = Arc::new(factory);
        self
    }

    pub fn with_pacer(mut self, pacer: impl Pacer + 'static) -> Self {
        self.pacer = Arc::new(pacer);
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Runs every task until `shutdown` resolves, then cancels and joins them.
    ///
    /// A panicking task ends the whole run with [`RunError::TaskFailed`].
    pub async fn run<F>(self, shutdown: F) -> Result<RunSummary, RunError>
    where
        F: Future<Output = ()>,
    {
        self.mode.validate()?;
        let queue = Arc::new(BoundedQueue::new(self.capacity)?);
        let cancel = CancellationToken::new();
        let mut tasks = JoinSet::new();

        for id in 0..self.mode.producers() {
            let producer = Producer::new(
                id,
                Arc::clone(&queue),
                (self.sources)(id),
                Arc::clone(&self.pacer),
                Arc::clone(&self.sink),
            );
            tasks.spawn(
                producer
                    .run(cancel.child_token())
                    .instrument(info_span!("producer", id)),
            );
        }
        for id in 0..self.mode.consumers() {
            let consumer = Consumer::new(id, Arc::clone(&queue), Arc::clone(&self.sink));
            tasks.spawn(
                consumer
                    .run(cancel.child_token())
                    .instrument(info_span!("consumer", id)),
            );
        }
        info!(
            producers = self.mode.producers(),
            consumers = self.mode.consumers(),
            capacity = queue.capacity(),
            "run started"
        );

        let mut reports = Vec::with_capacity(tasks.len());
        let mut failure = None;

        // Tasks only return once cancelled, so anything joining early has panicked.
        tokio::select! {
            _ = shutdown => info!("shutdown requested"),
            Some(joined) = tasks.join_next() => match joined {
                Ok(report) => reports.push(report),
                Err(err) => {
                    error!(%err, "task failed, stopping run");
                    failure = Some(err.to_string());
                }
            },
        }

        cancel.cancel();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(report) => reports.push(report),
                Err(err) => {
                    error!(%err, "task failed during shutdown");
                    failure.get_or_insert_with(|| err.to_string());
                }
            }
        }

        if let Some(reason) = failure {
            return Err(RunError::TaskFailed(reason));
        }

        let mut undelivered = Vec::with_capacity(queue.len());
        while let Ok(value) = queue.try_get() {
            undelivered.push(value);
        }

        let summary = RunSummary::from_reports(reports, undelivered);
        info!(
            sent = summary.sent,
            received = summary.received,
            undelivered = summary.undelivered.len(),
            "run stopped"
        );
        Ok(summary)
    }
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new(Mode::Single)
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("mode", &self.mode)
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pacing::NoDelay;
    use crate::sink::{Event, MemorySink};
    use crate::source::SequenceSource;
    use std::collections::HashMap;
    use std::time::Duration;
    use tokio::time::sleep;

    fn bag(values: impl IntoIterator<Item = u32>) -> HashMap<u32, usize> {
        let mut counts = HashMap::new();
        for value in values {
            *counts.entry(value).or_insert(0) += 1;
        }
        counts
    }

    #[test]
    fn test_mode_counts() {
        assert_eq!(Mode::Single.producers(), 1);
        assert_eq!(Mode::Single.consumers(), 1);
        let mode = Mode::multi(3, 2).unwrap();
        assert_eq!((mode.producers(), mode.consumers()), (3, 2));
    }

    #[test]
    fn test_mode_rejects_zero_counts() {
        assert_eq!(
            Mode::multi(0, 2),
            Err(RunError::InvalidMode {
                producers: 0,
                consumers: 2
            })
        );
        assert!(Mode::multi(1, 0).is_err());
    }

    #[tokio::test]
    async fn test_run_rejects_invalid_setup_before_spawning() {
        let sink = Arc::new(MemorySink::new());
        let mode = Mode::Multi {
            producers: 0,
            consumers: 1,
        };
        let result = Orchestrator::new(mode)
            .with_sink(sink.clone())
            .run(async {})
            .await;
        assert!(matches!(result, Err(RunError::InvalidMode { .. })));

        let result = Orchestrator::new(Mode::Single)
            .with_capacity(0)
            .with_sink(sink.clone())
            .run(async {})
            .await;
        assert!(matches!(result, Err(RunError::Queue(_))));
        assert!(sink.events().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_scenario_first_value_received_before_next_send() {
        let sink = Arc::new(MemorySink::new());
        let summary = Orchestrator::new(Mode::Single)
            .with_sources(|_| Box::new(SequenceSource::new(vec![37, 12, 90])))
            .with_sink(sink.clone())
            .run(sleep(Duration::from_secs(5)))
            .await
            .unwrap();

        let events = sink.events();
        let first_received = events
            .iter()
            .position(|e| matches!(e, Event::Received { .. }))
            .unwrap();
        let second_sent = events
            .iter()
            .enumerate()
            .filter(|(_, e)| matches!(e, Event::Sent { .. }))
            .nth(1)
            .map(|(i, _)| i)
            .unwrap();

        assert_eq!(events[first_received].value(), 37);
        assert!(first_received < second_sent);
        // Sends at t=0, 2 and 4 before the 5 s cut-off.
        assert_eq!(sink.sent(), vec![37, 12, 90]);
        assert_eq!(sink.received(), vec![37, 12, 90]);
        assert_eq!(summary.sent, 3);
        assert_eq!(summary.received, 3);
        assert!(summary.undelivered.is_empty());
    }

    #[tokio::test]
    async fn test_single_pair_preserves_order() {
        let sink = Arc::new(MemorySink::new());
        let values: Vec<u32> = (1..=100).collect();
        let sequence = values.clone();
        let summary = Orchestrator::new(Mode::Single)
            .with_capacity(4)
            .with_sources(move |_| Box::new(SequenceSource::new(sequence.clone())))
            .with_pacer(NoDelay)
            .with_sink(sink.clone())
            .run(sleep(Duration::from_millis(50)))
            .await
            .unwrap();

        let sent = sink.sent();
        let mut delivered = sink.received();
        delivered.extend(summary.undelivered.iter().copied());
        assert_eq!(delivered, sent);
        assert!(!sent.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_multi_run_loses_and_duplicates_nothing() {
        let sink = Arc::new(MemorySink::new());
        let summary = Orchestrator::new(Mode::multi(4, 3).unwrap())
            .with_capacity(5)
            .with_sources(|id| {
                let base = id as u32 * 1_000;
                Box::new(SequenceSource::new((base..base + 500).collect::<Vec<_>>()))
            })
            .with_pacer(NoDelay)
            .with_sink(sink.clone())
            .run(sleep(Duration::from_millis(100)))
            .await
            .unwrap();

        let sent = sink.sent();
        let mut delivered = sink.received();
        delivered.extend(summary.undelivered.iter().copied());

        assert_eq!(bag(sent.clone()), bag(delivered));
        assert_eq!(summary.sent as usize, sent.len());
        assert_eq!(summary.received as usize, sink.received().len());
        assert!(summary.undelivered.len() <= 5);
        assert_eq!(summary.tasks.len(), 7);
        assert_eq!(summary.tasks[0].role, Role::Producer);
        assert_eq!(summary.tasks[6].role, Role::Consumer);
    }

    struct PanickingSource;

    impl ValueSource for PanickingSource {
        fn next_value(&mut self) -> u32 {
            panic!("source exploded");
        }
    }

    #[tokio::test]
    async fn test_task_panic_fails_the_run() {
        let result = Orchestrator::new(Mode::Single)
            .with_sources(|_| Box::new(PanickingSource))
            .with_sink(Arc::new(MemorySink::new()))
            .run(std::future::pending())
            .await;

        assert!(matches!(result, Err(RunError::TaskFailed(_))));
    }
}
