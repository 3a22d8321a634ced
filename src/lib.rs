//! Producer-consumer demo over a bounded async queue.
//!
//! One [`BoundedQueue`] is shared by any number of producer and consumer
//! tasks. Producers push random values and pause between sends, consumers
//! drain as fast as values arrive. The [`Orchestrator`] owns every task and
//! stops them with a cancel + join handshake.
//!
//! ```no_run
//! use producer_consumer::{Mode, Orchestrator};
//!
//! # async fn demo() -> Result<(), producer_consumer::RunError> {
//! let summary = Orchestrator::new(Mode::multi(3, 2)?)
//!     .run(async {
//!         let _ = tokio::signal::ctrl_c().await;
//!     })
//!     .await?;
//! println!("sent {} values", summary.sent);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod orchestrator;
pub mod pacing;
pub mod queue;
pub mod sink;
pub mod source;
pub mod task;

pub use config::Config;
pub use error::{AppError, ConfigError, QueueError, RunError, UsageError};
pub use orchestrator::{Mode, Orchestrator, RunSummary};
pub use queue::BoundedQueue;
