//! The trap-processing pipeline for trapd.
//!
//! The receiver pushes decoded [`TrapEvent`](trapd_types::TrapEvent)s onto a
//! [`TrapQueue`]; a [`WorkerPool`] of competing consumers drains it, turns
//! each event into a [`TrapRecord`](trapd_types::TrapRecord) with the
//! [`TrapProcessor`], and hands the result to a [`RecordSink`].
//!
//! Records are emitted in whatever order workers finish, which need not be
//! the order traps arrived in.

pub mod config;
pub mod error;
pub mod processor;
pub mod queue;
pub mod sink;
pub mod worker;

pub use config::{PipelineConfig, DEFAULT_QUEUE_CAPACITY, DEFAULT_WORKERS};
pub use error::{PipelineError, PipelineResult, QueueError};
pub use processor::TrapProcessor;
pub use queue::TrapQueue;
pub use sink::{ChannelSink, JsonLinesSink, LogSink, RecordSink};
pub use worker::{PoolStats, WorkerPool};
