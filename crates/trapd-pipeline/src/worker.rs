//! The fixed-size worker pool draining the [`TrapQueue`].
//!
//! Each worker loops `wait on queue -> process -> emit` until the queue is
//! closed and empty or the cancellation token fires. A failure while
//! handling one trap, including a panic in processing or in the sink, is
//! logged and counted; the worker then goes back to the queue.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures::FutureExt;
use serde::Serialize;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use trapd_mib::OidResolver;
use trapd_types::{ProcessedTrap, TrapEvent};

use crate::config::PipelineConfig;
use crate::error::PipelineResult;
use crate::processor::TrapProcessor;
use crate::queue::TrapQueue;
use crate::sink::RecordSink;

/// Counters shared by all workers of a pool.
#[derive(Debug, Default)]
struct PoolCounters {
    processed: AtomicU64,
    skipped: AtomicU64,
    failed: AtomicU64,
}

/// Point-in-time copy of the pool counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PoolStats {
    /// Records emitted.
    pub processed: u64,
    /// Events discarded because they carried no PDU.
    pub skipped: u64,
    /// Events whose processing panicked, or whose record the sink rejected
    /// or panicked on.
    pub failed: u64,
}

impl PoolStats {
    pub fn total(&self) -> u64 {
        self.processed + self.skipped + self.failed
    }
}

struct Worker {
    name: String,
    queue: TrapQueue,
    processor: TrapProcessor,
    sink: Arc<dyn RecordSink>,
    counters: Arc<PoolCounters>,
    cancel: CancellationToken,
    drain_on_shutdown: bool,
}

impl Worker {
    async fn run(self) {
        debug!(worker = %self.name, "worker started");
        loop {
            let event = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    if self.drain_on_shutdown {
                        let mut drained = 0usize;
                        while let Some(event) = self.queue.try_dequeue() {
                            self.handle(event).await;
                            drained += 1;
                        }
                        debug!(worker = %self.name, drained, "drained queue on shutdown");
                    }
                    break;
                }
                next = self.queue.dequeue() => match next {
                    Some(event) => event,
                    None => break,
                },
            };
            self.handle(event).await;
        }
        debug!(worker = %self.name, "worker stopped");
    }

    async fn handle(&self, event: TrapEvent) {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.processor.process(&event)));
        let record = match outcome {
            Ok(Some(record)) => record,
            Ok(None) => {
                debug!(worker = %self.name, event_id = %event.id, "trap has no PDU; skipped");
                self.counters.skipped.fetch_add(1, Ordering::Relaxed);
                return;
            }
            Err(payload) => {
                error!(
                    worker = %self.name,
                    event_id = %event.id,
                    panic = %panic_message(payload.as_ref()),
                    "trap processing panicked"
                );
                self.counters.failed.fetch_add(1, Ordering::Relaxed);
                return;
            }
        };

        let trap = ProcessedTrap::new(event.id, self.name.as_str(), event.source, record);
        match AssertUnwindSafe(self.sink.emit(&trap)).catch_unwind().await {
            Ok(Ok(())) => {
                self.counters.processed.fetch_add(1, Ordering::Relaxed);
            }
            Ok(Err(e)) => {
                warn!(worker = %self.name, event_id = %event.id, error = %e, "failed to emit trap record");
                self.counters.failed.fetch_add(1, Ordering::Relaxed);
            }
            Err(payload) => {
                error!(
                    worker = %self.name,
                    event_id = %event.id,
                    panic = %panic_message(payload.as_ref()),
                    "record sink panicked"
                );
                self.counters.failed.fetch_add(1, Ordering::Relaxed);
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// A running set of workers.
pub struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
    counters: Arc<PoolCounters>,
    cancel: CancellationToken,
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("workers", &self.handles.len())
            .field("stats", &self.stats())
            .finish()
    }
}

impl WorkerPool {
    /// Spawn `config.workers` workers named `worker-0`, `worker-1`, ...
    /// on the current tokio runtime.
    pub fn start(
        config: &PipelineConfig,
        queue: TrapQueue,
        resolver: OidResolver,
        sink: Arc<dyn RecordSink>,
        cancel: CancellationToken,
    ) -> PipelineResult<Self> {
        config.validate()?;

        let processor = TrapProcessor::new(resolver);
        let counters = Arc::new(PoolCounters::default());
        let handles = (0..config.workers)
            .map(|i| {
                let worker = Worker {
                    name: format!("worker-{i}"),
                    queue: queue.clone(),
                    processor: processor.clone(),
                    sink: Arc::clone(&sink),
                    counters: Arc::clone(&counters),
                    cancel: cancel.clone(),
                    drain_on_shutdown: config.drain_on_shutdown,
                };
                tokio::spawn(worker.run())
            })
            .collect();

        info!(
            workers = config.workers,
            capacity = ?queue.capacity(),
            drain_on_shutdown = config.drain_on_shutdown,
            "worker pool started"
        );
        Ok(Self {
            handles,
            counters,
            cancel,
        })
    }

    pub fn worker_count(&self) -> usize {
        self.handles.len()
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            processed: self.counters.processed.load(Ordering::Relaxed),
            skipped: self.counters.skipped.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
        }
    }

    /// Wait for every worker to exit. Workers exit when the queue is closed
    /// and empty, or when the pool's cancellation token fires.
    pub async fn join(self) -> PoolStats {
        for handle in self.handles {
            if let Err(e) = handle.await {
                error!(error = %e, "worker task failed");
            }
        }
        let stats = PoolStats {
            processed: self.counters.processed.load(Ordering::Relaxed),
            skipped: self.counters.skipped.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
        };
        info!(
            processed = stats.processed,
            skipped = stats.skipped,
            failed = stats.failed,
            "worker pool stopped"
        );
        stats
    }

    /// Cancel the pool and wait for it.
    pub async fn shutdown(self) -> PoolStats {
        self.cancel.cancel();
        self.join().await
    }
}
