use std::net::SocketAddr;
use std::sync::Arc;

use serde::Serialize;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use trapd_mib::{MibLoader, MibSymbolIndex, OidResolver};
use trapd_pipeline::{JsonLinesSink, LogSink, PoolStats, RecordSink, TrapQueue, WorkerPool};

use crate::config::{DaemonConfig, OutputFormat};
use crate::error::{ReceiverError, ReceiverResult};
use crate::receiver::{ReceiverStats, TrapReceiver};

/// Final counters of a daemon run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DaemonReport {
    pub receiver: ReceiverStats,
    pub pool: PoolStats,
}

/// A running receiver plus worker pool.
///
/// Shutdown order: cancel the receiver, which closes the queue; then wait
/// for the workers. With `drain_on_shutdown` the workers finish every
/// event already queued; without it they stop at the next dequeue.
pub struct TrapDaemon {
    local_addr: SocketAddr,
    queue: TrapQueue,
    receiver: JoinHandle<ReceiverStats>,
    pool: WorkerPool,
    cancel: CancellationToken,
}

impl TrapDaemon {
    /// Load the MIB, bind the socket and start the workers. Any error here
    /// is a fatal startup failure.
    pub async fn start(config: DaemonConfig, cancel: CancellationToken) -> ReceiverResult<Self> {
        let mib = MibLoader::load(&config.mib_path)?;
        let index = MibSymbolIndex::build(&mib);
        info!(
            module = %mib.module,
            symbols = mib.symbols.len(),
            indexed = index.len(),
            "MIB symbol index ready"
        );
        let resolver = OidResolver::new(Arc::new(index));
        let sink: Arc<dyn RecordSink> = match config.output {
            OutputFormat::Log => Arc::new(LogSink),
            OutputFormat::Json => Arc::new(JsonLinesSink::stdout()),
        };
        Self::start_with(config, resolver, sink, cancel).await
    }

    /// Start with an already-built resolver and sink.
    pub async fn start_with(
        config: DaemonConfig,
        resolver: OidResolver,
        sink: Arc<dyn RecordSink>,
        cancel: CancellationToken,
    ) -> ReceiverResult<Self> {
        config.validate()?;

        let queue = TrapQueue::new(config.pipeline.queue_capacity);
        let receiver = TrapReceiver::bind(config.receiver.clone(), queue.clone(), cancel.clone()).await?;
        let local_addr = receiver.local_addr();

        // Draining workers are stopped by the queue closing, not by the token.
        let pool_cancel = if config.pipeline.drain_on_shutdown {
            CancellationToken::new()
        } else {
            cancel.clone()
        };
        let pool = WorkerPool::start(&config.pipeline, queue.clone(), resolver, sink, pool_cancel)?;
        let receiver = tokio::spawn(receiver.run());

        Ok(Self {
            local_addr,
            queue,
            receiver,
            pool,
            cancel,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn stats(&self) -> PoolStats {
        self.pool.stats()
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Stop receiving and wait for the workers.
    pub async fn shutdown(self) -> ReceiverResult<DaemonReport> {
        self.cancel.cancel();
        let receiver = self.receiver.await;
        // The receiver closes the queue on exit; close again in case it panicked.
        self.queue.close();
        let pool = self.pool.join().await;
        let receiver = receiver.map_err(|e| {
            error!(error = %e, "receiver task failed");
            ReceiverError::Internal(format!("receiver task failed: {e}"))
        })?;
        Ok(DaemonReport { receiver, pool })
    }

    /// Run until Ctrl-C or until the cancellation token fires elsewhere.
    pub async fn run_until_shutdown(self) -> ReceiverResult<DaemonReport> {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                signal?;
                info!("interrupt received; shutting down");
            }
            _ = self.cancel.cancelled() => {}
        }
        self.shutdown().await
    }
}
