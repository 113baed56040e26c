use async_trait::async_trait;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::{mpsc, Mutex};
use tracing::info;
use trapd_types::ProcessedTrap;

use crate::error::{PipelineError, PipelineResult};

/// Destination for completed trap records.
///
/// Called concurrently by every worker; implementations must not assume
/// records arrive in receive order.
#[async_trait]
pub trait RecordSink: Send + Sync {
    async fn emit(&self, trap: &ProcessedTrap) -> PipelineResult<()>;
}

/// Writes each record to the `tracing` log at `info`, pretty-printed.
pub struct LogSink;

#[async_trait]
impl RecordSink for LogSink {
    async fn emit(&self, trap: &ProcessedTrap) -> PipelineResult<()> {
        let body = serde_json::to_string_pretty(&trap.record)?;
        info!(
            worker = %trap.worker,
            event_id = %trap.event_id,
            at = %trap.timestamp(),
            "[{}] Thread [{}] Processed Trap: {}",
            trap.timestamp(),
            trap.worker,
            body
        );
        Ok(())
    }
}

/// Writes one JSON object per line: the record's fields plus processing
/// metadata under `_meta`.
pub struct JsonLinesSink<W = tokio::io::Stdout> {
    writer: Mutex<W>,
}

impl JsonLinesSink {
    pub fn stdout() -> Self {
        Self::new(tokio::io::stdout())
    }
}

impl<W> JsonLinesSink<W>
where
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }

    fn render(trap: &ProcessedTrap) -> PipelineResult<Vec<u8>> {
        let mut obj = trap.record.to_json();
        if let Some(map) = obj.as_object_mut() {
            map.insert(
                "_meta".to_string(),
                serde_json::json!({
                    "event_id": trap.event_id.to_string(),
                    "worker": trap.worker,
                    "processed_at": trap.processed_at.to_rfc3339(),
                    "source": trap.source.map(|s| s.to_string()),
                }),
            );
        }
        let mut line = serde_json::to_vec(&obj)?;
        line.push(b'\n');
        Ok(line)
    }
}

#[async_trait]
impl<W> RecordSink for JsonLinesSink<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn emit(&self, trap: &ProcessedTrap) -> PipelineResult<()> {
        let line = Self::render(trap)?;
        let mut writer = self.writer.lock().await;
        writer.write_all(&line).await?;
        writer.flush().await?;
        Ok(())
    }
}

/// Forwards records to an in-process channel.
pub struct ChannelSink {
    tx: mpsc::Sender<ProcessedTrap>,
}

impl ChannelSink {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<ProcessedTrap>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }
}

#[async_trait]
impl RecordSink for ChannelSink {
    async fn emit(&self, trap: &ProcessedTrap) -> PipelineResult<()> {
        self.tx
            .send(trap.clone())
            .await
            .map_err(|_| PipelineError::Sink("record channel closed".into()))
    }
}
