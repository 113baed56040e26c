use thiserror::Error;

/// Errors returned by [`TrapQueue`](crate::TrapQueue) operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueueError {
    /// The queue has been closed; no further events are accepted.
    #[error("trap queue is closed")]
    Closed,

    /// A non-blocking enqueue found the queue at capacity.
    #[error("trap queue is full ({capacity} events)")]
    Full { capacity: usize },
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("queue error: {0}")]
    Queue(#[from] QueueError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("sink error: {0}")]
    Sink(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type PipelineResult<T> = Result<T, PipelineError>;
