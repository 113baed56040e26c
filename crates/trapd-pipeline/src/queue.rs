//! FIFO hand-off between the receiver and the worker pool.
//!
//! A [`TrapQueue`] is a multi-producer, multi-consumer channel. Every clone
//! shares the same buffer, and each enqueued event is delivered to exactly
//! one consumer. Enqueueing moves the event into the queue; the producer
//! keeps no handle to it.

use async_channel::{Receiver, Sender, TryRecvError, TrySendError};
use trapd_types::TrapEvent;

use crate::error::QueueError;

#[derive(Clone, Debug)]
pub struct TrapQueue {
    tx: Sender<TrapEvent>,
    rx: Receiver<TrapEvent>,
}

impl TrapQueue {
    /// Create a queue holding at most `capacity` events, or an unbounded
    /// queue for `None`. A capacity of zero is treated as one.
    pub fn new(capacity: Option<usize>) -> Self {
        let (tx, rx) = match capacity {
            Some(n) => async_channel::bounded(n.max(1)),
            None => async_channel::unbounded(),
        };
        Self { tx, rx }
    }

    pub fn bounded(capacity: usize) -> Self {
        Self::new(Some(capacity))
    }

    pub fn unbounded() -> Self {
        Self::new(None)
    }

    /// Enqueue an event, waiting for space when the queue is full.
    pub async fn enqueue(&self, event: TrapEvent) -> Result<(), QueueError> {
        self.tx.send(event).await.map_err(|_| QueueError::Closed)
    }

    /// Enqueue without waiting.
    pub fn try_enqueue(&self, event: TrapEvent) -> Result<(), QueueError> {
        self.tx.try_send(event).map_err(|e| match e {
            TrySendError::Full(_) => QueueError::Full {
                capacity: self.capacity().unwrap_or(usize::MAX),
            },
            TrySendError::Closed(_) => QueueError::Closed,
        })
    }

    /// Wait for the next event. Returns `None` once the queue is closed and
    /// every buffered event has been taken.
    pub async fn dequeue(&self) -> Option<TrapEvent> {
        self.rx.recv().await.ok()
    }

    /// Take the next event if one is buffered.
    pub fn try_dequeue(&self) -> Option<TrapEvent> {
        match self.rx.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => None,
        }
    }

    /// Stop accepting events. Buffered events remain available to consumers.
    /// Returns `false` if the queue was already closed.
    pub fn close(&self) -> bool {
        self.tx.close()
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Number of buffered events.
    pub fn len(&self) -> usize {
        self.tx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tx.is_empty()
    }

    /// `None` for an unbounded queue.
    pub fn capacity(&self) -> Option<usize> {
        self.tx.capacity()
    }
}
