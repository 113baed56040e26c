//! The UDP front end: the single producer feeding the [`TrapQueue`].
//!
//! The receive loop only decodes, filters and enqueues. Resolution and
//! output happen in the workers, so a slow sink never stalls the socket
//! (unless a bounded queue fills up, which is the intended backpressure).

use std::net::SocketAddr;
use std::time::Duration;

use serde::Serialize;
use tokio::net::UdpSocket;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use trapd_pipeline::TrapQueue;

use crate::config::ReceiverConfig;
use crate::error::{ReceiverError, ReceiverResult};

/// Counters reported when the receive loop exits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ReceiverStats {
    /// Datagrams read from the socket.
    pub datagrams: u64,
    /// Events handed to the queue.
    pub enqueued: u64,
    /// Datagrams that failed to decode.
    pub malformed: u64,
    /// Traps dropped by the community filter.
    pub rejected: u64,
    /// Events the queue refused.
    pub dropped: u64,
}

/// Delay between retries after consecutive socket errors. Doubles up to
/// [`ErrorBackoff::MAX`] and resets on the next successful receive.
#[derive(Debug)]
struct ErrorBackoff {
    next: Duration,
}

impl ErrorBackoff {
    const INITIAL: Duration = Duration::from_millis(10);
    const MAX: Duration = Duration::from_secs(1);

    fn new() -> Self {
        Self { next: Self::INITIAL }
    }

    fn failure(&mut self) -> Duration {
        let delay = self.next;
        self.next = (self.next * 2).min(Self::MAX);
        delay
    }

    fn reset(&mut self) {
        self.next = Self::INITIAL;
    }
}

pub struct TrapReceiver {
    socket: UdpSocket,
    local_addr: SocketAddr,
    config: ReceiverConfig,
    queue: TrapQueue,
    cancel: CancellationToken,
}

impl TrapReceiver {
    /// Bind the trap socket. Failure here is fatal for the daemon.
    pub async fn bind(
        config: ReceiverConfig,
        queue: TrapQueue,
        cancel: CancellationToken,
    ) -> ReceiverResult<Self> {
        config.validate()?;
        let socket = UdpSocket::bind(config.bind_addr)
            .await
            .map_err(|source| ReceiverError::Bind {
                addr: config.bind_addr,
                source,
            })?;
        let local_addr = socket.local_addr()?;
        info!(addr = %local_addr, "Listening for SNMP traps on {local_addr}");
        Ok(Self {
            socket,
            local_addr,
            config,
            queue,
            cancel,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Receive until cancelled, then close the queue.
    pub async fn run(self) -> ReceiverStats {
        let mut stats = ReceiverStats::default();
        let mut buf = vec![0u8; self.config.max_datagram_size];
        let mut backoff = ErrorBackoff::new();

        loop {
            let received = tokio::select! {
                _ = self.cancel.cancelled() => {
                    info!("receiver shutdown requested");
                    break;
                }
                received = self.socket.recv_from(&mut buf) => received,
            };
            let (len, peer) = match received {
                Ok(received) => {
                    backoff.reset();
                    received
                }
                Err(e) => {
                    let delay = backoff.failure();
                    warn!(error = %e, retry_in_ms = delay.as_millis() as u64, "failed to receive datagram");
                    tokio::select! {
                        _ = self.cancel.cancelled() => break,
                        _ = tokio::time::sleep(delay) => {}
                    }
                    continue;
                }
            };
            stats.datagrams += 1;

            let event = match trapd_codec::decode(&buf[..len], Some(peer)) {
                Ok(event) => event,
                Err(e) => {
                    warn!(source = %peer, len, error = %e, "dropping malformed trap datagram");
                    stats.malformed += 1;
                    continue;
                }
            };

            if !self.config.accepts(&event.community) {
                debug!(source = %peer, community = %event.community, "community not accepted; trap dropped");
                stats.rejected += 1;
                continue;
            }

            debug!(
                event_id = %event.id,
                source = %peer,
                version = %event.version,
                bindings = event.binding_count(),
                "trap received"
            );

            let enqueued = tokio::select! {
                _ = self.cancel.cancelled() => {
                    info!("receiver shutdown requested while waiting for queue space");
                    break;
                }
                result = self.queue.enqueue(event) => result,
            };
            match enqueued {
                Ok(()) => stats.enqueued += 1,
                Err(e) => {
                    warn!(source = %peer, error = %e, "failed to enqueue trap");
                    stats.dropped += 1;
                }
            }
        }

        self.queue.close();
        info!(
            datagrams = stats.datagrams,
            enqueued = stats.enqueued,
            malformed = stats.malformed,
            rejected = stats.rejected,
            dropped = stats.dropped,
            "receiver stopped"
        );
        stats
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use trapd_codec::{decode, encode_v2c_trap, TrapBinding, TrapValue};
    use trapd_types::SNMP_TRAP_OID;

    fn local_config() -> ReceiverConfig {
        ReceiverConfig {
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            ..Default::default()
        }
    }

    fn trap_bytes(community: &str) -> Vec<u8> {
        encode_v2c_trap(
            community,
            7,
            &[TrapBinding::new(
                SNMP_TRAP_OID,
                TrapValue::ObjectIdentifier("1.3.6.1.4.1.9.9.1".into()),
            )],
        )
        .unwrap()
    }

    #[tokio::test]
    async fn bind_conflict_is_reported() {
        let taken = std::net::UdpSocket::bind("127.0.0.1:0").unwrap();
        let config = ReceiverConfig {
            bind_addr: taken.local_addr().unwrap(),
            ..Default::default()
        };
        let err = TrapReceiver::bind(config, TrapQueue::unbounded(), CancellationToken::new())
            .await
            .err()
            .unwrap();
        assert!(matches!(err, ReceiverError::Bind { .. }));
    }

    #[tokio::test]
    async fn receives_filters_and_closes_queue() {
        let queue = TrapQueue::unbounded();
        let cancel = CancellationToken::new();
        let config = ReceiverConfig {
            communities: vec!["ops".into()],
            ..local_config()
        };
        let receiver = TrapReceiver::bind(config, queue.clone(), cancel.clone()).await.unwrap();
        let addr = receiver.local_addr();
        let task = tokio::spawn(receiver.run());

        let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        client.send_to(&trap_bytes("public"), addr).await.unwrap();
        client.send_to(b"\x30\x03\x02\x01", addr).await.unwrap();
        client.send_to(&trap_bytes("ops"), addr).await.unwrap();

        let event = tokio::time::timeout(Duration::from_secs(5), queue.dequeue())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(event.community, "ops");
        assert_eq!(event.source.unwrap().ip(), client.local_addr().unwrap().ip());

        cancel.cancel();
        let stats = task.await.unwrap();
        assert_eq!(stats.datagrams, 3);
        assert_eq!(stats.rejected, 1);
        assert_eq!(stats.malformed, 1);
        assert_eq!(stats.enqueued, 1);
        assert!(queue.is_closed());
    }

    #[tokio::test]
    async fn zero_datagram_size_is_rejected() {
        let config = ReceiverConfig {
            max_datagram_size: 0,
            ..local_config()
        };
        let err = TrapReceiver::bind(config, TrapQueue::unbounded(), CancellationToken::new())
            .await
            .err()
            .unwrap();
        assert!(matches!(err, ReceiverError::Config(_)));
    }

    #[test]
    fn error_backoff_grows_and_resets() {
        let mut backoff = ErrorBackoff::new();
        assert_eq!(backoff.failure(), Duration::from_millis(10));
        assert_eq!(backoff.failure(), Duration::from_millis(20));
        assert_eq!(backoff.failure(), Duration::from_millis(40));
        for _ in 0..10 {
            backoff.failure();
        }
        assert_eq!(backoff.failure(), ErrorBackoff::MAX);
        backoff.reset();
        assert_eq!(backoff.failure(), ErrorBackoff::INITIAL);
    }

    #[tokio::test]
    async fn cancel_releases_receiver_blocked_on_full_queue() {
        let queue = TrapQueue::bounded(1);
        queue.try_enqueue(decode(&trap_bytes("public"), None).unwrap()).unwrap();
        let cancel = CancellationToken::new();
        let receiver = TrapReceiver::bind(local_config(), queue.clone(), cancel.clone()).await.unwrap();
        let addr = receiver.local_addr();
        let task = tokio::spawn(receiver.run());

        let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        client.send_to(&trap_bytes("public"), addr).await.unwrap();
        // Give the receiver time to decode and park on the full queue.
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(!task.is_finished());

        cancel.cancel();
        let stats = tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .expect("receiver stuck on a full queue after cancel")
            .unwrap();
        assert_eq!(stats.datagrams, 1);
        assert_eq!(stats.enqueued, 0);
        assert_eq!(stats.dropped, 0);
        assert!(queue.is_closed());
        assert_eq!(queue.len(), 1);
    }

    #[tokio::test]
    async fn closed_queue_does_not_stop_receiver() {
        let queue = TrapQueue::unbounded();
        queue.close();
        let cancel = CancellationToken::new();
        let receiver = TrapReceiver::bind(local_config(), queue, cancel.clone()).await.unwrap();
        let addr = receiver.local_addr();
        let task = tokio::spawn(receiver.run());

        let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        for _ in 0..2 {
            client.send_to(&trap_bytes("public"), addr).await.unwrap();
        }
        // Wait until both datagrams have been seen.
        tokio::time::sleep(Duration::from_millis(200)).await;
        cancel.cancel();
        let stats = task.await.unwrap();
        assert_eq!(stats.dropped, 2);
        assert_eq!(stats.enqueued, 0);
    }
}
