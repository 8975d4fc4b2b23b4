use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

use super::message::{AckDecision, Delivery, OutboundMessage, PubsubMessage};
use crate::utils::IsTransient;

// ============================================================================
// Transport - the publish side of the messaging collaborator
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("Unknown topic: {0}")]
    UnknownTopic(String),

    #[error("Topic {0} is closed")]
    Closed(String),

    #[error("Transport unavailable: {0}")]
    Unavailable(String),
}

impl IsTransient for TransportError {
    fn is_transient(&self) -> bool {
        matches!(self, TransportError::Unavailable(_))
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Publish one message and return the transport-assigned message id.
    async fn publish(&self, topic: &str, message: OutboundMessage) -> Result<String, TransportError>;
}

// ============================================================================
// In-memory broker: one topic feeding one subscription
// ============================================================================
//
// Every published message is handed to the named subscription as a
// `Delivery`. A nacked (or dropped) delivery is sent again until
// `max_delivery_attempts` is reached, after which it lands in the dead
// letter list.
//
// ============================================================================

#[derive(Debug, Default)]
struct BrokerStats {
    acked: AtomicU64,
    nacked: AtomicU64,
    dead_letters: Mutex<Vec<PubsubMessage>>,
}

struct BrokerInner {
    topic: String,
    subscription: Arc<str>,
    tx: mpsc::Sender<Delivery>,
    next_id: AtomicU64,
    max_delivery_attempts: u32,
    stats: Arc<BrokerStats>,
}

pub struct InMemoryBroker {
    inner: Arc<BrokerInner>,
}

/// Handle for reading broker outcomes after the broker itself is dropped.
#[derive(Clone)]
pub struct BrokerReport {
    stats: Arc<BrokerStats>,
}

/// Receiving end shared by any number of subscriber workers.
#[derive(Clone)]
pub struct Subscription {
    name: Arc<str>,
    rx: Arc<Mutex<mpsc::Receiver<Delivery>>>,
}

impl InMemoryBroker {
    pub fn new(
        topic: impl Into<String>,
        subscription: &str,
        capacity: usize,
        max_delivery_attempts: u32,
    ) -> (Self, Subscription) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let name: Arc<str> = Arc::from(subscription);

        let broker = Self {
            inner: Arc::new(BrokerInner {
                topic: topic.into(),
                subscription: name.clone(),
                tx,
                next_id: AtomicU64::new(1),
                max_delivery_attempts: max_delivery_attempts.max(1),
                stats: Arc::new(BrokerStats::default()),
            }),
        };

        let subscription = Subscription {
            name,
            rx: Arc::new(Mutex::new(rx)),
        };

        (broker, subscription)
    }

    pub fn report(&self) -> BrokerReport {
        BrokerReport {
            stats: self.inner.stats.clone(),
        }
    }

    /// Deliver until acked or out of attempts. Runs on its own task.
    async fn dispatch(inner: Arc<BrokerInner>, message: PubsubMessage) {
        let mut attempt = 1;

        loop {
            let (delivery, ack_rx) = Delivery::new(message.clone(), attempt);
            if inner.tx.send(delivery).await.is_err() {
                tracing::warn!(
                    subscription = %inner.subscription,
                    message_id = %message.message_id,
                    "Subscription closed, dropping message"
                );
                return;
            }

            match ack_rx.await.unwrap_or(AckDecision::Nack) {
                AckDecision::Ack => {
                    inner.stats.acked.fetch_add(1, Ordering::SeqCst);
                    return;
                }
                AckDecision::Nack => {
                    inner.stats.nacked.fetch_add(1, Ordering::SeqCst);

                    if attempt >= inner.max_delivery_attempts {
                        tracing::error!(
                            subscription = %inner.subscription,
                            message_id = %message.message_id,
                            attempts = attempt,
                            "💀 Delivery attempts exhausted, moving message to dead letters"
                        );
                        inner.stats.dead_letters.lock().await.push(message);
                        return;
                    }

                    tracing::debug!(
                        message_id = %message.message_id,
                        attempt = attempt,
                        "Message nacked, redelivering"
                    );
                    attempt += 1;
                }
            }
        }
    }
}

#[async_trait]
impl Transport for InMemoryBroker {
    async fn publish(&self, topic: &str, message: OutboundMessage) -> Result<String, TransportError> {
        if topic != self.inner.topic {
            return Err(TransportError::UnknownTopic(topic.to_string()));
        }
        if self.inner.tx.is_closed() {
            return Err(TransportError::Closed(topic.to_string()));
        }

        let message_id = self.inner.next_id.fetch_add(1, Ordering::SeqCst).to_string();
        let message = PubsubMessage {
            message_id: message_id.clone(),
            data: message.data,
            attributes: message.attributes,
        };

        tokio::spawn(Self::dispatch(self.inner.clone(), message));

        Ok(message_id)
    }
}

impl BrokerReport {
    pub fn acked(&self) -> u64 {
        self.stats.acked.load(Ordering::SeqCst)
    }

    pub fn nacked(&self) -> u64 {
        self.stats.nacked.load(Ordering::SeqCst)
    }

    pub async fn dead_letters(&self) -> Vec<PubsubMessage> {
        self.stats.dead_letters.lock().await.clone()
    }
}

impl Subscription {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Next delivery, or `None` once the broker and all in-flight
    /// redeliveries are gone.
    pub async fn next(&self) -> Option<Delivery> {
        self.rx.lock().await.recv().await
    }
}
