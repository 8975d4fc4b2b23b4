// ============================================================================
// Messaging - publish/subscribe plumbing around the order codec
// ============================================================================
//
// - message: delivered messages, push envelopes, ack handles
// - transport: publish contract plus an in-memory broker with redelivery
// - publisher: encode + publish with retry on transient failures
// - subscriber: pull loop that decodes, logs and acks/nacks
//
// ============================================================================

pub mod message;
pub mod publisher;
pub mod subscriber;
pub mod transport;

pub use message::{AckDecision, Delivery, OutboundMessage, PubsubMessage, PushEnvelope, PushMessage};
pub use publisher::{OrderPublisher, PublishError, PublishSummary};
pub use subscriber::OrderSubscriber;
pub use transport::{BrokerReport, InMemoryBroker, Subscription, Transport, TransportError};
