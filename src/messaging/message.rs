use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::oneshot;

// ============================================================================
// Message Types
// ============================================================================

/// A message as delivered by the transport: raw payload plus attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PubsubMessage {
    pub message_id: String,
    pub data: Vec<u8>,
    pub attributes: HashMap<String, String>,
}

/// A message handed to a transport for publishing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OutboundMessage {
    pub data: Vec<u8>,
    pub attributes: HashMap<String, String>,
}

impl OutboundMessage {
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            attributes: HashMap::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

// ============================================================================
// Push delivery envelope
// ============================================================================
//
// {"message": {"data": "<base64>", "messageId": "...", "attributes": {...}},
//  "subscription": "projects/.../subscriptions/..."}
//
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushEnvelope {
    pub message: PushMessage,
    #[serde(default)]
    pub subscription: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushMessage {
    pub data: String,
    #[serde(default, alias = "message_id")]
    pub message_id: String,
    #[serde(default)]
    pub attributes: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish_time: Option<String>,
}

impl PushEnvelope {
    /// Wrap raw bytes the way the push transport does.
    pub fn wrap(message_id: impl Into<String>, data: &[u8]) -> Self {
        Self {
            message: PushMessage {
                data: STANDARD.encode(data),
                message_id: message_id.into(),
                attributes: HashMap::new(),
                publish_time: None,
            },
            subscription: None,
        }
    }

    /// Unwrap the base64 payload into a delivered message.
    pub fn into_message(self) -> Result<PubsubMessage, base64::DecodeError> {
        let data = STANDARD.decode(self.message.data.as_bytes())?;

        Ok(PubsubMessage {
            message_id: self.message.message_id,
            data,
            attributes: self.message.attributes,
        })
    }
}

// ============================================================================
// Pull delivery unit: one message plus its acknowledgement handle
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckDecision {
    Ack,
    Nack,
}

/// A pulled message awaiting an ack or nack. Dropping it counts as a nack.
#[derive(Debug)]
pub struct Delivery {
    pub message: PubsubMessage,
    pub delivery_attempt: u32,
    ack_tx: oneshot::Sender<AckDecision>,
}

impl Delivery {
    pub fn new(message: PubsubMessage, delivery_attempt: u32) -> (Self, oneshot::Receiver<AckDecision>) {
        let (ack_tx, ack_rx) = oneshot::channel();
        (
            Self {
                message,
                delivery_attempt,
                ack_tx,
            },
            ack_rx,
        )
    }

    pub fn ack(self) {
        self.settle(AckDecision::Ack);
    }

    pub fn nack(self) {
        self.settle(AckDecision::Nack);
    }

    fn settle(self, decision: AckDecision) {
        if self.ack_tx.send(decision).is_err() {
            tracing::debug!(
                message_id = %self.message.message_id,
                "Transport stopped waiting for acknowledgement"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_envelope_round_trip() {
        let envelope = PushEnvelope::wrap("42", b"\x0aORD-1");
        let json = serde_json::to_string(&envelope).unwrap();
        assert!(json.contains("\"messageId\":\"42\""));

        let parsed: PushEnvelope = serde_json::from_str(&json).unwrap();
        let message = parsed.into_message().unwrap();
        assert_eq!(message.message_id, "42");
        assert_eq!(message.data, b"\x0aORD-1");
    }

    #[test]
    fn test_push_envelope_from_transport_json() {
        let json = r#"{
            "message": {
                "data": "aGVsbG8=",
                "messageId": "136969346945",
                "publishTime": "2025-05-13T12:00:00Z",
                "attributes": {"order_id": "ORD-1"}
            },
            "subscription": "projects/demo/subscriptions/orders-push"
        }"#;

        let envelope: PushEnvelope = serde_json::from_str(json).unwrap();
        assert_eq!(
            envelope.subscription.as_deref(),
            Some("projects/demo/subscriptions/orders-push")
        );

        let message = envelope.into_message().unwrap();
        assert_eq!(message.data, b"hello");
        assert_eq!(message.attributes["order_id"], "ORD-1");
    }

    #[test]
    fn test_invalid_base64() {
        let mut envelope = PushEnvelope::wrap("1", b"x");
        envelope.message.data = "not*base64".to_string();

        assert!(envelope.into_message().is_err());
    }

    #[tokio::test]
    async fn test_delivery_ack_and_nack() {
        let message = PubsubMessage {
            message_id: "1".to_string(),
            data: vec![],
            attributes: HashMap::new(),
        };

        let (delivery, rx) = Delivery::new(message.clone(), 1);
        delivery.ack();
        assert_eq!(rx.await.unwrap(), AckDecision::Ack);

        let (delivery, rx) = Delivery::new(message.clone(), 2);
        delivery.nack();
        assert_eq!(rx.await.unwrap(), AckDecision::Nack);

        let (delivery, rx) = Delivery::new(message, 3);
        drop(delivery);
        assert!(rx.await.is_err());
    }

    #[test]
    fn test_outbound_attributes() {
        let message = OutboundMessage::new(vec![1, 2]).with_attribute("message_format", "JSON");
        assert_eq!(message.attributes["message_format"], "JSON");
    }
}
