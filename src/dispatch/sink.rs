//! Where successfully parsed representations go

use serde::Serialize;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::protocol::Representation;

/// A parsed representation together with the envelope it came from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Delivery {
    pub envelope_id: Uuid,
    pub url: String,
    pub handler: String,
    pub representation: Representation,
}

/// Consumer of processed representations
///
/// Publishing happens inside `dispatch`, so implementations must not block.
pub trait RepresentationSink: Send + Sync {
    fn publish(&self, delivery: Delivery);
}

/// Discards every delivery
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl RepresentationSink for NullSink {
    fn publish(&self, _delivery: Delivery) {}
}

/// Forwards deliveries into an unbounded tokio channel
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: mpsc::UnboundedSender<Delivery>,
}

impl ChannelSink {
    pub fn new(sender: mpsc::UnboundedSender<Delivery>) -> Self {
        Self { sender }
    }

    /// Create a sink together with the receiving end
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Delivery>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self::new(sender), receiver)
    }
}

impl RepresentationSink for ChannelSink {
    fn publish(&self, delivery: Delivery) {
        if let Err(e) = self.sender.send(delivery) {
            tracing::warn!(
                envelope_id = %e.0.envelope_id,
                "Representation receiver dropped, delivery discarded"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn delivery() -> Delivery {
        Delivery {
            envelope_id: Uuid::new_v4(),
            url: "http://x/restful/user".to_string(),
            handler: "user".to_string(),
            representation: Representation::Custom(json!({})),
        }
    }

    #[tokio::test]
    async fn test_channel_sink_forwards() {
        let (sink, mut receiver) = ChannelSink::channel();
        let sent = delivery();
        sink.publish(sent.clone());

        assert_eq!(receiver.recv().await, Some(sent));
    }

    #[test]
    fn test_channel_sink_survives_dropped_receiver() {
        let (sink, receiver) = ChannelSink::channel();
        drop(receiver);
        sink.publish(delivery());
    }
}
