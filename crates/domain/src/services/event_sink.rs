//! Outbound event delivery for dispatch-core state transitions.
//!
//! The core never owns the push-notification transport; it depends only
//! on a `send(recipient, title, body, data)`-shaped method, following
//! this codebase's existing pluggable-delivery-service pattern.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Typed events the dispatch core emits on state transitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DispatchEvent {
    /// A pending offer was created for `driver_id`.
    OfferExtended {
        driver_id: Uuid,
        booking_id: Uuid,
        expires_at: DateTime<Utc>,
    },
    /// An offer was accepted; the booking now has an assigned driver.
    DriverAssigned {
        rider_id: Uuid,
        booking_id: Uuid,
        driver_id: Uuid,
    },
    /// Mirror of `DriverAssigned` addressed to the accepting driver, so
    /// the driver side gets its own confirmation push.
    RideConfirmed { driver_id: Uuid, booking_id: Uuid },
    /// The booking reached `completed`.
    RideCompleted { rider_id: Uuid, booking_id: Uuid },
    /// The booking reached `cancelled`, or a pending offer was cancelled
    /// as a cascade of that transition.
    RideCancelled { recipient: Uuid, booking_id: Uuid },
}

impl DispatchEvent {
    /// The recipient this event is addressed to.
    pub fn recipient(&self) -> Uuid {
        match self {
            Self::OfferExtended { driver_id, .. } => *driver_id,
            Self::DriverAssigned { rider_id, .. } => *rider_id,
            Self::RideConfirmed { driver_id, .. } => *driver_id,
            Self::RideCompleted { rider_id, .. } => *rider_id,
            Self::RideCancelled { recipient, .. } => *recipient,
        }
    }

    /// True when the recipient is a driver, meaning the event is also
    /// durably recorded as a `DriverNotification` row.
    pub fn is_driver_directed(&self) -> bool {
        matches!(
            self,
            Self::OfferExtended { .. } | Self::RideConfirmed { .. } | Self::RideCancelled { .. }
        )
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::OfferExtended { .. } => "New ride request",
            Self::DriverAssigned { .. } => "Driver assigned",
            Self::RideConfirmed { .. } => "Ride confirmed",
            Self::RideCompleted { .. } => "Ride completed",
            Self::RideCancelled { .. } => "Ride cancelled",
        }
    }
}

/// Result of a single delivery attempt to the push sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryResult {
    Sent,
    Failed(String),
}

/// The push sink interface the dispatch core depends on. Delivery
/// failures are logged by callers and never roll back a state
/// transition, nor are they retried against the sink.
#[async_trait::async_trait]
pub trait EventSink: Send + Sync {
    async fn send(
        &self,
        recipient: Uuid,
        title: &str,
        body: &str,
        data: serde_json::Value,
    ) -> DeliveryResult;
}

/// Default sink for environments with no real push transport configured:
/// logs the event and reports it sent.
#[derive(Debug, Clone, Default)]
pub struct LoggingEventSink;

#[async_trait::async_trait]
impl EventSink for LoggingEventSink {
    async fn send(
        &self,
        recipient: Uuid,
        title: &str,
        body: &str,
        data: serde_json::Value,
    ) -> DeliveryResult {
        tracing::info!(
            recipient = %recipient,
            title = %title,
            body = %body,
            data = %data,
            "dispatching event to push sink"
        );
        DeliveryResult::Sent
    }
}

/// Mock sink for tests: records every call, optionally simulating failure.
#[derive(Debug, Clone, Default)]
pub struct MockEventSink {
    pub simulate_failure: bool,
}

impl MockEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            simulate_failure: true,
        }
    }
}

#[async_trait::async_trait]
impl EventSink for MockEventSink {
    async fn send(
        &self,
        recipient: Uuid,
        title: &str,
        body: &str,
        _data: serde_json::Value,
    ) -> DeliveryResult {
        if self.simulate_failure {
            tracing::warn!(recipient = %recipient, title = %title, body = %body, "mock event sink simulating failure");
            return DeliveryResult::Failed("simulated failure".to_string());
        }
        DeliveryResult::Sent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offer_extended_is_driver_directed() {
        let event = DispatchEvent::OfferExtended {
            driver_id: Uuid::new_v4(),
            booking_id: Uuid::new_v4(),
            expires_at: Utc::now(),
        };
        assert!(event.is_driver_directed());
    }

    #[test]
    fn driver_assigned_is_rider_directed() {
        let event = DispatchEvent::DriverAssigned {
            rider_id: Uuid::new_v4(),
            booking_id: Uuid::new_v4(),
            driver_id: Uuid::new_v4(),
        };
        assert!(!event.is_driver_directed());
    }

    #[test]
    fn ride_confirmed_is_driver_directed() {
        let driver_id = Uuid::new_v4();
        let event = DispatchEvent::RideConfirmed {
            driver_id,
            booking_id: Uuid::new_v4(),
        };
        assert!(event.is_driver_directed());
        assert_eq!(event.recipient(), driver_id);
    }

    #[test]
    fn recipient_matches_event_variant() {
        let rider_id = Uuid::new_v4();
        let event = DispatchEvent::RideCompleted {
            rider_id,
            booking_id: Uuid::new_v4(),
        };
        assert_eq!(event.recipient(), rider_id);
    }

    #[tokio::test]
    async fn mock_sink_reports_sent_by_default() {
        let sink = MockEventSink::new();
        let result = sink
            .send(Uuid::new_v4(), "title", "body", serde_json::json!({}))
            .await;
        assert_eq!(result, DeliveryResult::Sent);
    }

    #[tokio::test]
    async fn mock_sink_can_simulate_failure() {
        let sink = MockEventSink::failing();
        let result = sink
            .send(Uuid::new_v4(), "title", "body", serde_json::json!({}))
            .await;
        assert!(matches!(result, DeliveryResult::Failed(_)));
    }

    #[tokio::test]
    async fn logging_sink_always_reports_sent() {
        let sink = LoggingEventSink;
        let result = sink
            .send(Uuid::new_v4(), "title", "body", serde_json::json!({}))
            .await;
        assert_eq!(result, DeliveryResult::Sent);
    }
}
