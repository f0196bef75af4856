//! Append-only driver notification log.
//!
//! Persisted alongside every event the core emits to a driver so a
//! reconnecting driver client can recover missed pushes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriverNotificationType {
    RideCancelled,
    RideUpdated,
    PaymentReceived,
    AccountUpdate,
    System,
}

impl DriverNotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RideCancelled => "ride_cancelled",
            Self::RideUpdated => "ride_updated",
            Self::PaymentReceived => "payment_received",
            Self::AccountUpdate => "account_update",
            Self::System => "system",
        }
    }
}

impl std::fmt::Display for DriverNotificationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverNotification {
    pub id: Uuid,
    pub driver_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking_id: Option<Uuid>,
    pub notification_type: DriverNotificationType,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notification_type_as_str_matches_wire_format() {
        assert_eq!(DriverNotificationType::RideCancelled.as_str(), "ride_cancelled");
        assert_eq!(DriverNotificationType::System.to_string(), "system");
    }

    #[test]
    fn serializes_with_camel_case_fields() {
        let n = DriverNotification {
            id: Uuid::new_v4(),
            driver_id: Uuid::new_v4(),
            booking_id: None,
            notification_type: DriverNotificationType::RideCancelled,
            title: "Ride cancelled".into(),
            message: "The rider cancelled this booking.".into(),
            is_read: false,
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&n).unwrap();
        assert!(json.get("bookingId").is_none());
        assert_eq!(json["notificationType"], "ride_cancelled");
        assert_eq!(json["isRead"], false);
    }
}
