//! DriverNotification entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use domain::models::{DriverNotification, DriverNotificationType};

#[derive(Debug, Clone, FromRow)]
pub struct DriverNotificationEntity {
    pub id: Uuid,
    pub driver_id: Uuid,
    pub booking_id: Option<Uuid>,
    pub notification_type: String,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl DriverNotificationEntity {
    pub fn into_domain(self) -> DriverNotification {
        let notification_type = match self.notification_type.as_str() {
            "ride_updated" => DriverNotificationType::RideUpdated,
            "payment_received" => DriverNotificationType::PaymentReceived,
            "account_update" => DriverNotificationType::AccountUpdate,
            "system" => DriverNotificationType::System,
            _ => DriverNotificationType::RideCancelled,
        };

        DriverNotification {
            id: self.id,
            driver_id: self.driver_id,
            booking_id: self.booking_id,
            notification_type,
            title: self.title,
            message: self.message,
            is_read: self.is_read,
            created_at: self.created_at,
        }
    }
}

impl From<DriverNotificationEntity> for DriverNotification {
    fn from(entity: DriverNotificationEntity) -> Self {
        entity.into_domain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_notification_type_string_to_enum() {
        let entity = DriverNotificationEntity {
            id: Uuid::new_v4(),
            driver_id: Uuid::new_v4(),
            booking_id: None,
            notification_type: "payment_received".into(),
            title: "Payment received".into(),
            message: "Your fare was received.".into(),
            is_read: false,
            created_at: Utc::now(),
        };
        let notification: DriverNotification = entity.into();
        assert_eq!(notification.notification_type, DriverNotificationType::PaymentReceived);
    }
}
