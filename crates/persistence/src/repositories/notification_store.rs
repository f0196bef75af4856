//! Append-only store for `driver_notifications`.

use sqlx::PgPool;
use uuid::Uuid;

use domain::models::{DriverNotification, DriverNotificationType};

use crate::entities::DriverNotificationEntity;
use crate::metrics::QueryTimer;

#[derive(Debug, Clone)]
pub struct NewDriverNotification {
    pub driver_id: Uuid,
    pub booking_id: Option<Uuid>,
    pub notification_type: DriverNotificationType,
    pub title: String,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct NotificationStore {
    pool: PgPool,
}

impl NotificationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, input: NewDriverNotification) -> Result<DriverNotification, sqlx::Error> {
        let timer = QueryTimer::new("driver_notification_create");

        let entity = sqlx::query_as::<_, DriverNotificationEntity>(
            r#"
            INSERT INTO driver_notifications (
                driver_id, booking_id, notification_type, title, message, is_read
            )
            VALUES ($1, $2, $3, $4, $5, false)
            RETURNING id, driver_id, booking_id, notification_type, title, message, is_read, created_at
            "#,
        )
        .bind(input.driver_id)
        .bind(input.booking_id)
        .bind(input.notification_type.as_str())
        .bind(&input.title)
        .bind(&input.message)
        .fetch_one(&self.pool)
        .await?;

        timer.record();
        Ok(entity.into_domain())
    }

    pub async fn list_for_driver(
        &self,
        driver_id: Uuid,
        limit: i64,
    ) -> Result<Vec<DriverNotification>, sqlx::Error> {
        let timer = QueryTimer::new("driver_notification_list_for_driver");

        let entities = sqlx::query_as::<_, DriverNotificationEntity>(
            r#"
            SELECT id, driver_id, booking_id, notification_type, title, message, is_read, created_at
            FROM driver_notifications
            WHERE driver_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(driver_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        timer.record();
        Ok(entities.into_iter().map(DriverNotificationEntity::into_domain).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_notification_carries_type() {
        let input = NewDriverNotification {
            driver_id: Uuid::new_v4(),
            booking_id: None,
            notification_type: DriverNotificationType::RideCancelled,
            title: "Ride cancelled".into(),
            message: "The rider cancelled this booking.".into(),
        };
        assert_eq!(input.notification_type, DriverNotificationType::RideCancelled);
    }
}
