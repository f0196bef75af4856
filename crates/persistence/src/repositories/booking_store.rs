//! BookingStore: the booking entity with status and driver link.

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use domain::models::{Booking, BookingStatus};
use domain::DispatchError;

use crate::entities::BookingEntity;
use crate::metrics::QueryTimer;

/// Input for creating a new booking.
#[derive(Debug, Clone)]
pub struct CreateBookingInput {
    pub rider_id: Uuid,
    pub pickup_address: String,
    pub pickup_lat: f64,
    pub pickup_lon: f64,
    pub destination_address: String,
    pub destination_lat: f64,
    pub destination_lon: f64,
    pub ride_class: String,
    pub fare: f64,
    pub distance_km: f64,
    pub duration_min: f64,
    pub payment_method: String,
}

#[derive(Debug, Clone)]
pub struct BookingStore {
    pool: PgPool,
}

impl BookingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create a new booking directly in `searching_driver` (see the
    /// design note on the `pending` status in the booking state machine).
    pub async fn create(&self, input: CreateBookingInput) -> Result<Booking, sqlx::Error> {
        let timer = QueryTimer::new("booking_create");

        let entity = sqlx::query_as::<_, BookingEntity>(
            r#"
            INSERT INTO bookings (
                rider_id, pickup_address, pickup_lat, pickup_lon,
                destination_address, destination_lat, destination_lon,
                ride_class, fare, distance_km, duration_min,
                payment_method, payment_completed, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, false, 'searching_driver')
            RETURNING
                id, rider_id, driver_id, pickup_address, pickup_lat, pickup_lon,
                destination_address, destination_lat, destination_lon, ride_class,
                fare, distance_km, duration_min, payment_method, payment_completed,
                status, created_at, updated_at, completed_at
            "#,
        )
        .bind(input.rider_id)
        .bind(&input.pickup_address)
        .bind(input.pickup_lat)
        .bind(input.pickup_lon)
        .bind(&input.destination_address)
        .bind(input.destination_lat)
        .bind(input.destination_lon)
        .bind(&input.ride_class)
        .bind(input.fare)
        .bind(input.distance_km)
        .bind(input.duration_min)
        .bind(&input.payment_method)
        .fetch_one(&self.pool)
        .await?;

        timer.record();
        Ok(entity.into_domain())
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Booking>, sqlx::Error> {
        let timer = QueryTimer::new("booking_find_by_id");

        let entity = sqlx::query_as::<_, BookingEntity>(
            r#"
            SELECT
                id, rider_id, driver_id, pickup_address, pickup_lat, pickup_lon,
                destination_address, destination_lat, destination_lon, ride_class,
                fare, distance_km, duration_min, payment_method, payment_completed,
                status, created_at, updated_at, completed_at
            FROM bookings
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        timer.record();
        Ok(entity.map(BookingEntity::into_domain))
    }

    pub async fn require(&self, id: Uuid) -> Result<Booking, DispatchError> {
        self.find_by_id(id)
            .await
            .map_err(|e| DispatchError::StoreUnavailable(e.to_string()))?
            .ok_or(DispatchError::BookingNotFound(id))
    }

    /// Assign a driver and move the booking to `driver_assigned`, within
    /// the same transaction as the accepting offer's status write.
    pub async fn assign_driver(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        booking_id: Uuid,
        driver_id: Uuid,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE bookings
            SET driver_id = $2, status = 'driver_assigned', updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(booking_id)
        .bind(driver_id)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    /// Set the status to a plain (non-driver-assigning) value, e.g.
    /// `searching_driver`, `no_driver_found`, `driver_arrived`,
    /// `in_progress`.
    pub async fn set_status(&self, booking_id: Uuid, status: BookingStatus) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("booking_set_status");

        sqlx::query(
            r#"
            UPDATE bookings
            SET status = $2, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(booking_id)
        .bind(status.as_str())
        .execute(&self.pool)
        .await?;

        timer.record();
        Ok(())
    }

    pub async fn complete(&self, booking_id: Uuid) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("booking_complete");

        sqlx::query(
            r#"
            UPDATE bookings
            SET status = 'completed', payment_completed = true, completed_at = $2, updated_at = $2
            WHERE id = $1
            "#,
        )
        .bind(booking_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        timer.record();
        Ok(())
    }

    /// Cancel within an existing transaction, so the booking's transition
    /// and the cascade that cancels its pending offers commit atomically.
    pub async fn cancel_in_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        booking_id: Uuid,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE bookings
            SET status = 'cancelled', updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(booking_id)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_booking_input_round_trips_fields() {
        let input = CreateBookingInput {
            rider_id: Uuid::new_v4(),
            pickup_address: "1 Main St".into(),
            pickup_lat: 0.0,
            pickup_lon: 0.0,
            destination_address: "2 Main St".into(),
            destination_lat: 0.01,
            destination_lon: 0.01,
            ride_class: "standard".into(),
            fare: 12.0,
            distance_km: 3.0,
            duration_min: 9.0,
            payment_method: "card".into(),
        };
        assert_eq!(input.ride_class, "standard");
        assert!(input.fare > 0.0);
    }
}
