//! OfferStore: durable offers with the unique-pending-per-booking
//! constraint enforced by a partial index, plus the row-locked
//! accept/decline/expire operations.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use domain::models::{OfferStatus, RideOffer};
use domain::DispatchError;

use crate::entities::RideOfferEntity;
use crate::metrics::QueryTimer;

/// Postgres error code for a unique-constraint violation.
const UNIQUE_VIOLATION: &str = "23505";

#[derive(Debug, Clone)]
pub struct NewOffer {
    pub booking_id: Uuid,
    pub driver_id: Uuid,
    pub offer_order: i32,
    pub distance_km: f64,
    pub score: f64,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct OfferStore {
    pool: PgPool,
}

impl OfferStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create a new pending offer. A concurrent dispatch for the same
    /// booking trips the partial unique index; the caller should
    /// translate that into `DispatchError::RaceLost` and re-read the
    /// existing pending offer via [`Self::find_pending_for_booking`].
    pub async fn create_pending(&self, input: NewOffer) -> Result<RideOffer, DispatchError> {
        let timer = QueryTimer::new("offer_create_pending");

        let result = sqlx::query_as::<_, RideOfferEntity>(
            r#"
            INSERT INTO ride_offers (
                booking_id, driver_id, offer_order, distance_km, score,
                status, offered_at, expires_at
            )
            VALUES ($1, $2, $3, $4, $5, 'pending', now(), $6)
            RETURNING
                id, booking_id, driver_id, offer_order, distance_km, score,
                status, offered_at, expires_at, responded_at
            "#,
        )
        .bind(input.booking_id)
        .bind(input.driver_id)
        .bind(input.offer_order)
        .bind(input.distance_km)
        .bind(input.score)
        .bind(input.expires_at)
        .fetch_one(&self.pool)
        .await;

        timer.record();

        match result {
            Ok(entity) => Ok(entity.into_domain()),
            Err(sqlx::Error::Database(db_err)) if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) => {
                Err(DispatchError::RaceLost(input.booking_id))
            }
            Err(e) => Err(DispatchError::StoreUnavailable(e.to_string())),
        }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<RideOffer>, sqlx::Error> {
        let timer = QueryTimer::new("offer_find_by_id");

        let entity = sqlx::query_as::<_, RideOfferEntity>(
            r#"
            SELECT id, booking_id, driver_id, offer_order, distance_km, score,
                   status, offered_at, expires_at, responded_at
            FROM ride_offers
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        timer.record();
        Ok(entity.map(RideOfferEntity::into_domain))
    }

    pub async fn require(&self, id: Uuid) -> Result<RideOffer, DispatchError> {
        self.find_by_id(id)
            .await
            .map_err(|e| DispatchError::StoreUnavailable(e.to_string()))?
            .ok_or(DispatchError::OfferNotFound(id))
    }

    pub async fn find_pending_for_booking(
        &self,
        booking_id: Uuid,
    ) -> Result<Option<RideOffer>, sqlx::Error> {
        let timer = QueryTimer::new("offer_find_pending_for_booking");

        let entity = sqlx::query_as::<_, RideOfferEntity>(
            r#"
            SELECT id, booking_id, driver_id, offer_order, distance_km, score,
                   status, offered_at, expires_at, responded_at
            FROM ride_offers
            WHERE booking_id = $1 AND status = 'pending'
            "#,
        )
        .bind(booking_id)
        .fetch_optional(&self.pool)
        .await?;

        timer.record();
        Ok(entity.map(RideOfferEntity::into_domain))
    }

    /// Every driver ever offered this booking, pending or not — the
    /// exclusion set the Dispatcher passes to `DriverIndex::candidates`
    /// so a declined or expired driver is never re-offered the same ride.
    pub async fn driver_ids_for_booking(&self, booking_id: Uuid) -> Result<Vec<Uuid>, sqlx::Error> {
        let timer = QueryTimer::new("offer_driver_ids_for_booking");

        let ids = sqlx::query_scalar("SELECT driver_id FROM ride_offers WHERE booking_id = $1")
            .bind(booking_id)
            .fetch_all(&self.pool)
            .await?;

        timer.record();
        Ok(ids)
    }

    pub async fn count_for_booking(&self, booking_id: Uuid) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("offer_count_for_booking");

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM ride_offers WHERE booking_id = $1")
            .bind(booking_id)
            .fetch_one(&self.pool)
            .await?;

        timer.record();
        Ok(count)
    }

    /// Lock the offer row `FOR UPDATE` within `tx`, serializing concurrent
    /// accept/decline/expire attempts on the same offer.
    pub async fn lock_for_update(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        offer_id: Uuid,
    ) -> Result<Option<RideOffer>, sqlx::Error> {
        let entity = sqlx::query_as::<_, RideOfferEntity>(
            r#"
            SELECT id, booking_id, driver_id, offer_order, distance_km, score,
                   status, offered_at, expires_at, responded_at
            FROM ride_offers
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(offer_id)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(entity.map(RideOfferEntity::into_domain))
    }

    pub async fn set_status(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        offer_id: Uuid,
        status: OfferStatus,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE ride_offers
            SET status = $2, responded_at = now()
            WHERE id = $1
            "#,
        )
        .bind(offer_id)
        .bind(status.as_str())
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    /// Expire all stale pending offers for a booking (ExpirySweeper /
    /// Dispatcher only). Returns the IDs that were expired.
    pub async fn expire_stale_for_booking(
        &self,
        booking_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<Uuid>, sqlx::Error> {
        let timer = QueryTimer::new("offer_expire_stale_for_booking");

        let ids: Vec<Uuid> = sqlx::query_scalar(
            r#"
            UPDATE ride_offers
            SET status = 'expired', responded_at = $2
            WHERE booking_id = $1 AND status = 'pending' AND expires_at < $2
            RETURNING id
            "#,
        )
        .bind(booking_id)
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        timer.record();
        Ok(ids)
    }

    /// Global sweep: expire every stale pending offer in the system,
    /// returning the distinct set of affected booking IDs so the
    /// ExpirySweeper can re-dispatch each one.
    pub async fn expire_all_stale(&self, now: DateTime<Utc>) -> Result<Vec<Uuid>, sqlx::Error> {
        let timer = QueryTimer::new("offer_expire_all_stale");

        let booking_ids: Vec<Uuid> = sqlx::query_scalar(
            r#"
            UPDATE ride_offers
            SET status = 'expired', responded_at = $1
            WHERE status = 'pending' AND expires_at < $1
            RETURNING booking_id
            "#,
        )
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        timer.record();
        Ok(booking_ids.into_iter().collect::<std::collections::HashSet<_>>().into_iter().collect())
    }

    /// Cancel every pending offer for a booking, used as the cascade when
    /// a booking transitions out of a state with a live pending offer.
    /// Returns the driver IDs of the cancelled offers, so the caller can
    /// notify them (P1 guarantees this is at most one driver).
    pub async fn cancel_pending_for_booking(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        booking_id: Uuid,
    ) -> Result<Vec<Uuid>, sqlx::Error> {
        let ids: Vec<Uuid> = sqlx::query_scalar(
            r#"
            UPDATE ride_offers
            SET status = 'cancelled', responded_at = now()
            WHERE booking_id = $1 AND status = 'pending'
            RETURNING driver_id
            "#,
        )
        .bind(booking_id)
        .fetch_all(&mut **tx)
        .await?;

        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_offer_carries_expected_fields() {
        let input = NewOffer {
            booking_id: Uuid::new_v4(),
            driver_id: Uuid::new_v4(),
            offer_order: 1,
            distance_km: 2.5,
            score: 88.0,
            expires_at: Utc::now(),
        };
        assert_eq!(input.offer_order, 1);
        assert!(input.score > 0.0);
    }
}
