//! DriverStore: driver records plus the DriverIndex candidate query.

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use domain::models::Driver;
use domain::DispatchError;

use crate::entities::DriverEntity;
use crate::metrics::QueryTimer;

/// Location freshness window used by the candidate query, mirroring
/// `domain::models::driver::LOCATION_FRESHNESS_SECONDS`.
const LOCATION_FRESHNESS_SECONDS: i64 = domain::models::driver::LOCATION_FRESHNESS_SECONDS;

#[derive(Debug, Clone)]
pub struct DriverStore {
    pool: PgPool,
}

impl DriverStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Driver>, sqlx::Error> {
        let timer = QueryTimer::new("driver_find_by_id");

        let entity = sqlx::query_as::<_, DriverEntity>(
            r#"
            SELECT
                id, phone, full_name, vehicle_type, vehicle_number, is_approved,
                is_online, docs_complete, otp_verified, current_lat, current_lon,
                location_updated_at, rating, total_trips
            FROM drivers
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        timer.record();
        Ok(entity.map(DriverEntity::into_domain))
    }

    pub async fn require(&self, id: Uuid) -> Result<Driver, DispatchError> {
        self.find_by_id(id)
            .await
            .map_err(|e| DispatchError::StoreUnavailable(e.to_string()))?
            .ok_or(DispatchError::DriverNotFound(id))
    }

    /// DriverIndex.candidates: online, approved, docs-complete, OTP-verified
    /// drivers with a recent location, excluding `exclude_ids` and any
    /// driver currently holding an active booking.
    pub async fn candidates(
        &self,
        exclude_ids: &[Uuid],
    ) -> Result<Vec<Driver>, sqlx::Error> {
        let timer = QueryTimer::new("driver_candidates");

        let entities = sqlx::query_as::<_, DriverEntity>(
            r#"
            SELECT
                d.id, d.phone, d.full_name, d.vehicle_type, d.vehicle_number, d.is_approved,
                d.is_online, d.docs_complete, d.otp_verified, d.current_lat, d.current_lon,
                d.location_updated_at, d.rating, d.total_trips
            FROM drivers d
            WHERE d.is_online
              AND d.is_approved
              AND d.docs_complete
              AND d.otp_verified
              AND d.current_lat IS NOT NULL
              AND d.current_lon IS NOT NULL
              AND d.location_updated_at IS NOT NULL
              AND d.location_updated_at >= $1
              AND NOT (d.id = ANY($2))
              AND NOT EXISTS (
                  SELECT 1 FROM bookings b
                  WHERE b.driver_id = d.id
                    AND b.status IN ('driver_assigned', 'driver_arrived', 'in_progress')
              )
            "#,
        )
        .bind(Utc::now() - chrono::Duration::seconds(LOCATION_FRESHNESS_SECONDS))
        .bind(exclude_ids)
        .fetch_all(&self.pool)
        .await?;

        timer.record();
        Ok(entities.into_iter().map(DriverEntity::into_domain).collect())
    }

    pub async fn set_online(&self, driver_id: Uuid, online: bool) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("driver_set_online");

        sqlx::query("UPDATE drivers SET is_online = $2 WHERE id = $1")
            .bind(driver_id)
            .bind(online)
            .execute(&self.pool)
            .await?;

        timer.record();
        Ok(())
    }

    /// Set `is_online = false` as the authoritative busy signal when an
    /// offer is accepted (see the design note on the driver-busy mechanism).
    pub async fn mark_busy(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        driver_id: Uuid,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE drivers SET is_online = false WHERE id = $1")
            .bind(driver_id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    pub async fn update_location(&self, driver_id: Uuid, lat: f64, lon: f64) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("driver_update_location");

        sqlx::query(
            r#"
            UPDATE drivers
            SET current_lat = $2, current_lon = $3, location_updated_at = $4
            WHERE id = $1
            "#,
        )
        .bind(driver_id)
        .bind(lat)
        .bind(lon)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        timer.record();
        Ok(())
    }

    /// Acceptance rate over the trailing 7 days, as a percentage, or
    /// `None` when the driver has no offer history in that window.
    pub async fn acceptance_rate_7d(&self, driver_id: Uuid) -> Result<Option<f64>, sqlx::Error> {
        let timer = QueryTimer::new("driver_acceptance_rate_7d");

        let row: Option<(i64, i64)> = sqlx::query_as(
            r#"
            SELECT
                COUNT(*) FILTER (WHERE status = 'accepted') AS accepted,
                COUNT(*) AS total
            FROM ride_offers
            WHERE driver_id = $1 AND offered_at >= now() - interval '7 days'
            "#,
        )
        .bind(driver_id)
        .fetch_optional(&self.pool)
        .await?;

        timer.record();
        match row {
            Some((_, 0)) | None => Ok(None),
            Some((accepted, total)) => Ok(Some(100.0 * accepted as f64 / total as f64)),
        }
    }

    /// Minutes since this driver's last completed booking, or `None`
    /// when the driver has never completed one.
    pub async fn idle_minutes(&self, driver_id: Uuid) -> Result<Option<f64>, sqlx::Error> {
        let timer = QueryTimer::new("driver_idle_minutes");

        let last_completed: Option<chrono::DateTime<Utc>> = sqlx::query_scalar(
            r#"
            SELECT completed_at FROM bookings
            WHERE driver_id = $1 AND status = 'completed' AND completed_at IS NOT NULL
            ORDER BY completed_at DESC
            LIMIT 1
            "#,
        )
        .bind(driver_id)
        .fetch_optional(&self.pool)
        .await?;

        timer.record();
        Ok(last_completed.map(|ts| (Utc::now() - ts).num_seconds() as f64 / 60.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_freshness_constant_matches_domain() {
        assert_eq!(LOCATION_FRESHNESS_SECONDS, 120);
    }
}
