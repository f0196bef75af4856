//! Dispatcher: orchestrates DriverIndex -> Scorer -> OfferStore and
//! decides when a booking's search terminates without a driver.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use domain::models::{BookingStatus, RideOffer};
use domain::services::{DispatchEvent, DriverSignals, EventSink, Scorer};
use domain::DispatchError;
use persistence::repositories::{BookingStore, DriverStore, NewOffer, NotificationStore, OfferStore};

use super::emitter::emit;
use crate::middleware::metrics::{record_no_driver_found, record_offer_created};

/// Tunables the Dispatcher needs beyond the scoring radius (see
/// `config::DispatchConfig`).
#[derive(Debug, Clone, Copy)]
pub struct DispatchTunables {
    pub offer_timeout_secs: i64,
    pub max_offers_per_booking: i64,
}

pub struct Dispatcher {
    booking_store: Arc<BookingStore>,
    driver_store: Arc<DriverStore>,
    offer_store: Arc<OfferStore>,
    notification_store: Arc<NotificationStore>,
    event_sink: Arc<dyn EventSink>,
    scorer: Scorer,
    tunables: DispatchTunables,
}

impl Dispatcher {
    pub fn new(
        booking_store: Arc<BookingStore>,
        driver_store: Arc<DriverStore>,
        offer_store: Arc<OfferStore>,
        notification_store: Arc<NotificationStore>,
        event_sink: Arc<dyn EventSink>,
        max_search_radius_km: f64,
        tunables: DispatchTunables,
    ) -> Self {
        Self {
            booking_store,
            driver_store,
            offer_store,
            notification_store,
            event_sink,
            scorer: Scorer::new(max_search_radius_km),
            tunables,
        }
    }

    /// §4.5: advance a booking's search by one offer, or decide it has
    /// exhausted its candidates.
    pub async fn dispatch(&self, booking_id: Uuid) -> Result<Option<RideOffer>, DispatchError> {
        let now = Utc::now();

        // (a) expire stale pending offers for this booking.
        self.offer_store
            .expire_stale_for_booking(booking_id, now)
            .await
            .map_err(store_err)?;

        let booking = self.booking_store.require(booking_id).await?;
        match booking.status {
            BookingStatus::Pending => {
                self.booking_store
                    .set_status(booking_id, BookingStatus::SearchingDriver)
                    .await
                    .map_err(store_err)?;
            }
            BookingStatus::SearchingDriver => {}
            // Terminal, or already has an assigned driver: nothing to do.
            _ => return Ok(None),
        }

        // (b) offer budget.
        let existing_count = self
            .offer_store
            .count_for_booking(booking_id)
            .await
            .map_err(store_err)?;
        if existing_count >= self.tunables.max_offers_per_booking {
            self.exhaust(booking_id).await?;
            return Ok(None);
        }

        // (c) candidates, excluding every driver ever offered this booking.
        let exclude_ids = self
            .offer_store
            .driver_ids_for_booking(booking_id)
            .await
            .map_err(store_err)?;
        let candidates = self.driver_store.candidates(&exclude_ids).await.map_err(store_err)?;

        // (d) score and rank.
        let mut scored = Vec::with_capacity(candidates.len());
        for driver in &candidates {
            let (lat, lon) = match (driver.current_lat, driver.current_lon) {
                (Some(lat), Some(lon)) => (lat, lon),
                _ => continue,
            };
            let acceptance_rate = self
                .driver_store
                .acceptance_rate_7d(driver.id)
                .await
                .map_err(store_err)?;
            let idle_minutes = self.driver_store.idle_minutes(driver.id).await.map_err(store_err)?;

            let signals = DriverSignals {
                rating: Some(driver.rating),
                acceptance_rate,
                idle_minutes,
            };

            if let Some(candidate) = self.scorer.score(
                driver.id,
                lat,
                lon,
                booking.pickup_lat,
                booking.pickup_lon,
                signals,
            ) {
                scored.push(candidate);
            }
        }
        let ranked = self.scorer.rank(scored);

        // (e) exhaustion: no eligible candidate survived the radius cutoff.
        let Some(top) = ranked.into_iter().next() else {
            self.exhaust(booking_id).await?;
            return Ok(None);
        };

        // (f) create the next offer.
        let expires_at = now + chrono::Duration::seconds(self.tunables.offer_timeout_secs);
        let new_offer = NewOffer {
            booking_id,
            driver_id: top.driver_id,
            offer_order: (existing_count + 1) as i32,
            distance_km: top.distance_km,
            score: top.composite_score,
            expires_at,
        };

        match self.offer_store.create_pending(new_offer).await {
            Ok(offer) => {
                emit(
                    &self.event_sink,
                    &self.notification_store,
                    booking_id,
                    DispatchEvent::OfferExtended {
                        driver_id: offer.driver_id,
                        booking_id,
                        expires_at: offer.expires_at,
                    },
                )
                .await;
                record_offer_created();
                Ok(Some(offer))
            }
            // A concurrent dispatch won the race to the partial unique
            // index; re-read and hand back the offer it created instead
            // of erroring the caller.
            Err(DispatchError::RaceLost(_)) => {
                let existing = self
                    .offer_store
                    .find_pending_for_booking(booking_id)
                    .await
                    .map_err(store_err)?;
                Ok(existing)
            }
            Err(e) => Err(e),
        }
    }

    async fn exhaust(&self, booking_id: Uuid) -> Result<(), DispatchError> {
        self.booking_store
            .set_status(booking_id, BookingStatus::NoDriverFound)
            .await
            .map_err(store_err)?;
        record_no_driver_found();
        Ok(())
    }
}

fn store_err(e: sqlx::Error) -> DispatchError {
    DispatchError::StoreUnavailable(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tunables_are_plain_copy_data() {
        let t = DispatchTunables {
            offer_timeout_secs: 20,
            max_offers_per_booking: 10,
        };
        let t2 = t;
        assert_eq!(t2.offer_timeout_secs, 20);
    }
}
