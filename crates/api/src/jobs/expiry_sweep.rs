//! ExpirySweeper: periodic task that expires timed-out pending offers
//! and re-dispatches their bookings.

use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

use domain::models::BookingStatus;
use persistence::repositories::{BookingStore, OfferStore};

use super::scheduler::{Job, JobFrequency};
use crate::dispatch::Dispatcher;

/// Single-writer discipline: this job is registered once in `main`, so
/// only one sweeper instance runs at a time in this process.
pub struct ExpirySweeper {
    booking_store: Arc<BookingStore>,
    offer_store: Arc<OfferStore>,
    dispatcher: Arc<Dispatcher>,
    sweep_interval_secs: u64,
}

impl ExpirySweeper {
    pub fn new(
        booking_store: Arc<BookingStore>,
        offer_store: Arc<OfferStore>,
        dispatcher: Arc<Dispatcher>,
        sweep_interval_secs: u64,
    ) -> Self {
        Self {
            booking_store,
            offer_store,
            dispatcher,
            sweep_interval_secs,
        }
    }
}

#[async_trait::async_trait]
impl Job for ExpirySweeper {
    fn name(&self) -> &'static str {
        "expiry_sweeper"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Seconds(self.sweep_interval_secs)
    }

    async fn execute(&self) -> Result<(), String> {
        let expired_bookings = self
            .offer_store
            .expire_all_stale(Utc::now())
            .await
            .map_err(|e| e.to_string())?;

        if expired_bookings.is_empty() {
            return Ok(());
        }

        info!(count = expired_bookings.len(), "expired stale pending offers");

        for booking_id in expired_bookings {
            let booking = match self.booking_store.find_by_id(booking_id).await {
                Ok(Some(b)) => b,
                Ok(None) => continue,
                Err(e) => {
                    warn!(booking_id = %booking_id, error = %e, "failed to load booking after sweep");
                    continue;
                }
            };

            if booking.status != BookingStatus::SearchingDriver {
                continue;
            }

            if let Err(e) = self.dispatcher.dispatch(booking_id).await {
                warn!(booking_id = %booking_id, error = %e, "re-dispatch after expiry failed");
            }
        }

        Ok(())
    }
}
