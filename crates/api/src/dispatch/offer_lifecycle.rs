//! OfferLifecycle: accept/decline transitions on a single offer, plus the
//! cancellation cascade, with row-level locking serializing concurrent
//! responses to the same offer (§5).

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use domain::models::{BookingStatus, OfferStatus, RideOffer};
use domain::services::{DispatchEvent, EventSink};
use domain::DispatchError;
use persistence::repositories::{BookingStore, DriverStore, NotificationStore, OfferStore};

use super::dispatcher::Dispatcher;
use super::emitter::emit;
use crate::middleware::metrics::record_offer_accepted;

pub struct OfferLifecycle {
    booking_store: Arc<BookingStore>,
    driver_store: Arc<DriverStore>,
    offer_store: Arc<OfferStore>,
    notification_store: Arc<NotificationStore>,
    event_sink: Arc<dyn EventSink>,
    dispatcher: Arc<Dispatcher>,
}

impl OfferLifecycle {
    pub fn new(
        booking_store: Arc<BookingStore>,
        driver_store: Arc<DriverStore>,
        offer_store: Arc<OfferStore>,
        notification_store: Arc<NotificationStore>,
        event_sink: Arc<dyn EventSink>,
        dispatcher: Arc<Dispatcher>,
    ) -> Self {
        Self {
            booking_store,
            driver_store,
            offer_store,
            notification_store,
            event_sink,
            dispatcher,
        }
    }

    /// §4.6 Accept.
    pub async fn accept(&self, offer_id: Uuid, driver_id: Uuid) -> Result<RideOffer, DispatchError> {
        let pool = self.offer_store.pool().clone();
        let mut tx = pool.begin().await.map_err(store_err)?;

        let offer = self
            .offer_store
            .lock_for_update(&mut tx, offer_id)
            .await
            .map_err(store_err)?
            .ok_or(DispatchError::OfferNotFound(offer_id))?;

        if offer.driver_id != driver_id {
            return Err(DispatchError::DriverIneligible(driver_id));
        }
        if offer.status != OfferStatus::Pending {
            return Err(DispatchError::OfferGone(offer_id));
        }

        let now = Utc::now();
        if now > offer.expires_at {
            self.offer_store
                .set_status(&mut tx, offer_id, OfferStatus::Expired)
                .await
                .map_err(store_err)?;
            tx.commit().await.map_err(store_err)?;
            return Err(DispatchError::OfferExpired(offer_id));
        }

        self.offer_store
            .set_status(&mut tx, offer_id, OfferStatus::Accepted)
            .await
            .map_err(store_err)?;
        self.booking_store
            .assign_driver(&mut tx, offer.booking_id, driver_id)
            .await
            .map_err(store_err)?;
        // Driver-busy mechanism (§9 open question, resolved): clearing
        // `is_online` on accept is the authoritative write; DriverIndex's
        // active-booking exclusion is defense in depth, not relied upon alone.
        self.driver_store.mark_busy(&mut tx, driver_id).await.map_err(store_err)?;

        tx.commit().await.map_err(store_err)?;
        record_offer_accepted();

        let booking = self.booking_store.require(offer.booking_id).await?;
        emit(
            &self.event_sink,
            &self.notification_store,
            offer.booking_id,
            DispatchEvent::DriverAssigned {
                rider_id: booking.rider_id,
                booking_id: offer.booking_id,
                driver_id,
            },
        )
        .await;
        emit(
            &self.event_sink,
            &self.notification_store,
            offer.booking_id,
            DispatchEvent::RideConfirmed {
                driver_id,
                booking_id: offer.booking_id,
            },
        )
        .await;

        let mut accepted = offer;
        accepted.status = OfferStatus::Accepted;
        accepted.responded_at = Some(now);
        Ok(accepted)
    }

    /// §4.6 Decline. When `dispatch_next`, re-enters the Dispatcher for
    /// the parent booking and returns whatever it produces.
    pub async fn decline(
        &self,
        offer_id: Uuid,
        driver_id: Uuid,
        dispatch_next: bool,
    ) -> Result<Option<RideOffer>, DispatchError> {
        let pool = self.offer_store.pool().clone();
        let mut tx = pool.begin().await.map_err(store_err)?;

        let offer = self
            .offer_store
            .lock_for_update(&mut tx, offer_id)
            .await
            .map_err(store_err)?
            .ok_or(DispatchError::OfferNotFound(offer_id))?;

        if offer.driver_id != driver_id {
            return Err(DispatchError::DriverIneligible(driver_id));
        }
        if offer.status != OfferStatus::Pending {
            return Err(DispatchError::OfferGone(offer_id));
        }

        self.offer_store
            .set_status(&mut tx, offer_id, OfferStatus::Declined)
            .await
            .map_err(store_err)?;

        tx.commit().await.map_err(store_err)?;

        if dispatch_next {
            self.dispatcher.dispatch(offer.booking_id).await
        } else {
            Ok(None)
        }
    }

    /// §4.2 cancellation cascade: the booking moves to `cancelled` and any
    /// live pending offer is cancelled (not declined) in the same unit.
    pub async fn cancel_booking(&self, booking_id: Uuid) -> Result<(), DispatchError> {
        let booking = self.booking_store.require(booking_id).await?;
        if booking.status.is_terminal() {
            return Err(DispatchError::BookingTerminal(booking_id));
        }

        let cancelled_offer_driver_id = self
            .offer_store
            .find_pending_for_booking(booking_id)
            .await
            .map_err(store_err)?
            .map(|o| o.driver_id);

        let pool = self.booking_store.pool().clone();
        let mut tx = pool.begin().await.map_err(store_err)?;

        self.booking_store.cancel_in_tx(&mut tx, booking_id).await.map_err(store_err)?;
        self.offer_store
            .cancel_pending_for_booking(&mut tx, booking_id)
            .await
            .map_err(store_err)?;

        tx.commit().await.map_err(store_err)?;

        emit(
            &self.event_sink,
            &self.notification_store,
            booking_id,
            DispatchEvent::RideCancelled {
                recipient: booking.rider_id,
                booking_id,
            },
        )
        .await;
        if let Some(driver_id) = booking.driver_id {
            emit(
                &self.event_sink,
                &self.notification_store,
                booking_id,
                DispatchEvent::RideCancelled {
                    recipient: driver_id,
                    booking_id,
                },
            )
            .await;
        } else if let Some(pending_driver_id) = cancelled_offer_driver_id {
            emit(
                &self.event_sink,
                &self.notification_store,
                booking_id,
                DispatchEvent::RideCancelled {
                    recipient: pending_driver_id,
                    booking_id,
                },
            )
            .await;
        }

        Ok(())
    }

    /// §6 `CompleteBooking`: only valid from `in_progress`.
    pub async fn complete_booking(&self, booking_id: Uuid) -> Result<(), DispatchError> {
        let booking = self.booking_store.require(booking_id).await?;
        if booking.status != BookingStatus::InProgress {
            return Err(DispatchError::BookingTerminal(booking_id));
        }

        self.booking_store.complete(booking_id).await.map_err(store_err)?;

        emit(
            &self.event_sink,
            &self.notification_store,
            booking_id,
            DispatchEvent::RideCompleted {
                rider_id: booking.rider_id,
                booking_id,
            },
        )
        .await;

        Ok(())
    }

    /// Driver has arrived at pickup: `driver_assigned -> driver_arrived`.
    /// Not one of §6's named inbound interfaces, but required to ever
    /// reach `in_progress`/`completed` per the §4.2 transition table.
    pub async fn mark_driver_arrived(&self, booking_id: Uuid) -> Result<(), DispatchError> {
        let booking = self.booking_store.require(booking_id).await?;
        if !booking
            .status
            .can_transition_to(BookingStatus::DriverArrived)
        {
            return Err(DispatchError::BookingTerminal(booking_id));
        }
        self.booking_store
            .set_status(booking_id, BookingStatus::DriverArrived)
            .await
            .map_err(store_err)
    }

    /// Ride starts: `driver_arrived -> in_progress`.
    pub async fn start_ride(&self, booking_id: Uuid) -> Result<(), DispatchError> {
        let booking = self.booking_store.require(booking_id).await?;
        if !booking
            .status
            .can_transition_to(BookingStatus::InProgress)
        {
            return Err(DispatchError::BookingTerminal(booking_id));
        }
        self.booking_store
            .set_status(booking_id, BookingStatus::InProgress)
            .await
            .map_err(store_err)
    }
}

fn store_err(e: sqlx::Error) -> DispatchError {
    DispatchError::StoreUnavailable(e.to_string())
}
