//! Shared event-emission helper used by the Dispatcher and OfferLifecycle.
//!
//! Every driver-directed event is durably recorded as a `DriverNotification`
//! row before it is posted to the push sink, so a reconnecting driver
//! client recovers the event even when the push itself never arrives.

use std::sync::Arc;

use uuid::Uuid;

use domain::models::DriverNotificationType;
use domain::services::{DeliveryResult, DispatchEvent, EventSink};
use persistence::repositories::{NewDriverNotification, NotificationStore};

pub async fn emit(
    event_sink: &Arc<dyn EventSink>,
    notification_store: &NotificationStore,
    booking_id: Uuid,
    event: DispatchEvent,
) {
    let body = event_body(&event);

    if event.is_driver_directed() {
        let notification_type = match &event {
            DispatchEvent::RideCancelled { .. } => DriverNotificationType::RideCancelled,
            _ => DriverNotificationType::RideUpdated,
        };
        if let Err(e) = notification_store
            .create(NewDriverNotification {
                driver_id: event.recipient(),
                booking_id: Some(booking_id),
                notification_type,
                title: event.title().to_string(),
                message: body.clone(),
            })
            .await
        {
            tracing::warn!(
                booking_id = %booking_id,
                error = %e,
                "failed to persist driver notification"
            );
        }
    }

    let data = serde_json::to_value(&event).unwrap_or(serde_json::Value::Null);
    let result = event_sink
        .send(event.recipient(), event.title(), &body, data)
        .await;

    if let DeliveryResult::Failed(reason) = result {
        tracing::warn!(
            booking_id = %booking_id,
            recipient = %event.recipient(),
            reason = %reason,
            "event delivery to push sink failed; state transition already committed"
        );
    }
}

fn event_body(event: &DispatchEvent) -> String {
    match event {
        DispatchEvent::OfferExtended { expires_at, .. } => {
            format!("New ride request, respond by {expires_at}")
        }
        DispatchEvent::DriverAssigned { driver_id, .. } => {
            format!("Driver {driver_id} has been assigned to your ride")
        }
        DispatchEvent::RideConfirmed { .. } => "You accepted the ride".to_string(),
        DispatchEvent::RideCompleted { .. } => "Your ride is complete".to_string(),
        DispatchEvent::RideCancelled { .. } => "This ride was cancelled".to_string(),
    }
}
