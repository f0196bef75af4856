//! Booking lifecycle endpoints: create, cancel, complete, and the two
//! supplemental pickup/ride-start transitions, plus the tracking read model.

use axum::{extract::{Path, State}, Json};
use serde::Serialize;
use uuid::Uuid;
use validator::Validate;

use domain::models::{Booking, CreateBookingRequest};
use persistence::repositories::CreateBookingInput;

use crate::app::AppState;
use crate::error::ApiError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingResponse {
    pub booking: Booking,
}

/// `CreateBooking`: persists the booking in `searching_driver` and hands
/// it straight to the Dispatcher for its first offer attempt.
pub async fn create_booking(
    State(state): State<AppState>,
    Json(payload): Json<CreateBookingRequest>,
) -> Result<Json<CreateBookingResponse>, ApiError> {
    payload.validate()?;

    let booking = state
        .booking_store
        .create(CreateBookingInput {
            rider_id: payload.rider_id,
            pickup_address: payload.pickup_address,
            pickup_lat: payload.pickup_lat,
            pickup_lon: payload.pickup_lon,
            destination_address: payload.destination_address,
            destination_lat: payload.destination_lat,
            destination_lon: payload.destination_lon,
            ride_class: payload.ride_class.as_str().to_string(),
            fare: payload.fare,
            distance_km: payload.distance_km,
            duration_min: payload.duration_min,
            payment_method: payload.payment_method.as_str().to_string(),
        })
        .await?;

    state.dispatcher.dispatch(booking.id).await?;
    let booking = state.booking_store.require(booking.id).await?;

    Ok(Json(CreateBookingResponse { booking }))
}

/// `CancelBooking`: cancel transition plus the pending-offer cascade.
pub async fn cancel_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.offer_lifecycle.cancel_booking(booking_id).await?;
    Ok(Json(serde_json::json!({ "status": "cancelled" })))
}

/// `CompleteBooking`: only valid from `in_progress`.
pub async fn complete_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.offer_lifecycle.complete_booking(booking_id).await?;
    Ok(Json(serde_json::json!({ "status": "completed" })))
}

/// Driver has arrived at pickup (`driver_assigned -> driver_arrived`).
pub async fn mark_driver_arrived(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.offer_lifecycle.mark_driver_arrived(booking_id).await?;
    Ok(Json(serde_json::json!({ "status": "driver_arrived" })))
}

/// Ride starts (`driver_arrived -> in_progress`).
pub async fn start_ride(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.offer_lifecycle.start_ride(booking_id).await?;
    Ok(Json(serde_json::json!({ "status": "in_progress" })))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingResponse {
    pub booking_id: Uuid,
    pub status: String,
    pub pickup_lat: f64,
    pub pickup_lon: f64,
    pub destination_lat: f64,
    pub destination_lon: f64,
    pub driver: Option<DriverLocation>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverLocation {
    pub driver_id: Uuid,
    pub full_name: String,
    pub vehicle_type: String,
    pub vehicle_number: String,
    pub current_lat: Option<f64>,
    pub current_lon: Option<f64>,
}

/// `Tracking(booking_id)`: the read-only projection of booking status,
/// pickup/destination, and the assigned driver's last-reported location.
/// Reads through to the stores directly; no cache sits in front of it.
pub async fn tracking(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<TrackingResponse>, ApiError> {
    let booking = state.booking_store.require(booking_id).await?;

    let driver = match booking.driver_id {
        Some(driver_id) => {
            let d = state.driver_store.require(driver_id).await?;
            Some(DriverLocation {
                driver_id: d.id,
                full_name: d.full_name,
                vehicle_type: d.vehicle_type,
                vehicle_number: d.vehicle_number,
                current_lat: d.current_lat,
                current_lon: d.current_lon,
            })
        }
        None => None,
    };

    Ok(Json(TrackingResponse {
        booking_id: booking.id,
        status: booking.status.as_str().to_string(),
        pickup_lat: booking.pickup_lat,
        pickup_lon: booking.pickup_lon,
        destination_lat: booking.destination_lat,
        destination_lon: booking.destination_lon,
        driver,
    }))
}
