//! Driver location and availability endpoints.

use axum::{extract::{Path, State}, Json};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use shared::validation::{validate_latitude, validate_longitude};

use crate::app::AppState;
use crate::error::ApiError;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDriverLocationRequest {
    #[validate(custom(function = "validate_latitude"))]
    pub lat: f64,
    #[validate(custom(function = "validate_longitude"))]
    pub lon: f64,
}

/// `UpdateDriverLocation(driver_id, lat, lon)`.
pub async fn update_location(
    State(state): State<AppState>,
    Path(driver_id): Path<Uuid>,
    Json(payload): Json<UpdateDriverLocationRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    payload.validate()?;
    state.driver_store.require(driver_id).await?;
    state
        .driver_store
        .update_location(driver_id, payload.lat, payload.lon)
        .await?;
    Ok(Json(serde_json::json!({ "status": "ok" })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetDriverOnlineRequest {
    pub online: bool,
}

/// `SetDriverOnline(driver_id, bool)`, gated on the eligibility invariants
/// (approved, docs complete, OTP verified) when going online — a driver
/// can always go offline.
pub async fn set_online(
    State(state): State<AppState>,
    Path(driver_id): Path<Uuid>,
    Json(payload): Json<SetDriverOnlineRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let driver = state.driver_store.require(driver_id).await?;

    if payload.online && !(driver.is_approved && driver.docs_complete && driver.otp_verified) {
        return Err(ApiError::Forbidden(format!(
            "driver {driver_id} is not eligible to go online"
        )));
    }

    state.driver_store.set_online(driver_id, payload.online).await?;
    Ok(Json(serde_json::json!({ "online": payload.online })))
}
