//! Offer response endpoints: accept and decline.

use axum::{extract::{Path, State}, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use domain::models::RideOffer;

use crate::app::AppState;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptOfferRequest {
    pub driver_id: Uuid,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptOfferResponse {
    pub offer: RideOffer,
}

/// `AcceptOffer(driver_id, offer_id)`.
pub async fn accept_offer(
    State(state): State<AppState>,
    Path(offer_id): Path<Uuid>,
    Json(payload): Json<AcceptOfferRequest>,
) -> Result<Json<AcceptOfferResponse>, ApiError> {
    let offer = state.offer_lifecycle.accept(offer_id, payload.driver_id).await?;
    Ok(Json(AcceptOfferResponse { offer }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeclineOfferRequest {
    pub driver_id: Uuid,
    /// Whether to immediately re-enter the Dispatcher for the parent
    /// booking. Defaults to `true`; the ExpirySweeper and other callers
    /// can pass `false` when they want to batch re-dispatch separately.
    #[serde(default = "default_true")]
    pub dispatch_next: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeclineOfferResponse {
    pub next_offer: Option<RideOffer>,
}

/// `DeclineOffer(driver_id, offer_id)`.
pub async fn decline_offer(
    State(state): State<AppState>,
    Path(offer_id): Path<Uuid>,
    Json(payload): Json<DeclineOfferRequest>,
) -> Result<Json<DeclineOfferResponse>, ApiError> {
    let next_offer = state
        .offer_lifecycle
        .decline(offer_id, payload.driver_id, payload.dispatch_next)
        .await?;
    Ok(Json(DeclineOfferResponse { next_offer }))
}
