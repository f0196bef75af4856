//! Booking entity and its status state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use shared::validation::{validate_latitude, validate_longitude, validate_non_negative};

/// Status of a booking, per the booking lifecycle state machine.
///
/// `pending` is a reachable variant but the default creation path
/// (`CreateBooking`) skips straight to `searching_driver`; it is retained
/// for callers that stage a booking before its first dispatch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    SearchingDriver,
    DriverAssigned,
    DriverArrived,
    InProgress,
    Completed,
    Cancelled,
    NoDriverFound,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::SearchingDriver => "searching_driver",
            Self::DriverAssigned => "driver_assigned",
            Self::DriverArrived => "driver_arrived",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::NoDriverFound => "no_driver_found",
        }
    }

    /// Terminal states accept no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::NoDriverFound)
    }

    /// A driver is attached to the booking in exactly these states.
    pub fn has_assigned_driver(&self) -> bool {
        matches!(self, Self::DriverAssigned | Self::DriverArrived | Self::InProgress)
    }

    pub fn can_transition_to(&self, next: Self) -> bool {
        if self.is_terminal() {
            return false;
        }
        if next == Self::Cancelled {
            return true;
        }
        match (self, next) {
            (Self::Pending, Self::SearchingDriver) => true,
            (Self::SearchingDriver, Self::DriverAssigned) => true,
            (Self::SearchingDriver, Self::NoDriverFound) => true,
            (Self::DriverAssigned, Self::DriverArrived) => true,
            (Self::DriverArrived, Self::InProgress) => true,
            (Self::InProgress, Self::Completed) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "searching_driver" => Ok(Self::SearchingDriver),
            "driver_assigned" => Ok(Self::DriverAssigned),
            "driver_arrived" => Ok(Self::DriverArrived),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            "no_driver_found" => Ok(Self::NoDriverFound),
            other => Err(format!("unknown booking status: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RideClass {
    Standard,
    Xl,
    Premium,
}

impl RideClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Xl => "xl",
            Self::Premium => "premium",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Card,
    MobileMoney,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Card => "card",
            Self::MobileMoney => "mobile_money",
        }
    }
}

/// A ride booking. `driver_id` is set iff `status.has_assigned_driver()`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,
    pub rider_id: Uuid,
    pub driver_id: Option<Uuid>,
    pub pickup_address: String,
    pub pickup_lat: f64,
    pub pickup_lon: f64,
    pub destination_address: String,
    pub destination_lat: f64,
    pub destination_lon: f64,
    pub ride_class: RideClass,
    pub fare: f64,
    pub distance_km: f64,
    pub duration_min: f64,
    pub payment_method: PaymentMethod,
    pub payment_completed: bool,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub rider_id: Uuid,
    #[validate(length(min = 1, max = 255))]
    pub pickup_address: String,
    #[validate(custom(function = "validate_latitude"))]
    pub pickup_lat: f64,
    #[validate(custom(function = "validate_longitude"))]
    pub pickup_lon: f64,
    #[validate(length(min = 1, max = 255))]
    pub destination_address: String,
    #[validate(custom(function = "validate_latitude"))]
    pub destination_lat: f64,
    #[validate(custom(function = "validate_longitude"))]
    pub destination_lon: f64,
    pub ride_class: RideClass,
    #[validate(custom(function = "validate_non_negative"))]
    pub fare: f64,
    #[validate(custom(function = "validate_non_negative"))]
    pub distance_km: f64,
    #[validate(custom(function = "validate_non_negative"))]
    pub duration_min: f64,
    pub payment_method: PaymentMethod,
}
