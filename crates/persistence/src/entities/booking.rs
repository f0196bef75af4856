//! Booking entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use domain::models::{Booking, BookingStatus, PaymentMethod, RideClass};

#[derive(Debug, Clone, FromRow)]
pub struct BookingEntity {
    pub id: Uuid,
    pub rider_id: Uuid,
    pub driver_id: Option<Uuid>,
    pub pickup_address: String,
    pub pickup_lat: f64,
    pub pickup_lon: f64,
    pub destination_address: String,
    pub destination_lat: f64,
    pub destination_lon: f64,
    pub ride_class: String,
    pub fare: f64,
    pub distance_km: f64,
    pub duration_min: f64,
    pub payment_method: String,
    pub payment_completed: bool,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl BookingEntity {
    pub fn into_domain(self) -> Booking {
        let status = self.status.parse::<BookingStatus>().unwrap_or(BookingStatus::Pending);
        let ride_class = match self.ride_class.as_str() {
            "xl" => RideClass::Xl,
            "premium" => RideClass::Premium,
            _ => RideClass::Standard,
        };
        let payment_method = match self.payment_method.as_str() {
            "mobile_money" => PaymentMethod::MobileMoney,
            _ => PaymentMethod::Card,
        };

        Booking {
            id: self.id,
            rider_id: self.rider_id,
            driver_id: self.driver_id,
            pickup_address: self.pickup_address,
            pickup_lat: self.pickup_lat,
            pickup_lon: self.pickup_lon,
            destination_address: self.destination_address,
            destination_lat: self.destination_lat,
            destination_lon: self.destination_lon,
            ride_class,
            fare: self.fare,
            distance_km: self.distance_km,
            duration_min: self.duration_min,
            payment_method,
            payment_completed: self.payment_completed,
            status,
            created_at: self.created_at,
            updated_at: self.updated_at,
            completed_at: self.completed_at,
        }
    }
}

impl From<BookingEntity> for Booking {
    fn from(entity: BookingEntity) -> Self {
        entity.into_domain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_entity() -> BookingEntity {
        BookingEntity {
            id: Uuid::new_v4(),
            rider_id: Uuid::new_v4(),
            driver_id: None,
            pickup_address: "1 Main St".into(),
            pickup_lat: 0.0,
            pickup_lon: 0.0,
            destination_address: "2 Main St".into(),
            destination_lat: 0.01,
            destination_lon: 0.01,
            ride_class: "standard".into(),
            fare: 12.5,
            distance_km: 3.2,
            duration_min: 10.0,
            payment_method: "card".into(),
            payment_completed: false,
            status: "searching_driver".into(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            completed_at: None,
        }
    }

    #[test]
    fn maps_known_status_and_class() {
        let booking: Booking = sample_entity().into();
        assert_eq!(booking.status, BookingStatus::SearchingDriver);
        assert_eq!(booking.ride_class, RideClass::Standard);
    }

    #[test]
    fn unknown_status_defaults_to_pending() {
        let mut entity = sample_entity();
        entity.status = "bogus".into();
        let booking: Booking = entity.into();
        assert_eq!(booking.status, BookingStatus::Pending);
    }
}
