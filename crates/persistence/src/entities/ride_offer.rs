//! RideOffer entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use domain::models::{OfferStatus, RideOffer};

#[derive(Debug, Clone, FromRow)]
pub struct RideOfferEntity {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub driver_id: Uuid,
    pub offer_order: i32,
    pub distance_km: f64,
    pub score: f64,
    pub status: String,
    pub offered_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub responded_at: Option<DateTime<Utc>>,
}

impl RideOfferEntity {
    pub fn into_domain(self) -> RideOffer {
        let status = self.status.parse::<OfferStatus>().unwrap_or(OfferStatus::Pending);
        RideOffer {
            id: self.id,
            booking_id: self.booking_id,
            driver_id: self.driver_id,
            offer_order: self.offer_order,
            distance_km: self.distance_km,
            score: self.score,
            status,
            offered_at: self.offered_at,
            expires_at: self.expires_at,
            responded_at: self.responded_at,
        }
    }
}

impl From<RideOfferEntity> for RideOffer {
    fn from(entity: RideOfferEntity) -> Self {
        entity.into_domain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_status_string_to_enum() {
        let entity = RideOfferEntity {
            id: Uuid::new_v4(),
            booking_id: Uuid::new_v4(),
            driver_id: Uuid::new_v4(),
            offer_order: 1,
            distance_km: 2.0,
            score: 91.2,
            status: "accepted".into(),
            offered_at: Utc::now(),
            expires_at: Utc::now(),
            responded_at: Some(Utc::now()),
        };
        let offer: RideOffer = entity.into();
        assert_eq!(offer.status, OfferStatus::Accepted);
    }
}
