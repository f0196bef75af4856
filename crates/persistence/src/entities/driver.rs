//! Driver entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use domain::models::Driver;

#[derive(Debug, Clone, FromRow)]
pub struct DriverEntity {
    pub id: Uuid,
    pub phone: String,
    pub full_name: String,
    pub vehicle_type: String,
    pub vehicle_number: String,
    pub is_approved: bool,
    pub is_online: bool,
    pub docs_complete: bool,
    pub otp_verified: bool,
    pub current_lat: Option<f64>,
    pub current_lon: Option<f64>,
    pub location_updated_at: Option<DateTime<Utc>>,
    pub rating: f64,
    pub total_trips: i64,
}

impl DriverEntity {
    pub fn into_domain(self) -> Driver {
        Driver {
            id: self.id,
            phone: self.phone,
            full_name: self.full_name,
            vehicle_type: self.vehicle_type,
            vehicle_number: self.vehicle_number,
            is_approved: self.is_approved,
            is_online: self.is_online,
            docs_complete: self.docs_complete,
            otp_verified: self.otp_verified,
            current_lat: self.current_lat,
            current_lon: self.current_lon,
            location_updated_at: self.location_updated_at,
            rating: self.rating,
            total_trips: self.total_trips,
        }
    }
}

impl From<DriverEntity> for Driver {
    fn from(entity: DriverEntity) -> Self {
        entity.into_domain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_to_domain_driver() {
        let entity = DriverEntity {
            id: Uuid::new_v4(),
            phone: "+10000000000".into(),
            full_name: "Jane Driver".into(),
            vehicle_type: "standard".into(),
            vehicle_number: "ABC-123".into(),
            is_approved: true,
            is_online: true,
            docs_complete: true,
            otp_verified: true,
            current_lat: Some(1.0),
            current_lon: Some(2.0),
            location_updated_at: Some(Utc::now()),
            rating: 4.9,
            total_trips: 100,
        };
        let driver: Driver = entity.into();
        assert_eq!(driver.rating, 4.9);
        assert!(driver.is_online);
    }
}
