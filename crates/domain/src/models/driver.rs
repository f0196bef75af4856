//! Driver entity and eligibility rules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Location is considered fresh within this window for eligibility checks.
pub const LOCATION_FRESHNESS_SECONDS: i64 = 120;

/// A driver available to receive ride offers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Driver {
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

impl Driver {
    /// A driver's location counts as fresh if it was reported within
    /// [`LOCATION_FRESHNESS_SECONDS`] of `now`.
    pub fn location_is_fresh(&self, now: DateTime<Utc>) -> bool {
        match self.location_updated_at {
            Some(ts) => (now - ts).num_seconds() <= LOCATION_FRESHNESS_SECONDS,
            None => false,
        }
    }

    /// Eligible for a new offer iff online, approved, documents complete,
    /// OTP-verified, and location reported recently.
    pub fn is_eligible_for_offer(&self, now: DateTime<Utc>) -> bool {
        self.is_online
            && self.is_approved
            && self.docs_complete
            && self.otp_verified
            && self.current_lat.is_some()
            && self.current_lon.is_some()
            && self.location_is_fresh(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn base_driver() -> Driver {
        Driver {
            id: Uuid::new_v4(),
            phone: "+10000000000".into(),
            full_name: "Jane Driver".into(),
            vehicle_type: "standard".into(),
            vehicle_number: "ABC-123".into(),
            is_approved: true,
            is_online: true,
            docs_complete: true,
            otp_verified: true,
            current_lat: Some(0.0),
            current_lon: Some(0.0),
            location_updated_at: Some(Utc::now()),
            rating: 4.8,
            total_trips: 12,
        }
    }

    #[test]
    fn eligible_driver_passes_all_checks() {
        let now = Utc::now();
        assert!(base_driver().is_eligible_for_offer(now));
    }

    #[test]
    fn offline_driver_is_ineligible() {
        let now = Utc::now();
        let mut d = base_driver();
        d.is_online = false;
        assert!(!d.is_eligible_for_offer(now));
    }

    #[test]
    fn stale_location_is_ineligible() {
        let now = Utc::now();
        let mut d = base_driver();
        d.location_updated_at = Some(now - Duration::seconds(LOCATION_FRESHNESS_SECONDS + 1));
        assert!(!d.is_eligible_for_offer(now));
        assert!(!d.location_is_fresh(now));
    }

    #[test]
    fn missing_location_is_ineligible() {
        let now = Utc::now();
        let mut d = base_driver();
        d.current_lat = None;
        assert!(!d.is_eligible_for_offer(now));
    }

    #[test]
    fn unapproved_or_incomplete_docs_are_ineligible() {
        let now = Utc::now();
        let mut d = base_driver();
        d.is_approved = false;
        assert!(!d.is_eligible_for_offer(now));

        let mut d = base_driver();
        d.docs_complete = false;
        assert!(!d.is_eligible_for_offer(now));

        let mut d = base_driver();
        d.otp_verified = false;
        assert!(!d.is_eligible_for_offer(now));
    }
}
