//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod booking;
pub mod driver;
pub mod driver_notification;
pub mod ride_offer;

pub use booking::BookingEntity;
pub use driver::DriverEntity;
pub use driver_notification::DriverNotificationEntity;
pub use ride_offer::RideOfferEntity;
