//! Repository implementations for database operations.

pub mod booking_store;
pub mod driver_store;
pub mod notification_store;
pub mod offer_store;

pub use booking_store::{BookingStore, CreateBookingInput};
pub use driver_store::DriverStore;
pub use notification_store::{NewDriverNotification, NotificationStore};
pub use offer_store::{NewOffer, OfferStore};
