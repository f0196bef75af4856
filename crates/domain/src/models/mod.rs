//! Domain models for the ride-dispatch core.

pub mod booking;
pub mod driver;
pub mod driver_notification;
pub mod ride_offer;

pub use booking::{Booking, BookingStatus, CreateBookingRequest, PaymentMethod, RideClass};
pub use driver::Driver;
pub use driver_notification::{DriverNotification, DriverNotificationType};
pub use ride_offer::{OfferStatus, RideOffer};
