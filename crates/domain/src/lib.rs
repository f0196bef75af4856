//! Domain layer for the ride-dispatch core.
//!
//! This crate contains:
//! - Domain models (Booking, Driver, RideOffer, DriverNotification)
//! - Pure business logic services (GeoMath, Scorer, EventSink)
//! - Domain error types

pub mod error;
pub mod models;
pub mod services;

pub use error::DispatchError;
