//! Domain services for the ride-dispatch core.
//!
//! Services contain the pure and stateless business logic that operates
//! on domain models; persistence and orchestration live above this crate.

pub mod event_sink;
pub mod geomath;
pub mod scorer;

pub use event_sink::{DeliveryResult, DispatchEvent, EventSink, LoggingEventSink, MockEventSink};
pub use geomath::distance_km;
pub use scorer::{DriverSignals, ScoredCandidate, Scorer, DEFAULT_MAX_SEARCH_RADIUS_KM};
