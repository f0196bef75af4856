//! Dispatch-core orchestration layer: the Dispatcher and OfferLifecycle
//! services sit here, parameterized by the persistence stores and an
//! `EventSink`, per the "stateless services" design note (§9).

mod dispatcher;
mod emitter;
mod offer_lifecycle;

pub use dispatcher::{DispatchTunables, Dispatcher};
pub use offer_lifecycle::OfferLifecycle;
