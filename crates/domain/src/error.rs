//! Domain-level error kinds for the dispatch core, independent of any
//! transport. The HTTP layer maps these onto `ApiError` and status codes.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("booking {0} not found")]
    BookingNotFound(Uuid),

    #[error("driver {0} not found")]
    DriverNotFound(Uuid),

    #[error("offer {0} not found")]
    OfferNotFound(Uuid),

    #[error("offer {0} is no longer pending")]
    OfferGone(Uuid),

    #[error("offer {0} expired before it could be accepted")]
    OfferExpired(Uuid),

    #[error("booking {0} is in a terminal state")]
    BookingTerminal(Uuid),

    #[error("driver {0} is not eligible for this offer")]
    DriverIneligible(Uuid),

    #[error("lost race to create a pending offer for booking {0}")]
    RaceLost(Uuid),

    #[error("backing store unavailable: {0}")]
    StoreUnavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_include_the_offending_id() {
        let id = Uuid::nil();
        assert!(DispatchError::BookingNotFound(id).to_string().contains(&id.to_string()));
        assert!(DispatchError::OfferGone(id).to_string().contains("no longer pending"));
    }

    #[test]
    fn race_lost_carries_the_booking_id() {
        let id = Uuid::new_v4();
        match DispatchError::RaceLost(id) {
            DispatchError::RaceLost(got) => assert_eq!(got, id),
            other => panic!("unexpected variant: {other:?}"),
        }
    }
}
