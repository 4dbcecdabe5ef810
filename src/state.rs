//! Status transitions of a single booking
//!
//! Bookings are created in `Waiting` and leave it through one owner
//! decision. The only transition refused here is approving a booking that is
//! already approved; a rejected booking may still be approved later.
use super::error::BookingError;
use super::model::{Booking, BookingStatus};

/// Status an owner decision moves a booking into.
pub fn target_status(approved: bool) -> BookingStatus {
    if approved {
        BookingStatus::Approved
    } else {
        BookingStatus::Rejected
    }
}

/// Apply an owner decision. Returns the booking to persist.
pub fn decide(mut booking: Booking, approved: bool) -> Result<Booking, BookingError> {
    let next = target_status(approved);

    if booking.status == BookingStatus::Approved && next == BookingStatus::Approved {
        return Err(BookingError::AlreadyDecided(booking.id));
    }

    booking.status = next;
    Ok(booking)
}

/// True once an owner decision has been recorded.
pub fn is_decided(status: BookingStatus) -> bool {
    status != BookingStatus::Waiting
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TimeStamp;

    fn booking_in(status: BookingStatus) -> Booking {
        let now = TimeStamp::new();
        Booking {
            id: "booking_test".into(),
            start: now,
            end: now,
            item_id: "item_test".into(),
            booker_id: "user_test".into(),
            status,
        }
    }

    #[test]
    fn waiting_can_be_approved_or_rejected() {
        let approved = decide(booking_in(BookingStatus::Waiting), true).unwrap();
        let rejected = decide(booking_in(BookingStatus::Waiting), false).unwrap();

        assert_eq!(approved.status, BookingStatus::Approved);
        assert_eq!(rejected.status, BookingStatus::Rejected);
    }

    #[test]
    fn approving_twice_is_a_conflict() {
        let res = decide(booking_in(BookingStatus::Approved), true);
        assert!(matches!(res, Err(BookingError::AlreadyDecided(id)) if id == "booking_test"));
    }

    #[test]
    fn approved_can_still_be_rejected() {
        let res = decide(booking_in(BookingStatus::Approved), false).unwrap();
        assert_eq!(res.status, BookingStatus::Rejected);
    }

    #[test]
    fn rejected_can_be_approved() {
        let res = decide(booking_in(BookingStatus::Rejected), true).unwrap();
        assert_eq!(res.status, BookingStatus::Approved);
    }

    #[test]
    fn waiting_is_the_only_undecided_status() {
        assert!(!is_decided(BookingStatus::Waiting));
        assert!(is_decided(BookingStatus::Approved));
        assert!(is_decided(BookingStatus::Rejected));
    }
}
