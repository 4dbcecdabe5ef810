//! Authorization checks for booking operations
use super::error::BookingError;
use super::model::{BookingDetails, Item};

/// A booker may reserve an available item they do not own.
pub fn can_create(booker_id: &str, item: &Item) -> Result<(), BookingError> {
    if !item.available {
        return Err(BookingError::Unavailable(item.id.clone()));
    }
    if item.owner_id == booker_id {
        return Err(BookingError::InvalidAccess(format!(
            "{booker_id} cannot book their own item {}",
            item.id
        )));
    }
    Ok(())
}

/// Only the owner of the booked item may approve or reject.
pub fn can_decide(acting_user_id: &str, details: &BookingDetails) -> Result<(), BookingError> {
    if details.item.owner_id != acting_user_id {
        return Err(BookingError::BookerMismatch(format!(
            "{acting_user_id} does not own item {}",
            details.item.id
        )));
    }
    Ok(())
}

/// Booker and owner may read a booking. Everyone else is told it does not
/// exist.
pub fn can_view(acting_user_id: &str, details: &BookingDetails) -> Result<(), BookingError> {
    let is_booker = details.booking.booker_id == acting_user_id;
    let is_owner = details.item.owner_id == acting_user_id;

    if !(is_booker || is_owner) {
        return Err(BookingError::NotFound(details.booking.id.clone()));
    }
    Ok(())
}

/// Owner-scoped listings require the owner to have at least one item.
pub fn has_any_item(owner_id: &str, any_item: Option<&Item>) -> Result<(), BookingError> {
    match any_item {
        Some(_) => Ok(()),
        None => Err(BookingError::NotFound(format!("{owner_id} owns no items"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Booking, BookingStatus, TimeStamp, User};

    fn item(owner: &str, available: bool) -> Item {
        Item {
            id: "item_1".into(),
            name: "drill".into(),
            description: "cordless".into(),
            available,
            owner_id: owner.into(),
        }
    }

    fn details(owner: &str, booker: &str) -> BookingDetails {
        let now = TimeStamp::new();
        BookingDetails {
            booking: Booking {
                id: "booking_1".into(),
                start: now,
                end: now,
                item_id: "item_1".into(),
                booker_id: booker.into(),
                status: BookingStatus::Waiting,
            },
            item: item(owner, true),
            booker: User {
                id: booker.into(),
                name: "booker".into(),
                email: "booker@example.com".into(),
            },
        }
    }

    #[test]
    fn create_checks_availability_before_ownership() {
        let res = can_create("user_owner", &item("user_owner", false));
        assert!(matches!(res, Err(BookingError::Unavailable(_))));
    }

    #[test]
    fn create_refuses_self_booking() {
        let res = can_create("user_owner", &item("user_owner", true));
        assert!(matches!(res, Err(BookingError::InvalidAccess(_))));
        assert!(can_create("user_other", &item("user_owner", true)).is_ok());
    }

    #[test]
    fn only_owner_decides() {
        let d = details("user_owner", "user_booker");
        assert!(can_decide("user_owner", &d).is_ok());
        assert!(matches!(
            can_decide("user_booker", &d),
            Err(BookingError::BookerMismatch(_))
        ));
    }

    #[test]
    fn strangers_see_not_found() {
        let d = details("user_owner", "user_booker");
        assert!(can_view("user_owner", &d).is_ok());
        assert!(can_view("user_booker", &d).is_ok());
        assert!(matches!(
            can_view("user_stranger", &d),
            Err(BookingError::NotFound(_))
        ));
    }

    #[test]
    fn owner_without_items_is_not_found() {
        assert!(matches!(
            has_any_item("user_owner", None),
            Err(BookingError::NotFound(_))
        ));
        assert!(has_any_item("user_owner", Some(&item("user_owner", true))).is_ok());
    }
}
