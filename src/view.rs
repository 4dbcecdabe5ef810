//! Output representations handed to the boundary layer
use super::model::{Booking, BookingDetails, BookingStatus, Item, User};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct UserSummary {
    pub id: String,
    pub name: String,
    pub email: String,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ItemSummary {
    pub id: String,
    pub name: String,
    pub description: String,
    pub available: bool,
}

/// The one canonical booking representation.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BookingView {
    pub id: String,
    pub status: BookingStatus,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub booker: UserSummary,
    pub item: ItemSummary,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BookingRef {
    pub id: String,
    pub booker_id: String,
}

/// Last and next bookings of an item, visible to its owner only.
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BookingWindow {
    pub last_booking: Option<BookingRef>,
    pub next_booking: Option<BookingRef>,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

impl From<&Item> for ItemSummary {
    fn from(item: &Item) -> Self {
        Self {
            id: item.id.clone(),
            name: item.name.clone(),
            description: item.description.clone(),
            available: item.available,
        }
    }
}

impl From<&BookingDetails> for BookingView {
    fn from(details: &BookingDetails) -> Self {
        Self {
            id: details.booking.id.clone(),
            status: details.booking.status,
            start: details.booking.start.to_datetime_utc(),
            end: details.booking.end.to_datetime_utc(),
            booker: UserSummary::from(&details.booker),
            item: ItemSummary::from(&details.item),
        }
    }
}

impl From<&Booking> for BookingRef {
    fn from(booking: &Booking) -> Self {
        Self {
            id: booking.id.clone(),
            booker_id: booking.booker_id.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TimeStamp;
    use chrono::TimeZone;

    #[test]
    fn serialises_with_nested_summaries() {
        let start = Utc.with_ymd_and_hms(2024, 6, 15, 10, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 6, 16, 10, 0, 0).unwrap();
        let details = BookingDetails {
            booking: Booking {
                id: "booking_1".into(),
                start: TimeStamp::from(start),
                end: TimeStamp::from(end),
                item_id: "item_1".into(),
                booker_id: "user_b".into(),
                status: BookingStatus::Waiting,
            },
            item: Item {
                id: "item_1".into(),
                name: "tent".into(),
                description: "two person".into(),
                available: true,
                owner_id: "user_o".into(),
            },
            booker: User {
                id: "user_b".into(),
                name: "Sam".into(),
                email: "sam@example.com".into(),
            },
        };

        let json = serde_json::to_value(BookingView::from(&details)).unwrap();

        assert_eq!(json["status"], "WAITING");
        assert_eq!(json["start"], "2024-06-15T10:00:00Z");
        assert_eq!(json["booker"]["email"], "sam@example.com");
        assert_eq!(json["item"]["available"], true);
        assert!(json["item"].get("ownerId").is_none());
    }

    #[test]
    fn window_uses_camel_case() {
        let window = BookingWindow {
            last_booking: None,
            next_booking: Some(BookingRef {
                id: "booking_2".into(),
                booker_id: "user_b".into(),
            }),
        };
        let json = serde_json::to_value(&window).unwrap();
        assert!(json["lastBooking"].is_null());
        assert_eq!(json["nextBooking"]["bookerId"], "user_b");
    }
}
