//! Core entities and the booking request checks
use super::error::BookingError;
use chrono::{DateTime, TimeDelta, TimeZone, Utc};

#[derive(minicbor::Encode, minicbor::Decode, serde::Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    #[n(0)]
    Waiting,
    #[n(1)]
    Approved,
    #[n(2)]
    Rejected,
}

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq, Eq)]
pub struct User {
    #[n(0)]
    pub id: String, // bech32 encoded uuid7, hrp "user_"
    #[n(1)]
    pub name: String,
    #[n(2)]
    pub email: String,
}

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq, Eq)]
pub struct Item {
    #[n(0)]
    pub id: String,
    #[n(1)]
    pub name: String,
    #[n(2)]
    pub description: String,
    #[n(3)]
    pub available: bool,
    #[n(4)]
    pub owner_id: String,
}

// Foreign keys only; item and booker are resolved through their repositories.
#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq, Eq)]
pub struct Booking {
    #[n(0)]
    pub id: String,
    #[n(1)]
    pub start: TimeStamp<Utc>,
    #[n(2)]
    pub end: TimeStamp<Utc>,
    #[n(3)]
    pub item_id: String,
    #[n(4)]
    pub booker_id: String,
    #[n(5)]
    pub status: BookingStatus,
}

/// A booking with the item and booker it references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingDetails {
    pub booking: Booking,
    pub item: Item,
    pub booker: User,
}

/// Fields supplied by the surrounding user component.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
}

/// Fields supplied by the surrounding item catalogue.
#[derive(Debug, Clone)]
pub struct NewItem {
    pub name: String,
    pub description: String,
    pub available: bool,
    pub owner_id: String,
}

/// A reservation request as received from the boundary.
#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub item_id: String,
    pub start: TimeStamp<Utc>,
    pub end: TimeStamp<Utc>,
}

/// Validated booking fields, ready to be persisted in `WAITING`.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub start: TimeStamp<Utc>,
    pub end: TimeStamp<Utc>,
    pub item_id: String,
    pub booker_id: String,
    pub owner_id: String,
}

#[derive(Debug, Clone)]
pub struct TimeStamp<T: TimeZone>(DateTime<T>);

impl<T: TimeZone> Copy for TimeStamp<T> where DateTime<T>: Copy {}

// Compared by instant; the zone type carries no ordering of its own.
impl<T: TimeZone> PartialEq for TimeStamp<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<T: TimeZone> Eq for TimeStamp<T> {}

impl<T: TimeZone> PartialOrd for TimeStamp<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: TimeZone> Ord for TimeStamp<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.cmp(&other.0)
    }
}

impl TimeStamp<Utc> {
    pub fn new() -> Self {
        Self(Utc::now())
    }
    pub fn to_datetime_utc(&self) -> DateTime<Utc> {
        self.0
    }
    pub fn shifted(&self, by: TimeDelta) -> Self {
        Self(self.0 + by)
    }
}

impl Default for TimeStamp<Utc> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: TimeZone> From<DateTime<T>> for TimeStamp<T> {
    fn from(value: DateTime<T>) -> Self {
        TimeStamp(value)
    }
}

impl<C> minicbor::Encode<C> for TimeStamp<Utc> {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        _: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        e.array(2)?
            .i64(self.0.timestamp())?
            .u32(self.0.timestamp_subsec_nanos())?
            .ok()
    }
}

impl<'b, C> minicbor::Decode<'b, C> for TimeStamp<Utc> {
    fn decode(d: &mut minicbor::Decoder<'b>, _: &mut C) -> Result<Self, minicbor::decode::Error> {
        if d.array()? != Some(2) {
            return Err(minicbor::decode::Error::message("expected [seconds, nanoseconds]"));
        }
        let secs = d.i64()?;
        let nsecs = d.u32()?;

        DateTime::from_timestamp(secs, nsecs)
            .map(TimeStamp)
            .ok_or_else(|| minicbor::decode::Error::message("timestamp out of range"))
    }
}

impl Booking {
    /// Bookings always enter the lifecycle waiting for the owner.
    pub fn waiting(id: String, new_booking: &NewBooking) -> Self {
        Self {
            id,
            start: new_booking.start,
            end: new_booking.end,
            item_id: new_booking.item_id.clone(),
            booker_id: new_booking.booker_id.clone(),
            status: BookingStatus::Waiting,
        }
    }
}

impl BookingRequest {
    pub fn new(item_id: impl Into<String>, start: TimeStamp<Utc>, end: TimeStamp<Utc>) -> Self {
        Self {
            item_id: item_id.into(),
            start,
            end,
        }
    }

    /// Checks run before any entity is loaded or constructed.
    pub fn validate(&self, now: &TimeStamp<Utc>) -> Result<(), BookingError> {
        if self.item_id.trim().is_empty() {
            return Err(BookingError::InvalidArgument("item id is blank".into()));
        }
        if self.start < *now {
            return Err(BookingError::InvalidArgument(
                "start must not be in the past".into(),
            ));
        }
        if self.end <= *now {
            return Err(BookingError::InvalidArgument(
                "end must be in the future".into(),
            ));
        }
        if self.start >= self.end {
            return Err(BookingError::InvalidArgument(
                "start must be before end".into(),
            ));
        }
        Ok(())
    }
}
