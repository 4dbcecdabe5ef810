//! Temporal classification and paged booking queries
//!
//! A query names a subject (the booker, or the owner of the booked items), a
//! search state and a reference instant. The store walks the subject's
//! bookings newest start first and keeps those the filter accepts, skipping
//! exactly `from` matches.
use super::error::BookingError;
use super::model::{Booking, BookingStatus, TimeStamp};
use super::store::BookingRepository;
use chrono::Utc;
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Listing filter vocabulary accepted from callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchState {
    All,
    Current,
    Future,
    Past,
    Waiting,
    Approved,
    Rejected,
    // known literal without a server-side filter
    Canceled,
}

/// Predicate derived from a supported search state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingFilter {
    All,
    Current,
    Future,
    Past,
    Status(BookingStatus),
}

/// Which side of a booking the subject id is matched against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    Booker(String),
    Owner(String),
}

/// Offset based page: skip `from` matches, return at most `size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    from: usize,
    size: usize,
}

#[derive(Debug, Clone)]
pub struct BookingQuery {
    pub scope: Scope,
    pub state: SearchState,
    pub now: TimeStamp<Utc>,
    pub page: PageRequest,
}

impl SearchState {
    pub const SUPPORTED: [SearchState; 7] = [
        SearchState::All,
        SearchState::Current,
        SearchState::Future,
        SearchState::Past,
        SearchState::Waiting,
        SearchState::Approved,
        SearchState::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "ALL",
            Self::Current => "CURRENT",
            Self::Future => "FUTURE",
            Self::Past => "PAST",
            Self::Waiting => "WAITING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
            Self::Canceled => "CANCELED",
        }
    }

    /// Map to a filter, refusing states without a server-side meaning.
    pub fn filter(&self) -> Result<BookingFilter, BookingError> {
        match self {
            Self::All => Ok(BookingFilter::All),
            Self::Current => Ok(BookingFilter::Current),
            Self::Future => Ok(BookingFilter::Future),
            Self::Past => Ok(BookingFilter::Past),
            Self::Waiting => Ok(BookingFilter::Status(BookingStatus::Waiting)),
            Self::Approved => Ok(BookingFilter::Status(BookingStatus::Approved)),
            Self::Rejected => Ok(BookingFilter::Status(BookingStatus::Rejected)),
            Self::Canceled => Err(BookingError::InvalidArgument(format!(
                "Unknown state: {}",
                self.as_str()
            ))),
        }
    }
}

impl FromStr for SearchState {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ALL" => Ok(Self::All),
            "CURRENT" => Ok(Self::Current),
            "FUTURE" => Ok(Self::Future),
            "PAST" => Ok(Self::Past),
            "WAITING" => Ok(Self::Waiting),
            "APPROVED" => Ok(Self::Approved),
            "REJECTED" => Ok(Self::Rejected),
            "CANCELED" => Ok(Self::Canceled),
            _ => Err(BookingError::InvalidArgument(
                "Unknown state: UNSUPPORTED_STATUS".into(),
            )),
        }
    }
}

impl fmt::Display for SearchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl BookingFilter {
    /// Bounds are exclusive: a booking starting or ending exactly at `now`
    /// is neither current, future nor past.
    pub fn matches(&self, booking: &Booking, now: &TimeStamp<Utc>) -> bool {
        match self {
            Self::All => true,
            Self::Current => booking.start < *now && booking.end > *now,
            Self::Future => booking.start > *now,
            Self::Past => booking.end < *now,
            Self::Status(status) => booking.status == *status,
        }
    }
}

impl Scope {
    pub fn subject(&self) -> &str {
        match self {
            Self::Booker(id) | Self::Owner(id) => id,
        }
    }
}

impl PageRequest {
    pub fn new(from: usize, size: usize) -> Result<Self, BookingError> {
        if size == 0 {
            return Err(BookingError::InvalidArgument(
                "page size must be positive".into(),
            ));
        }
        Ok(Self { from, size })
    }
    pub fn from(&self) -> usize {
        self.from
    }
    pub fn size(&self) -> usize {
        self.size
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            from: 0,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl BookingQuery {
    /// Validate the search state, then fetch the matching page.
    pub fn run<R: BookingRepository + ?Sized>(&self, repo: &R) -> Result<Vec<Booking>, BookingError> {
        let filter = self.state.filter()?;
        let now = self.now;

        repo.find_page(&self.scope, &|booking| filter.matches(booking, &now), &self.page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    fn booking(start_in: i64, end_in: i64, now: &TimeStamp<Utc>) -> Booking {
        Booking {
            id: "booking_1".into(),
            start: now.shifted(TimeDelta::hours(start_in)),
            end: now.shifted(TimeDelta::hours(end_in)),
            item_id: "item_1".into(),
            booker_id: "user_1".into(),
            status: BookingStatus::Waiting,
        }
    }

    #[test]
    fn parses_every_literal() {
        for state in SearchState::SUPPORTED {
            assert_eq!(state.as_str().parse::<SearchState>().unwrap(), state);
        }
        assert_eq!("CANCELED".parse::<SearchState>().unwrap(), SearchState::Canceled);
    }

    #[test]
    fn unknown_literal_is_invalid_argument() {
        let res = "all".parse::<SearchState>();
        assert!(matches!(res, Err(BookingError::InvalidArgument(msg)) if msg.contains("UNSUPPORTED_STATUS")));
    }

    #[test]
    fn canceled_has_no_filter() {
        assert!(matches!(
            SearchState::Canceled.filter(),
            Err(BookingError::InvalidArgument(_))
        ));
        for state in SearchState::SUPPORTED {
            assert!(state.filter().is_ok());
        }
    }

    #[test]
    fn classifies_against_now() {
        let now = TimeStamp::new();
        let running = booking(-1, 1, &now);
        let upcoming = booking(1, 2, &now);
        let finished = booking(-2, -1, &now);

        assert!(BookingFilter::Current.matches(&running, &now));
        assert!(!BookingFilter::Future.matches(&running, &now));
        assert!(!BookingFilter::Past.matches(&running, &now));

        assert!(BookingFilter::Future.matches(&upcoming, &now));
        assert!(!BookingFilter::Current.matches(&upcoming, &now));

        assert!(BookingFilter::Past.matches(&finished, &now));
        assert!(!BookingFilter::Current.matches(&finished, &now));
    }

    #[test]
    fn boundary_instants_are_exclusive() {
        let now = TimeStamp::new();
        let starts_now = booking(0, 1, &now);

        assert!(!BookingFilter::Current.matches(&starts_now, &now));
        assert!(!BookingFilter::Future.matches(&starts_now, &now));
        assert!(!BookingFilter::Past.matches(&starts_now, &now));
    }

    #[test]
    fn page_size_must_be_positive() {
        assert!(PageRequest::new(0, 0).is_err());
        let page = PageRequest::new(7, 3).unwrap();
        assert_eq!((page.from(), page.size()), (7, 3));
        assert_eq!(PageRequest::default().size(), DEFAULT_PAGE_SIZE);
    }
}
