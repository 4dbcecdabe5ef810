//! Service layer API for booking workflow operations
use super::error::BookingError;
use super::guard;
use super::model::{Booking, BookingDetails, BookingRequest, BookingStatus, Item, NewBooking, TimeStamp, User};
use super::query::{BookingQuery, PageRequest, Scope, SearchState};
use super::state;
use super::store::{BookingRepository, ItemRepository, UserRepository};
use super::view::{BookingRef, BookingView, BookingWindow};
use chrono::Utc;
use tracing::{debug, info, warn};

pub struct BookingService<S> {
    store: S,
}

impl<S> BookingService<S>
where
    S: UserRepository + ItemRepository + BookingRepository,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn require_user(&self, user_id: &str) -> Result<User, BookingError> {
        self.store
            .find_user(user_id)?
            .ok_or_else(|| BookingError::NotFound(format!("user {user_id}")))
    }

    fn require_item(&self, item_id: &str) -> Result<Item, BookingError> {
        self.store
            .find_item(item_id)?
            .ok_or_else(|| BookingError::NotFound(format!("item {item_id}")))
    }

    fn require_booking(&self, booking_id: &str) -> Result<Booking, BookingError> {
        self.store
            .find_booking(booking_id)?
            .ok_or_else(|| BookingError::NotFound(format!("booking {booking_id}")))
    }

    /// Resolve the item and booker a stored booking refers to.
    fn resolve(&self, booking: Booking) -> Result<BookingDetails, BookingError> {
        let item = self.require_item(&booking.item_id)?;
        let booker = self.require_user(&booking.booker_id)?;
        Ok(BookingDetails {
            booking,
            item,
            booker,
        })
    }

    fn views(&self, bookings: Vec<Booking>) -> Result<Vec<BookingView>, BookingError> {
        bookings
            .into_iter()
            .map(|booking| Ok(BookingView::from(&self.resolve(booking)?)))
            .collect()
    }

    /// Reserve an item. The booking starts out `WAITING` for the owner.
    pub fn create(
        &self,
        booker_id: &str,
        request: BookingRequest,
    ) -> Result<BookingView, BookingError> {
        request.validate(&TimeStamp::new())?;

        let booker = self.require_user(booker_id)?;
        let item = self.require_item(&request.item_id)?;
        if let Err(denied) = guard::can_create(booker_id, &item) {
            warn!(booker_id, item_id = %item.id, error = %denied, "booking refused");
            return Err(denied);
        }

        let booking = self.store.insert_booking(NewBooking {
            start: request.start,
            end: request.end,
            item_id: item.id.clone(),
            booker_id: booker.id.clone(),
            owner_id: item.owner_id.clone(),
        })?;
        info!(booking_id = %booking.id, booker_id, item_id = %item.id, "booking created");

        Ok(BookingView::from(&BookingDetails {
            booking,
            item,
            booker,
        }))
    }

    /// Approve or reject a booking on behalf of the item owner.
    pub fn decide(
        &self,
        acting_user_id: &str,
        booking_id: &str,
        approved: bool,
    ) -> Result<BookingView, BookingError> {
        self.require_user(acting_user_id)?;
        let details = self.resolve(self.require_booking(booking_id)?)?;
        if let Err(denied) = guard::can_decide(acting_user_id, &details) {
            warn!(acting_user_id, booking_id, error = %denied, "decision refused");
            return Err(denied);
        }

        let previous = details.booking.status;
        let booking = self
            .store
            .transition_booking(booking_id, &|booking| state::decide(booking, approved))?;
        info!(
            booking_id,
            ?previous,
            status = ?booking.status,
            redecided = state::is_decided(previous),
            "booking decided"
        );

        Ok(BookingView::from(&BookingDetails { booking, ..details }))
    }

    /// Read one booking. Only its booker and the item owner may see it.
    pub fn get_by_id(
        &self,
        acting_user_id: &str,
        booking_id: &str,
    ) -> Result<BookingView, BookingError> {
        self.require_user(acting_user_id)?;
        let details = self.resolve(self.require_booking(booking_id)?)?;
        guard::can_view(acting_user_id, &details)?;
        debug!(acting_user_id, booking_id, "booking read");

        Ok(BookingView::from(&details))
    }

    /// Bookings made by `booker_id`, newest start first.
    pub fn list_by_booker(
        &self,
        booker_id: &str,
        search_state: SearchState,
        now: TimeStamp<Utc>,
        page: PageRequest,
    ) -> Result<Vec<BookingView>, BookingError> {
        self.require_user(booker_id)?;
        search_state.filter()?;

        let bookings = BookingQuery {
            scope: Scope::Booker(booker_id.to_string()),
            state: search_state,
            now,
            page,
        }
        .run(&self.store)?;
        debug!(booker_id, %search_state, found = bookings.len(), "listed booker bookings");

        self.views(bookings)
    }

    /// Bookings of items owned by `owner_id`, newest start first. An owner
    /// with no items is reported as not found rather than given an empty
    /// list.
    pub fn list_by_owner(
        &self,
        owner_id: &str,
        search_state: SearchState,
        now: TimeStamp<Utc>,
        page: PageRequest,
    ) -> Result<Vec<BookingView>, BookingError> {
        self.require_user(owner_id)?;
        search_state.filter()?;
        guard::has_any_item(owner_id, self.store.find_any_item_by_owner(owner_id)?.as_ref())?;

        let bookings = BookingQuery {
            scope: Scope::Owner(owner_id.to_string()),
            state: search_state,
            now,
            page,
        }
        .run(&self.store)?;
        debug!(owner_id, %search_state, found = bookings.len(), "listed owner bookings");

        self.views(bookings)
    }

    /// Whether `booker_id` has rented `item_id` for a period that is over.
    /// Gates comments on items.
    pub fn has_completed_booking(
        &self,
        booker_id: &str,
        item_id: &str,
        now: TimeStamp<Utc>,
    ) -> Result<bool, BookingError> {
        self.store.exists_completed(booker_id, item_id, &now)
    }

    /// Most recent started and earliest upcoming booking of an item. Only
    /// the owner gets a populated window.
    pub fn item_booking_window(
        &self,
        acting_user_id: &str,
        item_id: &str,
        now: TimeStamp<Utc>,
    ) -> Result<BookingWindow, BookingError> {
        self.require_user(acting_user_id)?;
        let owner_id = self
            .store
            .find_item_owner_id(item_id)?
            .ok_or_else(|| BookingError::NotFound(format!("item {item_id}")))?;
        if owner_id != acting_user_id {
            return Ok(BookingWindow::default());
        }

        let bookings = self.store.find_page(
            &Scope::Owner(owner_id),
            &|booking| booking.item_id == item_id && booking.status != BookingStatus::Rejected,
            &PageRequest::new(0, usize::MAX)?,
        )?;

        Ok(BookingWindow {
            last_booking: bookings.iter().find(|b| b.start <= now).map(BookingRef::from),
            next_booking: bookings.iter().rev().find(|b| b.start > now).map(BookingRef::from),
        })
    }
}
