//! Repository seams and the sled backed entity store
//!
//! Records are CBOR encoded. Bookings are additionally indexed per booker and
//! per item owner under `subject ++ 0x00 ++ start ++ booking_id`, so a reverse
//! prefix scan yields a subject's bookings newest start first.
use super::error::BookingError;
use super::model::{Booking, Item, NewBooking, NewItem, NewUser, TimeStamp, User};
use super::query::{PageRequest, Scope};
use super::utils::{self, BOOKING_HRP, ITEM_HRP, USER_HRP};
use anyhow::anyhow;
use chrono::Utc;
use sled::transaction::{ConflictableTransactionError, TransactionError};
use sled::{Transactional, Tree};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

pub trait UserRepository {
    fn find_user(&self, id: &str) -> Result<Option<User>, BookingError>;
    fn save_user(&self, user: NewUser) -> Result<User, BookingError>;
}

pub trait ItemRepository {
    fn find_item(&self, id: &str) -> Result<Option<Item>, BookingError>;
    /// Any one item owned by `owner_id`, used as an existence check.
    fn find_any_item_by_owner(&self, owner_id: &str) -> Result<Option<Item>, BookingError>;
    fn save_item(&self, item: NewItem) -> Result<Item, BookingError>;

    fn find_item_owner_id(&self, item_id: &str) -> Result<Option<String>, BookingError> {
        Ok(self.find_item(item_id)?.map(|item| item.owner_id))
    }
}

pub trait BookingRepository {
    fn find_booking(&self, id: &str) -> Result<Option<Booking>, BookingError>;
    /// Persist a new `Waiting` booking together with its index entries.
    fn insert_booking(&self, new_booking: NewBooking) -> Result<Booking, BookingError>;
    /// Atomic read-modify-write of one booking. `f` may run more than once
    /// when another writer changes the record concurrently.
    fn transition_booking(
        &self,
        id: &str,
        f: &dyn Fn(Booking) -> Result<Booking, BookingError>,
    ) -> Result<Booking, BookingError>;
    /// Subject bookings ordered by start descending, filtered, then paged.
    fn find_page(
        &self,
        scope: &Scope,
        filter: &dyn Fn(&Booking) -> bool,
        page: &PageRequest,
    ) -> Result<Vec<Booking>, BookingError>;

    /// Whether `booker_id` has a booking of `item_id` that ended before `now`.
    fn exists_completed(
        &self,
        booker_id: &str,
        item_id: &str,
        now: &TimeStamp<Utc>,
    ) -> Result<bool, BookingError> {
        let found = self.find_page(
            &Scope::Booker(booker_id.to_string()),
            &|booking| booking.item_id == item_id && booking.end < *now,
            &PageRequest::new(0, 1)?,
        )?;
        Ok(!found.is_empty())
    }
}

pub struct SledStore {
    instance: Arc<sled::Db>,
    users: Tree,
    items: Tree,
    items_by_owner: Tree,
    bookings: Tree,
    bookings_by_booker: Tree,
    bookings_by_owner: Tree,
}

impl SledStore {
    pub fn new(instance: Arc<sled::Db>) -> Result<Self, BookingError> {
        Ok(Self {
            users: instance.open_tree("users")?,
            items: instance.open_tree("items")?,
            items_by_owner: instance.open_tree("items_by_owner")?,
            bookings: instance.open_tree("bookings")?,
            bookings_by_booker: instance.open_tree("bookings_by_booker")?,
            bookings_by_owner: instance.open_tree("bookings_by_owner")?,
            instance,
        })
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self, BookingError> {
        Self::new(Arc::new(sled::open(path)?))
    }

    pub fn flush(&self) -> Result<(), BookingError> {
        self.instance.flush()?;
        Ok(())
    }

    fn load_booking(&self, id: &[u8]) -> Result<Booking, BookingError> {
        decode_entry(&self.bookings, id)?.ok_or_else(|| {
            anyhow!(
                "index refers to missing booking {}",
                String::from_utf8_lossy(id)
            )
            .into()
        })
    }
}

fn decode_entry<T>(tree: &Tree, key: &[u8]) -> Result<Option<T>, BookingError>
where
    T: for<'b> minicbor::Decode<'b, ()>,
{
    match tree.get(key)? {
        Some(bytes) => Ok(Some(minicbor::decode(&bytes)?)),
        None => Ok(None),
    }
}

fn subject_prefix(subject: &str) -> Vec<u8> {
    let mut key = subject.as_bytes().to_vec();
    key.push(0);
    key
}

fn booking_index_key(subject: &str, start: &TimeStamp<Utc>, booking_id: &str) -> Vec<u8> {
    let mut key = subject_prefix(subject);
    key.extend_from_slice(&utils::sortable_instant(&start.to_datetime_utc()));
    key.extend_from_slice(booking_id.as_bytes());
    key
}

fn aborted(err: TransactionError<()>) -> BookingError {
    match err {
        TransactionError::Abort(()) => anyhow!("transaction aborted").into(),
        TransactionError::Storage(e) => e.into(),
    }
}

impl UserRepository for SledStore {
    fn find_user(&self, id: &str) -> Result<Option<User>, BookingError> {
        decode_entry(&self.users, id.as_bytes())
    }

    fn save_user(&self, user: NewUser) -> Result<User, BookingError> {
        let user = User {
            id: utils::new_uuid_to_bech32(USER_HRP)?,
            name: user.name,
            email: user.email,
        };
        self.users
            .insert(user.id.as_bytes(), minicbor::to_vec(&user)?)?;
        Ok(user)
    }
}

impl ItemRepository for SledStore {
    fn find_item(&self, id: &str) -> Result<Option<Item>, BookingError> {
        decode_entry(&self.items, id.as_bytes())
    }

    fn find_any_item_by_owner(&self, owner_id: &str) -> Result<Option<Item>, BookingError> {
        match self.items_by_owner.scan_prefix(subject_prefix(owner_id)).next() {
            Some(entry) => {
                let (_, item_id) = entry?;
                decode_entry(&self.items, &item_id)
            }
            None => Ok(None),
        }
    }

    fn save_item(&self, item: NewItem) -> Result<Item, BookingError> {
        let item = Item {
            id: utils::new_uuid_to_bech32(ITEM_HRP)?,
            name: item.name,
            description: item.description,
            available: item.available,
            owner_id: item.owner_id,
        };
        let encoded = minicbor::to_vec(&item)?;
        let mut owner_key = subject_prefix(&item.owner_id);
        owner_key.extend_from_slice(item.id.as_bytes());

        (&self.items, &self.items_by_owner)
            .transaction(|(items, items_by_owner)| {
                items.insert(item.id.as_bytes(), encoded.as_slice())?;
                items_by_owner.insert(owner_key.as_slice(), item.id.as_bytes())?;
                Ok::<_, ConflictableTransactionError<()>>(())
            })
            .map_err(aborted)?;

        Ok(item)
    }
}

impl BookingRepository for SledStore {
    fn find_booking(&self, id: &str) -> Result<Option<Booking>, BookingError> {
        decode_entry(&self.bookings, id.as_bytes())
    }

    fn insert_booking(&self, new_booking: NewBooking) -> Result<Booking, BookingError> {
        let booking = Booking::waiting(utils::new_uuid_to_bech32(BOOKING_HRP)?, &new_booking);
        let encoded = minicbor::to_vec(&booking)?;
        let booker_key = booking_index_key(&booking.booker_id, &booking.start, &booking.id);
        let owner_key = booking_index_key(&new_booking.owner_id, &booking.start, &booking.id);

        (&self.bookings, &self.bookings_by_booker, &self.bookings_by_owner)
            .transaction(|(bookings, by_booker, by_owner)| {
                bookings.insert(booking.id.as_bytes(), encoded.as_slice())?;
                by_booker.insert(booker_key.as_slice(), booking.id.as_bytes())?;
                by_owner.insert(owner_key.as_slice(), booking.id.as_bytes())?;
                Ok::<_, ConflictableTransactionError<()>>(())
            })
            .map_err(aborted)?;

        Ok(booking)
    }

    fn transition_booking(
        &self,
        id: &str,
        f: &dyn Fn(Booking) -> Result<Booking, BookingError>,
    ) -> Result<Booking, BookingError> {
        loop {
            let current = self
                .bookings
                .get(id.as_bytes())?
                .ok_or_else(|| BookingError::NotFound(id.to_string()))?;
            let updated = f(minicbor::decode(&current)?)?;
            let encoded = minicbor::to_vec(&updated)?;

            match self
                .bookings
                .compare_and_swap(id.as_bytes(), Some(&current), Some(encoded))?
            {
                Ok(()) => return Ok(updated),
                Err(_) => debug!(booking_id = id, "concurrent update, retrying transition"),
            }
        }
    }

    fn find_page(
        &self,
        scope: &Scope,
        filter: &dyn Fn(&Booking) -> bool,
        page: &PageRequest,
    ) -> Result<Vec<Booking>, BookingError> {
        let index = match scope {
            Scope::Booker(_) => &self.bookings_by_booker,
            Scope::Owner(_) => &self.bookings_by_owner,
        };

        let mut skipped = 0;
        let mut found = Vec::new();
        for entry in index.scan_prefix(subject_prefix(scope.subject())).rev() {
            if found.len() == page.size() {
                break;
            }
            let (_, booking_id) = entry?;
            let booking = self.load_booking(&booking_id)?;
            if !filter(&booking) {
                continue;
            }
            if skipped < page.from() {
                skipped += 1;
                continue;
            }
            found.push(booking);
        }

        Ok(found)
    }
}
