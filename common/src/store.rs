//! Ordered list of bookings, mirrored to a [`KeyValueStore`] slot.
//!
//! Every mutation rewrites the whole list (last write wins). A missing or
//! unreadable slot degrades to the seed list instead of failing.

use chrono::Utc;

use crate::booking::{seed_booking, Booking, BookingId, BookingStatus};
use crate::error::StoreError;
use crate::storage::{KeyValueStore, BOOKINGS_KEY};

#[derive(Clone, Debug)]
pub struct BookingStore<S> {
    bookings: Vec<Booking>,
    storage: S,
}

impl<S: KeyValueStore> BookingStore<S> {
    /// Load the list from `storage`, falling back to the seed record.
    pub fn load(storage: S) -> Self {
        let loaded = match storage.get(BOOKINGS_KEY) {
            Some(raw) => match serde_json::from_str::<Vec<Booking>>(&raw) {
                Ok(list) => Some(list),
                Err(e) => {
                    tracing::warn!("Stored bookings unreadable, using seed data: {e}");
                    None
                }
            },
            None => None,
        };

        let mut store = Self {
            bookings: Vec::new(),
            storage,
        };
        match loaded {
            Some(list) => {
                tracing::debug!("Loaded {} bookings from storage", list.len());
                store.bookings = list;
                store.dedupe_ids();
            }
            None => {
                store.bookings = vec![seed_booking()];
                if let Err(e) = store.persist() {
                    tracing::error!("Failed to write seed bookings: {e}");
                }
            }
        }
        store
    }

    /// All bookings, most recent first.
    pub fn list(&self) -> &[Booking] {
        &self.bookings
    }

    pub fn len(&self) -> usize {
        self.bookings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bookings.is_empty()
    }

    /// Bookings whose customer name OR reference contains `query`
    /// (case-insensitive). An empty query returns everything.
    pub fn filter(&self, query: &str) -> Vec<&Booking> {
        self.bookings
            .iter()
            .filter(|b| b.matches_query(query))
            .collect()
    }

    pub fn get(&self, id: &BookingId) -> Option<&Booking> {
        self.bookings.iter().find(|b| &b.id == id)
    }

    /// Insert at the front. An id already present in the list is replaced
    /// with a fresh one; the id actually stored is returned.
    pub fn prepend(&mut self, mut booking: Booking) -> Result<BookingId, StoreError> {
        while self.contains(&booking.id) {
            let fresh = BookingId::generate(Utc::now());
            tracing::debug!("Booking id {} already taken, using {}", booking.id, fresh);
            booking.id = fresh;
        }
        let id = booking.id.clone();
        self.bookings.insert(0, booking);
        self.persist()?;
        Ok(id)
    }

    /// Apply `f` to the booking with `id` and persist.
    pub fn update<F>(&mut self, id: &BookingId, f: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut Booking),
    {
        let booking = self
            .bookings
            .iter_mut()
            .find(|b| &b.id == id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        f(booking);
        self.persist()
    }

    /// Mark a booking as Booked. Only the status field changes.
    pub fn finalize(&mut self, id: &BookingId) -> Result<(), StoreError> {
        self.update(id, |b| b.status = BookingStatus::Booked)
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn contains(&self, id: &BookingId) -> bool {
        self.bookings.iter().any(|b| &b.id == id)
    }

    /// Stored lists written by older builds may carry duplicate ids.
    fn dedupe_ids(&mut self) {
        let mut changed = false;
        for i in 1..self.bookings.len() {
            while self.bookings[..i]
                .iter()
                .any(|b| b.id == self.bookings[i].id)
            {
                self.bookings[i].id = BookingId::generate(Utc::now());
                changed = true;
            }
        }
        if changed {
            tracing::warn!("Reassigned duplicate booking ids");
            if let Err(e) = self.persist() {
                tracing::error!("Failed to persist deduplicated bookings: {e}");
            }
        }
    }

    fn persist(&mut self) -> Result<(), StoreError> {
        let json = serde_json::to_string(&self.bookings)
            .map_err(|e| StoreError::Serialize(e.to_string()))?;
        self.storage.set(BOOKINGS_KEY, &json);
        Ok(())
    }
}
