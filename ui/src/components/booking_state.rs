use dioxus::prelude::*;

use freightdesk_common::store::BookingStore;

use super::browser::LocalStorage;

pub type Bookings = BookingStore<LocalStorage>;

/// Load the persisted bookings (or the seed record) into a fresh store.
pub fn load_bookings() -> Bookings {
    BookingStore::load(LocalStorage::default())
}

pub fn use_bookings() -> Signal<Bookings> {
    use_context::<Signal<Bookings>>()
}
