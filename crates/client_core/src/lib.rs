//! Client side of the table-booking manager.
//!
//! [`BookingBoard`] mirrors the store's bookings grouped by time slot and
//! dispatches create, update and delete requests through a [`BookingStore`].
//! Every failed round trip is logged and leaves the local state untouched.

use std::collections::BTreeMap;

use async_trait::async_trait;
use shared::{
    domain::{Booking, BookingId, TimeSlot, SLOT_CAPACITY},
    protocol::{BookingPayload, BookingRecord, CreateBookingRequest, UpdateBookingRequest},
};
use tracing::{debug, error, info, warn};

pub mod error;
pub mod form;
pub mod render;
pub mod transport;

pub use error::StoreError;
pub use form::{BookingDraft, BookingField, BookingForm, FieldError};
pub use render::BoardView;
pub use transport::HttpBookingStore;

#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn list(&self) -> Result<Vec<BookingRecord>, StoreError>;
    async fn create(&self, request: &CreateBookingRequest) -> Result<BookingPayload, StoreError>;
    async fn update(&self, id: &BookingId, request: &UpdateBookingRequest)
        -> Result<(), StoreError>;
    async fn delete(&self, id: &BookingId) -> Result<(), StoreError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardPhase {
    Loading,
    Loaded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The store accepted the request and local state was updated.
    Applied,
    /// Input did not validate; nothing was sent.
    Rejected(Vec<FieldError>),
    /// The display position did not resolve to a booking; nothing was sent.
    NoSuchBooking,
    /// The round trip failed; local state is unchanged.
    Failed,
}

pub fn empty_slots() -> BTreeMap<TimeSlot, Vec<Booking>> {
    TimeSlot::all().map(|slot| (slot, Vec::new())).collect()
}

/// Partitions listing records by exact slot label. Records outside the slot
/// registry, including those without a time, are dropped one by one.
pub fn group_by_slot(
    records: impl IntoIterator<Item = BookingRecord>,
) -> BTreeMap<TimeSlot, Vec<Booking>> {
    let mut slots = empty_slots();
    for record in records {
        let booking_id = record.id.clone();
        match Booking::try_from(record) {
            Ok(booking) => slots.entry(booking.time).or_default().push(booking),
            Err(unknown) => {
                debug!(%booking_id, time = %unknown.0, "dropping booking outside the slot registry");
            }
        }
    }
    slots
}

pub struct BookingBoard<S: BookingStore> {
    store: S,
    bookings_by_slot: BTreeMap<TimeSlot, Vec<Booking>>,
    phase: BoardPhase,
}

impl<S: BookingStore> BookingBoard<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            bookings_by_slot: empty_slots(),
            phase: BoardPhase::Loading,
        }
    }

    pub fn phase(&self) -> BoardPhase {
        self.phase
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn bookings_by_slot(&self) -> &BTreeMap<TimeSlot, Vec<Booking>> {
        &self.bookings_by_slot
    }

    pub fn bookings(&self, slot: TimeSlot) -> &[Booking] {
        self.bookings_by_slot
            .get(&slot)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn booking_at(&self, slot: TimeSlot, index: usize) -> Option<&Booking> {
        self.bookings(slot).get(index)
    }

    pub fn total_bookings(&self) -> usize {
        self.bookings_by_slot.values().map(Vec::len).sum()
    }

    /// UI gate for starting an add. [`BookingBoard::add`] itself does not
    /// check capacity.
    pub fn can_add(&self, slot: TimeSlot) -> bool {
        self.bookings(slot).len() < SLOT_CAPACITY
    }

    pub fn view(&self) -> BoardView<'_> {
        BoardView {
            slots: &self.bookings_by_slot,
        }
    }

    /// Replaces local state with the store's bookings. On failure the
    /// previous state is kept and the error is only logged.
    pub async fn load(&mut self) {
        match self.store.list().await {
            Ok(records) => {
                let fetched = records.len();
                self.bookings_by_slot = group_by_slot(records);
                info!(
                    fetched,
                    shown = self.total_bookings(),
                    "loaded bookings"
                );
            }
            Err(error) => error!(%error, "failed to fetch bookings"),
        }
        self.phase = BoardPhase::Loaded;
    }

    pub async fn add(&mut self, slot: TimeSlot, form: &BookingForm) -> ActionOutcome {
        let draft = match form.validate() {
            Ok(draft) => draft,
            Err(errors) => {
                debug!(%slot, ?errors, "add abandoned");
                return ActionOutcome::Rejected(errors);
            }
        };

        let request = CreateBookingRequest {
            time: slot.label().to_string(),
            name: draft.name,
            room_number: draft.room_number,
            number_of_people: draft.number_of_people,
        };
        let payload = match self.store.create(&request).await {
            Ok(payload) => payload,
            Err(error) => {
                error!(%slot, %error, "failed to add booking");
                return ActionOutcome::Failed;
            }
        };
        let booking = match Booking::try_from(payload) {
            Ok(booking) => booking,
            Err(unknown) => {
                error!(%slot, time = %unknown.0, "store returned a booking for an unknown time slot");
                return ActionOutcome::Failed;
            }
        };
        if booking.time != slot {
            warn!(%slot, returned = %booking.time, booking_id = %booking.id, "store moved new booking to another slot");
        }

        info!(%slot, booking_id = %booking.id, "booking added");
        self.bookings_by_slot.entry(slot).or_default().push(booking);
        ActionOutcome::Applied
    }

    /// Edits the booking shown at `index` in `slot`. The target is held for
    /// the whole round trip, so the reply lands on the booking that was sent.
    pub async fn edit(&mut self, slot: TimeSlot, index: usize, form: &BookingForm) -> ActionOutcome {
        let Some(booking) = self
            .bookings_by_slot
            .get_mut(&slot)
            .and_then(|bookings| bookings.get_mut(index))
        else {
            warn!(%slot, index, "no booking at this position to edit");
            return ActionOutcome::NoSuchBooking;
        };
        let draft = match form.validate() {
            Ok(draft) => draft,
            Err(errors) => {
                debug!(%slot, booking_id = %booking.id, ?errors, "edit abandoned");
                return ActionOutcome::Rejected(errors);
            }
        };

        let request = UpdateBookingRequest {
            name: draft.name,
            room_number: draft.room_number,
            number_of_people: draft.number_of_people,
        };
        if let Err(error) = self.store.update(&booking.id, &request).await {
            error!(%slot, booking_id = %booking.id, %error, "failed to update booking");
            return ActionOutcome::Failed;
        }

        booking.name = request.name;
        booking.room_number = request.room_number;
        booking.number_of_people = request.number_of_people;
        info!(%slot, booking_id = %booking.id, "booking updated");
        ActionOutcome::Applied
    }

    pub async fn delete(&mut self, slot: TimeSlot, index: usize) -> ActionOutcome {
        let Some(id) = self.booking_at(slot, index).map(|booking| booking.id.clone()) else {
            warn!(%slot, index, "no booking at this position to delete");
            return ActionOutcome::NoSuchBooking;
        };

        if let Err(error) = self.store.delete(&id).await {
            error!(%slot, booking_id = %id, %error, "failed to delete booking");
            return ActionOutcome::Failed;
        }

        if let Some(bookings) = self.bookings_by_slot.get_mut(&slot) {
            if let Some(position) = bookings.iter().position(|booking| booking.id == id) {
                bookings.remove(position);
            }
        }
        info!(%slot, booking_id = %id, "booking deleted");
        ActionOutcome::Applied
    }

    /// Empties every slot locally. The store is not contacted.
    pub fn clear_all(&mut self) {
        self.bookings_by_slot = empty_slots();
        info!("cleared local bookings");
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
