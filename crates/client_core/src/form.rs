//! Raw booking input and its validation into a dispatchable draft.

use shared::domain::Booking;
use thiserror::Error;

/// Field values exactly as collected from the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookingForm {
    pub name: String,
    pub room_number: String,
    pub number_of_people: String,
}

/// A validated form, ready to be sent to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingDraft {
    pub name: String,
    pub room_number: String,
    pub number_of_people: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingField {
    Name,
    RoomNumber,
    NumberOfPeople,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("customer name is required")]
    MissingName,
    #[error("room number is required")]
    MissingRoomNumber,
    #[error("number of people must be a whole number above zero, got '{0}'")]
    InvalidNumberOfPeople(String),
}

impl FieldError {
    pub fn field(&self) -> BookingField {
        match self {
            FieldError::MissingName => BookingField::Name,
            FieldError::MissingRoomNumber => BookingField::RoomNumber,
            FieldError::InvalidNumberOfPeople(_) => BookingField::NumberOfPeople,
        }
    }
}

impl BookingForm {
    pub fn new(
        name: impl Into<String>,
        room_number: impl Into<String>,
        number_of_people: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            room_number: room_number.into(),
            number_of_people: number_of_people.into(),
        }
    }

    /// Collects every field problem rather than stopping at the first.
    ///
    /// The party size must be a whole number on its own: trailing text such as
    /// `"3 people"` and fractions such as `"2.5"` are rejected, not truncated.
    pub fn validate(&self) -> Result<BookingDraft, Vec<FieldError>> {
        let mut errors = Vec::new();

        let name = self.name.trim();
        if name.is_empty() {
            errors.push(FieldError::MissingName);
        }

        let room_number = self.room_number.trim();
        if room_number.is_empty() {
            errors.push(FieldError::MissingRoomNumber);
        }

        let raw_people = self.number_of_people.trim();
        let number_of_people = match raw_people.parse::<u32>() {
            Ok(count) if count > 0 => count,
            _ => {
                errors.push(FieldError::InvalidNumberOfPeople(raw_people.to_string()));
                0
            }
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(BookingDraft {
            name: name.to_string(),
            room_number: room_number.to_string(),
            number_of_people,
        })
    }
}

/// Prefill for editing an existing booking.
impl From<&Booking> for BookingForm {
    fn from(booking: &Booking) -> Self {
        Self {
            name: booking.name.clone(),
            room_number: booking.room_number.clone(),
            number_of_people: booking.number_of_people.to_string(),
        }
    }
}
