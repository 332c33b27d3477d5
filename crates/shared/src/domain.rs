use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Store-assigned booking identifier.
///
/// The value is opaque to clients: integer and string ids are both accepted and
/// written back in the form they arrived in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BookingId {
    Integer(i64),
    Text(String),
}

impl BookingId {
    /// Integer value when the id is one the SQLite store could have issued.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            BookingId::Integer(value) => Some(*value),
            BookingId::Text(text) => text.parse().ok(),
        }
    }

    /// Parses a path segment, preferring the integer form.
    pub fn from_segment(segment: &str) -> Self {
        segment
            .parse()
            .map(BookingId::Integer)
            .unwrap_or_else(|_| BookingId::Text(segment.to_string()))
    }
}

impl From<i64> for BookingId {
    fn from(value: i64) -> Self {
        BookingId::Integer(value)
    }
}

impl From<&str> for BookingId {
    fn from(value: &str) -> Self {
        BookingId::Text(value.to_string())
    }
}

impl fmt::Display for BookingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookingId::Integer(value) => write!(f, "{value}"),
            BookingId::Text(text) => f.write_str(text),
        }
    }
}

/// Number of bookings a slot may show before the add action is gated.
pub const SLOT_CAPACITY: usize = 4;

const SLOT_LABELS: [&str; 21] = [
    "5:00 PM", "5:15 PM", "5:30 PM", "5:45 PM", "6:00 PM", "6:15 PM", "6:30 PM", "6:45 PM",
    "7:00 PM", "7:15 PM", "7:30 PM", "7:45 PM", "8:00 PM", "8:15 PM", "8:30 PM", "8:45 PM",
    "9:00 PM", "9:15 PM", "9:30 PM", "9:45 PM", "10:00 PM",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown time slot '{0}'")]
pub struct UnknownTimeSlot(pub String);

/// One of the fixed 15-minute dinner slots between 5:00 PM and 10:00 PM.
///
/// Slots order chronologically and serialize as their display label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeSlot(u8);

impl TimeSlot {
    pub const COUNT: usize = SLOT_LABELS.len();

    pub fn all() -> impl DoubleEndedIterator<Item = TimeSlot> + ExactSizeIterator {
        (0..Self::COUNT as u8).map(TimeSlot)
    }

    pub fn from_label(label: &str) -> Option<TimeSlot> {
        SLOT_LABELS
            .iter()
            .position(|candidate| *candidate == label)
            .map(|index| TimeSlot(index as u8))
    }

    pub fn label(self) -> &'static str {
        SLOT_LABELS[usize::from(self.0)]
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl TryFrom<String> for TimeSlot {
    type Error = UnknownTimeSlot;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        TimeSlot::from_label(&value).ok_or(UnknownTimeSlot(value))
    }
}

impl From<TimeSlot> for String {
    fn from(value: TimeSlot) -> Self {
        value.label().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: BookingId,
    pub time: TimeSlot,
    pub name: String,
    pub room_number: String,
    pub number_of_people: u32,
}
