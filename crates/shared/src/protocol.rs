//! Wire shapes exchanged with the bookings resource.
//!
//! Listing returns snake_case records. Create and update bodies are camelCase;
//! the snake_case spellings are accepted as aliases so either side may be
//! lenient about casing.

use serde::{de::IgnoredAny, Deserialize, Deserializer, Serialize};

use crate::domain::{Booking, BookingId, TimeSlot, UnknownTimeSlot};

pub fn bookings_route() -> &'static str {
    "/bookings"
}

/// Item of the `GET /bookings` listing.
///
/// `time` is `None` when the row carried no usable label (missing, null or not
/// a string); such rows are kept so the client can drop them one by one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRecord {
    pub id: BookingId,
    #[serde(default, deserialize_with = "optional_label")]
    pub time: Option<String>,
    pub name: String,
    #[serde(deserialize_with = "room_number_text")]
    pub room_number: String,
    pub number_of_people: u32,
}

/// Single booking as returned by create and update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingPayload {
    pub id: BookingId,
    pub time: String,
    pub name: String,
    #[serde(alias = "room_number", deserialize_with = "room_number_text")]
    pub room_number: String,
    #[serde(alias = "number_of_people")]
    pub number_of_people: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub time: String,
    pub name: String,
    #[serde(alias = "room_number", deserialize_with = "room_number_text")]
    pub room_number: String,
    #[serde(alias = "number_of_people")]
    pub number_of_people: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookingRequest {
    pub name: String,
    #[serde(alias = "room_number", deserialize_with = "room_number_text")]
    pub room_number: String,
    #[serde(alias = "number_of_people")]
    pub number_of_people: u32,
}

impl TryFrom<BookingRecord> for Booking {
    type Error = UnknownTimeSlot;

    fn try_from(record: BookingRecord) -> Result<Self, Self::Error> {
        Ok(Booking {
            id: record.id,
            time: TimeSlot::try_from(record.time.unwrap_or_default())?,
            name: record.name,
            room_number: record.room_number,
            number_of_people: record.number_of_people,
        })
    }
}

impl TryFrom<BookingPayload> for Booking {
    type Error = UnknownTimeSlot;

    fn try_from(payload: BookingPayload) -> Result<Self, Self::Error> {
        Ok(Booking {
            id: payload.id,
            time: TimeSlot::try_from(payload.time)?,
            name: payload.name,
            room_number: payload.room_number,
            number_of_people: payload.number_of_people,
        })
    }
}

impl From<BookingRecord> for BookingPayload {
    fn from(record: BookingRecord) -> Self {
        Self {
            id: record.id,
            time: record.time.unwrap_or_default(),
            name: record.name,
            room_number: record.room_number,
            number_of_people: record.number_of_people,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RoomNumberRepr {
    Text(String),
    Integer(i64),
}

/// Room numbers travel as either JSON strings or numbers; both are kept as text.
fn room_number_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RoomNumberRepr::deserialize(deserializer)? {
        RoomNumberRepr::Text(text) => text,
        RoomNumberRepr::Integer(number) => number.to_string(),
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LabelRepr {
    Text(String),
    Other(IgnoredAny),
}

fn optional_label<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match LabelRepr::deserialize(deserializer)? {
        LabelRepr::Text(text) => Some(text),
        LabelRepr::Other(_) => None,
    })
}
