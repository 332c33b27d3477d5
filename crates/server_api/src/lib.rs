//! Bookings resource operations, independent of the HTTP layer.
//!
//! The store is deliberately permissive: it checks that the editable fields
//! are present but accepts any time label and does not cap slot occupancy.

use shared::{
    domain::BookingId,
    error::{ApiError, ErrorCode},
    protocol::{BookingPayload, BookingRecord, CreateBookingRequest, UpdateBookingRequest},
};
use storage::{BookingFields, Storage};
use tracing::info;

#[derive(Clone)]
pub struct ApiContext {
    pub storage: Storage,
}

pub async fn list_bookings(ctx: &ApiContext) -> Result<Vec<BookingRecord>, ApiError> {
    let bookings = ctx.storage.list_bookings().await.map_err(internal)?;
    Ok(bookings.into_iter().map(BookingRecord::from).collect())
}

pub async fn create_booking(
    ctx: &ApiContext,
    req: &CreateBookingRequest,
) -> Result<BookingPayload, ApiError> {
    if req.time.trim().is_empty() {
        return Err(ApiError::new(ErrorCode::Validation, "time is required"));
    }
    let fields = validated_fields(&req.name, &req.room_number, req.number_of_people)?;

    let stored = ctx
        .storage
        .insert_booking(&req.time, fields)
        .await
        .map_err(internal)?;
    info!(booking_id = %stored.id, time = %stored.time, "booking created");
    Ok(BookingRecord::from(stored).into())
}

pub async fn update_booking(
    ctx: &ApiContext,
    id: BookingId,
    req: &UpdateBookingRequest,
) -> Result<BookingPayload, ApiError> {
    let fields = validated_fields(&req.name, &req.room_number, req.number_of_people)?;
    let row_id = id.as_integer().ok_or_else(|| not_found(&id))?;

    let stored = ctx
        .storage
        .update_booking(row_id, fields)
        .await
        .map_err(internal)?
        .ok_or_else(|| not_found(&id))?;
    info!(booking_id = %id, "booking updated");
    Ok(BookingRecord::from(stored).into())
}

pub async fn delete_booking(ctx: &ApiContext, id: BookingId) -> Result<(), ApiError> {
    let row_id = id.as_integer().ok_or_else(|| not_found(&id))?;
    let removed = ctx.storage.delete_booking(row_id).await.map_err(internal)?;
    if !removed {
        return Err(not_found(&id));
    }
    info!(booking_id = %id, "booking deleted");
    Ok(())
}

fn validated_fields<'a>(
    name: &'a str,
    room_number: &'a str,
    number_of_people: u32,
) -> Result<BookingFields<'a>, ApiError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ApiError::new(ErrorCode::Validation, "name is required"));
    }
    let room_number = room_number.trim();
    if room_number.is_empty() {
        return Err(ApiError::new(
            ErrorCode::Validation,
            "room number is required",
        ));
    }
    if number_of_people == 0 {
        return Err(ApiError::new(
            ErrorCode::Validation,
            "number of people must be at least 1",
        ));
    }
    Ok(BookingFields {
        name,
        room_number,
        number_of_people,
    })
}

/// Ids this store could never have issued are reported the same as missing rows.
fn not_found(id: &BookingId) -> ApiError {
    ApiError::new(ErrorCode::NotFound, format!("booking {id} not found"))
}

fn internal(err: anyhow::Error) -> ApiError {
    ApiError::new(ErrorCode::Internal, err.to_string())
}
