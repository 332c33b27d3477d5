//! `BookingStore` over the HTTP bookings resource.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::BookingId,
    protocol::{BookingPayload, BookingRecord, CreateBookingRequest, UpdateBookingRequest},
};
use tracing::debug;
use url::Url;

use crate::{error::StoreError, BookingStore};

#[derive(Debug, Clone)]
pub struct HttpBookingStore {
    http: Client,
    bookings_url: Url,
}

impl HttpBookingStore {
    pub fn new(server_url: &str) -> Result<Self, StoreError> {
        Self::with_client(Client::new(), server_url)
    }

    pub fn with_client(http: Client, server_url: &str) -> Result<Self, StoreError> {
        let invalid = |source: url::ParseError| StoreError::InvalidUrl {
            url: server_url.to_string(),
            source,
        };
        let mut base = Url::parse(server_url).map_err(invalid)?;
        // Without a trailing slash `join` would replace the last path segment.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let bookings_url = base.join("bookings").map_err(invalid)?;
        Ok(Self { http, bookings_url })
    }

    pub fn bookings_url(&self) -> &Url {
        &self.bookings_url
    }

    fn booking_url(&self, id: &BookingId) -> Url {
        let mut url = self.bookings_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push(&id.to_string());
        }
        url
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, StoreError> {
        let response = request.send().await.map_err(StoreError::Network)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Status { status, body });
        }
        Ok(response)
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, StoreError> {
    let bytes = response.bytes().await.map_err(StoreError::Network)?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[async_trait]
impl BookingStore for HttpBookingStore {
    /// Rows that do not fit [`BookingRecord`] are skipped so one bad row never
    /// hides the rest of the listing.
    async fn list(&self) -> Result<Vec<BookingRecord>, StoreError> {
        let response = self.send(self.http.get(self.bookings_url.clone())).await?;
        let rows: Vec<serde_json::Value> = decode(response).await?;
        let total = rows.len();
        let records: Vec<BookingRecord> = rows
            .into_iter()
            .filter_map(|row| match serde_json::from_value::<BookingRecord>(row) {
                Ok(record) => Some(record),
                Err(error) => {
                    debug!(%error, "skipping malformed listing row");
                    None
                }
            })
            .collect();
        if records.len() < total {
            debug!(total, kept = records.len(), "listing had malformed rows");
        }
        Ok(records)
    }

    async fn create(&self, request: &CreateBookingRequest) -> Result<BookingPayload, StoreError> {
        let response = self
            .send(self.http.post(self.bookings_url.clone()).json(request))
            .await?;
        decode(response).await
    }

    async fn update(
        &self,
        id: &BookingId,
        request: &UpdateBookingRequest,
    ) -> Result<(), StoreError> {
        self.send(self.http.put(self.booking_url(id)).json(request))
            .await?;
        debug!(booking_id = %id, "update acknowledged");
        Ok(())
    }

    async fn delete(&self, id: &BookingId) -> Result<(), StoreError> {
        self.send(self.http.delete(self.booking_url(id))).await?;
        debug!(booking_id = %id, "delete acknowledged");
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
