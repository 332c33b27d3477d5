use reqwest::StatusCode;
use thiserror::Error;

/// Ways a round trip to the bookings store can fail.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid bookings store url '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("bookings store unreachable: {0}")]
    Network(#[source] reqwest::Error),
    #[error("bookings store answered {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("malformed bookings store response: {0}")]
    Decode(#[from] serde_json::Error),
}
