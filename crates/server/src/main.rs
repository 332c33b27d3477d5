use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use server_api::{create_booking, delete_booking, list_bookings, update_booking, ApiContext};
use shared::{
    domain::BookingId,
    error::{ApiError, ErrorCode},
    protocol::{
        bookings_route, BookingPayload, BookingRecord, CreateBookingRequest, UpdateBookingRequest,
    },
};
use storage::Storage;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod app_state;
mod config;

use app_state::AppState;
use config::{load_settings, prepare_database_url};

type HttpResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = load_settings();
    let database_url = prepare_database_url(&settings.database_url)?;
    let storage = Storage::new(&database_url).await.map_err(|error| {
        error!(
            %database_url,
            %error,
            "failed to open SQLite database; verify parent directory exists and permissions are correct"
        );
        error
    })?;

    let state = AppState {
        api: ApiContext { storage },
    };
    let app = build_router(Arc::new(state), settings.max_body_bytes);

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, "bookings store listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        error!(%error, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

fn build_router(state: Arc<AppState>, max_body_bytes: usize) -> Router {
    let booking_path = format!("{}/:booking_id", bookings_route());
    Router::new()
        .route("/healthz", get(healthz))
        .route(
            bookings_route(),
            get(http_list_bookings).post(http_create_booking),
        )
        .route(
            &booking_path,
            put(http_update_booking).delete(http_delete_booking),
        )
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Validation => StatusCode::BAD_REQUEST,
        ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn http_error(err: ApiError) -> (StatusCode, Json<ApiError>) {
    let status = status_for(err.code);
    if status.is_server_error() {
        error!(message = %err.message, "bookings request failed");
    }
    (status, Json(err))
}

async fn healthz(State(state): State<Arc<AppState>>) -> HttpResult<&'static str> {
    state.api.storage.health_check().await.map_err(|e| {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ApiError::new(ErrorCode::Internal, e.to_string())),
        )
    })?;
    Ok("ok")
}

async fn http_list_bookings(
    State(state): State<Arc<AppState>>,
) -> HttpResult<Json<Vec<BookingRecord>>> {
    let bookings = list_bookings(&state.api).await.map_err(http_error)?;
    Ok(Json(bookings))
}

async fn http_create_booking(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateBookingRequest>,
) -> HttpResult<(StatusCode, Json<BookingPayload>)> {
    let booking = create_booking(&state.api, &req)
        .await
        .map_err(http_error)?;
    Ok((StatusCode::CREATED, Json(booking)))
}

async fn http_update_booking(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<String>,
    Json(req): Json<UpdateBookingRequest>,
) -> HttpResult<Json<BookingPayload>> {
    let booking = update_booking(&state.api, BookingId::from_segment(&booking_id), &req)
        .await
        .map_err(http_error)?;
    Ok(Json(booking))
}

async fn http_delete_booking(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<String>,
) -> HttpResult<StatusCode> {
    delete_booking(&state.api, BookingId::from_segment(&booking_id))
        .await
        .map_err(http_error)?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
