use std::convert::Infallible;
use axum::{
    extract::{Extension, Path, State},
    middleware,
    response::sse::{Event, KeepAlive, Sse},
    routing::{get, post},
    Json, Router,
};
use futures_util::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use tokio_stream::wrappers::BroadcastStream;
use tracing::{info, warn};
use uuid::Uuid;
use cinebook_catalog::Showing;
use cinebook_core::{BookingConfirmation, Customer, ReservationError, ReservationOutcome, Seat};
use cinebook_shared::SeatsBookedEvent;
use crate::{
    error::AppError,
    middleware::{customer_auth_middleware, CustomerClaims},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct ReserveRequest {
    pub seats: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SeatMapResponse {
    pub showing: Showing,
    pub seats: Vec<Seat>,
}

pub fn routes(state: AppState) -> Router<AppState> {
    let reservations = Router::new()
        .route("/v1/showings/{id}/reservations", post(reserve_seats))
        .layer(middleware::from_fn_with_state(state, customer_auth_middleware));

    Router::new()
        .route("/v1/showings/{id}/seats", get(seat_map))
        .route("/v1/showings/{id}/stream", get(seat_stream))
        .merge(reservations)
}

/// GET /v1/showings/{id}/seats
async fn seat_map(
    State(state): State<AppState>,
    Path(showing_id): Path<Uuid>,
) -> Result<Json<SeatMapResponse>, AppError> {
    let showing = state
        .catalog
        .get_showing(showing_id)
        .await?
        .ok_or_else(|| AppError::NotFoundError(format!("Showing {} not found", showing_id)))?;
    let seats = state.seats.list_seats(showing_id).await?;

    Ok(Json(SeatMapResponse { showing, seats }))
}

/// GET /v1/showings/{id}/stream
async fn seat_stream(
    State(state): State<AppState>,
    Path(showing_id): Path<Uuid>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.sse_tx.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(move |result| async move {
        match result {
            Ok(event) if event.showing_id == showing_id => {
                match Event::default().event("seats_booked").json_data(&event) {
                    Ok(sse) => Some(Ok(sse)),
                    Err(e) => {
                        warn!("Dropping unserializable seat event: {}", e);
                        None
                    }
                }
            }
            // other showings, or a lagged receiver
            _ => None,
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// POST /v1/showings/{id}/reservations
async fn reserve_seats(
    State(state): State<AppState>,
    Extension(claims): Extension<CustomerClaims>,
    Path(showing_id): Path<Uuid>,
    Json(req): Json<ReserveRequest>,
) -> Result<Json<ReservationOutcome>, AppError> {
    let customer = claims.customer();

    match state.engine.reserve(&customer, showing_id, &req.seats).await {
        Ok(outcome) => {
            announce(&state, customer, showing_id, &outcome);
            Ok(Json(outcome))
        }
        Err(ReservationError::Interrupted { outcome, reason }) => {
            // seats claimed before the failure are real bookings
            announce(&state, customer, showing_id, &outcome);
            Err(AppError::Interrupted { outcome, reason })
        }
        Err(e) => Err(e.into()),
    }
}

/// Broadcasts the newly booked seats and hands the confirmation to the notifier
/// without waiting for delivery.
fn announce(state: &AppState, customer: Customer, showing_id: Uuid, outcome: &ReservationOutcome) {
    let seats = outcome.booked_labels();
    if seats.is_empty() {
        return;
    }

    // no subscribers is not an error
    let _ = state.sse_tx.send(SeatsBookedEvent::new(showing_id, seats.clone()));

    let catalog = state.catalog.clone();
    let notifier = state.notifier.clone();
    tokio::spawn(async move {
        let showing = match catalog.get_showing(showing_id).await {
            Ok(Some(showing)) => showing,
            Ok(None) => return,
            Err(e) => {
                warn!("Cannot load showing {} for confirmation: {}", showing_id, e);
                return;
            }
        };
        let movie = match catalog.get_movie(showing.movie_id).await {
            Ok(Some(movie)) => movie,
            Ok(None) => return,
            Err(e) => {
                warn!("Cannot load movie {} for confirmation: {}", showing.movie_id, e);
                return;
            }
        };

        let confirmation = BookingConfirmation { customer, movie, showing, seats };
        let delivered = notifier.notify_booking(&confirmation).await;
        info!(
            user_id = %confirmation.customer.id,
            showing_id = %showing_id,
            delivered,
            "Booking confirmation processed"
        );
    });
}
