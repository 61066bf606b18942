use axum::{
    extract::{Extension, State},
    middleware,
    routing::get,
    Json, Router,
};
use cinebook_core::Booking;
use crate::{
    error::AppError,
    middleware::{customer_auth_middleware, CustomerClaims},
    state::AppState,
};

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/v1/bookings", get(my_bookings))
        .layer(middleware::from_fn_with_state(state, customer_auth_middleware))
}

/// GET /v1/bookings, newest first.
async fn my_bookings(
    State(state): State<AppState>,
    Extension(claims): Extension<CustomerClaims>,
) -> Result<Json<Vec<Booking>>, AppError> {
    let bookings = state.bookings.list_bookings_for_user(&claims.sub).await?;
    Ok(Json(bookings))
}
