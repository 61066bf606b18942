use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    middleware,
    routing::post,
    Json, Router,
};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;
use cinebook_catalog::{Movie, NewMovie, NewShowing, SeatLayout, Showing};

use crate::{
    error::AppError,
    middleware::{admin_auth_middleware, AdminClaims},
    state::AppState,
};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct LayoutResponse {
    pub showing_id: Uuid,
    pub requested: usize,
    pub created: usize,
}

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/v1/admin/movies", post(create_movie))
        .route("/v1/admin/showings", post(create_showing))
        .route("/v1/admin/showings/{id}/layout", post(create_layout))
        .layer(middleware::from_fn_with_state(state, admin_auth_middleware))
}

// ============================================================================
// Catalog Handlers
// ============================================================================

/// POST /v1/admin/movies
async fn create_movie(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminClaims>,
    Json(req): Json<NewMovie>,
) -> Result<(StatusCode, Json<Movie>), AppError> {
    req.validate()?;

    let known: Vec<i32> = state.catalog.list_genres().await?.into_iter().map(|g| g.id).collect();
    if let Some(unknown) = req.genre_ids.iter().find(|id| !known.contains(id)) {
        return Err(AppError::ValidationError(format!("Unknown genre {}", unknown)));
    }
    if let Some(language_id) = req.language_id {
        let languages = state.catalog.list_languages().await?;
        if !languages.iter().any(|l| l.id == language_id) {
            return Err(AppError::ValidationError(format!("Unknown language {}", language_id)));
        }
    }

    let movie = req.into_movie();
    state.catalog.create_movie(&movie).await?;

    info!(admin = %admin.sub, movie_id = %movie.id, "Movie created");
    Ok((StatusCode::CREATED, Json(movie)))
}

/// POST /v1/admin/showings
async fn create_showing(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminClaims>,
    Json(req): Json<NewShowing>,
) -> Result<(StatusCode, Json<Showing>), AppError> {
    req.validate()?;

    if state.catalog.get_movie(req.movie_id).await?.is_none() {
        return Err(AppError::NotFoundError(format!("Movie {} not found", req.movie_id)));
    }

    let showing = req.into_showing();
    state.catalog.create_showing(&showing).await?;

    info!(admin = %admin.sub, showing_id = %showing.id, "Showing created");
    Ok((StatusCode::CREATED, Json(showing)))
}

/// POST /v1/admin/showings/{id}/layout
///
/// Seats that already exist are left untouched, so a layout can be re-applied
/// or enlarged without touching bookings.
async fn create_layout(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminClaims>,
    Path(showing_id): Path<Uuid>,
    Json(layout): Json<SeatLayout>,
) -> Result<Json<LayoutResponse>, AppError> {
    layout.validate()?;

    if state.catalog.get_showing(showing_id).await?.is_none() {
        return Err(AppError::NotFoundError(format!("Showing {} not found", showing_id)));
    }

    let labels = layout.labels();
    let created = state.seats.create_seats(showing_id, &labels).await?;

    info!(admin = %admin.sub, %showing_id, created, "Seat layout applied");
    Ok(Json(LayoutResponse { showing_id, requested: labels.len(), created }))
}
