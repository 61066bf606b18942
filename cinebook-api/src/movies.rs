use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use uuid::Uuid;
use cinebook_catalog::{Genre, Language, Movie, MovieFilter, Showing};
use crate::{error::AppError, state::AppState};

#[derive(Debug, Serialize)]
pub struct MovieListResponse {
    pub movies: Vec<Movie>,
    pub genres: Vec<Genre>,
    pub languages: Vec<Language>,
}

#[derive(Debug, Serialize)]
pub struct MovieShowingsResponse {
    pub movie: Movie,
    pub showings: Vec<Showing>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/movies", get(list_movies))
        .route("/v1/movies/{id}/showings", get(movie_showings))
}

/// GET /v1/movies?search=&genre=&language=
async fn list_movies(
    State(state): State<AppState>,
    Query(filter): Query<MovieFilter>,
) -> Result<Json<MovieListResponse>, AppError> {
    let movies = state.catalog.list_movies(&filter).await?;
    let genres = state.catalog.list_genres().await?;
    let languages = state.catalog.list_languages().await?;

    Ok(Json(MovieListResponse { movies, genres, languages }))
}

/// GET /v1/movies/{id}/showings
async fn movie_showings(
    State(state): State<AppState>,
    Path(movie_id): Path<Uuid>,
) -> Result<Json<MovieShowingsResponse>, AppError> {
    let movie = state
        .catalog
        .get_movie(movie_id)
        .await?
        .ok_or_else(|| AppError::NotFoundError(format!("Movie {} not found", movie_id)))?;
    let showings = state.catalog.list_showings(movie_id).await?;

    Ok(Json(MovieShowingsResponse { movie, showings }))
}
