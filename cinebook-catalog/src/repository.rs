use async_trait::async_trait;
use uuid::Uuid;
use cinebook_shared::StoreResult;
use crate::filter::MovieFilter;
use crate::models::{Genre, Language, Movie, Showing};

/// Repository trait for catalog data access (movies, genres, languages, showings)
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn list_movies(&self, filter: &MovieFilter) -> StoreResult<Vec<Movie>>;

    async fn get_movie(&self, id: Uuid) -> StoreResult<Option<Movie>>;

    async fn list_genres(&self) -> StoreResult<Vec<Genre>>;

    async fn list_languages(&self) -> StoreResult<Vec<Language>>;

    /// Showings of one movie, earliest first.
    async fn list_showings(&self, movie_id: Uuid) -> StoreResult<Vec<Showing>>;

    async fn get_showing(&self, id: Uuid) -> StoreResult<Option<Showing>>;

    async fn create_movie(&self, movie: &Movie) -> StoreResult<()>;

    async fn create_showing(&self, showing: &Showing) -> StoreResult<()>;
}
