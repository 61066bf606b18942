pub mod models;
pub mod filter;
pub mod layout;
pub mod repository;

pub use models::{Genre, Language, Movie, NewMovie, NewShowing, Showing};
pub use filter::MovieFilter;
pub use layout::{label_sort_key, SeatLayout};
pub use repository::CatalogRepository;

/// Maximum number of genres a movie may be tagged with.
pub const MAX_GENRES_PER_MOVIE: usize = 8;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Invalid seat layout: {0}")]
    InvalidLayout(String),
}

pub type CatalogResult<T> = Result<T, CatalogError>;
