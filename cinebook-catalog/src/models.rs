use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use crate::{CatalogError, CatalogResult, MAX_GENRES_PER_MOVIE};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Genre {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Language {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Movie {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub cast: Option<String>,
    pub rating: Option<f32>,
    pub language_id: Option<i32>,
    pub genre_ids: Vec<i32>,
}

/// Admin payload for registering a movie.
#[derive(Debug, Clone, Deserialize)]
pub struct NewMovie {
    pub name: String,
    pub description: Option<String>,
    pub cast: Option<String>,
    pub rating: Option<f32>,
    pub language_id: Option<i32>,
    pub genre_ids: Vec<i32>,
}

impl NewMovie {
    /// A movie needs a name and between one and eight distinct genres.
    pub fn validate(&self) -> CatalogResult<()> {
        if self.name.trim().is_empty() {
            return Err(CatalogError::Validation("Movie name must not be empty".to_string()));
        }

        let mut genres = self.genre_ids.clone();
        genres.sort_unstable();
        genres.dedup();

        if genres.is_empty() {
            return Err(CatalogError::Validation("You must select at least one genre.".to_string()));
        }
        if genres.len() > MAX_GENRES_PER_MOVIE {
            return Err(CatalogError::Validation(format!(
                "You cannot select more than {} genres.",
                MAX_GENRES_PER_MOVIE
            )));
        }
        if let Some(rating) = self.rating {
            if !(0.0..=10.0).contains(&rating) {
                return Err(CatalogError::Validation(format!("Rating {} is outside 0-10", rating)));
            }
        }

        Ok(())
    }

    pub fn into_movie(self) -> Movie {
        let mut genre_ids = self.genre_ids;
        genre_ids.sort_unstable();
        genre_ids.dedup();

        Movie {
            id: Uuid::new_v4(),
            name: self.name.trim().to_string(),
            description: self.description,
            cast: self.cast,
            rating: self.rating,
            language_id: self.language_id,
            genre_ids,
        }
    }
}

/// One screening of a movie at a theater at a given time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Showing {
    pub id: Uuid,
    pub movie_id: Uuid,
    pub theater: String,
    pub starts_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewShowing {
    pub movie_id: Uuid,
    pub theater: String,
    pub starts_at: DateTime<Utc>,
}

impl NewShowing {
    pub fn validate(&self) -> CatalogResult<()> {
        if self.theater.trim().is_empty() {
            return Err(CatalogError::Validation("Theater name must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn into_showing(self) -> Showing {
        Showing {
            id: Uuid::new_v4(),
            movie_id: self.movie_id,
            theater: self.theater.trim().to_string(),
            starts_at: self.starts_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_movie(genre_ids: Vec<i32>) -> NewMovie {
        NewMovie {
            name: "Arrival".to_string(),
            description: None,
            cast: Some("Amy Adams".to_string()),
            rating: Some(7.9),
            language_id: Some(1),
            genre_ids,
        }
    }

    #[test]
    fn test_movie_requires_a_genre() {
        let err = new_movie(vec![]).validate().unwrap_err();
        assert_eq!(err, CatalogError::Validation("You must select at least one genre.".to_string()));
    }

    #[test]
    fn test_movie_genre_limit() {
        assert!(new_movie((1..=8).collect()).validate().is_ok());
        assert!(new_movie((1..=9).collect()).validate().is_err());
        // duplicates collapse before counting
        assert!(new_movie(vec![1, 1, 1, 2, 2, 3, 4, 5, 6, 7, 8]).validate().is_ok());
    }

    #[test]
    fn test_movie_name_and_rating() {
        let mut movie = new_movie(vec![1]);
        movie.name = "   ".to_string();
        assert!(movie.validate().is_err());

        let mut movie = new_movie(vec![1]);
        movie.rating = Some(11.0);
        assert!(movie.validate().is_err());
    }

    #[test]
    fn test_into_movie_normalizes_genres() {
        let movie = new_movie(vec![3, 1, 3]).into_movie();
        assert_eq!(movie.genre_ids, vec![1, 3]);
        assert_eq!(movie.name, "Arrival");
    }
}
