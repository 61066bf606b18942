use serde::{Deserialize, Deserializer, Serialize};
use crate::models::Movie;

/// Movie list filter. Every criterion is optional; set criteria are combined with AND.
///
/// Deserializes straight from a query string, where an empty value
/// (`?genre=`) means "no filter" rather than a parse error.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MovieFilter {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub search: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub genre: Option<i32>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub language: Option<i32>,
}

impl MovieFilter {
    pub fn matches(&self, movie: &Movie) -> bool {
        if let Some(search) = &self.search {
            if !movie.name.to_lowercase().contains(&search.to_lowercase()) {
                return false;
            }
        }
        if let Some(genre) = self.genre {
            if !movie.genre_ids.contains(&genre) {
                return false;
            }
        }
        if let Some(language) = self.language {
            if movie.language_id != Some(language) {
                return false;
            }
        }
        true
    }

    pub fn apply<'a, I>(&self, movies: I) -> Vec<Movie>
    where
        I: IntoIterator<Item = &'a Movie>,
    {
        movies.into_iter().filter(|m| self.matches(m)).cloned().collect()
    }

    /// Search term wrapped for a SQL `ILIKE` pattern, with wildcards in the user input escaped.
    pub fn search_pattern(&self) -> Option<String> {
        self.search.as_ref().map(|s| {
            let escaped = s.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
            format!("%{}%", escaped)
        })
    }
}

fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse::<T>().map(Some).map_err(serde::de::Error::custom),
    }
}
