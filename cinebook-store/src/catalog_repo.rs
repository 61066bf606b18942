use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;
use sqlx::PgPool;
use cinebook_catalog::{CatalogRepository, Genre, Language, Movie, MovieFilter, Showing};
use cinebook_shared::StoreResult;
use crate::store_error;

pub struct PostgresCatalogRepository {
    pool: PgPool,
}

impl PostgresCatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal structs for type-safe querying
#[derive(sqlx::FromRow)]
struct MovieRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    cast_members: Option<String>,
    rating: Option<f32>,
    language_id: Option<i32>,
    genre_ids: Vec<i32>,
}

impl From<MovieRow> for Movie {
    fn from(row: MovieRow) -> Self {
        Movie {
            id: row.id,
            name: row.name,
            description: row.description,
            cast: row.cast_members,
            rating: row.rating,
            language_id: row.language_id,
            genre_ids: row.genre_ids,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ShowingRow {
    id: Uuid,
    movie_id: Uuid,
    theater: String,
    starts_at: DateTime<Utc>,
}

impl From<ShowingRow> for Showing {
    fn from(row: ShowingRow) -> Self {
        Showing { id: row.id, movie_id: row.movie_id, theater: row.theater, starts_at: row.starts_at }
    }
}

const MOVIE_COLUMNS: &str = r#"
    SELECT m.id, m.name, m.description, m.cast_members, m.rating, m.language_id,
           COALESCE(
               ARRAY_AGG(mg.genre_id ORDER BY mg.genre_id) FILTER (WHERE mg.genre_id IS NOT NULL),
               '{}'
           ) AS genre_ids
    FROM movies m
    LEFT JOIN movie_genres mg ON mg.movie_id = m.id
"#;

#[async_trait]
impl CatalogRepository for PostgresCatalogRepository {
    async fn list_movies(&self, filter: &MovieFilter) -> StoreResult<Vec<Movie>> {
        let sql = format!(
            r#"{}
            WHERE ($1::TEXT IS NULL OR m.name ILIKE $1)
              AND ($2::INT IS NULL OR EXISTS (
                    SELECT 1 FROM movie_genres f WHERE f.movie_id = m.id AND f.genre_id = $2))
              AND ($3::INT IS NULL OR m.language_id = $3)
            GROUP BY m.id
            ORDER BY m.name"#,
            MOVIE_COLUMNS
        );

        let rows: Vec<MovieRow> = sqlx::query_as(&sql)
            .bind(filter.search_pattern())
            .bind(filter.genre)
            .bind(filter.language)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| store_error("list movies", e))?;

        Ok(rows.into_iter().map(Movie::from).collect())
    }

    async fn get_movie(&self, id: Uuid) -> StoreResult<Option<Movie>> {
        let sql = format!("{} WHERE m.id = $1 GROUP BY m.id", MOVIE_COLUMNS);

        let row: Option<MovieRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| store_error("get movie", e))?;

        Ok(row.map(Movie::from))
    }

    async fn list_genres(&self) -> StoreResult<Vec<Genre>> {
        let rows: Vec<(i32, String)> = sqlx::query_as("SELECT id, name FROM genres ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| store_error("list genres", e))?;

        Ok(rows.into_iter().map(|(id, name)| Genre { id, name }).collect())
    }

    async fn list_languages(&self) -> StoreResult<Vec<Language>> {
        let rows: Vec<(i32, String)> = sqlx::query_as("SELECT id, name FROM languages ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| store_error("list languages", e))?;

        Ok(rows.into_iter().map(|(id, name)| Language { id, name }).collect())
    }

    async fn list_showings(&self, movie_id: Uuid) -> StoreResult<Vec<Showing>> {
        let rows: Vec<ShowingRow> = sqlx::query_as(
            "SELECT id, movie_id, theater, starts_at FROM showings WHERE movie_id = $1 ORDER BY starts_at, id",
        )
        .bind(movie_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| store_error("list showings", e))?;

        Ok(rows.into_iter().map(Showing::from).collect())
    }

    async fn get_showing(&self, id: Uuid) -> StoreResult<Option<Showing>> {
        let row: Option<ShowingRow> =
            sqlx::query_as("SELECT id, movie_id, theater, starts_at FROM showings WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| store_error("get showing", e))?;

        Ok(row.map(Showing::from))
    }

    async fn create_movie(&self, movie: &Movie) -> StoreResult<()> {
        let mut tx = self.pool.begin().await.map_err(|e| store_error("begin transaction", e))?;

        sqlx::query(
            r#"
            INSERT INTO movies (id, name, description, cast_members, rating, language_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(movie.id)
        .bind(&movie.name)
        .bind(&movie.description)
        .bind(&movie.cast)
        .bind(movie.rating)
        .bind(movie.language_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| store_error("insert movie", e))?;

        sqlx::query(
            "INSERT INTO movie_genres (movie_id, genre_id) SELECT $1, UNNEST($2::INT[]) ON CONFLICT DO NOTHING",
        )
        .bind(movie.id)
        .bind(&movie.genre_ids)
        .execute(&mut *tx)
        .await
        .map_err(|e| store_error("insert movie genres", e))?;

        tx.commit().await.map_err(|e| store_error("commit movie", e))?;
        Ok(())
    }

    async fn create_showing(&self, showing: &Showing) -> StoreResult<()> {
        sqlx::query("INSERT INTO showings (id, movie_id, theater, starts_at) VALUES ($1, $2, $3, $4)")
            .bind(showing.id)
            .bind(showing.movie_id)
            .bind(&showing.theater)
            .bind(showing.starts_at)
            .execute(&self.pool)
            .await
            .map_err(|e| store_error("insert showing", e))?;

        Ok(())
    }
}
