use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;
use sqlx::PgPool;
use cinebook_catalog::Showing;
use cinebook_core::{Booking, BookingStore, Customer, Seat};
use cinebook_shared::StoreResult;
use crate::store_error;

pub struct PostgresBookingStore {
    pool: PgPool,
}

impl PostgresBookingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: i64,
    user_id: String,
    seat_id: Uuid,
    seat_label: String,
    showing_id: Uuid,
    movie_id: Uuid,
    theater: String,
    booked_at: DateTime<Utc>,
}

impl From<BookingRow> for Booking {
    fn from(row: BookingRow) -> Self {
        Booking {
            id: row.id,
            user_id: row.user_id,
            seat_id: row.seat_id,
            seat_label: row.seat_label,
            showing_id: row.showing_id,
            movie_id: row.movie_id,
            theater: row.theater,
            booked_at: row.booked_at,
        }
    }
}

#[async_trait]
impl BookingStore for PostgresBookingStore {
    async fn create_booking(
        &self,
        customer: &Customer,
        seat: &Seat,
        showing: &Showing,
    ) -> StoreResult<Booking> {
        let (id, booked_at): (i64, DateTime<Utc>) = sqlx::query_as(
            r#"
            INSERT INTO bookings (user_id, seat_id, showing_id, movie_id, theater)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, booked_at
            "#,
        )
        .bind(&customer.id)
        .bind(seat.id)
        .bind(showing.id)
        .bind(showing.movie_id)
        .bind(&showing.theater)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| store_error("insert booking", e))?;

        Ok(Booking {
            id,
            user_id: customer.id.clone(),
            seat_id: seat.id,
            seat_label: seat.label.clone(),
            showing_id: showing.id,
            movie_id: showing.movie_id,
            theater: showing.theater.clone(),
            booked_at,
        })
    }

    async fn book_seat(
        &self,
        customer: &Customer,
        seat: &Seat,
        showing: &Showing,
    ) -> StoreResult<Option<Booking>> {
        // One statement: a unique violation on the insert rolls back the flag flip with it.
        let row: Option<(i64, DateTime<Utc>)> = sqlx::query_as(
            r#"
            WITH claimed AS (
                UPDATE seats SET is_booked = TRUE
                WHERE id = $2 AND showing_id = $3 AND is_booked = FALSE
                RETURNING id, showing_id
            )
            INSERT INTO bookings (user_id, seat_id, showing_id, movie_id, theater)
            SELECT $1, claimed.id, claimed.showing_id, $4, $5 FROM claimed
            RETURNING id, booked_at
            "#,
        )
        .bind(&customer.id)
        .bind(seat.id)
        .bind(showing.id)
        .bind(showing.movie_id)
        .bind(&showing.theater)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| store_error("book seat", e))?;

        Ok(row.map(|(id, booked_at)| Booking {
            id,
            user_id: customer.id.clone(),
            seat_id: seat.id,
            seat_label: seat.label.clone(),
            showing_id: showing.id,
            movie_id: showing.movie_id,
            theater: showing.theater.clone(),
            booked_at,
        }))
    }

    async fn list_bookings_for_user(&self, user_id: &str) -> StoreResult<Vec<Booking>> {
        let rows: Vec<BookingRow> = sqlx::query_as(
            r#"
            SELECT b.id, b.user_id, b.seat_id, s.label AS seat_label, b.showing_id,
                   b.movie_id, b.theater, b.booked_at
            FROM bookings b
            JOIN seats s ON s.id = b.seat_id
            WHERE b.user_id = $1
            ORDER BY b.id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| store_error("list bookings", e))?;

        Ok(rows.into_iter().map(Booking::from).collect())
    }

    async fn count_for_seat(&self, showing_id: Uuid, seat_id: Uuid) -> StoreResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM bookings WHERE showing_id = $1 AND seat_id = $2")
            .bind(showing_id)
            .bind(seat_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| store_error("count bookings", e))
    }
}
