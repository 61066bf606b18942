use async_trait::async_trait;
use uuid::Uuid;
use sqlx::PgPool;
use tracing::debug;
use cinebook_catalog::label_sort_key;
use cinebook_core::{Seat, SeatLedger};
use cinebook_shared::StoreResult;
use crate::store_error;

pub struct PostgresSeatLedger {
    pool: PgPool,
}

impl PostgresSeatLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct SeatRow {
    id: Uuid,
    showing_id: Uuid,
    label: String,
    is_booked: bool,
}

impl From<SeatRow> for Seat {
    fn from(row: SeatRow) -> Self {
        Seat { id: row.id, showing_id: row.showing_id, label: row.label, is_booked: row.is_booked }
    }
}

#[async_trait]
impl SeatLedger for PostgresSeatLedger {
    async fn find_seats(&self, showing_id: Uuid, labels: &[String]) -> StoreResult<Vec<Seat>> {
        let rows: Vec<SeatRow> = sqlx::query_as(
            "SELECT id, showing_id, label, is_booked FROM seats WHERE showing_id = $1 AND label = ANY($2)",
        )
        .bind(showing_id)
        .bind(labels)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| store_error("find seats", e))?;

        Ok(rows.into_iter().map(Seat::from).collect())
    }

    async fn claim_seat(&self, seat: &Seat) -> StoreResult<bool> {
        // The row lock taken by UPDATE serializes racing claims; the loser re-evaluates
        // the predicate after the winner commits and matches zero rows.
        let result = sqlx::query(
            "UPDATE seats SET is_booked = TRUE WHERE id = $1 AND showing_id = $2 AND is_booked = FALSE",
        )
        .bind(seat.id)
        .bind(seat.showing_id)
        .execute(&self.pool)
        .await
        .map_err(|e| store_error("claim seat", e))?;

        let claimed = result.rows_affected() == 1;
        debug!(seat_id = %seat.id, label = %seat.label, claimed, "Seat claim attempted");
        Ok(claimed)
    }

    async fn list_seats(&self, showing_id: Uuid) -> StoreResult<Vec<Seat>> {
        let rows: Vec<SeatRow> =
            sqlx::query_as("SELECT id, showing_id, label, is_booked FROM seats WHERE showing_id = $1")
                .bind(showing_id)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| store_error("list seats", e))?;

        let mut seats: Vec<Seat> = rows.into_iter().map(Seat::from).collect();
        seats.sort_by_cached_key(|s| label_sort_key(&s.label));
        Ok(seats)
    }

    async fn create_seats(&self, showing_id: Uuid, labels: &[String]) -> StoreResult<usize> {
        let ids: Vec<Uuid> = labels.iter().map(|_| Uuid::new_v4()).collect();

        let result = sqlx::query(
            r#"
            INSERT INTO seats (id, showing_id, label)
            SELECT seat.id, $1, seat.label FROM UNNEST($2::UUID[], $3::TEXT[]) AS seat(id, label)
            ON CONFLICT (showing_id, label) DO NOTHING
            "#,
        )
        .bind(showing_id)
        .bind(&ids)
        .bind(labels)
        .execute(&self.pool)
        .await
        .map_err(|e| store_error("create seats", e))?;

        Ok(result.rows_affected() as usize)
    }
}
