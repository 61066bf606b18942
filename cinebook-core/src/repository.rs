use async_trait::async_trait;
use uuid::Uuid;
use cinebook_catalog::Showing;
use cinebook_shared::StoreResult;
use crate::models::{Booking, Customer, Seat};

/// Durable record of the seats of every showing and their booked flag.
#[async_trait]
pub trait SeatLedger: Send + Sync {
    /// Seats of `showing_id` whose label is in `labels`. Unknown labels are simply absent.
    async fn find_seats(&self, showing_id: Uuid, labels: &[String]) -> StoreResult<Vec<Seat>>;

    /// Atomically flips the booked flag from false to true.
    ///
    /// Returns `true` only for the single call that performed the flip; every other
    /// caller, concurrent or later, gets `false`. Implementations must guarantee this
    /// with the storage layer's own atomicity (a conditional update), since callers
    /// may run in different processes.
    async fn claim_seat(&self, seat: &Seat) -> StoreResult<bool>;

    /// Full seat map of a showing in natural label order.
    async fn list_seats(&self, showing_id: Uuid) -> StoreResult<Vec<Seat>>;

    /// Inserts free seats for the given labels, skipping labels that already exist.
    /// Returns how many seats were created.
    async fn create_seats(&self, showing_id: Uuid, labels: &[String]) -> StoreResult<usize>;
}

/// Append-only log of confirmed bookings, unique per (seat, showing).
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Fails with `StoreError::ConstraintViolation` when the seat already has a booking.
    async fn create_booking(
        &self,
        customer: &Customer,
        seat: &Seat,
        showing: &Showing,
    ) -> StoreResult<Booking>;

    /// Claims `seat` and records its booking as one atomic storage operation: the
    /// booked flag flips and the booking row is written together, or nothing changes.
    ///
    /// `Ok(None)` means the seat was already claimed. A `ConstraintViolation` means a
    /// booking row already exists for the seat; the flag is left as it was.
    async fn book_seat(
        &self,
        customer: &Customer,
        seat: &Seat,
        showing: &Showing,
    ) -> StoreResult<Option<Booking>>;

    /// Newest first.
    async fn list_bookings_for_user(&self, user_id: &str) -> StoreResult<Vec<Booking>>;

    async fn count_for_seat(&self, showing_id: Uuid, seat_id: Uuid) -> StoreResult<i64>;
}
