use async_trait::async_trait;
use serde::Serialize;
use cinebook_catalog::{Movie, Showing};
use crate::models::Customer;

/// Everything a confirmation message needs about a committed reservation.
#[derive(Debug, Clone, Serialize)]
pub struct BookingConfirmation {
    pub customer: Customer,
    pub movie: Movie,
    pub showing: Showing,
    pub seats: Vec<String>,
}

/// Best-effort delivery of booking confirmations.
///
/// Returns whether the confirmation was delivered. Callers log a `false` and move on;
/// a failed notification never affects the bookings it describes.
#[async_trait]
pub trait BookingNotifier: Send + Sync {
    async fn notify_booking(&self, confirmation: &BookingConfirmation) -> bool;
}
