use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use cinebook_shared::Masked;

/// The authenticated person making a reservation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Customer {
    pub id: String,
    pub email: Option<Masked<String>>,
    pub name: Option<String>,
}

impl Customer {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: None,
            name: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(Masked(email.into()));
        self
    }
}

/// One seat of one showing. `is_booked` only ever moves from false to true, through a claim.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Seat {
    pub id: Uuid,
    pub showing_id: Uuid,
    pub label: String,
    pub is_booked: bool,
}

/// Confirmed booking of one seat by one customer. Immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Booking {
    pub id: i64,
    pub user_id: String,
    pub seat_id: Uuid,
    pub seat_label: String,
    pub showing_id: Uuid,
    pub movie_id: Uuid,
    pub theater: String,
    pub booked_at: DateTime<Utc>,
}
