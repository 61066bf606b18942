use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use tracing::{debug, info, warn};
use uuid::Uuid;
use cinebook_catalog::{CatalogRepository, Showing};
use cinebook_shared::StoreError;
use crate::models::{Booking, Customer, Seat};
use crate::repository::{BookingStore, SeatLedger};

/// Why a requested seat was not booked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RejectionReason {
    /// No seat with this label belongs to the showing.
    SeatNotFoundInShowing,
    /// The seat was already booked when the request looked it up.
    AlreadyBooked,
    /// The seat was free at lookup but a concurrent request claimed it first.
    LostRace,
    /// Storage failed before this seat could be claimed.
    StorageUnavailable,
}

impl RejectionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectionReason::SeatNotFoundInShowing => "seat-not-found-in-showing",
            RejectionReason::AlreadyBooked => "already-booked",
            RejectionReason::LostRace => "lost-race",
            RejectionReason::StorageUnavailable => "storage-unavailable",
        }
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Serialized for callers as `{"seat_label", "booking_id"}`; the full booking stays in process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookedSeat {
    pub seat_label: String,
    pub booking: Booking,
}

impl Serialize for BookedSeat {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut entry = serializer.serialize_struct("BookedSeat", 2)?;
        entry.serialize_field("seat_label", &self.seat_label)?;
        entry.serialize_field("booking_id", &self.booking.id)?;
        entry.end()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedSeat {
    pub seat_label: String,
    pub reason: RejectionReason,
}

/// Per-seat result of one reservation request.
///
/// Every distinct requested label appears exactly once, either in `booked` or in
/// `rejected`, and each list keeps the order in which the labels were requested.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReservationOutcome {
    pub booked: Vec<BookedSeat>,
    pub rejected: Vec<RejectedSeat>,
}

impl ReservationOutcome {
    fn book(&mut self, label: &str, booking: Booking) {
        self.booked.push(BookedSeat {
            seat_label: label.to_string(),
            booking,
        });
    }

    fn reject(&mut self, label: &str, reason: RejectionReason) {
        self.rejected.push(RejectedSeat {
            seat_label: label.to_string(),
            reason,
        });
    }

    pub fn booked_labels(&self) -> Vec<String> {
        self.booked.iter().map(|b| b.seat_label.clone()).collect()
    }

    pub fn booking_for(&self, label: &str) -> Option<&Booking> {
        self.booked
            .iter()
            .find(|b| b.seat_label == label)
            .map(|b| &b.booking)
    }

    pub fn reason_for(&self, label: &str) -> Option<RejectionReason> {
        self.rejected
            .iter()
            .find(|r| r.seat_label == label)
            .map(|r| r.reason)
    }

    pub fn is_fully_booked(&self) -> bool {
        self.rejected.is_empty() && !self.booked.is_empty()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReservationError {
    #[error("No seat selected")]
    EmptySelection,
    #[error("Showing not found: {0}")]
    ShowingNotFound(Uuid),
    /// Nothing was attempted: the showing or its seats could not be looked up.
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),
    /// Storage failed part-way through. `outcome` is the true mixed result: seats claimed
    /// before the failure stay booked, the rest are rejected as `storage-unavailable`.
    #[error("Reservation interrupted by storage failure: {reason}")]
    Interrupted {
        outcome: ReservationOutcome,
        reason: String,
    },
}

impl From<StoreError> for ReservationError {
    fn from(err: StoreError) -> Self {
        ReservationError::StorageUnavailable(err.to_string())
    }
}

enum Claim {
    Won(Booking),
    Lost,
}

/// Turns a set of requested seat labels into confirmed bookings.
///
/// All mutual exclusion lives in the storage collaborators: the engine holds no locks
/// and can run in as many processes as share the ledger.
pub struct ReservationEngine {
    catalog: Arc<dyn CatalogRepository>,
    seats: Arc<dyn SeatLedger>,
    bookings: Arc<dyn BookingStore>,
}

impl ReservationEngine {
    pub fn new(
        catalog: Arc<dyn CatalogRepository>,
        seats: Arc<dyn SeatLedger>,
        bookings: Arc<dyn BookingStore>,
    ) -> Self {
        Self {
            catalog,
            seats,
            bookings,
        }
    }

    pub async fn reserve(
        &self,
        customer: &Customer,
        showing_id: Uuid,
        seat_labels: &[String],
    ) -> Result<ReservationOutcome, ReservationError> {
        if seat_labels.is_empty() {
            return Err(ReservationError::EmptySelection);
        }

        // Collapse repeats so each label is reported once, first occurrence wins
        let mut seen = HashSet::new();
        let requested: Vec<&str> = seat_labels
            .iter()
            .map(String::as_str)
            .filter(|label| seen.insert(*label))
            .collect();
        if requested.len() < seat_labels.len() {
            debug!("Ignoring {} duplicate seat label(s)", seat_labels.len() - requested.len());
        }

        // 1. Resolve showing and seats
        let showing = self
            .catalog
            .get_showing(showing_id)
            .await?
            .ok_or(ReservationError::ShowingNotFound(showing_id))?;

        let owned: Vec<String> = requested.iter().map(|l| l.to_string()).collect();
        let found = self.seats.find_seats(showing.id, &owned).await?;
        let by_label: HashMap<&str, &Seat> = found.iter().map(|s| (s.label.as_str(), s)).collect();

        // 2. Claim in caller order
        let mut outcome = ReservationOutcome::default();
        for (index, label) in requested.iter().enumerate() {
            let seat = match by_label.get(label) {
                Some(seat) => *seat,
                None => {
                    outcome.reject(label, RejectionReason::SeatNotFoundInShowing);
                    continue;
                }
            };

            if seat.is_booked {
                outcome.reject(label, RejectionReason::AlreadyBooked);
                continue;
            }

            match self.claim(customer, &showing, seat).await {
                Ok(Claim::Won(booking)) => outcome.book(label, booking),
                Ok(Claim::Lost) => outcome.reject(label, RejectionReason::LostRace),
                Err(e) => {
                    outcome.reject(label, RejectionReason::StorageUnavailable);
                    for remaining in &requested[index + 1..] {
                        let reason = match by_label.get(remaining) {
                            None => RejectionReason::SeatNotFoundInShowing,
                            Some(seat) if seat.is_booked => RejectionReason::AlreadyBooked,
                            Some(_) => RejectionReason::StorageUnavailable,
                        };
                        outcome.reject(remaining, reason);
                    }
                    warn!(
                        "Reservation for showing {} interrupted after {} booked seat(s): {}",
                        showing.id,
                        outcome.booked.len(),
                        e
                    );
                    return Err(ReservationError::Interrupted {
                        outcome,
                        reason: e.to_string(),
                    });
                }
            }
        }

        info!(
            "Reservation by {} for showing {}: {} booked, {} rejected",
            customer.id,
            showing.id,
            outcome.booked.len(),
            outcome.rejected.len()
        );

        Ok(outcome)
    }

    /// Claim one seat and write its booking in a single storage operation.
    ///
    /// A unique-constraint violation on the booking means another request owns the
    /// seat and is reported as a lost race. Any other failure leaves the seat untouched.
    async fn claim(&self, customer: &Customer, showing: &Showing, seat: &Seat) -> Result<Claim, StoreError> {
        match self.bookings.book_seat(customer, seat, showing).await {
            Ok(Some(booking)) => Ok(Claim::Won(booking)),
            Ok(None) => {
                debug!("Lost claim on seat {} of showing {}", seat.label, showing.id);
                Ok(Claim::Lost)
            }
            Err(StoreError::ConstraintViolation(detail)) => {
                warn!("Seat {} of showing {} already has a booking: {}", seat.label, showing.id, detail);
                Ok(Claim::Lost)
            }
            Err(e) => Err(e),
        }
    }
}
