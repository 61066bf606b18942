pub mod models;
pub mod repository;
pub mod reservation;
pub mod notification;
pub mod memory;

pub use models::{Booking, Customer, Seat};
pub use repository::{BookingStore, SeatLedger};
pub use reservation::{
    BookedSeat, RejectedSeat, RejectionReason, ReservationEngine, ReservationError,
    ReservationOutcome,
};
pub use notification::{BookingConfirmation, BookingNotifier};
pub use memory::MemoryStore;
