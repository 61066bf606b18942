use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;
use cinebook_catalog::{label_sort_key, CatalogRepository, Genre, Language, Movie, MovieFilter, Showing};
use cinebook_shared::{StoreError, StoreResult};
use crate::models::{Booking, Customer, Seat};
use crate::repository::{BookingStore, SeatLedger};

/// In-process implementation of the catalog, seat ledger and booking store.
///
/// Every trait operation runs inside one critical section over the whole state, which is
/// what makes `claim_seat` a true compare-and-set and lets the booking set enforce the
/// (seat, showing) uniqueness the same way a database constraint would. Only suitable for
/// a single process; deployments sharing state use the Postgres store.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
    accesses: AtomicUsize,
    writes: AtomicUsize,
    unavailable: AtomicBool,
}

#[derive(Default)]
struct State {
    genres: Vec<Genre>,
    languages: Vec<Language>,
    movies: Vec<Movie>,
    showings: Vec<Showing>,
    seats: HashMap<Uuid, Vec<Seat>>,
    bookings: Vec<Booking>,
    booked_keys: HashSet<(Uuid, Uuid)>,
    next_booking_id: i64,
}

impl State {
    /// Appends a booking, enforcing one booking per (seat, showing).
    fn record_booking(&mut self, customer: &Customer, seat: &Seat, showing: &Showing) -> StoreResult<Booking> {
        if !self.booked_keys.insert((seat.id, showing.id)) {
            return Err(StoreError::ConstraintViolation(format!(
                "seat {} of showing {} is already booked",
                seat.label, showing.id
            )));
        }

        self.next_booking_id += 1;
        let booking = Booking {
            id: self.next_booking_id,
            user_id: customer.id.clone(),
            seat_id: seat.id,
            seat_label: seat.label.clone(),
            showing_id: showing.id,
            movie_id: showing.movie_id,
            theater: showing.theater.clone(),
            booked_at: Utc::now(),
        };
        self.bookings.push(booking.clone());
        Ok(booking)
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, State>> {
        self.accesses.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store is offline".to_string()));
        }
        self.state
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }

    fn wrote(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }

    pub fn add_genre(&self, name: &str) -> StoreResult<Genre> {
        let mut state = self.lock()?;
        let genre = Genre {
            id: state.genres.len() as i32 + 1,
            name: name.to_string(),
        };
        state.genres.push(genre.clone());
        self.wrote();
        Ok(genre)
    }

    pub fn add_language(&self, name: &str) -> StoreResult<Language> {
        let mut state = self.lock()?;
        let language = Language {
            id: state.languages.len() as i32 + 1,
            name: name.to_string(),
        };
        state.languages.push(language.clone());
        self.wrote();
        Ok(language)
    }

    /// Current state of one seat, bypassing the access counters.
    pub fn seat(&self, showing_id: Uuid, label: &str) -> Option<Seat> {
        let state = self.state.lock().ok()?;
        state
            .seats
            .get(&showing_id)
            .and_then(|seats| seats.iter().find(|s| s.label == label).cloned())
    }

    pub fn booking_count(&self) -> usize {
        self.state.lock().map(|s| s.bookings.len()).unwrap_or(0)
    }

    /// Number of storage operations attempted so far.
    pub fn accesses(&self) -> usize {
        self.accesses.load(Ordering::SeqCst)
    }

    /// Number of storage operations that mutated state.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Simulates an outage: while set, every operation fails with `StoreError::Unavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }
}

#[async_trait]
impl CatalogRepository for MemoryStore {
    async fn list_movies(&self, filter: &MovieFilter) -> StoreResult<Vec<Movie>> {
        let state = self.lock()?;
        let mut movies = filter.apply(&state.movies);
        movies.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(movies)
    }

    async fn get_movie(&self, id: Uuid) -> StoreResult<Option<Movie>> {
        let state = self.lock()?;
        Ok(state.movies.iter().find(|m| m.id == id).cloned())
    }

    async fn list_genres(&self) -> StoreResult<Vec<Genre>> {
        Ok(self.lock()?.genres.clone())
    }

    async fn list_languages(&self) -> StoreResult<Vec<Language>> {
        Ok(self.lock()?.languages.clone())
    }

    async fn list_showings(&self, movie_id: Uuid) -> StoreResult<Vec<Showing>> {
        let state = self.lock()?;
        let mut showings: Vec<Showing> = state
            .showings
            .iter()
            .filter(|s| s.movie_id == movie_id)
            .cloned()
            .collect();
        showings.sort_by_key(|s| s.starts_at);
        Ok(showings)
    }

    async fn get_showing(&self, id: Uuid) -> StoreResult<Option<Showing>> {
        let state = self.lock()?;
        Ok(state.showings.iter().find(|s| s.id == id).cloned())
    }

    async fn create_movie(&self, movie: &Movie) -> StoreResult<()> {
        let mut state = self.lock()?;
        if state.movies.iter().any(|m| m.id == movie.id) {
            return Err(StoreError::ConstraintViolation(format!("movie {} exists", movie.id)));
        }
        state.movies.push(movie.clone());
        self.wrote();
        Ok(())
    }

    async fn create_showing(&self, showing: &Showing) -> StoreResult<()> {
        let mut state = self.lock()?;
        if state.showings.iter().any(|s| s.id == showing.id) {
            return Err(StoreError::ConstraintViolation(format!("showing {} exists", showing.id)));
        }
        state.showings.push(showing.clone());
        self.wrote();
        Ok(())
    }
}

#[async_trait]
impl SeatLedger for MemoryStore {
    async fn find_seats(&self, showing_id: Uuid, labels: &[String]) -> StoreResult<Vec<Seat>> {
        let state = self.lock()?;
        let wanted: HashSet<&str> = labels.iter().map(String::as_str).collect();
        Ok(state
            .seats
            .get(&showing_id)
            .map(|seats| {
                seats
                    .iter()
                    .filter(|s| wanted.contains(s.label.as_str()))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn claim_seat(&self, seat: &Seat) -> StoreResult<bool> {
        let mut state = self.lock()?;
        let stored = state
            .seats
            .get_mut(&seat.showing_id)
            .and_then(|seats| seats.iter_mut().find(|s| s.id == seat.id));

        match stored {
            Some(stored) if !stored.is_booked => {
                stored.is_booked = true;
                self.wrote();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn list_seats(&self, showing_id: Uuid) -> StoreResult<Vec<Seat>> {
        let state = self.lock()?;
        let mut seats = state.seats.get(&showing_id).cloned().unwrap_or_default();
        seats.sort_by_key(|s| label_sort_key(&s.label));
        Ok(seats)
    }

    async fn create_seats(&self, showing_id: Uuid, labels: &[String]) -> StoreResult<usize> {
        let mut state = self.lock()?;
        let seats = state.seats.entry(showing_id).or_default();
        let mut created = 0;
        for label in labels {
            if seats.iter().any(|s| &s.label == label) {
                continue;
            }
            seats.push(Seat {
                id: Uuid::new_v4(),
                showing_id,
                label: label.clone(),
                is_booked: false,
            });
            created += 1;
        }
        if created > 0 {
            self.wrote();
        }
        Ok(created)
    }
}

#[async_trait]
impl BookingStore for MemoryStore {
    async fn create_booking(
        &self,
        customer: &Customer,
        seat: &Seat,
        showing: &Showing,
    ) -> StoreResult<Booking> {
        let mut state = self.lock()?;
        let booking = state.record_booking(customer, seat, showing)?;
        self.wrote();
        Ok(booking)
    }

    async fn book_seat(
        &self,
        customer: &Customer,
        seat: &Seat,
        showing: &Showing,
    ) -> StoreResult<Option<Booking>> {
        let mut state = self.lock()?;
        let stored = state
            .seats
            .get(&seat.showing_id)
            .and_then(|seats| seats.iter().position(|s| s.id == seat.id && !s.is_booked));
        let Some(index) = stored else {
            return Ok(None);
        };

        let booking = state.record_booking(customer, seat, showing)?;
        if let Some(seats) = state.seats.get_mut(&seat.showing_id) {
            seats[index].is_booked = true;
        }
        self.wrote();
        Ok(Some(booking))
    }

    async fn list_bookings_for_user(&self, user_id: &str) -> StoreResult<Vec<Booking>> {
        let state = self.lock()?;
        let mut bookings: Vec<Booking> = state
            .bookings
            .iter()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect();
        bookings.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(bookings)
    }

    async fn count_for_seat(&self, showing_id: Uuid, seat_id: Uuid) -> StoreResult<i64> {
        let state = self.lock()?;
        Ok(state
            .bookings
            .iter()
            .filter(|b| b.showing_id == showing_id && b.seat_id == seat_id)
            .count() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn showing() -> Showing {
        Showing {
            id: Uuid::new_v4(),
            movie_id: Uuid::new_v4(),
            theater: "Hall B".to_string(),
            starts_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_claim_is_compare_and_set() {
        let store = MemoryStore::new();
        let showing = showing();
        store.create_seats(showing.id, &["A1".to_string()]).await.unwrap();
        let seat = store.seat(showing.id, "A1").unwrap();

        assert!(store.claim_seat(&seat).await.unwrap());
        assert!(!store.claim_seat(&seat).await.unwrap());
        assert!(store.seat(showing.id, "A1").unwrap().is_booked);
    }

    #[tokio::test]
    async fn test_booking_unique_per_seat() {
        let store = MemoryStore::new();
        let showing = showing();
        store.create_seats(showing.id, &["C4".to_string()]).await.unwrap();
        let seat = store.seat(showing.id, "C4").unwrap();

        let first = store.create_booking(&Customer::new("a"), &seat, &showing).await.unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(first.theater, "Hall B");

        let second = store.create_booking(&Customer::new("b"), &seat, &showing).await;
        assert!(matches!(second, Err(StoreError::ConstraintViolation(_))));
        assert_eq!(store.count_for_seat(showing.id, seat.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_book_seat_is_all_or_nothing() {
        let store = MemoryStore::new();
        let showing = showing();
        store
            .create_seats(showing.id, &["D1".to_string(), "D2".to_string()])
            .await
            .unwrap();

        // a stray booking row for D1 blocks the claim without flipping the flag
        let d1 = store.seat(showing.id, "D1").unwrap();
        store.create_booking(&Customer::new("a"), &d1, &showing).await.unwrap();
        let err = store.book_seat(&Customer::new("b"), &d1, &showing).await.unwrap_err();
        assert!(matches!(err, StoreError::ConstraintViolation(_)));
        assert!(!store.seat(showing.id, "D1").unwrap().is_booked);

        let d2 = store.seat(showing.id, "D2").unwrap();
        let booking = store.book_seat(&Customer::new("b"), &d2, &showing).await.unwrap().unwrap();
        assert_eq!(booking.seat_label, "D2");
        assert!(store.seat(showing.id, "D2").unwrap().is_booked);

        assert!(store.book_seat(&Customer::new("c"), &d2, &showing).await.unwrap().is_none());
        assert_eq!(store.count_for_seat(showing.id, d2.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_create_seats_is_idempotent_and_ordered() {
        let store = MemoryStore::new();
        let showing_id = Uuid::new_v4();
        let labels: Vec<String> = ["A10", "A2", "B1", "A1"].iter().map(|s| s.to_string()).collect();

        assert_eq!(store.create_seats(showing_id, &labels).await.unwrap(), 4);
        assert_eq!(store.create_seats(showing_id, &labels[..2]).await.unwrap(), 0);

        let listed: Vec<String> = store
            .list_seats(showing_id)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.label)
            .collect();
        assert_eq!(listed, vec!["A1", "A2", "A10", "B1"]);
    }

    #[tokio::test]
    async fn test_outage_fails_every_operation() {
        let store = MemoryStore::new();
        store.set_unavailable(true);

        let err = store.list_genres().await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));

        store.set_unavailable(false);
        assert!(store.list_genres().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_bookings_newest_first() {
        let store = MemoryStore::new();
        let showing = showing();
        store
            .create_seats(showing.id, &["A1".to_string(), "A2".to_string()])
            .await
            .unwrap();
        for label in ["A1", "A2"] {
            let seat = store.seat(showing.id, label).unwrap();
            store.create_booking(&Customer::new("fan"), &seat, &showing).await.unwrap();
        }

        let bookings = store.list_bookings_for_user("fan").await.unwrap();
        let labels: Vec<&str> = bookings.iter().map(|b| b.seat_label.as_str()).collect();
        assert_eq!(labels, vec!["A2", "A1"]);
        assert!(store.list_bookings_for_user("someone-else").await.unwrap().is_empty());
    }
}
