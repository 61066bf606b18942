//! Runs against a real Postgres. Set DATABASE_URL and run with `--ignored`.

use std::sync::Arc;
use chrono::Utc;
use cinebook_catalog::{CatalogRepository, Movie, Showing};
use cinebook_core::{BookingStore, Customer, RejectionReason, ReservationEngine, SeatLedger};
use cinebook_store::{DbClient, PostgresBookingStore, PostgresCatalogRepository, PostgresSeatLedger};
use uuid::Uuid;

struct Fixture {
    catalog: Arc<PostgresCatalogRepository>,
    seats: Arc<PostgresSeatLedger>,
    bookings: Arc<PostgresBookingStore>,
    showing: Showing,
}

async fn fixture(labels: &[&str]) -> Fixture {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for postgres tests");
    let db = DbClient::new(&url, 20).await.expect("connect");
    db.migrate().await.expect("migrate");

    let catalog = Arc::new(PostgresCatalogRepository::new(db.pool.clone()));
    let seats = Arc::new(PostgresSeatLedger::new(db.pool.clone()));
    let bookings = Arc::new(PostgresBookingStore::new(db.pool.clone()));

    let movie = Movie {
        id: Uuid::new_v4(),
        name: format!("Race Test {}", Uuid::new_v4()),
        description: None,
        cast: None,
        rating: Some(6.5),
        language_id: None,
        genre_ids: vec![1],
    };
    catalog.create_movie(&movie).await.expect("movie");

    let showing = Showing {
        id: Uuid::new_v4(),
        movie_id: movie.id,
        theater: "Screen 1".to_string(),
        starts_at: Utc::now(),
    };
    catalog.create_showing(&showing).await.expect("showing");

    let labels: Vec<String> = labels.iter().map(|l| l.to_string()).collect();
    seats.create_seats(showing.id, &labels).await.expect("seats");

    Fixture { catalog, seats, bookings, showing }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
#[ignore]
async fn test_concurrent_claims_have_one_winner() {
    let fx = fixture(&["A1"]).await;
    let engine = Arc::new(ReservationEngine::new(fx.catalog.clone(), fx.seats.clone(), fx.bookings.clone()));

    let mut handles = Vec::new();
    for i in 0..16 {
        let engine = engine.clone();
        let showing_id = fx.showing.id;
        handles.push(tokio::spawn(async move {
            engine
                .reserve(&Customer::new(format!("user-{}", i)), showing_id, &["A1".to_string()])
                .await
                .expect("reserve")
        }));
    }

    let mut winners = 0;
    for handle in handles {
        let outcome = handle.await.expect("join");
        if outcome.is_fully_booked() {
            winners += 1;
        } else {
            let reason = outcome.reason_for("A1").expect("rejected");
            assert!(matches!(reason, RejectionReason::AlreadyBooked | RejectionReason::LostRace));
        }
    }
    assert_eq!(winners, 1);

    let seat = fx.seats.find_seats(fx.showing.id, &["A1".to_string()]).await.unwrap().remove(0);
    assert!(seat.is_booked);
    assert_eq!(fx.bookings.count_for_seat(fx.showing.id, seat.id).await.unwrap(), 1);
}

#[tokio::test]
#[ignore]
async fn test_second_booking_row_is_a_constraint_violation() {
    let fx = fixture(&["B2"]).await;
    let seat = fx.seats.find_seats(fx.showing.id, &["B2".to_string()]).await.unwrap().remove(0);
    let customer = Customer::new("dup-user");

    assert!(fx.seats.claim_seat(&seat).await.unwrap());
    assert!(!fx.seats.claim_seat(&seat).await.unwrap());

    fx.bookings.create_booking(&customer, &seat, &fx.showing).await.unwrap();
    let err = fx.bookings.create_booking(&customer, &seat, &fx.showing).await.unwrap_err();
    assert!(matches!(err, cinebook_shared::StoreError::ConstraintViolation(_)));

    let listed = fx.bookings.list_bookings_for_user("dup-user").await.unwrap();
    assert!(listed.iter().any(|b| b.seat_label == "B2"));
}

#[tokio::test]
#[ignore]
async fn test_book_seat_is_all_or_nothing() {
    let fx = fixture(&["C3", "C4"]).await;
    let labels = ["C3".to_string(), "C4".to_string()];
    let mut seats = fx.seats.find_seats(fx.showing.id, &labels).await.unwrap();
    seats.sort_by(|a, b| a.label.cmp(&b.label));
    let (c3, c4) = (seats[0].clone(), seats[1].clone());

    // a booking row without the flag makes the combined claim fail and roll back
    fx.bookings.create_booking(&Customer::new("stray"), &c3, &fx.showing).await.unwrap();
    let err = fx.bookings.book_seat(&Customer::new("late"), &c3, &fx.showing).await.unwrap_err();
    assert!(matches!(err, cinebook_shared::StoreError::ConstraintViolation(_)));
    let c3_now = fx.seats.find_seats(fx.showing.id, &labels[..1]).await.unwrap().remove(0);
    assert!(!c3_now.is_booked);

    let booking = fx.bookings.book_seat(&Customer::new("fan"), &c4, &fx.showing).await.unwrap().unwrap();
    assert_eq!(booking.seat_label, "C4");
    assert!(fx.bookings.book_seat(&Customer::new("fan2"), &c4, &fx.showing).await.unwrap().is_none());
    assert_eq!(fx.bookings.count_for_seat(fx.showing.id, c4.id).await.unwrap(), 1);
}

#[tokio::test]
#[ignore]
async fn test_seat_map_in_natural_order() {
    let fx = fixture(&["A10", "B1", "A2", "A1"]).await;
    let labels: Vec<String> =
        fx.seats.list_seats(fx.showing.id).await.unwrap().into_iter().map(|s| s.label).collect();
    assert_eq!(labels, vec!["A1", "A2", "A10", "B1"]);

    // re-running the layout only adds the missing labels
    let created = fx
        .seats
        .create_seats(fx.showing.id, &["A1".to_string(), "C1".to_string()])
        .await
        .unwrap();
    assert_eq!(created, 1);
}
