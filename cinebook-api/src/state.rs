use std::sync::Arc;
use tokio::sync::broadcast;
use cinebook_catalog::CatalogRepository;
use cinebook_core::{BookingNotifier, BookingStore, ReservationEngine, SeatLedger};
use cinebook_shared::SeatsBookedEvent;
use cinebook_store::RedisClient;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
}

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ReservationEngine>,
    pub catalog: Arc<dyn CatalogRepository>,
    pub seats: Arc<dyn SeatLedger>,
    pub bookings: Arc<dyn BookingStore>,
    pub notifier: Arc<dyn BookingNotifier>,
    /// Rate limiting is only enabled when a Redis connection is configured.
    pub redis: Option<Arc<RedisClient>>,
    pub rate_limit_per_minute: i64,
    pub sse_tx: broadcast::Sender<SeatsBookedEvent>,
    pub auth: AuthConfig,
}

impl AppState {
    /// Wires the reservation engine to the given storage. All three roles are usually
    /// served by the same backend.
    pub fn new(
        catalog: Arc<dyn CatalogRepository>,
        seats: Arc<dyn SeatLedger>,
        bookings: Arc<dyn BookingStore>,
        notifier: Arc<dyn BookingNotifier>,
        auth: AuthConfig,
    ) -> Self {
        let engine = Arc::new(ReservationEngine::new(catalog.clone(), seats.clone(), bookings.clone()));
        let (sse_tx, _) = broadcast::channel(100);

        Self {
            engine,
            catalog,
            seats,
            bookings,
            notifier,
            redis: None,
            rate_limit_per_minute: 100,
            sse_tx,
            auth,
        }
    }

    pub fn with_rate_limit(mut self, redis: Arc<RedisClient>, per_minute: i64) -> Self {
        self.redis = Some(redis);
        self.rate_limit_per_minute = per_minute;
        self
    }
}
