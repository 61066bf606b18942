use std::sync::Arc;
use std::net::SocketAddr;
use anyhow::Context;
use cinebook_api::{app, AppState, AuthConfig};
use cinebook_core::MemoryStore;
use cinebook_notify::{NotificationDispatcher, OutboxStrategy, SmtpStrategy};
use cinebook_store::app_config::{Config, NotificationsConfig};
use cinebook_store::{DbClient, PostgresBookingStore, PostgresCatalogRepository, PostgresSeatLedger, RedisClient};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// `database.url = "memory"` runs against an in-process store that is lost on exit.
const IN_MEMORY_URL: &str = "memory";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cinebook_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting Cinebook API on port {}", config.server.port);

    let notifier = Arc::new(dispatcher(&config.notifications));
    tracing::info!("Confirmation delivery chain: {:?}", notifier.strategy_names());

    let auth = AuthConfig {
        secret: config.auth.jwt_secret.clone(),
        expiration: config.auth.jwt_expiration_seconds,
    };

    let mut app_state = if config.database.url == IN_MEMORY_URL {
        tracing::warn!("Using the in-memory store; bookings will not survive a restart");
        let store = Arc::new(MemoryStore::new());
        AppState::new(store.clone(), store.clone(), store, notifier, auth)
    } else {
        let db = DbClient::new(&config.database.url, config.database.max_connections)
            .await
            .context("Failed to connect to Postgres")?;
        db.migrate().await.context("Failed to run migrations")?;

        AppState::new(
            Arc::new(PostgresCatalogRepository::new(db.pool.clone())),
            Arc::new(PostgresSeatLedger::new(db.pool.clone())),
            Arc::new(PostgresBookingStore::new(db.pool.clone())),
            notifier,
            auth,
        )
    };

    if let Some(redis) = &config.redis {
        let redis_client = RedisClient::new(&redis.url)
            .await
            .context("Failed to connect to Redis")?;
        app_state = app_state.with_rate_limit(Arc::new(redis_client), config.server.rate_limit_per_minute);
    }

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>()
    ).await?;

    Ok(())
}

/// Relay first, then direct SMTP, then the disk outbox; sections missing from the config are skipped.
fn dispatcher(config: &NotificationsConfig) -> NotificationDispatcher {
    let mut dispatcher = NotificationDispatcher::new(config.from.clone());

    if let Some(relay) = &config.relay {
        dispatcher = dispatcher.with_strategy(SmtpStrategy::relay(
            relay.host.clone(),
            relay.port,
            relay.username.clone(),
            relay.password.clone(),
        ));
    }
    if let Some(direct) = &config.direct {
        dispatcher = dispatcher.with_strategy(SmtpStrategy::direct(
            direct.host.clone(),
            direct.port,
            direct.starttls,
            direct.credentials(),
        ));
    }
    if let Some(dir) = &config.outbox_dir {
        dispatcher = dispatcher.with_strategy(OutboxStrategy::new(dir.clone()));
    }

    dispatcher
}
