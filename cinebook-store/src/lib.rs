pub mod app_config;
pub mod database;
pub mod redis_repo;
pub mod catalog_repo;
pub mod seat_repo;
pub mod booking_repo;

pub use database::DbClient;
pub use redis_repo::RedisClient;
pub use catalog_repo::PostgresCatalogRepository;
pub use seat_repo::PostgresSeatLedger;
pub use booking_repo::PostgresBookingStore;

use cinebook_shared::StoreError;

/// Unique-constraint failures become `ConstraintViolation`; everything else means the
/// database could not serve the request.
pub(crate) fn store_error(context: &str, err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return StoreError::ConstraintViolation(format!("{}: {}", context, db_err.message()));
        }
    }
    StoreError::Unavailable(format!("{}: {}", context, err))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_database_errors_are_unavailable() {
        let err = store_error("claim seat", sqlx::Error::PoolTimedOut);
        assert!(matches!(err, StoreError::Unavailable(msg) if msg.starts_with("claim seat: ")));
    }
}
