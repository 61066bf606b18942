/// Failures reported by the storage collaborators (seat ledger, booking store, catalog).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The operation could not be carried out at all (connectivity, pool exhaustion, I/O).
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
    /// A uniqueness constraint rejected the write.
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),
}

pub type StoreResult<T> = Result<T, StoreError>;
