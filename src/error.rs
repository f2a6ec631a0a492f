/// Error type for transactional account operations.
///
/// Operations return these values unmodified through the
/// [`TransactionalExecutor`](crate::TransactionalExecutor); the executor only
/// decides between commit and rollback based on their presence.
#[derive(Debug, thiserror::Error)]
pub enum TransactionError {
    #[error("Account {0} not found")]
    NotFound(i64),

    #[error("Computation failed: {0}")]
    Computation(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Transaction commit failed: {0}")]
    CommitFailed(String),

    #[error("Transaction rollback failed: {0}")]
    RollbackFailed(String),

    #[error("Password hashing failed: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// Result type for transactional operations
pub type TransactionResult<T> = Result<T, TransactionError>;
