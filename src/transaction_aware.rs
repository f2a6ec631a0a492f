use async_trait::async_trait;

use crate::TransactionResult;

/// Trait for components that need to be notified of transaction lifecycle events.
///
/// Observers registered with a [`UnitOfWorkSession`](crate::UnitOfWorkSession)
/// (directly, or through
/// [`TransactionalExecutor::with_observer`](crate::TransactionalExecutor::with_observer))
/// are called once the transaction has been committed or rolled back.
#[async_trait]
pub trait TransactionAware: Send + Sync {
    /// Called after a successful transaction commit.
    async fn on_commit(&self) -> TransactionResult<()>;

    /// Called after a transaction rollback.
    async fn on_rollback(&self) -> TransactionResult<()>;
}
