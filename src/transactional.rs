use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::{Executor, TransactionAware, TransactionResult, UnitOfWork, UnitOfWorkSession};

/// A unit of business logic run inside a transaction.
///
/// The executor passed to [`Operation::apply`] already holds an open
/// transaction; implementations must not commit or roll it back themselves.
#[async_trait]
pub trait Operation: Send + Sync {
    type Input: Send + 'static;
    type Output: Send + 'static;

    /// Short name used in logs.
    fn name(&self) -> &'static str;

    async fn apply(&self, input: Self::Input, executor: &Executor) -> TransactionResult<Self::Output>;
}

/// Runs [`Operation`]s, each in its own unit of work.
///
/// For every call a new session is opened, the operation is applied, and the
/// transaction is committed when it succeeds or rolled back when it fails.
/// The operation's error is returned exactly as produced. The session is
/// released on every path. `Ok` means the data was committed; observer
/// callbacks that fail afterwards are logged, not returned.
pub struct TransactionalExecutor<U: UnitOfWork> {
    unit_of_work: Arc<U>,
    observers: Vec<Arc<dyn TransactionAware>>,
}

impl<U: UnitOfWork> TransactionalExecutor<U> {
    pub fn new(unit_of_work: Arc<U>) -> Self {
        Self {
            unit_of_work,
            observers: Vec::new(),
        }
    }

    /// Register an observer on every session this executor opens.
    pub fn with_observer(mut self, observer: Arc<dyn TransactionAware>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn unit_of_work(&self) -> &Arc<U> {
        &self.unit_of_work
    }

    pub async fn execute<O>(&self, operation: &O, input: O::Input) -> TransactionResult<O::Output>
    where
        O: Operation + ?Sized,
    {
        let session = self.unit_of_work.begin().await?;
        for observer in &self.observers {
            session.register_transaction_aware(observer.clone());
        }
        let session_id = session.executor().session_id();
        debug!(operation = operation.name(), session_id = %session_id, "applying operation");

        let outcome = operation.apply(input, session.executor()).await;
        match outcome {
            Ok(output) => {
                session.commit().await?;
                debug!(operation = operation.name(), session_id = %session_id, "operation committed");
                Ok(output)
            }
            Err(err) => {
                warn!(
                    operation = operation.name(),
                    session_id = %session_id,
                    error = %err,
                    "operation failed, rolling back"
                );
                if let Err(rollback_err) = session.rollback().await {
                    warn!(session_id = %session_id, error = %rollback_err, "rollback failed");
                }
                Err(err)
            }
        }
    }
}
