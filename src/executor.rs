use sqlx::{Any, Transaction};
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Executor wraps the open transaction of one unit of work.
///
/// Repositories and operations receive a reference to it and run their
/// statements against the transaction it holds. Cloning shares the same
/// transaction.
#[derive(Clone, Debug)]
pub struct Executor {
    pub tx: Arc<Mutex<Option<Transaction<'static, Any>>>>,
    session_id: Uuid,
}

impl Executor {
    /// Creates a new Executor from an open transaction.
    pub fn new(tx: Transaction<'static, Any>, session_id: Uuid) -> Self {
        Self {
            tx: Arc::new(Mutex::new(Some(tx))),
            session_id,
        }
    }

    /// Identifier of the session this executor belongs to.
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Takes ownership of the transaction, leaving None in its place.
    /// This should only be called when committing or rolling back.
    pub(crate) async fn take_transaction(&self) -> Result<Transaction<'static, Any>, sqlx::Error> {
        self.tx.lock().await.take().ok_or(sqlx::Error::PoolClosed)
    }
}
