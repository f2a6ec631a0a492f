use async_trait::async_trait;
use parking_lot::RwLock;
use sqlx::any::AnyPoolOptions;
use sqlx::AnyPool;
use sqlx::{Any, Transaction};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{Executor, PersistenceConfig, TransactionAware, TransactionError, TransactionResult};

/// Unit of Work pattern for managing database transactions.
///
/// The UnitOfWork manages the lifecycle of database transactions and provides
/// a factory method to create new transaction sessions.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    type Session: UnitOfWorkSession;

    /// Begin a new transaction session.
    async fn begin(&self) -> TransactionResult<Self::Session>;
}

/// Represents a single database transaction session.
///
/// This trait provides the core transaction management operations and a
/// mechanism to register transaction-aware components that need to be
/// notified of transaction lifecycle events. Committing or rolling back
/// consumes the session, which releases it.
#[async_trait]
pub trait UnitOfWorkSession: Send + Sync {
    /// Get the executor for this session (provides access to the transaction).
    fn executor(&self) -> &Executor;

    /// Register a component that needs to be notified of transaction events.
    fn register_transaction_aware(&self, observer: Arc<dyn TransactionAware>);

    /// Commit the transaction and notify all registered observers.
    ///
    /// Observer failures are logged and do not turn a successful commit
    /// into an error.
    async fn commit(self) -> TransactionResult<()>;

    /// Rollback the transaction and notify all registered observers.
    async fn rollback(self) -> TransactionResult<()>;
}

/// Counters of sessions opened and released by a unit of work.
#[derive(Debug, Default)]
pub struct SessionStats {
    opened: AtomicUsize,
    released: AtomicUsize,
}

impl SessionStats {
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }

    /// Sessions that have been opened but not yet released.
    pub fn outstanding(&self) -> usize {
        self.opened().saturating_sub(self.released())
    }
}

/// Marks one session as open until dropped.
#[derive(Debug)]
struct SessionLease {
    session_id: Uuid,
    stats: Arc<SessionStats>,
}

impl SessionLease {
    fn acquire(session_id: Uuid, stats: Arc<SessionStats>) -> Self {
        stats.opened.fetch_add(1, Ordering::SeqCst);
        debug!(session_id = %session_id, "unit of work opened");
        Self { session_id, stats }
    }
}

impl Drop for SessionLease {
    fn drop(&mut self) {
        self.stats.released.fetch_add(1, Ordering::SeqCst);
        debug!(session_id = %self.session_id, "unit of work released");
    }
}

/// UnitOfWork backed by an sqlx `Any` pool (PostgreSQL or SQLite).
///
/// Created once at startup with [`SqlUnitOfWork::connect`] and passed
/// explicitly to whoever needs to open sessions; [`SqlUnitOfWork::close`]
/// shuts the pool down.
pub struct SqlUnitOfWork {
    pool: AnyPool,
    stats: Arc<SessionStats>,
}

impl SqlUnitOfWork {
    /// Create a SqlUnitOfWork over an existing connection pool.
    pub fn new(pool: AnyPool) -> Self {
        Self {
            pool,
            stats: Arc::new(SessionStats::default()),
        }
    }

    /// Open a connection pool according to `config`.
    pub async fn connect(config: &PersistenceConfig) -> TransactionResult<Self> {
        sqlx::any::install_default_drivers();

        let mut options = AnyPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .after_connect(|conn, _meta| {
                Box::pin(async move {
                    // SQLite LIKE ignores ASCII case unless told otherwise
                    if conn.backend_name().eq_ignore_ascii_case("sqlite") {
                        sqlx::query("PRAGMA case_sensitive_like = ON")
                            .execute(&mut *conn)
                            .await?;
                    }
                    Ok(())
                })
            });
        if config.is_in_memory() {
            options = options
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }

        let pool = options.connect(&config.database_url).await?;
        info!(
            max_connections = pool.options().get_max_connections(),
            "account store connected"
        );
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// Close the pool, waiting for checked-out connections to be returned.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("account store closed");
    }
}

#[async_trait]
impl UnitOfWork for SqlUnitOfWork {
    type Session = SqlUnitOfWorkSession;

    async fn begin(&self) -> TransactionResult<Self::Session> {
        let tx = self.pool.begin().await?;
        Ok(SqlUnitOfWorkSession::new(tx, self.stats.clone()))
    }
}

/// Default implementation of UnitOfWorkSession over an sqlx transaction.
pub struct SqlUnitOfWorkSession {
    executor: Executor,
    observers: Arc<RwLock<Vec<Arc<dyn TransactionAware>>>>,
    _lease: SessionLease,
}

impl SqlUnitOfWorkSession {
    /// Create a new session from an open transaction.
    fn new(tx: Transaction<'static, Any>, stats: Arc<SessionStats>) -> Self {
        let session_id = Uuid::new_v4();
        Self {
            executor: Executor::new(tx, session_id),
            observers: Arc::new(RwLock::new(Vec::new())),
            _lease: SessionLease::acquire(session_id, stats),
        }
    }
}

#[async_trait]
impl UnitOfWorkSession for SqlUnitOfWorkSession {
    fn executor(&self) -> &Executor {
        &self.executor
    }

    fn register_transaction_aware(&self, observer: Arc<dyn TransactionAware>) {
        self.observers.write().push(observer);
    }

    async fn commit(self) -> TransactionResult<()> {
        let tx = self.executor.take_transaction().await?;

        tx.commit()
            .await
            .map_err(|e| TransactionError::CommitFailed(e.to_string()))?;
        debug!(session_id = %self.executor.session_id(), "transaction committed");

        // The data is durable at this point; observer failures are only logged
        let observers = self.observers.read().clone();
        for observer in observers.iter() {
            if let Err(err) = observer.on_commit().await {
                warn!(session_id = %self.executor.session_id(), error = %err, "commit observer failed");
            }
        }
        Ok(())
    }

    async fn rollback(self) -> TransactionResult<()> {
        let tx = self.executor.take_transaction().await?;

        tx.rollback()
            .await
            .map_err(|e| TransactionError::RollbackFailed(e.to_string()))?;
        debug!(session_id = %self.executor.session_id(), "transaction rolled back");

        let observers = self.observers.read().clone();
        for observer in observers.iter() {
            if let Err(err) = observer.on_rollback().await {
                warn!(session_id = %self.executor.session_id(), error = %err, "rollback observer failed");
            }
        }
        Ok(())
    }
}
