//! Account Unit of Work
//!
//! Transactional persistence for a single `account` table. A
//! [`TransactionalExecutor`] opens one unit of work per call, applies an
//! [`Operation`] inside its transaction, and commits or rolls back depending
//! on the result. The account operations cover named queries, criteria-built
//! queries, native SQL, and manual-id insert, update and delete.

pub mod account;
pub mod config;
pub mod criteria;
pub mod error;
pub mod executor;
pub mod schema;
pub mod transaction_aware;
pub mod transactional;
pub mod unit_of_work;

pub use account::{Account, AccountDetails, AccountRepository, NewAccount};
pub use config::PersistenceConfig;
pub use criteria::{Column, CriteriaQuery, Order, Predicate};
pub use error::{TransactionError, TransactionResult};
pub use executor::Executor;
pub use transaction_aware::TransactionAware;
pub use transactional::{Operation, TransactionalExecutor};
pub use unit_of_work::{SessionStats, SqlUnitOfWork, SqlUnitOfWorkSession, UnitOfWork, UnitOfWorkSession};
