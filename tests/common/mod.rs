pub mod fixtures;
pub mod operations;

use account_unit_of_work::schema::{create_account_table, drop_account_table};
use account_unit_of_work::{PersistenceConfig, SqlUnitOfWork};
use std::sync::Arc;

pub use fixtures::{account, HASH_COST};
pub use operations::{FailingBatch, FailingObserver, RecordingObserver, SlowOperation};

/// Helper function to get database URL from environment or use an in-memory SQLite database
pub fn get_database_url() -> String {
    std::env::var("TEST_DATABASE_URL").unwrap_or_else(|_| "sqlite::memory:".to_string())
}

/// Connect and recreate an empty account table
pub async fn setup_database() -> Arc<SqlUnitOfWork> {
    let mut config = PersistenceConfig::new(get_database_url());
    config.password_hash_cost = HASH_COST;

    let uow = SqlUnitOfWork::connect(&config)
        .await
        .expect("Failed to connect to database");

    drop_account_table(uow.pool())
        .await
        .expect("Failed to drop account table");
    create_account_table(uow.pool())
        .await
        .expect("Failed to create account table");

    Arc::new(uow)
}

/// Clean up database after tests
pub async fn cleanup_database(uow: &SqlUnitOfWork) {
    drop_account_table(uow.pool())
        .await
        .expect("Failed to drop account table");
    uow.close().await;
}
