use sqlx::AnyPool;

use crate::TransactionResult;

/// Create the `account` table if it does not exist.
///
/// The DDL is accepted by both PostgreSQL and SQLite. `password` holds a
/// bcrypt hash, never the plaintext.
pub async fn create_account_table(pool: &AnyPool) -> TransactionResult<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS account (
            user_id BIGINT PRIMARY KEY,
            username VARCHAR(255) NOT NULL,
            password VARCHAR(255) NOT NULL,
            email VARCHAR(255) NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn drop_account_table(pool: &AnyPool) -> TransactionResult<()> {
    sqlx::query("DROP TABLE IF EXISTS account")
        .execute(pool)
        .await?;
    Ok(())
}
