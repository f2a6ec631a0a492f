use sqlx::any::AnyArguments;
use sqlx::query::Query;
use sqlx::{Any, FromRow};
use tracing::trace;

use super::{Account, NamedQuery};
use crate::criteria::{CriteriaQuery, Param};
use crate::{Executor, TransactionError, TransactionResult};

/// Account persistence against the transaction held by an [`Executor`].
///
/// Every method runs inside the caller's transaction; nothing is committed
/// here.
#[derive(Clone, Debug)]
pub struct AccountRepository {
    executor: Executor,
}

impl AccountRepository {
    pub fn new(executor: Executor) -> Self {
        Self { executor }
    }

    /// Run a named query and map each row to an `Account`.
    pub async fn named(&self, query: NamedQuery, params: &[Param]) -> TransactionResult<Vec<Account>> {
        if query.param_count() != params.len() {
            return Err(TransactionError::InvalidQuery(format!(
                "{} expects {} parameter(s), got {}",
                query.name(),
                query.param_count(),
                params.len()
            )));
        }
        trace!(query = query.name(), "running named query");
        self.fetch_accounts(query.sql(), params).await
    }

    pub async fn find_all_ordered(&self) -> TransactionResult<Vec<Account>> {
        self.named(NamedQuery::FindAllOrderedByName, &[]).await
    }

    pub async fn find_by_email(&self, pattern: &str) -> TransactionResult<Vec<Account>> {
        self.named(NamedQuery::FindByEmail, &[Param::from(pattern)])
            .await
    }

    pub async fn find_matching(&self, criteria: &CriteriaQuery) -> TransactionResult<Vec<Account>> {
        let (sql, params) = criteria.to_sql();
        trace!(sql = %sql, "running criteria query");
        self.fetch_accounts(&sql, &params).await
    }

    /// Run a literal SQL query whose columns map to an `Account`.
    pub async fn find_native(&self, sql: &str, params: &[Param]) -> TransactionResult<Vec<Account>> {
        self.fetch_accounts(sql, params).await
    }

    pub async fn find_by_id(&self, id: i64) -> TransactionResult<Option<Account>> {
        let mut tx_guard = self.executor.tx.lock().await;
        let tx = tx_guard.as_mut().ok_or(sqlx::Error::PoolClosed)?;
        let row = sqlx::query(
            "SELECT user_id, username, password, email FROM account WHERE user_id = $1",
        )
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(row.as_ref().map(Account::from_row).transpose()?)
    }

    pub async fn count(&self) -> TransactionResult<i64> {
        let mut tx_guard = self.executor.tx.lock().await;
        let tx = tx_guard.as_mut().ok_or(sqlx::Error::PoolClosed)?;
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM account")
            .fetch_one(&mut **tx)
            .await?;
        Ok(count)
    }

    /// Highest assigned id, or `None` when the table is empty.
    pub async fn max_id(&self) -> TransactionResult<Option<i64>> {
        let mut tx_guard = self.executor.tx.lock().await;
        let tx = tx_guard.as_mut().ok_or(sqlx::Error::PoolClosed)?;
        let max = sqlx::query_scalar::<_, Option<i64>>("SELECT MAX(user_id) FROM account")
            .fetch_one(&mut **tx)
            .await?;
        Ok(max)
    }

    /// Next manual id, `max(id) + 1`.
    ///
    /// Not safe under concurrent writers: two transactions can read the same
    /// maximum. An empty table, or a maximum of `i64::MAX`, has no next id and
    /// is reported as [`TransactionError::Computation`].
    pub async fn next_id(&self) -> TransactionResult<i64> {
        let max_id = self.max_id().await?.ok_or_else(|| {
            TransactionError::Computation("max(user_id) has no value: account table is empty".into())
        })?;
        trace!(max_id, "current max account id");
        max_id
            .checked_add(1)
            .ok_or_else(|| TransactionError::Computation(format!("no account id follows {max_id}")))
    }

    /// `(username, id)` pairs read as plain tuples, without entity mapping.
    pub async fn username_ids(&self) -> TransactionResult<Vec<(String, i64)>> {
        let mut tx_guard = self.executor.tx.lock().await;
        let tx = tx_guard.as_mut().ok_or(sqlx::Error::PoolClosed)?;
        let pairs = sqlx::query_as::<_, (String, i64)>(
            "SELECT username, user_id FROM account ORDER BY user_id",
        )
        .fetch_all(&mut **tx)
        .await?;
        Ok(pairs)
    }

    pub async fn insert(&self, account: &Account) -> TransactionResult<()> {
        let mut tx_guard = self.executor.tx.lock().await;
        let tx = tx_guard.as_mut().ok_or(sqlx::Error::PoolClosed)?;
        sqlx::query(
            "INSERT INTO account (user_id, username, password, email) VALUES ($1, $2, $3, $4)",
        )
        .bind(account.id)
        .bind(&account.username)
        .bind(&account.password_hash)
        .bind(&account.email)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    /// Overwrite username, password and email of the row with `account.id`.
    /// Returns the number of rows changed.
    pub async fn update(&self, account: &Account) -> TransactionResult<u64> {
        let mut tx_guard = self.executor.tx.lock().await;
        let tx = tx_guard.as_mut().ok_or(sqlx::Error::PoolClosed)?;
        let result = sqlx::query(
            "UPDATE account SET username = $1, password = $2, email = $3 WHERE user_id = $4",
        )
        .bind(&account.username)
        .bind(&account.password_hash)
        .bind(&account.email)
        .bind(account.id)
        .execute(&mut **tx)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete(&self, id: i64) -> TransactionResult<u64> {
        let mut tx_guard = self.executor.tx.lock().await;
        let tx = tx_guard.as_mut().ok_or(sqlx::Error::PoolClosed)?;
        let result = sqlx::query("DELETE FROM account WHERE user_id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await?;
        Ok(result.rows_affected())
    }

    async fn fetch_accounts(&self, sql: &str, params: &[Param]) -> TransactionResult<Vec<Account>> {
        let mut tx_guard = self.executor.tx.lock().await;
        let tx = tx_guard.as_mut().ok_or(sqlx::Error::PoolClosed)?;
        let rows = bind_params(sqlx::query(sql), params)
            .fetch_all(&mut **tx)
            .await?;
        let accounts = rows
            .iter()
            .map(Account::from_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(accounts)
    }
}

fn bind_params<'q>(
    mut query: Query<'q, Any, AnyArguments<'q>>,
    params: &'q [Param],
) -> Query<'q, Any, AnyArguments<'q>> {
    for param in params {
        query = match param {
            Param::Int(value) => query.bind(*value),
            Param::Text(value) => query.bind(value.as_str()),
        };
    }
    query
}
