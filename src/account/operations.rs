use async_trait::async_trait;
use tracing::{debug, info};

use super::{Account, AccountDetails, AccountRepository, NewAccount};
use crate::criteria::CriteriaQuery;
use crate::{Executor, Operation, TransactionError, TransactionResult};

/// All accounts ordered by username.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListAccounts;

#[async_trait]
impl Operation for ListAccounts {
    type Input = ();
    type Output = Vec<Account>;

    fn name(&self) -> &'static str {
        "list_accounts"
    }

    async fn apply(&self, _input: (), executor: &Executor) -> TransactionResult<Vec<Account>> {
        AccountRepository::new(executor.clone())
            .find_all_ordered()
            .await
    }
}

/// Accounts whose email matches a case-sensitive `LIKE` pattern such as `j%.at`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FindAccountsByEmail;

#[async_trait]
impl Operation for FindAccountsByEmail {
    type Input = String;
    type Output = Vec<Account>;

    fn name(&self) -> &'static str {
        "find_accounts_by_email"
    }

    async fn apply(&self, pattern: String, executor: &Executor) -> TransactionResult<Vec<Account>> {
        AccountRepository::new(executor.clone())
            .find_by_email(&pattern)
            .await
    }
}

/// Accounts selected by a composed [`CriteriaQuery`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FindAccountsByCriteria;

#[async_trait]
impl Operation for FindAccountsByCriteria {
    type Input = CriteriaQuery;
    type Output = Vec<Account>;

    fn name(&self) -> &'static str {
        "find_accounts_by_criteria"
    }

    async fn apply(
        &self,
        criteria: CriteriaQuery,
        executor: &Executor,
    ) -> TransactionResult<Vec<Account>> {
        AccountRepository::new(executor.clone())
            .find_matching(&criteria)
            .await
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CountAccounts;

#[async_trait]
impl Operation for CountAccounts {
    type Input = ();
    type Output = i64;

    fn name(&self) -> &'static str {
        "count_accounts"
    }

    async fn apply(&self, _input: (), executor: &Executor) -> TransactionResult<i64> {
        let count = AccountRepository::new(executor.clone()).count().await?;
        debug!(count, "counted accounts");
        Ok(count)
    }
}

/// `(username, id)` pairs read with native SQL, bypassing the entity mapping.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListUsernameIds;

#[async_trait]
impl Operation for ListUsernameIds {
    type Input = ();
    type Output = Vec<(String, i64)>;

    fn name(&self) -> &'static str {
        "list_username_ids"
    }

    async fn apply(&self, _input: (), executor: &Executor) -> TransactionResult<Vec<(String, i64)>> {
        AccountRepository::new(executor.clone()).username_ids().await
    }
}

/// Inserts an account with the next manual id.
///
/// The id is `max(id) + 1`, read and written in the same transaction. Two
/// concurrent writers can compute the same id; the second insert then fails
/// on the primary key. An empty table, or one already holding `i64::MAX`, is
/// reported as [`TransactionError::Computation`].
#[derive(Debug, Clone, Copy)]
pub struct InsertAccount {
    hash_cost: u32,
}

impl InsertAccount {
    pub fn new(hash_cost: u32) -> Self {
        Self { hash_cost }
    }
}

#[async_trait]
impl Operation for InsertAccount {
    type Input = NewAccount;
    type Output = Account;

    fn name(&self) -> &'static str {
        "insert_account"
    }

    async fn apply(&self, input: NewAccount, executor: &Executor) -> TransactionResult<Account> {
        let repository = AccountRepository::new(executor.clone());

        let id = repository.next_id().await?;
        let account = Account {
            id,
            username: format!("test{id}"),
            password_hash: bcrypt::hash(&input.password, self.hash_cost)?,
            email: format!("test{id}@cgs.at"),
        };
        repository.insert(&account).await?;
        info!(account_id = id, "account inserted");
        Ok(account)
    }
}

/// Overwrites username, password and email of an existing account.
#[derive(Debug, Clone, Copy)]
pub struct UpdateAccount {
    hash_cost: u32,
}

impl UpdateAccount {
    pub fn new(hash_cost: u32) -> Self {
        Self { hash_cost }
    }
}

#[async_trait]
impl Operation for UpdateAccount {
    type Input = AccountDetails;
    type Output = Account;

    fn name(&self) -> &'static str {
        "update_account"
    }

    async fn apply(&self, details: AccountDetails, executor: &Executor) -> TransactionResult<Account> {
        let repository = AccountRepository::new(executor.clone());

        if repository.find_by_id(details.id).await?.is_none() {
            return Err(TransactionError::NotFound(details.id));
        }

        let account = Account::from_details(&details, self.hash_cost)?;
        repository.update(&account).await?;
        info!(account_id = account.id, "account updated");
        Ok(account)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DeleteAccount;

#[async_trait]
impl Operation for DeleteAccount {
    type Input = i64;
    type Output = bool;

    fn name(&self) -> &'static str {
        "delete_account"
    }

    async fn apply(&self, id: i64, executor: &Executor) -> TransactionResult<bool> {
        let repository = AccountRepository::new(executor.clone());

        if repository.find_by_id(id).await?.is_none() {
            return Err(TransactionError::NotFound(id));
        }

        repository.delete(id).await?;
        info!(account_id = id, "account deleted");
        Ok(true)
    }
}

/// Inserts a batch of accounts with explicit ids, all or nothing.
#[derive(Debug, Clone, Copy)]
pub struct ImportAccounts {
    hash_cost: u32,
}

impl ImportAccounts {
    pub fn new(hash_cost: u32) -> Self {
        Self { hash_cost }
    }
}

#[async_trait]
impl Operation for ImportAccounts {
    type Input = Vec<AccountDetails>;
    type Output = usize;

    fn name(&self) -> &'static str {
        "import_accounts"
    }

    async fn apply(&self, batch: Vec<AccountDetails>, executor: &Executor) -> TransactionResult<usize> {
        let repository = AccountRepository::new(executor.clone());
        for details in &batch {
            let account = Account::from_details(details, self.hash_cost)?;
            repository.insert(&account).await?;
        }
        info!(imported = batch.len(), "accounts imported");
        Ok(batch.len())
    }
}
