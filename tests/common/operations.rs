use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use account_unit_of_work::{
    Account, AccountDetails, AccountRepository, Executor, Operation, TransactionAware,
    TransactionError, TransactionResult,
};

use super::HASH_COST;

/// Inserts every account of the batch, then fails
pub struct FailingBatch;

#[async_trait]
impl Operation for FailingBatch {
    type Input = Vec<AccountDetails>;
    type Output = ();

    fn name(&self) -> &'static str {
        "failing_batch"
    }

    async fn apply(&self, batch: Vec<AccountDetails>, executor: &Executor) -> TransactionResult<()> {
        let repository = AccountRepository::new(executor.clone());
        for details in &batch {
            repository
                .insert(&Account::from_details(details, HASH_COST)?)
                .await?;
        }
        Err(TransactionError::Computation("injected fault".to_string()))
    }
}

/// Inserts one account, then sleeps for the given duration
pub struct SlowOperation;

#[async_trait]
impl Operation for SlowOperation {
    type Input = (AccountDetails, Duration);
    type Output = ();

    fn name(&self) -> &'static str {
        "slow_operation"
    }

    async fn apply(
        &self,
        input: (AccountDetails, Duration),
        executor: &Executor,
    ) -> TransactionResult<()> {
        let (details, delay) = input;
        AccountRepository::new(executor.clone())
            .insert(&Account::from_details(&details, HASH_COST)?)
            .await?;
        tokio::time::sleep(delay).await;
        Ok(())
    }
}

/// Counts transaction lifecycle callbacks
#[derive(Default)]
pub struct RecordingObserver {
    commits: AtomicUsize,
    rollbacks: AtomicUsize,
}

impl RecordingObserver {
    pub fn commits(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }

    pub fn rollbacks(&self) -> usize {
        self.rollbacks.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TransactionAware for RecordingObserver {
    async fn on_commit(&self) -> TransactionResult<()> {
        self.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn on_rollback(&self) -> TransactionResult<()> {
        self.rollbacks.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Observer whose callbacks always fail
pub struct FailingObserver;

#[async_trait]
impl TransactionAware for FailingObserver {
    async fn on_commit(&self) -> TransactionResult<()> {
        Err(TransactionError::Computation("commit callback failed".to_string()))
    }

    async fn on_rollback(&self) -> TransactionResult<()> {
        Err(TransactionError::Computation("rollback callback failed".to_string()))
    }
}
