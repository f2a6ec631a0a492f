use std::sync::Arc;

use account_unit_of_work::account::{
    CountAccounts, DeleteAccount, FindAccountsByCriteria, FindAccountsByEmail, ImportAccounts,
    InsertAccount, ListAccounts, ListUsernameIds, UpdateAccount,
};
use account_unit_of_work::schema::create_account_table;
use account_unit_of_work::{
    Account, AccountDetails, AccountRepository, Column, CriteriaQuery, NewAccount, Order,
    PersistenceConfig, Predicate, SqlUnitOfWork, TransactionError, TransactionalExecutor, UnitOfWork,
    UnitOfWorkSession,
};
use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = PersistenceConfig::from_env().context("failed to load configuration")?;
    let unit_of_work = Arc::new(
        SqlUnitOfWork::connect(&config)
            .await
            .context("failed to connect to the account store")?,
    );

    let outcome = run(&config, unit_of_work.clone()).await;
    unit_of_work.close().await;
    outcome
}

async fn run(config: &PersistenceConfig, unit_of_work: Arc<SqlUnitOfWork>) -> Result<()> {
    create_account_table(unit_of_work.pool())
        .await
        .context("failed to create account table")?;
    let executor = TransactionalExecutor::new(unit_of_work.clone());
    let cost = config.password_hash_cost;

    if executor.execute(&CountAccounts, ()).await? == 0 {
        let seeded = executor.execute(&ImportAccounts::new(cost), sample_accounts()).await?;
        info!(seeded, "seeded empty account table");
    }

    println!("initial users:");
    print_accounts(&executor.execute(&ListAccounts, ()).await?);

    println!("criteria query:");
    let criteria = CriteriaQuery::new()
        .filter(
            Predicate::like(Column::Email, "j%.at")
                .or(Predicate::like(Column::Email, "m%.at"))
                .and(Predicate::ge(Column::Id, 2)),
        )
        .order_by(Column::Username, Order::Asc);
    print_accounts(&executor.execute(&FindAccountsByCriteria, criteria).await?);

    println!("named query with query parameter:");
    print_accounts(&executor.execute(&FindAccountsByEmail, "j%.at".to_string()).await?);

    let count = executor.execute(&CountAccounts, ()).await?;
    println!("count: {count}");

    println!("native sql select query:");
    for (username, id) in executor.execute(&ListUsernameIds, ()).await? {
        println!("Account {username} {id}");
    }

    let manual = insert_without_executor(&unit_of_work, cost)
        .await
        .context("manual insert failed")?;
    println!("manually inserted: {manual}");

    let inserted = executor.execute(&InsertAccount::new(cost), NewAccount::new("12345")).await?;
    println!("inserted: {inserted}");

    let id = inserted.id;
    let changes = AccountDetails::new(
        id,
        format!("{}{}1", inserted.username, id),
        "12345",
        format!("test.modified{id}1@cgs.at"),
    );
    executor.execute(&UpdateAccount::new(cost), changes).await?;

    println!("after update:");
    print_accounts(&executor.execute(&ListAccounts, ()).await?);

    let deleted = executor.execute(&DeleteAccount, manual.id).await?;
    info!(account_id = manual.id, deleted, "delete finished");

    println!("after delete:");
    print_accounts(&executor.execute(&ListAccounts, ()).await?);

    let stats = unit_of_work.stats();
    info!(
        opened = stats.opened(),
        released = stats.released(),
        "session summary"
    );
    Ok(())
}

/// The full begin / work / commit sequence the executor otherwise hides.
async fn insert_without_executor(unit_of_work: &SqlUnitOfWork, cost: u32) -> Result<Account> {
    let session = unit_of_work.begin().await?;
    let repository = AccountRepository::new(session.executor().clone());

    let work = async {
        let id = repository.next_id().await?;
        let account = Account::from_details(
            &AccountDetails::new(id, format!("test{id}"), "12345", format!("test{id}@cgs.at")),
            cost,
        )?;
        repository.insert(&account).await?;
        Ok::<_, TransactionError>(account)
    };

    match work.await {
        Ok(account) => {
            session.commit().await?;
            Ok(account)
        }
        Err(err) => {
            session.rollback().await?;
            Err(err.into())
        }
    }
}

fn sample_accounts() -> Vec<AccountDetails> {
    vec![
        AccountDetails::new(1, "john", "secret", "john@cgs.at"),
        AccountDetails::new(2, "jane", "secret", "jane@cgs.at"),
        AccountDetails::new(3, "mary", "secret", "mary@cgs.at"),
        AccountDetails::new(4, "kate", "secret", "kate@cgs.de"),
    ]
}

fn print_accounts(accounts: &[Account]) {
    for account in accounts {
        println!("{account}");
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("account_unit_of_work=debug")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
