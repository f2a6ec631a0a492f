mod common;

use account_unit_of_work::account::{
    CountAccounts, DeleteAccount, FindAccountsByCriteria, FindAccountsByEmail, ImportAccounts,
    InsertAccount, ListAccounts, ListUsernameIds, NamedQuery, UpdateAccount,
};
use account_unit_of_work::criteria::Param;
use account_unit_of_work::{
    AccountDetails, AccountRepository, Column, CriteriaQuery, NewAccount, Order, Predicate,
    SqlUnitOfWork, TransactionError, TransactionalExecutor, UnitOfWork, UnitOfWorkSession,
};

use common::{account, cleanup_database, setup_database, HASH_COST};

async fn seed(executor: &TransactionalExecutor<SqlUnitOfWork>, accounts: Vec<AccountDetails>) {
    executor
        .execute(&ImportAccounts::new(HASH_COST), accounts)
        .await
        .expect("Failed to seed accounts");
}

fn usernames(accounts: &[account_unit_of_work::Account]) -> Vec<&str> {
    accounts.iter().map(|a| a.username.as_str()).collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
#[serial_test::serial]
async fn test_list_all_ordered_by_username() {
    let uow = setup_database().await;
    let executor = TransactionalExecutor::new(uow.clone());
    seed(
        &executor,
        vec![
            account(1, "zoe", "zoe@example.com"),
            account(2, "adam", "adam@example.com"),
            account(3, "mike", "mike@example.com"),
        ],
    )
    .await;

    let accounts = executor
        .execute(&ListAccounts, ())
        .await
        .expect("Failed to list accounts");
    assert_eq!(usernames(&accounts), vec!["adam", "mike", "zoe"]);

    cleanup_database(&uow).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
#[serial_test::serial]
async fn test_criteria_matches_literal_query() {
    let uow = setup_database().await;
    let executor = TransactionalExecutor::new(uow.clone());
    seed(
        &executor,
        vec![
            account(1, "j1", "j1@x.at"),
            account(2, "m1", "m1@x.at"),
            account(3, "k1", "k1@x.at"),
        ],
    )
    .await;

    let criteria = CriteriaQuery::new()
        .filter(
            Predicate::like(Column::Email, "j%.at")
                .or(Predicate::like(Column::Email, "m%.at"))
                .and(Predicate::ge(Column::Id, 2)),
        )
        .order_by(Column::Username, Order::Asc);
    let by_criteria = executor
        .execute(&FindAccountsByCriteria, criteria)
        .await
        .expect("Failed to run criteria query");
    assert_eq!(usernames(&by_criteria), vec!["m1"]);
    assert_eq!(by_criteria[0].email, "m1@x.at");

    let session = uow.begin().await.expect("Failed to begin transaction");
    let literal = AccountRepository::new(session.executor().clone())
        .find_native(
            "SELECT user_id, username, password, email FROM account \
             WHERE (email LIKE 'j%.at' OR email LIKE 'm%.at') AND user_id >= 2 \
             ORDER BY username",
            &[],
        )
        .await
        .expect("Failed to run literal query");
    session.commit().await.expect("Failed to commit transaction");

    assert_eq!(by_criteria, literal);

    cleanup_database(&uow).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
#[serial_test::serial]
async fn test_named_email_query_matches_criteria() {
    let uow = setup_database().await;
    let executor = TransactionalExecutor::new(uow.clone());
    seed(
        &executor,
        vec![
            account(1, "julia", "julia@cgs.at"),
            account(2, "jack", "jack@cgs.at"),
            account(3, "jim", "jim@cgs.de"),
            account(4, "mary", "mary@cgs.at"),
        ],
    )
    .await;

    let named = executor
        .execute(&FindAccountsByEmail, "j%.at".to_string())
        .await
        .expect("Failed to run named query");
    assert_eq!(usernames(&named), vec!["jack", "julia"]);

    let criteria = CriteriaQuery::new()
        .filter(Predicate::like(Column::Email, "j%.at"))
        .order_by(Column::Username, Order::Asc);
    let by_criteria = executor
        .execute(&FindAccountsByCriteria, criteria)
        .await
        .expect("Failed to run criteria query");
    assert_eq!(named, by_criteria);

    cleanup_database(&uow).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
#[serial_test::serial]
async fn test_count_and_native_pairs() {
    let uow = setup_database().await;
    let executor = TransactionalExecutor::new(uow.clone());
    seed(
        &executor,
        vec![
            account(2, "bob", "bob@example.com"),
            account(1, "alice", "alice@example.com"),
        ],
    )
    .await;

    let count = executor
        .execute(&CountAccounts, ())
        .await
        .expect("Failed to count accounts");
    assert_eq!(count, 2);

    let pairs = executor
        .execute(&ListUsernameIds, ())
        .await
        .expect("Failed to list username ids");
    assert_eq!(
        pairs,
        vec![("alice".to_string(), 1), ("bob".to_string(), 2)]
    );

    cleanup_database(&uow).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
#[serial_test::serial]
async fn test_insert_assigns_next_id() {
    let uow = setup_database().await;
    let executor = TransactionalExecutor::new(uow.clone());
    seed(
        &executor,
        vec![
            account(1, "alice", "alice@example.com"),
            account(2, "bob", "bob@example.com"),
            account(5, "eve", "eve@example.com"),
        ],
    )
    .await;

    let inserted = executor
        .execute(&InsertAccount::new(HASH_COST), NewAccount::new("12345"))
        .await
        .expect("Failed to insert account");
    assert_eq!(inserted.id, 6);
    assert_eq!(inserted.username, "test6");
    assert_eq!(inserted.email, "test6@cgs.at");
    assert_ne!(inserted.password_hash, "12345", "Password must not be stored in plaintext");
    assert!(inserted.verify_password("12345").expect("Failed to verify password"));

    let session = uow.begin().await.expect("Failed to begin transaction");
    let stored = AccountRepository::new(session.executor().clone())
        .find_by_id(6)
        .await
        .expect("Failed to find account")
        .expect("Inserted account not found");
    session.commit().await.expect("Failed to commit transaction");
    assert_eq!(stored, inserted);

    cleanup_database(&uow).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
#[serial_test::serial]
async fn test_insert_into_empty_table_faults() {
    let uow = setup_database().await;
    let executor = TransactionalExecutor::new(uow.clone());

    let result = executor
        .execute(&InsertAccount::new(HASH_COST), NewAccount::new("12345"))
        .await;
    assert!(
        matches!(result, Err(TransactionError::Computation(_))),
        "Expected a computation fault, got {result:?}"
    );
    assert_eq!(uow.stats().outstanding(), 0);

    let count = executor
        .execute(&CountAccounts, ())
        .await
        .expect("Failed to count accounts");
    assert_eq!(count, 0);

    cleanup_database(&uow).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
#[serial_test::serial]
async fn test_update_overwrites_fields() {
    let uow = setup_database().await;
    let executor = TransactionalExecutor::new(uow.clone());
    seed(&executor, vec![account(1, "alice", "alice@example.com")]).await;

    let updated = executor
        .execute(
            &UpdateAccount::new(HASH_COST),
            AccountDetails::new(1, "alice2", "new-password", "alice.modified@example.com"),
        )
        .await
        .expect("Failed to update account");
    assert_eq!(updated.id, 1);

    let accounts = executor
        .execute(&ListAccounts, ())
        .await
        .expect("Failed to list accounts");
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0].username, "alice2");
    assert_eq!(accounts[0].email, "alice.modified@example.com");
    assert!(accounts[0]
        .verify_password("new-password")
        .expect("Failed to verify password"));
    assert!(!accounts[0]
        .verify_password("secret")
        .expect("Failed to verify password"));

    cleanup_database(&uow).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
#[serial_test::serial]
async fn test_update_missing_account_leaves_store_unchanged() {
    let uow = setup_database().await;
    let executor = TransactionalExecutor::new(uow.clone());
    seed(
        &executor,
        vec![
            account(1, "alice", "alice@example.com"),
            account(2, "bob", "bob@example.com"),
        ],
    )
    .await;
    let before = executor
        .execute(&ListAccounts, ())
        .await
        .expect("Failed to list accounts");

    let result = executor
        .execute(
            &UpdateAccount::new(HASH_COST),
            AccountDetails::new(99, "ghost", "secret", "ghost@example.com"),
        )
        .await;
    assert!(
        matches!(result, Err(TransactionError::NotFound(99))),
        "Expected NotFound(99), got {result:?}"
    );

    let after = executor
        .execute(&ListAccounts, ())
        .await
        .expect("Failed to list accounts");
    assert_eq!(before, after, "Store should be unchanged");

    cleanup_database(&uow).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
#[serial_test::serial]
async fn test_delete_existing_and_missing() {
    let uow = setup_database().await;
    let executor = TransactionalExecutor::new(uow.clone());
    seed(
        &executor,
        vec![
            account(1, "alice", "alice@example.com"),
            account(2, "bob", "bob@example.com"),
        ],
    )
    .await;

    let missing = executor.execute(&DeleteAccount, 42).await;
    assert!(
        matches!(missing, Err(TransactionError::NotFound(42))),
        "Expected NotFound(42), got {missing:?}"
    );

    let deleted = executor
        .execute(&DeleteAccount, 1)
        .await
        .expect("Failed to delete account");
    assert!(deleted);

    let remaining = executor
        .execute(&ListAccounts, ())
        .await
        .expect("Failed to list accounts");
    assert_eq!(usernames(&remaining), vec!["bob"]);

    cleanup_database(&uow).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
#[serial_test::serial]
async fn test_import_with_duplicate_id_is_all_or_nothing() {
    let uow = setup_database().await;
    let executor = TransactionalExecutor::new(uow.clone());

    let result = executor
        .execute(
            &ImportAccounts::new(HASH_COST),
            vec![
                account(1, "alice", "alice@example.com"),
                account(1, "alice-again", "alice2@example.com"),
            ],
        )
        .await;
    assert!(
        matches!(result, Err(TransactionError::DatabaseError(_))),
        "Expected a database error, got {result:?}"
    );

    let count = executor
        .execute(&CountAccounts, ())
        .await
        .expect("Failed to count accounts");
    assert_eq!(count, 0);

    cleanup_database(&uow).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
#[serial_test::serial]
async fn test_find_native_binds_parameters() {
    let uow = setup_database().await;
    let executor = TransactionalExecutor::new(uow.clone());
    seed(
        &executor,
        vec![
            account(1, "alice", "alice@example.com"),
            account(2, "bob", "bob@example.com"),
            account(3, "carol", "carol@example.org"),
        ],
    )
    .await;

    let session = uow.begin().await.expect("Failed to begin transaction");
    let found = AccountRepository::new(session.executor().clone())
        .find_native(
            "SELECT user_id, username, password, email FROM account \
             WHERE email LIKE $1 AND user_id > $2 ORDER BY user_id",
            &[Param::from("%.com"), Param::from(1)],
        )
        .await
        .expect("Failed to run native query");
    session.commit().await.expect("Failed to commit transaction");

    assert_eq!(usernames(&found), vec!["bob"]);

    cleanup_database(&uow).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
#[serial_test::serial]
async fn test_insert_after_largest_id_faults() {
    let uow = setup_database().await;
    let executor = TransactionalExecutor::new(uow.clone());
    seed(&executor, vec![account(i64::MAX, "max", "max@example.com")]).await;

    let result = executor
        .execute(&InsertAccount::new(HASH_COST), NewAccount::new("12345"))
        .await;
    assert!(
        matches!(result, Err(TransactionError::Computation(_))),
        "Expected a computation fault, got {result:?}"
    );
    assert_eq!(uow.stats().outstanding(), 0);

    let count = executor
        .execute(&CountAccounts, ())
        .await
        .expect("Failed to count accounts");
    assert_eq!(count, 1);

    cleanup_database(&uow).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
#[serial_test::serial]
async fn test_next_id_on_empty_table_faults() {
    let uow = setup_database().await;

    let session = uow.begin().await.expect("Failed to begin transaction");
    let result = AccountRepository::new(session.executor().clone())
        .next_id()
        .await;
    session.rollback().await.expect("Failed to rollback transaction");

    assert!(
        matches!(result, Err(TransactionError::Computation(_))),
        "Expected a computation fault, got {result:?}"
    );

    cleanup_database(&uow).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
#[serial_test::serial]
async fn test_email_pattern_is_case_sensitive() {
    let uow = setup_database().await;
    let executor = TransactionalExecutor::new(uow.clone());
    seed(
        &executor,
        vec![
            account(1, "j1", "J1@x.at"),
            account(2, "j2", "j2@x.AT"),
            account(3, "j3", "j3@x.at"),
        ],
    )
    .await;

    let found = executor
        .execute(&FindAccountsByEmail, "j%.at".to_string())
        .await
        .expect("Failed to run named query");
    let emails: Vec<&str> = found.iter().map(|a| a.email.as_str()).collect();
    assert_eq!(emails, vec!["j3@x.at"]);

    cleanup_database(&uow).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
#[serial_test::serial]
async fn test_named_query_rejects_wrong_parameter_count() {
    let uow = setup_database().await;

    let session = uow.begin().await.expect("Failed to begin transaction");
    let repository = AccountRepository::new(session.executor().clone());
    let missing = repository.named(NamedQuery::FindByEmail, &[]).await;
    let extra = repository
        .named(NamedQuery::FindAllOrderedByName, &[Param::from(1)])
        .await;
    session.rollback().await.expect("Failed to rollback transaction");

    assert!(
        matches!(missing, Err(TransactionError::InvalidQuery(_))),
        "Expected an invalid query error, got {missing:?}"
    );
    assert!(
        matches!(extra, Err(TransactionError::InvalidQuery(_))),
        "Expected an invalid query error, got {extra:?}"
    );

    cleanup_database(&uow).await;
}
