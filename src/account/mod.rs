//! The `Account` entity and everything that reads or writes it.

mod operations;
mod query;
mod repository;

pub use operations::{
    CountAccounts, DeleteAccount, FindAccountsByCriteria, FindAccountsByEmail, ImportAccounts,
    InsertAccount, ListAccounts, ListUsernameIds, UpdateAccount,
};
pub use query::NamedQuery;
pub use repository::AccountRepository;

use std::fmt::{self, Display, Formatter};

use sqlx::any::AnyRow;
use sqlx::{FromRow, Row};

use crate::TransactionResult;

/// Column list selected whenever an `Account` is mapped from a row.
pub const ACCOUNT_COLUMNS: &str = "user_id, username, password, email";

/// A row of the `account` table.
///
/// `id` is assigned by the caller (see [`InsertAccount`]) and never changes
/// afterwards. The stored password is a bcrypt hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub email: String,
}

impl Account {
    /// Build an account from plaintext details, hashing the password.
    pub fn from_details(details: &AccountDetails, hash_cost: u32) -> TransactionResult<Self> {
        Ok(Self {
            id: details.id,
            username: details.username.clone(),
            password_hash: bcrypt::hash(&details.password, hash_cost)?,
            email: details.email.clone(),
        })
    }

    pub fn verify_password(&self, password: &str) -> TransactionResult<bool> {
        Ok(bcrypt::verify(password, &self.password_hash)?)
    }
}

impl<'r> FromRow<'r, AnyRow> for Account {
    fn from_row(row: &'r AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("user_id")?,
            username: row.try_get("username")?,
            password_hash: row.try_get("password")?,
            email: row.try_get("email")?,
        })
    }
}

impl Display for Account {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Account [id={}, username={}, email={}]",
            self.id, self.username, self.email
        )
    }
}

/// Plaintext account values supplied by callers for updates and imports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountDetails {
    pub id: i64,
    pub username: String,
    pub password: String,
    pub email: String,
}

impl AccountDetails {
    pub fn new(
        id: i64,
        username: impl Into<String>,
        password: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            id,
            username: username.into(),
            password: password.into(),
            email: email.into(),
        }
    }
}

/// Input of [`InsertAccount`]: id, username and email are derived at insert time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub password: String,
}

impl NewAccount {
    pub fn new(password: impl Into<String>) -> Self {
        Self {
            password: password.into(),
        }
    }
}
