use account_unit_of_work::AccountDetails;

/// Lowest bcrypt cost, keeps hashing fast in tests
pub const HASH_COST: u32 = 4;

/// Sample account with a fixed password
pub fn account(id: i64, username: &str, email: &str) -> AccountDetails {
    AccountDetails::new(id, username, "secret", email)
}
