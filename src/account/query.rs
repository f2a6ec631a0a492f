/// Predefined account queries, addressable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamedQuery {
    FindAllUnordered,
    FindAllOrderedByName,
    /// Takes one parameter: a `LIKE` pattern for the email column.
    FindByEmail,
}

impl NamedQuery {
    pub const ALL: [NamedQuery; 3] = [
        NamedQuery::FindAllUnordered,
        NamedQuery::FindAllOrderedByName,
        NamedQuery::FindByEmail,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            NamedQuery::FindAllUnordered => "Account.findAllUnordered",
            NamedQuery::FindAllOrderedByName => "Account.findAllOrderedByName",
            NamedQuery::FindByEmail => "Account.findByEmail",
        }
    }

    pub fn sql(&self) -> &'static str {
        match self {
            NamedQuery::FindAllUnordered => "SELECT user_id, username, password, email FROM account",
            NamedQuery::FindAllOrderedByName => {
                "SELECT user_id, username, password, email FROM account ORDER BY username"
            }
            NamedQuery::FindByEmail => {
                "SELECT user_id, username, password, email FROM account WHERE email LIKE $1 ORDER BY username"
            }
        }
    }

    /// Number of `$n` parameters the query expects.
    pub fn param_count(&self) -> usize {
        match self {
            NamedQuery::FindByEmail => 1,
            _ => 0,
        }
    }

    pub fn by_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|query| query.name() == name)
    }
}
