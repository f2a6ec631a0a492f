//! Predicate trees for account queries.
//!
//! A [`CriteriaQuery`] is composed from [`Predicate`] values instead of a
//! literal SQL string and rendered to a parameterised `SELECT` against the
//! `account` table. Values never appear in the SQL text; they are returned
//! alongside it as [`Param`]s in placeholder order.

use std::fmt::{self, Display, Formatter};

use crate::account::ACCOUNT_COLUMNS;

/// Mapped column of the `account` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Id,
    Username,
    Password,
    Email,
}

impl Column {
    pub fn name(&self) -> &'static str {
        match self {
            Column::Id => "user_id",
            Column::Username => "username",
            Column::Password => "password",
            Column::Email => "email",
        }
    }
}

impl Display for Column {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Bound query parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Param {
    Int(i64),
    Text(String),
}

impl From<i64> for Param {
    fn from(value: i64) -> Self {
        Param::Int(value)
    }
}

impl From<&str> for Param {
    fn from(value: &str) -> Self {
        Param::Text(value.to_string())
    }
}

impl From<String> for Param {
    fn from(value: String) -> Self {
        Param::Text(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Like,
    NotLike,
}

impl ComparisonOp {
    fn sql(&self) -> &'static str {
        match self {
            ComparisonOp::Equal => " = ",
            ComparisonOp::NotEqual => " <> ",
            ComparisonOp::Less => " < ",
            ComparisonOp::LessEqual => " <= ",
            ComparisonOp::Greater => " > ",
            ComparisonOp::GreaterEqual => " >= ",
            ComparisonOp::Like => " LIKE ",
            ComparisonOp::NotLike => " NOT LIKE ",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    Compare {
        column: Column,
        op: ComparisonOp,
        value: Param,
    },
    Not(Box<Predicate>),
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
}

impl Predicate {
    pub fn compare(column: Column, op: ComparisonOp, value: impl Into<Param>) -> Self {
        Predicate::Compare {
            column,
            op,
            value: value.into(),
        }
    }

    pub fn like(column: Column, pattern: impl Into<Param>) -> Self {
        Self::compare(column, ComparisonOp::Like, pattern)
    }

    pub fn eq(column: Column, value: impl Into<Param>) -> Self {
        Self::compare(column, ComparisonOp::Equal, value)
    }

    pub fn ge(column: Column, value: impl Into<Param>) -> Self {
        Self::compare(column, ComparisonOp::GreaterEqual, value)
    }

    pub fn gt(column: Column, value: impl Into<Param>) -> Self {
        Self::compare(column, ComparisonOp::Greater, value)
    }

    pub fn le(column: Column, value: impl Into<Param>) -> Self {
        Self::compare(column, ComparisonOp::LessEqual, value)
    }

    pub fn lt(column: Column, value: impl Into<Param>) -> Self {
        Self::compare(column, ComparisonOp::Less, value)
    }

    pub fn and(self, other: Predicate) -> Self {
        match self {
            Predicate::And(mut items) => {
                items.push(other);
                Predicate::And(items)
            }
            lhs => Predicate::And(vec![lhs, other]),
        }
    }

    pub fn or(self, other: Predicate) -> Self {
        match self {
            Predicate::Or(mut items) => {
                items.push(other);
                Predicate::Or(items)
            }
            lhs => Predicate::Or(vec![lhs, other]),
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Predicate::Not(Box::new(self))
    }

    /// Binding strength; a child binding weaker than its parent is parenthesized.
    fn precedence(&self) -> u8 {
        match self {
            Predicate::Or(items) | Predicate::And(items) if items.len() == 1 => {
                items[0].precedence()
            }
            Predicate::Or(_) => 1,
            Predicate::And(_) => 2,
            Predicate::Not(_) => 3,
            Predicate::Compare { .. } => 4,
        }
    }

    fn write_sql(&self, out: &mut String, params: &mut Vec<Param>) {
        match self {
            Predicate::Compare { column, op, value } => {
                params.push(value.clone());
                out.push_str(column.name());
                out.push_str(op.sql());
                out.push('$');
                out.push_str(&params.len().to_string());
            }
            Predicate::Not(inner) => {
                out.push_str("NOT ");
                write_child(inner, self.precedence(), out, params);
            }
            Predicate::And(items) => write_joined(items, " AND ", "1 = 1", self.precedence(), out, params),
            Predicate::Or(items) => write_joined(items, " OR ", "1 = 0", self.precedence(), out, params),
        }
    }
}

fn write_joined(
    items: &[Predicate],
    separator: &str,
    empty: &str,
    precedence: u8,
    out: &mut String,
    params: &mut Vec<Param>,
) {
    if items.is_empty() {
        out.push_str(empty);
        return;
    }
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push_str(separator);
        }
        write_child(item, precedence, out, params);
    }
}

fn write_child(child: &Predicate, parent: u8, out: &mut String, params: &mut Vec<Param>) {
    let parenthesized = child.precedence() < parent;
    if parenthesized {
        out.push('(');
    }
    child.write_sql(out, params);
    if parenthesized {
        out.push(')');
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

/// Composed `SELECT` over the account table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CriteriaQuery {
    predicate: Option<Predicate>,
    order_by: Vec<(Column, Order)>,
}

impl CriteriaQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the WHERE clause.
    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.predicate = Some(predicate);
        self
    }

    pub fn order_by(mut self, column: Column, order: Order) -> Self {
        self.order_by.push((column, order));
        self
    }

    pub fn predicate(&self) -> Option<&Predicate> {
        self.predicate.as_ref()
    }

    /// Render to SQL with `$n` placeholders and the parameters to bind.
    pub fn to_sql(&self) -> (String, Vec<Param>) {
        let mut sql = format!("SELECT {ACCOUNT_COLUMNS} FROM account");
        let mut params = Vec::new();
        if let Some(predicate) = &self.predicate {
            sql.push_str(" WHERE ");
            predicate.write_sql(&mut sql, &mut params);
        }
        for (i, (column, order)) in self.order_by.iter().enumerate() {
            sql.push_str(if i == 0 { " ORDER BY " } else { ", " });
            sql.push_str(column.name());
            if *order == Order::Desc {
                sql.push_str(" DESC");
            }
        }
        (sql, params)
    }
}
