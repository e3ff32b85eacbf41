//! Store-driver seam: transaction handles and the databases that open them.

use async_trait::async_trait;

use crate::Result;

/// A value bound to, or read from, a SQL statement.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    Text(String),
    Json(serde_json::Value),
}

impl SqlValue {
    /// Returns the text content, if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            SqlValue::Text(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the integer content, if this is an integer value.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            SqlValue::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the JSON content, if this is a JSON value.
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            SqlValue::Json(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Int(value)
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        SqlValue::Bool(value)
    }
}

impl From<serde_json::Value> for SqlValue {
    fn from(value: serde_json::Value) -> Self {
        SqlValue::Json(value)
    }
}

/// A result row, keyed by column name in select order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    columns: Vec<(String, SqlValue)>,
}

impl Row {
    /// Creates an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a column and returns the row.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.push(name, value);
        self
    }

    /// Appends a column.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<SqlValue>) {
        self.columns.push((name.into(), value.into()));
    }

    /// Looks up a column by name.
    pub fn get(&self, name: &str) -> Option<&SqlValue> {
        self.columns
            .iter()
            .find(|(column, _)| column == name)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// An open database transaction.
///
/// Statements use positional `$n` placeholders. Once `commit` or `rollback`
/// has run the handle is finished: further statements and commits fail with
/// [`StoreError::TransactionFinished`](crate::StoreError::TransactionFinished),
/// while further rollbacks are no-ops. Dropping an unfinished handle rolls
/// the transaction back.
#[async_trait]
pub trait Transaction: Send {
    /// Executes a statement and returns the number of affected rows.
    async fn execute(&mut self, statement: &str, args: &[SqlValue]) -> Result<u64>;

    /// Runs a query and returns every result row.
    async fn query(&mut self, statement: &str, args: &[SqlValue]) -> Result<Vec<Row>>;

    /// Makes every write of the transaction durable.
    async fn commit(&mut self) -> Result<()>;

    /// Discards every write of the transaction. Idempotent.
    async fn rollback(&mut self) -> Result<()>;
}

/// A store driver able to open transactions.
#[async_trait]
pub trait Database: Send + Sync {
    type Transaction: Transaction + 'static;

    /// Opens a new transaction.
    async fn begin(&self) -> Result<Self::Transaction>;
}
