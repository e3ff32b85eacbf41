use async_trait::async_trait;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::{Column, PgPool, Postgres, Row as _, TypeInfo};
use uuid::Uuid;

use crate::{
    Result, StoreError,
    transaction::{Database, Row, SqlValue, Transaction},
};

/// PostgreSQL-backed store driver.
#[derive(Clone)]
pub struct PostgresDatabase {
    pool: PgPool,
}

impl PostgresDatabase {
    /// Creates a new driver over an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }
}

#[async_trait]
impl Database for PostgresDatabase {
    type Transaction = PostgresTransaction;

    async fn begin(&self) -> Result<PostgresTransaction> {
        let tx = self.pool.begin().await?;
        Ok(PostgresTransaction { inner: Some(tx) })
    }
}

/// A transaction on a pooled PostgreSQL connection.
///
/// sqlx rolls an unfinished transaction back when it is dropped.
pub struct PostgresTransaction {
    inner: Option<sqlx::Transaction<'static, Postgres>>,
}

impl PostgresTransaction {
    fn bind_all<'q>(statement: &'q str, args: &[SqlValue]) -> Query<'q, Postgres, PgArguments> {
        let mut query = sqlx::query(statement);
        for arg in args {
            query = match arg {
                SqlValue::Null => query.bind(None::<String>),
                SqlValue::Bool(value) => query.bind(*value),
                SqlValue::Int(value) => query.bind(*value),
                SqlValue::Text(value) => query.bind(value.clone()),
                SqlValue::Json(value) => query.bind(value.clone()),
            };
        }
        query
    }

    fn decode_row(row: &PgRow) -> Result<Row> {
        let mut decoded = Row::new();
        for column in row.columns() {
            let index = column.ordinal();
            let value = match column.type_info().name() {
                "BOOL" => row.try_get::<Option<bool>, _>(index)?.map(SqlValue::Bool),
                "INT2" => row
                    .try_get::<Option<i16>, _>(index)?
                    .map(|v| SqlValue::Int(v.into())),
                "INT4" => row
                    .try_get::<Option<i32>, _>(index)?
                    .map(|v| SqlValue::Int(v.into())),
                "INT8" => row.try_get::<Option<i64>, _>(index)?.map(SqlValue::Int),
                "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" => {
                    row.try_get::<Option<String>, _>(index)?.map(SqlValue::Text)
                }
                "UUID" => row
                    .try_get::<Option<Uuid>, _>(index)?
                    .map(|v| SqlValue::Text(v.to_string())),
                "JSON" | "JSONB" => row
                    .try_get::<Option<serde_json::Value>, _>(index)?
                    .map(SqlValue::Json),
                other => {
                    return Err(StoreError::UnsupportedColumnType {
                        column: column.name().to_string(),
                        type_name: other.to_string(),
                    });
                }
            };
            decoded.push(column.name(), value.unwrap_or(SqlValue::Null));
        }
        Ok(decoded)
    }
}

#[async_trait]
impl Transaction for PostgresTransaction {
    async fn execute(&mut self, statement: &str, args: &[SqlValue]) -> Result<u64> {
        let tx = self.inner.as_mut().ok_or(StoreError::TransactionFinished)?;
        let result = Self::bind_all(statement, args).execute(&mut **tx).await?;
        Ok(result.rows_affected())
    }

    async fn query(&mut self, statement: &str, args: &[SqlValue]) -> Result<Vec<Row>> {
        let tx = self.inner.as_mut().ok_or(StoreError::TransactionFinished)?;
        let rows = Self::bind_all(statement, args).fetch_all(&mut **tx).await?;
        rows.iter().map(Self::decode_row).collect()
    }

    async fn commit(&mut self) -> Result<()> {
        let tx = self.inner.take().ok_or(StoreError::TransactionFinished)?;
        tx.commit().await?;
        Ok(())
    }

    async fn rollback(&mut self) -> Result<()> {
        if let Some(tx) = self.inner.take() {
            tx.rollback().await?;
        }
        Ok(())
    }
}
