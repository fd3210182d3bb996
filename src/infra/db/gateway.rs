use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgRow};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow};
use sqlx::{ConnectOptions, FromRow, PgPool, Postgres, Sqlite, SqlitePool};
use tracing::info;
use tracing::log::LevelFilter;

use super::dialect::Dialect;

/// A bound query argument. Nulls carry their type so the client/server engine
/// can infer parameter types.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(Option<bool>),
    Int(Option<i64>),
    Float(Option<f64>),
    Text(Option<String>),
    Timestamp(Option<DateTime<Utc>>),
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(Some(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(Some(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(Some(v))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(Some(v.to_string()))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(Some(v))
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Text(Some(v.clone()))
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Timestamp(Some(v))
    }
}

impl From<Option<bool>> for Value {
    fn from(v: Option<bool>) -> Self {
        Value::Bool(v)
    }
}

impl From<Option<i64>> for Value {
    fn from(v: Option<i64>) -> Self {
        Value::Int(v)
    }
}

impl From<Option<f64>> for Value {
    fn from(v: Option<f64>) -> Self {
        Value::Float(v)
    }
}

impl From<Option<String>> for Value {
    fn from(v: Option<String>) -> Self {
        Value::Text(v)
    }
}

impl From<&Option<String>> for Value {
    fn from(v: &Option<String>) -> Self {
        Value::Text(v.clone())
    }
}

impl From<Option<DateTime<Utc>>> for Value {
    fn from(v: Option<DateTime<Utc>>) -> Self {
        Value::Timestamp(v)
    }
}

/// Builds a `Vec<Value>` from heterogeneous arguments.
#[macro_export]
macro_rules! params {
    () => { Vec::<$crate::infra::db::Value>::new() };
    ($($arg:expr),+ $(,)?) => {
        vec![$($crate::infra::db::Value::from($arg)),+]
    };
}

/// Rows that decode from either engine.
pub trait Record: for<'r> FromRow<'r, SqliteRow> + for<'r> FromRow<'r, PgRow> + Send + Unpin {}

impl<T> Record for T where T: for<'r> FromRow<'r, SqliteRow> + for<'r> FromRow<'r, PgRow> + Send + Unpin {}

macro_rules! bind_values {
    ($query:expr, $args:expr) => {{
        let mut query = $query;
        for value in $args {
            query = match value {
                Value::Bool(v) => query.bind(*v),
                Value::Int(v) => query.bind(*v),
                Value::Float(v) => query.bind(*v),
                Value::Text(v) => query.bind(v.clone()),
                Value::Timestamp(v) => query.bind(*v),
            };
        }
        query
    }};
}

#[derive(Clone)]
enum DbPool {
    Sqlite(SqlitePool),
    Postgres(PgPool),
}

/// The single entry point to durable state. Queries are written with `?`
/// markers and rewritten for the configured dialect.
#[derive(Clone)]
pub struct Gateway {
    pool: DbPool,
}

impl Gateway {
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        match Dialect::from_url(database_url) {
            Dialect::ClientServer => {
                info!("Initializing PostgreSQL connection...");

                let opts = PgConnectOptions::from_str(database_url)?
                    .log_statements(LevelFilter::Debug)
                    .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

                let pool = PgPoolOptions::new()
                    .max_connections(max_connections)
                    .connect_with(opts)
                    .await?;

                Ok(Self::from_postgres(pool))
            }
            Dialect::Embedded => {
                info!("Initializing SQLite connection with WAL Mode...");

                let opts = SqliteConnectOptions::from_str(database_url)?
                    .create_if_missing(true)
                    .journal_mode(SqliteJournalMode::Wal)
                    .foreign_keys(true)
                    .busy_timeout(Duration::from_secs(5))
                    .log_statements(LevelFilter::Debug)
                    .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

                let pool = SqlitePoolOptions::new()
                    .max_connections(max_connections)
                    .connect_with(opts)
                    .await?;

                Ok(Self::from_sqlite(pool))
            }
        }
    }

    pub fn from_sqlite(pool: SqlitePool) -> Self {
        Self { pool: DbPool::Sqlite(pool) }
    }

    pub fn from_postgres(pool: PgPool) -> Self {
        Self { pool: DbPool::Postgres(pool) }
    }

    pub fn dialect(&self) -> Dialect {
        match self.pool {
            DbPool::Sqlite(_) => Dialect::Embedded,
            DbPool::Postgres(_) => Dialect::ClientServer,
        }
    }

    /// Returns the number of affected rows.
    pub async fn execute(&self, sql: &str, args: &[Value]) -> Result<u64, sqlx::Error> {
        let sql = self.dialect().rebind(sql);
        let result = match &self.pool {
            DbPool::Sqlite(pool) => bind_values!(sqlx::query::<Sqlite>(&sql), args)
                .execute(pool)
                .await?
                .rows_affected(),
            DbPool::Postgres(pool) => bind_values!(sqlx::query::<Postgres>(&sql), args)
                .execute(pool)
                .await?
                .rows_affected(),
        };
        Ok(result)
    }

    pub async fn query<T: Record>(&self, sql: &str, args: &[Value]) -> Result<Vec<T>, sqlx::Error> {
        let sql = self.dialect().rebind(sql);
        match &self.pool {
            DbPool::Sqlite(pool) => bind_values!(sqlx::query_as::<Sqlite, T>(&sql), args)
                .fetch_all(pool)
                .await,
            DbPool::Postgres(pool) => bind_values!(sqlx::query_as::<Postgres, T>(&sql), args)
                .fetch_all(pool)
                .await,
        }
    }

    /// First row, or `None` when the query matched nothing.
    pub async fn query_one<T: Record>(&self, sql: &str, args: &[Value]) -> Result<Option<T>, sqlx::Error> {
        let sql = self.dialect().rebind(sql);
        match &self.pool {
            DbPool::Sqlite(pool) => bind_values!(sqlx::query_as::<Sqlite, T>(&sql), args)
                .fetch_optional(pool)
                .await,
            DbPool::Postgres(pool) => bind_values!(sqlx::query_as::<Postgres, T>(&sql), args)
                .fetch_optional(pool)
                .await,
        }
    }

    /// Runs a `SELECT COUNT(*) ...` style query.
    pub async fn count(&self, sql: &str, args: &[Value]) -> Result<i64, sqlx::Error> {
        let row: Option<(i64,)> = self.query_one(sql, args).await?;
        Ok(row.map(|(n,)| n).unwrap_or(0))
    }

    /// Executes a multi-statement script verbatim, without arguments.
    pub async fn execute_script(&self, script: &str) -> Result<(), sqlx::Error> {
        match &self.pool {
            DbPool::Sqlite(pool) => sqlx::raw_sql(script).execute(pool).await.map(|_| ()),
            DbPool::Postgres(pool) => sqlx::raw_sql(script).execute(pool).await.map(|_| ()),
        }
    }

    pub async fn begin(&self) -> Result<Transaction, sqlx::Error> {
        let inner = match &self.pool {
            DbPool::Sqlite(pool) => TxInner::Sqlite(pool.begin().await?),
            DbPool::Postgres(pool) => TxInner::Postgres(pool.begin().await?),
        };
        Ok(Transaction { inner, dialect: self.dialect() })
    }

    pub async fn close(&self) {
        match &self.pool {
            DbPool::Sqlite(pool) => pool.close().await,
            DbPool::Postgres(pool) => pool.close().await,
        }
    }

    pub fn is_closed(&self) -> bool {
        match &self.pool {
            DbPool::Sqlite(pool) => pool.is_closed(),
            DbPool::Postgres(pool) => pool.is_closed(),
        }
    }
}

enum TxInner {
    Sqlite(sqlx::Transaction<'static, Sqlite>),
    Postgres(sqlx::Transaction<'static, Postgres>),
}

/// A gateway transaction. Dropping it without `commit` rolls back.
pub struct Transaction {
    inner: TxInner,
    dialect: Dialect,
}

impl Transaction {
    pub async fn execute(&mut self, sql: &str, args: &[Value]) -> Result<u64, sqlx::Error> {
        let sql = self.dialect.rebind(sql);
        let result = match &mut self.inner {
            TxInner::Sqlite(tx) => bind_values!(sqlx::query::<Sqlite>(&sql), args)
                .execute(&mut **tx)
                .await?
                .rows_affected(),
            TxInner::Postgres(tx) => bind_values!(sqlx::query::<Postgres>(&sql), args)
                .execute(&mut **tx)
                .await?
                .rows_affected(),
        };
        Ok(result)
    }

    pub async fn query<T: Record>(&mut self, sql: &str, args: &[Value]) -> Result<Vec<T>, sqlx::Error> {
        let sql = self.dialect.rebind(sql);
        match &mut self.inner {
            TxInner::Sqlite(tx) => bind_values!(sqlx::query_as::<Sqlite, T>(&sql), args)
                .fetch_all(&mut **tx)
                .await,
            TxInner::Postgres(tx) => bind_values!(sqlx::query_as::<Postgres, T>(&sql), args)
                .fetch_all(&mut **tx)
                .await,
        }
    }

    pub async fn query_one<T: Record>(&mut self, sql: &str, args: &[Value]) -> Result<Option<T>, sqlx::Error> {
        let sql = self.dialect.rebind(sql);
        match &mut self.inner {
            TxInner::Sqlite(tx) => bind_values!(sqlx::query_as::<Sqlite, T>(&sql), args)
                .fetch_optional(&mut **tx)
                .await,
            TxInner::Postgres(tx) => bind_values!(sqlx::query_as::<Postgres, T>(&sql), args)
                .fetch_optional(&mut **tx)
                .await,
        }
    }

    pub async fn count(&mut self, sql: &str, args: &[Value]) -> Result<i64, sqlx::Error> {
        let row: Option<(i64,)> = self.query_one(sql, args).await?;
        Ok(row.map(|(n,)| n).unwrap_or(0))
    }

    pub async fn execute_script(&mut self, script: &str) -> Result<(), sqlx::Error> {
        match &mut self.inner {
            TxInner::Sqlite(tx) => sqlx::raw_sql(script).execute(&mut **tx).await.map(|_| ()),
            TxInner::Postgres(tx) => sqlx::raw_sql(script).execute(&mut **tx).await.map(|_| ()),
        }
    }

    pub async fn commit(self) -> Result<(), sqlx::Error> {
        match self.inner {
            TxInner::Sqlite(tx) => tx.commit().await,
            TxInner::Postgres(tx) => tx.commit().await,
        }
    }

    pub async fn rollback(self) -> Result<(), sqlx::Error> {
        match self.inner {
            TxInner::Sqlite(tx) => tx.rollback().await,
            TxInner::Postgres(tx) => tx.rollback().await,
        }
    }
}
