// guarded query execution
// every statement goes through the guard before it reaches the pool

use crate::Error;
use serde::Serialize;
use sqlx::any::{AnyPoolOptions, AnyRow};
use sqlx::{AnyPool, Column, Row};
use tracing::{debug, info};

use super::guard::Guard;

pub struct Db {
    pool: AnyPool,
    dialect: Dialect,
}

#[derive(Debug, Serialize)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<serde_json::Value>>,
    pub row_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Postgres,
    Sqlite,
    Mysql,
}

impl Dialect {
    // figure out dialect from connection string
    pub fn from_url(url: &str) -> Self {
        if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            Self::Postgres
        } else if url.starts_with("mysql://") || url.starts_with("mariadb://") {
            Self::Mysql
        } else {
            Self::Sqlite
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::Sqlite => "sqlite",
            Self::Mysql => "mysql",
        }
    }

    // statement that opens a read-only transaction, sqlite has none
    // and relies on the rollback alone
    fn read_only_begin(self) -> Option<&'static str> {
        match self {
            Self::Postgres => Some("BEGIN TRANSACTION READ ONLY"),
            Self::Mysql => Some("START TRANSACTION READ ONLY"),
            Self::Sqlite => None,
        }
    }
}

impl Db {
    pub async fn connect(url: &str) -> Result<Self, Error> {
        sqlx::any::install_default_drivers();

        let dialect = Dialect::from_url(url);

        let pool = AnyPoolOptions::new()
            .max_connections(5)
            .connect(url)
            .await?;

        info!(dialect = dialect.name(), "connected");
        Ok(Self { pool, dialect })
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    // check, then run. read-only mode never commits anything
    pub async fn run(&self, guard: &Guard, sql: &str) -> Result<QueryResult, Error> {
        guard.check(sql)?;

        if guard.mode().is_read_only() {
            self.read_only(sql).await
        } else {
            let mut tx = self.pool.begin().await?;
            let rows = sqlx::query(sql).fetch_all(&mut *tx).await?;
            tx.commit().await?;
            Ok(to_result(rows))
        }
    }

    // several statements in one transaction, all checked before any runs
    pub async fn transact(
        &self,
        guard: &Guard,
        statements: &[String],
    ) -> Result<Vec<QueryResult>, Error> {
        if guard.mode().is_read_only() {
            return Err(Error::WritesDisabled);
        }

        for sql in statements {
            guard.check(sql)?;
        }

        let mut tx = self.pool.begin().await?;
        let mut results = Vec::with_capacity(statements.len());
        for sql in statements {
            let rows = sqlx::query(sql).fetch_all(&mut *tx).await?;
            results.push(to_result(rows));
        }
        tx.commit().await?;

        debug!(count = statements.len(), "transaction committed");
        Ok(results)
    }

    // a dropped transaction rolls back, so an error or a cancelled request
    // never returns the connection mid-transaction
    async fn read_only(&self, sql: &str) -> Result<QueryResult, Error> {
        let mut tx = match self.dialect.read_only_begin() {
            Some(stmt) => self.pool.begin_with(stmt).await?,
            None => self.pool.begin().await?,
        };

        let rows = sqlx::query(sql).fetch_all(&mut *tx).await?;
        tx.rollback().await?;

        Ok(to_result(rows))
    }

    // table and column listing, used by the server's /schema route
    pub async fn schema(&self) -> Result<String, Error> {
        match self.dialect {
            Dialect::Postgres => self.postgres_schema().await,
            Dialect::Sqlite => self.sqlite_schema().await,
            Dialect::Mysql => self.mysql_schema().await,
        }
    }

    async fn postgres_schema(&self) -> Result<String, Error> {
        let rows: Vec<(String, String, String)> = sqlx::query_as(
            r#"SELECT table_name::text, column_name::text, data_type::text
               FROM information_schema.columns
               WHERE table_schema = 'public'
               ORDER BY table_name, ordinal_position"#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(format_schema(rows))
    }

    async fn sqlite_schema(&self) -> Result<String, Error> {
        let tables: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut result = Vec::new();
        for (table,) in tables {
            let query = format!("PRAGMA table_info(\"{}\")", table.replace('"', "\"\""));
            let cols: Vec<(i32, String, String, i32, Option<String>, i32)> =
                sqlx::query_as(&query).fetch_all(&self.pool).await?;

            for (_, name, dtype, _, _, _) in cols {
                result.push((table.clone(), name, dtype));
            }
        }

        Ok(format_schema(result))
    }

    async fn mysql_schema(&self) -> Result<String, Error> {
        let rows: Vec<(String, String, String)> = sqlx::query_as(
            r#"SELECT table_name, column_name, data_type
               FROM information_schema.columns
               WHERE table_schema = DATABASE()
               ORDER BY table_name, ordinal_position"#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(format_schema(rows))
    }
}

fn to_result(rows: Vec<AnyRow>) -> QueryResult {
    let Some(first) = rows.first() else {
        return QueryResult {
            columns: vec![],
            rows: vec![],
            row_count: 0,
        };
    };

    let columns: Vec<String> = first
        .columns()
        .iter()
        .map(|c| c.name().to_string())
        .collect();

    let json_rows: Vec<Vec<serde_json::Value>> = rows
        .iter()
        .map(|row| (0..columns.len()).map(|i| row_value_to_json(row, i)).collect())
        .collect();

    let row_count = json_rows.len();

    QueryResult {
        columns,
        rows: json_rows,
        row_count,
    }
}

fn format_schema(rows: Vec<(String, String, String)>) -> String {
    let mut result = String::new();
    let mut current_table = String::new();

    for (table, column, dtype) in rows {
        if table != current_table {
            if !current_table.is_empty() {
                result.push_str(")\n\n");
            }
            result.push_str(&format!("TABLE {table} (\n"));
            current_table = table;
        }
        result.push_str(&format!("  {column} {dtype}\n"));
    }

    if !current_table.is_empty() {
        result.push(')');
    }

    result
}

// convert database values to json (handling type mismatches gracefully)
fn row_value_to_json(row: &AnyRow, index: usize) -> serde_json::Value {
    use sqlx::ValueRef;

    if row.try_get_raw(index).map(|v| v.is_null()).unwrap_or(true) {
        return serde_json::Value::Null;
    }

    if let Ok(v) = row.try_get::<String, _>(index) {
        return serde_json::Value::String(v);
    }
    if let Ok(v) = row.try_get::<i64, _>(index) {
        return serde_json::Value::Number(v.into());
    }
    if let Ok(v) = row.try_get::<i32, _>(index) {
        return serde_json::Value::Number(v.into());
    }
    if let Ok(v) = row.try_get::<f64, _>(index) {
        return serde_json::Number::from_f64(v)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null);
    }
    if let Ok(v) = row.try_get::<bool, _>(index) {
        return serde_json::Value::Bool(v);
    }

    serde_json::Value::String("<unsupported>".to_string())
}
