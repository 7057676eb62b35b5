// ABOUTME: SQLite implementation of the settings backend
// ABOUTME: Uses sqlx with validated table identifiers and bound values

use async_trait::async_trait;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{migrate::MigrateDatabase, QueryBuilder, Row, Sqlite};
use tracing::{debug, info};

use crate::backend::SettingsBackend;
use crate::types::{Fields, Filter, SettingRow};
use crate::{check_table, StorageError, StorageResult};

/// SQLite implementation of SettingsBackend
#[derive(Clone)]
pub struct SqliteBackend {
    pool: SqlitePool,
}

impl SqliteBackend {
    /// Connect to a `sqlite:` URL, creating the database file if needed
    pub async fn connect(database_url: &str) -> StorageResult<Self> {
        let in_memory = database_url.contains(":memory:");

        if !in_memory {
            if let Some(path) = database_url.strip_prefix("sqlite:") {
                if let Some(parent) = std::path::Path::new(path).parent() {
                    if !parent.as_os_str().is_empty() {
                        std::fs::create_dir_all(parent)?;
                    }
                }
            }

            if !Sqlite::database_exists(database_url).await? {
                debug!("Creating database at: {}", database_url);
                Sqlite::create_database(database_url).await?;
            }
        }

        // In-memory databases are per-connection, so keep exactly one
        let max_connections = if in_memory { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .connect(database_url)
            .await?;

        if !in_memory {
            sqlx::query("PRAGMA journal_mode = WAL")
                .execute(&pool)
                .await?;
        }

        sqlx::query("PRAGMA synchronous = NORMAL")
            .execute(&pool)
            .await?;

        info!("Connected settings backend at: {}", database_url);
        Ok(Self { pool })
    }

    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create the settings table if it does not exist
    pub async fn ensure_table(&self, table: &str) -> StorageResult<()> {
        check_table(table)?;

        let sql = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                setting_key TEXT PRIMARY KEY NOT NULL,
                setting_value TEXT,
                serialized TEXT DEFAULT '0'
            )
            "#,
            table
        );
        sqlx::query(&sql).execute(&self.pool).await?;

        debug!("Ensured settings table: {}", table);
        Ok(())
    }

    fn row_to_setting(&self, row: &SqliteRow) -> StorageResult<SettingRow> {
        let serialized: Option<String> = row.try_get("serialized")?;
        Ok(SettingRow {
            setting_key: row.try_get("setting_key")?,
            setting_value: row.try_get("setting_value")?,
            serialized: serialized.as_deref() == Some("1"),
        })
    }
}

fn map_write_error(err: sqlx::Error, fields: &Fields) -> StorageError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            let key = fields
                .get(crate::Column::SettingKey)
                .and_then(|v| v.clone())
                .unwrap_or_default();
            return StorageError::DuplicateKey(key);
        }
    }
    StorageError::Sqlx(err)
}

#[async_trait]
impl SettingsBackend for SqliteBackend {
    async fn select_all(&self, table: &str) -> StorageResult<Vec<SettingRow>> {
        check_table(table)?;

        let sql = format!(
            "SELECT setting_key, setting_value, serialized FROM {} ORDER BY rowid",
            table
        );
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        rows.iter().map(|row| self.row_to_setting(row)).collect()
    }

    async fn select_one(&self, table: &str, filter: &Filter) -> StorageResult<Option<SettingRow>> {
        check_table(table)?;

        let sql = format!(
            "SELECT setting_key, setting_value, serialized FROM {} WHERE {} = ? LIMIT 1",
            table,
            filter.column.as_str()
        );
        let row = sqlx::query(&sql)
            .bind(&filter.value)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(|r| self.row_to_setting(r)).transpose()
    }

    async fn insert(&self, table: &str, fields: &Fields) -> StorageResult<()> {
        check_table(table)?;
        if fields.is_empty() {
            return Err(StorageError::InvalidInput(
                "Insert requires at least one column".to_string(),
            ));
        }

        // Column names are hardcoded literals from Column, values are bound
        let mut query_builder: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("INSERT INTO {} (", table));
        {
            let mut columns = query_builder.separated(", ");
            for (column, _) in fields.iter() {
                columns.push(column.as_str());
            }
        }
        query_builder.push(") VALUES (");
        {
            let mut values = query_builder.separated(", ");
            for (_, value) in fields.iter() {
                values.push_bind(value.clone());
            }
        }
        query_builder.push(")");

        query_builder
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| map_write_error(e, fields))?;

        Ok(())
    }

    async fn update(&self, table: &str, fields: &Fields, filter: &Filter) -> StorageResult<u64> {
        check_table(table)?;
        if fields.is_empty() {
            return Ok(0);
        }

        let mut query_builder: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("UPDATE {} SET ", table));
        {
            let mut assignments = query_builder.separated(", ");
            for (column, value) in fields.iter() {
                assignments.push(format!("{} = ", column.as_str()));
                assignments.push_bind_unseparated(value.clone());
            }
        }
        query_builder.push(format!(" WHERE {} = ", filter.column.as_str()));
        query_builder.push_bind(filter.value.clone());

        let result = query_builder
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| map_write_error(e, fields))?;

        Ok(result.rows_affected())
    }
}
