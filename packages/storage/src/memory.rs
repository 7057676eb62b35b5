// ABOUTME: In-memory settings backend
// ABOUTME: Insertion-ordered rows per table, for tests and database-free embedding

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::backend::SettingsBackend;
use crate::types::{Column, Fields, Filter, SettingRow};
use crate::{check_table, StorageError, StorageResult};

#[derive(Debug, Default)]
pub struct MemoryBackend {
    tables: RwLock<HashMap<String, Vec<SettingRow>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a table with raw rows, bypassing duplicate checks
    pub async fn seed(&self, table: &str, rows: Vec<SettingRow>) {
        self.tables
            .write()
            .await
            .entry(table.to_string())
            .or_default()
            .extend(rows);
    }

    pub async fn row_count(&self, table: &str) -> usize {
        self.tables
            .read()
            .await
            .get(table)
            .map(Vec::len)
            .unwrap_or(0)
    }
}

#[async_trait]
impl SettingsBackend for MemoryBackend {
    async fn select_all(&self, table: &str) -> StorageResult<Vec<SettingRow>> {
        check_table(table)?;
        Ok(self
            .tables
            .read()
            .await
            .get(table)
            .cloned()
            .unwrap_or_default())
    }

    async fn select_one(&self, table: &str, filter: &Filter) -> StorageResult<Option<SettingRow>> {
        check_table(table)?;
        Ok(self
            .tables
            .read()
            .await
            .get(table)
            .and_then(|rows| rows.iter().find(|row| filter.matches(row)).cloned()))
    }

    async fn insert(&self, table: &str, fields: &Fields) -> StorageResult<()> {
        check_table(table)?;

        let key = fields
            .get(Column::SettingKey)
            .and_then(|v| v.clone())
            .ok_or_else(|| StorageError::InvalidInput("setting_key is required".to_string()))?;

        let mut tables = self.tables.write().await;
        let rows = tables.entry(table.to_string()).or_default();
        if rows.iter().any(|row| row.setting_key == key) {
            return Err(StorageError::DuplicateKey(key));
        }

        let mut row = SettingRow::new(key);
        row.apply(fields);
        rows.push(row);
        Ok(())
    }

    async fn update(&self, table: &str, fields: &Fields, filter: &Filter) -> StorageResult<u64> {
        check_table(table)?;

        let mut tables = self.tables.write().await;
        let Some(rows) = tables.get_mut(table) else {
            return Ok(0);
        };

        let mut changed = 0;
        for row in rows.iter_mut().filter(|row| filter.matches(row)) {
            row.apply(fields);
            changed += 1;
        }
        Ok(changed)
    }
}
