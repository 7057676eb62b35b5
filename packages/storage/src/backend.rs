// ABOUTME: Persistence backend trait used by the settings store
// ABOUTME: Generic select/insert/update against a named table

use async_trait::async_trait;

use crate::types::{Fields, Filter, SettingRow};
use crate::StorageResult;

/// Key/value persistence for settings tables.
///
/// Every call is a single round-trip. Nothing is batched or wrapped in a
/// transaction, so a multi-key write that fails midway stays partially applied.
#[async_trait]
pub trait SettingsBackend: Send + Sync {
    /// Every row of `table`, unfiltered
    async fn select_all(&self, table: &str) -> StorageResult<Vec<SettingRow>>;

    /// First row matching `filter`, if any
    async fn select_one(&self, table: &str, filter: &Filter) -> StorageResult<Option<SettingRow>>;

    async fn insert(&self, table: &str, fields: &Fields) -> StorageResult<()>;

    /// Returns the number of rows changed
    async fn update(&self, table: &str, fields: &Fields, filter: &Filter) -> StorageResult<u64>;
}
