// ABOUTME: Settings store resolving defaults, stored rows and overrides
// ABOUTME: Lazily cached reads and per-key encoded writes against a backend

use std::collections::BTreeMap;
use std::sync::Arc;

use cairn_security::EncryptionProvider;
use cairn_storage::{Column, Fields, Filter, SettingRow, SettingsBackend};
use tracing::{debug, info, warn};

use crate::codec;
use crate::defaults::{self, API_KEY, API_SECRET};
use crate::error::{SettingsError, SettingsResult};
use crate::language::LanguageProvider;
use crate::overrides::Overrides;
use crate::policy::{key_set, KeyPolicies};
use crate::types::{ResolvedSettings, SettingValue};
use crate::update::{SettingsUpdate, UpdateSummary};
use crate::validation::{NoopValidator, SettingsValidator, ValidationReport};

/// Settings for one domain, persisted as rows of a single table.
///
/// Configure defaults, policies and collaborators before the first
/// [`resolve`](Self::resolve); the resolved map is cached per instance and only
/// rebuilt on a forced reload. Writes never touch the cache.
pub struct SettingsStore<V: SettingsValidator = NoopValidator> {
    backend: Arc<dyn SettingsBackend>,
    language: Arc<dyn LanguageProvider>,
    validator: V,
    encrypt: Option<Arc<dyn EncryptionProvider>>,
    table: String,
    defaults: BTreeMap<String, SettingValue>,
    overrides: Overrides,
    policies: KeyPolicies,
    cache: Option<ResolvedSettings>,
}

impl<V: SettingsValidator> SettingsStore<V> {
    pub fn new(
        backend: Arc<dyn SettingsBackend>,
        language: Arc<dyn LanguageProvider>,
        validator: V,
    ) -> Self {
        Self {
            backend,
            language,
            validator,
            encrypt: None,
            table: String::new(),
            defaults: BTreeMap::new(),
            overrides: Overrides::new(),
            policies: KeyPolicies::default(),
            cache: None,
        }
    }

    /// Accumulate defaults. Earlier explicit defaults win over `defaults`,
    /// which win over the global baseline.
    pub fn set_defaults<I, K, T>(&mut self, defaults: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, T)>,
        K: Into<String>,
        T: Into<SettingValue>,
    {
        let supplied = defaults.into_iter().map(|(k, v)| (k.into(), v.into()));
        self.defaults = defaults::merge_defaults(std::mem::take(&mut self.defaults), supplied);
        self
    }

    /// Defaults set so far; empty until `set_defaults` is first called
    pub fn defaults(&self) -> &BTreeMap<String, SettingValue> {
        &self.defaults
    }

    pub fn set_table(&mut self, table: impl Into<String>) -> &mut Self {
        self.table = table.into();
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn set_overrides(&mut self, overrides: impl Into<Overrides>) -> &mut Self {
        self.overrides = overrides.into();
        self
    }

    pub fn overrides(&self) -> &Overrides {
        &self.overrides
    }

    pub fn set_serialized<I, S>(&mut self, keys: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.policies.serialized = key_set(keys);
        self
    }

    pub fn serialized(&self) -> impl Iterator<Item = &str> {
        self.policies.serialized.iter().map(String::as_str)
    }

    pub fn set_encrypted<I, S>(&mut self, keys: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.policies.encrypted = key_set(keys);
        self
    }

    pub fn encrypted(&self) -> impl Iterator<Item = &str> {
        self.policies.encrypted.iter().map(String::as_str)
    }

    pub fn set_new_lines<I, S>(&mut self, keys: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.policies.new_lines = key_set(keys);
        self
    }

    pub fn new_lines(&self) -> impl Iterator<Item = &str> {
        self.policies.new_lines.iter().map(String::as_str)
    }

    /// Keys whose `"custom"` value may be replaced by a `<key>_custom` sibling
    pub fn set_custom_options<I, S>(&mut self, keys: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.policies.custom_options = key_set(keys);
        self
    }

    pub fn custom_options(&self) -> impl Iterator<Item = &str> {
        self.policies.custom_options.iter().map(String::as_str)
    }

    pub fn policies(&self) -> &KeyPolicies {
        &self.policies
    }

    pub fn set_encrypt(&mut self, provider: Arc<dyn EncryptionProvider>) -> &mut Self {
        self.encrypt = Some(provider);
        self
    }

    pub fn encrypt(&self) -> Option<&Arc<dyn EncryptionProvider>> {
        self.encrypt.as_ref()
    }

    pub fn language(&self) -> &dyn LanguageProvider {
        self.language.as_ref()
    }

    pub fn validator(&self) -> &V {
        &self.validator
    }

    /// Run the domain validator, rendering failures through the language provider
    pub fn validate(
        &self,
        data: &SettingsUpdate,
        extra: &BTreeMap<String, String>,
    ) -> SettingsResult<()> {
        self.validator.validate(data, extra).map_err(|errors| {
            SettingsError::Validation(ValidationReport::localize(&errors, self.language()))
        })
    }

    /// The cached settings, if `resolve` has run
    pub fn cached(&self) -> Option<&ResolvedSettings> {
        self.cache.as_ref()
    }

    /// Resolve every setting, loading from the backend on first use or when
    /// `force_reload` is set.
    pub async fn resolve(&mut self, force_reload: bool) -> SettingsResult<&ResolvedSettings> {
        if force_reload || self.cache.is_none() {
            let loaded = self.load().await?;
            self.cache = Some(loaded);
        } else {
            debug!("Using cached settings for table: {}", self.table);
        }

        Ok(&*self.cache.get_or_insert_with(ResolvedSettings::default))
    }

    async fn load(&self) -> SettingsResult<ResolvedSettings> {
        let rows = self.backend.select_all(&self.table).await?;
        debug!("Loaded {} setting rows from {}", rows.len(), self.table);

        let mut settings = ResolvedSettings::default();
        for row in &rows {
            if let Some(value) = self.decode_row(row)? {
                settings.insert(row.setting_key.clone(), value);
            }
        }

        for (key, default) in self.merged_defaults() {
            if !defaults::is_override_excluded(&key) {
                if let Some(forced) = self.overrides.get(&key) {
                    settings.insert(key, forced.clone());
                    continue;
                }
            }

            if !settings.contains_key(&key) {
                settings.insert(key, default);
            }
        }

        // Generated identifiers live in the cache only and are not written back
        for key in [API_KEY, API_SECRET] {
            let missing = settings.get(key).map_or(true, SettingValue::is_empty);
            if missing {
                let identifier = self.require_encrypt(key)?.generate_identifier();
                debug!("Generated identifier for empty {}", key);
                settings.insert(key.to_string(), SettingValue::Text(identifier));
            }
        }

        Ok(settings)
    }

    /// Decode one stored row. `None` means "treat as absent" so the default applies.
    fn decode_row(&self, row: &SettingRow) -> SettingsResult<Option<SettingValue>> {
        let key = row.setting_key.as_str();
        let raw = row.value();

        if raw.is_empty() {
            return Ok(self
                .policies
                .is_new_line(key)
                .then(|| SettingValue::List(Vec::new())));
        }

        let mut text = raw.to_string();
        if self.policies.is_encrypted(key) {
            text = self.require_encrypt(key)?.decode(&text)?;
        }

        let mut value = SettingValue::Text(text);

        if self.policies.is_serialized(key) || row.serialized {
            if let SettingValue::Text(blob) = &value {
                if !blob.is_empty() {
                    value = codec::deserialize(blob).unwrap_or_else(|e| {
                        warn!("Discarding malformed serialized value for {}: {}", key, e);
                        SettingValue::List(Vec::new())
                    });
                }
            }
        }

        if self.policies.is_new_line(key) {
            if let SettingValue::Text(text) = &value {
                value = SettingValue::List(codec::split_lines(text));
            }
        }

        Ok(Some(value))
    }

    /// Write each entry of `data`, encoding per key policy.
    ///
    /// Unknown keys are skipped and reported in the summary. Keys are written
    /// one at a time; a backend failure leaves earlier keys written.
    pub async fn update(&self, mut data: SettingsUpdate) -> SettingsResult<UpdateSummary> {
        data.apply_custom_options(&self.policies.custom_options);

        let mut summary = UpdateSummary::default();
        for (key, value) in data.storage_entries() {
            let encoded = self.encode_value(&key, value)?;

            if self.update_setting(&key, encoded).await? {
                summary.written.push(key);
            } else {
                summary.skipped.push(key);
            }
        }

        info!(
            "Updated {} settings in {} ({} skipped)",
            summary.written.len(),
            self.table,
            summary.skipped.len()
        );
        Ok(summary)
    }

    fn encode_value(&self, key: &str, value: SettingValue) -> SettingsResult<SettingValue> {
        let mut value = value;

        if self.policies.is_serialized(key) {
            let blob = codec::serialize(&value).map_err(|source| SettingsError::Serialize {
                key: key.to_string(),
                source,
            })?;
            value = SettingValue::Text(blob);
        }

        if self.policies.is_encrypted(key) && !value.is_empty() {
            let plaintext = match &value {
                SettingValue::Text(text) => text.clone(),
                other => codec::serialize(other).map_err(|source| SettingsError::Serialize {
                    key: key.to_string(),
                    source,
                })?,
            };
            value = SettingValue::Text(self.require_encrypt(key)?.encode(&plaintext)?);
        }

        Ok(value)
    }

    /// Write a single already-encoded value.
    ///
    /// Returns `false` without writing when `key` is not a known default.
    /// Collections are serialized here. The row's serialized flag is rewritten
    /// on every write so it always describes the value just stored.
    pub async fn update_setting(
        &self,
        key: &str,
        value: impl Into<SettingValue>,
    ) -> SettingsResult<bool> {
        if !self.ensure_row_exists(key).await? {
            debug!("Skipping unknown setting: {}", key);
            return Ok(false);
        }

        let (stored, serialized) = match value.into() {
            SettingValue::Text(text) => (text, self.policies.is_serialized(key)),
            collection => {
                let blob =
                    codec::serialize(&collection).map_err(|source| SettingsError::Serialize {
                        key: key.to_string(),
                        source,
                    })?;
                (blob, true)
            }
        };

        let fields = Fields::new()
            .with(Column::SettingValue, Some(stored))
            .with(
                Column::Serialized,
                Some(if serialized { "1" } else { "0" }.to_string()),
            );

        let changed = self
            .backend
            .update(&self.table, &fields, &Filter::key(key))
            .await?;
        debug!("Wrote setting {} ({} rows)", key, changed);

        Ok(changed > 0)
    }

    /// Whether `key` is a known default. Inserts an empty row for a known key
    /// that has none yet.
    pub async fn ensure_row_exists(&self, key: &str) -> SettingsResult<bool> {
        if !self.is_known_key(key) {
            return Ok(false);
        }

        if self.get_setting(key).await?.is_none() {
            self.add_setting(key).await?;
        }

        Ok(true)
    }

    /// Insert an empty row for `key`
    pub async fn add_setting(&self, key: &str) -> SettingsResult<()> {
        let mut fields = Fields::new().with(Column::SettingKey, Some(key.to_string()));
        if self.policies.is_serialized(key) {
            fields.set(Column::Serialized, Some("1".to_string()));
        }

        self.backend.insert(&self.table, &fields).await?;
        debug!("Added setting row: {}", key);
        Ok(())
    }

    pub async fn get_setting(&self, key: &str) -> SettingsResult<Option<SettingRow>> {
        Ok(self
            .backend
            .select_one(&self.table, &Filter::key(key))
            .await?)
    }

    fn is_known_key(&self, key: &str) -> bool {
        self.defaults.contains_key(key) || defaults::global_defaults().contains_key(key)
    }

    /// Explicit defaults layered over the global baseline
    fn merged_defaults(&self) -> BTreeMap<String, SettingValue> {
        defaults::merge_defaults(self.defaults.clone(), std::iter::empty())
    }

    fn require_encrypt(&self, key: &str) -> SettingsResult<&Arc<dyn EncryptionProvider>> {
        self.encrypt
            .as_ref()
            .ok_or_else(|| SettingsError::MissingEncryptionProvider {
                key: key.to_string(),
            })
    }
}
