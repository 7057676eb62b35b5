// ABOUTME: Settings store with defaults, overrides and per-key storage policies
// ABOUTME: Resolves a flat key/value set from a backend and writes updates back

pub mod codec;
pub mod defaults;
pub mod error;
pub mod language;
pub mod overrides;
pub mod policy;
pub mod store;
pub mod types;
pub mod update;
pub mod validation;


pub use defaults::{global_defaults, OVERRIDE_EXCLUSIONS};
pub use error::{SettingsError, SettingsResult};
pub use language::{LanguageProvider, StaticLanguage};
pub use overrides::Overrides;
pub use policy::KeyPolicies;
pub use store::SettingsStore;
pub use types::{ResolvedSettings, SettingValue};
pub use update::{SettingsUpdate, UpdateSummary};
pub use validation::{
    FieldError, LocalizedError, NoopValidator, RuleValidator, SettingRule, SettingsValidator,
    ValidationError, ValidationErrors, ValidationReport,
};
