// ABOUTME: Per-key storage policies
// ABOUTME: Which keys are serialized, encrypted, newline-split or carry a custom option

use std::collections::BTreeSet;

/// Storage policies keyed by setting name.
///
/// Reads run decrypt, then deserialize, then newline-split; each stage sees the
/// previous stage's output. Writes run serialize, then encrypt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyPolicies {
    pub serialized: BTreeSet<String>,
    pub encrypted: BTreeSet<String>,
    pub new_lines: BTreeSet<String>,
    pub custom_options: BTreeSet<String>,
}

impl KeyPolicies {
    pub fn is_serialized(&self, key: &str) -> bool {
        self.serialized.contains(key)
    }

    pub fn is_encrypted(&self, key: &str) -> bool {
        self.encrypted.contains(key)
    }

    pub fn is_new_line(&self, key: &str) -> bool {
        self.new_lines.contains(key)
    }

    pub fn is_custom_option(&self, key: &str) -> bool {
        self.custom_options.contains(key)
    }
}

pub(crate) fn key_set<I, S>(keys: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    keys.into_iter().map(Into::into).collect()
}
