//! Storage key layout.

/// Default prefix for every key the store writes.
pub const DEFAULT_KEY_PREFIX: &str = "carvfi";

/// Names of the keys holding the store's state.
///
/// | key                   | value                                   |
/// |-----------------------|-----------------------------------------|
/// | `<prefix>_users`      | map of lower-cased address to record    |
/// | `<prefix>_activities` | map of lower-cased address to entries   |
/// | `<prefix>_current_user` | lower-cased address of the session user |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    pub users: String,
    pub activities: String,
    pub current_user: String,
}

impl StorageKeys {
    /// Builds the key set for a prefix.
    pub fn with_prefix(prefix: &str) -> Self {
        Self {
            users: format!("{}_users", prefix),
            activities: format!("{}_activities", prefix),
            current_user: format!("{}_current_user", prefix),
        }
    }
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self::with_prefix(DEFAULT_KEY_PREFIX)
    }
}
