//! The rewards store facade.
//!
//! [`RewardsStore`] owns the injected key-value backend, clock and streak
//! policy. Its operations are split by concern across the `users`,
//! `activity`, `accountant` and `session` modules.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};

use crate::{Clock, KeyValueStore, StorageKeys, StoreResult, StreakPolicy, SystemClock};

/// Store construction options.
#[derive(Debug, Clone, Default)]
pub struct StoreConfig {
    /// Key layout.
    pub keys: StorageKeys,
    /// How multi-day gaps affect the login streak.
    pub streak_policy: StreakPolicy,
}

impl StoreConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses keys built from `prefix`.
    pub fn with_key_prefix(mut self, prefix: &str) -> Self {
        self.keys = StorageKeys::with_prefix(prefix);
        self
    }

    /// Sets the streak policy.
    pub fn with_streak_policy(mut self, policy: StreakPolicy) -> Self {
        self.streak_policy = policy;
        self
    }
}

/// Users, activity history, streak accounting and the session pointer, all
/// persisted through a [`KeyValueStore`].
#[derive(Clone)]
pub struct RewardsStore {
    pub(crate) kv: Arc<dyn KeyValueStore>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) keys: StorageKeys,
    pub(crate) streak_policy: StreakPolicy,
}

impl std::fmt::Debug for RewardsStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RewardsStore")
            .field("keys", &self.keys)
            .field("streak_policy", &self.streak_policy)
            .finish_non_exhaustive()
    }
}

impl RewardsStore {
    /// Creates a store over `kv` using the system clock and default options.
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self::with_config(kv, Arc::new(SystemClock), StoreConfig::default())
    }

    /// Creates a store with an explicit clock and configuration.
    pub fn with_config(kv: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>, config: StoreConfig) -> Self {
        Self {
            kv,
            clock,
            keys: config.keys,
            streak_policy: config.streak_policy,
        }
    }

    /// Returns the active streak policy.
    pub fn streak_policy(&self) -> StreakPolicy {
        self.streak_policy
    }

    /// Returns the key layout.
    pub fn keys(&self) -> &StorageKeys {
        &self.keys
    }

    /// Returns the store's clock.
    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub(crate) fn get_json<T: DeserializeOwned>(&self, key: &str) -> StoreResult<Option<T>> {
        match self.kv.get(key)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    pub(crate) fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> StoreResult<()> {
        let raw = serde_json::to_string(value)?;
        self.kv.set(key, &raw)
    }

    /// Reads an address-keyed aggregate map, empty if the key is unset.
    pub(crate) fn read_map<T: DeserializeOwned>(&self, key: &str) -> StoreResult<BTreeMap<String, T>> {
        Ok(self.get_json(key)?.unwrap_or_default())
    }
}
