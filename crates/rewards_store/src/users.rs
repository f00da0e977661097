//! User repository: create, merge and look up user records.

use std::collections::BTreeMap;

use entities::{normalize_address, UserProfile, UserRecord};
use tracing::{debug, info};

use crate::{RewardsStore, StoreError, StoreResult};

/// Normalizes `address`, rejecting blanks.
pub(crate) fn address_key(address: &str) -> StoreResult<String> {
    let key = normalize_address(address);
    if key.is_empty() {
        return Err(StoreError::InvalidAddress(address.to_string()));
    }
    Ok(key)
}

impl RewardsStore {
    pub(crate) fn read_users(&self) -> StoreResult<BTreeMap<String, UserRecord>> {
        self.read_map(&self.keys.users)
    }

    pub(crate) fn write_users(&self, users: &BTreeMap<String, UserRecord>) -> StoreResult<()> {
        self.set_json(&self.keys.users, users)
    }

    /// Creates or merges the record for `wallet_address` and makes it the
    /// session user.
    ///
    /// An existing record keeps every field `profile` leaves unset and gets a
    /// fresh `last_updated`. A new record starts with 0 points, streak 1,
    /// level 1 and one login.
    pub fn save_user(&self, wallet_address: &str, profile: &UserProfile) -> StoreResult<UserRecord> {
        let key = address_key(wallet_address)?;
        let now = self.clock.now();
        let mut users = self.read_users()?;

        let record = match users.get_mut(&key) {
            Some(existing) => {
                existing.apply(profile);
                existing.last_updated = now;
                debug!(wallet = %key, "Updated user record");
                existing.clone()
            }
            None => {
                let mut record = UserRecord::new(&key, now);
                record.apply(profile);
                users.insert(key.clone(), record.clone());
                info!(wallet = %key, "Created user record");
                record
            }
        };

        self.write_users(&users)?;
        self.set_current(&key)?;
        Ok(record)
    }

    /// Gets the record for `wallet_address`, if any.
    pub fn get_user(&self, wallet_address: &str) -> StoreResult<Option<UserRecord>> {
        let key = address_key(wallet_address)?;
        let mut users = self.read_users()?;
        Ok(users.remove(&key))
    }

    /// Gets the record the session pointer refers to.
    ///
    /// Returns `None` when no pointer is set or when it points at a record
    /// that no longer exists.
    pub fn get_current_user(&self) -> StoreResult<Option<UserRecord>> {
        let Some(address) = self.current()? else {
            return Ok(None);
        };

        let user = self.get_user(&address)?;
        if user.is_none() {
            debug!(wallet = %address, "Session pointer refers to a missing user");
        }
        Ok(user)
    }

    /// Deletes the record for `wallet_address`, returning it if it existed.
    ///
    /// Clears the session pointer when it refers to this wallet. The
    /// activity log is left alone.
    pub fn remove_user(&self, wallet_address: &str) -> StoreResult<Option<UserRecord>> {
        let key = address_key(wallet_address)?;
        let mut users = self.read_users()?;
        let removed = users.remove(&key);

        if removed.is_some() {
            self.write_users(&users)?;
            info!(wallet = %key, "Removed user record");
        }
        if self.current()?.as_deref() == Some(key.as_str()) {
            self.clear_current()?;
        }
        Ok(removed)
    }

    /// Lists every stored user, oldest first.
    pub fn list_users(&self) -> StoreResult<Vec<UserRecord>> {
        let mut users: Vec<UserRecord> = self.read_users()?.into_values().collect();
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(users)
    }
}
