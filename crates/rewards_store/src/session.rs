//! Session pointer: which wallet is logged in on this device.

use tracing::debug;

use crate::users::address_key;
use crate::{RewardsStore, StoreResult};

impl RewardsStore {
    /// Points the session at `wallet_address`.
    pub fn set_current(&self, wallet_address: &str) -> StoreResult<()> {
        let key = address_key(wallet_address)?;
        self.set_json(&self.keys.current_user, &key)
    }

    /// Returns the session wallet address, if any.
    pub fn current(&self) -> StoreResult<Option<String>> {
        self.get_json(&self.keys.current_user)
    }

    /// Clears the session pointer.
    ///
    /// The user record and activity history stay in place, so the same
    /// wallet finds its history again on the next connect.
    pub fn clear_current(&self) -> StoreResult<()> {
        debug!("Clearing session pointer");
        self.kv.remove(&self.keys.current_user)
    }
}
