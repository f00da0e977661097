//! Activity log: a capped, most-recent-first history per wallet.

use std::collections::BTreeMap;

use entities::{ActivityEntry, NewActivity};
use tracing::debug;

use crate::users::address_key;
use crate::{RewardsStore, StoreResult};

/// Entries kept per wallet. Older entries are discarded, not archived.
pub const MAX_ACTIVITIES_PER_WALLET: usize = 50;

impl RewardsStore {
    /// Records an activity for `wallet_address`.
    ///
    /// The entry is placed at the front of the log and gets an id and
    /// timestamp if it has none. The log is then cut back to
    /// [`MAX_ACTIVITIES_PER_WALLET`] entries.
    pub fn save_activity(&self, wallet_address: &str, activity: NewActivity) -> StoreResult<ActivityEntry> {
        let key = address_key(wallet_address)?;
        let entry = activity.into_entry(self.clock.now());

        let mut logs: BTreeMap<String, Vec<ActivityEntry>> = self.read_map(&self.keys.activities)?;
        let log = logs.entry(key.clone()).or_default();
        log.insert(0, entry.clone());

        if log.len() > MAX_ACTIVITIES_PER_WALLET {
            let dropped = log.len() - MAX_ACTIVITIES_PER_WALLET;
            log.truncate(MAX_ACTIVITIES_PER_WALLET);
            debug!(wallet = %key, dropped, "Evicted old activity entries");
        }

        self.set_json(&self.keys.activities, &logs)?;
        debug!(
            wallet = %key,
            activity_type = %entry.activity_type,
            points = entry.points,
            "Recorded activity"
        );
        Ok(entry)
    }

    /// Returns the log for `wallet_address`, most recent first.
    pub fn get_activities(&self, wallet_address: &str) -> StoreResult<Vec<ActivityEntry>> {
        let key = address_key(wallet_address)?;
        let mut logs: BTreeMap<String, Vec<ActivityEntry>> = self.read_map(&self.keys.activities)?;
        Ok(logs.remove(&key).unwrap_or_default())
    }
}
