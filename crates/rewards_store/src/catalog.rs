//! Reward catalog with per-wallet status.

use entities::{Reward, RewardStatus};

use crate::{RewardsStore, StoreResult};

/// Points shown for the one-time welcome reward.
pub const WELCOME_POINTS: i64 = 50;

impl RewardsStore {
    /// Returns the reward catalog as seen by `wallet_address`.
    ///
    /// The welcome reward is claimed once the wallet has a record. The
    /// social and community rewards are not earnable from the client yet
    /// and keep their catalog status.
    pub fn get_rewards(&self, wallet_address: &str) -> StoreResult<Vec<Reward>> {
        let welcome = match self.get_user(wallet_address)? {
            Some(_) => RewardStatus::Claimed,
            None => RewardStatus::Available,
        };

        Ok(vec![
            Reward::new(1, "Welcome Points", WELCOME_POINTS, welcome),
            Reward::new(2, "Social Interaction", 25, RewardStatus::Available),
            Reward::new(3, "Community Contribution", 75, RewardStatus::Pending),
        ])
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use entities::UserProfile;

    use crate::MemoryKeyValueStore;

    use super::*;

    #[test]
    fn test_welcome_claimed_after_registration() {
        let store = RewardsStore::new(Arc::new(MemoryKeyValueStore::new()));

        let before = store.get_rewards("0xaaa").unwrap();
        assert_eq!(before.len(), 3);
        assert_eq!(before[0].status, RewardStatus::Available);

        store.save_user("0xAAA", &UserProfile::new()).unwrap();

        let after = store.get_rewards("0xaaa").unwrap();
        assert_eq!(after[0].name, "Welcome Points");
        assert_eq!(after[0].status, RewardStatus::Claimed);
        assert_eq!(after[1].status, RewardStatus::Available);
        assert_eq!(after[2].status, RewardStatus::Pending);
    }
}
