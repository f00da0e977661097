//! Points and daily-login streak accounting.
//!
//! Both operations are safe to call repeatedly: a second login on the same
//! calendar day changes nothing, and an unknown wallet is a silent no-op.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::users::address_key;
use crate::{RewardsStore, StoreResult};

/// How the login streak reacts to skipped days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreakPolicy {
    /// Every new calendar day adds one, however many days were skipped.
    #[default]
    Continuous,
    /// A new day adds one only if the previous login was yesterday;
    /// otherwise the streak restarts at 1.
    ResetOnGap,
}

impl StreakPolicy {
    /// Converts the policy to its config string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Continuous => "continuous",
            Self::ResetOnGap => "reset_on_gap",
        }
    }

    /// Parses a policy from its config string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "continuous" => Some(Self::Continuous),
            "reset_on_gap" => Some(Self::ResetOnGap),
            _ => None,
        }
    }
}

impl std::fmt::Display for StreakPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl RewardsStore {
    /// Counts a login for today.
    ///
    /// Returns the new streak, or `0` if a login was already counted today
    /// or the wallet has no record.
    pub fn update_streak(&self, wallet_address: &str) -> StoreResult<u32> {
        let key = address_key(wallet_address)?;
        let mut users = self.read_users()?;
        let Some(user) = users.get_mut(&key) else {
            debug!(wallet = %key, "Streak update for unknown wallet");
            return Ok(0);
        };

        let now = self.clock.now();
        let today = self.clock.calendar_day(now);
        let last_day = user.last_login.map(|at| self.clock.calendar_day(at));

        if last_day == Some(today) {
            return Ok(0);
        }

        let gap_days = last_day.map(|last| (today - last).num_days());
        user.streak = match (self.streak_policy, gap_days) {
            (StreakPolicy::ResetOnGap, Some(gap)) if gap > 1 => 1,
            _ => user.streak.saturating_add(1),
        };
        user.last_login = Some(now);
        user.login_count = user.login_count.saturating_add(1);
        let streak = user.streak;

        self.write_users(&users)?;
        info!(wallet = %key, streak, gap_days = ?gap_days, "Counted daily login");
        Ok(streak)
    }

    /// Adds `delta` points and returns the new total.
    ///
    /// Totals never drop below zero. Returns `0` without writing if the
    /// wallet has no record.
    pub fn update_points(&self, wallet_address: &str, delta: i64) -> StoreResult<u64> {
        let key = address_key(wallet_address)?;
        let mut users = self.read_users()?;
        let Some(user) = users.get_mut(&key) else {
            debug!(wallet = %key, delta, "Points update for unknown wallet");
            return Ok(0);
        };

        user.points = user.points.saturating_add_signed(delta);
        user.last_updated = self.clock.now();
        let points = user.points;

        self.write_users(&users)?;
        debug!(wallet = %key, delta, points, "Updated points");
        Ok(points)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{DateTime, Duration, FixedOffset, Utc};
    use entities::UserProfile;

    use crate::{Clock, KeyValueStore, ManualClock, MemoryKeyValueStore, StoreConfig};

    use super::*;

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn setup(policy: StreakPolicy) -> (RewardsStore, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(at("2024-05-10T09:00:00Z")));
        let store = RewardsStore::with_config(
            Arc::new(MemoryKeyValueStore::new()),
            clock.clone(),
            StoreConfig::new().with_streak_policy(policy),
        );
        store.save_user("0xAAA", &UserProfile::new()).unwrap();
        (store, clock)
    }

    #[test]
    fn test_same_day_is_noop() {
        let (store, clock) = setup(StreakPolicy::Continuous);

        assert_eq!(store.update_streak("0xaaa").unwrap(), 0);
        clock.advance(Duration::hours(10));
        assert_eq!(store.update_streak("0xaaa").unwrap(), 0);

        let user = store.get_user("0xaaa").unwrap().unwrap();
        assert_eq!(user.streak, 1);
        assert_eq!(user.login_count, 1);
    }

    #[test]
    fn test_next_day_increments_once() {
        let (store, clock) = setup(StreakPolicy::Continuous);

        clock.advance(Duration::days(1));
        assert_eq!(store.update_streak("0xaaa").unwrap(), 2);
        assert_eq!(store.update_streak("0xaaa").unwrap(), 0);

        let user = store.get_user("0xaaa").unwrap().unwrap();
        assert_eq!(user.streak, 2);
        assert_eq!(user.login_count, 2);
        assert_eq!(user.last_login, Some(clock.now()));
    }

    #[test]
    fn test_midnight_boundary() {
        let (store, clock) = setup(StreakPolicy::Continuous);

        clock.set(at("2024-05-10T23:59:59Z"));
        assert_eq!(store.update_streak("0xaaa").unwrap(), 0);

        clock.set(at("2024-05-11T00:00:01Z"));
        assert_eq!(store.update_streak("0xaaa").unwrap(), 2);
    }

    #[test]
    fn test_day_is_judged_in_local_offset() {
        // At UTC+14 the calendar day rolls over at 10:00Z
        let clock = Arc::new(ManualClock::with_offset(
            at("2024-05-10T09:00:00Z"),
            FixedOffset::east_opt(14 * 3600).unwrap(),
        ));
        let store = RewardsStore::with_config(
            Arc::new(MemoryKeyValueStore::new()),
            clock.clone(),
            StoreConfig::new(),
        );
        store.save_user("0xaaa", &UserProfile::new()).unwrap();

        clock.set(at("2024-05-10T10:30:00Z"));
        assert_eq!(store.update_streak("0xaaa").unwrap(), 2);
    }

    #[test]
    fn test_continuous_ignores_gaps() {
        let (store, clock) = setup(StreakPolicy::Continuous);

        clock.advance(Duration::days(5));
        assert_eq!(store.update_streak("0xaaa").unwrap(), 2);
    }

    #[test]
    fn test_reset_on_gap() {
        let (store, clock) = setup(StreakPolicy::ResetOnGap);

        clock.advance(Duration::days(1));
        assert_eq!(store.update_streak("0xaaa").unwrap(), 2);
        clock.advance(Duration::days(1));
        assert_eq!(store.update_streak("0xaaa").unwrap(), 3);

        clock.advance(Duration::days(3));
        assert_eq!(store.update_streak("0xaaa").unwrap(), 1);

        let user = store.get_user("0xaaa").unwrap().unwrap();
        assert_eq!(user.login_count, 4);
    }

    #[test]
    fn test_missing_last_login_counts_as_new_day() {
        let (store, _clock) = setup(StreakPolicy::ResetOnGap);
        let mut users = store.read_users().unwrap();
        users.get_mut("0xaaa").unwrap().last_login = None;
        store.write_users(&users).unwrap();

        assert_eq!(store.update_streak("0xaaa").unwrap(), 2);
    }

    #[test]
    fn test_unknown_wallet_is_noop() {
        let kv = Arc::new(MemoryKeyValueStore::new());
        let store = RewardsStore::new(kv.clone());

        assert_eq!(store.update_streak("0xnobody").unwrap(), 0);
        assert_eq!(store.update_points("0xnobody", 10).unwrap(), 0);
        assert!(!kv.contains("carvfi_users").unwrap());
    }

    #[test]
    fn test_points_are_additive() {
        let (store, clock) = setup(StreakPolicy::Continuous);
        let before = store.get_user("0xaaa").unwrap().unwrap();

        clock.advance(Duration::minutes(5));
        store.update_points("0xaaa", 10).unwrap();
        let total = store.update_points("0xAAA", 5).unwrap();

        let after = store.get_user("0xaaa").unwrap().unwrap();
        assert_eq!(total, before.points + 15);
        assert_eq!(after.points, before.points + 15);
        assert_eq!(after.last_updated, clock.now());
    }

    #[test]
    fn test_points_never_negative() {
        let (store, _clock) = setup(StreakPolicy::Continuous);
        store.update_points("0xaaa", 20).unwrap();

        assert_eq!(store.update_points("0xaaa", -50).unwrap(), 0);
    }

    #[test]
    fn test_policy_strings() {
        assert_eq!(StreakPolicy::parse("reset_on_gap"), Some(StreakPolicy::ResetOnGap));
        assert_eq!(StreakPolicy::Continuous.to_string(), "continuous");
        assert_eq!(StreakPolicy::parse("weekly"), None);
    }
}
