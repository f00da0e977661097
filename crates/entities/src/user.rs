//! User-related entity definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Normalizes a wallet address into its storage key form.
///
/// Addresses are compared case-insensitively, so every lookup and write goes
/// through this function first.
pub fn normalize_address(address: &str) -> String {
    address.trim().to_lowercase()
}

/// A user known to this browser profile, keyed by wallet address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    /// Lower-cased wallet address (primary key).
    pub wallet_address: String,
    /// Name of the wallet provider used at registration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet_type: Option<String>,
    /// Display handle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Avatar URL or data URI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discord: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telegram: Option<String>,
    /// Accumulated reward points.
    #[serde(default)]
    pub points: u64,
    /// Consecutive calendar days with at least one login.
    #[serde(default = "default_counter")]
    pub streak: u32,
    /// Display level. Stored as-is, never derived from points.
    #[serde(default = "default_counter")]
    pub level: u32,
    /// Number of distinct calendar days with a login.
    #[serde(default = "default_counter")]
    pub login_count: u32,
    /// Last counted login.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime<Utc>>,
    /// When this record was created.
    pub created_at: DateTime<Utc>,
    /// When this record was last updated.
    pub last_updated: DateTime<Utc>,
}

fn default_counter() -> u32 {
    1
}

impl UserRecord {
    /// Creates a fresh record with the registration defaults.
    pub fn new(wallet_address: &str, now: DateTime<Utc>) -> Self {
        Self {
            wallet_address: normalize_address(wallet_address),
            wallet_type: None,
            username: None,
            first_name: None,
            last_name: None,
            email: None,
            avatar: None,
            bio: None,
            twitter: None,
            discord: None,
            telegram: None,
            points: 0,
            streak: 1,
            level: 1,
            login_count: 1,
            last_login: Some(now),
            created_at: now,
            last_updated: now,
        }
    }

    /// Overwrites every attribute that is set in `profile`.
    pub fn apply(&mut self, profile: &UserProfile) {
        fn merge(slot: &mut Option<String>, value: &Option<String>) {
            if let Some(value) = value {
                *slot = Some(value.clone());
            }
        }

        merge(&mut self.wallet_type, &profile.wallet_type);
        merge(&mut self.username, &profile.username);
        merge(&mut self.first_name, &profile.first_name);
        merge(&mut self.last_name, &profile.last_name);
        merge(&mut self.email, &profile.email);
        merge(&mut self.avatar, &profile.avatar);
        merge(&mut self.bio, &profile.bio);
        merge(&mut self.twitter, &profile.twitter);
        merge(&mut self.discord, &profile.discord);
        merge(&mut self.telegram, &profile.telegram);
        if let Some(level) = profile.level {
            self.level = level;
        }
    }

    /// Returns the best human-readable name for this user.
    pub fn display_name(&self) -> String {
        if let Some(username) = &self.username {
            return username.clone();
        }
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => format!("{} {}", first, last),
            (Some(first), None) => first.clone(),
            (None, Some(last)) => last.clone(),
            (None, None) => short_address(&self.wallet_address),
        }
    }
}

/// Shortens an address to `0x1234...abcd` form for display.
pub fn short_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 10 {
        return address.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

/// A partial update of a [`UserRecord`].
///
/// Fields left as `None` keep whatever the stored record already has.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub wallet_type: Option<String>,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub avatar: Option<String>,
    pub bio: Option<String>,
    pub twitter: Option<String>,
    pub discord: Option<String>,
    pub telegram: Option<String>,
    pub level: Option<u32>,
}

impl UserProfile {
    /// Creates an empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the username.
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Sets the email address.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Sets the wallet provider name.
    pub fn with_wallet_type(mut self, wallet_type: impl Into<String>) -> Self {
        self.wallet_type = Some(wallet_type.into());
        self
    }

    /// Sets the first and last name.
    pub fn with_name(mut self, first: impl Into<String>, last: impl Into<String>) -> Self {
        self.first_name = Some(first.into());
        self.last_name = Some(last.into());
        self
    }
}
