//! Reward catalog entries.

use serde::{Deserialize, Serialize};

/// Where a reward stands for one wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardStatus {
    /// Already paid out.
    Claimed,
    /// Can be earned now.
    Available,
    /// Not open yet.
    Pending,
}

impl RewardStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Claimed => "claimed",
            Self::Available => "available",
            Self::Pending => "pending",
        }
    }
}

impl std::fmt::Display for RewardStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// A reward shown on the rewards dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reward {
    pub id: u32,
    pub name: String,
    pub points: i64,
    pub status: RewardStatus,
}

impl Reward {
    pub fn new(id: u32, name: impl Into<String>, points: i64, status: RewardStatus) -> Self {
        Self {
            id,
            name: name.into(),
            points,
            status,
        }
    }
}
