//! Activity log entity definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of a logged activity.
///
/// Unknown tags written by other clients are kept verbatim in [`Other`].
///
/// [`Other`]: ActivityType::Other
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActivityType {
    /// Daily login.
    Login,
    /// Profile form completed for the first time.
    Registration,
    /// Message exchanged with the assistant.
    AiChat,
    /// Profile edited after registration.
    ProfileUpdate,
    /// Any other action tag.
    Other(String),
}

impl ActivityType {
    /// Converts the type to its stored tag.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Login => "login",
            Self::Registration => "registration",
            Self::AiChat => "ai_chat",
            Self::ProfileUpdate => "profile_update",
            Self::Other(tag) => tag,
        }
    }

    /// Parses a stored tag.
    pub fn parse(s: &str) -> Self {
        match s {
            "login" => Self::Login,
            "registration" => Self::Registration,
            "ai_chat" => Self::AiChat,
            "profile_update" => Self::ProfileUpdate,
            other => Self::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for ActivityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl From<String> for ActivityType {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<ActivityType> for String {
    fn from(t: ActivityType) -> Self {
        t.as_str().to_string()
    }
}

/// A recorded, timestamped activity attributed to one wallet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    /// Time-based unique token.
    pub id: String,
    /// Activity kind.
    #[serde(rename = "type")]
    pub activity_type: ActivityType,
    /// Human-readable description.
    pub description: String,
    /// Points awarded for this entry (may be zero).
    #[serde(default)]
    pub points: i64,
    /// When the activity happened.
    pub timestamp: DateTime<Utc>,
}

impl ActivityEntry {
    /// Generates a time-ordered identifier for an entry created at `now`.
    ///
    /// The millisecond prefix keeps ids sortable; the random suffix keeps
    /// two entries created within the same millisecond distinct.
    pub fn generate_id(now: DateTime<Utc>) -> String {
        let suffix = Uuid::new_v4().simple().to_string();
        format!("{}-{}", now.timestamp_millis(), &suffix[..8])
    }
}

/// An activity as submitted by a caller, before id and timestamp are assigned.
#[derive(Debug, Clone, PartialEq)]
pub struct NewActivity {
    pub activity_type: ActivityType,
    pub description: String,
    pub points: i64,
    /// Caller-supplied id, kept if present.
    pub id: Option<String>,
    /// Caller-supplied timestamp, kept if present.
    pub timestamp: Option<DateTime<Utc>>,
}

impl NewActivity {
    /// Creates a new activity.
    pub fn new(activity_type: ActivityType, description: impl Into<String>, points: i64) -> Self {
        Self {
            activity_type,
            description: description.into(),
            points,
            id: None,
            timestamp: None,
        }
    }

    /// Sets an explicit id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets an explicit timestamp.
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Turns this into a stored entry, filling in id and timestamp from `now`.
    pub fn into_entry(self, now: DateTime<Utc>) -> ActivityEntry {
        ActivityEntry {
            id: self.id.unwrap_or_else(|| ActivityEntry::generate_id(now)),
            activity_type: self.activity_type,
            description: self.description,
            points: self.points,
            timestamp: self.timestamp.unwrap_or(now),
        }
    }
}
