//! Local user, points and activity storage for CARVFi
//!
//! This crate models users, reward points, daily-login streaks, activity
//! history and the current session entirely on top of a pluggable key-value
//! store. Production uses a JSON file; tests use the in-memory backend.

mod accountant;
mod activity;
mod catalog;
mod clock;
mod error;
mod file;
mod keys;
mod kv;
mod session;
mod store;
mod users;

pub use accountant::*;
pub use activity::*;
pub use catalog::*;
pub use clock::*;
pub use error::*;
pub use file::*;
pub use keys::*;
pub use kv::*;
pub use store::*;
