//! Core entity definitions for CARVFi.
//!
//! This crate defines the data types shared by the rewards store and the
//! client: user records and profile patches, activity log entries, reward
//! catalog entries, and the profile form with its validation rules.

mod activity;
mod profile;
mod reward;
mod user;

pub use activity::*;
pub use profile::*;
pub use reward::*;
pub use user::*;
