//! External collaborators for CARVFi
//!
//! This crate defines the seams to everything outside the client core: the
//! wallet extension, the chain RPC used for balances, and the chat
//! assistant. Each comes with a simulated implementation for tests and
//! offline use.

mod assistant;
mod balance;
mod error;
mod wallet;

pub use assistant::*;
pub use balance::*;
pub use error::*;
pub use wallet::*;
