//! Room-occupancy ledger for Honest Hotel.
//!
//! Tracks, for a growable pool of numbered rooms, which principal holds
//! each room and how many rooms each principal holds. A single owner may
//! grow the pool, force rooms free, and hand over ownership.
//!
//! # Key types
//!
//! - [`RoomLedger`]: the state machine and all its operations
//! - [`OwnerGuard`]: the owner check every restricted operation runs first
//! - [`NotificationSink`]: where operations write their notifications
//! - [`LedgerHandle`]: submit transactions to a ledger running as an actor
//! - [`LedgerConfig`]: initial room count and queue size

mod actor;
mod config;
mod error;
mod guard;
mod ledger;
mod sink;

pub use actor::{spawn_ledger, Execution, LedgerHandle};
pub use config::{LedgerConfig, RoomState};
pub use error::{BatchAction, LedgerError};
pub use guard::OwnerGuard;
pub use ledger::{LedgerSnapshot, RoomLedger};
pub use sink::{NotificationSender, NotificationSink};
