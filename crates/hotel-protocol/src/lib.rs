//! Wire protocol for Honest Hotel.
//!
//! This crate defines the vocabulary shared by the ledger and whatever
//! submits transactions to it:
//!
//! - **Identities** ([`Principal`], [`RoomId`]): who is acting, on what.
//! - **Notifications** ([`Notification`]): what the ledger emits on success.
//! - **Transactions** ([`Call`], [`Transaction`], [`Receipt`], [`Output`]):
//!   the operation surface and its outcomes.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those values become
//!   bytes.
//!
//! ```text
//! Submitter (bytes) → Protocol (Transaction) → Ledger (state transition)
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    Call, Notification, Output, Principal, Receipt, RoomId, Transaction,
};
