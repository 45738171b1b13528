//! Error types for the ledger layer.

use std::fmt;

use hotel_protocol::{Principal, RoomId};

/// Which kind of batch a [`LedgerError::TooManyRooms`] refers to.
///
/// The reason string differs between reserving and freeing, so the error
/// carries the distinction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchAction {
    Reserve,
    Free,
}

impl fmt::Display for BatchAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reserve => write!(f, "reserve"),
            Self::Free => write!(f, "free"),
        }
    }
}

/// Errors that can occur during ledger operations.
///
/// Every variant except [`Unavailable`](Self::Unavailable) is a rejection:
/// the operation was refused before any state changed. The `#[error]`
/// strings are the reasons handed back to submitters, so they are kept
/// word for word.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// An owner-restricted operation was called by someone else.
    #[error("Caller is not owner")]
    Unauthorized { caller: Principal },

    /// A room id is not below the current room count.
    #[error("The room number is out of range")]
    OutOfRange { room: RoomId, room_count: u64 },

    /// The batch lists more rooms than the hotel has.
    #[error("The number of rooms you are trying to {action} is too big")]
    TooManyRooms {
        action: BatchAction,
        requested: usize,
        room_count: u64,
    },

    /// An occupy target is already held, possibly by an earlier id of the
    /// same batch.
    #[error(
        "Your reservation cannot be completed, because a room you want is already occupied"
    )]
    AlreadyOccupied { room: RoomId },

    /// A free target is not held by the caller.
    #[error("You are not allowed to free a room you don't occupy")]
    NotYourRoom { room: RoomId },

    /// A forced-free target is already free.
    #[error("The room cannot be freed, because it is not occupied")]
    NotOccupied { room: RoomId },

    /// Growing the pool would overflow the room counter.
    #[error("The room count cannot grow by that much")]
    RoomCountOverflow { room_count: u64, by: u64 },

    /// The ledger actor's channel is closed.
    #[error("ledger is unavailable")]
    Unavailable,
}

impl LedgerError {
    /// Returns `true` if the ledger refused the operation, as opposed to
    /// the ledger not being reachable at all.
    pub fn is_rejection(&self) -> bool {
        !matches!(self, Self::Unavailable)
    }
}
