//! Core protocol types for Honest Hotel.
//!
//! Everything in this module is plain data: the identities that appear in
//! the ledger, the notification records the ledger emits, and the
//! transaction/receipt shapes that an external submitter sends to the host
//! and gets back. None of it knows how rooms are actually tracked.

use serde::{Deserialize, Serialize};

use std::fmt;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// An opaque identity that submits transactions: a guest, or the owner.
///
/// This is a newtype over `u64` so that a principal can never be confused
/// with a room number at a call site. `#[serde(transparent)]` keeps the wire
/// form a plain number: `Principal(42)` is `42` in JSON.
///
/// There is no reserved "nobody" value. A free room is represented by the
/// absence of an occupant (`Option<Principal>::None`), so every `Principal`
/// is a real identity.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct Principal(pub u64);

/// Displays the principal the way addresses are usually printed: `0x`
/// followed by 40 hex digits, zero-padded.
impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:040x}", self.0)
    }
}

/// A room number. Valid ids are `0..room_count` of the ledger they are
/// used with; the protocol layer itself puts no bound on them.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct RoomId(pub u64);

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Notification: what the ledger emits on success
// ---------------------------------------------------------------------------

/// A record emitted by the ledger after a successful state transition.
///
/// Notifications are only produced by successful operations. Within one
/// batch they appear in the order the room ids were given.
///
/// `#[serde(tag = "event")]` gives internally tagged JSON:
///   `{ "event": "RoomOccupied", "room": 3, "occupant": 7 }`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum Notification {
    /// `occupant` took `room`.
    RoomOccupied { room: RoomId, occupant: Principal },

    /// `room` was released from `occupant`.
    ///
    /// `freed_by` is the occupant itself for a self-free and the owner for
    /// a forced free.
    RoomFreed {
        room: RoomId,
        occupant: Principal,
        freed_by: Principal,
    },
}

impl Notification {
    /// The room this notification is about.
    pub fn room(&self) -> RoomId {
        match self {
            Self::RoomOccupied { room, .. } | Self::RoomFreed { room, .. } => {
                *room
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Call: the operation surface
// ---------------------------------------------------------------------------

/// One ledger operation, as an external submitter names it.
///
/// The caller is not part of the call: it travels beside it in a
/// [`Transaction`], filled in by the host from the submitter's credential.
///
/// JSON shape: `{ "op": "OccupyRooms", "rooms": [1, 3, 5] }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op")]
pub enum Call {
    /// Take every listed room, or none of them.
    OccupyRooms { rooms: Vec<RoomId> },

    /// Release every listed room the caller holds, or none of them.
    FreeRooms { rooms: Vec<RoomId> },

    /// Owner only: release the listed rooms from whoever holds them.
    ForceFreeRooms { rooms: Vec<RoomId> },

    /// Owner only: release every occupied room.
    ForceFreeAllRooms,

    /// Owner only: grow the room pool.
    IncreaseRoomCountBy { by: u64 },

    /// Read the current pool size.
    GetRoomCount,

    /// Read how many rooms the caller holds.
    GetOccupiedRoomsNr,

    /// Read the current owner.
    GetOwner,

    /// Owner only: hand owner rights to `new_owner`.
    ChangeOwner { new_owner: Principal },
}

impl Call {
    /// The operation name, as used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::OccupyRooms { .. } => "occupyRooms",
            Self::FreeRooms { .. } => "freeRooms",
            Self::ForceFreeRooms { .. } => "forceFreeRooms",
            Self::ForceFreeAllRooms => "forceFreeAllRooms",
            Self::IncreaseRoomCountBy { .. } => "increaseRoomCountBy",
            Self::GetRoomCount => "getRoomCount",
            Self::GetOccupiedRoomsNr => "getOccupiedRoomsNr",
            Self::GetOwner => "getOwner",
            Self::ChangeOwner { .. } => "changeOwner",
        }
    }

    /// Returns `true` for the pure reads, which never mutate the ledger
    /// and never emit notifications.
    pub fn is_query(&self) -> bool {
        matches!(
            self,
            Self::GetRoomCount | Self::GetOccupiedRoomsNr | Self::GetOwner
        )
    }
}

/// A call together with the identity that submitted it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub caller: Principal,
    pub call: Call,
}

// ---------------------------------------------------------------------------
// Receipt: what the host hands back
// ---------------------------------------------------------------------------

/// The value a call returns, if any.
///
/// Adjacently tagged because serde cannot put an internal tag next to a
/// bare number: `{ "kind": "RoomCount", "value": 50 }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", content = "value")]
pub enum Output {
    /// Mutations return nothing.
    #[default]
    None,
    RoomCount(u64),
    OccupiedRooms(u64),
    Owner(Principal),
}

/// The outcome of one transaction.
///
/// A rejection is a normal outcome, not a transport failure: the ledger is
/// left exactly as it was and the reason string says why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum Receipt {
    /// The call ran to completion.
    Applied {
        #[serde(default)]
        output: Output,
        #[serde(default)]
        notifications: Vec<Notification>,
    },

    /// The call was refused and changed nothing.
    Rejected { reason: String },
}

impl Receipt {
    /// Returns `true` if the call was applied.
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }

    /// The notifications of an applied call; empty for a rejection.
    pub fn notifications(&self) -> &[Notification] {
        match self {
            Self::Applied { notifications, .. } => notifications,
            Self::Rejected { .. } => &[],
        }
    }

    /// The returned value of an applied call.
    pub fn output(&self) -> Option<Output> {
        match self {
            Self::Applied { output, .. } => Some(*output),
            Self::Rejected { .. } => None,
        }
    }

    /// The rejection reason, if the call was refused.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Applied { .. } => None,
            Self::Rejected { reason } => Some(reason),
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
