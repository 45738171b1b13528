//! Ledger configuration and the per-room state machine.

use serde::{Deserialize, Serialize};

use hotel_protocol::Principal;

// ---------------------------------------------------------------------------
// LedgerConfig
// ---------------------------------------------------------------------------

/// Configuration for a ledger instance.
///
/// Missing fields fall back to [`LedgerConfig::default`] when deserialized,
/// so a scenario file can override just the room count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Number of rooms the hotel opens with. Rooms are numbered
    /// `0..initial_room_count`.
    pub initial_room_count: u64,

    /// Capacity of the ledger actor's command queue. Submitters wait when
    /// it is full.
    pub channel_size: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            initial_room_count: 50,
            channel_size: 64,
        }
    }
}

// ---------------------------------------------------------------------------
// RoomState
// ---------------------------------------------------------------------------

/// The state of a single room.
///
/// ```text
///          occupy(caller)
///   Free ──────────────────→ Occupied(caller)
///     ↑                            │
///     └── free / forceFree / ──────┘
///         forceFreeAll
/// ```
///
/// There is no intermediate "reserved" state: a room is either free or
/// held by exactly one principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomState {
    Free,
    Occupied(Principal),
}

impl From<Option<Principal>> for RoomState {
    fn from(occupant: Option<Principal>) -> Self {
        occupant.map_or(Self::Free, Self::Occupied)
    }
}

impl std::fmt::Display for RoomState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Free => write!(f, "Free"),
            Self::Occupied(who) => write!(f, "Occupied({who})"),
        }
    }
}
