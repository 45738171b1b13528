//! The room ledger: who holds which room, and how many rooms each holds.
//!
//! Every mutating operation is all-or-nothing. It first validates the
//! whole batch against the current state (and against the ids earlier in
//! the same batch), and only then applies the changes and writes
//! notifications. A rejected call returns before the first mutation.

use std::collections::{HashMap, HashSet};

use hotel_protocol::{Call, Notification, Output, Principal, RoomId, Transaction};
use serde::Serialize;

use crate::{
    BatchAction, LedgerConfig, LedgerError, NotificationSink, OwnerGuard,
    RoomState,
};

/// Who holds a room, and when they took it.
#[derive(Debug, Clone, Copy)]
struct Holding {
    occupant: Principal,
    /// Ledger-wide sequence number of the occupy that set this holding.
    seq: u64,
}

/// An occupant currently holding at least one room.
#[derive(Debug, Clone, Copy)]
struct OccupantEntry {
    held: u64,
    /// Sequence number of the occupy that took this occupant from zero
    /// rooms to one. Orders the occupant registry.
    since: u64,
}

/// A point-in-time copy of the ledger's observable state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerSnapshot {
    pub room_count: u64,
    pub owner: Principal,
    /// Occupied rooms in ascending id order.
    pub occupied: Vec<(RoomId, Principal)>,
}

/// The room-occupancy ledger.
///
/// Two maps are kept in sync: `rooms` answers "who holds room r" and
/// `occupants` answers "how many rooms does a hold". An occupant with zero
/// rooms has no entry, so the registry only lists current guests.
#[derive(Debug, Clone)]
pub struct RoomLedger {
    room_count: u64,
    rooms: HashMap<RoomId, Holding>,
    occupants: HashMap<Principal, OccupantEntry>,
    guard: OwnerGuard,
    next_seq: u64,
}

impl RoomLedger {
    /// Creates a ledger with rooms `0..room_count`, all free, owned by
    /// `owner`.
    pub fn new(room_count: u64, owner: Principal) -> Self {
        Self {
            room_count,
            rooms: HashMap::new(),
            occupants: HashMap::new(),
            guard: OwnerGuard::new(owner),
            next_seq: 0,
        }
    }

    /// Creates a ledger sized by `config`.
    pub fn from_config(config: &LedgerConfig, owner: Principal) -> Self {
        Self::new(config.initial_room_count, owner)
    }

    // -----------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------

    /// Takes every room in `rooms` for `caller`.
    ///
    /// # Errors
    /// - [`LedgerError::TooManyRooms`] if the batch is longer than the
    ///   room count
    /// - [`LedgerError::OutOfRange`] for the first id past the pool
    /// - [`LedgerError::AlreadyOccupied`] for the first id already held,
    ///   including one listed twice
    pub fn occupy_rooms(
        &mut self,
        caller: Principal,
        rooms: &[RoomId],
        sink: &mut impl NotificationSink,
    ) -> Result<(), LedgerError> {
        self.check_batch_size(rooms, BatchAction::Reserve)?;

        let mut claimed = HashSet::with_capacity(rooms.len());
        for &room in rooms {
            self.check_in_range(room)?;
            if self.rooms.contains_key(&room) || !claimed.insert(room) {
                return Err(LedgerError::AlreadyOccupied { room });
            }
        }

        for &room in rooms {
            self.assign(room, caller);
            sink.emit(Notification::RoomOccupied {
                room,
                occupant: caller,
            });
        }

        tracing::debug!(
            %caller,
            rooms = rooms.len(),
            held = self.occupied_rooms_nr(caller),
            "rooms occupied"
        );
        Ok(())
    }

    /// Releases every room in `rooms`, all of which `caller` must hold.
    ///
    /// # Errors
    /// - [`LedgerError::TooManyRooms`] if the batch is longer than the
    ///   room count
    /// - [`LedgerError::OutOfRange`] for the first id past the pool
    /// - [`LedgerError::NotYourRoom`] for the first id not held by
    ///   `caller`, including free rooms and ids listed twice
    pub fn free_rooms(
        &mut self,
        caller: Principal,
        rooms: &[RoomId],
        sink: &mut impl NotificationSink,
    ) -> Result<(), LedgerError> {
        self.check_batch_size(rooms, BatchAction::Free)?;

        let mut released = HashSet::with_capacity(rooms.len());
        for &room in rooms {
            self.check_in_range(room)?;
            let held_by_caller = self
                .rooms
                .get(&room)
                .is_some_and(|h| h.occupant == caller);
            if !held_by_caller || !released.insert(room) {
                return Err(LedgerError::NotYourRoom { room });
            }
        }

        for &room in rooms {
            if let Some(occupant) = self.release(room) {
                sink.emit(Notification::RoomFreed {
                    room,
                    occupant,
                    freed_by: caller,
                });
            }
        }

        tracing::debug!(
            %caller,
            rooms = rooms.len(),
            held = self.occupied_rooms_nr(caller),
            "rooms freed"
        );
        Ok(())
    }

    /// Owner only: releases every room in `rooms` from whoever holds it.
    ///
    /// # Errors
    /// - [`LedgerError::Unauthorized`] if `caller` is not the owner
    /// - [`LedgerError::TooManyRooms`], [`LedgerError::OutOfRange`] as for
    ///   [`free_rooms`](Self::free_rooms)
    /// - [`LedgerError::NotOccupied`] for the first id that is free,
    ///   including one listed twice
    pub fn force_free_rooms(
        &mut self,
        caller: Principal,
        rooms: &[RoomId],
        sink: &mut impl NotificationSink,
    ) -> Result<(), LedgerError> {
        self.guard.require_owner(caller)?;
        self.check_batch_size(rooms, BatchAction::Free)?;

        let mut released = HashSet::with_capacity(rooms.len());
        for &room in rooms {
            self.check_in_range(room)?;
            if !self.rooms.contains_key(&room) || !released.insert(room) {
                return Err(LedgerError::NotOccupied { room });
            }
        }

        for &room in rooms {
            if let Some(occupant) = self.release(room) {
                sink.emit(Notification::RoomFreed {
                    room,
                    occupant,
                    freed_by: caller,
                });
            }
        }

        tracing::warn!(owner = %caller, rooms = rooms.len(), "rooms force-freed");
        Ok(())
    }

    /// Owner only: releases every occupied room.
    ///
    /// Rooms are released occupant by occupant, in the order the occupants
    /// arrived, and within one occupant in the order the rooms were taken.
    /// With nothing occupied this succeeds without emitting anything.
    ///
    /// # Errors
    /// [`LedgerError::Unauthorized`] if `caller` is not the owner.
    pub fn force_free_all_rooms(
        &mut self,
        caller: Principal,
        sink: &mut impl NotificationSink,
    ) -> Result<(), LedgerError> {
        self.guard.require_owner(caller)?;

        let order = self.registry_order();
        for &room in &order {
            if let Some(occupant) = self.release(room) {
                sink.emit(Notification::RoomFreed {
                    room,
                    occupant,
                    freed_by: caller,
                });
            }
        }

        if !order.is_empty() {
            tracing::warn!(owner = %caller, rooms = order.len(), "all rooms force-freed");
        }
        Ok(())
    }

    /// Owner only: grows the pool by `by` rooms. Returns the new count.
    ///
    /// # Errors
    /// - [`LedgerError::Unauthorized`] if `caller` is not the owner
    /// - [`LedgerError::RoomCountOverflow`] if the count would pass
    ///   `u64::MAX`
    pub fn increase_room_count_by(
        &mut self,
        caller: Principal,
        by: u64,
    ) -> Result<u64, LedgerError> {
        self.guard.require_owner(caller)?;

        let room_count = self.room_count.checked_add(by).ok_or(
            LedgerError::RoomCountOverflow {
                room_count: self.room_count,
                by,
            },
        )?;
        self.room_count = room_count;

        tracing::info!(by, room_count, "room count increased");
        Ok(room_count)
    }

    /// Owner only: hands owner rights to `new_owner`. Occupancy is not
    /// touched.
    ///
    /// # Errors
    /// [`LedgerError::Unauthorized`] if `caller` is not the owner.
    pub fn change_owner(
        &mut self,
        caller: Principal,
        new_owner: Principal,
    ) -> Result<(), LedgerError> {
        self.guard.require_owner(caller)?;
        let previous = self.guard.transfer(new_owner);
        tracing::info!(%previous, %new_owner, "owner changed");
        Ok(())
    }

    /// Runs one transaction against the ledger.
    ///
    /// This is the single entry point the host uses: it maps each [`Call`]
    /// to the matching operation with the transaction's caller.
    pub fn apply(
        &mut self,
        tx: &Transaction,
        sink: &mut impl NotificationSink,
    ) -> Result<Output, LedgerError> {
        let caller = tx.caller;
        match &tx.call {
            Call::OccupyRooms { rooms } => {
                self.occupy_rooms(caller, rooms, sink).map(|()| Output::None)
            }
            Call::FreeRooms { rooms } => {
                self.free_rooms(caller, rooms, sink).map(|()| Output::None)
            }
            Call::ForceFreeRooms { rooms } => self
                .force_free_rooms(caller, rooms, sink)
                .map(|()| Output::None),
            Call::ForceFreeAllRooms => self
                .force_free_all_rooms(caller, sink)
                .map(|()| Output::None),
            Call::IncreaseRoomCountBy { by } => self
                .increase_room_count_by(caller, *by)
                .map(|_| Output::None),
            Call::ChangeOwner { new_owner } => self
                .change_owner(caller, *new_owner)
                .map(|()| Output::None),
            Call::GetRoomCount => Ok(Output::RoomCount(self.room_count())),
            Call::GetOccupiedRoomsNr => {
                Ok(Output::OccupiedRooms(self.occupied_rooms_nr(caller)))
            }
            Call::GetOwner => Ok(Output::Owner(self.owner())),
        }
    }

    // -----------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------

    /// The current pool size.
    pub fn room_count(&self) -> u64 {
        self.room_count
    }

    /// How many rooms `who` holds right now.
    pub fn occupied_rooms_nr(&self, who: Principal) -> u64 {
        self.occupants.get(&who).map_or(0, |e| e.held)
    }

    /// The current owner.
    pub fn owner(&self) -> Principal {
        self.guard.owner()
    }

    /// Who holds `room`, if anyone. Out-of-range ids are simply free.
    pub fn occupant_of(&self, room: RoomId) -> Option<Principal> {
        self.rooms.get(&room).map(|h| h.occupant)
    }

    /// The state of `room`.
    ///
    /// # Errors
    /// [`LedgerError::OutOfRange`] if `room` is past the pool.
    pub fn room_state(&self, room: RoomId) -> Result<RoomState, LedgerError> {
        self.check_in_range(room)?;
        Ok(RoomState::from(self.occupant_of(room)))
    }

    /// All occupied rooms in ascending id order.
    pub fn occupied_rooms(&self) -> Vec<(RoomId, Principal)> {
        let mut occupied: Vec<_> =
            self.rooms.iter().map(|(room, h)| (*room, h.occupant)).collect();
        occupied.sort_unstable();
        occupied
    }

    /// Everyone holding at least one room, in arrival order.
    pub fn occupants(&self) -> Vec<Principal> {
        let mut occupants: Vec<_> =
            self.occupants.iter().map(|(who, e)| (e.since, *who)).collect();
        occupants.sort_unstable();
        occupants.into_iter().map(|(_, who)| who).collect()
    }

    /// Copies the observable state.
    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            room_count: self.room_count,
            owner: self.owner(),
            occupied: self.occupied_rooms(),
        }
    }

    // -----------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------

    fn check_batch_size(
        &self,
        rooms: &[RoomId],
        action: BatchAction,
    ) -> Result<(), LedgerError> {
        let requested = u64::try_from(rooms.len()).unwrap_or(u64::MAX);
        if requested > self.room_count {
            return Err(LedgerError::TooManyRooms {
                action,
                requested: rooms.len(),
                room_count: self.room_count,
            });
        }
        Ok(())
    }

    fn check_in_range(&self, room: RoomId) -> Result<(), LedgerError> {
        if room.0 >= self.room_count {
            return Err(LedgerError::OutOfRange {
                room,
                room_count: self.room_count,
            });
        }
        Ok(())
    }

    /// Occupied rooms ordered by (occupant arrival, room taken).
    fn registry_order(&self) -> Vec<RoomId> {
        let mut order: Vec<(u64, u64, RoomId)> = self
            .rooms
            .iter()
            .map(|(room, h)| {
                let since =
                    self.occupants.get(&h.occupant).map_or(h.seq, |e| e.since);
                (since, h.seq, *room)
            })
            .collect();
        order.sort_unstable();
        order.into_iter().map(|(_, _, room)| room).collect()
    }

    fn assign(&mut self, room: RoomId, occupant: Principal) {
        let seq = self.next_seq;
        self.next_seq += 1;

        self.rooms.insert(room, Holding { occupant, seq });
        self.occupants
            .entry(occupant)
            .or_insert(OccupantEntry { held: 0, since: seq })
            .held += 1;
    }

    /// Clears `room` and returns who held it.
    fn release(&mut self, room: RoomId) -> Option<Principal> {
        let Holding { occupant, .. } = self.rooms.remove(&room)?;

        if let Some(entry) = self.occupants.get_mut(&occupant) {
            entry.held -= 1;
            if entry.held == 0 {
                self.occupants.remove(&occupant);
            }
        }
        Some(occupant)
    }
}
