//! Integration tests for the ledger actor, replaying full guest/owner
//! sessions through `LedgerHandle`.

use hotel_ledger::{
    spawn_ledger, LedgerConfig, LedgerError, LedgerHandle, RoomLedger,
};
use hotel_protocol::{Call, Notification, Output, Principal, RoomId, Transaction};
use tokio::sync::mpsc;

// =========================================================================
// Helpers
// =========================================================================

const OWNER: Principal = Principal(1);
const ADDR1: Principal = Principal(2);
const ADDR2: Principal = Principal(3);

fn rooms(raw: &[u64]) -> Vec<RoomId> {
    raw.iter().copied().map(RoomId).collect()
}

fn spawn_default() -> LedgerHandle {
    let config = LedgerConfig::default();
    spawn_ledger(
        RoomLedger::from_config(&config, OWNER),
        config.channel_size,
        None,
    )
}

async fn run(
    ledger: &LedgerHandle,
    caller: Principal,
    call: Call,
) -> Result<Vec<Notification>, LedgerError> {
    ledger
        .execute(Transaction { caller, call })
        .await
        .map(|execution| execution.notifications)
}

async fn held(ledger: &LedgerHandle, caller: Principal) -> u64 {
    let execution = ledger
        .execute(Transaction {
            caller,
            call: Call::GetOccupiedRoomsNr,
        })
        .await
        .unwrap();
    match execution.output {
        Output::OccupiedRooms(n) => n,
        other => panic!("unexpected output {other:?}"),
    }
}

fn occupied(room: u64, occupant: Principal) -> Notification {
    Notification::RoomOccupied {
        room: RoomId(room),
        occupant,
    }
}

fn freed(room: u64, occupant: Principal, freed_by: Principal) -> Notification {
    Notification::RoomFreed {
        room: RoomId(room),
        occupant,
        freed_by,
    }
}

// =========================================================================
// Notification ordering
// =========================================================================

#[tokio::test]
async fn test_full_session_emits_expected_notifications() {
    let ledger = spawn_default();

    let out = run(&ledger, ADDR1, Call::OccupyRooms { rooms: rooms(&[1, 3, 5, 7]) })
        .await
        .unwrap();
    assert_eq!(
        out,
        vec![
            occupied(1, ADDR1),
            occupied(3, ADDR1),
            occupied(5, ADDR1),
            occupied(7, ADDR1)
        ]
    );

    let out = run(&ledger, ADDR2, Call::OccupyRooms { rooms: rooms(&[2, 4]) })
        .await
        .unwrap();
    assert_eq!(out, vec![occupied(2, ADDR2), occupied(4, ADDR2)]);

    let out = run(&ledger, ADDR1, Call::FreeRooms { rooms: rooms(&[1, 3]) })
        .await
        .unwrap();
    assert_eq!(out, vec![freed(1, ADDR1, ADDR1), freed(3, ADDR1, ADDR1)]);

    let out = run(&ledger, OWNER, Call::ForceFreeRooms { rooms: rooms(&[2, 5]) })
        .await
        .unwrap();
    assert_eq!(out, vec![freed(2, ADDR2, OWNER), freed(5, ADDR1, OWNER)]);

    let out = run(&ledger, OWNER, Call::ForceFreeAllRooms).await.unwrap();
    assert_eq!(out, vec![freed(7, ADDR1, OWNER), freed(4, ADDR2, OWNER)]);

    assert_eq!(held(&ledger, ADDR1).await, 0);
    assert_eq!(held(&ledger, ADDR2).await, 0);
}

#[tokio::test]
async fn test_events_channel_sees_only_successful_operations() {
    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let ledger = spawn_ledger(RoomLedger::new(50, OWNER), 8, Some(events_tx));

    run(&ledger, ADDR1, Call::OccupyRooms { rooms: rooms(&[0]) })
        .await
        .unwrap();
    // Rejected: room 0 is taken, so room 1 must not show up either.
    run(&ledger, ADDR2, Call::OccupyRooms { rooms: rooms(&[1, 0]) })
        .await
        .unwrap_err();
    run(&ledger, ADDR1, Call::FreeRooms { rooms: rooms(&[0]) })
        .await
        .unwrap();

    ledger.shutdown().await.unwrap();

    let mut seen = Vec::new();
    while let Some(n) = events_rx.recv().await {
        seen.push(n);
    }
    assert_eq!(seen, vec![occupied(0, ADDR1), freed(0, ADDR1, ADDR1)]);
}

// =========================================================================
// Queries
// =========================================================================

#[tokio::test]
async fn test_get_room_count_returns_initial_count() {
    let ledger = spawn_default();
    let execution = ledger
        .execute(Transaction {
            caller: ADDR1,
            call: Call::GetRoomCount,
        })
        .await
        .unwrap();
    assert_eq!(execution.output, Output::RoomCount(50));
    assert!(execution.notifications.is_empty());
}

#[tokio::test]
async fn test_increase_room_count_by_owner() {
    let ledger = spawn_default();
    run(&ledger, OWNER, Call::IncreaseRoomCountBy { by: 5 })
        .await
        .unwrap();
    assert_eq!(ledger.snapshot().await.unwrap().room_count, 55);
}

#[tokio::test]
async fn test_increase_room_count_by_non_owner_rejected() {
    let ledger = spawn_default();
    let err = run(&ledger, ADDR1, Call::IncreaseRoomCountBy { by: 5 })
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Caller is not owner");
    assert_eq!(ledger.snapshot().await.unwrap().room_count, 50);
}

// =========================================================================
// Occupy / free
// =========================================================================

#[tokio::test]
async fn test_user_frees_some_of_their_rooms() {
    let ledger = spawn_default();
    run(&ledger, ADDR1, Call::OccupyRooms { rooms: rooms(&[0, 1, 2, 3]) })
        .await
        .unwrap();
    run(&ledger, ADDR1, Call::FreeRooms { rooms: rooms(&[1, 2]) })
        .await
        .unwrap();
    assert_eq!(held(&ledger, ADDR1).await, 2);
}

#[tokio::test]
async fn test_freeing_last_room_drops_count_to_zero() {
    let ledger = spawn_default();
    run(&ledger, ADDR1, Call::OccupyRooms { rooms: rooms(&[0, 1, 2]) })
        .await
        .unwrap();

    run(&ledger, ADDR1, Call::FreeRooms { rooms: rooms(&[1, 2]) })
        .await
        .unwrap();
    let after_first = held(&ledger, ADDR1).await;

    run(&ledger, ADDR1, Call::FreeRooms { rooms: rooms(&[0]) })
        .await
        .unwrap();
    let after_second = held(&ledger, ADDR1).await;

    assert_eq!((after_first, after_second), (1, 0));
}

#[tokio::test]
async fn test_occupied_room_cannot_be_taken_by_another_guest() {
    let ledger = spawn_default();
    run(&ledger, ADDR1, Call::OccupyRooms { rooms: rooms(&[0]) })
        .await
        .unwrap();

    let err = run(&ledger, ADDR2, Call::OccupyRooms { rooms: rooms(&[0]) })
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "Your reservation cannot be completed, because a room you want is already occupied"
    );
}

#[tokio::test]
async fn test_occupy_out_of_range_rejected() {
    let ledger = spawn_default();
    let err = run(&ledger, ADDR1, Call::OccupyRooms { rooms: rooms(&[50]) })
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "The room number is out of range");
}

#[tokio::test]
async fn test_occupy_too_many_rooms_rejected() {
    let ledger = spawn_default();
    let all: Vec<_> = (0..51).map(RoomId).collect();
    let err = run(&ledger, ADDR1, Call::OccupyRooms { rooms: all })
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "The number of rooms you are trying to reserve is too big"
    );
}

#[tokio::test]
async fn test_free_room_not_occupied_by_caller_rejected() {
    let ledger = spawn_default();
    run(&ledger, ADDR1, Call::OccupyRooms { rooms: rooms(&[0, 1]) })
        .await
        .unwrap();
    let err = run(&ledger, ADDR1, Call::FreeRooms { rooms: rooms(&[2, 3]) })
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "You are not allowed to free a room you don't occupy"
    );
}

// =========================================================================
// Owner overrides
// =========================================================================

async fn seed_two_guests(ledger: &LedgerHandle) {
    run(ledger, ADDR1, Call::OccupyRooms { rooms: rooms(&[0]) })
        .await
        .unwrap();
    run(ledger, ADDR2, Call::OccupyRooms { rooms: rooms(&[1]) })
        .await
        .unwrap();
    run(ledger, ADDR1, Call::OccupyRooms { rooms: rooms(&[2, 3]) })
        .await
        .unwrap();
}

#[tokio::test]
async fn test_owner_force_frees_rooms() {
    let ledger = spawn_default();
    seed_two_guests(&ledger).await;

    run(&ledger, OWNER, Call::ForceFreeRooms { rooms: rooms(&[0, 1, 2, 3]) })
        .await
        .unwrap();

    assert_eq!(held(&ledger, ADDR1).await, 0);
    assert_eq!(held(&ledger, ADDR2).await, 0);
}

#[tokio::test]
async fn test_force_free_free_room_rejected() {
    let ledger = spawn_default();
    seed_two_guests(&ledger).await;

    let err = run(&ledger, OWNER, Call::ForceFreeRooms { rooms: rooms(&[4]) })
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "The room cannot be freed, because it is not occupied"
    );
}

#[tokio::test]
async fn test_force_free_too_many_rooms_rejected() {
    let ledger = spawn_default();
    let all: Vec<_> = (0..51).map(RoomId).collect();
    let err = run(&ledger, OWNER, Call::ForceFreeRooms { rooms: all })
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "The number of rooms you are trying to free is too big"
    );
}

#[tokio::test]
async fn test_owner_only_operations_reject_guests() {
    let ledger = spawn_default();
    seed_two_guests(&ledger).await;
    let before = ledger.snapshot().await.unwrap();

    for call in [
        Call::ForceFreeRooms { rooms: rooms(&[1]) },
        Call::ForceFreeAllRooms,
        Call::IncreaseRoomCountBy { by: 1 },
        Call::ChangeOwner { new_owner: ADDR1 },
    ] {
        let err = run(&ledger, ADDR1, call).await.unwrap_err();
        assert!(matches!(err, LedgerError::Unauthorized { caller: ADDR1 }));
    }

    assert_eq!(ledger.snapshot().await.unwrap(), before);
}

#[tokio::test]
async fn test_force_free_all_rooms_with_no_guests_succeeds() {
    let ledger = spawn_default();
    let out = run(&ledger, OWNER, Call::ForceFreeAllRooms).await.unwrap();
    assert!(out.is_empty());
}

#[tokio::test]
async fn test_complex_use_case() {
    let ledger = spawn_default();
    run(&ledger, ADDR1, Call::OccupyRooms { rooms: rooms(&[0]) }).await.unwrap();
    run(&ledger, ADDR2, Call::OccupyRooms { rooms: rooms(&[4]) }).await.unwrap();
    run(&ledger, ADDR1, Call::OccupyRooms { rooms: rooms(&[2, 3]) }).await.unwrap();
    run(&ledger, ADDR2, Call::OccupyRooms { rooms: rooms(&[1]) }).await.unwrap();
    assert_eq!(held(&ledger, ADDR1).await, 3);
    assert_eq!(held(&ledger, ADDR2).await, 2);

    run(&ledger, ADDR2, Call::FreeRooms { rooms: rooms(&[1]) }).await.unwrap();
    run(&ledger, ADDR1, Call::FreeRooms { rooms: rooms(&[3, 2]) }).await.unwrap();
    assert_eq!(held(&ledger, ADDR1).await, 1);
    assert_eq!(held(&ledger, ADDR2).await, 1);

    run(&ledger, ADDR2, Call::OccupyRooms { rooms: rooms(&[10, 15, 20]) }).await.unwrap();
    run(&ledger, ADDR1, Call::OccupyRooms { rooms: rooms(&[11, 21, 31]) }).await.unwrap();
    assert_eq!(held(&ledger, ADDR1).await, 4);
    assert_eq!(held(&ledger, ADDR2).await, 4);

    run(&ledger, OWNER, Call::ForceFreeRooms { rooms: rooms(&[10, 21, 20]) })
        .await
        .unwrap();
    assert_eq!(held(&ledger, ADDR1).await, 3);
    assert_eq!(held(&ledger, ADDR2).await, 2);
    // The count is per caller; the ledger-wide figure lives in the snapshot.
    assert_eq!(ledger.snapshot().await.unwrap().occupied.len(), 5);

    run(&ledger, OWNER, Call::ForceFreeAllRooms).await.unwrap();
    assert_eq!(held(&ledger, ADDR1).await, 0);
    assert_eq!(held(&ledger, ADDR2).await, 0);
    assert!(ledger.snapshot().await.unwrap().occupied.is_empty());
}

// =========================================================================
// Ownership
// =========================================================================

#[tokio::test]
async fn test_get_owner_returns_creator() {
    let ledger = spawn_default();
    let execution = ledger
        .execute(Transaction {
            caller: ADDR1,
            call: Call::GetOwner,
        })
        .await
        .unwrap();
    assert_eq!(execution.output, Output::Owner(OWNER));
}

#[tokio::test]
async fn test_change_owner_hands_over_rights() {
    let ledger = spawn_default();
    run(&ledger, OWNER, Call::ChangeOwner { new_owner: ADDR1 })
        .await
        .unwrap();

    assert_eq!(ledger.snapshot().await.unwrap().owner, ADDR1);
    assert!(run(&ledger, OWNER, Call::IncreaseRoomCountBy { by: 1 }).await.is_err());
    assert!(run(&ledger, ADDR1, Call::IncreaseRoomCountBy { by: 1 }).await.is_ok());
}

// =========================================================================
// Lifecycle
// =========================================================================

#[tokio::test]
async fn test_handle_after_shutdown_is_unavailable() {
    let ledger = spawn_default();
    ledger.shutdown().await.unwrap();

    // The actor drops its receiver on the way out; wait for that.
    while !ledger.is_closed() {
        tokio::task::yield_now().await;
    }

    let err = run(&ledger, ADDR1, Call::GetRoomCount).await.unwrap_err();
    assert_eq!(err, LedgerError::Unavailable);
}

#[tokio::test]
async fn test_cloned_handles_share_one_ledger() {
    let ledger = spawn_default();
    let other = ledger.clone();

    run(&ledger, ADDR1, Call::OccupyRooms { rooms: rooms(&[8]) }).await.unwrap();
    let err = run(&other, ADDR2, Call::OccupyRooms { rooms: rooms(&[8]) })
        .await
        .unwrap_err();

    assert_eq!(err, LedgerError::AlreadyOccupied { room: RoomId(8) });
}
