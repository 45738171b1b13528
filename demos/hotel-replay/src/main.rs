use std::io::Read;

use honest_hotel::prelude::*;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Scenario file
// ---------------------------------------------------------------------------

/// A scripted run: ledger settings, the deploying owner, and the
/// transactions to submit in order.
#[derive(Deserialize)]
struct Scenario {
    #[serde(default)]
    config: LedgerConfig,
    owner: Principal,
    steps: Vec<Step>,
}

/// One transaction. `caller` is the credential handed to the resolver;
/// the remaining fields are the call itself, e.g.
/// `{ "caller": "2", "op": "FreeRooms", "rooms": [1] }`.
#[derive(Deserialize)]
struct Step {
    caller: String,
    #[serde(flatten)]
    call: Call,
}

/// One line of output per step.
#[derive(Serialize)]
struct ReplayLine<'a> {
    step: usize,
    caller: &'a str,
    op: &'static str,
    receipt: &'a Receipt,
}

// ---------------------------------------------------------------------------
// Replay
// ---------------------------------------------------------------------------

struct Replay {
    lines: Vec<(String, &'static str, Receipt)>,
    snapshot: LedgerSnapshot,
}

async fn replay(
    scenario: Scenario,
    notifications: Option<NotificationSender>,
) -> Result<Replay, HotelError> {
    let mut builder = HotelHostBuilder::new()
        .config(scenario.config)
        .owner(scenario.owner);
    if let Some(sender) = notifications {
        builder = builder.notifications(sender);
    }
    let host = builder.build(NumericResolver)?;

    let mut lines = Vec::with_capacity(scenario.steps.len());
    for Step { caller, call } in scenario.steps {
        let op = call.name();
        let receipt = host.submit(&caller, call).await?;
        lines.push((caller, op, receipt));
    }

    let snapshot = host.snapshot().await?;
    host.shutdown().await?;
    Ok(Replay { lines, snapshot })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let raw = match std::env::args().nth(1) {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    let scenario: Scenario = serde_json::from_str(&raw)?;

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let observer = tokio::spawn(async move {
        while let Some(notification) = rx.recv().await {
            tracing::info!(?notification, "ledger notification");
        }
    });

    let Replay { lines, snapshot } = replay(scenario, Some(tx)).await?;
    observer.await?;

    for (step, (caller, op, receipt)) in lines.iter().enumerate() {
        let line = ReplayLine {
            step,
            caller,
            op: *op,
            receipt,
        };
        println!("{}", serde_json::to_string(&line)?);
    }
    println!("{}", serde_json::to_string(&snapshot)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const GRAND_OPENING: &str = include_str!("../scenarios/grand_opening.json");

    async fn replay_bundled() -> Replay {
        let scenario: Scenario = serde_json::from_str(GRAND_OPENING).unwrap();
        replay(scenario, None).await.unwrap()
    }

    fn receipt(replay: &Replay, step: usize) -> &Receipt {
        &replay.lines[step].2
    }

    #[test]
    fn test_step_flattens_call_fields() {
        let step: Step = serde_json::from_str(
            r#"{ "caller": "9", "op": "ForceFreeRooms", "rooms": [2] }"#,
        )
        .unwrap();
        assert_eq!(step.caller, "9");
        assert_eq!(step.call, Call::ForceFreeRooms { rooms: vec![RoomId(2)] });
    }

    #[test]
    fn test_scenario_config_defaults_when_missing() {
        let scenario: Scenario =
            serde_json::from_str(r#"{ "owner": 1, "steps": [] }"#).unwrap();
        assert_eq!(scenario.config, LedgerConfig::default());
    }

    #[tokio::test]
    async fn test_grand_opening_rejects_double_booking_and_guest_override() {
        let replay = replay_bundled().await;

        assert_eq!(
            receipt(&replay, 3).reason(),
            Some(
                "Your reservation cannot be completed, because a room you want is already occupied"
            )
        );
        assert_eq!(receipt(&replay, 5).reason(), Some("Caller is not owner"));
    }

    #[tokio::test]
    async fn test_grand_opening_force_free_all_order() {
        let replay = replay_bundled().await;

        let rooms: Vec<_> = receipt(&replay, 6)
            .notifications()
            .iter()
            .map(Notification::room)
            .collect();
        assert_eq!(rooms, vec![RoomId(7), RoomId(4)]);
        assert_eq!(
            receipt(&replay, 7).output(),
            Some(Output::OccupiedRooms(0))
        );
    }

    #[tokio::test]
    async fn test_grand_opening_final_state() {
        let replay = replay_bundled().await;

        assert_eq!(receipt(&replay, 9).output(), Some(Output::RoomCount(55)));
        assert_eq!(
            receipt(&replay, 11).output(),
            Some(Output::Owner(Principal(2)))
        );
        assert!(replay.snapshot.occupied.is_empty());
        assert_eq!(replay.snapshot.owner, Principal(2));
    }
}
