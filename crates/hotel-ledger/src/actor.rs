//! Ledger actor: an isolated Tokio task that owns the `RoomLedger`.
//!
//! Transactions reach the ledger through an mpsc channel and are applied
//! one at a time, each to completion, in the order they were admitted.
//! That channel is the only way in, so no operation ever observes another
//! one half-done and the ledger itself needs no locking.

use hotel_protocol::{Notification, Output, Receipt, Transaction};
use tokio::sync::{mpsc, oneshot};

use crate::{LedgerError, LedgerSnapshot, NotificationSender, NotificationSink, RoomLedger};

/// The result of an applied transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Execution {
    pub output: Output,
    /// Everything the operation emitted, in emission order.
    pub notifications: Vec<Notification>,
}

impl From<Execution> for Receipt {
    fn from(execution: Execution) -> Self {
        Receipt::Applied {
            output: execution.output,
            notifications: execution.notifications,
        }
    }
}

/// Commands sent to the ledger actor through its channel.
///
/// The `oneshot::Sender` is the reply channel: the caller sends a command
/// and waits for the response on it.
pub(crate) enum LedgerCommand {
    /// Apply one transaction.
    Execute {
        tx: Transaction,
        reply: oneshot::Sender<Result<Execution, LedgerError>>,
    },

    /// Read the current state.
    Snapshot {
        reply: oneshot::Sender<LedgerSnapshot>,
    },

    /// Stop the actor.
    Shutdown,
}

/// Handle to a running ledger actor.
///
/// Cheap to clone: it wraps an `mpsc::Sender`. Every clone feeds the same
/// queue, so transactions from all handles are still serialized.
#[derive(Clone)]
pub struct LedgerHandle {
    sender: mpsc::Sender<LedgerCommand>,
}

impl LedgerHandle {
    /// Submits a transaction and waits for its outcome.
    ///
    /// # Errors
    /// The ledger's rejection, or [`LedgerError::Unavailable`] if the actor
    /// has stopped.
    pub async fn execute(
        &self,
        tx: Transaction,
    ) -> Result<Execution, LedgerError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(LedgerCommand::Execute {
                tx,
                reply: reply_tx,
            })
            .await
            .map_err(|_| LedgerError::Unavailable)?;
        reply_rx.await.map_err(|_| LedgerError::Unavailable)?
    }

    /// Requests a copy of the ledger's observable state.
    pub async fn snapshot(&self) -> Result<LedgerSnapshot, LedgerError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(LedgerCommand::Snapshot { reply: reply_tx })
            .await
            .map_err(|_| LedgerError::Unavailable)?;
        reply_rx.await.map_err(|_| LedgerError::Unavailable)
    }

    /// Tells the actor to stop. Commands already queued ahead of this one
    /// are still applied.
    pub async fn shutdown(&self) -> Result<(), LedgerError> {
        self.sender
            .send(LedgerCommand::Shutdown)
            .await
            .map_err(|_| LedgerError::Unavailable)
    }

    /// Returns `true` once the actor has stopped.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// The internal actor state. Runs inside a Tokio task.
struct LedgerActor {
    ledger: RoomLedger,
    /// Observer that receives every notification, if the host set one.
    events: Option<NotificationSender>,
    receiver: mpsc::Receiver<LedgerCommand>,
}

impl LedgerActor {
    /// Runs the actor loop, processing commands until shutdown.
    async fn run(mut self) {
        tracing::info!(
            room_count = self.ledger.room_count(),
            owner = %self.ledger.owner(),
            "ledger actor started"
        );

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                LedgerCommand::Execute { tx, reply } => {
                    let result = self.handle_execute(&tx);
                    let _ = reply.send(result);
                }
                LedgerCommand::Snapshot { reply } => {
                    let _ = reply.send(self.ledger.snapshot());
                }
                LedgerCommand::Shutdown => {
                    tracing::info!("ledger shutting down");
                    break;
                }
            }
        }

        tracing::info!("ledger actor stopped");
    }

    fn handle_execute(
        &mut self,
        tx: &Transaction,
    ) -> Result<Execution, LedgerError> {
        let mut notifications = Vec::new();
        let output = match self.ledger.apply(tx, &mut notifications) {
            Ok(output) => output,
            Err(error) => {
                tracing::debug!(
                    caller = %tx.caller,
                    op = tx.call.name(),
                    %error,
                    "transaction rejected"
                );
                return Err(error);
            }
        };

        if let Some(events) = &mut self.events {
            for notification in &notifications {
                events.emit(*notification);
            }
        }

        Ok(Execution {
            output,
            notifications,
        })
    }
}

/// Moves `ledger` into a new actor task and returns a handle to it.
///
/// `channel_size` bounds the command queue; submitters wait when it is
/// full. Must be called from within a Tokio runtime.
pub fn spawn_ledger(
    ledger: RoomLedger,
    channel_size: usize,
    events: Option<NotificationSender>,
) -> LedgerHandle {
    let (tx, rx) = mpsc::channel(channel_size.max(1));

    let actor = LedgerActor {
        ledger,
        events,
        receiver: rx,
    };

    tokio::spawn(actor.run());

    LedgerHandle { sender: tx }
}
