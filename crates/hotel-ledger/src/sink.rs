//! The `NotificationSink` trait: where the ledger writes what happened.
//!
//! The ledger keeps no subscriber list. Every mutating operation takes a
//! sink from its caller and writes one record per room it changed, in
//! batch order, after the whole batch has been validated. A rejected
//! operation writes nothing.

use hotel_protocol::Notification;
use tokio::sync::mpsc;

/// Channel sender for delivering notifications to an outside observer.
pub type NotificationSender = mpsc::UnboundedSender<Notification>;

/// Receives the ledger's notifications in emission order.
pub trait NotificationSink {
    /// Records one notification.
    fn emit(&mut self, notification: Notification);
}

/// Collects notifications in memory. Used by the actor to build receipts
/// and by tests to assert on exact emission order.
impl NotificationSink for Vec<Notification> {
    fn emit(&mut self, notification: Notification) {
        self.push(notification);
    }
}

/// Forwards notifications over a channel. Silently drops them if the
/// receiver is gone.
impl NotificationSink for NotificationSender {
    fn emit(&mut self, notification: Notification) {
        let _ = self.send(notification);
    }
}
