//! Ledger notifications
//!
//! Observers subscribe to a broadcast channel; slow receivers lag and
//! lose the oldest events rather than back-pressuring the ledger.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use umbra_fhe::Principal;

/// Events emitted by the ledger
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LedgerEvent {
    /// A new record was admitted
    RecordCreated { id: String, owner: Principal },
    /// A record's amount was disclosed through a verified decryption
    AmountDisclosed { id: String, clear_value: u32 },
}

/// Subscription handle returned by [`EventBus::subscribe`]
pub type EventReceiver = broadcast::Receiver<LedgerEvent>;

/// Fan-out of ledger events
#[derive(Debug)]
pub struct EventBus {
    tx: broadcast::Sender<LedgerEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> EventReceiver {
        self.tx.subscribe()
    }

    /// Publish to current subscribers. Having none is not an error.
    pub fn publish(&self, event: LedgerEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_without_subscribers() {
        let bus = EventBus::new(4);
        bus.publish(LedgerEvent::AmountDisclosed { id: "a".into(), clear_value: 1 });
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_subscriber_receives_in_order() {
        let bus = EventBus::new(4);
        let mut rx = bus.subscribe();
        let owner = Principal::from_name("alice");
        bus.publish(LedgerEvent::RecordCreated { id: "a".into(), owner });
        bus.publish(LedgerEvent::AmountDisclosed { id: "a".into(), clear_value: 7 });

        assert_eq!(rx.try_recv().unwrap(), LedgerEvent::RecordCreated { id: "a".into(), owner });
        assert_eq!(
            rx.try_recv().unwrap(),
            LedgerEvent::AmountDisclosed { id: "a".into(), clear_value: 7 }
        );
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_zero_capacity_clamped() {
        let bus = EventBus::new(0);
        let mut rx = bus.subscribe();
        bus.publish(LedgerEvent::AmountDisclosed { id: "a".into(), clear_value: 1 });
        assert!(rx.try_recv().is_ok());
    }

    #[test]
    fn test_event_json_shape() {
        let event = LedgerEvent::AmountDisclosed { id: "loan-1".into(), clear_value: 42 };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "amount_disclosed");
        assert_eq!(json["clear_value"], 42);
    }
}
