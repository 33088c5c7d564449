use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::info;
use uuid::Uuid;

use crate::entities::shipment::ShipmentType;

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

// Define the various events that can occur in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Structural events
    DepotCreated(Uuid),
    DepotUpdated(Uuid),
    RackCreated {
        rack_id: Uuid,
        depot_id: Uuid,
        slot_count: u32,
    },
    RackDeleted {
        rack_id: Uuid,
        depot_id: Uuid,
    },

    // Registry events
    ClientCreated(Uuid),
    ClientDeactivated(Uuid),
    ProductCreated(Uuid),
    ProductDeactivated(Uuid),

    // Shipment events
    ShipmentCreated {
        shipment_id: Uuid,
        shipment_type: ShipmentType,
    },
    ShipmentApproved {
        shipment_id: Uuid,
        shipment_type: ShipmentType,
    },
    ShipmentVoided {
        shipment_id: Uuid,
        shipment_type: ShipmentType,
    },

    // Movement events
    PalletMoved {
        pallet_id: Uuid,
        origin_slot_id: Uuid,
        destination_slot_id: Uuid,
    },
}

/// Consumes events off the channel and logs them. Listeners with real side
/// effects (webhooks, projections) would hang off this loop; the engine
/// itself never mutates state from here.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    while let Some(event) = receiver.recv().await {
        info!(event = ?event, "domain event");
    }
    info!("event channel closed; stopping event processor");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sender_delivers_events() {
        let (tx, mut rx) = mpsc::channel(4);
        let sender = EventSender::new(tx);

        sender
            .send(Event::DepotCreated(Uuid::nil()))
            .await
            .expect("send should succeed with open receiver");

        match rx.recv().await {
            Some(Event::DepotCreated(id)) => assert_eq!(id, Uuid::nil()),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn send_fails_when_receiver_dropped() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let sender = EventSender::new(tx);
        assert!(sender.send(Event::DepotUpdated(Uuid::nil())).await.is_err());
    }
}
