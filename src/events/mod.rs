use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

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

    /// Sends an event, logging instead of failing when the channel is closed.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(e) = self.send(event).await {
            warn!(error = %e, "dropping domain event");
        }
    }
}

/// Domain events emitted by the services after a successful commit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    OrderCreated {
        order_id: Uuid,
        order_number: String,
        user_id: Uuid,
    },
    OrderStatusChanged {
        order_id: Uuid,
        old_status: String,
        new_status: String,
    },
    PaymentSlipUploaded(Uuid),
    PaymentVerified {
        order_id: Uuid,
        approved: bool,
    },
    ShippingUpdated(Uuid),
    RefundSlipAttached(Uuid),

    ProductCreated(Uuid),
    ProductUpdated(Uuid),
    ProductDeleted(Uuid),
    StockAdjusted {
        product_id: Uuid,
        old_quantity: i32,
        new_quantity: i32,
    },

    UserRegistered(Uuid),
    AccessLevelAssigned {
        user_id: Uuid,
        level: i32,
    },
    UserActivationChanged {
        user_id: Uuid,
        is_active: bool,
    },
    SettingsUpdated,
}

/// Drains the event channel until every sender is dropped.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match &event {
            Event::OrderStatusChanged {
                order_id,
                old_status,
                new_status,
            } => info!(
                order_id = %order_id,
                old_status = %old_status,
                new_status = %new_status,
                "order status changed"
            ),
            Event::OrderCreated {
                order_id,
                order_number,
                user_id,
            } => info!(
                order_id = %order_id,
                order_number = %order_number,
                user_id = %user_id,
                "order created"
            ),
            Event::StockAdjusted {
                product_id,
                old_quantity,
                new_quantity,
            } => info!(
                product_id = %product_id,
                old_quantity,
                new_quantity,
                "stock adjusted"
            ),
            other => info!(event = ?other, "domain event"),
        }
    }

    warn!("Event processing loop has ended");
}
