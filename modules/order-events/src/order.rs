use domain_events::{DomainEvent, EventKind, Payload};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A customer order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub status: String,
    pub total: f64,
    #[serde(rename = "_id")]
    pub id: Uuid,
}

impl Order {
    /// New order with a freshly generated id.
    pub fn new(status: impl Into<String>, total: f64) -> Self {
        Self {
            status: status.into(),
            total,
            id: Uuid::new_v4(),
        }
    }
}

impl Payload for Order {
    const NAME: &'static str = "Order";
}

/// An order was placed.
pub struct OrderCreated;

impl EventKind for OrderCreated {
    const NAME: &'static str = "OrderCreatedEvent";
    type Payload = Order;
}

pub type OrderCreatedEvent = DomainEvent<OrderCreated>;
