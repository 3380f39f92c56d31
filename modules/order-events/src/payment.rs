//! Payment side of order creation.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::{bail, Result};
use domain_events::EventHandler;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::order::OrderCreatedEvent;

/// A charge sent to the payment gateway.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentRequest {
    pub order_id: Uuid,
    pub total: f64,
    pub gateway: String,
}

/// Shared record of every payment request sent. Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct PaymentLedger {
    requests: Arc<Mutex<Vec<PaymentRequest>>>,
}

impl PaymentLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, request: PaymentRequest) {
        self.lock().push(request);
    }

    pub fn requests(&self) -> Vec<PaymentRequest> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<PaymentRequest>> {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Sends a payment request for every newly created order.
///
/// Two instances are the same handler when they target the same gateway.
#[derive(Debug, Clone)]
pub struct SendNewPaymentRequest {
    gateway: String,
    ledger: PaymentLedger,
}

impl SendNewPaymentRequest {
    pub fn new(gateway: impl Into<String>, ledger: PaymentLedger) -> Self {
        Self {
            gateway: gateway.into(),
            ledger,
        }
    }

    pub fn gateway(&self) -> &str {
        &self.gateway
    }
}

impl PartialEq for SendNewPaymentRequest {
    fn eq(&self, other: &Self) -> bool {
        self.gateway == other.gateway
    }
}

impl EventHandler for SendNewPaymentRequest {
    type Event = OrderCreatedEvent;

    fn handle(&self, event: &OrderCreatedEvent) -> Result<()> {
        let order = event.payload();
        if order.total <= 0.0 {
            bail!("Order {} has nothing to charge (total {})", order.id, order.total);
        }

        info!(
            gateway = self.gateway.as_str(),
            order_id = %order.id,
            total = order.total,
            "Sending request to payment Gateway"
        );

        self.ledger.record(PaymentRequest {
            order_id: order.id,
            total: order.total,
            gateway: self.gateway.clone(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::Order;

    #[test]
    fn equality_is_by_gateway() {
        let ledger = PaymentLedger::new();
        let a = SendNewPaymentRequest::new("https://pay.one", ledger.clone());
        let b = SendNewPaymentRequest::new("https://pay.one", PaymentLedger::new());
        let c = SendNewPaymentRequest::new("https://pay.two", ledger);

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn handle_records_a_payment_request() {
        let ledger = PaymentLedger::new();
        let handler = SendNewPaymentRequest::new("https://pay.one", ledger.clone());
        let order = Order::new("created", 42.5);
        let event = OrderCreatedEvent::new(order.clone()).unwrap();

        handler.handle(&event).unwrap();

        assert_eq!(
            ledger.requests(),
            vec![PaymentRequest {
                order_id: order.id,
                total: 42.5,
                gateway: "https://pay.one".to_string(),
            }]
        );
    }

    #[test]
    fn handle_rejects_orders_with_nothing_to_charge() {
        let ledger = PaymentLedger::new();
        let handler = SendNewPaymentRequest::new("https://pay.one", ledger.clone());
        let event = OrderCreatedEvent::new(Order::new("created", 0.0)).unwrap();

        let err = handler.handle(&event).unwrap_err();

        assert!(err.to_string().contains("has nothing to charge"));
        assert!(ledger.is_empty());
    }

    #[test]
    fn ledger_clones_share_requests() {
        let ledger = PaymentLedger::new();
        let clone = ledger.clone();

        clone.record(PaymentRequest {
            order_id: Uuid::new_v4(),
            total: 1.0,
            gateway: "g".to_string(),
        });

        assert_eq!(ledger.len(), 1);
    }
}
