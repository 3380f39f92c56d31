//! Order domain built on `domain-events`: an order entity, the event raised
//! when one is created, and the handler that requests payment for it.

pub mod config;
pub mod order;
pub mod payment;

pub use config::{AppConfig, LogFormat};
pub use order::{Order, OrderCreated, OrderCreatedEvent};
pub use payment::{PaymentLedger, PaymentRequest, SendNewPaymentRequest};
