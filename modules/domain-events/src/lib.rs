//! In-process domain events.
//!
//! Handlers register against an event name; `notify` hands an event to every
//! handler registered for its name, synchronously, in the calling thread.
//! No broker, no persistence, no background delivery.
//!
//! Consumers define their domain by implementing `Payload` (structured data),
//! `EventKind` (a compile-time event name) and `EventHandler` (the reaction).

pub mod dispatcher;
pub mod error;
pub mod event;
pub mod handler;

pub use dispatcher::EventDispatcher;
pub use error::DispatchError;
pub use event::{DomainEvent, Event, EventKind, Payload};
pub use handler::EventHandler;
