//! Handler contract and its type-erased form held by the dispatcher.

use std::any::{self, Any};
use std::sync::Arc;

use crate::error::DispatchError;
use crate::event::Event;

/// A unit of behaviour bound to exactly one event type.
///
/// `handle` has no default: a handler without behaviour of its own does not
/// compile. Handlers registered with the dispatcher must also be `PartialEq`,
/// which decides whether two registrations are the same handler.
pub trait EventHandler: Send + Sync + 'static {
    type Event: Event;

    fn handle(&self, event: &Self::Event) -> anyhow::Result<()>;
}

/// Short type name used in diagnostics, e.g. `"SendNewPaymentRequest"`.
pub(crate) fn handler_name<H: ?Sized>() -> &'static str {
    let full = any::type_name::<H>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// Object-safe view of a registered handler.
pub(crate) trait ErasedHandler: Send + Sync {
    fn name(&self) -> &'static str;

    /// True if `candidate` is a handler of the same type that compares equal.
    fn matches(&self, candidate: &dyn Any) -> bool;

    fn handle_any(&self, event_name: &str, event: &dyn Any) -> Result<(), DispatchError>;
}

pub(crate) struct Bound<H> {
    handler: Arc<H>,
}

impl<H> Bound<H> {
    pub(crate) fn new(handler: Arc<H>) -> Self {
        Self { handler }
    }
}

impl<H> ErasedHandler for Bound<H>
where
    H: EventHandler + PartialEq,
{
    fn name(&self) -> &'static str {
        handler_name::<H>()
    }

    fn matches(&self, candidate: &dyn Any) -> bool {
        candidate.downcast_ref::<H>().is_some_and(|other| {
            std::ptr::eq(self.handler.as_ref(), other) || *self.handler == *other
        })
    }

    fn handle_any(&self, event_name: &str, event: &dyn Any) -> Result<(), DispatchError> {
        let event = event.downcast_ref::<H::Event>().ok_or_else(|| {
            DispatchError::TypeMismatch {
                event: event_name.to_string(),
                handler: self.name(),
                expected: <H::Event as Event>::NAME,
            }
        })?;
        self.handler.handle(event).map_err(DispatchError::Handler)
    }
}
