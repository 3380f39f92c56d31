//! The registry and its synchronous delivery loop.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, warn};

use crate::error::DispatchError;
use crate::event::Event;
use crate::handler::{handler_name, Bound, ErasedHandler, EventHandler};

/// Handlers for one event name, in registration order, without duplicates.
type HandlerSet = Vec<Arc<dyn ErasedHandler>>;

/// Maps event names to the handlers registered for them and delivers events.
///
/// Delivery is synchronous: `notify` calls every handler in the calling
/// thread, in registration order, and returns once they have all run. The
/// first failing handler stops delivery and its error is returned.
///
/// The mapping sits behind a lock, so a dispatcher can be shared across
/// threads. The lock is released before handlers run, so a handler may
/// notify or (un)register through the same dispatcher.
#[derive(Default)]
pub struct EventDispatcher {
    handlers: RwLock<HashMap<String, HandlerSet>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `event_name`.
    ///
    /// `event_name` must be the name of the event type the handler handles.
    /// Registering a handler equal to one already present is a no-op.
    pub fn register<H>(&self, event_name: &str, handler: Arc<H>) -> Result<(), DispatchError>
    where
        H: EventHandler + PartialEq,
    {
        let expected = <H::Event as Event>::NAME;
        if event_name != expected {
            return Err(DispatchError::TypeMismatch {
                event: event_name.to_string(),
                handler: handler_name::<H>(),
                expected,
            });
        }

        let mut handlers = self.write();
        let set = handlers.entry(event_name.to_string()).or_default();

        if set.iter().any(|h| h.matches(handler.as_ref() as &dyn Any)) {
            debug!(
                event = event_name,
                handler = handler_name::<H>(),
                "Handler already registered"
            );
            return Ok(());
        }

        set.push(Arc::new(Bound::new(handler)));
        debug!(
            event = event_name,
            handler = handler_name::<H>(),
            handlers = set.len(),
            "Registered handler"
        );
        Ok(())
    }

    /// Register `handler` under the name of the event type it handles.
    pub fn subscribe<H>(&self, handler: Arc<H>) -> Result<(), DispatchError>
    where
        H: EventHandler + PartialEq,
    {
        self.register(<H::Event as Event>::NAME, handler)
    }

    /// Remove `handler` from `event_name`. The event stays registered even if
    /// no handlers remain.
    pub fn unregister<H>(&self, event_name: &str, handler: &H) -> Result<(), DispatchError>
    where
        H: PartialEq + 'static,
    {
        let mut handlers = self.write();
        let set = handlers
            .get_mut(event_name)
            .ok_or_else(|| DispatchError::UnknownEvent {
                event: event_name.to_string(),
            })?;

        let position = set
            .iter()
            .position(|h| h.matches(handler as &dyn Any))
            .ok_or_else(|| DispatchError::UnknownHandler {
                event: event_name.to_string(),
                handler: handler_name::<H>(),
            })?;

        set.remove(position);
        debug!(
            event = event_name,
            handler = handler_name::<H>(),
            handlers = set.len(),
            "Unregistered handler"
        );
        Ok(())
    }

    /// Forget every event and handler.
    pub fn unregister_all(&self) {
        let mut handlers = self.write();
        let events = handlers.len();
        handlers.clear();
        debug!(events, "Unregistered all handlers");
    }

    /// Deliver `event` to every handler registered for its name.
    pub fn notify<E: Event>(&self, event: &E) -> Result<(), DispatchError> {
        let name = event.name();

        // Snapshot so handlers run without the lock held.
        let subscribers: HandlerSet = self
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| DispatchError::UnknownEvent {
                event: name.to_string(),
            })?;

        debug!(event = name, handlers = subscribers.len(), "Dispatching event");

        for handler in &subscribers {
            if let Err(err) = handler.handle_any(name, event as &dyn Any) {
                warn!(
                    event = name,
                    handler = handler.name(),
                    error = %err,
                    "Handler failed, remaining handlers skipped"
                );
                return Err(err);
            }
        }

        Ok(())
    }

    pub fn is_registered(&self, event_name: &str) -> bool {
        self.read().contains_key(event_name)
    }

    /// True if a handler equal to `handler` is registered for `event_name`.
    pub fn contains<H>(&self, event_name: &str, handler: &H) -> bool
    where
        H: PartialEq + 'static,
    {
        self.read()
            .get(event_name)
            .is_some_and(|set| set.iter().any(|h| h.matches(handler as &dyn Any)))
    }

    /// Number of handlers for `event_name`, or `None` if it was never registered.
    pub fn handler_count(&self, event_name: &str) -> Option<usize> {
        self.read().get(event_name).map(Vec::len)
    }

    /// Registered event names, sorted.
    pub fn event_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, HandlerSet>> {
        self.handlers.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, HandlerSet>> {
        self.handlers.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let handlers = self.read();
        let mut events: Vec<_> = handlers.iter().collect();
        events.sort_by(|a, b| a.0.cmp(b.0));

        let mut map = f.debug_map();
        for (name, set) in events {
            let names: Vec<&'static str> = set.iter().map(|h| h.name()).collect();
            map.entry(name, &names);
        }
        map.finish()
    }
}
