//! Event types.
//!
//! A `Payload` is structured domain data. An `EventKind` names one kind of
//! fact at compile time and fixes its payload type. `DomainEvent` pairs a
//! payload with the moment it occurred and is what gets dispatched.

use std::fmt;
use std::marker::PhantomData;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};

use crate::error::DispatchError;

/// Structured data carried by an event. Must serialize to a JSON object.
pub trait Payload: Serialize + fmt::Debug + Send + Sync + 'static {
    /// Type name of the payload, e.g. `"Order"`. Lowercased, it becomes the
    /// payload key in the event representation.
    const NAME: &'static str;
}

/// Compile-time identity of one kind of event.
///
/// Implemented by zero-sized markers:
///
/// ```
/// # use domain_events::{EventKind, Payload};
/// # #[derive(Debug, serde::Serialize)]
/// # struct Order { status: String }
/// # impl Payload for Order { const NAME: &'static str = "Order"; }
/// struct OrderCreated;
///
/// impl EventKind for OrderCreated {
///     const NAME: &'static str = "OrderCreatedEvent";
///     type Payload = Order;
/// }
/// ```
pub trait EventKind: Send + Sync + 'static {
    /// Dispatch key. One key per kind of event.
    const NAME: &'static str;

    type Payload: Payload;
}

/// Anything the dispatcher can deliver.
pub trait Event: Send + Sync + 'static {
    /// Dispatch key for this event type.
    const NAME: &'static str;

    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn occurred_at(&self) -> DateTime<Utc>;

    /// `{ "date_time_occurred": <rfc3339>, "<payload name>": { ...fields } }`
    fn to_representation(&self) -> Map<String, Value>;
}

/// An immutable fact: a payload plus the moment it occurred.
pub struct DomainEvent<K: EventKind> {
    payload: K::Payload,
    fields: Map<String, Value>,
    occurred_at: DateTime<Utc>,
    _kind: PhantomData<fn() -> K>,
}

impl<K: EventKind> DomainEvent<K> {
    /// Build an event stamped with the current UTC time.
    ///
    /// The clock is read on every call, so events built without an explicit
    /// timestamp never share one.
    pub fn new(payload: K::Payload) -> Result<Self, DispatchError> {
        Self::with_occurred_at(payload, Utc::now())
    }

    /// Build an event with an explicit occurrence time.
    pub fn with_occurred_at(
        payload: K::Payload,
        occurred_at: DateTime<Utc>,
    ) -> Result<Self, DispatchError> {
        let fields = match serde_json::to_value(&payload)? {
            Value::Object(fields) => fields,
            other => {
                return Err(DispatchError::InvalidPayload {
                    payload: <K::Payload as Payload>::NAME,
                    found: json_kind(&other),
                })
            }
        };

        Ok(Self {
            payload,
            fields,
            occurred_at,
            _kind: PhantomData,
        })
    }

    pub fn payload(&self) -> &K::Payload {
        &self.payload
    }

    /// Key the payload fields are stored under in the representation.
    pub fn payload_key() -> String {
        <K::Payload as Payload>::NAME.to_lowercase()
    }

    fn formatted_occurred_at(&self) -> String {
        self.occurred_at.to_rfc3339_opts(SecondsFormat::Micros, true)
    }
}

impl<K: EventKind> Event for DomainEvent<K> {
    const NAME: &'static str = K::NAME;

    fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    fn to_representation(&self) -> Map<String, Value> {
        let mut repr = Map::new();
        repr.insert(
            "date_time_occurred".to_string(),
            Value::String(self.formatted_occurred_at()),
        );
        repr.insert(Self::payload_key(), Value::Object(self.fields.clone()));
        repr
    }
}

impl<K: EventKind> Serialize for DomainEvent<K> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("date_time_occurred", &self.formatted_occurred_at())?;
        map.serialize_entry(&Self::payload_key(), &self.fields)?;
        map.end()
    }
}

impl<K: EventKind> fmt::Debug for DomainEvent<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(K::NAME)
            .field("payload", &self.payload)
            .field("occurred_at", &self.occurred_at)
            .finish()
    }
}

impl<K: EventKind> Clone for DomainEvent<K>
where
    K::Payload: Clone,
{
    fn clone(&self) -> Self {
        Self {
            payload: self.payload.clone(),
            fields: self.fields.clone(),
            occurred_at: self.occurred_at,
            _kind: PhantomData,
        }
    }
}

impl<K: EventKind> PartialEq for DomainEvent<K>
where
    K::Payload: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.occurred_at == other.occurred_at && self.payload == other.payload
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
