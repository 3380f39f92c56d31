use thiserror::Error;

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Payload '{payload}' must be a structured record, got {found}")]
    InvalidPayload {
        payload: &'static str,
        found: &'static str,
    },

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error("EventHandler '{handler}' handles '{expected}', cannot register it for event '{event}'")]
    TypeMismatch {
        event: String,
        handler: &'static str,
        expected: &'static str,
    },

    #[error("Event '{event}' not registered")]
    UnknownEvent { event: String },

    #[error("EventHandler '{handler}' not registered for event '{event}'")]
    UnknownHandler {
        event: String,
        handler: &'static str,
    },

    /// A handler failed. The handler's own error, message and source chain untouched.
    #[error(transparent)]
    Handler(#[from] anyhow::Error),
}
