//! Error types for the webhook layer.

/// Errors that can occur while preparing or delivering a payload.
///
/// Delivery failures reported by the endpoint are not errors; they come
/// back as a [`crate::sink::DeliveryOutcome`].
#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    /// The HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    Client(String),

    /// Serialization failure.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
}
