//! Error types for the Herald service binary.
//!
//! [`EngineError`] wraps every failure that can stop the service at
//! startup. Once the tick loop is running nothing is fatal; per-cycle
//! failures are logged and the cycle is skipped.

/// Top-level error for the Herald service binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: herald_core::config::ConfigError,
    },

    /// The webhook client could not be built.
    #[error("webhook error: {source}")]
    Webhook {
        /// The underlying webhook error.
        #[from]
        source: herald_webhook::WebhookError,
    },
}
