//! Delivery of sealed payloads.
//!
//! Uses enum dispatch instead of trait objects because async methods are
//! not dyn-compatible. [`Sink::Webhook`] posts to the real endpoint;
//! [`Sink::Memory`] records payloads in memory for tests and dry runs.
//!
//! Delivery is best effort. Nothing here retries; the caller logs the
//! [`DeliveryOutcome`] and moves on.

use std::sync::Arc;
use std::time::Duration;

use herald_core::config::WebhookConfig;
use tokio::sync::{Mutex, MutexGuard};

use crate::batch::SealedPayload;
use crate::error::WebhookError;

/// Longest response body excerpt kept in an outcome.
const BODY_EXCERPT_LEN: usize = 200;

/// How a delivery attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The endpoint accepted the message.
    Delivered,
    /// The endpoint is rate limiting us (HTTP 429).
    RateLimited,
    /// The endpoint rejected the body (HTTP 400).
    Malformed {
        /// Start of the response body.
        detail: String,
    },
    /// The webhook URL does not exist (HTTP 404).
    NotFound,
    /// The body exceeded the hard cap and was not sent.
    Oversized {
        /// Encoded size.
        bytes: usize,
        /// Configured cap.
        cap: usize,
    },
    /// Anything else, including transport errors.
    Failed {
        /// HTTP status, if a response arrived.
        status: Option<u16>,
        /// Error text or start of the response body.
        detail: String,
    },
}

impl DeliveryOutcome {
    /// Categorize a non-success HTTP response.
    pub fn from_status(status: u16, body: &str) -> Self {
        let detail: String = body.chars().take(BODY_EXCERPT_LEN).collect();
        match status {
            200..=299 => Self::Delivered,
            429 => Self::RateLimited,
            400 => Self::Malformed { detail },
            404 => Self::NotFound,
            other => Self::Failed {
                status: Some(other),
                detail,
            },
        }
    }

    /// Whether the message went through.
    pub const fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered)
    }

    /// Short category name for logs.
    pub const fn category(&self) -> &'static str {
        match self {
            Self::Delivered => "delivered",
            Self::RateLimited => "rate_limited",
            Self::Malformed { .. } => "malformed",
            Self::NotFound => "not_found",
            Self::Oversized { .. } => "oversized",
            Self::Failed { .. } => "failed",
        }
    }

    /// Log the outcome at a level matching its severity.
    pub fn log(&self, context: &str) {
        match self {
            Self::Delivered => {
                tracing::debug!(context, "webhook delivered");
            }
            Self::RateLimited => {
                tracing::warn!(context, "rate limited by webhook endpoint, message dropped");
            }
            Self::Malformed { detail } => {
                tracing::error!(context, detail = %detail, "webhook rejected payload as malformed");
            }
            Self::NotFound => {
                tracing::error!(context, "webhook URL not found, check that it is still valid");
            }
            Self::Oversized { bytes, cap } => {
                tracing::error!(context, bytes, cap, "payload over hard cap, not sent");
            }
            Self::Failed { status, detail } => {
                tracing::error!(context, status = ?status, detail = %detail, "webhook delivery failed");
            }
        }
    }
}

/// A delivery target.
#[derive(Debug, Clone)]
pub enum Sink {
    /// HTTP webhook.
    Webhook(WebhookSink),
    /// In-memory recorder.
    Memory(MemorySink),
}

impl Sink {
    /// Deliver one payload.
    pub async fn deliver(&self, payload: &SealedPayload) -> DeliveryOutcome {
        match self {
            Self::Webhook(sink) => sink.deliver(payload).await,
            Self::Memory(sink) => sink.deliver(payload).await,
        }
    }

    /// Human-readable name for logging.
    pub const fn name(&self) -> &str {
        match self {
            Self::Webhook(_) => "webhook",
            Self::Memory(_) => "memory",
        }
    }
}

// ---------------------------------------------------------------------------
// HTTP webhook
// ---------------------------------------------------------------------------

/// Posts payloads to a webhook URL.
#[derive(Debug, Clone)]
pub struct WebhookSink {
    client: reqwest::Client,
    url: String,
    hard_cap: usize,
}

impl WebhookSink {
    /// Create a sink for the configured URL.
    pub fn new(config: &WebhookConfig, hard_cap: usize) -> Result<Self, WebhookError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| WebhookError::Client(e.to_string()))?;
        Ok(Self {
            client,
            url: config.url.clone(),
            hard_cap,
        })
    }

    async fn deliver(&self, payload: &SealedPayload) -> DeliveryOutcome {
        if payload.byte_len() > self.hard_cap {
            return DeliveryOutcome::Oversized {
                bytes: payload.byte_len(),
                cap: self.hard_cap,
            };
        }

        tracing::debug!(bytes = payload.byte_len(), cards = payload.cards, "sending webhook request");

        let response = match self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json")
            .body(payload.json.clone())
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                return DeliveryOutcome::Failed {
                    status: None,
                    detail: e.to_string(),
                };
            }
        };

        let status = response.status();
        if status.is_success() {
            return DeliveryOutcome::Delivered;
        }
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "unable to read error body".to_owned());
        DeliveryOutcome::from_status(status.as_u16(), &body)
    }
}

// ---------------------------------------------------------------------------
// In-memory recorder
// ---------------------------------------------------------------------------

/// Records every payload and answers with a fixed outcome.
#[derive(Debug, Clone)]
pub struct MemorySink {
    sent: Arc<Mutex<Vec<SealedPayload>>>,
    outcome: DeliveryOutcome,
}

impl MemorySink {
    /// A recorder that reports every delivery as successful.
    pub fn new() -> Self {
        Self::answering(DeliveryOutcome::Delivered)
    }

    /// A recorder that reports `outcome` for every delivery.
    pub fn answering(outcome: DeliveryOutcome) -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            outcome,
        }
    }

    /// Payloads recorded so far, oldest first.
    pub async fn sent(&self) -> Vec<SealedPayload> {
        self.sent.lock().await.clone()
    }

    /// Lock the recorder. Deliveries wait until the guard is dropped,
    /// which simulates a stalled endpoint.
    pub async fn hold(&self) -> MutexGuard<'_, Vec<SealedPayload>> {
        self.sent.lock().await
    }

    async fn deliver(&self, payload: &SealedPayload) -> DeliveryOutcome {
        self.sent.lock().await.push(payload.clone());
        self.outcome.clone()
    }
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new()
    }
}
