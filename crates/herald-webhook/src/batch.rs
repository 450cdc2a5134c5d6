//! Final serialization and hard-cap guard.
//!
//! Packing works in characters against the text budget, but the endpoint
//! also caps the encoded request body. [`seal`] serializes the batch and,
//! if the body is still over the cap, collapses the message to its first
//! card plus a warning field before serializing again.

use serde::Serialize;

use crate::card::{Batch, Card, Field};
use crate::error::WebhookError;
use crate::render::{OVERSIZE_WARNING_NAME, OVERSIZE_WARNING_VALUE};

/// Request body as the endpoint expects it.
#[derive(Debug, Serialize)]
struct Payload<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    username: Option<&'a str>,
    embeds: &'a [Card],
}

/// A serialized message ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedPayload {
    /// JSON request body.
    pub json: String,
    /// Number of cards in the body.
    pub cards: usize,
    /// Whether the batch was collapsed to fit the hard cap.
    pub collapsed: bool,
}

impl SealedPayload {
    /// Encoded size in bytes.
    pub fn byte_len(&self) -> usize {
        self.json.len()
    }
}

/// Serialize `batch`, collapsing it if the body exceeds `hard_cap` bytes.
///
/// The collapsed message keeps the first card whatever it is: the summary
/// when one was composed, otherwise the first departure card.
///
/// A single-card batch is never collapsed; if it is still too large the
/// sink refuses to send it.
pub fn seal(batch: Batch, username: Option<&str>, hard_cap: usize) -> Result<SealedPayload, WebhookError> {
    let cards = batch.into_cards();
    let json = encode(&cards, username)?;
    if json.len() <= hard_cap || cards.len() <= 1 {
        return Ok(SealedPayload {
            json,
            cards: cards.len(),
            collapsed: false,
        });
    }

    tracing::error!(
        bytes = json.len(),
        cap = hard_cap,
        cards = cards.len(),
        "payload over hard cap, collapsing to first card"
    );

    let collapsed: Vec<Card> = cards
        .into_iter()
        .take(1)
        .map(|card| card.with_field(Field::new(OVERSIZE_WARNING_NAME, OVERSIZE_WARNING_VALUE, false)))
        .collect();
    Ok(SealedPayload {
        json: encode(&collapsed, username)?,
        cards: collapsed.len(),
        collapsed: true,
    })
}

fn encode(cards: &[Card], username: Option<&str>) -> Result<String, WebhookError> {
    Ok(serde_json::to_string(&Payload {
        username,
        embeds: cards,
    })?)
}
