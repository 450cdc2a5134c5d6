//! Card, field, and batch model.
//!
//! Field names mirror the webhook's JSON schema so a [`Card`] serializes
//! directly into an embed object. Size accounting follows the endpoint's
//! rule: only visible text counts (titles, descriptions, field names and
//! values, footers), measured in characters.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

/// Card colors.
pub mod color {
    /// Reports and detail cards.
    pub const BLUE: u32 = 3_447_003;
    /// Departures.
    pub const RED: u32 = 16_711_680;
    /// Sickness alerts.
    pub const ORANGE: u32 = 16_738_740;
    /// Service announcements.
    pub const PURPLE: u32 = 5_763_719;
}

/// Number of characters in a string.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// One name/value pair inside a card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    /// Field heading.
    pub name: String,
    /// Field body, may contain `**` emphasis and newlines.
    pub value: String,
    /// Whether the endpoint may lay this field out side by side.
    pub inline: bool,
}

impl Field {
    /// Build a field.
    pub fn new(name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            inline,
        }
    }

    /// Characters counted against the message budget.
    pub fn text_len(&self) -> usize {
        char_len(&self.name).saturating_add(char_len(&self.value))
    }
}

/// Footer text shown under a card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Footer {
    /// Footer text.
    pub text: String,
}

/// A single rich card ("embed").
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Card {
    /// Card heading.
    pub title: String,
    /// Body text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Sidebar color as a 24-bit RGB integer.
    pub color: u32,
    /// Ordered fields.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<Field>,
    /// RFC 3339 timestamp rendered by the client.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// Footer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<Footer>,
}

impl Card {
    /// A card with a title and color and nothing else.
    pub fn new(title: impl Into<String>, color: u32) -> Self {
        Self {
            title: title.into(),
            description: None,
            color,
            fields: Vec::new(),
            timestamp: None,
            footer: None,
        }
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Append a field.
    #[must_use]
    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Set the timestamp.
    #[must_use]
    pub fn with_timestamp(mut self, at: DateTime<Utc>) -> Self {
        self.timestamp = Some(at.to_rfc3339_opts(SecondsFormat::Secs, true));
        self
    }

    /// Set the footer text.
    #[must_use]
    pub fn with_footer(mut self, text: impl Into<String>) -> Self {
        self.footer = Some(Footer { text: text.into() });
        self
    }

    /// Characters counted against the message budget.
    pub fn text_len(&self) -> usize {
        let fixed = char_len(&self.title)
            .saturating_add(self.description.as_deref().map_or(0, char_len))
            .saturating_add(self.footer.as_ref().map_or(0, |f| char_len(&f.text)));
        self.fields
            .iter()
            .fold(fixed, |acc, f| acc.saturating_add(f.text_len()))
    }
}

/// An ordered list of cards sent as one message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Batch {
    cards: Vec<Card>,
}

impl Batch {
    /// An empty batch.
    pub const fn new() -> Self {
        Self { cards: Vec::new() }
    }

    /// A batch holding a single card.
    pub fn single(card: Card) -> Self {
        Self { cards: vec![card] }
    }

    /// Append a card.
    pub fn push(&mut self, card: Card) {
        self.cards.push(card);
    }

    /// The cards in order.
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Consume the batch, yielding its cards.
    pub fn into_cards(self) -> Vec<Card> {
        self.cards
    }

    /// Number of cards.
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Whether the batch has no cards.
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Total characters counted against the message budget.
    pub fn text_len(&self) -> usize {
        self.cards
            .iter()
            .fold(0, |acc, c| acc.saturating_add(c.text_len()))
    }
}

impl From<Vec<Card>> for Batch {
    fn from(cards: Vec<Card>) -> Self {
        Self { cards }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn text_len_counts_visible_text_only() {
        let card = Card::new("Title", color::BLUE)
            .with_description("desc")
            .with_field(Field::new("ab", "cde", false))
            .with_footer("ft");
        // title 5, description 4, field 2 + 3, footer 2
        assert_eq!(card.text_len(), 16);
    }

    #[test]
    fn text_len_counts_characters() {
        assert_eq!(Field::new("é", "🏰", true).text_len(), 2);
    }

    #[test]
    fn empty_parts_are_omitted_from_json() {
        let json = serde_json::to_value(Card::new("Only title", color::RED)).unwrap();
        assert_eq!(json, serde_json::json!({ "title": "Only title", "color": 16_711_680 }));
    }

    #[test]
    fn timestamp_is_rfc3339_utc() {
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 12, 30, 0).unwrap();
        let card = Card::new("t", color::BLUE).with_timestamp(at);
        assert_eq!(card.timestamp.as_deref(), Some("2026-03-01T12:30:00Z"));
    }

    #[test]
    fn footer_serializes_as_object() {
        let json = serde_json::to_value(Card::new("t", color::PURPLE).with_footer("Experimental")).unwrap();
        let footer = json.get("footer").and_then(|f| f.get("text"));
        assert_eq!(footer, Some(&serde_json::json!("Experimental")));
    }
}
