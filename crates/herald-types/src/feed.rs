//! Entries from the host's recent event feed.

use serde::{Deserialize, Serialize};

/// One event-feed entry naming a subject and a lowercase event code.
///
/// Codes seen in the wild include `dragonkill`, `starvedeath`,
/// `plaguedeath` and `wolfkill`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedEvent {
    /// Display name of the entity the entry is about.
    pub subject: String,
    /// Event code as reported by the host.
    pub code: String,
}

impl FeedEvent {
    /// Build a feed entry.
    pub fn new(subject: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            code: code.into(),
        }
    }
}
