//! Entity source and host event intake.
//!
//! The host writes a JSON world export to disk; the service re-reads it
//! every tick. Between ticks the host may push [`HostEvent`]s as JSON lines
//! on stdin, which are forwarded to the event bus.
//!
//! Uses enum dispatch for the source, like the sink, so tests can feed a
//! fixed export without touching the filesystem.

use std::path::PathBuf;

use herald_core::bus::EventBus;
use herald_types::{Entity, EntityRegistry, FeedEvent, HostEvent, WorldContext};
use serde::Deserialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;

/// Errors that can occur while reading the world export.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The export file could not be read.
    #[error("failed to read world export {path}: {source}")]
    Io {
        /// Path that was read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The export is not valid JSON for the expected shape.
    #[error("failed to parse world export: {0}")]
    Json(#[from] serde_json::Error),
}

/// One host export: the population plus its surroundings.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct WorldExport {
    /// Every entity the host knows about, enabled or not.
    #[serde(default)]
    pub entities: Vec<Entity>,
    /// Threats and terrain.
    #[serde(default)]
    pub world: WorldContext,
    /// Recent event feed entries. Absent when the host has no feed.
    #[serde(default)]
    pub feed: Option<Vec<FeedEvent>>,
}

impl WorldExport {
    /// Parse an export from JSON text.
    pub fn parse(json: &str) -> Result<Self, SourceError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Split into an owned registry and the remaining context.
    pub fn into_parts(self) -> (EntityRegistry, WorldContext, Option<Vec<FeedEvent>>) {
        (self.entities.into_iter().collect(), self.world, self.feed)
    }
}

/// Where each tick's population comes from.
#[derive(Debug, Clone)]
pub enum WorldSource {
    /// Re-read a JSON export file every tick.
    File(PathBuf),
    /// A fixed export, for tests and dry runs.
    Fixed(Box<WorldExport>),
}

impl WorldSource {
    /// Load the current export.
    pub async fn load(&self) -> Result<WorldExport, SourceError> {
        match self {
            Self::File(path) => {
                let json = tokio::fs::read_to_string(path)
                    .await
                    .map_err(|source| SourceError::Io {
                        path: path.clone(),
                        source,
                    })?;
                WorldExport::parse(&json)
            }
            Self::Fixed(export) => Ok((**export).clone()),
        }
    }
}

/// Forward JSON-line host events from `reader` to the bus until EOF.
///
/// Blank lines are ignored; malformed lines are logged and skipped.
/// Returns the number of events published.
pub async fn pump_host_events<R>(reader: R, bus: &EventBus) -> usize
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut published: usize = 0;
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(error = %e, "host event stream failed, intake stopped");
                break;
            }
        };
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match serde_json::from_str::<HostEvent>(trimmed) {
            Ok(event) => {
                tracing::debug!(event = ?event, "host event received");
                bus.publish(event);
                published = published.saturating_add(1);
            }
            Err(e) => {
                tracing::warn!(error = %e, line = trimmed, "ignoring malformed host event");
            }
        }
    }
    published
}

/// Spawn the stdin intake task.
pub fn spawn_stdin_events(bus: EventBus) -> JoinHandle<()> {
    tokio::spawn(async move {
        let published = pump_host_events(BufReader::new(tokio::io::stdin()), &bus).await;
        tracing::info!(published, "host event intake closed");
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const EXPORT: &str = r#"{
        "entities": [
            {"id": "01890000-0000-7000-8000-000000000001", "name": "Ada",
             "age_years": 20.0, "life_expectancy_years": 70.0, "job": "Farmer"},
            {"id": "01890000-0000-7000-8000-000000000002", "name": "Bram",
             "age_years": 40.0, "life_expectancy_years": 70.0, "enabled": false}
        ],
        "world": {"hostiles": [{"x": 1.0, "z": 2.0}]},
        "feed": [{"subject": "Cora", "code": "starvedeath"}]
    }"#;

    #[test]
    fn export_parses_with_defaults() {
        let export = WorldExport::parse(EXPORT).unwrap();
        let (registry, world, feed) = export.into_parts();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.enabled_count(), 1);
        assert_eq!(world.hostiles.len(), 1);
        assert_eq!(feed.map(|f| f.len()), Some(1));
    }

    #[test]
    fn missing_sections_are_empty() {
        let export = WorldExport::parse("{}").unwrap();
        assert!(export.entities.is_empty());
        assert!(export.feed.is_none());
    }

    #[tokio::test]
    async fn missing_file_is_an_io_error() {
        let source = WorldSource::File(PathBuf::from("/nonexistent/herald/world.json"));
        assert!(matches!(source.load().await, Err(SourceError::Io { .. })));
    }

    #[tokio::test]
    async fn host_events_are_published_line_by_line() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();
        let input: &[u8] = b"{\"type\":\"full_update_requested\"}\n\nnot json\n";
        let published = pump_host_events(input, &bus).await;
        assert_eq!(published, 1);
        assert_eq!(rx.recv().await.unwrap(), HostEvent::FullUpdateRequested);
    }
}
