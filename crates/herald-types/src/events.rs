//! Host-originated events delivered outside the periodic cycle.
//!
//! Hosts push these as JSON lines; the engine forwards them onto the
//! in-process event bus.

use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::ids::EntityId;

/// An event raised by the host between cycles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostEvent {
    /// A new entity joined the population.
    EntityCreated {
        /// The new entity's id.
        id: EntityId,
    },
    /// An entity left the population.
    EntityRemoved {
        /// The departed entity's id.
        id: EntityId,
    },
    /// An entity just became sick; carries its current record.
    BecameSick {
        /// The entity at the moment of falling ill.
        entity: Box<Entity>,
    },
    /// The operator asked for an immediate full report.
    FullUpdateRequested,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn full_update_request_parses_from_tag() {
        let event: HostEvent =
            serde_json::from_str(r#"{"type":"full_update_requested"}"#).unwrap();
        assert_eq!(event, HostEvent::FullUpdateRequested);
    }

    #[test]
    fn removal_carries_id() {
        let id = EntityId::new();
        let json = serde_json::json!({ "type": "entity_removed", "id": id });
        let event: HostEvent = serde_json::from_value(json).unwrap();
        assert_eq!(event, HostEvent::EntityRemoved { id });
    }
}
