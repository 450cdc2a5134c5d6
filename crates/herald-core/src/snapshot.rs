//! Per-cycle entity captures.
//!
//! A [`Snapshot`] freezes the handful of fields the diff engine compares,
//! plus the terminal vitals the cause classifier needs once the entity is
//! gone. The [`SnapshotStore`] is replaced wholesale after every completed
//! cycle; there is no way to patch a single entry.

use std::collections::BTreeMap;

use herald_types::{Entity, EntityId, EntityRegistry, Position};

/// Immutable capture of one entity at the end of a cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// Entity id.
    pub id: EntityId,
    /// Display name at capture time.
    pub name: String,
    /// Age in years at capture time.
    pub age_years: f64,
    /// Raw job description; empty when unemployed.
    pub job_description: String,
    /// Whether the entity had a residence.
    pub has_home: bool,
    /// Whether the entity was sick.
    pub sick: bool,
    /// Number of skills held.
    pub skill_count: usize,

    // Terminal vitals. Never compared by the diff engine.
    /// Life expectancy in years.
    pub life_expectancy_years: f64,
    /// Duration of the current sickness.
    pub sick_duration: f64,
    /// Consecutive missed meals.
    pub missed_meals: u32,
    /// Health fraction.
    pub health: f64,
    /// Last known position.
    pub position: Position,
}

impl Snapshot {
    /// Capture an entity's current state.
    pub fn of(entity: &Entity) -> Self {
        Self {
            id: entity.id,
            name: entity.name.clone(),
            age_years: entity.age_years,
            job_description: entity.job_description().to_owned(),
            has_home: entity.has_home(),
            sick: entity.sick,
            skill_count: entity.skills.len(),
            life_expectancy_years: entity.life_expectancy_years,
            sick_duration: entity.sick_duration,
            missed_meals: entity.missed_meals,
            health: entity.health,
            position: entity.position,
        }
    }

    /// Age truncated to whole years.
    pub fn whole_years(&self) -> f64 {
        self.age_years.floor()
    }
}

/// The last completed cycle's snapshots, keyed by entity id.
#[derive(Debug, Clone, Default)]
pub struct SnapshotStore {
    snapshots: BTreeMap<EntityId, Snapshot>,
}

impl SnapshotStore {
    /// An empty store, as on first run.
    pub const fn new() -> Self {
        Self {
            snapshots: BTreeMap::new(),
        }
    }

    /// Replace the whole store with one snapshot per enabled entity.
    pub fn capture(&mut self, registry: &EntityRegistry) {
        self.snapshots = registry
            .enabled()
            .map(|entity| (entity.id, Snapshot::of(entity)))
            .collect();
        tracing::debug!(snapshots = self.snapshots.len(), "snapshot store replaced");
    }

    /// Look up the snapshot for an id.
    pub fn get(&self, id: EntityId) -> Option<&Snapshot> {
        self.snapshots.get(&id)
    }

    /// Whether a snapshot exists for an id.
    pub fn contains(&self, id: EntityId) -> bool {
        self.snapshots.contains_key(&id)
    }

    /// Iterate snapshots in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Snapshot> {
        self.snapshots.values()
    }

    /// Number of snapshots held.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use herald_types::Skill;

    fn villager(name: &str) -> Entity {
        Entity {
            id: EntityId::new(),
            name: name.to_owned(),
            enabled: true,
            job: Some("Woodcutter".to_owned()),
            residence: Some("hut-3".to_owned()),
            sick: false,
            sick_duration: 0.0,
            missed_meals: 0,
            health: 0.9,
            age_years: 33.4,
            life_expectancy_years: 71.0,
            position: Position::new(1.0, 0.0, 2.0),
            skills: vec![Skill {
                name: "Forestry".to_owned(),
            }],
            thought: None,
        }
    }

    #[test]
    fn snapshot_copies_compared_fields() {
        let entity = villager("Ada");
        let snap = Snapshot::of(&entity);
        assert_eq!(snap.id, entity.id);
        assert_eq!(snap.job_description, "Woodcutter");
        assert!(snap.has_home);
        assert_eq!(snap.skill_count, 1);
        assert!((snap.whole_years() - 33.0).abs() < f64::EPSILON);
    }

    #[test]
    fn capture_skips_disabled_entities() {
        let mut gone = villager("Bram");
        gone.enabled = false;
        let registry: EntityRegistry = vec![villager("Ada"), gone.clone()].into_iter().collect();

        let mut store = SnapshotStore::new();
        store.capture(&registry);
        assert_eq!(store.len(), 1);
        assert!(!store.contains(gone.id));
    }

    #[test]
    fn capture_replaces_wholesale() {
        let first = villager("Ada");
        let second = villager("Cora");
        let mut store = SnapshotStore::new();

        store.capture(&std::iter::once(first.clone()).collect());
        store.capture(&std::iter::once(second.clone()).collect());

        assert_eq!(store.len(), 1);
        assert!(store.contains(second.id));
        assert!(!store.contains(first.id));
    }
}
