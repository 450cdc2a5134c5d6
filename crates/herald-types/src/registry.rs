//! Owned, id-keyed collection of entities.
//!
//! The host keeps villagers in an index-addressable array with a parallel
//! liveness flag. [`EntityRegistry`] replaces that with a [`BTreeMap`]
//! from stable [`EntityId`] to record, so iteration order is the id order
//! and never depends on array slots being reused.

use std::collections::BTreeMap;

use crate::entity::Entity;
use crate::ids::EntityId;

/// The live entity population for one cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityRegistry {
    entities: BTreeMap<EntityId, Entity>,
}

impl EntityRegistry {
    /// Create an empty registry.
    pub const fn new() -> Self {
        Self {
            entities: BTreeMap::new(),
        }
    }

    /// Insert or replace an entity, keyed by its id.
    ///
    /// Returns the previous record for that id, if any.
    pub fn insert(&mut self, entity: Entity) -> Option<Entity> {
        self.entities.insert(entity.id, entity)
    }

    /// Remove an entity by id.
    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        self.entities.remove(&id)
    }

    /// Look up an entity by id, regardless of its liveness flag.
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Mutable lookup, used by hosts and tests to evolve state.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// Iterate every enabled entity in id order.
    pub fn enabled(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values().filter(|e| e.enabled)
    }

    /// Look up an entity only if it is enabled.
    pub fn get_enabled(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id).filter(|e| e.enabled)
    }

    /// Number of enabled entities.
    pub fn enabled_count(&self) -> usize {
        self.enabled().count()
    }

    /// Total number of records, enabled or not.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the registry holds no records at all.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl FromIterator<Entity> for EntityRegistry {
    fn from_iter<I: IntoIterator<Item = Entity>>(iter: I) -> Self {
        Self {
            entities: iter.into_iter().map(|e| (e.id, e)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Position;

    fn villager(name: &str, enabled: bool) -> Entity {
        Entity {
            id: EntityId::new(),
            name: name.to_owned(),
            enabled,
            job: None,
            residence: None,
            sick: false,
            sick_duration: 0.0,
            missed_meals: 0,
            health: 1.0,
            age_years: 20.0,
            life_expectancy_years: 70.0,
            position: Position::default(),
            skills: Vec::new(),
            thought: None,
        }
    }

    #[test]
    fn enabled_iteration_skips_disabled() {
        let registry: EntityRegistry = vec![
            villager("Ada", true),
            villager("Bram", false),
            villager("Cora", true),
        ]
        .into_iter()
        .collect();

        assert_eq!(registry.len(), 3);
        assert_eq!(registry.enabled_count(), 2);
        assert!(registry.enabled().all(|e| e.name != "Bram"));
    }

    #[test]
    fn insert_replaces_by_id() {
        let mut registry = EntityRegistry::new();
        let mut ada = villager("Ada", true);
        let id = ada.id;
        assert!(registry.insert(ada.clone()).is_none());

        ada.name = "Ada the Elder".to_owned();
        let previous = registry.insert(ada);
        assert_eq!(previous.map(|e| e.name), Some("Ada".to_owned()));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(id).map(|e| e.name.as_str()), Some("Ada the Elder"));
    }

    #[test]
    fn get_enabled_hides_disabled_records() {
        let mut registry = EntityRegistry::new();
        let bram = villager("Bram", false);
        let id = bram.id;
        registry.insert(bram);
        assert!(registry.get(id).is_some());
        assert!(registry.get_enabled(id).is_none());
    }
}
