//! Randomized checks of the diff partition.
//!
//! Each round builds a population, captures it, applies a seeded mix of
//! departures, arrivals, job changes and ageing, then checks that the diff
//! accounts for every id exactly once.

#![allow(clippy::unwrap_used)]

use std::collections::BTreeSet;

use herald_core::diff::{ChangeKind, DiffMode, diff};
use herald_core::snapshot::SnapshotStore;
use herald_types::{Entity, EntityId, EntityRegistry, Position};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

const JOBS: &[&str] = &["Farmer", "Woodcutter", "Hunter", "Fisher", ""];

fn random_villager(rng: &mut SmallRng, n: usize) -> Entity {
    let job = JOBS
        .get(rng.random_range(0..JOBS.len()))
        .copied()
        .unwrap_or_default();
    Entity {
        id: EntityId::new(),
        name: format!("Villager {n}"),
        enabled: true,
        job: (!job.is_empty()).then(|| job.to_owned()),
        residence: rng.random_bool(0.7).then(|| "house".to_owned()),
        sick: rng.random_bool(0.1),
        sick_duration: 0.0,
        missed_meals: 0,
        health: 1.0,
        age_years: rng.random_range(1.0..80.0),
        life_expectancy_years: 75.0,
        position: Position::default(),
        skills: Vec::new(),
        thought: None,
    }
}

fn mutate(rng: &mut SmallRng, registry: &mut EntityRegistry, next_name: &mut usize) {
    let ids: Vec<EntityId> = registry.enabled().map(|e| e.id).collect();
    for id in ids {
        let roll: u32 = rng.random_range(0..100);
        match roll {
            0..=9 => {
                registry.remove(id);
            }
            10..=14 => {
                if let Some(e) = registry.get_mut(id) {
                    e.enabled = false;
                }
            }
            15..=29 => {
                if let Some(e) = registry.get_mut(id) {
                    e.job = Some("Quarry Worker".to_owned());
                }
            }
            30..=44 => {
                if let Some(e) = registry.get_mut(id) {
                    e.age_years += rng.random_range(0.0..2.0);
                }
            }
            _ => {}
        }
    }
    for _ in 0..rng.random_range(0..5) {
        *next_name = next_name.saturating_add(1);
        registry.insert(random_villager(rng, *next_name));
    }
}

#[test]
fn diff_partitions_store_and_population() {
    let mut rng = SmallRng::seed_from_u64(42);

    for round in 0..50 {
        let size = rng.random_range(0..40);
        let mut registry: EntityRegistry = (0..size)
            .map(|n| random_villager(&mut rng, n))
            .collect();
        let mut next_name = size;

        let mut store = SnapshotStore::new();
        store.capture(&registry);
        mutate(&mut rng, &mut registry, &mut next_name);

        let report = diff(&registry, &store, DiffMode::Incremental);

        let changed: BTreeSet<EntityId> = report.changed.iter().map(|c| c.entity.id).collect();
        let removed: BTreeSet<EntityId> = report.removed.iter().copied().collect();
        let current: BTreeSet<EntityId> = registry.enabled().map(|e| e.id).collect();
        let previous: BTreeSet<EntityId> = store.iter().map(|s| s.id).collect();
        let universe: BTreeSet<EntityId> = current.union(&previous).copied().collect();

        assert!(changed.is_disjoint(&removed), "round {round}");
        assert_eq!(changed.len(), report.changed.len(), "round {round}: duplicate changed ids");
        assert_eq!(
            changed
                .len()
                .saturating_add(report.unchanged)
                .saturating_add(removed.len()),
            universe.len(),
            "round {round}"
        );

        for id in current.difference(&previous) {
            assert!(changed.contains(id), "round {round}: new id not flagged");
        }
        for id in &removed {
            assert!(previous.contains(id) && !current.contains(id), "round {round}");
        }
        for c in &report.changed {
            if c.kind == ChangeKind::New {
                assert!(!previous.contains(&c.entity.id), "round {round}");
            }
        }
    }
}

#[test]
fn full_mode_flags_every_enabled_entity() {
    let mut rng = SmallRng::seed_from_u64(7);
    let registry: EntityRegistry = (0..25).map(|n| random_villager(&mut rng, n)).collect();
    let mut store = SnapshotStore::new();
    store.capture(&registry);

    let report = diff(&registry, &store, DiffMode::Full);
    assert_eq!(report.changed.len(), registry.enabled_count());
    assert_eq!(report.unchanged, 0);
    assert!(report.removed.is_empty());
}
