//! Change detection between two cycles.
//!
//! [`diff`] compares the live [`EntityRegistry`] against the previous
//! cycle's [`SnapshotStore`] and partitions every id into changed,
//! unchanged, or removed. Only a handful of fields count as a change; see
//! [`ChangeKind`] for the list, checked in declaration order.

use herald_types::{Entity, EntityId, EntityRegistry};

use crate::snapshot::{Snapshot, SnapshotStore};

/// Whether change detection runs or every entity is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffMode {
    /// Report only entities that changed since the last cycle.
    Incremental,
    /// Report every enabled entity.
    Full,
}

/// The first reason an entity was flagged as changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    /// No snapshot existed for this id.
    New,
    /// Job description differs.
    Job,
    /// Gained or lost a residence.
    Home,
    /// Fell sick or recovered.
    Health,
    /// Number of skills differs.
    Skills,
    /// Whole-year age went up.
    Birthday,
    /// Reported because the cycle runs in full mode.
    Full,
}

impl ChangeKind {
    /// Short name for logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Job => "job",
            Self::Home => "home",
            Self::Health => "health",
            Self::Skills => "skills",
            Self::Birthday => "birthday",
            Self::Full => "full",
        }
    }
}

/// An entity flagged for reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangedEntity<'a> {
    /// The live entity.
    pub entity: &'a Entity,
    /// Why it was flagged.
    pub kind: ChangeKind,
}

/// Outcome of one diff pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiffReport<'a> {
    /// Entities to report, in id order.
    pub changed: Vec<ChangedEntity<'a>>,
    /// Ids present in the store but no longer enabled, in id order.
    pub removed: Vec<EntityId>,
    /// Enabled entities with a snapshot and no reportable change.
    pub unchanged: usize,
}

impl DiffReport<'_> {
    /// Whether nothing changed and nothing was removed.
    pub fn is_quiet(&self) -> bool {
        self.changed.is_empty() && self.removed.is_empty()
    }
}

/// Compare the live population against the last snapshots.
pub fn diff<'a>(registry: &'a EntityRegistry, store: &SnapshotStore, mode: DiffMode) -> DiffReport<'a> {
    let mut report = DiffReport::default();

    for entity in registry.enabled() {
        let kind = match (mode, store.get(entity.id)) {
            (DiffMode::Full, _) => Some(ChangeKind::Full),
            (DiffMode::Incremental, None) => Some(ChangeKind::New),
            (DiffMode::Incremental, Some(previous)) => change_between(previous, entity),
        };
        match kind {
            Some(kind) => report.changed.push(ChangedEntity { entity, kind }),
            None => report.unchanged = report.unchanged.saturating_add(1),
        }
    }

    report.removed = store
        .iter()
        .filter(|snap| registry.get_enabled(snap.id).is_none())
        .map(|snap| snap.id)
        .collect();

    tracing::debug!(
        mode = ?mode,
        changed = report.changed.len(),
        unchanged = report.unchanged,
        removed = report.removed.len(),
        "diff complete"
    );

    report
}

/// The first reportable difference between a snapshot and the live entity.
///
/// A missing job and an empty job description compare equal. Swapping one
/// skill for another without changing the count is not a change.
pub fn change_between(previous: &Snapshot, current: &Entity) -> Option<ChangeKind> {
    if previous.job_description != current.job_description() {
        Some(ChangeKind::Job)
    } else if previous.has_home != current.has_home() {
        Some(ChangeKind::Home)
    } else if previous.sick != current.sick {
        Some(ChangeKind::Health)
    } else if previous.skill_count != current.skills.len() {
        Some(ChangeKind::Skills)
    } else if current.whole_years() > previous.whole_years() {
        Some(ChangeKind::Birthday)
    } else {
        None
    }
}
