//! Core tracking logic for the Herald roster notifier.
//!
//! Everything in this crate is synchronous and free of I/O except the
//! configuration loader and the event bus. The tick loop in
//! `herald-engine` drives the pieces in this order each cycle:
//!
//! 1. [`diff::diff`] compares the live registry against the
//!    [`snapshot::SnapshotStore`].
//! 2. Removed entities are passed through [`cause::classify`].
//! 3. Text destined for cards goes through [`sanitize::sanitize`].
//! 4. After the batch is handed off, [`snapshot::SnapshotStore::capture`]
//!    replaces the store wholesale.
//!
//! # Modules
//!
//! - [`bus`] -- Broadcast channel for host events
//! - [`cause`] -- Ordered rule table inferring why an entity disappeared
//! - [`config`] -- YAML configuration with env overrides
//! - [`diff`] -- Change detection between cycles
//! - [`sanitize`] -- Markup stripping, truncation, placeholder labels
//! - [`snapshot`] -- Per-cycle entity captures

pub mod bus;
pub mod cause;
pub mod config;
pub mod diff;
pub mod sanitize;
pub mod snapshot;

pub use cause::{Cause, CauseContext, EventFeed, FeedError, StaticFeed, classify};
pub use config::{ConfigError, HeraldConfig, Inactive, LimitsConfig};
pub use diff::{ChangeKind, ChangedEntity, DiffMode, DiffReport, diff};
pub use bus::EventBus;
pub use snapshot::{Snapshot, SnapshotStore};
