//! Shared type definitions for the Herald roster notifier.
//!
//! This crate is the single source of truth for the records that flow
//! between the host simulation, the diff engine, and the webhook layer.
//! Everything here is read-only data; behavior lives in `herald-core`
//! and `herald-webhook`.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrapper for entity identifiers
//! - [`entity`] -- Entity records as exposed by the host simulation
//! - [`registry`] -- Owned id-keyed entity collection with liveness flags
//! - [`world`] -- World context consulted by the cause classifier
//! - [`feed`] -- Authoritative event feed records
//! - [`events`] -- Host lifecycle events published on the event bus

pub mod entity;
pub mod events;
pub mod feed;
pub mod ids;
pub mod registry;
pub mod world;

// Re-export all public types at crate root for convenience.
pub use entity::{Entity, Position, Skill};
pub use events::HostEvent;
pub use feed::FeedEvent;
pub use ids::EntityId;
pub use registry::EntityRegistry;
pub use world::{Terrain, TileCoord, WorldContext};
