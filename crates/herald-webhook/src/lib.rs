//! Card rendering, batch packing, and delivery for the Herald roster
//! notifier.
//!
//! The webhook endpoint accepts messages of up to ten cards ("embeds")
//! under a nest of length, count, and byte limits. This crate turns the
//! output of a diff pass into messages that respect every one of them:
//!
//! - [`render`] builds individual fields and cards from entities
//! - [`assembler`] greedily packs fields into cards under a text budget
//! - [`report`] composes the per-cycle summary, detail, and departure cards
//! - [`batch`] serializes a batch and collapses it if it is still too big
//! - [`sink`] posts the payload and categorizes the response
//!
//! # Modules
//!
//! - [`assembler`] -- Budgeted greedy packing of detail fields
//! - [`batch`] -- Final serialization and hard-cap guard
//! - [`card`] -- Card, field, and batch model with size accounting
//! - [`error`] -- Error types
//! - [`render`] -- Entity and snapshot to card conversion
//! - [`report`] -- Per-cycle report composition
//! - [`sink`] -- HTTP delivery with categorized outcomes

pub mod assembler;
pub mod batch;
pub mod card;
pub mod error;
pub mod render;
pub mod report;
pub mod sink;

pub use batch::{SealedPayload, seal};
pub use card::{Batch, Card, Field};
pub use error::WebhookError;
pub use report::{Departure, Report, ReportRequest, compose};
pub use sink::{DeliveryOutcome, MemorySink, Sink, WebhookSink};
