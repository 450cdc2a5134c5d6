//! Entity and snapshot to card conversion.
//!
//! Every renderer applies the endpoint's per-part length limits itself, so
//! a card leaving this module is always individually valid. Missing data
//! is rendered with placeholders ("Unemployed", "Homeless", "None").

use chrono::{DateTime, Utc};
use herald_core::cause::Cause;
use herald_core::config::{HeraldConfig, LimitsConfig};
use herald_core::sanitize::{job_label, sanitize, truncate};
use herald_core::snapshot::Snapshot;
use herald_types::Entity;

use crate::card::{Card, Field, color};

/// Placeholder for empty optional values.
pub const NONE: &str = "None";

/// Longest thought shown on a card.
pub const THOUGHT_LEN: usize = 50;

/// Skills listed per entity.
pub const SKILLS_SHOWN: usize = 2;

/// Title of the per-cycle summary card.
pub const SUMMARY_TITLE: &str = "Villager Status Report";

/// Title prefix of detail cards. The `(i/n)` suffix is added once the card
/// count is known.
pub const DETAIL_TITLE: &str = "Villagers";

/// Warning field added when a message is collapsed to fit the hard cap.
pub const OVERSIZE_WARNING_NAME: &str = "⚠️ Warning";

/// Body of the collapse warning.
pub const OVERSIZE_WARNING_VALUE: &str = "Message was too large for Discord and had to be truncated. \
Try reducing the maximum villager count in settings.";

/// The first [`SKILLS_SHOWN`] skill names, or [`NONE`].
pub fn skills_summary(entity: &Entity) -> String {
    let names: Vec<&str> = entity
        .skills
        .iter()
        .take(SKILLS_SHOWN)
        .map(|s| s.name.as_str())
        .collect();
    if names.is_empty() {
        NONE.to_owned()
    } else {
        names.join(", ")
    }
}

/// The entity's current thought, sanitized and clamped, or [`NONE`].
pub fn thought_summary(entity: &Entity) -> String {
    let thought = entity.thought.as_deref().map(sanitize).unwrap_or_default();
    if thought.is_empty() {
        NONE.to_owned()
    } else {
        truncate(&thought, THOUGHT_LEN)
    }
}

/// One detail field describing an entity.
pub fn detail_field(entity: &Entity, limits: &LimitsConfig) -> Field {
    let home = if entity.has_home() { "Has Home" } else { "Homeless" };
    let health = if entity.sick { "Sick" } else { "Healthy" };
    let value = format!(
        "**Age:** {} years\n**Job:** {}\n**Status:** {home}, {health}\n**Skills:** {}\n**Thoughts:** {}",
        entity.whole_years(),
        job_label(entity.job.as_deref()),
        skills_summary(entity),
        thought_summary(entity),
    );
    Field::new(
        truncate(&entity.name, limits.field_name_len),
        truncate(&value, limits.field_value_len),
        false,
    )
}

/// The card announcing a departed entity and its inferred cause.
pub fn departure_card(snapshot: &Snapshot, cause: Cause, limits: &LimitsConfig) -> Card {
    let job = job_label(Some(&snapshot.job_description));
    let description = format!(
        "A villager has left or died.\n**Name:** {}\n**Age:** {} years\n**Profession:** {job}\n**Cause:** {}",
        snapshot.name,
        snapshot.whole_years(),
        cause.label(),
    );
    Card::new(
        truncate(&format!("Villager Lost: {}", snapshot.name), limits.title_len),
        color::RED,
    )
    .with_description(truncate(&description, limits.description_len))
}

/// The urgent card sent when an entity falls ill.
pub fn sick_card(entity: &Entity, limits: &LimitsConfig) -> Card {
    let description = format!("**{}** has fallen ill and needs medical attention!", entity.name);
    let value = |text: String| truncate(&text, limits.field_value_len);
    Card::new(truncate("🤒 Villager Became Sick", limits.title_len), color::ORANGE)
        .with_description(truncate(&description, limits.description_len))
        .with_field(Field::new("Health Status", "Sick - Requires medical care", true))
        .with_field(Field::new("Job", value(job_label(entity.job.as_deref())), true))
        .with_field(Field::new("Age", format!("{} years", entity.whole_years()), true))
        .with_field(Field::new("Skills", value(skills_summary(entity)), true))
        .with_field(Field::new("Thoughts", thought_summary(entity), true))
}

/// The card announcing that the service is running.
pub fn startup_card(config: &HeraldConfig, started_at: DateTime<Utc>) -> Card {
    let mode = if config.schedule.full_updates {
        "Full Updates"
    } else {
        "Changed Villagers Only"
    };
    let limits = &config.limits;
    Card::new(truncate("🏰 Villager Herald Started", limits.title_len), color::PURPLE)
        .with_description("Herald is now watching your settlement and will report roster changes.")
        .with_field(Field::new(
            "Update Interval",
            format!("{} seconds", config.schedule.tick_interval_secs),
            true,
        ))
        .with_field(Field::new("Update Mode", mode, true))
        .with_field(Field::new(
            "Max Villagers",
            config.report.max_records.to_string(),
            true,
        ))
        .with_field(Field::new(
            "Started",
            started_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            true,
        ))
        .with_footer(truncate("Experimental", limits.footer_len))
}
