//! Per-cycle report composition.
//!
//! A report is one message made of up to three sections, in order:
//!
//! 1. A summary card with the population count and how many entities the
//!    message actually shows.
//! 2. Detail cards, one field per reported entity, sorted by job label and
//!    then name.
//! 3. One card per departed entity with its inferred cause.
//!
//! The summary and detail sections are skipped entirely in incremental
//! mode when nothing changed; in full mode the summary is always present.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use herald_core::cause::Cause;
use herald_core::config::LimitsConfig;
use herald_core::diff::DiffMode;
use herald_core::sanitize::{job_label, truncate};
use herald_core::snapshot::Snapshot;
use herald_types::Entity;

use crate::assembler::{Budget, pack_details};
use crate::card::{Batch, Card, Field, char_len, color};
use crate::render::{SUMMARY_TITLE, departure_card, detail_field};

/// Candidate count above which a per-job breakdown is logged.
const BREAKDOWN_THRESHOLD: usize = 10;

/// A departed entity with its inferred cause.
#[derive(Debug, Clone, Copy)]
pub struct Departure<'a> {
    /// Last captured state.
    pub snapshot: &'a Snapshot,
    /// Inferred cause.
    pub cause: Cause,
}

/// Everything needed to compose one cycle's message.
#[derive(Debug, Clone)]
pub struct ReportRequest<'a> {
    /// Entities flagged by the diff, in any order.
    pub candidates: Vec<&'a Entity>,
    /// Departed entities, in the order they should be reported.
    pub departures: Vec<Departure<'a>>,
    /// Number of enabled entities in the population.
    pub population: usize,
    /// Mode the diff ran in.
    pub mode: DiffMode,
    /// Time stamped on the summary card.
    pub timestamp: DateTime<Utc>,
}

/// A composed message and what made it in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// Cards to send. Empty when there is nothing to report.
    pub batch: Batch,
    /// Candidates before the record cap.
    pub candidates: usize,
    /// Candidates that got a detail field.
    pub shown: usize,
    /// Departure cards included.
    pub departures_sent: usize,
    /// Departure cards dropped for lack of room.
    pub departures_dropped: usize,
}

/// The summary line for `shown` out of `total` entities.
pub fn summary_description(shown: usize, total: usize) -> String {
    if shown < total {
        format!("Total Villagers: {total} (showing {shown} out of {total})")
    } else {
        format!("Total Villagers: {total}")
    }
}

/// Compose a report under the given limits.
pub fn compose(request: ReportRequest<'_>, limits: &LimitsConfig, max_records: usize) -> Report {
    let ReportRequest {
        mut candidates,
        departures,
        population,
        mode,
        timestamp,
    } = request;

    let candidate_count = candidates.len();
    candidates.sort_by_cached_key(|e| (job_label(e.job.as_deref()), e.name.clone()));
    if candidate_count > max_records {
        tracing::warn!(
            limit = max_records,
            candidates = candidate_count,
            "limiting report to configured maximum"
        );
        candidates.truncate(max_records);
    }
    if candidates.len() > BREAKDOWN_THRESHOLD {
        log_job_breakdown(&candidates);
    }

    let mut budget = Budget::from_limits(limits);
    let mut batch = Batch::new();
    let mut shown = 0;

    if limits.max_cards > 0 && (!candidates.is_empty() || mode == DiffMode::Full) {
        let title = truncate(SUMMARY_TITLE, limits.title_len);
        // Room for the longest description the summary can end up with.
        let worst_case = format!("Total Villagers: {population} (showing {population} out of {population})");
        budget.spend(char_len(&title).saturating_add(char_len(&worst_case)));

        let fields: Vec<Field> = candidates.iter().map(|e| detail_field(e, limits)).collect();
        let packed = pack_details(
            fields,
            limits,
            &mut budget,
            limits.max_cards.saturating_sub(1),
        );
        shown = packed.placed;

        let summary = Card::new(title, color::BLUE)
            .with_description(summary_description(shown, population))
            .with_timestamp(timestamp);
        batch.push(summary);
        for card in packed.cards {
            batch.push(card);
        }
    }

    let mut departures_sent: usize = 0;
    for departure in &departures {
        let card = departure_card(departure.snapshot, departure.cause, limits);
        if batch.len() >= limits.max_cards || !budget.try_spend(card.text_len()) {
            break;
        }
        batch.push(card);
        departures_sent = departures_sent.saturating_add(1);
    }
    let departures_dropped = departures.len().saturating_sub(departures_sent);
    if departures_dropped > 0 {
        tracing::warn!(
            dropped = departures_dropped,
            sent = departures_sent,
            "departure cards dropped for this cycle"
        );
    }

    tracing::debug!(
        cards = batch.len(),
        shown,
        candidates = candidate_count,
        text_len = batch.text_len(),
        budget_left = budget.remaining(),
        "report composed"
    );

    Report {
        batch,
        candidates: candidate_count,
        shown,
        departures_sent,
        departures_dropped,
    }
}

fn log_job_breakdown(candidates: &[&Entity]) {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for entity in candidates {
        let count = counts.entry(job_label(entity.job.as_deref())).or_default();
        *count = count.saturating_add(1);
    }
    let mut ordered: Vec<(String, usize)> = counts.into_iter().collect();
    ordered.sort_by_key(|(_, count)| std::cmp::Reverse(*count));
    for (job, count) in ordered {
        tracing::debug!(job = %job, count, "job breakdown");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use herald_types::{EntityId, Position};

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5)
            .single()
            .unwrap_or_default()
    }

    fn villager(name: &str, job: Option<&str>) -> Entity {
        Entity {
            id: EntityId::new(),
            name: name.to_owned(),
            enabled: true,
            job: job.map(str::to_owned),
            residence: None,
            sick: false,
            sick_duration: 0.0,
            missed_meals: 0,
            health: 1.0,
            age_years: 25.0,
            life_expectancy_years: 70.0,
            position: Position::default(),
            skills: Vec::new(),
            thought: None,
        }
    }

    fn request(candidates: Vec<&Entity>, mode: DiffMode) -> ReportRequest<'_> {
        ReportRequest {
            candidates,
            departures: Vec::new(),
            population: 10,
            mode,
            timestamp: at(),
        }
    }

    #[test]
    fn nothing_to_report_in_incremental_mode() {
        let report = compose(request(Vec::new(), DiffMode::Incremental), &LimitsConfig::default(), 25);
        assert!(report.batch.is_empty());
    }

    #[test]
    fn full_mode_always_has_summary() {
        let report = compose(request(Vec::new(), DiffMode::Full), &LimitsConfig::default(), 25);
        assert_eq!(report.batch.len(), 1);
        let summary = report.batch.cards().first().map(|c| c.title.as_str());
        assert_eq!(summary, Some(SUMMARY_TITLE));
    }

    #[test]
    fn candidates_sorted_by_job_then_name() {
        let a = villager("Zed", Some("Farmer"));
        let b = villager("Amy", Some("Hunter"));
        let c = villager("Bob", Some("Farmer"));
        let d = villager("Cat", None);
        let report = compose(
            request(vec![&a, &b, &c, &d], DiffMode::Incremental),
            &LimitsConfig::default(),
            25,
        );
        let names: Vec<&str> = report
            .batch
            .cards()
            .iter()
            .skip(1)
            .flat_map(|card| card.fields.iter().map(|f| f.name.as_str()))
            .collect();
        assert_eq!(names, vec!["Bob", "Zed", "Amy", "Cat"]);
    }

    #[test]
    fn record_cap_is_reflected_in_summary() {
        let people: Vec<Entity> = (0..8).map(|n| villager(&format!("P{n}"), None)).collect();
        let report = compose(
            request(people.iter().collect(), DiffMode::Full),
            &LimitsConfig::default(),
            5,
        );
        assert_eq!(report.candidates, 8);
        assert_eq!(report.shown, 5);
        let description = report.batch.cards().first().and_then(|c| c.description.clone());
        assert_eq!(description.as_deref(), Some("Total Villagers: 10 (showing 5 out of 10)"));
    }

    #[test]
    fn departures_respect_card_limit() {
        let gone: Vec<Snapshot> = (0..12)
            .map(|n| Snapshot::of(&villager(&format!("Gone{n}"), Some("Miner"))))
            .collect();
        let mut req = request(Vec::new(), DiffMode::Incremental);
        req.departures = gone
            .iter()
            .map(|snapshot| Departure {
                snapshot,
                cause: Cause::MiningAccident,
            })
            .collect();
        let report = compose(req, &LimitsConfig::default(), 25);
        assert_eq!(report.batch.len(), 10);
        assert_eq!(report.departures_sent, 10);
        assert_eq!(report.departures_dropped, 2);
    }

    #[test]
    fn summary_description_omits_ratio_when_all_shown() {
        assert_eq!(summary_description(4, 4), "Total Villagers: 4");
        assert_eq!(summary_description(0, 30), "Total Villagers: 30 (showing 0 out of 30)");
    }

    #[test]
    fn zero_card_limit_produces_nothing() {
        let limits = LimitsConfig {
            max_cards: 0,
            ..LimitsConfig::default()
        };
        let ada = villager("Ada", Some("Farmer"));
        let gone = Snapshot::of(&villager("Bram", None));
        let mut req = request(vec![&ada], DiffMode::Full);
        req.departures = vec![Departure {
            snapshot: &gone,
            cause: Cause::Unknown,
        }];
        let report = compose(req, &limits, 25);
        assert!(report.batch.is_empty());
        assert_eq!(report.shown, 0);
        assert_eq!(report.departures_dropped, 1);
    }

    #[test]
    fn fixed_titles_respect_title_limit() {
        let limits = LimitsConfig {
            title_len: 12,
            ..LimitsConfig::default()
        };
        let ada = villager("Ada", Some("Farmer"));
        let report = compose(request(vec![&ada], DiffMode::Full), &limits, 25);
        assert_eq!(report.batch.len(), 2);
        for card in report.batch.cards() {
            assert!(char_len(&card.title) <= 12, "title {:?} too long", card.title);
        }
        let summary = report.batch.cards().first().map(|c| c.title.as_str());
        assert_eq!(summary, Some("Villager ..."));
    }
}
