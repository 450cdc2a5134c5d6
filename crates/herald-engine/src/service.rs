//! The Herald service: one notification cycle per tick.
//!
//! [`Herald`] owns the snapshot store and is its only writer. Each cycle
//! reads the population, diffs it against the store, classifies the
//! departures, composes and seals a message, hands it to the sink on a
//! spawned task, and finally replaces the store. The tick loop awaits each
//! cycle before starting the next, so cycles never overlap; deliveries do
//! not block the loop.

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use herald_core::cause::{CauseContext, EventFeed, StaticFeed, classify};
use herald_core::config::{HeraldConfig, LimitsConfig};
use herald_core::diff::{DiffMode, diff};
use herald_core::snapshot::SnapshotStore;
use herald_types::HostEvent;
use herald_webhook::card::Batch;
use herald_webhook::render::startup_card;
use herald_webhook::{DeliveryOutcome, Departure, ReportRequest, Sink, compose, seal};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::source::{WorldExport, WorldSource};

/// Why a cycle did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The world export could not be loaded.
    SourceUnavailable,
    /// No enabled entities and nothing remembered from earlier cycles.
    EmptyPopulation,
    /// The message could not be serialized.
    SealFailed,
}

/// What a cycle did.
#[derive(Debug)]
pub enum CycleOutcome {
    /// Nothing was processed.
    Skipped(SkipReason),
    /// The cycle completed with nothing to send.
    Quiet,
    /// A message was handed to the sink.
    Dispatched {
        /// Cards in the message.
        cards: usize,
        /// Entities shown in detail cards.
        shown: usize,
        /// Departure cards included.
        departures: usize,
        /// The in-flight delivery.
        delivery: JoinHandle<DeliveryOutcome>,
    },
}

/// The notification service.
#[derive(Debug)]
pub struct Herald {
    store: SnapshotStore,
    sink: Sink,
    limits: LimitsConfig,
    max_records: usize,
    full_updates: bool,
    tick_interval: Duration,
    username: Option<String>,
    cycles: u64,
}

impl Herald {
    /// Build a service from configuration and a sink. The store starts
    /// empty, so the first cycle reports every entity as new.
    pub fn new(config: &HeraldConfig, sink: Sink) -> Self {
        Self {
            store: SnapshotStore::new(),
            sink,
            limits: config.limits,
            max_records: config.report.max_records,
            full_updates: config.schedule.full_updates,
            tick_interval: Duration::from_secs(config.schedule.tick_interval_secs.max(1)),
            username: config.webhook.username.clone(),
            cycles: 0,
        }
    }

    /// The current snapshot store.
    pub const fn store(&self) -> &SnapshotStore {
        &self.store
    }

    /// Completed cycles so far.
    pub const fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Send the startup announcement.
    pub fn announce(&self, config: &HeraldConfig, now: DateTime<Utc>) -> Option<JoinHandle<DeliveryOutcome>> {
        self.dispatch(Batch::single(startup_card(config, now)), "startup")
    }

    /// Load the population and run one cycle.
    pub async fn tick(&mut self, source: &WorldSource, force_full: bool) -> CycleOutcome {
        match source.load().await {
            Ok(export) => self.run_cycle(export, force_full, Utc::now()),
            Err(e) => {
                warn!(error = %e, "world export unavailable, cycle skipped");
                CycleOutcome::Skipped(SkipReason::SourceUnavailable)
            }
        }
    }

    /// Run one cycle against an already-loaded export.
    pub fn run_cycle(&mut self, export: WorldExport, force_full: bool, now: DateTime<Utc>) -> CycleOutcome {
        let (registry, world, feed) = export.into_parts();
        let population = registry.enabled_count();
        if population == 0 && self.store.is_empty() {
            debug!("no enabled entities, cycle skipped");
            return CycleOutcome::Skipped(SkipReason::EmptyPopulation);
        }

        let mode = if force_full || self.full_updates {
            DiffMode::Full
        } else {
            DiffMode::Incremental
        };
        let report = diff(&registry, &self.store, mode);
        for change in &report.changed {
            debug!(entity = %change.entity.id, name = %change.entity.name, reason = change.kind.as_str(), "entity flagged");
        }

        let feed = feed.map(StaticFeed::new);
        let ctx = CauseContext {
            world: &world,
            feed: feed.as_ref().map(|f| f as &dyn EventFeed),
        };
        let departures: Vec<Departure<'_>> = report
            .removed
            .iter()
            .filter_map(|id| self.store.get(*id))
            .map(|snapshot| Departure {
                snapshot,
                cause: classify(snapshot, &ctx),
            })
            .collect();

        let composed = compose(
            ReportRequest {
                candidates: report.changed.iter().map(|c| c.entity).collect(),
                departures,
                population,
                mode,
                timestamp: now,
            },
            &self.limits,
            self.max_records,
        );

        let outcome = if composed.batch.is_empty() {
            CycleOutcome::Quiet
        } else {
            let cards = composed.batch.len();
            match self.dispatch(composed.batch, "cycle") {
                Some(delivery) => CycleOutcome::Dispatched {
                    cards,
                    shown: composed.shown,
                    departures: composed.departures_sent,
                    delivery,
                },
                None => return CycleOutcome::Skipped(SkipReason::SealFailed),
            }
        };

        self.store.capture(&registry);
        self.cycles = self.cycles.saturating_add(1);
        info!(
            cycle = self.cycles,
            mode = ?mode,
            population,
            changed = report.changed.len(),
            removed = report.removed.len(),
            "cycle complete"
        );
        outcome
    }

    /// Seal a batch and deliver it on its own task.
    fn dispatch(&self, batch: Batch, context: &'static str) -> Option<JoinHandle<DeliveryOutcome>> {
        let payload = match seal(batch, self.username.as_deref(), self.limits.payload_hard_cap) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(error = %e, context, "failed to serialize message");
                return None;
            }
        };
        debug!(context, cards = payload.cards, bytes = payload.byte_len(), sink = self.sink.name(), "dispatching");
        let sink = self.sink.clone();
        Some(tokio::spawn(async move {
            let outcome = sink.deliver(&payload).await;
            outcome.log(context);
            outcome
        }))
    }

    /// Drive cycles until `shutdown` resolves.
    ///
    /// Regular cycles run every tick interval, starting one interval after
    /// the call. A [`HostEvent::FullUpdateRequested`] runs a full cycle
    /// immediately.
    pub async fn run(
        mut self,
        source: WorldSource,
        mut events: broadcast::Receiver<HostEvent>,
        shutdown: impl Future<Output = ()>,
    ) {
        let mut ticker = tokio::time::interval(self.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // First tick completes immediately.
        ticker.tick().await;
        tokio::pin!(shutdown);

        info!(interval_secs = self.tick_interval.as_secs(), "tick loop started");
        loop {
            tokio::select! {
                () = &mut shutdown => {
                    info!(cycles = self.cycles, "shutdown requested, tick loop stopped");
                    break;
                }
                _ = ticker.tick() => {
                    self.tick(&source, false).await;
                }
                event = events.recv() => match event {
                    Ok(HostEvent::FullUpdateRequested) => {
                        info!("manual full update requested");
                        self.tick(&source, true).await;
                    }
                    Ok(HostEvent::EntityCreated { id }) => debug!(entity = %id, "entity created"),
                    Ok(HostEvent::EntityRemoved { id }) => debug!(entity = %id, "entity removed"),
                    Ok(HostEvent::BecameSick { .. }) => {}
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "tick loop lagged behind host events");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        info!("host event bus closed, tick loop stopped");
                        break;
                    }
                },
            }
        }
    }
}
