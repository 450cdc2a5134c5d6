//! Out-of-band notifications for urgent host events.
//!
//! Sickness is reported the moment the host publishes it instead of
//! waiting for the next tick. Each event produces one single-card message.

use herald_core::config::LimitsConfig;
use herald_types::{Entity, HostEvent};
use herald_webhook::render::sick_card;
use herald_webhook::{Batch, DeliveryOutcome, Sink, seal};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Send the sickness card for one entity.
///
/// Returns `None` when the entity is disabled or no longer sick, or when
/// the card could not be serialized.
pub async fn notify_sick(
    entity: &Entity,
    sink: &Sink,
    limits: &LimitsConfig,
    username: Option<&str>,
) -> Option<DeliveryOutcome> {
    if !entity.enabled || !entity.sick {
        debug!(entity = %entity.id, "sickness event for healthy or disabled entity ignored");
        return None;
    }
    let batch = Batch::single(sick_card(entity, limits));
    let payload = match seal(batch, username, limits.payload_hard_cap) {
        Ok(payload) => payload,
        Err(e) => {
            warn!(error = %e, entity = %entity.id, "failed to serialize sickness card");
            return None;
        }
    };
    let outcome = sink.deliver(&payload).await;
    outcome.log("sickness");
    Some(outcome)
}

/// Listen on the bus and send a card for every [`HostEvent::BecameSick`].
///
/// Each card is sent on its own task, so a slow endpoint never delays the
/// next event.
pub fn spawn_urgent_notifier(
    mut events: broadcast::Receiver<HostEvent>,
    sink: Sink,
    limits: LimitsConfig,
    username: Option<String>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(HostEvent::BecameSick { entity }) => {
                    let sink = sink.clone();
                    let username = username.clone();
                    tokio::spawn(async move {
                        notify_sick(&entity, &sink, &limits, username.as_deref()).await;
                    });
                }
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "urgent notifier lagged behind host events");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
        info!("urgent notifier stopped");
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use herald_core::bus::EventBus;
    use herald_types::{EntityId, Position};
    use herald_webhook::MemorySink;

    fn patient(sick: bool) -> Entity {
        Entity {
            id: EntityId::new(),
            name: "Ada".to_owned(),
            enabled: true,
            job: Some("Herbalist".to_owned()),
            residence: Some("Cottage".to_owned()),
            sick,
            sick_duration: 1.0,
            missed_meals: 0,
            health: 0.8,
            age_years: 31.4,
            life_expectancy_years: 70.0,
            position: Position::default(),
            skills: Vec::new(),
            thought: Some("I feel <b>terrible</b>".to_owned()),
        }
    }

    async fn wait_for_sent(memory: &MemorySink, count: usize) -> Vec<herald_webhook::SealedPayload> {
        for _ in 0..100 {
            let sent = memory.sent().await;
            if sent.len() >= count {
                return sent;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        memory.sent().await
    }

    #[tokio::test]
    async fn sick_entity_is_reported() {
        let memory = MemorySink::new();
        let sink = Sink::Memory(memory.clone());
        let outcome = notify_sick(&patient(true), &sink, &LimitsConfig::default(), None).await;
        assert_eq!(outcome, Some(DeliveryOutcome::Delivered));
        let sent = memory.sent().await;
        assert_eq!(sent.len(), 1);
        let body = &sent.first().unwrap().json;
        assert!(body.contains("Villager Became Sick"));
        assert!(body.contains("I feel **terrible**"));
    }

    #[tokio::test]
    async fn healthy_entity_is_ignored() {
        let memory = MemorySink::new();
        let sink = Sink::Memory(memory.clone());
        let outcome = notify_sick(&patient(false), &sink, &LimitsConfig::default(), None).await;
        assert!(outcome.is_none());
        assert!(memory.sent().await.is_empty());
    }

    #[tokio::test]
    async fn notifier_stops_when_bus_closes() {
        let memory = MemorySink::new();
        let bus = EventBus::new();
        let task = spawn_urgent_notifier(
            bus.subscribe(),
            Sink::Memory(memory.clone()),
            LimitsConfig::default(),
            Some("Herald".to_owned()),
        );
        bus.publish(HostEvent::BecameSick {
            entity: Box::new(patient(true)),
        });
        bus.publish(HostEvent::FullUpdateRequested);
        drop(bus);
        task.await.unwrap();

        let sent = wait_for_sent(&memory, 1).await;
        assert_eq!(sent.len(), 1);
        assert!(sent.first().unwrap().json.contains("\"username\":\"Herald\""));
    }

    #[tokio::test]
    async fn stalled_delivery_does_not_block_later_cards() {
        let memory = MemorySink::new();
        let bus = EventBus::new();
        let task = spawn_urgent_notifier(
            bus.subscribe(),
            Sink::Memory(memory.clone()),
            LimitsConfig::default(),
            None,
        );

        // Hold the recorder's lock so the first delivery cannot finish.
        let stall = memory.hold().await;
        bus.publish(HostEvent::BecameSick {
            entity: Box::new(patient(true)),
        });
        bus.publish(HostEvent::BecameSick {
            entity: Box::new(patient(true)),
        });
        drop(bus);
        // The listener drains both events while every send is still pending.
        tokio::time::timeout(std::time::Duration::from_secs(1), task)
            .await
            .unwrap()
            .unwrap();
        drop(stall);

        assert_eq!(wait_for_sent(&memory, 2).await.len(), 2);
    }
}
