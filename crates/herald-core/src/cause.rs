//! Inference of why an entity disappeared.
//!
//! The host never says outright why a villager left the roster, so the
//! classifier works from the entity's last known state plus whatever the
//! world around it looked like. Rules are evaluated in a fixed order and
//! the first match wins:
//!
//! 1. Authoritative event feed, when one is attached
//! 2. Age band near or past life expectancy
//! 3. Advanced sickness
//! 4. Missed meals
//! 5. Low health
//! 6. Hostile unit nearby
//! 7. Predator den nearby
//! 8. Deep water next to the last tile
//! 9. Dangerous job keyword
//! 10. Fallback
//!
//! Feed failures never escape; they are logged and the feed rule simply
//! does not match.

use herald_types::{FeedEvent, WorldContext};

use crate::snapshot::Snapshot;

/// Distance within which a hostile unit is blamed.
pub const HOSTILE_RADIUS: f64 = 10.0;

/// Distance within which a predator den is blamed.
pub const PREDATOR_DEN_RADIUS: f64 = 15.0;

/// Sickness lasting longer than this is treated as fatal.
pub const FATAL_SICK_DURATION: f64 = 8.0;

/// Health below this fraction is treated as fatal.
pub const POOR_HEALTH_THRESHOLD: f64 = 0.2;

/// Entities this close to their life expectancy are considered old.
pub const LIFE_EXPECTANCY_MARGIN_YEARS: f64 = 5.0;

/// Entities at least this old are considered old regardless of expectancy.
pub const OLD_AGE_YEARS: f64 = 65.0;

/// Version of the event-code vocabulary this classifier understands.
pub const FEED_CODE_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Cause
// ---------------------------------------------------------------------------

/// The inferred reason an entity left the population.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cause {
    /// Killed by a hostile unit.
    HostileAttack,
    /// Killed by predators.
    PredatorAttack,
    /// Died of plague.
    Plague,
    /// Starved.
    Starvation,
    /// Died aged 90 or more.
    ExtremeOldAge,
    /// Died aged 80 or more.
    VeryOldAge,
    /// Died aged 70 or more.
    OldAge,
    /// Died old, but younger than 70.
    NaturalCauses,
    /// Health collapsed.
    PoorHealth,
    /// Drowned.
    Drowning,
    /// Accident while felling trees.
    WoodcuttingAccident,
    /// Accident at a quarry.
    StonecuttingAccident,
    /// Accident while digging a moat.
    MoatConstructionAccident,
    /// Accident building walls or towers.
    ConstructionAccident,
    /// Accident in a mine.
    MiningAccident,
    /// Accident while hunting.
    HuntingAccident,
    /// Nothing matched.
    Unknown,
}

impl Cause {
    /// Human-readable label shown on cards.
    pub const fn label(self) -> &'static str {
        match self {
            Self::HostileAttack => "Hostile Attack",
            Self::PredatorAttack => "Predator Attack",
            Self::Plague => "Plague",
            Self::Starvation => "Starvation",
            Self::ExtremeOldAge => "Extreme Old Age (90+ years)",
            Self::VeryOldAge => "Very Old Age (80+ years)",
            Self::OldAge => "Old Age (70+ years)",
            Self::NaturalCauses => "Natural Causes",
            Self::PoorHealth => "Poor Health",
            Self::Drowning => "Drowning",
            Self::WoodcuttingAccident => "Woodcutting Accident",
            Self::StonecuttingAccident => "Stonecutting Accident",
            Self::MoatConstructionAccident => "Moat Construction Accident",
            Self::ConstructionAccident => "Construction Accident",
            Self::MiningAccident => "Mining Accident",
            Self::HuntingAccident => "Hunting Accident",
            Self::Unknown => "Unknown Causes",
        }
    }

    /// Map an event-feed code to a cause, if the code is recognized.
    pub fn from_feed_code(code: &str) -> Option<Self> {
        match code {
            "dragonkill" => Some(Self::HostileAttack),
            "starvedeath" => Some(Self::Starvation),
            "plaguedeath" => Some(Self::Plague),
            other if other.contains("wolf") && other.contains("kill") => {
                Some(Self::PredatorAttack)
            }
            _ => None,
        }
    }
}

impl core::fmt::Display for Cause {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Event feed
// ---------------------------------------------------------------------------

/// Errors raised by an event feed.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// The feed could not be read.
    #[error("event feed unavailable: {reason}")]
    Unavailable {
        /// What went wrong.
        reason: String,
    },

    /// The feed speaks a different code vocabulary.
    #[error("event feed code version {found} is not supported (expected {expected})")]
    UnsupportedVersion {
        /// Version reported by the feed.
        found: u32,
        /// Version this classifier understands.
        expected: u32,
    },
}

/// Authoritative source of recent events, queried by subject name.
pub trait EventFeed: Send + Sync {
    /// Version of the code vocabulary the feed emits.
    fn code_version(&self) -> u32 {
        FEED_CODE_VERSION
    }

    /// Recent events about `subject`, most relevant first.
    fn events_for(&self, subject: &str) -> Result<Vec<FeedEvent>, FeedError>;
}

/// An in-memory feed, loaded from the host export or built in tests.
#[derive(Debug, Clone, Default)]
pub struct StaticFeed {
    events: Vec<FeedEvent>,
}

impl StaticFeed {
    /// Wrap a list of feed entries.
    pub const fn new(events: Vec<FeedEvent>) -> Self {
        Self { events }
    }
}

impl EventFeed for StaticFeed {
    fn events_for(&self, subject: &str) -> Result<Vec<FeedEvent>, FeedError> {
        Ok(self
            .events
            .iter()
            .filter(|e| e.subject == subject)
            .cloned()
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Everything outside the entity that the classifier may consult.
#[derive(Clone, Copy)]
pub struct CauseContext<'a> {
    /// Threats and terrain at the time of the cycle.
    pub world: &'a WorldContext,
    /// Optional authoritative feed.
    pub feed: Option<&'a dyn EventFeed>,
}

impl<'a> CauseContext<'a> {
    /// A context with no event feed.
    pub const fn without_feed(world: &'a WorldContext) -> Self {
        Self { world, feed: None }
    }
}

impl core::fmt::Debug for CauseContext<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CauseContext")
            .field("world", self.world)
            .field("feed", &self.feed.is_some())
            .finish()
    }
}

/// A single classification rule.
pub type CauseRule = fn(&Snapshot, &CauseContext<'_>) -> Option<Cause>;

/// The ordered rule table. The first rule returning `Some` decides.
pub const CAUSE_RULES: &[(&str, CauseRule)] = &[
    ("event_feed", feed_rule),
    ("age", age_rule),
    ("sickness", sickness_rule),
    ("starvation", starvation_rule),
    ("poor_health", poor_health_rule),
    ("hostile", hostile_rule),
    ("predator_den", predator_rule),
    ("drowning", drowning_rule),
    ("job", job_rule),
];

/// Classify a removed entity from its last known state.
pub fn classify(snapshot: &Snapshot, ctx: &CauseContext<'_>) -> Cause {
    for (rule, check) in CAUSE_RULES {
        if let Some(cause) = check(snapshot, ctx) {
            tracing::debug!(
                entity = %snapshot.id,
                name = %snapshot.name,
                rule = rule,
                cause = cause.label(),
                "cause inferred"
            );
            return cause;
        }
    }
    Cause::Unknown
}

fn feed_rule(snapshot: &Snapshot, ctx: &CauseContext<'_>) -> Option<Cause> {
    let feed = ctx.feed?;
    match lookup_feed(feed, &snapshot.name) {
        Ok(cause) => cause,
        Err(e) => {
            tracing::warn!(name = %snapshot.name, error = %e, "event feed lookup failed");
            None
        }
    }
}

fn lookup_feed(feed: &dyn EventFeed, subject: &str) -> Result<Option<Cause>, FeedError> {
    let found = feed.code_version();
    if found != FEED_CODE_VERSION {
        return Err(FeedError::UnsupportedVersion {
            found,
            expected: FEED_CODE_VERSION,
        });
    }
    Ok(feed
        .events_for(subject)?
        .iter()
        .find_map(|e| Cause::from_feed_code(&e.code.to_lowercase())))
}

fn age_rule(snapshot: &Snapshot, _ctx: &CauseContext<'_>) -> Option<Cause> {
    let age = snapshot.age_years;
    let near_expectancy = age >= snapshot.life_expectancy_years - LIFE_EXPECTANCY_MARGIN_YEARS;
    if !near_expectancy && age < OLD_AGE_YEARS {
        return None;
    }
    Some(if age >= 90.0 {
        Cause::ExtremeOldAge
    } else if age >= 80.0 {
        Cause::VeryOldAge
    } else if age >= 70.0 {
        Cause::OldAge
    } else {
        Cause::NaturalCauses
    })
}

fn sickness_rule(snapshot: &Snapshot, _ctx: &CauseContext<'_>) -> Option<Cause> {
    (snapshot.sick && snapshot.sick_duration > FATAL_SICK_DURATION).then_some(Cause::Plague)
}

fn starvation_rule(snapshot: &Snapshot, _ctx: &CauseContext<'_>) -> Option<Cause> {
    (snapshot.missed_meals > 1).then_some(Cause::Starvation)
}

fn poor_health_rule(snapshot: &Snapshot, _ctx: &CauseContext<'_>) -> Option<Cause> {
    (snapshot.health < POOR_HEALTH_THRESHOLD).then_some(Cause::PoorHealth)
}

fn hostile_rule(snapshot: &Snapshot, ctx: &CauseContext<'_>) -> Option<Cause> {
    ctx.world
        .hostile_within(&snapshot.position, HOSTILE_RADIUS)
        .then_some(Cause::HostileAttack)
}

fn predator_rule(snapshot: &Snapshot, ctx: &CauseContext<'_>) -> Option<Cause> {
    ctx.world
        .den_within(&snapshot.position, PREDATOR_DEN_RADIUS)
        .then_some(Cause::PredatorAttack)
}

fn drowning_rule(snapshot: &Snapshot, ctx: &CauseContext<'_>) -> Option<Cause> {
    ctx.world
        .borders_deep_water(&snapshot.position)
        .then_some(Cause::Drowning)
}

/// Job keywords, lowercase, checked in order.
const JOB_HAZARDS: &[(&[&str], Cause)] = &[
    (&["wood", "tree", "forest"], Cause::WoodcuttingAccident),
    (&["ston", "quarry"], Cause::StonecuttingAccident),
    (&["moat"], Cause::MoatConstructionAccident),
    (&["wall", "tower"], Cause::ConstructionAccident),
    (&["mine"], Cause::MiningAccident),
    (&["hunt"], Cause::HuntingAccident),
];

fn job_rule(snapshot: &Snapshot, _ctx: &CauseContext<'_>) -> Option<Cause> {
    if snapshot.job_description.is_empty() {
        return None;
    }
    let job = snapshot.job_description.to_lowercase();
    JOB_HAZARDS
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| job.contains(k)))
        .map(|(_, cause)| *cause)
}
