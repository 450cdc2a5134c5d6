//! Entity records as exposed by the host simulation.
//!
//! An [`Entity`] is a read-only view of one villager at the moment the
//! host exported it. The core never mutates these records; it only
//! snapshots them, compares them, and renders them.

use serde::{Deserialize, Serialize};

use crate::ids::EntityId;

/// A point in world space.
///
/// The host uses a Y-up coordinate system: `x` and `z` span the ground
/// plane, `y` is height.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// East-west coordinate.
    pub x: f64,
    /// Height above ground.
    #[serde(default)]
    pub y: f64,
    /// North-south coordinate.
    pub z: f64,
}

impl Position {
    /// Create a position from its three coordinates.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance to another point.
    pub fn distance(&self, other: &Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dz.mul_add(dz, dx.mul_add(dx, dy * dy)).sqrt()
    }
}

/// A named skill held by an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    /// Display name of the skill.
    pub name: String,
}

/// A simulated villager as exported by the host.
///
/// Optional data (job, residence, thought) is modelled with `Option` and
/// defaulted on deserialization so partial exports still load. Renderers
/// substitute placeholders such as "Unemployed" for missing values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Stable unique identifier.
    pub id: EntityId,
    /// Display name.
    pub name: String,
    /// Liveness flag. Disabled entities are invisible to the diff engine.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Job description, possibly containing rich-text markup.
    #[serde(default)]
    pub job: Option<String>,
    /// Reference to the entity's residence, if it has one.
    #[serde(default)]
    pub residence: Option<String>,
    /// Whether the entity is currently sick.
    #[serde(default)]
    pub sick: bool,
    /// How long the current sickness has lasted, in host time units.
    #[serde(default)]
    pub sick_duration: f64,
    /// Number of consecutive missed meals.
    #[serde(default)]
    pub missed_meals: u32,
    /// Health fraction in `[0, 1]`.
    #[serde(default = "default_health")]
    pub health: f64,
    /// Age in years.
    pub age_years: f64,
    /// Life expectancy in years.
    pub life_expectancy_years: f64,
    /// Last known world position.
    #[serde(default)]
    pub position: Position,
    /// Ordered skill list, strongest first.
    #[serde(default)]
    pub skills: Vec<Skill>,
    /// The entity's current thought, possibly containing markup.
    #[serde(default)]
    pub thought: Option<String>,
}

impl Entity {
    /// Whether the entity has a residence.
    pub const fn has_home(&self) -> bool {
        self.residence.is_some()
    }

    /// The raw job description, or an empty string when unemployed.
    pub fn job_description(&self) -> &str {
        self.job.as_deref().unwrap_or("")
    }

    /// Age truncated to whole years.
    pub fn whole_years(&self) -> f64 {
        self.age_years.floor()
    }
}

const fn default_true() -> bool {
    true
}

const fn default_health() -> f64 {
    1.0
}
