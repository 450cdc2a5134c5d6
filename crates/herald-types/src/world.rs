//! World context consulted when inferring why an entity disappeared.
//!
//! The context is a read-only capture of the threats and hazards around
//! the settlement at the time of the cycle: hostile units (dragons),
//! predator dens (wolves), and the deep-water tiles of the terrain grid.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::entity::Position;

/// A tile coordinate on the ground plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    /// Column.
    pub x: u32,
    /// Row.
    pub z: u32,
}

impl TileCoord {
    /// Create a tile coordinate.
    pub const fn new(x: u32, z: u32) -> Self {
        Self { x, z }
    }
}

/// Terrain grid with the set of deep-water tiles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Terrain {
    /// Grid width in tiles.
    pub width: u32,
    /// Grid height in tiles.
    pub height: u32,
    /// Tiles flagged as deep water.
    #[serde(default)]
    pub deep_water: BTreeSet<TileCoord>,
}

impl Terrain {
    /// The tile containing a world position, if it lies on the grid.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn tile_at(&self, position: &Position) -> Option<TileCoord> {
        let x = position.x.floor();
        let z = position.z.floor();
        if x < 0.0 || z < 0.0 || x >= f64::from(self.width) || z >= f64::from(self.height) {
            return None;
        }
        Some(TileCoord::new(x as u32, z as u32))
    }

    /// Whether a tile is deep water.
    pub fn is_deep_water(&self, tile: TileCoord) -> bool {
        self.deep_water.contains(&tile)
    }

    /// Whether any of the four orthogonal neighbours of the tile under
    /// `position` is deep water.
    ///
    /// Tiles on the zero row or column never report water, matching how the
    /// host bounds its neighbour lookup. Neighbours past the far edge are
    /// simply absent from the deep-water set.
    pub fn borders_deep_water(&self, position: &Position) -> bool {
        let Some(tile) = self.tile_at(position) else {
            return false;
        };
        if tile.x == 0 || tile.z == 0 {
            return false;
        }

        [
            TileCoord::new(tile.x.saturating_sub(1), tile.z),
            TileCoord::new(tile.x.saturating_add(1), tile.z),
            TileCoord::new(tile.x, tile.z.saturating_sub(1)),
            TileCoord::new(tile.x, tile.z.saturating_add(1)),
        ]
        .into_iter()
        .any(|n| self.is_deep_water(n))
    }
}

/// Threats and hazards around the settlement for one cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldContext {
    /// Positions of active hostile units.
    #[serde(default)]
    pub hostiles: Vec<Position>,
    /// Positions of predator dens.
    #[serde(default)]
    pub predator_dens: Vec<Position>,
    /// Terrain grid, when the host exports one.
    #[serde(default)]
    pub terrain: Option<Terrain>,
}

impl WorldContext {
    /// Whether any hostile is strictly closer than `radius` to `position`.
    pub fn hostile_within(&self, position: &Position, radius: f64) -> bool {
        self.hostiles.iter().any(|h| h.distance(position) < radius)
    }

    /// Whether any predator den is strictly closer than `radius`.
    pub fn den_within(&self, position: &Position, radius: f64) -> bool {
        self.predator_dens
            .iter()
            .any(|d| d.distance(position) < radius)
    }

    /// Whether the tile under `position` borders deep water.
    pub fn borders_deep_water(&self, position: &Position) -> bool {
        self.terrain
            .as_ref()
            .is_some_and(|t| t.borders_deep_water(position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lake_terrain() -> Terrain {
        let mut deep_water = BTreeSet::new();
        deep_water.insert(TileCoord::new(5, 4));
        Terrain {
            width: 10,
            height: 10,
            deep_water,
        }
    }

    #[test]
    fn neighbour_of_water_is_detected() {
        let terrain = lake_terrain();
        assert!(terrain.borders_deep_water(&Position::new(5.5, 0.0, 5.2)));
        assert!(terrain.borders_deep_water(&Position::new(4.1, 0.0, 4.9)));
    }

    #[test]
    fn diagonal_water_is_ignored() {
        let terrain = lake_terrain();
        assert!(!terrain.borders_deep_water(&Position::new(6.5, 0.0, 5.5)));
    }

    #[test]
    fn edge_tiles_never_report_water() {
        let mut terrain = lake_terrain();
        terrain.deep_water.insert(TileCoord::new(1, 0));
        assert!(!terrain.borders_deep_water(&Position::new(0.5, 0.0, 0.5)));
    }

    #[test]
    fn off_grid_positions_have_no_tile() {
        let terrain = lake_terrain();
        assert!(terrain.tile_at(&Position::new(-1.0, 0.0, 3.0)).is_none());
        assert!(terrain.tile_at(&Position::new(3.0, 0.0, 10.0)).is_none());
    }

    #[test]
    fn hostile_radius_is_strict() {
        let ctx = WorldContext {
            hostiles: vec![Position::new(10.0, 0.0, 0.0)],
            ..WorldContext::default()
        };
        let origin = Position::default();
        assert!(!ctx.hostile_within(&origin, 10.0));
        assert!(ctx.hostile_within(&origin, 10.5));
    }

    #[test]
    fn missing_terrain_means_no_water() {
        let ctx = WorldContext::default();
        assert!(!ctx.borders_deep_water(&Position::new(5.0, 0.0, 5.0)));
    }
}
