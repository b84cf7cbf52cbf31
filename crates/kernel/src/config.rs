//! Tolerances and budgets for detection, grouping and measurement.
//!
//! Every default is the value observed on millimetre-scale parts; none of
//! them is a physical constant, so hosts may override any field.

use serde::{Deserialize, Serialize};

/// Vertex gathering around a clicked point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NeighborhoodConfig {
    /// Vertices farther than this from the query point are ignored.
    pub search_radius: f64,
    /// Vertices farther than this from the query plane are ignored.
    pub plane_tolerance: f64,
}

impl Default for NeighborhoodConfig {
    fn default() -> Self {
        Self {
            search_radius: 5.0,
            plane_tolerance: 0.8,
        }
    }
}

/// RANSAC circle search parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CircleFitConfig {
    pub min_radius: f64,
    pub max_radius: f64,
    /// Radial distance within which a point supports a circle.
    pub inlier_tolerance: f64,
    /// Distinct angular buckets (of 16) a circle must touch to be eligible.
    pub min_buckets: usize,
    /// Fixed number of random triples drawn.
    pub iterations: usize,
    /// Lowest score accepted as a detection.
    pub min_score: f64,
    /// Fewer candidate points than this skips fitting entirely.
    pub min_candidates: usize,
    /// Fixed seed for reproducible searches.
    pub seed: Option<u64>,
}

impl Default for CircleFitConfig {
    fn default() -> Self {
        Self {
            min_radius: 1.2,
            max_radius: 5.5,
            inlier_tolerance: 0.3,
            min_buckets: 8,
            iterations: 100,
            min_score: 0.25,
            min_candidates: 15,
            seed: None,
        }
    }
}

impl CircleFitConfig {
    #[must_use]
    pub const fn with_radius_band(mut self, min_radius: f64, max_radius: f64) -> Self {
        self.min_radius = min_radius;
        self.max_radius = max_radius;
        self
    }

    #[must_use]
    pub const fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    #[must_use]
    pub const fn with_min_score(mut self, min_score: f64) -> Self {
        self.min_score = min_score;
        self
    }

    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Ray-probing flood fill over a planar face.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FloodFillConfig {
    /// Grid pitch in the face plane.
    pub grid_step: f64,
    /// Minimum dot product between hit normal and seed normal.
    pub normal_alignment: f64,
    /// Maximum distance between a hit and its grid test point.
    pub hit_tolerance: f64,
    /// Height above the plane rays are cast from.
    pub probe_height: f64,
    /// Hard cap on grid cells tested.
    pub max_cells: usize,
    /// Fewer accepted samples than this is no footprint.
    pub min_samples: usize,
}

impl Default for FloodFillConfig {
    fn default() -> Self {
        Self {
            grid_step: 0.25,
            normal_alignment: 0.99,
            hit_tolerance: 0.1,
            probe_height: 0.5,
            max_cells: 10_000,
            min_samples: 3,
        }
    }
}

impl FloodFillConfig {
    #[must_use]
    pub const fn with_grid_step(mut self, grid_step: f64) -> Self {
        self.grid_step = grid_step;
        self
    }

    #[must_use]
    pub const fn with_max_cells(mut self, max_cells: usize) -> Self {
        self.max_cells = max_cells;
        self
    }
}

/// Coplanar clustering of features.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupingConfig {
    /// Minimum normal dot product for two features to share a face.
    pub normal_alignment: f64,
    /// Maximum distance from a group's plane.
    pub plane_tolerance: f64,
    /// Maximum separation between chain-connected circles.
    pub chain_distance: f64,
    /// Local x difference below which members are ordered by y instead.
    pub sort_dead_band: f64,
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self {
            normal_alignment: 0.99,
            plane_tolerance: 0.5,
            chain_distance: 50.0,
            sort_dead_band: 0.1,
        }
    }
}

impl GroupingConfig {
    #[must_use]
    pub const fn with_chain_distance(mut self, chain_distance: f64) -> Self {
        self.chain_distance = chain_distance;
        self
    }
}

/// Complete engine configuration.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    pub neighborhood: NeighborhoodConfig,
    pub circle: CircleFitConfig,
    pub flood_fill: FloodFillConfig,
    pub grouping: GroupingConfig,
    pub alignment: AlignmentConfig,
    pub session: SessionTolerances,
}

/// Axis-alignment classification of feature pairs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignmentConfig {
    /// Off-axis components must both stay below this.
    pub tolerance: f64,
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self { tolerance: 0.1 }
    }
}

/// Tolerances applied by the session around the core algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionTolerances {
    /// Circle centers closer than this to a recorded circle are duplicates.
    pub duplicate_distance: f64,
    /// Plane distance for vertices counted in a plane extent.
    pub extent_tolerance: f64,
    /// Padding added to the orientation face extent.
    pub extent_padding: f64,
    /// Padding added to the face-bounds preview extent.
    pub preview_padding: f64,
}

impl Default for SessionTolerances {
    fn default() -> Self {
        Self {
            duplicate_distance: 2.0,
            extent_tolerance: 0.1,
            extent_padding: 1.0,
            preview_padding: 0.5,
        }
    }
}

impl DetectionConfig {
    /// Defaults with a fixed RANSAC seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            circle: CircleFitConfig::default().with_seed(seed),
            ..Self::default()
        }
    }

    /// Parse a (possibly partial) JSON document; missing fields keep defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
