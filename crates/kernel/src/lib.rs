//! Planar feature extraction for triangulated parts.
//!
//! Pure, stateless geometry: given a surface hit and read access to the
//! mesh, locate circular holes, measure flat face footprints, group features
//! by face and measure the distances between them.
//!
//! The host supplies two capabilities:
//! - [`MeshSource`]: world-space vertex positions and normals.
//! - [`SurfaceProbe`]: nearest ray hit on the mesh surface.

pub mod config;
pub mod detect;
pub mod distance;
pub mod fitting;
pub mod footprint;
pub mod geometry;
pub mod grouping;
pub mod mesh;
pub mod sampling;

pub use config::{
    AlignmentConfig, CircleFitConfig, DetectionConfig, FloodFillConfig, GroupingConfig, NeighborhoodConfig,
    SessionTolerances,
};
pub use detect::{Circle, detect_circle, detect_circle_with_rng};
pub use distance::{AlignedDistance, Axis, PairDistance, aligned_distances, footprint_distances, pairwise_distances};
pub use footprint::{FaceFootprint, flood_fill_footprint};
pub use geometry::basis::{EulerAngles, LocalBasis, rotation_degrees};
pub use geometry::point::{Bounds2d, Point2d};
pub use geometry::vector::Vec3;
pub use grouping::{FeatureGroup, PlanarFeature, group_circles, group_footprints};
pub use mesh::{MeshError, MeshSource, SurfaceHit, SurfaceProbe, VertexBuffer};
pub use sampling::{CandidatePoint, PlanarSample, PlaneExtent, plane_extent, sample_neighborhood};
