//! Planar neighborhood sampling over a raw vertex buffer.

use tracing::{debug, instrument};

use crate::config::NeighborhoodConfig;
use crate::geometry::basis::LocalBasis;
use crate::geometry::point::{Bounds2d, Point2d};
use crate::geometry::vector::Vec3;
use crate::mesh::MeshSource;

/// A mesh vertex projected into the query plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidatePoint {
    pub local: Point2d,
    pub original: Vec3,
    pub normal: Vec3,
}

/// Vertices near a query plane, all projected through one shared basis.
#[derive(Debug, Clone)]
pub struct PlanarSample {
    pub origin: Vec3,
    pub basis: LocalBasis,
    pub points: Vec<CandidatePoint>,
}

impl PlanarSample {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Local coordinates only, in sampling order.
    pub fn local_points(&self) -> Vec<Point2d> {
        self.points.iter().map(|p| p.local).collect()
    }
}

/// Collect every vertex within `search_radius` of `origin` and within
/// `plane_tolerance` of the plane through `origin` with normal `normal`.
#[instrument(skip(mesh, config), fields(vertices = mesh.vertex_count()))]
pub fn sample_neighborhood<M: MeshSource + ?Sized>(
    mesh: &M,
    origin: Vec3,
    normal: Vec3,
    config: &NeighborhoodConfig,
) -> PlanarSample {
    let basis = LocalBasis::from_normal(normal);
    let mut points = Vec::new();

    for i in 0..mesh.vertex_count() {
        let v = mesh.position(i);
        if v.distance_to(&origin) > config.search_radius {
            continue;
        }
        if basis.height(origin, v).abs() > config.plane_tolerance {
            continue;
        }
        points.push(CandidatePoint {
            local: basis.project(origin, v),
            original: v,
            normal: mesh.normal(i).normalize_or_zero(),
        });
    }

    debug!(candidates = points.len(), "sampled planar neighborhood");

    PlanarSample {
        origin,
        basis,
        points,
    }
}

/// Face-local extent of every vertex lying on a plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneExtent {
    pub origin: Vec3,
    pub basis: LocalBasis,
    pub bounds: Bounds2d,
    pub vertex_count: usize,
}

impl PlaneExtent {
    pub fn width(&self) -> f64 {
        self.bounds.width()
    }

    pub fn height(&self) -> f64 {
        self.bounds.height()
    }

    /// World-space center of the extent rectangle.
    pub fn center(&self) -> Vec3 {
        self.basis.lift(self.origin, self.bounds.center())
    }
}

/// Bounds of all vertices within `tolerance` of the plane through `origin`,
/// with no radius limit, grown by `padding` in each direction.
///
/// Returns `None` when no vertex lies on the plane.
pub fn plane_extent<M: MeshSource + ?Sized>(
    mesh: &M,
    origin: Vec3,
    normal: Vec3,
    tolerance: f64,
    padding: f64,
) -> Option<PlaneExtent> {
    let basis = LocalBasis::from_normal(normal);
    let mut vertex_count = 0;
    let bounds = Bounds2d::from_points(
        (0..mesh.vertex_count())
            .map(|i| mesh.position(i))
            .filter(|v| basis.height(origin, *v).abs() < tolerance)
            .inspect(|_| vertex_count += 1)
            .map(|v| basis.project(origin, v)),
    )?;

    Some(PlaneExtent {
        origin,
        basis,
        bounds: bounds.padded(padding),
        vertex_count,
    })
}
