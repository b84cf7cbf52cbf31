//! Face footprint extraction by ray-probing flood fill.
//!
//! The input mesh is an arbitrary triangle soup with no usable adjacency, so
//! the connected planar region around a seed is segmented by actively casting
//! rays onto a grid in the seed's local frame. A cell belongs to the face when
//! the nearest hit below it is coincident with the grid point and its normal
//! matches the seed normal.

use std::collections::{HashSet, VecDeque};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::config::FloodFillConfig;
use crate::geometry::basis::LocalBasis;
use crate::geometry::point::{Bounds2d, Point2d};
use crate::geometry::vector::Vec3;
use crate::mesh::SurfaceProbe;

/// Rectangular extent of a planar face in its own local frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceFootprint {
    pub normal: Vec3,
    /// Seed point; the origin of the local frame.
    pub anchor: Vec3,
    pub width: f64,
    pub height: f64,
    pub center: Point2d,
    pub bounds: Bounds2d,
    /// Number of grid cells accepted as on the face.
    pub samples: usize,
}

impl FaceFootprint {
    pub fn basis(&self) -> LocalBasis {
        LocalBasis::from_normal(self.normal)
    }

    /// World-space center of the footprint rectangle.
    pub fn center_3d(&self) -> Vec3 {
        self.basis().lift(self.anchor, self.center)
    }

    /// World-space rectangle corners, counter-clockwise in the local frame.
    pub fn corners_3d(&self) -> [Vec3; 4] {
        let basis = self.basis();
        self.bounds.corners().map(|c| basis.lift(self.anchor, c))
    }
}

/// Grow the face around `seed` and measure its bounding rectangle.
///
/// Returns `None` when fewer than `config.min_samples` cells land on the face.
/// At most `config.max_cells` cells are probed.
#[instrument(skip(probe, config))]
pub fn flood_fill_footprint<P: SurfaceProbe + ?Sized>(
    probe: &P,
    seed: Vec3,
    seed_normal: Vec3,
    config: &FloodFillConfig,
) -> Option<FaceFootprint> {
    let basis = LocalBasis::from_normal(seed_normal);
    let step = config.grid_step;

    let mut frontier: VecDeque<(i32, i32)> = VecDeque::new();
    let mut seen: HashSet<(i32, i32)> = HashSet::new();
    let mut accepted: Vec<(i32, i32)> = Vec::new();
    let mut probed = 0usize;

    frontier.push_back((0, 0));
    seen.insert((0, 0));

    while let Some((i, j)) = frontier.pop_front() {
        if probed >= config.max_cells {
            debug!(probed, "flood fill hit the cell cap");
            break;
        }
        probed += 1;

        let local = Point2d::new(i as f64 * step, j as f64 * step);
        let target = basis.lift(seed, local);
        let origin = target + basis.normal * config.probe_height;

        let Some(hit) = probe.cast(origin, -basis.normal) else {
            continue;
        };
        if hit.normal.dot(&basis.normal) <= config.normal_alignment {
            continue;
        }
        if hit.point.distance_to(&target) >= config.hit_tolerance {
            continue;
        }

        accepted.push((i, j));
        for next in [(i + 1, j), (i - 1, j), (i, j + 1), (i, j - 1)] {
            if seen.insert(next) {
                frontier.push_back(next);
            }
        }
    }

    if accepted.len() < config.min_samples {
        debug!(samples = accepted.len(), probed, "too few samples for a footprint");
        return None;
    }

    let bounds = Bounds2d::from_points(
        accepted
            .iter()
            .map(|&(i, j)| Point2d::new(i as f64 * step, j as f64 * step)),
    )?;

    info!(
        samples = accepted.len(),
        probed,
        width = bounds.width(),
        height = bounds.height(),
        "face footprint measured"
    );

    Some(FaceFootprint {
        normal: basis.normal,
        anchor: seed,
        width: bounds.width(),
        height: bounds.height(),
        center: bounds.center(),
        bounds,
        samples: accepted.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::SurfaceHit;

    /// Axis-aligned rectangle on z = 0 facing +Z.
    fn rectangle(x0: f64, y0: f64, x1: f64, y1: f64) -> impl Fn(Vec3, Vec3) -> Option<SurfaceHit> {
        move |origin: Vec3, direction: Vec3| {
            if direction.z >= 0.0 || origin.z < 0.0 {
                return None;
            }
            let inside = origin.x >= x0 && origin.x <= x1 && origin.y >= y0 && origin.y <= y1;
            inside.then(|| SurfaceHit::new(Vec3::new(origin.x, origin.y, 0.0), Vec3::Z))
        }
    }

    #[test]
    fn test_rectangle_footprint() {
        let probe = rectangle(-2.0, -1.0, 2.0, 1.0);
        let fp = flood_fill_footprint(&probe, Vec3::ZERO, Vec3::Z, &FloodFillConfig::default()).unwrap();
        assert!((fp.width - 4.0).abs() < 1e-9);
        assert!((fp.height - 2.0).abs() < 1e-9);
        assert_eq!(fp.samples, 17 * 9);
        assert!((fp.bounds.width() - fp.width).abs() < 1e-12);
        assert!(fp.center_3d().distance_to(&Vec3::ZERO) < 1e-9);
    }

    #[test]
    fn test_off_center_seed_reports_center() {
        let probe = rectangle(0.0, 0.0, 3.0, 1.0);
        let seed = Vec3::new(0.5, 0.5, 0.0);
        let fp = flood_fill_footprint(&probe, seed, Vec3::Z, &FloodFillConfig::default()).unwrap();
        let c = fp.center_3d();
        assert!((c.x - 1.5).abs() < 1e-9);
        assert!((c.y - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_cell_cap_bounds_work_on_open_surface() {
        let calls = std::cell::Cell::new(0usize);
        let infinite = |origin: Vec3, _direction: Vec3| {
            calls.set(calls.get() + 1);
            Some(SurfaceHit::new(Vec3::new(origin.x, origin.y, 0.0), Vec3::Z))
        };
        let config = FloodFillConfig::default().with_max_cells(500);
        let fp = flood_fill_footprint(&infinite, Vec3::ZERO, Vec3::Z, &config).unwrap();
        assert_eq!(calls.get(), 500);
        assert_eq!(fp.samples, 500);
    }

    #[test]
    fn test_misaligned_normal_rejected() {
        let tilted = |origin: Vec3, _direction: Vec3| {
            Some(SurfaceHit::new(
                Vec3::new(origin.x, origin.y, 0.0),
                Vec3::new(0.2, 0.0, 0.98).normalize_or_zero(),
            ))
        };
        assert!(flood_fill_footprint(&tilted, Vec3::ZERO, Vec3::Z, &FloodFillConfig::default()).is_none());
    }

    #[test]
    fn test_distant_hit_rejected() {
        let sunken = |origin: Vec3, _direction: Vec3| Some(SurfaceHit::new(Vec3::new(origin.x, origin.y, -0.2), Vec3::Z));
        assert!(flood_fill_footprint(&sunken, Vec3::ZERO, Vec3::Z, &FloodFillConfig::default()).is_none());
    }

    #[test]
    fn test_too_few_samples() {
        // Only a sliver two cells wide along x, one cell tall.
        let probe = rectangle(-0.1, -0.1, 0.3, 0.1);
        assert!(flood_fill_footprint(&probe, Vec3::ZERO, Vec3::Z, &FloodFillConfig::default()).is_none());
    }
}
