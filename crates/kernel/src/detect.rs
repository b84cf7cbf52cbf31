//! Hole detection: neighborhood sampling followed by a RANSAC circle fit.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::config::DetectionConfig;
use crate::fitting::{fit_circle, fit_rng};
use crate::geometry::basis::LocalBasis;
use crate::geometry::vector::Vec3;
use crate::mesh::{MeshSource, SurfaceHit};
use crate::sampling::sample_neighborhood;

/// A circular hole located on a face.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: Vec3,
    pub radius: f64,
    pub normal: Vec3,
    /// Inlier fraction times angular coverage of the winning fit.
    pub quality: f64,
}

impl Circle {
    pub fn diameter(&self) -> f64 {
        self.radius * 2.0
    }

    pub fn basis(&self) -> LocalBasis {
        LocalBasis::from_normal(self.normal)
    }
}

/// Locate a hole rim around `hit` using a caller-supplied random source.
///
/// Returns `None` when too few vertices surround the hit or no circle scores
/// high enough; neither case is an error.
#[instrument(skip(mesh, config, rng))]
pub fn detect_circle_with_rng<M, R>(
    mesh: &M,
    hit: SurfaceHit,
    config: &DetectionConfig,
    rng: &mut R,
) -> Option<Circle>
where
    M: MeshSource + ?Sized,
    R: Rng + ?Sized,
{
    let sample = sample_neighborhood(mesh, hit.point, hit.normal, &config.neighborhood);
    if sample.len() < config.circle.min_candidates {
        debug!(
            candidates = sample.len(),
            required = config.circle.min_candidates,
            "not enough candidate points"
        );
        return None;
    }

    let fit = fit_circle(&sample.local_points(), &config.circle, rng)?;
    let center = sample.basis.lift(sample.origin, fit.center);

    info!(
        radius = fit.radius,
        score = fit.score,
        inliers = fit.inliers,
        buckets = fit.buckets,
        "circle detected"
    );

    Some(Circle {
        center,
        radius: fit.radius,
        normal: sample.basis.normal,
        quality: fit.score,
    })
}

/// Locate a hole rim around `hit`, seeding from `config.circle.seed` when set.
pub fn detect_circle<M: MeshSource + ?Sized>(
    mesh: &M,
    hit: SurfaceHit,
    config: &DetectionConfig,
) -> Option<Circle> {
    let mut rng = fit_rng(&config.circle);
    detect_circle_with_rng(mesh, hit, config, &mut rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::VertexBuffer;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::f64::consts::TAU;

    /// A rim of `count` vertices around `center`, parallel to XY.
    fn rim(center: Vec3, radius: f64, count: usize) -> VertexBuffer {
        let positions: Vec<Vec3> = (0..count)
            .map(|k| {
                let a = TAU * k as f64 / count as f64;
                center + Vec3::new(radius * a.cos(), radius * a.sin(), 0.0)
            })
            .collect();
        let normals = vec![Vec3::Z; positions.len()];
        VertexBuffer::new(positions, normals).unwrap()
    }

    #[test]
    fn test_detects_rim_near_click() {
        let mesh = rim(Vec3::new(10.0, 5.0, 2.0), 2.0, 32);
        let hit = SurfaceHit::new(Vec3::new(12.5, 5.0, 2.0), Vec3::Z);
        let circle = detect_circle(&mesh, hit, &DetectionConfig::seeded(5)).unwrap();
        assert!(circle.center.distance_to(&Vec3::new(10.0, 5.0, 2.0)) < 0.05);
        assert!((circle.radius - 2.0).abs() < 0.05);
        assert!((circle.diameter() - 4.0).abs() < 0.1);
        assert_eq!(circle.normal, Vec3::Z);
        assert!(circle.quality >= 0.25);
    }

    #[test]
    fn test_fewer_than_fifteen_candidates_skips_fit() {
        let mesh = rim(Vec3::ZERO, 2.0, 14);
        let hit = SurfaceHit::new(Vec3::new(2.5, 0.0, 0.0), Vec3::Z);

        // An rng that panics proves the fitter never ran.
        struct Untouchable;
        impl rand::RngCore for Untouchable {
            fn next_u32(&mut self) -> u32 {
                panic!("fit attempted")
            }
            fn next_u64(&mut self) -> u64 {
                panic!("fit attempted")
            }
            fn fill_bytes(&mut self, _dest: &mut [u8]) {
                panic!("fit attempted")
            }
            fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> Result<(), rand::Error> {
                panic!("fit attempted")
            }
        }

        let result = detect_circle_with_rng(&mesh, hit, &DetectionConfig::default(), &mut Untouchable);
        assert!(result.is_none());
    }

    #[test]
    fn test_rim_on_another_plane_is_ignored() {
        let mesh = rim(Vec3::new(0.0, 0.0, 3.0), 2.0, 32);
        let hit = SurfaceHit::new(Vec3::new(2.5, 0.0, 0.0), Vec3::Z);
        let mut rng = StdRng::seed_from_u64(17);
        assert!(detect_circle_with_rng(&mesh, hit, &DetectionConfig::default(), &mut rng).is_none());
    }
}
