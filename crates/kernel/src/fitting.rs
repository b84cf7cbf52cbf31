//! RANSAC circle fitting on face-local 2D points.
//!
//! Draws random point triples, fits the circumcircle of each, and scores it by
//! inlier fraction times angular coverage. Angular coverage keeps a short arc
//! or a tight cluster from passing as a hole rim.

use std::f64::consts::{PI, TAU};

use rand::Rng;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, instrument};

use crate::config::CircleFitConfig;
use crate::geometry::point::Point2d;

/// Number of equal angular bins spanning a full turn.
pub const ANGULAR_BUCKETS: usize = 16;

/// Determinant magnitude below which a triple is treated as collinear.
const COLLINEAR_EPSILON: f64 = 1e-6;

/// Best-supported circle found in the plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleFit2d {
    pub center: Point2d,
    pub radius: f64,
    /// Inlier fraction times bucket coverage, in `[0, 1]`.
    pub score: f64,
    pub inliers: usize,
    pub buckets: usize,
}

/// Circle through three points, or `None` if they are (nearly) collinear.
///
/// Solves the perpendicular-bisector system in closed form.
pub fn circumcircle(p1: Point2d, p2: Point2d, p3: Point2d) -> Option<(Point2d, f64)> {
    let temp = p2.x * p2.x + p2.y * p2.y;
    let bc = (p1.x * p1.x + p1.y * p1.y - temp) / 2.0;
    let cd = (temp - p3.x * p3.x - p3.y * p3.y) / 2.0;
    let det = (p1.x - p2.x) * (p2.y - p3.y) - (p2.x - p3.x) * (p1.y - p2.y);

    if det.abs() < COLLINEAR_EPSILON {
        return None;
    }

    let cx = (bc * (p2.y - p3.y) - cd * (p1.y - p2.y)) / det;
    let cy = ((p1.x - p2.x) * cd - (p2.x - p3.x) * bc) / det;
    let center = Point2d::new(cx, cy);
    Some((center, center.distance_to(&p1)))
}

/// Angular bin of the direction `(dx, dy)`, in `0..ANGULAR_BUCKETS`.
pub fn angular_bucket(dx: f64, dy: f64) -> usize {
    let t = (dy.atan2(dx) + PI) * ANGULAR_BUCKETS as f64 / TAU;
    (t.floor() as usize).min(ANGULAR_BUCKETS - 1)
}

/// Inlier count and distinct bucket count of `points` against a circle.
pub fn circle_support(points: &[Point2d], center: Point2d, radius: f64, tolerance: f64) -> (usize, usize) {
    let mut touched = [false; ANGULAR_BUCKETS];
    let mut inliers = 0;

    for p in points {
        let dx = p.x - center.x;
        let dy = p.y - center.y;
        let dist = (dx * dx + dy * dy).sqrt();
        if (dist - radius).abs() < tolerance {
            touched[angular_bucket(dx, dy)] = true;
            inliers += 1;
        }
    }

    (inliers, touched.iter().filter(|t| **t).count())
}

/// Random source for a fit: seeded when the config pins a seed.
pub fn fit_rng(config: &CircleFitConfig) -> StdRng {
    match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Search for the best-supported circle among `points`.
///
/// Runs exactly `config.iterations` draws. A candidate is eligible only once
/// it touches `config.min_buckets` buckets; the best eligible candidate is
/// returned if its score reaches `config.min_score`.
#[instrument(skip(points, config, rng), fields(points = points.len()))]
pub fn fit_circle<R: Rng + ?Sized>(
    points: &[Point2d],
    config: &CircleFitConfig,
    rng: &mut R,
) -> Option<CircleFit2d> {
    let n = points.len();
    if n < 3 {
        return None;
    }

    let mut best: Option<CircleFit2d> = None;
    let mut best_score = 0.0;

    for _ in 0..config.iterations {
        let picks = rand::seq::index::sample(rng, n, 3);
        let Some((center, radius)) =
            circumcircle(points[picks.index(0)], points[picks.index(1)], points[picks.index(2)])
        else {
            continue;
        };

        if radius < config.min_radius || radius > config.max_radius {
            continue;
        }

        let (inliers, buckets) = circle_support(points, center, radius, config.inlier_tolerance);
        let score = (inliers as f64 / n as f64) * (buckets as f64 / ANGULAR_BUCKETS as f64);

        if score > best_score && buckets >= config.min_buckets {
            best_score = score;
            best = Some(CircleFit2d {
                center,
                radius,
                score,
                inliers,
                buckets,
            });
        }
    }

    match best {
        Some(fit) if fit.score >= config.min_score => Some(fit),
        _ => {
            debug!(best_score, "no circle reached the score threshold");
            None
        }
    }
}
