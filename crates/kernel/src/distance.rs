//! Distances between features: axis-aligned hole spacing, plain center
//! distances, and edge separation between face footprints.

use serde::{Deserialize, Serialize};

use crate::footprint::FaceFootprint;
use crate::geometry::vector::Vec3;

/// World axis along which two features are aligned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Axis::X => "X",
            Axis::Y => "Y",
            Axis::Z => "Z",
        };
        f.write_str(name)
    }
}

/// Separation of two features aligned on a single world axis.
///
/// `from` and `to` are positions in the list that was analyzed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlignedDistance {
    pub from: usize,
    pub to: usize,
    pub distance: f64,
    pub axis: Axis,
}

/// Unclassified distance between two features.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PairDistance {
    pub from: usize,
    pub to: usize,
    pub distance: f64,
}

/// Classify the offset `d` as aligned on its dominant axis when both other
/// components are below `tolerance`.
pub fn classify_alignment(d: Vec3, tolerance: f64) -> Option<(Axis, f64)> {
    let a = d.abs();
    let max = a.x.max(a.y).max(a.z);

    if max == a.x && a.y < tolerance && a.z < tolerance {
        Some((Axis::X, a.x))
    } else if max == a.y && a.x < tolerance && a.z < tolerance {
        Some((Axis::Y, a.y))
    } else if max == a.z && a.x < tolerance && a.y < tolerance {
        Some((Axis::Z, a.z))
    } else {
        None
    }
}

/// Every unordered pair of `points` that is aligned on one world axis.
pub fn aligned_distances(points: &[Vec3], tolerance: f64) -> Vec<AlignedDistance> {
    let mut out = Vec::new();
    for i in 0..points.len() {
        for j in (i + 1)..points.len() {
            if let Some((axis, distance)) = classify_alignment(points[j] - points[i], tolerance) {
                out.push(AlignedDistance {
                    from: i,
                    to: j,
                    distance,
                    axis,
                });
            }
        }
    }
    out
}

/// Euclidean distance for every unordered pair of `points`.
pub fn pairwise_distances(points: &[Vec3]) -> Vec<PairDistance> {
    let mut out = Vec::new();
    for i in 0..points.len() {
        for j in (i + 1)..points.len() {
            out.push(PairDistance {
                from: i,
                to: j,
                distance: points[i].distance_to(&points[j]),
            });
        }
    }
    out
}

/// Smallest corner-to-corner distance between two footprint rectangles,
/// measured in the local frame of `a`.
pub fn footprint_separation(a: &FaceFootprint, b: &FaceFootprint) -> f64 {
    let frame = a.basis();
    let a_corners = a.bounds.corners();
    let b_corners = b.corners_3d().map(|c| frame.project(a.anchor, c));

    a_corners
        .iter()
        .flat_map(|p| b_corners.iter().map(move |q| p.distance_to(q)))
        .fold(f64::INFINITY, f64::min)
}

/// Separation for every unordered pair of `footprints`.
pub fn footprint_distances(footprints: &[FaceFootprint]) -> Vec<PairDistance> {
    let mut out = Vec::new();
    for i in 0..footprints.len() {
        for j in (i + 1)..footprints.len() {
            out.push(PairDistance {
                from: i,
                to: j,
                distance: footprint_separation(&footprints[i], &footprints[j]),
            });
        }
    }
    out
}
