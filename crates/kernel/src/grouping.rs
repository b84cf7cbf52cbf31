//! Clustering of features into coplanar face groups.
//!
//! Grouping is a greedy single pass in input order. A feature joins the first
//! group whose first member shares its normal and plane. Circles must also be
//! chain-connected to some member, so two holes on the same infinite plane but
//! on physically separate faces of the part stay apart.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::config::GroupingConfig;
use crate::detect::Circle;
use crate::footprint::FaceFootprint;
use crate::geometry::basis::LocalBasis;
use crate::geometry::point::Point2d;
use crate::geometry::vector::Vec3;
use crate::mesh::SurfaceHit;

/// Anything that lies on a plane and can be grouped by face.
pub trait PlanarFeature {
    fn normal(&self) -> Vec3;

    /// A representative point on the feature's plane.
    fn anchor(&self) -> Vec3;
}

impl PlanarFeature for Circle {
    fn normal(&self) -> Vec3 {
        self.normal
    }

    fn anchor(&self) -> Vec3 {
        self.center
    }
}

impl PlanarFeature for FaceFootprint {
    fn normal(&self) -> Vec3 {
        self.normal
    }

    fn anchor(&self) -> Vec3 {
        self.center_3d()
    }
}

impl PlanarFeature for SurfaceHit {
    fn normal(&self) -> Vec3 {
        self.normal
    }

    fn anchor(&self) -> Vec3 {
        self.point
    }
}

impl<T: PlanarFeature + ?Sized> PlanarFeature for &T {
    fn normal(&self) -> Vec3 {
        (**self).normal()
    }

    fn anchor(&self) -> Vec3 {
        (**self).anchor()
    }
}

/// Indices of features sharing one face, in display order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureGroup {
    /// Positions in the slice that was grouped.
    pub members: Vec<usize>,
    /// Normal of the member that founded the group.
    pub normal: Vec3,
}

impl FeatureGroup {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Whether `feature` lies on the plane of `reference`.
pub fn is_coplanar<A, B>(reference: &A, feature: &B, config: &GroupingConfig) -> bool
where
    A: PlanarFeature + ?Sized,
    B: PlanarFeature + ?Sized,
{
    let n = reference.normal();
    if n.dot(&feature.normal()) <= config.normal_alignment {
        return false;
    }
    (feature.anchor() - reference.anchor()).dot(&n).abs() < config.plane_tolerance
}

/// Index of the first group whose founding member is coplanar with `feature`.
pub fn find_coplanar_group<T, F>(
    groups: &[FeatureGroup],
    features: &[T],
    feature: &F,
    config: &GroupingConfig,
) -> Option<usize>
where
    T: PlanarFeature,
    F: PlanarFeature + ?Sized,
{
    groups.iter().position(|g| {
        g.members
            .first()
            .is_some_and(|&first| is_coplanar(&features[first], feature, config))
    })
}

/// Group circles by face, requiring chain connectivity within a group, and
/// order each group by its position in the face plane.
#[instrument(skip_all, fields(circles = circles.len()))]
pub fn group_circles<T: PlanarFeature>(circles: &[T], config: &GroupingConfig) -> Vec<FeatureGroup> {
    let mut groups = cluster(circles, config, true);
    for group in &mut groups {
        sort_in_plane(group, circles, config.sort_dead_band);
    }
    debug!(groups = groups.len(), "grouped circles by face");
    groups
}

/// Group face footprints by plane alone.
///
/// Footprints are large and sparse; two samples of one flat region taken from
/// opposite ends can be far apart, so no connectivity is required.
#[instrument(skip_all, fields(footprints = footprints.len()))]
pub fn group_footprints<T: PlanarFeature>(footprints: &[T], config: &GroupingConfig) -> Vec<FeatureGroup> {
    let groups = cluster(footprints, config, false);
    debug!(groups = groups.len(), "grouped footprints by face");
    groups
}

fn cluster<T: PlanarFeature>(features: &[T], config: &GroupingConfig, chained: bool) -> Vec<FeatureGroup> {
    let mut groups: Vec<FeatureGroup> = Vec::new();

    for (index, feature) in features.iter().enumerate() {
        let joined = groups.iter_mut().find(|group| {
            let first = &features[group.members[0]];
            if !is_coplanar(first, feature, config) {
                return false;
            }
            !chained || is_chain_connected(group, features, feature, config)
        });

        match joined {
            Some(group) => group.members.push(index),
            None => groups.push(FeatureGroup {
                members: vec![index],
                normal: feature.normal(),
            }),
        }
    }

    groups
}

fn is_chain_connected<T: PlanarFeature>(
    group: &FeatureGroup,
    features: &[T],
    feature: &T,
    config: &GroupingConfig,
) -> bool {
    let n = features[group.members[0]].normal();
    group.members.iter().any(|&m| {
        let v = feature.anchor() - features[m].anchor();
        v.length() < config.chain_distance && v.dot(&n).abs() < config.plane_tolerance
    })
}

/// Order by local x, falling back to local y when x differs by at most
/// `dead_band`. The dead band makes the relation non-transitive, so a plain
/// insertion sort is used instead of `sort_by`.
fn sort_in_plane<T: PlanarFeature>(group: &mut FeatureGroup, features: &[T], dead_band: f64) {
    let Some(&first) = group.members.first() else {
        return;
    };
    let origin = features[first].anchor();
    let basis = LocalBasis::from_normal(group.normal);
    let local = |i: usize| -> Point2d { basis.project(origin, features[i].anchor()) };
    let precedes = |a: Point2d, b: Point2d| {
        if (a.x - b.x).abs() > dead_band {
            a.x < b.x
        } else {
            a.y < b.y
        }
    };

    let members = &mut group.members;
    for i in 1..members.len() {
        let mut j = i;
        while j > 0 && precedes(local(members[j]), local(members[j - 1])) {
            members.swap(j, j - 1);
            j -= 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn circle(x: f64, y: f64, z: f64, normal: Vec3) -> Circle {
        Circle {
            center: Vec3::new(x, y, z),
            radius: 2.0,
            normal,
            quality: 1.0,
        }
    }

    #[test]
    fn test_split_at_chain_distance() {
        let config = GroupingConfig::default();
        let near = [circle(0.0, 0.0, 0.0, Vec3::Z), circle(49.0, 0.0, 0.0, Vec3::Z)];
        assert_eq!(group_circles(&near, &config).len(), 1);

        let far = [circle(0.0, 0.0, 0.0, Vec3::Z), circle(51.0, 0.0, 0.0, Vec3::Z)];
        assert_eq!(group_circles(&far, &config).len(), 2);
    }

    #[test]
    fn test_chain_links_distant_members() {
        let circles = [
            circle(0.0, 0.0, 0.0, Vec3::Z),
            circle(40.0, 0.0, 0.0, Vec3::Z),
            circle(80.0, 0.0, 0.0, Vec3::Z),
        ];
        let groups = group_circles(&circles, &GroupingConfig::default());
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].len(), 3);
    }

    #[test]
    fn test_normals_and_planes_separate_groups() {
        let circles = [
            circle(0.0, 0.0, 0.0, Vec3::Z),
            circle(5.0, 0.0, 0.0, Vec3::X),
            circle(5.0, 0.0, 3.0, Vec3::Z),
            circle(10.0, 0.0, 0.2, Vec3::Z),
        ];
        let groups = group_circles(&circles, &GroupingConfig::default());
        let members: Vec<Vec<usize>> = groups.iter().map(|g| g.members.clone()).collect();
        assert_eq!(members.len(), 3);
        assert!(members.iter().any(|m| m.len() == 2 && m.contains(&0) && m.contains(&3)));
        assert_eq!(groups[1].normal, Vec3::X);
    }

    #[test]
    fn test_members_sorted_in_plane() {
        // Z frame: tangent -X, bitangent -Y, so larger world x sorts first.
        let circles = [
            circle(0.0, 0.0, 0.0, Vec3::Z),
            circle(10.0, 0.0, 0.0, Vec3::Z),
            circle(10.05, 5.0, 0.0, Vec3::Z),
            circle(5.0, 0.0, 0.0, Vec3::Z),
        ];
        let groups = group_circles(&circles, &GroupingConfig::default());
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].members, vec![2, 1, 3, 0]);
    }

    #[test]
    fn test_footprints_group_without_connectivity() {
        let footprint = |x: f64| FaceFootprint {
            normal: Vec3::Z,
            anchor: Vec3::new(x, 0.0, 1.0),
            width: 1.0,
            height: 1.0,
            center: Point2d::ORIGIN,
            bounds: crate::geometry::point::Bounds2d::new(Point2d::new(-0.5, -0.5), Point2d::new(0.5, 0.5)),
            samples: 25,
        };
        let fps = [footprint(0.0), footprint(200.0)];
        let groups = group_footprints(&fps, &GroupingConfig::default());
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].members, vec![0, 1]);

        let circles = [circle(0.0, 0.0, 1.0, Vec3::Z), circle(200.0, 0.0, 1.0, Vec3::Z)];
        assert_eq!(group_circles(&circles, &GroupingConfig::default()).len(), 2);
    }

    #[test]
    fn test_find_coplanar_group() {
        let circles = [circle(0.0, 0.0, 0.0, Vec3::Z), circle(0.0, 0.0, 0.0, Vec3::Y)];
        let groups = group_circles(&circles, &GroupingConfig::default());
        let probe = circle(100.0, 100.0, 0.3, Vec3::Z);
        assert_eq!(find_coplanar_group(&groups, &circles, &probe, &GroupingConfig::default()), Some(0));
        let off = circle(0.0, 0.0, 1.0, Vec3::Z);
        assert_eq!(find_coplanar_group(&groups, &circles, &off, &GroupingConfig::default()), None);
    }

    #[test]
    fn test_empty_input() {
        let none: [Circle; 0] = [];
        assert!(group_circles(&none, &GroupingConfig::default()).is_empty());
    }
}
