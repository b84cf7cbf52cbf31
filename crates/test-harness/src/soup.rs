//! Triangle soup meshes: the shape a loaded model file arrives in.
//!
//! Every triangle carries its own three vertices and a flat face normal, with
//! no shared indices, the same layout an STL loader hands the host.

use feature_kernel::{MeshSource, SurfaceHit, SurfaceProbe, Vec3, VertexBuffer};

use crate::helpers::HarnessError;

const RAY_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub vertices: [Vec3; 3],
    pub normal: Vec3,
}

impl Triangle {
    /// Build a triangle wound so that its normal points along `outward`.
    pub fn facing(a: Vec3, b: Vec3, c: Vec3, outward: Vec3) -> Self {
        let n = (b - a).cross(&(c - a)).normalize_or_zero();
        if n.dot(&outward) < 0.0 {
            Self {
                vertices: [a, c, b],
                normal: -n,
            }
        } else {
            Self {
                vertices: [a, b, c],
                normal: n,
            }
        }
    }

    /// Möller–Trumbore intersection; returns the ray parameter of the hit.
    /// Edges are inclusive so rays through a shared edge still land.
    pub fn intersect(&self, origin: Vec3, direction: Vec3) -> Option<f64> {
        let [v0, v1, v2] = self.vertices;
        let edge1 = v1 - v0;
        let edge2 = v2 - v0;

        let h = direction.cross(&edge2);
        let a = edge1.dot(&h);
        if a.abs() < RAY_EPSILON {
            return None;
        }

        let f = 1.0 / a;
        let s = origin - v0;
        let u = f * s.dot(&h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(&edge1);
        let v = f * direction.dot(&q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = f * edge2.dot(&q);
        (t > RAY_EPSILON).then_some(t)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriangleSoup {
    pub triangles: Vec<Triangle>,
}

impl TriangleSoup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    pub fn push(&mut self, a: Vec3, b: Vec3, c: Vec3, outward: Vec3) {
        self.triangles.push(Triangle::facing(a, b, c, outward));
    }

    /// Two triangles covering the quad `a b c d`.
    pub fn push_quad(&mut self, a: Vec3, b: Vec3, c: Vec3, d: Vec3, outward: Vec3) {
        self.push(a, b, c, outward);
        self.push(a, c, d, outward);
    }

    pub fn extend(&mut self, other: TriangleSoup) {
        self.triangles.extend(other.triangles);
    }

    pub fn translated(mut self, offset: Vec3) -> Self {
        for tri in &mut self.triangles {
            for v in &mut tri.vertices {
                *v += offset;
            }
        }
        self
    }

    /// Axis-aligned bounding box as `(min, max)`.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let mut vertices = self.triangles.iter().flat_map(|t| t.vertices);
        let first = vertices.next()?;
        Some(vertices.fold((first, first), |(lo, hi), v| {
            (
                Vec3::new(lo.x.min(v.x), lo.y.min(v.y), lo.z.min(v.z)),
                Vec3::new(hi.x.max(v.x), hi.y.max(v.y), hi.z.max(v.z)),
            )
        }))
    }

    /// Flatten to the host's vertex arrays, one flat normal per corner.
    pub fn to_vertex_buffer(&self) -> Result<VertexBuffer, HarnessError> {
        let mut positions = Vec::with_capacity(self.len() * 9);
        let mut normals = Vec::with_capacity(self.len() * 9);
        for tri in &self.triangles {
            for v in tri.vertices {
                positions.extend([v.x as f32, v.y as f32, v.z as f32]);
                normals.extend([tri.normal.x as f32, tri.normal.y as f32, tri.normal.z as f32]);
            }
        }
        Ok(VertexBuffer::from_flat(&positions, &normals)?)
    }
}

impl MeshSource for TriangleSoup {
    fn vertex_count(&self) -> usize {
        self.triangles.len() * 3
    }

    fn position(&self, index: usize) -> Vec3 {
        self.triangles[index / 3].vertices[index % 3]
    }

    fn normal(&self, index: usize) -> Vec3 {
        self.triangles[index / 3].normal
    }
}

/// Brute-force nearest hit over every triangle.
impl SurfaceProbe for TriangleSoup {
    fn cast(&self, origin: Vec3, direction: Vec3) -> Option<SurfaceHit> {
        self.triangles
            .iter()
            .filter_map(|tri| tri.intersect(origin, direction).map(|t| (t, tri.normal)))
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(t, normal)| SurfaceHit::new(origin + direction * t, normal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> TriangleSoup {
        let mut soup = TriangleSoup::new();
        soup.push_quad(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::Z,
        );
        soup
    }

    #[test]
    fn test_facing_flips_winding() {
        let tri = Triangle::facing(Vec3::ZERO, Vec3::X, Vec3::Y, -Vec3::Z);
        assert_eq!(tri.normal, -Vec3::Z);
        let n = (tri.vertices[1] - tri.vertices[0]).cross(&(tri.vertices[2] - tri.vertices[0]));
        assert!(n.z < 0.0);
    }

    #[test]
    fn test_cast_hits_nearest() {
        let mut soup = unit_square();
        soup.extend(unit_square().translated(Vec3::new(0.0, 0.0, -2.0)));
        let hit = soup.cast(Vec3::new(0.5, 0.5, 5.0), -Vec3::Z).unwrap();
        assert!(hit.point.distance_to(&Vec3::new(0.5, 0.5, 0.0)) < 1e-12);
        assert_eq!(hit.normal, Vec3::Z);
    }

    #[test]
    fn test_cast_on_shared_edge() {
        let hit = unit_square().cast(Vec3::new(0.5, 0.5, 1.0), -Vec3::Z);
        assert!(hit.is_some());
    }

    #[test]
    fn test_cast_misses() {
        assert!(unit_square().cast(Vec3::new(2.0, 0.5, 1.0), -Vec3::Z).is_none());
        assert!(unit_square().cast(Vec3::new(0.5, 0.5, 1.0), Vec3::Z).is_none());
    }

    #[test]
    fn test_mesh_source_layout() {
        let soup = unit_square();
        assert_eq!(soup.vertex_count(), 6);
        assert_eq!(soup.position(4), soup.triangles[1].vertices[1]);
        let buffer = soup.to_vertex_buffer().unwrap();
        assert_eq!(buffer.vertex_count(), 6);
        assert_eq!(buffer.normal(5), Vec3::Z);
    }

    #[test]
    fn test_bounds() {
        let (lo, hi) = unit_square().translated(Vec3::new(1.0, 2.0, 3.0)).bounds().unwrap();
        assert_eq!(lo, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(hi, Vec3::new(2.0, 3.0, 3.0));
        assert!(TriangleSoup::new().bounds().is_none());
    }
}
