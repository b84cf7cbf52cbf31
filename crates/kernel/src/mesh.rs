//! Capability traits the engine needs from the host's mesh and renderer.
//!
//! The engine never owns scene state. It reads world-space vertex data through
//! [`MeshSource`] and probes the surface through [`SurfaceProbe`]; any backend
//! satisfying those contracts (a brute-force triangle scan, a BVH, a GPU
//! picker) is interchangeable.

use serde::{Deserialize, Serialize};

use crate::geometry::vector::Vec3;

/// Errors raised while assembling mesh buffers.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MeshError {
    #[error("vertex buffer has {positions} positions but {normals} normals")]
    MismatchedNormals { positions: usize, normals: usize },
    #[error("flat {buffer} buffer has {len} floats, not a multiple of 3")]
    RaggedBuffer { buffer: &'static str, len: usize },
}

/// Read access to world-space vertex positions and per-vertex normals.
pub trait MeshSource {
    fn vertex_count(&self) -> usize;

    fn position(&self, index: usize) -> Vec3;

    fn normal(&self, index: usize) -> Vec3;
}

/// Nearest intersection of a ray with the mesh surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceHit {
    pub point: Vec3,
    pub normal: Vec3,
}

impl SurfaceHit {
    pub fn new(point: Vec3, normal: Vec3) -> Self {
        Self { point, normal }
    }
}

/// Ray-cast oracle over the mesh surface.
pub trait SurfaceProbe {
    /// Nearest hit along `direction` from `origin`, if any.
    fn cast(&self, origin: Vec3, direction: Vec3) -> Option<SurfaceHit>;
}

impl<F> SurfaceProbe for F
where
    F: Fn(Vec3, Vec3) -> Option<SurfaceHit>,
{
    fn cast(&self, origin: Vec3, direction: Vec3) -> Option<SurfaceHit> {
        self(origin, direction)
    }
}

/// Flat world-space vertex buffer, one normal per position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VertexBuffer {
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
}

impl VertexBuffer {
    pub fn new(positions: Vec<Vec3>, normals: Vec<Vec3>) -> Result<Self, MeshError> {
        if positions.len() != normals.len() {
            return Err(MeshError::MismatchedNormals {
                positions: positions.len(),
                normals: normals.len(),
            });
        }
        Ok(Self { positions, normals })
    }

    /// Build from interleaved `[x, y, z, ...]` float arrays as a renderer
    /// would expose them.
    pub fn from_flat(positions: &[f32], normals: &[f32]) -> Result<Self, MeshError> {
        let to_vecs = |buffer: &'static str, flat: &[f32]| -> Result<Vec<Vec3>, MeshError> {
            if flat.len() % 3 != 0 {
                return Err(MeshError::RaggedBuffer {
                    buffer,
                    len: flat.len(),
                });
            }
            Ok(flat
                .chunks_exact(3)
                .map(|c| Vec3::new(c[0] as f64, c[1] as f64, c[2] as f64))
                .collect())
        };
        Self::new(to_vecs("position", positions)?, to_vecs("normal", normals)?)
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

impl MeshSource for VertexBuffer {
    fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    fn position(&self, index: usize) -> Vec3 {
        self.positions[index]
    }

    fn normal(&self, index: usize) -> Vec3 {
        self.normals[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mismatched_normals_rejected() {
        let err = VertexBuffer::new(vec![Vec3::ZERO, Vec3::X], vec![Vec3::Z]).unwrap_err();
        assert_eq!(
            err,
            MeshError::MismatchedNormals {
                positions: 2,
                normals: 1
            }
        );
    }

    #[test]
    fn test_from_flat_rejects_trailing_floats() {
        let err = VertexBuffer::from_flat(&[0.0, 0.0, 0.0, 1.0], &[0.0, 0.0, 1.0]).unwrap_err();
        assert_eq!(
            err,
            MeshError::RaggedBuffer {
                buffer: "position",
                len: 4
            }
        );

        let err = VertexBuffer::from_flat(&[0.0, 0.0, 0.0], &[0.0, 0.0, 1.0, 0.0, 0.0]).unwrap_err();
        assert_eq!(
            err,
            MeshError::RaggedBuffer {
                buffer: "normal",
                len: 5
            }
        );
    }

    #[test]
    fn test_from_flat() {
        let mesh = VertexBuffer::from_flat(
            &[0.0, 0.0, 0.0, 1.0, 2.0, 3.0],
            &[0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
        )
        .unwrap();
        assert_eq!(mesh.vertex_count(), 2);
        assert_eq!(mesh.position(1), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(mesh.normal(0), Vec3::Z);
    }

    #[test]
    fn test_closure_is_a_probe() {
        let floor = |origin: Vec3, direction: Vec3| {
            (direction.z < 0.0).then(|| SurfaceHit::new(Vec3::new(origin.x, origin.y, 0.0), Vec3::Z))
        };
        let hit = floor.cast(Vec3::new(1.0, 2.0, 5.0), -Vec3::Z).unwrap();
        assert_eq!(hit.point, Vec3::new(1.0, 2.0, 0.0));
        assert!(floor.cast(Vec3::ZERO, Vec3::Z).is_none());
    }
}
