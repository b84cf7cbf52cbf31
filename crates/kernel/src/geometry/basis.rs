//! Deterministic orthonormal frames for face-local projection.
//!
//! Every 2D coordinate the engine produces (candidate points, circle centers,
//! footprint bounds) and every exported rotation is expressed in the frame
//! built here, so the tangent choice must stay stable for a given normal.

use nalgebra::Matrix3;
use serde::{Deserialize, Serialize};

use super::point::Point2d;
use super::vector::Vec3;

/// Threshold on `|m13|` beyond which the XYZ decomposition is in gimbal lock.
const GIMBAL_LOCK_LIMIT: f64 = 0.999_999_9;

/// Right-handed orthonormal frame with `bitangent = normal × tangent`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocalBasis {
    pub tangent: Vec3,
    pub bitangent: Vec3,
    pub normal: Vec3,
}

impl LocalBasis {
    /// Build the frame for `normal`.
    ///
    /// The tangent seed is perpendicular to the normal within the plane of the
    /// component with the smallest magnitude (strict comparisons, x before y
    /// before z). The tangent is re-derived from the bitangent at the end so
    /// the three axes are orthonormal up to rounding. A zero-length normal
    /// falls back to `+Z`.
    pub fn from_normal(normal: Vec3) -> Self {
        let n = normal.normalized().unwrap_or(Vec3::Z);
        let (ax, ay, az) = (n.x.abs(), n.y.abs(), n.z.abs());

        let seed = if ax < ay && ax < az {
            Vec3::new(0.0, -n.z, n.y)
        } else if ay < az {
            Vec3::new(-n.z, 0.0, n.x)
        } else {
            Vec3::new(-n.y, n.x, 0.0)
        };

        let tangent = seed.normalize_or_zero();
        let bitangent = n.cross(&tangent).normalize_or_zero();
        let tangent = bitangent.cross(&n).normalize_or_zero();

        Self {
            tangent,
            bitangent,
            normal: n,
        }
    }

    /// Face-local coordinates of `point` relative to `origin`.
    pub fn project(&self, origin: Vec3, point: Vec3) -> Point2d {
        let d = point - origin;
        Point2d::new(d.dot(&self.tangent), d.dot(&self.bitangent))
    }

    /// Signed distance of `point` from the plane through `origin`.
    pub fn height(&self, origin: Vec3, point: Vec3) -> f64 {
        (point - origin).dot(&self.normal)
    }

    /// World-space position of face-local `local` relative to `origin`.
    pub fn lift(&self, origin: Vec3, local: Point2d) -> Vec3 {
        origin + self.tangent * local.x + self.bitangent * local.y
    }

    /// Rotation matrix whose columns are tangent, bitangent and normal.
    pub fn rotation_matrix(&self) -> Matrix3<f64> {
        let column = |v: &Vec3| nalgebra::Vector3::new(v.x, v.y, v.z);
        Matrix3::from_columns(&[
            column(&self.tangent),
            column(&self.bitangent),
            column(&self.normal),
        ])
    }

    /// Intrinsic X-Y-Z Euler angles of [`Self::rotation_matrix`], in radians.
    pub fn euler_xyz(&self) -> EulerAngles {
        let m = self.rotation_matrix();
        let m13 = m[(0, 2)];
        let y = m13.clamp(-1.0, 1.0).asin();

        if m13.abs() < GIMBAL_LOCK_LIMIT {
            EulerAngles {
                x: (-m[(1, 2)]).atan2(m[(2, 2)]),
                y,
                z: (-m[(0, 1)]).atan2(m[(0, 0)]),
            }
        } else {
            EulerAngles {
                x: m[(2, 1)].atan2(m[(1, 1)]),
                y,
                z: 0.0,
            }
        }
    }
}

/// Euler angles for an X-Y-Z rotation order.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EulerAngles {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl EulerAngles {
    pub fn to_degrees(self) -> Self {
        Self {
            x: self.x.to_degrees(),
            y: self.y.to_degrees(),
            z: self.z.to_degrees(),
        }
    }
}

/// Rotation of the face frame for `normal`, in degrees.
pub fn rotation_degrees(normal: Vec3) -> EulerAngles {
    LocalBasis::from_normal(normal).euler_xyz().to_degrees()
}
