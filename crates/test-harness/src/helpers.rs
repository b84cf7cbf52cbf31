//! Error type and small helpers shared by the fixtures and scenarios.

use feature_kernel::{MeshError, SurfaceHit, SurfaceProbe, Vec3};
use inspection::{ExportError, SessionError};

/// Unified error type for the test harness.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    #[error("assertion failed: {detail}")]
    AssertionFailed { detail: String },

    #[error("STL error: {reason}")]
    StlError { reason: String },

    #[error("nothing under the pointer at ({x}, {y})")]
    Miss { x: f64, y: f64 },

    #[error(transparent)]
    Mesh(#[from] MeshError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Height rays are cast from when simulating a pointer click from above.
pub const CLICK_HEIGHT: f64 = 1000.0;

/// Simulate a pointer click looking straight down at `(x, y)`.
pub fn click_from_above<P: SurfaceProbe + ?Sized>(probe: &P, x: f64, y: f64) -> Result<SurfaceHit, HarnessError> {
    probe
        .cast(Vec3::new(x, y, CLICK_HEIGHT), -Vec3::Z)
        .ok_or(HarnessError::Miss { x, y })
}

/// Point on a circle of `radius` around `center` in the XY plane.
pub fn on_circle(center: Vec3, radius: f64, angle: f64) -> Vec3 {
    center + Vec3::new(radius * angle.cos(), radius * angle.sin(), 0.0)
}
