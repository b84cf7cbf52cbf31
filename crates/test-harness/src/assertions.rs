//! Assertion helpers with diagnostic output.
//!
//! Every failure names the context, the expected value and what was actually
//! recorded in the session.

use feature_kernel::{Axis, FaceFootprint, Vec3};
use inspection::{HoleFace, HoleRecord};

use crate::helpers::HarnessError;

fn describe_holes(holes: &[HoleRecord]) -> String {
    if holes.is_empty() {
        return "  none".to_string();
    }
    holes
        .iter()
        .map(|h| {
            let c = h.circle.center;
            format!("  r={:.3} at ({:.3}, {:.3}, {:.3})", h.circle.radius, c.x, c.y, c.z)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Assert some recorded hole has the given center and radius.
pub fn assert_hole_at(
    holes: &[HoleRecord],
    center: Vec3,
    radius: f64,
    tol: f64,
    ctx: &str,
) -> Result<(), HarnessError> {
    let found = holes
        .iter()
        .any(|h| h.circle.center.distance_to(&center) <= tol && (h.circle.radius - radius).abs() <= tol);

    if found {
        Ok(())
    } else {
        Err(HarnessError::AssertionFailed {
            detail: format!(
                "[{}] expected hole r={:.3} at ({:.3}, {:.3}, {:.3}) (tol={}). Recorded:\n{}",
                ctx,
                radius,
                center.x,
                center.y,
                center.z,
                tol,
                describe_holes(holes),
            ),
        })
    }
}

/// Assert the footprint rectangle size, in either orientation.
pub fn assert_footprint_size(
    footprint: &FaceFootprint,
    width: f64,
    height: f64,
    tol: f64,
    ctx: &str,
) -> Result<(), HarnessError> {
    let matches = |w: f64, h: f64| (footprint.width - w).abs() <= tol && (footprint.height - h).abs() <= tol;
    if matches(width, height) || matches(height, width) {
        Ok(())
    } else {
        Err(HarnessError::AssertionFailed {
            detail: format!(
                "[{}] footprint size: expected {:.3} x {:.3}, got {:.3} x {:.3} (tol={}, samples={})",
                ctx, width, height, footprint.width, footprint.height, tol, footprint.samples,
            ),
        })
    }
}

/// Assert a face reports an aligned spacing of `distance` along `axis`.
pub fn assert_aligned(face: &HoleFace, axis: Axis, distance: f64, tol: f64, ctx: &str) -> Result<(), HarnessError> {
    let found = face
        .aligned
        .iter()
        .any(|d| d.axis == axis && (d.distance - distance).abs() <= tol);

    if found {
        Ok(())
    } else {
        let available: Vec<String> = face
            .aligned
            .iter()
            .map(|d| format!("{}->{} {:.3} {}", d.from, d.to, d.distance, d.axis))
            .collect();
        Err(HarnessError::AssertionFailed {
            detail: format!(
                "[{}] expected {:.3} along {} not found. Available: [{}]",
                ctx,
                distance,
                axis,
                available.join(", "),
            ),
        })
    }
}

/// Assert the number of hole faces and their sizes, in order.
pub fn assert_face_sizes(faces: &[HoleFace], expected: &[usize], ctx: &str) -> Result<(), HarnessError> {
    let actual: Vec<usize> = faces.iter().map(|f| f.holes.len()).collect();
    if actual == expected {
        Ok(())
    } else {
        Err(HarnessError::AssertionFailed {
            detail: format!("[{}] face sizes: expected {:?}, got {:?}", ctx, expected, actual),
        })
    }
}
