//! Tests for STL encoding of triangle soups.

use feature_kernel::{MeshSource, Vec3};
use test_harness::fixtures::two_hole_plate;
use test_harness::stl::{export_ascii_stl, export_binary_stl, import_binary_stl};
use test_harness::{HarnessError, TriangleSoup};

fn make_triangle() -> TriangleSoup {
    let mut soup = TriangleSoup::new();
    soup.push(Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::Z);
    soup
}

#[test]
fn test_binary_stl_size() {
    let bytes = export_binary_stl(&make_triangle(), "tri").unwrap();
    assert_eq!(bytes.len(), 80 + 4 + 50);
    assert_eq!(u32::from_le_bytes([bytes[80], bytes[81], bytes[82], bytes[83]]), 1);
    assert!(bytes.starts_with(b"binary STL: tri"));
}

#[test]
fn test_empty_mesh_rejected() {
    let empty = TriangleSoup::new();
    assert!(matches!(export_binary_stl(&empty, "x"), Err(HarnessError::StlError { .. })));
    assert!(matches!(export_ascii_stl(&empty, "x"), Err(HarnessError::StlError { .. })));
}

#[test]
fn test_binary_round_trip_keeps_geometry() {
    let (_, soup) = two_hole_plate();
    let bytes = export_binary_stl(&soup, "plate").unwrap();
    let back = import_binary_stl(&bytes).unwrap();
    assert_eq!(back.len(), soup.len());
    for (a, b) in soup.triangles.iter().zip(&back.triangles) {
        for (p, q) in a.vertices.iter().zip(&b.vertices) {
            assert!(p.distance_to(q) < 1e-5);
        }
        assert!(a.normal.dot(&b.normal) > 0.999);
    }
    assert_eq!(back.vertex_count(), soup.vertex_count());
}

#[test]
fn test_truncated_file_rejected() {
    let bytes = export_binary_stl(&make_triangle(), "tri").unwrap();
    assert!(import_binary_stl(&bytes[..100]).is_err());
    assert!(import_binary_stl(&bytes[..20]).is_err());
}

#[test]
fn test_ascii_structure() {
    let text = export_ascii_stl(&make_triangle(), "tri").unwrap();
    assert!(text.starts_with("solid tri\n"));
    assert!(text.ends_with("endsolid tri\n"));
    assert_eq!(text.matches("facet normal").count(), 1);
    assert_eq!(text.matches("vertex ").count(), 3);
    assert!(text.contains("facet normal 0 0 1"));
}
