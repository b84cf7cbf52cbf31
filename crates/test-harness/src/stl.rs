//! STL encoding for triangle soups, binary and ASCII.
//!
//! Scenarios write fixtures out and read them back so detection runs against
//! the same single-precision data a host would load from disk.

use feature_kernel::Vec3;

use crate::helpers::HarnessError;
use crate::soup::{Triangle, TriangleSoup};

const HEADER_LEN: usize = 80;
const RECORD_LEN: usize = 50;

fn push_vec(buf: &mut Vec<u8>, v: Vec3) {
    for c in v.to_array() {
        buf.extend_from_slice(&(c as f32).to_le_bytes());
    }
}

fn read_vec(record: &[u8], offset: usize) -> Vec3 {
    let f = |i: usize| {
        let start = offset + i * 4;
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(&record[start..start + 4]);
        f32::from_le_bytes(bytes) as f64
    };
    Vec3::new(f(0), f(1), f(2))
}

/// Encode a soup as binary STL.
///
/// Binary STL format:
/// - 80-byte header (arbitrary text)
/// - u32 triangle count (little-endian)
/// - For each triangle: 3×f32 normal + 3×(3×f32 vertex) + u16 attribute = 50 bytes
pub fn export_binary_stl(soup: &TriangleSoup, name: &str) -> Result<Vec<u8>, HarnessError> {
    if soup.is_empty() {
        return Err(HarnessError::StlError {
            reason: "mesh has no triangles".to_string(),
        });
    }

    let mut buf = Vec::with_capacity(HEADER_LEN + 4 + soup.len() * RECORD_LEN);

    let header = format!("binary STL: {}", name);
    let header_bytes = header.as_bytes();
    buf.extend_from_slice(&header_bytes[..header_bytes.len().min(HEADER_LEN)]);
    buf.resize(HEADER_LEN, 0u8);

    buf.extend_from_slice(&(soup.len() as u32).to_le_bytes());

    for tri in &soup.triangles {
        push_vec(&mut buf, tri.normal);
        for v in tri.vertices {
            push_vec(&mut buf, v);
        }
        buf.extend_from_slice(&0u16.to_le_bytes());
    }

    Ok(buf)
}

/// Decode binary STL. Stored normals are ignored and recomputed from the
/// winding, as mesh loaders do.
pub fn import_binary_stl(bytes: &[u8]) -> Result<TriangleSoup, HarnessError> {
    if bytes.len() < HEADER_LEN + 4 {
        return Err(HarnessError::StlError {
            reason: format!("file too short: {} bytes", bytes.len()),
        });
    }

    let mut count = [0u8; 4];
    count.copy_from_slice(&bytes[HEADER_LEN..HEADER_LEN + 4]);
    let count = u32::from_le_bytes(count) as usize;

    let body = &bytes[HEADER_LEN + 4..];
    if body.len() != count * RECORD_LEN {
        return Err(HarnessError::StlError {
            reason: format!(
                "expected {} bytes for {} triangles, found {}",
                count * RECORD_LEN,
                count,
                body.len()
            ),
        });
    }

    let triangles = body
        .chunks_exact(RECORD_LEN)
        .map(|record| {
            let [a, b, c] = [read_vec(record, 12), read_vec(record, 24), read_vec(record, 36)];
            let outward = (b - a).cross(&(c - a));
            Triangle::facing(a, b, c, outward)
        })
        .collect();

    Ok(TriangleSoup { triangles })
}

/// Encode a soup as ASCII STL.
pub fn export_ascii_stl(soup: &TriangleSoup, name: &str) -> Result<String, HarnessError> {
    if soup.is_empty() {
        return Err(HarnessError::StlError {
            reason: "mesh has no triangles".to_string(),
        });
    }

    let mut out = String::with_capacity(soup.len() * 300);
    out.push_str(&format!("solid {}\n", name));

    for tri in &soup.triangles {
        let n = tri.normal;
        out.push_str(&format!("  facet normal {} {} {}\n", n.x as f32, n.y as f32, n.z as f32));
        out.push_str("    outer loop\n");
        for v in tri.vertices {
            out.push_str(&format!("      vertex {} {} {}\n", v.x as f32, v.y as f32, v.z as f32));
        }
        out.push_str("    endloop\n");
        out.push_str("  endfacet\n");
    }

    out.push_str(&format!("endsolid {}\n", name));
    Ok(out)
}
