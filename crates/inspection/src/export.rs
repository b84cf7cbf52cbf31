//! Export record: the grouped, rounded snapshot of a session handed to
//! downstream persistence.
//!
//! Every numeric field is rounded to two decimals. The rounding is part of
//! the output contract, so parsing an export back and rounding again must be
//! the identity.

use chrono::{DateTime, SecondsFormat, Utc};
use feature_kernel::{Axis, EulerAngles, MeshSource, Vec3, rotation_degrees};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::errors::ExportError;
use crate::session::InspectionSession;

/// Round to two decimal places. Ties go toward positive infinity, so
/// `-0.125` becomes `-0.12`, and results in `(-0.005, 0]` are `+0.0`.
pub fn round2(value: f64) -> f64 {
    (value * 100.0 + 0.5).floor() / 100.0
}

fn round_vec(v: Vec3) -> Vec3 {
    v.map(round2)
}

fn round_rotation(r: EulerAngles) -> EulerAngles {
    EulerAngles {
        x: round2(r.x),
        y: round2(r.y),
        z: round2(r.z),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRecord {
    pub faces: Vec<ExportFace>,
    pub orientation_face: Option<ExportOrientation>,
    pub slide_faces: Vec<ExportSlideGroup>,
    pub total_holes: usize,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportFace {
    pub face_id: usize,
    pub normal: Vec3,
    pub holes: Vec<ExportHole>,
    pub aligned_distances: Vec<ExportAlignedDistance>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExportHole {
    pub id: usize,
    pub diameter: f64,
    pub position: Vec3,
    pub rotation: EulerAngles,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExportAlignedDistance {
    pub from: usize,
    pub to: usize,
    pub distance: f64,
    pub axis: Axis,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExportOrientation {
    pub normal: Vec3,
    pub rotation: EulerAngles,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSlideGroup {
    pub group_id: usize,
    pub faces: Vec<ExportSlideFace>,
    pub distances: Vec<ExportFaceDistance>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExportSlideFace {
    pub id: usize,
    pub normal: Vec3,
    pub position: Vec3,
    pub width: f64,
    pub height: f64,
    pub rotation: EulerAngles,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExportFaceDistance {
    pub from: usize,
    pub to: usize,
    pub distance: f64,
}

/// Build the export record for the session, stamped with the current time.
pub fn export_record<M: MeshSource>(session: &InspectionSession<M>) -> Result<ExportRecord, ExportError> {
    export_record_at(session, Utc::now())
}

/// Build the export record with an explicit timestamp.
#[instrument(skip(session))]
pub fn export_record_at<M: MeshSource>(
    session: &InspectionSession<M>,
    at: DateTime<Utc>,
) -> Result<ExportRecord, ExportError> {
    if !session.has_mesh() {
        return Err(ExportError::NoMesh);
    }

    let faces = session
        .hole_faces()
        .into_iter()
        .enumerate()
        .map(|(index, face)| ExportFace {
            face_id: index + 1,
            normal: round_vec(face.holes.first().map_or(face.normal, |h| h.circle.normal)),
            holes: face
                .holes
                .iter()
                .enumerate()
                .map(|(i, hole)| ExportHole {
                    id: i + 1,
                    diameter: round2(hole.circle.diameter()),
                    position: round_vec(hole.circle.center),
                    rotation: round_rotation(rotation_degrees(hole.circle.normal)),
                })
                .collect(),
            aligned_distances: face
                .aligned
                .iter()
                .map(|d| ExportAlignedDistance {
                    from: d.from + 1,
                    to: d.to + 1,
                    distance: round2(d.distance),
                    axis: d.axis,
                })
                .collect(),
        })
        .collect();

    let slide_faces = session
        .footprint_faces()
        .into_iter()
        .enumerate()
        .map(|(index, face)| ExportSlideGroup {
            group_id: index + 1,
            faces: face
                .footprints
                .iter()
                .enumerate()
                .map(|(i, record)| {
                    let fp = &record.footprint;
                    ExportSlideFace {
                        id: i + 1,
                        normal: round_vec(fp.normal),
                        position: round_vec(fp.center_3d()),
                        width: round2(fp.width),
                        height: round2(fp.height),
                        rotation: round_rotation(rotation_degrees(fp.normal)),
                    }
                })
                .collect(),
            distances: face
                .distances
                .iter()
                .map(|d| ExportFaceDistance {
                    from: d.from + 1,
                    to: d.to + 1,
                    distance: round2(d.distance),
                })
                .collect(),
        })
        .collect();

    let orientation_face = session.orientation_face().map(|face| ExportOrientation {
        normal: round_vec(face.normal),
        rotation: round_rotation(face.rotation),
    });

    let record = ExportRecord {
        faces,
        orientation_face,
        slide_faces,
        total_holes: session.holes().len(),
        timestamp: at.to_rfc3339_opts(SecondsFormat::Millis, true),
    };
    info!(
        faces = record.faces.len(),
        holes = record.total_holes,
        slide_groups = record.slide_faces.len(),
        "export record built"
    );
    Ok(record)
}

/// Pretty-printed JSON export of the session.
pub fn export_json<M: MeshSource>(session: &InspectionSession<M>) -> Result<String, ExportError> {
    let record = export_record(session)?;
    serde_json::to_string_pretty(&record).map_err(|e| ExportError::Serialize(e.to_string()))
}

/// Read an export record back from JSON.
pub fn parse_export(json: &str) -> Result<ExportRecord, ExportError> {
    serde_json::from_str(json).map_err(|e| ExportError::Parse(e.to_string()))
}

/// Name of the export file for a loaded model file: a trailing `.stl`
/// (any case) becomes `.json`, anything else gets `.json` appended.
pub fn export_file_name(model_file: &str) -> String {
    let len = model_file.len();
    match model_file.get(len.saturating_sub(4)..) {
        Some(ext) if len >= 4 && ext.eq_ignore_ascii_case(".stl") => {
            format!("{}.json", &model_file[..len - 4])
        }
        _ => format!("{model_file}.json"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round2() {
        assert_eq!(round2(1.234), 1.23);
        assert_eq!(round2(1.235_000_1), 1.24);
        assert_eq!(round2(-2.5), -2.5);
        assert_eq!(round2(0.005), 0.01);
        assert_eq!(round2(round2(3.14159)), round2(3.14159));
    }

    #[test]
    fn test_round2_ties_toward_positive_infinity() {
        assert_eq!(round2(0.125), 0.13);
        assert_eq!(round2(-0.125), -0.12);
        assert_eq!(round2(-1.125), -1.12);
        assert_eq!(round2(-2.375), -2.37);
    }

    #[test]
    fn test_round2_small_negatives_are_positive_zero() {
        for v in [-0.004, -0.0049, -0.0] {
            let r = round2(v);
            assert_eq!(r, 0.0);
            assert!(r.is_sign_positive(), "{v} rounded to {r}");
        }
        assert_eq!(serde_json::to_string(&round2(-0.001)).unwrap(), "0.0");
    }

    #[test]
    fn test_export_file_name() {
        assert_eq!(export_file_name("part.stl"), "part.json");
        assert_eq!(export_file_name("part.STL"), "part.json");
        assert_eq!(export_file_name("bracket.v2.Stl"), "bracket.v2.json");
        assert_eq!(export_file_name("model.obj"), "model.obj.json");
        assert_eq!(export_file_name("stl"), "stl.json");
        assert_eq!(export_file_name(""), ".json");
    }

    #[test]
    fn test_export_without_mesh() {
        let session: InspectionSession = InspectionSession::default();
        assert_eq!(export_record(&session), Err(ExportError::NoMesh));
        assert_eq!(export_json(&session), Err(ExportError::NoMesh));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(parse_export("{not json"), Err(ExportError::Parse(_))));
    }

    #[test]
    fn test_face_normal_comes_from_leading_hole() {
        use feature_kernel::{DetectionConfig, SurfaceHit, VertexBuffer};
        use std::f64::consts::TAU;

        let rim = |cx: f64| -> Vec<Vec3> {
            (0..32)
                .map(|k| {
                    let a = TAU * k as f64 / 32.0;
                    Vec3::new(cx + 2.0 * a.cos(), 2.0 * a.sin(), 0.0)
                })
                .collect()
        };
        let mut positions = rim(0.0);
        positions.extend(rim(10.0));
        let normals = vec![Vec3::Z; positions.len()];

        let mut session = InspectionSession::new(DetectionConfig::seeded(21));
        session.load_mesh(VertexBuffer::new(positions, normals).unwrap());

        // The founding hole faces +Z; the second is clicked on a slightly
        // tilted surface but still joins the same face.
        let tilted = Vec3::new(0.05, 0.0, 1.0).normalize_or_zero();
        session.detect_hole(SurfaceHit::new(Vec3::new(2.5, 0.0, 0.0), Vec3::Z)).unwrap();
        session.detect_hole(SurfaceHit::new(Vec3::new(12.5, 0.0, 0.0), tilted)).unwrap();

        let faces = session.hole_faces();
        assert_eq!(faces.len(), 1);
        assert_eq!(faces[0].normal, Vec3::Z);
        // Local x runs along -X, so the tilted hole at x = 10 sorts first.
        assert!(faces[0].holes[0].circle.normal.dot(&tilted) > 1.0 - 1e-12);

        let record = export_record(&session).unwrap();
        assert_eq!(record.faces[0].normal, Vec3::new(0.05, 0.0, 1.0));
    }

    #[test]
    fn test_empty_session_export() {
        let mut session: InspectionSession = InspectionSession::default();
        session.load_mesh(feature_kernel::VertexBuffer::default());
        let at = DateTime::parse_from_rfc3339("2024-05-01T12:00:00Z").unwrap().with_timezone(&Utc);
        let record = export_record_at(&session, at).unwrap();
        assert!(record.faces.is_empty());
        assert!(record.slide_faces.is_empty());
        assert_eq!(record.orientation_face, None);
        assert_eq!(record.total_holes, 0);
        assert_eq!(record.timestamp, "2024-05-01T12:00:00.000Z");

        let json = serde_json::to_value(&record).unwrap();
        assert!(json["orientationFace"].is_null());
        assert!(json["slideFaces"].as_array().unwrap().is_empty());
        assert_eq!(json["totalHoles"], 0);
    }
}
